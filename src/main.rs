use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use treelens_dashboard::{
    AppState, DashboardConfig, Hyperparameters, ModelFactory, ModelKind, Selection, Session, Trainer,
    render_page, run_dashboard, serve,
};
use treelens_data::{DatasetName, DatasetProvider, ensure_source};

#[derive(Parser)]
#[command(name = "treelens")]
#[command(about = "Explore tree-based classifiers on classic datasets")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// RNG seed for the train/test split and every estimator
    #[arg(long, default_value_t = 42, global = true)]
    seed: u64,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Number of threads for parallel training (defaults to all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,

    /// Directory where downloaded datasets are stored
    #[arg(long, default_value = "treelens_data", global = true)]
    data_home: PathBuf,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the interactive dashboard
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "127.0.0.1")]
        host: IpAddr,

        /// Port to listen on
        #[arg(long, default_value_t = 8501)]
        port: u16,

        /// Maximum number of rows in the test data table
        #[arg(long, default_value_t = 1000)]
        max_table_rows: usize,

        /// Maximum number of points per scatter panel
        #[arg(long, default_value_t = 5000)]
        max_chart_points: usize,
    },

    /// Run one selection and write the rendered page to a file
    Report {
        /// Dataset: Iris, Wine or Covertype
        #[arg(long, default_value = "Iris")]
        dataset: DatasetName,

        /// Model: DecisionTreeClassifier, RandomForestClassifier or ExtraTreesClassifier
        #[arg(long, default_value = "DecisionTreeClassifier")]
        model: ModelKind,

        /// Number of trees in the ensembles (1-100)
        #[arg(long, default_value_t = 25)]
        n_estimators: usize,

        /// Maximum tree depth (1-150)
        #[arg(long, default_value_t = 10)]
        max_depth: usize,

        /// Include the test data table
        #[arg(long, default_value_t = false)]
        show_test_data: bool,

        /// Include the scatterplot matrix
        #[arg(long, default_value_t = false)]
        show_distributions: bool,

        /// Path of the HTML file to write
        #[arg(long)]
        output: PathBuf,
    },

    /// Download a remote dataset into the data home
    Fetch {
        /// Dataset: Iris, Wine or Covertype
        #[arg(long)]
        dataset: DatasetName,
    },
}

#[derive(Serialize)]
struct ReportOutput {
    dataset: DatasetName,
    model: &'static str,
    auc: f64,
    accuracy: f64,
    n_train: usize,
    n_test: usize,
    output: PathBuf,
}

#[derive(Serialize)]
struct FetchOutput {
    dataset: DatasetName,
    path: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    match cli.command {
        Command::Serve {
            host,
            port,
            max_table_rows,
            max_chart_points,
        } => {
            let config = DashboardConfig::new()
                .with_host(host)
                .with_port(port)
                .with_max_table_rows(max_table_rows)
                .with_max_chart_points(max_chart_points);
            let addr = config.socket_addr();
            let state = Arc::new(AppState::new(session(&cli.data_home, cli.seed, config)));

            let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
            runtime
                .block_on(serve(state, addr))
                .with_context(|| format!("server on {addr} failed"))?;
        }

        Command::Report {
            dataset,
            model,
            n_estimators,
            max_depth,
            show_test_data,
            show_distributions,
            output,
        } => {
            let selection = Selection {
                dataset,
                model,
                hyperparameters: Hyperparameters::new(n_estimators, max_depth)?,
                show_test_data,
                show_distributions,
            };
            let config = DashboardConfig::new();
            let session = session(&cli.data_home, cli.seed, config.clone());

            let view = run_dashboard(&session, &selection)
                .with_context(|| format!("failed to run {model} on {dataset}"))?;
            let page = render_page(&selection, &view, &config);
            std::fs::write(&output, page.into_string())
                .with_context(|| format!("failed to write {}", output.display()))?;
            info!(path = %output.display(), "report written");

            let summary = view.summary();
            let result = ReportOutput {
                dataset,
                model: model.display_name(),
                auc: summary.auc,
                accuracy: summary.accuracy,
                n_train: summary.n_train,
                n_test: summary.n_test,
                output,
            };
            println!("{}", serde_json::to_string_pretty(&result)?);
        }

        Command::Fetch { dataset } => {
            let path = ensure_source(dataset, &cli.data_home)
                .with_context(|| format!("failed to fetch {dataset}"))?;
            match &path {
                Some(path) => info!(path = %path.display(), "dataset available"),
                None => info!(%dataset, "dataset is bundled, nothing to download"),
            }
            println!(
                "{}",
                serde_json::to_string_pretty(&FetchOutput { dataset, path })?
            );
        }
    }

    Ok(())
}

fn session(data_home: &std::path::Path, seed: u64, config: DashboardConfig) -> Session {
    Session::new(
        DatasetProvider::new(data_home).with_seed(seed),
        Trainer::new(ModelFactory::new(seed)),
        config,
    )
}
