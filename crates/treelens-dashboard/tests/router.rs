//! Router tests through `tower::ServiceExt::oneshot` on the bundled Iris data.

use std::sync::{Arc, mpsc};
use std::thread;
use std::time::Duration;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use treelens_dashboard::{AppState, DashboardConfig, ModelFactory, Session, Trainer, create_router};
use treelens_data::{DataError, DatasetName, DatasetProvider, LoadedDataset};

fn state(data_home: &std::path::Path) -> Arc<AppState> {
    let session = Session::new(
        DatasetProvider::new(data_home),
        Trainer::new(ModelFactory::new(42)),
        DashboardConfig::new().with_max_table_rows(10),
    );
    Arc::new(AppState::new(session))
}

async fn get(state: Arc<AppState>, uri: &str) -> (StatusCode, String) {
    let app = create_router(state);
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn index_renders_default_run() {
    let dir = tempfile::tempdir().unwrap();
    let (status, body) = get(state(dir.path()), "/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Model and dataset selection"));
    assert!(body.contains("DecisionTreeClassifier on Iris"));
    assert!(body.contains("AUC: "));
    assert!(body.contains("Confusion Matrix"));
    assert!(!body.contains("Test data"));
}

#[tokio::test]
async fn optional_panels_follow_checkboxes() {
    let dir = tempfile::tempdir().unwrap();
    let (status, body) = get(
        state(dir.path()),
        "/?dataset=Iris&model=RandomForestClassifier&n_estimators=10&max_depth=5&show_test_data=on&show_distributions=on",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("RandomForestClassifier on Iris"));
    assert!(body.contains("<h2>Test data</h2>"));
    assert!(body.contains("Showing the first 10 of 50 test rows."));
    assert!(body.contains("<h2>Distributions</h2>"));
    assert!(body.contains("cdn.plot.ly"));
}

#[tokio::test]
async fn api_returns_summary_json() {
    let dir = tempfile::tempdir().unwrap();
    let (status, body) = get(state(dir.path()), "/api/evaluation?model=ExtraTreesClassifier").await;

    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["dataset"], "Iris");
    assert_eq!(json["model"], "ExtraTreesClassifier");
    assert_eq!(json["n_test"], 50);
    assert_eq!(json["n_train"], 100);
    let auc = json["auc"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&auc));
    assert_eq!(json["classification_report"]["rows"].as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn second_request_hits_both_caches() {
    let dir = tempfile::tempdir().unwrap();
    let state = state(dir.path());
    let uri = "/api/evaluation?model=RandomForestClassifier&n_estimators=5";

    let (_, first) = get(state.clone(), uri).await;
    let (_, second) = get(state.clone(), uri).await;
    let first: serde_json::Value = serde_json::from_str(&first).unwrap();
    let second: serde_json::Value = serde_json::from_str(&second).unwrap();

    assert_eq!(first["model_cached"], false);
    assert_eq!(second["model_cached"], true);
    assert_eq!(second["dataset_cached"], true);
    assert_eq!(first["auc"], second["auc"]);
    assert_eq!(first["confusion_matrix"], second["confusion_matrix"]);

    let (status, page) = get(state.clone(), "/?model=RandomForestClassifier&n_estimators=5").await;
    assert_eq!(status, StatusCode::OK);
    assert!(page.contains("Model loaded from cache: 5 tree(s)"));

    let (_, health) = get(state, "/health").await;
    let health: serde_json::Value = serde_json::from_str(&health).unwrap();
    assert_eq!(health["status"], "ok");
    assert_eq!(health["datasets_cached"], 1);
    assert_eq!(health["models_cached"], 1);
}

#[tokio::test]
async fn health_answers_while_a_dataset_loads() {
    let dir = tempfile::tempdir().unwrap();
    let state = state(dir.path());

    let (entered_tx, entered_rx) = mpsc::channel();
    let loader = {
        let state = state.clone();
        thread::spawn(move || {
            state
                .session
                .provider()
                .cache()
                .get_or_try_insert_with(&DatasetName::Wine, || {
                    entered_tx.send(()).unwrap();
                    thread::sleep(Duration::from_secs(2));
                    Err::<Arc<LoadedDataset>, _>(DataError::EmptyDataset {
                        dataset: DatasetName::Wine,
                    })
                })
        })
    };
    entered_rx.recv().unwrap();

    let (status, body) = tokio::time::timeout(Duration::from_secs(1), get(state.clone(), "/health"))
        .await
        .expect("/health blocked on the dataset cache");
    assert_eq!(status, StatusCode::OK);
    let health: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(health["datasets_cached"], 0);

    assert!(loader.join().unwrap().is_err());
    assert!(state.session.provider().cache().is_empty());
}

#[tokio::test]
async fn invalid_input_is_bad_request() {
    let dir = tempfile::tempdir().unwrap();
    let state = state(dir.path());

    let (status, body) = get(state.clone(), "/?max_depth=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("max_depth must be in [1, 150], got 0"));

    let (status, body) = get(state, "/api/evaluation?dataset=Digits").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["error"], true);
    assert!(json["message"].as_str().unwrap().contains("Digits"));
}
