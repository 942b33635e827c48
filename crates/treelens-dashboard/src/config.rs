use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Rendering and listening options for the dashboard.
///
/// # Defaults
///
/// | Parameter          | Default     |
/// |--------------------|-------------|
/// | `host`             | `127.0.0.1` |
/// | `port`             | 8501        |
/// | `max_table_rows`   | 1000        |
/// | `max_chart_points` | 5000        |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    host: IpAddr,
    port: u16,
    max_table_rows: usize,
    max_chart_points: usize,
}

impl DashboardConfig {
    /// Create a config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 8501,
            max_table_rows: 1000,
            max_chart_points: 5000,
        }
    }

    /// Set the listening address.
    #[must_use]
    pub fn with_host(mut self, host: IpAddr) -> Self {
        self.host = host;
        self
    }

    /// Set the listening port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set how many test rows the data table shows. Zero shows none.
    #[must_use]
    pub fn with_max_table_rows(mut self, max_table_rows: usize) -> Self {
        self.max_table_rows = max_table_rows;
        self
    }

    /// Set how many points each scatter panel draws at most.
    #[must_use]
    pub fn with_max_chart_points(mut self, max_chart_points: usize) -> Self {
        self.max_chart_points = max_chart_points;
        self
    }

    /// Return the listening address.
    #[must_use]
    pub fn host(&self) -> IpAddr {
        self.host
    }

    /// Return the listening port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// `host:port` to bind.
    #[must_use]
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Return the test data row cap.
    #[must_use]
    pub fn max_table_rows(&self) -> usize {
        self.max_table_rows
    }

    /// Return the per-panel point cap.
    #[must_use]
    pub fn max_chart_points(&self) -> usize {
        self.max_chart_points
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self::new()
    }
}
