use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub projects_path: PathBuf,
    pub serp_api_key: Option<String>,
    pub assessment_api_key: Option<String>,
    pub cron_secret: Option<String>,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub serp_timeout_secs: u64,
    pub assessment_timeout_secs: u64,
    pub scan_window_size: usize,
    pub scan_inter_window_delay_ms: u64,
    pub snapshot_cache_ttl_hours: i64,
    pub cron_scan_limit: i64,
    pub cron_stale_after_hours: i64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("projects_path", &self.projects_path)
            .field("database_url", &"[redacted]")
            .field(
                "serp_api_key",
                &self.serp_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "assessment_api_key",
                &self.assessment_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "cron_secret",
                &self.cron_secret.as_ref().map(|_| "[redacted]"),
            )
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("serp_timeout_secs", &self.serp_timeout_secs)
            .field("assessment_timeout_secs", &self.assessment_timeout_secs)
            .field("scan_window_size", &self.scan_window_size)
            .field(
                "scan_inter_window_delay_ms",
                &self.scan_inter_window_delay_ms,
            )
            .field("snapshot_cache_ttl_hours", &self.snapshot_cache_ttl_hours)
            .field("cron_scan_limit", &self.cron_scan_limit)
            .field("cron_stale_after_hours", &self.cron_stale_after_hours)
            .finish()
    }
}
