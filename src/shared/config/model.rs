use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub query: QueryConfig,
    pub backend: BackendConfig,
    pub tracing: TracingConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    pub http_addr: String,
}

#[derive(Debug, Deserialize)]
pub struct QueryConfig {
    /// Bounded wait for backend completion before a request is failed.
    pub async_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClusterConfig {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct BackendConfig {
    pub clusters: Vec<ClusterConfig>,
    /// Per-cluster request timeout; should stay below query.async_timeout_ms
    /// so individual cluster failures surface before the bounded wait elapses.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_request_timeout_ms() -> u64 {
    25_000
}

#[derive(Debug, Deserialize)]
pub struct TracingConfig {
    pub enabled: bool,
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    pub log_dir: String,
    pub stdout_level: String,
    pub file_level: String,
}

use std::env;

pub fn load_settings() -> Result<Settings, config::ConfigError> {
    let config_path = env::var("TSGATE_CONFIG").unwrap_or_else(|_| "config".to_string());

    let settings: Settings = config::Config::builder()
        .add_source(config::File::with_name(&config_path))
        .build()?
        .try_deserialize()?;

    Ok(settings)
}
