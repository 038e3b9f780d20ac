// src/config.rs
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    /// Root directory for per-request scratch space.
    pub scratch_dir: PathBuf,
    /// Ingestion collaborator endpoint.
    pub ingest_url: String,
    /// Timeout for the ingestion call, in seconds.
    pub ingest_timeout_secs: u64,
}

impl ApiConfig {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let host = env::var("BACKEND_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("BACKEND_PORT")
            .unwrap_or_else(|_| "3010".to_string())
            .parse()
            .expect("BACKEND_PORT must be a valid u16");
        let scratch_dir = env::var("SCRATCH_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("docs"));
        let ingest_url = env::var("INGEST_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:3020/ingest".to_string());
        let ingest_timeout_secs = env::var("INGEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);
        Self {
            host,
            port,
            scratch_dir,
            ingest_url,
            ingest_timeout_secs,
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_addr_joins_host_and_port() {
        let config = ApiConfig {
            host: "0.0.0.0".to_string(),
            port: 8080,
            scratch_dir: PathBuf::from("docs"),
            ingest_url: "http://127.0.0.1:3020/ingest".to_string(),
            ingest_timeout_secs: 30,
        };
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
    }
}
