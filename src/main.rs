// src/main.rs
use std::sync::Arc;

use docpress::api::start_api_server;
use docpress::config::ApiConfig;
use docpress::ingest::{HttpIngestClient, IngestClient};
use docpress::render::{ChromiumRenderer, PdfRenderer};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = ApiConfig::from_env();

    println!("📁 Scratch dir: {}", config.scratch_dir.display());
    println!("📡 Ingestion endpoint: {}", config.ingest_url);

    let renderer: Arc<dyn PdfRenderer> = Arc::new(ChromiumRenderer);
    let ingest: Arc<dyn IngestClient> = Arc::new(
        HttpIngestClient::new(config.ingest_url.clone(), config.ingest_timeout_secs)
            .expect("Failed to initialize ingestion client"),
    );

    println!("🚀 Starting API server on http://{} ...", config.bind_addr());
    start_api_server(&config, renderer, ingest).await
}
