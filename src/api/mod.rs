use crate::config::ApiConfig;
use crate::error::UploadError;
use crate::ingest::IngestClient;
use crate::render::{normalize_link, PdfRenderer};
use crate::staging::{combined_digest, ScratchDir};
use actix_cors::Cors;
use actix_multipart::Multipart;
use actix_web::{web, App, Error, HttpResponse, HttpServer};
use chrono::Utc;
use futures_util::stream::StreamExt;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

/// Generate a request ID for log correlation and scratch namespacing
fn generate_request_id() -> String {
    Uuid::new_v4().to_string()
}

/// Decoded multipart form: the `links` field split into entries, plus the
/// bytes of every non-empty file part across all field names, in arrival
/// order.
struct UploadForm {
    links: Vec<String>,
    pdfs: Vec<Vec<u8>>,
}

fn parse_links(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

async fn read_form(mut payload: Multipart) -> Result<UploadForm, UploadError> {
    let mut links = Vec::new();
    let mut pdfs = Vec::new();

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| UploadError::BadPayload(e.to_string()))?;
        let is_file = field
            .content_disposition()
            .as_ref()
            .and_then(|cd| cd.get_filename())
            .is_some();
        let field_name = field
            .content_disposition()
            .as_ref()
            .and_then(|cd| cd.get_name())
            .unwrap_or_default()
            .to_string();

        let mut data = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| UploadError::BadPayload(e.to_string()))?;
            data.extend_from_slice(&chunk);
        }

        if is_file {
            // Zero-byte parts are "no file selected" placeholders.
            if !data.is_empty() {
                pdfs.push(data);
            }
        } else if field_name == "links" {
            links.extend(parse_links(&String::from_utf8_lossy(&data)));
        }
    }

    Ok(UploadForm { links, pdfs })
}

/// POST /api/upload
///
/// Renders each link to a PDF, stages every uploaded PDF, digests the
/// uploaded bytes, hands the digest to the ingestion collaborator, and
/// forwards its JSON response. The per-request scratch directory is
/// removed on every exit path.
pub async fn upload_documents(
    payload: Multipart,
    config: web::Data<ApiConfig>,
    renderer: web::Data<Arc<dyn PdfRenderer>>,
    ingest: web::Data<Arc<dyn IngestClient>>,
) -> Result<HttpResponse, UploadError> {
    let request_id = generate_request_id();
    let form = read_form(payload).await?;

    if form.links.is_empty() && form.pdfs.is_empty() {
        return Err(UploadError::Unprocessable);
    }

    let scratch = ScratchDir::create(&config.scratch_dir, &request_id)?;
    let mut file_names = Vec::new();

    if !form.links.is_empty() {
        let targets: Vec<String> = form.links.iter().map(|link| normalize_link(link)).collect();
        let rendered = renderer.render_links(&targets, scratch.path()).await?;
        file_names.extend(rendered);
    }

    for (index, bytes) in form.pdfs.iter().enumerate() {
        let file_name = format!("{}.pdf", index);
        tokio::fs::write(scratch.file_path(&file_name), bytes).await?;
        file_names.push(file_name);
    }

    // The digest covers uploaded PDF bytes only, in index order. Rendered
    // links do not contribute.
    let digest = combined_digest(&form.pdfs);

    info!(
        request_id = %request_id,
        links = form.links.len(),
        pdfs = form.pdfs.len(),
        staged = file_names.len(),
        digest = %digest,
        "upload staged"
    );

    let response = ingest.ingest(&digest).await?;

    scratch.cleanup();
    Ok(HttpResponse::Ok().json(response))
}

pub async fn health_check(config: web::Data<ApiConfig>) -> Result<HttpResponse, Error> {
    let request_id = generate_request_id();
    match std::fs::create_dir_all(&config.scratch_dir) {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "status": "healthy",
            "scratch_dir": config.scratch_dir.display().to_string(),
            "timestamp": Utc::now().to_rfc3339(),
            "request_id": request_id
        }))),
        Err(e) => {
            error!("[{}] Health check failed: {}", request_id, e);
            Ok(HttpResponse::ServiceUnavailable().json(json!({
                "status": "unhealthy",
                "error": e.to_string(),
                "request_id": request_id
            })))
        }
    }
}

async fn root_handler() -> Result<HttpResponse, Error> {
    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body("✅ docpress is running (Actix Web)\n\nTry /health\n"))
}

pub fn start_api_server(
    config: &ApiConfig,
    renderer: Arc<dyn PdfRenderer>,
    ingest: Arc<dyn IngestClient>,
) -> impl std::future::Future<Output = std::io::Result<()>> {
    let bind_addr = config.bind_addr();
    let config = config.clone();

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST"])
            .allowed_headers(vec![
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::AUTHORIZATION,
            ])
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(config.clone()))
            .app_data(web::Data::new(renderer.clone()))
            .app_data(web::Data::new(ingest.clone()))
            .wrap(cors)
            .route("/", web::get().to(root_handler))
            .route("/health", web::get().to(health_check))
            .service(web::resource("/api/upload").route(web::post().to(upload_documents)))
    })
    .bind(bind_addr.clone())
    .unwrap_or_else(|e| panic!("Failed to bind to {}: {}", bind_addr, e))
    .run()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn links_are_split_trimmed_and_filtered() {
        assert_eq!(
            parse_links("example.com, http://foo.test"),
            vec!["example.com".to_string(), "http://foo.test".to_string()]
        );
        assert_eq!(parse_links(" , ,"), Vec::<String>::new());
        assert_eq!(parse_links(""), Vec::<String>::new());
        assert_eq!(parse_links("a.test,,b.test"), vec!["a.test", "b.test"]);
    }
}
