// src/render.rs
//
// Link-to-PDF rendering behind a headless Chromium session.

use std::path::Path;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::emulation::SetEmulatedMediaParams;
use chromiumoxide::cdp::browser_protocol::page::PrintToPdfParams;
use futures_util::StreamExt;
use tracing::{debug, info};

use crate::error::UploadError;

// CDP takes paper size and margins in inches. A4 portrait, with the
// fixed 100px top/bottom and 50px left/right margins at 96 DPI.
const A4_WIDTH_IN: f64 = 8.27;
const A4_HEIGHT_IN: f64 = 11.69;
const MARGIN_TOP_BOTTOM_IN: f64 = 100.0 / 96.0;
const MARGIN_LEFT_RIGHT_IN: f64 = 50.0 / 96.0;

/// Renders a batch of links into PDF files.
#[async_trait]
pub trait PdfRenderer: Send + Sync {
    /// Render each link to `result{i}.pdf` under `dir`, in input order.
    /// Links arrive scheme-qualified. Returns the file names written.
    async fn render_links(&self, links: &[String], dir: &Path) -> Result<Vec<String>, UploadError>;
}

/// Prepend `http://` to links that carry no HTTP scheme prefix.
pub fn normalize_link(link: &str) -> String {
    if link.starts_with("http") {
        link.to_string()
    } else {
        format!("http://{}", link)
    }
}

/// Headless-Chromium renderer.
///
/// One browser session serves a whole batch; links render sequentially
/// over a single reused page, so `result{i}` indices follow input order.
pub struct ChromiumRenderer;

#[async_trait]
impl PdfRenderer for ChromiumRenderer {
    async fn render_links(&self, links: &[String], dir: &Path) -> Result<Vec<String>, UploadError> {
        if links.is_empty() {
            return Ok(Vec::new());
        }

        let config = BrowserConfig::builder().build().map_err(UploadError::render)?;
        let (mut browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| UploadError::render(e.to_string()))?;
        let driver = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let result = render_batch(&browser, links, dir).await;

        if let Err(e) = browser.close().await {
            debug!(error = %e, "browser close failed");
        }
        let _ = browser.wait().await;
        driver.abort();

        result
    }
}

async fn render_batch(
    browser: &Browser,
    links: &[String],
    dir: &Path,
) -> Result<Vec<String>, UploadError> {
    let page = browser
        .new_page("about:blank")
        .await
        .map_err(|e| UploadError::render(e.to_string()))?;

    // Print with screen CSS, as a browser window would show the page.
    page.execute(SetEmulatedMediaParams {
        media: Some("screen".to_string()),
        features: None,
    })
    .await
    .map_err(|e| UploadError::render(e.to_string()))?;

    let mut file_names = Vec::with_capacity(links.len());
    for (index, link) in links.iter().enumerate() {
        page.goto(link.as_str())
            .await
            .map_err(|e| UploadError::render(e.to_string()))?;
        page.wait_for_navigation()
            .await
            .map_err(|e| UploadError::render(e.to_string()))?;

        let pdf = page
            .pdf(print_params())
            .await
            .map_err(|e| UploadError::render(e.to_string()))?;
        let file_name = format!("result{}.pdf", index);
        tokio::fs::write(dir.join(&file_name), pdf).await?;
        info!(link = %link, file = %file_name, "rendered link to PDF");
        file_names.push(file_name);
    }

    Ok(file_names)
}

fn print_params() -> PrintToPdfParams {
    PrintToPdfParams {
        print_background: Some(true),
        paper_width: Some(A4_WIDTH_IN),
        paper_height: Some(A4_HEIGHT_IN),
        margin_top: Some(MARGIN_TOP_BOTTOM_IN),
        margin_bottom: Some(MARGIN_TOP_BOTTOM_IN),
        margin_left: Some(MARGIN_LEFT_RIGHT_IN),
        margin_right: Some(MARGIN_LEFT_RIGHT_IN),
        ..Default::default()
    }
}
