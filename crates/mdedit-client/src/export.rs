//! HTML export through the remote markdown renderer.

use std::path::PathBuf;

use pulldown_cmark_escape::escape_html;
use tracing::{info, warn};

use mdedit_shared::constants::APP_NAME;
use mdedit_shared::protocol::RenderRequest;
use mdedit_shared::Document;

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};

pub struct Exporter {
    http: reqwest::Client,
    render_url: String,
    export_dir: PathBuf,
}

impl Exporter {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        // The public render API rejects requests without a user agent.
        let http = reqwest::Client::builder()
            .user_agent(concat!("mdedit/", env!("CARGO_PKG_VERSION")))
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            http,
            render_url: config.render_url.clone(),
            export_dir: config.export_dir.clone(),
        })
    }

    /// Render `document` remotely and write it as a standalone HTML file.
    /// One attempt, no retries.
    pub async fn export(&self, document: &Document) -> Result<PathBuf> {
        let fragment = self.render(&document.content).await?;
        let html = wrap_html(&document.title, &fragment);

        tokio::fs::create_dir_all(&self.export_dir).await?;
        let path = self.export_dir.join(file_name(&document.title));
        tokio::fs::write(&path, html).await?;

        info!(uuid = %document.uuid, path = %path.display(), "Document exported");
        Ok(path)
    }

    async fn render(&self, markdown: &str) -> Result<String> {
        let resp = self
            .http
            .post(&self.render_url)
            .json(&RenderRequest::gfm(markdown))
            .send()
            .await
            .map_err(|e| ClientError::Export(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Render endpoint refused export");
            return Err(ClientError::Export(format!("renderer responded {status}")));
        }

        resp.text()
            .await
            .map_err(|e| ClientError::Export(e.to_string()))
    }
}

/// Wrap a rendered fragment into a complete HTML page.
pub fn wrap_html(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"generator\" content=\"{APP_NAME}\">\n\
         <title>{}</title>\n</head>\n<body>\n{body}\n</body>\n</html>\n",
        escape(title)
    )
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    // Writing into a String cannot fail.
    let _ = escape_html(&mut out, text);
    out
}

/// File name for an exported document: unsafe characters become `_`.
pub fn file_name(title: &str) -> String {
    let stem: String = title
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | ' ') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let stem = stem.trim();
    if stem.is_empty() {
        "untitled.html".to_string()
    } else {
        format!("{stem}.html")
    }
}
