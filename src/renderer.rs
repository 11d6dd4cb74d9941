//! Sources of rendered HTML.
//!
//! The engine only ever sees a finished document string. Anything that
//! loads, scrolls or clicks belongs behind this trait.

use async_trait::async_trait;
use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tracing::{debug, info};

use crate::common::error::{ExtractError, Result};

const DEFAULT_USER_AGENT: &str = concat!("profile_scraper/", env!("CARGO_PKG_VERSION"));
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[async_trait]
pub trait Renderer: Send + Sync {
    /// Human-readable source, used in logs and errors
    fn name(&self) -> &str;

    async fn render(&self) -> Result<String>;
}

/// Already-rendered markup held in memory
pub struct StaticRenderer {
    html: String,
}

impl StaticRenderer {
    pub fn new(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }
}

#[async_trait]
impl Renderer for StaticRenderer {
    fn name(&self) -> &str {
        "static"
    }

    async fn render(&self) -> Result<String> {
        Ok(self.html.clone())
    }
}

/// A saved page on disk
pub struct FileRenderer {
    path: PathBuf,
    name: String,
}

impl FileRenderer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path.display().to_string();
        Self { path, name }
    }
}

#[async_trait]
impl Renderer for FileRenderer {
    fn name(&self) -> &str {
        &self.name
    }

    async fn render(&self) -> Result<String> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| ExtractError::Render {
            source_name: self.name.clone(),
            message: e.to_string(),
        })?;
        debug!(path = %self.name, bytes = bytes.len(), "read page from file");
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Markup piped on standard input
#[derive(Default)]
pub struct StdinRenderer;

#[async_trait]
impl Renderer for StdinRenderer {
    fn name(&self) -> &str {
        "stdin"
    }

    async fn render(&self) -> Result<String> {
        let mut bytes = Vec::new();
        tokio::io::stdin().read_to_end(&mut bytes).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Plain GET of a URL. Script-driven pages need a browser-backed renderer.
pub struct HttpRenderer {
    client: Client,
    url: String,
}

impl HttpRenderer {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(DEFAULT_USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl Renderer for HttpRenderer {
    fn name(&self) -> &str {
        &self.url
    }

    async fn render(&self) -> Result<String> {
        info!(url = %self.url, "fetching page");
        let response = self.client.get(&self.url).send().await?;

        if !response.status().is_success() {
            return Err(ExtractError::Render {
                source_name: self.url.clone(),
                message: format!("request failed with status: {}", response.status()),
            });
        }

        let text = response.text().await?;
        debug!(url = %self.url, bytes = text.len(), "page fetched");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_renderer() {
        let renderer = StaticRenderer::new("<p>hi</p>");
        assert_eq!(renderer.render().await.unwrap(), "<p>hi</p>");
        assert_eq!(renderer.name(), "static");
    }

    #[tokio::test]
    async fn test_file_renderer_reads_page() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.html");
        std::fs::write(&path, "<div>saved</div>").unwrap();
        let html = FileRenderer::new(&path).render().await.unwrap();
        assert_eq!(html, "<div>saved</div>");
    }

    #[tokio::test]
    async fn test_missing_file_is_render_error() {
        let renderer = FileRenderer::new("/definitely/not/here.html");
        let err = renderer.render().await.unwrap_err();
        assert!(matches!(err, ExtractError::Render { ref source_name, .. } if source_name.contains("here.html")));
    }

    #[tokio::test]
    async fn test_renderers_as_trait_objects() {
        let renderers: Vec<Box<dyn Renderer>> = vec![
            Box::new(StaticRenderer::new("a")),
            Box::new(HttpRenderer::new("http://127.0.0.1:9/").unwrap()),
        ];
        assert_eq!(renderers[0].name(), "static");
        assert_eq!(renderers[1].name(), "http://127.0.0.1:9/");
    }
}
