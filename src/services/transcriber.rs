// src/services/transcriber.rs

//! Document-to-text transcription.

use std::path::Path;
use std::sync::Arc;

use crate::error::{AppError, Result};

/// File extensions the transcriber will attempt, lowercase.
const TRANSCRIBABLE_EXTENSIONS: [&str; 1] = ["pdf"];

/// Renders a document into per-page text.
pub trait PageRenderer: Send + Sync {
    fn render_pages(&self, bytes: &[u8]) -> Result<Vec<String>>;
}

/// PDF renderer backed by `pdf-extract`.
#[cfg(feature = "pdf")]
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfRenderer;

#[cfg(feature = "pdf")]
impl PageRenderer for PdfRenderer {
    fn render_pages(&self, bytes: &[u8]) -> Result<Vec<String>> {
        pdf_extract::extract_text_from_mem_by_pages(bytes)
            .map_err(|e| AppError::transcribe("<memory>", e))
    }
}

/// Whether a (sanitized) file name is a document we can transcribe.
pub fn is_transcribable(file_name: &str) -> bool {
    let lower = file_name.to_lowercase();
    TRANSCRIBABLE_EXTENSIONS
        .iter()
        .any(|ext| lower.ends_with(&format!(".{ext}")))
}

/// Join rendered pages with `--- Page N ---` markers, skipping blank pages.
pub fn format_pages(pages: &[String]) -> String {
    pages
        .iter()
        .enumerate()
        .filter(|(_, text)| !text.trim().is_empty())
        .map(|(i, text)| format!("--- Page {} ---\n{}", i + 1, text))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Produces plain-text transcripts of downloaded documents.
#[derive(Clone)]
pub struct Transcriber {
    renderer: Option<Arc<dyn PageRenderer>>,
}

impl Default for Transcriber {
    #[cfg(feature = "pdf")]
    fn default() -> Self {
        Self::new(Arc::new(PdfRenderer))
    }

    #[cfg(not(feature = "pdf"))]
    fn default() -> Self {
        Self::unavailable()
    }
}

impl Transcriber {
    pub fn new(renderer: Arc<dyn PageRenderer>) -> Self {
        Self {
            renderer: Some(renderer),
        }
    }

    /// A transcriber with no rendering capability; always yields empty text.
    pub fn unavailable() -> Self {
        Self { renderer: None }
    }

    /// Transcribe the file at `path`.
    ///
    /// Returns an empty string when rendering is unavailable or fails.
    pub async fn transcribe(&self, path: &Path) -> String {
        let Some(renderer) = &self.renderer else {
            log::warn!(
                "  Document rendering unavailable; skipping text extraction for {}",
                path.display()
            );
            return String::new();
        };

        match Self::render(Arc::clone(renderer), path).await {
            Ok(pages) => format_pages(&pages),
            Err(e) => {
                log::warn!("  Error extracting text from {}: {}", path.display(), e);
                String::new()
            }
        }
    }

    async fn render(renderer: Arc<dyn PageRenderer>, path: &Path) -> Result<Vec<String>> {
        let bytes = tokio::fs::read(path).await?;
        let display = path.display().to_string();

        // Renderers may panic on hostile input; a panic surfaces as a JoinError.
        tokio::task::spawn_blocking(move || renderer.render_pages(&bytes))
            .await
            .map_err(|e| AppError::transcribe(display, e))?
    }
}
