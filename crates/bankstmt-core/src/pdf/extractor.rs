//! Page-oriented text extraction using lopdf and pdf-extract.

use std::fs;
use std::path::{Path, PathBuf};

use lopdf::Document;
use tracing::debug;

use super::Result;
use crate::error::PdfError;

/// Page selection for text extraction.
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    /// Cap on the number of leading pages to read. `None` reads all pages.
    pub max_pages: Option<usize>,

    /// Explicit zero-based page indices. Takes precedence over
    /// `max_pages`; indices outside the valid range are skipped.
    pub pages: Option<Vec<usize>>,
}

impl ExtractOptions {
    /// Read only the first `n` pages.
    pub fn first_pages(n: usize) -> Self {
        Self {
            max_pages: Some(n),
            pages: None,
        }
    }

    /// Which of `page_count` pages the options select, in order.
    fn select(&self, page_count: usize) -> Vec<usize> {
        match &self.pages {
            Some(indices) => indices.iter().copied().filter(|&i| i < page_count).collect(),
            None => {
                let limit = self.max_pages.unwrap_or(page_count).min(page_count);
                (0..limit).collect()
            }
        }
    }
}

/// An opened statement PDF.
///
/// Owns the parsed document and the raw bytes pdf-extract reads from; all
/// resources are released when the value is dropped, on every exit path.
pub struct StatementDocument {
    document: Document,
    raw_data: Vec<u8>,
    path: PathBuf,
}

impl StatementDocument {
    /// Open a statement PDF from disk.
    pub fn open(path: &Path) -> Result<Self> {
        let data = fs::read(path).map_err(|e| PdfError::Parse(e.to_string()))?;
        Self::from_bytes(data, path)
    }

    fn from_bytes(data: Vec<u8>, path: &Path) -> Result<Self> {
        let mut document =
            Document::load_mem(&data).map_err(|e| PdfError::Parse(e.to_string()))?;
        let mut raw_data = data;

        // Handle PDFs with empty password encryption
        if document.is_encrypted() {
            if document.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("decrypted PDF with empty password");

            let mut decrypted = Vec::new();
            document
                .save_to(&mut decrypted)
                .map_err(|e| PdfError::Parse(format!("failed to save decrypted PDF: {}", e)))?;
            raw_data = decrypted;
        }

        if document.get_pages().is_empty() {
            return Err(PdfError::NoPages);
        }

        debug!(path = %path.display(), pages = document.get_pages().len(), "loaded PDF");
        Ok(Self {
            document,
            raw_data,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// Per-page text for the whole document. Pages with no extractable
    /// text come back as empty strings rather than errors.
    pub fn page_texts(&self) -> Result<Vec<String>> {
        pdf_extract::extract_text_from_mem_by_pages(&self.raw_data)
            .map_err(|e| PdfError::TextExtraction(e.to_string()))
    }

    /// Extract text for the selected page subset, pages joined with a
    /// blank line.
    pub fn extract_text(&self, options: &ExtractOptions) -> Result<String> {
        let pages = self.page_texts()?;
        let selected = options.select(pages.len());
        debug!(path = %self.path.display(), pages = selected.len(), "extracting text");

        let parts: Vec<&str> = selected.iter().map(|&i| pages[i].as_str()).collect();
        Ok(parts.join("\n\n"))
    }
}

/// Open `path` and extract text for the selected pages in one scoped call.
pub fn extract_text(path: &Path, options: &ExtractOptions) -> Result<String> {
    let document = StatementDocument::open(path)?;
    document.extract_text(options)
}
