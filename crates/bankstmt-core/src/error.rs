//! Error types for the bankstmt-core library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the bankstmt library.
#[derive(Error, Debug)]
pub enum StmtError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Statement processing error.
    #[error("processing error: {0}")]
    Processing(#[from] ProcessingError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,
}

/// Errors surfaced by the extraction dispatcher.
///
/// `UnsupportedBank` is a wiring defect on the caller's side and is kept
/// distinct from data errors raised while reading or parsing a statement.
#[derive(Error, Debug)]
pub enum ProcessingError {
    /// No statement parser is registered for the given bank.
    #[error("no statement parser registered for bank: {0}")]
    UnsupportedBank(String),

    /// The statement document could not be opened.
    #[error("failed to open {}: {source}", path.display())]
    Document { path: PathBuf, source: PdfError },

    /// A bank parser failed while extracting records. Only the
    /// human-readable cause is carried; the original error is logged at
    /// the failure site.
    #[error("failed to process {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },
}

/// Error raised by a [`crate::process::BankStatementParser`] implementation.
#[derive(Error, Debug)]
#[error("{0}")]
pub struct ParserError(pub String);

impl ParserError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl From<PdfError> for ParserError {
    fn from(err: PdfError) -> Self {
        Self(err.to_string())
    }
}

/// Result type for the bankstmt library.
pub type Result<T> = std::result::Result<T, StmtError>;
