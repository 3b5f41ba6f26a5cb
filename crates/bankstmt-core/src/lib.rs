//! Core library for bank statement processing.
//!
//! This crate provides:
//! - PDF text extraction for page-oriented statement documents
//! - Bank identification from statement text and file names
//! - Dispatch to bank-specific statement parsers
//! - Normalization of raw records into a canonical transaction schema

pub mod detect;
pub mod error;
pub mod models;
pub mod normalize;
pub mod parsers;
pub mod pdf;
pub mod process;

pub use detect::{BankDetector, BankMatch, MatchSource, DETECT_PAGES, FUZZY_THRESHOLD, UNKNOWN_BANK};
pub use error::{ParserError, PdfError, ProcessingError, Result, StmtError};
pub use models::config::{BankKeywordMap, BankKeywords, StmtConfig};
pub use models::record::{
    FieldValue, RawRecord, FIELD_AMOUNT, FIELD_BALANCE, FIELD_DATE, FIELD_EXPENSE, FIELD_INCOME,
    MONETARY_FIELDS,
};
pub use normalize::standardize;
pub use pdf::{extract_text, ExtractOptions, StatementDocument};
pub use process::{process_document, BankStatementParser, ParserRegistry, RecordsResult};
