//! Extraction dispatch: resolving a bank identity to a parser and
//! validating its output.

use std::path::Path;

use tracing::{error, info};

use crate::error::{ParserError, ProcessingError};
use crate::models::record::RawRecord;
use crate::pdf::StatementDocument;

/// What a bank parser hands back: either the transaction records alone,
/// or records plus per-account-type summary rows.
#[derive(Debug)]
pub enum RecordsResult {
    Records(Vec<RawRecord>),
    WithAccountTypes(Vec<RawRecord>, Vec<RawRecord>),
}

impl RecordsResult {
    /// The primary records component.
    pub fn into_records(self) -> Vec<RawRecord> {
        match self {
            RecordsResult::Records(records) => records,
            RecordsResult::WithAccountTypes(records, _) => records,
        }
    }
}

/// A bank-specific statement parser.
///
/// Implementations read an opened statement and produce raw records with
/// bank-specific field names; normalization happens downstream.
pub trait BankStatementParser: Send + Sync {
    /// The bank this parser understands.
    fn bank_name(&self) -> &str;

    /// Extract raw transaction records from an opened statement.
    fn parse(&self, doc: &StatementDocument) -> Result<RecordsResult, ParserError>;
}

/// Ordered parser registry keyed by bank name.
#[derive(Default)]
pub struct ParserRegistry {
    parsers: Vec<Box<dyn BankStatementParser>>,
}

impl ParserRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, parser: Box<dyn BankStatementParser>) {
        self.parsers.push(parser);
    }

    /// Resolve a bank name to its parser. A miss is a wiring defect on
    /// the caller's side, reported as a configuration error naming the
    /// bank; no document I/O has happened at that point.
    pub fn get(&self, bank: &str) -> Result<&dyn BankStatementParser, ProcessingError> {
        self.parsers
            .iter()
            .map(|p| p.as_ref())
            .find(|p| p.bank_name() == bank)
            .ok_or_else(|| ProcessingError::UnsupportedBank(bank.to_string()))
    }

    pub fn supported_banks(&self) -> Vec<&str> {
        self.parsers.iter().map(|p| p.bank_name()).collect()
    }
}

/// Open the statement at `path`, run `parser` over it and return the raw
/// records.
///
/// The document is opened exactly once and released on every exit path.
/// Parser failures are logged with the offending path and re-raised as a
/// single [`ProcessingError::Parse`] carrying only a human-readable
/// cause.
pub fn process_document(
    path: &Path,
    parser: &dyn BankStatementParser,
) -> Result<Vec<RawRecord>, ProcessingError> {
    let doc = StatementDocument::open(path).map_err(|e| {
        error!(path = %path.display(), error = %e, "failed to open statement");
        ProcessingError::Document {
            path: path.to_path_buf(),
            source: e,
        }
    })?;

    match parser.parse(&doc) {
        Ok(result) => {
            let records = result.into_records();
            info!(
                path = %path.display(),
                bank = parser.bank_name(),
                records = records.len(),
                "statement parsed"
            );
            Ok(records)
        }
        Err(e) => {
            error!(
                path = %path.display(),
                bank = parser.bank_name(),
                error = %e,
                "statement parser failed"
            );
            Err(ProcessingError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record::FieldValue;

    struct FailingParser;

    impl BankStatementParser for FailingParser {
        fn bank_name(&self) -> &str {
            "测试银行"
        }

        fn parse(&self, _doc: &StatementDocument) -> Result<RecordsResult, ParserError> {
            Err(ParserError::new("table layout not recognized"))
        }
    }

    fn record(desc: &str) -> RawRecord {
        let mut r = RawRecord::new();
        r.insert("交易描述".to_string(), FieldValue::from(desc));
        r
    }

    #[test]
    fn test_registry_miss_is_configuration_error() {
        let registry = ParserRegistry::new();
        let err = registry.get("恒生银行").map(|_| ()).unwrap_err();
        match err {
            ProcessingError::UnsupportedBank(bank) => assert_eq!(bank, "恒生银行"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_registry_resolves_by_bank_name() {
        let mut registry = ParserRegistry::new();
        registry.register(Box::new(FailingParser));
        assert!(registry.get("测试银行").is_ok());
        assert_eq!(registry.supported_banks(), vec!["测试银行"]);
    }

    #[test]
    fn test_into_records_takes_primary_component() {
        let result = RecordsResult::WithAccountTypes(
            vec![record("salary")],
            vec![record("opening balance")],
        );
        let records = result.into_records();
        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0].get("交易描述"),
            Some(&FieldValue::from("salary"))
        );
    }

    #[test]
    fn test_unreadable_document_is_document_error() {
        let err =
            process_document(Path::new("/nonexistent/statement.pdf"), &FailingParser).unwrap_err();
        assert!(matches!(err, ProcessingError::Document { .. }));
    }

    #[test]
    fn test_parser_failure_carries_path_and_message_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stmt.pdf");
        std::fs::write(&path, crate::pdf::test_support::minimal_pdf()).unwrap();

        let err = process_document(&path, &FailingParser).unwrap_err();
        match err {
            ProcessingError::Parse { path: p, message } => {
                assert_eq!(p, path);
                assert!(message.contains("table layout not recognized"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
