//! Fallback parser for banks without a dedicated implementation.

use tracing::warn;

use crate::error::ParserError;
use crate::pdf::StatementDocument;
use crate::process::{BankStatementParser, RecordsResult};

/// Placeholder parser: accepts any statement and extracts nothing.
pub struct GenericParser {
    bank: String,
}

impl GenericParser {
    pub fn new(bank: impl Into<String>) -> Self {
        Self { bank: bank.into() }
    }
}

impl BankStatementParser for GenericParser {
    fn bank_name(&self) -> &str {
        &self.bank
    }

    fn parse(&self, doc: &StatementDocument) -> Result<RecordsResult, ParserError> {
        warn!(
            path = %doc.path().display(),
            bank = %self.bank,
            "no dedicated parser, returning no records"
        );
        Ok(RecordsResult::Records(Vec::new()))
    }
}
