//! Raw and canonical transaction record types.
//!
//! Bank parsers produce free-form records: a mapping from bank-specific
//! field names to values. The normalizer rewrites the date field and the
//! monetary fields in place and leaves every other field untouched, so
//! both shapes share one record type. After normalization every monetary
//! field is guaranteed to hold a [`FieldValue::Number`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Transaction date field, rewritten to `YYYY-MM-DD` by the normalizer.
pub const FIELD_DATE: &str = "交易日期";
/// Signed transaction amount.
pub const FIELD_AMOUNT: &str = "交易金额";
/// Income component of a transaction.
pub const FIELD_INCOME: &str = "收入金额";
/// Expense component of a transaction.
pub const FIELD_EXPENSE: &str = "支出金额";
/// Running account balance.
pub const FIELD_BALANCE: &str = "账户余额";

/// The monetary fields that are always numeric after normalization.
pub const MONETARY_FIELDS: [&str; 4] = [FIELD_AMOUNT, FIELD_INCOME, FIELD_EXPENSE, FIELD_BALANCE];

/// A single field value as produced by a bank parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Raw text as read from the statement.
    Text(String),
    /// Numeric value.
    Number(f64),
    /// Missing value.
    Null,
}

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

/// Free-form transaction record: field name to value.
pub type RawRecord = BTreeMap<String, FieldValue>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_value_serde_untagged() {
        let mut record = RawRecord::new();
        record.insert(FIELD_DATE.to_string(), FieldValue::from("2023-05-01"));
        record.insert(FIELD_AMOUNT.to_string(), FieldValue::from(1250.5));
        record.insert("备注".to_string(), FieldValue::Null);

        let json = serde_json::to_string(&record).unwrap();
        let back: RawRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_field_value_accessors() {
        assert_eq!(FieldValue::from("abc").as_str(), Some("abc"));
        assert_eq!(FieldValue::from(1.5).as_number(), Some(1.5));
        assert_eq!(FieldValue::Null.as_str(), None);
        assert_eq!(FieldValue::Null.as_number(), None);
    }
}
