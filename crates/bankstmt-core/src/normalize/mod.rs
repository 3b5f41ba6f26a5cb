//! Normalization of raw records into the canonical transaction schema.
//!
//! `standardize` is total over its input: malformed dates pass through
//! unchanged, malformed amounts coerce to `0.0`, and the output always
//! has the input's length and order. A batch is never aborted by one bad
//! record.

use chrono::NaiveDate;
use tracing::trace;

use crate::models::record::{
    FieldValue, RawRecord, FIELD_AMOUNT, FIELD_DATE, FIELD_EXPENSE, FIELD_INCOME, MONETARY_FIELDS,
};

/// Date patterns tried in order; the first one that parses wins.
const DATE_PATTERNS: [&str; 6] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y年%m月%d日",
    "%Y.%m.%d",
    "%d-%m-%Y",
    "%d/%m/%Y",
];

/// Rewrite `records` into the canonical schema: `交易日期` as
/// `YYYY-MM-DD`, the monetary fields as numbers, and an income/expense
/// split synthesized from a signed `交易金额` when neither side is
/// present. One-to-one and order-preserving.
pub fn standardize(records: Vec<RawRecord>) -> Vec<RawRecord> {
    records.into_iter().map(standardize_record).collect()
}

fn standardize_record(mut record: RawRecord) -> RawRecord {
    if let Some(value) = record.get_mut(FIELD_DATE) {
        if let FieldValue::Text(raw) = value {
            if let Some(date) = normalize_date(raw) {
                *value = FieldValue::Text(date);
            }
        }
    }

    for field in MONETARY_FIELDS {
        if let Some(value) = record.get_mut(field) {
            *value = FieldValue::Number(coerce_amount(value));
        }
    }

    let has_split =
        record.contains_key(FIELD_INCOME) || record.contains_key(FIELD_EXPENSE);
    if !has_split {
        if let Some(amount) = record.get(FIELD_AMOUNT).and_then(FieldValue::as_number) {
            let (income, expense) = if amount > 0.0 {
                (amount, 0.0)
            } else {
                (0.0, amount.abs())
            };
            record.insert(FIELD_INCOME.to_string(), FieldValue::Number(income));
            record.insert(FIELD_EXPENSE.to_string(), FieldValue::Number(expense));
        }
    }

    record
}

/// First-match parse of `raw` against [`DATE_PATTERNS`], rendered as
/// `YYYY-MM-DD`. `None` when no pattern fits; the caller keeps the raw
/// value in that case.
pub fn normalize_date(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    for pattern in DATE_PATTERNS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, pattern) {
            return Some(date.format("%Y-%m-%d").to_string());
        }
    }
    trace!(raw, "no date pattern matched");
    None
}

/// Coerce a raw field value to a number: keep digits, `.` and `-`, parse
/// as float, and default to `0.0` for anything unparseable or missing.
pub fn coerce_amount(value: &FieldValue) -> f64 {
    match value {
        FieldValue::Number(n) => *n,
        FieldValue::Null => 0.0,
        FieldValue::Text(raw) => {
            let cleaned: String = raw
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
                .collect();
            cleaned.parse().unwrap_or(0.0)
        }
    }
}
