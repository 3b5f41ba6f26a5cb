//! HSBC (HK) statement parser.
//!
//! HSBC statements carry up to three account sections (HKD current, HKD
//! savings and foreign-currency savings), each a run of transaction rows
//! under a section header. After PDF-to-text flattening a row looks like:
//!
//! ```text
//! 02/05/2023 SALARY PAYMENT                12,500.00    17,500.00
//! 05 May     CHEQUE 123456                 (1,200.00)   16,300.00
//! ```
//!
//! The trailing amount is the running balance when two amounts are
//! present; parenthesized amounts are withdrawals. Balance carry-over and
//! totals rows are filtered out of the transaction set and reported as
//! account summary rows instead.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::error::ParserError;
use crate::models::record::{FieldValue, RawRecord, FIELD_AMOUNT, FIELD_BALANCE, FIELD_DATE};
use crate::pdf::{ExtractOptions, StatementDocument};
use crate::process::{BankStatementParser, RecordsResult};

const HKD_CURRENT_KEYWORDS: &[&str] = &["HKD Current", "港元往来", "港币往来"];
const HKD_SAVINGS_KEYWORDS: &[&str] = &["HKD Savings", "港元储蓄", "港币储蓄"];
const FOREIGN_SAVINGS_KEYWORDS: &[&str] = &["Foreign Currency Savings", "外币储蓄"];
const CURRENCY_CODES: &[&str] = &["USD", "EUR", "GBP", "AUD", "CAD", "JPY", "CHF", "NZD", "SGD"];

/// Rows that are balance carry-over or totals, not transactions.
const SUMMARY_KEYWORDS: &[&str] = &[
    "Opening Balance",
    "Closing Balance",
    "账户结余",
    "期初余额",
    "期末余额",
    "Total No. of Deposits",
    "存入次数总计",
    "Total No. of Withdrawals",
    "提取次数总计",
    "Total Deposit Amount",
    "存入总额",
    "Total Withdrawal Amount",
    "提取总额",
];

lazy_static! {
    // 02/05/2023 SALARY PAYMENT 12,500.00 17,500.00
    static ref ROW_DMY: Regex = Regex::new(concat!(
        r"^\s*(?P<date>\d{1,2}/\d{1,2}/\d{4})\s+",
        r"(?P<desc>.+?)\s+",
        r"(?P<amount>\(?-?[\d,]+\.\d{2}\)?)",
        r"(?:\s+(?P<balance>-?[\d,]+\.\d{2}))?\s*$"
    ))
    .unwrap();

    // 05 May CHEQUE 123456 (1,200.00) 16,300.00
    static ref ROW_DAY_MONTH: Regex = Regex::new(concat!(
        r"^\s*(?P<day>\d{1,2})\s+(?P<mon>Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)\s+",
        r"(?P<desc>.+?)\s+",
        r"(?P<amount>\(?-?[\d,]+\.\d{2}\)?)",
        r"(?:\s+(?P<balance>-?[\d,]+\.\d{2}))?\s*$"
    ))
    .unwrap();

    // Statement period year, e.g. "01/05/2023 - 31/05/2023"
    static ref STATEMENT_YEAR: Regex = Regex::new(r"\b(20\d{2})\b").unwrap();
}

/// HSBC statement parser.
pub struct HsbcParser;

impl HsbcParser {
    pub fn new() -> Self {
        Self
    }

    /// Extract (transactions, account summary rows) from flattened
    /// statement text.
    pub fn parse_text(&self, text: &str) -> (Vec<RawRecord>, Vec<RawRecord>) {
        let statement_year = STATEMENT_YEAR
            .captures(text)
            .and_then(|caps| caps[1].parse::<i32>().ok());

        let mut records = Vec::new();
        let mut summaries = Vec::new();
        let mut account_type: Option<&'static str> = None;
        let mut currency = "HKD".to_string();

        for line in text.lines() {
            if let Some(row) = parse_row(line, statement_year) {
                let Some(account) = account_type else {
                    debug!(line, "transaction row outside an account section, skipped");
                    continue;
                };
                let record = row.into_record(account, &currency);
                if is_summary_row(&record) {
                    summaries.push(record);
                } else {
                    records.push(record);
                }
                continue;
            }

            if let Some(section) = section_for(line) {
                account_type = Some(section);
                currency = match section {
                    "外币储蓄" => currency_code(line).unwrap_or("USD").to_string(),
                    _ => "HKD".to_string(),
                };
                debug!(section, currency = %currency, "account section");
            }
        }

        (records, summaries)
    }
}

impl Default for HsbcParser {
    fn default() -> Self {
        Self::new()
    }
}

impl BankStatementParser for HsbcParser {
    fn bank_name(&self) -> &str {
        "汇丰银行"
    }

    fn parse(&self, doc: &StatementDocument) -> Result<RecordsResult, ParserError> {
        let text = doc.extract_text(&ExtractOptions::default())?;
        let (records, summaries) = self.parse_text(&text);

        if records.is_empty() {
            warn!(path = %doc.path().display(), "no transaction rows recognized");
        } else {
            info!(
                path = %doc.path().display(),
                records = records.len(),
                summaries = summaries.len(),
                "HSBC statement parsed"
            );
        }
        Ok(RecordsResult::WithAccountTypes(records, summaries))
    }
}

/// One recognized transaction row, before field naming.
struct Row {
    date: String,
    description: String,
    amount: String,
    balance: Option<String>,
}

impl Row {
    fn into_record(self, account_type: &str, currency: &str) -> RawRecord {
        let mut record = RawRecord::new();
        record.insert(FIELD_DATE.to_string(), FieldValue::Text(self.date));
        record.insert(
            "交易描述".to_string(),
            FieldValue::Text(self.description),
        );
        record.insert(FIELD_AMOUNT.to_string(), FieldValue::Text(self.amount));
        match self.balance {
            Some(balance) => {
                record.insert(FIELD_BALANCE.to_string(), FieldValue::Text(balance));
            }
            None => {
                record.insert(FIELD_BALANCE.to_string(), FieldValue::Null);
            }
        }
        record.insert(
            "账户类型".to_string(),
            FieldValue::Text(account_type.to_string()),
        );
        record.insert("币种".to_string(), FieldValue::Text(currency.to_string()));
        record
    }
}

fn parse_row(line: &str, statement_year: Option<i32>) -> Option<Row> {
    if let Some(caps) = ROW_DMY.captures(line) {
        return Some(Row {
            date: caps["date"].to_string(),
            description: caps["desc"].trim().to_string(),
            amount: signed_amount(&caps["amount"]),
            balance: caps.name("balance").map(|m| m.as_str().to_string()),
        });
    }

    if let Some(caps) = ROW_DAY_MONTH.captures(line) {
        let day: u32 = caps["day"].parse().ok()?;
        let month = month_number(&caps["mon"])?;
        // Without a statement year the raw "DD MMM" text is kept; the
        // normalizer leaves it unchanged downstream.
        let date = statement_year
            .and_then(|year| NaiveDate::from_ymd_opt(year, month, day))
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| format!("{} {}", &caps["day"], &caps["mon"]));
        return Some(Row {
            date,
            description: caps["desc"].trim().to_string(),
            amount: signed_amount(&caps["amount"]),
            balance: caps.name("balance").map(|m| m.as_str().to_string()),
        });
    }

    None
}

/// Parenthesized amounts are withdrawals: "(1,200.00)" becomes "-1,200.00".
fn signed_amount(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with('(') && trimmed.ends_with(')') {
        format!("-{}", &trimmed[1..trimmed.len() - 1])
    } else {
        trimmed.to_string()
    }
}

fn is_summary_row(record: &RawRecord) -> bool {
    let description = record
        .get("交易描述")
        .and_then(FieldValue::as_str)
        .unwrap_or_default()
        .to_lowercase();
    SUMMARY_KEYWORDS
        .iter()
        .any(|k| description.contains(&k.to_lowercase()))
}

fn section_for(line: &str) -> Option<&'static str> {
    let lower = line.to_lowercase();
    if HKD_CURRENT_KEYWORDS.iter().any(|k| lower.contains(&k.to_lowercase())) {
        return Some("港币往来");
    }
    if HKD_SAVINGS_KEYWORDS.iter().any(|k| lower.contains(&k.to_lowercase())) {
        return Some("港币储蓄");
    }
    if FOREIGN_SAVINGS_KEYWORDS.iter().any(|k| lower.contains(&k.to_lowercase()))
        || currency_code(line).is_some()
    {
        return Some("外币储蓄");
    }
    None
}

fn currency_code(line: &str) -> Option<&'static str> {
    CURRENCY_CODES.iter().copied().find(|code| line.contains(code))
}

fn month_number(mon: &str) -> Option<u32> {
    let month = match mon {
        "Jan" => 1,
        "Feb" => 2,
        "Mar" => 3,
        "Apr" => 4,
        "May" => 5,
        "Jun" => 6,
        "Jul" => 7,
        "Aug" => 8,
        "Sep" => 9,
        "Oct" => 10,
        "Nov" => 11,
        "Dec" => 12,
        _ => return None,
    };
    Some(month)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::standardize;
    use crate::models::record::{FIELD_EXPENSE, FIELD_INCOME};

    const SAMPLE: &str = r#"
汇丰银行 HSBC Bank
结单周期 01/05/2023 - 31/05/2023

港元往来 HKD Current
01/05/2023 Opening Balance 5,000.00
02/05/2023 SALARY PAYMENT 12,500.00 17,500.00
05 May CHEQUE 123456 (1,200.00) 16,300.00
31/05/2023 Closing Balance 16,300.00

外币储蓄 USD
10/05/2023 TT TRANSFER IN 300.00 300.00
"#;

    #[test]
    fn test_parse_text_extracts_rows() {
        let (records, summaries) = HsbcParser::new().parse_text(SAMPLE);
        assert_eq!(records.len(), 3);
        assert_eq!(summaries.len(), 2);

        assert_eq!(
            records[0].get(FIELD_DATE),
            Some(&FieldValue::from("02/05/2023"))
        );
        assert_eq!(
            records[0].get("交易描述"),
            Some(&FieldValue::from("SALARY PAYMENT"))
        );
        assert_eq!(
            records[0].get(FIELD_AMOUNT),
            Some(&FieldValue::from("12,500.00"))
        );
        assert_eq!(
            records[0].get(FIELD_BALANCE),
            Some(&FieldValue::from("17,500.00"))
        );
        assert_eq!(records[0].get("账户类型"), Some(&FieldValue::from("港币往来")));
        assert_eq!(records[0].get("币种"), Some(&FieldValue::from("HKD")));
    }

    #[test]
    fn test_day_month_row_takes_statement_year() {
        let (records, _) = HsbcParser::new().parse_text(SAMPLE);
        assert_eq!(
            records[1].get(FIELD_DATE),
            Some(&FieldValue::from("2023-05-05"))
        );
        assert_eq!(
            records[1].get(FIELD_AMOUNT),
            Some(&FieldValue::from("-1,200.00"))
        );
    }

    #[test]
    fn test_foreign_section_currency() {
        let (records, _) = HsbcParser::new().parse_text(SAMPLE);
        let foreign = &records[2];
        assert_eq!(foreign.get("账户类型"), Some(&FieldValue::from("外币储蓄")));
        assert_eq!(foreign.get("币种"), Some(&FieldValue::from("USD")));
    }

    #[test]
    fn test_balance_rows_become_summaries() {
        let (_, summaries) = HsbcParser::new().parse_text(SAMPLE);
        let descriptions: Vec<_> = summaries
            .iter()
            .map(|s| s.get("交易描述").and_then(FieldValue::as_str).unwrap())
            .collect();
        assert_eq!(descriptions, vec!["Opening Balance", "Closing Balance"]);
    }

    #[test]
    fn test_rows_outside_sections_are_skipped() {
        let (records, summaries) =
            HsbcParser::new().parse_text("01/05/2023 STRAY ROW 100.00 100.00\n");
        assert!(records.is_empty());
        assert!(summaries.is_empty());
    }

    #[test]
    fn test_output_normalizes_end_to_end() {
        let (records, _) = HsbcParser::new().parse_text(SAMPLE);
        let normalized = standardize(records);

        assert_eq!(
            normalized[0].get(FIELD_INCOME),
            Some(&FieldValue::Number(12500.0))
        );
        assert_eq!(
            normalized[1].get(FIELD_EXPENSE),
            Some(&FieldValue::Number(1200.0))
        );
        assert_eq!(
            normalized[1].get(FIELD_DATE),
            Some(&FieldValue::from("2023-05-05"))
        );
    }
}
