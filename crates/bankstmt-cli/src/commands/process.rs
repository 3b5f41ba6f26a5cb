//! Process command - extract transaction records from a single statement.

use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info};

use bankstmt_core::models::record::{
    FieldValue, RawRecord, FIELD_AMOUNT, FIELD_BALANCE, FIELD_DATE, FIELD_EXPENSE, FIELD_INCOME,
};
use bankstmt_core::{parsers, process_document, standardize, UNKNOWN_BANK};

use super::{build_detector, load_config};

/// Column ordering for tabular output. Extraction may add fields beyond
/// these; extras are appended in sorted order.
const PREFERRED_COLUMNS: &[&str] = &[
    FIELD_DATE,
    "交易描述",
    FIELD_AMOUNT,
    FIELD_INCOME,
    FIELD_EXPENSE,
    FIELD_BALANCE,
    "账户类型",
    "币种",
];

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input statement PDF
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Bank name, skipping detection
    #[arg(short, long)]
    bank: Option<String>,

    /// Emit raw parser output without normalization
    #[arg(long)]
    raw: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

pub fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    // Resolve the bank: explicit flag wins, otherwise detect
    let bank = match &args.bank {
        Some(bank) => bank.clone(),
        None => build_detector(&config).detect_or_unknown(&args.input),
    };

    if bank == UNKNOWN_BANK {
        anyhow::bail!(
            "Could not identify the issuing bank of {}. Pass --bank to name it explicitly.",
            args.input.display()
        );
    }

    let registry = parsers::registry();
    let parser = registry.get(&bank).map_err(|e| {
        anyhow::anyhow!(
            "{} (supported banks: {})",
            e,
            registry.supported_banks().join(", ")
        )
    })?;

    let records = process_document(&args.input, parser)?;
    let records = if args.raw { records } else { standardize(records) };

    let output = format_records(&records, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    println!(
        "{} {} records extracted from {} statement",
        style("✓").green(),
        records.len(),
        bank
    );

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

pub fn format_records(records: &[RawRecord], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(records)?),
        OutputFormat::Csv => format_csv(records),
        OutputFormat::Text => Ok(format_text(records)),
    }
}

/// Union of all record fields, preferred columns first, extras sorted.
fn column_order(records: &[RawRecord]) -> Vec<String> {
    let present: BTreeSet<&str> = records
        .iter()
        .flat_map(|r| r.keys().map(String::as_str))
        .collect();

    let mut columns: Vec<String> = PREFERRED_COLUMNS
        .iter()
        .filter(|c| present.contains(**c))
        .map(|c| (*c).to_string())
        .collect();
    columns.extend(
        present
            .iter()
            .filter(|c| !PREFERRED_COLUMNS.contains(*c))
            .map(|c| (*c).to_string()),
    );
    columns
}

fn field_text(value: Option<&FieldValue>) -> String {
    match value {
        Some(FieldValue::Text(s)) => s.clone(),
        Some(FieldValue::Number(n)) => n.to_string(),
        Some(FieldValue::Null) | None => String::new(),
    }
}

fn format_csv(records: &[RawRecord]) -> anyhow::Result<String> {
    let columns = column_order(records);

    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(&columns)?;
    for record in records {
        let row: Vec<String> = columns.iter().map(|c| field_text(record.get(c))).collect();
        wtr.write_record(&row)?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(records: &[RawRecord]) -> String {
    let columns = column_order(records);
    let mut output = String::new();

    for (i, record) in records.iter().enumerate() {
        output.push_str(&format!("Record {}:\n", i + 1));
        for column in &columns {
            let value = field_text(record.get(column));
            if !value.is_empty() {
                output.push_str(&format!("  {}: {}\n", column, value));
            }
        }
        output.push('\n');
    }

    output.push_str(&format!("Total: {} records\n", records.len()));
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(entries: &[(&str, FieldValue)]) -> RawRecord {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_column_order_prefers_known_fields() {
        let records = vec![record(&[
            ("自定义", FieldValue::from("x")),
            (FIELD_AMOUNT, FieldValue::Number(1.0)),
            (FIELD_DATE, FieldValue::from("2023-05-01")),
        ])];
        assert_eq!(column_order(&records), vec![FIELD_DATE, FIELD_AMOUNT, "自定义"]);
    }

    #[test]
    fn test_csv_output_has_header_and_rows() {
        let records = vec![record(&[
            (FIELD_DATE, FieldValue::from("2023-05-01")),
            (FIELD_AMOUNT, FieldValue::Number(1250.5)),
        ])];
        let csv = format_csv(&records).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("交易日期,交易金额"));
        assert_eq!(lines.next(), Some("2023-05-01,1250.5"));
    }

    #[test]
    fn test_null_fields_render_empty() {
        let records = vec![record(&[
            (FIELD_DATE, FieldValue::from("2023-05-01")),
            (FIELD_BALANCE, FieldValue::Null),
        ])];
        let csv = format_csv(&records).unwrap();
        assert!(csv.lines().nth(1).unwrap().ends_with(','));
    }
}
