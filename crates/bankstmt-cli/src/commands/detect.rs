//! Detect command - identify the issuing bank of a statement.

use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::debug;

use bankstmt_core::pdf::ExtractOptions;
use bankstmt_core::{BankMatch, MatchSource};

use super::{build_detector, load_config};

/// Arguments for the detect command.
#[derive(Args)]
pub struct DetectArgs {
    /// Input statement PDF
    #[arg(required = true)]
    input: PathBuf,

    /// Emit machine-readable JSON instead of plain text
    #[arg(long)]
    json: bool,
}

pub fn run(args: DetectArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let detector = build_detector(&config);

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let pages = ExtractOptions::first_pages(config.detect.pages);
    let text = bankstmt_core::extract_text(&args.input, &pages)?;
    debug!(chars = text.len(), "extracted identification text");

    let file_name = args
        .input
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    let result = detector.classify(&text, file_name);

    if args.json {
        println!(
            "{}",
            serde_json::json!({
                "file": args.input.display().to_string(),
                "bank": result.bank_name(),
                "matched": matches!(result, BankMatch::Named { .. }),
                "source": source_label(&result),
            })
        );
        return Ok(());
    }

    match &result {
        BankMatch::Named { bank, .. } => {
            println!(
                "{} {} ({})",
                style("✓").green(),
                bank,
                source_label(&result).unwrap_or("unknown")
            );
        }
        BankMatch::Unknown => {
            println!(
                "{} {}",
                style("✗").red(),
                style("no bank matched").yellow()
            );
        }
    }

    Ok(())
}

fn source_label(result: &BankMatch) -> Option<&'static str> {
    match result {
        BankMatch::Named { source, .. } => Some(match source {
            MatchSource::Override => "configured mapping",
            MatchSource::Keyword => "keyword",
            MatchSource::Fuzzy { .. } => "fuzzy match",
            MatchSource::FileName => "file name",
        }),
        BankMatch::Unknown => None,
    }
}
