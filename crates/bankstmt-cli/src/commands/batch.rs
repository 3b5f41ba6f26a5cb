//! Batch processing command for multiple statement files.

use std::collections::VecDeque;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use tracing::{debug, warn};

use bankstmt_core::models::record::RawRecord;
use bankstmt_core::{parsers, process_document, standardize, ParserRegistry, UNKNOWN_BANK};

use super::process::{format_records, OutputFormat};
use super::{build_detector, load_config};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Number of parallel workers
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    bank: String,
    records: Option<Vec<RawRecord>>,
    error: Option<String>,
    processing_time_ms: u64,
}

pub fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;

    // Expand glob pattern
    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
            ext.eq_ignore_ascii_case("pdf")
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    // Create output directory if specified
    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    // Set up progress bars
    let multi_progress = MultiProgress::new();
    let overall_pb = multi_progress.add(ProgressBar::new(files.len() as u64));
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")
            .unwrap()
            .progress_chars("=>-"),
    );

    let detector = build_detector(&config);
    let registry = parsers::registry();

    // Process files across a bounded worker pool
    let jobs = args.jobs.max(1).min(files.len());
    let queue: Mutex<VecDeque<(usize, PathBuf)>> =
        Mutex::new(files.into_iter().enumerate().collect());
    let slots: Mutex<Vec<Option<ProcessResult>>> = {
        let len = queue.lock().map(|q| q.len()).unwrap_or(0);
        Mutex::new((0..len).map(|_| None).collect())
    };
    let stop = AtomicBool::new(false);

    std::thread::scope(|scope| {
        for _ in 0..jobs {
            scope.spawn(|| loop {
                if stop.load(Ordering::Relaxed) {
                    break;
                }
                let next = {
                    let Ok(mut q) = queue.lock() else { break };
                    q.pop_front()
                };
                let Some((index, path)) = next else { break };

                let result = process_single_file(&path, &detector, &registry);
                if result.error.is_some() && !args.continue_on_error {
                    stop.store(true, Ordering::Relaxed);
                }
                if let Ok(mut slots) = slots.lock() {
                    slots[index] = Some(result);
                }
                overall_pb.inc(1);
            });
        }
    });

    overall_pb.finish_with_message("Complete");

    let results: Vec<ProcessResult> = slots
        .into_inner()
        .map_err(|_| anyhow::anyhow!("batch worker panicked"))?
        .into_iter()
        .flatten()
        .collect();

    if !args.continue_on_error {
        if let Some(failed) = results.iter().find(|r| r.error.is_some()) {
            anyhow::bail!(
                "Processing failed for {}: {}",
                failed.path.display(),
                failed.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    // Write per-file outputs
    let successful: Vec<_> = results.iter().filter(|r| r.records.is_some()).collect();
    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    for result in &successful {
        if let (Some(records), Some(output_dir)) = (&result.records, &args.output_dir) {
            let output_name = result
                .path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("statement");

            let extension = match args.format {
                OutputFormat::Json => "json",
                OutputFormat::Csv => "csv",
                OutputFormat::Text => "txt",
            };

            let output_path = output_dir.join(format!("{}.{}", output_name, extension));
            let content = format_records(records, args.format)?;

            fs::write(&output_path, content)?;
            debug!("Wrote output to {}", output_path.display());
        }
    }

    // Generate summary if requested
    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    // Print summary
    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(successful.len()).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

fn process_single_file(
    path: &PathBuf,
    detector: &bankstmt_core::BankDetector,
    registry: &ParserRegistry,
) -> ProcessResult {
    let file_start = Instant::now();
    let bank = detector.detect_or_unknown(path);

    let outcome = if bank == UNKNOWN_BANK {
        Err("could not identify the issuing bank".to_string())
    } else {
        registry
            .get(&bank)
            .map_err(|e| e.to_string())
            .and_then(|parser| process_document(path, parser).map_err(|e| e.to_string()))
            .map(standardize)
    };

    let processing_time_ms = file_start.elapsed().as_millis() as u64;

    match outcome {
        Ok(records) => ProcessResult {
            path: path.clone(),
            bank,
            records: Some(records),
            error: None,
            processing_time_ms,
        },
        Err(message) => {
            warn!("Failed to process {}: {}", path.display(), message);
            ProcessResult {
                path: path.clone(),
                bank,
                records: None,
                error: Some(message),
                processing_time_ms,
            }
        }
    }
}

fn write_summary(path: &PathBuf, results: &[ProcessResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "bank",
        "records",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");

        if let Some(records) = &result.records {
            wtr.write_record([
                filename,
                "success",
                &result.bank,
                &records.len().to_string(),
                &result.processing_time_ms.to_string(),
                "",
            ])?;
        } else {
            wtr.write_record([
                filename,
                "error",
                &result.bank,
                "",
                &result.processing_time_ms.to_string(),
                result.error.as_deref().unwrap_or(""),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}
