//! CLI subcommands and shared configuration helpers.

pub mod batch;
pub mod config;
pub mod detect;
pub mod process;

use std::path::{Path, PathBuf};

use bankstmt_core::{BankDetector, StmtConfig};

/// Default location of the persisted configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("bankstmt")
        .join("config.json")
}

/// Load configuration from an explicit path, the default location, or
/// fall back to defaults when no file exists.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<StmtConfig> {
    match config_path {
        Some(path) => Ok(StmtConfig::from_file(Path::new(path))?),
        None => {
            let path = default_config_path();
            if path.exists() {
                Ok(StmtConfig::from_file(&path)?)
            } else {
                Ok(StmtConfig::default())
            }
        }
    }
}

/// Detector over the builtin table, honoring the configured page budget,
/// with the configured bank mapping layered in front when present.
pub fn build_detector(config: &StmtConfig) -> BankDetector {
    let detector = BankDetector::default().with_pages(config.detect.pages);
    if config.bank_mapping.is_empty() {
        detector
    } else {
        detector.with_override(config.bank_mapping.clone())
    }
}
