//! Configuration structures: keyword tables and the persisted app config.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::StmtError;

/// One bank and the keywords that identify it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankKeywords {
    pub bank: String,
    pub keywords: Vec<String>,
}

/// Ordered bank-name → keyword-list table.
///
/// Entry order is significant: when keyword sets could overlap, the
/// earlier entry wins. Keyword matching is case-insensitive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BankKeywordMap {
    entries: Vec<BankKeywords>,
}

impl BankKeywordMap {
    /// Build a table, rejecting entries without a usable keyword: every
    /// bank must map to at least one non-empty keyword.
    pub fn new(entries: Vec<BankKeywords>) -> crate::error::Result<Self> {
        for entry in &entries {
            if !entry.keywords.iter().any(|k| !k.is_empty()) {
                return Err(StmtError::Config(format!(
                    "bank {} has no usable keyword",
                    entry.bank
                )));
            }
        }
        Ok(Self { entries })
    }

    /// The builtin identification table.
    pub fn builtin() -> Self {
        let table: [(&str, &[&str]); 7] = [
            (
                "玉山银行",
                &[
                    "玉山银行",
                    "玉山",
                    "E.SUN",
                    "E. SUN",
                    "E.SUN Bank",
                    "E. SUN BANK",
                    "E.SUN Commercial Bank",
                    "E. SUN COMMERCIAL BANK",
                    "ESUN",
                    "ESUNHKHH",
                    "玉山銀行",
                ],
            ),
            ("渣打银行", &["渣打", "SDB", "Shanghaidi Bank"]),
            (
                "汇丰银行",
                &["中国汇丰银行", "汇丰", "HSBC", "HongKong and Shanghai Banking Corporation"],
            ),
            ("南洋银行", &["中国南洋银行", "南洋", "NBC", "National Bank of China"]),
            (
                "恒生银行",
                &["中国恒生银行", "恒生", "HSBC", "HongKong and Shanghai Banking Corporation"],
            ),
            (
                "中银香港",
                &["中国中银香港", "中银", "HSBC", "HongKong and Shanghai Banking Corporation"],
            ),
            ("东亚银行", &["东亚银行", "东亚", "Eastern Asia Bank"]),
        ];

        let entries = table
            .into_iter()
            .map(|(bank, keywords)| BankKeywords {
                bank: bank.to_string(),
                keywords: keywords.iter().map(|k| k.to_string()).collect(),
            })
            .collect();

        Self { entries }
    }

    pub fn entries(&self) -> &[BankKeywords] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Persisted application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StmtConfig {
    /// Caller-supplied bank mapping, checked before the builtin table.
    pub bank_mapping: BankKeywordMap,

    /// Bank identification settings.
    pub detect: DetectConfig,

    /// Default directory for generated output files.
    pub output_dir: Option<PathBuf>,
}

impl Default for StmtConfig {
    fn default() -> Self {
        Self {
            bank_mapping: BankKeywordMap::default(),
            detect: DetectConfig::default(),
            output_dir: None,
        }
    }
}

/// Bank identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectConfig {
    /// Leading pages read for identification.
    pub pages: usize,
}

impl Default for DetectConfig {
    fn default() -> Self {
        Self {
            pages: crate::detect::DETECT_PAGES,
        }
    }
}

impl StmtConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)
    }
}
