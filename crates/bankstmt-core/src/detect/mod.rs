//! Bank identification from statement text and file names.
//!
//! Only the first couple of pages are read, since the issuing bank's name
//! sits near the start of a statement. Classification runs in priority
//! order (caller-supplied override keywords, builtin keywords, fuzzy
//! score, file name) and the first structural match wins.

mod fuzzy;

pub use fuzzy::partial_ratio;

use std::path::Path;

use tracing::{debug, warn};

use crate::error::PdfError;
use crate::models::config::BankKeywordMap;
use crate::pdf::{self, ExtractOptions};

/// Sentinel identity for statements no rule matched.
pub const UNKNOWN_BANK: &str = "未知";

/// Leading pages read for identification.
pub const DETECT_PAGES: usize = 2;

/// Documented acceptance bar for fuzzy scores.
///
/// Kept for reference only: the shipped control flow accepts any score
/// above zero before this bar is consulted, and enforcing it would change
/// classification outcomes for existing statements.
pub const FUZZY_THRESHOLD: u8 = 80;

/// How a bank identity was established.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchSource {
    /// Caller-supplied mapping, exact substring.
    Override,
    /// Builtin table, exact substring.
    Keyword,
    /// Builtin table, best fuzzy partial-match score.
    Fuzzy { score: u8 },
    /// Builtin table matched against the file name.
    FileName,
}

/// Outcome of classifying readable statement text.
#[derive(Debug, Clone, PartialEq)]
pub enum BankMatch {
    Named { bank: String, source: MatchSource },
    Unknown,
}

impl BankMatch {
    /// Bank name, falling back to [`UNKNOWN_BANK`].
    pub fn bank_name(&self) -> &str {
        match self {
            BankMatch::Named { bank, .. } => bank,
            BankMatch::Unknown => UNKNOWN_BANK,
        }
    }
}

/// Bank identifier over an immutable keyword table.
pub struct BankDetector {
    keywords: BankKeywordMap,
    override_map: Option<BankKeywordMap>,
    pages: usize,
}

impl BankDetector {
    pub fn new(keywords: BankKeywordMap) -> Self {
        Self {
            keywords,
            override_map: None,
            pages: DETECT_PAGES,
        }
    }

    /// Caller-supplied mapping checked before the builtin table, exact
    /// substring only. Entry order encodes priority.
    pub fn with_override(mut self, mapping: BankKeywordMap) -> Self {
        self.override_map = Some(mapping);
        self
    }

    /// Number of leading pages [`BankDetector::detect`] reads, defaulting
    /// to [`DETECT_PAGES`].
    pub fn with_pages(mut self, pages: usize) -> Self {
        self.pages = pages;
        self
    }

    /// Identify the issuing bank of the statement at `path`.
    ///
    /// Reads the configured number of leading pages. An unreadable
    /// document is an explicit error so callers can tell "could not read
    /// the document" from "read fine, nothing matched".
    pub fn detect(&self, path: &Path) -> Result<BankMatch, PdfError> {
        let text = pdf::extract_text(path, &ExtractOptions::first_pages(self.pages))?;
        let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        Ok(self.classify(&text, file_name))
    }

    /// [`BankDetector::detect`] with an always-answers surface: extraction
    /// failures are logged and reported as [`UNKNOWN_BANK`].
    pub fn detect_or_unknown(&self, path: &Path) -> String {
        match self.detect(path) {
            Ok(m) => m.bank_name().to_string(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "bank detection failed, reporting unknown");
                UNKNOWN_BANK.to_string()
            }
        }
    }

    /// Classify already-extracted text, first match wins:
    ///
    /// 1. override mapping, lowercase substring;
    /// 2. builtin table, lowercase substring;
    /// 3. best fuzzy score over the whole builtin table, any score > 0;
    /// 4. builtin keywords against the file name;
    /// 5. [`BankMatch::Unknown`].
    pub fn classify(&self, text: &str, file_name: &str) -> BankMatch {
        let haystack = text.to_lowercase();

        if let Some(mapping) = &self.override_map {
            for entry in mapping.entries() {
                for keyword in &entry.keywords {
                    if !keyword.is_empty() && haystack.contains(&keyword.to_lowercase()) {
                        debug!(bank = %entry.bank, keyword = %keyword, "override keyword match");
                        return BankMatch::Named {
                            bank: entry.bank.clone(),
                            source: MatchSource::Override,
                        };
                    }
                }
            }
        }

        let mut best: Option<(&str, u8)> = None;
        for entry in self.keywords.entries() {
            for keyword in &entry.keywords {
                let needle = keyword.to_lowercase();
                if needle.is_empty() {
                    continue;
                }
                if haystack.contains(&needle) {
                    debug!(bank = %entry.bank, keyword = %keyword, "keyword match");
                    return BankMatch::Named {
                        bank: entry.bank.clone(),
                        source: MatchSource::Keyword,
                    };
                }

                let score = partial_ratio(&needle, &haystack);
                if best.is_none_or(|(_, s)| score > s) {
                    best = Some((&entry.bank, score));
                }
            }
        }

        // Any positive score is accepted here; FUZZY_THRESHOLD is the
        // documented bar but this check runs first and short-circuits it.
        if let Some((bank, score)) = best {
            if score > 0 {
                debug!(bank, score, threshold = FUZZY_THRESHOLD, "fuzzy match accepted");
                return BankMatch::Named {
                    bank: bank.to_string(),
                    source: MatchSource::Fuzzy { score },
                };
            }
        }

        let lower_name = file_name.to_lowercase();
        if !lower_name.is_empty() {
            for entry in self.keywords.entries() {
                for keyword in &entry.keywords {
                    if !keyword.is_empty() && lower_name.contains(&keyword.to_lowercase()) {
                        debug!(bank = %entry.bank, keyword = %keyword, "file name match");
                        return BankMatch::Named {
                            bank: entry.bank.clone(),
                            source: MatchSource::FileName,
                        };
                    }
                }
            }
        }

        BankMatch::Unknown
    }
}

impl Default for BankDetector {
    fn default() -> Self {
        Self::new(BankKeywordMap::builtin())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::BankKeywords;

    fn override_map(bank: &str, keyword: &str) -> BankKeywordMap {
        BankKeywordMap::new(vec![BankKeywords {
            bank: bank.to_string(),
            keywords: vec![keyword.to_string()],
        }])
        .unwrap()
    }

    #[test]
    fn test_builtin_substring_match() {
        let detector = BankDetector::default();
        let result = detector.classify("尊敬的客户，感谢使用汇丰银行的月结单服务", "202305.pdf");
        assert_eq!(
            result,
            BankMatch::Named {
                bank: "汇丰银行".to_string(),
                source: MatchSource::Keyword,
            }
        );
    }

    #[test]
    fn test_substring_is_case_insensitive() {
        let detector = BankDetector::default();
        let result = detector.classify("statement issued by hsbc hong kong", "202305.pdf");
        assert_eq!(result.bank_name(), "汇丰银行");
    }

    #[test]
    fn test_override_beats_builtin_and_fuzzy() {
        let detector =
            BankDetector::default().with_override(override_map("我的银行", "特殊关键词"));
        let result = detector.classify("本月结单 特殊关键词 HSBC", "202305.pdf");
        assert_eq!(
            result,
            BankMatch::Named {
                bank: "我的银行".to_string(),
                source: MatchSource::Override,
            }
        );
    }

    #[test]
    fn test_override_order_encodes_priority() {
        let mapping = BankKeywordMap::new(vec![
            BankKeywords {
                bank: "第一银行".to_string(),
                keywords: vec!["shared".to_string()],
            },
            BankKeywords {
                bank: "第二银行".to_string(),
                keywords: vec!["shared".to_string()],
            },
        ])
        .unwrap();
        let detector = BankDetector::default().with_override(mapping);
        let result = detector.classify("shared marker text", "x.pdf");
        assert_eq!(result.bank_name(), "第一银行");
    }

    #[test]
    fn test_low_fuzzy_score_still_matches() {
        // No substring match; best fuzzy score is 75 for "hsbc", below
        // FUZZY_THRESHOLD, accepted anyway.
        let detector = BankDetector::default();
        let result = detector.classify("hsbz", "1234.pdf");
        assert_eq!(
            result,
            BankMatch::Named {
                bank: "汇丰银行".to_string(),
                source: MatchSource::Fuzzy { score: 75 },
            }
        );
    }

    #[test]
    fn test_file_name_fallback() {
        let detector = BankDetector::default();
        let result = detector.classify("0123456789", "hsbc_statement_may.pdf");
        assert_eq!(
            result,
            BankMatch::Named {
                bank: "汇丰银行".to_string(),
                source: MatchSource::FileName,
            }
        );
    }

    #[test]
    fn test_empty_text_and_unmatched_name_is_unknown() {
        let detector = BankDetector::default();
        let result = detector.classify("", "1234.pdf");
        assert_eq!(result, BankMatch::Unknown);
        assert_eq!(result.bank_name(), UNKNOWN_BANK);
    }

    #[test]
    fn test_empty_keyword_in_table_never_matches() {
        let table = BankKeywordMap::new(vec![BankKeywords {
            bank: "甲银行".to_string(),
            keywords: vec![String::new(), "zzz".to_string()],
        }])
        .unwrap();
        let detector = BankDetector::new(table);
        assert_eq!(detector.classify("完全无关的文本", "1234.pdf"), BankMatch::Unknown);
    }

    #[test]
    fn test_configured_page_budget_limits_detection() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("1234.pdf");
        std::fs::write(
            &path,
            crate::pdf::test_support::pdf_with_text("HSBC Hong Kong statement"),
        )
        .unwrap();

        let detector = BankDetector::default();
        assert_eq!(detector.detect(&path).unwrap().bank_name(), "汇丰银行");

        // A zero-page budget leaves no text to classify and the file name
        // carries no keyword, so nothing matches.
        let detector = BankDetector::default().with_pages(0);
        assert_eq!(detector.detect(&path).unwrap(), BankMatch::Unknown);
    }

    #[test]
    fn test_detect_on_unreadable_document_is_error() {
        let detector = BankDetector::default();
        let err = detector
            .detect(Path::new("/nonexistent/statement.pdf"))
            .unwrap_err();
        assert!(matches!(err, PdfError::Parse(_)));
    }

    #[test]
    fn test_detect_or_unknown_swallows_extraction_failure() {
        let detector = BankDetector::default();
        let bank = detector.detect_or_unknown(Path::new("/nonexistent/statement.pdf"));
        assert_eq!(bank, UNKNOWN_BANK);
    }
}
