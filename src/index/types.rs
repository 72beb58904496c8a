use crate::error::{Result, SearchError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Unique identifier for a document in the index
pub type DocId = u32;

/// Zero-based word position inside a document
pub type Position = u32;

/// Occurrences of one word: document -> positions in ingestion order
pub type Postings = BTreeMap<DocId, Vec<Position>>;

/// Default end-of-word sentinel
pub const DEFAULT_END_INDICATOR: char = '$';

/// Document entry in the document table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub doc_id: DocId,
    /// File name the document was read from
    pub name: String,
    /// Number of words ingested for this document
    pub word_count: u32,
}

/// Settings fixed for the lifetime of an index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Symbol appended to every word; may not occur inside any indexed word
    pub end_indicator: char,
    pub case_sensitive: bool,
    /// Strip `. , ! : ; ? ( )` from words before indexing
    pub ignore_punctuation: bool,
    /// Maximum number of documents in a ranked report
    pub maximum_report: usize,
    /// Only files with this extension are indexed
    pub file_extension: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            end_indicator: DEFAULT_END_INDICATOR,
            case_sensitive: false,
            ignore_punctuation: true,
            maximum_report: 10,
            file_extension: "txt".to_string(),
        }
    }
}

impl SearchConfig {
    pub fn validate(&self) -> Result<()> {
        if self.maximum_report == 0 {
            return Err(SearchError::InvalidConfig(
                "maximum_report must be a positive integer".to_string(),
            ));
        }
        if self.end_indicator.is_alphanumeric() || self.end_indicator.is_whitespace() {
            return Err(SearchError::InvalidConfig(format!(
                "end_indicator {:?} is not allowed: letters, digits and whitespace cannot be used, pick a symbol such as $ or #",
                self.end_indicator
            )));
        }
        if self.file_extension.is_empty() {
            return Err(SearchError::InvalidConfig(
                "file_extension must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Apply one `key = value` line of the settings dialect
    pub fn apply_setting(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "case_sensitive" => self.case_sensitive = parse_flag(key, value)?,
            "ignore_punctuation" => self.ignore_punctuation = parse_flag(key, value)?,
            "end_indicator" => {
                let mut chars = value.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => self.end_indicator = c,
                    _ => {
                        return Err(SearchError::InvalidConfig(
                            "end_indicator must be a single character".to_string(),
                        ));
                    }
                }
            }
            "maximum_report" => {
                self.maximum_report = value.parse().map_err(|_| {
                    SearchError::InvalidConfig("maximum_report must be an integer".to_string())
                })?
            }
            "file_extension" => self.file_extension = value.trim_start_matches('.').to_string(),
            _ => {
                return Err(SearchError::InvalidConfig(format!(
                    "setting {:?} not recognized",
                    key
                )));
            }
        }
        Ok(())
    }

    /// Human readable listing used by the settings dialog
    pub fn describe(&self) -> String {
        format!(
            "case_sensitive = {}\nend_indicator = {}\nmaximum_report = {}\nignore_punctuation = {}\nfile_extension = {}",
            self.case_sensitive,
            self.end_indicator,
            self.maximum_report,
            self.ignore_punctuation,
            self.file_extension
        )
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value {
        "True" | "true" => Ok(true),
        "False" | "false" => Ok(false),
        _ => Err(SearchError::InvalidConfig(format!(
            "{} must be either True or False",
            key
        ))),
    }
}
