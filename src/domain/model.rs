use crate::utils::error::{Result, ScrapeError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// One scraped item as a flat-ish JSON object. Keys stay sorted so repeated
/// runs produce the same column and key order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    pub data: BTreeMap<String, serde_json::Value>,
}

impl Record {
    /// Converts a typed listing into its record form. The item must serialize
    /// to a JSON object.
    pub fn from_item<T: Serialize>(item: &T) -> Result<Self> {
        match serde_json::to_value(item)? {
            serde_json::Value::Object(map) => Ok(Self {
                data: map.into_iter().collect(),
            }),
            other => Err(ScrapeError::ValidationError {
                message: format!("expected a JSON object, got {}", other),
            }),
        }
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(|v| v.as_str())
    }
}

/// How CSV columns are chosen for a dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnLayout {
    /// Sorted union of every flattened key seen in the records.
    SortedUnion,
    /// Exactly these columns, in this order.
    Fixed(Vec<String>),
}

/// Describes one output dataset: where it is written and what a valid
/// record must carry.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub source: &'static str,
    pub name: &'static str,
    /// Output path relative to the storage root, without extension.
    pub stem: String,
    pub required_fields: &'static [&'static str],
    pub columns: ColumnLayout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Json,
    Csv,
    Tsv,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Tsv => "tsv",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ScrapeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "tsv" => Ok(Self::Tsv),
            other => Err(ScrapeError::InvalidConfigValueError {
                field: "formats".to_string(),
                value: other.to_string(),
                reason: "Unsupported format. Valid formats: json, csv, tsv".to_string(),
            }),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub formats: Vec<OutputFormat>,
    /// Also bundle the written files into `<stem>.zip`.
    pub archive: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            formats: vec![OutputFormat::Json, OutputFormat::Csv],
            archive: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub processed_records: Vec<Record>,
    pub json_output: String,
    pub csv_output: String,
    pub tsv_output: Option<String>,
    /// Records dropped for missing required fields.
    pub skipped: usize,
}

#[derive(Debug, Clone, Default)]
pub struct LoadOutcome {
    /// Output stem as a displayable path (no extension).
    pub output_path: String,
    pub files: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub source: &'static str,
    pub dataset: &'static str,
    pub output_path: String,
    pub files: Vec<String>,
    pub records: Vec<Record>,
    pub skipped: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Sample {
        name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        phone: Option<String>,
    }

    #[test]
    fn test_record_from_item_keeps_sorted_keys() {
        let record = Record::from_item(&Sample {
            name: "Grand Hall".to_string(),
            phone: None,
        })
        .unwrap();

        assert_eq!(record.get_str("name"), Some("Grand Hall"));
        assert!(!record.data.contains_key("phone"));
    }

    #[test]
    fn test_record_from_non_object_fails() {
        assert!(Record::from_item(&vec![1, 2, 3]).is_err());
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!(" tsv ".parse::<OutputFormat>().unwrap(), OutputFormat::Tsv);
        assert!("xlsx".parse::<OutputFormat>().is_err());
    }
}
