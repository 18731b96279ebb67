//! Relation metadata parsing
//!
//! Turns the raw output of catalog inspection commands into structured values:
//! - `DESCRIBE TABLE EXTENDED` rows ([`describe`])
//! - the `information` text blob of `SHOW TABLE EXTENDED` ([`information`])
//!
//! Also holds the helpers used when building those commands and handling
//! their failures ([`identifiers`], [`errors`]) and the persist-docs diff
//! ([`docs`]).
//!
//! Parsing is lenient: unknown sections and malformed lines are kept as
//! metadata or skipped, never reported as errors.

pub mod describe;
pub mod docs;
pub mod errors;
pub mod identifiers;
pub mod information;

pub use describe::{parse_describe_extended, partition_columns};
pub use docs::{ColumnDocumentation, get_persist_doc_columns};
pub use errors::check_not_found_error;
pub use identifiers::{get_identifier_list_string, identifier_list_string_from_env};
pub use information::{InformationBlock, parse_columns_from_information, parse_information_block};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Metadata key holding the table owner
pub const KEY_TABLE_OWNER: &str = "Owner";

/// Metadata key holding the raw table statistics
pub const KEY_TABLE_STATISTICS: &str = "Statistics";

/// Metadata key holding the table provider (delta, parquet, ...)
pub const KEY_TABLE_PROVIDER: &str = "Provider";

/// A single cell of an engine result row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Text(String),
}

impl CellValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Integer(i) => write!(f, "{}", i),
            CellValue::Float(x) => write!(f, "{}", x),
            CellValue::Boolean(b) => write!(f, "{}", b),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Integer(value)
    }
}

/// One `(col_name, data_type)` row of `DESCRIBE TABLE EXTENDED` output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescribeRow {
    pub col_name: Option<String>,
    pub data_type: Option<CellValue>,
}

impl DescribeRow {
    pub fn new(col_name: Option<&str>, data_type: Option<CellValue>) -> Self {
        Self {
            col_name: col_name.map(str::to_string),
            data_type,
        }
    }

    /// Row whose both cells are text
    pub fn text(col_name: &str, data_type: &str) -> Self {
        Self::new(Some(col_name), Some(CellValue::from(data_type)))
    }
}

/// Table-level properties folded from the detail rows of a describe call.
///
/// Keys keep the position of their first insertion; a repeated key takes the
/// value of its last occurrence. A missing row key is stored under `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableMetadata {
    entries: IndexMap<Option<String>, Option<CellValue>>,
}

impl TableMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: Option<String>, value: Option<CellValue>) {
        self.entries.insert(key, value);
    }

    /// Value for a key; `None` when the key is absent or its value is null
    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.entries.get(&Some(key.to_string())).and_then(Option::as_ref)
    }

    pub fn contains_key(&self, key: Option<&str>) -> bool {
        self.entries.contains_key(&key.map(str::to_string))
    }

    /// Owner in string form; numeric owners are converted
    pub fn owner(&self) -> Option<String> {
        self.get(KEY_TABLE_OWNER).map(ToString::to_string)
    }

    pub fn statistics(&self) -> Option<String> {
        self.get(KEY_TABLE_STATISTICS).map(ToString::to_string)
    }

    pub fn provider(&self) -> Option<String> {
        self.get(KEY_TABLE_PROVIDER).map(ToString::to_string)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Option<&str>, Option<&CellValue>)> {
        self.entries
            .iter()
            .map(|(k, v)| (k.as_deref(), v.as_ref()))
    }
}

impl FromIterator<(Option<String>, Option<CellValue>)> for TableMetadata {
    fn from_iter<I: IntoIterator<Item = (Option<String>, Option<CellValue>)>>(iter: I) -> Self {
        let mut metadata = TableMetadata::new();
        for (key, value) in iter {
            metadata.insert(key, value);
        }
        metadata
    }
}
