//! `information` blob parsing
//!
//! `SHOW TABLE EXTENDED` returns one free-text blob per relation: flat
//! `Key: Value` lines followed by a `Schema: root` tree.
//!
//! ```text
//! Owner: root
//! Provider: delta
//! Statistics: 123456789 bytes
//! Schema: root
//!  |-- col1: decimal(22,0) (nullable = true)
//!  |-- struct_col: struct (nullable = true)
//!  |    |-- struct_inner_col: string (nullable = true)
//! ```
//!
//! Only top-level fields become column records; nested struct fields are
//! skipped.

use super::{KEY_TABLE_OWNER, KEY_TABLE_PROVIDER, KEY_TABLE_STATISTICS};
use crate::models::{ColumnDescriptor, ColumnRecord, Relation, TableStats};
use indexmap::IndexMap;

/// Line introducing the schema tree
const SCHEMA_ROOT: &str = "Schema: root";

/// Marker of a tree field line
const FIELD_MARKER: &str = " |-- ";

/// Indentation added per nesting level
const NESTING_INDENT: &str = " |   ";

/// Parsed `information` blob
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InformationBlock {
    /// `Key: Value` lines before the schema tree, first occurrence wins
    pub properties: IndexMap<String, String>,
    /// Top-level columns of the schema tree
    pub columns: Vec<ColumnRecord>,
}

impl InformationBlock {
    pub fn owner(&self) -> Option<&str> {
        self.properties.get(KEY_TABLE_OWNER).map(String::as_str)
    }

    pub fn provider(&self) -> Option<&str> {
        self.properties.get(KEY_TABLE_PROVIDER).map(String::as_str)
    }

    pub fn statistics(&self) -> Option<&str> {
        self.properties.get(KEY_TABLE_STATISTICS).map(String::as_str)
    }

    pub fn is_delta(&self) -> bool {
        self.provider()
            .is_some_and(|p| p.eq_ignore_ascii_case("delta"))
    }
}

/// A field line of the schema tree
#[derive(Debug, PartialEq, Eq)]
struct TreeField<'a> {
    depth: usize,
    name: &'a str,
    data_type: &'a str,
}

impl<'a> TreeField<'a> {
    /// Parse ` |    |-- name: type (nullable = true)`; `None` for non-field lines
    fn parse(line: &'a str) -> Option<Self> {
        let mut rest = line;
        let mut depth = 0;
        while let Some(stripped) = rest.strip_prefix(NESTING_INDENT) {
            rest = stripped;
            depth += 1;
        }
        let field = rest.strip_prefix(FIELD_MARKER)?;

        // Drop the trailing `(nullable = ...)` / `(containsNull = ...)` annotation
        let field = match field.rfind(" (") {
            Some(pos) if field.ends_with(')') => &field[..pos],
            _ => field,
        };
        let (name, data_type) = field.rsplit_once(": ")?;

        Some(Self {
            depth,
            name,
            data_type: data_type.trim(),
        })
    }
}

/// Parse an `information` blob into its properties and top-level columns.
///
/// Lines without a `: ` separator before the schema tree (multi-line view
/// text, for instance) continue the previous property. A blob without a
/// `Schema: root` line yields no columns.
pub fn parse_information_block(relation: &Relation, information: &str) -> InformationBlock {
    let mut properties: IndexMap<String, String> = IndexMap::new();
    let mut last_key: Option<String> = None;
    let mut lines = information.lines();

    for line in lines.by_ref() {
        if line == SCHEMA_ROOT {
            break;
        }
        match line.split_once(": ") {
            Some((key, value)) if !key.is_empty() && !key.starts_with(' ') => {
                if properties.contains_key(key) {
                    // Repeated keys keep the first value; their continuation
                    // lines must not be appended to it either
                    last_key = None;
                    continue;
                }
                properties.insert(key.to_string(), value.to_string());
                last_key = Some(key.to_string());
            }
            _ => {
                if let Some(value) = last_key.as_ref().and_then(|k| properties.get_mut(k)) {
                    value.push('\n');
                    value.push_str(line);
                }
            }
        }
    }

    let table_owner = properties.get(KEY_TABLE_OWNER).cloned();
    let table_stats =
        TableStats::from_raw(properties.get(KEY_TABLE_STATISTICS).map(String::as_str));

    let mut columns = Vec::new();
    let mut nested_fields = 0usize;
    for line in lines {
        let Some(field) = TreeField::parse(line) else {
            continue;
        };
        if field.depth > 0 {
            nested_fields += 1;
            continue;
        }
        columns.push(ColumnRecord::from_relation(
            relation,
            columns.len(),
            ColumnDescriptor::new(field.name, field.data_type),
            table_owner.clone(),
            table_stats.clone(),
        ));
    }

    if columns.is_empty() {
        tracing::debug!("No schema tree in information for {}", relation);
    } else {
        tracing::debug!(
            "Parsed information for {}: {} columns, {} nested fields skipped",
            relation,
            columns.len(),
            nested_fields
        );
    }

    InformationBlock {
        properties,
        columns,
    }
}

/// Top-level column records of an `information` blob
pub fn parse_columns_from_information(relation: &Relation, information: &str) -> Vec<ColumnRecord> {
    parse_information_block(relation, information).columns
}
