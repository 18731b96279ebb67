//! Column models
//!
//! [`ColumnDescriptor`] is a column as the engine reports it: a name, the raw
//! type string and an optional comment. Precision, scale and character size are
//! derived from the raw type on demand. [`ColumnRecord`] binds a descriptor to
//! the relation, owner and statistics it was described with.

use crate::models::relation::{Relation, RelationType};
use crate::models::stats::TableStats;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

static RE_DECIMAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*decimal\s*(?:\(\s*(\d+)\s*(?:,\s*(\d+)\s*)?\))?\s*$")
        .expect("Invalid regex")
});
static RE_CHAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(?:var)?char\s*\(\s*(\d+)\s*\)\s*$").expect("Invalid regex")
});

/// Semantic category of a raw column type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// `decimal`, `decimal(P)` or `decimal(P,S)`
    Decimal,
    /// `char(N)` or `varchar(N)`
    Char,
    /// `struct` or `struct<...>`; field list is not parsed
    Struct,
    /// Any other type (`string`, `date`, `bigint`, `array<...>`, ...)
    Scalar,
}

/// Parsed view of a raw type string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ParsedType {
    kind: ColumnKind,
    numeric_precision: Option<u32>,
    numeric_scale: Option<u32>,
    char_size: Option<u32>,
}

impl ParsedType {
    fn of(kind: ColumnKind) -> Self {
        Self {
            kind,
            numeric_precision: None,
            numeric_scale: None,
            char_size: None,
        }
    }

    fn parse(raw_type: &str) -> Self {
        if let Some(caps) = RE_DECIMAL.captures(raw_type) {
            let precision = caps.get(1).and_then(|m| m.as_str().parse().ok());
            let scale = match (precision, caps.get(2)) {
                (Some(_), Some(m)) => m.as_str().parse().ok(),
                (Some(_), None) => Some(0),
                (None, _) => None,
            };
            return Self {
                numeric_precision: precision,
                numeric_scale: scale,
                ..Self::of(ColumnKind::Decimal)
            };
        }

        if let Some(caps) = RE_CHAR.captures(raw_type) {
            return Self {
                char_size: caps.get(1).and_then(|m| m.as_str().parse().ok()),
                ..Self::of(ColumnKind::Char)
            };
        }

        if raw_type.trim_start().to_ascii_lowercase().starts_with("struct") {
            return Self::of(ColumnKind::Struct);
        }

        Self::of(ColumnKind::Scalar)
    }
}

/// A column as reported by the engine
///
/// # Example
///
/// ```rust
/// use databricks_adapter_sdk::models::{ColumnDescriptor, ColumnKind};
///
/// let column = ColumnDescriptor::new("amount", "decimal(22,2)");
/// assert_eq!(column.kind(), ColumnKind::Decimal);
/// assert_eq!(column.numeric_precision(), Some(22));
/// assert_eq!(column.numeric_scale(), Some(2));
/// assert_eq!(column.char_size(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Column name
    pub name: String,
    /// Type string exactly as emitted by the engine
    pub raw_type: String,
    /// Column comment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, raw_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            raw_type: raw_type.into(),
            comment: None,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    fn parsed(&self) -> ParsedType {
        ParsedType::parse(&self.raw_type)
    }

    pub fn kind(&self) -> ColumnKind {
        self.parsed().kind
    }

    /// Precision of a decimal column; `None` for every other kind
    pub fn numeric_precision(&self) -> Option<u32> {
        self.parsed().numeric_precision
    }

    /// Scale of a decimal column; `None` for every other kind
    pub fn numeric_scale(&self) -> Option<u32> {
        self.parsed().numeric_scale
    }

    /// Length of a char/varchar column; `None` for every other kind
    pub fn char_size(&self) -> Option<u32> {
        self.parsed().char_size
    }

    pub fn is_numeric(&self) -> bool {
        self.kind() == ColumnKind::Decimal
    }

    pub fn is_string(&self) -> bool {
        self.kind() == ColumnKind::Char || self.raw_type.trim().eq_ignore_ascii_case("string")
    }

    pub fn is_struct(&self) -> bool {
        self.kind() == ColumnKind::Struct
    }

    /// Render the column clause of a `CREATE TABLE` statement.
    ///
    /// The raw type is emitted verbatim; the comment, when present, is quoted
    /// with backslash escapes.
    pub fn render_ddl(&self) -> String {
        match &self.comment {
            Some(comment) => format!(
                "{} {} COMMENT '{}'",
                self.name,
                self.raw_type,
                escape_comment(comment)
            ),
            None => format!("{} {}", self.name, self.raw_type),
        }
    }
}

fn escape_comment(comment: &str) -> String {
    comment.replace('\\', "\\\\").replace('\'', "\\'")
}

/// A column bound to the relation it was described from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRecord {
    pub table_database: Option<String>,
    pub table_schema: String,
    pub table_name: String,
    pub table_type: RelationType,
    /// Owner in string form, even when the engine reported a number
    pub table_owner: Option<String>,
    /// 0-based position in the column list
    pub column_index: usize,
    pub column: ColumnDescriptor,
    #[serde(default, skip_serializing_if = "TableStats::is_empty")]
    pub table_stats: TableStats,
}

impl ColumnRecord {
    pub fn from_relation(
        relation: &Relation,
        column_index: usize,
        column: ColumnDescriptor,
        table_owner: Option<String>,
        table_stats: TableStats,
    ) -> Self {
        Self {
            table_database: relation.database.clone(),
            table_schema: relation.schema.clone(),
            table_name: relation.identifier.clone(),
            table_type: relation.relation_type,
            table_owner,
            column_index,
            column,
            table_stats,
        }
    }

    pub fn name(&self) -> &str {
        &self.column.name
    }

    pub fn dtype(&self) -> &str {
        &self.column.raw_type
    }

    /// Flatten the record into an ordered string-keyed map.
    ///
    /// Statistics are merged into the root as `stats:<metric>:<field>` keys.
    /// With `omit_none` set, entries whose value is null are left out.
    pub fn to_column_dict(&self, omit_none: bool) -> Map<String, Value> {
        let optional_str = |v: &Option<String>| v.clone().map(Value::String).unwrap_or(Value::Null);
        let optional_u32 = |v: Option<u32>| v.map(Value::from).unwrap_or(Value::Null);

        let mut map = Map::new();
        map.insert("table_database".into(), optional_str(&self.table_database));
        map.insert("table_schema".into(), Value::String(self.table_schema.clone()));
        map.insert("table_name".into(), Value::String(self.table_name.clone()));
        map.insert(
            "table_type".into(),
            Value::String(self.table_type.as_str().to_string()),
        );
        map.insert("table_owner".into(), optional_str(&self.table_owner));
        map.insert("column".into(), Value::String(self.column.name.clone()));
        map.insert("column_index".into(), Value::from(self.column_index));
        map.insert("dtype".into(), Value::String(self.column.raw_type.clone()));
        map.insert(
            "numeric_scale".into(),
            optional_u32(self.column.numeric_scale()),
        );
        map.insert(
            "numeric_precision".into(),
            optional_u32(self.column.numeric_precision()),
        );
        map.insert("char_size".into(), optional_u32(self.column.char_size()));
        if let Some(comment) = &self.column.comment {
            map.insert("comment".into(), Value::String(comment.clone()));
        }
        self.table_stats.flatten_into(&mut map);

        if omit_none {
            map.retain(|_, v| !v.is_null());
        }
        map
    }
}
