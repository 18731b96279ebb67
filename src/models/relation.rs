//! Relation model
//!
//! A relation is a fully-qualified reference to a catalog object. Parsers bind
//! every column record they produce to the relation it was described from.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of catalog object a relation points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationType {
    #[default]
    Table,
    View,
    MaterializedView,
    StreamingTable,
    External,
    Cte,
}

impl RelationType {
    /// Lowercase name as used in column dictionaries
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationType::Table => "table",
            RelationType::View => "view",
            RelationType::MaterializedView => "materialized_view",
            RelationType::StreamingTable => "streaming_table",
            RelationType::External => "external",
            RelationType::Cte => "cte",
        }
    }
}

impl std::str::FromStr for RelationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" | "managed" => Ok(RelationType::Table),
            "view" => Ok(RelationType::View),
            "materialized_view" | "materialized view" => Ok(RelationType::MaterializedView),
            "streaming_table" | "streaming table" => Ok(RelationType::StreamingTable),
            "external" => Ok(RelationType::External),
            "cte" => Ok(RelationType::Cte),
            _ => Err(format!("Unknown relation type: {}", s)),
        }
    }
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference to a table, view or other catalog object
///
/// # Example
///
/// ```rust
/// use databricks_adapter_sdk::models::{Relation, RelationType};
///
/// let relation = Relation::create(None, "default_schema", "mytable", RelationType::Table);
/// assert!(relation.database.is_none());
/// assert_eq!(relation.to_string(), "`default_schema`.`mytable`");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relation {
    /// Catalog (database) name, if known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    /// Schema name
    pub schema: String,
    /// Object name
    pub identifier: String,
    /// Object kind
    #[serde(rename = "type")]
    pub relation_type: RelationType,
}

impl Relation {
    /// Create a relation from its parts
    pub fn create(
        database: Option<&str>,
        schema: impl Into<String>,
        identifier: impl Into<String>,
        relation_type: RelationType,
    ) -> Self {
        Self {
            database: database.map(str::to_string),
            schema: schema.into(),
            identifier: identifier.into(),
            relation_type,
        }
    }

    /// Object name
    pub fn name(&self) -> &str {
        &self.identifier
    }

    pub fn is_view(&self) -> bool {
        self.relation_type == RelationType::View
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(database) = &self.database {
            write!(f, "`{}`.", database)?;
        }
        write!(f, "`{}`.`{}`", self.schema, self.identifier)
    }
}
