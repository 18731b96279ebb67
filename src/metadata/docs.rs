//! Persisting column documentation
//!
//! Column comments are written with one `ALTER TABLE` statement per column.
//! To avoid needless statements, only documentation that differs from what
//! the relation already carries is kept.

use crate::models::ColumnDescriptor;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Documentation for one column of a model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDocumentation {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ColumnDocumentation {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: Some(description.into()),
        }
    }
}

/// Documentation entries that still need to be persisted.
///
/// An entry is kept when the relation has no column of that name, or when the
/// existing comment differs from the documented description.
pub fn get_persist_doc_columns(
    existing_columns: &[ColumnDescriptor],
    columns: &IndexMap<String, ColumnDocumentation>,
) -> IndexMap<String, ColumnDocumentation> {
    let existing: IndexMap<&str, Option<&str>> = existing_columns
        .iter()
        .map(|c| (c.name.as_str(), c.comment.as_deref()))
        .collect();

    columns
        .iter()
        .filter(|(name, doc)| match existing.get(name.as_str()) {
            Some(comment) => *comment != doc.description.as_deref(),
            None => true,
        })
        .map(|(name, doc)| (name.clone(), doc.clone()))
        .collect()
}
