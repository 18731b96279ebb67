//! Models module for the SDK
//!
//! Relations, columns and table statistics produced by the metadata parsers.

pub mod column;
pub mod relation;
pub mod stats;

pub use column::{ColumnDescriptor, ColumnKind, ColumnRecord};
pub use relation::{Relation, RelationType};
pub use stats::{TableStat, TableStats};
