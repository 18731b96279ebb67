//! `DESCRIBE TABLE EXTENDED` parsing
//!
//! The command returns `(col_name, data_type)` rows: first the table columns,
//! then a series of sections introduced by `#` marker rows (partition
//! information, detailed table information, ...) separated by blank rows.
//!
//! ```text
//! col1                          decimal(22,0)
//! dt                            date
//! # Partition Information       data_type
//! # col_name                    data_type
//! dt                            date
//! <null>                        <null>
//! # Detailed Table Information  <null>
//! Owner                         root
//! Statistics                    1109049927 bytes, 14093476 rows
//! ```

use super::{DescribeRow, TableMetadata};
use crate::models::{ColumnDescriptor, ColumnRecord, Relation, TableStats};

/// Kind of row in describe output.
///
/// Splitting columns from metadata only needs [`RowKind::is_column`]; the
/// named markers are what [`partition_columns`] uses to find its section.
#[derive(Debug, Clone, PartialEq, Eq)]
enum RowKind<'a> {
    Column(&'a str),
    Blank,
    PartitionInformation,
    ColumnHeader,
    DetailedTableInformation,
    MetadataColumns,
    /// Any other `#` marker; treated like the known ones
    OtherSection(&'a str),
}

impl<'a> RowKind<'a> {
    fn classify(row: &'a DescribeRow) -> Self {
        let Some(name) = row.col_name.as_deref() else {
            return RowKind::Blank;
        };
        match name.trim() {
            "" => RowKind::Blank,
            "# Partition Information" => RowKind::PartitionInformation,
            "# col_name" => RowKind::ColumnHeader,
            "# Detailed Table Information" => RowKind::DetailedTableInformation,
            "# Metadata Columns" => RowKind::MetadataColumns,
            marker if marker.starts_with('#') => RowKind::OtherSection(marker),
            _ => RowKind::Column(name),
        }
    }

    fn is_column(&self) -> bool {
        matches!(self, RowKind::Column(_))
    }
}

/// Split describe output into table metadata and column records.
///
/// Rows up to the first blank or `#` row are columns, numbered from 0. That
/// separator row is dropped; every later row, markers included, is folded
/// into the metadata with last-write-wins semantics. Output without any
/// separator yields only columns and empty metadata.
///
/// Every record carries the owner (in string form) and the decomposed
/// `Statistics` value of the metadata.
///
/// # Example
///
/// ```rust
/// use databricks_adapter_sdk::metadata::{DescribeRow, CellValue, parse_describe_extended};
/// use databricks_adapter_sdk::models::{Relation, RelationType};
///
/// let relation = Relation::create(None, "default_schema", "mytable", RelationType::Table);
/// let rows = vec![
///     DescribeRow::text("col1", "decimal(22,0)"),
///     DescribeRow::new(Some("# Detailed Table Information"), None),
///     DescribeRow::new(Some("Owner"), Some(CellValue::Integer(1234))),
/// ];
///
/// let (metadata, columns) = parse_describe_extended(&relation, &rows);
/// assert_eq!(metadata.len(), 1);
/// assert_eq!(columns[0].table_owner.as_deref(), Some("1234"));
/// ```
pub fn parse_describe_extended(
    relation: &Relation,
    rows: &[DescribeRow],
) -> (TableMetadata, Vec<ColumnRecord>) {
    let separator = rows
        .iter()
        .position(|row| !RowKind::classify(row).is_column())
        .unwrap_or(rows.len());

    let metadata: TableMetadata = rows
        .iter()
        .skip(separator + 1)
        .map(|row| (row.col_name.clone(), row.data_type.clone()))
        .collect();

    let table_owner = metadata.owner();
    let table_stats = TableStats::from_raw(metadata.statistics().as_deref());

    let columns: Vec<ColumnRecord> = rows[..separator]
        .iter()
        .enumerate()
        .map(|(index, row)| {
            let name = row.col_name.clone().unwrap_or_default();
            let raw_type = row
                .data_type
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default();
            ColumnRecord::from_relation(
                relation,
                index,
                ColumnDescriptor::new(name, raw_type),
                table_owner.clone(),
                table_stats.clone(),
            )
        })
        .collect();

    tracing::debug!(
        "Parsed describe output for {}: {} columns, {} metadata entries",
        relation,
        columns.len(),
        metadata.len()
    );

    (metadata, columns)
}

/// Partition column names listed in the `# Partition Information` section.
///
/// The section's `# col_name` header is skipped; the list ends at the next
/// blank or marker row. Tables without partitions yield an empty list.
pub fn partition_columns(rows: &[DescribeRow]) -> Vec<String> {
    let mut in_section = false;
    let mut columns = Vec::new();

    for row in rows {
        match RowKind::classify(row) {
            RowKind::PartitionInformation => in_section = true,
            RowKind::ColumnHeader => {}
            RowKind::Column(name) if in_section => columns.push(name.to_string()),
            RowKind::Column(_) => {}
            RowKind::Blank
            | RowKind::DetailedTableInformation
            | RowKind::MetadataColumns
            | RowKind::OtherSection(_) => {
                if in_section {
                    break;
                }
            }
        }
    }

    columns
}
