//! Tests for DESCRIBE TABLE EXTENDED parsing

use databricks_adapter_sdk::metadata::{
    CellValue, DescribeRow, parse_describe_extended, partition_columns,
};
use databricks_adapter_sdk::models::{ColumnKind, Relation, RelationType};
use serde_json::{Value, json};

fn relation() -> Relation {
    Relation::create(None, "default_schema", "mytable", RelationType::Table)
}

fn row(col_name: Option<&str>, data_type: Option<&str>) -> DescribeRow {
    DescribeRow::new(col_name, data_type.map(CellValue::from))
}

fn detail_rows() -> Vec<DescribeRow> {
    vec![
        row(Some("# Detailed Table Information"), None),
        row(Some("Database"), None),
        row(Some("Owner"), Some("root")),
        row(Some("Created Time"), Some("Wed Feb 04 18:15:00 UTC 1815")),
        row(Some("Last Access"), Some("Wed May 20 19:25:00 UTC 1925")),
        row(Some("Type"), Some("MANAGED")),
        row(Some("Provider"), Some("delta")),
        row(Some("Location"), Some("/mnt/vo")),
        row(
            Some("Serde Library"),
            Some("org.apache.hadoop.hive.serde2.lazy.LazySimpleSerDe"),
        ),
        row(
            Some("InputFormat"),
            Some("org.apache.hadoop.mapred.SequenceFileInputFormat"),
        ),
        row(
            Some("OutputFormat"),
            Some("org.apache.hadoop.hive.ql.io.HiveSequenceFileOutputFormat"),
        ),
        row(Some("Partition Provider"), Some("Catalog")),
    ]
}

fn partitioned_rows() -> Vec<DescribeRow> {
    let mut rows = vec![
        row(Some("col1"), Some("decimal(22,0)")),
        row(Some("col2"), Some("string")),
        row(Some("dt"), Some("date")),
        row(Some("struct_col"), Some("struct<struct_inner_col:string>")),
        row(Some("# Partition Information"), Some("data_type")),
        row(Some("# col_name"), Some("data_type")),
        row(Some("dt"), Some("date")),
        row(None, None),
    ];
    rows.extend(detail_rows());
    rows
}

mod describe_tests {
    use super::*;

    #[test]
    fn test_parse_relation_metadata() {
        let relation = relation();
        assert!(relation.database.is_none());

        let (metadata, _) = parse_describe_extended(&relation, &partitioned_rows());

        let entries: Vec<(Option<&str>, Option<String>)> = metadata
            .iter()
            .map(|(k, v)| (k, v.map(ToString::to_string)))
            .collect();
        let text = |s: &str| Some(s.to_string());
        assert_eq!(
            entries,
            vec![
                (Some("# col_name"), text("data_type")),
                (Some("dt"), text("date")),
                (None, None),
                (Some("# Detailed Table Information"), None),
                (Some("Database"), None),
                (Some("Owner"), text("root")),
                (Some("Created Time"), text("Wed Feb 04 18:15:00 UTC 1815")),
                (Some("Last Access"), text("Wed May 20 19:25:00 UTC 1925")),
                (Some("Type"), text("MANAGED")),
                (Some("Provider"), text("delta")),
                (Some("Location"), text("/mnt/vo")),
                (
                    Some("Serde Library"),
                    text("org.apache.hadoop.hive.serde2.lazy.LazySimpleSerDe")
                ),
                (
                    Some("InputFormat"),
                    text("org.apache.hadoop.mapred.SequenceFileInputFormat")
                ),
                (
                    Some("OutputFormat"),
                    text("org.apache.hadoop.hive.ql.io.HiveSequenceFileOutputFormat")
                ),
                (Some("Partition Provider"), text("Catalog")),
            ]
        );
        assert!(!metadata.contains_key(Some("# Partition Information")));
    }

    #[test]
    fn test_parse_relation_columns() {
        let (_, columns) = parse_describe_extended(&relation(), &partitioned_rows());
        assert_eq!(columns.len(), 4);

        assert_eq!(
            Value::Object(columns[0].to_column_dict(false)),
            json!({
                "table_database": null,
                "table_schema": "default_schema",
                "table_name": "mytable",
                "table_type": "table",
                "table_owner": "root",
                "column": "col1",
                "column_index": 0,
                "dtype": "decimal(22,0)",
                "numeric_scale": 0,
                "numeric_precision": 22,
                "char_size": null,
            })
        );

        assert_eq!(
            Value::Object(columns[1].to_column_dict(false)),
            json!({
                "table_database": null,
                "table_schema": "default_schema",
                "table_name": "mytable",
                "table_type": "table",
                "table_owner": "root",
                "column": "col2",
                "column_index": 1,
                "dtype": "string",
                "numeric_scale": null,
                "numeric_precision": null,
                "char_size": null,
            })
        );

        assert_eq!(columns[2].name(), "dt");
        assert_eq!(columns[2].column_index, 2);

        let struct_col = &columns[3];
        assert_eq!(struct_col.dtype(), "struct<struct_inner_col:string>");
        assert_eq!(struct_col.column.kind(), ColumnKind::Struct);
        assert_eq!(struct_col.column_index, 3);
    }

    #[test]
    fn test_parse_relation_with_integer_owner() {
        let rows = vec![
            row(Some("col1"), Some("decimal(22,0)")),
            row(Some("# Detailed Table Information"), None),
            DescribeRow::new(Some("Owner"), Some(CellValue::Integer(1234))),
        ];

        let (_, columns) = parse_describe_extended(&relation(), &rows);
        assert_eq!(
            columns[0].to_column_dict(true).get("table_owner"),
            Some(&json!("1234"))
        );
    }

    #[test]
    fn test_parse_relation_with_statistics() {
        let mut rows = vec![
            row(Some("col1"), Some("decimal(22,0)")),
            row(Some("# Partition Information"), Some("data_type")),
            row(None, None),
        ];
        let mut details = detail_rows();
        details.insert(
            5,
            row(Some("Statistics"), Some("1109049927 bytes, 14093476 rows")),
        );
        rows.extend(details);

        let (metadata, columns) = parse_describe_extended(&relation(), &rows);
        assert_eq!(metadata.len(), 14);
        assert!(metadata.contains_key(None));
        assert_eq!(
            metadata.statistics().as_deref(),
            Some("1109049927 bytes, 14093476 rows")
        );

        assert_eq!(columns.len(), 1);
        assert_eq!(
            Value::Object(columns[0].to_column_dict(false)),
            json!({
                "table_database": null,
                "table_schema": "default_schema",
                "table_name": "mytable",
                "table_type": "table",
                "table_owner": "root",
                "column": "col1",
                "column_index": 0,
                "dtype": "decimal(22,0)",
                "numeric_scale": 0,
                "numeric_precision": 22,
                "char_size": null,
                "stats:bytes:description": "",
                "stats:bytes:include": true,
                "stats:bytes:label": "bytes",
                "stats:bytes:value": 1109049927,
                "stats:rows:description": "",
                "stats:rows:include": true,
                "stats:rows:label": "rows",
                "stats:rows:value": 14093476,
            })
        );
    }

    #[test]
    fn test_column_dict_key_order() {
        let (_, columns) = parse_describe_extended(&relation(), &partitioned_rows());
        let keys: Vec<String> = columns[0].to_column_dict(false).keys().cloned().collect();
        assert_eq!(
            keys,
            vec![
                "table_database",
                "table_schema",
                "table_name",
                "table_type",
                "table_owner",
                "column",
                "column_index",
                "dtype",
                "numeric_scale",
                "numeric_precision",
                "char_size",
            ]
        );
    }

    #[test]
    fn test_relation_with_database() {
        let relation = Relation::create(Some("something"), "different", "table", RelationType::Table);
        let rows = vec![row(Some("id"), Some("bigint"))];
        let (metadata, columns) = parse_describe_extended(&relation, &rows);
        assert!(metadata.is_empty());
        assert_eq!(columns[0].table_database.as_deref(), Some("something"));
    }

    #[test]
    fn test_partition_columns() {
        assert_eq!(partition_columns(&partitioned_rows()), vec!["dt".to_string()]);

        let mut unpartitioned = vec![row(Some("col1"), Some("int")), row(None, None)];
        unpartitioned.extend(detail_rows());
        assert!(partition_columns(&unpartitioned).is_empty());
    }
}
