//! Databricks Adapter SDK - Metadata parsing and connection configuration
//!
//! Provides:
//! - Parsing of `DESCRIBE TABLE EXTENDED` rows into table metadata and columns
//! - Parsing of `SHOW TABLE EXTENDED` information blobs
//! - Column type descriptors (decimal, char, struct) and the flattened column view
//! - Classification of "not found" errors and identifier list building
//! - Resolution of validated connection credentials from profile settings and
//!   environment overrides
//!
//! Nothing in this crate performs network I/O.

pub mod config;
pub mod metadata;
pub mod models;

// Re-export commonly used types
pub use config::{
    AuthCredentials, ConfigError, ConfigResult, ConnectionCredentials, ConnectionResolver,
    CredentialsProvider, EnvSnapshot, ProfileConfig, ProfilesFile, ProjectConfig,
};
pub use metadata::{
    CellValue, DescribeRow, InformationBlock, TableMetadata, check_not_found_error,
    get_identifier_list_string, parse_columns_from_information, parse_describe_extended,
    parse_information_block,
};
pub use models::{ColumnDescriptor, ColumnKind, ColumnRecord, Relation, RelationType, TableStats};
