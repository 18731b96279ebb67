//! Environment variable overrides
//!
//! The recognized variables are read once into an [`EnvSnapshot`]; a
//! resolution only ever looks at the snapshot, so it cannot observe a
//! variable changing halfway through.

use crate::metadata::identifiers::{ENV_DESCRIBE_TABLE_CHAR_BYPASS, truncate_flag_enabled};

/// Environment variable holding a JSON object of extra HTTP headers
pub const ENV_HTTP_SESSION_HEADERS: &str = "DBT_DATABRICKS_HTTP_SESSION_HEADERS";

/// Environment variable holding the invocation environment tag
pub const ENV_INVOCATION_ENV: &str = "DBT_DATABRICKS_INVOCATION_ENV";

/// Immutable copy of the recognized environment variables
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSnapshot {
    http_session_headers: Option<String>,
    invocation_env: Option<String>,
    describe_table_char_bypass: Option<String>,
}

impl EnvSnapshot {
    /// Snapshot with no variables set
    pub fn empty() -> Self {
        Self::default()
    }

    /// Read the recognized variables from the process environment
    pub fn capture() -> Self {
        Self::from_vars(
            [
                ENV_HTTP_SESSION_HEADERS,
                ENV_INVOCATION_ENV,
                ENV_DESCRIBE_TABLE_CHAR_BYPASS,
            ]
            .into_iter()
            .filter_map(|key| std::env::var(key).ok().map(|value| (key, value))),
        )
    }

    /// Build a snapshot from key/value pairs; unrecognized keys are ignored
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut snapshot = Self::default();
        for (key, value) in vars {
            match key.as_ref() {
                ENV_HTTP_SESSION_HEADERS => snapshot.http_session_headers = Some(value.into()),
                ENV_INVOCATION_ENV => snapshot.invocation_env = Some(value.into()),
                ENV_DESCRIBE_TABLE_CHAR_BYPASS => {
                    snapshot.describe_table_char_bypass = Some(value.into())
                }
                _ => {}
            }
        }
        snapshot
    }

    /// Raw header JSON; a blank variable counts as unset
    pub fn http_session_headers(&self) -> Option<&str> {
        non_blank(self.http_session_headers.as_deref())
    }

    /// Invocation environment tag; a blank variable counts as unset
    pub fn invocation_env(&self) -> Option<&str> {
        non_blank(self.invocation_env.as_deref())
    }

    /// Whether oversized identifier lists should fall back to `*`
    pub fn truncate_identifier_lists(&self) -> bool {
        truncate_flag_enabled(self.describe_table_char_bypass.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
