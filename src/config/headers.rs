//! HTTP session headers
//!
//! Headers come from two places: the `http_headers` connection parameter set
//! by the user, and a JSON object in `DBT_DATABRICKS_HTTP_SESSION_HEADERS`
//! set by the orchestrator running the job. Environment headers are reserved:
//! the user may add headers but not redefine them.

use super::env::ENV_HTTP_SESSION_HEADERS;
use super::{ConfigError, ConfigResult};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use serde_json::ser::Formatter;
use std::io;

/// JSON formatter using `", "` and `": "` separators.
///
/// Structured environment header values are sent in this spacing, which is
/// what the job orchestrators that set them expect.
struct SpacedJsonFormatter;

impl Formatter for SpacedJsonFormatter {
    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }
}

fn invalid_environment(reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidEnvironment {
        var: ENV_HTTP_SESSION_HEADERS,
        reason: reason.into(),
    }
}

fn to_spaced_json(value: &Value) -> ConfigResult<String> {
    let mut buf = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, SpacedJsonFormatter);
    value
        .serialize(&mut serializer)
        .map_err(|e| invalid_environment(format!("Failed to serialize header value: {}", e)))?;
    String::from_utf8(buf).map_err(|e| invalid_environment(e.to_string()))
}

/// Parse the environment header object, keeping its key order.
///
/// String values are used as-is; any other value is serialized back to JSON.
///
/// # Example
///
/// ```rust
/// use databricks_adapter_sdk::config::parse_environment_headers;
///
/// let headers = parse_environment_headers(r#"{"test":{"jobId":1,"runId":12123}}"#).unwrap();
/// assert_eq!(headers, vec![("test".to_string(), r#"{"jobId": 1, "runId": 12123}"#.to_string())]);
/// ```
pub fn parse_environment_headers(raw: &str) -> ConfigResult<Vec<(String, String)>> {
    let parsed: Value = serde_json::from_str(raw)
        .map_err(|e| invalid_environment(format!("Failed to parse JSON: {}", e)))?;
    let Value::Object(object) = parsed else {
        return Err(invalid_environment("expected a JSON object"));
    };

    object
        .into_iter()
        .map(|(key, value)| match value {
            Value::String(s) => Ok((key, s)),
            other => Ok((key, to_spaced_json(&other)?)),
        })
        .collect()
}

/// Validate the `http_headers` connection parameter: a map of string to string
pub fn user_http_headers(value: &Value) -> ConfigResult<IndexMap<String, String>> {
    let invalid = || ConfigError::InvalidShape {
        scope: "connection parameter",
        key: "http_headers".to_string(),
        expected: "dict of strings",
        value: value.to_string(),
    };

    let object = value.as_object().ok_or_else(invalid)?;
    object
        .iter()
        .map(|(key, value)| match value {
            Value::String(s) => Ok((key.clone(), s.clone())),
            _ => Err(invalid()),
        })
        .collect()
}

/// Merge environment and user headers.
///
/// Environment entries come first in their source order, followed by the
/// user entries. A user key that is also set by the environment is an error
/// naming every colliding key. Returns `None` when neither side has headers.
pub fn merge_http_headers(
    environment: Vec<(String, String)>,
    user: &IndexMap<String, String>,
) -> ConfigResult<Option<Vec<(String, String)>>> {
    let mut collisions: Vec<String> = environment
        .iter()
        .filter(|(key, _)| user.contains_key(key))
        .map(|(key, _)| key.clone())
        .collect();
    if !collisions.is_empty() {
        collisions.sort();
        return Err(ConfigError::HeaderCollision(collisions));
    }

    let mut merged = environment;
    merged.extend(user.iter().map(|(k, v)| (k.clone(), v.clone())));
    Ok(if merged.is_empty() { None } else { Some(merged) })
}
