//! Classification of engine error messages
//!
//! Listing a schema that does not exist fails with an engine error. Callers
//! treat that case as "no relations" instead of a failure, so the message has
//! to be recognized. Older runtimes phrase it as `Database '<name>' not found`,
//! newer ones report the `[SCHEMA_NOT_FOUND]` error condition.

use once_cell::sync::Lazy;
use regex::Regex;

/// Error condition reported by newer runtimes
const SCHEMA_NOT_FOUND_CONDITION: &str = "[SCHEMA_NOT_FOUND]";

static RE_DATABASE_NOT_FOUND: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)Database.*not found").expect("Invalid regex"));

/// Whether an error message means the requested schema does not exist.
///
/// Matching is case-sensitive and literal; unrelated conditions such as
/// `[DATABASE_NOT_FOUND]` or other phrasings are not matched.
///
/// # Example
///
/// ```rust
/// use databricks_adapter_sdk::metadata::check_not_found_error;
///
/// assert!(check_not_found_error("Runtime error \n Database 'dbt' not found"));
/// assert!(check_not_found_error("[SCHEMA_NOT_FOUND]"));
/// assert!(!check_not_found_error("[DATABASE_NOT_FOUND]"));
/// ```
pub fn check_not_found_error(message: &str) -> bool {
    message.contains(SCHEMA_NOT_FOUND_CONDITION) || RE_DATABASE_NOT_FOUND.is_match(message)
}
