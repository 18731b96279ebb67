//! Identifier lists for `SHOW TABLE EXTENDED ... LIKE '<pattern>'`
//!
//! Table names are joined into a `|`-separated pattern. Some warehouses
//! reject patterns longer than 2048 characters; when the bypass flag is set
//! such a pattern is replaced by `*`.

/// Environment variable enabling the 2048-character fallback
pub const ENV_DESCRIBE_TABLE_CHAR_BYPASS: &str = "DBT_DESCRIBE_TABLE_2048_CHAR_BYPASS";

/// Longest pattern sent as-is when the fallback is enabled
pub const MAX_IDENTIFIER_LIST_LENGTH: usize = 2048;

/// Wildcard used in place of an oversized pattern
pub const WILDCARD: &str = "*";

/// Join identifiers with `|`, falling back to `*` for oversized lists.
///
/// # Example
///
/// ```rust
/// use databricks_adapter_sdk::metadata::get_identifier_list_string;
///
/// assert_eq!(get_identifier_list_string(["a", "b"], true), "a|b");
/// assert_eq!(get_identifier_list_string(Vec::<String>::new(), true), "");
/// ```
pub fn get_identifier_list_string<I, S>(identifiers: I, truncate_enabled: bool) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let joined = identifiers
        .into_iter()
        .map(|s| s.as_ref().to_string())
        .collect::<Vec<_>>()
        .join("|");

    if truncate_enabled && joined.chars().count() > MAX_IDENTIFIER_LIST_LENGTH {
        tracing::debug!(
            "Identifier list of {} characters replaced by wildcard",
            joined.chars().count()
        );
        return WILDCARD.to_string();
    }
    joined
}

/// Whether a raw flag value enables the fallback (`"true"`, any case)
pub fn truncate_flag_enabled(raw: Option<&str>) -> bool {
    raw.is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
}

/// [`get_identifier_list_string`] with the flag read from
/// `DBT_DESCRIBE_TABLE_2048_CHAR_BYPASS`
pub fn identifier_list_string_from_env<I, S>(identifiers: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let flag = std::env::var(ENV_DESCRIBE_TABLE_CHAR_BYPASS).ok();
    get_identifier_list_string(identifiers, truncate_flag_enabled(flag.as_deref()))
}
