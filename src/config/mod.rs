//! Connection configuration resolution
//!
//! Resolves one immutable [`ConnectionCredentials`] value from:
//! - project settings ([`ProjectConfig`]), which pick the profile
//! - profile settings ([`ProfileConfig`]), whose selected output holds the raw
//!   connection settings
//! - environment overrides ([`EnvSnapshot`]): extra HTTP headers and the
//!   invocation environment tag
//!
//! Conflicting or reserved settings are rejected before any connection is
//! attempted. Resolution never performs I/O and is idempotent.

pub mod auth;
pub mod credentials;
pub mod env;
pub mod headers;
pub mod profile;

pub use auth::{AuthCredentials, ClientCredentials, CredentialsProvider, TokenCredentials};
pub use credentials::{
    CATALOG_KEY_IN_SESSION_PROPERTIES, ConnectionCredentials, ConnectionResolver,
    RESERVED_CONNECTION_PARAMETERS,
};
pub use env::EnvSnapshot;
pub use headers::{merge_http_headers, parse_environment_headers};
pub use profile::{ProfileConfig, ProfilesFile, ProjectConfig};

/// Error type for connection configuration
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Two settings resolve the same field to different values
    #[error("Got duplicate keys: ({sources}) all map to \"{target}\"")]
    ConfigConflict {
        sources: String,
        target: &'static str,
    },

    /// A connection parameter uses a name reserved for the connector
    #[error("The connection parameter `{0}` is reserved.")]
    ReservedParameter(String),

    /// A setting has the wrong structure
    #[error("The {scope} `{key}` should be {expected}: {value}.")]
    InvalidShape {
        scope: &'static str,
        key: String,
        expected: &'static str,
        value: String,
    },

    /// User headers collide with headers injected by the environment
    #[error("Intersection with reserved http_headers in keys: {{{}}}", format_key_set(.0))]
    HeaderCollision(Vec<String>),

    /// The invocation environment tag contains forbidden characters
    #[error("Invalid invocation environment: {0}")]
    InvalidInvocationTag(String),

    /// A required setting is missing
    #[error("The config '{0}' is required to connect to Databricks")]
    MissingField(&'static str),

    /// Neither a token nor client credentials were given
    #[error(
        "The config 'token' or both 'client_id' and 'client_secret' are required to connect to Databricks"
    )]
    MissingCredentials,

    /// The selected target has no output block
    #[error("The profile target '{0}' was not found in outputs")]
    UnknownTarget(String),

    /// The project refers to a profile that does not exist
    #[error("Could not find profile named '{0}'")]
    UnknownProfile(String),

    /// An environment variable holds an unusable value
    #[error("Invalid value in environment variable {var}: {reason}")]
    InvalidEnvironment { var: &'static str, reason: String },

    /// A settings document could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Render keys the way a Python set literal reads: `'a', 'b'`
fn format_key_set(keys: &[String]) -> String {
    keys.iter()
        .map(|k| format!("'{}'", k))
        .collect::<Vec<_>>()
        .join(", ")
}
