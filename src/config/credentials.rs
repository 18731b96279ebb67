//! Connection credentials and their resolution
//!
//! [`ConnectionResolver`] turns the raw settings of one profile output into a
//! validated [`ConnectionCredentials`] value. Checks run in a fixed order so
//! that a settings map with several problems always reports the same one:
//!
//! 1. settings shape and required fields
//! 2. catalog / database agreement
//! 3. reserved connection parameters
//! 4. `http_headers` shape
//! 5. environment header merge
//! 6. invocation environment tag

use super::auth::{AuthCredentials, CredentialsProvider};
use super::env::{ENV_INVOCATION_ENV, EnvSnapshot};
use super::headers::{merge_http_headers, parse_environment_headers, user_http_headers};
use super::profile::{ProfileConfig, ProfilesFile, ProjectConfig};
use super::{ConfigError, ConfigResult};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use std::fmt;
use tracing::{debug, warn};

/// Connection parameters owned by the connector itself
pub const RESERVED_CONNECTION_PARAMETERS: &[&str] = &[
    "server_hostname",
    "http_path",
    "access_token",
    "client_id",
    "client_secret",
    "session_configuration",
    "catalog",
    "schema",
    "_user_agent_entry",
];

/// Session property that selects the catalog
pub const CATALOG_KEY_IN_SESSION_PROPERTIES: &str = "databricks.catalog";

/// Name reported in the user agent entry
pub const USER_AGENT_NAME: &str = env!("CARGO_PKG_NAME");

const KNOWN_SETTINGS: &[&str] = &[
    "type",
    "threads",
    "host",
    "http_path",
    "token",
    "client_id",
    "client_secret",
    "catalog",
    "database",
    "schema",
    "session_properties",
    "connection_parameters",
    "connect_retries",
    "connect_timeout",
];

static RE_INVOCATION_ENV: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9\-]+$").expect("Invalid regex"));

static RE_CLUSTER_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/?sql/protocolv1/o/\d+/(.*)").expect("Invalid regex"));

/// Validated, immutable connection settings
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionCredentials {
    host: String,
    http_path: String,
    auth: AuthCredentials,
    database: Option<String>,
    schema: String,
    session_properties: IndexMap<String, String>,
    http_headers: Option<Vec<(String, String)>>,
    invocation_env: Option<String>,
    connection_parameters: IndexMap<String, Value>,
    connect_retries: Option<u32>,
    connect_timeout: Option<u32>,
}

impl ConnectionCredentials {
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn http_path(&self) -> &str {
        &self.http_path
    }

    pub fn auth(&self) -> &AuthCredentials {
        &self.auth
    }

    pub fn token(&self) -> Option<&str> {
        self.auth.token()
    }

    pub fn database(&self) -> Option<&str> {
        self.database.as_deref()
    }

    /// Alias of [`database`](Self::database)
    pub fn catalog(&self) -> Option<&str> {
        self.database()
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Session properties, without the catalog property
    pub fn session_properties(&self) -> &IndexMap<String, String> {
        &self.session_properties
    }

    /// Environment headers followed by user headers
    pub fn http_headers(&self) -> Option<&[(String, String)]> {
        self.http_headers.as_deref()
    }

    pub fn invocation_env(&self) -> Option<&str> {
        self.invocation_env.as_deref()
    }

    pub fn connection_parameters(&self) -> &IndexMap<String, Value> {
        &self.connection_parameters
    }

    pub fn connect_retries(&self) -> Option<u32> {
        self.connect_retries
    }

    pub fn connect_timeout(&self) -> Option<u32> {
        self.connect_timeout
    }

    /// Cluster id for all-purpose cluster http paths
    pub fn cluster_id(&self) -> Option<String> {
        RE_CLUSTER_ID
            .captures(&self.http_path)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|id| !id.is_empty())
    }

    /// Warehouse id for SQL warehouse http paths
    pub fn warehouse_id(&self) -> Option<String> {
        self.http_path
            .strip_prefix("/sql/1.0/warehouses/")
            .or_else(|| self.http_path.strip_prefix("sql/1.0/warehouses/"))
            .map(|s| s.trim_end_matches('/').to_string())
            .filter(|id| !id.is_empty())
    }

    /// `<name>/<version>`, followed by `; <invocation env>` when one is set
    pub fn user_agent_entry(&self) -> String {
        let base = format!("{}/{}", USER_AGENT_NAME, env!("CARGO_PKG_VERSION"));
        match &self.invocation_env {
            Some(tag) => format!("{}; {}", base, tag),
            None => base,
        }
    }

    /// Field identifying the account the connection belongs to
    pub fn unique_field(&self) -> &str {
        &self.host
    }

    /// Names of the settings safe to show in connection listings
    pub fn connection_keys(&self) -> &'static [&'static str] {
        &["host", "http_path", "catalog", "schema"]
    }

    /// Values of [`connection_keys`](Self::connection_keys); never includes secrets
    pub fn connection_info(&self) -> Vec<(&'static str, Option<String>)> {
        vec![
            ("host", Some(self.host.clone())),
            ("http_path", Some(self.http_path.clone())),
            ("catalog", self.database.clone()),
            ("schema", Some(self.schema.clone())),
        ]
    }

    /// Keyword arguments for the transport layer's connect call.
    ///
    /// Contains secrets; never log the result.
    pub fn connect_arguments(&self) -> IndexMap<String, Value> {
        let mut args = IndexMap::new();
        args.insert(
            "server_hostname".to_string(),
            Value::String(self.host.clone()),
        );
        args.insert(
            "http_path".to_string(),
            Value::String(self.http_path.clone()),
        );
        for (key, value) in self.auth.connection_parameters() {
            args.insert(key.to_string(), Value::String(value));
        }
        args.insert(
            "http_headers".to_string(),
            match &self.http_headers {
                Some(headers) => Value::Array(
                    headers
                        .iter()
                        .map(|(k, v)| {
                            Value::Array(vec![Value::String(k.clone()), Value::String(v.clone())])
                        })
                        .collect(),
                ),
                None => Value::Null,
            },
        );
        args.insert(
            "session_configuration".to_string(),
            Value::Object(
                self.session_properties
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                    .collect(),
            ),
        );
        args.insert(
            "catalog".to_string(),
            self.database.clone().map_or(Value::Null, Value::String),
        );
        args.insert(
            "_user_agent_entry".to_string(),
            Value::String(self.user_agent_entry()),
        );
        for (key, value) in &self.connection_parameters {
            if key != "http_headers" {
                args.insert(key.clone(), value.clone());
            }
        }
        args
    }
}

impl fmt::Debug for ConnectionCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionCredentials")
            .field("host", &self.host)
            .field("http_path", &self.http_path)
            .field("auth", &self.auth)
            .field("database", &self.database)
            .field("schema", &self.schema)
            .field("session_properties", &self.session_properties)
            .field(
                "http_headers",
                &self
                    .http_headers
                    .as_ref()
                    .map(|h| h.iter().map(|(k, _)| k.as_str()).collect::<Vec<_>>()),
            )
            .field("invocation_env", &self.invocation_env)
            .field(
                "connection_parameters",
                &self.connection_parameters.keys().collect::<Vec<_>>(),
            )
            .field("connect_retries", &self.connect_retries)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

/// Resolves connection credentials against one environment snapshot
#[derive(Debug, Clone, Default)]
pub struct ConnectionResolver {
    env: EnvSnapshot,
}

impl ConnectionResolver {
    pub fn new(env: EnvSnapshot) -> Self {
        Self { env }
    }

    pub fn env(&self) -> &EnvSnapshot {
        &self.env
    }

    /// Resolve the output selected by the project from a profiles document
    pub fn resolve(
        &self,
        project: &ProjectConfig,
        profiles: &ProfilesFile,
    ) -> ConfigResult<ConnectionCredentials> {
        let profile = profiles.get(project.profile_name())?;
        self.resolve_profile(profile, project.target.as_deref())
    }

    /// Resolve one profile; `target_override` wins over the profile's target
    pub fn resolve_profile(
        &self,
        profile: &ProfileConfig,
        target_override: Option<&str>,
    ) -> ConfigResult<ConnectionCredentials> {
        let target = profile.select_target(target_override);
        debug!("Resolving connection for target '{}'", target);
        self.resolve_output(profile.output(target)?)
    }

    /// Validate one raw settings map and build the credentials
    pub fn resolve_output(&self, settings: &Value) -> ConfigResult<ConnectionCredentials> {
        let settings = settings.as_object().ok_or_else(|| ConfigError::InvalidShape {
            scope: "profile",
            key: "outputs".to_string(),
            expected: "a mapping of settings",
            value: settings.to_string(),
        })?;

        for key in settings.keys() {
            if !KNOWN_SETTINGS.contains(&key.as_str()) {
                warn!("Ignoring unknown connection setting '{}'", key);
            }
        }

        let host = required_setting(settings, "host")?;
        let http_path = required_setting(settings, "http_path")?;
        let schema = required_setting(settings, "schema")?;
        let auth = AuthCredentials::from_settings(
            string_setting(settings, "token")?,
            string_setting(settings, "client_id")?,
            string_setting(settings, "client_secret")?,
        )?;
        let mut session_properties = session_properties(settings)?;
        let connection_parameters = connection_parameters(settings)?;
        let connect_retries = integer_setting(settings, "connect_retries")?;
        let connect_timeout = integer_setting(settings, "connect_timeout")?;

        let database = resolve_database(
            string_setting(settings, "catalog")?,
            string_setting(settings, "database")?,
            &mut session_properties,
        )?;

        if let Some(reserved) = connection_parameters
            .keys()
            .find(|key| RESERVED_CONNECTION_PARAMETERS.contains(&key.as_str()))
        {
            return Err(ConfigError::ReservedParameter(reserved.clone()));
        }

        let user_headers = match connection_parameters.get("http_headers") {
            Some(value) => user_http_headers(value)?,
            None => IndexMap::new(),
        };
        let env_headers = match self.env.http_session_headers() {
            Some(raw) => parse_environment_headers(raw)?,
            None => Vec::new(),
        };
        let http_headers = merge_http_headers(env_headers, &user_headers)?;

        let invocation_env = match self.env.invocation_env() {
            Some(tag) if !RE_INVOCATION_ENV.is_match(tag) => {
                return Err(ConfigError::InvalidInvocationTag(tag.to_string()));
            }
            Some(tag) => {
                debug!("Using invocation environment from {}", ENV_INVOCATION_ENV);
                Some(tag.to_string())
            }
            None => None,
        };

        let credentials = ConnectionCredentials {
            host,
            http_path,
            auth,
            database,
            schema,
            session_properties,
            http_headers,
            invocation_env,
            connection_parameters,
            connect_retries,
            connect_timeout,
        };
        debug!(
            "Resolved connection to {} using {} authentication",
            credentials.host,
            credentials.auth.auth_type()
        );
        Ok(credentials)
    }
}

/// Unify `catalog`, `database` and the catalog session property into one value
fn resolve_database(
    catalog: Option<String>,
    database: Option<String>,
    session_properties: &mut IndexMap<String, String>,
) -> ConfigResult<Option<String>> {
    let mut resolved = match (catalog, database) {
        (Some(catalog), Some(database)) if catalog != database => {
            return Err(ConfigError::ConfigConflict {
                sources: "catalog".to_string(),
                target: "database",
            });
        }
        (Some(catalog), _) => Some(catalog),
        (None, database) => database,
    };

    let property = session_properties
        .shift_remove(CATALOG_KEY_IN_SESSION_PROPERTIES)
        .filter(|p| !p.is_empty());
    if let Some(property) = property {
        match &resolved {
            Some(current) if *current != property => {
                return Err(ConfigError::ConfigConflict {
                    sources: format!("`{}` in session_properties", CATALOG_KEY_IN_SESSION_PROPERTIES),
                    target: "database",
                });
            }
            Some(_) => {}
            None => resolved = Some(property),
        }
    }

    Ok(resolved)
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// A scalar setting as a string; null and empty strings count as unset
fn string_setting(settings: &Map<String, Value>, key: &str) -> ConfigResult<Option<String>> {
    match settings.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => scalar_to_string(value)
            .map(|s| Some(s).filter(|s| !s.is_empty()))
            .ok_or_else(|| ConfigError::InvalidShape {
                scope: "profile setting",
                key: key.to_string(),
                expected: "a string",
                value: value.to_string(),
            }),
    }
}

fn required_setting(settings: &Map<String, Value>, key: &'static str) -> ConfigResult<String> {
    string_setting(settings, key)?.ok_or(ConfigError::MissingField(key))
}

fn integer_setting(settings: &Map<String, Value>, key: &str) -> ConfigResult<Option<u32>> {
    match settings.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| ConfigError::InvalidShape {
                scope: "profile setting",
                key: key.to_string(),
                expected: "a non-negative integer",
                value: value.to_string(),
            }),
    }
}

fn session_properties(settings: &Map<String, Value>) -> ConfigResult<IndexMap<String, String>> {
    let value = match settings.get("session_properties") {
        None | Some(Value::Null) => return Ok(IndexMap::new()),
        Some(value) => value,
    };
    let object = value.as_object().ok_or_else(|| ConfigError::InvalidShape {
        scope: "profile setting",
        key: "session_properties".to_string(),
        expected: "a mapping",
        value: value.to_string(),
    })?;

    object
        .iter()
        .map(|(key, value)| {
            scalar_to_string(value)
                .map(|s| (key.clone(), s))
                .ok_or_else(|| ConfigError::InvalidShape {
                    scope: "session property",
                    key: key.clone(),
                    expected: "a string, number or boolean",
                    value: value.to_string(),
                })
        })
        .collect()
}

fn connection_parameters(settings: &Map<String, Value>) -> ConfigResult<IndexMap<String, Value>> {
    match settings.get("connection_parameters") {
        None | Some(Value::Null) => Ok(IndexMap::new()),
        Some(Value::Object(object)) => Ok(object
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()),
        Some(value) => Err(ConfigError::InvalidShape {
            scope: "profile setting",
            key: "connection_parameters".to_string(),
            expected: "a mapping",
            value: value.to_string(),
        }),
    }
}
