//! Tests for connection configuration resolution

use databricks_adapter_sdk::config::env::{ENV_HTTP_SESSION_HEADERS, ENV_INVOCATION_ENV};
use databricks_adapter_sdk::config::{
    CATALOG_KEY_IN_SESSION_PROPERTIES, ConfigError, ConnectionResolver, CredentialsProvider,
    EnvSnapshot, ProfileConfig, ProfilesFile, ProjectConfig,
};
use serde_json::{Value, json};
use serial_test::serial;

const TOKEN: &str = "dapiXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXX";

fn output() -> Value {
    json!({
        "type": "databricks",
        "catalog": "main",
        "schema": "analytics",
        "host": "yourorg.databricks.com",
        "http_path": "sql/protocolv1/o/1234567890123456/1234-567890-test123",
        "token": TOKEN,
        "session_properties": {"spark.sql.ansi.enabled": "true"},
    })
}

fn output_with(entries: &[(&str, Value)]) -> Value {
    let mut settings = output();
    for (key, value) in entries {
        settings[*key] = value.clone();
    }
    settings
}

fn profile(settings: Value) -> ProfileConfig {
    ProfileConfig::new("test").with_output("test", settings)
}

fn resolve_with_env(
    env: EnvSnapshot,
    settings: Value,
) -> Result<databricks_adapter_sdk::ConnectionCredentials, ConfigError> {
    ConnectionResolver::new(env).resolve_profile(&profile(settings), None)
}

fn resolve(settings: Value) -> Result<databricks_adapter_sdk::ConnectionCredentials, ConfigError> {
    resolve_with_env(EnvSnapshot::empty(), settings)
}

fn headers_env(raw: &str) -> EnvSnapshot {
    EnvSnapshot::from_vars([(ENV_HTTP_SESSION_HEADERS, raw)])
}

mod resolution_tests {
    use super::*;

    #[test]
    fn test_connection() {
        let creds = resolve(output()).unwrap();
        assert_eq!(creds.host(), "yourorg.databricks.com");
        assert_eq!(
            creds.http_path(),
            "sql/protocolv1/o/1234567890123456/1234-567890-test123"
        );
        assert_eq!(creds.token(), Some(TOKEN));
        assert_eq!(creds.schema(), "analytics");
        assert_eq!(creds.session_properties().len(), 1);
        assert_eq!(
            creds.session_properties()["spark.sql.ansi.enabled"],
            "true"
        );
    }

    #[test]
    fn test_catalog_connection() {
        let creds = resolve(output()).unwrap();
        assert_eq!(creds.database(), Some("main"));
        let args = creds.connect_arguments();
        assert_eq!(args["catalog"], json!("main"));
        assert_eq!(args["http_headers"], Value::Null);
        assert_eq!(args["access_token"], json!(TOKEN));
    }

    #[test]
    fn test_from_documents() {
        let profiles = ProfilesFile::parse(
            r#"
analytics:
  target: dev
  outputs:
    dev:
      type: databricks
      host: yourorg.databricks.com
      http_path: /sql/1.0/warehouses/abc123
      schema: dev_schema
      client_id: foo
      client_secret: bar
    prod:
      type: databricks
      host: yourorg.databricks.com
      http_path: /sql/1.0/warehouses/def456
      schema: prod_schema
      token: dapiYYYY
"#,
        )
        .unwrap();

        let project = ProjectConfig::parse("name: analytics\nconfig-version: 2\n").unwrap();
        let resolver = ConnectionResolver::new(EnvSnapshot::empty());
        let creds = resolver.resolve(&project, &profiles).unwrap();
        assert_eq!(creds.schema(), "dev_schema");
        assert_eq!(creds.auth().auth_type(), "oauth-m2m");
        assert_eq!(creds.warehouse_id().as_deref(), Some("abc123"));
        assert!(creds.database().is_none());

        let project = ProjectConfig::parse("name: analytics\ntarget: prod\n").unwrap();
        let creds = resolver.resolve(&project, &profiles).unwrap();
        assert_eq!(creds.schema(), "prod_schema");
        assert_eq!(creds.token(), Some("dapiYYYY"));

        let project = ProjectConfig::parse("name: analytics\ntarget: staging\n").unwrap();
        assert_eq!(
            resolver.resolve(&project, &profiles).unwrap_err(),
            ConfigError::UnknownTarget("staging".to_string())
        );
    }

    #[test]
    fn test_client_creds_settings() {
        let mut settings = output_with(&[("client_id", json!("foo")), ("client_secret", json!("bar"))]);
        settings.as_object_mut().unwrap().remove("token");

        let creds = resolve(settings).unwrap();
        assert!(creds.token().is_none());
        let args = creds.connect_arguments();
        assert_eq!(args["client_id"], json!("foo"));
        assert_eq!(args["client_secret"], json!("bar"));
    }
}

mod validation_tests {
    use super::*;

    #[test]
    fn test_two_catalog_settings() {
        let err = resolve(output_with(&[(
            "session_properties",
            json!({
                CATALOG_KEY_IN_SESSION_PROPERTIES: "catalog",
                "spark.sql.ansi.enabled": "true",
            }),
        )]))
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Got duplicate keys: (`databricks.catalog` in session_properties) all map to \"database\""
        );
    }

    #[test]
    fn test_database_and_catalog_settings() {
        let err = resolve(output_with(&[
            ("catalog", json!("main")),
            ("database", json!("database")),
        ]))
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Got duplicate keys: (catalog) all map to \"database\""
        );
    }

    #[test]
    fn test_reserved_connection_parameters() {
        let err = resolve(output_with(&[(
            "connection_parameters",
            json!({"server_hostname": "theirorg.databricks.com"}),
        )]))
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "The connection parameter `server_hostname` is reserved."
        );
    }

    #[test]
    fn test_invalid_http_headers() {
        for http_headers in [json!("a"), json!(["a", "b"]), json!({"a": 1, "b": 2})] {
            let err = resolve(output_with(&[(
                "connection_parameters",
                json!({"http_headers": http_headers}),
            )]))
            .unwrap_err();
            assert!(
                err.to_string()
                    .starts_with("The connection parameter `http_headers` should be dict of strings")
            );
        }
    }

    #[test]
    fn test_invalid_custom_user_agent() {
        let err = resolve_with_env(
            EnvSnapshot::from_vars([(ENV_INVOCATION_ENV, "(Some-thing)")]),
            output(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("Invalid invocation environment"));
    }

    #[test]
    fn test_custom_user_agent() {
        let creds = resolve_with_env(
            EnvSnapshot::from_vars([(ENV_INVOCATION_ENV, "databricks-workflows")]),
            output(),
        )
        .unwrap();
        assert_eq!(
            creds.user_agent_entry(),
            format!(
                "databricks-adapter-sdk/{}; databricks-workflows",
                env!("CARGO_PKG_VERSION")
            )
        );
    }
}

mod http_headers_tests {
    use super::*;

    fn merged(
        env: &str,
        user: Option<Value>,
    ) -> Result<Option<Vec<(String, String)>>, ConfigError> {
        let settings = match user {
            Some(headers) => output_with(&[(
                "connection_parameters",
                json!({"http_headers": headers}),
            )]),
            None => output(),
        };
        resolve_with_env(headers_env(env), settings)
            .map(|creds| creds.http_headers().map(<[_]>::to_vec))
    }

    fn pairs(entries: &[(&str, &str)]) -> Vec<(String, String)> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_environment_single_http_header() {
        assert_eq!(
            merged(r#"{"test":{"jobId":1,"runId":12123}}"#, None).unwrap(),
            Some(pairs(&[("test", r#"{"jobId": 1, "runId": 12123}"#)]))
        );
    }

    #[test]
    fn test_environment_multiple_http_headers() {
        assert_eq!(
            merged(
                r#"{"test":{"jobId":1,"runId":12123},"dummy":{"jobId":1,"runId":12123}}"#,
                None
            )
            .unwrap(),
            Some(pairs(&[
                ("test", r#"{"jobId": 1, "runId": 12123}"#),
                ("dummy", r#"{"jobId": 1, "runId": 12123}"#),
            ]))
        );
    }

    #[test]
    fn test_environment_users_http_headers_intersection_error() {
        let err = merged(
            r#"{"t":{"jobId":1,"runId":12123},"d":{"jobId":1,"runId":12123}}"#,
            Some(json!({"t": "test", "nothing": "nothing"})),
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Intersection with reserved http_headers in keys: {'t'}"
        );
    }

    #[test]
    fn test_environment_users_http_headers_union_success() {
        assert_eq!(
            merged(
                r#"{"t":{"jobId":1,"runId":12123},"d":{"jobId":1,"runId":12123}}"#,
                Some(json!({"nothing": "nothing"})),
            )
            .unwrap(),
            Some(pairs(&[
                ("t", r#"{"jobId": 1, "runId": 12123}"#),
                ("d", r#"{"jobId": 1, "runId": 12123}"#),
                ("nothing", "nothing"),
            ]))
        );
    }

    #[test]
    fn test_environment_http_headers_string() {
        assert_eq!(
            merged(r#"{"string":"some-string"}"#, None).unwrap(),
            Some(pairs(&[("string", "some-string")]))
        );
    }

    #[test]
    #[serial]
    fn test_environment_captured_from_process() {
        // SAFETY: serialized with the other tests touching the environment
        unsafe {
            std::env::set_var(ENV_HTTP_SESSION_HEADERS, r#"{"string":"some-string"}"#);
        }
        let env = EnvSnapshot::capture();
        unsafe {
            std::env::remove_var(ENV_HTTP_SESSION_HEADERS);
        }

        let creds = resolve_with_env(env, output()).unwrap();
        assert_eq!(
            creds.http_headers().map(<[_]>::to_vec),
            Some(pairs(&[("string", "some-string")]))
        );
    }
}
