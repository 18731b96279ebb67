//! Authentication variants
//!
//! Every way of authenticating implements [`CredentialsProvider`]. The
//! resolved credentials hold an [`AuthCredentials`] value, so callers work
//! against the trait and new variants do not change their code.

use super::{ConfigError, ConfigResult};
use std::fmt;

/// Capability shared by all authentication variants
pub trait CredentialsProvider {
    /// Short name of the authentication method
    fn auth_type(&self) -> &'static str;

    /// Parameters handed to the transport layer to authenticate.
    ///
    /// Contains secrets; never log the returned values.
    fn connection_parameters(&self) -> Vec<(&'static str, String)>;
}

/// Personal access token authentication
#[derive(Clone, PartialEq, Eq)]
pub struct TokenCredentials {
    token: String,
}

impl TokenCredentials {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl CredentialsProvider for TokenCredentials {
    fn auth_type(&self) -> &'static str {
        "token"
    }

    fn connection_parameters(&self) -> Vec<(&'static str, String)> {
        vec![("access_token", self.token.clone())]
    }
}

impl fmt::Debug for TokenCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCredentials")
            .field("token", &"<redacted>")
            .finish()
    }
}

/// OAuth machine-to-machine authentication with a service principal
#[derive(Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    client_id: String,
    client_secret: String,
}

impl ClientCredentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }
}

impl CredentialsProvider for ClientCredentials {
    fn auth_type(&self) -> &'static str {
        "oauth-m2m"
    }

    fn connection_parameters(&self) -> Vec<(&'static str, String)> {
        vec![
            ("client_id", self.client_id.clone()),
            ("client_secret", self.client_secret.clone()),
        ]
    }
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Authentication selected for a connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthCredentials {
    Token(TokenCredentials),
    ClientCredentials(ClientCredentials),
}

impl AuthCredentials {
    /// Pick the variant from the raw settings.
    ///
    /// A token wins over client credentials; client credentials need both
    /// the id and the secret.
    pub fn from_settings(
        token: Option<String>,
        client_id: Option<String>,
        client_secret: Option<String>,
    ) -> ConfigResult<Self> {
        match (token, client_id, client_secret) {
            (Some(token), _, _) => Ok(AuthCredentials::Token(TokenCredentials::new(token))),
            (None, Some(id), Some(secret)) => Ok(AuthCredentials::ClientCredentials(
                ClientCredentials::new(id, secret),
            )),
            _ => Err(ConfigError::MissingCredentials),
        }
    }

    fn provider(&self) -> &dyn CredentialsProvider {
        match self {
            AuthCredentials::Token(token) => token,
            AuthCredentials::ClientCredentials(client) => client,
        }
    }

    pub fn token(&self) -> Option<&str> {
        match self {
            AuthCredentials::Token(token) => Some(token.token()),
            AuthCredentials::ClientCredentials(_) => None,
        }
    }

    pub fn client_id(&self) -> Option<&str> {
        match self {
            AuthCredentials::Token(_) => None,
            AuthCredentials::ClientCredentials(client) => Some(client.client_id()),
        }
    }
}

impl CredentialsProvider for AuthCredentials {
    fn auth_type(&self) -> &'static str {
        self.provider().auth_type()
    }

    fn connection_parameters(&self) -> Vec<(&'static str, String)> {
        self.provider().connection_parameters()
    }
}
