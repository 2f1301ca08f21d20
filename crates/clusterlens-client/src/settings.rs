//! Connection settings and credential material
//!
//! The settings struct is the unit of configuration, persistence, and
//! broadcast: it is replaced wholesale on re-initialization and handed out
//! to consumers as a clone, never mutated field-by-field.

use std::collections::HashMap;

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use serde::{Deserialize, Serialize};

/// Credential material for a cluster connection.
///
/// Two shapes are supported: a basic username/password pair and an api-key
/// id/secret pair. A pair only derives an `Authorization` header when both of
/// its fields are present.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl AuthSettings {
    /// Basic username/password credentials
    pub fn basic(username: &str, password: &str) -> Self {
        Self {
            username: Some(username.to_string()),
            password: Some(password.to_string()),
            ..Self::default()
        }
    }

    /// Api-key credentials
    pub fn api_key(api_key_id: &str, api_key: &str) -> Self {
        Self {
            api_key_id: Some(api_key_id.to_string()),
            api_key: Some(api_key.to_string()),
            ..Self::default()
        }
    }

    fn has_api_key_pair(&self) -> bool {
        self.api_key_id.is_some() && self.api_key.is_some()
    }

    fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.password.is_none()
            && self.api_key_id.is_none()
            && self.api_key.is_none()
    }

    /// Reduce to at most one credential shape.
    ///
    /// A complete api-key pair displaces basic credentials; otherwise the
    /// basic fields are kept (even incomplete), and leftover api-key
    /// material is kept only when there is nothing else.
    pub(crate) fn normalized(self) -> Option<Self> {
        if self.is_empty() {
            return None;
        }

        if self.has_api_key_pair() {
            return Some(Self {
                api_key_id: self.api_key_id,
                api_key: self.api_key,
                ..Self::default()
            });
        }

        if self.username.is_some() || self.password.is_some() {
            return Some(Self {
                username: self.username,
                password: self.password,
                ..Self::default()
            });
        }

        Some(Self {
            api_key_id: self.api_key_id,
            api_key: self.api_key,
            ..Self::default()
        })
    }
}

/// The active cluster connection configuration
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionSettings {
    /// Cluster base URL, e.g. `http://localhost:9200`
    pub host: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth: Option<AuthSettings>,
}

impl ConnectionSettings {
    /// Settings for an unauthenticated connection
    pub fn new(host: &str) -> Self {
        Self {
            host: host.to_string(),
            auth: None,
        }
    }

    /// Attach credential material
    pub fn with_auth(mut self, auth: AuthSettings) -> Self {
        self.auth = Some(auth);
        self
    }

    /// The host with a single trailing `/` removed.
    ///
    /// Only one level is stripped; `http://x//` becomes `http://x/`.
    pub fn effective_host(&self) -> String {
        self.host
            .strip_suffix('/')
            .unwrap_or(&self.host)
            .to_string()
    }

    /// Authorization headers derived from the credential material.
    ///
    /// Empty when there are no credentials or a pair is incomplete. Both
    /// construction steps run, so an api-key pair overwrites a basic pair in
    /// the merged result.
    pub fn auth_headers(&self) -> HashMap<&'static str, String> {
        let mut headers = HashMap::new();

        let Some(auth) = &self.auth else {
            return headers;
        };

        if let (Some(username), Some(password)) = (&auth.username, &auth.password) {
            let token = BASE64.encode(format!("{username}:{password}"));
            headers.insert("Authorization", format!("Basic {token}"));
        }

        if let (Some(id), Some(key)) = (&auth.api_key_id, &auth.api_key) {
            let token = BASE64.encode(format!("{id}:{key}"));
            headers.insert("Authorization", format!("ApiKey {token}"));
        }

        headers
    }
}
