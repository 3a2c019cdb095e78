//! Core data type definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Client-visible authentication state.
///
/// Serialized with the same camelCase keys the auth server uses, so a cached
/// entry and a server payload share one shape. `expires` is stored as
/// milliseconds since the Unix epoch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Instant after which the session must be revalidated
    #[serde(
        default,
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub expires: Option<DateTime<Utc>>,
    /// Anti-forgery token, present on sessions read from a request context
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub csrf_token: Option<String>,
    /// Authenticated principal, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<Value>,
    /// Server hint (milliseconds) used to stamp `expires`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revalidate_age: Option<i64>,
    /// Any other provider-defined claims
    #[serde(flatten)]
    pub claims: Map<String, Value>,
}

impl Session {
    /// A session with no keys at all. Treated exactly like an absent one.
    pub fn is_empty(&self) -> bool {
        self.expires.is_none()
            && self.csrf_token.is_none()
            && self.user.is_none()
            && self.revalidate_age.is_none()
            && self.claims.is_empty()
    }

    /// Whether the session may be returned without revalidation at `now`
    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_empty() && self.expires.is_some_and(|expires| expires > now)
    }

    pub fn is_usable(&self) -> bool {
        self.is_usable_at(Utc::now())
    }

    pub fn is_signed_in(&self) -> bool {
        self.user.as_ref().is_some_and(|user| !user.is_null())
    }
}

/// Session state embedded in a server-side request (cookie/session sub-structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextSessionState {
    pub csrf_token: Option<String>,
    pub expires: Option<DateTime<Utc>>,
}

/// Request context whose state is set up front by the host framework.
#[derive(Debug, Clone, Default)]
pub struct StaticRequestContext {
    pub session: Option<ContextSessionState>,
    pub principal: Option<Value>,
    pub providers: Option<Value>,
    pub linked_accounts: Option<Value>,
}

impl StaticRequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(mut self, csrf_token: Option<String>, expires: Option<DateTime<Utc>>) -> Self {
        self.session = Some(ContextSessionState {
            csrf_token,
            expires,
        });
        self
    }

    pub fn with_principal(mut self, principal: Value) -> Self {
        self.principal = Some(principal);
        self
    }

    pub fn with_providers(mut self, providers: Value) -> Self {
        self.providers = Some(providers);
        self
    }

    pub fn with_linked_accounts(mut self, linked_accounts: Value) -> Self {
        self.linked_accounts = Some(linked_accounts);
        self
    }
}

/// Sign-in request, resolved by the caller before it reaches the executor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignInParams {
    /// Passwordless email-link sign-in
    Email(String),
    /// Arbitrary form fields for the credential endpoint, in caller order
    Credentials(Vec<(String, String)>),
}

impl SignInParams {
    pub fn email(address: impl Into<String>) -> Self {
        SignInParams::Email(address.into())
    }

    pub fn credentials<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        SignInParams::Credentials(
            fields
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

impl From<&str> for SignInParams {
    fn from(address: &str) -> Self {
        SignInParams::email(address)
    }
}

/// HTTP verbs used against the auth endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// A same-origin request handed to an `HttpTransport`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    /// Absolute path on the auth origin, e.g. `/auth/session`
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            path: path.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn post_form(path: impl Into<String>, body: String) -> Self {
        Self {
            method: HttpMethod::Post,
            path: path.into(),
            headers: vec![(
                "Content-Type".to_string(),
                "application/x-www-form-urlencoded".to_string(),
            )],
            body: Some(body),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Status and raw body of a completed exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Origin of the auth server, e.g. `https://app.example.com`
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    pub user_agent: String,
    /// Additional headers sent with every request
    pub headers: HashMap<String, String>,
    pub endpoints: EndpointConfig,
    pub storage: StorageConfig,
    pub logging: crate::logging::LoggingConfig,
}

/// Paths of the auth endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    pub session: String,
    pub csrf: String,
    pub linked: String,
    pub providers: String,
    pub signin: String,
    pub email_signin: String,
    pub signout: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Directory used by the file backend
    pub data_dir: String,
    /// Name of the cache entry holding the session
    pub session_key: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    File,
    /// Every access fails, as in sandboxed or private browsing contexts
    Disabled,
}
