//! Core trait definitions

use crate::error::{ErrorContext, SessionWardError, SessionWardResult, StorageError};
use crate::types::*;
use async_trait::async_trait;
use serde_json::Value;

/// Raw key-value persistence (the browser-storage role)
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the raw serialized value stored under `key`
    async fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store a serialized value under `key`, replacing any previous one
    async fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;
}

/// Black-box HTTP capability bound to the auth origin
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Perform one exchange. Non-success statuses are returned, not raised;
    /// `Err` means the exchange itself failed.
    async fn send(&self, request: HttpRequest) -> SessionWardResult<HttpResponse>;
}

/// Server-side request whose session state was already resolved by the host
/// framework. Read-only to this crate.
#[async_trait]
pub trait RequestContext: Send + Sync {
    /// Embedded cookie/session state, if the request carries a session
    fn session_state(&self) -> Option<ContextSessionState>;

    /// Authenticated principal attached to the request
    fn principal(&self) -> Option<Value>;

    /// Configured identity providers, as known to the host
    async fn providers(&self) -> SessionWardResult<Value>;

    /// Accounts linked to the current principal
    async fn linked_accounts(&self) -> SessionWardResult<Value>;
}

#[async_trait]
impl RequestContext for StaticRequestContext {
    fn session_state(&self) -> Option<ContextSessionState> {
        self.session.clone()
    }

    fn principal(&self) -> Option<Value> {
        self.principal.clone()
    }

    async fn providers(&self) -> SessionWardResult<Value> {
        self.providers
            .clone()
            .ok_or_else(|| missing_context_value("providers"))
    }

    async fn linked_accounts(&self) -> SessionWardResult<Value> {
        self.linked_accounts
            .clone()
            .ok_or_else(|| missing_context_value("linked accounts"))
    }
}

fn missing_context_value(resource: &str) -> SessionWardError {
    SessionWardError::ProviderQuery {
        resource: resource.to_string(),
        source: None,
        context: ErrorContext::new("request_context")
            .with_operation("read")
            .with_suggestion("Populate the request context before rendering"),
    }
}
