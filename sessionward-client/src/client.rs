//! `SessionClient` - one handle over the session cache, the credentialed
//! requests and the provider queries, sharing a transport and a store.

use serde_json::Value;
use sessionward_core::{
    config_error, ClientConfig, EndpointConfig, ErrorContext, HttpTransport, KeyValueStore,
    Session, SessionWardError, SessionWardResult, SignInParams, StorageBackend,
    DEFAULT_SESSION_KEY,
};
use std::sync::Arc;
use tracing::info;

use crate::credentials::CredentialedRequests;
use crate::csrf::CsrfTokenProvider;
use crate::queries::ProviderQueries;
use crate::session::{ExecutionContext, GetSessionOptions, SessionCache};
use crate::store::{DisabledStore, FileStore, LocalStore, MemoryStore};
use crate::transport::ReqwestTransport;

#[derive(Clone)]
pub struct SessionClient {
    cache: SessionCache,
    csrf: CsrfTokenProvider,
    credentials: CredentialedRequests,
    queries: ProviderQueries,
}

impl SessionClient {
    pub fn builder() -> SessionClientBuilder {
        SessionClientBuilder::default()
    }

    /// Build a client with a reqwest transport and the configured store
    pub fn from_config(config: &ClientConfig) -> SessionWardResult<Self> {
        config.validate()?;

        let transport = Arc::new(ReqwestTransport::new(config)?);

        let store: Arc<dyn KeyValueStore> = match config.storage.backend {
            StorageBackend::Memory => Arc::new(MemoryStore::new()),
            StorageBackend::File => Arc::new(FileStore::new(&config.storage.data_dir).map_err(
                |e| SessionWardError::Storage {
                    message: format!("Failed to open local store: {}", e),
                    source: Some(Box::new(e)),
                    context: ErrorContext::new("session_client")
                        .with_operation("from_config")
                        .with_metadata("data_dir", &config.storage.data_dir),
                },
            )?),
            StorageBackend::Disabled => Arc::new(DisabledStore),
        };

        info!(
            base_url = %config.base_url,
            backend = ?config.storage.backend,
            "Session client configured"
        );

        Self::builder()
            .transport(transport)
            .store(store)
            .endpoints(config.endpoints.clone())
            .session_key(config.storage.session_key.clone())
            .build()
    }

    pub async fn get_session(&self, options: GetSessionOptions<'_>) -> SessionWardResult<Session> {
        self.cache.get_session(options).await
    }

    pub async fn get_csrf_token(&self) -> SessionWardResult<String> {
        self.csrf.fetch_token().await
    }

    /// A bare `&str` signs in by email link
    pub async fn sign_in(&self, params: impl Into<SignInParams>) -> SessionWardResult<bool> {
        self.credentials.sign_in(params.into()).await
    }

    pub async fn sign_out(&self) -> SessionWardResult<()> {
        self.credentials.sign_out().await
    }

    pub async fn list_providers(&self, context: ExecutionContext<'_>) -> SessionWardResult<Value> {
        self.queries.list_providers(context).await
    }

    pub async fn list_linked_accounts(
        &self,
        context: ExecutionContext<'_>,
    ) -> SessionWardResult<Value> {
        self.queries.list_linked_accounts(context).await
    }

    pub fn cache(&self) -> &SessionCache {
        &self.cache
    }
}

pub struct SessionClientBuilder {
    transport: Option<Arc<dyn HttpTransport>>,
    store: Option<Arc<dyn KeyValueStore>>,
    endpoints: EndpointConfig,
    session_key: String,
}

impl Default for SessionClientBuilder {
    fn default() -> Self {
        Self {
            transport: None,
            store: None,
            endpoints: EndpointConfig::default(),
            session_key: DEFAULT_SESSION_KEY.to_string(),
        }
    }
}

impl SessionClientBuilder {
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Defaults to an in-memory store
    pub fn store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn endpoints(mut self, endpoints: EndpointConfig) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn session_key(mut self, session_key: impl Into<String>) -> Self {
        self.session_key = session_key.into();
        self
    }

    pub fn build(self) -> SessionWardResult<SessionClient> {
        let transport = self
            .transport
            .ok_or_else(|| config_error!("A transport is required", "session_client"))?;

        let store = LocalStore::new(
            self.store
                .unwrap_or_else(|| Arc::new(MemoryStore::new()) as Arc<dyn KeyValueStore>),
        );

        let cache = SessionCache::new(
            store,
            transport.clone(),
            self.endpoints.session.clone(),
            self.session_key,
        );
        let csrf = CsrfTokenProvider::new(transport.clone(), self.endpoints.csrf.clone());
        let credentials =
            CredentialedRequests::new(transport.clone(), csrf.clone(), cache.clone(), &self.endpoints);
        let queries = ProviderQueries::new(transport, &self.endpoints);

        Ok(SessionClient {
            cache,
            csrf,
            credentials,
            queries,
        })
    }
}
