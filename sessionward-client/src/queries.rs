//! Provider/Linked-Account Query Facade
//!
//! Read-only and uncached. A request context answers from its own
//! accessors; otherwise the endpoint is fetched.

use serde_json::Value;
use sessionward_core::{
    EndpointConfig, ErrorContext, HttpRequest, HttpTransport, SessionWardError, SessionWardResult,
};
use std::sync::Arc;

use crate::session::ExecutionContext;
use crate::transport::status_error;

#[derive(Clone)]
pub struct ProviderQueries {
    transport: Arc<dyn HttpTransport>,
    providers_path: String,
    linked_path: String,
}

impl ProviderQueries {
    pub fn new(transport: Arc<dyn HttpTransport>, endpoints: &EndpointConfig) -> Self {
        Self {
            transport,
            providers_path: endpoints.providers.clone(),
            linked_path: endpoints.linked.clone(),
        }
    }

    /// Configured identity providers
    pub async fn list_providers(&self, context: ExecutionContext<'_>) -> SessionWardResult<Value> {
        match context {
            ExecutionContext::Request(request) => request.providers().await,
            _ => self.fetch_json(&self.providers_path, "providers", context).await,
        }
    }

    /// Accounts linked to the current principal
    pub async fn list_linked_accounts(
        &self,
        context: ExecutionContext<'_>,
    ) -> SessionWardResult<Value> {
        match context {
            ExecutionContext::Request(request) => request.linked_accounts().await,
            _ => {
                self.fetch_json(&self.linked_path, "linked accounts", context)
                    .await
            }
        }
    }

    async fn fetch_json(
        &self,
        path: &str,
        resource: &str,
        context: ExecutionContext<'_>,
    ) -> SessionWardResult<Value> {
        if matches!(context, ExecutionContext::Detached) {
            return Err(query_error(
                resource,
                sessionward_core::transport_error!("No network available", "provider_queries"),
            ));
        }

        let response = self
            .transport
            .send(HttpRequest::get(path))
            .await
            .map_err(|e| query_error(resource, e))?;

        if !response.is_success() {
            return Err(query_error(
                resource,
                status_error(&response, path, "provider_queries"),
            ));
        }

        response.json().map_err(|e| query_error(resource, e))
    }
}

fn query_error<E>(resource: &str, source: E) -> SessionWardError
where
    E: std::error::Error + Send + Sync + 'static,
{
    SessionWardError::ProviderQuery {
        resource: resource.to_string(),
        source: Some(Box::new(source)),
        context: ErrorContext::new("provider_queries").with_operation("fetch"),
    }
}
