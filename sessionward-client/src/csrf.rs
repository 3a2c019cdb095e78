//! CSRF Token Provider
//!
//! Tokens are fetched fresh for every mutating request and never cached.

use serde::Deserialize;
use sessionward_core::{
    ErrorContext, HttpRequest, HttpTransport, SessionWardError, SessionWardResult,
};
use std::sync::Arc;
use tracing::debug;

use crate::transport::status_error;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CsrfResponse {
    csrf_token: String,
}

#[derive(Clone)]
pub struct CsrfTokenProvider {
    transport: Arc<dyn HttpTransport>,
    path: String,
}

impl CsrfTokenProvider {
    pub fn new(transport: Arc<dyn HttpTransport>, path: impl Into<String>) -> Self {
        Self {
            transport,
            path: path.into(),
        }
    }

    /// One round trip to the CSRF endpoint.
    ///
    /// Call immediately before building each mutating request; the returned
    /// token must not outlive that request.
    pub async fn fetch_token(&self) -> SessionWardResult<String> {
        let response = self
            .transport
            .send(HttpRequest::get(&self.path))
            .await
            .map_err(token_fetch_error)?;

        if !response.is_success() {
            return Err(token_fetch_error(status_error(
                &response,
                &self.path,
                "csrf_provider",
            )));
        }

        let body: CsrfResponse = response.json().map_err(token_fetch_error)?;

        debug!("Fetched CSRF token");
        Ok(body.csrf_token)
    }
}

fn token_fetch_error<E>(source: E) -> SessionWardError
where
    E: std::error::Error + Send + Sync + 'static,
{
    SessionWardError::TokenFetch {
        source: Some(Box::new(source)),
        context: ErrorContext::new("csrf_provider").with_operation("fetch_token"),
    }
}
