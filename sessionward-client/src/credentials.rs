//! Credentialed Request Executor
//!
//! Sign-in and sign-out as form-encoded POSTs, each guarded by a CSRF token
//! fetched immediately beforehand.

use serde_json::Value;
use sessionward_core::{
    EndpointConfig, ErrorContext, HttpRequest, HttpTransport, SessionWardError, SessionWardResult,
    SignInParams,
};
use std::sync::Arc;
use tracing::{info, warn};

use crate::csrf::CsrfTokenProvider;
use crate::form::{encode_form, with_csrf_token, REQUESTED_WITH_HEADER, REQUESTED_WITH_VALUE};
use crate::session::SessionCache;
use crate::transport::status_error;

#[derive(Clone)]
pub struct CredentialedRequests {
    transport: Arc<dyn HttpTransport>,
    csrf: CsrfTokenProvider,
    cache: SessionCache,
    signin_path: String,
    email_signin_path: String,
    signout_path: String,
}

impl CredentialedRequests {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        csrf: CsrfTokenProvider,
        cache: SessionCache,
        endpoints: &EndpointConfig,
    ) -> Self {
        Self {
            transport,
            csrf,
            cache,
            signin_path: endpoints.signin.clone(),
            email_signin_path: endpoints.email_signin.clone(),
            signout_path: endpoints.signout.clone(),
        }
    }

    /// Submit a sign-in.
    ///
    /// `Ok(false)` means the server answered but did not accept the
    /// credentials. `Err` means the exchange itself failed. On `Ok(true)` the
    /// cached session is dropped so the next read picks up the new state.
    pub async fn sign_in(&self, params: SignInParams) -> SessionWardResult<bool> {
        let (path, fields) = match params {
            SignInParams::Email(address) => (
                self.email_signin_path.as_str(),
                vec![("email".to_string(), address)],
            ),
            SignInParams::Credentials(fields) => (self.signin_path.as_str(), fields),
        };

        let token = self.csrf.fetch_token().await.map_err(sign_in_error)?;
        let body = encode_form(&with_csrf_token(fields, token));

        let request = HttpRequest::post_form(path, body)
            .with_header(REQUESTED_WITH_HEADER, REQUESTED_WITH_VALUE);

        let response = self.transport.send(request).await.map_err(sign_in_error)?;

        if !response.is_success() {
            return Err(sign_in_error(status_error(&response, path, "credentials")));
        }

        let outcome: Value = response.json().map_err(sign_in_error)?;
        let accepted = outcome.get("success") == Some(&Value::Bool(true));

        if accepted {
            if !self.cache.invalidate().await {
                warn!("Could not clear cached session after sign-in");
            }
            info!(endpoint = path, "Sign-in accepted");
        } else {
            info!(endpoint = path, "Sign-in rejected by server");
        }

        Ok(accepted)
    }

    /// Sign out, local-first.
    ///
    /// The cached session is dropped before anything touches the network and
    /// stays dropped even if the POST fails.
    pub async fn sign_out(&self) -> SessionWardResult<()> {
        if !self.cache.invalidate().await {
            warn!("Could not clear cached session during sign-out");
        }

        let token = self.csrf.fetch_token().await.map_err(sign_out_error)?;
        let body = encode_form(&with_csrf_token(Vec::new(), token));

        let response = self
            .transport
            .send(HttpRequest::post_form(&self.signout_path, body))
            .await
            .map_err(sign_out_error)?;

        if !response.is_success() {
            return Err(sign_out_error(status_error(
                &response,
                &self.signout_path,
                "credentials",
            )));
        }

        info!("Signed out");
        Ok(())
    }
}

fn sign_in_error<E>(source: E) -> SessionWardError
where
    E: std::error::Error + Send + Sync + 'static,
{
    SessionWardError::SignIn {
        source: Some(Box::new(source)),
        context: ErrorContext::new("credentials").with_operation("sign_in"),
    }
}

fn sign_out_error<E>(source: E) -> SessionWardError
where
    E: std::error::Error + Send + Sync + 'static,
{
    SessionWardError::SignOut {
        source: Some(Box::new(source)),
        context: ErrorContext::new("credentials")
            .with_operation("sign_out")
            .with_suggestion("The local session is already cleared; the server session may outlive it"),
    }
}
