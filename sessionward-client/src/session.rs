//! Session Cache Controller
//!
//! Per call, picks one of three sources for the session:
//!
//! 1. a server-side [`RequestContext`], trusted as-is with no storage or
//!    network access;
//! 2. the local cache, when the cached session is non-empty and unexpired;
//! 3. the session endpoint, whose answer is stamped with
//!    `expires = now + revalidateAge` and written back to the cache.
//!
//! Concurrent calls are not de-duplicated. Each one re-checks the cache and
//! may issue its own fetch; the last write-back wins.

use chrono::{DateTime, TimeDelta, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};
use sessionward_core::{
    ErrorContext, HttpRequest, HttpTransport, RequestContext, Session, SessionWardError,
    SessionWardResult,
};
use std::sync::Arc;
use tracing::debug;

use crate::store::LocalStore;
use crate::transport::status_error;

/// Where the current call is executing
#[derive(Clone, Copy, Default)]
pub enum ExecutionContext<'a> {
    /// Inside a server-side request whose state the host already resolved
    Request(&'a dyn RequestContext),
    /// Client-side, with networking available
    #[default]
    Client,
    /// No request object and no networking, e.g. static pre-rendering
    Detached,
}

impl std::fmt::Debug for ExecutionContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionContext::Request(_) => f.write_str("Request"),
            ExecutionContext::Client => f.write_str("Client"),
            ExecutionContext::Detached => f.write_str("Detached"),
        }
    }
}

/// Options for [`SessionCache::get_session`]
#[derive(Debug, Clone, Copy, Default)]
pub struct GetSessionOptions<'a> {
    pub context: ExecutionContext<'a>,
    /// Drop the cached entry and go to the network
    pub force_refresh: bool,
}

impl<'a> GetSessionOptions<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_request(request: &'a dyn RequestContext) -> Self {
        Self {
            context: ExecutionContext::Request(request),
            force_refresh: false,
        }
    }

    pub fn detached() -> Self {
        Self {
            context: ExecutionContext::Detached,
            force_refresh: false,
        }
    }

    pub fn force_refresh(mut self) -> Self {
        self.force_refresh = true;
        self
    }
}

/// Body of the session endpoint. `clientMaxAge` is the legacy name of the
/// revalidation hint; `revalidateAge` wins when both are sent. Hints may be
/// fractional and are truncated to whole milliseconds. A server-sent
/// `expires` is dropped and recomputed.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionPayload {
    #[serde(default)]
    revalidate_age: Option<f64>,
    #[serde(default)]
    client_max_age: Option<f64>,
    #[serde(default)]
    csrf_token: Option<String>,
    #[serde(default)]
    user: Option<Value>,
    #[serde(flatten)]
    claims: Map<String, Value>,
}

impl SessionPayload {
    fn age_hint_ms(&self) -> Option<i64> {
        self.revalidate_age
            .or(self.client_max_age)
            .filter(|hint| hint.is_finite())
            .map(|hint| hint.trunc() as i64)
    }

    fn into_session(mut self, now: DateTime<Utc>) -> Session {
        self.claims.remove("expires");

        let revalidate_age = self.age_hint_ms();
        let expires = revalidate_age
            .and_then(TimeDelta::try_milliseconds)
            .and_then(|age| now.checked_add_signed(age));

        Session {
            expires,
            csrf_token: self.csrf_token,
            user: self.user,
            revalidate_age,
            claims: self.claims,
        }
    }
}

/// The session state machine
#[derive(Clone)]
pub struct SessionCache {
    store: LocalStore,
    transport: Arc<dyn HttpTransport>,
    session_path: String,
    session_key: String,
}

impl SessionCache {
    pub fn new(
        store: LocalStore,
        transport: Arc<dyn HttpTransport>,
        session_path: impl Into<String>,
        session_key: impl Into<String>,
    ) -> Self {
        Self {
            store,
            transport,
            session_path: session_path.into(),
            session_key: session_key.into(),
        }
    }

    /// Resolve the current session.
    ///
    /// An empty `Session` means "no session" and is a normal result. `Err`
    /// is only returned when the session endpoint had to be consulted and
    /// could not be read.
    pub async fn get_session(&self, options: GetSessionOptions<'_>) -> SessionWardResult<Session> {
        let candidate = match options.context {
            ExecutionContext::Request(request) => {
                let session = session_from_request(request);
                if session.is_usable_at(Utc::now()) {
                    return Ok(session);
                }
                // Server-side: nothing to revalidate against
                debug!("Request context carries no usable session");
                return Ok(Session::default());
            }
            ExecutionContext::Client | ExecutionContext::Detached => {
                if options.force_refresh {
                    self.invalidate().await;
                    None
                } else {
                    self.store.get::<Session>(&self.session_key).await
                }
            }
        };

        // Freshness is judged once the read has returned
        if let Some(session) = candidate.filter(|session| session.is_usable_at(Utc::now())) {
            debug!("Serving session from local cache");
            return Ok(session);
        }

        if matches!(options.context, ExecutionContext::Detached) {
            debug!("No network available; resolving to an empty session");
            return Ok(Session::default());
        }

        self.revalidate().await
    }

    /// Drop the cached session; `false` if the store refused
    pub async fn invalidate(&self) -> bool {
        self.store.remove(&self.session_key).await
    }

    async fn revalidate(&self) -> SessionWardResult<Session> {
        debug!("Revalidating session against {}", self.session_path);

        let response = self
            .transport
            .send(HttpRequest::get(&self.session_path))
            .await
            .map_err(session_fetch_error)?;

        if !response.is_success() {
            return Err(session_fetch_error(status_error(
                &response,
                &self.session_path,
                "session_cache",
            )));
        }

        let payload: SessionPayload = response.json().map_err(session_fetch_error)?;
        let session = payload.into_session(Utc::now());

        if !self.store.set(&self.session_key, &session).await {
            debug!("Session not cached; the next call will revalidate again");
        }

        Ok(session)
    }
}

fn session_from_request(request: &dyn RequestContext) -> Session {
    let Some(state) = request.session_state() else {
        return Session::default();
    };

    Session {
        expires: state.expires,
        csrf_token: state.csrf_token,
        user: request.principal(),
        ..Session::default()
    }
}

fn session_fetch_error<E>(source: E) -> SessionWardError
where
    E: std::error::Error + Send + Sync + 'static,
{
    SessionWardError::SessionFetch {
        source: Some(Box::new(source)),
        context: ErrorContext::new("session_cache")
            .with_operation("revalidate")
            .with_suggestion("Treat the caller as signed out and retry later"),
    }
}
