//! Sessionward Client - session state for web authentication
//!
//! Decides per call whether to trust a server-side request context, serve a
//! cached session, or revalidate against the auth server, and performs
//! CSRF-protected sign-in and sign-out.
//!
//! ```no_run
//! # async fn demo() -> sessionward_core::SessionWardResult<()> {
//! use sessionward_client::{GetSessionOptions, SessionClient};
//! use sessionward_core::ClientConfig;
//!
//! let client = SessionClient::from_config(&ClientConfig::default())?;
//! let session = client.get_session(GetSessionOptions::default()).await?;
//! if !session.is_signed_in() {
//!     client.sign_in("user@example.com").await?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod credentials;
pub mod csrf;
pub mod form;
pub mod queries;
pub mod session;
pub mod store;
pub mod transport;

pub use client::{SessionClient, SessionClientBuilder};
pub use credentials::CredentialedRequests;
pub use csrf::CsrfTokenProvider;
pub use queries::ProviderQueries;
pub use session::{ExecutionContext, GetSessionOptions, SessionCache};
pub use store::{DisabledStore, FileStore, LocalStore, MemoryStore};
pub use transport::ReqwestTransport;
