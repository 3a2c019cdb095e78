//! Sessionward Core - Shared data structures and trait definitions
//!
//! This crate defines the session model, the error taxonomy, configuration
//! and the storage/transport seams used by the sessionward client.

pub mod config;
pub mod error;
pub mod logging;
pub mod traits;
pub mod types;

pub use config::*;
pub use error::*;
pub use logging::*;
pub use traits::*;
pub use types::*;

// Re-export commonly used external types
pub use async_trait::async_trait;
pub use tracing;
