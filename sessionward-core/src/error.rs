//! Unified error handling system
//!
//! Provides structured error types with context, recovery suggestions, and proper error chaining

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

pub type SessionWardResult<T> = Result<T, SessionWardError>;

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Error context providing additional information for debugging and recovery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Unique error ID for tracking
    pub error_id: String,
    /// Timestamp when error occurred
    pub timestamp: DateTime<Utc>,
    /// Component where error originated
    pub component: String,
    /// Operation being performed when error occurred
    pub operation: Option<String>,
    /// Additional metadata
    pub metadata: std::collections::HashMap<String, String>,
    /// Recovery suggestions
    pub recovery_suggestions: Vec<String>,
}

impl ErrorContext {
    pub fn new(component: &str) -> Self {
        Self {
            error_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            component: component.to_string(),
            operation: None,
            metadata: std::collections::HashMap::new(),
            recovery_suggestions: Vec::new(),
        }
    }

    pub fn with_operation(mut self, operation: &str) -> Self {
        self.operation = Some(operation.to_string());
        self
    }

    pub fn with_metadata(mut self, key: &str, value: &str) -> Self {
        self.metadata.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.recovery_suggestions.push(suggestion.to_string());
        self
    }
}

/// Main error type for sessionward
#[derive(Error, Debug)]
pub enum SessionWardError {
    /// The session endpoint could not be read. Covers non-success statuses,
    /// transport failures and malformed bodies alike.
    #[error("Unable to get session")]
    SessionFetch {
        #[source]
        source: Option<BoxedSource>,
        context: ErrorContext,
    },

    #[error("Unable to get CSRF token")]
    TokenFetch {
        #[source]
        source: Option<BoxedSource>,
        context: ErrorContext,
    },

    /// Transport-level sign-in failure. A rejected credential is not an error.
    #[error("HTTP error while attempting to sign in")]
    SignIn {
        #[source]
        source: Option<BoxedSource>,
        context: ErrorContext,
    },

    #[error("Unable to sign out")]
    SignOut {
        #[source]
        source: Option<BoxedSource>,
        context: ErrorContext,
    },

    #[error("Unable to get {resource}")]
    ProviderQuery {
        resource: String,
        #[source]
        source: Option<BoxedSource>,
        context: ErrorContext,
    },

    #[error("Transport error: {message}")]
    Transport {
        message: String,
        #[source]
        source: Option<BoxedSource>,
        context: ErrorContext,
    },

    #[error("HTTP {status} from {path}")]
    Http {
        status: u16,
        path: String,
        context: ErrorContext,
    },

    #[error("Storage error: {message}")]
    Storage {
        message: String,
        #[source]
        source: Option<BoxedSource>,
        context: ErrorContext,
    },

    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<BoxedSource>,
        context: ErrorContext,
    },

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
        context: ErrorContext,
    },
}

impl SessionWardError {
    /// Get the error context
    pub fn context(&self) -> &ErrorContext {
        match self {
            SessionWardError::SessionFetch { context, .. } => context,
            SessionWardError::TokenFetch { context, .. } => context,
            SessionWardError::SignIn { context, .. } => context,
            SessionWardError::SignOut { context, .. } => context,
            SessionWardError::ProviderQuery { context, .. } => context,
            SessionWardError::Transport { context, .. } => context,
            SessionWardError::Http { context, .. } => context,
            SessionWardError::Storage { context, .. } => context,
            SessionWardError::Config { context, .. } => context,
            SessionWardError::Validation { context, .. } => context,
        }
    }

    /// HTTP status carried by this error or by its immediate source, if any
    pub fn http_status(&self) -> Option<u16> {
        if let SessionWardError::Http { status, .. } = self {
            return Some(*status);
        }

        std::error::Error::source(self)
            .and_then(|source| source.downcast_ref::<SessionWardError>())
            .and_then(|inner| match inner {
                SessionWardError::Http { status, .. } => Some(*status),
                _ => None,
            })
    }

    /// Check if error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            SessionWardError::Transport { .. } => true,
            SessionWardError::SessionFetch { .. } => true,
            SessionWardError::TokenFetch { .. } => true,
            SessionWardError::ProviderQuery { .. } => true,
            SessionWardError::Http { status, .. } => *status >= 500 || *status == 429,
            SessionWardError::Config { .. } => false,
            SessionWardError::Validation { .. } => false,
            _ => false,
        }
    }

    /// Get retry delay in milliseconds for recoverable errors
    pub fn retry_delay_ms(&self) -> Option<u64> {
        if !self.is_recoverable() {
            return None;
        }

        match self {
            SessionWardError::Http { status: 429, .. } => Some(5000),
            SessionWardError::Http { .. } => Some(2000),
            _ => Some(1000),
        }
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        match self {
            SessionWardError::Config { .. } | SessionWardError::Validation { .. } => {
                error!(
                    error_id = %self.context().error_id,
                    error = %self,
                    "Configuration or validation error"
                );
            }
            SessionWardError::SignIn { .. } => {
                error!(
                    error_id = %self.context().error_id,
                    error = %self,
                    "Sign-in request failed"
                );
            }
            _ if self.is_recoverable() => {
                warn!(
                    error_id = %self.context().error_id,
                    error = %self,
                    "Network error (may be recoverable)"
                );
            }
            _ => {
                error!(
                    error_id = %self.context().error_id,
                    error = %self,
                    "Error occurred"
                );
            }
        }
    }
}

/// Convenience macros for creating errors with context
#[macro_export]
macro_rules! config_error {
    ($msg:expr, $component:expr) => {
        $crate::SessionWardError::Config {
            message: $msg.to_string(),
            source: None,
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check your configuration file"),
        }
    };
    ($msg:expr, $component:expr, $source:expr) => {
        $crate::SessionWardError::Config {
            message: $msg.to_string(),
            source: Some(Box::new($source)),
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check your configuration file"),
        }
    };
}

#[macro_export]
macro_rules! transport_error {
    ($msg:expr, $component:expr) => {
        $crate::SessionWardError::Transport {
            message: $msg.to_string(),
            source: None,
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check network connectivity and the auth server status"),
        }
    };
    ($msg:expr, $component:expr, $source:expr) => {
        $crate::SessionWardError::Transport {
            message: $msg.to_string(),
            source: Some(Box::new($source)),
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check network connectivity and the auth server status"),
        }
    };
}

#[macro_export]
macro_rules! validation_error {
    ($msg:expr, $field:expr, $component:expr) => {
        $crate::SessionWardError::Validation {
            message: $msg.to_string(),
            field: Some($field.to_string()),
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check the field value and format"),
        }
    };
}

/// Failures of a `KeyValueStore` backend.
///
/// These never leave the Local Store Adapter; callers only ever observe an
/// absent value or a `false` return.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Storage IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed stored value: {0}")]
    Malformed(#[from] serde_json::Error),
}
