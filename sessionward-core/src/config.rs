//! Configuration management

use crate::error::{ErrorContext, SessionWardError, SessionWardResult};
use crate::types::{ClientConfig, EndpointConfig, StorageBackend, StorageConfig};

use std::collections::HashMap;
use std::path::Path;

pub const DEFAULT_SESSION_KEY: &str = "session";

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            timeout_seconds: 30,
            user_agent: format!("sessionward/{}", env!("CARGO_PKG_VERSION")),
            headers: HashMap::new(),
            endpoints: EndpointConfig::default(),
            storage: StorageConfig::default(),
            logging: crate::logging::LoggingConfig::default(),
        }
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            session: "/auth/session".to_string(),
            csrf: "/auth/csrf".to_string(),
            linked: "/auth/linked".to_string(),
            providers: "/auth/providers".to_string(),
            signin: "/auth/signin".to_string(),
            email_signin: "/auth/email/signin".to_string(),
            signout: "/auth/signout".to_string(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .map(|dir| dir.join("sessionward"))
            .unwrap_or_else(|| std::path::PathBuf::from(".sessionward"));

        Self {
            backend: StorageBackend::Memory,
            data_dir: data_dir.to_string_lossy().into_owned(),
            session_key: DEFAULT_SESSION_KEY.to_string(),
        }
    }
}

impl EndpointConfig {
    fn paths(&self) -> [(&'static str, &str); 7] {
        [
            ("endpoints.session", self.session.as_str()),
            ("endpoints.csrf", self.csrf.as_str()),
            ("endpoints.linked", self.linked.as_str()),
            ("endpoints.providers", self.providers.as_str()),
            ("endpoints.signin", self.signin.as_str()),
            ("endpoints.email_signin", self.email_signin.as_str()),
            ("endpoints.signout", self.signout.as_str()),
        ]
    }
}

impl ClientConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> SessionWardResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| SessionWardError::Config {
            message: format!("Failed to read config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("read_file")
                .with_suggestion("Check if the config file exists and is readable"),
        })?;

        let config: ClientConfig = toml::from_str(&content).map_err(|e| SessionWardError::Config {
            message: format!("Failed to parse config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("parse_toml")
                .with_suggestion("Check TOML syntax in config file"),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> SessionWardResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| SessionWardError::Config {
            message: format!("Failed to serialize config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config").with_operation("serialize_toml"),
        })?;

        std::fs::write(path, content).map_err(|e| SessionWardError::Config {
            message: format!("Failed to write config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("write_file")
                .with_suggestion("Check if the directory exists and is writable"),
        })?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> SessionWardResult<()> {
        let base_url = url::Url::parse(&self.base_url).map_err(|e| SessionWardError::Config {
            message: format!("Invalid base_url '{}': {}", self.base_url, e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("validate")
                .with_suggestion("Use an absolute origin such as https://app.example.com"),
        })?;

        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(crate::config_error!(
                format!("base_url must use http or https, got '{}'", base_url.scheme()),
                "config"
            ));
        }

        if self.timeout_seconds == 0 {
            return Err(SessionWardError::Config {
                message: "timeout_seconds must be greater than 0".to_string(),
                source: None,
                context: ErrorContext::new("config")
                    .with_operation("validate")
                    .with_suggestion("Set timeout_seconds to a positive value"),
            });
        }

        for (field, path) in self.endpoints.paths() {
            if !path.starts_with('/') {
                return Err(crate::validation_error!(
                    format!("Endpoint path '{}' must start with '/'", path),
                    field,
                    "config"
                ));
            }
        }

        if self.storage.session_key.trim().is_empty() {
            return Err(crate::validation_error!(
                "Session key must not be empty",
                "storage.session_key",
                "config"
            ));
        }

        if self.storage.backend == StorageBackend::File && self.storage.data_dir.trim().is_empty() {
            return Err(crate::validation_error!(
                "data_dir is required for the file storage backend",
                "storage.data_dir",
                "config"
            ));
        }

        Ok(())
    }
}
