//! HTTP transport for talking to the auth origin
//!
//! `ReqwestTransport` is the native stand-in for a browser's same-origin
//! `fetch`: every path is resolved against one configured origin and a
//! cookie jar carries the session cookies between requests.

use async_trait::async_trait;
use sessionward_core::{
    performance, transport_error, ClientConfig, ErrorContext, HttpMethod, HttpRequest,
    HttpResponse, HttpTransport, SessionWardError, SessionWardResult,
};
use tracing::debug;
use url::Url;

/// reqwest-backed transport bound to a single origin
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: Url,
}

impl ReqwestTransport {
    /// Create a transport from client configuration
    pub fn new(config: &ClientConfig) -> SessionWardResult<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| SessionWardError::Config {
            message: format!("Invalid base_url '{}': {}", config.base_url, e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("http_transport").with_operation("create_transport"),
        })?;

        let client = create_http_client(config)?;

        debug!("Created HTTP transport for {}", base_url);

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url_for(&self, path: &str) -> SessionWardResult<Url> {
        self.base_url.join(path).map_err(|e| SessionWardError::Validation {
            message: format!("Cannot resolve '{}' against {}: {}", path, self.base_url, e),
            field: Some("path".to_string()),
            context: ErrorContext::new("http_transport").with_operation("resolve_url"),
        })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> SessionWardResult<HttpResponse> {
        let url = self.url_for(&request.path)?;

        debug!(method = ?request.method, url = %url, "Sending auth request");

        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(url),
            HttpMethod::Post => self.client.post(url),
        };

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = performance::measure_async("http_round_trip", builder.send())
            .await
            .map_err(|e| {
                transport_error!(
                    format!("Request to {} failed: {}", request.path, e),
                    "http_transport",
                    e
                )
            })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            transport_error!(
                format!("Failed to read response body from {}: {}", request.path, e),
                "http_transport",
                e
            )
        })?;

        Ok(HttpResponse { status, body })
    }
}

/// Helper function to create HTTP client with common configuration
pub(crate) fn create_http_client(config: &ClientConfig) -> SessionWardResult<reqwest::Client> {
    let mut headers = reqwest::header::HeaderMap::new();

    headers.insert(
        reqwest::header::USER_AGENT,
        reqwest::header::HeaderValue::from_str(&config.user_agent).map_err(|e| {
            SessionWardError::Config {
                message: format!("Invalid user agent: {}", e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("http_client").with_operation("create_client"),
            }
        })?,
    );

    headers.insert(
        reqwest::header::ACCEPT,
        reqwest::header::HeaderValue::from_static("application/json"),
    );

    for (key, value) in &config.headers {
        let header_name = reqwest::header::HeaderName::from_bytes(key.as_bytes()).map_err(|e| {
            SessionWardError::Config {
                message: format!("Invalid header name '{}': {}", key, e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("http_client").with_operation("create_client"),
            }
        })?;

        let header_value =
            reqwest::header::HeaderValue::from_str(value).map_err(|e| SessionWardError::Config {
                message: format!("Invalid header value for '{}': {}", key, e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("http_client").with_operation("create_client"),
            })?;

        headers.insert(header_name, header_value);
    }

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(config.timeout_seconds))
        .default_headers(headers)
        .cookie_store(true)
        .build()
        .map_err(|e| SessionWardError::Config {
            message: format!("Failed to create HTTP client: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("http_client").with_operation("create_client"),
        })?;

    Ok(client)
}

/// Error for a completed exchange that returned a non-success status
pub(crate) fn status_error(response: &HttpResponse, path: &str, component: &str) -> SessionWardError {
    SessionWardError::Http {
        status: response.status,
        path: path.to_string(),
        context: ErrorContext::new(component)
            .with_operation("check_status")
            .with_suggestion(match response.status {
                401 | 403 => "The auth server rejected the request; a fresh CSRF token or session may be required",
                404 => "Check the configured endpoint paths",
                429 => "Back off before retrying",
                _ => "Check network connectivity and the auth server status",
            }),
    }
}
