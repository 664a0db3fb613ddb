//! Portal HTTP client
//!
//! JSON request/response plumbing for the school portal API. Every endpoint
//! answers with the same envelope:
//!
//! ```json
//! { "success": true, "message": "optional text", "data": { ... } }
//! ```
//!
//! A non-2xx status or `success: false` becomes an [`ApiError`] carrying the
//! server's message. Requests are attempted exactly once.

use parking_lot::RwLock;
use reqwest::{Client as ReqwestClient, Response as ReqwestResponse};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Error Types
// =============================================================================

/// Errors returned by the portal API client
///
/// # Examples
/// ```
/// use portal_client::api::ApiError;
///
/// let error = ApiError::api(404, "Student not found");
/// assert_eq!(error.status(), Some(404));
/// assert!(!error.is_connection_error());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request never produced a response (DNS, refused, timeout)
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Credentials or token rejected (401/403)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Server answered with an error status or `success: false`
    #[error("API error {status}: {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Message reported by the server
        message: String,
    },

    /// Response body could not be decoded
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// Request could not be built
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    /// Create an API error from a status and message
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        if matches!(status, 401 | 403) {
            ApiError::Unauthorized(message)
        } else {
            ApiError::Api { status, message }
        }
    }

    /// HTTP status, when the server produced one
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Api { status, .. } => Some(*status),
            ApiError::Unauthorized(_) => Some(401),
            _ => None,
        }
    }

    /// Whether the server could not be reached
    pub fn is_connection_error(&self) -> bool {
        matches!(self, ApiError::Connection(_))
    }

    /// Whether the server rejected the caller's credentials
    pub fn is_auth_error(&self) -> bool {
        match self {
            ApiError::Unauthorized(_) => true,
            ApiError::Api { status, .. } => matches!(status, 400..=499),
            _ => false,
        }
    }

    /// Whether the portal answered and refused the request
    ///
    /// Covers 4xx statuses and `success: false` envelopes sent with a 2xx
    /// status; server faults (5xx) are not rejections.
    pub fn is_rejection(&self) -> bool {
        match self {
            ApiError::Unauthorized(_) => true,
            ApiError::Api { status, .. } => *status < 500,
            _ => false,
        }
    }

    /// Message suitable for display
    pub fn message(&self) -> String {
        match self {
            ApiError::Unauthorized(message) | ApiError::Api { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Connection(err.to_string())
        }
    }
}

/// Result type for API operations
pub type Result<T> = std::result::Result<T, ApiError>;

// =============================================================================
// Request Types
// =============================================================================

/// HTTP method for portal requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    /// Reads
    Get,
    /// Actions
    Post,
}

impl HttpMethod {
    /// Method name
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// A request against a portal endpoint
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// HTTP method
    pub method: HttpMethod,
    /// Path relative to the base URL (e.g. "/auth/login")
    pub path: String,
    /// Query parameters, in insertion order
    pub params: Vec<(String, String)>,
    /// Request headers
    pub headers: HashMap<String, String>,
    /// JSON body
    pub body: Option<Vec<u8>>,
}

impl ApiRequest {
    fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            params: Vec::new(),
            headers: HashMap::new(),
            body: None,
        }
    }

    /// Create a GET request
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    /// Create a POST request
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    /// Add a query parameter
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Add a header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Set a JSON body
    pub fn json_body<T: Serialize>(mut self, value: &T) -> Result<Self> {
        let body = serde_json::to_vec(value).map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
        self.body = Some(body);
        Ok(self)
    }
}

// =============================================================================
// Response Types
// =============================================================================

/// Response envelope shared by all portal endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// Whether the call succeeded
    pub success: bool,
    /// Human-readable message, mostly set on failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Payload; absent on failures and on endpoints without a body
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// Successful envelope carrying `data`
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    /// Failed envelope carrying `message`
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
        }
    }
}

/// Decoded response
#[derive(Debug, Clone)]
pub struct ApiResponse<T> {
    /// HTTP status code
    pub status: u16,
    /// Server message, if any
    pub message: Option<String>,
    /// Payload
    pub data: T,
}

// =============================================================================
// Client Configuration
// =============================================================================

/// Configuration for [`ApiClient`]
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Base URL of the portal API (e.g. "https://portal.example.edu/api")
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// User agent string
    pub user_agent: String,
    /// Headers added to every request
    pub default_headers: HashMap<String, String>,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".to_string(),
            timeout: Duration::from_secs(30),
            user_agent: format!("SchoolPortal/{}", env!("CARGO_PKG_VERSION")),
            default_headers: HashMap::new(),
        }
    }
}

impl ApiClientConfig {
    /// Create a config for a base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Add a default header
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(key.into(), value.into());
        self
    }
}

// =============================================================================
// Client Implementation
// =============================================================================

/// HTTP client for the portal API
///
/// Clones share the bearer token slot, so a token set after login is seen by
/// every clone.
///
/// # Examples
/// ```no_run
/// use portal_client::api::{ApiClient, ApiClientConfig, ApiRequest};
///
/// async fn example() -> Result<(), Box<dyn std::error::Error>> {
///     let client = ApiClient::new(ApiClientConfig::new("https://portal.example.edu/api"))?;
///     client.set_token(Some("token".to_string()));
///
///     let response = client
///         .send::<serde_json::Value>(ApiRequest::get("/profile"))
///         .await?;
///     println!("{}", response.data);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: ReqwestClient,
    config: ApiClientConfig,
    token: Arc<RwLock<Option<String>>>,
}

impl ApiClient {
    /// Create a new client
    pub fn new(config: ApiClientConfig) -> Result<Self> {
        let client = ReqwestClient::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| ApiError::InvalidRequest(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config,
            token: Arc::new(RwLock::new(None)),
        })
    }

    /// Set or clear the bearer token
    pub fn set_token(&self, token: Option<String>) {
        *self.token.write() = token;
    }

    /// Whether a bearer token is attached
    pub fn has_token(&self) -> bool {
        self.token.read().is_some()
    }

    /// Send a request and decode the envelope payload
    pub async fn send<T>(&self, request: ApiRequest) -> Result<ApiResponse<T>>
    where
        T: DeserializeOwned,
    {
        let response = self.execute(request).await?;
        let status = response.status;
        let envelope: Envelope<T> = response.data;
        let data = envelope
            .data
            .ok_or_else(|| ApiError::Decode("Response is missing data".to_string()))?;

        Ok(ApiResponse {
            status,
            message: envelope.message,
            data,
        })
    }

    /// Send a request whose payload is irrelevant
    pub async fn send_unit(&self, request: ApiRequest) -> Result<Option<String>> {
        let response = self.execute::<serde_json::Value>(request).await?;
        Ok(response.data.message)
    }

    async fn execute<T>(&self, request: ApiRequest) -> Result<ApiResponse<Envelope<T>>>
    where
        T: DeserializeOwned,
    {
        let url = self.url_for(&request.path);

        let mut req = match request.method {
            HttpMethod::Get => self.client.get(&url),
            HttpMethod::Post => self.client.post(&url),
        };

        if !request.params.is_empty() {
            req = req.query(&request.params);
        }

        for (key, value) in &self.config.default_headers {
            req = req.header(key, value);
        }

        if let Some(token) = self.token.read().as_ref() {
            req = req.bearer_auth(token);
        }

        for (key, value) in &request.headers {
            req = req.header(key, value);
        }

        if let Some(body) = request.body {
            req = req.header("Content-Type", "application/json").body(body);
        }

        tracing::debug!(method = request.method.as_str(), path = %request.path, "Sending portal request");

        let response = req
            .send()
            .await
            .map_err(|e| ApiError::Connection(format!("Request failed: {}", e)))?;

        self.parse_response(response).await
    }

    async fn parse_response<T>(&self, response: ReqwestResponse) -> Result<ApiResponse<Envelope<T>>>
    where
        T: DeserializeOwned,
    {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Connection(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            let message = serde_json::from_str::<Envelope<serde_json::Value>>(&body)
                .ok()
                .and_then(|envelope| envelope.message)
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
            tracing::debug!(status = status.as_u16(), "Portal request failed");
            return Err(ApiError::api(status.as_u16(), message));
        }

        let envelope: Envelope<T> = serde_json::from_str(&body)
            .map_err(|e| ApiError::Decode(format!("Failed to parse JSON: {}", e)))?;

        if !envelope.success {
            let message = envelope
                .message
                .clone()
                .unwrap_or_else(|| "Request was not successful".to_string());
            return Err(ApiError::api(status.as_u16(), message));
        }

        Ok(ApiResponse {
            status: status.as_u16(),
            message: envelope.message.clone(),
            data: envelope,
        })
    }

    fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Client configuration
    pub fn config(&self) -> &ApiClientConfig {
        &self.config
    }

    /// Base URL
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }
}
