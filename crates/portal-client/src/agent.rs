//! PortalAgent - high-level client for the school portal
//!
//! The agent wraps an [`ApiClient`] and exposes one method per portal
//! endpoint. Callers depend on the [`PortalApi`] trait so the session manager
//! and the application store can run against a mock in tests.
//!
//! # Example
//!
//! ```rust,no_run
//! use portal_client::{PortalAgent, PortalApi, UserRole};
//! use portal_client::agent::LoginRequest;
//! use portal_client::types::{DeviceRegistration, Platform};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let agent = PortalAgent::new("https://portal.example.edu/api")?;
//!
//!     let response = agent
//!         .login(LoginRequest {
//!             identifier: "alex@school.com".to_string(),
//!             password: "student123".to_string(),
//!             role: UserRole::Student,
//!             device: DeviceRegistration {
//!                 device_id: "device-1".to_string(),
//!                 push_token: None,
//!                 platform: Platform::current(),
//!             },
//!         })
//!         .await?;
//!
//!     agent.set_token(Some(response.token));
//!     let dashboard = agent.fetch_dashboard().await?;
//!     println!("Welcome back, {}", dashboard.user.first_name());
//!     Ok(())
//! }
//! ```

use crate::api::{ApiClient, ApiClientConfig, ApiError, ApiRequest};
use crate::types::{
    Dashboard, DeviceRegistration, ExamResults, FeeStatement, Notification, User, UserRole,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Result type for agent operations
pub type Result<T> = std::result::Result<T, ApiError>;

/// Portal endpoint paths
pub mod endpoints {
    /// Exchange credentials for a token
    pub const LOGIN: &str = "/auth/login";
    /// Check that the current token is still valid
    pub const VERIFY: &str = "/auth/verify";
    /// Invalidate the current token
    pub const LOGOUT: &str = "/auth/logout";
    /// Signed-in user's profile
    pub const PROFILE: &str = "/profile";
    /// Home screen summary
    pub const DASHBOARD: &str = "/dashboard";
    /// Fee statement for a child
    pub const FEES: &str = "/fees";
    /// Exam results for a student
    pub const RESULTS: &str = "/results";
    /// Notification inbox
    pub const NOTIFICATIONS: &str = "/notifications";
}

/// Login request body
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Email address or portal id (e.g. "STU001")
    pub identifier: String,
    /// Password
    pub password: String,
    /// Role the user is signing in as
    pub role: UserRole,
    /// Push registration for this device
    pub device: DeviceRegistration,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("identifier", &self.identifier)
            .field("password", &"<redacted>")
            .field("role", &self.role)
            .field("device", &self.device)
            .finish()
    }
}

/// Login response payload
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Bearer token
    pub token: String,
    /// Profile of the signed-in user
    pub user: User,
}

impl fmt::Debug for LoginResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginResponse")
            .field("token", &"<redacted>")
            .field("user", &self.user)
            .finish()
    }
}

/// Operations offered by the school portal
///
/// Every call is attempted exactly once. Authenticated calls use the token
/// set through [`PortalApi::set_token`].
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait PortalApi: Send + Sync {
    /// Attach or detach the bearer token used for authenticated calls
    fn set_token(&self, token: Option<String>);

    /// Whether a bearer token is attached
    fn has_token(&self) -> bool;

    /// Exchange credentials for a token and profile
    async fn login(&self, request: LoginRequest) -> Result<LoginResponse>;

    /// Check the attached token and return the current profile
    async fn verify_session(&self) -> Result<User>;

    /// Invalidate the attached token on the server
    async fn logout(&self) -> Result<()>;

    /// Fetch the signed-in user's profile
    async fn fetch_profile(&self) -> Result<User>;

    /// Fetch the home screen summary
    async fn fetch_dashboard(&self) -> Result<Dashboard>;

    /// Fetch the fee statement of a child
    async fn fetch_fees(&self, child_id: &str) -> Result<FeeStatement>;

    /// Fetch exam results of a student; `None` selects the latest exam
    async fn fetch_results(&self, student_id: &str, exam: Option<String>) -> Result<ExamResults>;

    /// Fetch the notification inbox
    async fn fetch_notifications(&self) -> Result<Vec<Notification>>;

    /// Mark one notification as read
    async fn mark_notification_read(&self, id: &str) -> Result<()>;
}

/// HTTP implementation of [`PortalApi`]
#[derive(Debug, Clone)]
pub struct PortalAgent {
    client: ApiClient,
}

impl PortalAgent {
    /// Create an agent for a base URL with default settings
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_config(ApiClientConfig::new(base_url))
    }

    /// Create an agent from a client configuration
    pub fn with_config(config: ApiClientConfig) -> Result<Self> {
        Ok(Self {
            client: ApiClient::new(config)?,
        })
    }

    /// Underlying HTTP client
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Base URL of the portal
    pub fn base_url(&self) -> &str {
        self.client.base_url()
    }

    fn require_token(&self) -> Result<()> {
        if self.client.has_token() {
            Ok(())
        } else {
            Err(ApiError::Unauthorized("No active session".to_string()))
        }
    }
}

#[async_trait]
impl PortalApi for PortalAgent {
    fn set_token(&self, token: Option<String>) {
        self.client.set_token(token);
    }

    fn has_token(&self) -> bool {
        self.client.has_token()
    }

    async fn login(&self, request: LoginRequest) -> Result<LoginResponse> {
        let req = ApiRequest::post(endpoints::LOGIN).json_body(&request)?;
        let response = self.client.send::<LoginResponse>(req).await?;
        Ok(response.data)
    }

    async fn verify_session(&self) -> Result<User> {
        self.require_token()?;
        let response = self.client.send::<User>(ApiRequest::get(endpoints::VERIFY)).await?;
        Ok(response.data)
    }

    async fn logout(&self) -> Result<()> {
        self.require_token()?;
        self.client.send_unit(ApiRequest::post(endpoints::LOGOUT)).await?;
        Ok(())
    }

    async fn fetch_profile(&self) -> Result<User> {
        self.require_token()?;
        let response = self.client.send::<User>(ApiRequest::get(endpoints::PROFILE)).await?;
        Ok(response.data)
    }

    async fn fetch_dashboard(&self) -> Result<Dashboard> {
        self.require_token()?;
        let response = self
            .client
            .send::<Dashboard>(ApiRequest::get(endpoints::DASHBOARD))
            .await?;
        Ok(response.data)
    }

    async fn fetch_fees(&self, child_id: &str) -> Result<FeeStatement> {
        self.require_token()?;
        let req = ApiRequest::get(endpoints::FEES).param("childId", child_id);
        let response = self.client.send::<FeeStatement>(req).await?;
        Ok(response.data)
    }

    async fn fetch_results(&self, student_id: &str, exam: Option<String>) -> Result<ExamResults> {
        self.require_token()?;
        let mut req = ApiRequest::get(endpoints::RESULTS).param("studentId", student_id);
        if let Some(exam) = exam {
            req = req.param("exam", exam);
        }
        let response = self.client.send::<ExamResults>(req).await?;
        Ok(response.data)
    }

    async fn fetch_notifications(&self) -> Result<Vec<Notification>> {
        self.require_token()?;
        let response = self
            .client
            .send::<Vec<Notification>>(ApiRequest::get(endpoints::NOTIFICATIONS))
            .await?;
        Ok(response.data)
    }

    async fn mark_notification_read(&self, id: &str) -> Result<()> {
        if id.trim().is_empty() {
            return Err(ApiError::InvalidRequest("Notification id must not be empty".to_string()));
        }
        self.require_token()?;
        // Ids are opaque; escape them so they stay a single path segment
        let path = format!("{}/{}/read", endpoints::NOTIFICATIONS, urlencoding::encode(id));
        self.client.send_unit(ApiRequest::post(path)).await?;
        Ok(())
    }
}
