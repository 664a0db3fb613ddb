//! Session Manager
//!
//! Owns the single active portal session: signs in, restores the persisted
//! session at start-up, verifies it with the server and signs out.
//!
//! # Features
//!
//! - Credential validation without a network round trip
//! - Role check on login (a parent account cannot sign in as a student)
//! - Persistence of the token and profile snapshot in the session scope
//! - Two-step restore: cached user first, then a single verify call
//! - Best-effort remote logout with unconditional local cleanup
//!
//! # Example
//!
//! ```rust,no_run
//! use portal_client::{PortalAgent, SessionManager, UserRole};
//! use std::sync::Arc;
//! use storage::KvStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let agent = Arc::new(PortalAgent::new("https://portal.example.edu/api")?);
//!     let kv = Arc::new(KvStore::in_memory()?);
//!     let mut manager = SessionManager::new(agent, kv);
//!
//!     if manager.restore_session().await?.is_none() {
//!         let user = manager.login("alex@school.com", "student123", UserRole::Student).await?;
//!         println!("Signed in as {}", user.name);
//!     }
//!
//!     manager.logout().await?;
//!     Ok(())
//! }
//! ```

use crate::agent::{LoginRequest, PortalApi};
use crate::api::ApiError;
use crate::session::{
    Credentials, Session, SessionPhase, INVALID_CREDENTIALS_MESSAGE,
};
use crate::types::{DeviceRegistration, Platform, User, UserRole};
use std::sync::Arc;
use storage::{keys, KvError, KvStore, ScopedStore};
use thiserror::Error;

/// Message shown when the portal cannot be reached
pub const CONNECTION_ERROR_MESSAGE: &str =
    "Connection error. Please check your internet connection and try again.";

const GENERIC_ERROR_MESSAGE: &str = "An error occurred. Please try again.";

/// Errors that can occur during session manager operations
#[derive(Debug, Error)]
pub enum SessionManagerError {
    /// Form input rejected before contacting the portal
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Portal rejected the credentials or the role does not match
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Portal could not be reached
    #[error("Connection error: {0}")]
    Connection(String),

    /// Any other portal error
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Local storage failure
    #[error("Storage error: {0}")]
    Storage(#[from] KvError),

    /// Operation requires a signed-in user
    #[error("No active session")]
    NoSession,
}

impl SessionManagerError {
    /// Human-readable message for display next to the sign-in form
    pub fn user_message(&self) -> String {
        match self {
            SessionManagerError::Validation(message) | SessionManagerError::Auth(message) => {
                message.clone()
            }
            SessionManagerError::Connection(_) => CONNECTION_ERROR_MESSAGE.to_string(),
            SessionManagerError::Api(err) if err.is_connection_error() => {
                CONNECTION_ERROR_MESSAGE.to_string()
            }
            SessionManagerError::NoSession => "Please sign in to continue.".to_string(),
            _ => GENERIC_ERROR_MESSAGE.to_string(),
        }
    }

    /// Whether the error came from the portal being unreachable
    pub fn is_connection_error(&self) -> bool {
        match self {
            SessionManagerError::Connection(_) => true,
            SessionManagerError::Api(err) => err.is_connection_error(),
            _ => false,
        }
    }

    fn from_login_error(err: ApiError) -> Self {
        if err.is_connection_error() {
            SessionManagerError::Connection(err.to_string())
        } else if err.is_rejection() {
            let message = err.message();
            if message.trim().is_empty() {
                SessionManagerError::Auth(INVALID_CREDENTIALS_MESSAGE.to_string())
            } else {
                SessionManagerError::Auth(message)
            }
        } else {
            SessionManagerError::Api(err)
        }
    }
}

/// Result type for session manager operations
pub type Result<T> = std::result::Result<T, SessionManagerError>;

/// Session manager for the signed-in portal user
///
/// There is at most one session. All mutating operations take `&mut self`;
/// share the manager behind an async lock when several tasks need it.
pub struct SessionManager {
    /// Portal the session belongs to
    api: Arc<dyn PortalApi>,

    /// `session:*` keys
    store: ScopedStore,

    /// `device:*` keys
    device: ScopedStore,

    /// Platform reported at login
    platform: Platform,

    /// Push token reported at login
    push_token: Option<String>,

    /// Current session
    session: Option<Session>,

    /// Lifecycle phase
    phase: SessionPhase,
}

impl SessionManager {
    /// Create a manager over a portal and a key-value store
    pub fn new(api: Arc<dyn PortalApi>, kv: Arc<KvStore>) -> Self {
        Self {
            api,
            store: ScopedStore::session(kv.clone()),
            device: ScopedStore::device(kv),
            platform: Platform::current(),
            push_token: None,
            session: None,
            phase: SessionPhase::Unknown,
        }
    }

    /// Override the platform reported at login
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Set the push token sent with the next login
    pub fn set_push_token(&mut self, token: Option<String>) {
        self.push_token = token;
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Current lifecycle phase
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Signed-in user, cached or verified
    pub fn current_user(&self) -> Option<&User> {
        self.session.as_ref().map(|session| &session.user)
    }

    /// Current session
    pub fn current_session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Whether a user is signed in
    pub fn is_authenticated(&self) -> bool {
        self.session.is_some() && self.phase.is_authenticated()
    }

    /// Role of the signed-in user
    pub fn role(&self) -> Option<UserRole> {
        self.session.as_ref().map(Session::role)
    }

    /// Portal used for data calls, carrying the session token
    pub fn agent(&self) -> Arc<dyn PortalApi> {
        self.api.clone()
    }

    /// Stable identifier of this installation, created on first use
    pub fn device_id(&self) -> String {
        match self.device.get::<String>(keys::DEVICE_ID) {
            Ok(Some(id)) => return id,
            Ok(None) => {}
            Err(e) => tracing::warn!("Failed to read device id: {}", e),
        }

        let id = uuid::Uuid::new_v4().to_string();
        if let Err(e) = self.device.set(keys::DEVICE_ID, &id) {
            tracing::warn!("Failed to persist device id: {}", e);
        }
        id
    }

    // =========================================================================
    // Login
    // =========================================================================

    /// Sign in with an email or portal id, a password and a role
    ///
    /// # Errors
    ///
    /// - [`SessionManagerError::Validation`] when a field is empty; the
    ///   portal is not contacted
    /// - [`SessionManagerError::Auth`] when the portal rejects the
    ///   credentials or the account has a different role
    /// - [`SessionManagerError::Connection`] when the portal is unreachable
    ///
    /// On error the previous state is left untouched and nothing is persisted.
    pub async fn login(&mut self, identifier: &str, password: &str, role: UserRole) -> Result<User> {
        let credentials = Credentials::new(identifier, password, role);
        credentials.validate()?;

        let request = LoginRequest {
            identifier: credentials.identifier().to_string(),
            password: credentials.password().to_string(),
            role,
            device: DeviceRegistration {
                device_id: self.device_id(),
                push_token: self.push_token.clone(),
                platform: self.platform,
            },
        };

        let response = match self.api.login(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(role = %role, "Login failed: {}", e);
                return Err(SessionManagerError::from_login_error(e));
            }
        };

        if response.user.role != role {
            tracing::warn!(
                requested = %role,
                actual = %response.user.role,
                "Login rejected: role mismatch"
            );
            self.revoke_token(response.token).await;
            return Err(SessionManagerError::Auth(format!(
                "This account is not registered as a {}",
                role
            )));
        }

        let session = Session::new(response.token, response.user);
        if let Err(e) = self.persist(&session) {
            tracing::error!("Failed to persist session: {}", e);
            self.remove_persisted();
            return Err(e);
        }

        self.api.set_token(Some(session.token.clone()));
        let user = session.user.clone();
        self.session = Some(session);
        self.phase = SessionPhase::Verified;

        tracing::info!(user_id = %user.id, role = %user.role, "Signed in");
        Ok(user)
    }

    // =========================================================================
    // Restore
    // =========================================================================

    /// Load the persisted session without contacting the portal
    ///
    /// Moves to [`SessionPhase::Cached`] when a token and profile are stored,
    /// otherwise to [`SessionPhase::SignedOut`]. A profile that no longer
    /// decodes is discarded.
    pub fn load_cached(&mut self) -> Result<Option<&User>> {
        let token = self.store.get::<String>(keys::SESSION_TOKEN)?;
        let user = match self.store.get::<User>(keys::SESSION_USER) {
            Ok(user) => user,
            Err(KvError::Serialization(e)) => {
                tracing::warn!("Discarding unreadable cached profile: {}", e);
                None
            }
            Err(e) => return Err(e.into()),
        };

        match (token, user) {
            (Some(token), Some(user)) => {
                tracing::debug!(user_id = %user.id, "Loaded cached session");
                self.api.set_token(Some(token.clone()));
                self.session = Some(Session::new(token, user));
                self.phase = SessionPhase::Cached;
            }
            (token, user) => {
                if token.is_some() || user.is_some() {
                    tracing::warn!("Incomplete cached session, clearing");
                    self.remove_persisted();
                }
                self.session = None;
                self.phase = SessionPhase::SignedOut;
            }
        }

        Ok(self.current_user())
    }

    /// Verify a cached session with the portal
    ///
    /// Only acts in [`SessionPhase::Cached`]. Success replaces the cached
    /// profile with the server's; any failure clears the session locally
    /// without calling the logout endpoint.
    pub async fn verify(&mut self) -> SessionPhase {
        if self.phase != SessionPhase::Cached {
            return self.phase;
        }

        match self.api.verify_session().await {
            Ok(user) => {
                if let Err(e) = self.store.set(keys::SESSION_USER, &user) {
                    tracing::warn!("Failed to persist verified profile: {}", e);
                }
                if let Some(session) = self.session.as_mut() {
                    session.user = user;
                }
                self.phase = SessionPhase::Verified;
                tracing::info!("Cached session verified");
            }
            Err(e) => {
                tracing::info!("Cached session rejected: {}", e);
                self.clear_local();
                self.phase = SessionPhase::Invalid;
            }
        }

        self.phase
    }

    /// Restore the session at start-up
    ///
    /// Loads the cached session and verifies it once. Returns the user when
    /// the session survived verification.
    pub async fn restore_session(&mut self) -> Result<Option<User>> {
        if self.load_cached()?.is_none() {
            tracing::debug!("No persisted session");
            return Ok(None);
        }

        self.verify().await;
        Ok(self.current_user().cloned())
    }

    // =========================================================================
    // Profile & logout
    // =========================================================================

    /// Re-fetch the signed-in user's profile
    ///
    /// A rejected token signs the user out locally.
    pub async fn refresh_profile(&mut self) -> Result<User> {
        if self.session.is_none() {
            return Err(SessionManagerError::NoSession);
        }

        match self.api.fetch_profile().await {
            Ok(user) => {
                self.store.set(keys::SESSION_USER, &user)?;
                if let Some(session) = self.session.as_mut() {
                    session.user = user.clone();
                }
                Ok(user)
            }
            Err(ApiError::Unauthorized(message)) => {
                tracing::info!("Profile refresh rejected, signing out: {}", message);
                self.invalidate();
                Err(SessionManagerError::Auth(message))
            }
            Err(e) if e.is_connection_error() => Err(SessionManagerError::Connection(e.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    /// Drop a session the portal no longer accepts
    ///
    /// Clears the persisted token and profile without calling the logout
    /// endpoint and moves to [`SessionPhase::Invalid`]. Does nothing when
    /// there is no session.
    pub fn invalidate(&mut self) {
        if self.session.is_none() {
            return;
        }
        tracing::info!("Session rejected by the portal, clearing");
        self.clear_local();
        self.phase = SessionPhase::Invalid;
    }

    /// Sign out
    ///
    /// The logout endpoint is called when a session exists; its failure is
    /// logged and ignored. Local state is always cleared.
    pub async fn logout(&mut self) -> Result<()> {
        if self.session.is_some() {
            if let Err(e) = self.api.logout().await {
                tracing::warn!("Remote logout failed, clearing local session anyway: {}", e);
            }
        }

        self.session = None;
        self.api.set_token(None);
        self.phase = SessionPhase::SignedOut;

        self.store.remove(keys::SESSION_TOKEN)?;
        self.store.remove(keys::SESSION_USER)?;
        self.store.flush()?;

        tracing::info!("Signed out");
        Ok(())
    }

    // =========================================================================
    // Persistence helpers
    // =========================================================================

    /// Best-effort logout of a token issued for a rejected login; the
    /// current session's token, if any, is re-attached afterwards
    async fn revoke_token(&self, token: String) {
        self.api.set_token(Some(token));
        if let Err(e) = self.api.logout().await {
            tracing::warn!("Failed to revoke token of rejected login: {}", e);
        }
        self.api.set_token(self.session.as_ref().map(|s| s.token.clone()));
    }

    fn persist(&self, session: &Session) -> Result<()> {
        self.store.set(keys::SESSION_TOKEN, &session.token)?;
        self.store.set(keys::SESSION_USER, &session.user)?;
        self.store.flush()?;
        Ok(())
    }

    fn remove_persisted(&self) {
        for key in [keys::SESSION_TOKEN, keys::SESSION_USER] {
            if let Err(e) = self.store.remove(key) {
                tracing::warn!("Failed to remove {}: {}", key, e);
            }
        }
    }

    fn clear_local(&mut self) {
        self.session = None;
        self.api.set_token(None);
        self.remove_persisted();
        if let Err(e) = self.store.flush() {
            tracing::warn!("Failed to flush session store: {}", e);
        }
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("phase", &self.phase)
            .field("session", &self.session)
            .field("platform", &self.platform)
            .finish()
    }
}
