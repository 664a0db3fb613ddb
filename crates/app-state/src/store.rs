//! Application store
//!
//! `AppStore` is built once at startup and handed to whatever drives the UI.
//! It owns the session manager and the device preferences, and loads the
//! per-screen data through the session's portal client.
//!
//! # Example
//!
//! ```rust,no_run
//! use app_state::AppStore;
//! use portal_client::{PortalAgent, UserRole};
//! use std::sync::Arc;
//! use storage::{KvConfig, KvStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let kv = Arc::new(KvStore::new(KvConfig::new("./portal-data"))?);
//!     let api = Arc::new(PortalAgent::new("https://portal.example.edu/api")?);
//!     let store = AppStore::new(kv, api);
//!
//!     if store.start().await?.is_none() {
//!         store.login("alex@school.com", "student123", UserRole::Student).await?;
//!     }
//!
//!     let dashboard = store.dashboard().await?;
//!     for fee in &dashboard.pending_fees {
//!         println!("{}: {}", fee.title, store.currency().format_amount(fee.amount_usd));
//!     }
//!     Ok(())
//! }
//! ```

use crate::preferences::{CurrencyService, ThemeService};
use app_core::{FeeOverview, NotificationInbox, ResultsView};
use app_ui::theme::ColorScheme;
use portal_client::api::ApiError;
use portal_client::types::{Dashboard, User};
use portal_client::{PortalApi, SessionManager, SessionManagerError, SessionPhase, UserRole};
use std::sync::Arc;
use storage::{KvStore, ScopedStore};
use tokio::sync::RwLock;

/// Application store errors
#[derive(Debug, thiserror::Error)]
pub enum AppStateError {
    /// Session manager error
    #[error("Session error: {0}")]
    Session(#[from] SessionManagerError),

    /// Portal request failed
    #[error("Portal error: {0}")]
    Api(#[from] ApiError),

    /// Nobody is signed in
    #[error("Not signed in")]
    NotSignedIn,

    /// The signed-in user has no access to this student
    #[error("Student not linked to this account: {0}")]
    UnknownStudent(String),
}

impl AppStateError {
    /// Message suitable for showing to the user
    pub fn user_message(&self) -> String {
        match self {
            AppStateError::Session(e) => e.user_message(),
            AppStateError::Api(e) if e.is_connection_error() => {
                portal_client::session::CONNECTION_ERROR_MESSAGE.to_string()
            }
            AppStateError::Api(e) => e.message(),
            AppStateError::NotSignedIn => "Please sign in to continue.".to_string(),
            AppStateError::UnknownStudent(_) => {
                "This student is not linked to your account.".to_string()
            }
        }
    }
}

/// Result type for store operations
pub type Result<T> = std::result::Result<T, AppStateError>;

/// Session, preferences and portal data for one app instance
#[derive(Clone)]
pub struct AppStore {
    session: Arc<RwLock<SessionManager>>,
    currency: Arc<CurrencyService>,
    theme: Arc<ThemeService>,
}

impl AppStore {
    /// Create a store; preferences are read from `kv` immediately
    pub fn new(kv: Arc<KvStore>, api: Arc<dyn PortalApi>) -> Self {
        Self::with_system_scheme(kv, api, ColorScheme::default())
    }

    /// Create a store with the OS colour scheme known up front
    pub fn with_system_scheme(
        kv: Arc<KvStore>,
        api: Arc<dyn PortalApi>,
        system_scheme: ColorScheme,
    ) -> Self {
        let session = SessionManager::new(api, kv.clone());
        Self::with_session(session, kv, system_scheme)
    }

    /// Create a store around a configured session manager
    pub fn with_session(
        session: SessionManager,
        kv: Arc<KvStore>,
        system_scheme: ColorScheme,
    ) -> Self {
        let device = ScopedStore::device(kv);
        let currency = CurrencyService::load(device.clone());
        let theme = ThemeService::load(device, system_scheme);

        tracing::debug!(
            currency = %currency.code(),
            theme = %theme.mode(),
            "Loaded device preferences"
        );

        Self {
            session: Arc::new(RwLock::new(session)),
            currency: Arc::new(currency),
            theme: Arc::new(theme),
        }
    }

    /// Shared session manager
    pub fn session(&self) -> Arc<RwLock<SessionManager>> {
        self.session.clone()
    }

    /// Currency preference
    pub fn currency(&self) -> &CurrencyService {
        &self.currency
    }

    /// Theme preference
    pub fn theme(&self) -> &ThemeService {
        &self.theme
    }

    // ========================================================================
    // Session
    // ========================================================================

    /// Restore the previous session, if any, and verify it with the portal
    pub async fn start(&self) -> Result<Option<User>> {
        Ok(self.session.write().await.restore_session().await?)
    }

    /// Sign in
    pub async fn login(&self, identifier: &str, password: &str, role: UserRole) -> Result<User> {
        Ok(self.session.write().await.login(identifier, password, role).await?)
    }

    /// Sign out; device preferences are kept
    pub async fn logout(&self) -> Result<()> {
        Ok(self.session.write().await.logout().await?)
    }

    /// Signed-in user
    pub async fn current_user(&self) -> Option<User> {
        self.session.read().await.current_user().cloned()
    }

    /// Where the session lifecycle stands
    pub async fn phase(&self) -> SessionPhase {
        self.session.read().await.phase()
    }

    /// Whether a user is signed in
    pub async fn is_authenticated(&self) -> bool {
        self.session.read().await.is_authenticated()
    }

    // ========================================================================
    // Portal data
    // ========================================================================

    /// Home screen summary
    pub async fn dashboard(&self) -> Result<Dashboard> {
        let (api, _) = self.signed_in().await?;
        self.checked(api.fetch_dashboard().await).await
    }

    /// Fee statement of a student the user may see
    pub async fn fee_overview(&self, student_id: &str) -> Result<FeeOverview> {
        let api = self.for_student(student_id).await?;
        let statement = self.checked(api.fetch_fees(student_id).await).await?;
        Ok(FeeOverview::new(statement))
    }

    /// Exam results of a student the user may see
    pub async fn results(&self, student_id: &str, exam: Option<String>) -> Result<ResultsView> {
        let api = self.for_student(student_id).await?;
        let results = self.checked(api.fetch_results(student_id, exam).await).await?;
        Ok(ResultsView::new(results))
    }

    /// Notification inbox of the signed-in user
    pub async fn inbox(&self) -> Result<NotificationInbox> {
        let (api, _) = self.signed_in().await?;
        let mut inbox = NotificationInbox::default();
        self.checked(inbox.refresh(api.as_ref()).await).await?;
        Ok(inbox)
    }

    /// Mark a notification read on the portal and in `inbox`
    pub async fn mark_notification_read(&self, inbox: &mut NotificationInbox, id: &str) -> Result<bool> {
        let (api, _) = self.signed_in().await?;
        self.checked(inbox.mark_read(api.as_ref(), id).await).await
    }

    /// Drop the session when the portal no longer accepts its token
    async fn checked<T>(&self, result: std::result::Result<T, ApiError>) -> Result<T> {
        match result {
            Err(err @ ApiError::Unauthorized(_)) => {
                tracing::warn!(error = %err, "Portal rejected the session token");
                self.session.write().await.invalidate();
                Err(err.into())
            }
            other => Ok(other?),
        }
    }

    async fn signed_in(&self) -> Result<(Arc<dyn PortalApi>, User)> {
        let session = self.session.read().await;
        match session.current_user() {
            Some(user) if session.is_authenticated() => Ok((session.agent(), user.clone())),
            _ => Err(AppStateError::NotSignedIn),
        }
    }

    /// Students see themselves; parents see their linked children
    async fn for_student(&self, student_id: &str) -> Result<Arc<dyn PortalApi>> {
        let (api, user) = self.signed_in().await?;
        let allowed = match user.role {
            UserRole::Student => user.id == student_id,
            UserRole::Parent => user.children.iter().any(|c| c == student_id),
        };

        if allowed {
            Ok(api)
        } else {
            tracing::warn!(user = %user.id, student = student_id, "Rejected access to student data");
            Err(AppStateError::UnknownStudent(student_id.to_string()))
        }
    }
}

impl std::fmt::Debug for AppStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppStore")
            .field("currency", &self.currency.code())
            .field("theme", &self.theme.mode())
            .finish_non_exhaustive()
    }
}
