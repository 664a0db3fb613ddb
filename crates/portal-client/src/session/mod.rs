//! Portal session management
//!
//! This module holds the session model and the [`SessionManager`] that drives
//! the sign-in lifecycle:
//! - credential validation before any network call
//! - login with role check and persistence
//! - restore at start-up (cached first, then verified against the server)
//! - logout with unconditional local cleanup
//!
//! # Example
//!
//! ```rust
//! use portal_client::session::{Credentials, SessionPhase};
//! use portal_client::UserRole;
//!
//! let credentials = Credentials::new("  alex@school.com ", "student123", UserRole::Student);
//! assert!(credentials.validate().is_ok());
//! assert_eq!(credentials.identifier(), "alex@school.com");
//!
//! assert!(!SessionPhase::Unknown.is_authenticated());
//! assert!(SessionPhase::Cached.is_authenticated());
//! ```

mod manager;

pub use manager::{SessionManager, SessionManagerError, CONNECTION_ERROR_MESSAGE};

use crate::types::{User, UserRole};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Message shown when the sign-in form is incomplete
pub const MISSING_CREDENTIALS_MESSAGE: &str = "Please enter both email and password";

/// Message shown when the portal rejects credentials without saying why
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid email/ID or password";

/// An authenticated session: bearer token plus profile snapshot
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque bearer token
    pub token: String,
    /// Profile snapshot taken at login or last verification
    pub user: User,
}

impl Session {
    /// Create a session
    pub fn new(token: impl Into<String>, user: User) -> Self {
        Self {
            token: token.into(),
            user,
        }
    }

    /// Role of the signed-in user
    pub fn role(&self) -> UserRole {
        self.user.role
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<redacted>")
            .field("user", &self.user)
            .finish()
    }
}

/// Where the session stands in its lifecycle
///
/// ```text
/// Unknown --load--> Cached --verify--> Verified
///    |                  \--verify--> Invalid
///    \--load--> SignedOut
/// Unknown | SignedOut | Invalid --login--> Verified
/// any --logout--> SignedOut
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// Nothing has been read from storage yet
    #[default]
    Unknown,
    /// A persisted session was loaded but not yet checked with the server
    Cached,
    /// The server confirmed the session
    Verified,
    /// The persisted session was rejected and has been cleared
    Invalid,
    /// No session
    SignedOut,
}

impl SessionPhase {
    /// Whether a user is available in this phase
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionPhase::Cached | SessionPhase::Verified)
    }

    /// Whether start-up restoration has finished
    pub fn is_settled(&self) -> bool {
        !matches!(self, SessionPhase::Unknown | SessionPhase::Cached)
    }
}

/// Sign-in form input
#[derive(Clone)]
pub struct Credentials {
    identifier: String,
    password: String,
    role: UserRole,
}

impl Credentials {
    /// Create credentials; the identifier is trimmed
    pub fn new(identifier: impl Into<String>, password: impl Into<String>, role: UserRole) -> Self {
        Self {
            identifier: identifier.into().trim().to_string(),
            password: password.into(),
            role,
        }
    }

    /// Email address or portal id
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Password
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Role the user is signing in as
    pub fn role(&self) -> UserRole {
        self.role
    }

    /// Reject empty or whitespace-only fields
    pub fn validate(&self) -> Result<(), SessionManagerError> {
        if self.identifier.is_empty() || self.password.trim().is_empty() {
            return Err(SessionManagerError::Validation(
                MISSING_CREDENTIALS_MESSAGE.to_string(),
            ));
        }
        Ok(())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("identifier", &self.identifier)
            .field("password", &"<redacted>")
            .field("role", &self.role)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        serde_json::from_value(serde_json::json!({
            "id": "STU001",
            "email": "alex@school.com",
            "name": "Alex Johnson",
            "role": "student"
        }))
        .unwrap()
    }

    #[test]
    fn test_credentials_validation() {
        assert!(Credentials::new("alex@school.com", "student123", UserRole::Student)
            .validate()
            .is_ok());

        let err = Credentials::new("   ", "student123", UserRole::Student)
            .validate()
            .unwrap_err();
        assert_eq!(err.user_message(), MISSING_CREDENTIALS_MESSAGE);

        assert!(Credentials::new("alex@school.com", "  ", UserRole::Student)
            .validate()
            .is_err());
        assert!(Credentials::new("", "", UserRole::Parent).validate().is_err());
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let credentials = Credentials::new("PAR001", "parent123", UserRole::Parent);
        let debug = format!("{:?}", credentials);
        assert!(debug.contains("PAR001"));
        assert!(!debug.contains("parent123"));
    }

    #[test]
    fn test_session_debug_redacts_token() {
        let session = Session::new("secret-token", sample_user());
        let debug = format!("{:?}", session);
        assert!(!debug.contains("secret-token"));
        assert_eq!(session.role(), UserRole::Student);
    }

    #[test]
    fn test_phase_predicates() {
        assert!(SessionPhase::Verified.is_authenticated());
        assert!(!SessionPhase::Invalid.is_authenticated());
        assert!(!SessionPhase::SignedOut.is_authenticated());

        assert!(!SessionPhase::Unknown.is_settled());
        assert!(!SessionPhase::Cached.is_settled());
        assert!(SessionPhase::Invalid.is_settled());
        assert_eq!(SessionPhase::default(), SessionPhase::Unknown);
    }
}
