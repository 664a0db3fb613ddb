//! School Portal Client Library
//!
//! This crate provides the client side of the school portal: the JSON API
//! client, the portal agent with one method per endpoint, the wire types and
//! the session manager that signs users in and out.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod agent;
pub mod api;
pub mod session;
pub mod types;

pub use agent::{PortalAgent, PortalApi};
pub use api::{ApiClient, ApiClientConfig, ApiError};
pub use session::{Session, SessionManager, SessionManagerError, SessionPhase};
pub use types::{User, UserRole};
