//! School portal client core
//!
//! Facade over the workspace crates: configuration, logging set-up and
//! construction of the [`AppStore`].
//!
//! # Example
//!
//! ```rust,no_run
//! use school_portal::{init_tracing, open, PortalConfig};
//! use school_portal::portal_client::UserRole;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = PortalConfig::load(None)?;
//!     init_tracing(&config.log_filter);
//!
//!     let store = open(&config)?;
//!     let user = match store.start().await? {
//!         Some(user) => user,
//!         None => store.login("alex@school.com", "student123", UserRole::Student).await?,
//!     };
//!     println!("Signed in as {}", user.name);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;

pub use app_core;
pub use app_state;
pub use app_ui;
pub use portal_client;
pub use storage;

pub use app_state::{AppStateError, AppStore};
pub use config::{ConfigError, PortalConfig};

use anyhow::Context;
use portal_client::{PortalAgent, SessionManager};
use std::sync::Arc;
use storage::KvStore;
use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber
///
/// `RUST_LOG` takes precedence over `default_filter`. Returns `false` when a
/// subscriber was already installed.
pub fn init_tracing(default_filter: &str) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}

/// Open the local store and build an [`AppStore`] for `config`
pub fn open(config: &PortalConfig) -> anyhow::Result<AppStore> {
    config.validate()?;

    std::fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("Failed to create data directory {}", config.data_dir.display()))?;

    let kv = Arc::new(KvStore::new(config.kv_config()).context("Failed to open local store")?);
    let agent = PortalAgent::with_config(config.api_client_config()).context("Failed to build HTTP client")?;

    tracing::info!(api_url = %config.api_url, platform = ?config.platform, "Opening school portal client");

    let session = SessionManager::new(Arc::new(agent), kv.clone()).with_platform(config.platform);
    Ok(AppStore::with_session(session, kv, app_ui::ColorScheme::default()))
}
