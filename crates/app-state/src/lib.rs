//! Application state for the school portal client
//!
//! This crate composes the session manager with the device preferences
//! (display currency and theme) into a single [`AppStore`] that is created
//! explicitly at startup and shared with the UI layer.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod preferences;
pub mod store;

pub use preferences::{CurrencyService, ThemeService};
pub use store::{AppStateError, AppStore, Result};
