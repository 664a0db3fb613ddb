//! User interface support for the school portal
//!
//! This crate provides the theming layer shared by the student and parent
//! screens.
//!
//! Two palettes are supported:
//! - [`theme::ThemeName::Light`] - Gray-50 background with blue accents
//! - [`theme::ThemeName::Dark`] - Gray-900 background with lighter accents
//!
//! # Example
//!
//! ```rust
//! use app_ui::{ColorScheme, ThemeMode, ThemeState};
//!
//! let state = ThemeState::new(ThemeMode::Dark, ColorScheme::Light);
//! assert!(state.theme().is_dark());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod theme;

pub use theme::{
    dark_theme, get_theme, light_theme, ColorScheme, StatusBarStyle, Theme, ThemeColors,
    ThemeMode, ThemeName, ThemeState,
};
