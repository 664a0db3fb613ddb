//! Theme palettes and theme mode resolution
//!
//! Two palettes are supported, light and dark. The user picks a
//! [`ThemeMode`]; with [`ThemeMode::System`] the effective theme follows the
//! color scheme reported by the operating system.
//!
//! # Usage
//!
//! ```rust
//! use app_ui::theme::{ColorScheme, ThemeMode, ThemeName, ThemeState};
//!
//! let mut state = ThemeState::new(ThemeMode::System, ColorScheme::Dark);
//! assert!(state.is_dark());
//! assert_eq!(state.theme().colors.background, "#111827");
//!
//! state.toggle();
//! assert_eq!(state.mode(), ThemeMode::Light);
//! assert_eq!(state.effective(), ThemeName::Light);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Color Types
// =============================================================================

/// A color as a hex string ("#F9FAFB") or CSS rgba() string
pub type Color = &'static str;

// =============================================================================
// Modes
// =============================================================================

/// Theme preference chosen by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    /// Always light
    Light,
    /// Always dark
    Dark,
    /// Follow the operating system
    #[default]
    System,
}

impl ThemeMode {
    /// Stored name
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
            ThemeMode::System => "system",
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(ThemeMode::Light),
            "dark" => Ok(ThemeMode::Dark),
            "system" => Ok(ThemeMode::System),
            _ => Err(format!("Unknown theme mode: {}", s)),
        }
    }
}

/// Color scheme reported by the operating system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    /// Light appearance
    #[default]
    Light,
    /// Dark appearance
    Dark,
}

/// Resolved palette name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeName {
    /// Light palette
    Light,
    /// Dark palette
    Dark,
}

impl fmt::Display for ThemeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThemeName::Light => write!(f, "Light"),
            ThemeName::Dark => write!(f, "Dark"),
        }
    }
}

/// Style of the status bar content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusBarStyle {
    /// Dark icons, for light backgrounds
    Dark,
    /// Light icons, for dark backgrounds
    Light,
}

// =============================================================================
// Theme Definition
// =============================================================================

/// Semantic colors of a palette
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeColors {
    pub background: Color,
    pub background_secondary: Color,
    pub background_tertiary: Color,

    pub card: Color,
    pub card_elevated: Color,

    pub text: Color,
    pub text_secondary: Color,
    pub text_tertiary: Color,
    pub text_inverse: Color,

    pub border: Color,
    pub border_light: Color,

    /// Blue, used for student screens
    pub primary: Color,
    pub primary_light: Color,
    pub primary_dark: Color,

    /// Purple, used for parent screens
    pub secondary: Color,
    pub secondary_light: Color,
    pub secondary_dark: Color,

    pub success: Color,
    pub success_light: Color,
    pub success_dark: Color,

    pub warning: Color,
    pub warning_light: Color,
    pub warning_dark: Color,

    pub error: Color,
    pub error_light: Color,
    pub error_dark: Color,

    pub tab_bar: Color,
    pub tab_bar_border: Color,
    pub tab_bar_active: Color,
    pub tab_bar_inactive: Color,

    pub input_background: Color,
    pub input_border: Color,
    pub input_text: Color,
    pub input_placeholder: Color,

    pub shadow: Color,
    pub overlay: Color,
}

/// Complete theme definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Theme {
    /// Palette name
    pub name: ThemeName,
    /// Status bar content style
    pub status_bar: StatusBarStyle,
    /// Semantic colors
    pub colors: ThemeColors,
}

impl Theme {
    /// Check if this is the dark palette
    pub fn is_dark(&self) -> bool {
        self.name == ThemeName::Dark
    }
}

/// The light palette
pub fn light_theme() -> Theme {
    Theme {
        name: ThemeName::Light,
        status_bar: StatusBarStyle::Dark,
        colors: ThemeColors {
            background: "#F9FAFB",
            background_secondary: "#FFFFFF",
            background_tertiary: "#F3F4F6",
            card: "#FFFFFF",
            card_elevated: "#FFFFFF",
            text: "#1F2937",
            text_secondary: "#6B7280",
            text_tertiary: "#9CA3AF",
            text_inverse: "#FFFFFF",
            border: "#E5E7EB",
            border_light: "#F3F4F6",
            primary: "#3B82F6",
            primary_light: "#EFF6FF",
            primary_dark: "#2563EB",
            secondary: "#8B5CF6",
            secondary_light: "#F3E8FF",
            secondary_dark: "#7C3AED",
            success: "#22C55E",
            success_light: "#D1FAE5",
            success_dark: "#059669",
            warning: "#F59E0B",
            warning_light: "#FEF3C7",
            warning_dark: "#D97706",
            error: "#EF4444",
            error_light: "#FEE2E2",
            error_dark: "#DC2626",
            tab_bar: "#FFFFFF",
            tab_bar_border: "#E5E7EB",
            tab_bar_active: "#3B82F6",
            tab_bar_inactive: "#6B7280",
            input_background: "#F9FAFB",
            input_border: "#E5E7EB",
            input_text: "#1F2937",
            input_placeholder: "#9CA3AF",
            shadow: "#000000",
            overlay: "rgba(0, 0, 0, 0.5)",
        },
    }
}

/// The dark palette
pub fn dark_theme() -> Theme {
    Theme {
        name: ThemeName::Dark,
        status_bar: StatusBarStyle::Light,
        colors: ThemeColors {
            background: "#111827",
            background_secondary: "#1F2937",
            background_tertiary: "#374151",
            card: "#1F2937",
            card_elevated: "#374151",
            text: "#F9FAFB",
            text_secondary: "#D1D5DB",
            text_tertiary: "#9CA3AF",
            text_inverse: "#1F2937",
            border: "#374151",
            border_light: "#4B5563",
            primary: "#60A5FA",
            primary_light: "#1E3A5F",
            primary_dark: "#3B82F6",
            secondary: "#A78BFA",
            secondary_light: "#2D2150",
            secondary_dark: "#8B5CF6",
            success: "#34D399",
            success_light: "#064E3B",
            success_dark: "#10B981",
            warning: "#FBBF24",
            warning_light: "#78350F",
            warning_dark: "#F59E0B",
            error: "#F87171",
            error_light: "#7F1D1D",
            error_dark: "#EF4444",
            tab_bar: "#1F2937",
            tab_bar_border: "#374151",
            tab_bar_active: "#60A5FA",
            tab_bar_inactive: "#9CA3AF",
            input_background: "#374151",
            input_border: "#4B5563",
            input_text: "#F9FAFB",
            input_placeholder: "#9CA3AF",
            shadow: "#000000",
            overlay: "rgba(0, 0, 0, 0.7)",
        },
    }
}

/// Get a theme by name
pub fn get_theme(name: ThemeName) -> Theme {
    match name {
        ThemeName::Light => light_theme(),
        ThemeName::Dark => dark_theme(),
    }
}

// =============================================================================
// Theme State
// =============================================================================

/// Theme provider state: the chosen mode plus the OS color scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ThemeState {
    mode: ThemeMode,
    system_scheme: ColorScheme,
}

impl ThemeState {
    /// Create a state from a mode and the current OS scheme
    pub fn new(mode: ThemeMode, system_scheme: ColorScheme) -> Self {
        Self { mode, system_scheme }
    }

    /// Chosen mode
    pub fn mode(&self) -> ThemeMode {
        self.mode
    }

    /// Last reported OS scheme
    pub fn system_scheme(&self) -> ColorScheme {
        self.system_scheme
    }

    /// Whether the dark palette is in effect
    pub fn is_dark(&self) -> bool {
        self.mode == ThemeMode::Dark
            || (self.mode == ThemeMode::System && self.system_scheme == ColorScheme::Dark)
    }

    /// Palette in effect
    pub fn effective(&self) -> ThemeName {
        if self.is_dark() {
            ThemeName::Dark
        } else {
            ThemeName::Light
        }
    }

    /// Theme in effect
    pub fn theme(&self) -> Theme {
        get_theme(self.effective())
    }

    /// Choose a mode
    pub fn set_mode(&mut self, mode: ThemeMode) {
        self.mode = mode;
    }

    /// Record the OS scheme
    pub fn set_system_scheme(&mut self, scheme: ColorScheme) {
        self.system_scheme = scheme;
    }

    /// Switch to the opposite of the palette in effect; returns the new mode
    ///
    /// The result is always an explicit mode, so toggling leaves
    /// [`ThemeMode::System`].
    pub fn toggle(&mut self) -> ThemeMode {
        self.mode = if self.is_dark() {
            ThemeMode::Light
        } else {
            ThemeMode::Dark
        };
        self.mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_mode_from_str() {
        assert_eq!("light".parse::<ThemeMode>().unwrap(), ThemeMode::Light);
        assert_eq!("DARK".parse::<ThemeMode>().unwrap(), ThemeMode::Dark);
        assert_eq!("system".parse::<ThemeMode>().unwrap(), ThemeMode::System);
        assert!("dim".parse::<ThemeMode>().is_err());
        assert_eq!(ThemeMode::default(), ThemeMode::System);
    }

    #[test]
    fn test_theme_mode_serde() {
        assert_eq!(serde_json::to_string(&ThemeMode::System).unwrap(), "\"system\"");
        let mode: ThemeMode = serde_json::from_str("\"dark\"").unwrap();
        assert_eq!(mode, ThemeMode::Dark);
    }

    #[test]
    fn test_is_dark_resolution() {
        let cases = [
            (ThemeMode::Light, ColorScheme::Light, false),
            (ThemeMode::Light, ColorScheme::Dark, false),
            (ThemeMode::Dark, ColorScheme::Light, true),
            (ThemeMode::Dark, ColorScheme::Dark, true),
            (ThemeMode::System, ColorScheme::Light, false),
            (ThemeMode::System, ColorScheme::Dark, true),
        ];

        for (mode, scheme, dark) in cases {
            let state = ThemeState::new(mode, scheme);
            assert_eq!(state.is_dark(), dark, "{:?}/{:?}", mode, scheme);
            assert_eq!(state.theme().is_dark(), dark);
        }
    }

    #[test]
    fn test_toggle_twice_restores_explicit_mode() {
        for mode in [ThemeMode::Light, ThemeMode::Dark] {
            for scheme in [ColorScheme::Light, ColorScheme::Dark] {
                let mut state = ThemeState::new(mode, scheme);
                let before = state.effective();
                state.toggle();
                assert_ne!(state.effective(), before);
                state.toggle();
                assert_eq!(state.effective(), before);
                assert_eq!(state.mode(), mode);
            }
        }
    }

    #[test]
    fn test_toggle_from_system_picks_opposite() {
        let mut state = ThemeState::new(ThemeMode::System, ColorScheme::Dark);
        assert_eq!(state.toggle(), ThemeMode::Light);

        let mut state = ThemeState::new(ThemeMode::System, ColorScheme::Light);
        assert_eq!(state.toggle(), ThemeMode::Dark);
    }

    #[test]
    fn test_system_scheme_change_follows_os() {
        let mut state = ThemeState::default();
        assert!(!state.is_dark());

        state.set_system_scheme(ColorScheme::Dark);
        assert!(state.is_dark());
        assert_eq!(state.system_scheme(), ColorScheme::Dark);

        state.set_mode(ThemeMode::Light);
        assert!(!state.is_dark());
    }

    #[test]
    fn test_palettes() {
        let light = light_theme();
        assert_eq!(light.colors.background, "#F9FAFB");
        assert_eq!(light.colors.primary, "#3B82F6");
        assert_eq!(light.status_bar, StatusBarStyle::Dark);

        let dark = get_theme(ThemeName::Dark);
        assert_eq!(dark.colors.text, "#F9FAFB");
        assert_eq!(dark.colors.primary, "#60A5FA");
        assert!(dark.is_dark());
    }
}
