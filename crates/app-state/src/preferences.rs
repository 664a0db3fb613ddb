//! Device preferences
//!
//! Currency and theme choices survive restarts and sign-outs: they live in
//! the `device` scope, not in the session. Persisting is best effort; a
//! storage failure is logged and the in-memory choice still applies.

use app_core::currency::{Currency, CurrencyCode, CurrencyState};
use app_ui::theme::{ColorScheme, Theme, ThemeMode, ThemeState};
use parking_lot::RwLock;
use storage::{keys, ScopedStore};

/// Selected display currency
pub struct CurrencyService {
    state: RwLock<CurrencyState>,
    store: ScopedStore,
}

impl CurrencyService {
    /// Load the persisted choice; missing or unknown codes fall back to PKR
    pub fn load(store: ScopedStore) -> Self {
        let code = match store.get::<String>(keys::CURRENCY) {
            Ok(Some(raw)) => raw.parse::<CurrencyCode>().unwrap_or_else(|e| {
                tracing::warn!("Ignoring stored currency: {}", e);
                CurrencyCode::default()
            }),
            Ok(None) => CurrencyCode::default(),
            Err(e) => {
                tracing::warn!("Failed to load currency preference: {}", e);
                CurrencyCode::default()
            }
        };

        Self {
            state: RwLock::new(CurrencyState::new(code)),
            store,
        }
    }

    /// Selected code
    pub fn code(&self) -> CurrencyCode {
        self.state.read().code()
    }

    /// Selected rate table entry
    pub fn currency(&self) -> &'static Currency {
        self.code().currency()
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> CurrencyState {
        *self.state.read()
    }

    /// Select a currency and persist the choice
    pub fn set_currency(&self, code: CurrencyCode) {
        self.state.write().set_currency(code);

        let saved = self
            .store
            .set(keys::CURRENCY, &code.as_str().to_string())
            .and_then(|_| self.store.flush());
        if let Err(e) = saved {
            tracing::error!("Failed to save currency preference: {}", e);
        }
    }

    /// Convert a USD amount into the selected currency
    pub fn convert_from_usd(&self, amount_usd: f64) -> f64 {
        self.state.read().convert_from_usd(amount_usd)
    }

    /// Format a USD amount in the selected currency
    pub fn format_amount(&self, amount_usd: f64) -> String {
        self.state.read().format_amount(amount_usd)
    }

    /// Compact form of [`CurrencyService::format_amount`]
    pub fn format_amount_short(&self, amount_usd: f64) -> String {
        self.state.read().format_amount_short(amount_usd)
    }
}

/// Theme mode preference and OS scheme
pub struct ThemeService {
    state: RwLock<ThemeState>,
    store: ScopedStore,
}

impl ThemeService {
    /// Load the persisted mode; missing or invalid values mean
    /// [`ThemeMode::System`]
    pub fn load(store: ScopedStore, system_scheme: ColorScheme) -> Self {
        let mode = match store.get::<String>(keys::THEME_MODE) {
            Ok(Some(raw)) => raw.parse::<ThemeMode>().unwrap_or_else(|e| {
                tracing::warn!("Ignoring stored theme mode: {}", e);
                ThemeMode::default()
            }),
            Ok(None) => ThemeMode::default(),
            Err(e) => {
                tracing::warn!("Failed to load theme preference: {}", e);
                ThemeMode::default()
            }
        };

        Self {
            state: RwLock::new(ThemeState::new(mode, system_scheme)),
            store,
        }
    }

    /// Chosen mode
    pub fn mode(&self) -> ThemeMode {
        self.state.read().mode()
    }

    /// Whether the dark palette is in effect
    pub fn is_dark(&self) -> bool {
        self.state.read().is_dark()
    }

    /// Theme in effect
    pub fn theme(&self) -> Theme {
        self.state.read().theme()
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> ThemeState {
        *self.state.read()
    }

    /// Choose a mode and persist it
    pub fn set_mode(&self, mode: ThemeMode) {
        self.state.write().set_mode(mode);
        self.persist(mode);
    }

    /// Flip between light and dark and persist the result
    pub fn toggle(&self) -> ThemeMode {
        let mode = self.state.write().toggle();
        self.persist(mode);
        mode
    }

    /// Record the OS scheme; not persisted
    pub fn set_system_scheme(&self, scheme: ColorScheme) {
        self.state.write().set_system_scheme(scheme);
    }

    fn persist(&self, mode: ThemeMode) {
        let saved = self
            .store
            .set(keys::THEME_MODE, &mode.as_str().to_string())
            .and_then(|_| self.store.flush());
        if let Err(e) = saved {
            tracing::error!("Failed to save theme preference: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use storage::KvStore;

    fn device_store() -> ScopedStore {
        ScopedStore::device(Arc::new(KvStore::in_memory().unwrap()))
    }

    #[test]
    fn test_currency_defaults_to_pkr() {
        let service = CurrencyService::load(device_store());
        assert_eq!(service.code(), CurrencyCode::Pkr);
        assert_eq!(service.currency().symbol, "Rs");
    }

    #[test]
    fn test_currency_choice_is_persisted() {
        let store = device_store();
        let service = CurrencyService::load(store.clone());
        service.set_currency(CurrencyCode::Gbp);
        assert_eq!(service.format_amount(100.0), "£79.00");

        let reloaded = CurrencyService::load(store);
        assert_eq!(reloaded.code(), CurrencyCode::Gbp);
    }

    #[test]
    fn test_unknown_stored_currency_is_ignored() {
        let store = device_store();
        store.set(keys::CURRENCY, &"XYZ".to_string()).unwrap();

        let service = CurrencyService::load(store);
        assert_eq!(service.code(), CurrencyCode::Pkr);
    }

    #[test]
    fn test_theme_defaults_to_system() {
        let service = ThemeService::load(device_store(), ColorScheme::Dark);
        assert_eq!(service.mode(), ThemeMode::System);
        assert!(service.is_dark());
    }

    #[test]
    fn test_theme_toggle_is_persisted() {
        let store = device_store();
        let service = ThemeService::load(store.clone(), ColorScheme::Light);
        assert_eq!(service.toggle(), ThemeMode::Dark);
        assert!(service.theme().is_dark());

        let reloaded = ThemeService::load(store, ColorScheme::Light);
        assert_eq!(reloaded.mode(), ThemeMode::Dark);
    }

    #[test]
    fn test_invalid_stored_theme_is_ignored() {
        let store = device_store();
        store.set(keys::THEME_MODE, &"sepia".to_string()).unwrap();

        let service = ThemeService::load(store, ColorScheme::Light);
        assert_eq!(service.mode(), ThemeMode::System);
    }

    #[test]
    fn test_system_scheme_is_not_persisted() {
        let store = device_store();
        let service = ThemeService::load(store.clone(), ColorScheme::Light);
        service.set_system_scheme(ColorScheme::Dark);
        assert!(service.is_dark());
        assert!(!store.contains(keys::THEME_MODE).unwrap());
    }
}
