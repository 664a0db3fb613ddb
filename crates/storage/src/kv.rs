//! Local key-value storage
//!
//! Everything the client keeps between runs lives in one sled tree, split
//! into two [`Scope`]s:
//!
//! - `session` holds the bearer token and the signed-in user. Logging out
//!   empties it.
//! - `device` holds the theme mode, the display currency and the
//!   installation id. It outlives sessions.
//!
//! Values are JSON encoded. A stored key is `<scope>:<name>`, for example
//! `session:token` or `device:theme_mode`.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use storage::{keys, KvStore, ScopedStore};
//!
//! let kv = Arc::new(KvStore::in_memory().unwrap());
//! let device = ScopedStore::device(kv);
//!
//! device.set(keys::CURRENCY, &"USD".to_string()).unwrap();
//! let code: Option<String> = device.get(keys::CURRENCY).unwrap();
//! assert_eq!(code.as_deref(), Some("USD"));
//! ```

use serde::{de::DeserializeOwned, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum KvError {
    /// sled failed to read, write or open the tree
    #[error("Database error: {0}")]
    Database(#[from] sled::Error),

    /// A stored value does not decode into the requested type
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Key names must be non-empty and must not contain the separator
    #[error("Invalid key: {0:?}")]
    InvalidKey(String),
}

/// Result type for storage operations
pub type Result<T> = std::result::Result<T, KvError>;

/// Key names used inside each scope
pub mod keys {
    /// Bearer token of the persisted session
    pub const SESSION_TOKEN: &str = "token";
    /// JSON snapshot of the signed-in user
    pub const SESSION_USER: &str = "user";

    /// Selected theme mode (`light`, `dark` or `system`)
    pub const THEME_MODE: &str = "theme_mode";
    /// Selected display currency code
    pub const CURRENCY: &str = "currency";
    /// Stable identifier of this installation
    pub const DEVICE_ID: &str = "device_id";
}

const SEPARATOR: char = ':';

/// Partition of the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Data that belongs to the signed-in user
    Session,
    /// Data that belongs to the installation
    Device,
}

impl Scope {
    /// Prefix used for keys in this scope
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Session => "session",
            Scope::Device => "device",
        }
    }

    fn key(&self, name: &str) -> Result<String> {
        if name.is_empty() || name.contains(SEPARATOR) {
            return Err(KvError::InvalidKey(name.to_string()));
        }
        Ok(format!("{}{}{}", self.as_str(), SEPARATOR, name))
    }

    fn prefix(&self) -> String {
        format!("{}{}", self.as_str(), SEPARATOR)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where and how the store is opened
#[derive(Debug, Clone)]
pub struct KvConfig {
    /// Directory sled writes into
    pub path: String,
    /// Page cache size in bytes
    pub cache_capacity: u64,
    /// Compress pages on disk
    pub use_compression: bool,
    /// Background flush interval; `None` leaves flushing to explicit calls
    pub flush_every_ms: Option<u64>,
}

impl Default for KvConfig {
    fn default() -> Self {
        Self {
            path: "school_portal_kv.db".to_string(),
            cache_capacity: 4 * 1024 * 1024,
            use_compression: true,
            flush_every_ms: Some(1000),
        }
    }
}

impl KvConfig {
    /// Defaults with a custom path
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Set the page cache size
    pub fn cache_capacity(mut self, bytes: u64) -> Self {
        self.cache_capacity = bytes;
        self
    }

    /// Enable or disable compression
    pub fn use_compression(mut self, enabled: bool) -> Self {
        self.use_compression = enabled;
        self
    }

    /// Set the background flush interval
    pub fn flush_every_ms(mut self, ms: Option<u64>) -> Self {
        self.flush_every_ms = ms;
        self
    }

    fn sled_config(&self) -> sled::Config {
        sled::Config::new()
            .path(&self.path)
            .cache_capacity(self.cache_capacity)
            .use_compression(self.use_compression)
            .flush_every_ms(self.flush_every_ms)
    }
}

/// The client's on-disk store
///
/// Cheap to share behind an `Arc`; sled serialises individual writes.
pub struct KvStore {
    db: sled::Db,
}

impl KvStore {
    /// Open (or create) the store described by `config`
    pub fn new(config: KvConfig) -> Result<Self> {
        let db = config.sled_config().open()?;
        tracing::debug!(path = %config.path, recovered = db.was_recovered(), "Opened local store");
        Ok(Self { db })
    }

    /// Temporary store that disappears when dropped
    pub fn in_memory() -> Result<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Ok(Self { db })
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        self.db
            .get(key)?
            .map(|bytes| serde_json::from_slice(&bytes))
            .transpose()
            .map_err(KvError::from)
    }

    fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        self.db.insert(key, serde_json::to_vec(value)?)?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool> {
        Ok(self.db.remove(key)?.is_some())
    }

    /// Names stored in `scope`, without the scope prefix
    pub fn names(&self, scope: Scope) -> Result<Vec<String>> {
        let prefix = scope.prefix();
        let mut names = Vec::new();
        for entry in self.db.scan_prefix(&prefix) {
            let (key, _) = entry?;
            if let Some(name) = std::str::from_utf8(&key).ok().and_then(|k| k.strip_prefix(&prefix)) {
                names.push(name.to_string());
            }
        }
        Ok(names)
    }

    /// Write pending changes to disk
    pub fn flush(&self) -> Result<()> {
        self.db.flush()?;
        Ok(())
    }

    /// Number of stored entries across all scopes
    pub fn len(&self) -> usize {
        self.db.len()
    }

    /// Whether nothing is stored
    pub fn is_empty(&self) -> bool {
        self.db.is_empty()
    }
}

/// Typed access to one [`Scope`] of a shared [`KvStore`]
#[derive(Clone)]
pub struct ScopedStore {
    kv: Arc<KvStore>,
    scope: Scope,
}

impl ScopedStore {
    /// View of `scope`
    pub fn new(kv: Arc<KvStore>, scope: Scope) -> Self {
        Self { kv, scope }
    }

    /// View of the session scope
    pub fn session(kv: Arc<KvStore>) -> Self {
        Self::new(kv, Scope::Session)
    }

    /// View of the device scope
    pub fn device(kv: Arc<KvStore>) -> Self {
        Self::new(kv, Scope::Device)
    }

    /// Scope this view covers
    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// Read and decode `name`
    pub fn get<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        self.kv.read(&self.scope.key(name)?)
    }

    /// Encode and write `name`
    pub fn set<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Result<()> {
        self.kv.write(&self.scope.key(name)?, value)
    }

    /// Delete `name`; returns whether it was present
    pub fn remove(&self, name: &str) -> Result<bool> {
        self.kv.delete(&self.scope.key(name)?)
    }

    /// Whether `name` is present
    pub fn contains(&self, name: &str) -> Result<bool> {
        Ok(self.kv.db.contains_key(self.scope.key(name)?)?)
    }

    /// Delete everything in this scope; returns how many entries went
    pub fn clear(&self) -> Result<usize> {
        let names = self.kv.names(self.scope)?;
        let mut removed = 0;
        for name in &names {
            if self.remove(name)? {
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Write pending changes to disk
    pub fn flush(&self) -> Result<()> {
        self.kv.flush()
    }
}

impl fmt::Debug for ScopedStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopedStore").field("scope", &self.scope).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct Profile {
        id: String,
        gpa: f64,
    }

    fn stores() -> (Arc<KvStore>, ScopedStore, ScopedStore) {
        let kv = Arc::new(KvStore::in_memory().unwrap());
        (kv.clone(), ScopedStore::session(kv.clone()), ScopedStore::device(kv))
    }

    #[test]
    fn test_new_store_is_empty() {
        let (kv, session, _) = stores();
        assert!(kv.is_empty());
        assert_eq!(session.get::<String>(keys::SESSION_TOKEN).unwrap(), None);
    }

    #[test]
    fn test_structured_value() {
        let (_, session, _) = stores();
        let profile = Profile { id: "STU001".into(), gpa: 3.8 };

        session.set(keys::SESSION_USER, &profile).unwrap();
        assert_eq!(session.get::<Profile>(keys::SESSION_USER).unwrap(), Some(profile));
    }

    #[test]
    fn test_scopes_do_not_collide() {
        let (kv, session, device) = stores();
        session.set("shared", &"s".to_string()).unwrap();
        device.set("shared", &"d".to_string()).unwrap();

        assert_eq!(session.get::<String>("shared").unwrap().as_deref(), Some("s"));
        assert_eq!(device.get::<String>("shared").unwrap().as_deref(), Some("d"));
        assert_eq!(kv.len(), 2);
        assert_eq!(kv.names(Scope::Device).unwrap(), vec!["shared".to_string()]);
    }

    #[test]
    fn test_remove_and_contains() {
        let (_, _, device) = stores();
        device.set(keys::THEME_MODE, &"dark".to_string()).unwrap();
        assert!(device.contains(keys::THEME_MODE).unwrap());

        assert!(device.remove(keys::THEME_MODE).unwrap());
        assert!(!device.contains(keys::THEME_MODE).unwrap());
        assert!(!device.remove(keys::THEME_MODE).unwrap());
    }

    #[test]
    fn test_invalid_names() {
        let (_, session, _) = stores();
        assert!(matches!(session.set("", &1), Err(KvError::InvalidKey(_))));
        assert!(matches!(session.get::<i32>("a:b"), Err(KvError::InvalidKey(_))));
    }

    #[test]
    fn test_wrong_type_is_serialization_error() {
        let (_, _, device) = stores();
        device.set(keys::CURRENCY, &"PKR".to_string()).unwrap();
        assert!(matches!(
            device.get::<Profile>(keys::CURRENCY),
            Err(KvError::Serialization(_))
        ));
    }

    #[test]
    fn test_clearing_session_keeps_device() {
        let (kv, session, device) = stores();
        session.set(keys::SESSION_TOKEN, &"token".to_string()).unwrap();
        session.set(keys::SESSION_USER, &Profile { id: "PAR001".into(), gpa: 0.0 }).unwrap();
        device.set(keys::THEME_MODE, &"dark".to_string()).unwrap();

        assert_eq!(session.clear().unwrap(), 2);
        assert!(device.contains(keys::THEME_MODE).unwrap());
        assert_eq!(kv.len(), 1);
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kv").to_string_lossy().to_string();

        {
            let device = ScopedStore::device(Arc::new(KvStore::new(KvConfig::new(path.clone())).unwrap()));
            device.set(keys::CURRENCY, &"USD".to_string()).unwrap();
            device.flush().unwrap();
        }

        let device = ScopedStore::device(Arc::new(KvStore::new(KvConfig::new(path)).unwrap()));
        assert_eq!(device.get::<String>(keys::CURRENCY).unwrap().as_deref(), Some("USD"));
    }

    #[test]
    fn test_config_builder() {
        let config = KvConfig::new("portal.db")
            .cache_capacity(1024)
            .use_compression(false)
            .flush_every_ms(None);

        assert_eq!(config.path, "portal.db");
        assert_eq!(config.cache_capacity, 1024);
        assert!(!config.use_compression);
        assert_eq!(config.flush_every_ms, None);
    }
}
