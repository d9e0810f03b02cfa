//! Persisted bearer token.
//!
//! SYSTEM CONTEXT
//! ==============
//! The gateway reads the token before every request, the route guard reads it
//! before every navigation, and the session writes it on login/logout. One key
//! holds one opaque string; absent and blank mean "logged out".
//!
//! ERROR HANDLING
//! ==============
//! Backing-medium failures are logged and turned into "absent" so a storage
//! outage degrades to logged-out instead of crashing the caller.

#[cfg(test)]
#[path = "token_store_test.rs"]
mod token_store_test;

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

pub const ACCESS_TOKEN_KEY: &str = "promptworks:access_token";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("storage unavailable: {0}")]
pub struct StorageError(pub String);

/// A key/value medium the token can live in.
pub trait TokenBackend {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Handle to the token slot. Cloning shares the backend.
#[derive(Clone, Default)]
pub struct TokenStore {
    backend: Option<Rc<dyn TokenBackend>>,
}

impl fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenStore").field("detached", &self.is_detached()).finish()
    }
}

impl TokenStore {
    pub fn new(backend: Rc<dyn TokenBackend>) -> Self {
        Self { backend: Some(backend) }
    }

    /// A store with no backing medium: `get` is always `None`, `set` is a no-op.
    pub fn detached() -> Self {
        Self { backend: None }
    }

    pub fn is_detached(&self) -> bool {
        self.backend.is_none()
    }

    pub fn get(&self) -> Option<String> {
        let backend = self.backend.as_ref()?;
        match backend.read(ACCESS_TOKEN_KEY) {
            Ok(raw) => raw.filter(|token| !token.trim().is_empty()),
            Err(e) => {
                log::warn!("token store: read failed: {e}");
                None
            }
        }
    }

    /// Store `token`, or clear the slot when it is absent or blank.
    pub fn set(&self, token: Option<&str>) {
        let Some(backend) = self.backend.as_ref() else {
            return;
        };
        let result = match token.filter(|token| !token.trim().is_empty()) {
            Some(token) => backend.write(ACCESS_TOKEN_KEY, token),
            None => backend.remove(ACCESS_TOKEN_KEY),
        };
        if let Err(e) = result {
            log::warn!("token store: write failed: {e}");
        }
    }

    pub fn clear(&self) {
        self.set(None);
    }
}

/// In-process backend. Survives only as long as the process; can be told to
/// fail so callers can exercise the degraded path.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    entries: Rc<RefCell<HashMap<String, String>>>,
    failing: Rc<Cell<bool>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.set(failing);
    }

    /// Raw stored value, bypassing blank filtering.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn check(&self) -> Result<(), StorageError> {
        if self.failing.get() {
            return Err(StorageError("memory backend marked failing".to_owned()));
        }
        Ok(())
    }
}

impl TokenBackend for MemoryBackend {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check()?;
        Ok(self.raw(key))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check()?;
        self.entries.borrow_mut().insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.check()?;
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// `window.localStorage` backend.
#[cfg(feature = "hydrate")]
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorageBackend;

#[cfg(feature = "hydrate")]
impl LocalStorageBackend {
    fn storage() -> Result<web_sys::Storage, StorageError> {
        let window = web_sys::window().ok_or_else(|| StorageError("no window".to_owned()))?;
        window
            .local_storage()
            .map_err(|e| StorageError(format!("{e:?}")))?
            .ok_or_else(|| StorageError("localStorage missing".to_owned()))
    }
}

#[cfg(feature = "hydrate")]
impl TokenBackend for LocalStorageBackend {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Self::storage()?.get_item(key).map_err(|e| StorageError(format!("{e:?}")))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        Self::storage()?.set_item(key, value).map_err(|e| StorageError(format!("{e:?}")))
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        Self::storage()?.remove_item(key).map_err(|e| StorageError(format!("{e:?}")))
    }
}

fn default_store() -> TokenStore {
    #[cfg(feature = "hydrate")]
    {
        if web_sys::window().is_some() {
            return TokenStore::new(Rc::new(LocalStorageBackend));
        }
    }
    TokenStore::detached()
}

thread_local! {
    static GLOBAL_STORE: TokenStore = default_store();
}

/// The process-wide store, created on first access.
pub fn global() -> TokenStore {
    GLOBAL_STORE.with(TokenStore::clone)
}
