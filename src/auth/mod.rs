//! Durable storage for the single active API key.

use std::sync::{Arc, Mutex};

use keyring::Entry;
use tracing::debug;

use crate::core::constants::{KEYRING_ACCOUNT, KEYRING_SERVICE};
use crate::core::keyring::KeyringAccessError;

pub mod ui;

/// Durable slot holding at most one secret.
pub trait SecretBackend: Send + Sync {
    /// Returns `Ok(None)` when nothing is stored.
    fn load(&self) -> Result<Option<String>, KeyringAccessError>;
    fn store(&self, secret: &str) -> Result<(), KeyringAccessError>;
    /// Deleting an empty slot succeeds.
    fn delete(&self) -> Result<(), KeyringAccessError>;
}

/// The platform keyring (Secret Service, Keychain, Credential Manager).
pub struct KeyringBackend {
    service: String,
    account: String,
}

impl KeyringBackend {
    pub fn new(service: impl Into<String>, account: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            account: account.into(),
        }
    }

    fn entry(&self) -> Result<Entry, KeyringAccessError> {
        Ok(Entry::new(&self.service, &self.account)?)
    }
}

impl Default for KeyringBackend {
    fn default() -> Self {
        Self::new(KEYRING_SERVICE, KEYRING_ACCOUNT)
    }
}

impl SecretBackend for KeyringBackend {
    fn load(&self) -> Result<Option<String>, KeyringAccessError> {
        match self.entry()?.get_password() {
            Ok(secret) => Ok(Some(secret)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn store(&self, secret: &str) -> Result<(), KeyringAccessError> {
        self.entry()?.set_password(secret)?;
        Ok(())
    }

    fn delete(&self) -> Result<(), KeyringAccessError> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// Process-local slot, for tests and `--no-keyring` runs.
///
/// Clones share the same slot, so a test can keep a handle and inspect what
/// the store persisted.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(secret.into()))),
        }
    }

    pub fn snapshot(&self) -> Option<String> {
        self.slot.lock().ok().and_then(|slot| slot.clone())
    }
}

impl SecretBackend for MemoryBackend {
    fn load(&self) -> Result<Option<String>, KeyringAccessError> {
        Ok(self.snapshot())
    }

    fn store(&self, secret: &str) -> Result<(), KeyringAccessError> {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = Some(secret.to_string());
        }
        Ok(())
    }

    fn delete(&self) -> Result<(), KeyringAccessError> {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = None;
        }
        Ok(())
    }
}

/// get/set/clear for the active API key, with a lazily filled in-memory copy.
///
/// All writes go through this type, so the cached copy can never be stale
/// relative to the backend.
pub struct CredentialStore {
    backend: Box<dyn SecretBackend>,
    cached: Option<String>,
}

impl CredentialStore {
    pub fn new(backend: Box<dyn SecretBackend>) -> Self {
        Self {
            backend,
            cached: None,
        }
    }

    pub fn keyring() -> Self {
        Self::new(Box::new(KeyringBackend::default()))
    }

    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryBackend::new()))
    }

    pub fn set(&mut self, key: &str) -> Result<(), KeyringAccessError> {
        self.backend.store(key)?;
        self.cached = Some(key.to_string());
        debug!("credential stored");
        Ok(())
    }

    pub fn get(&mut self) -> Result<Option<String>, KeyringAccessError> {
        if self.cached.is_none() {
            self.cached = self.backend.load()?;
        }
        Ok(self.cached.clone())
    }

    pub fn clear(&mut self) -> Result<(), KeyringAccessError> {
        self.cached = None;
        self.backend.delete()?;
        debug!("credential cleared");
        Ok(())
    }

    /// The in-memory copy only; `None` until `get` or `set` has filled it.
    pub fn cached(&self) -> Option<&str> {
        self.cached.as_deref()
    }
}
