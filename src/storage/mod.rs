//! Conversation history persistence, partitioned by credential.
//!
//! Two interchangeable backends implement [`MessageStore`]:
//! [`blob::BlobStore`] keeps one JSON array per scope, and
//! [`indexed::IndexedStore`] appends rows to a SQLite table. The session
//! controller only sees [`History`], which turns every operation into a no-op
//! when no credential (and therefore no scope) is active.

use std::error::Error;
use std::fmt;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::core::config::data::{path_display, StorageKind};
use crate::core::constants::{HISTORY_DATABASE, HISTORY_DIR, HISTORY_SCOPE_PREFIX};
use crate::core::message::Message;

pub mod blob;
pub mod indexed;

pub use blob::BlobStore;
pub use indexed::IndexedStore;

/// Storage namespace for one credential's history.
///
/// Derived from a SHA-256 digest so the key itself never reaches the disk.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScopeKey(String);

impl ScopeKey {
    pub fn for_credential(credential: &str) -> Self {
        let digest = Sha256::digest(credential.as_bytes());
        Self(format!("{HISTORY_SCOPE_PREFIX}_{digest:x}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScopeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug)]
pub enum StorageError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    Sqlite(rusqlite::Error),
    /// A stored record could not be turned back into a [`Message`].
    Corrupt(String),
}

impl StorageError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        StorageError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Io { path, source } => {
                write!(f, "History I/O failed at {}: {}", path_display(path), source)
            }
            StorageError::Json { path, source } => {
                write!(
                    f,
                    "History file {} is not valid: {}",
                    path_display(path),
                    source
                )
            }
            StorageError::Sqlite(err) => write!(f, "History database error: {err}"),
            StorageError::Corrupt(reason) => write!(f, "History record is corrupt: {reason}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            StorageError::Io { source, .. } => Some(source),
            StorageError::Json { source, .. } => Some(source),
            StorageError::Sqlite(err) => Some(err),
            StorageError::Corrupt(_) => None,
        }
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        StorageError::Sqlite(err)
    }
}

/// Durable message log keyed by scope.
///
/// `append` and `clear` must not return `Ok` until the change is on disk.
pub trait MessageStore: Send {
    /// Messages for `scope`, oldest first; empty when nothing was stored.
    fn load(&self, scope: &ScopeKey) -> Result<Vec<Message>, StorageError>;
    fn append(&mut self, scope: &ScopeKey, message: &Message) -> Result<(), StorageError>;
    fn clear(&mut self, scope: &ScopeKey) -> Result<(), StorageError>;
}

/// Open the configured backend under `data_dir`.
pub fn open_store(
    kind: StorageKind,
    data_dir: &Path,
) -> Result<Box<dyn MessageStore>, StorageError> {
    debug!(backend = %kind, dir = %path_display(data_dir), "opening history store");
    match kind {
        StorageKind::Blob => Ok(Box::new(BlobStore::new(data_dir.join(HISTORY_DIR)))),
        StorageKind::Indexed => {
            std::fs::create_dir_all(data_dir).map_err(|err| StorageError::io(data_dir, err))?;
            Ok(Box::new(IndexedStore::open(
                &data_dir.join(HISTORY_DATABASE),
            )?))
        }
    }
}

/// Whether a write actually reached durable storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Durability {
    Written,
    /// No scope was active, so nothing was written.
    Skipped,
}

impl Durability {
    pub fn is_durable(self) -> bool {
        self == Durability::Written
    }
}

/// Scope-aware facade over a [`MessageStore`].
pub struct History {
    store: Box<dyn MessageStore>,
}

impl History {
    pub fn new(store: Box<dyn MessageStore>) -> Self {
        Self { store }
    }

    pub fn load(&self, scope: Option<&ScopeKey>) -> Result<Vec<Message>, StorageError> {
        match scope {
            Some(scope) => self.store.load(scope),
            None => Ok(Vec::new()),
        }
    }

    pub fn append(
        &mut self,
        scope: Option<&ScopeKey>,
        message: &Message,
    ) -> Result<Durability, StorageError> {
        match scope {
            Some(scope) => {
                self.store.append(scope, message)?;
                Ok(Durability::Written)
            }
            None => Ok(Durability::Skipped),
        }
    }

    pub fn clear(&mut self, scope: Option<&ScopeKey>) -> Result<Durability, StorageError> {
        match scope {
            Some(scope) => {
                self.store.clear(scope)?;
                Ok(Durability::Written)
            }
            None => Ok(Durability::Skipped),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn scope_keys_are_deterministic_and_hide_the_credential() {
        let first = ScopeKey::for_credential("sk-1");
        let again = ScopeKey::for_credential("sk-1");
        let other = ScopeKey::for_credential("sk-2");

        assert_eq!(first, again);
        assert_ne!(first, other);
        assert!(first.as_str().starts_with("messages_"));
        assert!(!first.as_str().contains("sk-1"));
        assert_eq!(first.as_str().len(), "messages_".len() + 64);
    }

    #[test]
    fn history_without_scope_is_a_no_op() {
        let dir = TempDir::new().expect("tempdir");
        let mut history = History::new(open_store(StorageKind::Blob, dir.path()).expect("open"));

        assert!(history.load(None).expect("load").is_empty());
        assert_eq!(
            history.append(None, &Message::user("hi")).expect("append"),
            Durability::Skipped
        );
        assert_eq!(history.clear(None).expect("clear"), Durability::Skipped);
        assert!(!dir.path().join("history").exists());
    }

    #[test]
    fn both_backends_keep_scopes_disjoint() {
        for kind in [StorageKind::Blob, StorageKind::Indexed] {
            let dir = TempDir::new().expect("tempdir");
            let mut history = History::new(open_store(kind, dir.path()).expect("open"));
            let alice = ScopeKey::for_credential("sk-alice");
            let bob = ScopeKey::for_credential("sk-bob");

            let written = history
                .append(Some(&alice), &Message::user("from alice"))
                .expect("append");
            assert!(written.is_durable());

            assert_eq!(history.load(Some(&alice)).expect("load").len(), 1, "{kind}");
            assert!(history.load(Some(&bob)).expect("load").is_empty(), "{kind}");

            history.clear(Some(&bob)).expect("clear other scope");
            assert_eq!(history.load(Some(&alice)).expect("load").len(), 1, "{kind}");
        }
    }
}
