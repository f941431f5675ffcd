use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::core::message::Message;
use crate::storage::{MessageStore, ScopeKey, StorageError};

/// One JSON array of messages per scope, read and rewritten whole.
pub struct BlobStore {
    dir: PathBuf,
}

impl BlobStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, scope: &ScopeKey) -> PathBuf {
        self.dir.join(format!("{}.json", scope.as_str()))
    }

    /// Replace the whole array for `scope`. The file is swapped in by rename,
    /// so a crash leaves either the old or the new array, never a torn one.
    pub fn save(&self, scope: &ScopeKey, messages: &[Message]) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir).map_err(|err| StorageError::io(&self.dir, err))?;
        let path = self.path_for(scope);

        let contents = serde_json::to_vec(messages).map_err(|source| StorageError::Json {
            path: path.clone(),
            source,
        })?;

        let mut temp_file =
            NamedTempFile::new_in(&self.dir).map_err(|err| StorageError::io(&self.dir, err))?;
        temp_file
            .write_all(&contents)
            .and_then(|()| temp_file.as_file_mut().sync_all())
            .map_err(|err| StorageError::io(&path, err))?;
        temp_file
            .persist(&path)
            .map_err(|err| StorageError::io(&path, err.error))?;

        debug!(scope = %scope, count = messages.len(), "history blob written");
        Ok(())
    }

    fn read(path: &Path) -> Result<Vec<Message>, StorageError> {
        let contents = match fs::read(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(StorageError::io(path, err)),
        };
        serde_json::from_slice(&contents).map_err(|source| StorageError::Json {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl MessageStore for BlobStore {
    fn load(&self, scope: &ScopeKey) -> Result<Vec<Message>, StorageError> {
        Self::read(&self.path_for(scope))
    }

    fn append(&mut self, scope: &ScopeKey, message: &Message) -> Result<(), StorageError> {
        let mut messages = self.load(scope)?;
        messages.push(message.clone());
        self.save(scope, &messages)
    }

    fn clear(&mut self, scope: &ScopeKey) -> Result<(), StorageError> {
        let path = self.path_for(scope);
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(scope = %scope, "history blob removed");
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StorageError::io(&path, err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message::Role;
    use tempfile::TempDir;

    #[test]
    fn appends_round_trip_in_order() {
        let dir = TempDir::new().expect("tempdir");
        let mut store = BlobStore::new(dir.path().join("history"));
        let scope = ScopeKey::for_credential("sk-1");

        assert!(store.load(&scope).expect("empty load").is_empty());

        let sent = vec![
            Message::user("one"),
            Message::assistant("two"),
            Message::user("three"),
        ];
        for message in &sent {
            store.append(&scope, message).expect("append");
        }

        let reopened = BlobStore::new(dir.path().join("history"));
        assert_eq!(reopened.load(&scope).expect("load"), sent);
    }

    #[test]
    fn file_holds_a_plain_message_array() {
        let dir = TempDir::new().expect("tempdir");
        let store = BlobStore::new(dir.path());
        let scope = ScopeKey::for_credential("sk-1");
        let message = Message {
            content: "hello".to_string(),
            role: Role::User,
            timestamp: 42,
        };
        store.save(&scope, &[message]).expect("save");

        let raw = fs::read_to_string(dir.path().join(format!("{scope}.json"))).expect("read");
        assert_eq!(raw, r#"[{"content":"hello","role":"user","timestamp":42}]"#);
    }

    #[test]
    fn clear_removes_only_that_scope() {
        let dir = TempDir::new().expect("tempdir");
        let mut store = BlobStore::new(dir.path());
        let a = ScopeKey::for_credential("a");
        let b = ScopeKey::for_credential("b");
        store.append(&a, &Message::user("a")).expect("append a");
        store.append(&b, &Message::user("b")).expect("append b");

        store.clear(&a).expect("clear");
        store.clear(&a).expect("second clear is fine");

        assert!(store.load(&a).expect("load a").is_empty());
        assert_eq!(store.load(&b).expect("load b").len(), 1);
    }

    #[test]
    fn corrupt_blob_is_reported() {
        let dir = TempDir::new().expect("tempdir");
        let store = BlobStore::new(dir.path());
        let scope = ScopeKey::for_credential("sk-1");
        fs::write(dir.path().join(format!("{scope}.json")), "{not json").expect("write");

        assert!(matches!(store.load(&scope), Err(StorageError::Json { .. })));
    }
}
