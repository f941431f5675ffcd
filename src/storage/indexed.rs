use std::path::Path;

use rusqlite::{params, Connection, Row};
use tracing::debug;

use crate::core::message::{Message, Role};
use crate::storage::{MessageStore, ScopeKey, StorageError};

/// A message row as stored, with its auto-assigned id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRecord {
    pub id: i64,
    pub message: Message,
    pub conversation_id: Option<String>,
}

/// Append-only SQLite log with indexes on scope, timestamp and conversation.
pub struct IndexedStore {
    conn: Connection,
}

impl IndexedStore {
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    pub fn in_memory() -> Result<Self, StorageError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StorageError> {
        let store = Self { conn };
        store.create_tables()?;
        Ok(store)
    }

    fn create_tables(&self) -> Result<(), StorageError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS messages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                scope TEXT NOT NULL,
                content TEXT NOT NULL,
                role TEXT NOT NULL,
                timestamp INTEGER NOT NULL,
                conversation_id TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_messages_scope ON messages (scope);
            CREATE INDEX IF NOT EXISTS idx_messages_timestamp ON messages (timestamp);
            CREATE INDEX IF NOT EXISTS idx_messages_conversation_id ON messages (conversation_id);",
        )?;
        Ok(())
    }

    /// Insert one message and return its id.
    pub fn insert(
        &self,
        scope: &ScopeKey,
        message: &Message,
        conversation_id: Option<&str>,
    ) -> Result<i64, StorageError> {
        self.conn.execute(
            "INSERT INTO messages (scope, content, role, timestamp, conversation_id)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                scope.as_str(),
                message.content,
                message.role.as_str(),
                message.timestamp,
                conversation_id
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        debug!(scope = %scope, id, "history row inserted");
        Ok(id)
    }

    /// Every record in `scope`, in insertion order.
    pub fn records(&self, scope: &ScopeKey) -> Result<Vec<StoredRecord>, StorageError> {
        self.query(
            "SELECT id, content, role, timestamp, conversation_id FROM messages
             WHERE scope = ?1 ORDER BY id",
            params![scope.as_str()],
        )
    }

    /// Records in `scope` tagged with `conversation_id`, in insertion order.
    pub fn conversation(
        &self,
        scope: &ScopeKey,
        conversation_id: &str,
    ) -> Result<Vec<StoredRecord>, StorageError> {
        self.query(
            "SELECT id, content, role, timestamp, conversation_id FROM messages
             WHERE scope = ?1 AND conversation_id = ?2 ORDER BY id",
            params![scope.as_str(), conversation_id],
        )
    }

    /// Records in `scope` created at or after `since_millis`.
    pub fn since(
        &self,
        scope: &ScopeKey,
        since_millis: i64,
    ) -> Result<Vec<StoredRecord>, StorageError> {
        self.query(
            "SELECT id, content, role, timestamp, conversation_id FROM messages
             WHERE scope = ?1 AND timestamp >= ?2 ORDER BY timestamp, id",
            params![scope.as_str(), since_millis],
        )
    }

    fn query(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<StoredRecord>, StorageError> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, RawRecord::from_row)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?.into_record()?);
        }
        Ok(records)
    }
}

struct RawRecord {
    id: i64,
    content: String,
    role: String,
    timestamp: i64,
    conversation_id: Option<String>,
}

impl RawRecord {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            content: row.get(1)?,
            role: row.get(2)?,
            timestamp: row.get(3)?,
            conversation_id: row.get(4)?,
        })
    }

    fn into_record(self) -> Result<StoredRecord, StorageError> {
        let role = Role::try_from(self.role.as_str())
            .map_err(|reason| StorageError::Corrupt(format!("row {}: {reason}", self.id)))?;
        Ok(StoredRecord {
            id: self.id,
            message: Message {
                content: self.content,
                role,
                timestamp: self.timestamp,
            },
            conversation_id: self.conversation_id,
        })
    }
}

impl MessageStore for IndexedStore {
    fn load(&self, scope: &ScopeKey) -> Result<Vec<Message>, StorageError> {
        Ok(self
            .records(scope)?
            .into_iter()
            .map(|record| record.message)
            .collect())
    }

    fn append(&mut self, scope: &ScopeKey, message: &Message) -> Result<(), StorageError> {
        self.insert(scope, message, None).map(|_| ())
    }

    fn clear(&mut self, scope: &ScopeKey) -> Result<(), StorageError> {
        let removed = self
            .conn
            .execute("DELETE FROM messages WHERE scope = ?1", params![scope.as_str()])?;
        debug!(scope = %scope, removed, "history rows removed");
        Ok(())
    }
}
