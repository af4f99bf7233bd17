//! SQLite storage implementation

use std::path::Path;
use rusqlite::{Connection, params, OptionalExtension};
use crate::{Result, Error};
use crate::item::{ItemPatch, TodoItem};
use super::page::Page;
use super::schema;

/// SQLite-backed storage for todo items.
///
/// The only component that touches the database; everything else goes
/// through these operations.
pub struct TodoStore {
    conn: Connection,
}

impl TodoStore {
    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::configure(&conn)?;
        let store = Self { conn };
        store.initialize()?;
        tracing::debug!("Opened todo store at {}", path.display());
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::configure(&conn)?;
        let store = Self { conn };
        store.initialize()?;
        Ok(store)
    }

    /// Bounded wait on lock contention plus the WAL/synchronous/foreign-key
    /// pragmas. A rejected pragma only costs performance, so it is logged.
    fn configure(conn: &Connection) -> Result<()> {
        conn.busy_timeout(schema::BUSY_TIMEOUT)?;
        for (name, value) in schema::CONNECTION_PRAGMAS {
            if let Err(e) = conn.execute_batch(&format!("PRAGMA {name}={value};")) {
                tracing::warn!("PRAGMA {}={} failed: {}", name, value, e);
            }
        }
        Ok(())
    }

    /// Create the todos table if missing. Safe to call repeatedly.
    pub fn initialize(&self) -> Result<()> {
        for stmt in schema::all_schema_statements() {
            self.conn.execute(stmt, [])?;
        }
        tracing::debug!("Schema initialized");
        Ok(())
    }

    // ========== Item Operations ==========

    /// List one page of items in ascending id order
    pub fn list(&self, page: Page) -> Result<Vec<TodoItem>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, text, done FROM todos ORDER BY id ASC LIMIT ?1 OFFSET ?2"
        )?;

        let items = stmt
            .query_map(params![page.limit, page.offset], TodoItem::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(items)
    }

    /// List every item in ascending id order
    pub fn list_all(&self) -> Result<Vec<TodoItem>> {
        let mut stmt = self.conn.prepare("SELECT id, text, done FROM todos ORDER BY id ASC")?;

        let items = stmt
            .query_map([], TodoItem::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(items)
    }

    /// Get an item by id
    pub fn get(&self, id: i64) -> Result<Option<TodoItem>> {
        self.conn
            .query_row(
                "SELECT id, text, done FROM todos WHERE id = ?1",
                [id],
                TodoItem::from_row,
            )
            .optional()
            .map_err(Into::into)
    }

    /// Insert a new, not-done item and return it with its assigned id
    pub fn create(&self, text: &str) -> Result<TodoItem> {
        self.conn
            .execute("INSERT INTO todos (text, done) VALUES (?1, 0)", [text])
            .map_err(|e| Error::Write(e.to_string()))?;

        let id = self.conn.last_insert_rowid();
        // An insert that can't be read back means the store is inconsistent
        self.get(id)?.ok_or(Error::NotFound(id))
    }

    /// Apply a partial update and return the item as it now stands.
    ///
    /// An empty patch changes nothing but still returns the current row.
    pub fn update(&self, id: i64, patch: &ItemPatch) -> Result<TodoItem> {
        let affected = match (&patch.text, patch.done) {
            (Some(text), Some(done)) => self.conn.execute(
                "UPDATE todos SET text = ?1, done = ?2 WHERE id = ?3",
                params![text, done, id],
            ),
            (Some(text), None) => self.conn.execute(
                "UPDATE todos SET text = ?1 WHERE id = ?2",
                params![text, id],
            ),
            (None, Some(done)) => self.conn.execute(
                "UPDATE todos SET done = ?1 WHERE id = ?2",
                params![done, id],
            ),
            (None, None) => Ok(0),
        }
        .map_err(|e| Error::Write(e.to_string()))?;

        tracing::debug!("Update of item {} touched {} row(s)", id, affected);
        self.get(id)?.ok_or(Error::NotFound(id))
    }

    /// Remove an item. Returns the number of rows deleted (0 or 1); a
    /// missing id is not an error.
    pub fn delete(&self, id: i64) -> Result<usize> {
        let affected = self.conn.execute("DELETE FROM todos WHERE id = ?1", [id])?;
        Ok(affected)
    }

    /// Count all items
    pub fn count(&self) -> Result<usize> {
        let count: i64 = self.conn.query_row("SELECT COUNT(*) FROM todos", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Close the underlying connection
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, e)| e.into())
    }
}
