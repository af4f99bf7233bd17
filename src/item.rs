//! Item types - the todo resource and its partial update
//!
//! The public JSON shape is fixed to `{id, text, done}`. Any other column a
//! query might return is not part of the contract and is never emitted.

use rusqlite::types::ValueRef;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Leading characters that make a TEXT `done` cell read as true.
pub const TRUTHY_PREFIXES: &[u8] = b"1tTyY";

/// A todo item as stored and served.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    /// Assigned by the store, never reused
    pub id: i64,
    pub text: String,
    pub done: bool,
}

impl TodoItem {
    /// Convert a `SELECT id, text, done` row
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        let text: Option<String> = row.get(1)?;
        Ok(Self {
            id: row.get(0)?,
            text: text.unwrap_or_default(),
            done: decode_done(row.get_ref(2)?),
        })
    }
}

/// Resolve a stored `done` cell to a boolean.
///
/// INTEGER and REAL are true when non-zero; TEXT is true when it starts with
/// one of [`TRUTHY_PREFIXES`]. NULL and BLOB are false.
pub fn decode_done(value: ValueRef<'_>) -> bool {
    match value {
        ValueRef::Integer(n) => n != 0,
        ValueRef::Real(f) => f != 0.0,
        ValueRef::Text(s) => s.first().is_some_and(|c| TRUTHY_PREFIXES.contains(c)),
        ValueRef::Null | ValueRef::Blob(_) => false,
    }
}

/// Fields a caller wants changed. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemPatch {
    pub text: Option<String>,
    pub done: Option<bool>,
}

impl ItemPatch {
    pub fn new(text: Option<String>, done: Option<bool>) -> Self {
        Self { text, done }
    }

    /// Pick `text` (if a string) and `done` (if a boolean) out of a request
    /// body. Fields of any other type, or a body that isn't an object, are
    /// treated as absent.
    pub fn from_json(body: &Value) -> Self {
        Self {
            text: body.get("text").and_then(Value::as_str).map(str::to_owned),
            done: body.get("done").and_then(Value::as_bool),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.done.is_none()
    }
}
