//! Storage Layer - SQLite-backed persistence
//!
//! System of record is a single SQLite file with one table:
//! - todos(id, text, done)
//!
//! `TodoStore` owns the connection; `SharedStore` hands it to concurrent
//! request handlers.

pub mod page;
pub mod schema;
pub mod shared;
pub mod sqlite;

pub use page::Page;
pub use shared::SharedStore;
pub use sqlite::TodoStore;
