//! # Todolist - a small CRUD service over SQLite
//!
//! Todolist exposes a single "todo item" resource over JSON/HTTP:
//! - SQLite-backed persistence gateway (`storage`)
//! - axum request handlers and a liveness probe (`server`)
//! - static serving for the companion web page
//! - TOML + CLI configuration (`config`)

pub mod item;
pub mod storage;
pub mod server;
pub mod config;

// Re-exports for convenient access
pub use item::{ItemPatch, TodoItem};
pub use storage::{Page, SharedStore, TodoStore};

/// Result type alias for Todolist operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Todolist operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Write failed: {0}")]
    Write(String),

    #[error("Item not found: {0}")]
    NotFound(i64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Storage task failed: {0}")]
    Task(String),
}
