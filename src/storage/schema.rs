//! Database schema definitions

use std::time::Duration;

/// How long a statement waits on a locked database before failing
pub const BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

/// Connection pragmas, applied in order. Failures are logged, not fatal.
pub const CONNECTION_PRAGMAS: &[(&str, &str)] = &[
    ("journal_mode", "WAL"),
    ("synchronous", "NORMAL"),
    ("foreign_keys", "ON"),
];

/// SQL to create the todos table
pub const CREATE_TODOS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS todos (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    text TEXT NOT NULL,
    done INTEGER NOT NULL DEFAULT 0
)
"#;

/// All schema creation statements
pub fn all_schema_statements() -> Vec<&'static str> {
    vec![CREATE_TODOS_TABLE]
}
