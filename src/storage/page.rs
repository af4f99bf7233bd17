//! Pagination bounds for list queries

/// Page size used when the caller asks for zero or fewer rows
pub const DEFAULT_LIMIT: i64 = 50;
/// Largest page a single list call will return
pub const MAX_LIMIT: i64 = 500;

/// A normalized `LIMIT`/`OFFSET` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Page {
    /// Clamp raw values: `limit <= 0` becomes 50, `limit > 500` becomes 500,
    /// and a negative offset becomes 0.
    pub fn new(limit: i64, offset: i64) -> Self {
        let limit = if limit <= 0 { DEFAULT_LIMIT } else { limit.min(MAX_LIMIT) };
        Self { limit, offset: offset.max(0) }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(DEFAULT_LIMIT, 0)
    }
}
