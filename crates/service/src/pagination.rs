//! Pagination utilities for service layer
//!
//! Limit/offset paging with a bounded page size. Out-of-range values fall
//! back to defaults instead of failing the request.

pub const DEFAULT_LIMIT: u64 = 50;
pub const MAX_LIMIT: u64 = 1000;

/// Raw paging parameters as received from callers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pagination {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Normalized page window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Page {
    pub limit: u64,
    pub offset: u64,
}

impl Pagination {
    pub fn new(limit: Option<i64>, offset: Option<i64>) -> Self { Self { limit, offset } }

    /// Limit in `1..=MAX_LIMIT` (default otherwise), offset `>= 0` (zero otherwise).
    pub fn normalize(self) -> Page {
        let limit = match self.limit {
            Some(l) if l >= 1 && (l as u64) <= MAX_LIMIT => l as u64,
            _ => DEFAULT_LIMIT,
        };
        let offset = match self.offset {
            Some(o) if o >= 0 => o as u64,
            _ => 0,
        };
        Page { limit, offset }
    }
}

impl Default for Page {
    fn default() -> Self { Pagination::default().normalize() }
}
