//! Offset pagination for list endpoints.
//!
//! Cursors are opaque to clients: the hex encoding of the offset of the next
//! item.

use serde::{Deserialize, Serialize};

/// Page size when `count` is not given.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

pub const MAX_PAGE_SIZE: u32 = 1000;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaginationParams {
    pub cursor: Option<String>,
    pub count: Option<u32>,
}

impl PaginationParams {
    /// Page size clamped to `1..=MAX_PAGE_SIZE`.
    pub fn effective_count(&self) -> u32 {
        self.count.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }

    /// Offset named by the cursor; 0 when absent or malformed.
    pub fn offset(&self) -> usize {
        self.cursor.as_deref().and_then(decode_cursor).unwrap_or(0)
    }
}

/// One page of a list response.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Pass back to fetch the next page; absent on the last one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

pub fn encode_cursor(offset: usize) -> String {
    hex::encode(offset.to_string())
}

pub fn decode_cursor(cursor: &str) -> Option<usize> {
    let bytes = hex::decode(cursor).ok()?;
    std::str::from_utf8(&bytes).ok()?.parse().ok()
}

/// Cut one page out of `items`.
pub fn paginate<T>(items: Vec<T>, params: &PaginationParams) -> Page<T> {
    let offset = params.offset();
    let count = params.effective_count() as usize;
    let total = items.len();
    let items: Vec<T> = items.into_iter().skip(offset).take(count).collect();
    let end = offset + items.len();
    let cursor = (end < total).then(|| encode_cursor(end));
    Page { items, cursor }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(cursor: Option<String>, count: Option<u32>) -> PaginationParams {
        PaginationParams { cursor, count }
    }

    #[test]
    fn cursor_roundtrip() {
        for offset in [0usize, 1, 42, 100, 123_456_789] {
            assert_eq!(decode_cursor(&encode_cursor(offset)), Some(offset));
        }
    }

    #[test]
    fn malformed_cursor_starts_at_zero() {
        assert_eq!(params(Some("zz".into()), None).offset(), 0);
    }

    #[test]
    fn effective_count_clamps() {
        assert_eq!(params(None, None).effective_count(), DEFAULT_PAGE_SIZE);
        assert_eq!(params(None, Some(5000)).effective_count(), MAX_PAGE_SIZE);
        assert_eq!(params(None, Some(0)).effective_count(), 1);
    }

    #[test]
    fn pages_walk_the_whole_list() {
        let items: Vec<u32> = (0..5).collect();
        let first = paginate(items.clone(), &params(None, Some(2)));
        assert_eq!(first.items, vec![0, 1]);
        let second = paginate(items.clone(), &params(first.cursor, Some(2)));
        assert_eq!(second.items, vec![2, 3]);
        let last = paginate(items, &params(second.cursor, Some(2)));
        assert_eq!(last.items, vec![4]);
        assert!(last.cursor.is_none());
    }
}
