//! Page bounds and search-fragment guards shared by every listing query.

use serde::{Deserialize, Serialize};

/// Maximum number of records returned by any listing, search, or sort.
pub const PAGE_SIZE: i64 = 50;
pub const MAX_SEARCH_LENGTH: usize = 255;

pub fn clamp_int(value: i64, minimum: i64, maximum: i64) -> i64 {
    value.max(minimum).min(maximum)
}

pub fn clamp_limit(value: i64, maximum: i64) -> i64 {
    clamp_int(value, 1, maximum)
}

/// Offset and limit of one page of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub offset: i64,
    pub limit: i64,
}

impl PageRequest {
    pub fn first() -> Self {
        Self::at(0)
    }

    pub fn at(offset: i64) -> Self {
        Self {
            offset,
            limit: PAGE_SIZE,
        }
    }

    /// 1-based page number to request.
    pub fn page(page: i64) -> Self {
        Self::at(offset_for_page(page))
    }

    /// Negative offsets become 0 and the limit is held within `1..=PAGE_SIZE`.
    pub fn normalized(self) -> Self {
        Self {
            offset: self.offset.max(0),
            limit: clamp_limit(self.limit, PAGE_SIZE),
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first()
    }
}

/// Offset of a 1-based page; pages below 1 are page 1.
pub fn offset_for_page(page: i64) -> i64 {
    (page.max(1) - 1).saturating_mul(PAGE_SIZE)
}

/// Number of pages needed for `total` rows. An empty catalog still has one
/// (empty) page.
pub fn page_count(total: i64) -> i64 {
    if total <= 0 {
        1
    } else {
        (total + PAGE_SIZE - 1) / PAGE_SIZE
    }
}

/// Cap `fragment` at [`MAX_SEARCH_LENGTH`] bytes on a char boundary.
/// Whitespace is part of the fragment and is kept.
pub fn truncate_search(fragment: &str) -> &str {
    if fragment.len() <= MAX_SEARCH_LENGTH {
        return fragment;
    }
    let mut end = MAX_SEARCH_LENGTH;
    while !fragment.is_char_boundary(end) {
        end -= 1;
    }
    &fragment[..end]
}

/// Build a `LIKE` pattern matching `fragment` anywhere in the value. The
/// pattern must be used with `ESCAPE '\'`.
pub fn like_pattern(fragment: &str) -> String {
    let mut escaped = String::with_capacity(fragment.len() + 2);
    escaped.push('%');
    for ch in fragment.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}
