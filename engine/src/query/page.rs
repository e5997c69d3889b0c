//! Offset pagination and the page result type.

use serde::Serialize;
use std::ops::Range;

/// Default 1-based page number.
pub const DEFAULT_PAGE: usize = 1;

/// Default page size.
pub const DEFAULT_PER_PAGE: usize = 10;

/// Page window over a filtered result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// 1-based page number
    pub page: usize,
    /// Page size, always at least 1
    pub per_page: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl Pagination {
    /// Create a window. Out-of-range values fall back to the defaults.
    pub fn new(page: usize, per_page: usize) -> Self {
        Self {
            page: if page >= 1 { page } else { DEFAULT_PAGE },
            per_page: if per_page >= 1 {
                per_page
            } else {
                DEFAULT_PER_PAGE
            },
        }
    }

    /// Build from raw control values (`_page`, `_per_page`, `_limit`).
    ///
    /// Unparseable or non-positive values are ignored and the default kept.
    /// `_limit` is only consulted when `_per_page` is absent.
    pub fn from_controls(page: Option<&str>, per_page: Option<&str>, limit: Option<&str>) -> Self {
        let mut pagination = Self::default();

        if let Some(p) = page.and_then(positive) {
            pagination.page = p;
        }

        let size = match per_page {
            Some(raw) => positive(raw),
            None => limit.and_then(positive),
        };
        if let Some(size) = size {
            pagination.per_page = size;
        }

        pagination
    }

    /// Zero-based index of the first record on this page.
    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.per_page)
    }

    /// Clamped `start..end` window for a result set of `total` records.
    /// A start past the end yields an empty range.
    pub fn window(&self, total: usize) -> Range<usize> {
        let start = self.offset();
        if start >= total {
            return total..total;
        }
        let end = start.saturating_add(self.per_page).min(total);
        start..end
    }
}

fn positive(raw: &str) -> Option<usize> {
    raw.trim().parse::<i64>().ok().filter(|n| *n >= 1).map(|n| n as usize)
}

/// One page of a list read.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    /// Records on this page.
    pub items: Vec<T>,
    /// Number of records after filtering, before slicing.
    pub total: usize,
    /// 1-based page number this page was read with.
    pub page: usize,
    /// Page size this page was read with.
    pub per_page: usize,
}

impl<T> Page<T> {
    /// An empty first page, used for collections that do not exist.
    pub fn empty(pagination: Pagination) -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            page: pagination.page,
            per_page: pagination.per_page,
        }
    }

    /// Number of pages needed to hold `total` records.
    pub fn pages(&self) -> usize {
        self.total.div_ceil(self.per_page.max(1))
    }

    pub fn next_page(&self) -> Option<usize> {
        (self.page < self.pages()).then_some(self.page + 1)
    }

    pub fn prev_page(&self) -> Option<usize> {
        (self.page > 1).then(|| (self.page - 1).min(self.pages().max(1)))
    }

    /// Transform the items while keeping the metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
        }
    }
}
