//! List query primitives shared by every dashboard: pagination and filters.
//!
//! Pages are 1-based. Given `N` matching records and a page size `P`, a listing
//! has `ceil(N / P)` pages and page `K` holds records `[(K-1)*P, K*P)`.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Default page size used by the admin tables.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Upper bound on page size accepted from callers.
pub const MAX_PAGE_SIZE: usize = 100;

/// Pagination parameters for list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// 1-based page number.
    pub page: usize,
    pub page_size: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Build a validated request. Page 0 is treated as page 1.
    pub fn new(page: usize, page_size: usize) -> DomainResult<Self> {
        if page_size == 0 {
            return Err(DomainError::validation("page_size must be positive"));
        }
        if page_size > MAX_PAGE_SIZE {
            return Err(DomainError::validation(format!(
                "page_size must not exceed {MAX_PAGE_SIZE}"
            )));
        }
        Ok(Self {
            page: page.max(1),
            page_size,
        })
    }

    /// Index of the first record on this page.
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }

    pub fn next(&self) -> Self {
        Self {
            page: self.page + 1,
            ..*self
        }
    }

    /// Slice one page out of an already-filtered record list.
    pub fn paginate<T>(&self, items: Vec<T>) -> Page<T> {
        let total_items = items.len();
        let items = items
            .into_iter()
            .skip(self.offset())
            .take(self.page_size)
            .collect();
        Page {
            items,
            page: self.page,
            page_size: self.page_size,
            total_items,
            total_pages: page_count(total_items, self.page_size),
        }
    }
}

/// Number of pages needed for `total` records at `page_size` per page.
pub fn page_count(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size)
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1 && self.total_pages > 0
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            page_size: self.page_size,
            total_items: self.total_items,
            total_pages: self.total_pages,
        }
    }
}

/// A record predicate used by list views.
///
/// Filters built from several optional criteria must match only records that
/// satisfy every criterion that is set (intersection semantics).
pub trait Filter<T> {
    fn matches(&self, item: &T) -> bool;

    /// Keep only matching records, preserving order.
    fn select<'a>(&self, items: impl IntoIterator<Item = &'a T>) -> Vec<T>
    where
        T: Clone + 'a,
    {
        items
            .into_iter()
            .filter(|item| self.matches(item))
            .cloned()
            .collect()
    }
}

/// Case-insensitive substring search across several fields.
///
/// A blank term matches everything.
pub fn matches_search(term: Option<&str>, fields: &[&str]) -> bool {
    let Some(term) = term.map(str::trim).filter(|t| !t.is_empty()) else {
        return true;
    };
    let needle = term.to_lowercase();
    fields
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
}
