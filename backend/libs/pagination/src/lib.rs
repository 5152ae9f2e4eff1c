//! Offset pagination over fully materialized, pre-ordered sequences.
//!
//! The caller is responsible for filtering and ordering; this crate only
//! slices. Token handling is deliberately forgiving: an absent or
//! unparseable token falls back to page 1, and a token past the end clamps
//! to the last page instead of failing.

use serde::Serialize;

/// Items served per page unless the caller overrides it.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// One served page of an ordered sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    /// Items belonging to this page, in sequence order.
    pub items: Vec<T>,
    /// 1-based page number actually served (after any fallback).
    pub number: usize,
    /// Total page count; an empty sequence still has one (empty) page.
    pub total_pages: usize,
    pub has_previous: bool,
    pub has_next: bool,
}

/// Lenient token parse: absent, non-numeric, or zero tokens all mean page 1.
///
/// This is the pre-clamp page number; [`paginate`] still clamps the result
/// to the real page count.
pub fn requested_page(token: Option<&str>) -> usize {
    token
        .and_then(|raw| raw.trim().parse::<usize>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(1)
}

/// Slice `items` into the page addressed by `token`.
///
/// `per_page` must be at least 1. Pure: identical inputs yield identical
/// pages and `items` is never mutated.
pub fn paginate<T: Clone>(items: &[T], token: Option<&str>, per_page: usize) -> Page<T> {
    debug_assert!(per_page > 0, "per_page must be at least 1");

    let total_pages = if items.is_empty() {
        1
    } else {
        items.len().div_ceil(per_page)
    };
    let number = requested_page(token).min(total_pages);

    let start = (number - 1) * per_page;
    let end = (start + per_page).min(items.len());
    let page_items = if start < items.len() {
        items[start..end].to_vec()
    } else {
        Vec::new()
    };

    Page {
        items: page_items,
        number,
        total_pages,
        has_previous: number > 1,
        has_next: number < total_pages,
    }
}
