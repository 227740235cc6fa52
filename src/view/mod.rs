//! Pure derivations from `(posts, ViewState)` to what the list renders.
//!
//! Nothing in here touches signals or the network, so every rule about filtering,
//! ordering and paging lives in one place and is tested natively.

use crate::api::DEFAULT_PAGE_SIZE;
use crate::models::Post;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::ops::RangeInclusive;

/// Number of numbered page buttons shown at once.
pub(crate) const PAGE_WINDOW: usize = 5;

#[derive(
    Serialize,
    Deserialize,
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[strum(serialize_all = "kebab-case")]
pub(crate) enum SortKey {
    #[default]
    ById,
    ByTitle,
}

impl SortKey {
    pub fn label(self) -> &'static str {
        match self {
            SortKey::ById => "Sort by ID",
            SortKey::ByTitle => "Sort by title",
        }
    }

    pub fn all() -> [SortKey; 2] {
        [SortKey::ById, SortKey::ByTitle]
    }
}

/// UI state the list view is derived from. Never persisted.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct ViewState {
    pub search: String,
    pub sort: SortKey,
    /// 1-based.
    pub page: usize,
    pub page_size: usize,
    /// Match the search text against the body as well as the title.
    pub search_body: bool,
    /// Post whose comments are shown.
    pub selected: Option<u64>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }
}

impl ViewState {
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            search: String::new(),
            sort: SortKey::default(),
            page: 1,
            page_size: page_size.max(1),
            search_body: true,
            selected: None,
        }
    }
}

/// One rendered page of the list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct PageView {
    pub items: Vec<Post>,
    /// Clamped current page (1-based).
    pub page: usize,
    pub page_count: usize,
    /// Total posts after filtering.
    pub total: usize,
    /// Numbered buttons to show.
    pub window: RangeInclusive<usize>,
}

impl PageView {
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.page_count
    }
}

pub(crate) fn matches(post: &Post, needle_lower: &str, search_body: bool) -> bool {
    if needle_lower.is_empty() {
        return true;
    }
    post.title.to_lowercase().contains(needle_lower)
        || (search_body && post.body.to_lowercase().contains(needle_lower))
}

pub(crate) fn filter_posts(posts: &[Post], search: &str, search_body: bool) -> Vec<Post> {
    let needle = search.trim().to_lowercase();
    posts
        .iter()
        .filter(|p| matches(p, &needle, search_body))
        .cloned()
        .collect()
}

#[cfg(target_arch = "wasm32")]
fn locale_compare(a: &str, b: &str) -> Ordering {
    js_sys::JsString::from(a)
        .locale_compare(b, &js_sys::Array::new(), &js_sys::Object::new())
        .cmp(&0)
}

#[cfg(not(target_arch = "wasm32"))]
fn locale_compare(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

pub(crate) fn compare(a: &Post, b: &Post, key: SortKey) -> Ordering {
    match key {
        SortKey::ById => a.id.cmp(&b.id),
        SortKey::ByTitle => locale_compare(&a.title, &b.title).then_with(|| a.id.cmp(&b.id)),
    }
}

pub(crate) fn sort_posts(posts: &mut [Post], key: SortKey) {
    posts.sort_by(|a, b| compare(a, b, key));
}

pub(crate) fn page_count(total: usize, page_size: usize) -> usize {
    total.div_ceil(page_size.max(1))
}

/// Clamps a 1-based page into `1..=max(page_count, 1)`.
pub(crate) fn clamp_page(page: usize, page_count: usize) -> usize {
    page.clamp(1, page_count.max(1))
}

/// Numbered page buttons around `page`, never wider than `width` or `page_count`.
pub(crate) fn page_window(page: usize, page_count: usize, width: usize) -> RangeInclusive<usize> {
    let count = page_count.max(1);
    let width = width.clamp(1, count);
    let page = clamp_page(page, count);

    let mut start = page.saturating_sub(width / 2).max(1);
    if start + width - 1 > count {
        start = count + 1 - width;
    }
    start..=start + width - 1
}

pub(crate) fn paginate(sorted: &[Post], page: usize, page_size: usize) -> &[Post] {
    let page_size = page_size.max(1);
    let start = (page.max(1) - 1).saturating_mul(page_size);
    if start >= sorted.len() {
        return &[];
    }
    let end = (start + page_size).min(sorted.len());
    &sorted[start..end]
}

/// Filter, then sort, then cut out the current page.
pub(crate) fn derive_page(posts: &[Post], state: &ViewState) -> PageView {
    let mut visible = filter_posts(posts, &state.search, state.search_body);
    sort_posts(&mut visible, state.sort);

    let total = visible.len();
    let page_count = page_count(total, state.page_size);
    let page = clamp_page(state.page, page_count);

    PageView {
        items: paginate(&visible, page, state.page_size).to_vec(),
        page,
        page_count,
        total,
        window: page_window(page, page_count, PAGE_WINDOW),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn posts(items: &[(u64, &str, &str)]) -> Vec<Post> {
        items.iter().map(|(id, t, b)| Post::new(*id, t, b)).collect()
    }

    fn ids(items: &[Post]) -> Vec<u64> {
        items.iter().map(|p| p.id).collect()
    }

    #[test]
    fn test_filter_case_insensitive_title() {
        let c = posts(&[(1, "A", ""), (2, "B", "")]);
        assert_eq!(ids(&filter_posts(&c, "a", false)), vec![1]);
    }

    #[test]
    fn test_filter_body_only_when_enabled() {
        let c = posts(&[(1, "x", "Needle here"), (2, "needle", ""), (3, "y", "")]);
        assert_eq!(ids(&filter_posts(&c, "NEEDLE", false)), vec![2]);
        assert_eq!(ids(&filter_posts(&c, "NEEDLE", true)), vec![1, 2]);
    }

    #[test]
    fn test_filter_empty_and_whitespace_match_all() {
        let c = posts(&[(1, "a", ""), (2, "b", "")]);
        assert_eq!(filter_posts(&c, "", true), c);
        assert_eq!(filter_posts(&c, "   ", true), c);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let c = posts(&[(1, "alpha", ""), (2, "beta", "alp"), (3, "gamma", "")]);
        let once = filter_posts(&c, "alp", true);
        let twice = filter_posts(&once, "alp", true);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_sort_by_id_numeric() {
        let mut c = posts(&[(10, "", ""), (2, "", ""), (33, "", "")]);
        sort_posts(&mut c, SortKey::ById);
        assert_eq!(ids(&c), vec![2, 10, 33]);
    }

    #[test]
    fn test_sort_by_title_case_folded_with_id_tiebreak() {
        let mut c = posts(&[
            (5, "banana", ""),
            (3, "banana", ""),
            (1, "cherry", ""),
            (4, "Apple", ""),
        ]);
        sort_posts(&mut c, SortKey::ByTitle);
        assert_eq!(ids(&c), vec![4, 3, 5, 1]);

        let again = {
            let mut d = c.clone();
            sort_posts(&mut d, SortKey::ByTitle);
            d
        };
        assert_eq!(c, again);
    }

    #[test]
    fn test_page_count_is_ceiling() {
        assert_eq!(page_count(0, 6), 0);
        assert_eq!(page_count(6, 6), 1);
        assert_eq!(page_count(7, 6), 2);
        assert_eq!(page_count(100, 5), 20);
    }

    #[test]
    fn test_pages_concatenate_to_whole_sequence() {
        let c: Vec<Post> = (1..=13).map(|i| Post::new(i, "t", "b")).collect();
        let n = page_count(c.len(), 5);
        let joined: Vec<Post> = (1..=n).flat_map(|p| paginate(&c, p, 5).to_vec()).collect();
        assert_eq!(joined, c);
        assert!(paginate(&c, n + 1, 5).is_empty());
    }

    #[test]
    fn test_clamp_page() {
        assert_eq!(clamp_page(0, 3), 1);
        assert_eq!(clamp_page(9, 3), 3);
        assert_eq!(clamp_page(5, 0), 1);
    }

    #[test]
    fn test_page_window_never_exceeds_page_count() {
        assert_eq!(page_window(1, 2, 5), 1..=2);
        assert_eq!(page_window(1, 0, 5), 1..=1);
        assert_eq!(page_window(1, 20, 5), 1..=5);
        assert_eq!(page_window(10, 20, 5), 8..=12);
        assert_eq!(page_window(20, 20, 5), 16..=20);
        assert_eq!(page_window(99, 20, 5), 16..=20);
    }

    #[test]
    fn test_derive_page_clamps_out_of_range_page() {
        let c: Vec<Post> = (1..=7).map(|i| Post::new(i, &format!("t{i}"), "")).collect();
        let state = ViewState {
            page: 4,
            ..ViewState::with_page_size(5)
        };
        let view = derive_page(&c, &state);
        assert_eq!(view.page, 2);
        assert_eq!(view.page_count, 2);
        assert_eq!(ids(&view.items), vec![6, 7]);
        assert!(view.has_prev());
        assert!(!view.has_next());
    }

    #[test]
    fn test_derive_page_empty_collection() {
        let view = derive_page(&[], &ViewState::default());
        assert_eq!(view.page, 1);
        assert_eq!(view.page_count, 0);
        assert_eq!(view.total, 0);
        assert!(view.items.is_empty());
        assert!(!view.has_next());
    }

    #[test]
    fn test_sort_key_round_trips_through_strum() {
        for key in SortKey::all() {
            assert_eq!(SortKey::from_str(key.as_ref()), Ok(key));
        }
        assert_eq!(SortKey::ByTitle.to_string(), "by-title");
    }
}
