pub(crate) mod actions;

use crate::api::{ApiClient, ApiResult, EnvConfig};
use crate::confirm::ConfirmGate;
use crate::editor::PostEditor;
use crate::models::{Comment, Post};
use crate::theme::Theme;
use crate::view::{derive_page, PageView, SortKey, ViewState};
use leptos::prelude::*;
use std::cell::RefCell;
use std::collections::BTreeSet;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum Phase {
    #[default]
    Loading,
    Ready,
}

/// Comments for the one selected post.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct CommentsState {
    pub post_id: u64,
    pub loading: bool,
    pub comments: Vec<Comment>,
}

/// The list view-model. Sole owner of the post collection.
#[derive(Clone, Debug, Default)]
pub(crate) struct PostList {
    pub phase: Phase,
    pub posts: Vec<Post>,
    pub view: ViewState,
    pub comments: Option<CommentsState>,
    pub last_error: Option<String>,

    /// Posts with an update or delete request outstanding.
    in_flight: BTreeSet<u64>,
}

impl PostList {
    pub fn new(view: ViewState) -> Self {
        Self {
            view,
            ..Default::default()
        }
    }

    pub fn is_ready(&self) -> bool {
        self.phase == Phase::Ready
    }

    pub fn page_view(&self) -> PageView {
        derive_page(&self.posts, &self.view)
    }

    // ---------------------------------------------------------------------
    // collection
    // ---------------------------------------------------------------------

    pub fn begin_refresh(&mut self) {
        self.phase = Phase::Loading;
    }

    /// A failed fetch still lands in `Ready`, with an empty list and the error kept.
    pub fn finish_refresh(&mut self, result: ApiResult<Vec<Post>>) {
        match result {
            Ok(posts) => {
                self.posts = posts;
                self.last_error = None;
            }
            Err(e) => {
                self.posts.clear();
                self.last_error = Some(format!("Could not load posts: {e}"));
            }
        }
        self.phase = Phase::Ready;
        self.reclamp_page();
    }

    pub fn add(&mut self, post: Post) {
        self.posts.insert(0, post);
    }

    /// Returns `false` when no post has that id.
    pub fn replace(&mut self, post: Post) -> bool {
        match self.posts.iter_mut().find(|p| p.id == post.id) {
            Some(slot) => {
                *slot = post;
                self.reclamp_page();
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: u64) -> Option<Post> {
        let idx = self.posts.iter().position(|p| p.id == id)?;
        let removed = self.posts.remove(idx);

        if self.view.selected == Some(id) {
            self.clear_selection();
        }
        self.reclamp_page();
        Some(removed)
    }

    pub fn get(&self, id: u64) -> Option<&Post> {
        self.posts.iter().find(|p| p.id == id)
    }

    // ---------------------------------------------------------------------
    // in-flight markers
    // ---------------------------------------------------------------------

    /// Marks `id` busy. `false` if a request for it is already outstanding.
    pub fn try_begin(&mut self, id: u64) -> bool {
        self.in_flight.insert(id)
    }

    pub fn end(&mut self, id: u64) {
        self.in_flight.remove(&id);
    }

    pub fn is_busy(&self, id: u64) -> bool {
        self.in_flight.contains(&id)
    }

    // ---------------------------------------------------------------------
    // view state
    // ---------------------------------------------------------------------

    pub fn set_search(&mut self, search: String) {
        if self.view.search != search {
            self.view.search = search;
            self.view.page = 1;
        }
    }

    pub fn set_search_body(&mut self, on: bool) {
        if self.view.search_body != on {
            self.view.search_body = on;
            self.view.page = 1;
        }
    }

    pub fn set_sort(&mut self, sort: SortKey) {
        if self.view.sort != sort {
            self.view.sort = sort;
            self.view.page = 1;
        }
    }

    pub fn set_page(&mut self, page: usize) {
        self.view.page = page;
        self.reclamp_page();
    }

    fn reclamp_page(&mut self) {
        self.view.page = self.page_view().page;
    }

    // ---------------------------------------------------------------------
    // comments
    // ---------------------------------------------------------------------

    /// Selects `post_id` and drops whatever comments were held before.
    pub fn begin_comments(&mut self, post_id: u64) {
        self.view.selected = Some(post_id);
        self.comments = Some(CommentsState {
            post_id,
            loading: true,
            comments: Vec::new(),
        });
    }

    /// Returns `false` if the selection moved on while the request was out.
    pub fn finish_comments(&mut self, post_id: u64, result: ApiResult<Vec<Comment>>) -> bool {
        let Some(state) = self.comments.as_mut().filter(|c| c.post_id == post_id) else {
            return false;
        };

        state.loading = false;
        match result {
            Ok(comments) => state.comments = comments,
            Err(e) => {
                state.comments.clear();
                self.last_error = Some(format!("Could not load comments: {e}"));
            }
        }
        true
    }

    pub fn clear_selection(&mut self) {
        self.view.selected = None;
        self.comments = None;
    }

    pub fn dismiss_error(&mut self) {
        self.last_error = None;
    }
}

/// Anything that can hand out `&mut PostList` for the span of a closure.
///
/// Lets the async actions run against the app's signal and against plain cells in tests.
pub(crate) trait ListStore {
    fn with_list<R>(&self, f: impl FnOnce(&mut PostList) -> R) -> Option<R>;
}

impl ListStore for RwSignal<PostList> {
    fn with_list<R>(&self, f: impl FnOnce(&mut PostList) -> R) -> Option<R> {
        self.try_update(f)
    }
}

impl ListStore for RefCell<PostList> {
    fn with_list<R>(&self, f: impl FnOnce(&mut PostList) -> R) -> Option<R> {
        Some(f(&mut self.borrow_mut()))
    }
}

#[derive(Clone, Copy)]
pub(crate) struct AppState {
    pub api_client: StoredValue<ApiClient>,
    pub list: RwSignal<PostList>,
    pub editor: RwSignal<PostEditor>,
    pub editor_open: RwSignal<bool>,
    pub gate: RwSignal<ConfirmGate>,
    pub theme: RwSignal<Theme>,
}

impl AppState {
    pub fn new() -> Self {
        let config = EnvConfig::new();
        log::info!(
            "api {} (page size {}, comments via {})",
            config.api_url,
            config.page_size,
            config.comments_route
        );

        Self {
            api_client: StoredValue::new(ApiClient::from_config(&config)),
            list: RwSignal::new(PostList::new(ViewState::with_page_size(config.page_size))),
            editor: RwSignal::new(PostEditor::default()),
            editor_open: RwSignal::new(false),
            gate: RwSignal::new(ConfirmGate::default()),
            theme: RwSignal::new(Theme::default()),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone)]
pub(crate) struct AppContext(pub AppState);
