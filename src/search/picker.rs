//! Selectable search results driven by keyboard intents.
//!
//! A small state machine over [`TagSearchService`], reusable across
//! open/close cycles. Interior locking lets a shared handle be driven from
//! UI callbacks; completions are generation-stamped so a superseded search
//! can never overwrite newer state.

use std::fmt;
use std::sync::Mutex;

use crate::client::PointCatalog;
use crate::core::Tag;

use super::service::TagSearchService;

pub type SelectCallback = Box<dyn FnMut(Tag) + Send>;
pub type CancelCallback = Box<dyn FnMut() + Send>;

/// Callbacks and optional initial query supplied on open.
#[derive(Default)]
pub struct OpenContext {
    pub initial_query: Option<String>,
    pub on_select: Option<SelectCallback>,
    pub on_cancel: Option<CancelCallback>,
}

impl OpenContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_initial_query(mut self, query: impl Into<String>) -> Self {
        self.initial_query = Some(query.into());
        self
    }

    pub fn on_select(mut self, callback: impl FnMut(Tag) + Send + 'static) -> Self {
        self.on_select = Some(Box::new(callback));
        self
    }

    pub fn on_cancel(mut self, callback: impl FnMut() + Send + 'static) -> Self {
        self.on_cancel = Some(Box::new(callback));
        self
    }
}

impl fmt::Debug for OpenContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenContext")
            .field("initial_query", &self.initial_query)
            .field("on_select", &self.on_select.is_some())
            .field("on_cancel", &self.on_cancel.is_some())
            .finish()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PickerStatus {
    Idle,
    Loading,
    Success,
    Error,
}

struct PickerState {
    status: PickerStatus,
    open: bool,
    query: String,
    results: Vec<Tag>,
    has_more: bool,
    error: Option<String>,
    selected: usize,
    generation: u64,
    on_select: Option<SelectCallback>,
    on_cancel: Option<CancelCallback>,
}

impl PickerState {
    fn new() -> Self {
        Self {
            status: PickerStatus::Idle,
            open: false,
            query: String::new(),
            results: Vec::new(),
            has_more: false,
            error: None,
            selected: 0,
            generation: 0,
            on_select: None,
            on_cancel: None,
        }
    }

    fn reset_transient(&mut self) {
        self.status = PickerStatus::Idle;
        self.query.clear();
        self.results.clear();
        self.has_more = false;
        self.error = None;
        self.selected = 0;
    }
}

/// The picker: open it, type, navigate, select or cancel, close. No
/// terminal state - reusable indefinitely.
pub struct TagPicker<C> {
    service: TagSearchService<C>,
    state: Mutex<PickerState>,
}

impl<C: PointCatalog> TagPicker<C> {
    pub fn new(service: TagSearchService<C>) -> Self {
        Self {
            service,
            state: Mutex::new(PickerState::new()),
        }
    }

    pub fn service(&self) -> &TagSearchService<C> {
        &self.service
    }

    /// Reset all fields, store the callbacks, and open. An initial query
    /// triggers a search immediately.
    pub async fn open(&self, context: OpenContext) {
        {
            let mut state = self.lock();
            state.generation += 1;
            state.reset_transient();
            state.open = true;
            state.on_select = context.on_select;
            state.on_cancel = context.on_cancel;
        }
        if let Some(query) = context.initial_query {
            self.search(&query).await;
        }
    }

    /// Run a search and apply its outcome to state, unless a newer search
    /// or a close supersedes it first.
    ///
    /// A short query goes straight to Idle with empty results - no loading
    /// flash. Errors land in state, never escape.
    pub async fn search(&self, query: &str) {
        let generation = {
            let mut state = self.lock();
            state.generation += 1;
            state.query = query.to_string();
            if query.trim().chars().count() < self.service.options().min_chars {
                state.status = PickerStatus::Idle;
                state.results.clear();
                state.has_more = false;
                state.error = None;
                state.selected = 0;
                drop(state);
                // Kill any pending longer-query search so it cannot land
                // after this clear.
                self.service.cancel();
                return;
            }
            state.status = PickerStatus::Loading;
            state.error = None;
            state.generation
        };

        let outcome = self.service.search(query).await;

        let mut state = self.lock();
        if state.generation != generation || !state.open {
            // Superseded or closed: discard, never apply stale results.
            return;
        }
        match outcome {
            Ok(result) => {
                state.status = PickerStatus::Success;
                state.results = result.tags;
                state.has_more = result.has_more;
                state.selected = 0;
            }
            Err(err) => {
                state.status = PickerStatus::Error;
                state.error = Some(err.to_string());
                state.results.clear();
                state.has_more = false;
                state.selected = 0;
            }
        }
    }

    /// Move the selection down, wrapping at the end.
    pub fn select_down(&self) {
        let mut state = self.lock();
        if state.results.is_empty() {
            return;
        }
        state.selected = (state.selected + 1) % state.results.len();
    }

    /// Move the selection up, wrapping at the start.
    pub fn select_up(&self) {
        let mut state = self.lock();
        if state.results.is_empty() {
            return;
        }
        state.selected = if state.selected == 0 {
            state.results.len() - 1
        } else {
            state.selected - 1
        };
    }

    /// No-op outside `[0, results.len())`.
    pub fn set_selected(&self, index: usize) {
        let mut state = self.lock();
        if index < state.results.len() {
            state.selected = index;
        }
    }

    /// Resolve the highlighted tag and select it, if any.
    pub fn select_current(&self) {
        let tag = {
            let state = self.lock();
            state.results.get(state.selected).cloned()
        };
        if let Some(tag) = tag {
            self.select_tag(tag);
        }
    }

    /// Fire `on_select` with the tag, then close.
    pub fn select_tag(&self, tag: Tag) {
        let callback = {
            let mut state = self.lock();
            let callback = state.on_select.take();
            state.on_cancel = None;
            state.generation += 1;
            state.reset_transient();
            state.open = false;
            callback
        };
        self.service.cancel();
        if let Some(mut callback) = callback {
            callback(tag);
        }
    }

    /// Fire `on_cancel` (if provided), then close.
    pub fn cancel(&self) {
        let callback = {
            let mut state = self.lock();
            let callback = state.on_cancel.take();
            state.on_select = None;
            state.generation += 1;
            state.reset_transient();
            state.open = false;
            callback
        };
        self.service.cancel();
        if let Some(mut callback) = callback {
            callback();
        }
    }

    /// Drop pending work, clear transient fields, close.
    pub fn close(&self) {
        {
            let mut state = self.lock();
            state.generation += 1;
            state.reset_transient();
            state.open = false;
            state.on_select = None;
            state.on_cancel = None;
        }
        self.service.cancel();
    }

    // Accessors snapshot state for rendering and assertions.

    pub fn status(&self) -> PickerStatus {
        self.lock().status
    }

    pub fn is_open(&self) -> bool {
        self.lock().open
    }

    pub fn query(&self) -> String {
        self.lock().query.clone()
    }

    pub fn results(&self) -> Vec<Tag> {
        self.lock().results.clone()
    }

    pub fn has_more(&self) -> bool {
        self.lock().has_more
    }

    pub fn error_message(&self) -> Option<String> {
        self.lock().error.clone()
    }

    pub fn selected_index(&self) -> usize {
        self.lock().selected
    }

    pub fn selected_tag(&self) -> Option<Tag> {
        let state = self.lock();
        state.results.get(state.selected).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, PickerState> {
        self.state.lock().expect("picker state lock")
    }
}
