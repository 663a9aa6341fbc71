//! Asynchronous tag search: debounced, cancelable, cached service plus the
//! keyboard-navigable picker state machine layered on top of it.

pub mod cache;
pub mod picker;
pub mod service;

pub use cache::QueryCache;
pub use picker::{CancelCallback, OpenContext, PickerStatus, SelectCallback, TagPicker};
pub use service::{TagSearchOptions, TagSearchResult, TagSearchService};
