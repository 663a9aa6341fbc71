#![forbid(unsafe_code)]

//! Client SDK for defining DataFrame schemas - named, typed columns sourced
//! from tags, fixed values, or formulas - persisted into a hierarchical
//! element/attribute store behind a REST facade, plus an asynchronous tag
//! search engine (debounced, cancelable, cached, keyboard-navigable)
//! decoupled from any UI framework.

pub mod client;
pub mod config;
pub mod core;
pub mod error;
pub mod map;
pub mod search;
pub mod telemetry;

pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;

// Re-export the main types at the crate root for convenience.
pub use crate::client::{
    ApiError, BatchError, BatchOutcome, BatchPlan, BatchStep, ErrorKind, HttpTransport,
    PointCatalog, PointPage, Retrying, RetryPolicy, StoreClient, Transport,
};
pub use crate::config::Config;
pub use crate::core::{
    Column, ColumnDraft, ColumnPatch, DataFrame, DataFrameDraft, DataFramePatch, DataFrameSummary,
    IdentityType, Metadata, NamingRules, Patch, PermissionMode, Permissions, Sid, Tag,
    UserElement, UserIdentity, ValueSourceType, WebId,
};
pub use crate::map::{
    resolve_identity, AccountDirectory, ColumnStore, DataFrameStore, IdentityProvider,
};
pub use crate::search::{
    OpenContext, PickerStatus, TagPicker, TagSearchOptions, TagSearchResult, TagSearchService,
};
