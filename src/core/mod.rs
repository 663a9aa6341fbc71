//! Core domain types.
//!
//! Module hierarchy follows type dependency order:
//! - error: validation and decode errors
//! - identity: WebId, Sid, UserIdentity, UserElement
//! - domain: ValueSourceType, PermissionMode, IdentityType
//! - meta: open metadata map with reserved keys
//! - permissions: stored permission descriptor
//! - tag: read-only point catalog entry
//! - frame: DataFrame, Column, drafts and patches
//! - validate: pure pre-flight validators

pub mod domain;
pub mod error;
pub mod frame;
pub mod identity;
pub mod meta;
pub mod permissions;
pub mod tag;
pub mod validate;

pub use domain::{IdentityType, PermissionMode, ValueSourceType};
pub use error::{
    CoreError, DecodeError, InvalidId, InvalidName, InvalidValueSource, TagNotFound,
};
pub use frame::{
    Column, ColumnDraft, ColumnPatch, DataFrame, DataFrameDraft, DataFramePatch, DataFrameSummary,
    Patch,
};
pub use identity::{Sid, UserElement, UserIdentity, WebId};
pub use meta::{is_reserved_key, Metadata};
pub use permissions::Permissions;
pub use tag::Tag;
pub use validate::{
    normalized_account_name, validate_name, validate_value_source, NamingRules,
    DEFAULT_INVALID_NAME_CHARS,
};
