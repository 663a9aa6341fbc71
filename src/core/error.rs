//! Core capability errors (validation, decoding).
//!
//! These are bounded and stable: core errors represent domain/refusal states
//! raised before any network call, not transport failures.

use thiserror::Error;

/// Invalid identifier atom.
#[derive(Debug, Error, Clone)]
#[non_exhaustive]
pub enum InvalidId {
    #[error("web id is empty")]
    EmptyWebId,
    #[error("sid `{raw}` is invalid: {reason}")]
    Sid { raw: String, reason: String },
}

/// Name rejected by the naming rules.
///
/// `message` is the user-facing rejection reason and is stable: callers and
/// tests match on it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct InvalidName {
    pub raw: String,
    pub message: String,
}

/// Value source inconsistent with the column's source type.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{kind} column requires {requirement}")]
pub struct InvalidValueSource {
    pub kind: &'static str,
    pub requirement: &'static str,
}

/// Pre-flight point catalog lookup failed for a tag-backed column.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("PI Tag not found: {path}")]
pub struct TagNotFound {
    pub path: String,
}

/// Stored JSON blob failed to decode.
///
/// Call sites decide what to do with this; the usual policy for optional
/// bookkeeping blobs is to fall back to a documented default.
#[derive(Debug, Error, Clone)]
#[error("{slot} payload did not decode: {detail}")]
pub struct DecodeError {
    pub slot: &'static str,
    pub detail: String,
}

/// Canonical error enum for the core capability.
#[derive(Debug, Error, Clone)]
#[non_exhaustive]
pub enum CoreError {
    #[error(transparent)]
    InvalidId(#[from] InvalidId),
    #[error(transparent)]
    InvalidName(#[from] InvalidName),
    #[error(transparent)]
    InvalidValueSource(#[from] InvalidValueSource),
    #[error(transparent)]
    TagNotFound(#[from] TagNotFound),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl CoreError {
    /// Core errors are pure domain/input failures; retrying never helps.
    pub fn is_retryable(&self) -> bool {
        false
    }
}
