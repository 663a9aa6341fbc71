//! Entity mappers: bidirectional translation between the domain model and
//! the store's element/attribute representation.
//!
//! Every mutation entry point validates first; a validation failure carries
//! zero side effects. Composite creates go through the batch executor so a
//! caller never observes a half-built entity.

use serde_json::Value;
use tracing::debug;

use crate::core::{Metadata, Permissions};

pub mod account;
pub mod column;
pub mod dataframe;

pub use account::{resolve_identity, AccountDirectory, IdentityProvider};
pub use column::ColumnStore;
pub use dataframe::DataFrameStore;

pub(crate) fn to_body<T: serde::Serialize>(value: &T) -> Value {
    serde_json::to_value(value).expect("wire bodies serialize")
}

/// Bookkeeping blobs are stored as JSON strings inside the value envelope;
/// anything else reads as unset.
pub(crate) fn stored_text(value: &Value) -> Option<&str> {
    value.as_str()
}

pub(crate) fn decode_metadata(value: &Value) -> Metadata {
    match stored_text(value).map(Metadata::decode) {
        Some(Ok(metadata)) => metadata,
        Some(Err(err)) => {
            debug!("stored metadata ignored: {err}");
            Metadata::new()
        }
        None => Metadata::new(),
    }
}

pub(crate) fn decode_permissions(value: &Value) -> Permissions {
    match stored_text(value).map(Permissions::decode) {
        Some(Ok(permissions)) => permissions,
        Some(Err(err)) => {
            debug!("stored permissions ignored: {err}");
            Permissions::unset()
        }
        None => Permissions::unset(),
    }
}
