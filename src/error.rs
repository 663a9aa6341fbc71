//! Crate-level error wrapper.

use thiserror::Error;

use crate::client::{ApiError, BatchError};
use crate::config::ConfigError;
use crate::core::CoreError;

/// Crate-level convenience error.
///
/// Not a "god error": it is a thin wrapper over canonical capability errors.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Batch(#[from] BatchError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl Error {
    /// Whether retrying the failed operation may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Api(err) => err.is_retryable(),
            Error::Core(_) | Error::Batch(_) | Error::Config(_) => false,
        }
    }
}

impl From<crate::core::error::InvalidName> for Error {
    fn from(err: crate::core::error::InvalidName) -> Self {
        Error::Core(err.into())
    }
}

impl From<crate::core::error::TagNotFound> for Error {
    fn from(err: crate::core::error::TagNotFound) -> Self {
        Error::Core(err.into())
    }
}

impl From<crate::core::error::DecodeError> for Error {
    fn from(err: crate::core::error::DecodeError) -> Self {
        Error::Core(err.into())
    }
}
