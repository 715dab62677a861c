//! Errors raised at the checked entry points of the collections.

use std::result;
use thiserror::Error;

/// An invalid argument handed to one of the `try_*` operations.
///
/// Lookups that miss and insertions of keys that already exist are ordinary outcomes and are
/// reported through `bool` and `Option` return values instead.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum Error {
    /// The key was absent.
    #[error("invalid argument: key is absent")]
    MissingKey,

    /// The value was absent.
    #[error("invalid argument: value is absent")]
    MissingValue,
}

impl Error {
    /// Every variant is an invalid-argument condition; no mutation happened before it was raised.
    pub fn is_invalid_argument(&self) -> bool {
        match self {
            Error::MissingKey | Error::MissingValue => true,
        }
    }
}

pub type Result<T> = result::Result<T, Error>;
