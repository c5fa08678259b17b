//! Error type for the shell engine.

use thiserror::Error;

/// Errors surfaced by the public API.
///
/// Lookups that merely miss (an unregistered name in a plain query)
/// return `Option` instead; `NotFound` is reserved for operations that
/// require their target to exist, such as attaching a completion to a
/// command that was never registered.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("malformed table: {0}")]
    BadStructure(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;
