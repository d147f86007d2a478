//! Error taxonomy for directory operations.
//!
//! The first four variants are client-caused and leave state untouched.
//! `Store` means the change was attempted but not durably recorded.

use thiserror::Error;

pub type DirectoryResult<T> = Result<T, DirectoryError>;

#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Malformed identifier, empty required string or inverted offsets
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Referenced room, user or member does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Uniqueness violated
    #[error("conflict: {0}")]
    Conflict(String),

    /// Instigator is not an administrator of the room
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The store rejected a write, or directory state is unusable
    #[error("store error: {0:#}")]
    Store(anyhow::Error),
}

impl DirectoryError {
    /// True for errors the caller caused and should not retry.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, Self::Store(_))
    }
}
