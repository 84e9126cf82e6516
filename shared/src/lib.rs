// shared/src/lib.rs

/// Boxed error produced by a storage backend client.
pub type BackendError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("usage: {0}")]
    Usage(String),
    #[error("Connection not started")]
    NotStarted,
    #[error(transparent)]
    Validation(#[from] SegmentNameError),
    #[error(transparent)]
    Serialization(serde_json::Error),
    #[error("Bad value content")]
    BadValueContent,
    #[error("Item does not exist")]
    NotFound,
    #[error(transparent)]
    Backend(BackendError),
}

impl Error {
    /// Wrap a backend client error without reinterpreting it.
    pub fn backend<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Backend(Box::new(err))
    }
}

/// Reasons a segment name is refused.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentNameError {
    #[error("Empty string")]
    Empty,
    #[error("Includes null character")]
    NullCharacter,
}

pub type Result<T> = std::result::Result<T, Error>;

/// Time-to-live in milliseconds.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct TtlMs(pub u64);

pub mod config;
