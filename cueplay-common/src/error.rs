//! Common error types for cueplay

use crate::sound::Category;
use thiserror::Error;

/// Common result type for cueplay operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared across cueplay crates
#[derive(Error, Debug)]
pub enum Error {
    /// A (category, key) pair was registered twice. Fatal to startup.
    #[error("duplicate sound key: {category}/{key}")]
    DuplicateKey { category: Category, key: String },

    /// Lookup of a (category, key) pair that was never registered
    #[error("unknown sound: {category}/{key}")]
    UnknownSound { category: Category, key: String },

    /// Manifest loading or validation error
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
