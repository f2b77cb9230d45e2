// Error types
//
// Responsibility: one error enum for every recoverable failure in the crate.
// Precondition violations are panics and never show up here.

use thiserror::Error;

/// Recoverable errors raised by loaders, the chunk cache and documents.
#[derive(Error, Debug)]
pub enum Error {
    /// Underlying I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The source ended before the requested range was read.
    #[error("unexpected EOF when reading at {offset}~{length}")]
    UnexpectedEof { offset: u64, length: u32 },

    /// A loader handed back fewer bytes than requested.
    #[error("short read at {offset}: expected {expected} bytes, got {actual}")]
    ShortRead {
        offset: u64,
        expected: u32,
        actual: usize,
    },

    /// Chunk geometry or memory budget cannot be honoured.
    #[error("invalid buffer configuration: {detail}")]
    InvalidConfig { detail: String },
}

impl Error {
    /// Whether this error is an I/O failure (as opposed to bad configuration).
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            Error::Io(_) | Error::UnexpectedEof { .. } | Error::ShortRead { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
