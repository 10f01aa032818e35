use thiserror::Error;

/// Result type alias for samstream operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while reading, writing, or decoding SAM text.
///
/// End of input is not an error: readers report it as `Ok(None)`.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream ended inside a header line.
    #[error("Unexpected end of stream while reading SAM header")]
    TruncatedHeader,

    #[error("Invalid SAM header: {0}")]
    InvalidHeader(String),

    #[error("Invalid SAM record: {0}")]
    InvalidRecord(String),

    #[error("Duplicate reference sequence name: {0}")]
    DuplicateReference(String),

    #[error("Too many reference sequences: {0} exceeds maximum allowed (1000000)")]
    TooManyReferences(usize),

    #[error("Flag format option out of range: {0}")]
    InvalidFlagFormat(i64),
}

impl Error {
    pub(crate) fn record(msg: impl Into<String>) -> Self {
        Self::InvalidRecord(msg.into())
    }

    pub(crate) fn header(msg: impl Into<String>) -> Self {
        Self::InvalidHeader(msg.into())
    }
}
