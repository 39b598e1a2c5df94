//! Error taxonomy shared by every encode/decode path.
//!
//! All failures are synchronous and carry an [`ErrorKind`] plus a message. Errors raised
//! below a named sequence field or choice alternative are re-wrapped with that name so the
//! rendered message reads `Header.stationId: out of range: ...` while the kind is unchanged.

use std::fmt;

/// Discriminant of a [`CodecError`], for matching without looking at the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum ErrorKind {
    /// Value outside its declared constraint.
    #[error("out of range")]
    OutOfRange,
    /// Value or declared size inconsistent with the schema.
    #[error("schema mismatch")]
    SchemaMismatch,
    /// Decoder found an inconsistent bitmask, index or count.
    #[error("malformed input")]
    MalformedInput,
    /// Deliberately unsupported part of X.691 (extension values, fragmentation).
    #[error("not implemented")]
    NotImplemented,
    /// Value rejected by the codec (choice selection, alphabet membership, ...).
    #[error("invalid value")]
    InvalidValue,
    /// Read past the written length of a bitstream.
    #[error("out of data")]
    OutOfData,
    /// Write past the capacity of a fixed bitstream.
    #[error("buffer overrun")]
    BufferOverrun,
    /// Bad argument to a diagnostic helper (hex/binary strings, render windows).
    #[error("invalid argument")]
    InvalidArgument,
    /// Composite nesting deeper than the configured limit.
    #[error("nesting depth exceeded")]
    DepthExceeded,
}

/// Error returned by every codec operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}{kind}: {message}", PathPrefix(.path))]
pub struct CodecError {
    kind: ErrorKind,
    /// Field path, outermost first.
    path: Vec<String>,
    message: String,
}

struct PathPrefix<'a>(&'a [String]);

impl fmt::Display for PathPrefix<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return Ok(());
        }
        write!(f, "{}: ", self.0.join("."))
    }
}

impl CodecError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        CodecError { kind, path: Vec::new(), message: message.into() }
    }

    pub fn out_of_range(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::OutOfRange, message)
    }

    pub fn schema_mismatch(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SchemaMismatch, message)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MalformedInput, message)
    }

    pub fn not_implemented(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotImplemented, message)
    }

    pub fn invalid_value(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidValue, message)
    }

    pub fn out_of_data(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::OutOfData, message)
    }

    pub fn buffer_overrun(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::BufferOverrun, message)
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Field path from the outermost composite down to the failing value.
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// Prefix the path with an enclosing field or alternative name.
    pub(crate) fn within(mut self, segment: &str) -> Self {
        self.path.insert(0, segment.to_string());
        self
    }
}

pub type Result<T, E = CodecError> = std::result::Result<T, E>;

/// Failure of [`crate::encode`] / [`crate::Codec::encode`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("encoding failed: {0}")]
pub struct EncodeError(#[from] pub CodecError);

impl EncodeError {
    pub fn kind(&self) -> ErrorKind {
        self.0.kind()
    }
}

/// Failure of [`crate::decode`] / [`crate::Codec::decode`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("decoding failed: {0}")]
pub struct DecodeError(#[from] pub CodecError);

impl DecodeError {
    pub fn kind(&self) -> ErrorKind {
        self.0.kind()
    }
}
