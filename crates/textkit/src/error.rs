//! Error types shared by the UTF-8 and UTF-16 codecs.
//!
//! Codec functions never panic on ill-formed input. They return a
//! [`CodecError`] and record the same failure in the caller's
//! [`ParsingPosition`](crate::ParsingPosition) as an [`ErrorCode`], together
//! with the index of the offending code unit.

use core::fmt;

use thiserror::Error;

/// The failure kinds a codec operation can report.
#[cfg_attr(any(test, feature = "serde"), derive(serde::Serialize, serde::Deserialize))]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodecError {
    /// An ill-formed code unit sequence: a bad trailing byte, a disallowed
    /// leading byte, an overlong or surrogate encoding in UTF-8, an unpaired
    /// surrogate in UTF-16, or a code point outside `0..=0x10FFFF` on encode.
    #[error("malformed unicode")]
    MalformedUnicode,
    /// A sequence that is well-formed so far but cut short by the bound.
    ///
    /// Incremental readers can treat this as "need more input" rather than
    /// rejecting the data.
    #[error("incomplete unicode")]
    IncompleteUnicode,
    /// The destination has no room for the complete encoded sequence.
    #[error("buffer overflow")]
    BufferOverflow,
}

/// The error state held by a [`ParsingPosition`](crate::ParsingPosition).
///
/// `None` means the last operation succeeded; the other variants mirror
/// [`CodecError`].
#[cfg_attr(any(test, feature = "serde"), derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// No error.
    #[default]
    None,
    /// See [`CodecError::MalformedUnicode`].
    MalformedUnicode,
    /// See [`CodecError::IncompleteUnicode`].
    IncompleteUnicode,
    /// See [`CodecError::BufferOverflow`].
    BufferOverflow,
}

impl ErrorCode {
    /// Returns the failure this code stands for, or `None` for
    /// [`ErrorCode::None`].
    #[must_use]
    pub const fn as_error(self) -> Option<CodecError> {
        match self {
            ErrorCode::None => None,
            ErrorCode::MalformedUnicode => Some(CodecError::MalformedUnicode),
            ErrorCode::IncompleteUnicode => Some(CodecError::IncompleteUnicode),
            ErrorCode::BufferOverflow => Some(CodecError::BufferOverflow),
        }
    }
}

impl From<CodecError> for ErrorCode {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::MalformedUnicode => ErrorCode::MalformedUnicode,
            CodecError::IncompleteUnicode => ErrorCode::IncompleteUnicode,
            CodecError::BufferOverflow => ErrorCode::BufferOverflow,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_error() {
            Some(err) => err.fmt(f),
            None => f.write_str("none"),
        }
    }
}

/// Error returned by [`utf16::escape`](crate::utf16::escape).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeError {
    /// The code point cannot be escaped.
    #[error(transparent)]
    Codec(#[from] CodecError),
    /// The output sink refused the write.
    #[error("formatter error")]
    Format(#[from] fmt::Error),
}

/// Error returned by the allocating converters in [`transcode`](crate::transcode).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{code} at index {index}")]
pub struct TranscodeError {
    /// What went wrong.
    pub code: CodecError,
    /// Index of the offending code unit in the source.
    pub index: usize,
}
