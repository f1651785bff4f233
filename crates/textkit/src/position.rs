//! The cursor shared by every codec operation.

use crate::error::{CodecError, ErrorCode};

/// A mutable scan position into a code unit buffer.
///
/// Every codec function takes a `&mut ParsingPosition`, reads the current
/// [`index`](Self::index) and moves it on success. On failure the index is
/// left where it was and the error kind plus the index of the offending
/// code unit are recorded instead. Each operation clears the previous error
/// when it starts, so [`success`](Self::success) always describes the most
/// recent call.
///
/// One position belongs to one scan over one buffer; it is not meant to be
/// shared between concurrent scans.
///
/// ```
/// use textkit::{utf8, ErrorCode, ParsingPosition};
///
/// let bytes = "a\u{e9}".as_bytes();
/// let mut pos = ParsingPosition::new(0);
/// assert_eq!(utf8::get_next(&mut pos, bytes, bytes.len()), Ok(u32::from('a')));
/// assert_eq!(utf8::get_next(&mut pos, bytes, bytes.len()), Ok(0xE9));
/// assert!(pos.success());
///
/// // Cut the two-byte sequence short.
/// pos.reset(1);
/// assert!(utf8::get_next(&mut pos, bytes, 2).is_err());
/// assert_eq!(pos.error_code(), ErrorCode::IncompleteUnicode);
/// assert_eq!(pos.error_index(), Some(2));
/// assert_eq!(pos.index(), 1);
/// ```
#[cfg_attr(any(test, feature = "serde"), derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ParsingPosition {
    index: usize,
    error_index: Option<usize>,
    error_code: ErrorCode,
}

impl ParsingPosition {
    /// Creates a position at `index` with no error.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self {
            index,
            error_index: None,
            error_code: ErrorCode::None,
        }
    }

    /// Moves to `index` and clears any recorded error.
    pub fn reset(&mut self, index: usize) {
        self.index = index;
        self.clear_error();
    }

    /// The current index.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Sets the current index without touching the error state.
    pub fn set_index(&mut self, index: usize) {
        self.index = index;
    }

    /// Index of the code unit that caused the last failure, if any.
    #[must_use]
    pub const fn error_index(&self) -> Option<usize> {
        self.error_index
    }

    /// Sets the error index.
    pub fn set_error_index(&mut self, index: usize) {
        self.error_index = Some(index);
    }

    /// The error state of the last operation.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        self.error_code
    }

    /// Sets the error state.
    pub fn set_error_code(&mut self, code: ErrorCode) {
        self.error_code = code;
    }

    /// Forgets any recorded error.
    pub fn clear_error(&mut self) {
        self.error_index = None;
        self.error_code = ErrorCode::None;
    }

    /// `true` if no error is recorded.
    #[must_use]
    pub const fn success(&self) -> bool {
        matches!(self.error_code, ErrorCode::None)
    }

    /// `true` if an error is recorded.
    #[must_use]
    pub const fn fail(&self) -> bool {
        !self.success()
    }

    /// Records `error` at `index` and hands it back for an early `Err`.
    pub(crate) fn fail_at(&mut self, index: usize, error: CodecError) -> CodecError {
        self.error_index = Some(index);
        self.error_code = error.into();
        error
    }
}

/// Panics unless `end` is within `len` and `index` lies in `start..end`.
#[track_caller]
pub(crate) fn check_read(index: usize, start: usize, end: usize, len: usize) {
    assert!(end <= len, "bound {end} out of bounds for length {len}");
    assert!(
        start <= index && index < end,
        "index {index} out of bounds {start}..{end}"
    );
}

/// Panics unless there is a code unit before `index` that is not before
/// `start`, i.e. `start < index <= len`.
#[track_caller]
pub(crate) fn check_read_back(index: usize, start: usize, len: usize) {
    assert!(
        start < index && index <= len,
        "index {index} out of bounds {start}<..={len}"
    );
}

/// Panics unless `end` is within `len` and `index` lies in `start..=end`.
#[track_caller]
pub(crate) fn check_bound(index: usize, start: usize, end: usize, len: usize) {
    assert!(end <= len, "bound {end} out of bounds for length {len}");
    assert!(
        start <= index && index <= end,
        "index {index} out of bounds {start}..={end}"
    );
}
