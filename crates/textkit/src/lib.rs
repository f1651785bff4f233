//! UTF-8 and UTF-16 codecs that navigate text by code point.
//!
//! The [`utf8`] and [`utf16`] modules are stateless: every operation takes a
//! caller-owned buffer, an explicit bound and a [`ParsingPosition`] cursor,
//! moves the cursor on success and records an [`ErrorCode`] plus the index
//! of the offending code unit on failure. Ill-formed input never panics;
//! indices outside the declared bounds do.
//!
//! ```
//! use textkit::{utf16, utf8, ParsingPosition};
//!
//! let bytes = "h\u{E9}\u{1F600}".as_bytes();
//! let mut units = [0u16; 8];
//!
//! let mut src = ParsingPosition::new(0);
//! let mut dst = ParsingPosition::new(0);
//! while src.index() < bytes.len() {
//!     let code_point = utf8::get_next(&mut src, bytes, bytes.len()).unwrap();
//!     utf16::put_next(&mut dst, code_point, &mut units, 8).unwrap();
//! }
//! assert_eq!(&units[..dst.index()], &[0x68, 0xE9, 0xD83D, 0xDE00]);
//! ```

#![no_std]
extern crate alloc;

#[cfg(test)]
extern crate std;

mod error;
pub mod parse_utils;
mod position;
pub mod transcode;
pub mod utf16;
pub mod utf8;

#[cfg(test)]
mod tests;

pub use error::{CodecError, ErrorCode, EscapeError, TranscodeError};
pub use position::ParsingPosition;
pub use transcode::{MalformedPolicy, TranscodeOptions};

/// The largest Unicode code point.
pub const MAX_CODE_POINT: u32 = 0x10_FFFF;

/// The code point written in place of ill-formed input by
/// [`MalformedPolicy::Replace`].
pub const REPLACEMENT_CHARACTER: char = '\u{FFFD}';

/// `true` for code points in the surrogate range `0xD800..=0xDFFF`.
#[inline]
pub(crate) const fn is_surrogate(code_point: u32) -> bool {
    code_point & 0xFFFF_F800 == 0xD800
}
