//! Conversion between UTF-8 and UTF-16, built from the single code point
//! operations of [`utf8`] and [`utf16`].
//!
//! The `*_into` converters write into a caller buffer and can be resumed:
//! they stop at the first error with both cursors on code point boundaries.
//!
//! - [`CodecError::BufferOverflow`]: the destination cursor carries the
//!   error and the source cursor is on the code point that did not fit.
//!   Make room (or switch buffers) and call again.
//! - [`CodecError::IncompleteUnicode`]: the source ends inside a sequence.
//!   The source cursor is on the start of that sequence; append more input
//!   and call again.
//! - [`CodecError::MalformedUnicode`]: the source cursor carries the error.
//!
//! The allocating converters [`utf8_to_utf16`] and [`utf16_to_utf8`] handle
//! ill-formed input according to [`TranscodeOptions`].

use alloc::vec::Vec;

use log::{debug, trace};

use crate::{
    REPLACEMENT_CHARACTER,
    error::{CodecError, TranscodeError},
    position::{ParsingPosition, check_bound},
    utf8, utf16,
};

/// What the allocating converters do when they meet ill-formed input.
#[cfg_attr(any(test, feature = "serde"), derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MalformedPolicy {
    /// Fail with the first error.
    #[default]
    Stop,
    /// Write [`TranscodeOptions::replacement`] once for every maximal
    /// ill-formed subsequence and carry on. This yields the same output as
    /// `String::from_utf8_lossy` and `String::from_utf16_lossy`.
    Replace,
}

/// Configuration for [`utf8_to_utf16`] and [`utf16_to_utf8`].
///
/// # Examples
///
/// ```rust
/// use textkit::{transcode, MalformedPolicy, TranscodeOptions};
///
/// let options = TranscodeOptions {
///     on_malformed: MalformedPolicy::Replace,
///     ..Default::default()
/// };
/// let units = transcode::utf8_to_utf16(b"a\xFFb", &options).unwrap();
/// assert_eq!(units, [0x61, 0xFFFD, 0x62]);
/// ```
#[cfg_attr(any(test, feature = "serde"), derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranscodeOptions {
    /// How ill-formed input is handled.
    ///
    /// # Default
    ///
    /// [`MalformedPolicy::Stop`]
    pub on_malformed: MalformedPolicy,

    /// The character written for ill-formed input under
    /// [`MalformedPolicy::Replace`].
    ///
    /// # Default
    ///
    /// U+FFFD REPLACEMENT CHARACTER
    pub replacement: char,
}

impl Default for TranscodeOptions {
    fn default() -> Self {
        Self {
            on_malformed: MalformedPolicy::default(),
            replacement: REPLACEMENT_CHARACTER,
        }
    }
}

/// Converts UTF-8 from `src[src_pos..src_end]` into UTF-16 at
/// `dst[dst_pos..dst_end]`, advancing both positions.
///
/// # Errors
///
/// The first error met, recorded in the position it concerns (see the
/// module documentation).
///
/// # Panics
///
/// If a bound exceeds its buffer or a position lies past its bound.
pub fn utf8_to_utf16_into(
    src_pos: &mut ParsingPosition,
    src: &[u8],
    src_end: usize,
    dst_pos: &mut ParsingPosition,
    dst: &mut [u16],
    dst_end: usize,
) -> Result<(), CodecError> {
    check_bound(src_pos.index(), 0, src_end, src.len());
    check_bound(dst_pos.index(), 0, dst_end, dst.len());
    convert_into(
        src_pos,
        src_end,
        dst_pos,
        |pos| utf8::get_next(pos, src, src_end),
        |pos, code_point| utf16::put_next(pos, code_point, dst, dst_end),
    )
}

/// Converts UTF-16 from `src[src_pos..src_end]` into UTF-8 at
/// `dst[dst_pos..dst_end]`, advancing both positions.
///
/// # Errors
///
/// The first error met, recorded in the position it concerns (see the
/// module documentation).
///
/// # Panics
///
/// If a bound exceeds its buffer or a position lies past its bound.
pub fn utf16_to_utf8_into(
    src_pos: &mut ParsingPosition,
    src: &[u16],
    src_end: usize,
    dst_pos: &mut ParsingPosition,
    dst: &mut [u8],
    dst_end: usize,
) -> Result<(), CodecError> {
    check_bound(src_pos.index(), 0, src_end, src.len());
    check_bound(dst_pos.index(), 0, dst_end, dst.len());
    convert_into(
        src_pos,
        src_end,
        dst_pos,
        |pos| utf16::get_next(pos, src, src_end),
        |pos, code_point| utf8::put_next(pos, code_point, dst, dst_end),
    )
}

fn convert_into(
    src_pos: &mut ParsingPosition,
    src_end: usize,
    dst_pos: &mut ParsingPosition,
    mut decode: impl FnMut(&mut ParsingPosition) -> Result<u32, CodecError>,
    mut encode: impl FnMut(&mut ParsingPosition, u32) -> Result<usize, CodecError>,
) -> Result<(), CodecError> {
    src_pos.clear_error();
    dst_pos.clear_error();
    while src_pos.index() < src_end {
        let index = src_pos.index();
        let code_point = decode(src_pos).inspect_err(|err| {
            trace!("source stopped at index {index}: {err}");
        })?;
        if let Err(err) = encode(dst_pos, code_point) {
            trace!(
                "destination stopped at index {}: {err}; source rewound to {index}",
                dst_pos.index()
            );
            src_pos.set_index(index);
            return Err(err);
        }
    }
    Ok(())
}

/// Converts UTF-8 to a new UTF-16 buffer.
///
/// # Errors
///
/// Under [`MalformedPolicy::Stop`], the first ill-formed sequence, with the
/// index of the offending byte. Never fails under
/// [`MalformedPolicy::Replace`].
pub fn utf8_to_utf16(src: &[u8], options: &TranscodeOptions) -> Result<Vec<u16>, TranscodeError> {
    let mut out = Vec::with_capacity(src.len());
    decode_all(
        src.len(),
        options,
        |pos| utf8::get_next(pos, src, src.len()),
        |code_point| {
            let mut buf = [0u16; 2];
            let written = utf16::put(code_point, 0, &mut buf, 2);
            debug_assert!(written.is_ok());
            out.extend_from_slice(&buf[..written.unwrap_or(0)]);
        },
    )?;
    Ok(out)
}

/// Converts UTF-16 to a new UTF-8 buffer.
///
/// # Errors
///
/// Under [`MalformedPolicy::Stop`], the first unpaired surrogate, with the
/// index of the offending unit. Never fails under
/// [`MalformedPolicy::Replace`].
pub fn utf16_to_utf8(src: &[u16], options: &TranscodeOptions) -> Result<Vec<u8>, TranscodeError> {
    let mut out = Vec::with_capacity(src.len());
    decode_all(
        src.len(),
        options,
        |pos| utf16::get_next(pos, src, src.len()),
        |code_point| {
            let mut buf = [0u8; 4];
            let written = utf8::put(code_point, 0, &mut buf, 4);
            debug_assert!(written.is_ok());
            out.extend_from_slice(&buf[..written.unwrap_or(0)]);
        },
    )?;
    Ok(out)
}

fn decode_all(
    len: usize,
    options: &TranscodeOptions,
    mut decode: impl FnMut(&mut ParsingPosition) -> Result<u32, CodecError>,
    mut emit: impl FnMut(u32),
) -> Result<(), TranscodeError> {
    let mut pos = ParsingPosition::new(0);
    while pos.index() < len {
        let start = pos.index();
        match decode(&mut pos) {
            Ok(code_point) => emit(code_point),
            Err(code) => {
                let index = pos.error_index().unwrap_or(start);
                match options.on_malformed {
                    MalformedPolicy::Stop => {
                        debug!("transcoding stopped: {code} at index {index}");
                        return Err(TranscodeError { code, index });
                    }
                    MalformedPolicy::Replace => {
                        debug!("replacing ill-formed input at {start}..{index}: {code}");
                        emit(u32::from(options.replacement));
                        // The error index is where the maximal subpart ends,
                        // unless the very first unit was bad.
                        pos.reset(index.max(start + 1));
                    }
                }
            }
        }
    }
    Ok(())
}
