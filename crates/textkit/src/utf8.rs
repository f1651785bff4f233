//! UTF-8 code units: byte classification, navigation by code point and
//! single code point encoding.
//!
//! Decoding follows the well-formed byte sequences of the Unicode Standard
//! (Table 3-7): `0xC0`, `0xC1` and `0xF5..=0xFF` never start a sequence, and
//! the second byte of a sequence led by `0xE0`, `0xED`, `0xF0` or `0xF4` is
//! range-checked so that overlong forms, encoded surrogates and code points
//! above U+10FFFF are rejected as [`CodecError::MalformedUnicode`].
//!
//! A failure is reported at the exact byte that broke the sequence (the
//! first bad trailing byte, or the bound when the input runs out), not at the
//! start of the sequence. A caller that wants to resynchronise can resume at
//! the reported error index.

use core::ops::RangeInclusive;

use crate::{
    MAX_CODE_POINT,
    error::CodecError,
    is_surrogate,
    position::{ParsingPosition, check_bound, check_read, check_read_back},
};

/// Longest run of trailing bytes after a leading byte.
pub const MAX_TRAILING: usize = 3;

const TRAILING: RangeInclusive<u8> = 0x80..=0xBF;

/// Decode result: code point and sequence length, or the error and the index
/// of the byte it is reported at.
type Decoded = Result<(u32, usize), (CodecError, usize)>;

/// `true` if `byte` is a complete (ASCII) code point.
#[inline]
#[must_use]
pub const fn is_single(byte: u8) -> bool {
    byte <= 0x7F
}

/// `true` if `byte` may start a multi-byte sequence.
///
/// `0xC0` and `0xC1` are excluded: they could only start an overlong
/// two-byte form. Bytes above `0xF4` would encode beyond U+10FFFF.
#[inline]
#[must_use]
pub const fn is_leading(byte: u8) -> bool {
    matches!(byte, 0xC2..=0xF4)
}

/// `true` if `byte` has the continuation pattern `10xxxxxx`.
#[inline]
#[must_use]
pub const fn is_trailing(byte: u8) -> bool {
    byte & 0xC0 == 0x80
}

/// Number of trailing bytes a leading byte announces (1, 2 or 3).
///
/// The count is the number of high one bits minus one, i.e. `6` minus the
/// position of the highest zero bit. ASCII and trailing bytes announce `0`;
/// the other bytes that are not [leading](is_leading) yield the count their
/// bit pattern announces (`1` for `0xC0`, up to `7` for `0xFF`).
#[inline]
#[must_use]
pub const fn trailing_count(leading: u8) -> usize {
    leading.leading_ones().saturating_sub(1) as usize
}

/// Number of bytes [`put`] writes for `code_point`.
#[inline]
#[must_use]
pub const fn len_of(code_point: u32) -> usize {
    match code_point {
        0..0x80 => 1,
        0x80..0x800 => 2,
        0x800..0x1_0000 => 3,
        _ => 4,
    }
}

/// Steps over the code point at the position, returning its length in
/// bytes.
///
/// The sequence is validated exactly as [`get_next`] does. In addition the
/// run of trailing bytes of a multi-byte sequence must end where the leading
/// byte says it does: a trailing byte directly after it is reported as
/// [`CodecError::MalformedUnicode`] at that byte. An ASCII byte has no run,
/// so a stray trailing byte after it is left for the next call.
///
/// # Errors
///
/// As for [`get_next`], plus the run-on case above.
///
/// # Panics
///
/// If `end > bytes.len()` or the index is not below `end`.
pub fn forward(pos: &mut ParsingPosition, bytes: &[u8], end: usize) -> Result<usize, CodecError> {
    let index = pos.index();
    let (_, len) = next(pos, bytes, end)?;

    let after = index + len;
    if len > 1 && after < end && is_trailing(bytes[after]) {
        pos.set_index(index);
        return Err(pos.fail_at(after, CodecError::MalformedUnicode));
    }
    Ok(len)
}

/// Steps back over the code point before the position, returning its length
/// in bytes.
///
/// The run of trailing bytes before the position is walked back to its
/// leading byte; the run must have exactly the length that byte announces.
///
/// # Errors
///
/// [`CodecError::MalformedUnicode`] for a run without a valid leading byte,
/// a run longer or shorter than announced, or a sequence [`get_next`] would
/// reject; [`CodecError::IncompleteUnicode`] if the run reaches `start`
/// before a leading byte is found.
///
/// # Panics
///
/// If the index is not in `start + 1..=bytes.len()`.
pub fn backward(
    pos: &mut ParsingPosition,
    bytes: &[u8],
    start: usize,
) -> Result<usize, CodecError> {
    previous(pos, bytes, start).map(|(_, len)| len)
}

/// Decodes the code point at the position and steps over it.
///
/// ```
/// use textkit::{utf8, CodecError, ParsingPosition};
///
/// let mut pos = ParsingPosition::new(0);
/// assert_eq!(utf8::get_next(&mut pos, "\u{20AC}".as_bytes(), 3), Ok(0x20AC));
///
/// // An overlong NUL is never decoded as U+0000.
/// pos.reset(0);
/// assert_eq!(utf8::get_next(&mut pos, &[0xC0, 0x80], 2), Err(CodecError::MalformedUnicode));
/// ```
///
/// # Errors
///
/// [`CodecError::MalformedUnicode`] for a byte that cannot start a sequence,
/// a bad trailing byte, an overlong form, an encoded surrogate or a code
/// point above U+10FFFF; [`CodecError::IncompleteUnicode`] if `end` cuts the
/// sequence short. The error index is the offending byte, or `end`.
///
/// # Panics
///
/// If `end > bytes.len()` or the index is not below `end`.
pub fn get_next(pos: &mut ParsingPosition, bytes: &[u8], end: usize) -> Result<u32, CodecError> {
    next(pos, bytes, end).map(|(code_point, _)| code_point)
}

/// Decodes the code point before the position and steps back over it.
///
/// # Errors
///
/// As for [`backward`].
///
/// # Panics
///
/// As for [`backward`].
pub fn get_previous(
    pos: &mut ParsingPosition,
    bytes: &[u8],
    start: usize,
) -> Result<u32, CodecError> {
    previous(pos, bytes, start).map(|(code_point, _)| code_point)
}

fn next(pos: &mut ParsingPosition, bytes: &[u8], end: usize) -> Result<(u32, usize), CodecError> {
    let index = pos.index();
    check_read(index, 0, end, bytes.len());
    pos.clear_error();

    match decode_at(bytes, index, end) {
        Ok((code_point, len)) => {
            pos.set_index(index + len);
            Ok((code_point, len))
        }
        Err((err, at)) => Err(pos.fail_at(at, err)),
    }
}

fn previous(
    pos: &mut ParsingPosition,
    bytes: &[u8],
    start: usize,
) -> Result<(u32, usize), CodecError> {
    let index = pos.index();
    check_read_back(index, start, bytes.len());
    pos.clear_error();

    let last = index - 1;
    let byte = bytes[last];
    if is_single(byte) {
        pos.set_index(last);
        return Ok((u32::from(byte), 1));
    }
    if !is_trailing(byte) {
        return Err(pos.fail_at(last, CodecError::MalformedUnicode));
    }

    let lead = scan_to_lead(bytes, last, start).map_err(|(err, at)| pos.fail_at(at, err))?;
    let count = trailing_count(bytes[lead]);
    let run = last - lead;
    if run < count {
        return Err(pos.fail_at(lead, CodecError::MalformedUnicode));
    }
    if run > count {
        return Err(pos.fail_at(lead + 1 + count, CodecError::MalformedUnicode));
    }

    match decode_at(bytes, lead, index) {
        Ok((code_point, len)) => {
            debug_assert_eq!(len, index - lead);
            pos.set_index(lead);
            Ok((code_point, len))
        }
        Err((err, at)) => Err(pos.fail_at(at, err)),
    }
}

/// Walks back from the trailing byte at `from` to the leading byte of its
/// run and returns that byte's index.
fn scan_to_lead(bytes: &[u8], from: usize, start: usize) -> Result<usize, (CodecError, usize)> {
    debug_assert!(is_trailing(bytes[from]));
    let mut lead = from;
    loop {
        if lead == start {
            return Err((CodecError::IncompleteUnicode, start));
        }
        lead -= 1;
        if !is_trailing(bytes[lead]) {
            break;
        }
        if from - lead >= MAX_TRAILING {
            return Err((CodecError::MalformedUnicode, lead));
        }
    }
    if !is_leading(bytes[lead]) {
        return Err((CodecError::MalformedUnicode, lead));
    }
    Ok(lead)
}

fn decode_at(bytes: &[u8], index: usize, end: usize) -> Decoded {
    let c0 = bytes[index];
    match c0 {
        0x00..=0x7F => Ok((u32::from(c0), 1)),
        0xC2..=0xDF => decode2(bytes, index, end),
        0xE0..=0xEF => decode3(bytes, index, end),
        0xF0..=0xF4 => decode4(bytes, index, end),
        _ => Err((CodecError::MalformedUnicode, index)),
    }
}

/// The payload bits of the trailing byte at `at`, if it is within `end` and
/// in `range`.
#[inline]
fn trailing(
    bytes: &[u8],
    at: usize,
    end: usize,
    range: RangeInclusive<u8>,
) -> Result<u32, (CodecError, usize)> {
    if at >= end {
        return Err((CodecError::IncompleteUnicode, end));
    }
    let byte = bytes[at];
    if !range.contains(&byte) {
        return Err((CodecError::MalformedUnicode, at));
    }
    Ok(u32::from(byte & 0x3F))
}

fn decode2(bytes: &[u8], index: usize, end: usize) -> Decoded {
    let c0 = u32::from(bytes[index] & 0x1F);
    let c1 = trailing(bytes, index + 1, end, TRAILING)?;
    Ok(((c0 << 6) | c1, 2))
}

fn decode3(bytes: &[u8], index: usize, end: usize) -> Decoded {
    let lead = bytes[index];
    let second = match lead {
        // Below 0xA0 the value would fit in two bytes.
        0xE0 => 0xA0..=0xBF,
        // From 0xA0 the value would be a surrogate.
        0xED => 0x80..=0x9F,
        _ => TRAILING,
    };
    let c1 = trailing(bytes, index + 1, end, second)?;
    let c2 = trailing(bytes, index + 2, end, TRAILING)?;
    Ok(((u32::from(lead & 0x0F) << 12) | (c1 << 6) | c2, 3))
}

fn decode4(bytes: &[u8], index: usize, end: usize) -> Decoded {
    let lead = bytes[index];
    let second = match lead {
        // Below 0x90 the value would fit in three bytes.
        0xF0 => 0x90..=0xBF,
        // From 0x90 the value would exceed U+10FFFF.
        0xF4 => 0x80..=0x8F,
        _ => TRAILING,
    };
    let c1 = trailing(bytes, index + 1, end, second)?;
    let c2 = trailing(bytes, index + 2, end, TRAILING)?;
    let c3 = trailing(bytes, index + 3, end, TRAILING)?;
    let code_point = (u32::from(lead & 0x07) << 18) | (c1 << 12) | (c2 << 6) | c3;
    debug_assert!(code_point <= MAX_CODE_POINT);
    Ok((code_point, 4))
}

/// Moves the position back to the leading byte of the sequence it is inside
/// of. A position that is not on a trailing byte is left alone.
///
/// The sequence the position would snap to is checked the way [`get_next`]
/// checks it, up to the end of `bytes`, so a position inside a truncated,
/// overlong or surrogate sequence is not snapped.
///
/// # Errors
///
/// The index is left unchanged and [`CodecError::IncompleteUnicode`] is
/// reported if the trailing run reaches `start`, or if `bytes` ends before
/// the announced end of the sequence (at `bytes.len()`). The error is
/// [`CodecError::MalformedUnicode`] if the run has no valid leading byte,
/// is longer than any sequence, the position lies beyond the trailing bytes
/// the leading byte announces, or the sequence is ill-formed (at the
/// offending byte).
///
/// # Panics
///
/// If the index is not in `start..=bytes.len()`.
pub fn set_to_start(
    pos: &mut ParsingPosition,
    bytes: &[u8],
    start: usize,
) -> Result<(), CodecError> {
    let index = pos.index();
    check_bound(index, start, bytes.len(), bytes.len());
    pos.clear_error();

    if index == bytes.len() || !is_trailing(bytes[index]) {
        return Ok(());
    }
    let lead = scan_to_lead(bytes, index, start).map_err(|(err, at)| pos.fail_at(at, err))?;
    if index - lead > trailing_count(bytes[lead]) {
        return Err(pos.fail_at(index, CodecError::MalformedUnicode));
    }
    decode_at(bytes, lead, bytes.len()).map_err(|(err, at)| pos.fail_at(at, err))?;
    pos.set_index(lead);
    Ok(())
}

/// Moves the position forward past the end of the sequence it is inside of.
/// A position that is not on a trailing byte is left alone.
///
/// # Errors
///
/// The index is left unchanged and [`CodecError::MalformedUnicode`] is
/// reported if the position's trailing byte has no valid leading byte or
/// lies beyond the announced length, or the sequence is ill-formed as
/// [`get_next`] would report it (at the offending byte, including overlong
/// and surrogate forms); [`CodecError::IncompleteUnicode`] if `end` comes
/// before the announced end.
///
/// # Panics
///
/// If `end > bytes.len()` or the index is past `end`.
pub fn set_to_terminal(
    pos: &mut ParsingPosition,
    bytes: &[u8],
    end: usize,
) -> Result<(), CodecError> {
    let index = pos.index();
    check_bound(index, 0, end, bytes.len());
    pos.clear_error();

    if index == end || !is_trailing(bytes[index]) {
        return Ok(());
    }
    let Ok(lead) = scan_to_lead(bytes, index, 0) else {
        return Err(pos.fail_at(index, CodecError::MalformedUnicode));
    };
    if lead + trailing_count(bytes[lead]) < index {
        return Err(pos.fail_at(index, CodecError::MalformedUnicode));
    }
    let (_, len) = decode_at(bytes, lead, end).map_err(|(err, at)| pos.fail_at(at, err))?;
    pos.set_index(lead + len);
    Ok(())
}

/// Encodes `code_point` into `bytes` at `index`, returning the number of
/// bytes written.
///
/// Nothing is written on failure; in particular a sequence that does not fit
/// is never written in part.
///
/// # Errors
///
/// [`CodecError::MalformedUnicode`] if `code_point` is above U+10FFFF or a
/// surrogate, [`CodecError::BufferOverflow`] if fewer bytes than needed
/// remain before `end`.
///
/// # Panics
///
/// If `end > bytes.len()` or `index > end`.
#[allow(clippy::cast_possible_truncation)]
pub fn put(code_point: u32, index: usize, bytes: &mut [u8], end: usize) -> Result<usize, CodecError> {
    check_bound(index, 0, end, bytes.len());
    if code_point > MAX_CODE_POINT || is_surrogate(code_point) {
        return Err(CodecError::MalformedUnicode);
    }

    let len = len_of(code_point);
    if end - index < len {
        return Err(CodecError::BufferOverflow);
    }
    let dst = &mut bytes[index..index + len];
    match len {
        1 => dst[0] = code_point as u8,
        2 => {
            dst[0] = 0xC0 | (code_point >> 6) as u8;
            dst[1] = 0x80 | (code_point & 0x3F) as u8;
        }
        3 => {
            dst[0] = 0xE0 | (code_point >> 12) as u8;
            dst[1] = 0x80 | ((code_point >> 6) & 0x3F) as u8;
            dst[2] = 0x80 | (code_point & 0x3F) as u8;
        }
        _ => {
            dst[0] = 0xF0 | (code_point >> 18) as u8;
            dst[1] = 0x80 | ((code_point >> 12) & 0x3F) as u8;
            dst[2] = 0x80 | ((code_point >> 6) & 0x3F) as u8;
            dst[3] = 0x80 | (code_point & 0x3F) as u8;
        }
    }
    Ok(len)
}

/// Like [`put`], but writes at the position and moves it past the written
/// bytes.
///
/// # Errors
///
/// As for [`put`]; the error is also recorded in `pos` at its index.
///
/// # Panics
///
/// As for [`put`].
pub fn put_next(
    pos: &mut ParsingPosition,
    code_point: u32,
    bytes: &mut [u8],
    end: usize,
) -> Result<usize, CodecError> {
    let index = pos.index();
    pos.clear_error();
    match put(code_point, index, bytes, end) {
        Ok(len) => {
            pos.set_index(index + len);
            Ok(len)
        }
        Err(err) => Err(pos.fail_at(index, err)),
    }
}
