//! UTF-16 code units: classification, surrogate arithmetic, navigation by
//! code point and single code point encoding.
//!
//! All navigation functions take the buffer as a `&[u16]` together with an
//! explicit bound (`end` when moving forward, `start` when moving backward)
//! and a [`ParsingPosition`] that is moved on success. On failure the
//! position keeps its index and records the error kind and the index of the
//! offending unit:
//!
//! - a lone trailing surrogate met going forward (or a lone leading surrogate
//!   met going backward) is reported at its own index;
//! - a surrogate whose partner is not a surrogate of the other kind is
//!   reported at that partner;
//! - a pair cut in half by the bound is reported at the bound as
//!   [`CodecError::IncompleteUnicode`].
//!
//! Indices outside the declared bounds are caller bugs and panic.

use alloc::string::String;
use core::fmt;

use crate::{
    MAX_CODE_POINT,
    error::{CodecError, EscapeError},
    is_surrogate,
    position::{ParsingPosition, check_bound, check_read, check_read_back},
};

/// The first code point that needs a surrogate pair.
pub const SUPPLEMENTARY_MIN: u32 = 0x1_0000;

/// `(0xD800 << 10) + 0xDC00 - 0x10000`, folded so a pair composes with one
/// subtraction.
const SURROGATE_OFFSET: u32 = 0x35F_DC00;

/// `0xD800 - (0x10000 >> 10)`.
const LEAD_OFFSET: u32 = 0xD7C0;

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Length in bytes of one `\uXXXX` escape.
const ESCAPE_LEN: usize = 6;

/// `true` if `unit` is a code point on its own (not a surrogate).
#[inline]
#[must_use]
pub const fn is_single(unit: u16) -> bool {
    unit & 0xF800 != 0xD800
}

/// `true` if `unit` is a high (leading) surrogate.
#[inline]
#[must_use]
pub const fn is_leading(unit: u16) -> bool {
    unit & 0xFC00 == 0xD800
}

/// `true` if `unit` is a low (trailing) surrogate.
#[inline]
#[must_use]
pub const fn is_trailing(unit: u16) -> bool {
    unit & 0xFC00 == 0xDC00
}

/// Combines a surrogate pair into its code point.
///
/// The result is meaningless unless `high` is leading and `low` trailing;
/// debug builds assert this.
#[inline]
#[must_use]
pub const fn compose(high: u16, low: u16) -> u32 {
    debug_assert!(is_leading(high) && is_trailing(low));
    ((high as u32) << 10) + low as u32 - SURROGATE_OFFSET
}

/// The leading surrogate of a supplementary code point.
#[inline]
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub const fn decompose_high(code_point: u32) -> u16 {
    debug_assert!(code_point >= SUPPLEMENTARY_MIN && code_point <= MAX_CODE_POINT);
    ((code_point >> 10) + LEAD_OFFSET) as u16
}

/// The trailing surrogate of a supplementary code point.
#[inline]
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub const fn decompose_low(code_point: u32) -> u16 {
    debug_assert!(code_point >= SUPPLEMENTARY_MIN && code_point <= MAX_CODE_POINT);
    ((code_point & 0x3FF) | 0xDC00) as u16
}

/// Number of units [`put`] writes for `code_point`.
#[inline]
#[must_use]
pub const fn len_of(code_point: u32) -> usize {
    if code_point < SUPPLEMENTARY_MIN { 1 } else { 2 }
}

/// Steps over the code point at the position, returning the number of units
/// consumed (1 or 2).
///
/// # Errors
///
/// [`CodecError::MalformedUnicode`] for a lone trailing surrogate or a
/// leading surrogate not followed by a trailing one,
/// [`CodecError::IncompleteUnicode`] if a leading surrogate is the last unit
/// before `end`.
///
/// # Panics
///
/// If `end > units.len()` or the index is not below `end`.
pub fn forward(pos: &mut ParsingPosition, units: &[u16], end: usize) -> Result<usize, CodecError> {
    next(pos, units, end).map(|(_, len)| len)
}

/// Steps back over the code point before the position, returning the number
/// of units consumed (1 or 2).
///
/// # Errors
///
/// [`CodecError::MalformedUnicode`] for a lone leading surrogate or a
/// trailing surrogate not preceded by a leading one,
/// [`CodecError::IncompleteUnicode`] if a trailing surrogate sits right
/// after `start`.
///
/// # Panics
///
/// If the index is not in `start + 1..=units.len()`.
pub fn backward(
    pos: &mut ParsingPosition,
    units: &[u16],
    start: usize,
) -> Result<usize, CodecError> {
    previous(pos, units, start).map(|(_, len)| len)
}

/// Decodes the code point at the position and steps over it.
///
/// This is the iteration primitive text scanners build on:
///
/// ```
/// use textkit::{utf16, ParsingPosition};
///
/// let units: Vec<u16> = "a\u{1F600}".encode_utf16().collect();
/// let mut pos = ParsingPosition::new(0);
/// let mut seen = Vec::new();
/// while pos.index() < units.len() {
///     seen.push(utf16::get_next(&mut pos, &units, units.len()).unwrap());
/// }
/// assert_eq!(seen, [0x61, 0x1F600]);
/// ```
///
/// # Errors
///
/// As for [`forward`].
///
/// # Panics
///
/// As for [`forward`].
pub fn get_next(pos: &mut ParsingPosition, units: &[u16], end: usize) -> Result<u32, CodecError> {
    next(pos, units, end).map(|(code_point, _)| code_point)
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
    units: &[u16],
    start: usize,
) -> Result<u32, CodecError> {
    previous(pos, units, start).map(|(code_point, _)| code_point)
}

fn next(pos: &mut ParsingPosition, units: &[u16], end: usize) -> Result<(u32, usize), CodecError> {
    let index = pos.index();
    check_read(index, 0, end, units.len());
    pos.clear_error();

    let unit = units[index];
    if is_single(unit) {
        pos.set_index(index + 1);
        return Ok((u32::from(unit), 1));
    }
    if is_trailing(unit) {
        return Err(pos.fail_at(index, CodecError::MalformedUnicode));
    }

    let low_index = index + 1;
    if low_index == end {
        return Err(pos.fail_at(end, CodecError::IncompleteUnicode));
    }
    let low = units[low_index];
    if !is_trailing(low) {
        return Err(pos.fail_at(low_index, CodecError::MalformedUnicode));
    }

    pos.set_index(index + 2);
    Ok((compose(unit, low), 2))
}

fn previous(
    pos: &mut ParsingPosition,
    units: &[u16],
    start: usize,
) -> Result<(u32, usize), CodecError> {
    let index = pos.index();
    check_read_back(index, start, units.len());
    pos.clear_error();

    let last = index - 1;
    let unit = units[last];
    if is_single(unit) {
        pos.set_index(last);
        return Ok((u32::from(unit), 1));
    }
    if is_leading(unit) {
        return Err(pos.fail_at(last, CodecError::MalformedUnicode));
    }

    if last == start {
        return Err(pos.fail_at(start, CodecError::IncompleteUnicode));
    }
    let high_index = last - 1;
    let high = units[high_index];
    if !is_leading(high) {
        return Err(pos.fail_at(high_index, CodecError::MalformedUnicode));
    }

    pos.set_index(high_index);
    Ok((compose(high, unit), 2))
}

/// Moves the position back to the start of the code point it is inside of.
///
/// A position on the trailing half of a pair moves to the leading half;
/// any other position is already on a boundary and is left alone.
///
/// # Errors
///
/// The index is left unchanged and [`CodecError::IncompleteUnicode`] is
/// reported if the trailing surrogate is at `start`, or
/// [`CodecError::MalformedUnicode`] if the unit before it is not a leading
/// surrogate.
///
/// # Panics
///
/// If the index is not in `start..=units.len()`.
pub fn set_to_start(
    pos: &mut ParsingPosition,
    units: &[u16],
    start: usize,
) -> Result<(), CodecError> {
    let index = pos.index();
    check_bound(index, start, units.len(), units.len());
    pos.clear_error();

    if index == units.len() || !is_trailing(units[index]) {
        return Ok(());
    }
    if index == start {
        return Err(pos.fail_at(start, CodecError::IncompleteUnicode));
    }
    if !is_leading(units[index - 1]) {
        return Err(pos.fail_at(index - 1, CodecError::MalformedUnicode));
    }
    pos.set_index(index - 1);
    Ok(())
}

/// Moves the position forward to the end of the code point it is inside of.
///
/// A position between the halves of a pair moves past the trailing half;
/// any other position is left alone.
///
/// # Errors
///
/// The index is left unchanged and [`CodecError::MalformedUnicode`] is
/// reported if the position is on a trailing surrogate that does not follow
/// a leading one.
///
/// # Panics
///
/// If `end > units.len()` or the index is past `end`.
pub fn set_to_terminal(
    pos: &mut ParsingPosition,
    units: &[u16],
    end: usize,
) -> Result<(), CodecError> {
    let index = pos.index();
    check_bound(index, 0, end, units.len());
    pos.clear_error();

    if index == end || !is_trailing(units[index]) {
        return Ok(());
    }
    if index == 0 || !is_leading(units[index - 1]) {
        return Err(pos.fail_at(index, CodecError::MalformedUnicode));
    }
    pos.set_index(index + 1);
    Ok(())
}

/// Encodes `code_point` into `units` at `index`, returning the number of
/// units written.
///
/// Nothing is written on failure.
///
/// # Errors
///
/// [`CodecError::MalformedUnicode`] if `code_point` is above U+10FFFF or a
/// surrogate, [`CodecError::BufferOverflow`] if fewer units than needed
/// remain before `end`.
///
/// # Panics
///
/// If `end > units.len()` or `index > end`.
pub fn put(code_point: u32, index: usize, units: &mut [u16], end: usize) -> Result<usize, CodecError> {
    check_bound(index, 0, end, units.len());
    if code_point > MAX_CODE_POINT || is_surrogate(code_point) {
        return Err(CodecError::MalformedUnicode);
    }

    let len = len_of(code_point);
    if end - index < len {
        return Err(CodecError::BufferOverflow);
    }
    if len == 1 {
        #[allow(clippy::cast_possible_truncation)]
        {
            units[index] = code_point as u16;
        }
    } else {
        units[index] = decompose_high(code_point);
        units[index + 1] = decompose_low(code_point);
    }
    Ok(len)
}

/// Like [`put`], but writes at the position and moves it past the written
/// units.
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
    units: &mut [u16],
    end: usize,
) -> Result<usize, CodecError> {
    let index = pos.index();
    pos.clear_error();
    match put(code_point, index, units, end) {
        Ok(len) => {
            pos.set_index(index + len);
            Ok(len)
        }
        Err(err) => Err(pos.fail_at(index, err)),
    }
}

/// Writes `code_point` as one `\uXXXX` escape, or two for a supplementary
/// code point (its surrogate pair), using upper-case hex digits. Returns the
/// number of escapes written.
///
/// Lone surrogates are escaped as they are, which keeps the output usable
/// for diagnostics about ill-formed text.
///
/// ```
/// use textkit::utf16;
///
/// let mut out = String::new();
/// utf16::escape(0x1F600, &mut out).unwrap();
/// assert_eq!(out, "\\uD83D\\uDE00");
/// ```
///
/// # Errors
///
/// [`EscapeError::Codec`] if `code_point` is above U+10FFFF,
/// [`EscapeError::Format`] if `out` fails.
pub fn escape<W: fmt::Write + ?Sized>(code_point: u32, out: &mut W) -> Result<usize, EscapeError> {
    let (buf, len) = escape_bytes(code_point)?;
    for &b in &buf[..len] {
        out.write_char(char::from(b))?;
    }
    Ok(len / ESCAPE_LEN)
}

/// Returns the escape [`escape`] would write, as a new `String`.
///
/// # Errors
///
/// [`CodecError::MalformedUnicode`] if `code_point` is above U+10FFFF.
pub fn escaped(code_point: u32) -> Result<String, CodecError> {
    let (buf, len) = escape_bytes(code_point)?;
    Ok(buf[..len].iter().copied().map(char::from).collect())
}

fn escape_bytes(code_point: u32) -> Result<([u8; 2 * ESCAPE_LEN], usize), CodecError> {
    if code_point > MAX_CODE_POINT {
        return Err(CodecError::MalformedUnicode);
    }

    let mut buf = [0u8; 2 * ESCAPE_LEN];
    if code_point < SUPPLEMENTARY_MIN {
        #[allow(clippy::cast_possible_truncation)]
        write_escape(&mut buf[..ESCAPE_LEN], code_point as u16);
        Ok((buf, ESCAPE_LEN))
    } else {
        write_escape(&mut buf[..ESCAPE_LEN], decompose_high(code_point));
        write_escape(&mut buf[ESCAPE_LEN..], decompose_low(code_point));
        Ok((buf, 2 * ESCAPE_LEN))
    }
}

fn write_escape(dst: &mut [u8], unit: u16) {
    dst[0] = b'\\';
    dst[1] = b'u';
    for (slot, shift) in dst[2..].iter_mut().zip([12u16, 8, 4, 0]) {
        *slot = HEX_DIGITS[usize::from((unit >> shift) & 0xF)];
    }
}

#[cfg(test)]
mod tests {
    use alloc::{string::String, vec::Vec};

    use rstest::rstest;

    use super::*;
    use crate::ErrorCode;

    fn units(s: &str) -> Vec<u16> {
        s.encode_utf16().collect()
    }

    #[rstest]
    #[case(0x0041, true, false, false)]
    #[case(0xD7FF, true, false, false)]
    #[case(0xD800, false, true, false)]
    #[case(0xDBFF, false, true, false)]
    #[case(0xDC00, false, false, true)]
    #[case(0xDFFF, false, false, true)]
    #[case(0xE000, true, false, false)]
    #[case(0xFFFF, true, false, false)]
    fn classification(
        #[case] unit: u16,
        #[case] single: bool,
        #[case] leading: bool,
        #[case] trailing: bool,
    ) {
        assert_eq!(is_single(unit), single);
        assert_eq!(is_leading(unit), leading);
        assert_eq!(is_trailing(unit), trailing);
    }

    #[rstest]
    #[case(0x1_0000, 0xD800, 0xDC00)]
    #[case(0x1_F600, 0xD83D, 0xDE00)]
    #[case(0x10_FFFF, 0xDBFF, 0xDFFF)]
    fn surrogate_arithmetic(#[case] code_point: u32, #[case] high: u16, #[case] low: u16) {
        assert_eq!(decompose_high(code_point), high);
        assert_eq!(decompose_low(code_point), low);
        assert_eq!(compose(high, low), code_point);
    }

    #[test]
    fn forward_counts_units() {
        let text = units("a\u{1F600}b");
        let mut pos = ParsingPosition::new(0);
        assert_eq!(forward(&mut pos, &text, text.len()), Ok(1));
        assert_eq!(forward(&mut pos, &text, text.len()), Ok(2));
        assert_eq!(forward(&mut pos, &text, text.len()), Ok(1));
        assert_eq!(pos.index(), text.len());
        assert!(pos.success());
    }

    #[test]
    fn lone_trailing_is_malformed_at_itself() {
        let text = [0x61, 0xDC00, 0x62];
        let mut pos = ParsingPosition::new(1);
        assert_eq!(get_next(&mut pos, &text, 3), Err(CodecError::MalformedUnicode));
        assert_eq!(pos.index(), 1);
        assert_eq!(pos.error_index(), Some(1));
        assert_eq!(pos.error_code(), ErrorCode::MalformedUnicode);
    }

    #[test]
    fn unpaired_leading_is_malformed_at_partner() {
        let text = [0xD800, 0x0062];
        let mut pos = ParsingPosition::new(0);
        assert_eq!(forward(&mut pos, &text, 2), Err(CodecError::MalformedUnicode));
        assert_eq!(pos.index(), 0);
        assert_eq!(pos.error_index(), Some(1));
    }

    #[test]
    fn leading_at_bound_is_incomplete() {
        let text = units("\u{10400}");
        let mut pos = ParsingPosition::new(0);
        assert_eq!(get_next(&mut pos, &text, 1), Err(CodecError::IncompleteUnicode));
        assert_eq!(pos.index(), 0);
        assert_eq!(pos.error_index(), Some(1));
    }

    #[test]
    fn success_clears_previous_error() {
        let text = [0xDC00, 0x0061];
        let mut pos = ParsingPosition::new(0);
        assert!(get_next(&mut pos, &text, 2).is_err());
        pos.set_index(1);
        assert_eq!(get_next(&mut pos, &text, 2), Ok(0x61));
        assert!(pos.success());
        assert_eq!(pos.error_index(), None);
    }

    #[test]
    fn backward_decodes_pairs() {
        let text = units("x\u{1F600}");
        let mut pos = ParsingPosition::new(text.len());
        assert_eq!(get_previous(&mut pos, &text, 0), Ok(0x1F600));
        assert_eq!(pos.index(), 1);
        assert_eq!(backward(&mut pos, &text, 0), Ok(1));
        assert_eq!(pos.index(), 0);
    }

    #[rstest]
    #[case::lone_leading(&[0x61, 0xD800], 0, Err(CodecError::MalformedUnicode), Some(1))]
    #[case::unpaired_trailing(&[0x61, 0xDC00], 0, Err(CodecError::MalformedUnicode), Some(0))]
    #[case::trailing_at_start(&[0x61, 0xDC00], 1, Err(CodecError::IncompleteUnicode), Some(1))]
    #[case::plain(&[0x61, 0x62], 0, Ok(0x62), None)]
    fn get_previous_errors(
        #[case] text: &[u16],
        #[case] start: usize,
        #[case] expected: Result<u32, CodecError>,
        #[case] error_index: Option<usize>,
    ) {
        let mut pos = ParsingPosition::new(text.len());
        assert_eq!(get_previous(&mut pos, text, start), expected);
        assert_eq!(pos.error_index(), error_index);
        if expected.is_err() {
            assert_eq!(pos.index(), text.len());
        }
    }

    #[test]
    fn set_to_start_snaps_to_leading() {
        let text = units("a\u{1F600}");
        let mut pos = ParsingPosition::new(2);
        assert_eq!(set_to_start(&mut pos, &text, 0), Ok(()));
        assert_eq!(pos.index(), 1);
        assert_eq!(set_to_start(&mut pos, &text, 0), Ok(()));
        assert_eq!(pos.index(), 1);

        pos.set_index(text.len());
        assert_eq!(set_to_start(&mut pos, &text, 0), Ok(()));
        assert_eq!(pos.index(), text.len());
    }

    #[test]
    fn set_to_start_failures_keep_index() {
        let text = [0x61, 0xDC00];
        let mut pos = ParsingPosition::new(1);
        assert_eq!(set_to_start(&mut pos, &text, 0), Err(CodecError::MalformedUnicode));
        assert_eq!(pos.index(), 1);
        assert_eq!(pos.error_index(), Some(0));

        assert_eq!(set_to_start(&mut pos, &text, 1), Err(CodecError::IncompleteUnicode));
        assert_eq!(pos.index(), 1);
    }

    #[test]
    fn set_to_terminal_skips_trailing_half() {
        let text = units("\u{1F600}z");
        let mut pos = ParsingPosition::new(1);
        assert_eq!(set_to_terminal(&mut pos, &text, text.len()), Ok(()));
        assert_eq!(pos.index(), 2);
        assert_eq!(set_to_terminal(&mut pos, &text, text.len()), Ok(()));
        assert_eq!(pos.index(), 2);

        let lone = [0xDC00, 0x61];
        let mut pos = ParsingPosition::new(0);
        assert_eq!(set_to_terminal(&mut pos, &lone, 2), Err(CodecError::MalformedUnicode));
        assert_eq!(pos.index(), 0);
    }

    #[rstest]
    #[case(0x41, &[0x41])]
    #[case(0xFFFF, &[0xFFFF])]
    #[case(0x1_0000, &[0xD800, 0xDC00])]
    #[case(0x10_FFFF, &[0xDBFF, 0xDFFF])]
    fn put_writes_units(#[case] code_point: u32, #[case] expected: &[u16]) {
        let mut buf = [0u16; 4];
        assert_eq!(put(code_point, 1, &mut buf, 4), Ok(expected.len()));
        assert_eq!(&buf[1..=expected.len()], expected);
    }

    #[rstest]
    #[case(0x11_0000)]
    #[case(0xD800)]
    #[case(0xDFFF)]
    fn put_rejects_invalid_code_points(#[case] code_point: u32) {
        let mut buf = [0u16; 2];
        assert_eq!(put(code_point, 0, &mut buf, 2), Err(CodecError::MalformedUnicode));
        assert_eq!(buf, [0, 0]);
    }

    #[test]
    fn put_overflow_writes_nothing() {
        let mut buf = [7u16; 3];
        assert_eq!(put(0x1F600, 2, &mut buf, 3), Err(CodecError::BufferOverflow));
        assert_eq!(buf, [7, 7, 7]);
    }

    #[test]
    fn put_next_advances_or_records() {
        let mut buf = [0u16; 3];
        let mut pos = ParsingPosition::new(0);
        assert_eq!(put_next(&mut pos, 0x1F600, &mut buf, 3), Ok(2));
        assert_eq!(pos.index(), 2);
        assert_eq!(put_next(&mut pos, 0x1F600, &mut buf, 3), Err(CodecError::BufferOverflow));
        assert_eq!(pos.index(), 2);
        assert_eq!(pos.error_code(), ErrorCode::BufferOverflow);
        assert_eq!(pos.error_index(), Some(2));
    }

    #[rstest]
    #[case(0x0, "\\u0000", 1)]
    #[case(0xE9, "\\u00E9", 1)]
    #[case(0xABCD, "\\uABCD", 1)]
    #[case(0xD800, "\\uD800", 1)]
    #[case(0x10_FFFF, "\\uDBFF\\uDFFF", 2)]
    fn escape_writes_upper_hex(#[case] code_point: u32, #[case] expected: &str, #[case] count: usize) {
        let mut out = String::new();
        assert_eq!(escape(code_point, &mut out), Ok(count));
        assert_eq!(out, expected);
        assert_eq!(escaped(code_point).as_deref(), Ok(expected));
    }

    #[test]
    fn escape_rejects_out_of_range() {
        let mut out = String::new();
        assert_eq!(
            escape(0x11_0000, &mut out),
            Err(EscapeError::Codec(CodecError::MalformedUnicode))
        );
        assert!(out.is_empty());
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn reading_at_end_panics() {
        let text = [0x61];
        let mut pos = ParsingPosition::new(1);
        let _ = get_next(&mut pos, &text, 1);
    }
}
