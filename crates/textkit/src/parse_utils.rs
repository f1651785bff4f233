//! Blank skipping over UTF-16 text.
//!
//! Both scanners walk the text with [`utf16::get_next`], so a blank outside
//! the BMP is classified as one code point and a cursor is never left
//! between the halves of a surrogate pair.

use crate::{error::CodecError, position::ParsingPosition, utf16};

/// `true` if `code_point` has the Unicode `White_Space` property.
#[must_use]
pub fn is_blank(code_point: u32) -> bool {
    char::from_u32(code_point).is_some_and(char::is_whitespace)
}

/// Advances the position past blank code points. Stops on the first
/// non-blank code point or at `end`.
///
/// ```
/// use textkit::{parse_utils, ParsingPosition};
///
/// let units: Vec<u16> = " \u{3000}\tkey".encode_utf16().collect();
/// let mut pos = ParsingPosition::new(0);
/// parse_utils::skip_blanks(&mut pos, &units, units.len()).unwrap();
/// assert_eq!(pos.index(), 3);
/// ```
///
/// # Errors
///
/// Any error of [`utf16::get_next`]; the position is left on the start of
/// the ill-formed code point with the error recorded.
///
/// # Panics
///
/// If `end > units.len()` or the index is past `end`.
pub fn skip_blanks(
    pos: &mut ParsingPosition,
    units: &[u16],
    end: usize,
) -> Result<(), CodecError> {
    skip_while(pos, units, end, is_blank)
}

/// Advances the position past non-blank code points. Stops on the first
/// blank code point or at `end`.
///
/// # Errors
///
/// As for [`skip_blanks`].
///
/// # Panics
///
/// As for [`skip_blanks`].
pub fn skip_non_blanks(
    pos: &mut ParsingPosition,
    units: &[u16],
    end: usize,
) -> Result<(), CodecError> {
    skip_while(pos, units, end, |code_point| !is_blank(code_point))
}

fn skip_while(
    pos: &mut ParsingPosition,
    units: &[u16],
    end: usize,
    pred: impl Fn(u32) -> bool,
) -> Result<(), CodecError> {
    assert!(
        pos.index() <= end && end <= units.len(),
        "index {} out of bounds 0..={end}",
        pos.index()
    );
    pos.clear_error();
    while pos.index() < end {
        let index = pos.index();
        if !pred(utf16::get_next(pos, units, end)?) {
            pos.set_index(index);
            break;
        }
    }
    Ok(())
}
