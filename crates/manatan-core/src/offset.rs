//! Click position to lookup offset.
//!
//! Caret APIs report UTF-16 code units. The lookup service indexes UTF-8
//! bytes, so every offset is converted before it leaves this module.

use manatan_types::{Point, Rect};

/// Caret queries against the rendered text of one region or caption.
pub trait CaretProvider {
    /// UTF-16 offset of the caret nearest `point`, if the point hits text.
    fn caret_offset(&self, point: Point) -> Option<usize>;
    /// Glyph box of the character starting at UTF-16 offset `start`.
    fn char_box(&self, start: usize) -> Option<Rect>;
}

fn utf16_len(text: &str) -> usize {
    text.chars().map(char::len_utf16).sum()
}

/// UTF-16 start of the character that ends at `offset`.
fn previous_char_start(text: &str, offset: usize) -> Option<usize> {
    let mut units = 0;
    for ch in text.chars() {
        let next = units + ch.len_utf16();
        if next >= offset {
            return (next == offset).then_some(units);
        }
        units = next;
    }
    None
}

/// Caret offset in UTF-16 units, corrected for clicks on the right half
/// of a glyph that the caret API attributes to the next boundary.
pub fn resolve_char_offset(text: &str, caret: &dyn CaretProvider, point: Point) -> usize {
    if text.is_empty() {
        return 0;
    }
    let Some(offset) = caret.caret_offset(point) else {
        tracing::debug!("no caret at click point, using offset 0");
        return 0;
    };
    let offset = offset.min(utf16_len(text));
    if offset == 0 {
        return 0;
    }

    match previous_char_start(text, offset) {
        Some(start) if caret.char_box(start).is_some_and(|b| b.contains(point)) => start,
        _ => offset,
    }
}

/// Byte length of the UTF-8 prefix covering `utf16_offset` code units.
/// An offset inside a surrogate pair rounds down to the pair's start.
pub fn utf16_to_byte_offset(text: &str, utf16_offset: usize) -> usize {
    let mut units = 0;
    for (byte, ch) in text.char_indices() {
        let next = units + ch.len_utf16();
        if next > utf16_offset {
            return byte;
        }
        units = next;
    }
    text.len()
}

/// Click point straight to the byte offset a lookup request carries.
pub fn resolve_byte_offset(text: &str, caret: &dyn CaretProvider, point: Point) -> usize {
    utf16_to_byte_offset(text, resolve_char_offset(text, caret, point))
}
