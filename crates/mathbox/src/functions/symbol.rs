//! Symbols: letters, digits, operators and punctuation.

use phf::{Map, phf_map};

use crate::atom::{Atom, AtomClass};
use crate::box_tree::{FontFamily, MathBox};
use crate::build_common::{make_symbol, symbol_font};
use crate::context::Context;
use crate::types::{LayoutError, Mode};

/// ASCII input drawn with a different glyph in math mode
static MATH_GLYPHS: Map<&'static str, &'static str> = phf_map! {
    "-" => "\u{2212}",
    "*" => "\u{2217}",
    "'" => "\u{2032}",
};

/// Render a symbol atom as a glyph run of its class.
///
/// The font comes from the atom's font override, or else from the first
/// character: math-mode letters are italic, everything else is upright.
pub fn render(
    ctx: &Context,
    atom: &Atom,
    class: AtomClass,
    text: &str,
) -> Result<MathBox, LayoutError> {
    let text = match atom.mode {
        Mode::Math => MATH_GLYPHS.get(text).copied().unwrap_or(text),
        Mode::Text => text,
    };
    let font = text
        .chars()
        .next()
        .map_or(FontFamily::MainRegular, |ch| {
            symbol_font(atom.mode, ch, atom.style.font)
        });
    make_symbol(ctx, text, font, atom.mode, Some(class.into()))
}
