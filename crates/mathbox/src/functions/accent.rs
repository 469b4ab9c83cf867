//! Accents over a body: `\hat`, `\tilde`, `\vec`, ...
//!
//! Rule 12 of the TeXbook, appendix G. The accent is lowered onto the body
//! by `min(h, x_height)` and, when the body is a single glyph, shifted right
//! by that glyph's skew.

use crate::atom::{AccentAtom, Atom, AtomPath, Branch, is_character_list};
use crate::box_tree::{BoxContent, BoxType, FontFamily, MathBox};
use crate::build_common::{make_span, make_symbol};
use crate::context::Context;
use crate::decompose::branch_box;
use crate::types::LayoutError;
use crate::vlist::{VListChild, VListElem, VListParam, make_vlist};

/// Skew of the single glyph inside `node`, looking through wrappers and
/// caret anchors.
fn glyph_skew(node: &MathBox) -> f64 {
    match &node.content {
        BoxContent::Text { .. } => node.skew,
        BoxContent::Children(children) => children
            .iter()
            .rev()
            .find(|child| !child.is_first())
            .map_or(0.0, glyph_skew),
        _ => 0.0,
    }
}

/// Render an accent atom.
pub fn render(
    ctx: &Context,
    atom: &Atom,
    accent: &AccentAtom,
    path: &AtomPath,
) -> Result<MathBox, LayoutError> {
    let body = branch_box(&ctx.cramp(), atom, &accent.body, path, Branch::Body)?;

    let skew = if is_character_list(&accent.body) {
        glyph_skew(&body)
    } else {
        0.0
    };
    let clearance = body.height.min(ctx.font_metrics().x_height);

    let mut glyph = make_symbol(
        ctx,
        accent.accent.encode_utf8(&mut [0; 4]),
        FontFamily::MainRegular,
        atom.mode,
        None,
    )?;
    // The italic correction would only push the accent off centre.
    glyph.italic = 0.0;
    let accent_body = make_span(vec!["accent-body".to_owned()], vec![glyph], None);

    let vlist = make_vlist(VListParam::FirstBaseline {
        children: vec![
            body.into(),
            VListChild::Kern(-clearance),
            VListElem::builder(accent_body)
                .margin_left(skew)
                .build()
                .into(),
        ],
    })?;

    let mut node = make_span(vec!["accent".to_owned()], vec![vlist], Some(ctx));
    node.box_type = Some(BoxType::Mord);
    Ok(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::adopt;
    use crate::decompose::decompose;

    fn laid_out(atom: Atom) -> MathBox {
        let atoms = adopt(vec![atom], Branch::Body);
        decompose(&Context::default(), &atoms).unwrap().unwrap().remove(1)
    }

    fn rows(node: &MathBox) -> &[crate::box_tree::VListRow] {
        &node.children()[0].vlist().unwrap().rows
    }

    #[test]
    fn accent_over_single_glyph_follows_skew() {
        let node = laid_out(Atom::accent('\u{2c6}', vec![Atom::ord("f")]));
        assert!(node.has_class("accent"));
        assert_eq!(node.box_type, Some(BoxType::Mord));
        let accent_row = &rows(&node)[1];
        assert!((accent_row.margin_left.unwrap() - 0.16667).abs() < 1e-9);
        assert!(accent_row.elem.has_class("accent-body"));
        assert_eq!(accent_row.elem.children()[0].italic, 0.0);
    }

    #[test]
    fn accent_over_several_glyphs_is_not_skewed() {
        let node = laid_out(Atom::accent(
            '\u{2dc}',
            vec![Atom::ord("f"), Atom::ord("g")],
        ));
        assert_eq!(rows(&node)[1].margin_left, Some(0.0));
    }

    #[test]
    fn clearance_is_capped_at_x_height() {
        let ctx = Context::default();
        let x_height = ctx.font_metrics().x_height;
        let low = laid_out(Atom::accent('\u{2c6}', vec![Atom::ord("x")]));
        let tall = laid_out(Atom::accent('\u{2c6}', vec![Atom::ord("l")]));
        let tall_body = rows(&tall)[0].elem.height;
        assert!(tall_body > x_height);
        // Only the part of the body above x_height raises the accent.
        let shift_low = -rows(&low)[1].shift;
        let shift_tall = -rows(&tall)[1].shift;
        assert!((shift_tall - shift_low - (tall_body - x_height)).abs() < 1e-9);
    }

    #[test]
    fn accent_body_is_cramped() {
        let node = laid_out(Atom::accent(
            '\u{2c6}',
            vec![Atom::ord("x").with_sup(vec![Atom::ord("2")])],
        ));
        let plain = laid_out(Atom::ord("x").with_sup(vec![Atom::ord("2")]));
        let body = &rows(&node)[0].elem;
        assert!(body.height < plain.height);
    }
}
