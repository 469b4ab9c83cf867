//! Large operators (`\sum`, `\int`) and named operators (`\lim`, `\sin`).

use crate::atom::{Atom, AtomPath, Branch, Limits, OpAtom, is_character_list};
use crate::box_tree::{BoxType, FontFamily, MathBox};
use crate::build_common::make_symbol;
use crate::context::Context;
use crate::decompose::{branch_box, decompose_branch};
use crate::functions::supsub;
use crate::functions::utils::assemble_sup_sub;
use crate::style::DISPLAY;
use crate::types::{CssProperty, LayoutError};
use crate::units::make_em;

/// Whether the scripts of the operator are stacked as limits.
const fn has_limits(limits: Limits, display: bool) -> bool {
    match limits {
        Limits::Auto => display,
        Limits::Limits => true,
        Limits::NoLimits => false,
    }
}

/// Render an operator together with its scripts.
pub fn render(
    ctx: &Context,
    atom: &Atom,
    op: &OpAtom,
    path: &AtomPath,
) -> Result<MathBox, LayoutError> {
    let display = ctx.mathstyle.size == DISPLAY.size;

    let (mut base, slant, base_shift) = if let Some(symbol) = &op.symbol {
        let large = display && !op.small;
        let font = if large {
            FontFamily::Size2
        } else {
            FontFamily::Size1
        };
        let mut base = make_symbol(ctx, symbol, font, atom.mode, Some(BoxType::Mop))?;
        base.classes.extend([
            "op-symbol".to_owned(),
            if large { "large-op" } else { "small-op" }.to_owned(),
        ]);
        // Center the glyph on the axis.
        let base_shift = (base.height - base.depth) / 2.0 - ctx.font_metrics().axis_height;
        let slant = base.italic;
        (base, slant, base_shift)
    } else {
        let body = op.body.as_deref().unwrap_or_default();
        let boxes = if body.is_empty() {
            vec![]
        } else {
            decompose_branch(ctx, atom, body, path, Branch::Body)?
        };
        let mut base = MathBox::from_children(boxes);
        base.box_type = Some(BoxType::Mop);
        (base, 0.0, 0.0)
    };

    if has_limits(op.limits, display) {
        let sup = atom
            .superscript
            .as_deref()
            .map(|list| branch_box(&ctx.sup(), atom, list, path, Branch::Superscript))
            .transpose()?;
        let sub = atom
            .subscript
            .as_deref()
            .map(|list| branch_box(&ctx.sub(), atom, list, path, Branch::Subscript))
            .transpose()?;
        if sup.is_none() && sub.is_none() {
            return Ok(shifted(base, base_shift));
        }
        let sub_is_single_character = atom.subscript.as_deref().is_some_and(is_character_list);
        base.box_type = None;
        let mut stacked = assemble_sup_sub(
            ctx,
            base,
            sup,
            sub,
            sub_is_single_character,
            slant,
            base_shift,
            vec!["op-limits".to_owned()],
        )?;
        stacked.box_type = Some(BoxType::Mop);
        return Ok(stacked);
    }

    base = shifted(base, base_shift);
    if atom.superscript.is_some() || atom.subscript.is_some() {
        supsub::attach(ctx, atom, path, base)
    } else {
        Ok(base)
    }
}

/// Move a box down by `shift`, keeping its extent relative to the baseline.
pub(super) fn shifted(mut base: MathBox, shift: f64) -> MathBox {
    if shift != 0.0 {
        base.style.insert(CssProperty::Position, "relative");
        base.style.insert(CssProperty::Top, make_em(shift));
        base.height -= shift;
        base.depth += shift;
    }
    base
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::adopt;
    use crate::box_tree::BoxContent;
    use crate::decompose::decompose;

    fn laid_out(ctx: &Context, atom: Atom) -> MathBox {
        let atoms = adopt(vec![atom], Branch::Body);
        decompose(ctx, &atoms).unwrap().unwrap().remove(1)
    }

    fn sum() -> Atom {
        Atom::op_symbol("\u{2211}", Limits::Auto)
            .with_sub(vec![Atom::ord("i")])
            .with_sup(vec![Atom::ord("n")])
    }

    #[test]
    fn display_sum_stacks_its_limits() {
        let ctx = Context::builder().mathstyle(DISPLAY).build();
        let node = laid_out(&ctx, sum());
        assert!(node.has_class("op-limits"));
        assert_eq!(node.box_type, Some(BoxType::Mop));
        let glyph = laid_out(&ctx, Atom::op_symbol("\u{2211}", Limits::Auto));
        assert!(glyph.has_class("large-op"));
        assert!(matches!(glyph.content, BoxContent::Text { font: FontFamily::Size2, .. }));
    }

    #[test]
    fn text_sum_attaches_scripts_at_the_corner() {
        let node = laid_out(&Context::default(), sum());
        assert!(!node.has_class("op-limits"));
        assert_eq!(node.box_type, Some(BoxType::Mop));
        assert!(node.children()[1].has_class("msupsub"));
    }

    #[test]
    fn explicit_limits_override_the_style() {
        let limits = Atom::op_symbol("\u{2211}", Limits::Limits).with_sub(vec![Atom::ord("i")]);
        assert!(laid_out(&Context::default(), limits).has_class("op-limits"));

        let display = Context::builder().mathstyle(DISPLAY).build();
        let nolimits = Atom::op_symbol("\u{2211}", Limits::NoLimits).with_sub(vec![Atom::ord("i")]);
        assert!(!laid_out(&display, nolimits).has_class("op-limits"));
    }

    #[test]
    fn integral_limits_are_slanted() {
        let ctx = Context::builder().mathstyle(DISPLAY).build();
        let integral = Atom::op_symbol("\u{222b}", Limits::Limits)
            .with_sub(vec![Atom::ord("0")])
            .with_sup(vec![Atom::ord("1")]);
        let node = laid_out(&ctx, integral);
        let vlist = node.children().last().unwrap().vlist().unwrap();
        let slant = vlist.rows[1].elem.children()[0].italic;
        assert!(slant > 0.0);
        assert_eq!(vlist.rows[0].margin_left, Some(-slant));
        assert_eq!(vlist.rows[2].margin_left, Some(slant));
    }

    #[test]
    fn named_operator_is_upright() {
        let node = laid_out(&Context::default(), Atom::op_named("lim", Limits::Auto));
        assert_eq!(node.box_type, Some(BoxType::Mop));
        let text: Vec<_> = node.children().iter().filter_map(MathBox::text).collect();
        assert_eq!(text, ["lim"]);
    }
}
