//! Radicals, rule 11 of the TeXbook, appendix G.

use crate::atom::{Atom, AtomPath, Branch, SurdAtom};
use crate::box_tree::{BoxType, MathBox};
use crate::build_common::make_span;
use crate::context::Context;
use crate::decompose::branch_box;
use crate::delimiter::{SqrtImage, make_sqrt_image};
use crate::style::{DISPLAY, SCRIPTSCRIPT};
use crate::types::{CssProperty, LayoutError};
use crate::units::make_em;
use crate::vlist::{VListChild, VListElem, VListParam, make_vlist};

/// Kern before the index, from the definition of `\r@@t`
const INDEX_KERN_BEFORE: f64 = 5.0 / 18.0;
/// Kern between the index and the radical sign
const INDEX_KERN_AFTER: f64 = -10.0 / 18.0;

/// Render a radical with its optional index.
pub fn render(
    ctx: &Context,
    atom: &Atom,
    surd: &SurdAtom,
    path: &AtomPath,
) -> Result<MathBox, LayoutError> {
    let metrics = ctx.font_metrics();
    let mut inner = branch_box(&ctx.cramp(), atom, &surd.body, path, Branch::Body)?;
    if inner.height == 0.0 {
        // An empty radicand still gets a radical of normal height.
        inner.height = metrics.x_height;
    }

    let theta = metrics.default_rule_thickness;
    let phi = if ctx.mathstyle.size == DISPLAY.size {
        metrics.x_height
    } else {
        theta
    };
    let mut line_clearance = theta + phi / 4.0;
    let min_delimiter_height = inner.total_height() + line_clearance + theta;

    let SqrtImage {
        image: mut img,
        rule_width,
        advance_width,
    } = make_sqrt_image(ctx, min_delimiter_height)?;

    // Centre the radicand in whatever extra room the radical sign leaves.
    let delim_depth = img.height - rule_width;
    if delim_depth > inner.total_height() + line_clearance {
        line_clearance = (line_clearance + delim_depth - inner.total_height()) / 2.0;
    }
    let img_shift = img.height - inner.height - line_clearance - rule_width;

    inner
        .style
        .insert(CssProperty::PaddingLeft, make_em(advance_width));
    inner.width = inner.width.map(|width| width + advance_width);
    img.width = inner.width;
    let inner_height = inner.height;

    let body = make_vlist(VListParam::FirstBaseline {
        children: vec![
            VListElem::builder(inner)
                .wrapper_classes(vec!["svg-align".to_owned()])
                .build()
                .into(),
            VListChild::Kern(-(inner_height + img_shift)),
            img.into(),
            VListChild::Kern(rule_width),
        ],
    })?;

    let children = match &surd.index {
        None => vec![body],
        Some(index) => {
            let index_ctx = ctx.with_mathstyle(SCRIPTSCRIPT);
            let index = branch_box(&index_ctx, atom, index, path, Branch::Index)?;
            let to_shift = 0.6 * (body.height - body.depth);
            let raised = make_vlist(VListParam::Shift {
                position_data: -to_shift,
                children: vec![index.into()],
            })?;
            let mut root = make_span(vec!["root".to_owned()], vec![raised], Some(ctx));
            root.style
                .insert(CssProperty::MarginLeft, make_em(INDEX_KERN_BEFORE));
            root.style
                .insert(CssProperty::MarginRight, make_em(INDEX_KERN_AFTER));
            root.width = root
                .width
                .map(|width| width + INDEX_KERN_BEFORE + INDEX_KERN_AFTER);
            vec![root, body]
        }
    };

    let mut node = make_span(vec!["sqrt".to_owned()], children, Some(ctx));
    node.box_type = Some(BoxType::Mord);
    Ok(node)
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

    fn radical(node: &MathBox) -> &MathBox {
        let body = node.children().last().unwrap();
        &body.vlist().unwrap().rows[1].elem
    }

    #[test]
    fn radical_covers_the_radicand() {
        let ctx = Context::default();
        let node = laid_out(&ctx, Atom::surd(vec![Atom::ord("x")], None));
        assert!(node.has_class("sqrt"));
        assert_eq!(node.box_type, Some(BoxType::Mord));
        let rows = &node.children()[0].vlist().unwrap().rows;
        let inner = &rows[0].elem;
        assert_eq!(rows[0].wrapper_classes, ["svg-align"]);
        assert!(inner.style.get(CssProperty::PaddingLeft).is_some());
        assert!(matches!(rows[1].elem.content, BoxContent::Svg(_)));
        // The rule sits above the radicand with clearance to spare.
        let theta = ctx.font_metrics().default_rule_thickness;
        assert!(node.height >= inner.height + theta);
    }

    #[test]
    fn tall_radicand_picks_a_larger_sign() {
        let ctx = Context::default();
        let small = laid_out(&ctx, Atom::surd(vec![Atom::ord("x")], None));
        let frac = Atom::frac(vec![Atom::ord("1")], vec![Atom::ord("2")]);
        let tall = laid_out(&ctx, Atom::surd(vec![frac], None));
        assert!(radical(&tall).total_height() > radical(&small).total_height());
    }

    #[test]
    fn empty_radicand_gets_x_height() {
        let ctx = Context::default();
        let node = laid_out(&ctx, Atom::surd(vec![], None));
        let inner = &node.children()[0].vlist().unwrap().rows[0].elem;
        assert_eq!(inner.height, ctx.font_metrics().x_height);
    }

    #[test]
    fn index_is_raised_in_scriptscript() {
        let ctx = Context::default();
        let node = laid_out(
            &ctx,
            Atom::surd(vec![Atom::ord("x")], Some(vec![Atom::ord("3")])),
        );
        let children = node.children();
        assert_eq!(children.len(), 2);
        let root = &children[0];
        assert!(root.has_class("root"));
        let body = &children[1];
        let shift = root.children()[0].vlist().unwrap().rows[0].shift;
        assert!((shift + 0.6 * (body.height - body.depth)).abs() < 1e-9);
        // The index glyph is laid out at half size.
        let index = &root.children()[0].vlist().unwrap().rows[0].elem;
        assert!(index.max_font_size <= 0.5 + 1e-12);
    }
}
