//! Limits stacked above and below a nucleus.
//!
//! Used for operators with limits and for over/under stacks. The spacing
//! follows rule 13a of the TeXbook, appendix G, through the
//! `big_op_spacing` font parameters.

use crate::box_tree::MathBox;
use crate::build_common::{make_kern, make_span};
use crate::context::Context;
use crate::types::LayoutError;
use crate::vlist::{VListChild, VListElem, VListParam, make_vlist};

/// A limit with the kern separating it from the nucleus.
struct Limit {
    elem: MathBox,
    kern: f64,
}

/// Stack `sup` above and `sub` below `base`.
///
/// # Parameters
///
/// * `ctx` - context of the nucleus; all boxes are measured in its ems
/// * `base` - the nucleus
/// * `sup` - content above, already laid out
/// * `sub` - content below, already laid out
/// * `sub_is_single_character` - whether `sub` is a single glyph
/// * `slant` - horizontal offset of the limits, `+slant` above and `-slant`
///   below
/// * `base_shift` - vertical shift applied to the nucleus
/// * `classes` - classes of the resulting box
///
/// Without limits the base is returned as is.
#[expect(clippy::too_many_arguments)]
pub fn assemble_sup_sub(
    ctx: &Context,
    base: MathBox,
    sup: Option<MathBox>,
    sub: Option<MathBox>,
    sub_is_single_character: bool,
    slant: f64,
    base_shift: f64,
    classes: Vec<String>,
) -> Result<MathBox, LayoutError> {
    let metrics = ctx.font_metrics();
    let base = make_span(vec![], vec![base], Some(ctx));
    let base_height = base.height;
    let base_depth = base.depth;

    let sup = sup.map(|elem| Limit {
        kern: metrics
            .big_op_spacing1
            .max(metrics.big_op_spacing3 - elem.depth),
        elem,
    });
    let sub = sub.map(|elem| Limit {
        kern: metrics
            .big_op_spacing2
            .max(metrics.big_op_spacing4 - elem.height),
        elem,
    });
    let has_sub = sub.is_some();

    let lower = |elem: MathBox| -> VListChild {
        VListElem::builder(elem).margin_left(-slant).build().into()
    };
    let upper = |elem: MathBox| -> VListChild {
        VListElem::builder(elem).margin_left(slant).build().into()
    };

    let stack = match (sup, sub) {
        (Some(sup), Some(sub)) => {
            let bottom = metrics.big_op_spacing5
                + sub.elem.total_height()
                + sub.kern
                + base_depth
                + base_shift;
            make_vlist(VListParam::Bottom {
                position_data: bottom,
                children: vec![
                    VListChild::Kern(metrics.big_op_spacing5),
                    lower(sub.elem),
                    VListChild::Kern(sub.kern),
                    base.into(),
                    VListChild::Kern(sup.kern),
                    upper(sup.elem),
                    VListChild::Kern(metrics.big_op_spacing5),
                ],
            })?
        }
        (None, Some(sub)) => make_vlist(VListParam::Top {
            position_data: base_height - base_shift,
            children: vec![
                VListChild::Kern(metrics.big_op_spacing5),
                lower(sub.elem),
                VListChild::Kern(sub.kern),
                base.into(),
            ],
        })?,
        (Some(sup), None) => make_vlist(VListParam::Bottom {
            position_data: base_depth + base_shift,
            children: vec![
                base.into(),
                VListChild::Kern(sup.kern),
                upper(sup.elem),
                VListChild::Kern(metrics.big_op_spacing5),
            ],
        })?,
        (None, None) => return Ok(base),
    };

    let mut parts = vec![stack];
    if has_sub && slant != 0.0 && !sub_is_single_character {
        // Keep the shifted subscript clear of what precedes the operator.
        parts.insert(0, make_kern(slant));
    }
    Ok(make_span(classes, parts, Some(ctx)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::box_tree::BoxContent;

    fn strut(height: f64, depth: f64, width: f64) -> MathBox {
        MathBox::builder(BoxContent::Empty)
            .height(height)
            .depth(depth)
            .width(width)
            .build()
    }

    #[test]
    fn limits_clear_the_nucleus() {
        let ctx = Context::default();
        let metrics = ctx.font_metrics();
        let stacked = assemble_sup_sub(
            &ctx,
            strut(1.0, 0.5, 1.0),
            Some(strut(0.4, 0.1, 0.5)),
            Some(strut(0.4, 0.1, 0.5)),
            true,
            0.0,
            0.0,
            vec!["mop".to_owned(), "op-limits".to_owned()],
        )
        .unwrap();
        assert!(stacked.has_class("op-limits"));
        let sup_kern = metrics.big_op_spacing1.max(metrics.big_op_spacing3 - 0.1);
        let expected = 1.0 + sup_kern + 0.5 + metrics.big_op_spacing5;
        assert!((stacked.height - expected).abs() < 1e-9);
        assert_eq!(stacked.children().len(), 1);
    }

    #[test]
    fn slanted_lower_limit_gets_a_spacer() {
        let ctx = Context::default();
        let stacked = assemble_sup_sub(
            &ctx,
            strut(1.0, 0.5, 1.0),
            None,
            Some(strut(0.4, 0.1, 2.0)),
            false,
            0.2,
            0.0,
            vec![],
        )
        .unwrap();
        let children = stacked.children();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].width, Some(0.2));
        let rows = &children[1].vlist().unwrap().rows;
        assert_eq!(rows[0].margin_left, Some(-0.2));
    }

    #[test]
    fn without_limits_the_base_is_returned() {
        let ctx = Context::default();
        let base =
            assemble_sup_sub(&ctx, strut(1.0, 0.5, 1.0), None, None, false, 0.0, 0.0, vec![])
                .unwrap();
        assert!((base.height - 1.0).abs() < 1e-12);
    }
}
