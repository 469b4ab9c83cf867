//! Superscripts and subscripts attached at the corner of a nucleus.
//!
//! Implements rules 18a-f of the TeXbook, appendix G. The scripts are laid
//! out in the styles `ctx.sup()` and `ctx.sub()` and come back measured in
//! the ems of `ctx`, the context of the nucleus.

use crate::atom::{Atom, AtomPath, Branch};
use crate::box_tree::{BoxContent, BoxType, MathBox};
use crate::build_common::make_span;
use crate::context::Context;
use crate::decompose::branch_box;
use crate::style::DISPLAY;
use crate::types::LayoutError;
use crate::vlist::{VListElem, VListElemAndShift, VListParam, make_vlist};

/// Attach the scripts of `atom` to its already rendered `nucleus`.
///
/// The result is a box of the nucleus's spacing class holding the nucleus
/// followed by an `msupsub` column.
pub fn attach(
    ctx: &Context,
    atom: &Atom,
    path: &AtomPath,
    mut nucleus: MathBox,
) -> Result<MathBox, LayoutError> {
    let sup_ctx = ctx.sup();
    let sub_ctx = ctx.sub();
    let supm = atom
        .superscript
        .as_deref()
        .map(|list| branch_box(&sup_ctx, atom, list, path, Branch::Superscript))
        .transpose()?;
    let subm = atom
        .subscript
        .as_deref()
        .map(|list| branch_box(&sub_ctx, atom, list, path, Branch::Subscript))
        .transpose()?;

    let metrics = ctx.font_metrics();

    // Rule 18a: scripts of a compound nucleus hang from its edges.
    let (mut sup_shift, mut sub_shift) = if atom.is_character_box() {
        (0.0, 0.0)
    } else {
        (
            nucleus.height - sup_ctx.font_metrics().sup_drop * sup_ctx.parent_scale(),
            nucleus.depth + sub_ctx.font_metrics().sub_drop * sub_ctx.parent_scale(),
        )
    };

    let min_sup_shift = if ctx.mathstyle.id == DISPLAY.id {
        metrics.sup1
    } else if ctx.mathstyle.cramped {
        metrics.sup3
    } else {
        metrics.sup2
    };

    // \scriptspace is 0.5pt at the normal size.
    let margin_right = 0.5 / metrics.pt_per_em / ctx.size_multiplier;

    // A subscript tucks under the italic overhang of a single glyph.
    let margin_left = if matches!(nucleus.content, BoxContent::Text { .. }) {
        Some(-nucleus.italic)
    } else {
        None
    };

    let supsub = match (supm, subm) {
        (Some(supm), Some(subm)) => {
            // Rules 18c, 18e
            sup_shift = sup_shift
                .max(min_sup_shift)
                .max(0.25f64.mul_add(metrics.x_height, supm.depth));
            sub_shift = sub_shift.max(metrics.sub2);

            let max_width = 4.0 * metrics.default_rule_thickness;
            if (sup_shift - supm.depth) - (subm.height - sub_shift) < max_width {
                sub_shift = max_width - (sup_shift - supm.depth) + subm.height;
                let psi = 0.8f64.mul_add(metrics.x_height, -(sup_shift - supm.depth));
                if psi > 0.0 {
                    sup_shift += psi;
                    sub_shift -= psi;
                }
            }

            make_vlist(VListParam::IndividualShift {
                children: vec![
                    VListElemAndShift::new(
                        VListElem::builder(subm)
                            .maybe_margin_left(margin_left)
                            .margin_right(margin_right)
                            .build(),
                        sub_shift,
                    ),
                    VListElemAndShift::new(
                        VListElem::builder(supm).margin_right(margin_right).build(),
                        -sup_shift,
                    ),
                ],
            })?
        }
        (None, Some(subm)) => {
            // Rule 18b
            sub_shift = sub_shift
                .max(metrics.sub1)
                .max(0.8f64.mul_add(-metrics.x_height, subm.height));
            make_vlist(VListParam::Shift {
                position_data: sub_shift,
                children: vec![
                    VListElem::builder(subm)
                        .maybe_margin_left(margin_left)
                        .margin_right(margin_right)
                        .build()
                        .into(),
                ],
            })?
        }
        (Some(supm), None) => {
            // Rules 18c, 18d
            sup_shift = sup_shift
                .max(min_sup_shift)
                .max(0.25f64.mul_add(metrics.x_height, supm.depth));
            make_vlist(VListParam::Shift {
                position_data: -sup_shift,
                children: vec![VListElem::builder(supm).margin_right(margin_right).build().into()],
            })?
        }
        (None, None) => return Ok(nucleus),
    };

    let box_type = nucleus.box_type.take().unwrap_or(BoxType::Mord);
    let column = make_span(vec!["msupsub".to_owned()], vec![supsub], None);
    let mut result = make_span(vec![], vec![nucleus, column], Some(ctx));
    result.box_type = Some(box_type);
    Ok(result)
}
