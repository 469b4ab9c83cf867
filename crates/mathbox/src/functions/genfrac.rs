//! Generalized fractions: `\frac`, `\dfrac`, `\binom`, `\atop`, `\cfrac`
//!
//! Rule 15 of the TeXbook, appendix G. Everything is laid out in the
//! fraction's own style (forced by `\dfrac`/`\tfrac`, or inherited) and
//! rescaled to the enclosing context at the end.

use crate::atom::{Atom, AtomPath, Branch, GenfracAtom};
use crate::box_tree::{BoxType, MathBox};
use crate::build_common::{make_line_span, make_null_delimiter, make_span};
use crate::context::Context;
use crate::decompose::branch_box;
use crate::delimiter::{custom_sized_delim, delimiter_glyph};
use crate::style::{DISPLAY, SCRIPT, SCRIPTSCRIPT};
use crate::types::{LayoutError, Mode};
use crate::vlist::{VListElemAndShift, VListParam, make_vlist};

/// Height of `\strut`, in points
const STRUT_HEIGHT_PT: f64 = 8.5;
/// Depth of `\strut`, in points
const STRUT_DEPTH_PT: f64 = 3.5;

/// Delimiter around the fraction, or a null delimiter when there is none.
fn frac_delim(
    ctx: &Context,
    delim: Option<&str>,
    height: f64,
    mode: Mode,
    box_type: BoxType,
) -> Result<MathBox, LayoutError> {
    match delim.and_then(delimiter_glyph) {
        Some(glyph) => custom_sized_delim(ctx, glyph, height, true, mode, Some(box_type)),
        None => {
            if let Some(delim) = delim.filter(|delim| *delim != ".") {
                log::debug!("no glyph for delimiter {delim:?}, using a null delimiter");
            }
            Ok(make_null_delimiter(ctx, box_type))
        }
    }
}

/// Render a fraction.
pub fn render(
    ctx: &Context,
    atom: &Atom,
    frac: &GenfracAtom,
    path: &AtomPath,
) -> Result<MathBox, LayoutError> {
    let style = frac.mathstyle.map_or(ctx.mathstyle, |name| name.style());
    let fctx = ctx.with_mathstyle(style);
    let fm = fctx.font_metrics();

    let mut numer = branch_box(&fctx.frac_num(), atom, &frac.numer, path, Branch::Numer)?;
    if frac.continued {
        numer.height = numer.height.max(STRUT_HEIGHT_PT / fm.pt_per_em);
        numer.depth = numer.depth.max(STRUT_DEPTH_PT / fm.pt_per_em);
    }
    let denom = branch_box(&fctx.frac_den(), atom, &frac.denom, path, Branch::Denom)?;

    let axis_height = fm.axis_height;
    let (rule, rule_width, rule_spacing) = if frac.has_bar_line {
        let thickness = frac
            .bar_size
            .as_ref()
            .map(|size| fctx.calculate_size(size))
            .transpose()?;
        let rule = make_line_span("frac-line", &fctx, thickness);
        let rule_width = rule.height;
        (Some(rule), rule_width, rule_width)
    } else {
        (None, 0.0, fm.default_rule_thickness)
    };

    let display = style.size == DISPLAY.size;
    let (mut num_shift, mut denom_shift, clearance) = if display {
        let clearance = if rule.is_some() {
            3.0 * rule_spacing
        } else {
            7.0 * rule_spacing
        };
        (fm.num1, fm.denom1, clearance)
    } else if rule.is_some() {
        (fm.num2, fm.denom2, rule_spacing)
    } else {
        (fm.num3, fm.denom2, 3.0 * rule_spacing)
    };

    if rule.is_some() {
        // Rule 15d
        let numer_gap = (num_shift - numer.depth) - 0.5f64.mul_add(rule_width, axis_height);
        if numer_gap < clearance {
            num_shift += clearance - numer_gap;
        }
        let denom_gap = 0.5f64.mul_add(-rule_width, axis_height) - (denom.height - denom_shift);
        if denom_gap < clearance {
            denom_shift += clearance - denom_gap;
        }
    } else {
        // Rule 15c
        let gap = (num_shift - numer.depth) - (denom.height - denom_shift);
        if gap < clearance {
            let adjustment = 0.5 * (clearance - gap);
            num_shift += adjustment;
            denom_shift += adjustment;
        }
    }

    let mut children = vec![VListElemAndShift::new(denom, denom_shift)];
    if let Some(rule) = rule {
        let mid_shift = -0.5f64.mul_add(-rule_width, axis_height);
        children.push(VListElemAndShift::new(rule, mid_shift));
    }
    children.push(VListElemAndShift::new(numer, -num_shift));
    let stack = make_vlist(VListParam::IndividualShift { children })?;

    let delim_size = if display {
        fm.delim1
    } else if style.size == SCRIPTSCRIPT.size {
        fctx.with_mathstyle(SCRIPT).font_metrics().delim2
    } else {
        fm.delim2
    };
    let delim_height = delim_size * fctx.size_multiplier;
    let left = frac_delim(
        &fctx,
        frac.left_delim.as_deref(),
        delim_height,
        atom.mode,
        BoxType::Mopen,
    )?;
    let right = if frac.continued {
        make_span(vec![], vec![], None)
    } else {
        frac_delim(
            &fctx,
            frac.right_delim.as_deref(),
            delim_height,
            atom.mode,
            BoxType::Mclose,
        )?
    };

    let body = make_span(vec!["mfrac".to_owned()], vec![stack], None);
    let mut node = make_span(vec![], vec![left, body, right], Some(&fctx));
    if fctx.size != ctx.size {
        node.classes.extend(fctx.sizing_classes(ctx.size));
        node.scale(fctx.parent_scale());
    }
    node.box_type = Some(BoxType::Mord);
    Ok(node)
}
