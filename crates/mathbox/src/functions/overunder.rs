//! Content stacked over and under a nucleus: `\overset`, `\underset`,
//! `\overbrace`, extensible arrows such as `\xrightarrow`.
//!
//! The annotations are laid out in script style and stacked with the same
//! `big_op_spacing` constants as operator limits, without slant.

use phf::{Map, phf_map};

use crate::atom::{Atom, AtomPath, Branch, OverUnderAtom};
use crate::box_tree::{BoxContent, BoxType, MathBox, SvgImage};
use crate::build_common::{make_kern, make_span};
use crate::context::Context;
use crate::decompose::branch_box;
use crate::functions::op::shifted;
use crate::functions::utils::assemble_sup_sub;
use crate::style::SCRIPT;
use crate::types::{CssProperty, LayoutError};
use crate::units::make_em;
use crate::vlist::{VListChild, VListElem, VListParam, make_vlist};

/// Stretchy image parameters
struct Stretchy {
    /// Narrowest the image is drawn
    min_width: f64,
    /// View box height, in thousandths of an em
    view_box_height: f64,
    /// How the path is anchored when the box is wider than the view box
    align: &'static str,
}

static STRETCHY: Map<&'static str, Stretchy> = phf_map! {
    "overrightarrow" => Stretchy { min_width: 0.888, view_box_height: 522.0, align: "xMaxYMin" },
    "overleftarrow" => Stretchy { min_width: 0.888, view_box_height: 522.0, align: "xMinYMin" },
    "underrightarrow" => Stretchy { min_width: 0.888, view_box_height: 522.0, align: "xMaxYMin" },
    "underleftarrow" => Stretchy { min_width: 0.888, view_box_height: 522.0, align: "xMinYMin" },
    "overleftrightarrow" => Stretchy { min_width: 0.888, view_box_height: 522.0, align: "none" },
    "Overrightarrow" => Stretchy { min_width: 0.888, view_box_height: 560.0, align: "xMaxYMin" },
    "overlinesegment" => Stretchy { min_width: 0.888, view_box_height: 522.0, align: "none" },
    "overgroup" => Stretchy { min_width: 0.888, view_box_height: 342.0, align: "none" },
    "undergroup" => Stretchy { min_width: 0.888, view_box_height: 342.0, align: "none" },
    "overbrace" => Stretchy { min_width: 1.6, view_box_height: 548.0, align: "none" },
    "underbrace" => Stretchy { min_width: 1.6, view_box_height: 548.0, align: "none" },
    "xrightarrow" => Stretchy { min_width: 1.469, view_box_height: 522.0, align: "xMaxYMin" },
    "xleftarrow" => Stretchy { min_width: 1.469, view_box_height: 522.0, align: "xMinYMin" },
    "xleftrightarrow" => Stretchy { min_width: 1.75, view_box_height: 522.0, align: "none" },
    "xRightarrow" => Stretchy { min_width: 1.526, view_box_height: 560.0, align: "xMaxYMin" },
    "xLeftarrow" => Stretchy { min_width: 1.526, view_box_height: 560.0, align: "xMinYMin" },
    "xmapsto" => Stretchy { min_width: 1.5, view_box_height: 522.0, align: "none" },
    "xhookrightarrow" => Stretchy { min_width: 1.08, view_box_height: 522.0, align: "none" },
    "xhookleftarrow" => Stretchy { min_width: 1.08, view_box_height: 522.0, align: "none" },
    "xrightleftharpoons" => Stretchy { min_width: 1.75, view_box_height: 716.0, align: "none" },
    "xlongequal" => Stretchy { min_width: 1.5, view_box_height: 334.0, align: "none" },
};

/// Used for names missing from the table
const FALLBACK: Stretchy = Stretchy {
    min_width: 0.888,
    view_box_height: 522.0,
    align: "none",
};

/// Gap between a stretchy strip and the content it covers
const STRIP_GAP: f64 = 0.1;

/// Stretchy image `name` at least `width` wide.
fn stretchy_svg(name: &str, width: f64) -> MathBox {
    let params = STRETCHY.get(name).unwrap_or_else(|| {
        log::warn!("no stretchy image named {name:?}");
        &FALLBACK
    });
    let height = params.view_box_height / 1000.0;
    let mut svg = MathBox::builder(BoxContent::Svg(SvgImage {
        name: name.to_owned(),
        view_box_width: 400_000.0,
        view_box_height: params.view_box_height,
        preserve_aspect_ratio: params.align,
    }))
    .classes(vec!["stretchy".to_owned()])
    .height(height)
    .width(width.max(params.min_width))
    .build();
    svg.style.insert(CssProperty::Height, make_em(height));
    svg.style.insert(CssProperty::MinWidth, make_em(params.min_width));
    svg
}

/// Put a stretchy strip as wide as `body` above it (`over`) or below it.
fn with_strip(body: MathBox, name: &str, over: bool) -> Result<MathBox, LayoutError> {
    let svg = stretchy_svg(name, body.width.unwrap_or(0.0));
    let svg = VListElem::builder(svg)
        .wrapper_classes(vec!["svg-align".to_owned()])
        .build();
    let vlist = if over {
        make_vlist(VListParam::FirstBaseline {
            children: vec![body.into(), VListChild::Kern(STRIP_GAP), svg.into()],
        })?
    } else {
        make_vlist(VListParam::Bottom {
            position_data: body.depth + STRIP_GAP + svg.elem.total_height(),
            children: vec![svg.into(), VListChild::Kern(STRIP_GAP), body.into()],
        })?
    };
    Ok(make_span(
        vec![if over { "mover" } else { "munder" }.to_owned()],
        vec![vlist],
        None,
    ))
}

/// Render an overunder atom.
pub fn render(
    ctx: &Context,
    atom: &Atom,
    overunder: &OverUnderAtom,
    path: &AtomPath,
) -> Result<MathBox, LayoutError> {
    let script_ctx = ctx.with_mathstyle(SCRIPT);
    let above = overunder
        .above
        .as_deref()
        .map(|list| branch_box(&script_ctx, atom, list, path, Branch::Above))
        .transpose()?;
    let below = overunder
        .below
        .as_deref()
        .map(|list| branch_box(&script_ctx, atom, list, path, Branch::Below))
        .transpose()?;

    let (mut nucleus, base_shift) = if let Some(name) = &overunder.svg_body {
        let width = [&above, &below]
            .into_iter()
            .flatten()
            .filter_map(|node| node.width)
            .fold(0.0, f64::max);
        let svg = stretchy_svg(name, width);
        // Arrows sit on the math axis.
        let base_shift = svg.height / 2.0 - ctx.font_metrics().axis_height;
        (svg, base_shift)
    } else {
        (branch_box(ctx, atom, &overunder.body, path, Branch::Body)?, 0.0)
    };
    if let Some(name) = &overunder.svg_above {
        nucleus = with_strip(nucleus, name, true)?;
    }
    if let Some(name) = &overunder.svg_below {
        nucleus = with_strip(nucleus, name, false)?;
    }

    let padded = overunder.padded || (above.is_some() && below.is_some());
    let mut stack = if above.is_none() && below.is_none() {
        shifted(nucleus, base_shift)
    } else {
        assemble_sup_sub(
            ctx,
            nucleus,
            above,
            below,
            false,
            0.0,
            base_shift,
            vec!["overunder".to_owned()],
        )?
    };

    if padded {
        let pad = ctx.mu_to_em(3.0);
        stack = make_span(vec![], vec![make_kern(pad), stack, make_kern(pad)], None);
    }
    stack.box_type = Some(BoxType::from(overunder.class));
    Ok(stack)
}
