//! Delimiter handling
//!
//! Delimiters come in three flavours. Small delimiters are the Main-Regular
//! glyph restyled to text, script or scriptscript size. Large delimiters are
//! the glyphs of the Size1 to Size4 fonts, always set in text style. Stacked
//! delimiters are assembled from top, repeat, optional middle and bottom
//! pieces (TeXbook p. 442) and grow to any height.
//!
//! Heights handed to the sequence traversal are in ems of the normal size,
//! so that glyphs from every style can be compared against them.

use phf::{Map, Set, phf_map, phf_set};

use crate::box_tree::{BoxContent, BoxType, FontFamily, MathBox, SvgImage};
use crate::build_common::{make_null_delimiter, make_span, make_symbol};
use crate::context::Context;
use crate::font_metrics::CharacterMetrics;
use crate::style::{Mathstyle, SCRIPT, SCRIPTSCRIPT, TEXT};
use crate::types::{CssProperty, LayoutError, Mode};
use crate::units::make_em;
use crate::vlist::{VListChild, VListParam, make_vlist};

const SIZE_TO_MAX_HEIGHT: [f64; 5] = [0.0, 1.2, 1.8, 2.4, 3.0];

/// Padding above the surd vinculum in SVG units
const VB_PAD: f64 = 80.0;

/// Padding above the surd in em units
const EM_PAD: f64 = 0.08;

/// `\delimiterfactor` from plain TeX
const DELIMITER_FACTOR: f64 = 901.0;

/// `\delimitershortfall` from plain TeX, in points
const DELIMITER_SHORTFALL_PT: f64 = 5.0;

/// Largest total height the Size`n` delimiters reach, in ems
#[must_use]
pub fn size_to_max_height(size: usize) -> f64 {
    SIZE_TO_MAX_HEIGHT[size.min(SIZE_TO_MAX_HEIGHT.len() - 1)]
}

/// Delimiter flavour picked from a sizing sequence
#[derive(Debug, Clone, Copy)]
pub enum DelimiterType {
    /// Main-Regular glyph in the given style
    Small(&'static Mathstyle),
    /// Glyph of the Size`n` font
    Large(usize),
    /// Pieces stacked to the requested height
    Stack,
}

/// A radical sign ready to be placed in front of its body
#[derive(Debug)]
pub struct SqrtImage {
    /// The radical sign, its height measured to the top of the vinculum
    pub image: MathBox,
    /// Thickness of the vinculum
    pub rule_width: f64,
    /// Horizontal room taken by the sign before the body
    pub advance_width: f64,
}

/// Delimiter names accepted in addition to the glyphs themselves
static DELIMITER_GLYPHS: Map<&'static str, &'static str> = phf_map! {
    "\\lparen" => "(",
    "\\rparen" => ")",
    "\\lbrack" => "[",
    "\\rbrack" => "]",
    "\\{" => "{",
    "\\lbrace" => "{",
    "\\}" => "}",
    "\\rbrace" => "}",
    "\\lfloor" => "\u{230a}",
    "\\rfloor" => "\u{230b}",
    "\\lceil" => "\u{2308}",
    "\\rceil" => "\u{2309}",
    "<" => "\u{27e8}",
    ">" => "\u{27e9}",
    "\\lt" => "\u{27e8}",
    "\\gt" => "\u{27e9}",
    "\\langle" => "\u{27e8}",
    "\\rangle" => "\u{27e9}",
    "\\vert" => "|",
    "\\lvert" => "|",
    "\\rvert" => "|",
    "\u{2223}" => "|",
    "\\|" => "\u{2225}",
    "\\Vert" => "\u{2225}",
    "\\lVert" => "\u{2225}",
    "\\rVert" => "\u{2225}",
    "\\surd" => "\u{221a}",
};

static STACK_LARGE_DELIMITERS: Set<&'static str> = phf_set!(
    "(", ")", "[", "]", "{", "}", "\u{230a}", "\u{230b}", "\u{2308}", "\u{2309}", "\u{221a}",
);

static STACK_ALWAYS_DELIMITERS: Set<&'static str> = phf_set!("|", "\u{2225}");

static STACK_NEVER_DELIMITERS: Set<&'static str> = phf_set!("\u{27e8}", "\u{27e9}", "/");

const STACK_NEVER_DELIMITER_SEQUENCE: &[DelimiterType] = &[
    DelimiterType::Small(SCRIPTSCRIPT),
    DelimiterType::Small(SCRIPT),
    DelimiterType::Small(TEXT),
    DelimiterType::Large(1),
    DelimiterType::Large(2),
    DelimiterType::Large(3),
    DelimiterType::Large(4),
];

const STACK_ALWAYS_DELIMITER_SEQUENCE: &[DelimiterType] = &[
    DelimiterType::Small(SCRIPTSCRIPT),
    DelimiterType::Small(SCRIPT),
    DelimiterType::Small(TEXT),
    DelimiterType::Stack,
];

const STACK_LARGE_DELIMITER_SEQUENCE: &[DelimiterType] = &[
    DelimiterType::Small(SCRIPTSCRIPT),
    DelimiterType::Small(SCRIPT),
    DelimiterType::Small(TEXT),
    DelimiterType::Large(1),
    DelimiterType::Large(2),
    DelimiterType::Large(3),
    DelimiterType::Large(4),
    DelimiterType::Stack,
];

/// Pieces of a stacked delimiter
struct StackParts {
    top: &'static str,
    middle: Option<&'static str>,
    repeat: &'static str,
    bottom: &'static str,
    font: FontFamily,
}

const fn stack_parts(
    top: &'static str,
    repeat: &'static str,
    bottom: &'static str,
    font: FontFamily,
) -> StackParts {
    StackParts {
        top,
        middle: None,
        repeat,
        bottom,
        font,
    }
}

fn stacked_parts(glyph: &str) -> Option<StackParts> {
    let parts = match glyph {
        "|" => stack_parts("\u{2223}", "\u{2223}", "\u{2223}", FontFamily::Size1),
        "\u{2225}" => stack_parts("\u{2225}", "\u{2225}", "\u{2225}", FontFamily::Size1),
        "[" => stack_parts("\u{23a1}", "\u{23a2}", "\u{23a3}", FontFamily::Size4),
        "]" => stack_parts("\u{23a4}", "\u{23a5}", "\u{23a6}", FontFamily::Size4),
        "\u{230a}" => stack_parts("\u{23a2}", "\u{23a2}", "\u{23a3}", FontFamily::Size4),
        "\u{2308}" => stack_parts("\u{23a1}", "\u{23a2}", "\u{23a2}", FontFamily::Size4),
        "\u{230b}" => stack_parts("\u{23a5}", "\u{23a5}", "\u{23a6}", FontFamily::Size4),
        "\u{2309}" => stack_parts("\u{23a4}", "\u{23a5}", "\u{23a5}", FontFamily::Size4),
        "(" => stack_parts("\u{239b}", "\u{239c}", "\u{239d}", FontFamily::Size4),
        ")" => stack_parts("\u{239e}", "\u{239f}", "\u{23a0}", FontFamily::Size4),
        "{" => StackParts {
            middle: Some("\u{23a8}"),
            ..stack_parts("\u{23a7}", "\u{23aa}", "\u{23a9}", FontFamily::Size4)
        },
        "}" => StackParts {
            middle: Some("\u{23ac}"),
            ..stack_parts("\u{23ab}", "\u{23aa}", "\u{23ad}", FontFamily::Size4)
        },
        _ => return None,
    };
    Some(parts)
}

/// The glyph drawn for a delimiter name, or `None` for the empty delimiter
/// `.` and anything unknown.
#[must_use]
pub fn delimiter_glyph(delim: &str) -> Option<&'static str> {
    if let Some(glyph) = DELIMITER_GLYPHS.get(delim) {
        return Some(*glyph);
    }
    STACK_LARGE_DELIMITERS
        .get_key(delim)
        .or_else(|| STACK_ALWAYS_DELIMITERS.get_key(delim))
        .or_else(|| STACK_NEVER_DELIMITERS.get_key(delim))
        .copied()
}

fn glyph_metrics(
    ctx: &Context,
    glyph: &str,
    font: FontFamily,
) -> Result<Option<CharacterMetrics>, LayoutError> {
    let Some(ch) = glyph.chars().next() else {
        return Ok(None);
    };
    Ok(ctx
        .metrics
        .character_metrics(ch, font.as_ref(), Mode::Math)?
        .copied())
}

/// Put a delimiter in `to_style` at the normal size, converting its metrics
/// to the ems of `ctx`.
fn style_wrap(
    delim: MathBox,
    to_style: &'static Mathstyle,
    ctx: &Context,
    box_type: Option<BoxType>,
) -> MathBox {
    let new_ctx = ctx.with_base_style(to_style);
    let mut span = make_span(new_ctx.sizing_classes(ctx.size), vec![delim], Some(ctx));
    span.scale(new_ctx.scale_relative_to(ctx));
    span.max_font_size = new_ctx.size_multiplier;
    span.box_type = box_type;
    span
}

/// Shift a delimiter set in text style so that it is centred on the axis
/// of `ctx`.
fn center_span(mut span: MathBox, ctx: &Context) -> MathBox {
    let new_ctx = ctx.with_base_style(TEXT);
    let shift = (1.0 - ctx.scale_relative_to(&new_ctx)) * ctx.font_metrics().axis_height;
    span.classes.push("delimcenter".to_owned());
    span.height -= shift;
    span.depth += shift;
    span.style.insert(CssProperty::Position, "relative");
    span.style.insert(CssProperty::Top, make_em(shift));
    span
}

/// Main-Regular delimiter glyph, restyled to `style`.
pub fn make_small_delim(
    ctx: &Context,
    glyph: &str,
    style: &'static Mathstyle,
    center: bool,
    mode: Mode,
    box_type: Option<BoxType>,
) -> Result<MathBox, LayoutError> {
    let text = make_symbol(ctx, glyph, FontFamily::MainRegular, mode, None)?;
    let span = style_wrap(text, style, ctx, box_type);
    Ok(if center { center_span(span, ctx) } else { span })
}

/// Delimiter glyph from the Size`size` font, set in text style.
pub fn make_large_delim(
    ctx: &Context,
    glyph: &str,
    size: usize,
    center: bool,
    mode: Mode,
    box_type: Option<BoxType>,
) -> Result<MathBox, LayoutError> {
    let inner = make_symbol(ctx, glyph, FontFamily::sized(size), mode, None)?;
    let sized = make_span(
        vec!["delimsizing".to_owned(), format!("size{size}")],
        vec![inner],
        Some(ctx),
    );
    let span = style_wrap(sized, TEXT, ctx, box_type);
    Ok(if center { center_span(span, ctx) } else { span })
}

fn make_glyph_piece(
    ctx: &Context,
    glyph: &str,
    font: FontFamily,
    mode: Mode,
) -> Result<VListChild, LayoutError> {
    let size_class = if font == FontFamily::Size1 {
        "delim-size1"
    } else {
        "delim-size4"
    };
    let piece = make_symbol(ctx, glyph, font, mode, None)?;
    Ok(make_span(
        vec!["delimsizinginner".to_owned(), size_class.to_owned()],
        vec![piece],
        None,
    )
    .into())
}

/// Stacked delimiter at least `height_total` tall, in normal-size ems.
pub fn make_stacked_delim(
    ctx: &Context,
    glyph: &str,
    height_total: f64,
    center: bool,
    mode: Mode,
    box_type: Option<BoxType>,
) -> Result<MathBox, LayoutError> {
    let Some(parts) = stacked_parts(glyph) else {
        return make_large_delim(ctx, glyph, 4, center, mode, box_type);
    };
    let base = ctx.with_base_style(TEXT);
    let extent = |piece: &str| -> Result<f64, LayoutError> {
        Ok(glyph_metrics(&base, piece, parts.font)?.map_or(0.0, |m| m.height + m.depth))
    };

    let top_height_total = extent(parts.top)?;
    let repeat_height_total = extent(parts.repeat)?;
    let bottom_height_total = extent(parts.bottom)?;
    let (middle_height_total, middle_factor) = match parts.middle {
        Some(middle) => (extent(middle)?, 2.0),
        None => (0.0, 1.0),
    };

    let minimal_height = top_height_total + bottom_height_total + middle_height_total;
    let repeat_count = if repeat_height_total > 0.0 {
        ((height_total - minimal_height) / (middle_factor * repeat_height_total))
            .ceil()
            .max(0.0) as usize
    } else {
        0
    };
    let real_height_total =
        (repeat_count as f64 * middle_factor).mul_add(repeat_height_total, minimal_height);

    let axis_height = ctx.font_metrics().axis_height;
    let axis_height = if center {
        axis_height * ctx.size_multiplier
    } else {
        axis_height
    };
    let depth = real_height_total / 2.0 - axis_height;

    let mut stack = Vec::with_capacity(repeat_count * 2 + 3);
    stack.push(make_glyph_piece(&base, parts.bottom, parts.font, mode)?);
    for _ in 0..repeat_count {
        stack.push(make_glyph_piece(&base, parts.repeat, parts.font, mode)?);
    }
    if let Some(middle) = parts.middle {
        stack.push(make_glyph_piece(&base, middle, parts.font, mode)?);
        for _ in 0..repeat_count {
            stack.push(make_glyph_piece(&base, parts.repeat, parts.font, mode)?);
        }
    }
    stack.push(make_glyph_piece(&base, parts.top, parts.font, mode)?);

    let inner = make_vlist(VListParam::Bottom {
        position_data: depth,
        children: stack,
    })?;
    let mult = make_span(
        vec!["delimsizing".to_owned(), "mult".to_owned()],
        vec![inner],
        Some(&base),
    );
    Ok(style_wrap(mult, TEXT, ctx, box_type))
}

/// Walk a sizing sequence and return the first delimiter flavour taller
/// than `height` (normal-size ems), or the last one.
fn traverse_sequence(
    ctx: &Context,
    glyph: &str,
    height: f64,
    sequence: &'static [DelimiterType],
) -> Result<DelimiterType, LayoutError> {
    // Smaller styles start earlier in the sequence.
    let start = 3usize.saturating_sub(ctx.mathstyle.size).min(2);
    for &delim_type in sequence.iter().skip(start) {
        let (font, scale) = match delim_type {
            DelimiterType::Stack => break,
            DelimiterType::Small(style) => (
                FontFamily::MainRegular,
                ctx.with_base_style(style).size_multiplier,
            ),
            DelimiterType::Large(size) => (FontFamily::sized(size), 1.0),
        };
        let Some(metrics) = glyph_metrics(ctx, glyph, font)? else {
            continue;
        };
        if (metrics.height + metrics.depth) * scale > height {
            return Ok(delim_type);
        }
    }
    Ok(sequence[sequence.len() - 1])
}

fn sequence_for(glyph: &str) -> &'static [DelimiterType] {
    if STACK_NEVER_DELIMITERS.contains(glyph) {
        STACK_NEVER_DELIMITER_SEQUENCE
    } else if STACK_LARGE_DELIMITERS.contains(glyph) {
        STACK_LARGE_DELIMITER_SEQUENCE
    } else {
        STACK_ALWAYS_DELIMITER_SEQUENCE
    }
}

/// Delimiter of a fixed size (`\big` to `\Bigg`), never centred.
///
/// Unknown delimiters and `.` become null delimiters.
pub fn sized_delim(
    ctx: &Context,
    delim: &str,
    size: usize,
    mode: Mode,
    box_type: Option<BoxType>,
) -> Result<MathBox, LayoutError> {
    let Some(glyph) = delimiter_glyph(delim) else {
        log::debug!("no glyph for delimiter {delim:?}, using a null delimiter");
        let mut null = make_null_delimiter(ctx, BoxType::Mord);
        null.box_type = box_type;
        return Ok(null);
    };
    let size = size.clamp(1, 4);
    if STACK_ALWAYS_DELIMITERS.contains(glyph) {
        make_stacked_delim(ctx, glyph, size_to_max_height(size), false, mode, box_type)
    } else {
        make_large_delim(ctx, glyph, size, false, mode, box_type)
    }
}

/// Delimiter whose total height is at least `height` (normal-size ems).
pub fn custom_sized_delim(
    ctx: &Context,
    glyph: &str,
    height: f64,
    center: bool,
    mode: Mode,
    box_type: Option<BoxType>,
) -> Result<MathBox, LayoutError> {
    match traverse_sequence(ctx, glyph, height, sequence_for(glyph))? {
        DelimiterType::Small(style) => make_small_delim(ctx, glyph, style, center, mode, box_type),
        DelimiterType::Large(size) => make_large_delim(ctx, glyph, size, center, mode, box_type),
        DelimiterType::Stack => make_stacked_delim(ctx, glyph, height, center, mode, box_type),
    }
}

/// Delimiter for `\left`, `\middle` or `\right` around content extending
/// `height` above and `depth` below the baseline, in ems of `ctx`.
///
/// Follows `make_left_right` in tex.web: the delimiter covers at least
/// 901/1000 of the content and comes no more than 5pt short of it.
pub fn left_right_delim(
    ctx: &Context,
    delim: &str,
    height: f64,
    depth: f64,
    mode: Mode,
    box_type: Option<BoxType>,
) -> Result<MathBox, LayoutError> {
    let Some(glyph) = delimiter_glyph(delim) else {
        if delim != "." {
            log::debug!("no glyph for delimiter {delim:?}, using a null delimiter");
        }
        let mut null = make_null_delimiter(ctx, BoxType::Mord);
        null.box_type = box_type;
        return Ok(null);
    };
    let metrics = ctx.font_metrics();
    let axis_height = metrics.axis_height * ctx.size_multiplier;
    let delimiter_extend = DELIMITER_SHORTFALL_PT / metrics.pt_per_em;
    let height = height * ctx.size_multiplier;
    let depth = depth * ctx.size_multiplier;

    let max_dist_from_axis = (height - axis_height).max(depth + axis_height);
    let total_height = (max_dist_from_axis / 500.0 * DELIMITER_FACTOR)
        .max(2.0f64.mul_add(max_dist_from_axis, -delimiter_extend));

    custom_sized_delim(ctx, glyph, total_height, true, mode, box_type)
}

fn sqrt_svg(name: String, span_height: f64, view_box_height: f64, min_width: &str) -> MathBox {
    let mut image = MathBox::builder(BoxContent::Svg(SvgImage {
        name,
        view_box_width: 400_000.0,
        view_box_height,
        preserve_aspect_ratio: "xMinYMin slice",
    }))
    .classes(vec!["hide-tail".to_owned()])
    .build();
    image.style.insert(CssProperty::MinWidth, min_width);
    image.style.insert(CssProperty::Height, make_em(span_height));
    image
}

/// Radical sign tall enough for content of total height `height`.
pub fn make_sqrt_image(ctx: &Context, height: f64) -> Result<SqrtImage, LayoutError> {
    let base = ctx.with_base_sizing();
    let delimiter_type = traverse_sequence(
        &base,
        "\u{221a}",
        height * base.size_multiplier,
        STACK_LARGE_DELIMITER_SEQUENCE,
    )?;

    let mut size_multiplier = base.size_multiplier;
    let extra_vinculum = (ctx.min_rule_thickness - ctx.font_metrics().sqrt_rule_thickness).max(0.0);

    let (mut image, tex_height, advance_width) = match delimiter_type {
        DelimiterType::Small(_) => {
            let view_box_height = 1000.0f64.mul_add(extra_vinculum, 1000.0) + VB_PAD;
            if height < 1.0 {
                size_multiplier = 1.0;
            } else if height < 1.4 {
                size_multiplier = 0.7;
            }
            let span_height = (1.0 + extra_vinculum + EM_PAD) / size_multiplier;
            let image = sqrt_svg(
                "sqrtMain".to_owned(),
                span_height,
                view_box_height,
                "0.853em",
            );
            (
                image,
                (1.0 + extra_vinculum) / size_multiplier,
                0.833 / size_multiplier,
            )
        }
        DelimiterType::Large(size) => {
            let max_height = size_to_max_height(size);
            let view_box_height = (1000.0 + VB_PAD) * max_height;
            let span_height = (max_height + extra_vinculum + EM_PAD) / size_multiplier;
            let image = sqrt_svg(
                format!("sqrtSize{size}"),
                span_height,
                view_box_height,
                "1.02em",
            );
            (
                image,
                (max_height + extra_vinculum) / size_multiplier,
                1.0 / size_multiplier,
            )
        }
        DelimiterType::Stack => {
            let span_height = height + extra_vinculum + EM_PAD;
            let view_box_height = 1000.0f64.mul_add(height, extra_vinculum).round();
            let image = sqrt_svg(
                "sqrtTall".to_owned(),
                span_height,
                view_box_height,
                "0.742em",
            );
            (image, height + extra_vinculum, 1.056)
        }
    };
    image.height = tex_height;

    Ok(SqrtImage {
        image,
        rule_width: (ctx.font_metrics().sqrt_rule_thickness + extra_vinculum) * size_multiplier,
        advance_width,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::DISPLAY;

    #[test]
    fn names_resolve_to_glyphs() {
        assert_eq!(delimiter_glyph("\\langle"), Some("\u{27e8}"));
        assert_eq!(delimiter_glyph("("), Some("("));
        assert_eq!(delimiter_glyph("\\|"), Some("\u{2225}"));
        assert_eq!(delimiter_glyph("."), None);
        assert_eq!(delimiter_glyph("x"), None);
    }

    #[test]
    fn short_content_gets_a_small_delimiter() {
        let ctx = Context::default();
        let paren = left_right_delim(&ctx, "(", 0.5, 0.1, Mode::Math, Some(BoxType::Mopen))
            .unwrap();
        assert_eq!(paren.box_type, Some(BoxType::Mopen));
        assert!(paren.has_class("delimcenter"));
        assert!(paren.total_height() >= 1.0);
        assert!(paren.total_height() < 1.3);
    }

    #[test]
    fn delimiter_grows_with_content() {
        let ctx = Context::builder().mathstyle(DISPLAY).build();
        let mut last = 0.0;
        for height in [0.5, 1.0, 1.5, 2.5, 4.0] {
            let paren =
                left_right_delim(&ctx, "(", height, height - 0.5, Mode::Math, None).unwrap();
            assert!(paren.total_height() >= last);
            last = paren.total_height();
        }
        assert!(last > 6.0);
    }

    #[test]
    fn stacked_delimiter_covers_requested_height() {
        let ctx = Context::default();
        let brace = make_stacked_delim(&ctx, "{", 5.0, true, Mode::Math, None).unwrap();
        assert!(brace.total_height() >= 5.0);
        let bar = make_stacked_delim(&ctx, "|", 3.0, true, Mode::Math, None).unwrap();
        assert!(bar.total_height() >= 3.0);
    }

    #[test]
    fn missing_delimiters_degrade_to_null() {
        let ctx = Context::default();
        let null = left_right_delim(&ctx, ".", 2.0, 1.0, Mode::Math, Some(BoxType::Mclose))
            .unwrap();
        assert!(null.has_class("nulldelimiter"));
        let bad = sized_delim(&ctx, "\\foo", 2, Mode::Math, Some(BoxType::Mopen)).unwrap();
        assert!(bad.has_class("nulldelimiter"));
    }

    #[test]
    fn sized_delimiters_increase() {
        let ctx = Context::default();
        let heights: Vec<f64> = (1..=4)
            .map(|size| {
                sized_delim(&ctx, "[", size, Mode::Math, Some(BoxType::Mopen))
                    .unwrap()
                    .total_height()
            })
            .collect();
        assert!(heights.windows(2).all(|w| w[0] < w[1]));
        assert!((heights[0] - 1.2).abs() < 0.01);
    }

    #[test]
    fn sqrt_image_sizes() {
        let ctx = Context::default();
        let small = make_sqrt_image(&ctx, 0.8).unwrap();
        assert!(small.image.vlist().is_none());
        assert!((small.image.height - 1.0).abs() < 1e-12);
        assert!((small.advance_width - 0.833).abs() < 1e-12);

        let tall = make_sqrt_image(&ctx, 5.0).unwrap();
        assert!((tall.image.height - 5.0).abs() < 1e-12);
        assert!(matches!(&tall.image.content, BoxContent::Svg(svg) if svg.name == "sqrtTall"));
    }
}
