//! Box construction helpers shared by the renderers
//!
//! Everything here builds leaves or thin wrappers: glyph runs measured from
//! the font tables, kerns, rules, null delimiters. The post-passes that run
//! over a finished list ([`try_combine_chars`], [`rescale`]) also live here
//! so they can be tested apart from the decompose engine.

use crate::atom::AtomPath;
use crate::box_tree::{BoxContent, BoxType, FontFamily, MathBox};
use crate::context::Context;
use crate::types::{CssProperty, IdPolicy, LayoutError, Mode};
use crate::units::make_em;

/// `\nulldelimiterspace`, in ems of the normal size
const NULL_DELIMITER_SPACE: f64 = 0.12;

/// Stand-in glyph drawn for empty slots
const PLACEHOLDER_GLYPH: &str = "\u{2b1a}";

/// Apply the context-dependent classes and colors to a box.
fn init_node(node: &mut MathBox, ctx: &Context) {
    if ctx.mathstyle.is_tight() {
        node.classes.push("mtight".to_owned());
    }
    if let Some(color) = ctx.get_color() {
        node.style.insert(CssProperty::Color, color);
    }
}

/// Make a composite box sized from its children.
#[must_use]
pub fn make_span(classes: Vec<String>, children: Vec<MathBox>, ctx: Option<&Context>) -> MathBox {
    let mut node = MathBox::from_children(children);
    node.classes = classes;
    if let Some(ctx) = ctx {
        init_node(&mut node, ctx);
    }
    node
}

/// Font a character is set in when the atom does not force one.
///
/// Latin letters and lowercase Greek are italic in math mode; everything
/// else, and all of text mode, is upright.
#[must_use]
pub fn symbol_font(mode: Mode, ch: char, font_override: Option<FontFamily>) -> FontFamily {
    if let Some(font) = font_override {
        return font;
    }
    let italic = ch.is_ascii_alphabetic() || ('\u{3b1}'..='\u{3c9}').contains(&ch);
    if mode == Mode::Math && italic {
        FontFamily::MathItalic
    } else {
        FontFamily::MainRegular
    }
}

/// Make a glyph run of `text` in `font`, measured from the metric tables.
///
/// Heights and depths are the maxima over the characters, the width is their
/// sum and the italic correction is that of the last character. Glyphs the
/// tables do not know are laid out with zero size.
pub fn make_symbol(
    ctx: &Context,
    text: &str,
    font: FontFamily,
    mode: Mode,
    box_type: Option<BoxType>,
) -> Result<MathBox, LayoutError> {
    let mut height = 0.0f64;
    let mut depth = 0.0f64;
    let mut width = 0.0;
    let mut italic = 0.0;
    let mut skew = 0.0;
    let mut count = 0;

    for ch in text.chars() {
        count += 1;
        match ctx.metrics.character_metrics(ch, font.as_ref(), mode)? {
            Some(metrics) => {
                height = height.max(metrics.height);
                depth = depth.max(metrics.depth);
                width += metrics.width;
                italic = if mode == Mode::Text { 0.0 } else { metrics.italic };
                skew = metrics.skew;
            }
            None => {
                log::warn!("no metrics for {ch:?} in {font}");
                italic = 0.0;
                skew = 0.0;
            }
        }
    }

    let mut node = MathBox::builder(BoxContent::Text {
        text: text.to_owned(),
        font,
    })
    .maybe_box_type(box_type)
    .height(height)
    .depth(depth)
    .width(width)
    .italic(italic)
    .skew(if count == 1 { skew } else { 0.0 })
    .max_font_size(ctx.size_multiplier)
    .build();
    init_node(&mut node, ctx);
    Ok(node)
}

/// Box of the size of an `M`, drawn as a dashed square.
pub fn make_placeholder(ctx: &Context) -> Result<MathBox, LayoutError> {
    let metrics = ctx
        .metrics
        .character_metrics('M', FontFamily::MainRegular.as_ref(), Mode::Text)?
        .copied();
    let mut node = MathBox::builder(BoxContent::Text {
        text: PLACEHOLDER_GLYPH.to_owned(),
        font: FontFamily::MainRegular,
    })
    .box_type(BoxType::Mord)
    .classes(vec!["ML__placeholder".to_owned()])
    .height(metrics.map_or(0.0, |m| m.height))
    .depth(metrics.map_or(0.0, |m| m.depth))
    .width(metrics.map_or(0.0, |m| m.width))
    .max_font_size(ctx.size_multiplier)
    .build();
    init_node(&mut node, ctx);
    Ok(node)
}

/// Horizontal space of `width` ems. Kerns are transparent to spacing.
#[must_use]
pub fn make_kern(width: f64) -> MathBox {
    let mut kern = MathBox::builder(BoxContent::Empty)
        .classes(vec!["mspace".to_owned()])
        .width(width)
        .build();
    kern.style.insert(CssProperty::MarginRight, make_em(width));
    kern
}

/// Horizontal rule, at least `min_rule_thickness` thick.
#[must_use]
pub fn make_line_span(class_name: &str, ctx: &Context, thickness: Option<f64>) -> MathBox {
    let mut line = make_span(vec![class_name.to_owned()], vec![], Some(ctx));
    let thickness = thickness.unwrap_or(ctx.font_metrics().default_rule_thickness);
    line.height = thickness.max(ctx.min_rule_thickness);
    line.width = None;
    line.style
        .insert(CssProperty::BorderBottomWidth, make_em(line.height));
    line.max_font_size = 1.0;
    line
}

/// Invisible delimiter taking up `\nulldelimiterspace`.
#[must_use]
pub fn make_null_delimiter(ctx: &Context, box_type: BoxType) -> MathBox {
    let base = ctx.with_base_sizing();
    let mut classes = vec!["nulldelimiter".to_owned()];
    classes.extend(base.sizing_classes(ctx.size));
    let mut node = MathBox::builder(BoxContent::Empty)
        .box_type(box_type)
        .classes(classes)
        .width(NULL_DELIMITER_SPACE * base.scale_relative_to(ctx))
        .build();
    node.style
        .insert(CssProperty::Width, make_em(NULL_DELIMITER_SPACE));
    node
}

/// Stamp the identity of the atom at `path` on `node`, following the
/// context's id policy.
pub fn bind(ctx: &Context, node: &mut MathBox, path: &AtomPath) {
    if let IdPolicy::Path { prefix } = &ctx.id_policy {
        node.atom_id = Some(format!("{prefix}{path}"));
    }
}

/// Whether `next` can be appended to the glyph run `prev`.
fn can_combine(prev: &MathBox, next: &MathBox) -> bool {
    let (
        BoxContent::Text {
            font: prev_font, ..
        },
        BoxContent::Text {
            font: next_font, ..
        },
    ) = (&prev.content, &next.content)
    else {
        return false;
    };

    // Bins are kept apart so that each can still be reclassified.
    prev_font == next_font
        && prev.box_type == next.box_type
        && prev.box_type != Some(BoxType::Mbin)
        && prev.classes == next.classes
        && prev.style == next.style
        && prev.skew == next.skew
        && prev.max_font_size == next.max_font_size
        && prev.italic == 0.0
        && !prev.is_selected
        && !next.is_selected
        && prev.atom_id.is_none()
        && next.atom_id.is_none()
}

/// Merge adjacent glyph runs that share font, type, classes and style.
///
/// Runs carrying an atom identifier or an italic correction are left alone,
/// since merging would lose them.
#[must_use]
pub fn try_combine_chars(boxes: Vec<MathBox>) -> Vec<MathBox> {
    let mut combined: Vec<MathBox> = Vec::with_capacity(boxes.len());
    for next in boxes {
        if let Some(prev) = combined.last_mut()
            && can_combine(prev, &next)
            && let BoxContent::Text { text, .. } = &mut prev.content
            && let Some(next_text) = next.text()
        {
            text.push_str(next_text);
            prev.height = prev.height.max(next.height);
            prev.depth = prev.depth.max(next.depth);
            prev.width = prev.width.zip(next.width).map(|(a, b)| a + b);
            prev.italic = next.italic;
            continue;
        }
        combined.push(next);
    }
    combined
}

/// Convert boxes laid out in `ctx` to the ems of its parent scope.
///
/// Each box gets the classes switching the font size, and its metrics are
/// multiplied by the size ratio. A box that already switches from `ctx`'s
/// size (a nested size change) has its reset class pointed at the parent
/// size instead.
#[must_use]
pub fn rescale(mut boxes: Vec<MathBox>, ctx: &Context) -> Vec<MathBox> {
    if ctx.size == ctx.parent_size {
        return boxes;
    }
    let factor = ctx.parent_scale();
    let inner_reset = format!("reset-size{}", ctx.size);
    for node in &mut boxes {
        match node.classes.iter().position(|c| c == "sizing") {
            Some(pos) => {
                if node.classes.get(pos + 1) == Some(&inner_reset) {
                    node.classes[pos + 1] = format!("reset-size{}", ctx.parent_size);
                }
            }
            None => node.classes.extend(ctx.sizing_classes(ctx.parent_size)),
        }
        node.scale(factor);
    }
    boxes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::Branch;
    use crate::style::{DISPLAY, SCRIPT};

    #[test]
    fn symbol_uses_glyph_metrics() {
        let ctx = Context::builder().mathstyle(DISPLAY).build();
        let five = make_symbol(&ctx, "5", FontFamily::MainRegular, Mode::Math, Some(BoxType::Mord))
            .unwrap();
        assert_eq!(five.height, 0.64444);
        assert_eq!(five.depth, 0.0);
        assert_eq!(five.width, Some(0.5));
        assert_eq!(five.max_font_size, 1.0);
    }

    #[test]
    fn symbol_in_text_mode_drops_italic() {
        let ctx = Context::default();
        let math = make_symbol(&ctx, "f", FontFamily::MathItalic, Mode::Math, None).unwrap();
        assert!(math.italic > 0.1);
        assert!((math.skew - 0.16667).abs() < 1e-9);
        let text = make_symbol(&ctx, "f", FontFamily::MathItalic, Mode::Text, None).unwrap();
        assert_eq!(text.italic, 0.0);
    }

    #[test]
    fn symbol_in_script_is_tight() {
        let ctx = Context::default().with_mathstyle(SCRIPT).with_color("red");
        let node = make_symbol(&ctx, "x", FontFamily::MathItalic, Mode::Math, None).unwrap();
        assert!(node.has_class("mtight"));
        assert_eq!(node.style.get(CssProperty::Color), Some("red"));
        assert!((node.max_font_size - 0.7).abs() < 1e-12);
    }

    #[test]
    fn unknown_glyphs_are_zero_sized() {
        let ctx = Context::default();
        let node = make_symbol(&ctx, "\u{2603}", FontFamily::MainRegular, Mode::Math, None).unwrap();
        assert_eq!(node.total_height(), 0.0);
        assert_eq!(node.width, Some(0.0));
    }

    #[test]
    fn default_fonts() {
        assert_eq!(symbol_font(Mode::Math, 'x', None), FontFamily::MathItalic);
        assert_eq!(symbol_font(Mode::Math, '\u{3b1}', None), FontFamily::MathItalic);
        assert_eq!(symbol_font(Mode::Math, '5', None), FontFamily::MainRegular);
        assert_eq!(symbol_font(Mode::Text, 'x', None), FontFamily::MainRegular);
        assert_eq!(
            symbol_font(Mode::Math, 'x', Some(FontFamily::MainRegular)),
            FontFamily::MainRegular
        );
    }

    #[test]
    fn combines_runs_of_same_kind() {
        let ctx = Context::default();
        let digit = |d: &str| {
            make_symbol(&ctx, d, FontFamily::MainRegular, Mode::Math, Some(BoxType::Mord)).unwrap()
        };
        let plus =
            make_symbol(&ctx, "+", FontFamily::MainRegular, Mode::Math, Some(BoxType::Mbin))
                .unwrap();
        let boxes = try_combine_chars(vec![digit("1"), digit("2"), plus.clone(), plus, digit("3")]);
        let texts: Vec<_> = boxes.iter().filter_map(MathBox::text).collect();
        assert_eq!(texts, ["12", "+", "+", "3"]);
        assert_eq!(boxes[0].width, Some(1.0));
    }

    #[test]
    fn does_not_combine_bound_or_italic_runs() {
        let ctx = Context::default();
        let f = make_symbol(&ctx, "f", FontFamily::MathItalic, Mode::Math, Some(BoxType::Mord))
            .unwrap();
        assert_eq!(try_combine_chars(vec![f.clone(), f.clone()]).len(), 2);

        let mut one =
            make_symbol(&ctx, "1", FontFamily::MainRegular, Mode::Math, Some(BoxType::Mord))
                .unwrap();
        let two = one.clone();
        one.atom_id = Some("a".to_owned());
        assert_eq!(try_combine_chars(vec![one, two]).len(), 2);
    }

    #[test]
    fn kern_and_rule() {
        let kern = make_kern(0.25);
        assert_eq!(kern.width, Some(0.25));
        assert_eq!(kern.box_type, None);
        assert_eq!(kern.style.get(CssProperty::MarginRight), Some("0.25em"));

        let ctx = Context::builder().min_rule_thickness(0.1).build();
        let rule = make_line_span("frac-line", &ctx, None);
        assert_eq!(rule.height, 0.1);
    }

    #[test]
    fn null_delimiter_keeps_normal_size_width() {
        let ctx = Context::default();
        let null = make_null_delimiter(&ctx, BoxType::Mopen);
        assert_eq!(null.width, Some(0.12));
        assert!(null.has_class("nulldelimiter"));

        let script = ctx.with_mathstyle(SCRIPT);
        let null = make_null_delimiter(&script, BoxType::Mclose);
        assert_eq!(null.width, Some(0.12));
        assert!(!null.has_class("sizing"));

        let huge = ctx.with_size(11);
        let null = make_null_delimiter(&huge, BoxType::Mclose);
        assert!((null.width.unwrap() - 0.12 / 2.488).abs() < 1e-12);
        assert!(null.has_class("reset-size11"));
        assert!(null.has_class("size6"));
    }

    #[test]
    fn bind_follows_policy() {
        let path = AtomPath::root().child(Branch::Body, 2);
        let mut node = make_kern(0.0);
        bind(&Context::default(), &mut node, &path);
        assert_eq!(node.atom_id, None);

        let ctx = Context::builder()
            .id_policy(IdPolicy::Path {
                prefix: "mb-".to_owned(),
            })
            .build();
        bind(&ctx, &mut node, &path);
        assert_eq!(node.atom_id.as_deref(), Some("mb-2"));
    }

    #[test]
    fn rescale_converts_to_parent_ems() {
        let ctx = Context::default();
        let script = ctx.with_mathstyle(SCRIPT);
        let x = make_symbol(&script, "x", FontFamily::MathItalic, Mode::Math, None).unwrap();
        let height = x.height;
        let scaled = rescale(vec![x], &script);
        assert!((scaled[0].height - height * 0.7).abs() < 1e-12);
        assert!(scaled[0].has_class("reset-size6"));
        assert!(scaled[0].has_class("size3"));

        let same = rescale(scaled.clone(), &ctx.scoped());
        assert_eq!(same, scaled);
    }

    #[test]
    fn rescale_retargets_nested_size_changes() {
        let outer = Context::default();
        let large = outer.with_size(8);
        let huge = large.with_size(11);
        let x = make_symbol(&huge, "x", FontFamily::MathItalic, Mode::Math, None).unwrap();
        let inner = rescale(vec![x], &huge);
        assert!(inner[0].has_class("reset-size8"));
        let outer_boxes = rescale(inner, &large);
        assert!(outer_boxes[0].has_class("reset-size6"));
        assert!(outer_boxes[0].has_class("size11"));
        assert!(!outer_boxes[0].has_class("size8"));
    }
}
