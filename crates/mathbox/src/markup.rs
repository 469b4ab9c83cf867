//! HTML markup for box trees
//!
//! The markup renderer itself is an external collaborator; this module
//! provides the serialization hook it walks. Vertical lists are emitted as
//! the usual table of `vlist` spans hung from a `pstrut`, so every row can be
//! placed with a single `top` offset.

use core::cell::RefCell;
use core::fmt::{self, Write as _};

use crate::box_tree::{BoxContent, BoxType, MathBox, SvgImage, VList};
use crate::types::{CssProperty, CssStyle, LayoutError};
use crate::units::make_em;

/// A node that can be written out as HTML.
pub trait VirtualNode {
    /// Write HTML markup into the formatter.
    fn write_markup(&self, fmt: &mut fmt::Formatter<'_>) -> Result<(), LayoutError>;

    /// Render the node into a [`String`].
    fn to_markup(&self) -> Result<String, LayoutError>
    where
        Self: Sized,
    {
        markup_to_string(self)
    }
}

/// Render any [`VirtualNode`] into a [`String`] buffer.
pub fn markup_to_string<T: VirtualNode + ?Sized>(node: &T) -> Result<String, LayoutError> {
    struct DisplayAdapter<'a, T: VirtualNode + ?Sized> {
        node: &'a T,
        error: &'a RefCell<Option<LayoutError>>,
    }

    impl<T: VirtualNode + ?Sized> fmt::Display for DisplayAdapter<'_, T> {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            self.node.write_markup(f).map_err(|err| {
                self.error.replace(Some(err));
                fmt::Error
            })
        }
    }

    let error = RefCell::new(None);
    let mut buffer = String::new();
    let adapter = DisplayAdapter {
        node,
        error: &error,
    };

    if write!(buffer, "{adapter}").is_err() {
        return Err(error
            .into_inner()
            .unwrap_or_else(|| LayoutError::new("failed to write markup")));
    }
    Ok(buffer)
}

/// Write `text` with HTML special characters escaped.
#[inline]
pub fn escape_into<W: fmt::Write>(writer: &mut W, text: &str) -> fmt::Result {
    let mut last = 0;
    for (idx, ch) in text.char_indices() {
        let replacement = match ch {
            '&' => "&amp;",
            '>' => "&gt;",
            '<' => "&lt;",
            '"' => "&quot;",
            '\'' => "&#x27;",
            _ => continue,
        };
        writer.write_str(&text[last..idx])?;
        writer.write_str(replacement)?;
        last = idx + ch.len_utf8();
    }
    writer.write_str(&text[last..])
}

fn map_fmt(result: fmt::Result) -> Result<(), LayoutError> {
    result.map_err(|_| LayoutError::new("failed to write markup"))
}

/// Space-separated class attribute for a box: spacing class first, then the
/// box's own classes, then the selection marker.
fn class_list(node: &MathBox) -> Vec<&str> {
    let mut classes = Vec::with_capacity(node.classes.len() + 3);
    if let Some(box_type) = &node.box_type
        && *box_type != BoxType::First
    {
        classes.push(box_type.as_ref());
    }
    if let BoxContent::Text { font, .. } = &node.content {
        classes.push(font.css_class());
    }
    classes.extend(node.classes.iter().map(String::as_str).filter(|c| !c.is_empty()));
    if node.is_selected {
        classes.push("ML__selected");
    }
    classes
}

fn write_class<W: fmt::Write>(writer: &mut W, classes: &[&str]) -> fmt::Result {
    if classes.is_empty() {
        return Ok(());
    }
    writer.write_str(" class=\"")?;
    escape_into(writer, &classes.join(" "))?;
    writer.write_char('"')
}

fn write_style<W: fmt::Write>(writer: &mut W, style: &CssStyle, italic: f64) -> fmt::Result {
    if style.is_empty() && italic <= 0.0 {
        return Ok(());
    }
    writer.write_str(" style=\"")?;
    if italic > 0.0 {
        write!(writer, "margin-right:{};", make_em(italic))?;
    }
    for (key, value) in style {
        writer.write_str(key.as_ref())?;
        writer.write_char(':')?;
        escape_into(writer, value)?;
        writer.write_char(';')?;
    }
    writer.write_char('"')
}

fn write_open(fmt: &mut fmt::Formatter<'_>, node: &MathBox) -> fmt::Result {
    fmt.write_str("<span")?;
    write_class(fmt, &class_list(node))?;
    if let Some(id) = &node.atom_id {
        fmt.write_str(" data-atom-id=\"")?;
        escape_into(fmt, id)?;
        fmt.write_char('"')?;
    }
    let italic = if matches!(node.content, BoxContent::Text { .. }) {
        node.italic
    } else {
        0.0
    };
    write_style(fmt, &node.style, italic)?;
    fmt.write_char('>')
}

fn write_vlist(
    fmt: &mut fmt::Formatter<'_>,
    vlist: &VList,
    height: f64,
    depth: f64,
) -> Result<(), LayoutError> {
    let two_rows = depth > 0.0;
    map_fmt(fmt.write_str(if two_rows {
        "<span class=\"vlist-t vlist-t2\">"
    } else {
        "<span class=\"vlist-t\">"
    }))?;
    map_fmt(write!(
        fmt,
        "<span class=\"vlist-r\"><span class=\"vlist\" style=\"height:{};\">",
        make_em(height)
    ))?;

    for row in &vlist.rows {
        let mut style = row.wrapper_style.clone();
        style.insert(CssProperty::Top, make_em(-vlist.pstrut + row.shift));
        if let Some(margin) = row.margin_left {
            style.insert(CssProperty::MarginLeft, make_em(margin));
        }
        if let Some(margin) = row.margin_right {
            style.insert(CssProperty::MarginRight, make_em(margin));
        }
        map_fmt(fmt.write_str("<span"))?;
        let classes: Vec<&str> = row.wrapper_classes.iter().map(String::as_str).collect();
        map_fmt(write_class(fmt, &classes))?;
        map_fmt(write_style(fmt, &style, 0.0))?;
        map_fmt(write!(
            fmt,
            "><span class=\"pstrut\" style=\"height:{};\"></span>",
            make_em(vlist.pstrut)
        ))?;
        row.elem.write_markup(fmt)?;
        map_fmt(fmt.write_str("</span>"))?;
    }

    map_fmt(fmt.write_str("</span>"))?;
    if two_rows {
        map_fmt(write!(
            fmt,
            "<span class=\"vlist-s\">\u{200b}</span></span><span class=\"vlist-r\"><span class=\"vlist\" style=\"height:{};\"><span></span></span>",
            make_em(depth)
        ))?;
    }
    map_fmt(fmt.write_str("</span></span>"))
}

fn write_svg(fmt: &mut fmt::Formatter<'_>, svg: &SvgImage, height: f64) -> fmt::Result {
    write!(
        fmt,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"100%\" height=\"{}\" viewBox=\"0 0 {} {}\" preserveAspectRatio=\"{}\"><use href=\"#",
        make_em(height),
        svg.view_box_width,
        svg.view_box_height,
        svg.preserve_aspect_ratio,
    )?;
    escape_into(fmt, &svg.name)?;
    fmt.write_str("\"/></svg>")
}

impl VirtualNode for MathBox {
    fn write_markup(&self, fmt: &mut fmt::Formatter<'_>) -> Result<(), LayoutError> {
        map_fmt(write_open(fmt, self))?;
        match &self.content {
            BoxContent::Empty => {}
            BoxContent::Text { text, .. } => map_fmt(escape_into(fmt, text))?,
            BoxContent::Children(children) => {
                for child in children {
                    child.write_markup(fmt)?;
                }
            }
            BoxContent::VList(vlist) => write_vlist(fmt, vlist, self.height, self.depth)?,
            BoxContent::Svg(svg) => map_fmt(write_svg(fmt, svg, self.total_height()))?,
        }
        map_fmt(fmt.write_str("</span>"))
    }
}

impl VirtualNode for [MathBox] {
    fn write_markup(&self, fmt: &mut fmt::Formatter<'_>) -> Result<(), LayoutError> {
        for node in self {
            node.write_markup(fmt)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::box_tree::FontFamily;

    #[test]
    fn escapes_special_characters() {
        let mut out = String::new();
        escape_into(&mut out, "a<b & 'c'").unwrap();
        assert_eq!(out, "a&lt;b &amp; &#x27;c&#x27;");
    }

    #[test]
    fn glyph_markup_carries_type_font_and_italic() {
        let node = MathBox::builder(BoxContent::Text {
            text: "f".to_owned(),
            font: FontFamily::MathItalic,
        })
        .box_type(BoxType::Mord)
        .italic(0.10764)
        .build();
        assert_eq!(
            node.to_markup().unwrap(),
            "<span class=\"mord mathnormal\" style=\"margin-right:0.1076em;\">f</span>"
        );
    }

    #[test]
    fn class_list_borrows_from_the_box() {
        let mut node = MathBox::builder(BoxContent::Empty).box_type(BoxType::Mbin).build();
        node.classes.push("ML__cmr".to_owned());
        assert_eq!(class_list(&node), ["mbin", "ML__cmr"]);
        node.box_type = Some(BoxType::First);
        assert_eq!(class_list(&node), ["ML__cmr"]);
    }

    #[test]
    fn selected_boxes_are_marked() {
        let mut node = MathBox::from_children(vec![]);
        node.is_selected = true;
        node.atom_id = Some("mb-0".to_owned());
        assert_eq!(
            node.to_markup().unwrap(),
            "<span class=\"ML__selected\" data-atom-id=\"mb-0\"></span>"
        );
    }
}
