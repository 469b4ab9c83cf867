//! Box tree produced by layout
//!
//! A [`MathBox`] is a measured unit of the output: a glyph run, a composite
//! span of other boxes, a vertical list, or a stretchy image. All dimensions
//! are in ems of the context the box was laid out in, until a rescale pass
//! converts them to the enclosing context.

use bon::bon;
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::types::CssStyle;

/// Spacing class of a box, mirroring the atom class that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum BoxType {
    /// Zero-width caret anchor at the start of a list
    First,
    /// Ordinary
    Mord,
    /// Large operator
    Mop,
    /// Binary operator
    Mbin,
    /// Relation
    Mrel,
    /// Opening delimiter
    Mopen,
    /// Closing delimiter
    Mclose,
    /// Punctuation
    Mpunct,
    /// Inner (`\left..\right`)
    Minner,
}

/// Font a glyph run is set in. The string form names the metrics table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, Display, EnumString, EnumIter)]
pub enum FontFamily {
    /// Upright roman
    #[strum(serialize = "Main-Regular")]
    MainRegular,
    /// Math italic, the default for letters in math mode
    #[strum(serialize = "Math-Italic")]
    MathItalic,
    /// AMS symbols
    #[strum(serialize = "AMS-Regular")]
    AmsRegular,
    /// First large size, also used for text-style operators
    #[strum(serialize = "Size1-Regular")]
    Size1,
    /// Second large size, also used for display-style operators
    #[strum(serialize = "Size2-Regular")]
    Size2,
    /// Third large size
    #[strum(serialize = "Size3-Regular")]
    Size3,
    /// Fourth large size and the stacked delimiter pieces
    #[strum(serialize = "Size4-Regular")]
    Size4,
}

impl FontFamily {
    /// CSS class selecting this font in the stylesheet
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::MainRegular => "cmr",
            Self::MathItalic => "mathnormal",
            Self::AmsRegular => "amsrm",
            Self::Size1 => "size1-font",
            Self::Size2 => "size2-font",
            Self::Size3 => "size3-font",
            Self::Size4 => "size4-font",
        }
    }

    /// The large-size font with index `size` (1 to 4)
    #[must_use]
    pub const fn sized(size: usize) -> Self {
        match size {
            0 | 1 => Self::Size1,
            2 => Self::Size2,
            3 => Self::Size3,
            _ => Self::Size4,
        }
    }
}

/// One element of a vertical list, already positioned.
#[derive(Debug, Clone, PartialEq)]
pub struct VListRow {
    /// The positioned box
    pub elem: MathBox,
    /// Distance from the list baseline down to the element baseline.
    /// Negative values raise the element.
    pub shift: f64,
    /// Horizontal offset of the element, in ems
    pub margin_left: Option<f64>,
    /// Extra space after the element, in ems
    pub margin_right: Option<f64>,
    /// Classes of the row wrapper
    pub wrapper_classes: Vec<String>,
    /// Inline style of the row wrapper
    pub wrapper_style: CssStyle,
}

/// Body of a vertical list box
#[derive(Debug, Clone, PartialEq)]
pub struct VList {
    /// Rows, bottom first
    pub rows: Vec<VListRow>,
    /// Height of the invisible strut each row is hung from
    pub pstrut: f64,
}

/// A scalable image drawn by the markup renderer, referenced by name.
#[derive(Debug, Clone, PartialEq)]
pub struct SvgImage {
    /// Name of the path in the renderer's symbol sheet
    pub name: String,
    /// Width of the view box, in thousandths of an em
    pub view_box_width: f64,
    /// Height of the view box, in thousandths of an em
    pub view_box_height: f64,
    /// SVG `preserveAspectRatio` value
    pub preserve_aspect_ratio: &'static str,
}

/// What a box is made of.
#[derive(Debug, Clone, PartialEq)]
pub enum BoxContent {
    /// Nothing: struts, kerns and rules
    Empty,
    /// A run of glyphs in one font
    Text {
        /// The characters
        text: String,
        /// Font the characters are set in
        font: FontFamily,
    },
    /// A horizontal sequence of boxes
    Children(Vec<MathBox>),
    /// A vertical list
    VList(VList),
    /// A stretchy image
    Svg(SvgImage),
}

/// A measured box.
#[derive(Debug, Clone, PartialEq)]
pub struct MathBox {
    /// Content of the box
    pub content: BoxContent,
    /// Spacing class. `None` makes the box transparent to spacing rules:
    /// its children are consulted instead.
    pub box_type: Option<BoxType>,
    /// CSS classes
    pub classes: Vec<String>,
    /// Inline CSS
    pub style: CssStyle,
    /// Extent above the baseline
    pub height: f64,
    /// Extent below the baseline
    pub depth: f64,
    /// Advance width, when known
    pub width: Option<f64>,
    /// Italic correction of the last glyph
    pub italic: f64,
    /// Accent skew of the glyph
    pub skew: f64,
    /// Largest font size multiplier inside the box
    pub max_font_size: f64,
    /// Whether the box belongs to the selection
    pub is_selected: bool,
    /// Identifier of the atom the box was built for
    pub atom_id: Option<String>,
}

#[bon]
impl MathBox {
    /// Create a box. Dimensions default to zero.
    #[builder]
    pub fn new(
        /// Content of the box
        #[builder(start_fn)]
        content: BoxContent,
        /// Spacing class
        box_type: Option<BoxType>,
        /// CSS classes
        classes: Option<Vec<String>>,
        /// Inline CSS
        style: Option<CssStyle>,
        /// Extent above the baseline
        height: Option<f64>,
        /// Extent below the baseline
        depth: Option<f64>,
        /// Advance width
        width: Option<f64>,
        /// Italic correction
        italic: Option<f64>,
        /// Accent skew
        skew: Option<f64>,
        /// Largest font size multiplier inside the box
        max_font_size: Option<f64>,
    ) -> Self {
        Self {
            content,
            box_type,
            classes: classes.unwrap_or_default(),
            style: style.unwrap_or_default(),
            height: height.unwrap_or_default(),
            depth: depth.unwrap_or_default(),
            width,
            italic: italic.unwrap_or_default(),
            skew: skew.unwrap_or_default(),
            max_font_size: max_font_size.unwrap_or_default(),
            is_selected: false,
            atom_id: None,
        }
    }
}

impl MathBox {
    /// A composite box sized from its children.
    #[must_use]
    pub fn from_children(children: Vec<Self>) -> Self {
        let mut node = Self::builder(BoxContent::Children(children)).build();
        node.size_from_children();
        node
    }

    /// Height/depth/width/max font size of a composite box from its
    /// children. Width is unknown when any child's is.
    pub fn size_from_children(&mut self) {
        if let BoxContent::Children(children) = &self.content {
            let mut height = 0.0f64;
            let mut depth = 0.0f64;
            let mut max_font_size = 0.0f64;
            let mut width = Some(0.0);
            for child in children {
                height = height.max(child.height);
                depth = depth.max(child.depth);
                max_font_size = max_font_size.max(child.max_font_size);
                width = width.zip(child.width).map(|(w, c)| w + c);
            }
            self.height = height;
            self.depth = depth;
            self.max_font_size = max_font_size;
            self.width = width;
        }
    }

    /// Total vertical extent
    #[must_use]
    pub fn total_height(&self) -> f64 {
        self.height + self.depth
    }

    /// Whether the box carries `class_name`
    #[must_use]
    pub fn has_class(&self, class_name: &str) -> bool {
        self.classes.iter().any(|cls| cls == class_name)
    }

    /// Children of a composite box
    #[must_use]
    pub fn children(&self) -> &[Self] {
        match &self.content {
            BoxContent::Children(children) => children,
            _ => &[],
        }
    }

    /// Mutable children of a composite box
    pub const fn children_mut(&mut self) -> Option<&mut Vec<Self>> {
        match &mut self.content {
            BoxContent::Children(children) => Some(children),
            _ => None,
        }
    }

    /// Glyphs of a text box
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            BoxContent::Text { text, .. } => Some(text),
            _ => None,
        }
    }

    /// The vertical list body, if this is a vlist
    #[must_use]
    pub const fn vlist(&self) -> Option<&VList> {
        match &self.content {
            BoxContent::VList(vlist) => Some(vlist),
            _ => None,
        }
    }

    /// Whether this box is a single glyph
    #[must_use]
    pub fn is_character_box(&self) -> bool {
        match &self.content {
            BoxContent::Text { text, .. } => text.chars().count() == 1,
            BoxContent::Children(children) => {
                children.len() == 1 && children[0].is_character_box()
            }
            _ => false,
        }
    }

    /// Spacing class of the first typed leaf, looking through untyped
    /// wrappers. Caret anchors inside a wrapper do not count.
    #[must_use]
    pub fn initial_type(&self) -> Option<BoxType> {
        self.box_type.or_else(|| match &self.content {
            BoxContent::Children(children) => children
                .iter()
                .filter(|child| !child.is_first())
                .find_map(Self::initial_type),
            _ => None,
        })
    }

    /// Spacing class of the last typed leaf, looking through untyped
    /// wrappers. Caret anchors inside a wrapper do not count.
    #[must_use]
    pub fn final_type(&self) -> Option<BoxType> {
        self.box_type.or_else(|| match &self.content {
            BoxContent::Children(children) => children
                .iter()
                .rev()
                .filter(|child| !child.is_first())
                .find_map(Self::final_type),
            _ => None,
        })
    }

    /// Whether this is the caret anchor of a list
    #[must_use]
    pub fn is_first(&self) -> bool {
        self.box_type == Some(BoxType::First)
    }

    /// Multiply the vertical metrics (and known width) by `factor`.
    pub fn scale(&mut self, factor: f64) {
        self.height *= factor;
        self.depth *= factor;
        self.width = self.width.map(|w| w * factor);
    }

    /// Wrap `self` in an untyped composite box.
    #[must_use]
    pub fn wrap(self, classes: Vec<String>) -> Self {
        let mut wrapper = Self::from_children(vec![self]);
        wrapper.classes = classes;
        wrapper
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn glyph(text: &str, box_type: BoxType, height: f64, depth: f64) -> MathBox {
        MathBox::builder(BoxContent::Text {
            text: text.to_owned(),
            font: FontFamily::MainRegular,
        })
        .box_type(box_type)
        .height(height)
        .depth(depth)
        .width(0.5)
        .build()
    }

    #[test]
    fn composite_takes_max_of_children() {
        let span = MathBox::from_children(vec![
            glyph("a", BoxType::Mord, 0.4, 0.0),
            glyph("(", BoxType::Mopen, 0.75, 0.25),
        ]);
        assert_eq!(span.height, 0.75);
        assert_eq!(span.depth, 0.25);
        assert_eq!(span.width, Some(1.0));
    }

    #[test]
    fn untyped_wrappers_are_transparent() {
        let inner = MathBox::from_children(vec![
            glyph("(", BoxType::Mopen, 0.75, 0.25),
            glyph("x", BoxType::Mord, 0.43, 0.0),
        ]);
        let anchor = MathBox::builder(BoxContent::Empty)
            .box_type(BoxType::First)
            .build();
        let outer = MathBox::from_children(vec![anchor, inner]);
        assert_eq!(outer.initial_type(), Some(BoxType::Mopen));
        assert_eq!(outer.final_type(), Some(BoxType::Mord));
        assert_eq!(MathBox::builder(BoxContent::Empty).build().initial_type(), None);
    }

    #[test]
    fn character_box_detection() {
        assert!(glyph("x", BoxType::Mord, 0.43, 0.0).is_character_box());
        assert!(!glyph("xy", BoxType::Mord, 0.43, 0.0).is_character_box());
        let wrapped = glyph("x", BoxType::Mord, 0.43, 0.0).wrap(vec![]);
        assert!(wrapped.is_character_box());
    }

    #[test]
    fn font_names_match_metric_tables() {
        assert_eq!(FontFamily::MainRegular.as_ref(), "Main-Regular");
        assert_eq!("Size2-Regular".parse::<FontFamily>().ok(), Some(FontFamily::Size2));
        assert_eq!(FontFamily::sized(3), FontFamily::Size3);
    }
}
