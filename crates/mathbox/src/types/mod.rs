//! Core type definitions shared across the layout engine

use core::fmt;
use core::option;

use alloc::rc::Rc;

use strum::{AsRefStr, Display, EnumCount, EnumIter, EnumString, FromRepr};

mod layout_error;
pub use layout_error::{LayoutError, LayoutErrorKind};

mod settings;
pub use settings::{IdPolicy, LayoutSettings};

/// Whether an atom was produced in math or text mode.
///
/// Text-mode glyphs use the upright main font and fall back to the metrics of
/// `M` for characters the tables do not know.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, AsRefStr, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Mode {
    /// Math mode (the default)
    #[default]
    Math,
    /// Text mode, e.g. the body of `\text{}`
    Text,
}

/// CSS properties emitted by the markup serializer.
///
/// Serialized in `kebab-case` via `strum`.
#[derive(
    EnumIter, Debug, Copy, AsRefStr, PartialEq, Eq, Hash, Clone, Display, EnumCount, FromRepr,
)]
#[strum(serialize_all = "kebab-case")]
#[repr(u8)]
pub enum CssProperty {
    /// <https://developer.mozilla.org/docs/Web/CSS/background-color>
    BackgroundColor,
    /// <https://developer.mozilla.org/docs/Web/CSS/border-bottom-width>
    BorderBottomWidth,
    /// <https://developer.mozilla.org/docs/Web/CSS/border-right-style>
    BorderRightStyle,
    /// <https://developer.mozilla.org/docs/Web/CSS/border-right-width>
    BorderRightWidth,
    /// <https://developer.mozilla.org/docs/Web/CSS/color>
    Color,
    /// <https://developer.mozilla.org/docs/Web/CSS/font-size>
    FontSize,
    /// <https://developer.mozilla.org/docs/Web/CSS/height>
    Height,
    /// <https://developer.mozilla.org/docs/Web/CSS/margin>
    Margin,
    /// <https://developer.mozilla.org/docs/Web/CSS/margin-left>
    MarginLeft,
    /// <https://developer.mozilla.org/docs/Web/CSS/margin-right>
    MarginRight,
    /// <https://developer.mozilla.org/docs/Web/CSS/min-width>
    MinWidth,
    /// <https://developer.mozilla.org/docs/Web/CSS/padding-left>
    PaddingLeft,
    /// <https://developer.mozilla.org/docs/Web/CSS/position>
    Position,
    /// <https://developer.mozilla.org/docs/Web/CSS/top>
    Top,
    /// <https://developer.mozilla.org/docs/Web/CSS/vertical-align>
    VerticalAlign,
    /// <https://developer.mozilla.org/docs/Web/CSS/width>
    Width,
}

/// Inline style of a box, stored as a fixed array indexed by
/// [`CssProperty`].
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CssStyle {
    map: [Option<Rc<str>>; CssProperty::COUNT],
}

impl fmt::Debug for CssStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ds = f.debug_struct("CssStyle");
        for (property, value) in self {
            ds.field(property.as_ref(), &value);
        }
        ds.finish()
    }
}

/// Iterator over the properties set on a [`CssStyle`]
pub struct CssStyleIter<'a> {
    index: usize,
    data: &'a [Option<Rc<str>>; CssProperty::COUNT],
}

impl<'a> Iterator for CssStyleIter<'a> {
    type Item = (CssProperty, &'a str);
    fn next(&mut self) -> Option<Self::Item> {
        while self.index < CssProperty::COUNT {
            let idx = self.index;
            self.index += 1;
            if let Some(v) = &self.data[idx]
                && let Some(prop) = CssProperty::from_repr(idx as u8)
            {
                return Some((prop, v.as_ref()));
            }
        }
        None
    }
}

impl<'a> IntoIterator for &'a CssStyle {
    type Item = (CssProperty, &'a str);
    type IntoIter = CssStyleIter<'a>;
    fn into_iter(self) -> Self::IntoIter {
        CssStyleIter {
            index: 0,
            data: &self.map,
        }
    }
}

impl CssStyle {
    /// Inserts or replaces a property.
    #[inline]
    pub fn insert<T>(&mut self, property: CssProperty, value: T)
    where
        T: Into<Rc<str>>,
    {
        self.map[property as usize] = Some(value.into());
    }

    /// Removes a property, returning whether it was set.
    pub fn remove(&mut self, property: CssProperty) -> bool {
        self.map[property as usize].take().is_some()
    }

    /// Copies every property set on `other` into `self`.
    pub fn extend(&mut self, other: &Self) {
        for (i, value) in other.map.iter().enumerate() {
            if let Some(value) = value {
                self.map[i] = Some(Rc::clone(value));
            }
        }
    }

    /// Retrieves the value of a property, if set.
    #[inline]
    #[must_use]
    pub fn get(&self, property: CssProperty) -> Option<&str> {
        self.map[property as usize].as_deref()
    }

    /// Whether no property is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.iter().all(option::Option::is_none)
    }

    /// Iterates over the set properties in declaration order.
    #[must_use]
    pub fn iter(&self) -> CssStyleIter<'_> {
        self.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn css_style_keeps_declaration_order() {
        let mut style = CssStyle::default();
        style.insert(CssProperty::Width, "1em");
        style.insert(CssProperty::Color, "red");
        let props: Vec<_> = style.iter().map(|(p, _)| p.as_ref().to_owned()).collect();
        assert_eq!(props, ["color", "width"]);
    }

    #[test]
    fn css_style_extend_overrides() {
        let mut base = CssStyle::default();
        base.insert(CssProperty::Color, "red");
        let mut other = CssStyle::default();
        other.insert(CssProperty::Color, "blue");
        base.extend(&other);
        assert_eq!(base.get(CssProperty::Color), Some("blue"));
        assert!(base.remove(CssProperty::Color));
        assert!(base.is_empty());
    }
}
