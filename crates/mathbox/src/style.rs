//! Mathstyle definitions and transitions
//!
//! TeX lays out math in one of eight styles: display, text, script and
//! scriptscript, each in a normal and a cramped variant. This module provides
//! the eight canonical [`Mathstyle`] values as `'static` singletons and the
//! table lookups that move between them when entering a superscript,
//! subscript, numerator, denominator or radical.

use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::types::{LayoutError, LayoutErrorKind};

/// One of the eight TeX math styles.
///
/// Values are only ever handed out as `&'static Mathstyle` pointing into a
/// fixed table, so two styles are the same style exactly when their `id`s
/// match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mathstyle {
    /// Unique identifier, 0 to 7
    pub id: usize,
    /// Size level (0=display, 1=text, 2=script, 3=scriptscript)
    pub size: usize,
    /// Whether the style is cramped
    pub cramped: bool,
}

/// Names of the four uncramped styles as written in TeX source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum MathstyleName {
    /// `\displaystyle`
    Displaystyle,
    /// `\textstyle`
    Textstyle,
    /// `\scriptstyle`
    Scriptstyle,
    /// `\scriptscriptstyle`
    Scriptscriptstyle,
}

impl MathstyleName {
    /// The canonical uncramped style with this name
    #[must_use]
    pub const fn style(self) -> &'static Mathstyle {
        match self {
            Self::Displaystyle => DISPLAY,
            Self::Textstyle => TEXT,
            Self::Scriptstyle => SCRIPT,
            Self::Scriptscriptstyle => SCRIPTSCRIPT,
        }
    }
}

impl Mathstyle {
    const fn new(id: usize, size: usize, cramped: bool) -> Self {
        Self { id, size, cramped }
    }

    /// Resolve a style name (`"displaystyle"`, `"textstyle"`, ...) to its
    /// canonical singleton.
    ///
    /// # Panics
    /// An unknown name is a bug in the caller, not a recoverable condition.
    /// Use [`Mathstyle::try_from_name`] for names that come from untrusted
    /// input.
    #[must_use]
    #[allow(clippy::panic, reason = "unknown style names are a caller bug")]
    pub fn from_name(name: &str) -> &'static Self {
        match Self::try_from_name(name) {
            Ok(style) => style,
            Err(err) => panic!("{err}"),
        }
    }

    /// Fallible variant of [`Mathstyle::from_name`].
    pub fn try_from_name(name: &str) -> Result<&'static Self, LayoutError> {
        name.parse::<MathstyleName>()
            .map(MathstyleName::style)
            .map_err(|_| {
                LayoutError::new(LayoutErrorKind::UnknownStyle {
                    name: name.to_owned(),
                })
            })
    }

    /// Name of the uncramped variant of this style
    #[must_use]
    pub const fn name(&self) -> MathstyleName {
        match self.size {
            0 => MathstyleName::Displaystyle,
            1 => MathstyleName::Textstyle,
            2 => MathstyleName::Scriptstyle,
            _ => MathstyleName::Scriptscriptstyle,
        }
    }

    /// Get the style of a superscript given a base in the current style.
    #[must_use]
    pub const fn sup(&self) -> &'static Self {
        &STYLES[SUP[self.id]]
    }

    /// Get the style of a subscript given a base in the current style.
    #[must_use]
    pub const fn sub(&self) -> &'static Self {
        &STYLES[SUB[self.id]]
    }

    /// Get the style of a fraction numerator given the fraction in the current
    /// style.
    #[must_use]
    pub const fn frac_num(&self) -> &'static Self {
        &STYLES[FRAC_NUM[self.id]]
    }

    /// Get the style of a fraction denominator given the fraction in the
    /// current style.
    #[must_use]
    pub const fn frac_den(&self) -> &'static Self {
        &STYLES[FRAC_DEN[self.id]]
    }

    /// Get the cramped version of a style. Cramping a cramped style returns
    /// the same style.
    #[must_use]
    pub const fn cramp(&self) -> &'static Self {
        &STYLES[CRAMP[self.id]]
    }

    /// Get a text or display version of this style.
    #[must_use]
    pub const fn text(&self) -> &'static Self {
        &STYLES[TEXT_LOOKUP[self.id]]
    }

    /// Return true if this style is tightly spaced
    /// (scriptstyle/scriptscriptstyle)
    #[must_use]
    pub const fn is_tight(&self) -> bool {
        self.size >= 2
    }

    /// Scale factor of this style relative to text style at the same font
    /// size.
    #[must_use]
    pub const fn size_multiplier(&self) -> f64 {
        SIZE_MULTIPLIER[self.size]
    }
}

// IDs of the different styles
const D: usize = 0;
const DC: usize = 1;
const T: usize = 2;
const TC: usize = 3;
const S: usize = 4;
const SC: usize = 5;
const SS: usize = 6;
const SSC: usize = 7;

const STYLES: [Mathstyle; 8] = [
    Mathstyle::new(D, 0, false),
    Mathstyle::new(DC, 0, true),
    Mathstyle::new(T, 1, false),
    Mathstyle::new(TC, 1, true),
    Mathstyle::new(S, 2, false),
    Mathstyle::new(SC, 2, true),
    Mathstyle::new(SS, 3, false),
    Mathstyle::new(SSC, 3, true),
];

// Lookup tables for switching from one style to another
const SUP: [usize; 8] = [S, SC, S, SC, SS, SSC, SS, SSC];
const SUB: [usize; 8] = [SC, SC, SC, SC, SSC, SSC, SSC, SSC];
const FRAC_NUM: [usize; 8] = [T, TC, S, SC, SS, SSC, SS, SSC];
const FRAC_DEN: [usize; 8] = [TC, TC, SC, SC, SSC, SSC, SSC, SSC];
const CRAMP: [usize; 8] = [DC, DC, TC, TC, SC, SC, SSC, SSC];
const TEXT_LOOKUP: [usize; 8] = [D, DC, T, TC, T, TC, T, TC];

const SIZE_MULTIPLIER: [f64; 4] = [1.0, 1.0, 0.7, 0.5];

/// The display style, used for formulas set on their own line.
///
/// Operators are drawn large and limits are stacked above and below them.
pub const DISPLAY: &Mathstyle = &STYLES[D];

/// The text style, used for formulas inline with running text.
pub const TEXT: &Mathstyle = &STYLES[T];

/// The script style, used for first-level superscripts and subscripts.
///
/// Scaled to 0.7 of the text size and tightly spaced.
pub const SCRIPT: &Mathstyle = &STYLES[S];

/// The scriptscript style, used for scripts on scripts such as `x^{y^z}`.
///
/// Scaled to 0.5 of the text size and tightly spaced.
pub const SCRIPTSCRIPT: &Mathstyle = &STYLES[SS];

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator as _;

    #[test]
    fn test_superscript() {
        assert_eq!(DISPLAY.sup().id, S);
        assert_eq!(TEXT.sup().id, S);
        assert_eq!(SCRIPT.sup().id, SS);
        assert_eq!(TEXT.cramp().sup().id, SC);
    }

    #[test]
    fn test_subscript() {
        assert_eq!(DISPLAY.sub().id, SC);
        assert_eq!(TEXT.sub().id, SC);
        assert_eq!(SCRIPT.sub().id, SSC);
    }

    #[test]
    fn test_fractions() {
        assert_eq!(DISPLAY.frac_num().id, T);
        assert_eq!(TEXT.frac_num().id, S);
        assert_eq!(DISPLAY.frac_den().id, TC);
        assert_eq!(SCRIPT.frac_den().id, SSC);
    }

    #[test]
    fn test_cramp_is_idempotent() {
        for style in &STYLES {
            assert_eq!(style.cramp(), style.cramp().cramp());
            assert!(style.cramp().cramped);
            assert_eq!(style.cramp().size, style.size);
        }
    }

    #[test]
    fn test_text() {
        assert_eq!(DISPLAY.text().id, D);
        assert_eq!(SCRIPT.text().id, T);
        assert_eq!(SCRIPTSCRIPT.cramp().text().id, TC);
    }

    #[test]
    fn test_is_tight() {
        assert!(!DISPLAY.is_tight());
        assert!(!TEXT.is_tight());
        assert!(SCRIPT.is_tight());
        assert!(SCRIPTSCRIPT.is_tight());
    }

    #[test]
    fn test_size_multipliers() {
        assert_eq!(DISPLAY.size_multiplier(), 1.0);
        assert_eq!(TEXT.size_multiplier(), 1.0);
        assert_eq!(SCRIPT.size_multiplier(), 0.7);
        assert_eq!(SCRIPTSCRIPT.cramp().size_multiplier(), 0.5);
    }

    #[test]
    fn test_names_round_trip() {
        for name in MathstyleName::iter() {
            let style = Mathstyle::from_name(name.as_ref());
            assert_eq!(style.name(), name);
            assert!(!style.cramped);
        }
    }

    #[test]
    fn test_unknown_name() {
        let err = Mathstyle::try_from_name("hugestyle").unwrap_err();
        assert!(err.is_invariant_violation());
    }

    #[test]
    #[should_panic(expected = "unknown mathstyle")]
    fn test_unknown_name_panics() {
        let _ = Mathstyle::from_name("hugestyle");
    }
}
