//! Layout context
//!
//! A [`Context`] holds everything the layout of one subtree depends on: the
//! mathstyle, the font size, colors and the phantom flag. Contexts are
//! immutable by convention. Every method that "changes" something returns a
//! new context, so a single top-down pass can fan out one context per scope
//! with no shared mutable state.

use alloc::rc::Rc;
use bon::bon;

use crate::font_metrics::{FontMetrics, FontMetricsData, global_metrics};
use crate::namespace::KeyMap;
use crate::style::{DISPLAY, Mathstyle, TEXT};
use crate::types::{IdPolicy, LayoutSettings};

/// For each font size index, the size used in
/// `[text, script, scriptscript]` style. Taken from TeX with
/// `\normalsize` = 10pt.
const SIZE_STYLE_MAP: [[usize; 3]; 11] = [
    [1, 1, 1],   // size1: [5, 5, 5]              \tiny
    [2, 1, 1],   // size2: [6, 5, 5]
    [3, 1, 1],   // size3: [7, 5, 5]              \scriptsize
    [4, 2, 1],   // size4: [8, 6, 5]              \footnotesize
    [5, 2, 1],   // size5: [9, 6, 5]              \small
    [6, 3, 1],   // size6: [10, 7, 5]             \normalsize
    [7, 4, 2],   // size7: [12, 8, 6]             \large
    [8, 6, 3],   // size8: [14.4, 10, 7]          \Large
    [9, 7, 6],   // size9: [17.28, 12, 10]        \LARGE
    [10, 8, 7],  // size10: [20.74, 14.4, 12]     \huge
    [11, 10, 9], // size11: [24.88, 20.74, 17.28] \HUGE
];

/// Scale of each font size index relative to `\normalsize`
pub const SIZE_MULTIPLIERS: [f64; 11] =
    [0.5, 0.6, 0.7, 0.8, 0.9, 1.0, 1.2, 1.44, 1.728, 2.074, 2.488];

/// Effective font size index of `text_size` when set in `style`
const fn size_at_style(text_size: usize, style: &Mathstyle) -> usize {
    if style.size < 2 {
        text_size
    } else {
        SIZE_STYLE_MAP[text_size - 1][style.size - 1]
    }
}

/// Per-scope layout configuration.
#[derive(Debug, Clone)]
pub struct Context {
    /// Current mathstyle
    pub mathstyle: &'static Mathstyle,
    /// Effective font size index (1 to 11) after applying the mathstyle
    pub size: usize,
    /// Font size index the mathstyle is applied to
    pub text_size: usize,
    /// Scale of this context relative to `\normalsize`
    pub size_multiplier: f64,
    /// Foreground color
    pub color: Option<String>,
    /// Background color
    pub background_color: Option<String>,
    /// When set, boxes are laid out but painted transparent
    pub phantom: bool,
    /// Whether boxes inside this scope belong to the selection
    pub is_selected: bool,
    /// Atom identifier policy
    pub id_policy: IdPolicy,
    /// Macro dictionary shared by every context of a render
    pub macros: Rc<KeyMap<String, String>>,
    /// Glyph metric tables shared by every context of a render
    pub metrics: Rc<FontMetricsData>,
    /// Mathstyle of the enclosing scope
    pub parent_mathstyle: &'static Mathstyle,
    /// Effective size of the enclosing scope
    pub parent_size: usize,
    /// Lower bound for rule thickness, in ems
    pub min_rule_thickness: f64,
    /// Upper bound for user dimensions, in ems
    pub max_size: f64,
    /// Global scale applied on top of font sizes
    pub scale: f64,
}

#[bon]
impl Context {
    /// Create a context. Omitted options take the values of
    /// [`LayoutSettings::default`].
    #[builder]
    pub fn new(
        mathstyle: Option<&'static Mathstyle>,
        size: Option<usize>,
        color: Option<String>,
        background_color: Option<String>,
        phantom: Option<bool>,
        id_policy: Option<IdPolicy>,
        macros: Option<Rc<KeyMap<String, String>>>,
        metrics: Option<Rc<FontMetricsData>>,
        min_rule_thickness: Option<f64>,
        max_size: Option<f64>,
        scale: Option<f64>,
    ) -> Self {
        let mathstyle = mathstyle.unwrap_or(TEXT);
        let text_size = size.unwrap_or(Self::BASESIZE).clamp(1, SIZE_MULTIPLIERS.len());
        let size = size_at_style(text_size, mathstyle);
        Self {
            mathstyle,
            size,
            text_size,
            size_multiplier: SIZE_MULTIPLIERS[size - 1],
            color,
            background_color,
            phantom: phantom.unwrap_or(false),
            is_selected: false,
            id_policy: id_policy.unwrap_or_default(),
            macros: macros.unwrap_or_default(),
            metrics: metrics.unwrap_or_default(),
            parent_mathstyle: mathstyle,
            parent_size: size,
            min_rule_thickness: min_rule_thickness.unwrap_or(0.0),
            max_size: max_size.unwrap_or(f64::INFINITY),
            scale: scale.unwrap_or(1.0),
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Context {
    /// The font size index of `\normalsize`
    pub const BASESIZE: usize = 6;

    /// Root context for a render.
    #[must_use]
    pub fn from_settings(settings: &LayoutSettings) -> Self {
        Self::builder()
            .mathstyle(if settings.display_mode { DISPLAY } else { TEXT })
            .size(settings.size)
            .maybe_color(settings.color.clone())
            .maybe_background_color(settings.background_color.clone())
            .id_policy(settings.id_policy.clone())
            .macros(Rc::clone(&settings.macros))
            .min_rule_thickness(settings.min_rule_thickness)
            .max_size(settings.max_size)
            .scale(settings.size_multiplier)
            .build()
    }

    /// A context identical to `self` whose parent scope is `self`, so that
    /// nothing laid out in it gets rescaled.
    #[must_use]
    pub fn scoped(&self) -> Self {
        self.child()
    }

    /// Child context that remembers `self` as its parent scope.
    fn child(&self) -> Self {
        let mut ctx = self.clone();
        ctx.parent_mathstyle = self.mathstyle;
        ctx.parent_size = self.size;
        ctx
    }

    /// Return a context with the given mathstyle. The font size index follows
    /// the style through the size table.
    #[must_use]
    pub fn with_mathstyle(&self, mathstyle: &'static Mathstyle) -> Self {
        let mut ctx = self.child();
        if self.mathstyle.id != mathstyle.id {
            let size = size_at_style(self.text_size, mathstyle);
            ctx.mathstyle = mathstyle;
            ctx.size = size;
            ctx.size_multiplier = SIZE_MULTIPLIERS[size - 1];
        }
        ctx
    }

    /// Return a context with the style named `name`.
    ///
    /// # Panics
    /// Panics on an unknown style name, see [`Mathstyle::from_name`].
    #[must_use]
    pub fn with_mathstyle_name(&self, name: &str) -> Self {
        self.with_mathstyle(Mathstyle::from_name(name))
    }

    /// Context for a superscript of a nucleus laid out in `self`
    #[must_use]
    pub fn sup(&self) -> Self {
        self.with_mathstyle(self.mathstyle.sup())
    }

    /// Context for a subscript of a nucleus laid out in `self`
    #[must_use]
    pub fn sub(&self) -> Self {
        self.with_mathstyle(self.mathstyle.sub())
    }

    /// Context for the numerator of a fraction laid out in `self`
    #[must_use]
    pub fn frac_num(&self) -> Self {
        self.with_mathstyle(self.mathstyle.frac_num())
    }

    /// Context for the denominator of a fraction laid out in `self`
    #[must_use]
    pub fn frac_den(&self) -> Self {
        self.with_mathstyle(self.mathstyle.frac_den())
    }

    /// Context with the cramped variant of the current style
    #[must_use]
    pub fn cramp(&self) -> Self {
        self.with_mathstyle(self.mathstyle.cramp())
    }

    /// Return a context with the given font size index, in at least text
    /// style.
    #[must_use]
    pub fn with_size(&self, size: usize) -> Self {
        let size = size.clamp(1, SIZE_MULTIPLIERS.len());
        let mut ctx = self.child();
        ctx.mathstyle = self.mathstyle.text();
        ctx.size = size;
        ctx.text_size = size;
        ctx.size_multiplier = SIZE_MULTIPLIERS[size - 1];
        ctx
    }

    /// Undo sizing commands such as `\Huge` while keeping the current style.
    #[must_use]
    pub fn with_base_sizing(&self) -> Self {
        let size = match self.mathstyle.size {
            2 => 3,
            3 => 1,
            _ => Self::BASESIZE,
        };
        let mut ctx = self.child();
        ctx.mathstyle = self.mathstyle.text();
        ctx.size = size;
        ctx.size_multiplier = SIZE_MULTIPLIERS[size - 1];
        ctx
    }

    /// Context in `mathstyle` applied to the normal size, ignoring sizing
    /// commands in effect.
    #[must_use]
    pub fn with_base_style(&self, mathstyle: &'static Mathstyle) -> Self {
        let size = size_at_style(Self::BASESIZE, mathstyle);
        let mut ctx = self.child();
        ctx.mathstyle = mathstyle;
        ctx.size = size;
        ctx.text_size = Self::BASESIZE;
        ctx.size_multiplier = SIZE_MULTIPLIERS[size - 1];
        ctx
    }

    /// Context painting in `color`
    #[must_use]
    pub fn with_color(&self, color: impl Into<String>) -> Self {
        let mut ctx = self.child();
        ctx.color = Some(color.into());
        ctx
    }

    /// Context painting its background in `color`
    #[must_use]
    pub fn with_background(&self, color: impl Into<String>) -> Self {
        let mut ctx = self.child();
        ctx.background_color = Some(color.into());
        ctx
    }

    /// Context whose boxes take up space but are invisible
    #[must_use]
    pub fn with_phantom(&self) -> Self {
        let mut ctx = self.child();
        ctx.phantom = true;
        ctx
    }

    /// Context whose boxes belong to the selection
    #[must_use]
    pub fn with_selected(&self, is_selected: bool) -> Self {
        let mut ctx = self.child();
        ctx.is_selected = is_selected;
        ctx
    }

    /// Foreground color, `transparent` for phantoms
    #[must_use]
    pub fn get_color(&self) -> Option<String> {
        if self.phantom {
            Some("transparent".to_owned())
        } else {
            self.color.clone()
        }
    }

    /// Background color, `transparent` for phantoms
    #[must_use]
    pub fn get_background_color(&self) -> Option<String> {
        if self.phantom && self.background_color.is_some() {
            Some("transparent".to_owned())
        } else {
            self.background_color.clone()
        }
    }

    /// Layout constants for the effective size of this context
    #[must_use]
    pub const fn font_metrics(&self) -> &'static FontMetrics {
        global_metrics(self.size)
    }

    /// Whether boxes built in this context must be rescaled before being
    /// placed in the parent scope.
    #[must_use]
    pub fn differs_from_parent(&self) -> bool {
        self.size != self.parent_size || self.mathstyle.id != self.parent_mathstyle.id
    }

    /// Ratio between this context's scale and `other`'s
    #[must_use]
    pub fn scale_relative_to(&self, other: &Self) -> f64 {
        self.size_multiplier / other.size_multiplier
    }

    /// Factor converting ems of this context to ems of the enclosing scope
    #[must_use]
    pub fn parent_scale(&self) -> f64 {
        self.size_multiplier / SIZE_MULTIPLIERS[self.parent_size - 1]
    }

    /// CSS classes switching from font size `old_size` to this context's
    #[must_use]
    pub fn sizing_classes(&self, old_size: usize) -> Vec<String> {
        if old_size == self.size {
            vec![]
        } else {
            vec![
                "sizing".to_owned(),
                format!("reset-size{old_size}"),
                format!("size{}", self.size),
            ]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{SCRIPT, SCRIPTSCRIPT};

    #[test]
    fn test_size_at_style() {
        assert_eq!(size_at_style(6, DISPLAY), 6);
        assert_eq!(size_at_style(6, SCRIPT), 3);
        assert_eq!(size_at_style(6, SCRIPTSCRIPT), 1);
    }

    #[test]
    fn test_transitions_are_non_mutating() {
        let ctx = Context::builder().mathstyle(DISPLAY).build();
        let sup = ctx.sup();
        assert_eq!(ctx.mathstyle, DISPLAY);
        assert_eq!(sup.mathstyle, SCRIPT);
        assert_eq!(sup.size, 3);
        assert!((sup.size_multiplier - 0.7).abs() < 1e-12);
        assert_eq!(sup.parent_mathstyle, DISPLAY);
        assert!(sup.differs_from_parent());
        assert!(!ctx.differs_from_parent());
        assert!((sup.parent_scale() - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_multiplier_matches_style_at_base_size() {
        let ctx = Context::default();
        for style in [DISPLAY, TEXT, SCRIPT, SCRIPTSCRIPT] {
            let scoped = ctx.with_mathstyle(style);
            assert!((scoped.size_multiplier - style.size_multiplier()).abs() < 1e-12);
        }
    }

    #[test]
    fn test_cramp_twice_equals_cramp_once() {
        let ctx = Context::default();
        let once = ctx.cramp();
        let twice = once.cramp();
        assert_eq!(once.mathstyle, twice.mathstyle);
        assert_eq!(once.size, twice.size);
    }

    #[test]
    fn test_phantom_forces_transparency() {
        let ctx = Context::default()
            .with_color("red")
            .with_background("yellow");
        assert_eq!(ctx.get_color().as_deref(), Some("red"));
        let phantom = ctx.with_phantom();
        assert_eq!(phantom.get_color().as_deref(), Some("transparent"));
        assert_eq!(phantom.get_background_color().as_deref(), Some("transparent"));
        assert_eq!(ctx.get_color().as_deref(), Some("red"));
    }

    #[test]
    fn test_with_size_resets_to_text() {
        let ctx = Context::builder().mathstyle(SCRIPT).build().with_size(8);
        assert_eq!(ctx.mathstyle, TEXT);
        assert_eq!(ctx.size, 8);
        assert_eq!(ctx.sizing_classes(Context::BASESIZE), [
            "sizing",
            "reset-size6",
            "size8"
        ]);
    }

    #[test]
    fn test_base_style_ignores_sizing() {
        let huge = Context::default().with_size(11);
        let script = huge.with_base_style(SCRIPT);
        assert_eq!(script.size, 3);
        assert!((script.scale_relative_to(&huge) - 0.7 / 2.488).abs() < 1e-12);
        assert!(huge.scoped().sizing_classes(huge.size).is_empty());
    }

    #[test]
    fn test_from_settings() {
        let settings = LayoutSettings::builder()
            .display_mode(true)
            .color("blue".to_owned())
            .build();
        let ctx = Context::from_settings(&settings);
        assert_eq!(ctx.mathstyle, DISPLAY);
        assert_eq!(ctx.color.as_deref(), Some("blue"));
        assert!(Rc::ptr_eq(&ctx.macros, &settings.macros));
    }
}
