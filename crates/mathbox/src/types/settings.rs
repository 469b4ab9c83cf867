//! Render-wide configuration
//!
//! [`LayoutSettings`] carries the values a caller chooses once per render.
//! [`crate::Context::from_settings`] turns them into the root context that the
//! layout pass then clones per scope.

use alloc::rc::Rc;
use bon::bon;

use crate::namespace::KeyMap;

/// How boxes are tagged with the identity of the atom that produced them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum IdPolicy {
    /// Boxes carry no atom identifier.
    #[default]
    None,
    /// Boxes carry an identifier derived from the atom's path from the root,
    /// prefixed with the given string. Identifiers are stable across renders
    /// of the same tree.
    Path {
        /// Prefix prepended to every identifier, e.g. `"mf-"`
        prefix: String,
    },
}

/// Resolved configuration for one render.
///
/// All fields hold concrete values; the builder fills in defaults for the
/// options a caller leaves out.
#[derive(Debug, Clone)]
pub struct LayoutSettings {
    /// Whether the formula is laid out as a display (block) formula. Selects
    /// the display mathstyle for the root context.
    pub display_mode: bool,
    /// Font size index, 1 to 11. Index 6 is the normal size.
    pub size: usize,
    /// Global scaling factor applied on top of the font size.
    pub size_multiplier: f64,
    /// Lower bound for rule thickness (fraction bars, radicals), in ems.
    pub min_rule_thickness: f64,
    /// Upper bound for user-specified dimensions, in ems.
    pub max_size: f64,
    /// Foreground color for the whole formula.
    pub color: Option<String>,
    /// Background color for the whole formula.
    pub background_color: Option<String>,
    /// Atom identifier policy.
    pub id_policy: IdPolicy,
    /// Macro dictionary forwarded to collaborators that re-parse
    /// macro-expanded content. Shared by every context of the render.
    pub macros: Rc<KeyMap<String, String>>,
}

#[bon]
impl LayoutSettings {
    /// Creates settings, applying defaults for every omitted option.
    ///
    /// # Default Values
    /// - `display_mode`: `false`
    /// - `size`: `6` (normal size)
    /// - `size_multiplier`: `1.0`
    /// - `min_rule_thickness`: `0.0`
    /// - `max_size`: `f64::INFINITY`
    /// - `id_policy`: [`IdPolicy::None`]
    /// - `macros`: empty
    #[must_use]
    #[builder]
    pub fn new(
        /// Display (block) layout
        display_mode: Option<bool>,
        /// Font size index, clamped to 1..=11
        size: Option<usize>,
        /// Global scaling factor
        size_multiplier: Option<f64>,
        /// Minimum rule thickness in ems
        min_rule_thickness: Option<f64>,
        /// Maximum dimension in ems
        max_size: Option<f64>,
        /// Foreground color
        color: Option<String>,
        /// Background color
        background_color: Option<String>,
        /// Atom identifier policy
        id_policy: Option<IdPolicy>,
        /// Macro dictionary
        macros: Option<KeyMap<String, String>>,
    ) -> Self {
        Self {
            display_mode: display_mode.unwrap_or(false),
            size: size.unwrap_or(6).clamp(1, 11),
            size_multiplier: size_multiplier.unwrap_or(1.0),
            min_rule_thickness: min_rule_thickness.unwrap_or(0.0).max(0.0),
            max_size: max_size.unwrap_or(f64::INFINITY).max(0.0),
            color,
            background_color,
            id_policy: id_policy.unwrap_or_default(),
            macros: Rc::new(macros.unwrap_or_default()),
        }
    }
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_applied() {
        let settings = LayoutSettings::default();
        assert!(!settings.display_mode);
        assert_eq!(settings.size, 6);
        assert_eq!(settings.id_policy, IdPolicy::None);
        assert!(settings.max_size.is_infinite());
    }

    #[test]
    fn size_is_clamped() {
        let settings = LayoutSettings::builder().size(42).build();
        assert_eq!(settings.size, 11);
        let settings = LayoutSettings::builder().size(0).build();
        assert_eq!(settings.size, 1);
    }
}
