//! Font metrics
//!
//! Two kinds of data live here. The per-size layout constants (TeX's sigma
//! and xi font parameters) are exposed through [`FontMetrics`]; TeX keeps
//! three sets of them, for text size (size index 5 and up), script size
//! (3 and 4) and scriptscript size (1 and 2). The glyph tables map a font
//! family and code point to a [`CharacterMetrics`].
//!
//! Both are generated by `build.rs` from the JSON files under `data/`.

use crate::namespace::KeyMap;
use crate::types::{LayoutError, LayoutErrorKind, Mode};

include!(concat!(env!("OUT_DIR"), "/sigmas_and_xis.rs"));

/// Metrics of a single glyph, in ems of the font it belongs to
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharacterMetrics {
    /// Extent below the baseline
    pub depth: f64,
    /// Extent above the baseline
    pub height: f64,
    /// Italic correction
    pub italic: f64,
    /// Horizontal offset for accents placed over the glyph
    pub skew: f64,
    /// Advance width
    pub width: f64,
}

impl CharacterMetrics {
    /// Build metrics from the `[depth, height, italic, skew, width]` order
    /// used by the data tables
    #[must_use]
    pub const fn new(depth: f64, height: f64, italic: f64, skew: f64, width: f64) -> Self {
        Self {
            depth,
            height,
            italic,
            skew,
            width,
        }
    }
}

include!(concat!(env!("OUT_DIR"), "/glyph_metrics.rs"));

/// Index into [`FONT_METRICS`]
pub type FontSizeIndex = usize;

/// Character used as a stand-in for text-mode glyphs missing from the tables
const TEXT_FALLBACK: u32 = 'M' as u32;

/// Per-family glyph overrides layered on top of the built-in tables
pub type MetricMap = KeyMap<u32, CharacterMetrics>;

/// Glyph metric lookup with optional runtime additions.
#[derive(Debug, Default, Clone)]
pub struct FontMetricsData {
    /// Metrics added at runtime, consulted after the built-in tables
    pub custom: KeyMap<String, MetricMap>,
}

impl FontMetricsData {
    /// Look up a glyph. `Ok(None)` means the family exists but has no entry
    /// for `char_code`; an unknown family is an error.
    pub fn get_metric(
        &self,
        font_family: &str,
        char_code: u32,
    ) -> Result<Option<&CharacterMetrics>, LayoutError> {
        if let Some(metrics) = GLYPH_METRICS.get(font_family) {
            if let Some(found) = metrics.get(&char_code) {
                return Ok(Some(found));
            }
            return Ok(self
                .custom
                .get(font_family)
                .and_then(|custom| custom.get(&char_code)));
        }
        if let Some(custom) = self.custom.get(font_family) {
            return Ok(custom.get(&char_code));
        }
        Err(LayoutError::new(LayoutErrorKind::MissingFontMetrics {
            font_family: font_family.to_owned(),
        }))
    }

    /// Register metrics for a glyph, creating the family if needed.
    pub fn add_custom_metrics(
        &mut self,
        font_family: String,
        char_code: u32,
        metrics: CharacterMetrics,
    ) {
        self.custom
            .entry(font_family)
            .or_default()
            .insert(char_code, metrics);
    }

    /// Look up the metrics of `character` in `font`. Text-mode characters the
    /// tables do not know borrow the metrics of `M`.
    pub fn character_metrics(
        &self,
        character: char,
        font: &str,
        mode: Mode,
    ) -> Result<Option<&CharacterMetrics>, LayoutError> {
        if let Some(metrics) = self.get_metric(font, character as u32)? {
            return Ok(Some(metrics));
        }
        if mode == Mode::Text {
            return self.get_metric(font, TEXT_FALLBACK);
        }
        Ok(None)
    }
}

/// Size class used to pick a set of [`FontMetrics`] for a font size index.
#[must_use]
pub const fn size_index(size: usize) -> FontSizeIndex {
    if size >= 5 {
        0
    } else if size >= 3 {
        1
    } else {
        2
    }
}

/// The layout constants for a font size index (1 to 11).
#[must_use]
pub const fn global_metrics(size: usize) -> &'static FontMetrics {
    &FONT_METRICS[size_index(size)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_share_metrics() {
        let data = FontMetricsData::default();
        let five = data
            .character_metrics('5', "Main-Regular", Mode::Math)
            .unwrap()
            .copied()
            .unwrap();
        assert_eq!(five, CharacterMetrics::new(0.0, 0.64444, 0.0, 0.0, 0.5));
    }

    #[test]
    fn unknown_family_is_an_error() {
        let data = FontMetricsData::default();
        let err = data.get_metric("Fraktur-Regular", 65).unwrap_err();
        assert!(err.is_invariant_violation());
    }

    #[test]
    fn text_mode_falls_back_to_m() {
        let data = FontMetricsData::default();
        let m = data.get_metric("Main-Regular", 'M' as u32).unwrap().copied();
        let fallback = data
            .character_metrics('\u{4e2d}', "Main-Regular", Mode::Text)
            .unwrap()
            .copied();
        assert_eq!(fallback, m);
        assert!(
            data.character_metrics('\u{4e2d}', "Main-Regular", Mode::Math)
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn custom_metrics_extend_tables() {
        let mut data = FontMetricsData::default();
        data.add_custom_metrics(
            "Main-Regular".to_owned(),
            0x2603,
            CharacterMetrics::new(0.1, 0.7, 0.0, 0.0, 0.9),
        );
        let snowman = data.get_metric("Main-Regular", 0x2603).unwrap().copied();
        assert_eq!(snowman.map(|m| m.width), Some(0.9));
    }

    #[test]
    fn constants_scale_with_size() {
        assert_eq!(size_index(6), 0);
        assert_eq!(size_index(3), 1);
        assert_eq!(size_index(1), 2);
        let text = global_metrics(6);
        assert_eq!(text.axis_height, 0.25);
        assert!((text.css_em_per_mu - 1.0 / 18.0).abs() < 1e-12);
        assert!(global_metrics(1).quad > text.quad);
    }
}
