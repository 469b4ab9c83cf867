//! Units conversion
//!
//! Converts TeX dimensions to ems of the current context and formats ems for
//! the markup serializer.

use crate::context::Context;
use crate::types::{LayoutError, LayoutErrorKind};

/// A dimension with a TeX unit
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement<T>
where
    T: AsRef<str>,
{
    /// Numeric value of the measurement
    pub number: f64,
    /// Unit of measurement (e.g., "mu", "em", "ex", "pt")
    pub unit: T,
}

/// Measurement with an owned unit string
pub type MeasurementOwned = Measurement<String>;

/// Measurement with a static unit string, used for constants
pub type MeasurementStatic = Measurement<&'static str>;

impl MeasurementStatic {
    /// A length in math units
    #[must_use]
    pub const fn mu(number: f64) -> Self {
        Self { number, unit: "mu" }
    }

    /// A length in ems
    #[must_use]
    pub const fn em(number: f64) -> Self {
        Self { number, unit: "em" }
    }
}

/// TeX points per unit for absolute units.
fn pt_per_unit(unit: &str) -> Option<f64> {
    match unit {
        "pt" => Some(1.0),
        "mm" => Some(7227.0 / 2540.0),
        "cm" => Some(7227.0 / 254.0),
        "in" => Some(72.27),
        "bp" | "px" => Some(803.0 / 800.0),
        "pc" => Some(12.0),
        "dd" => Some(1238.0 / 1157.0),
        "cc" => Some(14856.0 / 1157.0),
        "nd" => Some(685.0 / 642.0),
        "nc" => Some(1370.0 / 107.0),
        "sp" => Some(1.0 / 65536.0),
        _ => None,
    }
}

/// Whether `unit` is a length unit the engine understands.
pub fn valid_unit<T: AsRef<str>>(unit: T) -> bool {
    pt_per_unit(unit.as_ref()).is_some() || matches!(unit.as_ref(), "ex" | "em" | "mu")
}

impl Context {
    /// Convert a measurement to ems of this context, clamped to `max_size`.
    pub fn calculate_size<T>(&self, size: &Measurement<T>) -> Result<f64, LayoutError>
    where
        T: AsRef<str>,
    {
        let unit = size.unit.as_ref();
        let scale = if let Some(pt) = pt_per_unit(unit) {
            // Absolute units ignore the current size.
            pt / self.font_metrics().pt_per_em / self.size_multiplier
        } else if unit == "mu" {
            // mu already scales with the style through the size index.
            self.font_metrics().css_em_per_mu
        } else {
            // ex and em refer to the text-style font at the current size.
            let unit_ctx = if self.mathstyle.is_tight() {
                self.with_mathstyle(self.mathstyle.text())
            } else {
                self.clone()
            };
            let metrics = unit_ctx.font_metrics();
            let base = match unit {
                "ex" => metrics.x_height,
                "em" => metrics.quad,
                other => {
                    return Err(LayoutError::new(format!("invalid unit: {other}")));
                }
            };
            if unit_ctx.size == self.size {
                base
            } else {
                base * unit_ctx.scale_relative_to(self)
            }
        };

        Ok(f64::min(size.number * scale, self.max_size))
    }

    /// Convert a length in math units to ems of this context.
    #[must_use]
    pub fn mu_to_em(&self, mu: f64) -> f64 {
        mu * self.font_metrics().css_em_per_mu
    }

    /// Validate a font size index.
    pub fn check_size(size: usize) -> Result<usize, LayoutError> {
        if (1..=11).contains(&size) {
            Ok(size)
        } else {
            Err(LayoutError::new(LayoutErrorKind::InvalidSize { size }))
        }
    }
}

/// Round to 4 decimal places and append "em", dropping trailing zeros.
#[must_use]
pub fn make_em(n: f64) -> String {
    let mut s = format!("{n:.4}");

    if s.contains('.') {
        while s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
    }

    if s == "-0" {
        "0".clone_into(&mut s);
    }

    s.push_str("em");
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{SCRIPT, TEXT};

    #[test]
    fn test_valid_unit() {
        assert!(valid_unit("pt"));
        assert!(valid_unit("mu"));
        assert!(valid_unit("ex"));
        assert!(!valid_unit("bogus"));
    }

    #[test]
    fn test_make_em_rounding() {
        assert_eq!(make_em(1.0), "1em");
        assert_eq!(make_em(1.23456), "1.2346em");
        assert_eq!(make_em(0.00004), "0em");
        assert_eq!(make_em(-0.00004), "0em");
        assert_eq!(make_em(-0.25), "-0.25em");
    }

    #[test]
    fn test_absolute_units() {
        let ctx = Context::builder().mathstyle(TEXT).build();
        let ems = ctx
            .calculate_size(&MeasurementOwned {
                number: 10.0,
                unit: "pt".to_owned(),
            })
            .unwrap();
        assert!((ems - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_relative_units() {
        let ctx = Context::default();
        let ex = ctx.calculate_size(&Measurement { number: 1.0, unit: "ex" }).unwrap();
        assert!((ex - 0.431).abs() < 1e-9);
        let mu = ctx.calculate_size(&MeasurementStatic::mu(18.0)).unwrap();
        assert!((mu - 1.0).abs() < 1e-9);
        assert!((ctx.mu_to_em(3.0) - 3.0 / 18.0).abs() < 1e-9);
    }

    #[test]
    fn test_em_in_script_style_refers_to_text_font() {
        let ctx = Context::builder().mathstyle(SCRIPT).build();
        let em = ctx.calculate_size(&MeasurementStatic::em(1.0)).unwrap();
        // One text-style em expressed in script-style ems.
        assert!((em - 1.0 / 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_unit() {
        let ctx = Context::default();
        assert!(ctx.calculate_size(&Measurement { number: 1.0, unit: "furlong" }).is_err());
        assert!(Context::check_size(12).is_err());
    }
}
