//! Inter-atom spacing
//!
//! TeX inserts glue between adjacent atoms based on their classes (TeXbook
//! chapter 18, table on p. 170). Values are in math units; 18mu make one em
//! of the current style.
//!
//! | Left \ Right | Mord | Mop  | Mbin | Mrel | Mopen | Mclose | Mpunct | Minner |
//! |--------------|------|------|------|------|-------|--------|--------|--------|
//! | Mord         | -    | thin | med  | thick| -     | -      | -      | thin   |
//! | Mop          | thin | thin | -    | thick| -     | -      | -      | thin   |
//! | Mbin         | med  | med  | -    | -    | med   | -      | -      | med    |
//! | Mrel         | thick| thick| -    | -    | thick | -      | -      | thick  |
//! | Mopen        | -    | -    | -    | -    | -     | -      | -      | -      |
//! | Mclose       | -    | thin | med  | thick| -     | -      | -      | thin   |
//! | Mpunct       | thin | thin | -    | thick| thin  | thin   | thin   | thin   |
//! | Minner       | thin | thin | med  | thick| thin  | -      | thin   | thin   |
//!
//! In script and scriptscript styles only the thin spaces around operators
//! survive, see [`TIGHT_SPACINGS`].

use phf::{Map, phf_map};

use crate::box_tree::BoxType;
use crate::units::MeasurementStatic;

/// Thin space (3mu), `\,`
pub const THINSPACE: MeasurementStatic = MeasurementStatic::mu(3.0);

/// Medium space (4mu), `\:`
pub const MEDIUMSPACE: MeasurementStatic = MeasurementStatic::mu(4.0);

/// Thick space (5mu), `\;`
pub const THICKSPACE: MeasurementStatic = MeasurementStatic::mu(5.0);

/// Spacing table keyed by left class, then right class
pub type Spacings = Map<&'static str, Map<&'static str, MeasurementStatic>>;

/// Spacing in display and text styles
pub const SPACINGS: Spacings = phf_map! {
    "mord" => phf_map! {
        "mop" => THINSPACE,
        "mbin" => MEDIUMSPACE,
        "mrel" => THICKSPACE,
        "minner" => THINSPACE,
    },
    "mop" => phf_map! {
        "mord" => THINSPACE,
        "mop" => THINSPACE,
        "mrel" => THICKSPACE,
        "minner" => THINSPACE,
    },
    "mbin" => phf_map! {
        "mord" => MEDIUMSPACE,
        "mop" => MEDIUMSPACE,
        "mopen" => MEDIUMSPACE,
        "minner" => MEDIUMSPACE,
    },
    "mrel" => phf_map! {
        "mord" => THICKSPACE,
        "mop" => THICKSPACE,
        "mopen" => THICKSPACE,
        "minner" => THICKSPACE,
    },
    "mopen" => phf_map!{},
    "mclose" => phf_map! {
        "mop" => THINSPACE,
        "mbin" => MEDIUMSPACE,
        "mrel" => THICKSPACE,
        "minner" => THINSPACE,
    },
    "mpunct" => phf_map! {
        "mord" => THINSPACE,
        "mop" => THINSPACE,
        "mrel" => THICKSPACE,
        "mopen" => THINSPACE,
        "mclose" => THINSPACE,
        "mpunct" => THINSPACE,
        "minner" => THINSPACE,
    },
    "minner" => phf_map! {
        "mord" => THINSPACE,
        "mop" => THINSPACE,
        "mbin" => MEDIUMSPACE,
        "mrel" => THICKSPACE,
        "mopen" => THINSPACE,
        "mpunct" => THINSPACE,
        "minner" => THINSPACE,
    },
};

/// Spacing in script and scriptscript styles
pub const TIGHT_SPACINGS: Spacings = phf_map! {
    "mord" => phf_map! {
        "mop" => THINSPACE,
    },
    "mop" => phf_map! {
        "mord" => THINSPACE,
        "mop" => THINSPACE,
    },
    "mbin" => phf_map!{},
    "mrel" => phf_map!{},
    "mopen" => phf_map!{},
    "mclose" => phf_map! {
        "mop" => THINSPACE,
    },
    "mpunct" => phf_map!{},
    "minner" => phf_map! {
        "mop" => THINSPACE,
    },
};

/// Glue between a box of type `left` followed by one of type `right`, in mu.
///
/// Types without a table entry (`first`, spacing) never receive glue.
#[must_use]
pub fn inter_atom_spacing(left: BoxType, right: BoxType, tight: bool) -> f64 {
    let table = if tight { &TIGHT_SPACINGS } else { &SPACINGS };
    table
        .get(left.as_ref())
        .and_then(|row| row.get(right.as_ref()))
        .map_or(0.0, |space| space.number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator as _;

    #[test]
    fn test_measurement_constants() {
        assert_eq!(THINSPACE.number, 3.0);
        assert_eq!(MEDIUMSPACE.number, 4.0);
        assert_eq!(THICKSPACE.number, 5.0);
        assert_eq!(THICKSPACE.unit, "mu");
    }

    #[test]
    fn test_tables_cover_every_class() {
        for class in ["mord", "mop", "mbin", "mrel", "mopen", "mclose", "mpunct", "minner"] {
            assert!(SPACINGS.contains_key(class), "missing class: {class}");
            assert!(TIGHT_SPACINGS.contains_key(class), "missing class: {class}");
        }
    }

    #[test]
    fn test_lookup() {
        assert_eq!(inter_atom_spacing(BoxType::Mord, BoxType::Mrel, false), 5.0);
        assert_eq!(inter_atom_spacing(BoxType::Mord, BoxType::Mrel, true), 0.0);
        assert_eq!(inter_atom_spacing(BoxType::Mop, BoxType::Mord, true), 3.0);
        assert_eq!(inter_atom_spacing(BoxType::First, BoxType::Mord, false), 0.0);
    }

    #[test]
    fn test_bin_neighbours_never_get_less_space_than_ords() {
        for tight in [false, true] {
            let ord_ord = inter_atom_spacing(BoxType::Mord, BoxType::Mord, tight);
            assert!(inter_atom_spacing(BoxType::Mbin, BoxType::Mord, tight) >= ord_ord);
            assert!(inter_atom_spacing(BoxType::Mord, BoxType::Mbin, tight) >= ord_ord);
        }
    }

    #[test]
    fn test_tight_never_exceeds_normal() {
        for left in BoxType::iter() {
            for right in BoxType::iter() {
                assert!(
                    inter_atom_spacing(left, right, true) <= inter_atom_spacing(left, right, false),
                    "{left} {right}"
                );
            }
        }
    }
}
