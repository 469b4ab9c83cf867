//! Arrays and matrices
//!
//! An [`ArrayAtom`] holds a rectangular grid of cell lists. Every cell is a
//! list branch of its own, starting with the `first` sentinel, whose atoms
//! carry [`Branch::Cell`] with their row and column. [`normalize_array`]
//! establishes that shape from arbitrary input, and the editing methods in
//! [`edit`] keep it across structural changes.

use strum::{AsRefStr, Display, EnumString};

use crate::atom::{Atom, AtomKind, Branch, adopt};
use crate::style::MathstyleName;
use crate::units::MeasurementOwned;

pub mod edit;
pub(crate) mod layout;
mod normalize;

pub use normalize::normalize_array;

/// Rows of cells of atoms
pub type Grid = Vec<Vec<Vec<Atom>>>;

/// Horizontal alignment of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, AsRefStr, Display, EnumString)]
pub enum ColumnAlign {
    /// Flush left
    #[strum(serialize = "l")]
    Left,
    /// Centred
    #[default]
    #[strum(serialize = "c")]
    Center,
    /// Flush right
    #[strum(serialize = "r")]
    Right,
}

/// One entry of a column format such as `{c|c}`
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnFormat {
    /// A content column
    Align {
        /// Alignment of the cells
        align: ColumnAlign,
        /// Space before the column, in ems; `\arraycolsep` when `None`
        pregap: Option<f64>,
        /// Space after the column, in ems; `\arraycolsep` when `None`
        postgap: Option<f64>,
    },
    /// A vertical rule between columns: `|` solid, `:` dashed
    Separator(String),
}

impl ColumnFormat {
    /// A content column with default gaps
    #[must_use]
    pub const fn align(align: ColumnAlign) -> Self {
        Self::Align {
            align,
            pregap: None,
            postgap: None,
        }
    }

    /// Whether this entry is a content column
    #[must_use]
    pub const fn is_align(&self) -> bool {
        matches!(self, Self::Align { .. })
    }

    /// Parse a format string like `"l|cc:r"`. Unknown characters are kept
    /// as separators and rejected at layout.
    #[must_use]
    pub fn parse_all(format: &str) -> Vec<Self> {
        format
            .chars()
            .filter(|ch| !ch.is_whitespace())
            .map(|ch| match ch.encode_utf8(&mut [0; 4]).parse::<ColumnAlign>() {
                Ok(align) => Self::align(align),
                Err(_) => Self::Separator(ch.to_string()),
            })
            .collect()
    }
}

/// Horizontal spacing between columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnSeparation {
    /// `\arraycolsep` on each side of a column
    #[default]
    Default,
    /// `\thickspace`, for `smallmatrix`
    Small,
}

/// A matrix or array environment.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayAtom {
    /// Rows of cells, rectangular once normalized
    pub rows: Grid,
    /// Column alignments and separators
    pub column_format: Vec<ColumnFormat>,
    /// Extra space below each row
    pub row_gaps: Vec<Option<MeasurementOwned>>,
    /// Horizontal rules above each row, and one entry for below the last
    /// row. Each rule is `true` when dashed.
    pub hlines_before_row: Vec<Vec<bool>>,
    /// Opening delimiter, as in `pmatrix`
    pub left_delim: Option<String>,
    /// Closing delimiter
    pub right_delim: Option<String>,
    /// `\arraystretch`
    pub array_stretch: f64,
    /// Column spacing
    pub column_separation: ColumnSeparation,
    /// Add `\jot` below every row, as AMS multiline environments do
    pub add_jot: bool,
    /// Keep the column gap before the first and after the last column
    pub hskip_before_and_after: bool,
    /// Style the cells are laid out in; the enclosing style when `None`
    pub mathstyle: Option<MathstyleName>,
}

impl ArrayAtom {
    /// Build a normalized array from raw rows.
    #[must_use]
    pub fn new(rows: Grid, column_format: Vec<ColumnFormat>) -> Self {
        let rows = normalize_array(rows, &column_format);
        Self {
            hlines_before_row: vec![vec![]; rows.len() + 1],
            rows,
            column_format,
            row_gaps: vec![],
            left_delim: None,
            right_delim: None,
            array_stretch: 1.0,
            column_separation: ColumnSeparation::Default,
            add_jot: false,
            hskip_before_and_after: false,
            mathstyle: None,
        }
    }

    /// Re-establish the normalized shape after direct edits of `rows`.
    pub fn normalize(&mut self) {
        let rows = core::mem::take(&mut self.rows);
        self.rows = normalize_array(rows, &self.column_format);
        self.hlines_before_row.resize(self.rows.len() + 1, vec![]);
    }

    /// Number of rows
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns
    #[must_use]
    pub fn col_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Atoms of the cell at `row`, `col`
    #[must_use]
    pub fn cell(&self, row: usize, col: usize) -> Option<&[Atom]> {
        self.rows.get(row)?.get(col).map(Vec::as_slice)
    }

    /// Mutable atoms of the cell at `row`, `col`
    pub fn cell_mut(&mut self, row: usize, col: usize) -> Option<&mut Vec<Atom>> {
        self.rows.get_mut(row)?.get_mut(col)
    }

    /// Alignment of column `col`
    #[must_use]
    pub fn column_align(&self, col: usize) -> ColumnAlign {
        self.column_format
            .iter()
            .filter_map(|format| match format {
                ColumnFormat::Align { align, .. } => Some(*align),
                ColumnFormat::Separator(_) => None,
            })
            .nth(col)
            .unwrap_or_default()
    }
}

/// A cell holding a single placeholder
#[must_use]
pub fn placeholder_cell(row: usize, col: usize) -> Vec<Atom> {
    adopt(vec![Atom::placeholder()], Branch::Cell { row, col })
}

impl Atom {
    /// An array with the given rows and column format
    #[must_use]
    pub fn array(rows: Grid, column_format: Vec<ColumnFormat>) -> Self {
        Self::new(AtomKind::Array(Box::new(ArrayAtom::new(rows, column_format))))
    }

    /// A matrix of centred columns between `left` and `right`
    #[must_use]
    pub fn matrix(rows: Grid, left: Option<&str>, right: Option<&str>) -> Self {
        let mut array = ArrayAtom::new(rows, vec![]);
        array.left_delim = left.map(str::to_owned);
        array.right_delim = right.map(str::to_owned);
        Self::new(AtomKind::Array(Box::new(array)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::AtomClass;

    fn cell(text: &str) -> Vec<Atom> {
        vec![Atom::ord(text)]
    }

    #[test]
    fn format_strings_parse() {
        let format = ColumnFormat::parse_all("l|c :r");
        assert_eq!(format, [
            ColumnFormat::align(ColumnAlign::Left),
            ColumnFormat::Separator("|".to_owned()),
            ColumnFormat::align(ColumnAlign::Center),
            ColumnFormat::Separator(":".to_owned()),
            ColumnFormat::align(ColumnAlign::Right),
        ]);
    }

    #[test]
    fn cells_are_reachable_through_branches() {
        let atom = Atom::matrix(
            vec![vec![cell("a"), cell("b")], vec![cell("c"), cell("d")]],
            Some("("),
            Some(")"),
        );
        let d = atom.branch(Branch::Cell { row: 1, col: 1 }).unwrap();
        assert!(d[0].is_first());
        assert_eq!(d[1].kind, AtomKind::Symbol {
            class: AtomClass::Mord,
            text: "d".to_owned()
        });
        assert_eq!(d[1].parent_branch, Some(Branch::Cell { row: 1, col: 1 }));
        assert!(atom.branch(Branch::Cell { row: 2, col: 0 }).is_none());
    }

    #[test]
    fn column_alignment_skips_separators() {
        let array = ArrayAtom::new(
            vec![vec![cell("a"), cell("b"), cell("c")]],
            ColumnFormat::parse_all("r|l"),
        );
        assert_eq!(array.column_align(0), ColumnAlign::Right);
        assert_eq!(array.column_align(1), ColumnAlign::Left);
        assert_eq!(array.hlines_before_row.len(), array.row_count() + 1);
    }
}
