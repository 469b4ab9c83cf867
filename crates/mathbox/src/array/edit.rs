//! Structural edits of an array
//!
//! Each edit leaves the array normalized: rectangular, every cell starting
//! with its sentinel, and every cell atom tagged with its current row and
//! column.

use crate::atom::Branch;

use super::{ArrayAtom, ColumnAlign, ColumnFormat, placeholder_cell};

impl ArrayAtom {
    /// Tag every cell atom with the row and column it now occupies.
    pub fn restamp(&mut self) {
        for (r, row) in self.rows.iter_mut().enumerate() {
            for (c, cell) in row.iter_mut().enumerate() {
                for atom in cell {
                    atom.parent_branch = Some(Branch::Cell { row: r, col: c });
                }
            }
        }
    }

    fn insert_row(&mut self, at: usize) {
        let cols = self.col_count().max(1);
        let row = (0..cols).map(|c| placeholder_cell(at, c)).collect();
        self.rows.insert(at, row);
        if at < self.row_gaps.len() {
            self.row_gaps.insert(at, None);
        }
        let lines = at.min(self.hlines_before_row.len());
        self.hlines_before_row.insert(lines, vec![]);
        self.restamp();
    }

    /// Insert an empty row above `row`. Returns `false` when `row` is out of
    /// range.
    pub fn add_row_before(&mut self, row: usize) -> bool {
        if row >= self.row_count() {
            return false;
        }
        self.insert_row(row);
        true
    }

    /// Insert an empty row below `row`. Returns `false` when `row` is out of
    /// range.
    pub fn add_row_after(&mut self, row: usize) -> bool {
        if row >= self.row_count() {
            return false;
        }
        self.insert_row(row + 1);
        true
    }

    /// Index into the column format of the entry for content column `col`,
    /// or the end of the format.
    fn format_index(&self, col: usize) -> usize {
        self.column_format
            .iter()
            .enumerate()
            .filter(|(_, format)| format.is_align())
            .nth(col)
            .map_or(self.column_format.len(), |(index, _)| index)
    }

    fn insert_column(&mut self, at: usize) {
        // A format without content columns accepts any number of them.
        if self.column_format.iter().any(ColumnFormat::is_align) {
            let index = self.format_index(at);
            self.column_format
                .insert(index, ColumnFormat::align(ColumnAlign::Center));
        }
        for (r, row) in self.rows.iter_mut().enumerate() {
            row.insert(at, placeholder_cell(r, at));
        }
        self.restamp();
    }

    /// Insert an empty column left of `col`. Returns `false` when `col` is
    /// out of range.
    pub fn add_column_before(&mut self, col: usize) -> bool {
        if col >= self.col_count() {
            return false;
        }
        self.insert_column(col);
        true
    }

    /// Insert an empty column right of `col`. Returns `false` when `col` is
    /// out of range.
    pub fn add_column_after(&mut self, col: usize) -> bool {
        if col >= self.col_count() {
            return false;
        }
        self.insert_column(col + 1);
        true
    }

    /// Remove `row`. The only row of an array cannot be removed; returns
    /// `false` then, or when `row` is out of range.
    pub fn remove_row(&mut self, row: usize) -> bool {
        if self.row_count() <= 1 || row >= self.row_count() {
            log::debug!("refusing to remove row {row} of {}", self.row_count());
            return false;
        }
        for mut cell in self.rows.remove(row) {
            cell.iter_mut().for_each(|atom| atom.detach());
        }
        if row < self.row_gaps.len() {
            self.row_gaps.remove(row);
        }
        if row < self.hlines_before_row.len() {
            self.hlines_before_row.remove(row);
        }
        self.restamp();
        true
    }

    /// Remove `col`. The only column of an array cannot be removed; returns
    /// `false` then, or when `col` is out of range.
    pub fn remove_column(&mut self, col: usize) -> bool {
        if self.col_count() <= 1 || col >= self.col_count() {
            log::debug!("refusing to remove column {col} of {}", self.col_count());
            return false;
        }
        for row in &mut self.rows {
            if col < row.len() {
                row.remove(col)
                    .iter_mut()
                    .for_each(|atom| atom.detach());
            }
        }
        let index = self.format_index(col);
        if index < self.column_format.len() {
            self.column_format.remove(index);
        }
        self.restamp();
        true
    }
}
