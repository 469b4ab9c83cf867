use crate::atom::{Branch, adopt, is_empty_list};

use super::{ColumnFormat, Grid, placeholder_cell};

/// Bring raw rows into the shape layout and editing expect.
///
/// Rows longer than the number of content columns in `column_format` wrap
/// onto new rows; an empty format allows any number of columns. A trailing
/// row made of one empty cell, as left by a final `\\`, is dropped unless it
/// is the only row. Short rows are padded with placeholders, and every cell
/// is adopted under its [`Branch::Cell`].
#[must_use]
pub fn normalize_array(rows: Grid, column_format: &[ColumnFormat]) -> Grid {
    let max_cols = column_format.iter().filter(|f| f.is_align()).count();

    let mut folded: Grid = Vec::with_capacity(rows.len());
    for (index, mut row) in rows.into_iter().enumerate() {
        if max_cols == 0 || row.len() <= max_cols {
            folded.push(row);
            continue;
        }
        log::debug!(
            "row {index} has {} cells for {max_cols} columns, folding",
            row.len()
        );
        while row.len() > max_cols {
            let rest = row.split_off(max_cols);
            folded.push(row);
            row = rest;
        }
        folded.push(row);
    }

    if folded.len() > 1
        && folded
            .last()
            .is_some_and(|row| row.len() == 1 && is_empty_list(&row[0]))
    {
        log::debug!("dropping trailing empty row");
        folded.pop();
    }
    if folded.is_empty() {
        folded.push(vec![]);
    }

    let cols = folded.iter().map(Vec::len).max().unwrap_or(0).max(1);
    folded
        .into_iter()
        .enumerate()
        .map(|(r, row)| {
            let mut cells: Vec<_> = row
                .into_iter()
                .enumerate()
                .map(|(c, cell)| adopt(cell, Branch::Cell { row: r, col: c }))
                .collect();
            while cells.len() < cols {
                cells.push(placeholder_cell(r, cells.len()));
            }
            cells
        })
        .collect()
}
