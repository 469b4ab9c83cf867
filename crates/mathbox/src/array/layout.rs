//! Array layout
//!
//! Cells are laid out first and measured row by row. Columns are then
//! stacked with vlists against the final total height, and delimiters, when
//! the array has any, are sized from that finished table.

use crate::atom::{Atom, AtomPath, Branch};
use crate::box_tree::{BoxType, MathBox};
use crate::build_common::{make_line_span, make_span};
use crate::context::Context;
use crate::decompose::branch_box;
use crate::delimiter::left_right_delim;
use crate::style::SCRIPT;
use crate::types::{CssProperty, LayoutError, LayoutErrorKind};
use crate::units::make_em;
use crate::vlist::{VListElemAndShift, VListParam, make_vlist};

use super::{ArrayAtom, ColumnFormat, ColumnSeparation};

/// `\baselineskip` of size10.clo, in points
const BASELINE_SKIP_PT: f64 = 12.0;
/// `\jot` of ltmath.dtx, in points
const JOT_PT: f64 = 3.0;
/// `\arraycolsep` of article.cls, in points
const ARRAY_COL_SEP_PT: f64 = 5.0;
/// Distance between consecutive horizontal rules, in ems
const DOUBLE_HLINE_SEP: f64 = 0.25;

struct Row {
    cells: Vec<MathBox>,
    height: f64,
    depth: f64,
    /// Baseline position from the top of the table
    pos: f64,
}

struct HLine {
    pos: f64,
    is_dashed: bool,
}

fn push_hlines(hlines: &mut Vec<HLine>, total_height: &mut f64, dashed: &[bool]) {
    for (i, &is_dashed) in dashed.iter().enumerate() {
        if i > 0 {
            *total_height += DOUBLE_HLINE_SEP;
        }
        hlines.push(HLine {
            pos: *total_height,
            is_dashed,
        });
    }
}

fn col_sep(width: f64) -> MathBox {
    let mut sep = make_span(vec!["arraycolsep".to_owned()], vec![], None);
    sep.width = Some(width);
    sep.style.insert(CssProperty::Width, make_em(width));
    sep
}

/// Render an array atom.
pub fn render(
    ctx: &Context,
    atom: &Atom,
    array: &ArrayAtom,
    path: &AtomPath,
) -> Result<MathBox, LayoutError> {
    if !array.array_stretch.is_finite() || array.array_stretch <= 0.0 {
        return Err(LayoutError::new(LayoutErrorKind::InvalidArrayStretch {
            stretch: array.array_stretch,
        }));
    }
    let nc = array.col_count();
    for (row, cells) in array.rows.iter().enumerate() {
        if cells.len() != nc {
            return Err(LayoutError::new(LayoutErrorKind::NonRectangularArray {
                row,
                expected: nc,
                actual: cells.len(),
            }));
        }
    }

    let cell_ctx = match array.mathstyle {
        Some(name) => ctx.with_mathstyle(name.style()),
        None => ctx.clone(),
    };
    let metrics = ctx.font_metrics();
    let pt = 1.0 / metrics.pt_per_em;
    let rule_thickness = metrics.array_rule_width.max(ctx.min_rule_thickness);

    let arraycolsep = match array.column_separation {
        // \thickspace, with \scriptstyle applied to the whole matrix
        ColumnSeparation::Small => {
            0.2778 * (ctx.with_mathstyle(SCRIPT).size_multiplier / ctx.size_multiplier)
        }
        ColumnSeparation::Default => ARRAY_COL_SEP_PT * pt,
    };
    let arrayskip = array.array_stretch * BASELINE_SKIP_PT * pt;
    let arstrut_height = 0.7 * arrayskip;
    let arstrut_depth = 0.3 * arrayskip;

    let mut total_height = 0.0;
    let mut hlines = Vec::new();
    if let Some(first) = array.hlines_before_row.first() {
        push_hlines(&mut hlines, &mut total_height, first);
    }

    let mut rows = Vec::with_capacity(array.rows.len());
    for (r, cells) in array.rows.iter().enumerate() {
        // Every row holds an invisible strut.
        let mut height = arstrut_height;
        let mut depth = arstrut_depth;

        let mut boxes = Vec::with_capacity(cells.len());
        for (c, cell) in cells.iter().enumerate() {
            let node = branch_box(&cell_ctx, atom, cell, path, Branch::Cell { row: r, col: c })?;
            height = height.max(node.height);
            depth = depth.max(node.depth);
            boxes.push(node);
        }

        if let Some(Some(row_gap)) = array.row_gaps.get(r) {
            let gap = ctx.calculate_size(row_gap)?;
            if gap > 0.0 {
                depth = depth.max(gap + arstrut_depth);
            }
        }
        if array.add_jot {
            depth += JOT_PT * pt;
        }

        rows.push(Row {
            cells: boxes,
            height,
            depth,
            pos: total_height + height,
        });
        total_height += height + depth;

        if let Some(dashed) = array.hlines_before_row.get(r + 1) {
            push_hlines(&mut hlines, &mut total_height, dashed);
        }
    }

    let offset = total_height / 2.0 + metrics.axis_height;
    let formats = array.column_format.as_slice();
    let mut cols = Vec::new();

    let mut c = 0;
    let mut format_index = 0;
    while c < nc || format_index < formats.len() {
        let mut first_separator = true;
        while let Some(ColumnFormat::Separator(separator)) = formats.get(format_index) {
            if !first_separator {
                cols.push(col_sep(metrics.double_rule_sep));
            }
            let line_style = match separator.as_str() {
                "|" => "solid",
                ":" => "dashed",
                _ => {
                    return Err(LayoutError::new(LayoutErrorKind::InvalidSeparator {
                        separator: separator.clone(),
                    }));
                }
            };
            let mut rule = make_span(vec!["vertical-separator".to_owned()], vec![], Some(ctx));
            rule.height = total_height - offset;
            rule.depth = offset;
            rule.width = Some(0.0);
            rule.style
                .insert(CssProperty::Height, make_em(total_height));
            rule.style
                .insert(CssProperty::BorderRightWidth, make_em(rule_thickness));
            rule.style
                .insert(CssProperty::BorderRightStyle, line_style);
            rule.style.insert(
                CssProperty::Margin,
                format!("0 {}", make_em(-rule_thickness / 2.0)),
            );
            let shift = total_height - offset;
            if shift != 0.0 {
                rule.style
                    .insert(CssProperty::VerticalAlign, make_em(-shift));
            }
            cols.push(rule);

            format_index += 1;
            first_separator = false;
        }

        if c >= nc {
            c += 1;
            format_index += 1;
            continue;
        }

        let (align, pregap, postgap) = match formats.get(format_index) {
            Some(ColumnFormat::Align {
                align,
                pregap,
                postgap,
            }) => (*align, *pregap, *postgap),
            _ => (array.column_align(c), None, None),
        };

        if c > 0 || array.hskip_before_and_after {
            let width = pregap.unwrap_or(arraycolsep);
            if width != 0.0 {
                cols.push(col_sep(width));
            }
        }

        let mut children = Vec::with_capacity(rows.len());
        for row in &mut rows {
            if c < row.cells.len() {
                let mut elem = core::mem::replace(
                    &mut row.cells[c],
                    make_span(vec![], vec![], None),
                );
                elem.height = row.height;
                elem.depth = row.depth;
                children.push(VListElemAndShift::new(elem, row.pos - offset));
            }
        }
        let column = make_vlist(VListParam::IndividualShift { children })?;
        cols.push(make_span(vec![format!("col-align-{align}")], vec![column], None));

        if c + 1 < nc || array.hskip_before_and_after {
            let width = postgap.unwrap_or(arraycolsep);
            if width != 0.0 {
                cols.push(col_sep(width));
            }
        }

        c += 1;
        format_index += 1;
    }

    let mut table = make_span(vec!["mtable".to_owned()], cols, None);

    if !hlines.is_empty() {
        let solid = make_line_span("hline", ctx, Some(rule_thickness));
        let dashed = make_line_span("hdashline", ctx, Some(rule_thickness));
        let mut children = vec![VListElemAndShift::new(table, 0.0)];
        for line in hlines.iter().rev() {
            let rule = if line.is_dashed { &dashed } else { &solid };
            children.push(VListElemAndShift::new(rule.clone(), line.pos - offset));
        }
        table = make_vlist(VListParam::IndividualShift { children })?;
    }

    if array.left_delim.is_none() && array.right_delim.is_none() {
        let mut node = make_span(vec![], vec![table], Some(ctx));
        node.box_type = Some(BoxType::Mord);
        return Ok(node);
    }

    // Delimiters wrap the finished table.
    let (height, depth) = (table.height, table.depth);
    let left = left_right_delim(
        ctx,
        array.left_delim.as_deref().unwrap_or("."),
        height,
        depth,
        atom.mode,
        Some(BoxType::Mopen),
    )?;
    let right = left_right_delim(
        ctx,
        array.right_delim.as_deref().unwrap_or("."),
        height,
        depth,
        atom.mode,
        Some(BoxType::Mclose),
    )?;
    let mut node = make_span(vec!["leftright".to_owned()], vec![left, table, right], Some(ctx));
    node.box_type = Some(BoxType::Minner);
    Ok(node)
}
