//! The decompose engine: atoms in, boxes out.
//!
//! [`decompose`] walks a list of sibling atoms, renders each one through the
//! renderer for its kind, then runs the list-level passes in order:
//!
//! 1. binary operators with no operand on one side become ordinary
//!    (TeXbook rules 5 and 6),
//! 2. inter-atom glue is inserted between neighbouring boxes,
//! 3. contiguous selected boxes are grouped under a single wrapper, and
//!    glyph runs within each group are merged,
//! 4. the boxes are rescaled to the enclosing scope when the context
//!    changed font size.
//!
//! Renderers receive a context scoped to the list, so boxes they return are
//! measured in the ems of that list and rescaled exactly once here.

use core::slice;

use crate::array;
use crate::atom::{Atom, AtomKind, AtomPath, Branch};
use crate::box_tree::{BoxContent, BoxType, MathBox};
use crate::build_common::{
    bind, make_kern, make_placeholder, make_span, rescale, try_combine_chars,
};
use crate::context::Context;
use crate::delimiter;
use crate::functions::{
    accent, genfrac, leftright, op, overunder, supsub, surd, symbol,
};
use crate::spacing::inter_atom_spacing;
use crate::types::{CssProperty, LayoutError, LayoutErrorKind};

/// Class marking a `\middle` delimiter for its enclosing `\left..\right`
pub(crate) const MIDDLE_CLASS: &str = "middle";

/// Lay out a list of sibling atoms in `ctx`.
///
/// The atoms are addressed as children of the root, so with
/// [`crate::IdPolicy::Path`] the `i`-th atom of the list gets the path `i`.
/// Returns `None` for an empty list.
pub fn decompose(ctx: &Context, atoms: &[Atom]) -> Result<Option<Vec<MathBox>>, LayoutError> {
    decompose_list(ctx, atoms, &AtomPath::root(), Branch::Body)
}

/// Lay out a single atom in `ctx`.
pub fn decompose_atom(ctx: &Context, atom: &Atom) -> Result<Option<Vec<MathBox>>, LayoutError> {
    decompose(ctx, slice::from_ref(atom))
}

/// Lay out the atoms of `branch` below `parent`.
///
/// `ctx` may differ from the context of the caller in size; the boxes come
/// back measured in ems of the caller's scope.
pub(crate) fn decompose_list(
    ctx: &Context,
    atoms: &[Atom],
    parent: &AtomPath,
    branch: Branch,
) -> Result<Option<Vec<MathBox>>, LayoutError> {
    if atoms.is_empty() {
        return Ok(None);
    }
    let scoped = ctx.scoped();

    let mut boxes = Vec::with_capacity(atoms.len());
    let mut selected = Vec::with_capacity(atoms.len());
    for (index, atom) in atoms.iter().enumerate() {
        let path = parent.child(branch, index);
        boxes.push(render_atom(&scoped, atom, &path)?);
        selected.push(atom.is_selected);
    }

    cancel_bins(&mut boxes);
    let spaced = insert_spacing(&scoped, boxes, &selected);
    let boxes = group_selection(&scoped, spaced);
    Ok(Some(rescale(boxes, ctx)))
}

/// Lay out a branch of `atom`, which must start with its caret anchor.
///
/// A branch that fails for any reason other than a malformed tree degrades
/// to a placeholder, so one bad sub-expression does not fail its parent.
pub(crate) fn decompose_branch(
    ctx: &Context,
    atom: &Atom,
    list: &[Atom],
    path: &AtomPath,
    branch: Branch,
) -> Result<Vec<MathBox>, LayoutError> {
    if list.first().is_none_or(|first| !first.is_first()) {
        return Err(LayoutError::new(LayoutErrorKind::MalformedBranch {
            atom: atom.atom_type().to_string(),
            branch: branch.to_string(),
        }));
    }
    match decompose_list(ctx, list, path, branch) {
        Ok(Some(boxes)) => Ok(boxes),
        Ok(None) => Err(LayoutError::new(LayoutErrorKind::EmptyRenderOutput {
            atom: atom.atom_type().to_string(),
        })),
        Err(err) if err.is_invariant_violation() => Err(err),
        Err(err) => {
            log::warn!("{branch} of {} atom at {path} failed: {err}", atom.atom_type());
            Ok(rescale(vec![make_placeholder(&ctx.scoped())?], ctx))
        }
    }
}

/// Lay out a branch of `atom` into a single untyped box.
pub(crate) fn branch_box(
    ctx: &Context,
    atom: &Atom,
    list: &[Atom],
    path: &AtomPath,
    branch: Branch,
) -> Result<MathBox, LayoutError> {
    Ok(make_span(vec![], decompose_branch(ctx, atom, list, path, branch)?, None))
}

/// Render one atom, scripts and background included.
fn render_atom(ctx: &Context, atom: &Atom, path: &AtomPath) -> Result<MathBox, LayoutError> {
    let mut atom_ctx = match &atom.style.color {
        Some(color) => ctx.with_color(color.clone()),
        None => ctx.clone(),
    };
    if atom.is_selected {
        atom_ctx = atom_ctx.with_selected(true);
    }

    let mut node = render_kind(&atom_ctx, atom, path)?;
    let has_scripts = atom.superscript.is_some() || atom.subscript.is_some();
    if has_scripts && !matches!(atom.kind, AtomKind::Op(_)) {
        node = supsub::attach(&atom_ctx, atom, path, node)?;
    }

    if let Some(background) = &atom.style.background_color
        && let Some(background) = atom_ctx
            .with_background(background.clone())
            .get_background_color()
    {
        node.style.insert(CssProperty::BackgroundColor, background);
    }
    bind(ctx, &mut node, path);
    atom.set_dirty(false);
    log::trace!("laid out {} atom at {path}", atom.atom_type());
    Ok(node)
}

fn render_kind(ctx: &Context, atom: &Atom, path: &AtomPath) -> Result<MathBox, LayoutError> {
    match &atom.kind {
        AtomKind::First => Ok(MathBox::builder(BoxContent::Empty)
            .box_type(BoxType::First)
            .width(0.0)
            .build()),
        AtomKind::Placeholder => make_placeholder(ctx),
        AtomKind::Symbol { class, text } => symbol::render(ctx, atom, *class, text),
        AtomKind::Group { body, class } => {
            let mut node = branch_box(ctx, atom, body, path, Branch::Body)?;
            node.box_type = class.map(BoxType::from);
            Ok(node)
        }
        AtomKind::Op(op) => op::render(ctx, atom, op, path),
        AtomKind::OverUnder(overunder) => overunder::render(ctx, atom, overunder, path),
        AtomKind::Accent(accent) => accent::render(ctx, atom, accent, path),
        AtomKind::Surd(surd) => surd::render(ctx, atom, surd, path),
        AtomKind::Genfrac(genfrac) => genfrac::render(ctx, atom, genfrac, path),
        AtomKind::LeftRight(leftright) => leftright::render(ctx, atom, leftright, path),
        AtomKind::Middle { delim } => {
            let mut node = delimiter::sized_delim(ctx, delim, 1, atom.mode, None)?;
            node.classes.push(MIDDLE_CLASS.to_owned());
            Ok(node)
        }
        AtomKind::SizedDelim { delim, size, class } => {
            delimiter::sized_delim(ctx, delim, *size, atom.mode, Some((*class).into()))
        }
        AtomKind::Spacing { mu } => Ok(make_kern(ctx.mu_to_em(*mu))),
        AtomKind::Sizing { size, body } => {
            let inner = ctx.with_size(Context::check_size(*size)?);
            branch_box(&inner, atom, body, path, Branch::Body)
        }
        AtomKind::Mathstyle { style, body } => {
            let inner = ctx.with_mathstyle(style.style());
            branch_box(&inner, atom, body, path, Branch::Body)
        }
        AtomKind::Array(array) => array::layout::render(ctx, atom, array, path),
    }
}

/// A binary operator that follows one of these becomes ordinary. `None`
/// stands for the start of the list.
const fn cancels_following_bin(prev: Option<BoxType>) -> bool {
    matches!(
        prev,
        None | Some(
            BoxType::First
                | BoxType::Mrel
                | BoxType::Mpunct
                | BoxType::Mopen
                | BoxType::Mbin
                | BoxType::Mop
        )
    )
}

/// A binary operator followed by one of these becomes ordinary. `None`
/// stands for the end of the list.
const fn cancels_preceding_bin(next: Option<BoxType>) -> bool {
    matches!(
        next,
        None | Some(BoxType::Mrel | BoxType::Mclose | BoxType::Mpunct)
    )
}

/// Turn binary operators without two operands into ordinary symbols,
/// left to right, so that a bin following a cancelled bin stays cancelled.
fn cancel_bins(boxes: &mut [MathBox]) {
    for i in 0..boxes.len() {
        if boxes[i].box_type != Some(BoxType::Mbin) {
            continue;
        }
        let prev = boxes[..i].iter().rev().find_map(MathBox::final_type);
        let next = boxes[i + 1..].iter().find_map(MathBox::initial_type);
        if cancels_following_bin(prev) || cancels_preceding_bin(next) {
            boxes[i].box_type = Some(BoxType::Mord);
        }
    }
}

/// Insert glue kerns between typed neighbours. Each box is paired with its
/// selection flag; a kern is selected when both its neighbours are.
fn insert_spacing(
    ctx: &Context,
    boxes: Vec<MathBox>,
    selected: &[bool],
) -> Vec<(MathBox, bool)> {
    let tight = ctx.mathstyle.is_tight();
    let mut spaced: Vec<(MathBox, bool)> = Vec::with_capacity(boxes.len() * 2);
    let mut prev_type = None;
    for (node, &is_selected) in boxes.into_iter().zip(selected) {
        if let Some(prev) = prev_type
            && let Some(current) = node.initial_type()
        {
            let mu = inter_atom_spacing(prev, current, tight);
            if mu > 0.0 {
                let prev_selected = spaced.last().is_some_and(|(_, sel)| *sel);
                spaced.push((make_kern(ctx.mu_to_em(mu)), prev_selected && is_selected));
            }
        }
        if let Some(last) = node.final_type() {
            prev_type = Some(last);
        }
        spaced.push((node, is_selected));
    }
    spaced
}

/// Merge glyph runs and wrap each run of selected boxes in a selected box.
///
/// Inside an already selected scope the wrapper is omitted.
fn group_selection(ctx: &Context, boxes: Vec<(MathBox, bool)>) -> Vec<MathBox> {
    let mut result = Vec::with_capacity(boxes.len());
    let mut run = Vec::new();
    let mut run_selected = false;

    let flush = |run: &mut Vec<MathBox>, run_selected: bool, result: &mut Vec<MathBox>| {
        if run.is_empty() {
            return;
        }
        let merged = try_combine_chars(core::mem::take(run));
        if run_selected && !ctx.is_selected {
            let mut wrapper = MathBox::from_children(merged);
            wrapper.is_selected = true;
            result.push(wrapper);
        } else {
            result.extend(merged);
        }
    };

    for (node, is_selected) in boxes {
        if is_selected != run_selected {
            flush(&mut run, run_selected, &mut result);
            run_selected = is_selected;
        }
        run.push(node);
    }
    flush(&mut run, run_selected, &mut result);
    result
}
