//! `\left ... \middle ... \right`
//!
//! The body is laid out first. Its height and depth, `\middle` delimiters
//! excluded, then size the outer delimiters and every `\middle`.

use crate::atom::{Atom, AtomKind, AtomPath, Branch, LeftRightAtom};
use crate::box_tree::{BoxType, MathBox};
use crate::build_common::make_span;
use crate::context::Context;
use crate::decompose::{MIDDLE_CLASS, decompose_branch};
use crate::delimiter::left_right_delim;
use crate::types::LayoutError;

/// Whether `node` is a `\middle` delimiter carrying scripts.
fn is_scripted_middle(node: &MathBox) -> bool {
    matches!(node.children(), [nucleus, column]
        if nucleus.has_class(MIDDLE_CLASS) && column.has_class("msupsub"))
}

/// Whether `node` is a `\middle` delimiter, bare or carrying scripts.
fn is_middle(node: &MathBox) -> bool {
    node.has_class(MIDDLE_CLASS) || is_scripted_middle(node)
}

/// Height and depth of the body, looking into selection wrappers and
/// skipping `\middle` delimiters.
fn extent(boxes: &[MathBox]) -> (f64, f64) {
    boxes.iter().fold((0.0f64, 0.0f64), |(height, depth), node| {
        if is_middle(node) {
            (height, depth)
        } else if node.is_selected {
            let (h, d) = extent(node.children());
            (height.max(h), depth.max(d))
        } else {
            (height.max(node.height), depth.max(node.depth))
        }
    })
}

fn size_middle(
    ctx: &Context,
    node: &mut MathBox,
    middle: &Atom,
    height: f64,
    depth: f64,
) -> Result<(), LayoutError> {
    let AtomKind::Middle { delim } = &middle.kind else {
        return Ok(());
    };
    let middle_ctx = match &middle.style.color {
        Some(color) => ctx.with_color(color.clone()),
        None => ctx.clone(),
    };
    let mut sized = left_right_delim(&middle_ctx, delim, height, depth, middle.mode, None)?;
    sized.classes.push(MIDDLE_CLASS.to_owned());
    sized.atom_id = node.atom_id.take();
    sized.is_selected = node.is_selected;
    *node = sized;
    Ok(())
}

/// Replace the placeholder boxes of `\middle` delimiters, in order, with
/// delimiters sized to the body. A scripted `\middle` is the nucleus of its
/// script wrapper.
fn size_middles<'a>(
    ctx: &Context,
    boxes: &mut [MathBox],
    middles: &mut impl Iterator<Item = &'a Atom>,
    height: f64,
    depth: f64,
) -> Result<(), LayoutError> {
    for node in boxes {
        if node.has_class(MIDDLE_CLASS) {
            if let Some(middle) = middles.next() {
                size_middle(ctx, node, middle, height, depth)?;
            }
        } else if is_scripted_middle(node) {
            if let Some(middle) = middles.next()
                && let Some(children) = node.children_mut()
            {
                size_middle(ctx, &mut children[0], middle, height, depth)?;
                node.size_from_children();
            }
        } else if node.is_selected
            && let Some(children) = node.children_mut()
        {
            size_middles(ctx, children, middles, height, depth)?;
            node.size_from_children();
        }
    }
    Ok(())
}

/// Render a delimited group.
pub fn render(
    ctx: &Context,
    atom: &Atom,
    leftright: &LeftRightAtom,
    path: &AtomPath,
) -> Result<MathBox, LayoutError> {
    let mut body = decompose_branch(ctx, atom, &leftright.body, path, Branch::Body)?;
    let (height, depth) = extent(&body);

    let mut middles = leftright
        .body
        .iter()
        .filter(|child| matches!(child.kind, AtomKind::Middle { .. }));
    size_middles(ctx, &mut body, &mut middles, height, depth)?;

    let left = left_right_delim(
        ctx,
        leftright.left.as_deref().unwrap_or("."),
        height,
        depth,
        atom.mode,
        Some(BoxType::Mopen),
    )?;
    let right = left_right_delim(
        ctx,
        leftright.right.as_deref().unwrap_or("."),
        height,
        depth,
        atom.mode,
        Some(BoxType::Mclose),
    )?;

    let mut children = Vec::with_capacity(body.len() + 2);
    children.push(left);
    children.extend(body);
    children.push(right);
    let mut node = make_span(vec!["leftright".to_owned()], children, Some(ctx));
    node.box_type = Some(BoxType::Minner);
    Ok(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::adopt;
    use crate::decompose::decompose;
    use crate::style::DISPLAY;

    fn laid_out(ctx: &Context, atom: Atom) -> MathBox {
        let atoms = adopt(vec![atom], Branch::Body);
        decompose(ctx, &atoms).unwrap().unwrap().remove(1)
    }

    fn tall_body() -> Vec<Atom> {
        vec![Atom::frac(
            vec![Atom::ord("1")],
            vec![Atom::ord("x").with_sup(vec![Atom::ord("2")])],
        )]
    }

    #[test]
    fn delimiters_cover_the_body() {
        let ctx = Context::builder().mathstyle(DISPLAY).build();
        let node = laid_out(&ctx, Atom::leftright(Some("("), tall_body(), Some(")")));
        assert_eq!(node.box_type, Some(BoxType::Minner));
        let children = node.children();
        let (left, right) = (&children[0], children.last().unwrap());
        assert_eq!(left.box_type, Some(BoxType::Mopen));
        assert_eq!(right.box_type, Some(BoxType::Mclose));
        let (height, depth) = extent(&children[1..children.len() - 1]);
        assert!(left.total_height() >= 0.901 * (height + depth) - 1e-9);
    }

    #[test]
    fn missing_delimiters_are_null() {
        let ctx = Context::default();
        let node = laid_out(&ctx, Atom::leftright(None, vec![Atom::ord("x")], Some(".")));
        let children = node.children();
        assert!(children[0].has_class("nulldelimiter"));
        assert!(children.last().unwrap().has_class("nulldelimiter"));
        assert_eq!(children[0].box_type, Some(BoxType::Mopen));
    }

    #[test]
    fn unknown_delimiter_degrades_to_null() {
        let node = laid_out(
            &Context::default(),
            Atom::leftright(Some("\\nosuch"), vec![Atom::ord("x")], Some(")")),
        );
        assert!(node.children()[0].has_class("nulldelimiter"));
    }

    #[test]
    fn middle_grows_with_the_body() {
        let ctx = Context::builder().mathstyle(DISPLAY).build();
        let mut body = tall_body();
        body.push(Atom::middle("|"));
        body.push(Atom::ord("y"));
        let node = laid_out(&ctx, Atom::leftright(Some("|"), body, Some("|")));
        let middle = node
            .children()
            .iter()
            .find(|b| b.has_class(MIDDLE_CLASS))
            .unwrap();
        let left = &node.children()[0];
        assert!((middle.total_height() - left.total_height()).abs() < 1e-9);
        assert_eq!(middle.box_type, None);
    }

    #[test]
    fn scripted_middle_is_still_sized() {
        let ctx = Context::builder().mathstyle(DISPLAY).build();
        let mut body = tall_body();
        body.push(Atom::middle("|").with_sub(vec![Atom::ord("n")]));
        body.push(Atom::ord("y"));
        let node = laid_out(&ctx, Atom::leftright(Some("|"), body, Some("|")));
        let scripted = node
            .children()
            .iter()
            .find(|b| is_scripted_middle(b))
            .unwrap();
        let middle = &scripted.children()[0];
        let left = &node.children()[0];
        assert!((middle.total_height() - left.total_height()).abs() < 1e-9);
        assert!(scripted.height >= middle.height);
    }

    #[test]
    fn selected_middle_is_sized_inside_its_wrapper() {
        let ctx = Context::builder().mathstyle(DISPLAY).build();
        let mut body = tall_body();
        body.push(Atom::middle("|").selected());
        let node = laid_out(&ctx, Atom::leftright(Some("("), body, Some(")")));
        let wrapper = node.children().iter().find(|b| b.is_selected).unwrap();
        let middle = &wrapper.children()[0];
        assert!(middle.has_class(MIDDLE_CLASS));
        assert!((wrapper.height - middle.height).abs() < 1e-12);
        assert!(middle.total_height() > 1.2);
    }
}
