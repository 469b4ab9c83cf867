//! Vertical lists
//!
//! [`make_vlist`] stacks boxes and kerns bottom to top. The
//! [`VListParam`] variant decides which point of the stack lands on the
//! baseline of the resulting box:
//!
//! - `IndividualShift`: every element carries its own baseline shift
//!   (positive shifts move down), kerns are derived from the shifts.
//! - `Top`: the top of the stack is at `position_data` above the baseline.
//! - `Bottom`: the bottom of the stack is at `position_data` below the
//!   baseline.
//! - `Shift`: the baseline of the first element is shifted down by
//!   `position_data`.
//! - `FirstBaseline`: the baseline of the first element is the baseline.

use bon::Builder;

use crate::box_tree::{BoxContent, MathBox, VList, VListRow};
use crate::types::{CssStyle, LayoutError, LayoutErrorKind};

/// Element of a vertical list
#[derive(Debug, Builder)]
pub struct VListElem {
    /// The box to stack
    #[builder(start_fn)]
    pub elem: MathBox,
    /// Horizontal offset, in ems
    pub margin_left: Option<f64>,
    /// Extra space after the element, in ems
    pub margin_right: Option<f64>,
    /// Classes of the row wrapper
    pub wrapper_classes: Option<Vec<String>>,
    /// Inline style of the row wrapper
    pub wrapper_style: Option<CssStyle>,
}

impl From<MathBox> for VListElem {
    fn from(elem: MathBox) -> Self {
        Self::builder(elem).build()
    }
}

/// Child of a vertical list
#[derive(Debug)]
pub enum VListChild {
    /// A box
    Elem(Box<VListElem>),
    /// Vertical space, in ems. Negative kerns overlap neighbours.
    Kern(f64),
}

impl From<VListElem> for VListChild {
    fn from(elem: VListElem) -> Self {
        Self::Elem(Box::new(elem))
    }
}

impl From<MathBox> for VListChild {
    fn from(elem: MathBox) -> Self {
        Self::Elem(Box::new(elem.into()))
    }
}

/// Element with an explicit baseline shift, for
/// [`VListParam::IndividualShift`]
#[derive(Debug)]
pub struct VListElemAndShift {
    /// The element
    pub elem: VListElem,
    /// Baseline shift; positive values move the element down
    pub shift: f64,
}

impl VListElemAndShift {
    /// Pair a box with its baseline shift
    #[must_use]
    pub fn new(elem: impl Into<VListElem>, shift: f64) -> Self {
        Self {
            elem: elem.into(),
            shift,
        }
    }
}

/// How the stack is anchored to the baseline
#[derive(Debug)]
pub enum VListParam {
    /// Each element positioned by its own shift. Elements are listed bottom
    /// to top.
    IndividualShift {
        /// The elements with their shifts
        children: Vec<VListElemAndShift>,
    },
    /// Top of the stack at `position_data` above the baseline
    Top {
        /// Height of the top of the stack
        position_data: f64,
        /// Children, bottom first
        children: Vec<VListChild>,
    },
    /// Bottom of the stack at `position_data` below the baseline
    Bottom {
        /// Depth of the bottom of the stack
        position_data: f64,
        /// Children, bottom first
        children: Vec<VListChild>,
    },
    /// Baseline of the first element shifted down by `position_data`
    Shift {
        /// Shift of the first element
        position_data: f64,
        /// Children, bottom first
        children: Vec<VListChild>,
    },
    /// Baseline of the first element on the baseline
    FirstBaseline {
        /// Children, bottom first
        children: Vec<VListChild>,
    },
}

/// Children with the depth of the stack bottom, ready for positioning
struct VListChildrenAndDepth {
    children: Vec<VListChild>,
    depth: f64,
}

fn first_elem(children: &[VListChild]) -> Option<&VListElem> {
    children.iter().find_map(|child| match child {
        VListChild::Elem(elem) => Some(elem.as_ref()),
        VListChild::Kern(_) => None,
    })
}

fn get_vlist_children_and_depth(
    params: VListParam,
) -> Result<VListChildrenAndDepth, LayoutError> {
    match params {
        VListParam::IndividualShift { children: old } => {
            let Some(first) = old.first() else {
                return Err(LayoutError::new(LayoutErrorKind::EmptyVList));
            };
            let depth = -first.shift - first.elem.elem.depth;
            let mut curr_pos = depth;
            let mut prev_extent = 0.0;
            let mut children = Vec::with_capacity(old.len() * 2);
            for (i, child) in old.into_iter().enumerate() {
                if i > 0 {
                    let diff = -child.shift - curr_pos - child.elem.elem.depth;
                    children.push(VListChild::Kern(diff - prev_extent));
                    curr_pos += diff;
                }
                prev_extent = child.elem.elem.total_height();
                children.push(child.elem.into());
            }
            Ok(VListChildrenAndDepth { children, depth })
        }
        VListParam::Top {
            position_data,
            children,
        } => {
            // Start from the top and walk down to find the bottom.
            let mut bottom = position_data;
            for child in &children {
                bottom -= match child {
                    VListChild::Kern(size) => *size,
                    VListChild::Elem(elem) => elem.elem.total_height(),
                };
            }
            Ok(VListChildrenAndDepth {
                children,
                depth: bottom,
            })
        }
        VListParam::Bottom {
            position_data,
            children,
        } => Ok(VListChildrenAndDepth {
            children,
            depth: -position_data,
        }),
        VListParam::Shift {
            position_data,
            children,
        } => {
            let depth = first_elem(&children)
                .map_or(-position_data, |elem| -elem.elem.depth - position_data);
            Ok(VListChildrenAndDepth { children, depth })
        }
        VListParam::FirstBaseline { children } => {
            let depth = first_elem(&children).map_or(0.0, |elem| -elem.elem.depth);
            Ok(VListChildrenAndDepth { children, depth })
        }
    }
}

/// Stack boxes and kerns into a single box.
///
/// The result has height equal to the highest point reached above the
/// baseline and depth equal to the lowest point below it.
pub fn make_vlist(params: VListParam) -> Result<MathBox, LayoutError> {
    let VListChildrenAndDepth { children, depth } = get_vlist_children_and_depth(params)?;

    let mut pstrut = 0.0f64;
    let mut max_font_size = 0.0f64;
    for child in &children {
        if let VListChild::Elem(elem) = child {
            pstrut = pstrut.max(elem.elem.max_font_size).max(elem.elem.height);
            max_font_size = max_font_size.max(elem.elem.max_font_size);
        }
    }
    pstrut += 2.0;

    let mut rows = Vec::with_capacity(children.len());
    let mut min_pos = depth;
    let mut max_pos = depth;
    let mut curr_pos = depth;
    let mut width = Some(0.0f64);

    for child in children {
        match child {
            VListChild::Kern(size) => curr_pos += size,
            VListChild::Elem(child) => {
                let VListElem {
                    elem,
                    margin_left,
                    margin_right,
                    wrapper_classes,
                    wrapper_style,
                } = *child;
                let extent = elem.total_height();
                width = width.zip(elem.width).map(|(w, e)| {
                    w.max(e + margin_left.unwrap_or(0.0) + margin_right.unwrap_or(0.0))
                });
                rows.push(VListRow {
                    shift: -(curr_pos + elem.depth),
                    elem,
                    margin_left,
                    margin_right,
                    wrapper_classes: wrapper_classes.unwrap_or_default(),
                    wrapper_style: wrapper_style.unwrap_or_default(),
                });
                curr_pos += extent;
            }
        }
        min_pos = min_pos.min(curr_pos);
        max_pos = max_pos.max(curr_pos);
    }

    if rows.is_empty() {
        return Err(LayoutError::new(LayoutErrorKind::EmptyVList));
    }

    let mut vlist = MathBox::builder(BoxContent::VList(VList { rows, pstrut }))
        .height(max_pos)
        .depth(-min_pos)
        .max_font_size(max_font_size)
        .build();
    vlist.width = width;
    Ok(vlist)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strut(height: f64, depth: f64) -> MathBox {
        MathBox::builder(BoxContent::Empty)
            .height(height)
            .depth(depth)
            .width(1.0)
            .build()
    }

    fn shifts(vlist: &MathBox) -> Vec<f64> {
        vlist
            .vlist()
            .unwrap()
            .rows
            .iter()
            .map(|row| row.shift)
            .collect()
    }

    #[test]
    fn individual_shift_places_each_baseline() {
        let vlist = make_vlist(VListParam::IndividualShift {
            children: vec![
                VListElemAndShift::new(strut(0.6, 0.2), 0.7),
                VListElemAndShift::new(strut(0.5, 0.1), -0.8),
            ],
        })
        .unwrap();
        let s = shifts(&vlist);
        assert!((s[0] - 0.7).abs() < 1e-12);
        assert!((s[1] + 0.8).abs() < 1e-12);
        assert!((vlist.height - 1.3).abs() < 1e-12);
        assert!((vlist.depth - 0.9).abs() < 1e-12);
    }

    #[test]
    fn top_anchors_the_top_of_the_stack() {
        let vlist = make_vlist(VListParam::Top {
            position_data: 1.0,
            children: vec![
                strut(0.5, 0.5).into(),
                VListChild::Kern(0.25),
                strut(0.25, 0.0).into(),
            ],
        })
        .unwrap();
        assert!((vlist.height - 1.0).abs() < 1e-12);
        assert!((vlist.depth - 0.5).abs() < 1e-12);
    }

    #[test]
    fn bottom_anchors_the_bottom_of_the_stack() {
        let vlist = make_vlist(VListParam::Bottom {
            position_data: 0.3,
            children: vec![strut(0.2, 0.1).into(), strut(0.4, 0.0).into()],
        })
        .unwrap();
        assert!((vlist.depth - 0.3).abs() < 1e-12);
        assert!((vlist.height - 0.4).abs() < 1e-12);
        let s = shifts(&vlist);
        assert!((s[0] - 0.2).abs() < 1e-12);
    }

    #[test]
    fn shift_moves_the_first_baseline() {
        let vlist = make_vlist(VListParam::Shift {
            position_data: 0.5,
            children: vec![
                strut(0.4, 0.1).into(),
                VListChild::Kern(0.1),
                strut(0.3, 0.0).into(),
            ],
        })
        .unwrap();
        assert!((shifts(&vlist)[0] - 0.5).abs() < 1e-12);
        assert!((vlist.depth - 0.6).abs() < 1e-12);
    }

    #[test]
    fn first_baseline_keeps_the_first_element_in_place() {
        let vlist = make_vlist(VListParam::FirstBaseline {
            children: vec![strut(0.4, 0.1).into(), strut(0.3, 0.0).into()],
        })
        .unwrap();
        let s = shifts(&vlist);
        assert!(s[0].abs() < 1e-12);
        assert!((s[1] + 0.4).abs() < 1e-12);
        assert!((vlist.height - 0.7).abs() < 1e-12);
        assert!((vlist.depth - 0.1).abs() < 1e-12);
    }

    #[test]
    fn empty_lists_are_rejected() {
        let err = make_vlist(VListParam::IndividualShift { children: vec![] }).unwrap_err();
        assert!(err.is_invariant_violation());
        assert!(make_vlist(VListParam::FirstBaseline { children: vec![] }).is_err());
    }

    #[test]
    fn width_accounts_for_margins() {
        let vlist = make_vlist(VListParam::FirstBaseline {
            children: vec![
                VListElem::builder(strut(0.4, 0.1)).margin_left(0.25).build().into(),
                strut(0.3, 0.0).into(),
            ],
        })
        .unwrap();
        assert_eq!(vlist.width, Some(1.25));
    }
}
