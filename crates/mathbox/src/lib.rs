//! TeX-style math layout: atom trees in, measured box trees out.
//!
//! The engine walks a tree of [`Atom`]s and produces [`MathBox`]es with
//! height, depth and width in ems, following the layout rules of appendix G
//! of the TeXbook: mathstyles, inter-atom spacing, fractions, radicals,
//! large operators, scripts, extensible delimiters and arrays.
#![warn(missing_docs)]
#![warn(clippy::nursery)]
#![warn(clippy::pedantic)]
#![warn(clippy::str_to_string)]
#![warn(clippy::std_instead_of_core)]
#![warn(clippy::std_instead_of_alloc)]
#![warn(clippy::print_stdout)]
#![warn(clippy::print_stderr)]
#![warn(clippy::panic)]
#![warn(clippy::expect_used)]
#![warn(clippy::unwrap_in_result)]
#![warn(clippy::if_then_some_else_none)]
#![warn(clippy::unused_trait_names)]
#![warn(clippy::get_unwrap)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::unimplemented)]
#![warn(clippy::clone_on_ref_ptr)]
#![warn(clippy::rc_buffer)]
#![warn(clippy::separated_literal_suffix)]
#![warn(clippy::ref_patterns)]
#![allow(clippy::indexing_slicing)]
#![allow(clippy::pub_use)]
// clippy exceptions
#![allow(clippy::float_cmp)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::unreadable_literal)]
#![allow(clippy::default_numeric_fallback)]
#![allow(clippy::single_call_fn)]

extern crate alloc;

pub mod array;
pub mod atom;
pub mod box_tree;
pub mod build_common;
pub mod context;
pub mod decompose;
pub mod delimiter;
pub mod font_metrics;
pub mod functions;
pub mod markup;
pub mod namespace;
pub mod spacing;
pub mod style;
pub mod types;
pub mod units;
pub mod vlist;

pub use crate::array::{ArrayAtom, ColumnAlign, ColumnFormat, ColumnSeparation};
pub use crate::atom::{Atom, AtomClass, AtomKind, AtomPath, Branch};
pub use crate::box_tree::{BoxContent, BoxType, MathBox};
pub use crate::context::Context;
pub use crate::decompose::{decompose, decompose_atom};
pub use crate::markup::VirtualNode;
pub use crate::style::{Mathstyle, MathstyleName};
pub use crate::types::{IdPolicy, LayoutError, LayoutErrorKind, LayoutSettings, Mode};

use crate::build_common::make_span;
use crate::markup::markup_to_string;
use crate::types::CssProperty;
use crate::units::make_em;

/// Version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Lay out a formula.
///
/// `atoms` is the root list of the formula, starting with its `first`
/// sentinel (see [`atom::adopt`]). The boxes of the list are wrapped in a
/// single `base` box carrying the colors of `settings`. A size multiplier
/// other than 1 scales the measurements of that box and sets its font size.
///
/// ```rust
/// use mathbox::{Atom, Branch, LayoutSettings, atom::adopt, render};
///
/// let formula = adopt(
///     vec![Atom::frac(vec![Atom::ord("1")], vec![Atom::ord("2")])],
///     Branch::Body,
/// );
/// let settings = LayoutSettings::builder().display_mode(true).build();
/// let root = render(&formula, &settings)?;
/// assert!(root.height > 0.0);
/// # Ok::<(), mathbox::LayoutError>(())
/// ```
pub fn render(atoms: &[Atom], settings: &LayoutSettings) -> Result<MathBox, LayoutError> {
    let ctx = Context::from_settings(settings);
    let boxes = decompose(&ctx, atoms)?.unwrap_or_default();
    let mut root = make_span(vec!["base".to_owned()], boxes, Some(&ctx));
    if !ctx.scale.is_finite() || ctx.scale <= 0.0 {
        log::warn!("ignoring size multiplier {}", ctx.scale);
    } else if (ctx.scale - 1.0).abs() > f64::EPSILON {
        root.scale(ctx.scale);
        root.style.insert(CssProperty::FontSize, make_em(ctx.scale));
    }
    Ok(root)
}

/// Lay out a formula and write its box tree as HTML.
pub fn render_to_string(atoms: &[Atom], settings: &LayoutSettings) -> Result<String, LayoutError> {
    let root = render(atoms, settings)?;
    markup_to_string(&root)
}
