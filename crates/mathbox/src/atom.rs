//! Atom tree
//!
//! Atoms are the nodes of the math expression the engine lays out. A parent
//! owns its children in plain vectors; navigation back up the tree goes
//! through [`AtomPath`]s and the [`Branch`] tag each child carries, never
//! through pointers.
//!
//! Every list branch starts with a [`AtomKind::First`] sentinel that anchors
//! the caret before the first real element. The constructors in this module
//! maintain that invariant and stamp the branch tag of every child they
//! adopt.

use core::cell::Cell;
use core::fmt;

use strum::{AsRefStr, Display, EnumDiscriminants, EnumString};

use crate::array::ArrayAtom;
use crate::box_tree::{BoxType, FontFamily};
use crate::style::MathstyleName;
use crate::types::{LayoutError, LayoutErrorKind, Mode};
use crate::units::MeasurementOwned;

/// Spacing class of a symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum AtomClass {
    /// Ordinary symbol
    Mord,
    /// Large operator
    Mop,
    /// Binary operator
    Mbin,
    /// Relation
    Mrel,
    /// Opening delimiter
    Mopen,
    /// Closing delimiter
    Mclose,
    /// Punctuation
    Mpunct,
    /// Inner
    Minner,
}

impl From<AtomClass> for BoxType {
    fn from(class: AtomClass) -> Self {
        match class {
            AtomClass::Mord => Self::Mord,
            AtomClass::Mop => Self::Mop,
            AtomClass::Mbin => Self::Mbin,
            AtomClass::Mrel => Self::Mrel,
            AtomClass::Mopen => Self::Mopen,
            AtomClass::Mclose => Self::Mclose,
            AtomClass::Mpunct => Self::Mpunct,
            AtomClass::Minner => Self::Minner,
        }
    }
}

/// Which branch of its parent an atom lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Branch {
    /// Main body
    Body,
    /// Content above an overunder nucleus
    Above,
    /// Content below an overunder nucleus
    Below,
    /// Superscript
    Superscript,
    /// Subscript
    Subscript,
    /// Fraction numerator
    Numer,
    /// Fraction denominator
    Denom,
    /// Root index
    Index,
    /// Array cell
    Cell {
        /// Row of the cell
        row: usize,
        /// Column of the cell
        col: usize,
    },
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Body => f.write_str("body"),
            Self::Above => f.write_str("above"),
            Self::Below => f.write_str("below"),
            Self::Superscript => f.write_str("sup"),
            Self::Subscript => f.write_str("sub"),
            Self::Numer => f.write_str("numer"),
            Self::Denom => f.write_str("denom"),
            Self::Index => f.write_str("index"),
            Self::Cell { row, col } => write!(f, "cell{row}-{col}"),
        }
    }
}

/// One step from a parent atom to a child
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PathStep {
    /// Branch of the parent
    pub branch: Branch,
    /// Position within the branch list
    pub index: usize,
}

/// Location of an atom, as steps from the root list.
///
/// The first step indexes the root list itself and uses [`Branch::Body`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct AtomPath(Vec<PathStep>);

impl AtomPath {
    /// The empty path, designating the root list
    #[must_use]
    pub const fn root() -> Self {
        Self(Vec::new())
    }

    /// Path of the `index`-th atom of `branch` below this path
    #[must_use]
    pub fn child(&self, branch: Branch, index: usize) -> Self {
        let mut steps = Vec::with_capacity(self.0.len() + 1);
        steps.extend_from_slice(&self.0);
        steps.push(PathStep { branch, index });
        Self(steps)
    }

    /// The steps of the path
    #[must_use]
    pub fn steps(&self) -> &[PathStep] {
        &self.0
    }

    /// Find the atom this path designates in `root`.
    pub fn resolve<'a>(&self, root: &'a [Atom]) -> Result<&'a Atom, LayoutError> {
        let invalid = |step| LayoutError::new(LayoutErrorKind::InvalidPath { step });
        let mut list = root;
        let mut found: Option<&'a Atom> = None;
        for (i, step) in self.0.iter().enumerate() {
            if let Some(parent) = found {
                list = parent.branch(step.branch).ok_or_else(|| invalid(i))?;
            }
            found = Some(list.get(step.index).ok_or_else(|| invalid(i))?);
        }
        found.ok_or_else(|| invalid(0))
    }
}

impl fmt::Display for AtomPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
                write!(f, "{}.", step.branch)?;
            }
            write!(f, "{}", step.index)?;
        }
        Ok(())
    }
}

/// Placement of operator limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, AsRefStr, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Limits {
    /// Stacked in display style, attached at the corner otherwise
    #[default]
    Auto,
    /// Always stacked above and below (`\limits`)
    Limits,
    /// Always attached at the corner (`\nolimits`)
    NoLimits,
}

/// Large operator (`\sum`, `\int`) or named operator (`\lim`, `\sin`)
#[derive(Debug, Clone, PartialEq)]
pub struct OpAtom {
    /// Glyph of a symbol operator
    pub symbol: Option<String>,
    /// Body of a named operator, set upright
    pub body: Option<Vec<Atom>>,
    /// Limits placement
    pub limits: Limits,
    /// Keeps the glyph at text size even in display style (`\smallint`)
    pub small: bool,
}

/// Content stacked over and/or under a nucleus
#[derive(Debug, Clone, PartialEq)]
pub struct OverUnderAtom {
    /// The nucleus
    pub body: Vec<Atom>,
    /// Content above the nucleus
    pub above: Option<Vec<Atom>>,
    /// Content below the nucleus
    pub below: Option<Vec<Atom>>,
    /// Stretchy image replacing the nucleus (extensible arrows)
    pub svg_body: Option<String>,
    /// Stretchy image above the nucleus (`\overbrace`)
    pub svg_above: Option<String>,
    /// Stretchy image below the nucleus (`\underbrace`)
    pub svg_below: Option<String>,
    /// Pad both sides of the stack
    pub padded: bool,
    /// Spacing class of the whole stack
    pub class: AtomClass,
}

/// Accent over a body (`\hat`, `\vec`)
#[derive(Debug, Clone, PartialEq)]
pub struct AccentAtom {
    /// The accent glyph
    pub accent: char,
    /// The accented content
    pub body: Vec<Atom>,
}

/// Radical, with an optional index
#[derive(Debug, Clone, PartialEq)]
pub struct SurdAtom {
    /// Radicand
    pub body: Vec<Atom>,
    /// Root index
    pub index: Option<Vec<Atom>>,
}

/// Generalized fraction: fractions, binomials, `\atop`
#[derive(Debug, Clone, PartialEq)]
pub struct GenfracAtom {
    /// Numerator
    pub numer: Vec<Atom>,
    /// Denominator
    pub denom: Vec<Atom>,
    /// Draw a fraction bar
    pub has_bar_line: bool,
    /// Custom bar thickness
    pub bar_size: Option<MeasurementOwned>,
    /// Left delimiter (`(` for `\binom`)
    pub left_delim: Option<String>,
    /// Right delimiter
    pub right_delim: Option<String>,
    /// Style forced on the fraction (`\dfrac`, `\tfrac`)
    pub mathstyle: Option<MathstyleName>,
    /// Continued fraction (`\cfrac`): numerator gets a full strut
    pub continued: bool,
}

/// `\left ... \right`, with the body split at `\middle` delimiters
#[derive(Debug, Clone, PartialEq)]
pub struct LeftRightAtom {
    /// Opening delimiter; `None` or `"."` for none
    pub left: Option<String>,
    /// Closing delimiter; `None` or `"."` for none
    pub right: Option<String>,
    /// Content between the delimiters
    pub body: Vec<Atom>,
}

/// The kind of an atom and its payload
#[derive(Debug, Clone, PartialEq, EnumDiscriminants)]
#[strum_discriminants(vis(pub))]
#[strum_discriminants(doc = "Atom type without its payload")]
#[strum_discriminants(derive(Display, Hash, AsRefStr), strum(serialize_all = "lowercase"))]
#[strum_discriminants(name(AtomType))]
pub enum AtomKind {
    /// Caret anchor at the start of a list
    First,
    /// Empty slot waiting for input
    Placeholder,
    /// One or more characters of one class
    Symbol {
        /// Spacing class
        class: AtomClass,
        /// The characters
        text: String,
    },
    /// Group of atoms, optionally forced to a class (`\mathrel{...}`)
    Group {
        /// Content
        body: Vec<Atom>,
        /// Class forced on the group
        class: Option<AtomClass>,
    },
    /// Large or named operator
    Op(OpAtom),
    /// Stack over/under a nucleus
    OverUnder(Box<OverUnderAtom>),
    /// Accent
    Accent(AccentAtom),
    /// Radical
    Surd(SurdAtom),
    /// Generalized fraction
    Genfrac(Box<GenfracAtom>),
    /// Delimited group
    LeftRight(LeftRightAtom),
    /// `\middle` delimiter inside a [`LeftRightAtom`] body
    Middle {
        /// The delimiter
        delim: String,
    },
    /// Delimiter of fixed size (`\big(`, `\Bigr)`)
    SizedDelim {
        /// The delimiter
        delim: String,
        /// Size, 1 to 4
        size: usize,
        /// Spacing class
        class: AtomClass,
    },
    /// Explicit horizontal space
    Spacing {
        /// Width in math units
        mu: f64,
    },
    /// Font size change (`\large`)
    Sizing {
        /// Font size index, 1 to 11
        size: usize,
        /// Content
        body: Vec<Atom>,
    },
    /// Mathstyle change (`\displaystyle`)
    Mathstyle {
        /// The style
        style: MathstyleName,
        /// Content
        body: Vec<Atom>,
    },
    /// Matrix or array environment
    Array(Box<ArrayAtom>),
}

/// Presentation overrides carried by an atom
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AtomStyle {
    /// Foreground color
    pub color: Option<String>,
    /// Background color
    pub background_color: Option<String>,
    /// Font override for symbols
    pub font: Option<FontFamily>,
}

/// A node of the math expression tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// Math or text mode
    pub mode: Mode,
    /// Kind and payload
    pub kind: AtomKind,
    /// Superscript branch
    pub superscript: Option<Vec<Atom>>,
    /// Subscript branch
    pub subscript: Option<Vec<Atom>>,
    /// Presentation overrides
    pub style: AtomStyle,
    /// Whether the atom is part of the selection
    pub is_selected: bool,
    /// Branch of the parent that holds this atom; `None` for roots
    pub parent_branch: Option<Branch>,
    dirty: Cell<bool>,
}

/// Prepend the `first` sentinel when missing and tag every atom with
/// `branch`.
#[must_use]
pub fn adopt(mut list: Vec<Atom>, branch: Branch) -> Vec<Atom> {
    if list.first().is_none_or(|atom| !atom.is_first()) {
        list.insert(0, Atom::first());
    }
    for atom in &mut list {
        atom.parent_branch = Some(branch);
    }
    list
}

/// Whether a list holds exactly one glyph atom, with no scripts attached
#[must_use]
pub fn is_character_list(list: &[Atom]) -> bool {
    let mut atoms = list.iter().filter(|atom| !atom.is_first());
    match (atoms.next(), atoms.next()) {
        (Some(atom), None) => {
            atom.is_character_box() && atom.superscript.is_none() && atom.subscript.is_none()
        }
        _ => false,
    }
}

/// Whether a list holds nothing but sentinels
#[must_use]
pub fn is_empty_list(list: &[Atom]) -> bool {
    list.iter().all(Atom::is_first)
}

impl Atom {
    /// A math-mode atom of the given kind
    #[must_use]
    pub const fn new(kind: AtomKind) -> Self {
        Self {
            mode: Mode::Math,
            kind,
            superscript: None,
            subscript: None,
            style: AtomStyle {
                color: None,
                background_color: None,
                font: None,
            },
            is_selected: false,
            parent_branch: None,
            dirty: Cell::new(true),
        }
    }

    /// The `first` sentinel
    #[must_use]
    pub const fn first() -> Self {
        Self::new(AtomKind::First)
    }

    /// An empty slot
    #[must_use]
    pub const fn placeholder() -> Self {
        Self::new(AtomKind::Placeholder)
    }

    /// A symbol of the given class
    #[must_use]
    pub fn symbol(class: AtomClass, text: impl Into<String>) -> Self {
        Self::new(AtomKind::Symbol {
            class,
            text: text.into(),
        })
    }

    /// An ordinary symbol
    #[must_use]
    pub fn ord(text: impl Into<String>) -> Self {
        Self::symbol(AtomClass::Mord, text)
    }

    /// A binary operator
    #[must_use]
    pub fn bin(text: impl Into<String>) -> Self {
        Self::symbol(AtomClass::Mbin, text)
    }

    /// A relation
    #[must_use]
    pub fn rel(text: impl Into<String>) -> Self {
        Self::symbol(AtomClass::Mrel, text)
    }

    /// A group of atoms
    #[must_use]
    pub fn group(body: Vec<Self>) -> Self {
        Self::new(AtomKind::Group {
            body: adopt(body, Branch::Body),
            class: None,
        })
    }

    /// A symbol operator such as `\sum`
    #[must_use]
    pub fn op_symbol(symbol: impl Into<String>, limits: Limits) -> Self {
        Self::new(AtomKind::Op(OpAtom {
            symbol: Some(symbol.into()),
            body: None,
            limits,
            small: false,
        }))
    }

    /// A named operator such as `\lim`
    #[must_use]
    pub fn op_named(name: &str, limits: Limits) -> Self {
        let body = name
            .chars()
            .map(|c| Self::ord(c).with_font(FontFamily::MainRegular))
            .collect();
        Self::new(AtomKind::Op(OpAtom {
            symbol: None,
            body: Some(adopt(body, Branch::Body)),
            limits,
            small: false,
        }))
    }

    /// A fraction
    #[must_use]
    pub fn frac(numer: Vec<Self>, denom: Vec<Self>) -> Self {
        Self::new(AtomKind::Genfrac(Box::new(GenfracAtom {
            numer: adopt(numer, Branch::Numer),
            denom: adopt(denom, Branch::Denom),
            has_bar_line: true,
            bar_size: None,
            left_delim: None,
            right_delim: None,
            mathstyle: None,
            continued: false,
        })))
    }

    /// A binomial coefficient
    #[must_use]
    pub fn binom(numer: Vec<Self>, denom: Vec<Self>) -> Self {
        let mut atom = Self::frac(numer, denom);
        if let AtomKind::Genfrac(genfrac) = &mut atom.kind {
            genfrac.has_bar_line = false;
            genfrac.left_delim = Some("(".to_owned());
            genfrac.right_delim = Some(")".to_owned());
        }
        atom
    }

    /// A radical
    #[must_use]
    pub fn surd(body: Vec<Self>, index: Option<Vec<Self>>) -> Self {
        Self::new(AtomKind::Surd(SurdAtom {
            body: adopt(body, Branch::Body),
            index: index.map(|index| adopt(index, Branch::Index)),
        }))
    }

    /// An accent
    #[must_use]
    pub fn accent(accent: char, body: Vec<Self>) -> Self {
        Self::new(AtomKind::Accent(AccentAtom {
            accent,
            body: adopt(body, Branch::Body),
        }))
    }

    /// Content with optional material above and below
    #[must_use]
    pub fn overunder(body: Vec<Self>, above: Option<Vec<Self>>, below: Option<Vec<Self>>) -> Self {
        Self::new(AtomKind::OverUnder(Box::new(OverUnderAtom {
            body: adopt(body, Branch::Body),
            above: above.map(|above| adopt(above, Branch::Above)),
            below: below.map(|below| adopt(below, Branch::Below)),
            svg_body: None,
            svg_above: None,
            svg_below: None,
            padded: false,
            class: AtomClass::Mord,
        })))
    }

    /// A delimited group
    #[must_use]
    pub fn leftright(left: Option<&str>, body: Vec<Self>, right: Option<&str>) -> Self {
        Self::new(AtomKind::LeftRight(LeftRightAtom {
            left: left.map(str::to_owned),
            right: right.map(str::to_owned),
            body: adopt(body, Branch::Body),
        }))
    }

    /// A `\middle` delimiter
    #[must_use]
    pub fn middle(delim: impl Into<String>) -> Self {
        Self::new(AtomKind::Middle {
            delim: delim.into(),
        })
    }

    /// Explicit space in math units
    #[must_use]
    pub const fn spacing(mu: f64) -> Self {
        Self::new(AtomKind::Spacing { mu })
    }

    /// Content at another font size
    #[must_use]
    pub fn sizing(size: usize, body: Vec<Self>) -> Self {
        Self::new(AtomKind::Sizing {
            size,
            body: adopt(body, Branch::Body),
        })
    }

    /// Content in another mathstyle
    #[must_use]
    pub fn mathstyle(style: MathstyleName, body: Vec<Self>) -> Self {
        Self::new(AtomKind::Mathstyle {
            style,
            body: adopt(body, Branch::Body),
        })
    }

    /// Attach a superscript
    #[must_use]
    pub fn with_sup(mut self, sup: Vec<Self>) -> Self {
        self.superscript = Some(adopt(sup, Branch::Superscript));
        self
    }

    /// Attach a subscript
    #[must_use]
    pub fn with_sub(mut self, sub: Vec<Self>) -> Self {
        self.subscript = Some(adopt(sub, Branch::Subscript));
        self
    }

    /// Set the foreground color
    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.style.color = Some(color.into());
        self
    }

    /// Set the font of a symbol
    #[must_use]
    pub const fn with_font(mut self, font: FontFamily) -> Self {
        self.style.font = Some(font);
        self
    }

    /// Set text mode
    #[must_use]
    pub const fn in_text_mode(mut self) -> Self {
        self.mode = Mode::Text;
        self
    }

    /// Mark the atom as selected
    #[must_use]
    pub const fn selected(mut self) -> Self {
        self.is_selected = true;
        self
    }

    /// The atom type
    #[must_use]
    pub fn atom_type(&self) -> AtomType {
        AtomType::from(&self.kind)
    }

    /// Whether this is the `first` sentinel
    #[must_use]
    pub const fn is_first(&self) -> bool {
        matches!(self.kind, AtomKind::First)
    }

    /// Whether the nucleus of this atom is a single glyph. Scripts attached
    /// to the atom itself are not considered.
    #[must_use]
    pub fn is_character_box(&self) -> bool {
        match &self.kind {
            AtomKind::Symbol { text, .. } => text.chars().count() == 1,
            AtomKind::Group { body, class: None } => is_character_list(body),
            _ => false,
        }
    }

    /// Whether the layout of this atom is out of date
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    /// Flag the layout of this atom as out of date, or as fresh
    pub fn set_dirty(&self, dirty: bool) {
        self.dirty.set(dirty);
    }

    /// Clear the parent relation of an atom removed from the tree
    pub fn detach(&mut self) {
        self.parent_branch = None;
    }

    /// Borrow a branch of this atom
    #[must_use]
    pub fn branch(&self, branch: Branch) -> Option<&[Self]> {
        match (branch, &self.kind) {
            (Branch::Superscript, _) => self.superscript.as_deref(),
            (Branch::Subscript, _) => self.subscript.as_deref(),
            (
                Branch::Body,
                AtomKind::Group { body, .. }
                | AtomKind::Sizing { body, .. }
                | AtomKind::Mathstyle { body, .. },
            ) => Some(body.as_slice()),
            (Branch::Body, AtomKind::Op(op)) => op.body.as_deref(),
            (Branch::Body, AtomKind::OverUnder(ou)) => Some(ou.body.as_slice()),
            (Branch::Above, AtomKind::OverUnder(ou)) => ou.above.as_deref(),
            (Branch::Below, AtomKind::OverUnder(ou)) => ou.below.as_deref(),
            (Branch::Body, AtomKind::Accent(accent)) => Some(accent.body.as_slice()),
            (Branch::Body, AtomKind::Surd(surd)) => Some(surd.body.as_slice()),
            (Branch::Index, AtomKind::Surd(surd)) => surd.index.as_deref(),
            (Branch::Numer, AtomKind::Genfrac(frac)) => Some(frac.numer.as_slice()),
            (Branch::Denom, AtomKind::Genfrac(frac)) => Some(frac.denom.as_slice()),
            (Branch::Body, AtomKind::LeftRight(lr)) => Some(lr.body.as_slice()),
            (Branch::Cell { row, col }, AtomKind::Array(array)) => array.cell(row, col),
            _ => None,
        }
    }
}
