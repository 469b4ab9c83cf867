//! Error type for the layout engine
//!
//! Two families of failures share one type. *Invariant* violations mean the
//! atom tree handed to the engine is malformed (a tree-builder bug upstream);
//! *user* errors come from values a document author controls, such as an
//! array stretch factor. [`LayoutError::is_invariant_violation`] tells them
//! apart.

use alloc::boxed::Box;
use alloc::string::String;
#[cfg(feature = "backtrace")]
use std::backtrace::Backtrace;
use thiserror::Error;

/// Error returned by fallible layout operations.
#[derive(Debug, Error)]
#[error("layout error: {kind}")]
pub struct LayoutError {
    /// Categorised reason for the failure.
    #[source]
    pub kind: Box<LayoutErrorKind>,
    /// Backtrace captured when the error was created
    #[cfg(feature = "backtrace")]
    pub backtrace: Box<Backtrace>,
}

impl LayoutError {
    /// Create a new error of the given kind
    pub fn new<T: Into<LayoutErrorKind>>(kind: T) -> Self {
        Self {
            kind: Box::new(kind.into()),
            #[cfg(feature = "backtrace")]
            backtrace: Box::new(Backtrace::force_capture()),
        }
    }

    /// Whether this error signals a malformed atom tree rather than bad
    /// author input.
    #[must_use]
    pub const fn is_invariant_violation(&self) -> bool {
        self.kind.is_invariant_violation()
    }
}

impl From<strum::ParseError> for LayoutError {
    fn from(err: strum::ParseError) -> Self {
        Self::new(LayoutErrorKind::EnumParse(err))
    }
}

/// Describes the specific reason for a [`LayoutError`].
#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum LayoutErrorKind {
    // Invariant violations
    #[error("unknown mathstyle: {name}")]
    UnknownStyle { name: String },
    #[error("malformed branch `{branch}` on {atom} atom")]
    MalformedBranch { atom: String, branch: String },
    #[error("renderer for {atom} atom produced no boxes")]
    EmptyRenderOutput { atom: String },
    #[error("no font metrics table named {font_family}")]
    MissingFontMetrics { font_family: String },
    #[error("array row {row} has {actual} cells, expected {expected}")]
    NonRectangularArray {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[error("vlist requires at least one element")]
    EmptyVList,
    #[error("path step {step} does not resolve to an atom")]
    InvalidPath { step: usize },
    // Author input
    #[error("invalid array stretch: {stretch}")]
    InvalidArrayStretch { stretch: f64 },
    #[error("invalid column separator: {separator}")]
    InvalidSeparator { separator: String },
    #[error("invalid font size: {size}")]
    InvalidSize { size: usize },
    #[error("{0}")]
    EnumParse(#[from] strum::ParseError),
    #[error("{0}")]
    Message(String),
}

impl LayoutErrorKind {
    /// Whether this kind denotes an upstream tree-builder bug.
    #[must_use]
    pub const fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            Self::UnknownStyle { .. }
                | Self::MalformedBranch { .. }
                | Self::EmptyRenderOutput { .. }
                | Self::MissingFontMetrics { .. }
                | Self::NonRectangularArray { .. }
                | Self::EmptyVList
                | Self::InvalidPath { .. }
        )
    }
}

impl From<&str> for LayoutErrorKind {
    fn from(message: &str) -> Self {
        Self::Message(message.to_owned())
    }
}

impl From<String> for LayoutErrorKind {
    fn from(message: String) -> Self {
        Self::Message(message)
    }
}
