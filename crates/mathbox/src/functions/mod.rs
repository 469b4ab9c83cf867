//! Renderers, one module per atom kind.
//!
//! Each renderer receives the context scoped to the list the atom lives in
//! and returns a single box measured in the ems of that context.

pub mod accent;
pub mod genfrac;
pub mod leftright;
pub mod op;
pub mod overunder;
pub mod supsub;
pub mod surd;
pub mod symbol;
mod utils;
