//! Error types for the bootwire protocol layer.

mod container;
mod phase;

pub use container::*;
pub use phase::*;
