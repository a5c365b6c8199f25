//! Component protocol definitions.
//!
//! Components are the managed objects of the container. Processors are
//! components that additionally expose one of the processor roles.

mod access;
mod processor;
mod traits;

pub use access::*;
pub use processor::*;
pub use traits::*;
