//! Registry of component descriptors.

mod definition;

pub use definition::DefinitionRegistry;
