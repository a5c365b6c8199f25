//! # Bootwire Core
//!
//! Component container with a staged extension-hook bootstrap.
//!
//! ## Components
//!
//! - [`DefinitionRegistry`] - Named component descriptors and type suppliers
//! - [`ComponentFactory`] - Lazily builds components through the interceptor chain
//! - [`OrderComparator`] - Default tier/order policy for processors
//! - [`run_bootstrap`] - Registry mutation, factory mutation, interceptor registration
//! - [`Container`] - Lifecycle wrapper: refresh, lookup, close
//!
//! ## Bootstrap
//!
//! Registry mutators run to a fixed point, then factory mutators run once,
//! then construction interceptors are instantiated and installed. Ordinary
//! components built afterwards pass through the full chain.

pub mod bootstrap;
pub mod container;
pub mod factory;
pub mod ordering;
pub mod registry;

pub use bootstrap::{
    run_bootstrap, run_bootstrap_with, BootstrapOptions, BootstrapReport, InterceptorChecker,
    ListenerDetector, ListenerRegistry,
};
pub use container::{Container, ContainerOptions, ContainerState};
pub use factory::{ComponentFactory, NamedComponent};
pub use ordering::{OrderComparator, HIGHEST_PRECEDENCE, LOWEST_PRECEDENCE};
pub use registry::DefinitionRegistry;
