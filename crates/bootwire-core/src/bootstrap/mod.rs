//! Staged bootstrap of registry mutators, factory mutators, and
//! construction interceptors.
//!
//! The passes run strictly in sequence on the calling thread:
//!
//! 1. Registry mutation, repeated until no unprocessed registry mutator is
//!    left (mutators may register further mutators).
//! 2. Factory mutation, once, over every factory mutator not handled in 1.
//! 3. Interceptor registration: the checker, the discovered interceptors by
//!    tier, the merge-definition interceptors again, and the listener
//!    detector last.
//!
//! The first failure aborts the whole bootstrap. Nothing already applied is
//! rolled back.

mod checker;
mod factory_pass;
mod interceptor_pass;
mod listener;
mod registry_pass;

pub use checker::InterceptorChecker;
pub use listener::{ListenerDetector, ListenerRegistry};

use std::collections::HashSet;
use std::sync::Arc;

use tracing::info;

use bootwire_protocols::{Component, ContainerError};

use crate::factory::ComponentFactory;

/// Name under which the interceptor checker is installed.
pub const CHECKER_NAME: &str = "bootwire.interceptorChecker";

/// Name under which the listener detector is installed.
pub const LISTENER_DETECTOR_NAME: &str = "bootwire.listenerDetector";

/// Knobs for a single bootstrap run.
#[derive(Debug, Clone)]
pub struct BootstrapOptions {
    /// Emit a warning for every component the checker flags.
    pub report_ineligible: bool,
}

impl Default for BootstrapOptions {
    fn default() -> Self {
        Self {
            report_ineligible: true,
        }
    }
}

/// What a completed bootstrap did.
#[derive(Debug)]
pub struct BootstrapReport {
    /// Components passed through mutate-registry, in call order.
    pub registry_mutated: Vec<String>,
    /// Components passed through mutate-factory, in call order.
    pub factory_mutated: Vec<String>,
    /// Final interceptor chain, in invocation order.
    pub interceptors: Vec<String>,
    pub checker: Arc<InterceptorChecker>,
    pub listeners: ListenerRegistry,
}

/// Run the bootstrap with default options.
pub fn run_bootstrap(
    factory: &mut ComponentFactory,
    supplied: &[Arc<dyn Component>],
) -> Result<BootstrapReport, ContainerError> {
    run_bootstrap_with(factory, supplied, &BootstrapOptions::default())
}

/// Run registry mutation, factory mutation, and interceptor registration.
///
/// `supplied` are caller-provided mutator instances; they run before any
/// name-discovered processor. Not re-entrant: running twice on the same
/// factory installs the chain twice.
pub fn run_bootstrap_with(
    factory: &mut ComponentFactory,
    supplied: &[Arc<dyn Component>],
    options: &BootstrapOptions,
) -> Result<BootstrapReport, ContainerError> {
    info!(
        descriptors = factory.registry().len(),
        supplied = supplied.len(),
        "Starting bootstrap"
    );

    let mut run = Bootstrap {
        factory,
        processed: HashSet::new(),
        registry_mutated: Vec::new(),
        factory_mutated: Vec::new(),
    };

    run.mutate_registry(supplied)?;
    run.mutate_factory()?;
    let (checker, listeners) = run.register_interceptors(options)?;

    let report = BootstrapReport {
        registry_mutated: run.registry_mutated,
        factory_mutated: run.factory_mutated,
        interceptors: run.factory.interceptor_names(),
        checker,
        listeners,
    };

    info!(
        registry_mutators = report.registry_mutated.len(),
        factory_mutators = report.factory_mutated.len(),
        interceptors = report.interceptors.len(),
        "Bootstrap complete"
    );
    Ok(report)
}

/// State shared by the passes of one bootstrap run.
struct Bootstrap<'a> {
    factory: &'a mut ComponentFactory,
    /// Names already handed to a mutator callback.
    processed: HashSet<String>,
    registry_mutated: Vec<String>,
    factory_mutated: Vec<String>,
}

#[cfg(test)]
#[path = "bootstrap_tests.rs"]
mod tests;
