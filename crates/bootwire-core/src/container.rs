//! Container lifecycle management.
//!
//! A [`Container`] owns the factory and drives it through refresh and close:
//! - Bootstrap of registry mutators, factory mutators, and interceptors
//! - Eager creation of non-lazy singletons
//! - Event publication to detected listeners
//! - Destruction in reverse creation order

use std::sync::Arc;

use tracing::{error, info, warn};

use bootwire_protocols::{
    Capability, Component, ComponentDescriptor, ComponentRegistry, ConfigurableFactory,
    ContainerError, ContainerEvent, InstanceSupplier,
};

use crate::bootstrap::{BootstrapOptions, BootstrapReport, run_bootstrap_with};
use crate::factory::ComponentFactory;
use crate::registry::DefinitionRegistry;

#[cfg(test)]
#[path = "container_tests.rs"]
mod tests;

/// Container state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerState {
    /// Accepting registrations, not refreshed.
    Created,
    /// Bootstrap in progress.
    Refreshing,
    /// Refreshed and serving lookups.
    Active,
    /// Singletons destroyed.
    Closed,
    /// Refresh aborted. Singletons built before the failure were destroyed.
    Failed,
}

/// Container configuration.
#[derive(Debug, Clone)]
pub struct ContainerOptions {
    /// Re-registering a name replaces the descriptor instead of failing.
    pub allow_definition_overriding: bool,
    /// Build non-lazy singletons during refresh.
    pub eager_init: bool,
    /// Log a warning for components built before the interceptor chain was
    /// complete.
    pub report_ineligible: bool,
}

impl Default for ContainerOptions {
    fn default() -> Self {
        Self {
            allow_definition_overriding: true,
            eager_init: true,
            report_ineligible: true,
        }
    }
}

/// A component container.
pub struct Container {
    factory: ComponentFactory,
    options: ContainerOptions,
    mutators: Vec<Arc<dyn Component>>,
    state: ContainerState,
    report: Option<BootstrapReport>,
}

impl Container {
    /// Create a new container.
    pub fn new(options: ContainerOptions) -> Self {
        let registry =
            DefinitionRegistry::new().with_overriding(options.allow_definition_overriding);
        Self {
            factory: ComponentFactory::with_registry(registry),
            options,
            mutators: Vec::new(),
            state: ContainerState::Created,
            report: None,
        }
    }

    /// Get current state.
    pub fn state(&self) -> ContainerState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == ContainerState::Active
    }

    pub fn options(&self) -> &ContainerOptions {
        &self.options
    }

    /// Get the factory.
    pub fn factory(&self) -> &ComponentFactory {
        &self.factory
    }

    /// Get the bootstrap report. Present once refresh got past bootstrap.
    pub fn report(&self) -> Option<&BootstrapReport> {
        self.report.as_ref()
    }

    /// Register a component descriptor.
    pub fn register(&mut self, descriptor: ComponentDescriptor) -> Result<(), ContainerError> {
        self.ensure_state(ContainerState::Created, "register")?;
        self.factory.registry_mut().register(descriptor)
    }

    /// Register the supplier that builds instances of `type_name`.
    pub fn register_type(
        &mut self,
        type_name: &str,
        supplier: InstanceSupplier,
    ) -> Result<(), ContainerError> {
        self.ensure_state(ContainerState::Created, "register_type")?;
        self.factory.registry_mut().register_type(type_name, supplier);
        Ok(())
    }

    /// Register an already built singleton without a descriptor.
    pub fn register_singleton(
        &mut self,
        name: &str,
        instance: Arc<dyn Component>,
    ) -> Result<(), ContainerError> {
        self.ensure_state(ContainerState::Created, "register_singleton")?;
        self.factory.register_singleton(name, instance)
    }

    /// Add a mutator instance that runs before every discovered one.
    pub fn add_mutator(&mut self, mutator: Arc<dyn Component>) -> Result<(), ContainerError> {
        self.ensure_state(ContainerState::Created, "add_mutator")?;
        if mutator.as_factory_mutator().is_none() && mutator.as_registry_mutator().is_none() {
            return Err(ContainerError::Custom(
                "mutator implements neither registry nor factory mutation".to_string(),
            ));
        }
        self.mutators.push(mutator);
        Ok(())
    }

    /// Bootstrap the container and build its singletons.
    ///
    /// On failure the container moves to [`ContainerState::Failed`] and
    /// every singleton built so far is destroyed.
    pub fn refresh(&mut self) -> Result<&BootstrapReport, ContainerError> {
        self.ensure_state(ContainerState::Created, "refresh")?;
        self.state = ContainerState::Refreshing;
        info!(
            descriptors = self.factory.registry().len(),
            "Container refreshing..."
        );

        if let Err(e) = self.try_refresh() {
            error!("Container refresh failed: {}", e);
            let failures = self.factory.destroy_singletons();
            if failures > 0 {
                warn!(failures, "Destroy callbacks failed while cleaning up");
            }
            self.state = ContainerState::Failed;
            return Err(e);
        }

        self.state = ContainerState::Active;
        info!("Container active");
        self.report
            .as_ref()
            .ok_or_else(|| ContainerError::IllegalState("refresh produced no report".to_string()))
    }

    fn try_refresh(&mut self) -> Result<(), ContainerError> {
        let options = BootstrapOptions {
            report_ineligible: self.options.report_ineligible,
        };
        let report = run_bootstrap_with(&mut self.factory, &self.mutators, &options)?;
        let listeners = report.listeners.clone();
        self.report = Some(report);

        if self.options.eager_init {
            let built = self.factory.preinstantiate_singletons()?;
            info!(built, "Pre-instantiated singletons");
        }

        // Listeners built before the detector was installed.
        for name in self.factory.names_implementing(Capability::EventListener) {
            if self.factory.is_built(&name) {
                let instance = self.factory.get(&name)?;
                listeners.add(&name, instance);
            }
        }

        listeners.publish(&ContainerEvent::Refreshed)?;
        Ok(())
    }

    /// Look up a component, building it if it is lazy.
    pub fn get(&mut self, name: &str) -> Result<Arc<dyn Component>, ContainerError> {
        self.ensure_state(ContainerState::Active, "get")?;
        self.factory.get(name)
    }

    /// Publish [`ContainerEvent::Closed`] and destroy every singleton.
    pub fn close(&mut self) -> Result<(), ContainerError> {
        self.ensure_state(ContainerState::Active, "close")?;
        info!("Container closing...");

        if let Some(report) = &self.report {
            if let Err(e) = report.listeners.publish(&ContainerEvent::Closed) {
                warn!("Close event delivery failed: {}", e);
            }
        }

        let failures = self.factory.destroy_singletons();
        self.state = ContainerState::Closed;
        info!("Container closed");

        if failures == 0 {
            Ok(())
        } else {
            Err(ContainerError::Custom(format!(
                "{} destroy callbacks failed during close",
                failures
            )))
        }
    }

    fn ensure_state(&self, expected: ContainerState, action: &str) -> Result<(), ContainerError> {
        if self.state != expected {
            return Err(ContainerError::IllegalState(format!(
                "Cannot {} in state {:?}",
                action, self.state
            )));
        }
        Ok(())
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new(ContainerOptions::default())
    }
}
