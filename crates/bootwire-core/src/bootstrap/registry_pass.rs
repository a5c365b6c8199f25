//! Registry-mutation pass.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use bootwire_protocols::{BootstrapPhase, Capability, Component, ContainerError, Tier};

use super::Bootstrap;
use crate::factory::NamedComponent;

impl Bootstrap<'_> {
    /// Drive registry mutators to a fixed point, then hand every mutator
    /// seen so far its factory callback.
    pub(super) fn mutate_registry(
        &mut self,
        supplied: &[Arc<dyn Component>],
    ) -> Result<(), ContainerError> {
        info!(phase = %BootstrapPhase::RegistryMutation, "Running registry mutators");

        let mut regular = Vec::new();
        let mut registry_processors = Vec::new();

        // Caller-supplied instances run first, in the order given.
        for (index, component) in supplied.iter().enumerate() {
            let entry = NamedComponent::new(format!("supplied#{index}"), component.clone());
            if component.as_registry_mutator().is_some() {
                self.invoke_registry_mutators(std::slice::from_ref(&entry))?;
                registry_processors.push(entry);
            } else if component.as_factory_mutator().is_some() {
                regular.push(entry);
            } else {
                warn!(component = %entry.name, "Supplied component implements no mutator role; ignoring");
            }
        }

        // Highest priority first, then everything explicitly ordered.
        let batch = self.discover_registry_mutators(|tier| tier == Tier::HighestPriority)?;
        self.invoke_registry_mutators(&batch)?;
        registry_processors.extend(batch);

        let batch = self.discover_registry_mutators(|tier| tier != Tier::Default)?;
        self.invoke_registry_mutators(&batch)?;
        registry_processors.extend(batch);

        // Any tier, until a scan turns up nothing new.
        let mut round = 0usize;
        loop {
            let batch = self.discover_registry_mutators(|_| true)?;
            if batch.is_empty() {
                break;
            }
            round += 1;
            debug!(round, discovered = batch.len(), "Registry mutators registered further mutators");
            self.invoke_registry_mutators(&batch)?;
            registry_processors.extend(batch);
        }

        info!(
            invoked = self.registry_mutated.len(),
            rounds = round,
            "Registry mutation settled"
        );

        self.invoke_factory_mutators(&regular, BootstrapPhase::RegistryMutation)?;
        self.invoke_factory_mutators(&registry_processors, BootstrapPhase::RegistryMutation)?;
        Ok(())
    }

    /// Build and sort unprocessed registry mutators whose tier is eligible,
    /// marking them processed.
    fn discover_registry_mutators(
        &mut self,
        eligible: impl Fn(Tier) -> bool,
    ) -> Result<Vec<NamedComponent>, ContainerError> {
        let mut batch = Vec::new();
        for name in self.factory.names_implementing(Capability::RegistryMutator) {
            if self.processed.contains(&name) || !eligible(self.factory.classify(&name)) {
                continue;
            }
            let component = self
                .factory
                .get_or_build(&name, Capability::RegistryMutator)
                .map_err(|e| e.in_phase(BootstrapPhase::RegistryMutation))
                .inspect_err(|e| {
                    error!(component = %name, phase = %BootstrapPhase::RegistryMutation, "Failed to resolve registry mutator: {}", e);
                })?;
            self.processed.insert(name.clone());
            batch.push(NamedComponent::new(name, component));
        }
        Ok(self.factory.sort_named(batch))
    }

    fn invoke_registry_mutators(&mut self, batch: &[NamedComponent]) -> Result<(), ContainerError> {
        for entry in batch {
            let Some(mutator) = entry.component.as_registry_mutator() else {
                return Err(ContainerError::resolution(
                    &entry.name,
                    format!("does not implement {}", Capability::RegistryMutator),
                )
                .in_phase(BootstrapPhase::RegistryMutation));
            };
            debug!(component = %entry.name, "mutate-registry");
            mutator
                .mutate_registry(self.factory.registry_mut())
                .inspect_err(|e| {
                    error!(component = %entry.name, phase = %BootstrapPhase::RegistryMutation, "mutate-registry failed: {}", e);
                })?;
            self.registry_mutated.push(entry.name.clone());
        }
        Ok(())
    }
}
