//! Factory-mutation pass.

use tracing::{debug, error, info};

use bootwire_protocols::{BootstrapPhase, Capability, ContainerError, Tier};

use super::Bootstrap;
use crate::factory::NamedComponent;

impl Bootstrap<'_> {
    /// Run every factory mutator not handled by the registry pass, tier by
    /// tier. Runs once; factory mutators cannot add descriptors.
    pub(super) fn mutate_factory(&mut self) -> Result<(), ContainerError> {
        info!(phase = %BootstrapPhase::FactoryMutation, "Running factory mutators");

        let mut highest = Vec::new();
        let mut ordered = Vec::new();
        let mut unordered = Vec::new();
        for name in self.factory.names_implementing(Capability::FactoryMutator) {
            if self.processed.contains(&name) {
                continue;
            }
            match self.factory.classify(&name) {
                Tier::HighestPriority => highest.push(name),
                Tier::Priority => ordered.push(name),
                Tier::Default => unordered.push(name),
            }
        }

        for names in [highest, ordered, unordered] {
            let mut batch = Vec::with_capacity(names.len());
            for name in names {
                let component = self
                    .factory
                    .get_or_build(&name, Capability::FactoryMutator)
                    .map_err(|e| e.in_phase(BootstrapPhase::FactoryMutation))
                    .inspect_err(|e| {
                        error!(component = %name, phase = %BootstrapPhase::FactoryMutation, "Failed to resolve factory mutator: {}", e);
                    })?;
                self.processed.insert(name.clone());
                batch.push(NamedComponent::new(name, component));
            }
            let batch = self.factory.sort_named(batch);
            self.invoke_factory_mutators(&batch, BootstrapPhase::FactoryMutation)?;
        }

        self.factory.invalidate_metadata_cache();
        info!(invoked = self.factory_mutated.len(), "Factory mutation complete");
        Ok(())
    }

    pub(super) fn invoke_factory_mutators(
        &mut self,
        batch: &[NamedComponent],
        phase: BootstrapPhase,
    ) -> Result<(), ContainerError> {
        for entry in batch {
            debug!(component = %entry.name, "mutate-factory");
            let result = if let Some(mutator) = entry.component.as_factory_mutator() {
                mutator.mutate_factory(&mut *self.factory)
            } else if let Some(mutator) = entry.component.as_registry_mutator() {
                mutator.mutate_factory(&mut *self.factory)
            } else {
                Err(ContainerError::resolution(
                    &entry.name,
                    format!("does not implement {}", Capability::FactoryMutator),
                )
                .in_phase(phase))
            };
            result.inspect_err(|e| {
                error!(component = %entry.name, phase = %phase, "mutate-factory failed: {}", e);
            })?;
            self.factory_mutated.push(entry.name.clone());
        }
        Ok(())
    }
}
