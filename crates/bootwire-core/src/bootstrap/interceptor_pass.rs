//! Interceptor registration pass.

use std::sync::Arc;

use tracing::{debug, error, info};

use bootwire_protocols::{BootstrapPhase, Capability, ContainerError, Tier};

use super::{
    Bootstrap, BootstrapOptions, CHECKER_NAME, InterceptorChecker, LISTENER_DETECTOR_NAME,
    ListenerDetector, ListenerRegistry,
};
use crate::factory::NamedComponent;

impl Bootstrap<'_> {
    /// Build and install every discovered interceptor, bracketed by the
    /// checker and the listener detector.
    pub(super) fn register_interceptors(
        &mut self,
        options: &BootstrapOptions,
    ) -> Result<(Arc<InterceptorChecker>, ListenerRegistry), ContainerError> {
        let names = self
            .factory
            .names_implementing(Capability::ConstructionInterceptor);
        let target = self.factory.interceptor_count() + 1 + names.len();
        info!(
            phase = %BootstrapPhase::InterceptorRegistration,
            discovered = names.len(),
            target,
            "Registering interceptors"
        );

        let checker = Arc::new(InterceptorChecker::new(target, options.report_ineligible));
        self.factory
            .install_interceptor(NamedComponent::new(CHECKER_NAME, checker.clone()))?;

        let mut highest = Vec::new();
        let mut ordered = Vec::new();
        let mut unordered = Vec::new();
        let mut internal = Vec::new();
        for name in names {
            match self.factory.classify(&name) {
                Tier::HighestPriority => {
                    let entry = self.build_interceptor(name)?;
                    if entry.component.as_definition_merger().is_some() {
                        internal.push(entry.clone());
                    }
                    highest.push(entry);
                }
                Tier::Priority => ordered.push(name),
                Tier::Default => unordered.push(name),
            }
        }

        let highest = self.factory.sort_named(highest);
        self.install_all(highest)?;

        let mut batch = Vec::with_capacity(ordered.len());
        for name in ordered {
            let entry = self.build_interceptor(name)?;
            if entry.component.as_definition_merger().is_some() {
                internal.push(entry.clone());
            }
            batch.push(entry);
        }
        let batch = self.factory.sort_named(batch);
        self.install_all(batch)?;

        // Default tier keeps discovery order.
        let mut batch = Vec::with_capacity(unordered.len());
        for name in unordered {
            let entry = self.build_interceptor(name)?;
            if entry.component.as_definition_merger().is_some() {
                internal.push(entry.clone());
            }
            batch.push(entry);
        }
        self.install_all(batch)?;

        // Internal interceptors are installed a second time, after everything
        // else. Both chain entries stay.
        let internal = self.factory.sort_named(internal);
        debug!(count = internal.len(), "Re-registering internal interceptors");
        self.install_all(internal)?;

        self.factory.move_interceptor_last(CHECKER_NAME);

        let listeners = ListenerRegistry::new();
        self.factory.install_interceptor(NamedComponent::new(
            LISTENER_DETECTOR_NAME,
            Arc::new(ListenerDetector::new(listeners.clone())),
        ))?;

        info!(
            installed = self.factory.interceptor_count(),
            ineligible = checker.ineligible().len(),
            "Interceptor registration complete"
        );
        Ok((checker, listeners))
    }

    fn build_interceptor(&mut self, name: String) -> Result<NamedComponent, ContainerError> {
        let component = self
            .factory
            .get_or_build(&name, Capability::ConstructionInterceptor)
            .map_err(|e| e.in_phase(BootstrapPhase::InterceptorRegistration))
            .inspect_err(|e| {
                error!(component = %name, phase = %BootstrapPhase::InterceptorRegistration, "Failed to resolve interceptor: {}", e);
            })?;
        Ok(NamedComponent::new(name, component))
    }

    fn install_all(&mut self, batch: Vec<NamedComponent>) -> Result<(), ContainerError> {
        for entry in batch {
            self.factory.install_interceptor(entry)?;
        }
        Ok(())
    }
}
