//! Component trait definition.

use std::any::Any;
use std::sync::Arc;

use super::{ConstructionInterceptor, DefinitionMerger, EventListener, FactoryMutator, RegistryMutator};
use crate::descriptor::{ComponentDescriptor, PropertyValues};
use crate::error::ContainerError;

/// Builds a fresh instance for a descriptor. Registered per declared type.
pub type InstanceSupplier =
    Arc<dyn Fn(&ComponentDescriptor) -> Result<Box<dyn Component>, ContainerError> + Send + Sync>;

/// A materialized component.
///
/// Capability accessors return `None` unless the component implements the
/// role. The factory checks them against the descriptor's capability tags
/// when a component is resolved for a specific capability. A registry
/// mutator only needs [`as_registry_mutator`](Self::as_registry_mutator);
/// its factory callback is reached through the supertrait.
pub trait Component: Send + Sync + 'static {
    /// Returns a reference to the component as `Any` for downcasting.
    fn as_any(&self) -> &dyn Any;

    fn as_registry_mutator(&self) -> Option<&dyn RegistryMutator> {
        None
    }

    fn as_factory_mutator(&self) -> Option<&dyn FactoryMutator> {
        None
    }

    fn as_interceptor(&self) -> Option<&dyn ConstructionInterceptor> {
        None
    }

    fn as_definition_merger(&self) -> Option<&dyn DefinitionMerger> {
        None
    }

    fn as_event_listener(&self) -> Option<&dyn EventListener> {
        None
    }

    /// Apply the (possibly intercepted) descriptor properties.
    fn populate(&mut self, _properties: &PropertyValues) -> Result<(), ContainerError> {
        Ok(())
    }

    /// Init callback, run between the before- and after-initialization hooks.
    fn initialize(&self) -> Result<(), ContainerError> {
        Ok(())
    }

    /// Called once when the container destroys its singletons.
    fn destroy(&self) -> Result<(), ContainerError> {
        Ok(())
    }
}
