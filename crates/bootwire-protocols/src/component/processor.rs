//! Processor roles: registry/factory mutators, construction interceptors,
//! definition mergers, and event listeners.

use std::sync::Arc;

use super::{Component, ComponentRegistry, ConfigurableFactory};
use crate::descriptor::{ComponentDescriptor, PropertyValues};
use crate::error::ContainerError;

/// May alter factory-level configuration. Cannot add descriptors.
pub trait FactoryMutator: Send + Sync {
    fn mutate_factory(&self, factory: &mut dyn ConfigurableFactory) -> Result<(), ContainerError>;
}

/// May add or replace descriptors while the registry is still open.
///
/// Every registry mutator is also a factory mutator; its factory callback
/// runs after all registry callbacks have returned.
pub trait RegistryMutator: FactoryMutator {
    fn mutate_registry(&self, registry: &mut dyn ComponentRegistry) -> Result<(), ContainerError>;
}

/// What an interceptor sees about the component being built.
#[derive(Debug, Clone, Copy)]
pub struct InterceptContext<'a> {
    pub name: &'a str,
    pub descriptor: &'a ComponentDescriptor,
    /// Length of the interceptor chain at the time of the callback.
    pub installed_interceptors: usize,
}

/// Callbacks around the creation of every component built after the
/// interceptor is installed. All callbacks default to pass-through.
pub trait ConstructionInterceptor: Send + Sync {
    /// Returning `Some` short-circuits instantiation; only
    /// [`after_initialization`](Self::after_initialization) is then applied.
    fn before_instantiation(
        &self,
        _ctx: &InterceptContext<'_>,
    ) -> Result<Option<Box<dyn Component>>, ContainerError> {
        Ok(None)
    }

    /// Returning `false` skips property population for this instance.
    fn after_instantiation(
        &self,
        _instance: &dyn Component,
        _ctx: &InterceptContext<'_>,
    ) -> Result<bool, ContainerError> {
        Ok(true)
    }

    fn before_property_population(
        &self,
        properties: PropertyValues,
        _instance: &dyn Component,
        _ctx: &InterceptContext<'_>,
    ) -> Result<PropertyValues, ContainerError> {
        Ok(properties)
    }

    fn before_initialization(
        &self,
        instance: Arc<dyn Component>,
        _ctx: &InterceptContext<'_>,
    ) -> Result<Arc<dyn Component>, ContainerError> {
        Ok(instance)
    }

    fn after_initialization(
        &self,
        instance: Arc<dyn Component>,
        _ctx: &InterceptContext<'_>,
    ) -> Result<Arc<dyn Component>, ContainerError> {
        Ok(instance)
    }
}

/// Interceptor that merges a component's descriptor right after the raw
/// instance exists and before its properties are populated.
pub trait DefinitionMerger: Send + Sync {
    fn merge_definition(
        &self,
        descriptor: &mut ComponentDescriptor,
        name: &str,
    ) -> Result<(), ContainerError>;
}

/// Events the container publishes to detected listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerEvent {
    /// Bootstrap finished and eager singletons exist.
    Refreshed,
    /// The container is about to destroy its singletons.
    Closed,
}

pub trait EventListener: Send + Sync {
    fn on_event(&self, event: &ContainerEvent) -> Result<(), ContainerError>;
}
