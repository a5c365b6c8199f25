//! Views of the registry and factory handed to processors.

use std::cmp::Ordering;
use std::sync::Arc;

use super::{Component, InstanceSupplier};
use crate::capability::Tier;
use crate::descriptor::ComponentDescriptor;
use crate::error::ContainerError;

/// Mutable access to component descriptors, given to registry mutators.
pub trait ComponentRegistry {
    /// Add a descriptor, or replace one with the same name when overriding
    /// is allowed.
    fn register(&mut self, descriptor: ComponentDescriptor) -> Result<(), ContainerError>;

    fn remove(&mut self, name: &str) -> Result<ComponentDescriptor, ContainerError>;

    fn contains(&self, name: &str) -> bool;

    fn describe(&self, name: &str) -> Result<&ComponentDescriptor, ContainerError>;

    /// All descriptor names in registration order.
    fn names(&self) -> Vec<String>;

    /// Register the supplier that builds instances of `type_name`.
    fn register_type(&mut self, type_name: &str, supplier: InstanceSupplier);

    fn has_type(&self, type_name: &str) -> bool;
}

/// Factory-level configuration, given to factory mutators.
///
/// Deliberately offers no way to register new descriptors.
pub trait ConfigurableFactory {
    fn describe(&self, name: &str) -> Result<&ComponentDescriptor, ContainerError>;

    fn names(&self) -> Vec<String>;

    /// Set one property on an existing descriptor.
    fn set_property(
        &mut self,
        name: &str,
        key: &str,
        value: serde_json::Value,
    ) -> Result<(), ContainerError>;

    fn set_lazy_init(&mut self, name: &str, lazy: bool) -> Result<(), ContainerError>;

    /// Append an interceptor to the chain ahead of the registration pass.
    fn add_interceptor(
        &mut self,
        name: &str,
        interceptor: Arc<dyn Component>,
    ) -> Result<(), ContainerError>;

    fn interceptor_count(&self) -> usize;

    /// Register an already-built instance under `name`.
    fn register_singleton(
        &mut self,
        name: &str,
        instance: Arc<dyn Component>,
    ) -> Result<(), ContainerError>;

    /// Replace the comparator used to sort processors.
    fn set_ordering_policy(&mut self, policy: Arc<dyn OrderingPolicy>);
}

/// Classifies processors into tiers and orders them within a tier.
pub trait OrderingPolicy: Send + Sync {
    fn classify(&self, descriptor: &ComponentDescriptor) -> Tier {
        descriptor.tier()
    }

    fn compare(&self, a: &ComponentDescriptor, b: &ComponentDescriptor) -> Ordering;
}
