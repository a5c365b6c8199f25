//! Descriptor registry keyed by component name.

use std::collections::HashMap;

use indexmap::IndexMap;
use tracing::debug;

use bootwire_protocols::{
    ComponentDescriptor, ComponentRegistry, ContainerError, InstanceSupplier,
};

/// Registry for component descriptors and the suppliers that build them.
///
/// Names are kept in registration order, which is the discovery order every
/// bootstrap pass sees.
pub struct DefinitionRegistry {
    descriptors: IndexMap<String, ComponentDescriptor>,
    suppliers: HashMap<String, InstanceSupplier>,
    allow_overriding: bool,
}

impl DefinitionRegistry {
    /// Create a new registry that allows descriptor overriding.
    pub fn new() -> Self {
        Self {
            descriptors: IndexMap::new(),
            suppliers: HashMap::new(),
            allow_overriding: true,
        }
    }

    pub fn with_overriding(mut self, allow: bool) -> Self {
        self.allow_overriding = allow;
        self
    }

    pub fn allows_overriding(&self) -> bool {
        self.allow_overriding
    }

    /// Get a descriptor by name.
    pub fn get(&self, name: &str) -> Option<&ComponentDescriptor> {
        self.descriptors.get(name)
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Result<&mut ComponentDescriptor, ContainerError> {
        self.descriptors
            .get_mut(name)
            .ok_or_else(|| ContainerError::NotFound(name.to_string()))
    }

    /// Get the supplier registered for a declared type.
    pub fn supplier(&self, type_name: &str) -> Option<InstanceSupplier> {
        self.suppliers.get(type_name).cloned()
    }

    /// Iterate over all descriptors in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &ComponentDescriptor> + '_ {
        self.descriptors.values()
    }

    /// Get the number of registered descriptors.
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl ComponentRegistry for DefinitionRegistry {
    fn register(&mut self, descriptor: ComponentDescriptor) -> Result<(), ContainerError> {
        if descriptor.name.is_empty() {
            return Err(ContainerError::Custom(
                "component descriptor name must not be empty".to_string(),
            ));
        }

        let name = descriptor.name.clone();
        if self.descriptors.contains_key(&name) {
            if !self.allow_overriding {
                return Err(ContainerError::AlreadyRegistered(name));
            }
            debug!(component = %name, "Overriding component descriptor");
        } else {
            debug!(component = %name, type_name = %descriptor.type_name, "Registering component descriptor");
        }

        // Replacing keeps the original position.
        self.descriptors.insert(name, descriptor);
        Ok(())
    }

    fn remove(&mut self, name: &str) -> Result<ComponentDescriptor, ContainerError> {
        self.descriptors
            .shift_remove(name)
            .ok_or_else(|| ContainerError::NotFound(name.to_string()))
    }

    fn contains(&self, name: &str) -> bool {
        self.descriptors.contains_key(name)
    }

    fn describe(&self, name: &str) -> Result<&ComponentDescriptor, ContainerError> {
        self.descriptors
            .get(name)
            .ok_or_else(|| ContainerError::NotFound(name.to_string()))
    }

    fn names(&self) -> Vec<String> {
        self.descriptors.keys().cloned().collect()
    }

    fn register_type(&mut self, type_name: &str, supplier: InstanceSupplier) {
        self.suppliers.insert(type_name.to_string(), supplier);
    }

    fn has_type(&self, type_name: &str) -> bool {
        self.suppliers.contains_key(type_name)
    }
}

impl Default for DefinitionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "definition_tests.rs"]
mod tests;
