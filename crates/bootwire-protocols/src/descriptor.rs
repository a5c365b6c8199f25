//! Component descriptor types.

use serde::{Deserialize, Serialize};

use crate::capability::{Capability, CapabilitySet, Role, Tier};

/// Property values applied to an instance during population.
pub type PropertyValues = serde_json::Map<String, serde_json::Value>;

/// Metadata describing a buildable named component, prior to instantiation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentDescriptor {
    pub name: String,
    /// Declared type; selects the instance supplier.
    pub type_name: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub capabilities: CapabilitySet,
    /// Explicit order within a tier. `None` sorts after every explicit value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
    /// Components that must be built before this one.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub properties: PropertyValues,
    /// Skipped by eager singleton pre-instantiation.
    #[serde(default)]
    pub lazy_init: bool,
}

impl ComponentDescriptor {
    /// Create a new ordinary descriptor with no capabilities.
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            role: Role::Ordinary,
            capabilities: CapabilitySet::empty(),
            order: None,
            depends_on: Vec::new(),
            properties: PropertyValues::new(),
            lazy_init: false,
        }
    }

    pub fn with_capability(mut self, cap: Capability) -> Self {
        self.capabilities |= cap.as_set();
        self
    }

    pub fn with_capabilities(mut self, caps: CapabilitySet) -> Self {
        self.capabilities |= caps;
        self
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = Some(order);
        self
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    pub fn depends_on(mut self, name: impl Into<String>) -> Self {
        self.depends_on.push(name.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    pub fn lazy(mut self) -> Self {
        self.lazy_init = true;
        self
    }

    /// Scheduling tier derived from the ordering markers.
    pub fn tier(&self) -> Tier {
        self.capabilities.tier()
    }

    pub fn satisfies(&self, cap: Capability) -> bool {
        self.capabilities.satisfies(cap)
    }

    pub fn is_infrastructure(&self) -> bool {
        self.role == Role::Infrastructure
    }
}
