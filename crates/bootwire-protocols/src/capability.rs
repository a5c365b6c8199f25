//! Capability tags, priority tiers, and component roles.
//!
//! A component never advertises what it can do through its concrete type.
//! Instead its descriptor carries a [`CapabilitySet`], which the factory can
//! query without building anything.

use serde::{Deserialize, Serialize};

/// A single role a component may satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// May add or replace descriptors while the registry is open.
    RegistryMutator,
    /// May alter factory-level configuration.
    FactoryMutator,
    /// Intercepts the construction of other components.
    ConstructionInterceptor,
    /// Interceptor that also merges descriptors at build time.
    MergeDefinition,
    /// Scheduled before every other processor.
    PriorityOrdered,
    /// Scheduled after priority-ordered processors, before unordered ones.
    Ordered,
    /// Receives container events.
    EventListener,
}

bitflags::bitflags! {
    /// A set of capability tags.
    ///
    /// Implied capabilities are folded into the constants, so
    /// `REGISTRY_MUTATOR.contains(FACTORY_MUTATOR)` holds, as does
    /// `PRIORITY_ORDERED.contains(ORDERED)`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CapabilitySet: u32 {
        /// May alter factory-level configuration.
        const FACTORY_MUTATOR = 1 << 0;
        /// May add or replace descriptors. Implies `FACTORY_MUTATOR`.
        const REGISTRY_MUTATOR = (1 << 1) | Self::FACTORY_MUTATOR.bits();
        /// Intercepts component construction.
        const CONSTRUCTION_INTERCEPTOR = 1 << 2;
        /// Merges descriptors at build time. Implies `CONSTRUCTION_INTERCEPTOR`.
        const MERGE_DEFINITION = (1 << 3) | Self::CONSTRUCTION_INTERCEPTOR.bits();
        /// Explicitly ordered.
        const ORDERED = 1 << 4;
        /// Highest-priority ordering. Implies `ORDERED`.
        const PRIORITY_ORDERED = (1 << 5) | Self::ORDERED.bits();
        /// Receives container events.
        const EVENT_LISTENER = 1 << 6;
    }
}

impl Capability {
    /// Returns the bitflag for this capability.
    pub const fn as_set(self) -> CapabilitySet {
        match self {
            Self::RegistryMutator => CapabilitySet::REGISTRY_MUTATOR,
            Self::FactoryMutator => CapabilitySet::FACTORY_MUTATOR,
            Self::ConstructionInterceptor => CapabilitySet::CONSTRUCTION_INTERCEPTOR,
            Self::MergeDefinition => CapabilitySet::MERGE_DEFINITION,
            Self::PriorityOrdered => CapabilitySet::PRIORITY_ORDERED,
            Self::Ordered => CapabilitySet::ORDERED,
            Self::EventListener => CapabilitySet::EVENT_LISTENER,
        }
    }

    /// Human-readable name, used in error messages and logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RegistryMutator => "registry-mutator",
            Self::FactoryMutator => "factory-mutator",
            Self::ConstructionInterceptor => "construction-interceptor",
            Self::MergeDefinition => "merge-definition",
            Self::PriorityOrdered => "priority-ordered",
            Self::Ordered => "ordered",
            Self::EventListener => "event-listener",
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Capability> for CapabilitySet {
    fn from(cap: Capability) -> Self {
        cap.as_set()
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        let mut set = CapabilitySet::empty();
        for cap in iter {
            set |= cap.as_set();
        }
        set
    }
}

impl CapabilitySet {
    /// Whether every bit of `cap` is present.
    pub fn satisfies(self, cap: Capability) -> bool {
        self.contains(cap.as_set())
    }

    /// The scheduling tier implied by the ordering markers in this set.
    pub fn tier(self) -> Tier {
        if self.contains(Self::PRIORITY_ORDERED) {
            Tier::HighestPriority
        } else if self.contains(Self::ORDERED) {
            Tier::Priority
        } else {
            Tier::Default
        }
    }

    /// Individual capabilities present in this set, implied ones included.
    pub fn capabilities(self) -> Vec<Capability> {
        ALL_CAPABILITIES
            .iter()
            .copied()
            .filter(|cap| self.satisfies(*cap))
            .collect()
    }
}

const ALL_CAPABILITIES: [Capability; 7] = [
    Capability::RegistryMutator,
    Capability::FactoryMutator,
    Capability::ConstructionInterceptor,
    Capability::MergeDefinition,
    Capability::PriorityOrdered,
    Capability::Ordered,
    Capability::EventListener,
];

impl Serialize for CapabilitySet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.capabilities().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for CapabilitySet {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let caps = Vec::<Capability>::deserialize(deserializer)?;
        Ok(caps.into_iter().collect())
    }
}

/// Coarse scheduling priority for processor-like components.
///
/// Variants are declared in scheduling order, so `Ord` sorts
/// `HighestPriority` first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    HighestPriority,
    Priority,
    Default,
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Tier::HighestPriority => "highest-priority",
            Tier::Priority => "priority",
            Tier::Default => "default",
        };
        f.write_str(s)
    }
}

/// Role tag of a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Ordinary,
    /// Container plumbing; never reported by the interceptor checker.
    Infrastructure,
}
