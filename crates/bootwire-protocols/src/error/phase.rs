//! Where in the bootstrap, or in a component build, something happened.

use std::fmt;

/// The bootstrap pass being executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BootstrapPhase {
    RegistryMutation,
    FactoryMutation,
    InterceptorRegistration,
}

impl fmt::Display for BootstrapPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BootstrapPhase::RegistryMutation => "registry-mutation",
            BootstrapPhase::FactoryMutation => "factory-mutation",
            BootstrapPhase::InterceptorRegistration => "interceptor-registration",
        };
        f.write_str(s)
    }
}

/// A single processor callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallbackStage {
    MutateRegistry,
    MutateFactory,
    BeforeInstantiation,
    AfterInstantiation,
    MergeDefinition,
    BeforePropertyPopulation,
    BeforeInitialization,
    AfterInitialization,
    Populate,
    Initialize,
    Destroy,
    Event,
}

impl fmt::Display for CallbackStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CallbackStage::MutateRegistry => "mutate-registry",
            CallbackStage::MutateFactory => "mutate-factory",
            CallbackStage::BeforeInstantiation => "before-instantiation",
            CallbackStage::AfterInstantiation => "after-instantiation",
            CallbackStage::MergeDefinition => "merge-definition",
            CallbackStage::BeforePropertyPopulation => "before-property-population",
            CallbackStage::BeforeInitialization => "before-initialization",
            CallbackStage::AfterInitialization => "after-initialization",
            CallbackStage::Populate => "populate",
            CallbackStage::Initialize => "initialize",
            CallbackStage::Destroy => "destroy",
            CallbackStage::Event => "event",
        };
        f.write_str(s)
    }
}
