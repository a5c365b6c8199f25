//! # Bootwire Protocols
//!
//! Core protocol definitions (traits and data) for the bootwire container.
//! Contains only interface definitions - no implementations.
//!
//! ## Core Types
//!
//! - [`ComponentDescriptor`] - Metadata describing a buildable named component
//! - [`CapabilitySet`] - Capability tags attached to a descriptor
//! - [`Component`] - A materialized component instance
//! - [`RegistryMutator`], [`FactoryMutator`] - Processors run during bootstrap
//! - [`ConstructionInterceptor`] - Callbacks around every component build
//! - [`ComponentRegistry`], [`ConfigurableFactory`] - Views handed to processors
//! - [`OrderingPolicy`] - Tier classification and in-tier ordering

pub mod capability;
pub mod component;
pub mod descriptor;
pub mod error;

pub use capability::{Capability, CapabilitySet, Role, Tier};
pub use component::{
    Component, ComponentRegistry, ConfigurableFactory, ConstructionInterceptor, ContainerEvent,
    DefinitionMerger, EventListener, FactoryMutator, InstanceSupplier, InterceptContext,
    OrderingPolicy, RegistryMutator,
};
pub use descriptor::{ComponentDescriptor, PropertyValues};
pub use error::{BootstrapPhase, CallbackStage, ContainerError};
