//! Demo component kinds and container assembly for the CLI.
//!
//! Every kind prints its lifecycle markers to stdout so `bootwire run`
//! shows the order in which the container drives them.

use std::any::Any;
use std::sync::Arc;

use serde_json::json;

use bootwire_config::{ComponentConfig, Config};
use bootwire_core::{Container, ContainerOptions};
use bootwire_protocols::{
    CapabilitySet, Component, ComponentDescriptor, ComponentRegistry, ConfigurableFactory,
    ConstructionInterceptor, ContainerError, ContainerEvent, EventListener, FactoryMutator,
    InstanceSupplier, InterceptContext, PropertyValues, RegistryMutator, Role,
};

pub(crate) const REGISTRY_MUTATOR: &str = "registry-mutator";
pub(crate) const LIFECYCLE_INTERCEPTOR: &str = "lifecycle-interceptor";
pub(crate) const LIFECYCLE_BEAN: &str = "lifecycle-bean";
pub(crate) const EVENT_LISTENER: &str = "event-listener";

/// Component kinds the CLI knows how to build.
pub(crate) const KINDS: [&str; 4] = [
    REGISTRY_MUTATOR,
    LIFECYCLE_INTERCEPTOR,
    LIFECYCLE_BEAN,
    EVENT_LISTENER,
];

/// Capabilities every component of `kind` carries.
pub(crate) fn kind_capabilities(kind: &str) -> Option<CapabilitySet> {
    match kind {
        REGISTRY_MUTATOR => Some(CapabilitySet::REGISTRY_MUTATOR),
        LIFECYCLE_INTERCEPTOR => Some(CapabilitySet::CONSTRUCTION_INTERCEPTOR),
        LIFECYCLE_BEAN => Some(CapabilitySet::empty()),
        EVENT_LISTENER => Some(CapabilitySet::EVENT_LISTENER),
        _ => None,
    }
}

/// Build a container from `config`, optionally seeded with the demo set.
pub(crate) fn assemble(
    config: &Config,
    include_demo: bool,
    eager_init: bool,
) -> Result<Container, ContainerError> {
    let mut container = Container::new(ContainerOptions {
        allow_definition_overriding: config.container.allow_definition_overriding,
        eager_init: eager_init && config.container.eager_init,
        report_ineligible: config.container.report_ineligible,
    });

    register_kinds(&mut container)?;
    if include_demo {
        for descriptor in demo_components() {
            container.register(descriptor)?;
        }
    }
    for component in &config.components {
        container.register(descriptor_from_config(component)?)?;
    }
    Ok(container)
}

fn register_kinds(container: &mut Container) -> Result<(), ContainerError> {
    let suppliers: [(&str, InstanceSupplier); 4] = [
        (
            REGISTRY_MUTATOR,
            Arc::new(|d: &ComponentDescriptor| {
                Ok(Box::new(DefinitionScanner::new(&d.name)) as Box<dyn Component>)
            }),
        ),
        (
            LIFECYCLE_INTERCEPTOR,
            Arc::new(|d: &ComponentDescriptor| {
                Ok(Box::new(LifecycleTracer::new(&d.name)) as Box<dyn Component>)
            }),
        ),
        (
            LIFECYCLE_BEAN,
            Arc::new(|d: &ComponentDescriptor| {
                Ok(Box::new(LifecycleBean::new(&d.name)) as Box<dyn Component>)
            }),
        ),
        (
            EVENT_LISTENER,
            Arc::new(|d: &ComponentDescriptor| {
                Ok(Box::new(EventPrinter::new(&d.name)) as Box<dyn Component>)
            }),
        ),
    ];
    for (kind, supplier) in suppliers {
        container.register_type(kind, supplier)?;
    }
    Ok(())
}

/// The built-in demo set.
pub(crate) fn demo_components() -> Vec<ComponentDescriptor> {
    vec![
        ComponentDescriptor::new("scanner", REGISTRY_MUTATOR)
            .with_capabilities(CapabilitySet::REGISTRY_MUTATOR)
            .with_property("registers", json!(["extraBean"])),
        ComponentDescriptor::new("tracer", LIFECYCLE_INTERCEPTOR)
            .with_capabilities(CapabilitySet::CONSTRUCTION_INTERCEPTOR),
        ComponentDescriptor::new("testBean", LIFECYCLE_BEAN)
            .with_property("message", json!("hello from testBean")),
        ComponentDescriptor::new("listener", EVENT_LISTENER)
            .with_capabilities(CapabilitySet::EVENT_LISTENER),
    ]
}

/// Map a config entry onto a descriptor.
pub(crate) fn descriptor_from_config(
    component: &ComponentConfig,
) -> Result<ComponentDescriptor, ContainerError> {
    let mut capabilities = kind_capabilities(&component.kind).ok_or_else(|| {
        ContainerError::resolution(
            &component.name,
            format!("unknown component kind '{}'", component.kind),
        )
    })?;
    match component.tier.as_str() {
        "highest_priority" => capabilities |= CapabilitySet::PRIORITY_ORDERED,
        "priority" => capabilities |= CapabilitySet::ORDERED,
        "default" => {}
        other => {
            return Err(ContainerError::resolution(
                &component.name,
                format!("unknown tier '{}'", other),
            ));
        }
    }
    let role = match component.role.as_str() {
        "ordinary" => Role::Ordinary,
        "infrastructure" => Role::Infrastructure,
        other => {
            return Err(ContainerError::resolution(
                &component.name,
                format!("unknown role '{}'", other),
            ));
        }
    };

    let mut descriptor = ComponentDescriptor::new(&component.name, &component.kind)
        .with_capabilities(capabilities)
        .with_role(role);
    descriptor.order = component.order;
    descriptor.depends_on = component.depends_on.clone();
    descriptor.properties = component.properties.clone();
    descriptor.lazy_init = component.lazy;
    Ok(descriptor)
}

fn string_list(properties: &PropertyValues, key: &str) -> Option<Vec<String>> {
    properties.get(key)?.as_array().map(|values| {
        values
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect()
    })
}

/// Registry mutator that registers one lifecycle bean per name in its
/// `registers` property.
pub(crate) struct DefinitionScanner {
    name: String,
    registers: Vec<String>,
}

impl DefinitionScanner {
    fn new(name: &str) -> Self {
        println!("construct: {}", name);
        Self {
            name: name.to_string(),
            registers: Vec::new(),
        }
    }
}

impl Component for DefinitionScanner {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_registry_mutator(&self) -> Option<&dyn RegistryMutator> {
        Some(self)
    }

    fn as_factory_mutator(&self) -> Option<&dyn FactoryMutator> {
        Some(self)
    }

    fn populate(&mut self, properties: &PropertyValues) -> Result<(), ContainerError> {
        if let Some(registers) = string_list(properties, "registers") {
            self.registers = registers;
        }
        Ok(())
    }
}

impl RegistryMutator for DefinitionScanner {
    fn mutate_registry(&self, registry: &mut dyn ComponentRegistry) -> Result<(), ContainerError> {
        println!("mutate-registry: {}", self.name);
        for name in &self.registers {
            if registry.contains(name) {
                continue;
            }
            registry.register(
                ComponentDescriptor::new(name, LIFECYCLE_BEAN)
                    .with_property("message", json!(format!("registered by {}", self.name))),
            )?;
        }
        Ok(())
    }
}

impl FactoryMutator for DefinitionScanner {
    fn mutate_factory(&self, factory: &mut dyn ConfigurableFactory) -> Result<(), ContainerError> {
        println!(
            "mutate-factory: {} ({} components)",
            self.name,
            factory.names().len()
        );
        Ok(())
    }
}

/// Interceptor that prints every construction callback.
pub(crate) struct LifecycleTracer {
    name: String,
}

impl LifecycleTracer {
    fn new(name: &str) -> Self {
        println!("construct: {}", name);
        Self {
            name: name.to_string(),
        }
    }
}

impl Component for LifecycleTracer {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_interceptor(&self) -> Option<&dyn ConstructionInterceptor> {
        Some(self)
    }
}

impl ConstructionInterceptor for LifecycleTracer {
    fn before_instantiation(
        &self,
        ctx: &InterceptContext<'_>,
    ) -> Result<Option<Box<dyn Component>>, ContainerError> {
        println!("[{}] before-instantiation: {}", self.name, ctx.name);
        Ok(None)
    }

    fn after_instantiation(
        &self,
        _instance: &dyn Component,
        ctx: &InterceptContext<'_>,
    ) -> Result<bool, ContainerError> {
        println!("[{}] after-instantiation: {}", self.name, ctx.name);
        Ok(true)
    }

    fn before_property_population(
        &self,
        properties: PropertyValues,
        _instance: &dyn Component,
        ctx: &InterceptContext<'_>,
    ) -> Result<PropertyValues, ContainerError> {
        println!("[{}] before-property-population: {}", self.name, ctx.name);
        Ok(properties)
    }

    fn before_initialization(
        &self,
        instance: Arc<dyn Component>,
        ctx: &InterceptContext<'_>,
    ) -> Result<Arc<dyn Component>, ContainerError> {
        println!("[{}] before-initialization: {}", self.name, ctx.name);
        Ok(instance)
    }

    fn after_initialization(
        &self,
        instance: Arc<dyn Component>,
        ctx: &InterceptContext<'_>,
    ) -> Result<Arc<dyn Component>, ContainerError> {
        println!("[{}] after-initialization: {}", self.name, ctx.name);
        Ok(instance)
    }
}

/// Ordinary component with init and destroy callbacks.
pub(crate) struct LifecycleBean {
    name: String,
    message: Option<String>,
}

impl LifecycleBean {
    fn new(name: &str) -> Self {
        println!("construct: {}", name);
        Self {
            name: name.to_string(),
            message: None,
        }
    }

    pub(crate) fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl Component for LifecycleBean {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn populate(&mut self, properties: &PropertyValues) -> Result<(), ContainerError> {
        self.message = properties
            .get("message")
            .and_then(|v| v.as_str())
            .map(str::to_string);
        println!("populate: {}", self.name);
        Ok(())
    }

    fn initialize(&self) -> Result<(), ContainerError> {
        println!("initialize: {}", self.name);
        Ok(())
    }

    fn destroy(&self) -> Result<(), ContainerError> {
        println!("destroy: {}", self.name);
        Ok(())
    }
}

/// Listener that prints every container event.
pub(crate) struct EventPrinter {
    name: String,
}

impl EventPrinter {
    fn new(name: &str) -> Self {
        println!("construct: {}", name);
        Self {
            name: name.to_string(),
        }
    }
}

impl Component for EventPrinter {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_event_listener(&self) -> Option<&dyn EventListener> {
        Some(self)
    }
}

impl EventListener for EventPrinter {
    fn on_event(&self, event: &ContainerEvent) -> Result<(), ContainerError> {
        println!("event: {} received {:?}", self.name, event);
        Ok(())
    }
}
