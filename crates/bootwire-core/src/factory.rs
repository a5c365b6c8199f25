//! Component factory: lazy builds through the interceptor chain.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use bootwire_protocols::{
    Capability, CapabilitySet, Component, ComponentDescriptor, ComponentRegistry,
    ConfigurableFactory, ContainerError, InterceptContext, OrderingPolicy, Tier,
};

use crate::ordering::{sort_by_policy, OrderComparator};
use crate::registry::DefinitionRegistry;

/// A component instance paired with the name it is known by.
#[derive(Clone)]
pub struct NamedComponent {
    pub name: String,
    pub component: Arc<dyn Component>,
}

impl NamedComponent {
    pub fn new(name: impl Into<String>, component: Arc<dyn Component>) -> Self {
        Self {
            name: name.into(),
            component,
        }
    }
}

impl fmt::Debug for NamedComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamedComponent")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Resolves descriptors into shared singleton instances.
///
/// Every build consults the interceptor chain as it stands when the build
/// starts. Processors built during bootstrap therefore only see the part of
/// the chain installed before them.
pub struct ComponentFactory {
    registry: DefinitionRegistry,
    singletons: HashMap<String, Arc<dyn Component>>,
    /// Singletons registered without a descriptor, in registration order.
    manual_singletons: Vec<String>,
    creation_order: Vec<String>,
    in_creation: HashSet<String>,
    interceptors: Vec<NamedComponent>,
    type_cache: Mutex<HashMap<(String, CapabilitySet), bool>>,
    ordering: Arc<dyn OrderingPolicy>,
}

impl ComponentFactory {
    /// Create a factory over an empty registry.
    pub fn new() -> Self {
        Self::with_registry(DefinitionRegistry::new())
    }

    pub fn with_registry(registry: DefinitionRegistry) -> Self {
        Self {
            registry,
            singletons: HashMap::new(),
            manual_singletons: Vec::new(),
            creation_order: Vec::new(),
            in_creation: HashSet::new(),
            interceptors: Vec::new(),
            type_cache: Mutex::new(HashMap::new()),
            ordering: Arc::new(OrderComparator),
        }
    }

    /// Get the descriptor registry.
    pub fn registry(&self) -> &DefinitionRegistry {
        &self.registry
    }

    /// Get mutable access to the descriptor registry.
    ///
    /// Drops cached type matches, since any descriptor may change.
    pub fn registry_mut(&mut self) -> &mut DefinitionRegistry {
        self.type_cache.lock().clear();
        &mut self.registry
    }

    pub fn has_descriptor(&self, name: &str) -> bool {
        self.registry.contains(name)
    }

    pub fn describe(&self, name: &str) -> Result<&ComponentDescriptor, ContainerError> {
        self.registry.describe(name)
    }

    /// Names of components implementing `cap`: descriptors first, in
    /// registration order, then singletons that still have no descriptor.
    pub fn names_implementing(&self, cap: Capability) -> Vec<String> {
        let mut names: Vec<String> = self
            .registry
            .names()
            .into_iter()
            .filter(|name| self.type_matches(name, cap))
            .collect();
        names.extend(
            self.manual_singletons
                .iter()
                .filter(|name| !self.registry.contains(name) && self.type_matches(name, cap))
                .cloned(),
        );
        names
    }

    /// Whether `name` implements `cap`, without building anything.
    pub fn type_matches(&self, name: &str, cap: Capability) -> bool {
        if let Some(descriptor) = self.registry.get(name) {
            let key = (name.to_string(), cap.as_set());
            if let Some(&hit) = self.type_cache.lock().get(&key) {
                return hit;
            }
            let matches = descriptor.satisfies(cap);
            self.type_cache.lock().insert(key, matches);
            return matches;
        }
        self.singletons
            .get(name)
            .is_some_and(|instance| instance_satisfies(instance.as_ref(), cap))
    }

    /// Scheduling tier of `name` under the current ordering policy.
    pub fn classify(&self, name: &str) -> Tier {
        self.ordering.classify(&self.ordering_descriptor(name))
    }

    /// Stable sort by the current ordering policy.
    pub fn sort_named(&self, items: Vec<NamedComponent>) -> Vec<NamedComponent> {
        sort_by_policy(self.ordering.as_ref(), items, |item| {
            self.ordering_descriptor(&item.name)
        })
    }

    fn ordering_descriptor(&self, name: &str) -> ComponentDescriptor {
        self.registry
            .get(name)
            .cloned()
            .unwrap_or_else(|| ComponentDescriptor::new(name, "<singleton>"))
    }

    /// Drop metadata cached to answer type queries.
    pub fn invalidate_metadata_cache(&self) {
        let mut cache = self.type_cache.lock();
        debug!(entries = cache.len(), "Invalidating factory metadata cache");
        cache.clear();
    }

    /// Resolve `name` and verify it implements `cap`.
    pub fn get_or_build(
        &mut self,
        name: &str,
        cap: Capability,
    ) -> Result<Arc<dyn Component>, ContainerError> {
        if self.registry.contains(name) && !self.type_matches(name, cap) {
            return Err(ContainerError::resolution(
                name,
                format!("descriptor does not declare capability {cap}"),
            ));
        }

        let instance = self.get(name)?;
        if !instance_satisfies(instance.as_ref(), cap) {
            return Err(ContainerError::resolution(
                name,
                format!("built instance does not implement {cap}"),
            ));
        }
        Ok(instance)
    }

    /// Resolve `name`, building it on first use.
    pub fn get(&mut self, name: &str) -> Result<Arc<dyn Component>, ContainerError> {
        if let Some(instance) = self.singletons.get(name) {
            return Ok(instance.clone());
        }
        if !self.registry.contains(name) {
            return Err(ContainerError::resolution(name, "no component descriptor"));
        }
        if !self.in_creation.insert(name.to_string()) {
            return Err(ContainerError::resolution(
                name,
                "component is currently in creation (unresolvable dependency cycle?)",
            ));
        }

        let result = self.create(name);
        self.in_creation.remove(name);
        let instance = result?;

        self.singletons.insert(name.to_string(), instance.clone());
        self.creation_order.push(name.to_string());
        Ok(instance)
    }

    /// Whether `name` has already been materialized.
    pub fn is_built(&self, name: &str) -> bool {
        self.singletons.contains_key(name)
    }

    fn create(&mut self, name: &str) -> Result<Arc<dyn Component>, ContainerError> {
        let mut descriptor = self.registry.describe(name)?.clone();

        for dependency in &descriptor.depends_on {
            trace!(component = %name, dependency = %dependency, "Resolving dependency");
            self.get(dependency)?;
        }

        debug!(component = %name, type_name = %descriptor.type_name, "Creating component");
        let chain = self.interceptors.clone();
        let installed = chain.len();

        {
            let ctx = InterceptContext {
                name,
                descriptor: &descriptor,
                installed_interceptors: installed,
            };
            for entry in &chain {
                let Some(interceptor) = entry.component.as_interceptor() else {
                    continue;
                };
                if let Some(shortcut) = interceptor.before_instantiation(&ctx)? {
                    debug!(component = %name, interceptor = %entry.name, "Instantiation short-circuited");
                    return apply_after_initialization(&chain, Arc::from(shortcut), &ctx);
                }
            }
        }

        let supplier = self.registry.supplier(&descriptor.type_name).ok_or_else(|| {
            ContainerError::resolution(
                name,
                format!("no supplier registered for type {}", descriptor.type_name),
            )
        })?;
        let mut raw = supplier(&descriptor)?;

        for entry in &chain {
            if let Some(merger) = entry.component.as_definition_merger() {
                merger.merge_definition(&mut descriptor, name)?;
            }
        }

        let ctx = InterceptContext {
            name,
            descriptor: &descriptor,
            installed_interceptors: installed,
        };

        let mut populate = true;
        for entry in &chain {
            let Some(interceptor) = entry.component.as_interceptor() else {
                continue;
            };
            if !interceptor.after_instantiation(raw.as_ref(), &ctx)? {
                populate = false;
                break;
            }
        }

        if populate {
            let mut properties = descriptor.properties.clone();
            for entry in &chain {
                if let Some(interceptor) = entry.component.as_interceptor() {
                    properties =
                        interceptor.before_property_population(properties, raw.as_ref(), &ctx)?;
                }
            }
            raw.populate(&properties)?;
        }

        let mut instance: Arc<dyn Component> = Arc::from(raw);
        for entry in &chain {
            if let Some(interceptor) = entry.component.as_interceptor() {
                instance = interceptor.before_initialization(instance, &ctx)?;
            }
        }
        instance.initialize()?;

        apply_after_initialization(&chain, instance, &ctx)
    }

    /// Append an interceptor to the chain.
    pub fn install_interceptor(&mut self, entry: NamedComponent) -> Result<(), ContainerError> {
        if entry.component.as_interceptor().is_none() {
            return Err(ContainerError::resolution(
                entry.name,
                format!("does not implement {}", Capability::ConstructionInterceptor),
            ));
        }
        debug!(interceptor = %entry.name, position = self.interceptors.len(), "Installing interceptor");
        self.interceptors.push(entry);
        Ok(())
    }

    /// Move the first chain entry named `name` to the end of the chain.
    /// Returns false when no such entry is installed.
    pub fn move_interceptor_last(&mut self, name: &str) -> bool {
        let Some(position) = self.interceptors.iter().position(|e| e.name == name) else {
            return false;
        };
        let entry = self.interceptors.remove(position);
        self.interceptors.push(entry);
        true
    }

    pub fn interceptor_count(&self) -> usize {
        self.interceptors.len()
    }

    /// Names in the interceptor chain, in invocation order.
    pub fn interceptor_names(&self) -> Vec<String> {
        self.interceptors.iter().map(|e| e.name.clone()).collect()
    }

    /// Build every non-lazy descriptor not built yet. Returns how many
    /// components were materialized by this call.
    pub fn preinstantiate_singletons(&mut self) -> Result<usize, ContainerError> {
        let before = self.creation_order.len();
        for name in self.registry.names() {
            let eager = self
                .registry
                .get(&name)
                .is_some_and(|descriptor| !descriptor.lazy_init);
            if eager && !self.singletons.contains_key(&name) {
                self.get(&name)?;
            }
        }
        Ok(self.creation_order.len() - before)
    }

    /// Destroy singletons in reverse creation order. Failures are logged and
    /// counted; every singleton is still dropped.
    pub fn destroy_singletons(&mut self) -> usize {
        let mut failures = 0;
        for name in self.creation_order.drain(..).rev() {
            let Some(instance) = self.singletons.remove(&name) else {
                continue;
            };
            trace!(component = %name, "Destroying component");
            if let Err(e) = instance.destroy() {
                warn!(component = %name, "Destroy callback failed: {}", e);
                failures += 1;
            }
        }
        self.singletons.clear();
        self.manual_singletons.clear();
        failures
    }
}

impl Default for ComponentFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigurableFactory for ComponentFactory {
    fn describe(&self, name: &str) -> Result<&ComponentDescriptor, ContainerError> {
        self.registry.describe(name)
    }

    fn names(&self) -> Vec<String> {
        self.registry.names()
    }

    fn set_property(
        &mut self,
        name: &str,
        key: &str,
        value: serde_json::Value,
    ) -> Result<(), ContainerError> {
        self.registry
            .get_mut(name)?
            .properties
            .insert(key.to_string(), value);
        Ok(())
    }

    fn set_lazy_init(&mut self, name: &str, lazy: bool) -> Result<(), ContainerError> {
        self.registry.get_mut(name)?.lazy_init = lazy;
        Ok(())
    }

    fn add_interceptor(
        &mut self,
        name: &str,
        interceptor: Arc<dyn Component>,
    ) -> Result<(), ContainerError> {
        self.install_interceptor(NamedComponent::new(name, interceptor))
    }

    fn interceptor_count(&self) -> usize {
        self.interceptors.len()
    }

    fn register_singleton(
        &mut self,
        name: &str,
        instance: Arc<dyn Component>,
    ) -> Result<(), ContainerError> {
        if self.singletons.contains_key(name) {
            return Err(ContainerError::AlreadyRegistered(name.to_string()));
        }
        if !self.registry.contains(name) {
            self.manual_singletons.push(name.to_string());
        }
        self.singletons.insert(name.to_string(), instance);
        self.creation_order.push(name.to_string());
        Ok(())
    }

    fn set_ordering_policy(&mut self, policy: Arc<dyn OrderingPolicy>) {
        self.ordering = policy;
    }
}

fn apply_after_initialization(
    chain: &[NamedComponent],
    mut instance: Arc<dyn Component>,
    ctx: &InterceptContext<'_>,
) -> Result<Arc<dyn Component>, ContainerError> {
    for entry in chain {
        if let Some(interceptor) = entry.component.as_interceptor() {
            instance = interceptor.after_initialization(instance, ctx)?;
        }
    }
    Ok(instance)
}

/// Whether a built instance exposes the role behind `cap`. Ordering markers
/// live only on descriptors, so instances never satisfy them.
pub(crate) fn instance_satisfies(instance: &dyn Component, cap: Capability) -> bool {
    match cap {
        Capability::RegistryMutator => instance.as_registry_mutator().is_some(),
        // Every registry mutator is a factory mutator through the supertrait.
        Capability::FactoryMutator => {
            instance.as_factory_mutator().is_some() || instance.as_registry_mutator().is_some()
        }
        Capability::ConstructionInterceptor => instance.as_interceptor().is_some(),
        Capability::MergeDefinition => {
            instance.as_definition_merger().is_some() && instance.as_interceptor().is_some()
        }
        Capability::EventListener => instance.as_event_listener().is_some(),
        Capability::PriorityOrdered | Capability::Ordered => false,
    }
}

#[cfg(test)]
#[path = "factory_tests.rs"]
mod tests;
