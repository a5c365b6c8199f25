use super::*;
use std::any::Any;

use parking_lot::Mutex;
use serde_json::json;

use bootwire_protocols::{
    CallbackStage, CapabilitySet, ComponentDescriptor, ComponentRegistry, ConfigurableFactory,
    ConstructionInterceptor, ContainerEvent, DefinitionMerger, EventListener, FactoryMutator,
    InstanceSupplier, InterceptContext, OrderingPolicy, PropertyValues, RegistryMutator, Role,
};

use crate::ordering::OrderComparator;

type Log = Arc<Mutex<Vec<String>>>;

/// Test component whose roles follow the capabilities on its descriptor.
struct Probe {
    name: String,
    caps: CapabilitySet,
    log: Log,
    spawn: Vec<ComponentDescriptor>,
    fail: bool,
}

impl Probe {
    fn new(name: &str, caps: CapabilitySet, log: &Log) -> Self {
        Self {
            name: name.to_string(),
            caps,
            log: log.clone(),
            spawn: Vec::new(),
            fail: false,
        }
    }

    fn when(&self, caps: CapabilitySet) -> bool {
        self.caps.contains(caps)
    }
}

impl Component for Probe {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_registry_mutator(&self) -> Option<&dyn RegistryMutator> {
        self.when(CapabilitySet::REGISTRY_MUTATOR).then_some(self as &dyn RegistryMutator)
    }

    fn as_factory_mutator(&self) -> Option<&dyn FactoryMutator> {
        self.when(CapabilitySet::FACTORY_MUTATOR).then_some(self as &dyn FactoryMutator)
    }

    fn as_interceptor(&self) -> Option<&dyn ConstructionInterceptor> {
        self.when(CapabilitySet::CONSTRUCTION_INTERCEPTOR).then_some(self as &dyn ConstructionInterceptor)
    }

    fn as_definition_merger(&self) -> Option<&dyn DefinitionMerger> {
        self.when(CapabilitySet::MERGE_DEFINITION).then_some(self as &dyn DefinitionMerger)
    }

    fn as_event_listener(&self) -> Option<&dyn EventListener> {
        self.when(CapabilitySet::EVENT_LISTENER).then_some(self as &dyn EventListener)
    }

    fn populate(&mut self, properties: &PropertyValues) -> Result<(), ContainerError> {
        if let Some(spawn) = properties.get("spawn") {
            self.spawn = serde_json::from_value(spawn.clone())
                .map_err(|e| ContainerError::Custom(e.to_string()))?;
        }
        self.fail = properties.get("fail").and_then(|v| v.as_bool()).unwrap_or(false);
        Ok(())
    }
}

impl FactoryMutator for Probe {
    fn mutate_factory(&self, _factory: &mut dyn ConfigurableFactory) -> Result<(), ContainerError> {
        self.log.lock().push(format!("factory:{}", self.name));
        if self.fail {
            return Err(ContainerError::callback(&self.name, CallbackStage::MutateFactory, "boom"));
        }
        Ok(())
    }
}

impl RegistryMutator for Probe {
    fn mutate_registry(&self, registry: &mut dyn ComponentRegistry) -> Result<(), ContainerError> {
        self.log.lock().push(format!("registry:{}", self.name));
        if self.fail {
            return Err(ContainerError::callback(&self.name, CallbackStage::MutateRegistry, "boom"));
        }
        for descriptor in &self.spawn {
            registry.register(descriptor.clone())?;
        }
        Ok(())
    }
}

impl ConstructionInterceptor for Probe {
    fn after_initialization(
        &self,
        instance: Arc<dyn Component>,
        ctx: &InterceptContext<'_>,
    ) -> Result<Arc<dyn Component>, ContainerError> {
        self.log
            .lock()
            .push(format!("intercept:{}:{}", self.name, ctx.name));
        Ok(instance)
    }
}

impl DefinitionMerger for Probe {
    fn merge_definition(
        &self,
        _descriptor: &mut ComponentDescriptor,
        _name: &str,
    ) -> Result<(), ContainerError> {
        Ok(())
    }
}

impl EventListener for Probe {
    fn on_event(&self, event: &ContainerEvent) -> Result<(), ContainerError> {
        self.log
            .lock()
            .push(format!("event:{}:{:?}", self.name, event));
        Ok(())
    }
}

fn probe_supplier(log: &Log) -> InstanceSupplier {
    let log = log.clone();
    Arc::new(move |d: &ComponentDescriptor| {
        Ok(Box::new(Probe::new(&d.name, d.capabilities, &log)) as Box<dyn Component>)
    })
}

fn probe_factory(log: &Log, descriptors: Vec<ComponentDescriptor>) -> ComponentFactory {
    let mut factory = ComponentFactory::new();
    let registry = factory.registry_mut();
    registry.register_type("probe", probe_supplier(log));
    for descriptor in descriptors {
        registry.register(descriptor).unwrap();
    }
    factory
}

fn probe(name: &str, caps: CapabilitySet) -> ComponentDescriptor {
    ComponentDescriptor::new(name, "probe").with_capabilities(caps)
}

fn entries(log: &Log, prefix: &str) -> Vec<String> {
    log.lock()
        .iter()
        .filter(|e| e.starts_with(prefix))
        .cloned()
        .collect()
}

#[test]
fn test_empty_bootstrap_installs_bookends_only() {
    let log: Log = Arc::default();
    let mut factory = probe_factory(&log, vec![]);

    let report = run_bootstrap(&mut factory, &[]).unwrap();

    assert_eq!(report.interceptors, vec![CHECKER_NAME, LISTENER_DETECTOR_NAME]);
    assert_eq!(report.checker.target(), 1);
    assert!(report.registry_mutated.is_empty());
    assert!(report.factory_mutated.is_empty());
    assert!(report.listeners.is_empty());
}

#[test]
fn test_supplied_mutators_run_before_discovered() {
    let log: Log = Arc::default();
    let mut factory = probe_factory(&log, vec![probe("found", CapabilitySet::REGISTRY_MUTATOR)]);
    let supplied: Vec<Arc<dyn Component>> = vec![
        Arc::new(Probe::new("plain", CapabilitySet::FACTORY_MUTATOR, &log)),
        Arc::new(Probe::new("reg", CapabilitySet::REGISTRY_MUTATOR, &log)),
    ];

    let report = run_bootstrap(&mut factory, &supplied).unwrap();

    assert_eq!(
        *log.lock(),
        vec![
            "registry:reg",
            "registry:found",
            "factory:plain",
            "factory:reg",
            "factory:found",
        ]
    );
    assert_eq!(report.registry_mutated, vec!["supplied#1", "found"]);
    assert_eq!(report.factory_mutated, vec!["supplied#0", "supplied#1", "found"]);
}

#[test]
fn test_registry_mutators_by_tier_then_until_settled() {
    let log: Log = Arc::default();
    let spawned = probe("spawned", CapabilitySet::REGISTRY_MUTATOR);
    let mut factory = probe_factory(
        &log,
        vec![
            probe("spawner", CapabilitySet::REGISTRY_MUTATOR)
                .with_property("spawn", json!([spawned])),
            probe("ordered", CapabilitySet::REGISTRY_MUTATOR | CapabilitySet::ORDERED)
                .with_order(1),
            probe("first", CapabilitySet::REGISTRY_MUTATOR | CapabilitySet::PRIORITY_ORDERED)
                .with_order(10),
        ],
    );

    let report = run_bootstrap(&mut factory, &[]).unwrap();

    assert_eq!(
        report.registry_mutated,
        vec!["first", "ordered", "spawner", "spawned"]
    );
    assert!(factory.has_descriptor("spawned"));
    // Each registry mutator gets exactly one factory callback, afterwards.
    assert_eq!(
        entries(&log, "factory:"),
        vec![
            "factory:first",
            "factory:ordered",
            "factory:spawner",
            "factory:spawned",
        ]
    );
}

#[test]
fn test_factory_mutators_by_tier() {
    let log: Log = Arc::default();
    let mut factory = probe_factory(
        &log,
        vec![
            probe("late", CapabilitySet::FACTORY_MUTATOR),
            probe("ordered_b", CapabilitySet::FACTORY_MUTATOR | CapabilitySet::ORDERED)
                .with_order(2),
            probe("ordered_a", CapabilitySet::FACTORY_MUTATOR | CapabilitySet::ORDERED)
                .with_order(1),
            probe("first", CapabilitySet::FACTORY_MUTATOR | CapabilitySet::PRIORITY_ORDERED),
        ],
    );

    let report = run_bootstrap(&mut factory, &[]).unwrap();

    assert_eq!(
        report.factory_mutated,
        vec!["first", "ordered_a", "ordered_b", "late"]
    );
    assert!(report.registry_mutated.is_empty());
}

#[test]
fn test_interceptor_chain_shape_with_internal_duplicates() {
    let log: Log = Arc::default();
    let mut factory = probe_factory(
        &log,
        vec![
            probe("merge_default", CapabilitySet::MERGE_DEFINITION),
            probe("plain", CapabilitySet::CONSTRUCTION_INTERCEPTOR),
            probe("ordered", CapabilitySet::CONSTRUCTION_INTERCEPTOR | CapabilitySet::ORDERED)
                .with_order(1),
            probe("merge_first", CapabilitySet::MERGE_DEFINITION | CapabilitySet::PRIORITY_ORDERED)
                .with_order(2),
            probe("first", CapabilitySet::CONSTRUCTION_INTERCEPTOR | CapabilitySet::PRIORITY_ORDERED)
                .with_order(1),
        ],
    );

    let report = run_bootstrap(&mut factory, &[]).unwrap();

    assert_eq!(
        report.interceptors,
        vec![
            "first",
            "merge_first",
            "ordered",
            "merge_default",
            "plain",
            "merge_first",
            "merge_default",
            CHECKER_NAME,
            LISTENER_DETECTOR_NAME,
        ]
    );
    assert_eq!(report.checker.target(), 6);
}

#[test]
fn test_duplicated_internal_interceptor_runs_twice() {
    let log: Log = Arc::default();
    let mut factory = probe_factory(
        &log,
        vec![
            probe("merger", CapabilitySet::MERGE_DEFINITION),
            probe("bean", CapabilitySet::empty()),
        ],
    );

    run_bootstrap(&mut factory, &[]).unwrap();
    factory.get("bean").unwrap();

    assert_eq!(
        entries(&log, "intercept:"),
        vec!["intercept:merger:bean", "intercept:merger:bean"]
    );
}

#[test]
fn test_checker_flags_components_built_for_interceptors() {
    let log: Log = Arc::default();
    let mut factory = probe_factory(
        &log,
        vec![
            probe("interceptor", CapabilitySet::CONSTRUCTION_INTERCEPTOR)
                .depends_on("helper")
                .depends_on("infra"),
            probe("helper", CapabilitySet::empty()),
            probe("infra", CapabilitySet::empty()).with_role(Role::Infrastructure),
            probe("late", CapabilitySet::empty()),
        ],
    );

    let report = run_bootstrap(&mut factory, &[]).unwrap();
    factory.get("late").unwrap();

    assert_eq!(report.checker.target(), 2);
    assert_eq!(report.checker.ineligible(), vec!["helper"]);
}

#[test]
fn test_checker_flags_once_per_component() {
    let checker = InterceptorChecker::new(3, false);
    let descriptor = ComponentDescriptor::new("a", "probe");
    let ctx = InterceptContext {
        name: "a",
        descriptor: &descriptor,
        installed_interceptors: 1,
    };
    let log: Log = Arc::default();
    let instance: Arc<dyn Component> = Arc::new(Probe::new("a", CapabilitySet::empty(), &log));

    checker.after_initialization(instance.clone(), &ctx).unwrap();
    checker.after_initialization(instance, &ctx).unwrap();

    assert_eq!(checker.ineligible(), vec!["a"]);
}

#[test]
fn test_listener_detector_records_built_listeners() {
    let log: Log = Arc::default();
    let mut factory = probe_factory(
        &log,
        vec![
            probe("listener", CapabilitySet::EVENT_LISTENER),
            probe("bean", CapabilitySet::empty()),
        ],
    );

    let report = run_bootstrap(&mut factory, &[]).unwrap();
    factory.get("listener").unwrap();
    factory.get("bean").unwrap();

    assert_eq!(report.listeners.names(), vec!["listener"]);
    let delivered = report.listeners.publish(&ContainerEvent::Refreshed).unwrap();
    assert_eq!(delivered, 1);
    assert_eq!(entries(&log, "event:"), vec!["event:listener:Refreshed"]);
}

#[test]
fn test_registry_callback_failure_aborts_bootstrap() {
    let log: Log = Arc::default();
    let mut factory = probe_factory(
        &log,
        vec![
            probe("broken", CapabilitySet::REGISTRY_MUTATOR).with_property("fail", json!(true)),
            probe("never", CapabilitySet::FACTORY_MUTATOR),
        ],
    );

    let err = run_bootstrap(&mut factory, &[]).err().unwrap();

    assert!(matches!(
        err,
        ContainerError::Callback { ref name, stage: CallbackStage::MutateRegistry, .. } if name == "broken"
    ));
    assert_eq!(*log.lock(), vec!["registry:broken"]);
    assert_eq!(factory.interceptor_count(), 0);
}

#[test]
fn test_factory_callback_failure_aborts_bootstrap() {
    let log: Log = Arc::default();
    let mut factory = probe_factory(
        &log,
        vec![
            probe("broken", CapabilitySet::FACTORY_MUTATOR).with_property("fail", json!(true)),
            probe("interceptor", CapabilitySet::CONSTRUCTION_INTERCEPTOR),
        ],
    );

    let err = run_bootstrap(&mut factory, &[]).err().unwrap();

    assert_eq!(err.component(), Some("broken"));
    assert!(!factory.is_built("interceptor"));
}

#[test]
fn test_resolution_failure_names_component() {
    let log: Log = Arc::default();
    let mut factory = probe_factory(&log, vec![]);
    factory
        .registry_mut()
        .register(
            ComponentDescriptor::new("orphan", "missing.Type")
                .with_capability(bootwire_protocols::Capability::ConstructionInterceptor),
        )
        .unwrap();

    let err = run_bootstrap(&mut factory, &[]).err().unwrap();

    assert!(matches!(err, ContainerError::Resolution { ref name, .. } if name == "orphan"));
}

#[test]
fn test_report_ineligible_off_still_records() {
    let log: Log = Arc::default();
    let mut factory = probe_factory(
        &log,
        vec![
            probe("interceptor", CapabilitySet::CONSTRUCTION_INTERCEPTOR).depends_on("helper"),
            probe("helper", CapabilitySet::empty()),
        ],
    );
    let options = BootstrapOptions {
        report_ineligible: false,
    };

    let report = run_bootstrap_with(&mut factory, &[], &options).unwrap();

    assert_eq!(report.checker.ineligible(), vec!["helper"]);
}

/// Registry mutator exposing only the registry accessor; its factory
/// callback is reachable through the supertrait alone.
struct RegistryOnly {
    name: String,
    log: Log,
}

impl Component for RegistryOnly {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_registry_mutator(&self) -> Option<&dyn RegistryMutator> {
        Some(self)
    }
}

impl FactoryMutator for RegistryOnly {
    fn mutate_factory(&self, _factory: &mut dyn ConfigurableFactory) -> Result<(), ContainerError> {
        self.log.lock().push(format!("factory:{}", self.name));
        Ok(())
    }
}

impl RegistryMutator for RegistryOnly {
    fn mutate_registry(&self, _registry: &mut dyn ComponentRegistry) -> Result<(), ContainerError> {
        self.log.lock().push(format!("registry:{}", self.name));
        Ok(())
    }
}

/// Factory mutator that customizes the factory before interceptors are
/// registered.
struct Customizer {
    log: Log,
    early_interceptor: bool,
    policy: Option<Arc<dyn OrderingPolicy>>,
}

impl Component for Customizer {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_factory_mutator(&self) -> Option<&dyn FactoryMutator> {
        Some(self)
    }
}

impl FactoryMutator for Customizer {
    fn mutate_factory(&self, factory: &mut dyn ConfigurableFactory) -> Result<(), ContainerError> {
        if self.early_interceptor {
            factory.add_interceptor(
                "early",
                Arc::new(Probe::new("early", CapabilitySet::CONSTRUCTION_INTERCEPTOR, &self.log)),
            )?;
        }
        if let Some(policy) = &self.policy {
            factory.set_ordering_policy(policy.clone());
        }
        Ok(())
    }
}

/// Default ordering, reversed.
struct Reversed;

impl OrderingPolicy for Reversed {
    fn compare(&self, a: &ComponentDescriptor, b: &ComponentDescriptor) -> std::cmp::Ordering {
        OrderComparator.compare(b, a)
    }
}

#[test]
fn test_singleton_given_descriptor_later_is_installed_once() {
    let log: Log = Arc::default();
    let declared = probe("ic", CapabilitySet::CONSTRUCTION_INTERCEPTOR);
    let mut factory = probe_factory(
        &log,
        vec![probe("declarer", CapabilitySet::REGISTRY_MUTATOR).with_property("spawn", json!([declared]))],
    );
    factory
        .register_singleton(
            "ic",
            Arc::new(Probe::new("ic", CapabilitySet::CONSTRUCTION_INTERCEPTOR, &log)),
        )
        .unwrap();

    let report = run_bootstrap(&mut factory, &[]).unwrap();

    assert_eq!(report.interceptors, vec!["ic", CHECKER_NAME, LISTENER_DETECTOR_NAME]);
    assert_eq!(report.checker.target(), 2);
}

#[test]
fn test_registry_mutator_with_registry_accessor_only() {
    let log: Log = Arc::default();
    let mut factory = probe_factory(&log, vec![]);
    let supplier_log = log.clone();
    factory.registry_mut().register_type(
        "registry-only",
        Arc::new(move |d: &ComponentDescriptor| {
            Ok(Box::new(RegistryOnly {
                name: d.name.clone(),
                log: supplier_log.clone(),
            }) as Box<dyn Component>)
        }),
    );
    factory
        .registry_mut()
        .register(
            ComponentDescriptor::new("discovered", "registry-only")
                .with_capabilities(CapabilitySet::REGISTRY_MUTATOR),
        )
        .unwrap();
    let supplied: Vec<Arc<dyn Component>> = vec![Arc::new(RegistryOnly {
        name: "supplied".to_string(),
        log: log.clone(),
    })];

    let report = run_bootstrap(&mut factory, &supplied).unwrap();

    assert_eq!(report.registry_mutated, vec!["supplied#0", "discovered"]);
    assert_eq!(report.factory_mutated, vec!["supplied#0", "discovered"]);
    assert_eq!(
        *log.lock(),
        vec![
            "registry:supplied",
            "registry:discovered",
            "factory:supplied",
            "factory:discovered",
        ]
    );
}

#[test]
fn test_target_counts_interceptors_installed_by_factory_mutators() {
    let log: Log = Arc::default();
    let mut factory = probe_factory(
        &log,
        vec![
            probe("a", CapabilitySet::CONSTRUCTION_INTERCEPTOR),
            probe("b", CapabilitySet::CONSTRUCTION_INTERCEPTOR),
        ],
    );
    let supplied: Vec<Arc<dyn Component>> = vec![Arc::new(Customizer {
        log: log.clone(),
        early_interceptor: true,
        policy: None,
    })];

    let report = run_bootstrap(&mut factory, &supplied).unwrap();

    // One pre-installed, the checker, and two discovered.
    assert_eq!(report.checker.target(), 1 + 1 + 2);
    assert_eq!(
        report.interceptors,
        vec!["early", "a", "b", CHECKER_NAME, LISTENER_DETECTOR_NAME]
    );
}

#[test]
fn test_replaced_ordering_policy_sorts_interceptors() {
    let log: Log = Arc::default();
    let descriptors = || {
        vec![
            probe("low", CapabilitySet::CONSTRUCTION_INTERCEPTOR | CapabilitySet::ORDERED)
                .with_order(1),
            probe("high", CapabilitySet::CONSTRUCTION_INTERCEPTOR | CapabilitySet::ORDERED)
                .with_order(2),
        ]
    };

    let mut factory = probe_factory(&log, descriptors());
    let report = run_bootstrap(&mut factory, &[]).unwrap();
    assert_eq!(
        report.interceptors,
        vec!["low", "high", CHECKER_NAME, LISTENER_DETECTOR_NAME]
    );

    let mut factory = probe_factory(&log, descriptors());
    let supplied: Vec<Arc<dyn Component>> = vec![Arc::new(Customizer {
        log: log.clone(),
        early_interceptor: false,
        policy: Some(Arc::new(Reversed)),
    })];
    let report = run_bootstrap(&mut factory, &supplied).unwrap();
    assert_eq!(
        report.interceptors,
        vec!["high", "low", CHECKER_NAME, LISTENER_DETECTOR_NAME]
    );
}

#[test]
fn test_resolution_failure_names_pass() {
    let log: Log = Arc::default();
    let mut factory = probe_factory(&log, vec![]);
    factory
        .registry_mut()
        .register(
            ComponentDescriptor::new("orphan", "missing.Type")
                .with_capability(bootwire_protocols::Capability::FactoryMutator),
        )
        .unwrap();

    let err = run_bootstrap(&mut factory, &[]).err().unwrap();

    assert!(matches!(
        err,
        ContainerError::Resolution { ref reason, .. } if reason.starts_with("factory-mutation:")
    ));
}
