//! Event listener detection and dispatch.

use std::any::Any;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, error};

use bootwire_protocols::{
    Component, ConstructionInterceptor, ContainerError, ContainerEvent, InterceptContext,
};

use crate::factory::NamedComponent;

/// Shared list of detected event listeners.
#[derive(Clone, Default)]
pub struct ListenerRegistry {
    listeners: Arc<Mutex<Vec<NamedComponent>>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a listener. A name already present is ignored.
    pub fn add(&self, name: &str, component: Arc<dyn Component>) -> bool {
        let mut listeners = self.listeners.lock();
        if listeners.iter().any(|entry| entry.name == name) {
            return false;
        }
        debug!(listener = %name, "Registered event listener");
        listeners.push(NamedComponent::new(name, component));
        true
    }

    pub fn names(&self) -> Vec<String> {
        self.listeners.lock().iter().map(|e| e.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.listeners.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.lock().is_empty()
    }

    /// Deliver `event` to every listener in detection order. Stops at the
    /// first failing listener.
    pub fn publish(&self, event: &ContainerEvent) -> Result<usize, ContainerError> {
        let snapshot = self.listeners.lock().clone();
        let mut delivered = 0;
        for entry in &snapshot {
            let Some(listener) = entry.component.as_event_listener() else {
                continue;
            };
            listener.on_event(event).inspect_err(|e| {
                error!(listener = %entry.name, event = ?event, "Event listener failed: {}", e);
            })?;
            delivered += 1;
        }
        Ok(delivered)
    }
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.names())
            .finish()
    }
}

/// Interceptor that records every built component exposing an event
/// listener.
#[derive(Debug, Clone, Default)]
pub struct ListenerDetector {
    registry: ListenerRegistry,
}

impl ListenerDetector {
    pub fn new(registry: ListenerRegistry) -> Self {
        Self { registry }
    }
}

impl Component for ListenerDetector {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_interceptor(&self) -> Option<&dyn ConstructionInterceptor> {
        Some(self)
    }
}

impl ConstructionInterceptor for ListenerDetector {
    fn after_initialization(
        &self,
        instance: Arc<dyn Component>,
        ctx: &InterceptContext<'_>,
    ) -> Result<Arc<dyn Component>, ContainerError> {
        if instance.as_event_listener().is_some() {
            self.registry.add(ctx.name, instance.clone());
        }
        Ok(instance)
    }
}
