//! Diagnostic interceptor that reports components built before the
//! interceptor chain is complete.

use std::any::Any;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::warn;

use bootwire_protocols::{Component, ConstructionInterceptor, ContainerError, InterceptContext};

/// Flags ordinary components that finished construction while fewer than
/// `target` interceptors were installed. Such components missed part of the
/// chain, usually because an interceptor depended on them.
#[derive(Debug)]
pub struct InterceptorChecker {
    target: usize,
    report_ineligible: bool,
    ineligible: Mutex<Vec<String>>,
}

impl InterceptorChecker {
    /// Create a checker expecting `target` interceptors.
    pub fn new(target: usize, report_ineligible: bool) -> Self {
        Self {
            target,
            report_ineligible,
            ineligible: Mutex::new(Vec::new()),
        }
    }

    pub fn target(&self) -> usize {
        self.target
    }

    /// Names flagged so far, in the order they were built.
    pub fn ineligible(&self) -> Vec<String> {
        self.ineligible.lock().clone()
    }

    fn flag(&self, ctx: &InterceptContext<'_>) {
        let mut ineligible = self.ineligible.lock();
        if ineligible.iter().any(|name| name == ctx.name) {
            return;
        }
        ineligible.push(ctx.name.to_string());
        drop(ineligible);

        if self.report_ineligible {
            warn!(
                component = %ctx.name,
                type_name = %ctx.descriptor.type_name,
                installed = ctx.installed_interceptors,
                target = self.target,
                "Component is not eligible for processing by all interceptors (built while the interceptor chain was incomplete)"
            );
        }
    }
}

impl Component for InterceptorChecker {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_interceptor(&self) -> Option<&dyn ConstructionInterceptor> {
        Some(self)
    }
}

impl ConstructionInterceptor for InterceptorChecker {
    fn after_initialization(
        &self,
        instance: Arc<dyn Component>,
        ctx: &InterceptContext<'_>,
    ) -> Result<Arc<dyn Component>, ContainerError> {
        if instance.as_interceptor().is_none()
            && !ctx.descriptor.is_infrastructure()
            && ctx.installed_interceptors < self.target
        {
            self.flag(ctx);
        }
        Ok(instance)
    }
}
