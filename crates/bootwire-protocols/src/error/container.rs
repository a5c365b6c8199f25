//! Container errors.

use thiserror::Error;

use super::{BootstrapPhase, CallbackStage};

#[derive(Debug, Error)]
pub enum ContainerError {
    /// A named component is missing or does not satisfy the requested
    /// capability. Dependency cycles also surface here.
    #[error("Cannot resolve component '{name}': {reason}")]
    Resolution { name: String, reason: String },

    #[error("No component descriptor named '{0}'")]
    NotFound(String),

    #[error("Component descriptor already registered: {0}")]
    AlreadyRegistered(String),

    /// A processor or lifecycle callback reported a failure.
    #[error("Callback {stage} failed for '{name}': {message}")]
    Callback {
        name: String,
        stage: CallbackStage,
        message: String,
    },

    #[error("Illegal container state: {0}")]
    IllegalState(String),

    #[error("{0}")]
    Custom(String),
}

impl ContainerError {
    pub fn resolution(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Resolution {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Build a callback failure; processors use this to abort the bootstrap.
    pub fn callback(
        name: impl Into<String>,
        stage: CallbackStage,
        message: impl Into<String>,
    ) -> Self {
        Self::Callback {
            name: name.into(),
            stage,
            message: message.into(),
        }
    }

    /// Prefix a resolution failure's reason with the bootstrap pass it
    /// happened in. Every other variant is returned unchanged.
    pub fn in_phase(self, phase: BootstrapPhase) -> Self {
        match self {
            Self::Resolution { name, reason } => Self::Resolution {
                name,
                reason: format!("{phase}: {reason}"),
            },
            other => other,
        }
    }

    /// Name of the component the error is about, when there is one.
    pub fn component(&self) -> Option<&str> {
        match self {
            Self::Resolution { name, .. }
            | Self::NotFound(name)
            | Self::AlreadyRegistered(name)
            | Self::Callback { name, .. } => Some(name),
            Self::IllegalState(_) | Self::Custom(_) => None,
        }
    }
}
