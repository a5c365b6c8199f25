//! Validate subcommand handler.

use tracing::warn;

use bootwire_config::{Config, ConfigValidator, ValidationError};

use crate::demo;

/// Validate the loaded configuration and the component kinds it names.
pub(crate) fn handle_validate(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut result = ConfigValidator::validate(config);

    for (i, component) in config.components.iter().enumerate() {
        if !component.kind.is_empty() && demo::kind_capabilities(&component.kind).is_none() {
            result.add_error(ValidationError::new(
                format!("components[{}].kind", i),
                format!(
                    "Unknown kind '{}'. Known kinds: {}",
                    component.kind,
                    demo::KINDS.join(", ")
                ),
            ));
        }
    }

    for warning in &result.warnings {
        warn!(path = %warning.path, "{}", warning.message);
        println!("warning: {}: {}", warning.path, warning.message);
    }
    for error in &result.errors {
        println!("error: {}: {}", error.path, error.message);
    }

    let error_count = result.errors.len();
    match result.into_result() {
        Ok(warnings) => {
            println!(
                "Configuration is valid ({} components, {} warnings)",
                config.components.len(),
                warnings.len()
            );
            Ok(())
        }
        Err(first) => Err(format!("configuration has {} errors; first: {}", error_count, first).into()),
    }
}
