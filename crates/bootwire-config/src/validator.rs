//! Configuration validation.

use std::collections::HashSet;

use crate::error::ConfigError;
use crate::schema::{Config, LOG_FORMATS, LOG_LEVELS, ROLES, TIERS};

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Convert into the first error, if any.
    pub fn into_result(self) -> Result<Vec<ValidationWarning>, ConfigError> {
        match self.errors.into_iter().next() {
            Some(error) => Err(ConfigError::InvalidValue {
                field: error.path,
                message: error.message,
            }),
            None => Ok(self.warnings),
        }
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> ValidationResult {
        let mut result = ValidationResult::default();

        Self::validate_logging(config, &mut result);
        Self::validate_components(config, &mut result);

        result
    }

    fn validate_logging(config: &Config, result: &mut ValidationResult) {
        let level = config.logging.level.as_str();
        // Full filter directives such as `bootwire_core=debug` are passed through.
        if !level.contains('=') && !LOG_LEVELS.contains(&level) {
            result.add_error(ValidationError::new(
                "logging.level",
                format!("Unknown log level '{}', valid values: {:?}", level, LOG_LEVELS),
            ));
        }

        if !LOG_FORMATS.contains(&config.logging.format.as_str()) {
            result.add_error(ValidationError::new(
                "logging.format",
                format!(
                    "Unknown log format '{}', valid values: {:?}",
                    config.logging.format, LOG_FORMATS
                ),
            ));
        }

        if let Some(ref directory) = config.logging.directory {
            if !directory.exists() {
                result.add_warning(ValidationWarning::new(
                    "logging.directory",
                    format!("Log directory does not exist and will be created: {:?}", directory),
                ));
            }
        }
    }

    fn validate_components(config: &Config, result: &mut ValidationResult) {
        let declared: HashSet<&str> = config.components.iter().map(|c| c.name.as_str()).collect();
        let mut seen = HashSet::new();

        for (index, component) in config.components.iter().enumerate() {
            let path = format!("components[{}]", index);

            if component.name.trim().is_empty() {
                result.add_error(ValidationError::new(
                    format!("{}.name", path),
                    "Component name cannot be empty",
                ));
            } else if !seen.insert(component.name.as_str()) {
                result.add_error(ValidationError::new(
                    format!("{}.name", path),
                    format!("Duplicate component name '{}'", component.name),
                ));
            }

            if component.kind.trim().is_empty() {
                result.add_error(ValidationError::new(
                    format!("{}.kind", path),
                    "Component kind cannot be empty",
                ));
            }

            if !TIERS.contains(&component.tier.as_str()) {
                result.add_error(ValidationError::new(
                    format!("{}.tier", path),
                    format!("Unknown tier '{}', valid values: {:?}", component.tier, TIERS),
                ));
            } else if component.tier == "default" && component.order.is_some() {
                result.add_warning(ValidationWarning::new(
                    format!("{}.order", path),
                    "order only affects mutators in the default tier; interceptors keep declaration order",
                ));
            }

            if !ROLES.contains(&component.role.as_str()) {
                result.add_error(ValidationError::new(
                    format!("{}.role", path),
                    format!("Unknown role '{}', valid values: {:?}", component.role, ROLES),
                ));
            }

            for dependency in &component.depends_on {
                if *dependency == component.name {
                    result.add_error(ValidationError::new(
                        format!("{}.depends_on", path),
                        format!("Component '{}' depends on itself", component.name),
                    ));
                } else if !declared.contains(dependency.as_str()) {
                    // Registry mutators may still register it at refresh time.
                    result.add_warning(ValidationWarning::new(
                        format!("{}.depends_on", path),
                        format!("'{}' is not declared in this file", dependency),
                    ));
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
