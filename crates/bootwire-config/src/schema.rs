//! Configuration schema definitions.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub container: ContainerConfig,

    /// Components registered before the container refreshes.
    #[serde(default)]
    pub components: Vec<ComponentConfig>,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset.
    #[serde(default = "default_level")]
    pub level: String,

    /// Output format: `pretty`, `compact`, or `json`.
    #[serde(default = "default_format")]
    pub format: String,

    /// Write daily-rotated log files here in addition to stderr.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: default_format(),
            directory: None,
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

fn default_format() -> String {
    "pretty".to_string()
}

/// Container behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerConfig {
    #[serde(default = "default_true")]
    pub allow_definition_overriding: bool,

    #[serde(default = "default_true")]
    pub eager_init: bool,

    /// Warn about components built before the interceptor chain was complete.
    #[serde(default = "default_true")]
    pub report_ineligible: bool,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            allow_definition_overriding: true,
            eager_init: true,
            report_ineligible: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// A component declared in the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentConfig {
    pub name: String,

    /// Registered component type that builds this component.
    pub kind: String,

    /// Scheduling tier: `highest_priority`, `priority`, or `default`.
    #[serde(default = "default_tier")]
    pub tier: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,

    /// `ordinary` or `infrastructure`.
    #[serde(default = "default_role")]
    pub role: String,

    #[serde(default)]
    pub depends_on: Vec<String>,

    #[serde(default)]
    pub lazy: bool,

    #[serde(default)]
    pub properties: serde_json::Map<String, serde_json::Value>,
}

impl ComponentConfig {
    /// Create a default-tier ordinary component of `kind`.
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            tier: default_tier(),
            order: None,
            role: default_role(),
            depends_on: Vec::new(),
            lazy: false,
            properties: serde_json::Map::new(),
        }
    }
}

fn default_tier() -> String {
    "default".to_string()
}

fn default_role() -> String {
    "ordinary".to_string()
}

/// Accepted values for [`LoggingConfig::level`].
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Accepted values for [`LoggingConfig::format`].
pub const LOG_FORMATS: [&str; 3] = ["pretty", "compact", "json"];

/// Accepted values for [`ComponentConfig::tier`].
pub const TIERS: [&str; 3] = ["highest_priority", "priority", "default"];

/// Accepted values for [`ComponentConfig::role`].
pub const ROLES: [&str; 2] = ["ordinary", "infrastructure"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "pretty");
        assert!(config.logging.directory.is_none());
        assert!(config.container.eager_init);
        assert!(config.components.is_empty());
    }

    #[test]
    fn test_component_defaults_from_toml() {
        let component: ComponentConfig = toml::from_str(
            r#"
            name = "greeter"
            kind = "greeter"
        "#,
        )
        .unwrap();
        assert_eq!(component.tier, "default");
        assert_eq!(component.role, "ordinary");
        assert!(component.order.is_none());
        assert!(!component.lazy);
        assert!(component.properties.is_empty());
    }

    #[test]
    fn test_component_properties_from_toml() {
        let component: ComponentConfig = toml::from_str(
            r#"
            name = "greeter"
            kind = "greeter"

            [properties]
            greeting = "hello"
            repeat = 2
        "#,
        )
        .unwrap();
        assert_eq!(component.properties["greeting"], "hello");
        assert_eq!(component.properties["repeat"], 2);
    }

    #[test]
    fn test_container_partial_override() {
        let container: ContainerConfig = toml::from_str("eager_init = false").unwrap();
        assert!(!container.eager_init);
        assert!(container.allow_definition_overriding);
        assert!(container.report_ineligible);
    }

    #[test]
    fn test_component_config_new() {
        let component = ComponentConfig::new("a", "greeter");
        assert_eq!(component.name, "a");
        assert_eq!(component.kind, "greeter");
        assert_eq!(component.tier, "default");
    }
}
