//! Container subcommand handlers.

use serde_json::json;
use tracing::{info, warn};

use bootwire_config::{Config, ConfigError, ConfigValidator};
use bootwire_core::Container;
use bootwire_protocols::ComponentDescriptor;

use crate::demo::{self, LifecycleBean};

/// Refresh, print the bootstrap outcome, then close.
pub(crate) fn handle_run(
    config: &Config,
    include_demo: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    check_config(config)?;
    let mut container = demo::assemble(config, include_demo, true)?;
    info!(
        components = container.factory().registry().len(),
        "Refreshing container"
    );

    let report = container.refresh()?;
    let chain = report.interceptors.join(" -> ");
    let ineligible = report.checker.ineligible();
    let listeners = report.listeners.names();

    println!();
    println!("Interceptor chain: {}", chain);
    println!("Event listeners:   {}", listeners.join(", "));
    if !ineligible.is_empty() {
        println!("Built before the chain was complete: {}", ineligible.join(", "));
    }

    if include_demo {
        let bean = container.get("testBean")?;
        if let Some(bean) = bean.as_any().downcast_ref::<LifecycleBean>() {
            println!("testBean says: {}", bean.message().unwrap_or("nothing"));
        }
    }
    println!();

    container.close()?;
    Ok(())
}

/// Print the registry as it stands after bootstrap, without eager creation.
pub(crate) fn handle_describe(
    config: &Config,
    include_demo: bool,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    check_config(config)?;
    let mut container = demo::assemble(config, include_demo, false)?;
    container.refresh()?;

    let descriptors: Vec<ComponentDescriptor> =
        container.factory().registry().iter().cloned().collect();
    let report = container
        .report()
        .ok_or("container refreshed without a bootstrap report")?;

    match format {
        "json" => {
            let out = json!({
                "components": descriptors,
                "registry_mutated": report.registry_mutated,
                "factory_mutated": report.factory_mutated,
                "interceptors": report.interceptors,
                "listeners": report.listeners.names(),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        _ => print_text(&descriptors, &container),
    }

    container.close()?;
    Ok(())
}

/// Refuse to build from an invalid config; log its warnings.
fn check_config(config: &Config) -> Result<(), ConfigError> {
    for warning in ConfigValidator::validate(config).into_result()? {
        warn!(path = %warning.path, "{}", warning.message);
    }
    Ok(())
}

fn print_text(descriptors: &[ComponentDescriptor], container: &Container) {
    println!("Components ({}):", descriptors.len());
    for descriptor in descriptors {
        let caps: Vec<&str> = descriptor
            .capabilities
            .capabilities()
            .into_iter()
            .map(|cap| cap.as_str())
            .collect();
        let order = descriptor
            .order
            .map(|o| o.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:<20} {:<22} {:<16} order={:<6} [{}]",
            descriptor.name,
            descriptor.type_name,
            descriptor.tier(),
            order,
            caps.join(", ")
        );
    }

    if let Some(report) = container.report() {
        println!();
        println!("Registry mutators: {}", report.registry_mutated.join(", "));
        println!("Factory mutators:  {}", report.factory_mutated.join(", "));
        println!("Interceptors:");
        for (i, name) in report.interceptors.iter().enumerate() {
            println!("  {}. {}", i + 1, name);
        }
    }
}
