//! Routing table commands

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use netif_apply::{CommandOutput, RouteTable, SystemCommandRunner};

use crate::commands::{to_json, OutputFormat};
use crate::context::AppContext;

/// Arguments of a gateway route change
#[derive(Debug, Clone)]
pub struct RouteSpec {
    pub address: String,
    /// Prefix length or dotted netmask, passed through to `ip`
    pub netmask: String,
    pub gateway: String,
    pub iface: String,
}

/// Route command implementation
pub struct RouteCommand {
    routes: RouteTable<SystemCommandRunner>,
}

impl RouteCommand {
    pub fn new(context: Arc<AppContext>) -> Self {
        Self {
            routes: RouteTable::new(
                SystemCommandRunner::new(),
                context.config().commands.ip.clone(),
            ),
        }
    }

    pub fn list(&self, format: OutputFormat) -> Result<String> {
        let routes = self
            .routes
            .route_list()
            .context("Failed to list routes")?;

        match format {
            OutputFormat::Json => to_json(&routes),
            OutputFormat::Text => Ok(routes
                .iter()
                .map(|route| {
                    format!(
                        "{}/{} via {}",
                        route.destination, route.prefix_length, route.gateway
                    )
                })
                .collect::<Vec<_>>()
                .join("\n")),
        }
    }

    pub fn add(&self, spec: &RouteSpec) -> Result<String> {
        let output = self
            .routes
            .route_set(&spec.address, &spec.netmask, &spec.gateway, &spec.iface)
            .context("Failed to add route")?;
        checked("route add", output)
    }

    pub fn del(&self, spec: &RouteSpec) -> Result<String> {
        let output = self
            .routes
            .route_unset(&spec.address, &spec.netmask, &spec.gateway, &spec.iface)
            .context("Failed to delete route")?;
        checked("route del", output)
    }

    pub fn flush(&self) -> Result<String> {
        let output = self
            .routes
            .route_flush()
            .context("Failed to flush routes")?;
        checked("route flush", output)
    }

    pub fn flush_cache(&self) -> Result<String> {
        let output = self
            .routes
            .route_flush_cache()
            .context("Failed to flush route cache")?;
        checked("route flush cache", output)
    }
}

/// Turn a non-zero exit of `ip` into an error carrying its output
fn checked(action: &str, output: CommandOutput) -> Result<String> {
    if !output.success() {
        bail!(
            "ip {} failed (exit code {}): {}",
            action,
            output.exit_code,
            output.output.trim()
        );
    }
    Ok(output.output.trim_end().to_string())
}
