//! Kernel routing table through `ip route`
//!
//! These wrappers return the exit code and output of the routing command
//! without judging them; checking `exit_code` is up to the caller.

use std::path::PathBuf;
use std::sync::OnceLock;

use log::{info, warn};
use regex::Regex;
use serde::{Deserialize, Serialize};

use netif_core::error::SystemError;
use netif_core::Result;

use crate::command::{CommandOutput, CommandRunner, Invocation};

/// Prefix length of a route listed without `/<prefix>`
pub const DEFAULT_PREFIX_LENGTH: u32 = 32;

/// One gateway route of the kernel routing table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteEntry {
    pub destination: String,
    pub prefix_length: u32,
    pub gateway: String,
}

fn route_line_regex() -> &'static Regex {
    static ROUTE_LINE: OnceLock<Regex> = OnceLock::new();
    ROUTE_LINE.get_or_init(|| {
        Regex::new(r"^([0-9.:]+)(?:/([0-9]+))? via ([0-9.:]+)").expect("valid route regex")
    })
}

/// Parse `ip route list` output; only `<dest>[/<prefix>] via <gw> ...` lines are kept
pub fn parse_route_list(output: &str) -> Vec<RouteEntry> {
    output
        .lines()
        .filter_map(|line| {
            let caps = route_line_regex().captures(line)?;
            let prefix_length = match caps.get(2) {
                Some(prefix) => prefix.as_str().parse().ok()?,
                None => DEFAULT_PREFIX_LENGTH,
            };
            Some(RouteEntry {
                destination: caps[1].to_string(),
                prefix_length,
                gateway: caps[3].to_string(),
            })
        })
        .collect()
}

/// Routing table operations over the `ip` binary
pub struct RouteTable<R: CommandRunner> {
    runner: R,
    ip: PathBuf,
}

impl<R: CommandRunner> RouteTable<R> {
    pub fn new(runner: R, ip: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            ip: ip.into(),
        }
    }

    /// `ip route add <address>/<netmask> via <gateway> dev <iface>`
    pub fn route_set(
        &self,
        address: &str,
        netmask: &str,
        gateway: &str,
        iface: &str,
    ) -> Result<CommandOutput> {
        info!(
            "Adding route {}/{} via {} dev {}",
            address, netmask, gateway, iface
        );
        self.run(route_args("add", address, netmask, gateway, iface))
    }

    /// `ip route del <address>/<netmask> via <gateway> dev <iface>`
    pub fn route_unset(
        &self,
        address: &str,
        netmask: &str,
        gateway: &str,
        iface: &str,
    ) -> Result<CommandOutput> {
        info!(
            "Deleting route {}/{} via {} dev {}",
            address, netmask, gateway, iface
        );
        self.run(route_args("del", address, netmask, gateway, iface))
    }

    pub fn route_flush(&self) -> Result<CommandOutput> {
        info!("Flushing routing table");
        self.run(vec!["route".to_string(), "flush".to_string()])
    }

    pub fn route_flush_cache(&self) -> Result<CommandOutput> {
        info!("Flushing routing cache");
        self.run(vec![
            "route".to_string(),
            "flush".to_string(),
            "cache".to_string(),
        ])
    }

    /// Gateway routes of the main table
    pub fn route_list(&self) -> Result<Vec<RouteEntry>> {
        let output = self.run(vec!["route".to_string(), "list".to_string()])?;
        Ok(parse_route_list(&output.output))
    }

    fn run(&self, args: Vec<String>) -> Result<CommandOutput> {
        let invocation = Invocation::new(&self.ip).args(args);

        let output = self
            .runner
            .capture(&invocation)
            .map_err(|source| SystemError::CommandSpawn {
                command: invocation.to_string(),
                source,
            })?;

        if !output.success() {
            warn!(
                "{} exited with code {}: {}",
                invocation,
                output.exit_code,
                output.output.trim()
            );
        }

        Ok(output)
    }
}

fn route_args(
    action: &str,
    address: &str,
    netmask: &str,
    gateway: &str,
    iface: &str,
) -> Vec<String> {
    vec![
        "route".to_string(),
        action.to_string(),
        format!("{}/{}", address, netmask),
        "via".to_string(),
        gateway.to_string(),
        "dev".to_string(),
        iface.to_string(),
    ]
}
