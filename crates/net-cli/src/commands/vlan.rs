//! VLAN configuration display

use std::sync::Arc;

use anyhow::{anyhow, Result};
use netif_core::address::sort_lex_numeric;
use netif_core::VlanInfo;
use serde::Serialize;

use crate::commands::status::describe_vlan;
use crate::commands::{to_json, OutputFormat};
use crate::context::AppContext;

#[derive(Serialize)]
struct VlanEntry<'a> {
    name: &'a str,
    vlan: &'a VlanInfo,
}

/// VLAN command implementation
pub struct VlanCommand {
    context: Arc<AppContext>,
}

impl VlanCommand {
    pub fn new(context: Arc<AppContext>) -> Self {
        Self { context }
    }

    /// Kernel VLAN table, or the VLAN information of `iface`
    pub fn execute(&self, iface: Option<&str>, format: OutputFormat) -> Result<String> {
        match iface {
            Some(name) => self.show_interface(name, format),
            None => self.show_table(format),
        }
    }

    fn show_table(&self, format: OutputFormat) -> Result<String> {
        let devices = self.context.devices();
        let table = devices.read_vlan_config().ok_or_else(|| {
            anyhow!(
                "VLAN support not available: cannot read {}",
                devices.paths().proc_net_vlan.join("config").display()
            )
        })?;

        if format == OutputFormat::Json {
            return to_json(&table);
        }

        let mut names: Vec<&String> = table.keys().collect();
        sort_lex_numeric(&mut names);

        let mut lines = vec![format!("{:<16} {:<8} {}", "Interface", "VLAN ID", "Raw device")];
        for name in names {
            let config = &table[name];
            lines.push(format!(
                "{:<16} {:<8} {}",
                name, config.vlan_id, config.raw_device
            ));
        }
        Ok(lines.join("\n"))
    }

    fn show_interface(&self, name: &str, format: OutputFormat) -> Result<String> {
        let info = self
            .context
            .devices()
            .vlan_info(name)
            .ok_or_else(|| anyhow!("{} is not a VLAN interface", name))?;

        match format {
            OutputFormat::Text => Ok(format!("{}: {}", name, describe_vlan(&info))),
            OutputFormat::Json => to_json(&VlanEntry { name, vlan: &info }),
        }
    }
}
