//! Interface listing and status

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use log::debug;
use netif_core::address::sort_lex_numeric;
use netif_core::interface::{is_alias_name, is_ethernet_physical, is_physical};
use netif_core::{NetDevices, VlanInfo};
use serde::Serialize;

use crate::commands::{to_json, OutputFormat};
use crate::context::AppContext;

/// Restrictions applied by `list`; all of them must hold
#[derive(Debug, Clone, Copy, Default)]
pub struct InterfaceFilter {
    pub physical: bool,
    pub vlan: bool,
    pub ethernet: bool,
}

impl InterfaceFilter {
    fn accepts(&self, devices: &NetDevices, name: &str) -> bool {
        (!self.physical || is_physical(name))
            && (!self.ethernet || is_ethernet_physical(name))
            && (!self.vlan || devices.vlan_info(name).is_some())
    }
}

/// What the kernel reports about one interface
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterfaceStatus {
    pub name: String,
    pub physical: bool,
    pub hardware_device: bool,
    pub alias: bool,
    pub flags: Option<u32>,
    pub hw_address: Option<String>,
    pub hw_type: Option<u32>,
    pub mtu: Option<u32>,
    pub carrier: bool,
    pub vlan: Option<VlanInfo>,
}

/// Status command implementation
pub struct StatusCommand {
    context: Arc<AppContext>,
}

impl StatusCommand {
    pub fn new(context: Arc<AppContext>) -> Self {
        Self { context }
    }

    /// Registered interfaces in natural order
    pub fn list(&self, filter: InterfaceFilter, format: OutputFormat) -> Result<String> {
        let devices = self.context.devices();
        let mut names = devices
            .list_filtered(|name| filter.accepts(&devices, name))
            .context("Failed to list network interfaces")?;
        sort_lex_numeric(&mut names);

        match format {
            OutputFormat::Text => Ok(names.join("\n")),
            OutputFormat::Json => to_json(&names),
        }
    }

    /// Collect the status of a registered interface
    pub fn status(&self, name: &str) -> Result<InterfaceStatus> {
        let devices = self.context.devices();
        if !devices.is_registered(name) {
            bail!("Interface not found: {}", name);
        }

        Ok(InterfaceStatus {
            name: name.to_string(),
            physical: is_physical(name),
            hardware_device: devices.has_device_directory(name),
            alias: is_alias_name(name),
            flags: optional_attribute(name, "flags", devices.flags(name)),
            hw_address: optional_attribute(name, "address", devices.hw_address(name)),
            hw_type: optional_attribute(name, "type", devices.hw_type(name)),
            mtu: optional_attribute(name, "mtu", devices.mtu(name)),
            carrier: devices.is_carrier_present(name),
            vlan: devices.vlan_info(name),
        })
    }

    pub fn show(&self, name: &str, format: OutputFormat) -> Result<String> {
        let status = self.status(name)?;
        match format {
            OutputFormat::Text => Ok(render_status(&status)),
            OutputFormat::Json => to_json(&status),
        }
    }
}

// Unreadable attributes are shown as unknown rather than failing the command
fn optional_attribute<T>(name: &str, attribute: &str, value: netif_core::Result<T>) -> Option<T> {
    match value {
        Ok(value) => Some(value),
        Err(e) => {
            debug!("No {} for {}: {}", attribute, name, e);
            None
        }
    }
}

fn render_status(status: &InterfaceStatus) -> String {
    fn or_unknown<T: ToString>(value: &Option<T>) -> String {
        value
            .as_ref()
            .map_or_else(|| "unknown".to_string(), ToString::to_string)
    }

    let kind = match (&status.vlan, status.physical) {
        (Some(_), _) => "vlan",
        (None, true) if status.hardware_device => "physical (hardware)",
        (None, true) => "physical",
        (None, false) => "virtual",
    };

    let mut lines = vec![
        format!("Interface:  {}", status.name),
        format!("Type:       {}", kind),
        format!(
            "Flags:      {}",
            status
                .flags
                .map_or_else(|| "unknown".to_string(), |flags| format!("0x{:x}", flags))
        ),
        format!("HW address: {}", or_unknown(&status.hw_address)),
        format!("HW type:    {}", or_unknown(&status.hw_type)),
        format!("MTU:        {}", or_unknown(&status.mtu)),
        format!("Carrier:    {}", if status.carrier { "yes" } else { "no" }),
    ];

    if let Some(vlan) = &status.vlan {
        lines.push(format!("VLAN:       {}", describe_vlan(vlan)));
    }

    lines.join("\n")
}

/// `id 10 on eth0 (kernel)`, with `?` for parts the name did not reveal
pub(crate) fn describe_vlan(vlan: &VlanInfo) -> String {
    let source = match vlan {
        VlanInfo::Kernel(_) => "kernel",
        VlanInfo::Inferred(_) => "name",
    };
    format!(
        "id {} on {} ({})",
        vlan.vlan_id()
            .map_or_else(|| "?".to_string(), |id| id.to_string()),
        vlan.raw_device().unwrap_or("?"),
        source
    )
}
