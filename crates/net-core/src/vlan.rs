//! VLAN discovery
//!
//! The kernel's `/proc/net/vlan/config` is authoritative: it reflects the
//! actual tagging even when an interface was renamed after creation. The
//! interface name is only used as a fallback source of VLAN information.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::interface::{is_vlan_name, NetDevices};
use crate::sysfs::FileSystem;
use crate::Result;

/// Global VLAN configuration file, relative to the VLAN proc directory
const VLAN_CONFIG: &str = "config";

/// VLAN configuration as reported by the kernel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VlanConfig {
    /// 802.1Q tag
    pub vlan_id: u32,
    /// Underlying interface carrying the tagged frames
    pub raw_device: String,
}

/// VLAN information inferred from an interface name alone
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VlanNameInfo {
    pub vlan_id: Option<u32>,
    pub raw_device: Option<String>,
}

impl VlanNameInfo {
    /// True if the name matched no known VLAN naming scheme
    pub fn is_empty(&self) -> bool {
        self.vlan_id.is_none() && self.raw_device.is_none()
    }
}

/// VLAN information, tagged with the source that answered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum VlanInfo {
    /// Entry of `/proc/net/vlan/config`
    Kernel(VlanConfig),
    /// Derived from the interface name
    Inferred(VlanNameInfo),
}

impl VlanInfo {
    pub fn vlan_id(&self) -> Option<u32> {
        match self {
            VlanInfo::Kernel(config) => Some(config.vlan_id),
            VlanInfo::Inferred(info) => info.vlan_id,
        }
    }

    pub fn raw_device(&self) -> Option<&str> {
        match self {
            VlanInfo::Kernel(config) => Some(&config.raw_device),
            VlanInfo::Inferred(info) => info.raw_device.as_deref(),
        }
    }
}

/// Line grammar of `/proc/net/vlan/config`: `name | vlan-id | raw-device`
fn config_line_regex() -> &'static Regex {
    static CONFIG_LINE: OnceLock<Regex> = OnceLock::new();
    CONFIG_LINE.get_or_init(|| {
        Regex::new(r"^\s*(\S+)\s*\|\s*([0-9]+)\s*\|\s*(\S+)\s*$").expect("valid VLAN config regex")
    })
}

/// Named VLAN naming schemes, tried in order
fn name_patterns() -> &'static [(&'static str, Regex)] {
    static NAME_PATTERNS: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();
    NAME_PATTERNS.get_or_init(|| {
        [
            ("vlan", r"^vlan(?P<id>[0-9]+)$"),
            ("raw_plus_vid", r"^(?P<raw>\w+)\.(?P<id>[0-9]+)$"),
            ("dotted", r"^[^.]*\.(?P<id>[0-9]+)$"),
        ]
        .into_iter()
        .map(|(scheme, pattern)| (scheme, Regex::new(pattern).expect("valid VLAN name regex")))
        .collect()
    })
}

/// Parse the content of `/proc/net/vlan/config`; headers and malformed lines are skipped
pub fn parse_vlan_config(content: &str) -> BTreeMap<String, VlanConfig> {
    content
        .lines()
        .filter_map(|line| {
            let caps = config_line_regex().captures(line)?;
            let vlan_id = caps[2].parse().ok()?;
            Some((
                caps[1].to_string(),
                VlanConfig {
                    vlan_id,
                    raw_device: caps[3].to_string(),
                },
            ))
        })
        .collect()
}

/// Infer VLAN information from the interface name
///
/// `vlan<N>` yields only the id, `<base>.<N>` with a word-character base
/// also yields the raw device, and any other `<x>.<N>` not starting with
/// `vlan` yields only the id. Unrecognized names give an empty record.
pub fn vlan_info_from_name(name: &str) -> VlanNameInfo {
    for (scheme, pattern) in name_patterns() {
        if *scheme == "dotted" && name.starts_with("vlan") {
            continue;
        }
        let Some(caps) = pattern.captures(name) else {
            continue;
        };
        let Ok(vlan_id) = caps["id"].parse() else {
            return VlanNameInfo::default();
        };
        return VlanNameInfo {
            vlan_id: Some(vlan_id),
            raw_device: caps.name("raw").map(|raw| raw.as_str().to_string()),
        };
    }

    VlanNameInfo::default()
}

impl<F: FileSystem> NetDevices<F> {
    /// True if the VLAN driver knows `name` and the interface is registered
    pub fn is_kernel_vlan(&self, name: &str) -> bool {
        self.fs.is_file(&self.paths.proc_net_vlan.join(name)) && self.is_registered(name)
    }

    /// VLAN interfaces as seen by the kernel; empty without VLAN support
    pub fn list_vlan_interfaces(&self) -> Result<Vec<String>> {
        if !self.fs.is_dir(&self.paths.proc_net_vlan) {
            log::debug!(
                "{} not found, no VLAN support",
                self.paths.proc_net_vlan.display()
            );
            return Ok(Vec::new());
        }

        let entries = self.fs.list_dir(&self.paths.proc_net_vlan)?;
        Ok(entries
            .into_iter()
            .filter(|name| self.is_kernel_vlan(name))
            .collect())
    }

    /// Global VLAN configuration, or `None` if the kernel does not expose it
    pub fn read_vlan_config(&self) -> Option<BTreeMap<String, VlanConfig>> {
        let path = self.paths.proc_net_vlan.join(VLAN_CONFIG);
        match self.fs.read_to_string(&path) {
            Ok(content) => Some(parse_vlan_config(&content)),
            Err(e) => {
                log::debug!("Cannot read {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Kernel VLAN configuration of a single interface
    pub fn vlan_config_for(&self, name: &str) -> Option<VlanConfig> {
        self.read_vlan_config()?.remove(name)
    }

    /// VLAN information for `name`, or `None` if it is not a live VLAN interface
    ///
    /// The kernel configuration wins over what the name suggests.
    pub fn vlan_info(&self, name: &str) -> Option<VlanInfo> {
        if !is_vlan_name(name) || !self.is_kernel_vlan(name) {
            return None;
        }

        match self.vlan_config_for(name) {
            Some(config) => Some(VlanInfo::Kernel(config)),
            None => Some(VlanInfo::Inferred(vlan_info_from_name(name))),
        }
    }
}
