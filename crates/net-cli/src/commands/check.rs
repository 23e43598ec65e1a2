//! Address and name validation helpers

use anyhow::{bail, Context, Result};
use netif_core::address::{
    format_ipv4, is_plausible_netmask, is_plausible_search_domain, normalize_ipv4,
    normalize_mac_address, parse_ipv4,
};
use serde::Serialize;

use crate::commands::{to_json, OutputFormat};

/// Outcome of a successful check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    pub input: String,
    pub normalized: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix_length: Option<u32>,
}

/// Check command implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckCommand {
    format: OutputFormat,
}

impl CheckCommand {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn ipv4(&self, value: &str) -> Result<String> {
        let normalized =
            normalize_ipv4(value).with_context(|| format!("Invalid IPv4 address: {}", value))?;
        self.render(value, normalized, None)
    }

    /// Accepts only the 33 contiguous masks
    pub fn netmask(&self, value: &str) -> Result<String> {
        let mask = parse_ipv4(value).with_context(|| format!("Invalid netmask: {}", value))?;
        if !is_plausible_netmask(mask) {
            bail!("Not a contiguous netmask: {}", value);
        }
        self.render(value, format_ipv4(mask), Some(u32::from(mask).count_ones()))
    }

    pub fn mac(&self, value: &str) -> Result<String> {
        let normalized = normalize_mac_address(value)
            .with_context(|| format!("Invalid MAC address: {}", value))?;
        self.render(value, normalized, None)
    }

    pub fn domain(&self, value: &str) -> Result<String> {
        if !is_plausible_search_domain(value) {
            bail!("Invalid search domain: {:?}", value);
        }
        self.render(value, value.to_string(), None)
    }

    fn render(&self, input: &str, normalized: String, prefix_length: Option<u32>) -> Result<String> {
        match self.format {
            OutputFormat::Text => Ok(match prefix_length {
                Some(bits) => format!("{} (/{})", normalized, bits),
                None => normalized,
            }),
            OutputFormat::Json => to_json(&CheckResult {
                input: input.to_string(),
                normalized,
                prefix_length,
            }),
        }
    }
}
