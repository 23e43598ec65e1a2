//! CLI commands

pub mod check;
pub mod route;
pub mod shutdown;
pub mod status;
pub mod vlan;

pub use check::CheckCommand;
pub use route::{RouteCommand, RouteSpec};
pub use shutdown::ShutdownCommand;
pub use status::{InterfaceFilter, InterfaceStatus, StatusCommand};
pub use vlan::VlanCommand;

use anyhow::{Context, Result};
use serde::Serialize;

/// Rendering of command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub(crate) fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize output")
}
