//! Forced interface shutdown

use std::sync::Arc;

use anyhow::{Context, Result};
use netif_apply::{InterfaceShutdown, SystemCommandRunner};

use crate::context::AppContext;

/// Shutdown command implementation
pub struct ShutdownCommand {
    context: Arc<AppContext>,
}

impl ShutdownCommand {
    pub fn new(context: Arc<AppContext>) -> Self {
        Self { context }
    }

    fn orchestrator(&self) -> InterfaceShutdown<SystemCommandRunner> {
        InterfaceShutdown::new(
            SystemCommandRunner::new(),
            self.context.devices(),
            self.context.config().commands.clone(),
        )
    }

    /// Bring down `phy` and every VLAN stacked on it
    pub fn execute(&self, phy: &str) -> Result<String> {
        let interfaces = self
            .orchestrator()
            .force_shutdown(phy)
            .with_context(|| format!("Forced shutdown of {} failed", phy))?;

        Ok(format!("Interfaces down: {}", interfaces.join(" ")))
    }

    pub fn start_ifplugd(&self) -> Result<String> {
        self.orchestrator()
            .start_link_monitor()
            .context("Failed to start ifplugd")?;
        Ok("ifplugd started".to_string())
    }
}
