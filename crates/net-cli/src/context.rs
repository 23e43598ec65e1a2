//! Shared state of a CLI run

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use netif_core::{HostFileSystem, NetDevices, NetifConfig};

/// Configuration loaded once and handed to every command
#[derive(Debug, Clone)]
pub struct AppContext {
    config: NetifConfig,
}

impl AppContext {
    /// Load settings from `config_path`, or from the default locations
    pub fn bootstrap(config_path: Option<&Path>) -> Result<Arc<Self>> {
        let config = match config_path {
            Some(path) => NetifConfig::load_from_file(path)
                .with_context(|| format!("Failed to load configuration: {}", path.display()))?,
            None => NetifConfig::load_with_defaults().context("Failed to load configuration")?,
        };
        Ok(Self::new(config))
    }

    pub fn new(config: NetifConfig) -> Arc<Self> {
        Arc::new(Self { config })
    }

    pub fn config(&self) -> &NetifConfig {
        &self.config
    }

    /// Interface queries over the configured kernel views
    pub fn devices(&self) -> NetDevices {
        NetDevices::new(HostFileSystem, self.config.paths.clone())
    }
}
