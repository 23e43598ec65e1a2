//! Runtime configuration
//!
//! Locations of the kernel views and of the external binaries driven by
//! the shutdown and route operations. Defaults match a Debian system
//! using ifupdown and ifplugd.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::Result;

/// Configuration files probed by [`NetifConfig::load_with_defaults`], in order
pub const DEFAULT_CONFIG_PATHS: &[&str] = &["/etc/netif/netif.toml", "./netif.toml"];

/// Prefix of environment overrides, e.g. `NETIF__COMMANDS__IFDOWN`
pub const ENV_PREFIX: &str = "NETIF";

/// Kernel views read by the interface queries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SysPaths {
    /// One directory per registered interface
    pub sys_class_net: PathBuf,
    /// VLAN driver view, with the global `config` file
    pub proc_net_vlan: PathBuf,
}

impl Default for SysPaths {
    fn default() -> Self {
        Self {
            sys_class_net: PathBuf::from("/sys/class/net"),
            proc_net_vlan: PathBuf::from("/proc/net/vlan"),
        }
    }
}

impl SysPaths {
    /// Both views rooted under `root`, as `root/sys/class/net` and `root/proc/net/vlan`
    pub fn with_root<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref();
        Self {
            sys_class_net: root.join("sys/class/net"),
            proc_net_vlan: root.join("proc/net/vlan"),
        }
    }
}

/// External binaries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandPaths {
    /// Link-monitor daemon control binary
    pub ifplugd: PathBuf,
    /// Full command line starting the link-monitor service
    pub ifplugd_start: Vec<String>,
    /// Interface-down binary
    pub ifdown: PathBuf,
    /// Routing binary
    pub ip: PathBuf,
}

impl Default for CommandPaths {
    fn default() -> Self {
        Self {
            ifplugd: PathBuf::from("/usr/sbin/ifplugd"),
            ifplugd_start: vec![
                "/usr/sbin/invoke-rc.d".to_string(),
                "ifplugd".to_string(),
                "start".to_string(),
            ],
            ifdown: PathBuf::from("/sbin/ifdown"),
            ip: PathBuf::from("/bin/ip"),
        }
    }
}

/// Main configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetifConfig {
    pub paths: SysPaths,
    pub commands: CommandPaths,
}

impl NetifConfig {
    /// Load configuration from file, on top of defaults, with environment overrides
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::build(Some(path.as_ref()))
    }

    /// Load the first readable default location, falling back to defaults
    pub fn load_with_defaults() -> Result<Self> {
        for path in DEFAULT_CONFIG_PATHS {
            if Path::new(path).exists() {
                match Self::load_from_file(path) {
                    Ok(config) => {
                        log::debug!("Loaded configuration from {}", path);
                        return Ok(config);
                    }
                    Err(e) => {
                        log::warn!("Failed to load config from {}: {}", path, e);
                    }
                }
            }
        }

        Self::build(None)
    }

    fn build(file: Option<&Path>) -> Result<Self> {
        let defaults = config::Config::try_from(&Self::default()).map_err(ConfigError::from)?;
        let mut builder = config::Config::builder().add_source(defaults);

        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .list_separator(" ")
                    .with_list_parse_key("commands.ifplugd_start")
                    .try_parsing(true),
            )
            .build()
            .map_err(ConfigError::from)?;

        let config: NetifConfig = settings.try_deserialize().map_err(ConfigError::from)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject empty paths and an empty start command
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("paths.sys_class_net", &self.paths.sys_class_net),
            ("paths.proc_net_vlan", &self.paths.proc_net_vlan),
            ("commands.ifplugd", &self.commands.ifplugd),
            ("commands.ifdown", &self.commands.ifdown),
            ("commands.ip", &self.commands.ip),
        ];

        for (field, path) in required {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    value: String::new(),
                }
                .into());
            }
        }

        if self
            .commands
            .ifplugd_start
            .first()
            .map_or(true, |program| program.is_empty())
        {
            return Err(ConfigError::InvalidValue {
                field: "commands.ifplugd_start".to_string(),
                value: self.commands.ifplugd_start.join(" "),
            }
            .into());
        }

        Ok(())
    }
}
