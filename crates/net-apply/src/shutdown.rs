//! Forced shutdown of a physical interface and its VLANs
//!
//! Unlike `/etc/init.d/networking stop`, nothing is checked beforehand
//! (mounted network filesystems and so on): the interface goes down right
//! when asked. The order is fixed:
//!
//! 1. stop the `ifplugd` instance of the interface, or it races to bring
//!    the link back up;
//! 2. `ifdown` every VLAN stacked on the interface;
//! 3. `ifdown` the physical interface itself, last.
//!
//! The first failure aborts the sequence. Interfaces already brought down
//! stay down and the remaining ones are left untouched.

use log::{error, info, warn};

use netif_core::address::sort_lex_numeric;
use netif_core::sysfs::{FileSystem, HostFileSystem};
use netif_core::{CommandPaths, NetDevices, NetworkError, Result};

use crate::command::{CommandRunner, Invocation};

/// Exit code of `ifplugd -k` when no instance runs for the interface
///
/// Taken from observed ifplugd behaviour, not from a documented contract.
pub const IFPLUGD_ALREADY_STOPPED: i32 = 6;

/// Drives `ifplugd` and `ifdown` for forced interface shutdown
pub struct InterfaceShutdown<R: CommandRunner, F: FileSystem = HostFileSystem> {
    runner: R,
    devices: NetDevices<F>,
    commands: CommandPaths,
}

impl<R: CommandRunner, F: FileSystem> InterfaceShutdown<R, F> {
    pub fn new(runner: R, devices: NetDevices<F>, commands: CommandPaths) -> Self {
        Self {
            runner,
            devices,
            commands,
        }
    }

    /// Remove all VLANs on `phy`, then shut it down
    ///
    /// Returns the interfaces brought down, in the order they went down.
    pub fn force_shutdown(&self, phy: &str) -> Result<Vec<String>> {
        info!("Forcing shutdown of interface {}", phy);

        self.stop_link_monitor(phy)?;

        let interfaces = self.shutdown_set(phy)?;
        for interface in &interfaces {
            self.bring_down(interface)?;
        }

        Ok(interfaces)
    }

    /// Interfaces brought down by [`force_shutdown`](Self::force_shutdown), in order
    ///
    /// The registered VLANs of `phy` in natural order, then `phy` itself.
    pub fn shutdown_set(&self, phy: &str) -> Result<Vec<String>> {
        let prefix = format!("{}.", phy);
        let mut interfaces: Vec<String> = self
            .devices
            .list_registered()?
            .into_iter()
            .filter(|name| name.starts_with(&prefix))
            .collect();

        sort_lex_numeric(&mut interfaces);
        interfaces.push(phy.to_string());
        Ok(interfaces)
    }

    /// Start the ifplugd service
    pub fn start_link_monitor(&self) -> Result<()> {
        let command_line = self.commands.ifplugd_start.join(" ");
        let invocation = Invocation::from_argv(&self.commands.ifplugd_start).ok_or_else(|| {
            NetworkError::network_op("no ifplugd start command configured".to_string())
        })?;

        info!("Starting ifplugd: {}", command_line);

        let status = self.runner.call(&invocation).map_err(|e| {
            let message = format!("could not invoke {}", command_line);
            error!("{}: {}", message, e);
            NetworkError::network_op(message)
        })?;

        if status != 0 {
            let message = format!("failure of: {} (exit code {})", command_line, status);
            error!("{}", message);
            return Err(NetworkError::network_op(message));
        }

        Ok(())
    }

    fn stop_link_monitor(&self, phy: &str) -> Result<()> {
        let invocation = Invocation::new(&self.commands.ifplugd).args(["-i", phy, "-k"]);

        let status = self.runner.call(&invocation).map_err(|e| {
            let message = format!("could not invoke ifplugd to kill its {:?} instance", phy);
            error!("{}: {}", message, e);
            NetworkError::network_op(message)
        })?;

        match status {
            0 => Ok(()),
            IFPLUGD_ALREADY_STOPPED => {
                warn!(
                    "{:?} ifplugd instance seems to have already been stopped",
                    phy
                );
                Ok(())
            }
            code => {
                let message = format!(
                    "ifplugd failed (exit code {}) while trying to kill instance {:?}",
                    code, phy
                );
                error!("{}", message);
                Err(NetworkError::network_op(message))
            }
        }
    }

    fn bring_down(&self, interface: &str) -> Result<()> {
        info!("Bringing down interface {}", interface);

        let invocation = Invocation::new(&self.commands.ifdown).arg(interface);

        let status = self.runner.call(&invocation).map_err(|e| {
            let message = format!("could not invoke ifdown to shutdown interface {:?}", interface);
            error!("{}: {}", message, e);
            NetworkError::network_op(message)
        })?;

        if status != 0 {
            let message = format!(
                "ifdown failed (exit code {}) to shutdown the {:?} network interface",
                status, interface
            );
            error!("{}", message);
            return Err(NetworkError::network_op(message));
        }

        Ok(())
    }
}
