//! Netif Apply
//!
//! Operations that change live network state by driving external
//! commands: forced interface shutdown and routing table changes.

pub mod command;
pub mod route;
pub mod shutdown;

#[cfg(test)]
mod tests;

pub use command::{CommandOutput, CommandRunner, Invocation, SystemCommandRunner};
pub use route::{parse_route_list, RouteEntry, RouteTable};
pub use shutdown::{InterfaceShutdown, IFPLUGD_ALREADY_STOPPED};
