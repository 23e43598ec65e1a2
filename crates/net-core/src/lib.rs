//! Netif Core
//!
//! Interface name classification, VLAN discovery and address arithmetic
//! for Linux hosts. Facts about live interfaces are read on every call
//! from `/sys/class/net` and `/proc/net/vlan`; nothing is cached.

pub mod address;
pub mod config;
pub mod error;
pub mod interface;
pub mod sysfs;
pub mod vlan;

pub use config::{CommandPaths, NetifConfig, SysPaths};
pub use error::NetworkError;
pub use interface::NetDevices;
pub use sysfs::{FileSystem, HostFileSystem};
pub use vlan::{VlanConfig, VlanInfo, VlanNameInfo};

/// Result type for network operations
pub type Result<T> = std::result::Result<T, NetworkError>;
