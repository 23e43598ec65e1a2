//! Error types for network operations

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for network operations
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Address error: {0}")]
    Address(#[from] AddressError),

    #[error("Interface error: {0}")]
    Interface(#[from] InterfaceError),

    #[error("System error: {0}")]
    System(#[from] SystemError),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl NetworkError {
    /// Build a `NetworkOp` failure, the terminal error of shutdown and start operations
    pub fn network_op(message: impl Into<String>) -> Self {
        NetworkError::System(SystemError::NetworkOp {
            message: message.into(),
        })
    }

    /// True for failures raised while driving external network commands
    pub fn is_network_op(&self) -> bool {
        matches!(self, NetworkError::System(SystemError::NetworkOp { .. }))
    }
}

/// Malformed or out-of-range address input
#[derive(Debug, Error)]
pub enum AddressError {
    #[error("Invalid IPv4 address: {value:?}")]
    InvalidIpv4 { value: String },

    #[error("Invalid MAC address {value:?}: {reason}")]
    InvalidMac { value: String, reason: String },

    #[error("Invalid bitmask {bits}: must be between 0 and {max}")]
    PrefixOutOfRange { bits: u32, max: u32 },
}

/// Precondition violations on interface names
#[derive(Debug, Error)]
pub enum InterfaceError {
    #[error("Invalid interface, it's not an alias interface (ifname: {name:?})")]
    NotAnAlias { name: String },
}

/// System operation errors
#[derive(Debug, Error)]
pub enum SystemError {
    #[error("Failed to read {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Unexpected content in {path}: {value:?}")]
    InvalidValue { path: PathBuf, value: String },

    #[error("Could not invoke {command}: {source}")]
    CommandSpawn {
        command: String,
        source: std::io::Error,
    },

    #[error("{message}")]
    NetworkOp { message: String },
}

/// Configuration loading and validation errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration value for {field}: {value:?}")]
    InvalidValue { field: String, value: String },
}
