//! Interface management CLI
//!
//! Command implementations behind the `netifctl` binary. Every command
//! renders its result to a string so the binary decides where it goes.

pub mod commands;
pub mod context;
