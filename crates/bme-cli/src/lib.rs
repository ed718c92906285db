//! Library side of the `bme` binary: argument types, configuration,
//! logging and the command implementations.

pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;
pub mod types;
