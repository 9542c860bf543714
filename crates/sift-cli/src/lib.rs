//! Sift CLI library.
//!
//! This library provides the core functionality for the Sift command-line interface,
//! including configuration management, session state, command execution, and output
//! formatting.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;
pub mod store;

pub use cli::{Cli, Command};
pub use config::{Config, OutputFormat};
pub use error::{CliError, Result};
pub use output::Formatter;
pub use store::SessionStore;
