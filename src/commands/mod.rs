//! CLI command implementations for devops-dashboard.
//!
//! - `config`: Configuration file generation

pub mod config;

pub use config::command_config;
