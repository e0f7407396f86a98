//! CLI arguments and subcommands for devops-dashboard.
//!
//! Most server options can also be set through the environment variables a
//! container deployment passes in (`PORT`, `APP_ENV`, `CI_UPDATE_TOKEN`, ...).

use clap::{Parser, Subcommand, ValueEnum};
use std::net::IpAddr;
use std::path::PathBuf;

/// Log level options for CLI parsing
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Configuration format options for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

/// Main CLI arguments structure
#[derive(Parser, Debug)]
#[command(
    name = "devops-dashboard",
    about = "Dashboard service for process health, host metrics and CI/CD pipeline status",
    version,
    propagate_version = true
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// HTTP listen port
    #[arg(short = 'p', long, env = "PORT")]
    pub port: Option<u16>,

    /// Bind to specific interface/IP
    #[arg(long)]
    pub bind: Option<IpAddr>,

    /// Deployment environment shown on the dashboard
    #[arg(long, env = "APP_ENV")]
    pub app_env: Option<String>,

    /// Shared secret for POST /api/ci/update (empty disables updates)
    #[arg(long, env = "CI_UPDATE_TOKEN", hide_env_values = true)]
    pub ci_token: Option<String>,

    /// Container port mappings shown on the dashboard
    #[arg(long, env = "PORT_MAPPINGS")]
    pub port_mappings: Option<String>,

    /// Default build stage status
    #[arg(long, env = "STAGE_BUILD")]
    pub stage_build: Option<String>,

    /// Default test stage status
    #[arg(long, env = "STAGE_TEST")]
    pub stage_test: Option<String>,

    /// Default deploy stage status
    #[arg(long, env = "STAGE_DEPLOY")]
    pub stage_deploy: Option<String>,

    /// Default git branch
    #[arg(long, env = "GIT_BRANCH")]
    pub git_branch: Option<String>,

    /// Default git commit
    #[arg(long, env = "GIT_COMMIT")]
    pub git_commit: Option<String>,

    /// Default git commit author
    #[arg(long, env = "GIT_AUTHOR")]
    pub git_author: Option<String>,

    /// Default git commit date
    #[arg(long, env = "GIT_COMMIT_DATE")]
    pub git_commit_date: Option<String>,

    /// Log level
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Config file (YAML/JSON/TOML)
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Disable all config file loading
    #[arg(long)]
    pub no_config: bool,

    /// Print effective merged config and exit
    #[arg(long)]
    pub show_config: bool,

    /// Output format for --show-config
    #[arg(long, value_enum, default_value = "yaml")]
    pub config_format: ConfigFormat,

    /// Validate config and exit (return code 1 on error)
    #[arg(long)]
    pub check_config: bool,

    /// Report cpu/memory as unavailable instead of sampling the host
    #[arg(long)]
    pub no_sampler: bool,

    /// CPU sampling window in milliseconds
    #[arg(long)]
    pub sample_window_ms: Option<u64>,

    /// Enable HTTPS
    #[arg(long)]
    pub enable_tls: bool,

    /// Path to TLS certificate (PEM format)
    #[arg(long)]
    pub tls_cert: Option<PathBuf>,

    /// Path to TLS private key (PEM format)
    #[arg(long)]
    pub tls_key: Option<PathBuf>,
}

/// Subcommands for additional functionality
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a configuration file
    Config {
        /// Output file path (stdout if omitted)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "yaml")]
        format: ConfigFormat,
    },
}
