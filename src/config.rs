//! Configuration loading and validation.
//!
//! Effective configuration is resolved with the precedence
//! CLI / environment > config file > built-in defaults.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::ci::{CiDefaults, GitInfo, Stages, UNKNOWN_STAGE};
use crate::cli::{Args, ConfigFormat};
use crate::history::{DEFAULT_HISTORY_CAPACITY, DEFAULT_LOG_CAPACITY};
use crate::system::DEFAULT_SAMPLE_WINDOW;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_APP_ENV: &str = "dev";

/// Config file locations searched when none is given on the command line.
pub const DEFAULT_CONFIG_PATHS: &[&str] = &[
    "/etc/devops-dashboard/config.yaml",
    "/etc/devops-dashboard/config.yml",
    "/etc/devops-dashboard/config.json",
    "./devops-dashboard.yaml",
    "./devops-dashboard.yml",
    "./devops-dashboard.json",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    // Server configuration
    pub port: Option<u16>,
    pub bind: Option<String>,
    pub app_env: Option<String>,
    pub port_mappings: Option<String>,

    // CI webhook; never written back out by --show-config
    #[serde(skip_serializing)]
    pub ci_update_token: Option<String>,

    // Defaults reported until the CI webhook sets a value
    pub stage_build: Option<String>,
    pub stage_test: Option<String>,
    pub stage_deploy: Option<String>,
    pub git_branch: Option<String>,
    pub git_commit: Option<String>,
    pub git_author: Option<String>,
    pub git_commit_date: Option<String>,

    // Telemetry
    pub log_capacity: Option<usize>,
    pub history_capacity: Option<usize>,
    pub enable_sampler: Option<bool>,
    pub sample_window_ms: Option<u64>,

    // Logging
    pub log_level: Option<String>,

    // TLS
    pub enable_tls: Option<bool>,
    pub tls_cert_path: Option<PathBuf>,
    pub tls_key_path: Option<PathBuf>,
}

impl Config {
    /// Fully populated configuration used for generated config files.
    pub fn sample() -> Self {
        Self {
            port: Some(DEFAULT_PORT),
            bind: Some(DEFAULT_BIND_ADDR.to_string()),
            app_env: Some(DEFAULT_APP_ENV.to_string()),
            port_mappings: Some("5000->5000/tcp".to_string()),
            ci_update_token: None,
            stage_build: Some(UNKNOWN_STAGE.to_string()),
            stage_test: Some(UNKNOWN_STAGE.to_string()),
            stage_deploy: Some(UNKNOWN_STAGE.to_string()),
            git_branch: Some("main".to_string()),
            git_commit: None,
            git_author: None,
            git_commit_date: None,
            log_capacity: Some(DEFAULT_LOG_CAPACITY),
            history_capacity: Some(DEFAULT_HISTORY_CAPACITY),
            enable_sampler: Some(true),
            sample_window_ms: Some(DEFAULT_SAMPLE_WINDOW.as_millis() as u64),
            log_level: Some("info".to_string()),
            enable_tls: Some(false),
            tls_cert_path: None,
            tls_key_path: None,
        }
    }

    pub fn bind_addr(&self) -> &str {
        self.bind.as_deref().unwrap_or(DEFAULT_BIND_ADDR)
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    pub fn app_env(&self) -> &str {
        non_empty(self.app_env.as_deref()).unwrap_or(DEFAULT_APP_ENV)
    }

    pub fn ci_token(&self) -> &str {
        self.ci_update_token.as_deref().unwrap_or("")
    }

    pub fn log_capacity(&self) -> usize {
        self.log_capacity.unwrap_or(DEFAULT_LOG_CAPACITY)
    }

    pub fn history_capacity(&self) -> usize {
        self.history_capacity.unwrap_or(DEFAULT_HISTORY_CAPACITY)
    }

    /// Defaults merged into the CI state for fields never set by an update.
    ///
    /// Stages fall back to `Unknown`; git fields stay empty.
    pub fn ci_defaults(&self) -> CiDefaults {
        let stage = |value: &Option<String>| {
            Some(non_empty(value.as_deref()).unwrap_or(UNKNOWN_STAGE).to_string())
        };
        let git = |value: &Option<String>| non_empty(value.as_deref()).map(str::to_string);

        CiDefaults {
            stages: Stages {
                build: stage(&self.stage_build),
                test: stage(&self.stage_test),
                deploy: stage(&self.stage_deploy),
            },
            git: GitInfo {
                branch: git(&self.git_branch),
                commit: git(&self.git_commit),
                author: git(&self.git_author),
                date: git(&self.git_commit_date),
            },
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Validate effective config (used by --check-config and at startup)
pub fn validate_effective_config(cfg: &Config) -> Result<()> {
    if cfg.port == Some(0) {
        bail!("port must be between 1 and 65535");
    }

    if let Some(bind) = cfg.bind.as_deref() {
        bind.parse::<IpAddr>()
            .with_context(|| format!("Invalid bind address '{}'", bind))?;
    }

    if cfg.log_capacity == Some(0) {
        bail!("log_capacity must be greater than 0");
    }
    if cfg.history_capacity == Some(0) {
        bail!("history_capacity must be greater than 0");
    }

    if let Some(level) = cfg.log_level.as_deref() {
        if parse_log_level(level).is_none() {
            bail!(
                "Invalid log_level '{}', expected off, error, warn, info, debug or trace",
                level
            );
        }
    }

    if cfg.enable_tls.unwrap_or(false) {
        match (&cfg.tls_cert_path, &cfg.tls_key_path) {
            (Some(cert), Some(key)) => {
                if !cert.exists() {
                    bail!("TLS certificate not found: {}", cert.display());
                }
                if !key.exists() {
                    bail!("TLS private key not found: {}", key.display());
                }
            }
            _ => bail!("enable_tls requires both tls_cert_path and tls_key_path"),
        }
    }

    Ok(())
}

/// Maps a config file log level name onto a tracing level filter.
pub fn parse_log_level(level: &str) -> Option<tracing::level_filters::LevelFilter> {
    use tracing::level_filters::LevelFilter;

    match level.to_ascii_lowercase().as_str() {
        "off" => Some(LevelFilter::OFF),
        "error" => Some(LevelFilter::ERROR),
        "warn" | "warning" => Some(LevelFilter::WARN),
        "info" => Some(LevelFilter::INFO),
        "debug" => Some(LevelFilter::DEBUG),
        "trace" => Some(LevelFilter::TRACE),
        _ => None,
    }
}

/// Resolves configuration from CLI args, environment, config file and defaults.
pub fn resolve_config(args: &Args) -> Result<Config> {
    let mut config = if args.no_config {
        Config::default()
    } else {
        load_config(args.config.as_deref())?
    };

    if let Some(bind_ip) = args.bind {
        config.bind = Some(bind_ip.to_string());
    }
    if let Some(port) = args.port {
        config.port = Some(port);
    }

    override_string(&mut config.app_env, &args.app_env);
    override_string(&mut config.port_mappings, &args.port_mappings);
    override_string(&mut config.ci_update_token, &args.ci_token);
    override_string(&mut config.stage_build, &args.stage_build);
    override_string(&mut config.stage_test, &args.stage_test);
    override_string(&mut config.stage_deploy, &args.stage_deploy);
    override_string(&mut config.git_branch, &args.git_branch);
    override_string(&mut config.git_commit, &args.git_commit);
    override_string(&mut config.git_author, &args.git_author);
    override_string(&mut config.git_commit_date, &args.git_commit_date);

    if let Some(level) = &args.log_level {
        config.log_level = Some(level.as_str().to_string());
    }

    if args.no_sampler {
        config.enable_sampler = Some(false);
    }
    if let Some(ms) = args.sample_window_ms {
        config.sample_window_ms = Some(ms);
    }

    // TLS: CLI wins if provided
    if args.enable_tls {
        config.enable_tls = Some(true);
    }
    if let Some(cert) = &args.tls_cert {
        config.tls_cert_path = Some(cert.clone());
    }
    if let Some(key) = &args.tls_key {
        config.tls_key_path = Some(key.clone());
    }

    Ok(config)
}

fn override_string(target: &mut Option<String>, value: &Option<String>) {
    if let Some(v) = value {
        *target = Some(v.clone());
    }
}

/// Loads a config file, searching the default locations when `path` is `None`.
///
/// A missing file yields the default configuration.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let path = match path {
        Some(p) => {
            if !p.exists() {
                bail!("Config file not found: {}", p.display());
            }
            p.to_path_buf()
        }
        None => match DEFAULT_CONFIG_PATHS.iter().map(Path::new).find(|p| p.exists()) {
            Some(p) => p.to_path_buf(),
            None => return Ok(Config::default()),
        },
    };

    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;

    let config = parse_config(&content, format_for_path(&path))
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;
    info!("Loaded configuration from: {}", path.display());
    Ok(config)
}

/// Picks the config format from a file extension, defaulting to YAML.
pub fn format_for_path(path: &Path) -> ConfigFormat {
    match path.extension().and_then(|s| s.to_str()) {
        Some("json") => ConfigFormat::Json,
        Some("toml") => ConfigFormat::Toml,
        _ => ConfigFormat::Yaml,
    }
}

pub fn parse_config(content: &str, format: ConfigFormat) -> Result<Config> {
    let config: Config = match format {
        ConfigFormat::Json => serde_json::from_str(content)?,
        ConfigFormat::Toml => toml::from_str(content)?,
        ConfigFormat::Yaml => serde_yaml::from_str(content)?,
    };
    Ok(config)
}

pub fn render_config(config: &Config, format: ConfigFormat) -> Result<String> {
    let output = match format {
        ConfigFormat::Json => serde_json::to_string_pretty(config)?,
        ConfigFormat::Toml => toml::to_string_pretty(config)?,
        ConfigFormat::Yaml => serde_yaml::to_string(config)?,
    };
    Ok(output)
}
