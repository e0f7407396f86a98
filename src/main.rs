// devops-dashboard - version 0.1.0
// Dashboard service with tracing logging
use anyhow::{Context, Result};
use axum::Router;
use clap::Parser;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio::{net::TcpListener, signal};
use tracing::level_filters::LevelFilter;
use tracing::{error, info};

use devops_dashboard::cli::{Args, Commands};
use devops_dashboard::commands::command_config;
use devops_dashboard::config::{
    parse_log_level, render_config, resolve_config, validate_effective_config, Config,
};
use devops_dashboard::{create_router, AppState};

/// Initializes tracing logging subsystem with configured log level
fn setup_logging(config: &Config) -> Result<()> {
    let level = config
        .log_level
        .as_deref()
        .and_then(parse_log_level)
        .unwrap_or(LevelFilter::INFO);

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    info!("Logging initialized with level: {}", level);
    Ok(())
}

/// Resolves when SIGINT or SIGTERM is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C), shutting down gracefully...");
        }
        _ = terminate => {
            info!("Received SIGTERM, shutting down gracefully...");
        }
    }
}

async fn serve_plain(addr: SocketAddr, app: Router) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("devops-dashboard listening on http://{}", addr);

    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                error!("Server error: {}", e);
                return Err(e.into());
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received, exiting...");
        }
    }
    Ok(())
}

async fn serve_tls(addr: SocketAddr, app: Router, config: &Config) -> Result<()> {
    let (Some(cert), Some(key)) = (&config.tls_cert_path, &config.tls_key_path) else {
        anyhow::bail!("enable_tls requires both tls_cert_path and tls_key_path");
    };

    let tls = axum_server::tls_rustls::RustlsConfig::from_pem_file(cert, key)
        .await
        .context("Failed to load TLS certificate or key")?;
    info!("devops-dashboard listening on https://{}", addr);

    let server = axum_server::bind_rustls(addr, tls).serve(app.into_make_service());

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                error!("Server error: {}", e);
                return Err(e.into());
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received, exiting...");
        }
    }
    Ok(())
}

/// -------------------------------------------------------------------
/// MAIN APPLICATION ENTRY POINT
/// -------------------------------------------------------------------
#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(Commands::Config { output, format }) = &args.command {
        return command_config(output.clone(), *format);
    }

    let config = resolve_config(&args)?;

    if let Err(e) = validate_effective_config(&config) {
        eprintln!("Configuration invalid: {:#}", e);
        std::process::exit(1);
    }

    if args.check_config {
        println!("Configuration is valid");
        return Ok(());
    }

    if args.show_config {
        println!("{}", render_config(&config, args.config_format)?);
        return Ok(());
    }

    // Setup logging subsystem first to enable proper logging
    setup_logging(&config)?;

    info!("Starting devops-dashboard (env: {})", config.app_env());

    let bind_ip: IpAddr = config
        .bind_addr()
        .parse()
        .context("Invalid bind address")?;
    let addr = SocketAddr::new(bind_ip, config.port());
    let enable_tls = config.enable_tls.unwrap_or(false);

    let state = Arc::new(AppState::from_config(config));
    let app = create_router(state.clone());

    if enable_tls {
        serve_tls(addr, app, &state.config).await?;
    } else {
        serve_plain(addr, app).await?;
    }

    info!(
        "devops-dashboard stopped after serving {} requests",
        state.telemetry.requests_served()
    );
    Ok(())
}
