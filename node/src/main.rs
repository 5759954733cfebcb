// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # JPETH Token Node
//!
//! Entry point for the `jpeth-node` binary. Parses CLI arguments,
//! initializes logging and metrics, deploys the configured token, and
//! serves the HTTP/WS API.
//!
//! The binary supports three subcommands:
//!
//! - `run`: deploy the token from `token.toml` and serve it
//! - `init`: create the data directory and write a template `token.toml`
//! - `version`: print build version information

mod api;
mod cli;
mod config;
mod logging;
mod metrics;

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::{broadcast, RwLock};

use jpeth_contracts::TokenService;

use cli::{Commands, JpethNodeCli};
use config::NodeConfig;
use logging::{LogFormat, LogProfile};
use metrics::TokenMetrics;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = JpethNodeCli::parse();

    match cli.command {
        Commands::Run(args) => run_node(args).await,
        Commands::Init(args) => init_node(args),
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Deploys the token and serves the API and metrics endpoints until a
/// shutdown signal arrives.
async fn run_node(args: cli::RunArgs) -> Result<()> {
    logging::init_logging(
        LogProfile::Run,
        LogFormat::from_str_lossy(&args.log_format),
    );

    let config_path = args.config_path();
    let config = NodeConfig::load(&config_path)?;
    tracing::info!(
        config = %config_path.display(),
        rpc_port = args.rpc_port,
        metrics_port = args.metrics_port,
        "starting jpeth-node"
    );

    // --- Token ---
    let token = TokenService::new(config.token.clone()).context("failed to deploy token")?;

    // --- Metrics ---
    let token_metrics =
        Arc::new(TokenMetrics::new().context("failed to create prometheus registry")?);
    token_metrics.observe_ledger(&token);

    // --- Event broadcast ---
    let (event_tx, _) = broadcast::channel(config.api.event_channel_capacity);

    // --- Application state ---
    let app_state = api::AppState {
        version: env!("CARGO_PKG_VERSION").to_string(),
        token: Arc::new(RwLock::new(token)),
        event_tx,
        metrics: Arc::clone(&token_metrics),
    };

    // --- API server ---
    let api_router = api::create_router(app_state);
    let api_addr = bind_addr(&config.api.host, args.rpc_port)?;
    let api_listener = tokio::net::TcpListener::bind(api_addr)
        .await
        .with_context(|| format!("failed to bind RPC listener on {}", api_addr))?;
    tracing::info!("RPC/API server listening on {}", api_addr);

    // --- Metrics server ---
    let metrics_router = axum::Router::new()
        .route("/metrics", axum::routing::get(metrics::metrics_handler))
        .with_state(Arc::clone(&token_metrics));
    let metrics_addr = bind_addr(&config.api.host, args.metrics_port)?;
    let metrics_listener = tokio::net::TcpListener::bind(metrics_addr)
        .await
        .with_context(|| format!("failed to bind metrics listener on {}", metrics_addr))?;
    tracing::info!("Metrics server listening on {}", metrics_addr);

    // --- Serve ---
    tokio::select! {
        res = axum::serve(api_listener, api_router) => {
            if let Err(e) = res {
                tracing::error!("API server error: {}", e);
            }
        }
        res = axum::serve(metrics_listener, metrics_router) => {
            if let Err(e) = res {
                tracing::error!("Metrics server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            tracing::info!("shutdown signal received, draining connections");
        }
    }

    tracing::info!("jpeth-node stopped");
    Ok(())
}

fn bind_addr(host: &str, port: u16) -> Result<SocketAddr> {
    format!("{host}:{port}")
        .parse()
        .with_context(|| format!("invalid bind address {host}:{port}"))
}

/// Creates the data directory and writes a template `token.toml`.
fn init_node(args: cli::InitArgs) -> Result<()> {
    logging::init_logging(LogProfile::Init, LogFormat::Pretty);

    let data_dir = &args.data_dir;
    let config_path = data_dir.join(config::CONFIG_FILE_NAME);
    tracing::info!(data_dir = %data_dir.display(), "initializing node");

    if config_path.exists() && !args.force {
        anyhow::bail!(
            "{} already exists; pass --force to overwrite",
            config_path.display()
        );
    }

    let mut node_config = NodeConfig::template(args.manager, args.owner);
    if let Some(name) = args.name {
        node_config.token.name = name;
    }
    if let Some(symbol) = args.symbol {
        node_config.token.symbol = symbol;
    }
    if let Some(decimals) = args.decimals {
        node_config.token.decimals = decimals;
    }
    node_config.validate()?;

    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("failed to create data directory: {}", data_dir.display()))?;
    std::fs::write(&config_path, node_config.to_toml()?)
        .with_context(|| format!("failed to write {}", config_path.display()))?;

    tracing::info!(path = %config_path.display(), "token config written");

    println!("Node initialized successfully.");
    println!("  Data directory : {}", data_dir.display());
    println!("  Config         : {}", config_path.display());
    println!(
        "  Token          : {} ({})",
        node_config.token.name, node_config.token.symbol
    );
    println!("  Manager        : {}", node_config.token.manager);
    println!("  Owner          : {}", node_config.token.owner);

    Ok(())
}

/// Prints version information to stdout.
fn print_version() {
    println!("jpeth-node {}", env!("CARGO_PKG_VERSION"));
    println!("rustc      {}", rustc_version());
}

/// Returns the Rust compiler version used to build this binary.
fn rustc_version() -> &'static str {
    option_env!("RUSTC_VERSION").unwrap_or("unknown")
}

/// Waits for SIGINT (Ctrl+C) or SIGTERM, whichever comes first.
///
/// On non-Unix platforms, only Ctrl+C is supported. If a handler cannot be
/// installed, that signal source is ignored and the other one still works.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
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
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
