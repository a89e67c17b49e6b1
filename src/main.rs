//! webshelf: local library server for a personal web archive

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use webshelf::archive::{Archivist, MemoryArchivist};
use webshelf::config::{Config, LogFormat, Preferences};
use webshelf::highlight::{Highlighter, TermHighlighter};
use webshelf::render::ViewOptions;
use webshelf::server::{build_router, AppState, LibraryServer};

#[derive(Parser)]
#[command(name = "webshelf")]
#[command(about = "Local library server for a personal web archive")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "webshelf.toml")]
    config: PathBuf,

    /// Port to listen on (overrides the config file)
    #[arg(short, long)]
    port: Option<u16>,

    /// Archive root (persisted to preferences, overrides a stored value)
    #[arg(short, long)]
    base_path: Option<PathBuf>,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config before logging so the [logging] section applies
    let config = if cli.config.exists() {
        Config::load(&cli.config)?
    } else {
        Config::default()
    };

    let level = config.logging.level.raised_by(cli.verbose);
    let filter = EnvFilter::new(level.as_str());
    match config.logging.format {
        LogFormat::Text => {
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(filter)
                .with_target(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        LogFormat::Json => {
            let subscriber = FmtSubscriber::builder()
                .json()
                .with_env_filter(filter)
                .with_target(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }

    std::fs::create_dir_all(&config.library.data_dir)?;

    let prefs = Arc::new(Preferences::load(
        &config.library.data_dir,
        &config.library.default_base_path(),
    )?);
    if let Some(base_path) = &cli.base_path {
        prefs.update_base_path(base_path)?;
    }
    info!(base_path = %prefs.base_path().display(), "serving archive");

    let archivist: Arc<dyn Archivist> = Arc::new(MemoryArchivist::open(prefs.clone())?);
    let highlighter: Arc<dyn Highlighter> = Arc::new(TermHighlighter::default());

    let server = Arc::new(LibraryServer::new(
        &config.server,
        archivist.clone(),
        prefs.clone(),
    )?);

    let state = AppState {
        server: server.clone(),
        archivist: archivist.clone(),
        highlighter,
        prefs,
        views: ViewOptions {
            debug_ids: config.library.debug_ids,
            max_title_length: config.library.max_title_length,
        },
        max_highlightable_length: config.library.max_highlightable_length,
        collaborator_timeout: config
            .server
            .collaborator_timeout_secs
            .map(Duration::from_secs),
    };
    server.install_router(build_router(state, &config.server, &config.library));

    let port = cli.port.unwrap_or(config.server.port);
    server.start(port).await?;

    wait_for_shutdown_signal().await;

    server.stop().await?;
    if let Err(e) = archivist.save_index() {
        warn!("failed to flush index during shutdown: {e}");
    }
    info!("shutdown complete");
    Ok(())
}

/// Resolve when any of the shutdown signals arrives: Ctrl+C everywhere,
/// plus SIGHUP and SIGUSR1 on Unix.
async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sighup = match signal(SignalKind::hangup()) {
            Ok(sig) => Some(sig),
            Err(e) => {
                warn!("failed to register SIGHUP handler: {e}");
                None
            }
        };
        let mut sigusr1 = match signal(SignalKind::user_defined1()) {
            Ok(sig) => Some(sig),
            Err(e) => {
                warn!("failed to register SIGUSR1 handler: {e}");
                None
            }
        };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => info!("received Ctrl+C, shutting down"),
            _ = recv_or_pending(&mut sighup) => info!("received SIGHUP, shutting down"),
            _ = recv_or_pending(&mut sigusr1) => info!("received SIGUSR1, shutting down"),
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        info!("received Ctrl+C, shutting down");
    }
}

#[cfg(unix)]
async fn recv_or_pending(sig: &mut Option<tokio::signal::unix::Signal>) {
    match sig {
        Some(sig) => {
            sig.recv().await;
        }
        None => std::future::pending::<()>().await,
    }
}
