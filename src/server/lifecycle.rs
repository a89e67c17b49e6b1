//! Service lifecycle management
//!
//! Owns the single listening endpoint and the base-path change protocol.
//! At most one listener is ever bound per process: all start/stop/restart
//! sequences run under one state mutex, held across the whole sequence so
//! no competing start can bind in the gap. The request pipeline's router is
//! installed exactly once at construction time and reused across restarts.

use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use anyhow::{Context, Result};
use axum::Router;
use chrono::{DateTime, Utc};
use tokio::net::TcpListener;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::archive::Archivist;
use crate::config::{Preferences, ServerConfig};

/// The listener currently bound, if any
struct ListenerHandle {
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

/// Mutable lifecycle state. Exactly one instance exists per server;
/// mutated only under the lifecycle mutex.
///
/// Invariant: `running == true` iff `listener.is_some()`.
#[derive(Default)]
struct ServiceState {
    running: bool,
    listener: Option<ListenerHandle>,
    bound_port: Option<u16>,
    started_at: Option<DateTime<Utc>>,
}

/// Read-only view of the lifecycle state, for callers outside the manager
#[derive(Debug, Clone)]
pub struct ServiceSnapshot {
    pub running: bool,
    pub bound_port: Option<u16>,
    pub started_at: Option<DateTime<Utc>>,
}

/// Result of a base-path change request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BasePathOutcome {
    /// The posted path equals the configured one; nothing happened
    Unchanged,
    /// The path was persisted and a listener restart is in progress
    Restarting,
}

/// Owns the listening endpoint and coordinates restarts with the archivist
pub struct LibraryServer {
    bind_addr: IpAddr,
    restart_grace: Duration,
    collaborator_timeout: Option<Duration>,
    router: OnceLock<Router>,
    state: Mutex<ServiceState>,
    archivist: Arc<dyn Archivist>,
    prefs: Arc<Preferences>,
}

impl LibraryServer {
    pub fn new(
        config: &ServerConfig,
        archivist: Arc<dyn Archivist>,
        prefs: Arc<Preferences>,
    ) -> Result<Self> {
        let bind_addr: IpAddr = config
            .bind_addr
            .parse()
            .with_context(|| format!("Invalid bind address '{}'", config.bind_addr))?;
        Ok(Self {
            bind_addr,
            restart_grace: Duration::from_millis(config.restart_grace_ms),
            collaborator_timeout: config.collaborator_timeout_secs.map(Duration::from_secs),
            router: OnceLock::new(),
            state: Mutex::new(ServiceState::default()),
            archivist,
            prefs,
        })
    }

    /// Install the request router. Called once after construction; a second
    /// call keeps the original router so restarts can never accumulate
    /// duplicate handlers.
    pub fn install_router(&self, router: Router) {
        if self.router.set(router).is_err() {
            warn!("router already installed; keeping the original");
        }
    }

    /// Bind the listener and start serving. A start request while already
    /// running is logged and ignored; at most one listener is ever bound.
    pub async fn start(&self, port: u16) -> Result<()> {
        let mut state = self.state.lock().await;
        self.start_locked(&mut state, port).await
    }

    async fn start_locked(&self, state: &mut ServiceState, port: u16) -> Result<()> {
        if state.running {
            warn!("start requested while the server is already listening; ignoring");
            return Ok(());
        }

        let router = self
            .router
            .get()
            .context("no router installed; call install_router first")?
            .clone();

        let addr = SocketAddr::new(self.bind_addr, port);
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {addr}"))?;
        let bound_port = listener.local_addr().context("listener has no address")?.port();

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            let serve = axum::serve(listener, router).with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            });
            if let Err(e) = serve.await {
                error!("library server failed: {e}");
            }
        });

        let up_at = Utc::now();
        state.running = true;
        state.listener = Some(ListenerHandle {
            shutdown: shutdown_tx,
            task,
        });
        state.bound_port = Some(bound_port);
        state.started_at = Some(up_at);
        info!(port = bound_port, up_at = %up_at, "server up");
        Ok(())
    }

    /// Close the listener and wait for it to fully shut down. Safe to call
    /// when not running.
    pub async fn stop(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        self.stop_locked(&mut state).await
    }

    async fn stop_locked(&self, state: &mut ServiceState) -> Result<()> {
        let Some(handle) = state.listener.take() else {
            info!("stop requested but the server is already stopped");
            state.running = false;
            return Ok(());
        };

        info!("closing library server");
        let _ = handle.shutdown.send(());
        if let Err(e) = handle.task.await {
            warn!("listener task ended abnormally: {e}");
        }
        state.running = false;
        state.bound_port = None;
        state.started_at = None;
        info!("library server closed");
        Ok(())
    }

    /// The base-path change protocol.
    ///
    /// Synchronously: notify the archivist, persist the new path, and bail
    /// out with [`BasePathOutcome::Unchanged`] when the path is the same.
    /// On a real change the re-point and listener restart run in a spawned
    /// task, after the HTTP response for this request has gone out; callers
    /// are told to watch the logs. Requests arriving while the listener is
    /// down fail with connection-refused, an accepted availability gap.
    pub async fn change_base_path(self: &Arc<Self>, new_path: &Path) -> Result<BasePathOutcome> {
        self.archivist.before_path_changed();

        let changed = self
            .prefs
            .update_base_path(new_path)
            .context("Failed to persist new base path")?;
        if !changed {
            info!("base path unchanged, no restart");
            return Ok(BasePathOutcome::Unchanged);
        }

        let server = Arc::clone(self);
        tokio::spawn(async move {
            // Errors here are logged, not rolled back; the server may be
            // left stopped if rebinding fails
            if let Err(e) = server.restart_after_path_change().await {
                error!("restart after base path change failed: {e}");
            }
        });
        Ok(BasePathOutcome::Restarting)
    }

    async fn restart_after_path_change(&self) -> Result<()> {
        let repoint = self.archivist.after_path_changed();
        match self.collaborator_timeout {
            Some(limit) => tokio::time::timeout(limit, repoint)
                .await
                .context("archivist did not finish re-pointing in time")??,
            None => repoint.await?,
        }

        let mut state = self.state.lock().await;
        let Some(port) = state.bound_port else {
            warn!("base path changed while the server was stopped; not restarting");
            return Ok(());
        };

        self.stop_locked(&mut state).await?;
        info!("waiting {:?} for the socket to be released", self.restart_grace);
        tokio::time::sleep(self.restart_grace).await;
        info!("server restarting");
        self.start_locked(&mut state, port).await
    }

    /// Snapshot the lifecycle state.
    pub async fn snapshot(&self) -> ServiceSnapshot {
        let state = self.state.lock().await;
        ServiceSnapshot {
            running: state.running,
            bound_port: state.bound_port,
            started_at: state.started_at,
        }
    }

    /// The port the listener is currently bound to, if running.
    pub async fn bound_port(&self) -> Option<u16> {
        self.state.lock().await.bound_port
    }
}
