//! Process lifecycle: serve, drain, exit.
//!
//! # Phases
//!
//! `Running → Draining → Terminated(status)`, observed through a
//! [`tokio::sync::watch`] channel. Transitions only move forward and
//! `Terminated` is final.
//!
//! # Shutdown
//!
//! SIGINT, SIGTERM, or a supervised task returning an error all start a
//! drain: the server stops accepting connections and finishes in-flight
//! requests, then the persistence handle is closed. A drain that outlives
//! [`SHUTDOWN_TIMEOUT`] ends the process with a failure status. A panicking
//! background task ends the process at once, without draining.

pub mod supervisor;

use std::{fmt, future::Future, net::SocketAddr, process::ExitCode, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use tokio::{
    net::TcpListener,
    sync::{mpsc, watch},
    task::JoinHandle,
    time::Instant,
};
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::db::{close_quietly, MongoHandle, Persistence, CONNECT_TIMEOUT};
use crate::server::{router, state::AppState, state::Limits};

pub use supervisor::{Fault, Supervisor};

/// Upper bound on the graceful drain.
pub const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

/// How the process ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Clean,
    Failure,
}

impl ExitStatus {
    pub fn code(self) -> u8 {
        match self {
            ExitStatus::Clean => 0,
            ExitStatus::Failure => 1,
        }
    }
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        ExitCode::from(status.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Running,
    Draining,
    Terminated(ExitStatus),
}

/// Owner of the current [`Phase`].
#[derive(Debug)]
pub struct Lifecycle {
    phase: watch::Sender<Phase>,
}

impl Lifecycle {
    pub fn new() -> Self {
        let (phase, _) = watch::channel(Phase::Running);
        Self { phase }
    }

    pub fn phase(&self) -> Phase {
        *self.phase.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<Phase> {
        self.phase.subscribe()
    }

    /// `Running → Draining`. Returns `false` if already past `Running`.
    pub fn begin_drain(&self) -> bool {
        self.phase.send_if_modified(|phase| {
            if *phase != Phase::Running {
                return false;
            }
            *phase = Phase::Draining;
            true
        })
    }

    /// Enter `Terminated(status)`. Returns `false` if already terminated.
    pub fn terminate(&self, status: ExitStatus) -> bool {
        self.phase.send_if_modified(|phase| {
            if matches!(phase, Phase::Terminated(_)) {
                return false;
            }
            *phase = Phase::Terminated(status);
            true
        })
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

/// Termination signal received from the OS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Interrupt,
    Terminate,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Signal::Interrupt => "SIGINT",
            Signal::Terminate => "SIGTERM",
        })
    }
}

/// Resolve on SIGINT or SIGTERM, whichever comes first.
///
/// A handler that cannot be installed is logged and never fires.
pub async fn shutdown_signal() -> Signal {
    let interrupt = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "failed to install SIGINT handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = interrupt => Signal::Interrupt,
        _ = terminate => Signal::Terminate,
    }
}

/// Wait for `server` to finish draining, then close `db`, all within
/// `timeout`.
pub async fn drain<F>(server: F, db: &dyn Persistence, timeout: Duration) -> ExitStatus
where
    F: Future<Output = Result<()>>,
{
    let started = Instant::now();
    let sequence = async {
        server.await.context("server did not drain cleanly")?;
        debug!("all connections closed");
        close_quietly(db).await.context("failed to close database connection")
    };

    match tokio::time::timeout(timeout, sequence).await {
        Ok(Ok(())) => {
            info!(elapsed_ms = started.elapsed().as_millis() as u64, "graceful shutdown complete");
            ExitStatus::Clean
        }
        Ok(Err(err)) => {
            error!(error = %format!("{err:#}"), "shutdown failed");
            ExitStatus::Failure
        }
        Err(_) => {
            error!(
                timeout_secs = timeout.as_secs(),
                "could not close connections in time, forcefully shutting down"
            );
            ExitStatus::Failure
        }
    }
}

/// Drop expired limiter windows once per general window.
async fn prune_limiters(limits: Limits, every: Duration) -> Result<()> {
    let mut ticker = tokio::time::interval_at(Instant::now() + every, every);
    loop {
        let now = ticker.tick().await;
        let dropped = limits.general.prune(now) + limits.auth.prune(now);
        debug!(dropped, "pruned expired rate-limit windows");
    }
}

enum Trigger {
    Signal(Signal),
    Fault(Fault),
    ServerStopped(Result<()>),
}

/// Wait for the first of `signal`, a supervised fault, or the server task
/// ending on its own, and shut down the way that trigger calls for.
///
/// Only a panic skips the drain. Anything other than a signal followed by a
/// clean drain reports [`ExitStatus::Failure`].
async fn settle<S>(
    signal: S,
    faults: &mut mpsc::UnboundedReceiver<Fault>,
    mut server: JoinHandle<Result<()>>,
    lifecycle: &Lifecycle,
    supervisor: &Supervisor,
    db: &dyn Persistence,
    timeout: Duration,
) -> ExitStatus
where
    S: Future<Output = Signal>,
{
    let trigger = tokio::select! {
        signal = signal => Trigger::Signal(signal),
        Some(fault) = faults.recv() => Trigger::Fault(fault),
        joined = &mut server => Trigger::ServerStopped(
            joined.context("server task failed").and_then(|r| r),
        ),
    };

    let drained = async move { server.await.context("server task failed")? };
    match trigger {
        Trigger::Signal(signal) => {
            info!(%signal, "received {signal}, shutting down gracefully");
            lifecycle.begin_drain();
            supervisor.shutdown();
            drain(drained, db, timeout).await
        }
        Trigger::Fault(fault) if fault.allows_drain() => {
            error!(task = fault.task(), error = %fault, "unhandled rejection");
            lifecycle.begin_drain();
            supervisor.shutdown();
            drain(drained, db, timeout).await;
            ExitStatus::Failure
        }
        Trigger::Fault(fault) => {
            error!(task = fault.task(), error = %fault, "uncaught exception");
            ExitStatus::Failure
        }
        Trigger::ServerStopped(result) => {
            if let Err(err) = &result {
                error!(error = %format!("{err:#}"), "server stopped unexpectedly");
            } else {
                warn!("server stopped without a shutdown request");
            }
            lifecycle.begin_drain();
            supervisor.shutdown();
            drain(async move { result }, db, timeout).await;
            ExitStatus::Failure
        }
    }
}

/// Serve until a signal or a fault, then drain and report the exit status.
///
/// # Errors
///
/// Returns an error only when the listener cannot be bound; everything after
/// that is folded into the returned [`ExitStatus`].
pub async fn run(config: Config) -> Result<ExitStatus> {
    let lifecycle = Lifecycle::new();

    let handle = MongoHandle::connect(config.mongodb_uri.as_deref(), CONNECT_TIMEOUT).await;
    let db: Arc<dyn Persistence> = Arc::new(handle);
    let state = AppState::new(config, Arc::clone(&db));
    let app = router::build(state.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], state.config.port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(
        %addr,
        environment = %state.config.node_env,
        health = %format!("http://localhost:{}/health", state.config.port),
        "OmniRewards API listening"
    );

    let (supervisor, mut faults) = Supervisor::new();
    supervisor.spawn(
        "rate-limit-prune",
        prune_limiters(state.limits.clone(), state.config.rate_limit_window()),
    );

    let mut phase = lifecycle.subscribe();
    let serve = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        let _ = phase.wait_for(|p| *p != Phase::Running).await;
    });
    let server = tokio::spawn(async move { serve.await.context("server error") });
    let abort = server.abort_handle();

    let status = settle(
        shutdown_signal(),
        &mut faults,
        server,
        &lifecycle,
        &supervisor,
        db.as_ref(),
        SHUTDOWN_TIMEOUT,
    )
    .await;

    abort.abort();
    lifecycle.terminate(status);
    info!(code = status.code(), "process exiting");
    Ok(status)
}
