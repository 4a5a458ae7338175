//! Background task supervision.
//!
//! A supervised task ends in one of three ways: it finishes, it is cancelled
//! through the shared token, or it faults. Faults are reported once over the
//! channel returned by [`Supervisor::new`].

use std::{fmt, future::Future};

use tokio::{
    sync::mpsc,
    task::{JoinError, JoinHandle},
};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::telemetry::panic_message;

/// A supervised task that stopped abnormally.
#[derive(Debug)]
pub enum Fault {
    /// The task returned an error nobody handled.
    Rejected {
        task: &'static str,
        error: anyhow::Error,
    },
    /// The task panicked.
    Panicked { task: &'static str, message: String },
}

impl Fault {
    pub fn task(&self) -> &'static str {
        match self {
            Fault::Rejected { task, .. } | Fault::Panicked { task, .. } => task,
        }
    }

    /// Rejections still allow a graceful drain; panics do not.
    pub fn allows_drain(&self) -> bool {
        matches!(self, Fault::Rejected { .. })
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fault::Rejected { task, error } => write!(f, "unhandled rejection in {task}: {error:#}"),
            Fault::Panicked { task, message } => write!(f, "uncaught exception in {task}: {message}"),
        }
    }
}

/// Spawns background tasks and reports their faults.
#[derive(Debug, Clone)]
pub struct Supervisor {
    faults: mpsc::UnboundedSender<Fault>,
    token: CancellationToken,
}

impl Supervisor {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Fault>) {
        let (faults, rx) = mpsc::unbounded_channel();
        (
            Self {
                faults,
                token: CancellationToken::new(),
            },
            rx,
        )
    }

    /// Run `fut` until it completes or [`Supervisor::shutdown`] is called.
    pub fn spawn<F>(&self, task: &'static str, fut: F) -> JoinHandle<()>
    where
        F: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let token = self.token.clone();
        let inner = tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => Ok(()),
                result = fut => result,
            }
        });

        let faults = self.faults.clone();
        tokio::spawn(async move {
            let fault = match inner.await {
                Ok(Ok(())) => {
                    debug!(task, "supervised task finished");
                    return;
                }
                Ok(Err(error)) => Fault::Rejected { task, error },
                Err(err) => match panicked(err) {
                    Some(message) => Fault::Panicked { task, message },
                    None => return,
                },
            };
            // The receiver is gone once the process is already terminating.
            let _ = faults.send(fault);
        })
    }

    /// Cancel every supervised task.
    pub fn shutdown(&self) {
        self.token.cancel();
    }
}

fn panicked(err: JoinError) -> Option<String> {
    err.try_into_panic()
        .ok()
        .map(|payload| panic_message(payload.as_ref()))
}
