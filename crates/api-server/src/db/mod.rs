//! Persistence connection lifecycle.
//!
//! # Lifecycle
//!
//! 1. At startup, [`MongoHandle::connect`] opens the connection named by
//!    `MONGODB_URI` and pings it. With no URI, or when the ping fails within
//!    [`CONNECT_TIMEOUT`], the handle stays disconnected.
//! 2. `/health` reads [`Persistence::state`] on every probe.
//! 3. During shutdown the lifecycle manager calls [`Persistence::close`]
//!    after the HTTP server has drained, never before.

pub mod handle;

pub use handle::{close_quietly, MongoHandle, CONNECT_TIMEOUT};

use std::{future::Future, pin::Pin};

use common::protocol::DatabaseStatus;

/// Future returned by [`Persistence::close`].
pub type CloseFuture = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'static>>;

/// Connection state of the persistence collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Closed,
}

impl ConnectionState {
    pub fn is_connected(self) -> bool {
        self == ConnectionState::Connected
    }
}

impl From<ConnectionState> for DatabaseStatus {
    fn from(state: ConnectionState) -> Self {
        if state.is_connected() {
            DatabaseStatus::Connected
        } else {
            DatabaseStatus::Disconnected
        }
    }
}

/// The seam between the server and the persistence layer.
#[cfg_attr(test, mockall::automock)]
pub trait Persistence: Send + Sync {
    /// Current connection state. Must not block.
    fn state(&self) -> ConnectionState;

    /// Close the connection. Further calls are no-ops.
    fn close(&self) -> CloseFuture;
}
