//! [`MongoHandle`]: the server's view of the persistence connection.

use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use arc_swap::ArcSwap;
use mongodb::{bson::doc, options::ClientOptions, Client};
use tracing::{error, info, warn};

use super::{CloseFuture, ConnectionState, Persistence};

/// Upper bound on establishing the connection at startup.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared handle to the document-store connection.
///
/// The resource handler groups own the actual queries; the server only needs
/// to know whether the connection is up (for `/health`) and to close it during
/// shutdown. State lives behind an [`ArcSwap`] so probes never block.
#[derive(Clone, Debug)]
pub struct MongoHandle {
    state: Arc<ArcSwap<ConnectionState>>,
    target: Option<Arc<str>>,
    client: Option<Client>,
}

impl MongoHandle {
    /// Create a handle that has not attempted to connect.
    pub fn new() -> Self {
        Self {
            state: Arc::new(ArcSwap::from_pointee(ConnectionState::Disconnected)),
            target: None,
            client: None,
        }
    }

    /// Open the connection described by `uri` and confirm it with a `ping`.
    ///
    /// Without a URI, or when the server cannot be reached within `timeout`,
    /// the handle stays disconnected and the server keeps running; `/health`
    /// then reports the database as `disconnected`.
    pub async fn connect(uri: Option<&str>, timeout: Duration) -> Self {
        let mut handle = Self::new();
        let Some(uri) = uri else {
            warn!("MONGODB_URI not set; running without a database connection");
            return handle;
        };

        let host = redact(uri);
        handle.target = Some(Arc::from(host.as_str()));
        handle.set(ConnectionState::Connecting);

        let opened = tokio::time::timeout(timeout, open(uri, timeout))
            .await
            .unwrap_or_else(|_| Err(anyhow::anyhow!("timed out after {timeout:?}")));
        match opened {
            Ok(client) => {
                handle.client = Some(client);
                handle.set(ConnectionState::Connected);
                info!(host = %host, "database connected");
            }
            Err(err) => {
                handle.set(ConnectionState::Disconnected);
                error!(host = %host, error = %format!("{err:#}"), "database connection failed");
            }
        }
        handle
    }

    fn set(&self, state: ConnectionState) {
        self.state.store(Arc::new(state));
    }
}

async fn open(uri: &str, timeout: Duration) -> Result<Client> {
    let mut options = ClientOptions::parse(uri)
        .await
        .context("invalid MONGODB_URI")?;
    options.app_name = Some("omnirewards-api".into());
    options.connect_timeout = Some(timeout);
    options.server_selection_timeout = Some(timeout);

    let client = Client::with_options(options).context("failed to build database client")?;
    client
        .database("admin")
        .run_command(doc! { "ping": 1 })
        .await
        .context("database ping failed")?;
    Ok(client)
}

impl Default for MongoHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl Persistence for MongoHandle {
    fn state(&self) -> ConnectionState {
        **self.state.load()
    }

    fn close(&self) -> CloseFuture {
        let state = Arc::clone(&self.state);
        let target = self.target.clone();
        let client = self.client.clone();
        Box::pin(async move {
            let previous = state.swap(Arc::new(ConnectionState::Closed));
            if *previous == ConnectionState::Closed {
                return Ok(());
            }
            if let Some(client) = client {
                client.shutdown().await;
                info!(host = target.as_deref().unwrap_or("-"), "database connection closed");
            }
            Ok::<(), anyhow::Error>(())
        }) as CloseFuture
    }
}

/// Strip credentials and path from a connection string for logging.
fn redact(uri: &str) -> String {
    let rest = uri.split_once("://").map_or(uri, |(_, rest)| rest);
    let host = rest.rsplit_once('@').map_or(rest, |(_, host)| host);
    host.split(['/', '?']).next().unwrap_or_default().to_owned()
}

/// Close `db`, treating an already-closed handle as success.
pub async fn close_quietly(db: &dyn Persistence) -> Result<()> {
    if db.state() == ConnectionState::Closed {
        return Ok(());
    }
    db.close().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::protocol::DatabaseStatus;

    #[tokio::test]
    async fn starts_disconnected_without_uri() {
        let db = MongoHandle::connect(None, CONNECT_TIMEOUT).await;
        assert_eq!(db.state(), ConnectionState::Disconnected);
        assert!(!db.state().is_connected());
        assert!(db.target.is_none());
    }

    #[tokio::test]
    async fn unreachable_server_reports_disconnected() {
        let db = MongoHandle::connect(
            Some("mongodb://user:pw@127.0.0.1:1/rewards"),
            Duration::from_millis(300),
        )
        .await;
        assert_eq!(db.state(), ConnectionState::Disconnected);
        assert_eq!(db.target.as_deref(), Some("127.0.0.1:1"));
        assert!(db.client.is_none());
        assert_eq!(DatabaseStatus::from(db.state()), DatabaseStatus::Disconnected);
    }

    #[tokio::test]
    async fn malformed_uri_reports_disconnected() {
        let db = MongoHandle::connect(Some("mongodb://"), Duration::from_millis(300)).await;
        assert_eq!(db.state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn close_is_idempotent() {
        let db = MongoHandle::new();
        db.close().await.unwrap();
        assert_eq!(db.state(), ConnectionState::Closed);
        db.close().await.unwrap();
        close_quietly(&db).await.unwrap();
        assert_eq!(db.state(), ConnectionState::Closed);
    }

    #[test]
    fn clones_share_state() {
        let db = MongoHandle::new();
        let other = db.clone();
        other.state.store(Arc::new(ConnectionState::Closed));
        assert_eq!(db.state(), ConnectionState::Closed);
    }

    #[test]
    fn redact_drops_credentials_and_path() {
        assert_eq!(redact("mongodb+srv://a:b@cluster0.x.net/db?retryWrites=true"), "cluster0.x.net");
        assert_eq!(redact("mongodb://localhost"), "localhost");
    }
}
