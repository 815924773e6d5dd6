use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::Result;

use super::dialects::{classify, DialectKind, DialectSet};
use super::probe::Prober;
use super::query::QueryExecutor;
use super::result::ResultSet;
use super::session::{ConnectionDescriptor, SessionStore};

/// Owns the process-wide session and runs the connect and query flows.
pub struct SessionManager {
    store: SessionStore,
    /// Held for a whole classify, probe and install sequence.
    connect_lock: Mutex<()>,
    prober: Prober,
    executor: QueryExecutor,
}

impl SessionManager {
    pub fn new(dialects: DialectSet, connect_timeout: Duration, query_timeout: Duration) -> Self {
        Self {
            store: SessionStore::new(),
            connect_lock: Mutex::new(()),
            prober: Prober::new(dialects.clone(), connect_timeout),
            executor: QueryExecutor::new(dialects, query_timeout),
        }
    }

    /// Classify and probe a connection string, then make it the session.
    ///
    /// On any failure the previous session is left untouched.
    pub async fn connect(&self, conn_str: &str) -> Result<DialectKind> {
        let _guard = self.connect_lock.lock().await;

        let dialect = classify(conn_str)?;
        let target = ConnectionDescriptor::new(dialect, conn_str);

        if let Err(e) = self.prober.probe(&target).await {
            warn!("Connect to {} target failed: {}", dialect, e);
            return Err(e);
        }

        self.store.set(target).await;
        info!("Session switched to {} database", dialect);
        Ok(dialect)
    }

    /// Run a query against a snapshot of the current session.
    pub async fn query(&self, sql: &str) -> Result<ResultSet> {
        let snapshot = self.store.get().await;
        debug!(
            "Query requested (active session: {:?})",
            snapshot.as_ref().map(|s| s.dialect)
        );
        self.executor.execute(snapshot.as_ref(), sql).await
    }

    pub async fn current(&self) -> Option<ConnectionDescriptor> {
        self.store.get().await
    }
}
