use std::time::Duration;

use tokio::time::timeout;
use tracing::debug;

use crate::error::{AppError, ConnectStage, Result};

use super::dialects::DialectSet;
use super::session::ConnectionDescriptor;

/// Checks that a target is reachable before it becomes the session.
pub struct Prober {
    dialects: DialectSet,
    connect_timeout: Duration,
}

impl Prober {
    pub fn new(dialects: DialectSet, connect_timeout: Duration) -> Self {
        Self {
            dialects,
            connect_timeout,
        }
    }

    /// Open a throwaway connection and ping it.
    ///
    /// Each stage is bounded by the connect timeout. The connection is closed
    /// whether or not the ping succeeds.
    pub async fn probe(&self, target: &ConnectionDescriptor) -> Result<()> {
        let dialect = self.dialects.get(target.dialect)?;

        debug!(
            "Probing {} target (connection string length: {})",
            target.dialect,
            target.connection_string.len()
        );

        let mut conn = match timeout(self.connect_timeout, dialect.open(&target.connection_string))
            .await
        {
            Ok(Ok(conn)) => conn,
            Ok(Err(e)) => return Err(AppError::connection(ConnectStage::Open, e)),
            Err(_) => return Err(self.timed_out(ConnectStage::Open)),
        };

        let pinged = match timeout(self.connect_timeout, conn.ping()).await {
            Ok(result) => result.map_err(|e| AppError::connection(ConnectStage::Ping, e)),
            Err(_) => Err(self.timed_out(ConnectStage::Ping)),
        };

        if timeout(self.connect_timeout, conn.close()).await.is_err() {
            debug!("Timed out closing probe connection");
        }

        pinged
    }

    fn timed_out(&self, stage: ConnectStage) -> AppError {
        AppError::connection(
            stage,
            format!("timed out after {}s", self.connect_timeout.as_secs_f32()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::dialects::fake::FakeDialect;
    use crate::db::dialects::DialectKind;
    use std::sync::Arc;

    fn prober(dialect: FakeDialect, connect_timeout: Duration) -> Prober {
        Prober::new(
            DialectSet::from_dialects(vec![Arc::new(dialect)]),
            connect_timeout,
        )
    }

    fn target() -> ConnectionDescriptor {
        ConnectionDescriptor::new(DialectKind::Postgres, "postgres://u:p@localhost/db")
    }

    #[tokio::test]
    async fn test_probe_success_releases_connection() {
        let dialect = FakeDialect::new(DialectKind::Postgres);
        let counters = dialect.counters();

        prober(dialect, Duration::from_secs(1))
            .probe(&target())
            .await
            .unwrap();

        assert_eq!(counters.opened(), 1);
        assert_eq!(counters.closed(), 1);
    }

    #[tokio::test]
    async fn test_open_failure_is_open_stage() {
        let dialect = FakeDialect::new(DialectKind::Postgres).failing_open("connection refused");
        let counters = dialect.counters();

        let err = prober(dialect, Duration::from_secs(1))
            .probe(&target())
            .await
            .unwrap_err();

        match err {
            AppError::Connection { stage, reason } => {
                assert_eq!(stage, ConnectStage::Open);
                assert!(reason.contains("connection refused"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(counters.closed(), 0);
    }

    #[tokio::test]
    async fn test_ping_failure_still_closes() {
        let dialect = FakeDialect::new(DialectKind::Postgres).failing_ping("broken pipe");
        let counters = dialect.counters();

        let err = prober(dialect, Duration::from_secs(1))
            .probe(&target())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AppError::Connection {
                stage: ConnectStage::Ping,
                ..
            }
        ));
        assert_eq!(counters.opened(), 1);
        assert_eq!(counters.closed(), 1);
    }

    #[tokio::test]
    async fn test_unresponsive_target_is_bounded() {
        let dialect = FakeDialect::new(DialectKind::Postgres).with_delay(Duration::from_secs(30));
        let counters = dialect.counters();

        let started = std::time::Instant::now();
        let err = prober(dialect, Duration::from_millis(50))
            .probe(&target())
            .await
            .unwrap_err();

        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(matches!(
            err,
            AppError::Connection {
                stage: ConnectStage::Ping,
                ..
            }
        ));
        assert_eq!(counters.closed(), 1);
    }

    #[tokio::test]
    async fn test_hanging_open_is_bounded() {
        let dialect =
            FakeDialect::new(DialectKind::Postgres).with_open_delay(Duration::from_secs(30));
        let counters = dialect.counters();

        let started = std::time::Instant::now();
        let err = prober(dialect, Duration::from_millis(50))
            .probe(&target())
            .await
            .unwrap_err();

        assert!(started.elapsed() < Duration::from_secs(5));
        match err {
            AppError::Connection { stage, reason } => {
                assert_eq!(stage, ConnectStage::Open);
                assert!(reason.contains("timed out"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(counters.opened(), 0);
        assert_eq!(counters.closed(), 0);
    }

    #[tokio::test]
    async fn test_missing_dialect_is_unsupported() {
        let prober = Prober::new(DialectSet::from_dialects(vec![]), Duration::from_secs(1));
        let err = prober.probe(&target()).await.unwrap_err();
        assert!(matches!(err, AppError::UnsupportedDialect));
    }
}
