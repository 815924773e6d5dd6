use std::time::Duration;

use tokio::time::timeout;
use tracing::debug;

use crate::error::{AppError, QueryStage, Result};

use super::dialects::{Dialect, DialectSet};
use super::result::ResultSet;
use super::session::ConnectionDescriptor;

pub struct QueryExecutor {
    dialects: DialectSet,
    query_timeout: Duration,
}

impl QueryExecutor {
    pub fn new(dialects: DialectSet, query_timeout: Duration) -> Self {
        Self {
            dialects,
            query_timeout,
        }
    }

    /// Run raw SQL against the session target on a fresh connection.
    ///
    /// The statement is sent verbatim. Nothing is parameterized and writes
    /// are allowed.
    pub async fn execute(
        &self,
        session: Option<&ConnectionDescriptor>,
        sql: &str,
    ) -> Result<ResultSet> {
        let session = session.ok_or(AppError::NoActiveSession)?;
        let dialect = self.dialects.get(session.dialect)?;

        debug!("Executing query on {} ({} bytes)", session.dialect, sql.len());

        match timeout(
            self.query_timeout,
            run_query(dialect.as_ref(), &session.connection_string, sql),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(AppError::QueryTimeout(self.query_timeout)),
        }
    }
}

async fn run_query(dialect: &dyn Dialect, conn_str: &str, sql: &str) -> Result<ResultSet> {
    let mut conn = dialect
        .open(conn_str)
        .await
        .map_err(|e| AppError::query(QueryStage::Open, e))?;

    let result = conn.run(sql).await;
    conn.close().await;

    if let Ok(rs) = &result {
        debug!(
            "Query returned {} rows, {} columns",
            rs.rows().len(),
            rs.columns().len()
        );
    }
    result
}
