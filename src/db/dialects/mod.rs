mod mysql;
mod postgres;
mod sqlserver;

#[cfg(test)]
pub mod fake;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{AppError, Result};

use super::result::ResultSet;

pub use mysql::MySqlDialect;
pub use postgres::PostgresDialect;
pub use sqlserver::SqlServerDialect;

/// Error type returned by the driver layer before it is tagged with a stage.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Database backend family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DialectKind {
    Postgres,
    MySql,
    SqlServer,
}

impl DialectKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::MySql => "mysql",
            Self::SqlServer => "sqlserver",
        }
    }
}

impl fmt::Display for DialectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Work out which backend a connection string targets.
///
/// Patterns are checked in priority order and matched case-sensitively
/// against the raw string; the first match wins.
pub fn classify(conn_str: &str) -> Result<DialectKind> {
    if conn_str.contains("postgresql://") || conn_str.contains("postgres://") {
        Ok(DialectKind::Postgres)
    } else if conn_str.contains("@tcp(") {
        Ok(DialectKind::MySql)
    } else if conn_str.contains("sqlserver://") || conn_str.contains("server=") {
        Ok(DialectKind::SqlServer)
    } else {
        Err(AppError::UnsupportedDialect)
    }
}

/// Trait defining how a backend is reached
#[async_trait]
pub trait Dialect: Send + Sync {
    fn kind(&self) -> DialectKind;

    /// Open a fresh connection from a user-supplied connection string
    async fn open(&self, conn_str: &str) -> std::result::Result<Box<dyn DbConnection>, BoxError>;
}

/// One open, unpooled connection.
#[async_trait]
pub trait DbConnection: Send {
    /// Liveness check
    async fn ping(&mut self) -> std::result::Result<(), BoxError>;

    /// Run raw SQL and materialize the first result set.
    ///
    /// Failures are tagged with the execute, columns or scan stage. Any row
    /// cursor is released before this returns.
    async fn run(&mut self, sql: &str) -> Result<ResultSet>;

    /// Release the connection. Errors are logged, not returned.
    async fn close(self: Box<Self>);
}

/// The dialect implementations available to the session engine.
#[derive(Clone)]
pub struct DialectSet {
    dialects: HashMap<DialectKind, Arc<dyn Dialect>>,
}

impl DialectSet {
    /// Real drivers for every supported backend
    pub fn native() -> Self {
        Self::from_dialects(vec![
            Arc::new(PostgresDialect) as Arc<dyn Dialect>,
            Arc::new(MySqlDialect),
            Arc::new(SqlServerDialect),
        ])
    }

    pub fn from_dialects(dialects: Vec<Arc<dyn Dialect>>) -> Self {
        Self {
            dialects: dialects.into_iter().map(|d| (d.kind(), d)).collect(),
        }
    }

    pub fn get(&self, kind: DialectKind) -> Result<Arc<dyn Dialect>> {
        self.dialects
            .get(&kind)
            .cloned()
            .ok_or(AppError::UnsupportedDialect)
    }
}

/// List of supported dialect names
pub fn supported_dialects() -> Vec<&'static str> {
    vec![
        DialectKind::Postgres.name(),
        DialectKind::MySql.name(),
        DialectKind::SqlServer.name(),
    ]
}
