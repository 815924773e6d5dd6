//! Scriptable in-memory dialect for exercising the session engine without a
//! database server.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::db::result::ResultSet;
use crate::error::{AppError, QueryStage, Result};

use super::{BoxError, DbConnection, Dialect, DialectKind};

#[derive(Clone, Default)]
pub struct Counters {
    opened: Arc<AtomicUsize>,
    closed: Arc<AtomicUsize>,
    queries: Arc<Mutex<Vec<String>>>,
}

impl Counters {
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[derive(Clone)]
pub struct FakeDialect {
    kind: DialectKind,
    open_error: Option<String>,
    ping_error: Option<String>,
    query_error: Option<(QueryStage, String)>,
    result: ResultSet,
    delay: Duration,
    open_delay: Duration,
    counters: Counters,
}

impl FakeDialect {
    pub fn new(kind: DialectKind) -> Self {
        Self {
            kind,
            open_error: None,
            ping_error: None,
            query_error: None,
            result: ResultSet::default(),
            delay: Duration::ZERO,
            open_delay: Duration::ZERO,
            counters: Counters::default(),
        }
    }

    pub fn failing_open(mut self, reason: &str) -> Self {
        self.open_error = Some(reason.to_string());
        self
    }

    pub fn failing_ping(mut self, reason: &str) -> Self {
        self.ping_error = Some(reason.to_string());
        self
    }

    pub fn failing_query(mut self, stage: QueryStage, reason: &str) -> Self {
        self.query_error = Some((stage, reason.to_string()));
        self
    }

    pub fn returning(mut self, result: ResultSet) -> Self {
        self.result = result;
        self
    }

    /// Delay applied to ping and run, for timeout and race tests.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Delay applied to open only, like a host that never answers.
    pub fn with_open_delay(mut self, delay: Duration) -> Self {
        self.open_delay = delay;
        self
    }

    pub fn counters(&self) -> Counters {
        self.counters.clone()
    }
}

#[async_trait]
impl Dialect for FakeDialect {
    fn kind(&self) -> DialectKind {
        self.kind
    }

    async fn open(&self, _conn_str: &str) -> std::result::Result<Box<dyn DbConnection>, BoxError> {
        tokio::time::sleep(self.open_delay).await;
        if let Some(reason) = &self.open_error {
            return Err(reason.clone().into());
        }
        self.counters.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeConnection {
            dialect: self.clone(),
        }))
    }
}

struct FakeConnection {
    dialect: FakeDialect,
}

#[async_trait]
impl DbConnection for FakeConnection {
    async fn ping(&mut self) -> std::result::Result<(), BoxError> {
        tokio::time::sleep(self.dialect.delay).await;
        match &self.dialect.ping_error {
            Some(reason) => Err(reason.clone().into()),
            None => Ok(()),
        }
    }

    async fn run(&mut self, sql: &str) -> Result<ResultSet> {
        self.dialect
            .counters
            .queries
            .lock()
            .unwrap()
            .push(sql.to_string());
        tokio::time::sleep(self.dialect.delay).await;
        match &self.dialect.query_error {
            Some((stage, reason)) => Err(AppError::query(*stage, reason)),
            None => Ok(self.dialect.result.clone()),
        }
    }

    async fn close(self: Box<Self>) {
        self.dialect.counters.closed.fetch_add(1, Ordering::SeqCst);
    }
}
