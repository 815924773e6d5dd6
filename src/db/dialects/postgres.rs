use std::str::FromStr;

use async_trait::async_trait;
use futures::TryStreamExt;
use sqlx::postgres::{PgConnectOptions, PgConnection, PgRow};
use sqlx::{Column, Connection, Either, Row, TypeInfo, ValueRef};
use tracing::debug;

use crate::db::result::{ResultSet, Value, ValueKind};
use crate::error::{AppError, QueryStage, Result};

use super::{BoxError, DbConnection, Dialect, DialectKind};

/// PostgreSQL dialect, for `postgres://` and `postgresql://` URLs
pub struct PostgresDialect;

#[async_trait]
impl Dialect for PostgresDialect {
    fn kind(&self) -> DialectKind {
        DialectKind::Postgres
    }

    async fn open(&self, conn_str: &str) -> std::result::Result<Box<dyn DbConnection>, BoxError> {
        let options = PgConnectOptions::from_str(conn_str)?;
        let conn = PgConnection::connect_with(&options).await?;
        debug!("Opened postgres connection");
        Ok(Box::new(PostgresConnection { conn }))
    }
}

struct PostgresConnection {
    conn: PgConnection,
}

#[async_trait]
impl DbConnection for PostgresConnection {
    async fn ping(&mut self) -> std::result::Result<(), BoxError> {
        self.conn.ping().await?;
        Ok(())
    }

    async fn run(&mut self, sql: &str) -> Result<ResultSet> {
        // Simple query protocol: the SQL goes out verbatim and every value
        // comes back in text form.
        let mut stream = sqlx::raw_sql(sql).fetch_many(&mut self.conn);
        let mut result: Option<ResultSet> = None;

        while let Some(item) = stream
            .try_next()
            .await
            .map_err(|e| AppError::query(QueryStage::Execute, e))?
        {
            match item {
                // end of the first statement
                Either::Left(_) => break,
                Either::Right(row) => {
                    let rs = result.get_or_insert_with(|| ResultSet::new(column_names(&row)));
                    rs.push_row(decode_row(&row)?)?;
                }
            }
        }
        drop(stream);

        Ok(result.unwrap_or_default())
    }

    async fn close(self: Box<Self>) {
        if let Err(e) = self.conn.close().await {
            debug!("Error closing postgres connection: {}", e);
        }
    }
}

fn column_names(row: &PgRow) -> Vec<String> {
    row.columns().iter().map(|c| c.name().to_string()).collect()
}

fn decode_row(row: &PgRow) -> Result<Vec<Value>> {
    row.columns()
        .iter()
        .map(|col| decode_cell(row, col.ordinal(), col.type_info().name()))
        .collect()
}

fn decode_cell(row: &PgRow, idx: usize, type_name: &str) -> Result<Value> {
    let scan_err = |e: String| {
        AppError::query(QueryStage::Scan, format!("column {} ({}): {}", idx, type_name, e))
    };

    let raw = row.try_get_raw(idx).map_err(|e| scan_err(e.to_string()))?;
    if raw.is_null() {
        return Ok(Value::Null);
    }

    match value_kind(type_name) {
        ValueKind::Binary => row
            .try_get_unchecked::<Vec<u8>, _>(idx)
            .map(Value::Binary)
            .map_err(|e| scan_err(e.to_string())),
        kind => {
            let text = row
                .try_get_unchecked::<String, _>(idx)
                .map_err(|e| scan_err(e.to_string()))?;
            Value::parse(kind, text).map_err(scan_err)
        }
    }
}

fn value_kind(type_name: &str) -> ValueKind {
    match type_name {
        "BOOL" => ValueKind::Bool,
        "INT2" | "INT4" | "INT8" | "OID" => ValueKind::Int,
        "FLOAT4" | "FLOAT8" => ValueKind::Float,
        "DATE" | "TIME" | "TIMETZ" | "TIMESTAMP" | "TIMESTAMPTZ" | "INTERVAL" => {
            ValueKind::Temporal
        }
        "BYTEA" => ValueKind::Binary,
        // NUMERIC keeps its exact text; everything else is rendered as text.
        _ => ValueKind::Text,
    }
}
