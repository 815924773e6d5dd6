use async_trait::async_trait;
use futures::TryStreamExt;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection, MySqlRow, MySqlSslMode};
use sqlx::{Column, Connection, Either, Row, TypeInfo, ValueRef};
use tracing::debug;

use crate::db::dsn::{parse_mysql_dsn, MySqlDsn};
use crate::db::result::{ResultSet, Value, ValueKind};
use crate::error::{AppError, QueryStage, Result};

use super::{BoxError, DbConnection, Dialect, DialectKind};

/// MySQL dialect, for `user:password@tcp(host:port)/dbname` data source names
pub struct MySqlDialect;

#[async_trait]
impl Dialect for MySqlDialect {
    fn kind(&self) -> DialectKind {
        DialectKind::MySql
    }

    async fn open(&self, conn_str: &str) -> std::result::Result<Box<dyn DbConnection>, BoxError> {
        let dsn = parse_mysql_dsn(conn_str)?;
        let conn = MySqlConnection::connect_with(&connect_options(&dsn)).await?;
        debug!("Opened mysql connection to {}:{}", dsn.host, dsn.port);
        Ok(Box::new(MySqlConn { conn }))
    }
}

fn connect_options(dsn: &MySqlDsn) -> MySqlConnectOptions {
    let mut options = MySqlConnectOptions::new()
        .host(&dsn.host)
        .port(dsn.port)
        .username(&dsn.user)
        .ssl_mode(ssl_mode(dsn.param("tls")));

    if let Some(password) = &dsn.password {
        options = options.password(password);
    }
    if let Some(database) = &dsn.database {
        options = options.database(database);
    }
    if let Some(charset) = dsn.param("charset") {
        // The DSN allows a comma-separated preference list; use the first.
        let first = charset.split(',').next().unwrap_or(charset);
        options = options.charset(first);
    }
    options
}

/// Map the DSN `tls` parameter onto sqlx SSL modes.
fn ssl_mode(tls: Option<&str>) -> MySqlSslMode {
    match tls {
        Some("true") => MySqlSslMode::VerifyIdentity,
        Some("skip-verify") => MySqlSslMode::Required,
        Some("false") => MySqlSslMode::Disabled,
        _ => MySqlSslMode::Preferred,
    }
}

struct MySqlConn {
    conn: MySqlConnection,
}

#[async_trait]
impl DbConnection for MySqlConn {
    async fn ping(&mut self) -> std::result::Result<(), BoxError> {
        self.conn.ping().await?;
        Ok(())
    }

    async fn run(&mut self, sql: &str) -> Result<ResultSet> {
        // Text protocol (COM_QUERY), no prepared statement.
        let mut stream = sqlx::raw_sql(sql).fetch_many(&mut self.conn);
        let mut result: Option<ResultSet> = None;

        while let Some(item) = stream
            .try_next()
            .await
            .map_err(|e| AppError::query(QueryStage::Execute, e))?
        {
            match item {
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
            debug!("Error closing mysql connection: {}", e);
        }
    }
}

fn column_names(row: &MySqlRow) -> Vec<String> {
    row.columns().iter().map(|c| c.name().to_string()).collect()
}

fn decode_row(row: &MySqlRow) -> Result<Vec<Value>> {
    row.columns()
        .iter()
        .map(|col| decode_cell(row, col.ordinal(), col.type_info().name()))
        .collect()
}

fn decode_cell(row: &MySqlRow, idx: usize, type_name: &str) -> Result<Value> {
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
    let unsigned = type_name.ends_with(" UNSIGNED");
    match type_name.trim_end_matches(" UNSIGNED") {
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" if unsigned => ValueKind::UInt,
        // BOOLEAN is reported for any TINYINT(1), which stores -128..=127.
        "BOOLEAN" | "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" | "YEAR" => {
            ValueKind::Int
        }
        "FLOAT" | "DOUBLE" => ValueKind::Float,
        "DATE" | "TIME" | "DATETIME" | "TIMESTAMP" => ValueKind::Temporal,
        "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" | "BIT"
        | "GEOMETRY" => ValueKind::Binary,
        // DECIMAL, character types, JSON, ENUM and SET
        _ => ValueKind::Text,
    }
}
