use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Step of the connectivity probe that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectStage {
    Open,
    Ping,
}

impl fmt::Display for ConnectStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => f.write_str("open"),
            Self::Ping => f.write_str("ping"),
        }
    }
}

/// Step of the query pipeline that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStage {
    Open,
    Execute,
    Columns,
    Scan,
}

impl fmt::Display for QueryStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => f.write_str("open"),
            Self::Execute => f.write_str("execute"),
            Self::Columns => f.write_str("columns"),
            Self::Scan => f.write_str("scan"),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("unsupported database")]
    UnsupportedDialect,

    #[error("{stage} failed: {reason}")]
    Connection { stage: ConnectStage, reason: String },

    #[error("no database connection established. Use /connect first")]
    NoActiveSession,

    #[error("{stage} error: {reason}")]
    Query { stage: QueryStage, reason: String },

    #[error("query exceeded timeout of {}s", .0.as_secs())]
    QueryTimeout(Duration),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("telegram error: {0}")]
    Telegram(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl AppError {
    pub fn connection(stage: ConnectStage, reason: impl fmt::Display) -> Self {
        Self::Connection {
            stage,
            reason: reason.to_string(),
        }
    }

    pub fn query(stage: QueryStage, reason: impl fmt::Display) -> Self {
        Self::Query {
            stage,
            reason: reason.to_string(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::UnsupportedDialect => "UNSUPPORTED_DIALECT",
            Self::Connection { .. } => "CONNECTION_ERROR",
            Self::NoActiveSession => "NO_ACTIVE_SESSION",
            Self::Query { .. } => "QUERY_ERROR",
            Self::QueryTimeout(_) => "QUERY_TIMEOUT",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Telegram(_) => "TELEGRAM_ERROR",
            Self::Http(_) => "HTTP_ERROR",
        }
    }

    /// Text sent back to the chat when a command fails.
    pub fn reply_text(&self) -> String {
        match self {
            Self::UnsupportedDialect => format!("{}.", self),
            Self::Connection { .. } => format!("connect error: {}", self),
            _ => format!("error: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
