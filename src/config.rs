use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use crate::error::{AppError, Result};

#[derive(Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,

    // Telegram
    pub token: String,
    pub telegram_api_url: String,
    pub poll_timeout: Duration,

    // Database
    pub connect_timeout: Duration,
    pub query_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secs = |key: &str, default: u64| {
            Duration::from_secs(
                lookup(key)
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(default),
            )
        };

        let token = lookup("TOKEN")
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| AppError::Config("missing token environment variable".to_string()))?;

        Ok(Self {
            host: lookup("HOST")
                .and_then(|s| IpAddr::from_str(&s).ok())
                .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED)),
            port: lookup("PORT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(8080),

            token,
            telegram_api_url: lookup("TELEGRAM_API_URL")
                .map(|s| s.trim_end_matches('/').to_string())
                .unwrap_or_else(|| "https://api.telegram.org".to_string()),
            poll_timeout: secs("POLL_TIMEOUT_SECS", 60),

            connect_timeout: secs("CONNECT_TIMEOUT_SECS", 15),
            query_timeout: secs("QUERY_TIMEOUT_SECS", 60),
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// The bot token is a credential; keep it out of startup logs.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("token", &"<redacted>")
            .field("telegram_api_url", &self.telegram_api_url)
            .field("poll_timeout", &self.poll_timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("query_timeout", &self.query_timeout)
            .finish()
    }
}
