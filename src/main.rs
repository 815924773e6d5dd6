mod api;
mod bot;
mod config;
mod db;
mod error;
mod telegram;

use std::future::IntoFuture;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::create_router;
use crate::bot::{run_polling, Dispatcher};
use crate::config::Config;
use crate::db::{DialectSet, SessionManager};
use crate::telegram::TelegramClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "teql=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!("Configuration loaded: {:?}", config);

    // Session engine shared by the bot and the health endpoint
    let sessions = Arc::new(SessionManager::new(
        DialectSet::native(),
        config.connect_timeout,
        config.query_timeout,
    ));

    // Telegram
    let client = TelegramClient::new(&config.telegram_api_url, &config.token, config.poll_timeout)?;
    let me = client.get_me().await?;
    info!(
        "Authorized on account {} (id {})",
        me.username.as_deref().unwrap_or("<unknown>"),
        me.id
    );
    let dispatcher = Arc::new(Dispatcher::new(sessions.clone()));

    // Keep-alive server
    let app = create_router(sessions);
    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on {}", addr);

    tokio::select! {
        result = axum::serve(listener, app).into_future() => result?,
        _ = run_polling(client, dispatcher, config.poll_timeout) => {}
        _ = tokio::signal::ctrl_c() => warn!("Shutdown signal received"),
    }

    Ok(())
}
