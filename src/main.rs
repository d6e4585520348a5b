use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

use account_service::config::Config;
use account_service::db::PgUserStore;
use account_service::routes::build_router;
use account_service::security::{TokenBlacklist, TokenCodec};
use account_service::services::{AuthSessionService, TelegramNotifier};
use account_service::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env().context("Failed to load configuration")?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to Postgres")?;

    let redis_client =
        redis::Client::open(config.redis_url.clone()).context("Invalid Redis URL")?;
    let redis = redis::aio::ConnectionManager::new(redis_client)
        .await
        .context("Failed to connect to Redis")?;

    let codec = Arc::new(TokenCodec::new(
        &config.jwt_secret,
        config.access_token_ttl_secs,
        config.refresh_token_ttl_secs,
    ));
    let blacklist = TokenBlacklist::new(redis);
    let users: Arc<dyn account_service::db::UserStore> = Arc::new(PgUserStore::new(pool));
    let notifier = config
        .telegram_bot_token
        .clone()
        .map(|token| Arc::new(TelegramNotifier::new(token)));

    let auth = Arc::new(AuthSessionService::new(
        users.clone(),
        codec.clone(),
        blacklist.clone(),
        notifier,
    ));

    let state = AppState {
        users,
        codec,
        blacklist,
        auth,
        config: Arc::new(config.clone()),
    };

    let addr = format!("{}:{}", config.server_host, config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Account service listening on {}", addr);

    axum::serve(listener, build_router(state))
        .await
        .context("Server error")?;

    Ok(())
}
