use actix_web::{web, App, HttpServer};
use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use yatube_service::cache::{FeedCache, FeedCacheStore, MemoryFeedCacheStore, RedisFeedCacheStore};
use yatube_service::db::{self, ContentStore, MemoryContentStore, PgContentStore};
use yatube_service::handlers::{self, AppState};
use yatube_service::middleware::JwtKeys;
use yatube_service::Config;

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,actix_web=info,sqlx=warn".into());

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn build_store(config: &Config) -> anyhow::Result<Arc<dyn ContentStore>> {
    match &config.database.url {
        Some(url) => {
            let pool = db::create_pool(url, &config.database)
                .await
                .context("Failed to connect to PostgreSQL")?;
            db::run_migrations(&pool)
                .await
                .context("Failed to run database migrations")?;
            tracing::info!("Content store: PostgreSQL");
            Ok(Arc::new(PgContentStore::new(pool)))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; content is kept in memory and lost on restart");
            Ok(Arc::new(MemoryContentStore::new()))
        }
    }
}

async fn build_cache_store(config: &Config) -> Arc<dyn FeedCacheStore> {
    match &config.cache.url {
        Some(url) => match RedisFeedCacheStore::connect(url).await {
            Ok(store) => {
                tracing::info!("Feed cache: Redis");
                Arc::new(store)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Redis unavailable; falling back to in-process feed cache");
                Arc::new(MemoryFeedCacheStore::new())
            }
        },
        None => {
            tracing::info!("Feed cache: in-process");
            Arc::new(MemoryFeedCacheStore::new())
        }
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = Config::from_env().context("Failed to load configuration")?;

    tracing::info!("Starting yatube-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    let store = build_store(&config).await?;
    let feed_cache = FeedCache::new(build_cache_store(&config).await, &config.feed);
    tracing::info!(
        key = %feed_cache.key(),
        ttl_secs = feed_cache.ttl().as_secs(),
        enabled = feed_cache.is_enabled(),
        page_size = config.feed.page_size,
        "Feed settings"
    );

    if config.admin.token.is_none() {
        tracing::warn!("ADMIN_TOKEN not set; /internal endpoints are unauthenticated");
    }

    let state = web::Data::new(AppState::new(store, feed_cache, &config.feed));
    let keys = web::Data::new(JwtKeys::from_config(&config.auth));
    let admin_token = config.admin.token.clone();

    let bind_address = (config.app.host.clone(), config.app.port);
    tracing::info!("Listening on {}:{}", bind_address.0, bind_address.1);

    HttpServer::new(move || {
        let admin_token = admin_token.clone();
        App::new()
            .app_data(state.clone())
            .app_data(keys.clone())
            .wrap(tracing_actix_web::TracingLogger::default())
            .configure(|cfg| handlers::configure(cfg, admin_token))
    })
    .bind(bind_address)
    .context("Failed to bind HTTP listener")?
    .run()
    .await
    .context("HTTP server error")?;

    Ok(())
}
