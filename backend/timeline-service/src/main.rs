use actix_web::{web, App, HttpServer};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use timeline_service::auth::JwtKeys;
use timeline_service::cache::SnapshotCache;
use timeline_service::handlers::{self, AppState};
use timeline_service::store::PgDataStore;
use timeline_service::Config;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let store = Arc::new(PgDataStore::new(pool));
    let cache = Arc::new(SnapshotCache::new(Duration::from_secs(
        config.cache.snapshot_ttl_secs,
    )));
    let state = web::Data::new(AppState::new(store, cache));
    let jwt_keys = web::Data::new(JwtKeys::from_secret(&config.auth.jwt_secret));

    tracing::info!(
        host = %config.app.host,
        port = config.app.http_port,
        env = %config.app.env,
        "starting timeline-service"
    );

    HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(state.clone())
            .app_data(jwt_keys.clone())
            .configure(handlers::routes)
    })
    .bind((config.app.host.as_str(), config.app.http_port))?
    .run()
    .await?;

    Ok(())
}
