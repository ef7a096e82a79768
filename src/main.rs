use anyhow::Context;
use eventdesk::{config::Config, db, router, state::AppState};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "eventdesk=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("invalid configuration")?;
    tracing::info!(
        port = config.port,
        display_offset = %config.display_timezone.offset(),
        api_prefix = %config.api_prefix,
        "configuration loaded"
    );

    let connect_options = SqliteConnectOptions::from_str(&config.database_url)
        .context("failed to parse DATABASE_URL")?
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(connect_options)
        .await
        .context("failed to connect to db")?;

    db::init_schema(&pool)
        .await
        .context("failed to create schema")?;
    tracing::info!("database ready");

    let app_state = AppState::new(pool, config.display_timezone);
    let app = router(app_state, &config.api_prefix).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(config.cors_layer()),
    );

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("listening on {}", addr);
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
