use std::sync::Arc;

use auth::Authenticator;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use user_api::config::Config;
use user_api::config::StorageBackend;
use user_api::domain::user::service::UserService;
use user_api::inbound::http::router::create_router;
use user_api::outbound::repositories::InMemoryUserRepository;
use user_api::outbound::repositories::PostgresUserRepository;
use user_api::user::ports::UserServicePort;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "user_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "user-api",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        storage = ?config.storage.backend,
        access_token_ttl_minutes = config.jwt.access_token_ttl_minutes,
        "Configuration loaded"
    );

    // An unusable signing key or hash cost is fatal: no authenticated route could be served.
    let authenticator = Arc::new(
        Authenticator::new(config.jwt.secret.as_bytes(), (&config.password).into()).map_err(
            |e| {
                tracing::error!(error = %e, "Invalid authentication configuration");
                e
            },
        )?,
    );

    let user_service: Arc<dyn UserServicePort> = match config.storage.backend {
        StorageBackend::Postgres => {
            let pg_pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .connect(&config.database.url)
                .await?;
            tracing::info!(
                max_connections = config.database.max_connections,
                database = "postgresql",
                "Database connection pool created"
            );

            sqlx::migrate!("./migrations").run(&pg_pool).await?;
            tracing::info!(database = "postgresql", "Database migrations completed");

            Arc::new(UserService::new(
                Arc::new(PostgresUserRepository::new(pg_pool)),
                Arc::clone(&authenticator),
                config.jwt.access_token_ttl(),
            ))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory user storage; data is lost on shutdown");

            Arc::new(UserService::new(
                Arc::new(InMemoryUserRepository::new()),
                Arc::clone(&authenticator),
                config.jwt.access_token_ttl(),
            ))
        }
    };

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(user_service, authenticator);

    if let Err(e) = axum::serve(http_listener, http_application).await {
        tracing::error!(error = %e, "Server error");
        return Err(e.into());
    }

    tracing::info!("Server exited successfully");
    Ok(())
}
