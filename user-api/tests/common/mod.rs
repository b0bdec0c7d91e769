use std::sync::Arc;

use auth::Authenticator;
use auth::HashCost;
use auth::JwtHandler;
use chrono::Duration;
use serde_json::json;
use sqlx::postgres::PgConnectOptions;
use sqlx::postgres::PgPoolOptions;
use sqlx::Connection;
use sqlx::Executor;
use sqlx::PgConnection;
use sqlx::PgPool;
use user_api::domain::user::service::UserService;
use user_api::inbound::http::router::create_router;
use user_api::outbound::repositories::InMemoryUserRepository;
use user_api::user::ports::UserRepository;

pub const TEST_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";

/// Test application that spawns a real server
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub api_client: reqwest::Client,
    pub jwt_handler: JwtHandler,
}

/// Test database helper
pub struct TestDb {
    pub pool: PgPool,
    pub db_name: String,
}

impl TestApp {
    /// Spawn the application backed by in-memory storage
    pub async fn spawn() -> Self {
        Self::spawn_with_repository(Arc::new(InMemoryUserRepository::new())).await
    }

    /// Spawn the application in a background task and return TestApp
    pub async fn spawn_with_repository<R: UserRepository>(repository: Arc<R>) -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        // Minimal hashing cost keeps the suite fast
        let authenticator = Arc::new(
            Authenticator::new(TEST_SECRET, HashCost::new(1024, 1, 1))
                .expect("Failed to create authenticator"),
        );

        let user_service = Arc::new(UserService::new(
            repository,
            Arc::clone(&authenticator),
            Duration::hours(1),
        ));

        let router = create_router(user_service, authenticator);

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            port,
            api_client: reqwest::Client::builder()
                .cookie_store(true)
                .build()
                .expect("Failed to create reqwest client"),
            jwt_handler: JwtHandler::new(TEST_SECRET).expect("Failed to create JWT handler"),
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(&format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(&format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Helper to make PATCH request with Bearer token
    pub fn patch_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.api_client
            .patch(&format!("{}{}", self.address, path))
            .bearer_auth(token)
    }

    /// Register a user with a derived email and placeholder names
    pub async fn create_user(&self, user_name: &str, password: &str) -> reqwest::Response {
        self.post("/users")
            .json(&json!({
                "user_name": user_name,
                "email": format!("{}@example.com", user_name),
                "password": password,
                "first_name": "Test",
                "last_name": "User"
            }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Log in and return the issued access token
    pub async fn login(&self, user_name: &str, password: &str) -> String {
        let response = self
            .post("/login")
            .json(&json!({ "user_name": user_name, "password": password }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), reqwest::StatusCode::OK);

        let body: serde_json::Value = response.json().await.expect("Failed to parse response");
        body["data"]["access_token"]
            .as_str()
            .expect("access_token missing")
            .to_string()
    }
}

impl TestDb {
    /// Create a new test database with a unique name.
    ///
    /// Returns `None` when `DATABASE_URL` is not set so Postgres-backed tests
    /// can be skipped on machines without a database.
    pub async fn new() -> Option<Self> {
        let postgres_url = std::env::var("DATABASE_URL").ok()?;

        let db_name = format!(
            "test_user_api_{}_{}",
            std::process::id(),
            chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
        );

        let mut conn = PgConnection::connect(&postgres_url)
            .await
            .expect("Failed to connect to Postgres");

        // Create test database
        conn.execute(format!(r#"CREATE DATABASE "{}";"#, db_name).as_str())
            .await
            .expect("Failed to create test database");

        // Connect to the new test database
        let options = postgres_url
            .parse::<PgConnectOptions>()
            .expect("Failed to parse DATABASE_URL")
            .database(&db_name);

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .expect("Failed to connect to test database");

        // Run migrations
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        Some(Self { pool, db_name })
    }
}

impl Drop for TestDb {
    fn drop(&mut self) {
        // Database cleanup happens asynchronously
        let db_name = self.db_name.clone();
        tokio::spawn(async move {
            let Ok(postgres_url) = std::env::var("DATABASE_URL") else {
                return;
            };

            if let Ok(mut conn) = PgConnection::connect(&postgres_url).await {
                let _ = conn
                    .execute(
                        format!(
                            r#"SELECT pg_terminate_backend(pid) FROM pg_stat_activity WHERE datname = '{}';"#,
                            db_name
                        )
                        .as_str(),
                    )
                    .await;

                let _ = conn
                    .execute(format!(r#"DROP DATABASE IF EXISTS "{}";"#, db_name).as_str())
                    .await;
            }
        });
    }
}
