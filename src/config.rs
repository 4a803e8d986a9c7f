use std::{env, path::PathBuf};

/// Fallback signing secret used outside production.
const LOCAL_JWT_SECRET: &str = "local-development-jwt-secret-value";

/// AppConfig
///
/// Holds the application's entire configuration state. It is immutable once loaded
/// and pulled into handlers and extractors through `FromRef<AppState>`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Controls fail-fast secrets and log format.
    pub env: Env,
    // TCP port the HTTP server binds on 0.0.0.0.
    pub port: u16,
    // Shared HS256 secret used to sign and verify bearer tokens.
    pub jwt_secret: String,
    // Lifetime of issued tokens, in seconds.
    pub token_ttl_secs: i64,
    // Which record store backs the API.
    pub backend: StoreBackend,
    // Directory holding products.json and users.json for the JSON backend.
    pub data_dir: PathBuf,
    // Postgres connection string. Only required by the Postgres backend.
    pub db_url: Option<String>,
    // Base URL of the remote catalogue used to seed empty JSON files.
    pub seed_source_url: String,
    // Whether the seeder runs at startup (JSON backend only).
    pub seed_on_start: bool,
}

/// Env
///
/// Runtime context. `Production` demands explicit secrets and switches logs to JSON.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Env {
    Local,
    Production,
}

/// StoreBackend
///
/// Selects the `Repository` implementation assembled in `main`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum StoreBackend {
    Json,
    Postgres,
}

impl Default for AppConfig {
    /// Non-panicking configuration for tests and state scaffolding.
    fn default() -> Self {
        Self {
            env: Env::Local,
            port: 3000,
            jwt_secret: LOCAL_JWT_SECRET.to_string(),
            token_ttl_secs: 3600,
            backend: StoreBackend::Json,
            data_dir: PathBuf::from("json"),
            db_url: None,
            seed_source_url: "https://fakestoreapi.com".to_string(),
            seed_on_start: false,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables (call `dotenv` first).
    ///
    /// # Panics
    /// Panics when a variable required by the selected environment or backend is missing
    /// or unparsable, so the server never starts half-configured.
    pub fn load() -> Self {
        let env = match env::var("APP_ENV").unwrap_or_default().as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        let jwt_secret = match env {
            Env::Production => {
                env::var("JWT_SECRET").expect("FATAL: JWT_SECRET must be set in production.")
            }
            Env::Local => env::var("JWT_SECRET").unwrap_or_else(|_| LOCAL_JWT_SECRET.to_string()),
        };

        let port = env::var("PORT")
            .ok()
            .map(|p| p.parse::<u16>().expect("FATAL: PORT must be a valid port number"))
            .unwrap_or(3000);

        let backend = match env::var("STORE_BACKEND").unwrap_or_default().as_str() {
            "postgres" => StoreBackend::Postgres,
            "" | "json" => StoreBackend::Json,
            other => panic!("FATAL: unknown STORE_BACKEND '{other}' (expected json or postgres)"),
        };

        let db_url = match backend {
            StoreBackend::Postgres => Some(
                env::var("DATABASE_URL")
                    .expect("FATAL: DATABASE_URL required for the postgres backend"),
            ),
            StoreBackend::Json => env::var("DATABASE_URL").ok(),
        };

        let seed_on_start = env::var("SEED_ON_START")
            .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
            .unwrap_or(env == Env::Local);

        Self {
            env,
            port,
            jwt_secret,
            token_ttl_secs: 3600,
            backend,
            data_dir: env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("json")),
            db_url,
            seed_source_url: env::var("SEED_SOURCE_URL")
                .unwrap_or_else(|_| "https://fakestoreapi.com".to_string()),
            seed_on_start,
        }
    }
}
