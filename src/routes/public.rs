use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints reachable without a token. A token, when sent, is ignored here.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for load balancers and compose healthchecks.
        .route("/health", get(|| async { "ok" }))
        // GET /products?minPrice=&maxPrice=&minStock=&maxStock=
        // Lists products; each bound is optional and inclusive.
        .route("/products", get(handlers::get_products))
        // GET /users
        .route("/users", get(handlers::get_users))
        // POST /users/login
        // Exchanges email + password for a one-hour bearer token.
        .route("/users/login", post(handlers::login))
}
