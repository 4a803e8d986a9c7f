use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{post, put},
};

/// Manager Router Module
///
/// Catalogue mutations. Every route here requires a valid token (401 otherwise) whose role
/// is `manager` (403 otherwise); both checks are layered on by `create_router`.
pub fn manager_routes() -> Router<AppState> {
    Router::new()
        // POST /products
        // Creates a product; the store assigns the id.
        .route("/products", post(handlers::add_product))
        // PUT/DELETE /products/{id}
        // Partial update by field presence, or removal.
        .route(
            "/products/{id}",
            put(handlers::modify_product).delete(handlers::delete_product),
        )
}
