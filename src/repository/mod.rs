use crate::{
    error::StoreResult,
    models::{NewProduct, Product, ProductFilter, ProductPatch, User},
};
use async_trait::async_trait;
use std::sync::Arc;

pub mod json_file;
pub mod postgres;

pub use json_file::JsonFileRepository;
pub use postgres::PostgresRepository;

/// Repository Trait
///
/// The record store contract. Handlers and the auth service only see this trait, so the
/// JSON-file and Postgres backends are interchangeable and report the same errors
/// (`StoreError::NotFound` for a missing target, other variants for store faults).
///
/// **Send + Sync + async_trait** make `Arc<dyn Repository>` shareable across Axum's tasks.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Products ---
    /// All products matching `filter`, in storage order.
    async fn list_products(&self, filter: &ProductFilter) -> StoreResult<Vec<Product>>;
    /// Persists a validated product under a freshly assigned, unique id.
    async fn create_product(&self, product: NewProduct) -> StoreResult<Product>;
    /// Overwrites the supplied fields of product `id` and returns the result.
    async fn update_product(&self, id: i64, patch: ProductPatch) -> StoreResult<Product>;
    async fn delete_product(&self, id: i64) -> StoreResult<()>;

    // --- Users (read-only) ---
    async fn list_users(&self) -> StoreResult<Vec<User>>;
    /// Exact, case-sensitive email match.
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;
}

/// RepositoryState
///
/// The concrete type used to share the record store across the application state.
pub type RepositoryState = Arc<dyn Repository>;
