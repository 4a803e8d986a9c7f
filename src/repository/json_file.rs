//! Flat-file record store.
//!
//! Each collection is a single pretty-printed JSON array (`products.json`, `users.json`).
//! Every mutation rewrites the whole file: read, decode, mutate in memory, encode, write to a
//! sibling temp file, rename over the original. Mutations of one repository instance are
//! serialized behind `write_lock`, which also makes id allocation race-free.

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use std::path::{Path, PathBuf};
use tokio::{fs, sync::Mutex};

use super::Repository;
use crate::{
    error::{StoreError, StoreResult},
    models::{NewProduct, Product, ProductFilter, ProductPatch, User},
};

const PRODUCTS_FILE: &str = "products.json";
const USERS_FILE: &str = "users.json";

pub struct JsonFileRepository {
    products_path: PathBuf,
    users_path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileRepository {
    /// Creates a repository over `<data_dir>/products.json` and `<data_dir>/users.json`.
    /// Missing files read as empty collections.
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        let dir = data_dir.as_ref();
        Self {
            products_path: dir.join(PRODUCTS_FILE),
            users_path: dir.join(USERS_FILE),
            write_lock: Mutex::new(()),
        }
    }

    pub fn products_path(&self) -> &Path {
        &self.products_path
    }

    pub fn users_path(&self) -> &Path {
        &self.users_path
    }

    /// Ensures the data directory exists.
    pub async fn init(&self) -> StoreResult<()> {
        if let Some(dir) = self.products_path.parent() {
            fs::create_dir_all(dir).await?;
        }
        Ok(())
    }

    /// Writes `products` only if the products file is missing or empty.
    /// Returns whether anything was written.
    pub async fn seed_products(&self, products: Vec<Product>) -> StoreResult<bool> {
        let _guard = self.write_lock.lock().await;
        if !read_collection::<Product>(&self.products_path).await?.is_empty() {
            return Ok(false);
        }
        write_collection(&self.products_path, &products).await?;
        Ok(true)
    }

    /// Writes `users` only if the users file is missing or empty.
    pub async fn seed_users(&self, users: Vec<User>) -> StoreResult<bool> {
        let _guard = self.write_lock.lock().await;
        if !read_collection::<User>(&self.users_path).await?.is_empty() {
            return Ok(false);
        }
        write_collection(&self.users_path, &users).await?;
        Ok(true)
    }

    pub async fn products_empty(&self) -> StoreResult<bool> {
        Ok(read_collection::<Product>(&self.products_path).await?.is_empty())
    }

    pub async fn users_empty(&self) -> StoreResult<bool> {
        Ok(read_collection::<User>(&self.users_path).await?.is_empty())
    }
}

/// Reads a whole collection. A missing or blank file is an empty collection.
async fn read_collection<T: DeserializeOwned>(path: &Path) -> StoreResult<Vec<T>> {
    match fs::read(path).await {
        Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Vec::new()),
        Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e.into()),
    }
}

/// Replaces a whole collection. Readers observe either the old or the new file, never a torn one.
async fn write_collection<T: Serialize>(path: &Path, items: &[T]) -> StoreResult<()> {
    let bytes = serde_json::to_vec_pretty(items)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, bytes).await?;
    fs::rename(&tmp, path).await?;
    Ok(())
}

#[async_trait]
impl Repository for JsonFileRepository {
    async fn list_products(&self, filter: &ProductFilter) -> StoreResult<Vec<Product>> {
        let products = read_collection::<Product>(&self.products_path).await?;
        Ok(products.into_iter().filter(|p| filter.matches(p)).collect())
    }

    async fn create_product(&self, product: NewProduct) -> StoreResult<Product> {
        let _guard = self.write_lock.lock().await;
        let mut products = read_collection::<Product>(&self.products_path).await?;

        // Highest id + 1 stays unique after deletions, unlike length + 1.
        let highest = products.iter().map(|p| p.id).max().unwrap_or(0);
        let next_id = highest
            .checked_add(1)
            .ok_or(StoreError::IdExhausted(highest))?;
        let created = Product::from_new(next_id, product);
        products.push(created.clone());

        write_collection(&self.products_path, &products).await?;
        tracing::debug!(id = next_id, "product appended to {}", self.products_path.display());
        Ok(created)
    }

    async fn update_product(&self, id: i64, patch: ProductPatch) -> StoreResult<Product> {
        let _guard = self.write_lock.lock().await;
        let mut products = read_collection::<Product>(&self.products_path).await?;

        let product = products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("Product {id}")))?;
        patch.apply(product);
        let updated = product.clone();

        write_collection(&self.products_path, &products).await?;
        Ok(updated)
    }

    async fn delete_product(&self, id: i64) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut products = read_collection::<Product>(&self.products_path).await?;

        let index = products
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("Product {id}")))?;
        products.remove(index);

        write_collection(&self.products_path, &products).await
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        read_collection(&self.users_path).await
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let users = read_collection::<User>(&self.users_path).await?;
        Ok(users.into_iter().find(|u| u.email == email))
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let users = read_collection::<User>(&self.users_path).await?;
        Ok(users.into_iter().find(|u| u.username == username))
    }
}
