//! Startup seeding of the JSON file store from a remote catalogue (fakestoreapi-compatible).
//!
//! Only empty or missing files are filled. Seeding is best effort: every failure is logged
//! and startup continues with whatever the store already holds.

use rand::Rng;
use serde::Deserialize;
use thiserror::Error;

use crate::{
    error::StoreError,
    models::{Product, Role, User},
    repository::JsonFileRepository,
    security::{self, PasswordError},
};

/// Seeded quantities are drawn from `0..MAX_SEED_QUANTITY`.
const MAX_SEED_QUANTITY: u32 = 100;
/// Percentage of seeded users that become managers.
const MANAGER_PERCENT: u32 = 20;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("remote catalogue request failed: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Password(#[from] PasswordError),
    #[error("hashing task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

// --- Remote Shapes ---

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteProduct {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    pub price: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteName {
    pub firstname: String,
    pub lastname: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteUser {
    pub id: i64,
    pub name: RemoteName,
    pub email: String,
    pub username: String,
    pub password: String,
}

// --- Mapping ---

/// Maps a remote product onto a stored one. The remote catalogue has no stock count, so the
/// caller supplies it.
pub fn product_from_remote(remote: RemoteProduct, quantity: i64) -> Product {
    Product {
        id: remote.id,
        name: remote.title,
        description: remote.description,
        category: remote.category,
        quantity,
        price: remote.price,
    }
}

/// Maps a remote user onto a stored one. `password_hash` must already be a PHC hash.
pub fn user_from_remote(remote: RemoteUser, password_hash: String, role: Role) -> User {
    User {
        id: remote.id,
        name: format!("{}{}", remote.name.firstname, remote.name.lastname),
        email: remote.email,
        username: remote.username,
        password: password_hash,
        role: Some(role),
    }
}

/// `manager` for rolls under `MANAGER_PERCENT`, `employee` otherwise.
pub fn role_for_roll(roll: u32) -> Role {
    if roll < MANAGER_PERCENT {
        Role::Manager
    } else {
        Role::Employee
    }
}

/// Uniform draw in `0..bound`.
fn random_below(bound: u32) -> u32 {
    rand::thread_rng().gen_range(0..bound)
}

// --- Seeding ---

/// Fetches products and fills `products.json` if it is empty. Returns how many were written.
pub async fn seed_products(
    client: &reqwest::Client,
    base_url: &str,
    repo: &JsonFileRepository,
) -> Result<usize, SeedError> {
    if !repo.products_empty().await? {
        return Ok(0);
    }

    let remote: Vec<RemoteProduct> = client
        .get(format!("{}/products", base_url.trim_end_matches('/')))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    let products: Vec<Product> = remote
        .into_iter()
        .map(|p| product_from_remote(p, i64::from(random_below(MAX_SEED_QUANTITY))))
        .collect();

    let count = products.len();
    Ok(if repo.seed_products(products).await? { count } else { 0 })
}

/// Fetches users, hashes their passwords and fills `users.json` if it is empty.
pub async fn seed_users(
    client: &reqwest::Client,
    base_url: &str,
    repo: &JsonFileRepository,
) -> Result<usize, SeedError> {
    if !repo.users_empty().await? {
        return Ok(0);
    }

    let remote: Vec<RemoteUser> = client
        .get(format!("{}/users", base_url.trim_end_matches('/')))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    // Argon2 is CPU-bound; hash the whole batch on the blocking pool.
    let users = tokio::task::spawn_blocking(move || {
        remote
            .into_iter()
            .map(|u| -> Result<User, SeedError> {
                let hash = security::hash_password(&u.password)?;
                let role = role_for_roll(random_below(100));
                Ok(user_from_remote(u, hash, role))
            })
            .collect::<Result<Vec<_>, _>>()
    })
    .await??;

    let count = users.len();
    Ok(if repo.seed_users(users).await? { count } else { 0 })
}

/// Runs both seeders, logging the outcome of each. Never fails.
pub async fn run(base_url: &str, repo: &JsonFileRepository) {
    let client = reqwest::Client::new();

    match seed_products(&client, base_url, repo).await {
        Ok(0) => tracing::info!("Seed: products.json already populated"),
        Ok(n) => tracing::info!(count = n, "Seed: products.json populated"),
        Err(e) => tracing::error!("Seed: products failed ({e})"),
    }

    match seed_users(&client, base_url, repo).await {
        Ok(0) => tracing::info!("Seed: users.json already populated"),
        Ok(n) => tracing::info!(count = n, "Seed: users.json populated"),
        Err(e) => tracing::error!("Seed: users failed ({e})"),
    }
}
