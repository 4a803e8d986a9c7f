use async_trait::async_trait;
use sqlx::{FromRow, PgPool, query_builder::QueryBuilder};

use super::Repository;
use crate::{
    error::{StoreError, StoreResult},
    models::{NewProduct, Product, ProductFilter, ProductPatch, Role, User},
};

const PRODUCT_COLUMNS: &str = "id, name, description, category, quantity, price";
const USER_COLUMNS: &str = "id, name, email, username, password, role";

/// PostgresRepository
///
/// The database-backed implementation of the `Repository` trait. Each operation is a single
/// statement; ids come from the `products.id` BIGSERIAL, so concurrent creates never collide.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the bundled schema migrations.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

/// Raw `users` row. `role` is free text in the table and parsed on the way out; unknown
/// values read as "no role".
#[derive(FromRow)]
struct UserRow {
    id: i64,
    name: String,
    email: String,
    username: String,
    password: String,
    role: Option<String>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            name: row.name,
            email: row.email,
            username: row.username,
            password: row.password,
            role: row.role.as_deref().and_then(Role::parse),
        }
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    /// list_products
    ///
    /// Composes the optional bounds with QueryBuilder so every value is a bound parameter.
    async fn list_products(&self, filter: &ProductFilter) -> StoreResult<Vec<Product>> {
        let mut builder: QueryBuilder<sqlx::Postgres> =
            QueryBuilder::new(format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE TRUE"));

        if let Some(min) = filter.min_price {
            builder.push(" AND price >= ").push_bind(min);
        }
        if let Some(max) = filter.max_price {
            builder.push(" AND price <= ").push_bind(max);
        }
        if let Some(min) = filter.min_stock {
            builder.push(" AND quantity >= ").push_bind(min);
        }
        if let Some(max) = filter.max_stock {
            builder.push(" AND quantity <= ").push_bind(max);
        }
        builder.push(" ORDER BY id");

        let products = builder
            .build_query_as::<Product>()
            .fetch_all(&self.pool)
            .await?;
        Ok(products)
    }

    async fn create_product(&self, product: NewProduct) -> StoreResult<Product> {
        let created = sqlx::query_as::<_, Product>(&format!(
            "INSERT INTO products (name, description, category, quantity, price) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(product.name)
        .bind(product.description)
        .bind(product.category)
        .bind(product.quantity)
        .bind(product.price)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    /// update_product
    ///
    /// `COALESCE` keeps the stored column whenever the patch field is `None`, so a supplied
    /// zero or empty string is written like any other value.
    async fn update_product(&self, id: i64, patch: ProductPatch) -> StoreResult<Product> {
        sqlx::query_as::<_, Product>(&format!(
            "UPDATE products \
             SET name = COALESCE($2, name), \
                 description = COALESCE($3, description), \
                 category = COALESCE($4, category), \
                 quantity = COALESCE($5, quantity), \
                 price = COALESCE($6, price) \
             WHERE id = $1 \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id)
        .bind(patch.name)
        .bind(patch.description)
        .bind(patch.category)
        .bind(patch.quantity)
        .bind(patch.price)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("Product {id}")))
    }

    async fn delete_product(&self, id: i64) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("Product {id}")));
        }
        Ok(())
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1 LIMIT 1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(User::from))
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1 LIMIT 1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(User::from))
    }
}
