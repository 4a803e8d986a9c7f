use inventory_api::{
    error::StoreError,
    models::{NewProduct, Product, ProductFilter, ProductPatch, Role, User},
    repository::{JsonFileRepository, PostgresRepository, Repository},
};
use std::sync::Arc;
use tempfile::TempDir;

// --- Test Context and Setup ---

/// A JSON store rooted in a throwaway directory. The directory lives as long as the context.
struct JsonTestContext {
    _dir: TempDir,
    repo: JsonFileRepository,
}

impl JsonTestContext {
    async fn setup() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let repo = JsonFileRepository::new(dir.path());
        repo.init().await.expect("init data dir");
        JsonTestContext { _dir: dir, repo }
    }
}

fn new_product(name: &str, quantity: i64, price: f64) -> NewProduct {
    NewProduct {
        name: name.to_string(),
        description: format!("{name} description"),
        category: "Clothing".to_string(),
        quantity,
        price,
    }
}

fn user(id: i64, email: &str, role: Option<Role>) -> User {
    User {
        id,
        name: format!("User{id}"),
        email: email.to_string(),
        username: format!("user{id}"),
        password: "$argon2id$placeholder".to_string(),
        role,
    }
}

// --- JSON File Backend ---

#[tokio::test]
async fn test_missing_and_blank_files_read_as_empty() {
    let ctx = JsonTestContext::setup().await;
    assert!(ctx.repo.list_products(&ProductFilter::default()).await.unwrap().is_empty());
    assert!(ctx.repo.list_users().await.unwrap().is_empty());

    tokio::fs::write(ctx.repo.products_path(), "  \n").await.unwrap();
    assert!(ctx.repo.products_empty().await.unwrap());
}

#[tokio::test]
async fn test_create_assigns_max_plus_one_after_delete() {
    let ctx = JsonTestContext::setup().await;
    let a = ctx.repo.create_product(new_product("Alpha", 1, 1.0)).await.unwrap();
    let b = ctx.repo.create_product(new_product("Beta", 2, 2.0)).await.unwrap();
    let c = ctx.repo.create_product(new_product("Gamma", 3, 3.0)).await.unwrap();
    assert_eq!((a.id, b.id, c.id), (1, 2, 3));

    // Deleting a middle record must not let the next id collide with the last one.
    ctx.repo.delete_product(b.id).await.unwrap();
    let d = ctx.repo.create_product(new_product("Delta", 4, 4.0)).await.unwrap();
    assert_eq!(d.id, 4);

    let ids: Vec<i64> = ctx
        .repo
        .list_products(&ProductFilter::default())
        .await
        .unwrap()
        .iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(ids, vec![1, 3, 4]);
}

#[tokio::test]
async fn test_created_product_is_persisted_to_disk() {
    let ctx = JsonTestContext::setup().await;
    let created = ctx
        .repo
        .create_product(new_product("Gold Sweater", 2, 59.99))
        .await
        .unwrap();

    let raw = tokio::fs::read(ctx.repo.products_path()).await.unwrap();
    let on_disk: Vec<Product> = serde_json::from_slice(&raw).unwrap();
    assert_eq!(on_disk, vec![created]);
}

#[tokio::test]
async fn test_concurrent_creates_get_unique_ids() {
    let ctx = JsonTestContext::setup().await;
    let repo = Arc::new(ctx.repo);

    let handles: Vec<_> = (0..20)
        .map(|i| {
            let repo = repo.clone();
            tokio::spawn(async move {
                repo.create_product(new_product("Concurrent", i, 1.0))
                    .await
                    .unwrap()
                    .id
            })
        })
        .collect();

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap());
    }
    ids.sort_unstable();
    assert_eq!(ids, (1..=20).collect::<Vec<i64>>());

    let stored = repo.list_products(&ProductFilter::default()).await.unwrap();
    assert_eq!(stored.len(), 20);
}

#[tokio::test]
async fn test_update_overwrites_only_supplied_fields() {
    let ctx = JsonTestContext::setup().await;
    let created = ctx
        .repo
        .create_product(new_product("Gold Sweater", 5, 59.99))
        .await
        .unwrap();

    let updated = ctx
        .repo
        .update_product(
            created.id,
            ProductPatch {
                quantity: Some(0),
                category: Some(String::new()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.quantity, 0);
    assert_eq!(updated.category, "");
    assert_eq!(updated.name, created.name);
    assert_eq!(updated.price, created.price);

    let listed = ctx.repo.list_products(&ProductFilter::default()).await.unwrap();
    assert_eq!(listed, vec![updated]);
}

#[tokio::test]
async fn test_missing_targets_are_not_found() {
    let ctx = JsonTestContext::setup().await;
    ctx.repo.create_product(new_product("Alpha", 1, 1.0)).await.unwrap();

    let update = ctx.repo.update_product(99, ProductPatch::default()).await;
    assert!(matches!(update, Err(StoreError::NotFound(_))));

    let delete = ctx.repo.delete_product(99).await;
    assert!(matches!(delete, Err(StoreError::NotFound(_))));

    // Failed mutations leave the store untouched.
    assert_eq!(
        ctx.repo.list_products(&ProductFilter::default()).await.unwrap().len(),
        1
    );
}

#[tokio::test]
async fn test_filters_combine_inclusively() {
    let ctx = JsonTestContext::setup().await;
    ctx.repo.create_product(new_product("Cheap", 0, 5.0)).await.unwrap();
    ctx.repo.create_product(new_product("Middle", 10, 50.0)).await.unwrap();
    ctx.repo.create_product(new_product("Pricey", 100, 500.0)).await.unwrap();

    let filter = ProductFilter {
        min_price: Some(5.0),
        max_price: Some(50.0),
        min_stock: Some(10),
        ..Default::default()
    };
    let names: Vec<String> = ctx
        .repo
        .list_products(&filter)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(names, vec!["Middle"]);

    let out_of_stock = ProductFilter {
        max_stock: Some(0),
        ..Default::default()
    };
    assert_eq!(ctx.repo.list_products(&out_of_stock).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_create_refuses_to_wrap_past_max_id() {
    let ctx = JsonTestContext::setup().await;
    let last = Product {
        id: i64::MAX,
        name: "Last".into(),
        ..Default::default()
    };
    assert!(ctx.repo.seed_products(vec![last.clone()]).await.unwrap());

    let result = ctx.repo.create_product(new_product("Overflow", 1, 1.0)).await;
    assert!(matches!(result, Err(StoreError::IdExhausted(i64::MAX))));

    // Nothing was appended.
    assert_eq!(
        ctx.repo.list_products(&ProductFilter::default()).await.unwrap(),
        vec![last]
    );
}

#[tokio::test]
async fn test_corrupt_file_is_a_store_fault() {
    let ctx = JsonTestContext::setup().await;
    tokio::fs::write(ctx.repo.products_path(), "{not json").await.unwrap();

    let result = ctx.repo.list_products(&ProductFilter::default()).await;
    assert!(matches!(result, Err(StoreError::Json(_))));
}

#[tokio::test]
async fn test_user_lookups_and_seed_guard() {
    let ctx = JsonTestContext::setup().await;
    let users = vec![
        user(1, "ana@email.com", Some(Role::Manager)),
        user(2, "bob@email.com", None),
    ];
    assert!(ctx.repo.seed_users(users.clone()).await.unwrap());
    // A populated file is never overwritten.
    assert!(!ctx.repo.seed_users(vec![user(9, "x@email.com", None)]).await.unwrap());

    assert_eq!(ctx.repo.list_users().await.unwrap(), users);

    let ana = ctx.repo.find_user_by_email("ana@email.com").await.unwrap();
    assert_eq!(ana.map(|u| u.id), Some(1));
    // Email match is exact.
    assert!(ctx.repo.find_user_by_email("ANA@email.com").await.unwrap().is_none());

    let bob = ctx.repo.find_user_by_username("user2").await.unwrap();
    assert_eq!(bob.and_then(|u| u.role), None);
}

// --- Postgres Backend (needs DATABASE_URL) ---

async fn pg_repository() -> PostgresRepository {
    dotenv::dotenv().ok();
    let db_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set to run integration tests");
    let pool = sqlx::PgPool::connect(&db_url)
        .await
        .expect("Failed to connect to database for integration tests.");
    let repo = PostgresRepository::new(pool);
    repo.migrate().await.expect("Failed to run database migrations.");
    repo
}

#[tokio::test]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn test_pg_product_lifecycle() {
    let repo = pg_repository().await;

    let created = repo
        .create_product(new_product("Postgres Sweater", 7, 19.5))
        .await
        .unwrap();
    assert!(created.id > 0);

    let updated = repo
        .update_product(
            created.id,
            ProductPatch {
                quantity: Some(0),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.quantity, 0);
    assert_eq!(updated.name, "Postgres Sweater");

    let filter = ProductFilter {
        min_price: Some(19.5),
        max_price: Some(19.5),
        max_stock: Some(0),
        ..Default::default()
    };
    let found = repo.list_products(&filter).await.unwrap();
    assert!(found.iter().any(|p| p.id == created.id));

    repo.delete_product(created.id).await.unwrap();
    assert!(matches!(
        repo.delete_product(created.id).await,
        Err(StoreError::NotFound(_))
    ));
    assert!(matches!(
        repo.update_product(created.id, ProductPatch::default()).await,
        Err(StoreError::NotFound(_))
    ));
}

#[tokio::test]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn test_pg_user_lookup() {
    let repo = pg_repository().await;
    let id = 900_001_i64;

    sqlx::query(
        "INSERT INTO users (id, name, email, username, password, role) \
         VALUES ($1, 'Pg User', 'pg.user@email.com', 'pguser', 'hash', 'gestionnaire') \
         ON CONFLICT (id) DO NOTHING",
    )
    .bind(id)
    .execute(&pg_pool().await)
    .await
    .unwrap();

    let found = repo
        .find_user_by_email("pg.user@email.com")
        .await
        .unwrap()
        .expect("seeded user");
    assert_eq!(found.id, id);
    assert_eq!(found.role, Some(Role::Manager));
    assert!(repo.find_user_by_username("pguser").await.unwrap().is_some());
}

async fn pg_pool() -> sqlx::PgPool {
    let db_url = std::env::var("DATABASE_URL").expect("DATABASE_URL");
    sqlx::PgPool::connect(&db_url).await.expect("connect")
}
