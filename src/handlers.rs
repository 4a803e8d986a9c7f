use crate::{
    AppState,
    auth::{self, AuthUser},
    error::{AppError, ValidationError},
    models::{
        LoginRequest, MessageResponse, Product, ProductFilter, ProductPayload, TokenResponse, User,
    },
    validation,
};
use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
};

// --- Extraction Helpers ---

// Axum's own rejections are folded into the validation taxonomy so every 400 has the same body.

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ValidationError::Malformed(rejection.body_text()).into())
}

fn path_id(id: Result<Path<i64>, PathRejection>) -> Result<i64, AppError> {
    id.map(|Path(id)| id)
        .map_err(|rejection| ValidationError::Malformed(rejection.body_text()).into())
}

fn warn_validation(op: &str, err: &ValidationError) {
    tracing::warn!(field = ?err.field(), "{op}: invalid request ({err})");
}

// --- Handlers ---

/// get_products
///
/// [Public Route] Lists products, optionally narrowed by inclusive price and stock bounds.
#[utoipa::path(
    get,
    path = "/products",
    params(ProductFilter),
    responses(
        (status = 200, description = "Matching products", body = [Product]),
        (status = 400, description = "Invalid filter", body = MessageResponse)
    )
)]
pub async fn get_products(
    State(state): State<AppState>,
    filter: Result<Query<ProductFilter>, QueryRejection>,
) -> Result<Json<Vec<Product>>, AppError> {
    let Query(filter) = filter.map_err(|rejection| {
        let err = ValidationError::Malformed(rejection.body_text());
        warn_validation("GET Products", &err);
        AppError::from(err)
    })?;

    let products = state.repo.list_products(&filter).await?;
    tracing::info!(count = products.len(), "GET Products: success");
    Ok(Json(products))
}

/// add_product
///
/// [Manager Route] Validates and stores a new product. The store assigns the id and the
/// persisted record is returned.
#[utoipa::path(
    post,
    path = "/products",
    request_body = ProductPayload,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Product created", body = Product),
        (status = 400, description = "Invalid product", body = MessageResponse),
        (status = 401, description = "Missing or invalid token", body = MessageResponse),
        (status = 403, description = "Not a manager", body = MessageResponse)
    )
)]
pub async fn add_product(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
    payload: Result<Json<ProductPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<Product>), AppError> {
    let new = json_body(payload)
        .and_then(|p| validation::validate_new_product(p).map_err(AppError::from))
        .inspect_err(|e| {
            if let AppError::Validation(v) = e {
                warn_validation("POST Products", v);
            }
        })?;

    let product = state.repo.create_product(new).await?;
    tracing::info!(id = product.id, by = claims.id, "POST Products: success");
    Ok((StatusCode::CREATED, Json(product)))
}

/// modify_product
///
/// [Manager Route] Partially updates a product. Supplied fields overwrite, absent fields are
/// kept; a supplied `0` or `""` is a real value.
#[utoipa::path(
    put,
    path = "/products/{id}",
    params(("id" = i64, Path, description = "Product ID")),
    request_body = ProductPayload,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Product updated", body = Product),
        (status = 400, description = "Invalid product", body = MessageResponse),
        (status = 401, description = "Missing or invalid token", body = MessageResponse),
        (status = 403, description = "Not a manager", body = MessageResponse),
        (status = 404, description = "Product not found", body = MessageResponse)
    )
)]
pub async fn modify_product(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<ProductPayload>, JsonRejection>,
) -> Result<Json<Product>, AppError> {
    let id = path_id(id)?;
    let patch = json_body(payload)
        .and_then(|p| validation::validate_product_patch(p).map_err(AppError::from))
        .inspect_err(|e| {
            if let AppError::Validation(v) = e {
                warn_validation("PUT Products", v);
            }
        })?;

    let product = state
        .repo
        .update_product(id, patch)
        .await
        .map_err(AppError::from)
        .inspect_err(|e| {
            if let AppError::NotFound(_) = e {
                tracing::warn!(id, "PUT Products: product not found");
            }
        })?;
    tracing::info!(id, by = claims.id, "PUT Products: success");
    Ok(Json(product))
}

/// delete_product
///
/// [Manager Route] Removes a product by id.
#[utoipa::path(
    delete,
    path = "/products/{id}",
    params(("id" = i64, Path, description = "Product ID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Product deleted", body = MessageResponse),
        (status = 401, description = "Missing or invalid token", body = MessageResponse),
        (status = 403, description = "Not a manager", body = MessageResponse),
        (status = 404, description = "Product not found", body = MessageResponse)
    )
)]
pub async fn delete_product(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = path_id(id)?;
    state
        .repo
        .delete_product(id)
        .await
        .map_err(AppError::from)
        .inspect_err(|e| {
            if let AppError::NotFound(_) = e {
                tracing::warn!(id, "DELETE Products: product not found");
            }
        })?;
    tracing::info!(id, by = claims.id, "DELETE Products: success");
    Ok(Json(MessageResponse::new("Product deleted successfully")))
}

/// get_users
///
/// [Public Route] Lists every user, password hashes included.
#[utoipa::path(
    get,
    path = "/users",
    responses((status = 200, description = "All users", body = [User]))
)]
pub async fn get_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, AppError> {
    let users = state.repo.list_users().await?;
    tracing::info!(count = users.len(), "GET Users: success");
    Ok(Json(users))
}

/// login
///
/// [Public Route] Exchanges email and password for a bearer token valid for one hour.
/// The email format is checked before the store is queried.
#[utoipa::path(
    post,
    path = "/users/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login succeeded", body = TokenResponse),
        (status = 400, description = "Missing credentials or invalid email format", body = MessageResponse),
        (status = 401, description = "Incorrect email or password", body = MessageResponse),
        (status = 500, description = "Server error", body = MessageResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, AppError> {
    let request = json_body(payload)?;

    let (Some(email), Some(password)) = (
        request.email.filter(|e| !e.is_empty()),
        request.password.filter(|p| !p.is_empty()),
    ) else {
        warn_validation("POST Auth", &ValidationError::MissingCredentials);
        return Err(ValidationError::MissingCredentials.into());
    };

    validation::validate_email(&email).inspect_err(|e| warn_validation("POST Auth", e))?;

    match auth::login(state.repo.as_ref(), &state.config, &email, &password).await? {
        Some(token) => {
            tracing::info!("POST Auth: success");
            Ok(Json(TokenResponse { token }))
        }
        None => {
            tracing::warn!("POST Auth: incorrect email or password");
            Err(AppError::InvalidCredentials)
        }
    }
}
