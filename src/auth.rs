use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};

use crate::{
    config::AppConfig,
    error::AppError,
    models::{Role, User},
    repository::Repository,
    security,
};

/// Allow-list for product mutations.
pub const MANAGER_ONLY: &[Role] = &[Role::Manager];

/// Claims
///
/// The payload signed into every bearer token. Rebuilt from the token on each request and
/// never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Id of the user the token was issued to.
    pub id: i64,
    /// Role at issuance time. Absent for users without a role.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// Issued At (iat), seconds since the epoch.
    pub iat: i64,
    /// Expiration Time (exp), seconds since the epoch.
    pub exp: i64,
}

/// Signs a token for `user` valid for `ttl_secs` seconds (HS256).
pub fn issue_token(
    user: &User,
    secret: &str,
    ttl_secs: i64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        id: user.id,
        role: user.role,
        iat: now,
        exp: now + ttl_secs,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Verifies signature and expiry of `token` and returns its claims.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| {
        match e.kind() {
            ErrorKind::ExpiredSignature => tracing::warn!("Auth: token expired"),
            ErrorKind::InvalidSignature => tracing::warn!("Auth: token signature invalid"),
            _ => tracing::warn!("Auth: token malformed ({e})"),
        }
        AppError::Unauthenticated
    })
}

/// AuthUser Extractor Result
///
/// The verified claims of the caller. Usable as a handler argument on any route; rejects
/// with `401` when no valid bearer token is present.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

/// AuthUser Extractor Implementation
///
/// 1. Reuses claims already attached to the request extensions by `auth_middleware`.
/// 2. Otherwise reads `Authorization: Bearer <token>` and verifies it with the configured secret.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AppConfig: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(claims) = parts.extensions.get::<Claims>() {
            return Ok(AuthUser(claims.clone()));
        }

        let config = AppConfig::from_ref(state);

        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| {
                tracing::warn!("Auth: no token provided");
                AppError::Unauthenticated
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            tracing::warn!("Auth: authorization header is not a bearer token");
            AppError::Unauthenticated
        })?;

        verify_token(token, &config.jwt_secret).map(AuthUser)
    }
}

/// Permits the caller iff its role is in `allowed`. Exact membership, no role hierarchy.
pub fn authorize(claims: &Claims, allowed: &[Role]) -> Result<(), AppError> {
    match claims.role {
        Some(role) if allowed.contains(&role) => Ok(()),
        _ => {
            tracing::warn!(user_id = claims.id, role = ?claims.role, "Roles: access denied");
            Err(AppError::Forbidden)
        }
    }
}

/// role_gate
///
/// Route-layer middleware enforcing a role allow-list. It reads the claims slot written by
/// `auth_middleware`, so it must be layered inside (after) authentication.
pub async fn role_gate(
    State(allowed): State<&'static [Role]>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let claims = request
        .extensions()
        .get::<Claims>()
        .ok_or(AppError::Unauthenticated)?;
    authorize(claims, allowed)?;
    Ok(next.run(request).await)
}

/// login
///
/// Looks the user up by email and checks the password against the stored hash. Returns
/// `Ok(None)` for an unknown email or a wrong password alike; store faults and unreadable
/// hashes are `Internal`.
pub async fn login(
    repo: &dyn Repository,
    config: &AppConfig,
    email: &str,
    password: &str,
) -> Result<Option<String>, AppError> {
    let Some(user) = repo.find_user_by_email(email).await? else {
        return Ok(None);
    };

    // Argon2 verification is CPU-bound; run it off the async workers.
    let stored = user.password.clone();
    let candidate = password.to_owned();
    let matches = tokio::task::spawn_blocking(move || security::verify_password(&stored, &candidate))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .map_err(|e| AppError::Internal(e.to_string()))?;

    if !matches {
        return Ok(None);
    }

    let token = issue_token(&user, &config.jwt_secret, config.token_ttl_secs)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(Some(token))
}
