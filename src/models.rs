use serde::{Deserialize, Deserializer, Serialize, de};
use sqlx::FromRow;
use std::{fmt::Display, str::FromStr};
use ts_rs::TS;
use utoipa::{IntoParams, ToSchema};

// --- Core Records (Persisted) ---

/// Product
///
/// A catalogue entry. The `id` is always assigned by the record store, never by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub category: String,
    // Units in stock, never negative.
    pub quantity: i64,
    // Unit price, never negative.
    pub price: f64,
}

impl Product {
    /// Builds the stored record for a validated creation request.
    pub fn from_new(id: i64, new: NewProduct) -> Self {
        Self {
            id,
            name: new.name,
            description: new.description,
            category: new.category,
            quantity: new.quantity,
            price: new.price,
        }
    }
}

/// Role
///
/// The two authorization roles. There is no hierarchy: route allow-lists name
/// every role they accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Role {
    /// May create, modify and delete products.
    #[serde(alias = "gestionnaire")]
    Manager,
    /// Read-only access.
    Employee,
}

impl Role {
    /// Parses a stored role string. `gestionnaire` is the legacy spelling of `manager`.
    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "manager" | "gestionnaire" => Some(Role::Manager),
            "employee" => Some(Role::Employee),
            _ => None,
        }
    }
}

/// User
///
/// An account able to log in. `password` holds a PHC-formatted Argon2 hash, never plaintext.
/// A missing `role` grants no elevated access.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub username: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub role: Option<Role>,
}

// --- Request Payloads (Input Schemas) ---

/// NumericInput
///
/// Numeric product fields are accepted either as JSON strings (`"59.99"`) or JSON numbers
/// (`59.99`). Both forms go through the same textual validation. Integers are tried before
/// floats so large whole numbers keep every digit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericInput {
    Integer(i64),
    Number(f64),
    Text(String),
}

impl NumericInput {
    /// The textual form checked by the validation patterns.
    pub fn as_text(&self) -> String {
        match self {
            NumericInput::Integer(n) => n.to_string(),
            NumericInput::Number(n) => n.to_string(),
            NumericInput::Text(s) => s.clone(),
        }
    }
}

impl From<&str> for NumericInput {
    fn from(value: &str) -> Self {
        NumericInput::Text(value.to_string())
    }
}

impl From<i64> for NumericInput {
    fn from(value: i64) -> Self {
        NumericInput::Integer(value)
    }
}

impl From<f64> for NumericInput {
    fn from(value: f64) -> Self {
        NumericInput::Number(value)
    }
}

/// ProductPayload
///
/// Body of `POST /products` and `PUT /products/{id}`. Every field is optional at the wire
/// level; creation requires name, price and quantity, updates apply whichever fields are present.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ProductPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "Gold Sweater")]
    #[ts(optional)]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "Luxury sweater in gold thread")]
    #[ts(optional)]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "Clothing")]
    #[ts(optional)]
    pub category: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, example = "59.99")]
    #[ts(type = "string | number | null")]
    pub price: Option<NumericInput>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, example = "2")]
    #[ts(type = "string | number | null")]
    pub quantity: Option<NumericInput>,
}

/// NewProduct
///
/// A creation request that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub category: String,
    pub quantity: i64,
    pub price: f64,
}

/// ProductPatch
///
/// A validated partial update. `None` means "not supplied" and preserves the stored value;
/// `Some` overwrites it, zero and empty string included.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub quantity: Option<i64>,
    pub price: Option<f64>,
}

impl ProductPatch {
    /// Overwrites the supplied fields of `product`.
    pub fn apply(self, product: &mut Product) {
        if let Some(name) = self.name {
            product.name = name;
        }
        if let Some(description) = self.description {
            product.description = description;
        }
        if let Some(category) = self.category {
            product.category = category;
        }
        if let Some(quantity) = self.quantity {
            product.quantity = quantity;
        }
        if let Some(price) = self.price {
            product.price = price;
        }
    }
}

/// ProductFilter
///
/// Query parameters of `GET /products`. Bounds are inclusive and independent.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ProductFilter {
    /// Lowest accepted price.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub min_price: Option<f64>,
    /// Highest accepted price.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub max_price: Option<f64>,
    /// Lowest accepted quantity in stock.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub min_stock: Option<i64>,
    /// Highest accepted quantity in stock.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub max_stock: Option<i64>,
}

/// Reads an optional bound from a query string or JSON value. An empty value (`?minPrice=`)
/// is treated as absent; anything else must parse as `T`.
fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let Some(raw) = Option::<NumericInput>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let text = raw.as_text();
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    text.parse().map(Some).map_err(de::Error::custom)
}

impl ProductFilter {
    pub fn matches(&self, product: &Product) -> bool {
        self.min_price.is_none_or(|min| product.price >= min)
            && self.max_price.is_none_or(|max| product.price <= max)
            && self.min_stock.is_none_or(|min| product.quantity >= min)
            && self.max_stock.is_none_or(|max| product.quantity <= max)
    }
}

/// LoginRequest
///
/// Body of `POST /users/login`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct LoginRequest {
    #[serde(default)]
    #[schema(example = "admin@email.com")]
    #[ts(optional)]
    pub email: Option<String>,
    #[serde(default)]
    #[schema(example = "abc-123")]
    #[ts(optional)]
    pub password: Option<String>,
}

// --- Responses (Output Schemas) ---

/// TokenResponse
///
/// Returned by a successful login. The token is a compact HS256 JWT valid for one hour.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct TokenResponse {
    pub token: String,
}

/// MessageResponse
///
/// Generic acknowledgement body, also the shape of every error body.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
