//! Field validation for product and login payloads.
//!
//! Rules are checked in a fixed order (name, price, quantity) and the first failure wins.

use regex::Regex;
use std::sync::LazyLock;

use crate::{
    error::ValidationError,
    models::{NewProduct, NumericInput, ProductPatch, ProductPayload},
};

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z\s]{3,50}$").expect("valid name pattern"));
static PRICE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(\.\d+)?$").expect("valid price pattern"));
static QUANTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+$").expect("valid quantity pattern"));
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email pattern")
});

pub fn validate_name(name: &str) -> Result<String, ValidationError> {
    if NAME_RE.is_match(name) {
        Ok(name.to_string())
    } else {
        Err(ValidationError::InvalidName)
    }
}

pub fn validate_price(price: &NumericInput) -> Result<f64, ValidationError> {
    let text = price.as_text();
    if !PRICE_RE.is_match(&text) {
        return Err(ValidationError::InvalidPrice);
    }
    text.parse::<f64>()
        .ok()
        .filter(|p| p.is_finite())
        .ok_or(ValidationError::InvalidPrice)
}

pub fn validate_quantity(quantity: &NumericInput) -> Result<i64, ValidationError> {
    let text = quantity.as_text();
    if !QUANTITY_RE.is_match(&text) {
        return Err(ValidationError::InvalidQuantity);
    }
    // Overflowing i64 is as invalid as a malformed number.
    text.parse::<i64>().map_err(|_| ValidationError::InvalidQuantity)
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if EMAIL_RE.is_match(email) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail)
    }
}

/// Validates a creation payload. Name, price and quantity are mandatory; description and
/// category default to empty strings.
pub fn validate_new_product(payload: ProductPayload) -> Result<NewProduct, ValidationError> {
    let name = validate_name(payload.name.as_deref().ok_or(ValidationError::InvalidName)?)?;
    let price = validate_price(payload.price.as_ref().ok_or(ValidationError::InvalidPrice)?)?;
    let quantity = validate_quantity(
        payload
            .quantity
            .as_ref()
            .ok_or(ValidationError::InvalidQuantity)?,
    )?;

    Ok(NewProduct {
        name,
        description: payload.description.unwrap_or_default(),
        category: payload.category.unwrap_or_default(),
        quantity,
        price,
    })
}

/// Validates an update payload. Only supplied fields are checked and carried into the patch.
pub fn validate_product_patch(payload: ProductPayload) -> Result<ProductPatch, ValidationError> {
    let name = payload.name.as_deref().map(validate_name).transpose()?;
    let price = payload.price.as_ref().map(validate_price).transpose()?;
    let quantity = payload.quantity.as_ref().map(validate_quantity).transpose()?;

    Ok(ProductPatch {
        name,
        description: payload.description,
        category: payload.category,
        quantity,
        price,
    })
}
