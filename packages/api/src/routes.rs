use serde::{Deserialize, Serialize};

use crate::error::ApiError;

pub mod admin;
pub mod auth;
pub mod catalog;
pub mod favorites;
pub mod health;
pub mod sales;

/// Answer of every successful write
#[derive(Clone, Deserialize, Serialize, Debug, PartialEq)]
pub struct MutationResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl MutationResponse {
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            success: true,
            id: Some(id.into()),
        }
    }

    pub fn done() -> Self {
        Self {
            success: true,
            id: None,
        }
    }
}

#[derive(Clone, Deserialize, Serialize, Debug)]
pub struct LimitParams {
    pub limit: Option<usize>,
}

pub(crate) fn require_text(value: &str, message: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::bad_request(message));
    }
    Ok(())
}

pub(crate) fn require_price(price: f64) -> Result<(), ApiError> {
    if !price.is_finite() || price < 0.0 {
        return Err(ApiError::bad_request("Preço inválido"));
    }
    Ok(())
}

pub(crate) fn require_email(email: &str) -> Result<(), ApiError> {
    if !email.contains('@') {
        return Err(ApiError::bad_request("E-mail inválido"));
    }
    Ok(())
}
