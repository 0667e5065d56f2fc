use serde::{Deserialize, Serialize};

use crate::domain::FieldError;

// Uniform wrapper for every envelope-builder response.
#[derive(Debug, Serialize)]
pub struct ResponseEnvelope<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    // ISO-8601 instant the envelope was built.
    pub timestamp: String,
}

// Body emitted by the error classifier.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<ErrorDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ErrorDetails {
    Fields(Vec<FieldError>),
    Names(Vec<String>),
}

// Missing string fields default to empty so they surface as field errors.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateSupplierRequest {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateProductRequest {
    pub code: String,
    pub name: String,
    pub price_cents: i64,
    pub stock: i32,
    pub category_id: Option<i64>,
    pub supplier_id: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListProductsQuery {
    pub category_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct SaleItemRequest {
    pub product_id: i64,
    pub quantity: i32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RecordSaleRequest {
    pub items: Vec<SaleItemRequest>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: u64,
    pub username: String,
    pub role: String,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub revoked: bool,
}

// Public view of a user; credentials never leave the service.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
