use serde::{Deserialize, Serialize};

use crate::domain::errors::StoreError;

// Product family used to group the catalog.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

// Vendor that products are purchased from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supplier {
    pub id: i64,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
}

// Sellable catalog item. Prices are kept in cents to avoid float rounding.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub price_cents: i64,
    pub stock: i32,
    pub category_id: i64,
    pub supplier_id: Option<i64>,
}

// Product data accepted by the store before an id is assigned.
#[derive(Clone, Debug)]
pub struct NewProduct {
    pub code: String,
    pub name: String,
    pub price_cents: i64,
    pub stock: i32,
    pub category_id: i64,
    pub supplier_id: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleLine {
    pub product_id: i64,
    pub quantity: i32,
    pub unit_price_cents: i64,
}

impl SaleLine {
    pub fn subtotal_cents(&self) -> Option<i64> {
        self.unit_price_cents.checked_mul(i64::from(self.quantity))
    }
}

// Sum of line subtotals. Fails on the first line that does not fit in i64.
pub fn sale_total_cents(lines: &[SaleLine]) -> Result<i64, StoreError> {
    lines
        .iter()
        .enumerate()
        .try_fold(0i64, |total, (line, sale_line)| {
            sale_line
                .subtotal_cents()
                .and_then(|subtotal| total.checked_add(subtotal))
                .ok_or(StoreError::AmountOverflow { line })
        })
}

// Requested quantity of a product, before prices are resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SaleItem {
    pub product_id: i64,
    pub quantity: i32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sale {
    pub id: i64,
    pub items: Vec<SaleLine>,
    pub total_cents: i64,
    pub sold_by: i64,
    // Epoch seconds.
    pub created_at: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Seller,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Seller => "seller",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "admin" => Some(Role::Admin),
            "seller" => Some(Role::Seller),
            _ => None,
        }
    }
}

// Staff account. `password_hash` is an Argon2 PHC string carrying its own salt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub password_hash: String,
}

#[derive(Clone, Debug)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub role: Role,
    pub password_hash: String,
}

// Login session stored in memory, keyed by its bearer token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub user_id: i64,
    pub username: String,
    pub role: Role,
    pub expires_at: u64,
}

// Identity resolved from a valid session, attached to protected requests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CurrentUser {
    pub user_id: i64,
    pub username: String,
    pub role: Role,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
