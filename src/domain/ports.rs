use async_trait::async_trait;

use crate::domain::entities::{
    Category, NewProduct, NewUser, Product, Sale, SaleItem, Session, Supplier, User,
};
use crate::domain::errors::StoreError;

// Port for catalog and sales persistence used by the catalog use cases.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn insert_category(
        &self,
        name: String,
        description: Option<String>,
    ) -> Result<Category, StoreError>;
    async fn list_categories(&self) -> Result<Vec<Category>, StoreError>;

    async fn insert_supplier(
        &self,
        name: String,
        phone: Option<String>,
        email: Option<String>,
    ) -> Result<Supplier, StoreError>;
    async fn list_suppliers(&self) -> Result<Vec<Supplier>, StoreError>;

    async fn insert_product(&self, product: NewProduct) -> Result<Product, StoreError>;
    async fn get_product(&self, id: i64) -> Result<Option<Product>, StoreError>;
    async fn list_products(&self, category_id: Option<i64>) -> Result<Vec<Product>, StoreError>;
    async fn delete_product(&self, id: i64) -> Result<bool, StoreError>;

    // Checks stock and decrements it for every line, all or nothing.
    async fn record_sale(
        &self,
        sold_by: i64,
        items: &[SaleItem],
        created_at: u64,
    ) -> Result<Sale, StoreError>;
}

// Port for staff accounts.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;
}

// Port for session storage used by auth use cases.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn insert(&self, token: String, session: Session) -> Result<(), StoreError>;
    async fn get(&self, token: &str) -> Result<Option<Session>, StoreError>;
    async fn remove(&self, token: &str) -> Result<bool, StoreError>;
    // Drops every session with `expires_at <= now`, returning how many went.
    async fn remove_expired(&self, now: u64) -> Result<usize, StoreError>;
}

// Port for retrieving the current time.
pub trait Clock: Send + Sync {
    fn now_epoch_seconds(&self) -> u64;
}
