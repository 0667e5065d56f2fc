use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::{
    sale_total_cents, CatalogStore, Category, NewProduct, NewUser, Product, Sale, SaleItem,
    SaleLine, StoreError, Supplier, User, UserStore,
};

// In-memory catalog adapter used when no database is configured, and by tests.
#[derive(Clone, Default)]
pub struct InMemoryCatalogStore {
    tables: Arc<Mutex<CatalogTables>>,
}

#[derive(Default)]
struct CatalogTables {
    category_seq: i64,
    supplier_seq: i64,
    product_seq: i64,
    sale_seq: i64,
    categories: BTreeMap<i64, Category>,
    suppliers: BTreeMap<i64, Supplier>,
    products: BTreeMap<i64, Product>,
    sales: Vec<Sale>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn unique(field: &str) -> StoreError {
    StoreError::UniqueViolation {
        fields: vec![field.to_string()],
    }
}

fn foreign_key(reference: impl Into<String>) -> StoreError {
    StoreError::ForeignKeyViolation {
        reference: reference.into(),
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn insert_category(
        &self,
        name: String,
        description: Option<String>,
    ) -> Result<Category, StoreError> {
        let mut tables = self.tables.lock().await;
        if tables.categories.values().any(|c| c.name == name) {
            return Err(unique("name"));
        }

        tables.category_seq += 1;
        let category = Category {
            id: tables.category_seq,
            name,
            description,
        };
        tables.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.categories.values().cloned().collect())
    }

    async fn insert_supplier(
        &self,
        name: String,
        phone: Option<String>,
        email: Option<String>,
    ) -> Result<Supplier, StoreError> {
        let mut tables = self.tables.lock().await;
        if tables.suppliers.values().any(|s| s.name == name) {
            return Err(unique("name"));
        }

        tables.supplier_seq += 1;
        let supplier = Supplier {
            id: tables.supplier_seq,
            name,
            phone,
            email,
        };
        tables.suppliers.insert(supplier.id, supplier.clone());
        Ok(supplier)
    }

    async fn list_suppliers(&self) -> Result<Vec<Supplier>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.suppliers.values().cloned().collect())
    }

    async fn insert_product(&self, product: NewProduct) -> Result<Product, StoreError> {
        let mut tables = self.tables.lock().await;
        if tables.products.values().any(|p| p.code == product.code) {
            return Err(unique("code"));
        }
        if !tables.categories.contains_key(&product.category_id) {
            return Err(foreign_key("category_id"));
        }
        if let Some(supplier_id) = product.supplier_id {
            if !tables.suppliers.contains_key(&supplier_id) {
                return Err(foreign_key("supplier_id"));
            }
        }

        tables.product_seq += 1;
        let product = Product {
            id: tables.product_seq,
            code: product.code,
            name: product.name,
            price_cents: product.price_cents,
            stock: product.stock,
            category_id: product.category_id,
            supplier_id: product.supplier_id,
        };
        tables.products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn get_product(&self, id: i64) -> Result<Option<Product>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.products.get(&id).cloned())
    }

    async fn list_products(&self, category_id: Option<i64>) -> Result<Vec<Product>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .products
            .values()
            .filter(|p| category_id.map_or(true, |id| p.category_id == id))
            .cloned()
            .collect())
    }

    async fn delete_product(&self, id: i64) -> Result<bool, StoreError> {
        let mut tables = self.tables.lock().await;
        let referenced = tables
            .sales
            .iter()
            .flat_map(|sale| sale.items.iter())
            .any(|line| line.product_id == id);
        if referenced {
            return Err(foreign_key("sale_lines.product_id"));
        }

        Ok(tables.products.remove(&id).is_some())
    }

    async fn record_sale(
        &self,
        sold_by: i64,
        items: &[SaleItem],
        created_at: u64,
    ) -> Result<Sale, StoreError> {
        let mut tables = self.tables.lock().await;

        // Validate every line against remaining stock before touching anything.
        let mut remaining: HashMap<i64, i32> = HashMap::new();
        let mut lines = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let product = tables
                .products
                .get(&item.product_id)
                .ok_or_else(|| foreign_key(format!("items[{index}].product_id")))?;
            let available = remaining.entry(product.id).or_insert(product.stock);
            if *available < item.quantity {
                return Err(StoreError::InsufficientStock {
                    line: index,
                    available: *available,
                });
            }
            *available -= item.quantity;
            lines.push(SaleLine {
                product_id: product.id,
                quantity: item.quantity,
                unit_price_cents: product.price_cents,
            });
        }

        let total_cents = sale_total_cents(&lines)?;

        for (product_id, stock) in remaining {
            if let Some(product) = tables.products.get_mut(&product_id) {
                product.stock = stock;
            }
        }

        tables.sale_seq += 1;
        let sale = Sale {
            id: tables.sale_seq,
            items: lines,
            total_cents,
            sold_by,
            created_at,
        };
        tables.sales.push(sale.clone());
        Ok(sale)
    }
}

// In-memory user adapter.
#[derive(Clone, Default)]
pub struct InMemoryUserStore {
    users: Arc<Mutex<Vec<User>>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.lock().await;

        let mut clashes = Vec::new();
        if users.iter().any(|u| u.username == user.username) {
            clashes.push("username".to_string());
        }
        if users.iter().any(|u| u.email == user.email) {
            clashes.push("email".to_string());
        }
        if !clashes.is_empty() {
            return Err(StoreError::UniqueViolation { fields: clashes });
        }

        let user = User {
            id: users.len() as i64 + 1,
            username: user.username,
            email: user.email,
            role: user.role,
            password_hash: user.password_hash,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.lock().await;
        Ok(users.iter().find(|u| u.username == username).cloned())
    }
}
