use async_trait::async_trait;
use sqlx::error::ErrorKind;
use sqlx::PgPool;
use std::collections::HashMap;

use crate::domain::{
    sale_total_cents, CatalogStore, Category, NewProduct, NewUser, Product, Role, Sale, SaleItem,
    SaleLine, StoreError, Supplier, User, UserStore,
};

// Constraint names from the migrations and the request field each one guards.
const CONSTRAINT_FIELDS: &[(&str, &str)] = &[
    ("categories_name_key", "name"),
    ("suppliers_name_key", "name"),
    ("products_code_key", "code"),
    ("products_category_id_fkey", "category_id"),
    ("products_supplier_id_fkey", "supplier_id"),
    ("users_username_key", "username"),
    ("users_email_key", "email"),
    ("sale_lines_product_id_fkey", "sale_lines.product_id"),
    ("sales_sold_by_fkey", "sold_by"),
];

fn constraint_field(constraint: &str) -> String {
    CONSTRAINT_FIELDS
        .iter()
        .find(|(name, _)| *name == constraint)
        .map(|(_, field)| (*field).to_string())
        .unwrap_or_else(|| constraint.to_string())
}

// Persistence boundary: driver errors become store error kinds by SQLSTATE class.
pub(crate) fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::RowNotFound => StoreError::NotFound,
        sqlx::Error::Database(db) => {
            let constraint = db.constraint().unwrap_or("unknown");
            match db.kind() {
                ErrorKind::UniqueViolation => StoreError::UniqueViolation {
                    fields: vec![constraint_field(constraint)],
                },
                ErrorKind::ForeignKeyViolation => StoreError::ForeignKeyViolation {
                    reference: constraint_field(constraint),
                },
                ErrorKind::CheckViolation | ErrorKind::NotNullViolation => {
                    StoreError::CheckViolation {
                        constraint: constraint.to_string(),
                    }
                }
                _ => StoreError::Backend(err.to_string()),
            }
        }
        _ => StoreError::Backend(err.to_string()),
    }
}

#[derive(sqlx::FromRow)]
struct CategoryRow {
    id: i64,
    name: String,
    description: Option<String>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            id: row.id,
            name: row.name,
            description: row.description,
        }
    }
}

#[derive(sqlx::FromRow)]
struct SupplierRow {
    id: i64,
    name: String,
    phone: Option<String>,
    email: Option<String>,
}

impl From<SupplierRow> for Supplier {
    fn from(row: SupplierRow) -> Self {
        Supplier {
            id: row.id,
            name: row.name,
            phone: row.phone,
            email: row.email,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: i64,
    code: String,
    name: String,
    price_cents: i64,
    stock: i32,
    category_id: i64,
    supplier_id: Option<i64>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            code: row.code,
            name: row.name,
            price_cents: row.price_cents,
            stock: row.stock,
            category_id: row.category_id,
            supplier_id: row.supplier_id,
        }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    email: String,
    role: String,
    password_hash: String,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = Role::parse(&row.role).ok_or_else(|| {
            StoreError::Backend(format!("user {} has unknown role {}", row.id, row.role))
        })?;
        Ok(User {
            id: row.id,
            username: row.username,
            email: row.email,
            role,
            password_hash: row.password_hash,
        })
    }
}

const PRODUCT_COLUMNS: &str = "id, code, name, price_cents, stock, category_id, supplier_id";

// PostgreSQL-backed catalog and sales store.
#[derive(Clone)]
pub struct PostgresCatalogStore {
    pub db: PgPool,
}

#[async_trait]
impl CatalogStore for PostgresCatalogStore {
    async fn insert_category(
        &self,
        name: String,
        description: Option<String>,
    ) -> Result<Category, StoreError> {
        let row: CategoryRow = sqlx::query_as(
            r#"
            INSERT INTO categories (name, description)
            VALUES ($1, $2)
            RETURNING id, name, description
            "#,
        )
        .bind(name)
        .bind(description)
        .fetch_one(&self.db)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        let rows: Vec<CategoryRow> =
            sqlx::query_as("SELECT id, name, description FROM categories ORDER BY id")
                .fetch_all(&self.db)
                .await
                .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(Category::from).collect())
    }

    async fn insert_supplier(
        &self,
        name: String,
        phone: Option<String>,
        email: Option<String>,
    ) -> Result<Supplier, StoreError> {
        let row: SupplierRow = sqlx::query_as(
            r#"
            INSERT INTO suppliers (name, phone, email)
            VALUES ($1, $2, $3)
            RETURNING id, name, phone, email
            "#,
        )
        .bind(name)
        .bind(phone)
        .bind(email)
        .fetch_one(&self.db)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn list_suppliers(&self) -> Result<Vec<Supplier>, StoreError> {
        let rows: Vec<SupplierRow> =
            sqlx::query_as("SELECT id, name, phone, email FROM suppliers ORDER BY id")
                .fetch_all(&self.db)
                .await
                .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(Supplier::from).collect())
    }

    async fn insert_product(&self, product: NewProduct) -> Result<Product, StoreError> {
        let sql = format!(
            r#"
            INSERT INTO products (code, name, price_cents, stock, category_id, supplier_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {PRODUCT_COLUMNS}
            "#
        );
        let row: ProductRow = sqlx::query_as(&sql)
            .bind(product.code)
            .bind(product.name)
            .bind(product.price_cents)
            .bind(product.stock)
            .bind(product.category_id)
            .bind(product.supplier_id)
            .fetch_one(&self.db)
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn get_product(&self, id: i64) -> Result<Option<Product>, StoreError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1");
        let row: Option<ProductRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(Product::from))
    }

    async fn list_products(&self, category_id: Option<i64>) -> Result<Vec<Product>, StoreError> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE ($1::BIGINT IS NULL OR category_id = $1) ORDER BY id"
        );
        let rows: Vec<ProductRow> = sqlx::query_as(&sql)
            .bind(category_id)
            .fetch_all(&self.db)
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn delete_product(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn record_sale(
        &self,
        sold_by: i64,
        items: &[SaleItem],
        created_at: u64,
    ) -> Result<Sale, StoreError> {
        // Dropping the transaction on any early return rolls it back.
        let mut tx = self.db.begin().await.map_err(map_sqlx_error)?;

        let mut remaining: HashMap<i64, i32> = HashMap::new();
        let mut lines = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let row: Option<(i64, i32)> =
                sqlx::query_as("SELECT price_cents, stock FROM products WHERE id = $1 FOR UPDATE")
                    .bind(item.product_id)
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(map_sqlx_error)?;
            let (price_cents, stock) = row.ok_or_else(|| StoreError::ForeignKeyViolation {
                reference: format!("items[{index}].product_id"),
            })?;

            let available = remaining.entry(item.product_id).or_insert(stock);
            if *available < item.quantity {
                return Err(StoreError::InsufficientStock {
                    line: index,
                    available: *available,
                });
            }
            *available -= item.quantity;
            lines.push(SaleLine {
                product_id: item.product_id,
                quantity: item.quantity,
                unit_price_cents: price_cents,
            });
        }

        let total_cents = sale_total_cents(&lines)?;

        for (product_id, stock) in remaining {
            sqlx::query("UPDATE products SET stock = $1 WHERE id = $2")
                .bind(stock)
                .bind(product_id)
                .execute(&mut *tx)
                .await
                .map_err(map_sqlx_error)?;
        }

        let created_at_db = i64::try_from(created_at).unwrap_or(i64::MAX);
        let (sale_id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO sales (total_cents, sold_by, created_at)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(total_cents)
        .bind(sold_by)
        .bind(created_at_db)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        for line in &lines {
            sqlx::query(
                r#"
                INSERT INTO sale_lines (sale_id, product_id, quantity, unit_price_cents)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(sale_id)
            .bind(line.product_id)
            .bind(line.quantity)
            .bind(line.unit_price_cents)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;
        }

        tx.commit().await.map_err(map_sqlx_error)?;

        Ok(Sale {
            id: sale_id,
            items: lines,
            total_cents,
            sold_by,
            created_at,
        })
    }
}

// PostgreSQL-backed user store.
#[derive(Clone)]
pub struct PostgresUserStore {
    pub db: PgPool,
}

#[async_trait]
impl UserStore for PostgresUserStore {
    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        let row: UserRow = sqlx::query_as(
            r#"
            INSERT INTO users (username, email, role, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, email, role, password_hash
            "#,
        )
        .bind(user.username)
        .bind(user.email)
        .bind(user.role.as_str())
        .bind(user.password_hash)
        .fetch_one(&self.db)
        .await
        .map_err(map_sqlx_error)?;

        User::try_from(row)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            SELECT id, username, email, role, password_hash
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await
        .map_err(map_sqlx_error)?;

        row.map(User::try_from).transpose()
    }
}
