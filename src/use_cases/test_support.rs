use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::domain::{
    CatalogStore, Category, Clock, NewProduct, Product, Role, Sale, SaleItem, Session,
    SessionStore, StoreError, Supplier,
};

pub(crate) type SessionTable = Arc<Mutex<HashMap<String, Session>>>;

// Shared fixed time source for deterministic use-case tests.
pub(crate) struct FixedClock(pub(crate) u64);

impl Clock for FixedClock {
    fn now_epoch_seconds(&self) -> u64 {
        self.0
    }
}

pub(crate) fn seller_session(expires_at: u64) -> Session {
    Session {
        user_id: 7,
        username: "caja1".to_string(),
        role: Role::Seller,
        expires_at,
    }
}

#[derive(Clone, Copy, Default)]
pub(crate) struct FailureFlags {
    pub insert: bool,
    pub get: bool,
    pub remove: bool,
}

#[derive(Clone)]
pub(crate) struct RecordingSessionStore {
    sessions: SessionTable,
    failures: FailureFlags,
}

impl RecordingSessionStore {
    pub(crate) fn new() -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            failures: FailureFlags::default(),
        }
    }

    pub(crate) fn with_failures(mut self, failures: FailureFlags) -> Self {
        self.failures = failures;
        self
    }

    pub(crate) fn insert_test_session(&self, token: impl Into<String>, session: Session) {
        let mut guard = self.sessions.lock().expect("sessions mutex poisoned");
        guard.insert(token.into(), session);
    }

    pub(crate) fn get_test_session(&self, token: &str) -> Option<Session> {
        let guard = self.sessions.lock().expect("sessions mutex poisoned");
        guard.get(token).cloned()
    }
}

fn backend(op: &str) -> StoreError {
    StoreError::Backend(format!("{op} failed"))
}

#[async_trait]
impl SessionStore for RecordingSessionStore {
    async fn insert(&self, token: String, session: Session) -> Result<(), StoreError> {
        if self.failures.insert {
            return Err(backend("insert"));
        }

        let mut guard = self.sessions.lock().expect("sessions mutex poisoned");
        guard.insert(token, session);
        Ok(())
    }

    async fn get(&self, token: &str) -> Result<Option<Session>, StoreError> {
        if self.failures.get {
            return Err(backend("get"));
        }

        let guard = self.sessions.lock().expect("sessions mutex poisoned");
        Ok(guard.get(token).cloned())
    }

    async fn remove(&self, token: &str) -> Result<bool, StoreError> {
        if self.failures.remove {
            return Err(backend("remove"));
        }

        let mut guard = self.sessions.lock().expect("sessions mutex poisoned");
        Ok(guard.remove(token).is_some())
    }

    async fn remove_expired(&self, now: u64) -> Result<usize, StoreError> {
        if self.failures.remove {
            return Err(backend("remove_expired"));
        }

        let mut guard = self.sessions.lock().expect("sessions mutex poisoned");
        let before = guard.len();
        guard.retain(|_, session| session.expires_at > now);
        Ok(before - guard.len())
    }
}

// Catalog store whose backend is always down.
pub(crate) struct UnavailableCatalogStore;

#[async_trait]
impl CatalogStore for UnavailableCatalogStore {
    async fn insert_category(
        &self,
        _name: String,
        _description: Option<String>,
    ) -> Result<Category, StoreError> {
        Err(backend("insert_category"))
    }

    async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        Err(backend("list_categories"))
    }

    async fn insert_supplier(
        &self,
        _name: String,
        _phone: Option<String>,
        _email: Option<String>,
    ) -> Result<Supplier, StoreError> {
        Err(backend("insert_supplier"))
    }

    async fn list_suppliers(&self) -> Result<Vec<Supplier>, StoreError> {
        Err(backend("list_suppliers"))
    }

    async fn insert_product(&self, _product: NewProduct) -> Result<Product, StoreError> {
        Err(backend("insert_product"))
    }

    async fn get_product(&self, _id: i64) -> Result<Option<Product>, StoreError> {
        Err(backend("get_product"))
    }

    async fn list_products(&self, _category_id: Option<i64>) -> Result<Vec<Product>, StoreError> {
        Err(backend("list_products"))
    }

    async fn delete_product(&self, _id: i64) -> Result<bool, StoreError> {
        Err(backend("delete_product"))
    }

    async fn record_sale(
        &self,
        _sold_by: i64,
        _items: &[SaleItem],
        _created_at: u64,
    ) -> Result<Sale, StoreError> {
        Err(backend("record_sale"))
    }
}
