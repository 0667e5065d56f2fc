pub mod entities;
pub mod errors;
pub mod ports;

// Re-export the domain boundary types and ports.
pub use entities::{
    sale_total_cents, Category, CurrentUser, NewProduct, NewUser, Product, Role, Sale, SaleItem,
    SaleLine, Session, Supplier, User,
};
pub use errors::{ApiError, FieldError, StoreError};
pub use ports::{CatalogStore, Clock, SessionStore, UserStore};
