// Store adapters behind the domain ports.

pub mod memory;
pub mod postgres;

pub use memory::{InMemoryCatalogStore, InMemoryUserStore};
pub use postgres::{PostgresCatalogStore, PostgresUserStore};
