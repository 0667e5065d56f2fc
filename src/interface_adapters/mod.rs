pub mod auth;
pub mod classifier;
pub mod envelope;
pub mod extract;
pub mod handlers;
pub mod protocol;
pub mod routes;
pub mod state;
pub mod stores;
