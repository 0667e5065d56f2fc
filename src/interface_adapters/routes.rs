use crate::interface_adapters::auth::require_session;
use crate::interface_adapters::classifier::{classify_errors, method_not_allowed, route_not_found};
use crate::interface_adapters::handlers::auth::{login, logout};
use crate::interface_adapters::handlers::catalog::{
    create_category, create_product, create_supplier, delete_product, get_product,
    list_categories, list_products, list_suppliers,
};
use crate::interface_adapters::handlers::health::health;
use crate::interface_adapters::handlers::sales::record_sale;
use crate::interface_adapters::handlers::users::create_user;
use crate::interface_adapters::state::AppState;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};

pub fn app(state: AppState) -> Router {
    // Everything here needs a valid bearer token.
    let protected = Router::new()
        .route("/api/auth/logout", post(logout))
        .route("/api/categories", get(list_categories).post(create_category))
        .route("/api/suppliers", get(list_suppliers).post(create_supplier))
        .route("/api/products", get(list_products).post(create_product))
        .route(
            "/api/products/{id}",
            get(get_product).delete(delete_product),
        )
        .route("/api/sales", post(record_sale))
        .route("/api/users", post(create_user))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    Router::new()
        .route("/api/health", get(health))
        .route("/api/auth/login", post(login))
        .merge(protected)
        .fallback(route_not_found)
        .method_not_allowed_fallback(method_not_allowed)
        // Outermost, so it sees errors from handlers and the session guard alike.
        .layer(middleware::from_fn_with_state(
            state.classifier,
            classify_errors,
        ))
        .with_state(state)
}
