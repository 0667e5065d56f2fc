use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Extension;

use crate::domain::{ApiError, Category, CurrentUser, Product, Supplier};
use crate::interface_adapters::envelope::{Envelope, CREATED_MESSAGE};
use crate::interface_adapters::extract::{parse_id, JsonBody, QueryParams};
use crate::interface_adapters::protocol::{
    CreateCategoryRequest, CreateProductRequest, CreateSupplierRequest, ListProductsQuery,
};
use crate::interface_adapters::state::AppState;
use crate::use_cases::categories::{CreateCategoryUseCase, ListCategoriesUseCase};
use crate::use_cases::products::{
    CreateProductUseCase, DeleteProductUseCase, GetProductUseCase, ListProductsUseCase,
};
use crate::use_cases::suppliers::{CreateSupplierUseCase, ListSuppliersUseCase};

pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Envelope<Vec<Category>>, ApiError> {
    let use_case = ListCategoriesUseCase {
        store: state.catalog.as_ref(),
    };
    let categories = use_case.execute().await?;

    Ok(state.envelopes.success(categories, None, None))
}

#[tracing::instrument(name = "create_category", skip_all, fields(name = %payload.name))]
pub async fn create_category(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CreateCategoryRequest>,
) -> Result<Envelope<Category>, ApiError> {
    let use_case = CreateCategoryUseCase {
        store: state.catalog.as_ref(),
    };
    let category = use_case.execute(payload).await?;

    Ok(state
        .envelopes
        .success(category, Some(CREATED_MESSAGE), Some(StatusCode::CREATED)))
}

pub async fn list_suppliers(
    State(state): State<AppState>,
) -> Result<Envelope<Vec<Supplier>>, ApiError> {
    let use_case = ListSuppliersUseCase {
        store: state.catalog.as_ref(),
    };
    let suppliers = use_case.execute().await?;

    Ok(state.envelopes.success(suppliers, None, None))
}

#[tracing::instrument(name = "create_supplier", skip_all, fields(name = %payload.name))]
pub async fn create_supplier(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CreateSupplierRequest>,
) -> Result<Envelope<Supplier>, ApiError> {
    let use_case = CreateSupplierUseCase {
        store: state.catalog.as_ref(),
    };
    let supplier = use_case.execute(payload).await?;

    Ok(state
        .envelopes
        .success(supplier, Some(CREATED_MESSAGE), Some(StatusCode::CREATED)))
}

pub async fn list_products(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ListProductsQuery>,
) -> Result<Envelope<Vec<Product>>, ApiError> {
    let use_case = ListProductsUseCase {
        store: state.catalog.as_ref(),
    };
    let products = use_case.execute(query.category_id).await?;

    Ok(state.envelopes.success(products, None, None))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Envelope<Product>, ApiError> {
    let id = parse_id(&raw_id)?;
    let use_case = GetProductUseCase {
        store: state.catalog.as_ref(),
    };
    let product = use_case.execute(id).await?;

    Ok(state.envelopes.success(product, None, None))
}

#[tracing::instrument(name = "create_product", skip_all, fields(code = %payload.code))]
pub async fn create_product(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CreateProductRequest>,
) -> Result<Envelope<Product>, ApiError> {
    let use_case = CreateProductUseCase {
        store: state.catalog.as_ref(),
    };
    let product = use_case.execute(payload).await?;

    Ok(state
        .envelopes
        .success(product, Some(CREATED_MESSAGE), Some(StatusCode::CREATED)))
}

// Admin only; sellers get the forbidden envelope.
#[tracing::instrument(name = "delete_product", skip_all, fields(user_id = user.user_id))]
pub async fn delete_product(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(raw_id): Path<String>,
) -> Result<Response, ApiError> {
    if !user.is_admin() {
        tracing::warn!("product deletion refused for non-admin");
        return Ok(state.envelopes.forbidden(None).into_response());
    }

    let id = parse_id(&raw_id)?;
    let use_case = DeleteProductUseCase {
        store: state.catalog.as_ref(),
    };
    use_case.execute(id).await?;

    Ok(state
        .envelopes
        .success((), Some("Producto eliminado"), None)
        .into_response())
}
