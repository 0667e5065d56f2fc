use crate::domain::{ApiError, CatalogStore, NewProduct, Product};
use crate::interface_adapters::protocol::CreateProductRequest;
use crate::use_cases::validation::FieldErrors;

pub struct CreateProductUseCase<'a, S: ?Sized> {
    pub store: &'a S,
}

impl<S> CreateProductUseCase<'_, S>
where
    S: CatalogStore + ?Sized,
{
    pub async fn execute(&self, payload: CreateProductRequest) -> Result<Product, ApiError> {
        let mut errors = FieldErrors::new();
        let code = errors.required("code", &payload.code, 40);
        let name = errors.required("name", &payload.name, 200);
        if payload.price_cents < 0 {
            errors.push("price_cents", "El precio no puede ser negativo");
        }
        if payload.stock < 0 {
            errors.push("stock", "El stock no puede ser negativo");
        }
        if payload.category_id.is_none() {
            errors.push("category_id", "category_id es obligatorio");
        }
        errors.finish()?;

        let product = NewProduct {
            code,
            name,
            price_cents: payload.price_cents,
            stock: payload.stock,
            // Checked above; missing ids never reach the store.
            category_id: payload.category_id.unwrap_or_default(),
            supplier_id: payload.supplier_id,
        };
        Ok(self.store.insert_product(product).await?)
    }
}

pub struct GetProductUseCase<'a, S: ?Sized> {
    pub store: &'a S,
}

impl<S> GetProductUseCase<'_, S>
where
    S: CatalogStore + ?Sized,
{
    pub async fn execute(&self, id: i64) -> Result<Product, ApiError> {
        self.store
            .get_product(id)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("Producto {id} no encontrado")))
    }
}

pub struct ListProductsUseCase<'a, S: ?Sized> {
    pub store: &'a S,
}

impl<S> ListProductsUseCase<'_, S>
where
    S: CatalogStore + ?Sized,
{
    pub async fn execute(&self, category_id: Option<i64>) -> Result<Vec<Product>, ApiError> {
        Ok(self.store.list_products(category_id).await?)
    }
}

pub struct DeleteProductUseCase<'a, S: ?Sized> {
    pub store: &'a S,
}

impl<S> DeleteProductUseCase<'_, S>
where
    S: CatalogStore + ?Sized,
{
    pub async fn execute(&self, id: i64) -> Result<(), ApiError> {
        if self.store.delete_product(id).await? {
            Ok(())
        } else {
            Err(ApiError::not_found(format!("Producto {id} no encontrado")))
        }
    }
}
