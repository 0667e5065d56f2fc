use crate::domain::{ApiError, CatalogStore, Supplier};
use crate::interface_adapters::protocol::CreateSupplierRequest;
use crate::use_cases::validation::{is_valid_email, is_valid_phone, FieldErrors};

pub struct CreateSupplierUseCase<'a, S: ?Sized> {
    pub store: &'a S,
}

impl<S> CreateSupplierUseCase<'_, S>
where
    S: CatalogStore + ?Sized,
{
    pub async fn execute(&self, payload: CreateSupplierRequest) -> Result<Supplier, ApiError> {
        let mut errors = FieldErrors::new();
        let name = errors.required("name", &payload.name, 120);
        let phone = errors.optional("phone", payload.phone.as_deref(), 30);
        let email = errors.optional("email", payload.email.as_deref(), 254);

        if phone.as_deref().is_some_and(|p| !is_valid_phone(p)) {
            errors.push("phone", "Teléfono inválido");
        }
        if email.as_deref().is_some_and(|e| !is_valid_email(e)) {
            errors.push("email", "Email inválido");
        }
        errors.finish()?;

        Ok(self.store.insert_supplier(name, phone, email).await?)
    }
}

pub struct ListSuppliersUseCase<'a, S: ?Sized> {
    pub store: &'a S,
}

impl<S> ListSuppliersUseCase<'_, S>
where
    S: CatalogStore + ?Sized,
{
    pub async fn execute(&self) -> Result<Vec<Supplier>, ApiError> {
        Ok(self.store.list_suppliers().await?)
    }
}
