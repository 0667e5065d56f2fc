use crate::domain::{ApiError, CatalogStore, Category};
use crate::interface_adapters::protocol::CreateCategoryRequest;
use crate::use_cases::validation::FieldErrors;

const NAME_MAX_LEN: usize = 100;
const DESCRIPTION_MAX_LEN: usize = 500;

// Category creation use case.
pub struct CreateCategoryUseCase<'a, S: ?Sized> {
    pub store: &'a S,
}

impl<S> CreateCategoryUseCase<'_, S>
where
    S: CatalogStore + ?Sized,
{
    pub async fn execute(&self, payload: CreateCategoryRequest) -> Result<Category, ApiError> {
        let mut errors = FieldErrors::new();
        let name = errors.required("name", &payload.name, NAME_MAX_LEN);
        let description =
            errors.optional("description", payload.description.as_deref(), DESCRIPTION_MAX_LEN);
        errors.finish()?;

        let category = self.store.insert_category(name, description).await?;
        Ok(category)
    }
}

pub struct ListCategoriesUseCase<'a, S: ?Sized> {
    pub store: &'a S,
}

impl<S> ListCategoriesUseCase<'_, S>
where
    S: CatalogStore + ?Sized,
{
    pub async fn execute(&self) -> Result<Vec<Category>, ApiError> {
        Ok(self.store.list_categories().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FieldError;
    use crate::interface_adapters::stores::InMemoryCatalogStore;
    use crate::use_cases::test_support::UnavailableCatalogStore;

    fn request(name: &str) -> CreateCategoryRequest {
        CreateCategoryRequest {
            name: name.to_string(),
            description: None,
        }
    }

    #[tokio::test]
    async fn when_name_is_valid_then_category_is_stored_trimmed() {
        let store = InMemoryCatalogStore::new();
        let use_case = CreateCategoryUseCase { store: &store };

        let category = use_case
            .execute(request("  Herramientas  "))
            .await
            .expect("expected category creation to succeed");

        assert_eq!(category.name, "Herramientas");
        let listed = ListCategoriesUseCase { store: &store }
            .execute()
            .await
            .expect("expected listing to succeed");
        assert_eq!(listed, vec![category]);
    }

    #[tokio::test]
    async fn when_name_is_blank_then_returns_validation_error_on_name() {
        let store = InMemoryCatalogStore::new();
        let use_case = CreateCategoryUseCase { store: &store };

        let result = use_case.execute(request("   ")).await;

        assert_eq!(
            result,
            Err(ApiError::validation(vec![FieldError::new(
                "name",
                "name es obligatorio"
            )]))
        );
    }

    #[tokio::test]
    async fn when_name_already_exists_then_returns_unique_constraint_on_name() {
        let store = InMemoryCatalogStore::new();
        let use_case = CreateCategoryUseCase { store: &store };
        use_case
            .execute(request("Pinturas"))
            .await
            .expect("expected first insert");

        let result = use_case.execute(request("Pinturas")).await;

        match result {
            Err(ApiError::UniqueConstraint { fields, .. }) => assert_eq!(fields, vec!["name"]),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn when_store_is_down_then_returns_persistence_error() {
        let use_case = ListCategoriesUseCase {
            store: &UnavailableCatalogStore,
        };

        let result = use_case.execute().await;

        assert!(matches!(result, Err(ApiError::Persistence { .. })));
    }
}
