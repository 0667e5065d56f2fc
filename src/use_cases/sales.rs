use crate::domain::{ApiError, CatalogStore, Clock, CurrentUser, Sale, SaleItem};
use crate::interface_adapters::protocol::RecordSaleRequest;
use crate::use_cases::validation::FieldErrors;

// Records a sale for the current user, decrementing stock.
pub struct RecordSaleUseCase<'a, C, S: ?Sized> {
    pub clock: C,
    pub store: &'a S,
}

impl<C, S> RecordSaleUseCase<'_, C, S>
where
    C: Clock,
    S: CatalogStore + ?Sized,
{
    pub async fn execute(
        &self,
        seller: &CurrentUser,
        payload: RecordSaleRequest,
    ) -> Result<Sale, ApiError> {
        let mut errors = FieldErrors::new();
        if payload.items.is_empty() {
            errors.push("items", "La venta debe tener al menos un producto");
        }
        for (index, item) in payload.items.iter().enumerate() {
            if item.quantity <= 0 {
                errors.push(
                    format!("items[{index}].quantity"),
                    "La cantidad debe ser mayor a cero",
                );
            }
        }
        errors.finish()?;

        let items: Vec<SaleItem> = payload
            .items
            .iter()
            .map(|item| SaleItem {
                product_id: item.product_id,
                quantity: item.quantity,
            })
            .collect();

        let sale = self
            .store
            .record_sale(seller.user_id, &items, self.clock.now_epoch_seconds())
            .await?;
        tracing::info!(
            sale_id = sale.id,
            total_cents = sale.total_cents,
            seller = %seller.username,
            "sale recorded"
        );
        Ok(sale)
    }
}
