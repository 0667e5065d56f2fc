use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;

use crate::domain::{ApiError, CurrentUser, Sale};
use crate::interface_adapters::envelope::{Envelope, CREATED_MESSAGE};
use crate::interface_adapters::extract::JsonBody;
use crate::interface_adapters::protocol::RecordSaleRequest;
use crate::interface_adapters::state::{AppState, SystemClock};
use crate::use_cases::sales::RecordSaleUseCase;

#[tracing::instrument(
    name = "record_sale",
    skip_all,
    fields(user_id = user.user_id, lines = payload.items.len())
)]
pub async fn record_sale(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    JsonBody(payload): JsonBody<RecordSaleRequest>,
) -> Result<Envelope<Sale>, ApiError> {
    let use_case = RecordSaleUseCase {
        clock: SystemClock,
        store: state.catalog.as_ref(),
    };
    let sale = use_case.execute(&user, payload).await?;

    Ok(state
        .envelopes
        .success(sale, Some(CREATED_MESSAGE), Some(StatusCode::CREATED)))
}
