use axum::extract::State;

use crate::interface_adapters::envelope::Envelope;
use crate::interface_adapters::protocol::HealthResponse;
use crate::interface_adapters::state::AppState;

pub async fn health(State(state): State<AppState>) -> Envelope<HealthResponse> {
    state
        .envelopes
        .success(HealthResponse { status: "ok" }, None, None)
}
