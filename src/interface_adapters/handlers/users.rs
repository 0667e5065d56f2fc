use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Extension;

use crate::domain::{ApiError, CurrentUser};
use crate::interface_adapters::envelope::CREATED_MESSAGE;
use crate::interface_adapters::extract::JsonBody;
use crate::interface_adapters::protocol::{CreateUserRequest, UserResponse};
use crate::interface_adapters::state::AppState;
use crate::use_cases::users::CreateUserUseCase;

// Staff accounts are created by administrators only.
#[tracing::instrument(name = "create_user", skip_all, fields(username = %payload.username))]
pub async fn create_user(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    JsonBody(payload): JsonBody<CreateUserRequest>,
) -> Result<Response, ApiError> {
    if !user.is_admin() {
        return Ok(state.envelopes.forbidden(None).into_response());
    }

    let use_case = CreateUserUseCase {
        store: state.users.as_ref(),
    };
    let created = use_case.execute(payload).await?;
    tracing::info!(user_id = created.id, "user created");

    let response = UserResponse {
        id: created.id,
        username: created.username,
        email: created.email,
        role: created.role.as_str().to_string(),
    };
    Ok(state
        .envelopes
        .success(response, Some(CREATED_MESSAGE), Some(StatusCode::CREATED))
        .into_response())
}
