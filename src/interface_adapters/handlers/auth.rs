use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Extension;

use crate::domain::ApiError;
use crate::interface_adapters::auth::SessionToken;
use crate::interface_adapters::envelope::Envelope;
use crate::interface_adapters::extract::JsonBody;
use crate::interface_adapters::protocol::{LoginRequest, LoginResponse, LogoutResponse};
use crate::interface_adapters::state::{AppState, SystemClock};
use crate::use_cases::login::{LoginOutcome, LoginUseCase, LogoutUseCase};

// Handler for issuing a session token.
#[tracing::instrument(name = "login", skip_all, fields(username = %payload.username))]
pub async fn login(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> Result<Response, ApiError> {
    let use_case = LoginUseCase {
        clock: SystemClock,
        users: state.users.as_ref(),
        sessions: state.sessions.as_ref(),
        ttl_seconds: state.session_ttl_seconds,
    };

    match use_case.execute(payload).await? {
        LoginOutcome::Granted(grant) => {
            tracing::info!("session issued");
            let response = LoginResponse {
                token: grant.token,
                expires_at: grant.expires_at,
                username: grant.username,
                role: grant.role.to_string(),
            };
            Ok(state.envelopes.success(response, None, None).into_response())
        }
        LoginOutcome::Rejected => Ok(state
            .envelopes
            .unauthorized(Some("Credenciales inválidas"))
            .into_response()),
    }
}

// Handler for revoking the caller's session token.
pub async fn logout(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
) -> Result<Envelope<LogoutResponse>, ApiError> {
    let use_case = LogoutUseCase {
        store: state.sessions.as_ref(),
    };
    let revoked = use_case.execute(&token).await?;

    Ok(state
        .envelopes
        .success(LogoutResponse { revoked }, None, None))
}
