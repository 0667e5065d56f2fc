use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::domain::ApiError;
use crate::interface_adapters::state::{AppState, SystemClock};
use crate::use_cases::verify_token::VerifyTokenUseCase;

// Bearer token of the current request, kept for logout.
#[derive(Clone, Debug)]
pub struct SessionToken(pub String);

// Session guard for protected routes.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = match request.headers().get(AUTHORIZATION) {
        None => {
            return state
                .envelopes
                .unauthorized(Some("Token no proporcionado"))
                .into_response();
        }
        Some(header) => match bearer_token(header) {
            Ok(token) => token,
            Err(err) => return err.into_response(),
        },
    };

    let use_case = VerifyTokenUseCase {
        clock: SystemClock,
        store: state.sessions.as_ref(),
    };
    match use_case.execute(&token).await {
        Ok(user) => {
            tracing::debug!(user_id = user.user_id, "session verified");
            request.extensions_mut().insert(user);
            request.extensions_mut().insert(SessionToken(token));
            next.run(request).await
        }
        Err(err) => err.into_response(),
    }
}

fn bearer_token(header: &HeaderValue) -> Result<String, ApiError> {
    let value = header
        .to_str()
        .map_err(|_| ApiError::malformed_token("Encabezado Authorization inválido"))?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ApiError::malformed_token("Se esperaba un token Bearer"))
}
