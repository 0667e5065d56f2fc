//! Terminal error handling for the HTTP surface.
//!
//! Handlers and inner middleware fail with [`ApiError`]. Its `IntoResponse`
//! writes a production-safe body and attaches the error to the response; the
//! [`classify_errors`] middleware, registered as the outermost layer, then
//! rebuilds the response with request context and the configured environment.

use axum::extract::{Request, State};
use axum::http::{Method, StatusCode, Uri};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::sync::Arc;

use crate::domain::ApiError;
use crate::frameworks::config::Environment;
use crate::interface_adapters::protocol::{ErrorBody, ErrorDetails};

pub const DEFAULT_SERVER_MESSAGE: &str = "Error interno del servidor";
pub const DATABASE_MESSAGE: &str = "Error en la base de datos";

// Request facts included in the diagnostic log line.
#[derive(Clone, Debug)]
pub struct RequestContext {
    pub method: Method,
    pub path: String,
}

// Error carried in response extensions until the classifier picks it up.
#[derive(Clone, Debug)]
pub struct RaisedError(pub Arc<ApiError>);

#[derive(Clone, Copy, Debug)]
pub struct ErrorClassifier {
    environment: Environment,
}

impl ErrorClassifier {
    pub fn new(environment: Environment) -> Self {
        Self { environment }
    }

    pub fn classify(&self, err: &ApiError) -> (StatusCode, ErrorBody) {
        match err {
            ApiError::Validation { message, fields } => (
                StatusCode::BAD_REQUEST,
                body("validation error", message, Some(ErrorDetails::Fields(fields.clone()))),
            ),
            ApiError::UniqueConstraint { message, fields } => (
                StatusCode::CONFLICT,
                body("data conflict", message, Some(ErrorDetails::Names(fields.clone()))),
            ),
            ApiError::ForeignKey { message } => (
                StatusCode::BAD_REQUEST,
                body("invalid reference", message, None),
            ),
            ApiError::Persistence { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                body("database error", DATABASE_MESSAGE, None),
            ),
            ApiError::MalformedToken { message } => (
                StatusCode::UNAUTHORIZED,
                body("invalid token", message, None),
            ),
            ApiError::ExpiredToken { message } => (
                StatusCode::UNAUTHORIZED,
                body("expired token", message, None),
            ),
            ApiError::Unclassified {
                kind,
                message,
                status,
                stack,
            } => {
                let status = status
                    .and_then(|code| StatusCode::from_u16(code).ok())
                    .filter(|code| code.is_client_error() || code.is_server_error())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                let label = kind
                    .as_deref()
                    .filter(|k| !k.trim().is_empty())
                    .unwrap_or("server error");
                let message = if message.trim().is_empty() {
                    DEFAULT_SERVER_MESSAGE
                } else {
                    message.as_str()
                };

                let mut error_body = body(label, message, None);
                if self.environment.is_development() {
                    error_body.stack = Some(stack.clone().unwrap_or_else(|| format!("{err:?}")));
                }
                (status, error_body)
            }
        }
    }

    // Classifies, logs, and writes the final response.
    pub fn respond(&self, err: &ApiError, context: &RequestContext) -> Response {
        let (status, error_body) = self.classify(err);
        self.log(err, context, status);
        (status, Json(error_body)).into_response()
    }

    fn log(&self, err: &ApiError, context: &RequestContext, status: StatusCode) {
        let stack = match err {
            ApiError::Unclassified { stack, .. } if self.environment.is_development() => {
                stack.as_deref()
            }
            _ => None,
        };

        if status.is_server_error() {
            tracing::error!(
                error = %err,
                method = %context.method,
                path = %context.path,
                status = status.as_u16(),
                stack = ?stack,
                "request failed"
            );
        } else {
            tracing::warn!(
                error = %err,
                method = %context.method,
                path = %context.path,
                status = status.as_u16(),
                "request rejected"
            );
        }
    }
}

fn body(error: &str, message: &str, details: Option<ErrorDetails>) -> ErrorBody {
    ErrorBody {
        error: error.to_string(),
        message: message.to_string(),
        details,
        stack: None,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Safe default if the classifier layer is not installed.
        let (status, error_body) = ErrorClassifier::new(Environment::Production).classify(&self);
        let mut response = (status, Json(error_body)).into_response();
        response
            .extensions_mut()
            .insert(RaisedError(Arc::new(self)));
        response
    }
}

// Outermost middleware: replaces responses that carry a raised error.
pub async fn classify_errors(
    State(classifier): State<ErrorClassifier>,
    request: Request,
    next: Next,
) -> Response {
    let context = RequestContext {
        method: request.method().clone(),
        path: request.uri().path().to_string(),
    };

    let mut response = next.run(request).await;
    match response.extensions_mut().remove::<RaisedError>() {
        Some(RaisedError(err)) => classifier.respond(&err, &context),
        None => response,
    }
}

// Terminal handler for requests that match no route. Bypasses the classifier.
pub async fn route_not_found(method: Method, uri: Uri) -> (StatusCode, Json<ErrorBody>) {
    (
        StatusCode::NOT_FOUND,
        Json(body(
            "route not found",
            &format!("{method} {} does not exist", uri.path()),
            None,
        )),
    )
}

// Known path, unsupported method.
pub async fn method_not_allowed(method: Method, uri: Uri) -> (StatusCode, Json<ErrorBody>) {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(body(
            "method not allowed",
            &format!("{method} is not supported on {}", uri.path()),
            None,
        )),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FieldError;
    use serde_json::{json, Value};

    fn classify(environment: Environment, err: &ApiError) -> (StatusCode, Value) {
        let (status, error_body) = ErrorClassifier::new(environment).classify(err);
        let value = serde_json::to_value(&error_body).expect("expected body to serialize");
        (status, value)
    }

    fn unclassified(message: &str, status: Option<u16>) -> ApiError {
        ApiError::Unclassified {
            kind: None,
            message: message.to_string(),
            status,
            stack: None,
        }
    }

    #[test]
    fn when_field_validation_fails_then_returns_400_with_field_details() {
        let err = ApiError::Validation {
            message: "Error de validación".to_string(),
            fields: vec![FieldError::new("email", "Invalid")],
        };

        let (status, body) = classify(Environment::Production, &err);

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({
                "error": "validation error",
                "message": "Error de validación",
                "details": [{"field": "email", "message": "Invalid"}]
            })
        );
    }

    #[test]
    fn when_unique_constraint_fails_then_returns_409_with_field_names() {
        let err = ApiError::UniqueConstraint {
            message: "Ya existe".to_string(),
            fields: vec!["email".to_string()],
        };

        let (status, body) = classify(Environment::Production, &err);

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "data conflict");
        assert_eq!(body["details"], json!(["email"]));
    }

    #[test]
    fn when_foreign_key_fails_then_returns_400_without_details() {
        let err = ApiError::foreign_key("Referencia inválida: category_id");

        let (status, body) = classify(Environment::Development, &err);

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({"error": "invalid reference", "message": "Referencia inválida: category_id"})
        );
    }

    #[test]
    fn when_persistence_fails_then_internal_message_is_hidden() {
        let err = ApiError::Persistence {
            message: "password authentication failed for user \"erp\"".to_string(),
        };

        let (status, body) = classify(Environment::Development, &err);

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            json!({"error": "database error", "message": DATABASE_MESSAGE})
        );
    }

    #[test]
    fn when_token_is_malformed_or_expired_then_returns_401_with_distinct_labels() {
        let (malformed_status, malformed) =
            classify(Environment::Production, &ApiError::malformed_token("Token inválido"));
        let (expired_status, expired) =
            classify(Environment::Production, &ApiError::expired_token("Token expirado"));

        assert_eq!(malformed_status, StatusCode::UNAUTHORIZED);
        assert_eq!(malformed["error"], "invalid token");
        assert_eq!(expired_status, StatusCode::UNAUTHORIZED);
        assert_eq!(expired["error"], "expired token");
    }

    #[test]
    fn when_unclassified_has_no_status_then_returns_500_and_stack_only_in_development() {
        let err = unclassified("", None);

        let (dev_status, dev) = classify(Environment::Development, &err);
        let (prod_status, prod) = classify(Environment::Production, &err);

        assert_eq!(dev_status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(prod_status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(dev["error"], "server error");
        assert_eq!(dev["message"], DEFAULT_SERVER_MESSAGE);
        assert!(dev["stack"].is_string());
        assert!(prod.get("stack").is_none());
        assert_eq!(prod["message"], DEFAULT_SERVER_MESSAGE);
    }

    #[test]
    fn when_unclassified_carries_kind_and_status_then_they_are_used() {
        let err = ApiError::not_found("Producto 9 no encontrado");

        let (status, body) = classify(Environment::Production, &err);

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            body,
            json!({"error": "not found", "message": "Producto 9 no encontrado"})
        );
    }

    #[test]
    fn when_status_override_is_not_an_error_status_then_falls_back_to_500() {
        for bogus in [200, 302, 42, 1000] {
            let (status, _) = classify(Environment::Production, &unclassified("boom", Some(bogus)));

            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "status {bogus}");
        }
    }

    #[test]
    fn when_internal_error_has_recorded_stack_then_development_shows_it() {
        let err = ApiError::internal(&std::io::Error::other("disk full"));

        let (_, body) = classify(Environment::Development, &err);

        assert!(body["stack"]
            .as_str()
            .expect("expected stack string")
            .contains("disk full"));
    }

    #[tokio::test]
    async fn when_error_is_converted_to_response_then_it_is_attached_for_the_classifier() {
        let response = ApiError::expired_token("Token expirado").into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let raised = response
            .extensions()
            .get::<RaisedError>()
            .expect("expected raised error extension");
        assert_eq!(*raised.0, ApiError::expired_token("Token expirado"));
    }
}
