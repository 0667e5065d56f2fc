//! Uniform success and error envelopes for route handlers.
//!
//! Every operation stamps the envelope with the instant it was built, so two
//! calls with the same inputs differ only in `timestamp`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::domain::FieldError;
use crate::frameworks::config::Environment;
use crate::interface_adapters::protocol::ResponseEnvelope;

pub const SUCCESS_MESSAGE: &str = "Operación exitosa";
pub const CREATED_MESSAGE: &str = "Creado correctamente";
pub const ERROR_MESSAGE: &str = "Ocurrió un error";
pub const VALIDATION_MESSAGE: &str = "Error de validación";
pub const UNAUTHORIZED_MESSAGE: &str = "No autorizado";
pub const FORBIDDEN_MESSAGE: &str = "Acceso prohibido";
pub const NOT_FOUND_MESSAGE: &str = "Recurso no encontrado";

// ISO-8601 UTC with milliseconds, e.g. 2026-10-16T09:30:00.123Z.
pub(crate) fn now_iso8601() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

// Status plus body, written as a JSON response.
#[derive(Debug)]
pub struct Envelope<T> {
    pub status: StatusCode,
    pub body: ResponseEnvelope<T>,
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Builds response envelopes.
///
/// The status passed by callers is trusted: nothing checks that it agrees
/// with the `success` flag of the operation used.
#[derive(Clone, Copy, Debug)]
pub struct EnvelopeBuilder {
    environment: Environment,
}

impl EnvelopeBuilder {
    pub fn new(environment: Environment) -> Self {
        Self { environment }
    }

    pub fn success<T>(
        &self,
        payload: T,
        message: Option<&str>,
        status: Option<StatusCode>,
    ) -> Envelope<T> {
        Envelope {
            status: status.unwrap_or(StatusCode::OK),
            body: ResponseEnvelope {
                success: true,
                message: message.unwrap_or(SUCCESS_MESSAGE).to_string(),
                data: Some(payload),
                errors: None,
                detail: None,
                timestamp: now_iso8601(),
            },
        }
    }

    // `detail` only reaches the client in development.
    pub fn error(
        &self,
        message: Option<&str>,
        status: Option<StatusCode>,
        detail: Option<String>,
    ) -> Envelope<()> {
        let detail = detail.filter(|_| self.environment.is_development());
        self.failure(
            status.unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            message.unwrap_or(ERROR_MESSAGE),
            None,
            detail,
        )
    }

    pub fn validation_error(&self, fields: Vec<FieldError>) -> Envelope<()> {
        self.failure(
            StatusCode::BAD_REQUEST,
            VALIDATION_MESSAGE,
            Some(fields),
            None,
        )
    }

    pub fn unauthorized(&self, message: Option<&str>) -> Envelope<()> {
        self.failure(
            StatusCode::UNAUTHORIZED,
            message.unwrap_or(UNAUTHORIZED_MESSAGE),
            None,
            None,
        )
    }

    pub fn forbidden(&self, message: Option<&str>) -> Envelope<()> {
        self.failure(
            StatusCode::FORBIDDEN,
            message.unwrap_or(FORBIDDEN_MESSAGE),
            None,
            None,
        )
    }

    pub fn not_found(&self, message: Option<&str>) -> Envelope<()> {
        self.failure(
            StatusCode::NOT_FOUND,
            message.unwrap_or(NOT_FOUND_MESSAGE),
            None,
            None,
        )
    }

    fn failure(
        &self,
        status: StatusCode,
        message: &str,
        errors: Option<Vec<FieldError>>,
        detail: Option<String>,
    ) -> Envelope<()> {
        Envelope {
            status,
            body: ResponseEnvelope {
                success: false,
                message: message.to_string(),
                data: None,
                errors,
                detail,
                timestamp: now_iso8601(),
            },
        }
    }
}
