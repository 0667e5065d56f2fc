use serde::Serialize;
use std::backtrace::{Backtrace, BacktraceStatus};
use thiserror::Error;

// One invalid input attribute.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Every failure a request can end in.
///
/// Each layer that can fail builds the variant that describes it; the error
/// classifier maps variants to status codes and bodies without inspecting
/// names or messages.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("{message}")]
    Validation {
        message: String,
        fields: Vec<FieldError>,
    },
    #[error("{message}")]
    UniqueConstraint { message: String, fields: Vec<String> },
    #[error("{message}")]
    ForeignKey { message: String },
    // Message is internal detail and is only logged.
    #[error("{message}")]
    Persistence { message: String },
    #[error("{message}")]
    MalformedToken { message: String },
    #[error("{message}")]
    ExpiredToken { message: String },
    #[error("{message}")]
    Unclassified {
        kind: Option<String>,
        message: String,
        status: Option<u16>,
        stack: Option<String>,
    },
}

impl ApiError {
    pub fn validation(fields: Vec<FieldError>) -> Self {
        ApiError::Validation {
            message: "Error de validación".to_string(),
            fields,
        }
    }

    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::validation(vec![FieldError::new(field, message)])
    }

    pub fn foreign_key(message: impl Into<String>) -> Self {
        ApiError::ForeignKey {
            message: message.into(),
        }
    }

    pub fn malformed_token(message: impl Into<String>) -> Self {
        ApiError::MalformedToken {
            message: message.into(),
        }
    }

    pub fn expired_token(message: impl Into<String>) -> Self {
        ApiError::ExpiredToken {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::Unclassified {
            kind: Some("not found".to_string()),
            message: message.into(),
            status: Some(404),
            stack: None,
        }
    }

    // Wraps an unexpected failure, keeping its cause chain for development bodies.
    pub fn internal(err: &(dyn std::error::Error + 'static)) -> Self {
        ApiError::Unclassified {
            kind: None,
            message: err.to_string(),
            status: None,
            stack: Some(describe_chain(err)),
        }
    }
}

fn describe_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut lines = vec![format!("{err:?}")];
    let mut source = err.source();
    while let Some(cause) = source {
        lines.push(format!("caused by: {cause}"));
        source = cause.source();
    }

    let backtrace = Backtrace::capture();
    if backtrace.status() == BacktraceStatus::Captured {
        lines.push(backtrace.to_string());
    }

    lines.join("\n")
}

/// Failures reported by store adapters.
///
/// Adapters translate backend-specific errors into these kinds at the
/// persistence boundary, so use cases never look at driver error text.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("unique constraint violated on {}", .fields.join(", "))]
    UniqueViolation { fields: Vec<String> },
    #[error("foreign key violated on {reference}")]
    ForeignKeyViolation { reference: String },
    #[error("check constraint {constraint} violated")]
    CheckViolation { constraint: String },
    #[error("line {line} asks for more than the {available} units in stock")]
    InsufficientStock { line: usize, available: i32 },
    #[error("line {line} pushes the sale total past the largest storable amount")]
    AmountOverflow { line: usize },
    #[error("record not found")]
    NotFound,
    #[error("storage backend failure: {0}")]
    Backend(String),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation { fields } => ApiError::UniqueConstraint {
                message: format!("Ya existe un registro con el mismo valor en: {}", fields.join(", ")),
                fields,
            },
            StoreError::ForeignKeyViolation { reference } => {
                ApiError::foreign_key(format!("Referencia inválida: {reference}"))
            }
            StoreError::CheckViolation { constraint } => {
                ApiError::invalid_field(constraint, "Valor fuera del rango permitido")
            }
            StoreError::InsufficientStock { line, available } => ApiError::invalid_field(
                format!("items[{line}].quantity"),
                format!("Stock insuficiente, disponible: {available}"),
            ),
            StoreError::AmountOverflow { line } => ApiError::invalid_field(
                format!("items[{line}].quantity"),
                "El importe de la venta excede el máximo permitido",
            ),
            StoreError::NotFound => ApiError::not_found("Recurso no encontrado"),
            StoreError::Backend(message) => ApiError::Persistence { message },
        }
    }
}
