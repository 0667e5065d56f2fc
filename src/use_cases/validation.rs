use crate::domain::{ApiError, FieldError};

// Collects field errors so a request reports every invalid attribute at once.
#[derive(Default)]
pub(crate) struct FieldErrors {
    errors: Vec<FieldError>,
}

impl FieldErrors {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    // Returns the trimmed value, or records an error when it is blank or too long.
    pub(crate) fn required(&mut self, field: &str, value: &str, max_len: usize) -> String {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            self.push(field, format!("{field} es obligatorio"));
        } else if trimmed.chars().count() > max_len {
            self.push(field, format!("{field} admite como máximo {max_len} caracteres"));
        }
        trimmed.to_string()
    }

    // Blank optional values are normalized to `None`.
    pub(crate) fn optional(
        &mut self,
        field: &str,
        value: Option<&str>,
        max_len: usize,
    ) -> Option<String> {
        let trimmed = value.map(str::trim).filter(|v| !v.is_empty())?;
        if trimmed.chars().count() > max_len {
            self.push(field, format!("{field} admite como máximo {max_len} caracteres"));
        }
        Some(trimmed.to_string())
    }

    pub(crate) fn finish(self) -> Result<(), ApiError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation(self.errors))
        }
    }
}

pub(crate) fn is_valid_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|label| !label.is_empty())
}

pub(crate) fn is_valid_phone(value: &str) -> bool {
    let digits = value.chars().filter(char::is_ascii_digit).count();
    digits >= 6
        && value
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '(' | ')'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn when_required_value_is_blank_then_field_error_is_recorded() {
        let mut errors = FieldErrors::new();

        let value = errors.required("name", "   ", 10);

        assert_eq!(value, "");
        let err = errors.finish().expect_err("expected validation error");
        match err {
            ApiError::Validation { fields, .. } => {
                assert_eq!(fields, vec![FieldError::new("name", "name es obligatorio")]);
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn when_optional_value_is_blank_then_it_is_none() {
        let mut errors = FieldErrors::new();

        assert_eq!(errors.optional("phone", Some("  "), 20), None);
        assert_eq!(errors.optional("phone", None, 20), None);
        assert!(errors.finish().is_ok());
    }

    #[test]
    fn email_format_checks() {
        assert!(is_valid_email("caja@ferreteria.com"));
        assert!(is_valid_email("a.b@mail.example.org"));
        assert!(!is_valid_email("caja"));
        assert!(!is_valid_email("@ferreteria.com"));
        assert!(!is_valid_email("caja@ferreteria"));
        assert!(!is_valid_email("caja@@ferreteria.com"));
        assert!(!is_valid_email("caja @ferreteria.com"));
        assert!(!is_valid_email("caja@ferreteria..com"));
    }

    #[test]
    fn phone_format_checks() {
        assert!(is_valid_phone("+54 11 4555-1234"));
        assert!(is_valid_phone("(011) 4555 1234"));
        assert!(!is_valid_phone("12345"));
        assert!(!is_valid_phone("call me"));
    }
}
