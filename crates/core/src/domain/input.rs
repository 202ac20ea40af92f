//! Shape checks shared by the request payload validators.

use serde_json::Value;

use crate::errors::DomainError;

/// Required non-blank string. Absent, `null`, blank and non-string values
/// all count as missing.
pub(crate) fn required_text(value: Option<Value>, field: &'static str) -> Result<String, DomainError> {
    match value {
        Some(Value::String(text)) if !text.trim().is_empty() => Ok(text.trim().to_string()),
        Some(Value::String(_)) | Some(Value::Null) | None => Err(DomainError::MissingField(field)),
        Some(_) => Err(DomainError::InvalidField { field, reason: "debe ser texto".to_string() }),
    }
}

/// Year given as a JSON integer or a numeric string.
pub(crate) fn required_year(value: Option<Value>, field: &'static str) -> Result<i32, DomainError> {
    let invalid = |reason: &str| DomainError::InvalidField { field, reason: reason.to_string() };

    match value {
        Some(Value::Number(number)) => number
            .as_i64()
            .and_then(|year| i32::try_from(year).ok())
            .ok_or_else(|| invalid("debe ser un año entero")),
        Some(Value::String(text)) if !text.trim().is_empty() => {
            text.trim().parse::<i32>().map_err(|_| invalid("debe ser un año entero"))
        }
        Some(Value::String(_)) | Some(Value::Null) | None => Err(DomainError::MissingField(field)),
        Some(_) => Err(invalid("debe ser un año entero")),
    }
}

/// Non-empty array of non-blank strings, order preserved.
pub(crate) fn required_text_list(
    value: Option<Value>,
    field: &'static str,
) -> Result<Vec<String>, DomainError> {
    let items = match value {
        Some(Value::Array(items)) => items,
        Some(Value::Null) | None => return Err(DomainError::MissingField(field)),
        Some(_) => {
            return Err(DomainError::InvalidField {
                field,
                reason: "debe ser una lista".to_string(),
            })
        }
    };

    if items.is_empty() {
        return Err(DomainError::EmptyModelList);
    }

    items
        .into_iter()
        .map(|item| match item {
            Value::String(text) if !text.trim().is_empty() => Ok(text.trim().to_string()),
            _ => Err(DomainError::InvalidField {
                field,
                reason: "cada elemento debe ser texto no vacío".to_string(),
            }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{required_text, required_text_list, required_year};
    use crate::errors::DomainError;

    #[test]
    fn text_trims_and_rejects_blank() {
        assert_eq!(required_text(Some(json!("  Toyota ")), "nombre"), Ok("Toyota".to_string()));
        assert_eq!(required_text(Some(json!("   ")), "nombre"), Err(DomainError::MissingField("nombre")));
        assert_eq!(required_text(None, "nombre"), Err(DomainError::MissingField("nombre")));
        assert!(matches!(
            required_text(Some(json!(12)), "nombre"),
            Err(DomainError::InvalidField { field: "nombre", .. })
        ));
    }

    #[test]
    fn year_accepts_numbers_and_numeric_strings() {
        assert_eq!(required_year(Some(json!("2010")), "anioInicio"), Ok(2010));
        assert_eq!(required_year(Some(json!(2015)), "anioFin"), Ok(2015));
        assert!(matches!(
            required_year(Some(json!("dos mil")), "anioInicio"),
            Err(DomainError::InvalidField { field: "anioInicio", .. })
        ));
        assert!(matches!(
            required_year(Some(json!(2010.5)), "anioInicio"),
            Err(DomainError::InvalidField { .. })
        ));
    }

    #[test]
    fn list_requires_at_least_one_entry() {
        assert_eq!(required_text_list(Some(json!([])), "modelosSlug"), Err(DomainError::EmptyModelList));
        assert_eq!(
            required_text_list(Some(json!(["corolla", "camry"])), "modelosSlug"),
            Ok(vec!["corolla".to_string(), "camry".to_string()])
        );
        assert!(matches!(
            required_text_list(Some(json!("corolla")), "modelosSlug"),
            Err(DomainError::InvalidField { .. })
        ));
        assert!(matches!(
            required_text_list(Some(json!(["corolla", ""])), "modelosSlug"),
            Err(DomainError::InvalidField { .. })
        ));
    }
}
