use serde_json::Value;

use crate::shipment::present;

/// Value of a single edit-form input.
#[derive(Debug, Clone, PartialEq)]
pub enum FormValue {
    Empty,
    Text(String),
    Number(f64),
}

/// Missing inputs, `null`, `""` and the `"NULL"` sentinel all count as empty.
pub fn classify_form_value(optional_value: Option<&Value>) -> Result<FormValue, String> {
    match optional_value {
        None | Some(Value::Null) => Ok(FormValue::Empty),
        Some(Value::String(s)) => match present(Some(s.as_str())) {
            None | Some("") => Ok(FormValue::Empty),
            Some(text) => Ok(FormValue::Text(text.to_owned())),
        },
        Some(Value::Number(n)) => n
            .as_f64()
            .map(FormValue::Number)
            .ok_or_else(|| format!("unsupported number {n}")),
        Some(other) => Err(format!("expected string, number or null, got {other}")),
    }
}

pub fn form_text(field: &str, optional_value: Option<&Value>) -> Result<Option<String>, String> {
    match classify_form_value(optional_value).map_err(|err| format!("{field}: {err}"))? {
        FormValue::Empty => Ok(None),
        FormValue::Text(text) => Ok(Some(text)),
        FormValue::Number(number) => Ok(Some(number.to_string())),
    }
}

/// Empty input means "unset"; anything else has to parse as a finite number.
pub fn form_number(field: &str, optional_value: Option<&Value>) -> Result<Option<f64>, String> {
    let number = match classify_form_value(optional_value).map_err(|err| format!("{field}: {err}"))? {
        FormValue::Empty => return Ok(None),
        FormValue::Number(number) => number,
        FormValue::Text(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed
                .replace(',', ".")
                .parse::<f64>()
                .map_err(|_| format!("{field} must be a number, got {text:?}"))?
        }
    };
    if number.is_finite() {
        Ok(Some(number))
    } else {
        Err(format!("{field} must be a finite number"))
    }
}
