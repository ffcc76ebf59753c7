//! Value coercion against a typed reference.
//!
//! Persisted configuration files are hand-editable and may lag the running
//! version, so values arrive with the wrong type ("18" where 18 is meant).
//! Coercion converts a loaded value to the runtime type of its default
//! using a closed set of conversion rules, recursing into list elements.

use crate::error::CoercionError;
use serde_json::{Number, Value};

/// Coerce `value` to match the runtime type of `reference`.
///
/// For a non-empty list reference, every element of `value` is coerced
/// against the first reference element.
pub fn coerce(value: &Value, reference: &Value) -> Result<Value, CoercionError> {
    match reference {
        Value::Array(items) => match items.first() {
            Some(sample) => coerce_list(value, sample),
            // XXX: an empty reference list has no element sample, so the
            // value is returned as-is.
            None => Ok(value.clone()),
        },
        Value::Bool(_) => coerce_bool(value),
        Value::Number(n) if n.is_f64() => coerce_float(value),
        Value::Number(_) => coerce_integer(value),
        Value::String(_) => coerce_string(value),
        Value::Object(_) => match value {
            Value::Object(_) => Ok(value.clone()),
            _ => Err(fail(value, "section")),
        },
        Value::Null => Err(fail(value, "null")),
    }
}

fn coerce_list(value: &Value, sample: &Value) -> Result<Value, CoercionError> {
    let Value::Array(items) = value else {
        return Err(fail(value, "list"));
    };
    let items = items
        .iter()
        .map(|item| coerce(item, sample))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Value::Array(items))
}

fn coerce_bool(value: &Value) -> Result<Value, CoercionError> {
    match value {
        Value::Bool(_) => Ok(value.clone()),
        Value::Number(n) => Ok(Value::Bool(n.as_f64().unwrap_or(0.0) != 0.0)),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(fail(value, "boolean")),
        },
        _ => Err(fail(value, "boolean")),
    }
}

fn coerce_integer(value: &Value) -> Result<Value, CoercionError> {
    match value {
        Value::Number(n) if n.is_i64() || n.is_u64() => Ok(value.clone()),
        // Fractional values truncate toward zero.
        Value::Number(n) => Ok(Value::from(n.as_f64().unwrap_or(0.0) as i64)),
        Value::Bool(b) => Ok(Value::from(*b as i64)),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| fail(value, "integer")),
        _ => Err(fail(value, "integer")),
    }
}

fn coerce_float(value: &Value) -> Result<Value, CoercionError> {
    let float = match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    float
        .and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| fail(value, "float"))
}

fn coerce_string(value: &Value) -> Result<Value, CoercionError> {
    match value {
        Value::String(_) => Ok(value.clone()),
        Value::Bool(b) => Ok(Value::String(b.to_string())),
        Value::Number(n) => Ok(Value::String(n.to_string())),
        _ => Err(fail(value, "string")),
    }
}

fn fail(value: &Value, target: &'static str) -> CoercionError {
    CoercionError {
        value: value.clone(),
        target,
    }
}
