//! Text-to-scalar coercion.

use thiserror::Error;

use crate::schema::ScalarKind;

/// A coerced scalar, widened to 64 bits for integers.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    String(String),
    Int(i64),
    Uint(u64),
    Bool(bool),
    F32(f32),
    F64(f64),
}

impl ScalarValue {
    pub fn kind(&self) -> ScalarKind {
        match self {
            ScalarValue::String(_) => ScalarKind::String,
            ScalarValue::Int(_) => ScalarKind::Int,
            ScalarValue::Uint(_) => ScalarKind::Uint,
            ScalarValue::Bool(_) => ScalarKind::Bool,
            ScalarValue::F32(_) => ScalarKind::F32,
            ScalarValue::F64(_) => ScalarKind::F64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoerceError {
    /// The text is not a valid literal of the target kind.
    #[error("{0}")]
    Invalid(String),

    /// The target kind has no coercion rule.
    #[error("unsupported scalar type: {0}")]
    Unsupported(&'static str),
}

/// Convert `raw` into a value of `kind`.
pub fn coerce(raw: &str, kind: ScalarKind) -> Result<ScalarValue, CoerceError> {
    let invalid = |e: &dyn std::fmt::Display| CoerceError::Invalid(e.to_string());
    match kind {
        ScalarKind::String => Ok(ScalarValue::String(raw.to_owned())),
        ScalarKind::Int => raw.parse().map(ScalarValue::Int).map_err(|e| invalid(&e)),
        ScalarKind::Uint => raw.parse().map(ScalarValue::Uint).map_err(|e| invalid(&e)),
        ScalarKind::Bool => parse_bool(raw)
            .map(ScalarValue::Bool)
            .ok_or_else(|| CoerceError::Invalid("invalid boolean literal".into())),
        ScalarKind::F32 => raw.parse().map(ScalarValue::F32).map_err(|e| invalid(&e)),
        ScalarKind::F64 => raw.parse().map(ScalarValue::F64).map_err(|e| invalid(&e)),
        ScalarKind::Other(name) => Err(CoerceError::Unsupported(name)),
    }
}

/// Boolean literals: `1 t T TRUE true True` and `0 f F FALSE false False`.
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}
