//! Typed hyperparameter values and string type inference
//!
//! Hyperparameters arrive as strings on the command line. `infer_dtype`
//! guesses the narrowest type with a fixed precedence so the same token
//! always decodes to the same value.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::fmt;

/// A single hyperparameter value after type inference.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum HpValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    /// Any structure parsed as a JSON document (arrays, objects, quoted strings, ...)
    Json(Value),
    String(String),
}

impl HpValue {
    /// Re-run inference on a value that is still an untyped string.
    ///
    /// Every other variant is already typed and is returned as-is.
    pub fn infer(self) -> HpValue {
        match self {
            HpValue::String(text) => infer_dtype(&text),
            typed => typed,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, HpValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            HpValue::String(text) => Some(text),
            HpValue::Json(Value::String(text)) => Some(text),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            HpValue::Bool(flag) => Some(*flag),
            HpValue::Json(Value::Bool(flag)) => Some(*flag),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            HpValue::Int(n) => Some(*n),
            HpValue::Json(Value::Number(n)) => n.as_i64(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            HpValue::Int(n) => Some(*n as f64),
            HpValue::Float(x) => Some(*x),
            HpValue::Json(Value::Number(n)) => n.as_f64(),
            _ => None,
        }
    }

    /// Numbers in a JSON array, or a single number as a one-element list.
    pub fn as_f64_list(&self) -> Option<Vec<f64>> {
        match self {
            HpValue::Json(Value::Array(items)) => items.iter().map(Value::as_f64).collect(),
            other => other.as_f64().map(|x| vec![x]),
        }
    }
}

impl From<Value> for HpValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => HpValue::Null,
            Value::Bool(flag) => HpValue::Bool(flag),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    HpValue::Int(i)
                } else if n.is_f64() {
                    n.as_f64().map(HpValue::Float).unwrap_or(HpValue::Json(Value::Number(n)))
                } else {
                    // u64 above i64::MAX stays lossless
                    HpValue::Json(Value::Number(n))
                }
            }
            Value::String(text) => HpValue::String(text),
            structured => HpValue::Json(structured),
        }
    }
}

impl From<HpValue> for Value {
    fn from(value: HpValue) -> Self {
        match value {
            HpValue::Null => Value::Null,
            HpValue::Bool(flag) => Value::Bool(flag),
            HpValue::Int(n) => Value::Number(n.into()),
            HpValue::Float(x) => Number::from_f64(x)
                .map(Value::Number)
                .unwrap_or_else(|| Value::String(non_finite_spelling(x).to_string())),
            HpValue::Json(v) => v,
            HpValue::String(text) => Value::String(text),
        }
    }
}

impl From<&str> for HpValue {
    fn from(text: &str) -> Self {
        HpValue::String(text.to_string())
    }
}

impl From<i64> for HpValue {
    fn from(n: i64) -> Self {
        HpValue::Int(n)
    }
}

impl From<f64> for HpValue {
    fn from(x: f64) -> Self {
        HpValue::Float(x)
    }
}

impl From<bool> for HpValue {
    fn from(flag: bool) -> Self {
        HpValue::Bool(flag)
    }
}

impl fmt::Display for HpValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HpValue::Null => write!(f, "None"),
            HpValue::Bool(true) => write!(f, "True"),
            HpValue::Bool(false) => write!(f, "False"),
            HpValue::Int(n) => write!(f, "{}", n),
            HpValue::Float(x) => write!(f, "{:?}", x),
            HpValue::Json(v) => write!(f, "{}", v),
            HpValue::String(text) => write!(f, "{}", text),
        }
    }
}

/// Auto-cast a string to the nearest matching type.
///
/// Precedence: `None`, `True`/`False`, number, JSON document, plain string.
/// Numbers follow the float grammar with `_` allowed between digits; they
/// become floats only when the text carries a `.` or an exponent marker.
pub fn infer_dtype(text: &str) -> HpValue {
    match text {
        "None" => return HpValue::Null,
        "True" => return HpValue::Bool(true),
        "False" => return HpValue::Bool(false),
        _ => {}
    }

    if let Some(value) = infer_number(text) {
        return value;
    }

    // The JSON literals for non-finite floats, outside strict JSON
    match text.trim() {
        "NaN" => return HpValue::Float(f64::NAN),
        "Infinity" => return HpValue::Float(f64::INFINITY),
        "-Infinity" => return HpValue::Float(f64::NEG_INFINITY),
        _ => {}
    }

    match serde_json::from_str::<Value>(text) {
        Ok(value) => HpValue::Json(value),
        Err(_) => HpValue::String(text.to_string()),
    }
}

fn infer_number(text: &str) -> Option<HpValue> {
    let digits = strip_digit_separators(text.trim())?;
    let float = digits.parse::<f64>().ok()?;

    if text.contains('.') || text.contains(['e', 'E']) {
        return Some(HpValue::Float(float));
    }

    if let Ok(n) = digits.parse::<i64>() {
        return Some(HpValue::Int(n));
    }

    // Wider than i64: exact as a u64 JSON number, otherwise kept verbatim
    if is_integer_literal(&digits) {
        return Some(match digits.parse::<u64>() {
            Ok(n) => HpValue::Json(Value::Number(n.into())),
            Err(_) => HpValue::String(text.to_string()),
        });
    }

    // `inf` and `nan` parse as floats but not as integers
    None
}

fn is_integer_literal(digits: &str) -> bool {
    let unsigned = digits.strip_prefix(['+', '-']).unwrap_or(digits);
    !unsigned.is_empty() && unsigned.bytes().all(|b| b.is_ascii_digit())
}

/// How a non-finite float is written, since JSON numbers cannot hold it.
fn non_finite_spelling(x: f64) -> &'static str {
    if x.is_nan() {
        "NaN"
    } else if x.is_sign_positive() {
        "Infinity"
    } else {
        "-Infinity"
    }
}

/// Remove `_` digit separators, rejecting any `_` that is not between two digits.
fn strip_digit_separators(text: &str) -> Option<String> {
    let mut out = String::with_capacity(text.len());
    let mut prev: Option<char> = None;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '_' {
            let prev_digit = prev.is_some_and(|p| p.is_ascii_digit());
            let next_digit = chars.peek().is_some_and(|n| n.is_ascii_digit());
            if !(prev_digit && next_digit) {
                return None;
            }
        } else {
            out.push(ch);
        }
        prev = Some(ch);
    }

    Some(out)
}
