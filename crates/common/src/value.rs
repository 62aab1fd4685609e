//! Runtime value representation for the IPPcode interpreter.
//!
//! A variable slot is `Option<Value>`: `None` while the variable is declared
//! but not yet assigned. Type and payload therefore always travel together.

use crate::data_type::DataType;
use std::fmt;

/// A fully defined runtime value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Signed 64-bit integer.
    Int(i64),
    /// Boolean value.
    Bool(bool),
    /// Unicode string. Lengths and indices count code points.
    String(String),
    /// IEEE 754 64-bit float.
    Float(f64),
}

impl Value {
    /// Returns the type of this value.
    pub fn data_type(&self) -> DataType {
        match self {
            Value::Int(_) => DataType::Int,
            Value::Bool(_) => DataType::Bool,
            Value::String(_) => DataType::String,
            Value::Float(_) => DataType::Float,
        }
    }

    /// The value READ produces when input is missing or cannot be parsed.
    pub fn default_for(data_type: DataType) -> Value {
        match data_type {
            DataType::Int => Value::Int(0),
            DataType::Bool => Value::Bool(false),
            DataType::String => Value::String(String::new()),
            DataType::Float => Value::Float(0.0),
        }
    }

    /// `type@value` rendering used by state dumps.
    pub fn typed(&self) -> String {
        format!("{}@{}", self.data_type(), self)
    }
}

/// The textual form printed by WRITE and DPRINT.
///
/// Booleans print as `true`/`false`, floats always carry a fractional part
/// or a signed exponent of at least two digits (`5.0`, `1e+16`, `1e-05`).
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::String(s) => f.write_str(s),
            Value::Float(x) => write_float(f, *x),
        }
    }
}

/// Shortest round-trip digits. Magnitudes from `1e-4` up to `1e16` print
/// positionally, the rest in exponent form.
fn write_float(f: &mut fmt::Formatter<'_>, x: f64) -> fmt::Result {
    if x.is_nan() {
        return f.write_str("nan");
    }
    let shortest = format!("{x:?}");
    match shortest.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            write!(f, "{mantissa}e{sign}{digits:0>2}")
        }
        None => f.write_str(&shortest),
    }
}
