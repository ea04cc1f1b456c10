//! Values emitted by an interpreter through its output channel.
//!
//! Callers decide up front whether a value is a primitive or a structured
//! value; the sink never has to inspect types at runtime.

use serde::Serialize;
use std::fmt;

/// Anything an interpreter can print.
pub enum Loggable {
    /// Absent value, rendered as `null`.
    Null,
    /// Scalar with a default string form.
    Primitive(Primitive),
    /// Object-like value rendered through canonical JSON serialization.
    Structured(Box<dyn StructuredValue>),
}

/// Scalar values.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    /// Boolean scalar.
    Bool(bool),
    /// Signed integer scalar.
    Int(i64),
    /// Floating-point scalar.
    Float(f64),
    /// Text scalar.
    Str(String),
}

/// Object-safe view of a serializable value.
pub trait StructuredValue {
    /// Short type name used when the value cannot be serialized.
    fn type_tag(&self) -> &'static str;

    /// Serialize into a JSON tree.
    fn to_json(&self) -> serde_json::Result<serde_json::Value>;
}

impl<T: Serialize> StructuredValue for T {
    fn type_tag(&self) -> &'static str {
        short_type_name(std::any::type_name::<T>())
    }

    fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

/// Strip module paths and generic arguments: `alloc::vec::Vec<i32>` -> `Vec`.
fn short_type_name(full: &'static str) -> &'static str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

impl Loggable {
    /// Wrap any serializable value as a structured loggable.
    pub fn structured<T: Serialize + 'static>(value: T) -> Self {
        Loggable::Structured(Box::new(value))
    }

    /// Whether the value is structured.
    pub fn is_structured(&self) -> bool {
        matches!(self, Loggable::Structured(_))
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Primitive::Bool(flag) => write!(f, "{}", flag),
            Primitive::Int(num) => write!(f, "{}", num),
            Primitive::Float(num) => {
                if num.is_nan() {
                    f.write_str("NaN")
                } else if num.is_infinite() {
                    f.write_str(if *num > 0.0 { "Infinity" } else { "-Infinity" })
                } else if *num == 0.0 {
                    // negative zero prints as plain zero
                    f.write_str("0")
                } else {
                    write!(f, "{}", num)
                }
            }
            Primitive::Str(text) => f.write_str(text),
        }
    }
}

impl fmt::Debug for Loggable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Loggable::Null => f.write_str("Null"),
            Loggable::Primitive(value) => f.debug_tuple("Primitive").field(value).finish(),
            Loggable::Structured(value) => f
                .debug_tuple("Structured")
                .field(&value.type_tag())
                .finish(),
        }
    }
}

impl From<Primitive> for Loggable {
    fn from(value: Primitive) -> Self {
        Loggable::Primitive(value)
    }
}

impl From<bool> for Loggable {
    fn from(value: bool) -> Self {
        Loggable::Primitive(Primitive::Bool(value))
    }
}

macro_rules! loggable_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Loggable {
                fn from(value: $ty) -> Self {
                    Loggable::Primitive(Primitive::Int(i64::from(value)))
                }
            }
        )*
    };
}

loggable_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<u64> for Loggable {
    fn from(value: u64) -> Self {
        match i64::try_from(value) {
            Ok(num) => Loggable::Primitive(Primitive::Int(num)),
            Err(_) => Loggable::Primitive(Primitive::Float(value as f64)),
        }
    }
}

impl From<usize> for Loggable {
    fn from(value: usize) -> Self {
        Loggable::from(value as u64)
    }
}

impl From<f32> for Loggable {
    fn from(value: f32) -> Self {
        Loggable::Primitive(Primitive::Float(f64::from(value)))
    }
}

impl From<f64> for Loggable {
    fn from(value: f64) -> Self {
        Loggable::Primitive(Primitive::Float(value))
    }
}

impl From<&str> for Loggable {
    fn from(value: &str) -> Self {
        Loggable::Primitive(Primitive::Str(value.to_string()))
    }
}

impl From<String> for Loggable {
    fn from(value: String) -> Self {
        Loggable::Primitive(Primitive::Str(value))
    }
}

impl<T: Into<Loggable>> From<Option<T>> for Loggable {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(inner) => inner.into(),
            None => Loggable::Null,
        }
    }
}

impl From<serde_json::Value> for Loggable {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => Loggable::Null,
            Value::Bool(flag) => flag.into(),
            Value::Number(num) => match num.as_i64() {
                Some(int) => int.into(),
                None => num.as_f64().unwrap_or(f64::NAN).into(),
            },
            Value::String(text) => text.into(),
            structured @ (Value::Array(_) | Value::Object(_)) => Loggable::structured(structured),
        }
    }
}
