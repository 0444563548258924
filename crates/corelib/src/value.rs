//! Dynamic value model for call arguments and results.
//!
//! Values are self-describing: the enum variant is the runtime type tag, so
//! a peer can decode any argument or result without schema negotiation. The
//! model is deliberately small (scalars, strings, bytes, lists, string-keyed
//! maps) and biased toward cheap, predictable encoding.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when converting between `Value` and Rust types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueError {
    /// Value kind does not match the requested type
    #[error("expected {expected}, found {found}")]
    Mismatch {
        expected: &'static str,
        found: &'static str,
    },
    /// Numeric value does not fit in the requested type
    #[error("value out of range for {expected}")]
    OutOfRange { expected: &'static str },
}

impl ValueError {
    fn mismatch(expected: &'static str, found: &Value) -> Self {
        ValueError::Mismatch {
            expected,
            found: found.kind(),
        }
    }
}

/// A dynamically typed value crossing the wire.
///
/// Integers keep their signedness (`Int` vs `UInt`); conversions between the
/// two are accepted when the value fits. Floats never convert implicitly
/// from integers. Maps are string-keyed and ordered so encoding is
/// deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Unit,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Short name of this value's runtime type, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Unit => "unit",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::UInt(_) => "uint",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::Bytes(_) => "bytes",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }

    /// Build a `List` from anything convertible item-by-item.
    pub fn list<I, T>(items: I) -> Value
    where
        I: IntoIterator<Item = T>,
        T: IntoValue,
    {
        Value::List(items.into_iter().map(IntoValue::into_value).collect())
    }

    /// True if this is `Unit`.
    pub fn is_unit(&self) -> bool {
        matches!(self, Value::Unit)
    }

    /// Signed integer view. `UInt` values are accepted when they fit.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::UInt(n) => i64::try_from(*n).ok(),
            _ => None,
        }
    }

    /// Unsigned integer view. Non-negative `Int` values are accepted.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::UInt(n) => Some(*n),
            Value::Int(n) => u64::try_from(*n).ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(entries) => Some(entries),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unit => f.write_str("()"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::UInt(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::Bytes(bytes) => {
                f.write_str("0x")?;
                for byte in bytes {
                    write!(f, "{:02x}", byte)?;
                }
                Ok(())
            }
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Value::Map(entries) => {
                f.write_str("{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                f.write_str("}")
            }
        }
    }
}

/// Conversion of a Rust value into a wire `Value`.
pub trait IntoValue {
    fn into_value(self) -> Value;
}

/// Fallible conversion of a wire `Value` into a concrete Rust type.
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self, ValueError>;
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        Ok(value)
    }
}

impl IntoValue for () {
    fn into_value(self) -> Value {
        Value::Unit
    }
}

impl FromValue for () {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Unit => Ok(()),
            other => Err(ValueError::mismatch("unit", &other)),
        }
    }
}

impl IntoValue for bool {
    fn into_value(self) -> Value {
        Value::Bool(self)
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(ValueError::mismatch("bool", &other)),
        }
    }
}

// Integer conversions keep signedness on the wire but accept the other
// variant when the value fits the target type.
macro_rules! impl_signed_value {
    ($($ty:ty => $name:literal),* $(,)?) => {$(
        impl IntoValue for $ty {
            fn into_value(self) -> Value {
                Value::Int(self as i64)
            }
        }

        impl FromValue for $ty {
            fn from_value(value: Value) -> Result<Self, ValueError> {
                match value {
                    Value::Int(n) => <$ty>::try_from(n)
                        .map_err(|_| ValueError::OutOfRange { expected: $name }),
                    Value::UInt(n) => <$ty>::try_from(n)
                        .map_err(|_| ValueError::OutOfRange { expected: $name }),
                    other => Err(ValueError::mismatch($name, &other)),
                }
            }
        }
    )*};
}

macro_rules! impl_unsigned_value {
    ($($ty:ty => $name:literal),* $(,)?) => {$(
        impl IntoValue for $ty {
            fn into_value(self) -> Value {
                Value::UInt(self as u64)
            }
        }

        impl FromValue for $ty {
            fn from_value(value: Value) -> Result<Self, ValueError> {
                match value {
                    Value::UInt(n) => <$ty>::try_from(n)
                        .map_err(|_| ValueError::OutOfRange { expected: $name }),
                    Value::Int(n) => <$ty>::try_from(n)
                        .map_err(|_| ValueError::OutOfRange { expected: $name }),
                    other => Err(ValueError::mismatch($name, &other)),
                }
            }
        }
    )*};
}

impl_signed_value!(i16 => "i16", i32 => "i32", i64 => "i64");
impl_unsigned_value!(u16 => "u16", u32 => "u32", u64 => "u64", usize => "usize");

impl IntoValue for f64 {
    fn into_value(self) -> Value {
        Value::Float(self)
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Float(x) => Ok(x),
            other => Err(ValueError::mismatch("f64", &other)),
        }
    }
}

impl IntoValue for f32 {
    fn into_value(self) -> Value {
        Value::Float(self as f64)
    }
}

impl FromValue for f32 {
    /// Narrowing from the wire's `f64` is lossy and saturates to infinity.
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Float(x) => Ok(x as f32),
            other => Err(ValueError::mismatch("f32", &other)),
        }
    }
}

impl IntoValue for String {
    fn into_value(self) -> Value {
        Value::Str(self)
    }
}

impl IntoValue for &str {
    fn into_value(self) -> Value {
        Value::Str(self.to_string())
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Str(s) => Ok(s),
            other => Err(ValueError::mismatch("str", &other)),
        }
    }
}

impl IntoValue for Vec<u8> {
    fn into_value(self) -> Value {
        Value::Bytes(self)
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Bytes(bytes) => Ok(bytes),
            other => Err(ValueError::mismatch("bytes", &other)),
        }
    }
}

impl IntoValue for Vec<Value> {
    fn into_value(self) -> Value {
        Value::List(self)
    }
}

impl FromValue for Vec<Value> {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::List(items) => Ok(items),
            other => Err(ValueError::mismatch("list", &other)),
        }
    }
}

impl IntoValue for BTreeMap<String, Value> {
    fn into_value(self) -> Value {
        Value::Map(self)
    }
}

impl FromValue for BTreeMap<String, Value> {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Map(entries) => Ok(entries),
            other => Err(ValueError::mismatch("map", &other)),
        }
    }
}

impl<T: IntoValue> IntoValue for Option<T> {
    fn into_value(self) -> Value {
        match self {
            Some(inner) => inner.into_value(),
            None => Value::Unit,
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Unit => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}
