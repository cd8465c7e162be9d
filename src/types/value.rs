//! Decoded telemetry values and typed extraction

use serde::{Deserialize, Serialize};

use super::{BitField, VariableType};

/// One decoded variable value: a scalar or a fixed-length sequence of one of the six
/// wire types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Char(u8),
    Bool(bool),
    Int(i32),
    BitField(String),
    Float(f32),
    Double(f64),
    CharArray(Vec<u8>),
    BoolArray(Vec<bool>),
    IntArray(Vec<i32>),
    BitFieldArray(Vec<String>),
    FloatArray(Vec<f32>),
    DoubleArray(Vec<f64>),
}

impl Value {
    /// Rust type name of the held value, as reported in type mismatch errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Char(_) => "u8",
            Value::Bool(_) => "bool",
            Value::Int(_) => "i32",
            Value::BitField(_) => "String",
            Value::Float(_) => "f32",
            Value::Double(_) => "f64",
            Value::CharArray(_) => "Vec<u8>",
            Value::BoolArray(_) => "Vec<bool>",
            Value::IntArray(_) => "Vec<i32>",
            Value::BitFieldArray(_) => "Vec<String>",
            Value::FloatArray(_) => "Vec<f32>",
            Value::DoubleArray(_) => "Vec<f64>",
        }
    }

    /// Wire type of the value's elements.
    pub fn variable_type(&self) -> VariableType {
        match self {
            Value::Char(_) | Value::CharArray(_) => VariableType::Char,
            Value::Bool(_) | Value::BoolArray(_) => VariableType::Bool,
            Value::Int(_) | Value::IntArray(_) => VariableType::Int32,
            Value::BitField(_) | Value::BitFieldArray(_) => VariableType::BitField,
            Value::Float(_) | Value::FloatArray(_) => VariableType::Float32,
            Value::Double(_) | Value::DoubleArray(_) => VariableType::Float64,
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(
            self,
            Value::CharArray(_)
                | Value::BoolArray(_)
                | Value::IntArray(_)
                | Value::BitFieldArray(_)
                | Value::FloatArray(_)
                | Value::DoubleArray(_)
        )
    }
}

/// Trait for types that can be extracted from a decoded [`Value`].
pub trait FromValue: Sized {
    /// Name reported as the expected type when extraction fails.
    const TYPE_NAME: &'static str;

    /// Returns `None` when the value holds a different type.
    fn from_value(value: &Value) -> Option<Self>;
}

macro_rules! impl_from_value {
    ($ty:ty, $name:literal, $variant:ident) => {
        impl FromValue for $ty {
            const TYPE_NAME: &'static str = $name;

            fn from_value(value: &Value) -> Option<Self> {
                match value {
                    Value::$variant(inner) => Some(inner.clone()),
                    _ => None,
                }
            }
        }
    };
}

impl_from_value!(u8, "u8", Char);
impl_from_value!(bool, "bool", Bool);
impl_from_value!(i32, "i32", Int);
impl_from_value!(String, "String", BitField);
impl_from_value!(f32, "f32", Float);
impl_from_value!(f64, "f64", Double);
impl_from_value!(Vec<u8>, "Vec<u8>", CharArray);
impl_from_value!(Vec<bool>, "Vec<bool>", BoolArray);
impl_from_value!(Vec<i32>, "Vec<i32>", IntArray);
impl_from_value!(Vec<String>, "Vec<String>", BitFieldArray);
impl_from_value!(Vec<f32>, "Vec<f32>", FloatArray);
impl_from_value!(Vec<f64>, "Vec<f64>", DoubleArray);

// Parses the rendered hex form back into flags.
impl FromValue for BitField {
    const TYPE_NAME: &'static str = "BitField";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::BitField(hex) => hex.parse().ok(),
            _ => None,
        }
    }
}
