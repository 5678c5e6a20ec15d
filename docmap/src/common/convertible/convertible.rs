use crate::common::Value;
use crate::document::Document;
use crate::errors::{ErrorKind, MapperError, MapperResult};
use std::collections::{BTreeMap, HashMap};

/// Explicit serialization contract between application types and [Value].
///
/// Every shape registered with the mapper implements this trait (usually
/// through `#[derive(Convertible)]`), which replaces runtime attribute
/// introspection with a to-map / from-map pair.
pub trait Convertible {
    type Output;

    fn to_value(&self) -> MapperResult<Value>;
    fn from_value(value: &Value) -> MapperResult<Self::Output>;
}

fn mismatch(value: &Value, expected: &str) -> MapperError {
    log::error!("Value {} is not {}", value, expected);
    MapperError::new(
        &format!("Value is not {}", expected),
        ErrorKind::ObjectMappingError,
    )
}

impl Convertible for bool {
    type Output = bool;

    fn to_value(&self) -> MapperResult<Value> {
        Ok(Value::Bool(*self))
    }

    fn from_value(value: &Value) -> MapperResult<Self> {
        match value {
            Value::Bool(b) => Ok(*b),
            _ => Err(mismatch(value, "a bool")),
        }
    }
}

impl Convertible for i32 {
    type Output = i32;

    fn to_value(&self) -> MapperResult<Value> {
        Ok(Value::I64(*self as i64))
    }

    fn from_value(value: &Value) -> MapperResult<Self> {
        match value {
            Value::I64(i) => i32::try_from(*i).map_err(|_| mismatch(value, "an i32")),
            _ => Err(mismatch(value, "an i32")),
        }
    }
}

impl Convertible for i64 {
    type Output = i64;

    fn to_value(&self) -> MapperResult<Value> {
        Ok(Value::I64(*self))
    }

    fn from_value(value: &Value) -> MapperResult<Self> {
        match value {
            Value::I64(i) => Ok(*i),
            _ => Err(mismatch(value, "an i64")),
        }
    }
}

impl Convertible for u32 {
    type Output = u32;

    fn to_value(&self) -> MapperResult<Value> {
        Ok(Value::I64(*self as i64))
    }

    fn from_value(value: &Value) -> MapperResult<Self> {
        match value {
            Value::I64(i) => u32::try_from(*i).map_err(|_| mismatch(value, "a u32")),
            _ => Err(mismatch(value, "a u32")),
        }
    }
}

impl Convertible for u64 {
    type Output = u64;

    fn to_value(&self) -> MapperResult<Value> {
        i64::try_from(*self)
            .map(Value::I64)
            .map_err(|_| {
                log::error!("u64 value {} does not fit into a document integer", self);
                MapperError::new(
                    "u64 value does not fit into a document integer",
                    ErrorKind::ObjectMappingError,
                )
            })
    }

    fn from_value(value: &Value) -> MapperResult<Self> {
        match value {
            Value::I64(i) => u64::try_from(*i).map_err(|_| mismatch(value, "a u64")),
            _ => Err(mismatch(value, "a u64")),
        }
    }
}

impl Convertible for f32 {
    type Output = f32;

    fn to_value(&self) -> MapperResult<Value> {
        Ok(Value::F64(*self as f64))
    }

    fn from_value(value: &Value) -> MapperResult<Self> {
        value
            .as_number()
            .map(|n| n as f32)
            .ok_or_else(|| mismatch(value, "an f32"))
    }
}

impl Convertible for f64 {
    type Output = f64;

    fn to_value(&self) -> MapperResult<Value> {
        Ok(Value::F64(*self))
    }

    fn from_value(value: &Value) -> MapperResult<Self> {
        value.as_number().ok_or_else(|| mismatch(value, "an f64"))
    }
}

impl Convertible for char {
    type Output = char;

    fn to_value(&self) -> MapperResult<Value> {
        Ok(Value::String(self.to_string()))
    }

    fn from_value(value: &Value) -> MapperResult<Self> {
        match value {
            Value::String(s) if s.chars().count() == 1 => {
                s.chars().next().ok_or_else(|| mismatch(value, "a char"))
            }
            _ => Err(mismatch(value, "a char")),
        }
    }
}

impl Convertible for String {
    type Output = String;

    fn to_value(&self) -> MapperResult<Value> {
        Ok(Value::String(self.clone()))
    }

    fn from_value(value: &Value) -> MapperResult<Self> {
        match value {
            Value::String(s) => Ok(s.clone()),
            _ => Err(mismatch(value, "a string")),
        }
    }
}

impl Convertible for Document {
    type Output = Document;

    fn to_value(&self) -> MapperResult<Value> {
        Ok(Value::Document(self.clone()))
    }

    fn from_value(value: &Value) -> MapperResult<Self> {
        match value {
            Value::Document(doc) => Ok(doc.clone()),
            _ => Err(mismatch(value, "a document")),
        }
    }
}

impl Convertible for Value {
    type Output = Value;

    fn to_value(&self) -> MapperResult<Value> {
        Ok(self.clone())
    }

    fn from_value(value: &Value) -> MapperResult<Self> {
        Ok(value.clone())
    }
}

impl<T> Convertible for Option<T>
where
    T: Convertible<Output = T>,
{
    type Output = Option<T>;

    fn to_value(&self) -> MapperResult<Value> {
        match self {
            Some(v) => v.to_value(),
            None => Ok(Value::Null),
        }
    }

    fn from_value(value: &Value) -> MapperResult<Self::Output> {
        match value {
            Value::Null => Ok(None),
            _ => T::from_value(value).map(Some),
        }
    }
}

impl<T> Convertible for Box<T>
where
    T: Convertible<Output = T>,
{
    type Output = Box<T>;

    fn to_value(&self) -> MapperResult<Value> {
        self.as_ref().to_value()
    }

    fn from_value(value: &Value) -> MapperResult<Self::Output> {
        T::from_value(value).map(Box::new)
    }
}

impl<T> Convertible for Vec<T>
where
    T: Convertible<Output = T>,
{
    type Output = Vec<T>;

    fn to_value(&self) -> MapperResult<Value> {
        let mut values = Vec::with_capacity(self.len());
        for item in self {
            values.push(item.to_value()?);
        }
        Ok(Value::Array(values))
    }

    fn from_value(value: &Value) -> MapperResult<Self::Output> {
        match value {
            Value::Array(items) => items.iter().map(T::from_value).collect(),
            _ => Err(mismatch(value, "an array")),
        }
    }
}

impl<V> Convertible for BTreeMap<String, V>
where
    V: Convertible<Output = V>,
{
    type Output = BTreeMap<String, V>;

    fn to_value(&self) -> MapperResult<Value> {
        let mut doc = Document::new();
        for (key, value) in self {
            doc.put(key.as_str(), value.to_value()?)?;
        }
        Ok(Value::Document(doc))
    }

    fn from_value(value: &Value) -> MapperResult<Self::Output> {
        match value {
            Value::Document(doc) => doc
                .iter()
                .map(|(key, value)| V::from_value(value).map(|v| (key.clone(), v)))
                .collect(),
            _ => Err(mismatch(value, "a document")),
        }
    }
}

impl<V> Convertible for HashMap<String, V>
where
    V: Convertible<Output = V>,
{
    type Output = HashMap<String, V>;

    fn to_value(&self) -> MapperResult<Value> {
        let mut doc = Document::new();
        for (key, value) in self {
            doc.put(key.as_str(), value.to_value()?)?;
        }
        Ok(Value::Document(doc))
    }

    fn from_value(value: &Value) -> MapperResult<Self::Output> {
        match value {
            Value::Document(doc) => doc
                .iter()
                .map(|(key, value)| V::from_value(value).map(|v| (key.clone(), v)))
                .collect(),
            _ => Err(mismatch(value, "a document")),
        }
    }
}

/// Decodes `value` into `T` through its [Convertible] implementation.
pub fn from_value<T>(value: &Value) -> MapperResult<T::Output>
where
    T: Convertible,
{
    T::from_value(value)
}

/// Encodes `data` into a [Value] through its [Convertible] implementation.
pub fn to_value<T>(data: &T) -> MapperResult<Value>
where
    T: Convertible,
{
    data.to_value()
}
