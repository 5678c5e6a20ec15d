use crate::document::Document;
use std::cmp::Ordering;
use std::fmt::{Debug, Display, Formatter};

/// Represents a [Document] value.
///
/// The variants cover exactly what a schema-less JSON document store can
/// hold: `null`, booleans, integers, floating point numbers, strings,
/// arrays and nested documents.
///
/// # Usage
/// ```text
/// let v1: Value = 42.into();
/// let v2 = Value::from("hello");
/// let doc = doc! { "age": 42, "name": "Alice" };
/// ```
///
/// Values serialize as plain JSON (the enum is untagged).
#[derive(Clone, Default, serde::Deserialize, serde::Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Represents a null value.
    #[default]
    Null,
    /// Represents a boolean value.
    Bool(bool),
    /// Represents a signed 64-bit integer value.
    I64(i64),
    /// Represents a 64-bit floating point value.
    F64(f64),
    /// Represents a string value.
    String(String),
    /// Represents an ordered list of values.
    Array(Vec<Value>),
    /// Represents a nested document.
    Document(Document),
}

impl Debug for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(v) => write!(f, "bool({})", v),
            Value::I64(v) => write!(f, "i64({})", v),
            Value::F64(v) => write!(f, "f64({})", v),
            Value::String(v) => write!(f, "string({:?})", v),
            Value::Array(v) => f.debug_list().entries(v.iter()).finish(),
            Value::Document(v) => write!(f, "{:?}", v),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(v) => write!(f, "{}", v),
            Value::I64(v) => write!(f, "{}", v),
            Value::F64(v) => write!(f, "{}", v),
            Value::String(v) => write!(f, "{:?}", v),
            Value::Array(v) => {
                write!(f, "[")?;
                for (index, value) in v.iter().enumerate() {
                    if index > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", value)?;
                }
                write!(f, "]")
            }
            Value::Document(v) => write!(f, "{}", v),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::I64(a), Value::I64(b)) => a == b,
            (Value::F64(a), Value::F64(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Value::I64(a), Value::F64(b)) | (Value::F64(b), Value::I64(a)) => (*a as f64) == *b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Document(a), Value::Document(b)) => a == b,
            _ => false,
        }
    }
}

impl Value {
    /// Creates a [Value] from anything convertible into one.
    pub fn from<T: Into<Value>>(value: T) -> Value {
        value.into()
    }

    /// Creates a [Value] from an optional value, mapping `None` to [Value::Null].
    pub fn from_option<T: Into<Value>>(value: Option<T>) -> Value {
        match value {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }

    pub fn as_bool(&self) -> Option<&bool> {
        match self {
            Value::Bool(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<&i64> {
        match self {
            Value::I64(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<&f64> {
        match self {
            Value::F64(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the numeric value as `f64` for both integer and float variants.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::I64(v) => Some(*v as f64),
            Value::F64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&String> {
        match self {
            Value::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_string().map(|s| s.as_str())
    }

    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Value::Document(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_document_mut(&mut self) -> Option<&mut Document> {
        match self {
            Value::Document(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::I64(_) | Value::F64(_))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    pub fn is_document(&self) -> bool {
        matches!(self, Value::Document(_))
    }

    /// Moves the value out, leaving [Value::Null] behind.
    pub fn take(&mut self) -> Value {
        std::mem::replace(self, Value::Null)
    }

    /// Position of the variant in view key collation order.
    fn collation_rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bool(false) => 1,
            Value::Bool(true) => 2,
            Value::I64(_) | Value::F64(_) => 3,
            Value::String(_) => 4,
            Value::Array(_) => 5,
            Value::Document(_) => 6,
        }
    }
}

/// Total ordering of values used for view keys.
///
/// `null < false < true < numbers < strings < arrays < documents`.
/// Numbers compare by magnitude regardless of variant, arrays compare
/// element by element and documents compare key by key in key order.
pub fn collate(a: &Value, b: &Value) -> Ordering {
    let rank = a.collation_rank().cmp(&b.collation_rank());
    if rank != Ordering::Equal {
        return rank;
    }

    match (a, b) {
        (Value::I64(x), Value::I64(y)) => x.cmp(y),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => {
            for (left, right) in x.iter().zip(y.iter()) {
                let ordering = collate(left, right);
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            x.len().cmp(&y.len())
        }
        (Value::Document(x), Value::Document(y)) => {
            for ((left_key, left), (right_key, right)) in x.iter().zip(y.iter()) {
                let ordering = left_key.cmp(right_key).then_with(|| collate(left, right));
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            x.size().cmp(&y.size())
        }
        _ => match (a.as_number(), b.as_number()) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => Ordering::Equal,
        },
    }
}

impl From<bool> for Value {
    #[inline]
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    #[inline]
    fn from(value: i32) -> Self {
        Value::I64(value as i64)
    }
}

impl From<i64> for Value {
    #[inline]
    fn from(value: i64) -> Self {
        Value::I64(value)
    }
}

impl From<u32> for Value {
    #[inline]
    fn from(value: u32) -> Self {
        Value::I64(value as i64)
    }
}

impl From<f32> for Value {
    #[inline]
    fn from(value: f32) -> Self {
        Value::F64(value as f64)
    }
}

impl From<f64> for Value {
    #[inline]
    fn from(value: f64) -> Self {
        Value::F64(value)
    }
}

impl From<String> for Value {
    #[inline]
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    #[inline]
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<&String> for Value {
    #[inline]
    fn from(value: &String) -> Self {
        Value::String(value.clone())
    }
}

impl From<Document> for Value {
    #[inline]
    fn from(value: Document) -> Self {
        Value::Document(value)
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(value: Option<T>) -> Self {
        Value::from_option(value)
    }
}

impl<T> From<Vec<T>> for Value
where
    T: Into<Value>,
{
    fn from(value: Vec<T>) -> Self {
        Value::Array(value.into_iter().map(Into::into).collect())
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc;

    #[test]
    fn test_from_primitives() {
        assert_eq!(Value::from(true), Value::Bool(true));
        assert_eq!(Value::from(42), Value::I64(42));
        assert_eq!(Value::from(42i64), Value::I64(42));
        assert_eq!(Value::from(1.5), Value::F64(1.5));
        assert_eq!(Value::from("hi"), Value::String("hi".to_string()));
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(
            Value::from(vec![1, 2]),
            Value::Array(vec![Value::I64(1), Value::I64(2)])
        );
    }

    #[test]
    fn test_numbers_compare_across_variants() {
        assert_eq!(Value::I64(3), Value::F64(3.0));
        assert_ne!(Value::I64(3), Value::F64(3.5));
        assert_ne!(Value::I64(3), Value::String("3".to_string()));
    }

    #[test]
    fn test_accessors() {
        let value = Value::from("text");
        assert_eq!(value.as_str(), Some("text"));
        assert!(value.as_i64().is_none());
        assert!(value.is_string());

        let value = Value::from(7);
        assert_eq!(value.as_number(), Some(7.0));
        assert!(value.is_number());
    }

    #[test]
    fn test_take_leaves_null() {
        let mut value = Value::from("moved");
        let taken = value.take();
        assert!(value.is_null());
        assert_eq!(taken, Value::from("moved"));
    }

    #[test]
    fn test_collation_order_across_types() {
        let ordered = vec![
            Value::Null,
            Value::Bool(false),
            Value::Bool(true),
            Value::I64(1),
            Value::F64(1.5),
            Value::I64(2),
            Value::from("a"),
            Value::from("b"),
            Value::Array(vec![Value::I64(1)]),
            Value::Array(vec![Value::I64(1), Value::I64(2)]),
            Value::Document(doc! { "a": 1 }),
        ];

        for window in ordered.windows(2) {
            assert_eq!(
                collate(&window[0], &window[1]),
                Ordering::Less,
                "{} should sort before {}",
                window[0],
                window[1]
            );
        }
    }

    #[test]
    fn test_display_is_json_like() {
        let value = Value::Array(vec![Value::from("x"), Value::Null, Value::from(2)]);
        assert_eq!(value.to_string(), "[\"x\",null,2]");
    }
}
