use im::OrdMap;
use smallvec::SmallVec;

use crate::common::{is_metadata_field, Value, DOC_ID, DOC_REV, DOC_TYPE};
use crate::errors::{ErrorKind, MapperError, MapperResult};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt::{Debug, Display};

type FieldVec = SmallVec<[String; 8]>;

/// A raw key/value document as exchanged with the document store.
///
/// Keys are always [String]s and values are [Value]s. A document may carry
/// store metadata next to application data:
///
/// * `_id` - the identifier of the document within the store.
/// * `_rev` - the revision token of the stored version.
/// * `doc_type` - the discriminator naming the registered shape.
/// * any other top level key starting with `_` is owned by the store.
///
/// The map is a persistent `im::OrdMap`, so cloning a document is O(1) and
/// every mutation leaves previously taken clones untouched. Rehydration
/// relies on this to keep the unfiltered payload around while it builds a
/// filtered application view.
#[derive(Clone, PartialEq, Default, serde::Deserialize, serde::Serialize)]
#[serde(transparent)]
pub struct Document {
    data: OrdMap<String, Value>,
}

impl Document {
    /// Creates a new empty document.
    pub fn new() -> Self {
        Document {
            data: OrdMap::new(),
        }
    }

    /// Checks if the document is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Associates `value` with `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an `InvalidOperation` error if the key is empty.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let mut doc = Document::new();
    /// doc.put("author", "Alice")?;
    /// doc.put("likes", 3)?;
    /// assert_eq!(doc.size(), 2);
    /// ```
    pub fn put<'a, T: Into<Value>>(&mut self, key: impl Into<Cow<'a, str>>, value: T) -> MapperResult<()> {
        let key = key.into();
        if key.is_empty() {
            log::error!("Document does not support empty key");
            return Err(MapperError::new(
                "Document does not support empty key",
                ErrorKind::InvalidOperation,
            ));
        }

        self.data.insert(key.into_owned(), value.into());
        Ok(())
    }

    /// Returns the value stored under `key`, or [Value::Null] when absent.
    pub fn get(&self, key: &str) -> Value {
        self.data.get(key).cloned().unwrap_or(Value::Null)
    }

    /// Returns a reference to the value stored under `key`, if any.
    pub fn get_ref(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Removes `key` and returns its previous value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.data.remove(key)
    }

    /// Checks if a top level key exists in the document.
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Returns the number of top level entries.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Returns all top level keys, metadata included.
    pub fn keys(&self) -> FieldVec {
        self.data.keys().cloned().collect()
    }

    /// Returns the application field names: every top level key that is
    /// neither store metadata nor the discriminator.
    pub fn fields(&self) -> FieldVec {
        self.data
            .keys()
            .filter(|key| !is_metadata_field(key))
            .cloned()
            .collect()
    }

    /// Iterates over the top level entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> + '_ {
        self.data.iter()
    }

    /// Copies every entry of `other` into this document, merging nested
    /// documents recursively.
    pub fn merge(&mut self, other: &Document) {
        for (key, value) in other.data.iter() {
            if let (Some(Value::Document(existing)), Value::Document(incoming)) =
                (self.data.get_mut(key), value)
            {
                existing.merge(incoming);
                continue;
            }
            self.data.insert(key.clone(), value.clone());
        }
    }

    /// Returns a copy of this document keeping only the entries accepted by
    /// `predicate`.
    pub fn filtered(&self, predicate: impl Fn(&str) -> bool) -> Document {
        self.data
            .iter()
            .filter(|(key, _)| predicate(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// The `_id` field, when it holds a string.
    pub fn id(&self) -> Option<&str> {
        self.data.get(DOC_ID).and_then(|v| v.as_str())
    }

    /// Checks if the document carries an `_id` entry of any type.
    pub fn has_id(&self) -> bool {
        self.data.contains_key(DOC_ID)
    }

    /// The `_rev` field, when it holds a string.
    pub fn revision(&self) -> Option<&str> {
        self.data.get(DOC_REV).and_then(|v| v.as_str())
    }

    /// The discriminator naming the registered shape of this document.
    pub fn doc_type(&self) -> Option<&str> {
        self.data.get(DOC_TYPE).and_then(|v| v.as_str())
    }

    pub fn to_map(&self) -> BTreeMap<String, Value> {
        self.data.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }
}

impl FromIterator<(String, Value)> for Document {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Document {
            data: iter.into_iter().collect(),
        }
    }
}

impl Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.data.iter()).finish()
    }
}

impl Display for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (index, (key, value)) in self.data.iter().enumerate() {
            if index > 0 {
                write!(f, ",")?;
            }
            write!(f, "{:?}:{}", key, value)?;
        }
        write!(f, "}}")
    }
}

pub fn normalize(value: &str) -> String {
    value.trim_matches('"').to_string()
}

/// Creates a [Document] with JSON-like syntax.
///
/// # Examples
///
/// ```rust
/// use docmap::doc;
///
/// let empty = doc!{};
///
/// let greeting = doc!{
///     author: "A",
///     content: "hi",
///     tags: ["short", "friendly"],
///     meta: { likes: 3 }
/// };
///
/// let quoted = doc!{ "_id": "g", "doc_type": "Greeting" };
/// assert_eq!(quoted.id(), Some("g"));
/// ```
#[macro_export]
macro_rules! doc {
    ({}) => {
        $crate::document::Document::new()
    };

    () => {
        $crate::document::Document::new()
    };

    ({ $($key:tt : $value:tt),* $(,)? }) => {
        $crate::doc!($($key : $value),*)
    };

    ($($key:tt : $value:tt),* $(,)?) => {
        {
            #[allow(unused_imports)]
            use $crate::doc_value;

            let mut doc = $crate::document::Document::new();
            $(
                doc.put($crate::document::normalize(stringify!($key)), $crate::doc_value!($value))
                .expect(&format!("Failed to put value {} in document", stringify!($value)));
            )*
            doc
        }
    };
}

/// Helper macro to convert values for the doc! macro.
#[macro_export]
macro_rules! doc_value {
    ({ $($key:tt : $value:tt),* $(,)? }) => {
        {
            $crate::common::Value::Document($crate::doc!{ $($key : $value),* })
        }
    };

    ([ $($value:tt),* $(,)? ]) => {
        $crate::common::Value::Array(vec![$($crate::doc_value!($value)),*])
    };

    ($value:expr) => {
        $crate::common::Value::from($value)
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc;

    fn set_up() -> Document {
        doc! {
            "_id": "greeting-1",
            "_rev": "1-abc",
            "doc_type": "Greeting",
            author: "A",
            content: "hi",
            meta: {
                likes: 3,
                tags: ["short", "friendly"],
            },
        }
    }

    #[test]
    fn test_put_and_get() {
        let mut doc = Document::new();
        doc.put("author", "A").unwrap();
        assert_eq!(doc.get("author"), Value::from("A"));
        assert_eq!(doc.get("missing"), Value::Null);
        assert!(doc.get_ref("missing").is_none());
    }

    #[test]
    fn test_put_rejects_empty_key() {
        let mut doc = Document::new();
        let err = doc.put("", 1).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidOperation);
    }

    #[test]
    fn test_metadata_accessors() {
        let doc = set_up();
        assert_eq!(doc.id(), Some("greeting-1"));
        assert_eq!(doc.revision(), Some("1-abc"));
        assert_eq!(doc.doc_type(), Some("Greeting"));
        assert!(doc.has_id());
    }

    #[test]
    fn test_non_string_id_is_not_an_id() {
        let doc = doc! { "_id": 42 };
        assert!(doc.has_id());
        assert_eq!(doc.id(), None);
    }

    #[test]
    fn test_fields_exclude_metadata() {
        let doc = set_up();
        let fields = doc.fields();
        assert_eq!(fields.as_slice(), &["author", "content", "meta"]);
        assert_eq!(doc.keys().len(), 6);
    }

    #[test]
    fn test_filtered_keeps_original_untouched() {
        let doc = set_up();
        let filtered = doc.filtered(|key| !is_metadata_field(key));
        assert_eq!(filtered.size(), 3);
        assert_eq!(doc.size(), 6);
        assert!(!filtered.contains_key("_id"));
    }

    #[test]
    fn test_remove() {
        let mut doc = set_up();
        assert_eq!(doc.remove("author"), Some(Value::from("A")));
        assert_eq!(doc.remove("author"), None);
        assert!(!doc.contains_key("author"));
    }

    #[test]
    fn test_merge_nested() {
        let mut doc = set_up();
        doc.merge(&doc! { meta: { likes: 4, shared: true }, content: "hello" });
        assert_eq!(doc.get("content"), Value::from("hello"));
        let meta = doc.get("meta");
        let meta = meta.as_document().unwrap();
        assert_eq!(meta.get("likes"), Value::from(4));
        assert_eq!(meta.get("shared"), Value::from(true));
        assert!(meta.contains_key("tags"));
    }

    #[test]
    fn test_clone_is_independent() {
        let original = set_up();
        let mut copy = original.clone();
        copy.put("content", "changed").unwrap();
        assert_eq!(original.get("content"), Value::from("hi"));
    }

    #[test]
    fn test_display_and_serde_agree() {
        let doc = doc! { a: 1, b: "x" };
        assert_eq!(doc.to_string(), "{\"a\":1,\"b\":\"x\"}");
        let json = serde_json::to_string(&doc).unwrap();
        assert_eq!(json, "{\"a\":1,\"b\":\"x\"}");
        let parsed: Document = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, doc);
    }
}
