use crate::common::{Value, DOC_ID, DOC_REV, ROW_DOC, ROW_ID, ROW_KEY, ROW_REV, ROW_VALUE};
use crate::document::Document;
use crate::errors::{ErrorKind, MapperError, MapperResult};
use crate::mapping::{MappedDocument, Materialized, Payload, Rehydrator};

/// The value of a view row after rehydration.
#[derive(Clone, Debug, PartialEq)]
pub enum RowValue {
    /// The row value was a document and went through rehydration.
    Document(Materialized),
    /// Any other emitted value, untouched.
    Scalar(Value),
}

impl RowValue {
    pub fn as_materialized(&self) -> Option<&Materialized> {
        match self {
            RowValue::Document(materialized) => Some(materialized),
            RowValue::Scalar(_) => None,
        }
    }

    pub fn as_typed(&self) -> Option<&MappedDocument> {
        self.as_materialized().and_then(Materialized::as_typed)
    }

    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            RowValue::Document(_) => None,
            RowValue::Scalar(value) => Some(value),
        }
    }

    /// Serialized form of the value.
    pub fn to_value(&self) -> MapperResult<Value> {
        match self {
            RowValue::Document(materialized) => materialized.to_document().map(Value::Document),
            RowValue::Scalar(value) => Ok(value.clone()),
        }
    }
}

/// One row of a view result, with its value rehydrated.
///
/// Holds everything the store put into the row envelope: the emitting
/// document's `id`, the `key`, the `value` and any sibling entries
/// (`rev`, `doc`, ...) under [ViewRow::extra].
#[derive(Clone, Debug, PartialEq)]
pub struct ViewRow {
    id: Value,
    key: Value,
    value: RowValue,
    extra: Document,
}

impl ViewRow {
    /// Splits `envelope` into a row, rehydrating a document value.
    ///
    /// The row `id` is copied into the value's `_id`. A value without
    /// `_rev` gets its revision promoted from a nested `rev` entry (moved,
    /// as listed by `_all_docs`) or else from a sibling `rev` of the
    /// envelope.
    pub(crate) fn from_envelope(mut envelope: Document, rehydrator: &Rehydrator) -> MapperResult<ViewRow> {
        let id = envelope.remove(ROW_ID).unwrap_or_default();
        let key = envelope.remove(ROW_KEY).unwrap_or_default();
        let value = match envelope.remove(ROW_VALUE).unwrap_or_default() {
            Value::Document(mut nested) => {
                if !id.is_null() {
                    nested.put(DOC_ID, id.clone())?;
                }
                if !nested.contains_key(DOC_REV) {
                    let promoted = nested
                        .remove(ROW_REV)
                        .or_else(|| envelope.get_ref(ROW_REV).cloned())
                        .filter(|rev| !rev.is_null());
                    if let Some(rev) = promoted {
                        nested.put(DOC_REV, rev)?;
                    }
                }
                RowValue::Document(rehydrator.materialize(Payload::Raw(nested))?)
            }
            scalar => RowValue::Scalar(scalar),
        };

        Ok(ViewRow {
            id,
            key,
            value,
            extra: envelope,
        })
    }

    /// Identifier of the document that emitted the row.
    pub fn id(&self) -> Option<&str> {
        self.id.as_str()
    }

    pub fn key(&self) -> &Value {
        &self.key
    }

    pub fn value(&self) -> &RowValue {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut RowValue {
        &mut self.value
    }

    pub fn into_value(self) -> RowValue {
        self.value
    }

    /// Sibling entries of the envelope.
    pub fn extra(&self) -> &Document {
        &self.extra
    }

    pub fn get(&self, name: &str) -> Value {
        self.extra.get(name)
    }

    /// The full document included with the row, if requested.
    pub fn doc(&self) -> Option<&Document> {
        self.extra.get_ref(ROW_DOC).and_then(Value::as_document)
    }

    /// The rehydrated value.
    ///
    /// # Errors
    ///
    /// Returns an `ObjectMappingError` when the row value is not a
    /// document.
    pub fn into_materialized(self) -> MapperResult<Materialized> {
        match self.value {
            RowValue::Document(materialized) => Ok(materialized),
            RowValue::Scalar(value) => {
                log::error!("View row value {} is not a document", value);
                Err(MapperError::new(
                    &format!("View row value {} is not a document", value),
                    ErrorKind::ObjectMappingError,
                ))
            }
        }
    }

    /// Rebuilds the envelope with the value serialized again.
    pub fn into_envelope(self) -> MapperResult<Document> {
        let mut envelope = self.extra;
        if !self.id.is_null() {
            envelope.put(ROW_ID, self.id)?;
        }
        envelope.put(ROW_KEY, self.key)?;
        envelope.put(ROW_VALUE, self.value.to_value()?)?;
        Ok(envelope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc;
    use crate::mapping::ClassRegistry;

    fn rehydrator() -> Rehydrator {
        Rehydrator::new(ClassRegistry::new())
    }

    #[test]
    fn test_row_id_and_nested_rev() {
        let envelope = doc! { id: "x", key: "x", value: { content: "hi", rev: "r1" } };
        let row = ViewRow::from_envelope(envelope, &rehydrator()).unwrap();
        let typed = row.value().as_typed().unwrap();
        assert_eq!(typed.id(), Some("x"));
        assert_eq!(typed.rev(), Some("r1"));
        assert!(!typed.fields().contains_key("rev"));
        assert_eq!(row.id(), Some("x"));
        assert_eq!(row.key(), &Value::from("x"));
    }

    #[test]
    fn test_sibling_rev_is_promoted() {
        let envelope = doc! { id: "x", key: 1, rev: "r2", value: { content: "hi" } };
        let row = ViewRow::from_envelope(envelope, &rehydrator()).unwrap();
        assert_eq!(row.value().as_typed().unwrap().rev(), Some("r2"));
        assert_eq!(row.get("rev"), Value::from("r2"));
    }

    #[test]
    fn test_nested_revision_wins() {
        let envelope = doc! { id: "x", rev: "r2", value: { "_rev": "r1", rev: "r0" } };
        let row = ViewRow::from_envelope(envelope, &rehydrator()).unwrap();
        let typed = row.value().as_typed().unwrap();
        assert_eq!(typed.rev(), Some("r1"));
        assert_eq!(typed.get("rev"), Value::from("r0"));
    }

    #[test]
    fn test_scalar_rows() {
        let envelope = doc! { id: "x", key: "a", value: 3 };
        let row = ViewRow::from_envelope(envelope, &rehydrator()).unwrap();
        assert_eq!(row.value().as_scalar(), Some(&Value::from(3)));
        let err = row.into_materialized().unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::ObjectMappingError);
    }

    #[test]
    fn test_design_document_rows_fall_back() {
        let envelope = doc! { id: "_design/greeting", key: "_design/greeting", value: { rev: "1-a" } };
        let row = ViewRow::from_envelope(envelope, &rehydrator()).unwrap();
        let materialized = row.value().as_materialized().unwrap();
        assert!(!materialized.is_typed());
    }

    #[test]
    fn test_into_envelope() {
        let envelope = doc! { id: "x", key: "k", value: { content: "hi" }, doc: { a: 1 } };
        let row = ViewRow::from_envelope(envelope, &rehydrator()).unwrap();
        assert_eq!(row.doc().unwrap().get("a"), Value::from(1));
        let rebuilt = row.into_envelope().unwrap();
        assert_eq!(rebuilt.get("id"), Value::from("x"));
        let value = rebuilt.get("value");
        assert_eq!(value.as_document().unwrap().id(), Some("x"));
        assert!(rebuilt.contains_key("doc"));
    }
}
