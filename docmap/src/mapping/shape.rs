use crate::common::{is_metadata_field, Value};
use crate::document::Document;
use crate::errors::{ErrorKind, MapperError, MapperResult};
use crate::mapping::{EntityMeta, MappedEntity};
use std::any::TypeId;
use std::fmt::{Debug, Formatter};

/// Application fields of a shape, split from its identifier and revision.
#[derive(Debug)]
pub(crate) struct SplitEntity {
    pub(crate) fields: Document,
    pub(crate) id: Option<String>,
    pub(crate) rev: Option<String>,
}

/// Type-erased descriptor of a [MappedEntity] shape.
///
/// A `ShapeType` is what the coercion engine knows about an application
/// type: its registered name, its Rust identity and enough of its decoder
/// to check that a mapping fits the shape without producing a value.
#[derive(Clone)]
pub struct ShapeType {
    name: String,
    type_id: TypeId,
    type_name: &'static str,
    meta: EntityMeta,
    check: fn(&Value) -> MapperResult<()>,
}

fn check_decode<T: MappedEntity>(value: &Value) -> MapperResult<()> {
    T::from_value(value).map(|_| ())
}

impl ShapeType {
    pub fn of<T: MappedEntity>() -> ShapeType {
        ShapeType {
            name: T::entity_name(),
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            meta: T::entity_meta(),
            check: check_decode::<T>,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Fully qualified Rust name of the shape, for diagnostics.
    pub fn rust_type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    pub fn is<T: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    /// Puts identifier and revision back into the shape's meta fields so
    /// that `fields` decodes as a complete value of the shape.
    pub(crate) fn inject(
        &self,
        fields: &Document,
        id: Option<&str>,
        rev: Option<&str>,
    ) -> MapperResult<Document> {
        let mut document = fields.clone();
        if let Some(id_field) = self.meta.id_field() {
            document.put(id_field, Value::from_option(id))?;
        }
        if let Some(rev_field) = self.meta.rev_field() {
            document.put(rev_field, Value::from_option(rev))?;
        }
        Ok(document)
    }

    /// Lifts the meta fields out of an encoded value of the shape and
    /// rejects application fields that collide with store metadata.
    pub(crate) fn split(&self, encoded: Value) -> MapperResult<SplitEntity> {
        let mut fields = match encoded {
            Value::Document(document) => document,
            other => {
                log::error!("{} encoded to {} which is not a document", self.name, other);
                return Err(MapperError::new(
                    &format!("{} does not encode to a document", self.name),
                    ErrorKind::ObjectMappingError,
                ));
            }
        };

        let id = match self.meta.id_field() {
            Some(field) => meta_string(&self.name, field, fields.remove(field))?,
            None => None,
        };
        let rev = match self.meta.rev_field() {
            Some(field) => meta_string(&self.name, field, fields.remove(field))?,
            None => None,
        };

        if let Some(key) = fields.keys().into_iter().find(|key| is_metadata_field(key)) {
            log::error!("{} uses reserved field name {}", self.name, key);
            return Err(MapperError::new(
                &format!("Field '{}' of {} is reserved for document metadata", key, self.name),
                ErrorKind::ReservedFieldViolation,
            ));
        }

        Ok(SplitEntity { fields, id, rev })
    }

    /// Checks that `fields` plus metadata decode as this shape.
    pub(crate) fn check(
        &self,
        fields: &Document,
        id: Option<&str>,
        rev: Option<&str>,
    ) -> MapperResult<()> {
        let document = self.inject(fields, id, rev)?;
        (self.check)(&Value::Document(document)).map_err(|err| {
            log::error!("Document does not fit shape {}: {}", self.name, err);
            MapperError::new_with_cause(
                &format!("Document does not fit shape {}", self.name),
                ErrorKind::ObjectMappingError,
                err,
            )
        })
    }
}

fn meta_string(shape: &str, field: &str, value: Option<Value>) -> MapperResult<Option<String>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(other) => {
            log::error!("Metadata field {} of {} holds {}", field, shape, other);
            Err(MapperError::new(
                &format!("Metadata field '{}' of {} must be a string", field, shape),
                ErrorKind::ObjectMappingError,
            ))
        }
    }
}

impl PartialEq for ShapeType {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id && self.name == other.name
    }
}

impl Eq for ShapeType {}

impl Debug for ShapeType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShapeType")
            .field("name", &self.name)
            .field("type", &self.type_name)
            .field("meta", &self.meta)
            .finish()
    }
}
