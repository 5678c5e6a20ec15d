use crate::common::{is_metadata_field, Value, DOC_ID, DOC_REV, DOC_TYPE};
use crate::document::{DocId, Document};
use crate::errors::{ErrorKind, MapperError, MapperResult};
use crate::mapping::{MappedEntity, RegisteredType, ShapeType};
use crate::store::DocumentStore;
use std::borrow::Cow;
use std::fmt::{Debug, Formatter};

/// An instance of a [RegisteredType]: application fields plus the
/// identifier and revision of the stored document they belong to.
///
/// Fields never contain store metadata or the discriminator; those are
/// held separately and only merged back by [MappedDocument::to_document].
/// Once a revision is known it is kept until a different document or a
/// newer revision replaces it.
#[derive(Clone)]
pub struct MappedDocument {
    registered_type: RegisteredType,
    id: Option<String>,
    rev: Option<String>,
    fields: Document,
    store: Option<DocumentStore>,
}

impl MappedDocument {
    pub(crate) fn new(
        registered_type: RegisteredType,
        fields: Document,
        id: Option<String>,
        rev: Option<String>,
    ) -> Self {
        MappedDocument {
            registered_type,
            id,
            rev,
            fields,
            store: None,
        }
    }

    pub fn registered_type(&self) -> &RegisteredType {
        &self.registered_type
    }

    pub fn type_name(&self) -> &str {
        self.registered_type.name()
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn rev(&self) -> Option<&str> {
        self.rev.as_deref()
    }

    /// Assigns the identifier.
    ///
    /// # Errors
    ///
    /// Returns a `StructuralMismatch` error if the identifier is empty.
    pub fn set_id(&mut self, id: &str) -> MapperResult<()> {
        let id = DocId::new(id)?;
        self.id = Some(id.into_string());
        Ok(())
    }

    pub fn set_rev(&mut self, rev: Option<&str>) {
        self.rev = rev.map(str::to_string);
    }

    /// `true` until the instance has been saved or loaded from the store.
    pub fn is_new(&self) -> bool {
        self.rev.is_none()
    }

    pub fn get(&self, key: &str) -> Value {
        self.fields.get(key)
    }

    /// Sets an application field.
    ///
    /// # Errors
    ///
    /// Returns a `ReservedFieldViolation` error for store metadata keys,
    /// the discriminator and the fields a shape uses for its identifier
    /// and revision.
    pub fn put<'a, T: Into<Value>>(&mut self, key: impl Into<Cow<'a, str>>, value: T) -> MapperResult<()> {
        let key = key.into();
        let shape_meta = self
            .registered_type
            .shape()
            .is_some_and(|shape| shape.meta().is_meta_field(&key));
        if is_metadata_field(&key) || shape_meta {
            log::error!("Cannot use reserved field {} as application data", key);
            return Err(MapperError::new(
                &format!("Field '{}' is reserved for document metadata", key),
                ErrorKind::ReservedFieldViolation,
            ));
        }
        self.fields.put(key, value)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.remove(key)
    }

    /// The application fields.
    pub fn fields(&self) -> &Document {
        &self.fields
    }

    pub fn is_instance_of<T: MappedEntity>(&self) -> bool {
        self.registered_type.is_shape_of::<T>()
    }

    /// Decodes the instance into `T`, writing identifier and revision
    /// into the fields `T` declares for them.
    pub fn to_entity<T: MappedEntity>(&self) -> MapperResult<T> {
        let shape = ShapeType::of::<T>();
        let document = shape.inject(&self.fields, self.id(), self.rev())?;
        T::from_value(&Value::Document(document))
    }

    /// Serializes the instance into the document form the store persists.
    pub fn to_document(&self) -> MapperResult<Document> {
        let mut document = self.fields.clone();
        if let Some(id) = &self.id {
            document.put(DOC_ID, id.as_str())?;
        }
        if let Some(rev) = &self.rev {
            document.put(DOC_REV, rev.as_str())?;
        }
        if !self.registered_type.is_base() {
            document.put(DOC_TYPE, self.registered_type.name())?;
        }
        Ok(document)
    }

    pub fn attach(&mut self, store: DocumentStore) {
        self.store = Some(store);
    }

    pub fn store(&self) -> Option<&DocumentStore> {
        self.store.as_ref()
    }

    pub fn is_attached(&self) -> bool {
        self.store.is_some()
    }

    /// Persists the instance through the attached store. Identifier and
    /// revision are updated in place on success.
    pub fn save(&mut self) -> MapperResult<()> {
        let store = self.attached_store("save")?;
        let mut document = self.to_document()?;
        store.save(&mut document)?;
        self.id = document.id().map(str::to_string);
        self.rev = document.revision().map(str::to_string);
        Ok(())
    }

    /// Deletes the stored document. The instance keeps its identifier and
    /// fields but becomes new again.
    pub fn delete(&mut self) -> MapperResult<()> {
        let store = self.attached_store("delete")?;
        store.delete(&self.to_document()?)?;
        self.rev = None;
        Ok(())
    }

    /// Reloads the latest stored version of this document.
    pub fn refresh(&mut self) -> MapperResult<()> {
        let store = self.attached_store("refresh")?;
        let id = self.id.clone().ok_or_else(|| {
            log::error!("Cannot refresh a document without identifier");
            MapperError::new("Cannot refresh a document without identifier", ErrorKind::InvalidId)
        })?;
        let latest = store.get(&id, None)?;
        self.reconcile(&latest)
    }

    /// Adopts the fields and metadata of `incoming`.
    ///
    /// A revision already known for this document is kept when `incoming`
    /// has none, unless `incoming` carries a different identifier.
    pub fn reconcile(&mut self, incoming: &Document) -> MapperResult<()> {
        let incoming_rev = match incoming.get_ref(DOC_REV) {
            None | Some(Value::Null) => None,
            Some(Value::String(rev)) => Some(rev.clone()),
            Some(other) => {
                log::error!("Revision {} is not a string", other);
                return Err(MapperError::new(
                    "Document revision must be a string",
                    ErrorKind::ObjectMappingError,
                ));
            }
        };

        let same_document = match (self.id(), incoming.id()) {
            (Some(known), Some(id)) => known == id,
            _ => true,
        };

        if let Some(id) = incoming.id() {
            self.id = Some(id.to_string());
        }
        self.rev = match incoming_rev {
            Some(rev) => Some(rev),
            None if same_document => self.rev.take(),
            None => None,
        };
        self.fields = incoming.filtered(|key| !is_metadata_field(key));
        Ok(())
    }

    pub(crate) fn set_revision(&mut self, rev: Option<String>) {
        self.rev = rev;
    }

    pub(crate) fn set_identifier(&mut self, id: Option<String>) {
        self.id = id;
    }

    /// Checks that the instance decodes as its registered shape.
    pub(crate) fn validate(&self) -> MapperResult<()> {
        match self.registered_type.shape() {
            Some(shape) => shape.check(&self.fields, self.id(), self.rev()),
            None => Ok(()),
        }
    }

    fn attached_store(&self, operation: &str) -> MapperResult<DocumentStore> {
        self.store.clone().ok_or_else(|| {
            log::error!("Cannot {} {}: no store attached", operation, self.type_name());
            MapperError::new(
                &format!("Cannot {} a document that is not attached to a store", operation),
                ErrorKind::InvalidOperation,
            )
        })
    }
}

impl PartialEq for MappedDocument {
    fn eq(&self, other: &Self) -> bool {
        self.registered_type == other.registered_type
            && self.id == other.id
            && self.rev == other.rev
            && self.fields == other.fields
    }
}

impl Debug for MappedDocument {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MappedDocument")
            .field("type", &self.registered_type.name())
            .field("id", &self.id)
            .field("rev", &self.rev)
            .field("fields", &self.fields)
            .field("attached", &self.store.is_some())
            .finish()
    }
}
