use crate::common::{is_metadata_field, Value, DOC_ID, DOC_REV};
use crate::document::{DocId, Document};
use crate::errors::{ErrorKind, MapperError, MapperResult};
use crate::mapping::{coerce, ClassRegistry, Coercible, MappedDocument, MappedEntity, ShapeType};
use crate::store::DocumentStore;

/// Input of [Rehydrator::materialize].
#[derive(Clone, Debug)]
pub enum Payload {
    /// A raw mapping as received from the store; its discriminator field
    /// names the type.
    Raw(Document),
    /// An object's attribute set together with its type name.
    Entity { type_name: String, document: Document },
    /// An instance that is already typed.
    Mapped(MappedDocument),
}

impl Payload {
    /// Describes an application object by its attribute set. Meta fields
    /// of the shape become `_id` and `_rev`.
    pub fn entity<T: MappedEntity>(entity: &T) -> MapperResult<Payload> {
        let shape = ShapeType::of::<T>();
        let split = shape.split(entity.to_value()?)?;
        let mut document = split.fields;
        if let Some(id) = split.id {
            document.put(DOC_ID, id)?;
        }
        if let Some(rev) = split.rev {
            document.put(DOC_REV, rev)?;
        }
        Ok(Payload::Entity {
            type_name: shape.name().to_string(),
            document,
        })
    }
}

impl From<Document> for Payload {
    fn from(document: Document) -> Self {
        Payload::Raw(document)
    }
}

impl From<MappedDocument> for Payload {
    fn from(document: MappedDocument) -> Self {
        Payload::Mapped(document)
    }
}

/// Outcome of rehydration.
#[derive(Clone, Debug, PartialEq)]
pub enum Materialized {
    /// The payload was rehydrated into its registered type.
    Typed(MappedDocument),
    /// The payload is not a regular document and is returned unchanged.
    RawFallback(Document),
}

impl Materialized {
    pub fn is_typed(&self) -> bool {
        matches!(self, Materialized::Typed(_))
    }

    pub fn as_typed(&self) -> Option<&MappedDocument> {
        match self {
            Materialized::Typed(document) => Some(document),
            Materialized::RawFallback(_) => None,
        }
    }

    pub fn as_typed_mut(&mut self) -> Option<&mut MappedDocument> {
        match self {
            Materialized::Typed(document) => Some(document),
            Materialized::RawFallback(_) => None,
        }
    }

    /// Returns the typed instance.
    ///
    /// # Errors
    ///
    /// Returns a `StructuralMismatch` error for a raw fallback.
    pub fn into_typed(self) -> MapperResult<MappedDocument> {
        match self {
            Materialized::Typed(document) => Ok(document),
            Materialized::RawFallback(raw) => {
                log::error!("Document {:?} could not be typed", raw.get(DOC_ID));
                Err(MapperError::new(
                    &format!("Document {} is not a regular document", raw.get(DOC_ID)),
                    ErrorKind::StructuralMismatch,
                ))
            }
        }
    }

    /// Returns the raw fallback payload, if this is one.
    pub fn into_raw(self) -> Option<Document> {
        match self {
            Materialized::Typed(_) => None,
            Materialized::RawFallback(raw) => Some(raw),
        }
    }

    /// Serialized form of either variant.
    pub fn to_document(&self) -> MapperResult<Document> {
        match self {
            Materialized::Typed(document) => document.to_document(),
            Materialized::RawFallback(raw) => Ok(raw.clone()),
        }
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            Materialized::Typed(document) => document.id(),
            Materialized::RawFallback(raw) => raw.id(),
        }
    }
}

/// Turns stored payloads back into instances of their registered types.
#[derive(Clone)]
pub struct Rehydrator {
    registry: ClassRegistry,
    store: Option<DocumentStore>,
    validate_shapes: bool,
}

impl Rehydrator {
    pub fn new(registry: ClassRegistry) -> Self {
        Rehydrator {
            registry,
            store: None,
            validate_shapes: false,
        }
    }

    /// Attaches `store` to every typed result.
    pub fn with_store(mut self, store: DocumentStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Checks typed results against their registered shape. Off by
    /// default.
    pub fn validate_shapes(mut self, validate: bool) -> Self {
        self.validate_shapes = validate;
        self
    }

    pub fn registry(&self) -> &ClassRegistry {
        &self.registry
    }

    /// Rehydrates `payload` into its registered type.
    ///
    /// Store metadata is filtered out of the application fields and then
    /// reattached as identifier and revision. Unknown or missing
    /// discriminators resolve to the base document type. A missing or null
    /// identifier is tolerated. A payload whose identifier is not a regular
    /// document identifier (a design or local document, an empty or
    /// non-string id) comes back unchanged as [Materialized::RawFallback].
    ///
    /// # Errors
    ///
    /// * `ObjectMappingError` if `_rev` is not a string, or if shape
    ///   validation is enabled and the fields do not decode as the
    ///   registered shape.
    pub fn materialize(&self, payload: Payload) -> MapperResult<Materialized> {
        let (class_name, working) = match payload {
            Payload::Raw(document) => (document.doc_type().map(str::to_string), document),
            Payload::Entity { type_name, document } => (Some(type_name), document),
            Payload::Mapped(document) => (Some(document.type_name().to_string()), document.to_document()?),
        };

        let application = working.filtered(|key| !is_metadata_field(key));
        let registered_type = self.registry.resolve(class_name.as_deref());
        let (_, instance) = coerce(Coercible::Raw(application), Some(&registered_type))?.into_parts();
        let mut instance = instance.ok_or_else(|| {
            log::error!("Coercion of a mapping produced no instance");
            MapperError::new("Coercion of a mapping produced no instance", ErrorKind::InternalError)
        })?;

        match working.get_ref(DOC_ID) {
            None | Some(Value::Null) => {}
            Some(id) => match DocId::from_value(id) {
                Ok(id) if id.is_regular() => instance.set_identifier(Some(id.into_string())),
                Ok(id) => {
                    log::debug!("{} is not a regular document, keeping it untyped", id);
                    return Ok(Materialized::RawFallback(working));
                }
                Err(err) => {
                    log::warn!("Keeping document untyped: {}", err);
                    return Ok(Materialized::RawFallback(working));
                }
            },
        }

        match working.get_ref(DOC_REV) {
            None | Some(Value::Null) => {}
            Some(Value::String(rev)) => instance.set_revision(Some(rev.clone())),
            Some(other) => {
                log::error!("Document revision {} is not a string", other);
                return Err(MapperError::new(
                    "Document revision must be a string",
                    ErrorKind::ObjectMappingError,
                ));
            }
        }

        if self.validate_shapes {
            instance.validate()?;
        }
        if let Some(store) = &self.store {
            instance.attach(store.clone());
        }
        Ok(Materialized::Typed(instance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Convertible;
    use crate::doc;
    use crate::mapping::{EntityMeta, RegisteredType};

    #[derive(Debug, PartialEq)]
    struct Greeting {
        author: String,
        content: String,
    }

    impl Convertible for Greeting {
        type Output = Greeting;

        fn to_value(&self) -> MapperResult<Value> {
            Ok(Value::Document(doc! {
                author: (self.author.clone()),
                content: (self.content.clone()),
            }))
        }

        fn from_value(value: &Value) -> MapperResult<Greeting> {
            let doc = value.as_document().ok_or("not a document")?;
            Ok(Greeting {
                author: String::from_value(&doc.get("author"))?,
                content: String::from_value(&doc.get("content"))?,
            })
        }
    }

    impl MappedEntity for Greeting {
        fn entity_name() -> String {
            "Greeting".to_string()
        }
    }

    fn registry_with_greeting() -> (ClassRegistry, RegisteredType) {
        let registry = ClassRegistry::new();
        let (registered_type, _) = coerce(Coercible::shape::<Greeting>(), None).unwrap().into_parts();
        registry.register("Greeting", registered_type.clone());
        (registry, registered_type)
    }

    #[test]
    fn test_materialize_registered_type() {
        let (registry, registered_type) = registry_with_greeting();
        let rehydrator = Rehydrator::new(registry);
        let raw = doc! { "_id": "g1", "_rev": "1-a", "doc_type": "Greeting", author: "A", content: "hi" };

        let typed = rehydrator.materialize(Payload::Raw(raw)).unwrap().into_typed().unwrap();
        assert_eq!(typed.registered_type(), &registered_type);
        assert_eq!(typed.id(), Some("g1"));
        assert_eq!(typed.rev(), Some("1-a"));
        assert_eq!(typed.fields().keys().as_slice(), &["author", "content"]);
        assert!(!typed.is_attached());
    }

    #[test]
    fn test_unknown_type_falls_back_to_base() {
        let rehydrator = Rehydrator::new(ClassRegistry::new());
        let typed = rehydrator
            .materialize(Payload::Raw(doc! { "doc_type": "Nope", a: 1 }))
            .unwrap()
            .into_typed()
            .unwrap();
        assert!(typed.registered_type().is_base());
        assert_eq!(typed.id(), None);
        assert_eq!(typed.rev(), None);
    }

    #[test]
    fn test_reserved_fields_never_become_fields() {
        let rehydrator = Rehydrator::new(ClassRegistry::new());
        let raw = doc! { "_id": "x", "_attachments": { a: 1 }, "_conflicts": [], "_custom": 1, kept: true };
        let typed = rehydrator.materialize(Payload::Raw(raw)).unwrap().into_typed().unwrap();
        assert_eq!(typed.fields(), &doc! { kept: true });
        assert_eq!(typed.id(), Some("x"));
    }

    #[test]
    fn test_design_document_falls_back() {
        let rehydrator = Rehydrator::new(ClassRegistry::new());
        let raw = doc! { "_id": "_design/greeting", views: {} };
        let materialized = rehydrator.materialize(Payload::Raw(raw.clone())).unwrap();
        assert!(!materialized.is_typed());
        assert_eq!(materialized.clone().into_raw(), Some(raw));
        let err = materialized.into_typed().unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::StructuralMismatch);
    }

    #[test]
    fn test_invalid_identifier_falls_back() {
        let rehydrator = Rehydrator::new(ClassRegistry::new());
        let materialized = rehydrator.materialize(Payload::Raw(doc! { "_id": 7 })).unwrap();
        assert!(!materialized.is_typed());
    }

    #[test]
    fn test_non_string_revision_is_an_error() {
        let rehydrator = Rehydrator::new(ClassRegistry::new());
        let err = rehydrator
            .materialize(Payload::Raw(doc! { "_id": "x", "_rev": 1 }))
            .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::ObjectMappingError);
    }

    #[test]
    fn test_shape_validation() {
        let (registry, _) = registry_with_greeting();
        let raw = doc! { "doc_type": "Greeting", author: 3 };

        let err = Rehydrator::new(registry.clone())
            .validate_shapes(true)
            .materialize(Payload::Raw(raw.clone()))
            .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::ObjectMappingError);

        let lenient = Rehydrator::new(registry);
        assert!(lenient.materialize(Payload::Raw(raw)).unwrap().is_typed());
    }

    #[test]
    fn test_partial_document_is_typed_by_default() {
        let (registry, registered_type) = registry_with_greeting();
        let raw = doc! { "_id": "old", "_rev": "1-a", "doc_type": "Greeting", author: "A" };
        let typed = Rehydrator::new(registry)
            .materialize(Payload::Raw(raw))
            .unwrap()
            .into_typed()
            .unwrap();
        assert_eq!(typed.registered_type(), &registered_type);
        assert_eq!(typed.id(), Some("old"));
        assert_eq!(typed.get("author"), Value::from("A"));
        assert!(typed.to_entity::<Greeting>().is_err());
    }

    #[test]
    fn test_null_identifier_is_tolerated() {
        let (registry, registered_type) = registry_with_greeting();
        let raw = doc! { "_id": (Value::Null), "doc_type": "Greeting", author: "A", content: "hi" };
        let typed = Rehydrator::new(registry)
            .materialize(Payload::Raw(raw))
            .unwrap()
            .into_typed()
            .unwrap();
        assert_eq!(typed.registered_type(), &registered_type);
        assert_eq!(typed.id(), None);
        assert_eq!(typed.get("content"), Value::from("hi"));
    }

    #[test]
    fn test_entity_payload_uses_type_name() {
        let (registry, registered_type) = registry_with_greeting();
        let greeting = Greeting {
            author: "A".to_string(),
            content: "hi".to_string(),
        };
        let payload = Payload::entity(&greeting).unwrap();
        let typed = Rehydrator::new(registry).materialize(payload).unwrap().into_typed().unwrap();
        assert_eq!(typed.registered_type(), &registered_type);
        assert_eq!(typed.to_entity::<Greeting>().unwrap(), greeting);
    }

    #[test]
    fn test_mapped_payload_keeps_revision() {
        let (registry, registered_type) = registry_with_greeting();
        let rehydrator = Rehydrator::new(registry);
        let mut known = MappedDocument::new(
            registered_type,
            doc! { author: "A", content: "hi" },
            Some("g1".to_string()),
            Some("4-d".to_string()),
        );
        known.put("content", "changed").unwrap();

        let typed = rehydrator.materialize(Payload::Mapped(known)).unwrap().into_typed().unwrap();
        assert_eq!(typed.rev(), Some("4-d"));
        assert_eq!(typed.get("content"), Value::from("changed"));
    }

    #[test]
    fn test_entity_meta_payload() {
        struct Keyed {
            key: Option<String>,
            body: String,
        }

        impl Convertible for Keyed {
            type Output = Keyed;

            fn to_value(&self) -> MapperResult<Value> {
                Ok(Value::Document(doc! { key: (self.key.clone()), body: (self.body.clone()) }))
            }

            fn from_value(value: &Value) -> MapperResult<Keyed> {
                let doc = value.as_document().ok_or("not a document")?;
                Ok(Keyed {
                    key: Option::<String>::from_value(&doc.get("key"))?,
                    body: String::from_value(&doc.get("body"))?,
                })
            }
        }

        impl MappedEntity for Keyed {
            fn entity_name() -> String {
                "Keyed".to_string()
            }

            fn entity_meta() -> EntityMeta {
                EntityMeta::new(Some("key"), None)
            }
        }

        let payload = Payload::entity(&Keyed {
            key: Some("k".to_string()),
            body: "b".to_string(),
        })
        .unwrap();
        let typed = Rehydrator::new(ClassRegistry::new())
            .materialize(payload)
            .unwrap()
            .into_typed()
            .unwrap();
        assert_eq!(typed.id(), Some("k"));
        assert_eq!(typed.fields(), &doc! { body: "b" });
    }
}
