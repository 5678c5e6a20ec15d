use crate::common::{is_reserved_field, Value, BASE_TYPE_NAME, DOC_ID, DOC_REV, DOC_TYPE};
use crate::document::Document;
use crate::errors::{ErrorKind, MapperError, MapperResult};
use crate::mapping::{MappedDocument, MappedEntity, RegisteredType, ShapeType};

/// Anything the coercion engine accepts.
#[derive(Clone, Debug)]
pub enum Coercible {
    /// A bare type to register, without data.
    Shape(ShapeType),
    /// An application object, already encoded through its explicit
    /// to-map contract.
    Entity { shape: ShapeType, document: Document },
    /// A type that already has persistence capability.
    Registered(RegisteredType),
    /// An instance that already has persistence capability.
    Mapped(MappedDocument),
    /// A raw mapping.
    Raw(Document),
}

impl Coercible {
    pub fn shape<T: MappedEntity>() -> Coercible {
        Coercible::Shape(ShapeType::of::<T>())
    }

    /// Encodes `entity` and wraps it for coercion.
    pub fn entity<T: MappedEntity>(entity: &T) -> MapperResult<Coercible> {
        let shape = ShapeType::of::<T>();
        match entity.to_value()? {
            Value::Document(document) => Ok(Coercible::Entity { shape, document }),
            other => {
                log::error!("{} encoded to {} which is not a document", shape.name(), other);
                Err(MapperError::new(
                    &format!("{} does not encode to a document", shape.name()),
                    ErrorKind::ObjectMappingError,
                ))
            }
        }
    }

    /// The runtime type name of the input, used as registry key.
    pub fn type_name(&self) -> &str {
        match self {
            Coercible::Shape(shape) => shape.name(),
            Coercible::Entity { shape, .. } => shape.name(),
            Coercible::Registered(registered_type) => registered_type.name(),
            Coercible::Mapped(document) => document.type_name(),
            Coercible::Raw(_) => BASE_TYPE_NAME,
        }
    }

    /// `true` when the input already has persistence capability.
    pub fn is_capable(&self) -> bool {
        matches!(self, Coercible::Registered(_) | Coercible::Mapped(_))
    }

    /// `true` when the input denotes a type rather than an instance.
    pub fn is_type(&self) -> bool {
        matches!(self, Coercible::Shape(_) | Coercible::Registered(_))
    }
}

impl From<Document> for Coercible {
    fn from(document: Document) -> Self {
        Coercible::Raw(document)
    }
}

impl From<MappedDocument> for Coercible {
    fn from(document: MappedDocument) -> Self {
        Coercible::Mapped(document)
    }
}

impl From<RegisteredType> for Coercible {
    fn from(registered_type: RegisteredType) -> Self {
        Coercible::Registered(registered_type)
    }
}

impl From<ShapeType> for Coercible {
    fn from(shape: ShapeType) -> Self {
        Coercible::Shape(shape)
    }
}

/// Result of [coerce]: the resolved type and, for instance inputs, the
/// instance built from them.
#[derive(Clone, Debug)]
pub struct Coerced {
    registered_type: RegisteredType,
    instance: Option<MappedDocument>,
}

impl Coerced {
    pub fn registered_type(&self) -> &RegisteredType {
        &self.registered_type
    }

    pub fn instance(&self) -> Option<&MappedDocument> {
        self.instance.as_ref()
    }

    pub fn into_parts(self) -> (RegisteredType, Option<MappedDocument>) {
        (self.registered_type, self.instance)
    }
}

/// Resolves `input` to a registered type and, for instances, a
/// [MappedDocument] of that type.
///
/// Inputs that already have persistence capability pass through
/// unchanged. Otherwise `known` is reused when it was synthesized from the
/// same shape, and a new type is synthesized when it was not. Raw mappings
/// always take `known` when given and the base type otherwise.
///
/// The registry is never touched here.
///
/// # Errors
///
/// * `ReservedFieldViolation` if application data uses a reserved key.
/// * `InvalidId` if a raw mapping carries a non-string `_id`.
/// * `ObjectMappingError` if metadata values have the wrong type.
pub fn coerce(input: Coercible, known: Option<&RegisteredType>) -> MapperResult<Coerced> {
    match input {
        Coercible::Registered(registered_type) => Ok(Coerced {
            registered_type,
            instance: None,
        }),
        Coercible::Mapped(document) => Ok(Coerced {
            registered_type: document.registered_type().clone(),
            instance: Some(document),
        }),
        Coercible::Shape(shape) => Ok(Coerced {
            registered_type: resolve_shape(shape, known),
            instance: None,
        }),
        Coercible::Entity { shape, document } => {
            let split = shape.split(Value::Document(document))?;
            let registered_type = resolve_shape(shape, known);
            let instance = MappedDocument::new(registered_type.clone(), split.fields, split.id, split.rev);
            Ok(Coerced {
                registered_type,
                instance: Some(instance),
            })
        }
        Coercible::Raw(mapping) => {
            let registered_type = known.cloned().unwrap_or_else(RegisteredType::base);
            let instance = instance_from_mapping(registered_type.clone(), mapping)?;
            Ok(Coerced {
                registered_type,
                instance: Some(instance),
            })
        }
    }
}

fn resolve_shape(shape: ShapeType, known: Option<&RegisteredType>) -> RegisteredType {
    match known {
        Some(known) if known.has_shape(&shape) => known.clone(),
        _ => RegisteredType::synthesize(shape),
    }
}

fn instance_from_mapping(registered_type: RegisteredType, mut mapping: Document) -> MapperResult<MappedDocument> {
    let id = match mapping.remove(DOC_ID) {
        None | Some(Value::Null) => None,
        Some(Value::String(id)) if !id.is_empty() => Some(id),
        Some(other) => {
            log::error!("Invalid document identifier {}", other);
            return Err(MapperError::new(
                &format!("Invalid document identifier {}", other),
                ErrorKind::InvalidId,
            ));
        }
    };
    let rev = match mapping.remove(DOC_REV) {
        None | Some(Value::Null) => None,
        Some(Value::String(rev)) => Some(rev),
        Some(other) => {
            log::error!("Document revision {} is not a string", other);
            return Err(MapperError::new(
                "Document revision must be a string",
                ErrorKind::ObjectMappingError,
            ));
        }
    };
    mapping.remove(DOC_TYPE);

    if let Some(key) = mapping.keys().into_iter().find(|key| is_reserved_field(key)) {
        log::error!("Mapping uses reserved field name {}", key);
        return Err(MapperError::new(
            &format!("Field '{}' is reserved for document metadata", key),
            ErrorKind::ReservedFieldViolation,
        ));
    }

    Ok(MappedDocument::new(registered_type, mapping, id, rev))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Convertible;
    use crate::doc;
    use crate::mapping::EntityMeta;

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

    struct Keyed {
        key: Option<String>,
    }

    impl Convertible for Keyed {
        type Output = Keyed;

        fn to_value(&self) -> MapperResult<Value> {
            Ok(Value::Document(doc! { key: (self.key.clone()) }))
        }

        fn from_value(value: &Value) -> MapperResult<Keyed> {
            let doc = value.as_document().ok_or("not a document")?;
            Ok(Keyed {
                key: Option::<String>::from_value(&doc.get("key"))?,
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

    fn greeting() -> Greeting {
        Greeting {
            author: "A".to_string(),
            content: "hi".to_string(),
        }
    }

    #[test]
    fn test_bare_type_has_no_instance() {
        let coerced = coerce(Coercible::shape::<Greeting>(), None).unwrap();
        assert_eq!(coerced.registered_type().name(), "Greeting");
        assert!(coerced.registered_type().is_shape_of::<Greeting>());
        assert!(coerced.instance().is_none());
    }

    #[test]
    fn test_entity_builds_instance() {
        let coerced = coerce(Coercible::entity(&greeting()).unwrap(), None).unwrap();
        let instance = coerced.instance().unwrap();
        assert_eq!(instance.registered_type(), coerced.registered_type());
        assert_eq!(instance.get("author"), Value::from("A"));
        assert_eq!(instance.id(), None);
        assert!(instance.is_instance_of::<Greeting>());
        assert_eq!(instance.to_entity::<Greeting>().unwrap(), greeting());
    }

    #[test]
    fn test_known_type_is_reused() {
        let first = coerce(Coercible::shape::<Greeting>(), None).unwrap();
        let known = first.registered_type().clone();
        let again = coerce(Coercible::entity(&greeting()).unwrap(), Some(&known)).unwrap();
        assert_eq!(again.registered_type(), &known);
    }

    #[test]
    fn test_known_type_of_other_shape_is_not_reused() {
        let other = coerce(Coercible::shape::<Keyed>(), None).unwrap();
        let coerced = coerce(Coercible::shape::<Greeting>(), Some(other.registered_type())).unwrap();
        assert_ne!(coerced.registered_type(), other.registered_type());
        assert!(coerced.registered_type().is_shape_of::<Greeting>());
    }

    #[test]
    fn test_capable_inputs_pass_through() {
        let coerced = coerce(Coercible::entity(&greeting()).unwrap(), None).unwrap();
        let (registered_type, instance) = coerced.into_parts();
        let instance = instance.unwrap();

        let again = coerce(Coercible::Mapped(instance.clone()), None).unwrap();
        assert_eq!(again.registered_type(), &registered_type);
        assert_eq!(again.instance(), Some(&instance));

        let again = coerce(Coercible::Registered(registered_type.clone()), None).unwrap();
        assert_eq!(again.registered_type(), &registered_type);
        assert!(again.instance().is_none());
    }

    #[test]
    fn test_raw_mapping_lifts_metadata() {
        let raw = doc! { "_id": "g1", "_rev": "1-a", "doc_type": "Greeting", author: "A" };
        let coerced = coerce(Coercible::Raw(raw), None).unwrap();
        assert!(coerced.registered_type().is_base());
        let instance = coerced.instance().unwrap();
        assert_eq!(instance.id(), Some("g1"));
        assert_eq!(instance.rev(), Some("1-a"));
        assert_eq!(instance.fields(), &doc! { author: "A" });
    }

    #[test]
    fn test_raw_mapping_takes_known_type() {
        let known = coerce(Coercible::shape::<Greeting>(), None).unwrap();
        let coerced = coerce(
            Coercible::Raw(doc! { author: "A", content: "hi" }),
            Some(known.registered_type()),
        )
        .unwrap();
        assert_eq!(coerced.registered_type(), known.registered_type());
    }

    #[test]
    fn test_reserved_fields_are_rejected() {
        let err = coerce(Coercible::Raw(doc! { "_attachments": {}, a: 1 }), None).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::ReservedFieldViolation);

        let err = coerce(Coercible::Raw(doc! { "_id": 5 }), None).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidId);

        let err = coerce(Coercible::Raw(doc! { "_rev": true }), None).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::ObjectMappingError);
    }

    #[test]
    fn test_entity_meta_fields_become_identifier() {
        let keyed = Keyed { key: Some("k1".to_string()) };
        let coerced = coerce(Coercible::entity(&keyed).unwrap(), None).unwrap();
        let instance = coerced.instance().unwrap();
        assert_eq!(instance.id(), Some("k1"));
        assert!(instance.fields().is_empty());
        assert_eq!(instance.to_entity::<Keyed>().unwrap().key.as_deref(), Some("k1"));
    }

    #[test]
    fn test_type_names() {
        assert_eq!(Coercible::shape::<Greeting>().type_name(), "Greeting");
        assert_eq!(Coercible::Raw(doc! {}).type_name(), "Document");
        assert!(Coercible::shape::<Greeting>().is_type());
        assert!(!Coercible::Raw(doc! {}).is_capable());
    }
}
