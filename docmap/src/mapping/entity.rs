use crate::common::Convertible;

/// An application shape that can be persisted as a document.
///
/// Implemented by `#[derive(MappedEntity)]` next to `#[derive(Convertible)]`.
/// The [Convertible] half is the explicit to-map / from-map contract; this
/// trait adds the type level metadata the mapper needs to register the
/// shape and to find it again when documents come back from the store.
///
/// # Usage
/// ```ignore
/// #[derive(Convertible, MappedEntity)]
/// pub struct Greeting {
///     author: String,
///     content: String,
/// }
///
/// #[derive(Convertible, MappedEntity)]
/// #[entity(name = "Note", id(field = "key"), rev(field = "revision"))]
/// pub struct StickyNote {
///     key: Option<String>,
///     revision: Option<String>,
///     body: String,
/// }
/// ```
pub trait MappedEntity: Convertible<Output = Self> + Sized + 'static {
    /// The registered name of the shape; written to stored documents as the
    /// discriminator. Defaults to the struct name.
    fn entity_name() -> String;

    /// Fields of the shape that carry the document identifier and revision.
    fn entity_meta() -> EntityMeta {
        EntityMeta::default()
    }
}

/// Names the fields of a shape that mirror store metadata.
///
/// A shape may keep the document identifier and revision in ordinary
/// fields (for example to assign an identifier before a bulk save). Those
/// fields are lifted out of the application data when the object is
/// coerced and written back when a typed value is decoded.
///
/// Both fields should be `Option<String>` so that unsaved objects decode.
#[derive(PartialEq, Eq, Hash, Clone, Debug, Default)]
pub struct EntityMeta {
    id_field: Option<String>,
    rev_field: Option<String>,
}

impl EntityMeta {
    pub fn new(id_field: Option<&str>, rev_field: Option<&str>) -> Self {
        EntityMeta {
            id_field: id_field.map(str::to_string),
            rev_field: rev_field.map(str::to_string),
        }
    }

    pub fn id_field(&self) -> Option<&str> {
        self.id_field.as_deref()
    }

    pub fn rev_field(&self) -> Option<&str> {
        self.rev_field.as_deref()
    }

    /// Returns `true` when `field` is one of the metadata fields.
    pub fn is_meta_field(&self, field: &str) -> bool {
        self.id_field() == Some(field) || self.rev_field() == Some(field)
    }
}
