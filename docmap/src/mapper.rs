use crate::common::ALL_DOCS_VIEW;
use crate::document::Document;
use crate::errors::{ErrorKind, MapperError, MapperResult};
use crate::mapper_builder::MapperBuilder;
use crate::mapper_config::MapperConfig;
use crate::mapping::{
    coerce, BulkItem, ClassRegistry, Coercible, MappedDocument, MappedEntity, Materialized, Payload,
    RegisteredType, Rehydrator,
};
use crate::store::{BulkResult, CopyResult, DocumentStore, MapFunction, QueryParams, ViewRequest};
use crate::view::{RowWrapper, ViewResults, ViewRow};
use std::sync::Arc;

/// What [Mapper::add] produced.
#[derive(Clone, Debug, PartialEq)]
pub enum Added {
    /// A bare type was registered.
    Type(RegisteredType),
    /// An object was registered and wrapped; the instance is attached to
    /// the mapper's store.
    Instance(MappedDocument),
}

impl Added {
    pub fn registered_type(&self) -> &RegisteredType {
        match self {
            Added::Type(registered_type) => registered_type,
            Added::Instance(instance) => instance.registered_type(),
        }
    }

    pub fn into_type(self) -> RegisteredType {
        match self {
            Added::Type(registered_type) => registered_type,
            Added::Instance(instance) => instance.registered_type().clone(),
        }
    }

    /// # Errors
    ///
    /// Returns an `InvalidOperation` error when a bare type was added.
    pub fn into_instance(self) -> MapperResult<MappedDocument> {
        match self {
            Added::Instance(instance) => Ok(instance),
            Added::Type(registered_type) => {
                log::error!("{} was registered as a type, not an instance", registered_type);
                Err(MapperError::new(
                    &format!("{} is a type, not a document instance", registered_type),
                    ErrorKind::InvalidOperation,
                ))
            }
        }
    }
}

/// A stored document together with its known revisions, newest first.
#[derive(Clone, Debug, PartialEq)]
pub struct DocRevisions {
    document: Materialized,
    revisions: Vec<String>,
}

impl DocRevisions {
    pub fn document(&self) -> &Materialized {
        &self.document
    }

    pub fn revisions(&self) -> &[String] {
        &self.revisions
    }

    pub fn into_parts(self) -> (Materialized, Vec<String>) {
        (self.document, self.revisions)
    }
}

/// Object/document mapper over a [DocumentStore].
///
/// # Purpose
/// `Mapper` lets application types be stored as documents without being
/// written against a document base type. Objects are coerced into
/// registered types on the way in, and every document coming back from
/// the store (single fetches, view rows, listings) is rehydrated into the
/// type registered under its discriminator.
///
/// # Characteristics
/// - **Cheap to clone**: clones share the store, registry and settings
/// - **Degrades gracefully**: unknown discriminators resolve to the base
///   document type, design and local documents come back untyped
/// - **Store errors pass through**: `NotFound`, `Conflict` and friends
///   are returned exactly as the store reported them
///
/// # Usage
/// ```text
/// let mapper = docmap::map(DocumentStore::new(MemoryStore::new()));
/// mapper.register::<Greeting>()?;
///
/// let greeting = mapper.save(Coercible::entity(&Greeting::new("A", "hi"))?)?;
/// let fetched = mapper.get(greeting.id().unwrap())?.into_typed()?;
/// let value: Greeting = fetched.to_entity()?;
/// ```
#[derive(Clone)]
pub struct Mapper {
    inner: Arc<MapperInner>,
}

impl Mapper {
    pub fn builder() -> MapperBuilder {
        MapperBuilder::new()
    }

    pub(crate) fn new(store: DocumentStore, config: MapperConfig) -> Self {
        config.freeze();
        let mut rehydrator = Rehydrator::new(config.registry()).validate_shapes(config.validate_shapes());
        if config.attach_store() {
            rehydrator = rehydrator.with_store(store.clone());
        }
        Mapper {
            inner: Arc::new(MapperInner {
                store,
                config,
                rehydrator,
            }),
        }
    }

    pub fn store(&self) -> &DocumentStore {
        &self.inner.store
    }

    pub fn config(&self) -> &MapperConfig {
        &self.inner.config
    }

    pub fn registry(&self) -> &ClassRegistry {
        self.inner.rehydrator.registry()
    }

    pub fn rehydrator(&self) -> &Rehydrator {
        &self.inner.rehydrator
    }

    /// Registers `input` and, for instances, wraps it as a document.
    ///
    /// The type is looked up in the registry by name first so that an
    /// existing registered type for the same shape is reused; the result
    /// is then recorded under that name (last write wins). Raw mappings
    /// register as the base document type.
    pub fn add(&self, input: impl Into<Coercible>) -> MapperResult<Added> {
        self.inner.add(input.into())
    }

    /// Registers the shape `T` without any data.
    pub fn register<T: MappedEntity>(&self) -> MapperResult<RegisteredType> {
        self.add(Coercible::shape::<T>()).map(Added::into_type)
    }

    /// Registers the type of `entity` and wraps it as a document.
    pub fn add_entity<T: MappedEntity>(&self, entity: &T) -> MapperResult<MappedDocument> {
        self.add(Coercible::entity(entity)?)?.into_instance()
    }

    /// Rehydrates `payload` into its registered type.
    pub fn materialize(&self, payload: impl Into<Payload>) -> MapperResult<Materialized> {
        self.inner.rehydrator.materialize(payload.into())
    }

    pub fn get(&self, id: &str) -> MapperResult<Materialized> {
        self.get_with(id, None, Ok)
    }

    /// Fetches a specific revision of a document.
    pub fn get_rev(&self, id: &str, rev: &str) -> MapperResult<Materialized> {
        self.get_with(id, Some(rev), Ok)
    }

    /// Fetches a document and applies `transform` to the rehydrated
    /// result.
    pub fn get_with<R, F>(&self, id: &str, rev: Option<&str>, transform: F) -> MapperResult<R>
    where
        F: FnOnce(Materialized) -> MapperResult<R>,
    {
        let raw = self.inner.store.get(id, rev)?;
        transform(self.materialize(Payload::Raw(raw))?)
    }

    /// Fetches a document without rehydrating it.
    pub fn get_raw(&self, id: &str, rev: Option<&str>) -> MapperResult<Document> {
        self.inner.store.get(id, rev)
    }

    /// Fetches a document and decodes it into `T`.
    ///
    /// # Errors
    ///
    /// Fails with `UnknownType` when no type is registered under the name
    /// of `T`, and with `StructuralMismatch` when the stored document
    /// cannot be typed at all.
    pub fn get_as<T: MappedEntity>(&self, id: &str) -> MapperResult<T> {
        let type_name = T::entity_name();
        if !self.registry().contains(&type_name) {
            log::error!("No type is registered as {}", type_name);
            return Err(MapperError::new(
                &format!("No type is registered as {}", type_name),
                ErrorKind::UnknownType,
            ));
        }
        self.get(id)?.into_typed()?.to_entity::<T>()
    }

    /// Item style read, `mapper[id]`.
    pub fn get_item(&self, id: &str) -> MapperResult<Materialized> {
        self.get(id)
    }

    /// Item style write, `mapper[id] = input`.
    ///
    /// The document is saved under `id`. When `input` has no revision for
    /// `id`, the current revision is taken from the store so that the
    /// assignment overwrites an existing document.
    pub fn set_item(&self, id: &str, input: impl Into<Coercible>) -> MapperResult<MappedDocument> {
        let mut instance = self.inner.instance_of(input.into())?;
        if instance.id() != Some(id) {
            instance.set_revision(None);
        }
        instance.set_id(id)?;

        if instance.rev().is_none() {
            match self.inner.store.get(id, None) {
                Ok(current) => instance.set_revision(current.revision().map(str::to_string)),
                Err(err) if err.kind() == &ErrorKind::NotFound => {}
                Err(err) => return Err(err),
            }
        }
        instance.save()?;
        Ok(instance)
    }

    /// Saves `input`.
    ///
    /// Raw mappings are handed to the store unchanged. Anything else is
    /// added first, so its type is registered and its discriminator
    /// written.
    ///
    /// Once the store accepted a raw mapping the call succeeds. If the
    /// stored document cannot be rehydrated it is returned as
    /// [Materialized::RawFallback] with its new `_id` and `_rev`.
    pub fn save(&self, input: impl Into<Coercible>) -> MapperResult<Materialized> {
        match input.into() {
            Coercible::Raw(mut document) => {
                self.inner.store.save(&mut document)?;
                match self.materialize(Payload::Raw(document.clone())) {
                    Ok(materialized) => Ok(materialized),
                    Err(err) => {
                        log::warn!("Saved {:?} is kept untyped: {}", document.id(), err);
                        Ok(Materialized::RawFallback(document))
                    }
                }
            }
            other => {
                let mut instance = self.inner.instance_of(other)?;
                instance.save()?;
                Ok(Materialized::Typed(instance))
            }
        }
    }

    pub fn bulk_save<I, T>(&self, items: I) -> MapperResult<Vec<BulkResult>>
    where
        I: IntoIterator<Item = T>,
        T: Into<BulkItem>,
    {
        let documents = self.inner.bulk_documents(items)?;
        self.inner.store.bulk_save(documents)
    }

    pub fn bulk_delete<I, T>(&self, items: I) -> MapperResult<Vec<BulkResult>>
    where
        I: IntoIterator<Item = T>,
        T: Into<BulkItem>,
    {
        let documents = self.inner.bulk_documents(items)?;
        self.inner.store.bulk_delete(documents)
    }

    /// Deletes the document `input` serializes to. Its `_id` and `_rev`
    /// identify the stored document.
    pub fn delete(&self, input: impl Into<Coercible>) -> MapperResult<()> {
        let document = self.inner.serialize(input.into())?;
        self.inner.store.delete(&document)
    }

    /// Copies the stored document `input` refers to.
    pub fn copy(&self, input: impl Into<Coercible>, destination: Option<&str>) -> MapperResult<CopyResult> {
        let document = self.inner.serialize(input.into())?;
        self.inner.store.copy(&document, destination)
    }

    /// The current version of a document and its known revisions.
    pub fn doc_revisions(&self, id: &str) -> MapperResult<DocRevisions> {
        let document = self.get(id)?;
        let revisions = self.inner.store.revisions(id)?;
        Ok(DocRevisions { document, revisions })
    }

    /// Executes the stored view `name` (`design/view`), rehydrating every
    /// row value.
    pub fn view(&self, name: &str, params: QueryParams) -> MapperResult<ViewResults<Materialized>> {
        self.inner.execute(
            ViewRequest::Named(name.to_string()),
            &params,
            RowWrapper::plain(self.inner.rehydrator.clone()),
        )
    }

    /// Executes the stored view `name` and applies `transform` to every
    /// rehydrated row.
    pub fn view_with<R, F>(&self, name: &str, params: QueryParams, transform: F) -> MapperResult<ViewResults<R>>
    where
        F: Fn(ViewRow) -> MapperResult<R> + Send + Sync + 'static,
    {
        self.inner.execute(
            ViewRequest::Named(name.to_string()),
            &params,
            RowWrapper::new(self.inner.rehydrator.clone(), transform),
        )
    }

    /// Executes the stored view `name` and decodes every row value into
    /// `T`.
    ///
    /// # Errors
    ///
    /// Fails immediately with `InvalidWrapper` when `T` is not the shape
    /// registered under its name.
    pub fn view_as<T: MappedEntity>(&self, name: &str, params: QueryParams) -> MapperResult<ViewResults<T>> {
        let type_name = T::entity_name();
        let registered = self
            .registry()
            .get(&type_name)
            .is_some_and(|registered_type| registered_type.is_shape_of::<T>());
        if !registered {
            log::error!("{} is not registered, rows cannot be decoded into it", type_name);
            return Err(MapperError::new(
                &format!("{} is not the shape registered as {}", std::any::type_name::<T>(), type_name),
                ErrorKind::InvalidWrapper,
            ));
        }

        self.view_with(name, params, |row| {
            row.into_materialized()?.into_typed()?.to_entity::<T>()
        })
    }

    /// Executes an ad hoc view.
    pub fn temp_view(&self, map: MapFunction, params: QueryParams) -> MapperResult<ViewResults<Materialized>> {
        self.inner.execute(
            ViewRequest::Temporary(map),
            &params,
            RowWrapper::plain(self.inner.rehydrator.clone()),
        )
    }

    pub fn temp_view_with<R, F>(&self, map: MapFunction, params: QueryParams, transform: F) -> MapperResult<ViewResults<R>>
    where
        F: Fn(ViewRow) -> MapperResult<R> + Send + Sync + 'static,
    {
        self.inner.execute(
            ViewRequest::Temporary(map),
            &params,
            RowWrapper::new(self.inner.rehydrator.clone(), transform),
        )
    }

    /// Lists all documents through the built-in `_all_docs` view.
    ///
    /// Without `include_docs` the rows only carry identifiers and
    /// revisions, so the rehydrated values have no application fields.
    pub fn list_all(&self, params: QueryParams) -> MapperResult<ViewResults<Materialized>> {
        self.view(ALL_DOCS_VIEW, params)
    }

    pub fn list_all_with<R, F>(&self, params: QueryParams, transform: F) -> MapperResult<ViewResults<R>>
    where
        F: Fn(ViewRow) -> MapperResult<R> + Send + Sync + 'static,
    {
        self.view_with(ALL_DOCS_VIEW, params, transform)
    }
}

impl std::fmt::Debug for Mapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mapper").finish_non_exhaustive()
    }
}

struct MapperInner {
    store: DocumentStore,
    config: MapperConfig,
    rehydrator: Rehydrator,
}

impl MapperInner {
    fn registry(&self) -> &ClassRegistry {
        self.rehydrator.registry()
    }

    fn add(&self, input: Coercible) -> MapperResult<Added> {
        let class_name = input.type_name().to_string();
        let known = self.registry().get(&class_name);
        let (registered_type, instance) = coerce(input, known.as_ref())?.into_parts();
        self.registry().register(&class_name, registered_type.clone());

        match instance {
            None => Ok(Added::Type(registered_type)),
            Some(mut instance) => {
                instance.attach(self.store.clone());
                Ok(Added::Instance(instance))
            }
        }
    }

    /// An attached instance for `input`. Raw mappings are wrapped without
    /// touching the registry.
    fn instance_of(&self, input: Coercible) -> MapperResult<MappedDocument> {
        let mut instance = match input {
            Coercible::Raw(document) => {
                let known = self.registry().resolve(document.doc_type());
                let (_, instance) = coerce(Coercible::Raw(document), Some(&known))?.into_parts();
                instance.ok_or_else(|| {
                    log::error!("Coercion of a mapping produced no instance");
                    MapperError::new("Coercion of a mapping produced no instance", ErrorKind::InternalError)
                })?
            }
            other => self.add(other)?.into_instance()?,
        };
        instance.attach(self.store.clone());
        Ok(instance)
    }

    /// The document form of `input`, without registering anything.
    fn serialize(&self, input: Coercible) -> MapperResult<Document> {
        match input {
            Coercible::Raw(document) => Ok(document),
            Coercible::Mapped(instance) => instance.to_document(),
            entity @ Coercible::Entity { .. } => {
                let known = self.registry().get(entity.type_name());
                match coerce(entity, known.as_ref())?.into_parts() {
                    (_, Some(instance)) => instance.to_document(),
                    (registered_type, None) => Err(not_a_document(&registered_type)),
                }
            }
            Coercible::Shape(shape) => Err(not_a_document(&shape.name())),
            Coercible::Registered(registered_type) => Err(not_a_document(&registered_type)),
        }
    }

    fn bulk_documents<I, T>(&self, items: I) -> MapperResult<Vec<Document>>
    where
        I: IntoIterator<Item = T>,
        T: Into<BulkItem>,
    {
        items
            .into_iter()
            .map(|item| match item.into() {
                BulkItem::Raw(document) => Ok(document),
                BulkItem::Object(input) => self.add(input)?.into_instance()?.to_document(),
            })
            .collect()
    }

    fn execute<R>(&self, request: ViewRequest, params: &QueryParams, wrapper: RowWrapper<R>) -> MapperResult<ViewResults<R>> {
        let response = self.store.query(&request, params)?;
        Ok(ViewResults::new(response, wrapper))
    }
}

fn not_a_document(name: &dyn std::fmt::Display) -> MapperError {
    log::error!("{} is a type, not a document", name);
    MapperError::new(
        &format!("{} is a type, not a document", name),
        ErrorKind::InvalidOperation,
    )
}
