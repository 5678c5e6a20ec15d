use crate::document::Document;
use crate::errors::MapperResult;
use crate::store::{BulkResult, CopyResult, QueryParams, ViewRequest, ViewResponse};
use std::ops::Deref;
use std::sync::Arc;

/// Contract of the document store the mapper sits on.
///
/// # Purpose
/// The mapper never talks to a database directly. Everything it persists
/// or queries goes through this trait, so any schema-less document store
/// with identifiers, revisions and views can be plugged in.
///
/// # Conventions
/// - Documents carry their identifier in `_id` and their revision in `_rev`.
/// - `save` assigns both in place on success.
/// - Missing or deleted documents are reported as `NotFound`, stale or
///   missing revisions on update as `Conflict`.
/// - View responses contain one envelope document per row with `id`,
///   `key` and `value` entries, plus `doc` when documents were included.
///
/// # Implementations
/// - `MemoryStore`: in-process store for tests and tooling
///
/// # Thread Safety
/// Implementers must be `Send + Sync`.
pub trait DocumentStoreProvider: Send + Sync {
    /// Name of the store, for diagnostics.
    fn name(&self) -> String;

    /// Fetches a document, optionally at a specific revision.
    fn get(&self, id: &str, rev: Option<&str>) -> MapperResult<Document>;

    /// Creates or updates a document, assigning `_id` and `_rev` in place.
    fn save(&self, document: &mut Document) -> MapperResult<()>;

    /// Saves every document independently; failures are reported per item.
    fn bulk_save(&self, documents: Vec<Document>) -> MapperResult<Vec<BulkResult>>;

    /// Deletes every document independently; failures are reported per item.
    fn bulk_delete(&self, documents: Vec<Document>) -> MapperResult<Vec<BulkResult>>;

    /// Deletes the document identified by its `_id` and `_rev`.
    fn delete(&self, document: &Document) -> MapperResult<()>;

    /// Copies the stored document identified by `document`'s `_id` to
    /// `destination`, or to a generated identifier.
    fn copy(&self, document: &Document, destination: Option<&str>) -> MapperResult<CopyResult>;

    /// Executes a view.
    fn query(&self, request: &ViewRequest, params: &QueryParams) -> MapperResult<ViewResponse>;

    /// Known revisions of a document, newest first.
    fn revisions(&self, id: &str) -> MapperResult<Vec<String>>;
}

/// Shared handle to a [DocumentStoreProvider].
///
/// Cloning is cheap and every clone talks to the same store.
///
/// ```text
/// let store = DocumentStore::new(MemoryStore::new());
/// let mut doc = doc!{ author: "A" };
/// store.save(&mut doc)?;
/// let fetched = store.get(doc.id().unwrap(), None)?;
/// ```
#[derive(Clone)]
pub struct DocumentStore {
    inner: Arc<dyn DocumentStoreProvider>,
}

impl DocumentStore {
    pub fn new<T: DocumentStoreProvider + 'static>(inner: T) -> Self {
        DocumentStore { inner: Arc::new(inner) }
    }
}

impl Deref for DocumentStore {
    type Target = Arc<dyn DocumentStoreProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
