use super::revision::{new_document_id, next_revision};
use super::MemoryStoreConfig;
use crate::common::{
    atomic, collate, is_reserved_field, Atomic, ReadExecutor, Value, WriteExecutor, ALL_DOCS_VIEW,
    DESIGN_DOC_PREFIX, DOC_DELETED, DOC_ID, DOC_REV, LOCAL_DOC_PREFIX, ROW_DOC, ROW_ID, ROW_KEY,
    ROW_REV, ROW_VALUE, VIEW_NAME_SEPARATOR,
};
use crate::document::Document;
use crate::errors::{ErrorKind, MapperError, MapperResult};
use crate::store::{
    BulkResult, CopyResult, DocumentStoreProvider, Emitter, MapFunction, QueryParams, ViewRequest,
    ViewResponse,
};
use dashmap::DashMap;
use itertools::Itertools;
use std::cmp::Ordering;
use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

/// In-process implementation of [DocumentStoreProvider].
///
/// # Purpose
/// `MemoryStore` behaves like a single-node schema-less document database:
/// documents have identifiers and revisions, updates use optimistic
/// concurrency, deletions leave tombstones and views are Rust map
/// functions. Nothing is persisted; all data is lost with the last clone.
///
/// # Characteristics
/// - Revisions are `<generation>-<token>`; every write bumps the generation
/// - Updating an existing document requires its current revision
/// - `_all_docs` lists live documents (design documents included) by id
/// - Named views skip design and local documents and sort by key collation
///
/// # Usage
/// ```text
/// let store = MemoryStore::new();
/// store.define_view("greeting/all", |doc, emitter| {
///     if doc.doc_type() == Some("Greeting") {
///         emitter.emit(doc.get("author"), doc.clone());
///     }
/// })?;
/// let store = DocumentStore::new(store);
/// ```
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<MemoryStoreInner>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        MemoryStore::new()
    }
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::with_config(MemoryStoreConfig::default())
    }

    pub fn with_config(config: MemoryStoreConfig) -> MemoryStore {
        MemoryStore {
            inner: Arc::new(MemoryStoreInner::new(config)),
        }
    }

    /// Defines the view `name` (`design/view`), replacing any previous
    /// definition.
    pub fn define_view<F>(&self, name: &str, map: F) -> MapperResult<()>
    where
        F: Fn(&Document, &mut Emitter) + Send + Sync + 'static,
    {
        self.inner.define_view(name, MapFunction::new(map))
    }

    pub fn remove_view(&self, name: &str) -> bool {
        self.inner.views.remove(name).is_some()
    }

    pub fn has_view(&self, name: &str) -> bool {
        self.inner.views.contains_key(name)
    }

    /// Number of live documents.
    pub fn doc_count(&self) -> usize {
        self.inner
            .documents
            .read_with(|documents| documents.values().filter(|stored| !stored.deleted).count())
    }

    pub fn config(&self) -> &MemoryStoreConfig {
        &self.inner.config
    }
}

impl DocumentStoreProvider for MemoryStore {
    fn name(&self) -> String {
        self.inner.config.get_name().to_string()
    }

    fn get(&self, id: &str, rev: Option<&str>) -> MapperResult<Document> {
        self.inner.get(id, rev)
    }

    fn save(&self, document: &mut Document) -> MapperResult<()> {
        self.inner.save(document)
    }

    fn bulk_save(&self, documents: Vec<Document>) -> MapperResult<Vec<BulkResult>> {
        let results = documents
            .into_iter()
            .map(|mut document| {
                let requested_id = document.id().unwrap_or_default().to_string();
                match self.inner.save(&mut document) {
                    Ok(()) => BulkResult::success(
                        document.id().unwrap_or_default(),
                        document.revision().unwrap_or_default(),
                    ),
                    Err(err) => BulkResult::failure(&requested_id, err.message()),
                }
            })
            .collect();
        Ok(results)
    }

    fn bulk_delete(&self, documents: Vec<Document>) -> MapperResult<Vec<BulkResult>> {
        let results = documents
            .iter()
            .map(|document| {
                let id = document.id().unwrap_or_default();
                match self.inner.delete(document) {
                    Ok(rev) => BulkResult::success(id, &rev),
                    Err(err) => BulkResult::failure(id, err.message()),
                }
            })
            .collect();
        Ok(results)
    }

    fn delete(&self, document: &Document) -> MapperResult<()> {
        self.inner.delete(document).map(|_| ())
    }

    fn copy(&self, document: &Document, destination: Option<&str>) -> MapperResult<CopyResult> {
        self.inner.copy(document, destination)
    }

    fn query(&self, request: &ViewRequest, params: &QueryParams) -> MapperResult<ViewResponse> {
        self.inner.query(request, params)
    }

    fn revisions(&self, id: &str) -> MapperResult<Vec<String>> {
        self.inner.revisions(id)
    }
}

/// Revision history of one document, oldest first.
#[derive(Default)]
struct StoredDocument {
    history: VecDeque<(String, Document)>,
    deleted: bool,
}

impl StoredDocument {
    fn current_rev(&self) -> Option<&str> {
        self.history.back().map(|(rev, _)| rev.as_str())
    }

    fn live(&self) -> Option<&(String, Document)> {
        if self.deleted {
            None
        } else {
            self.history.back()
        }
    }

    fn at(&self, rev: &str) -> Option<&Document> {
        self.history
            .iter()
            .find(|(known, _)| known == rev)
            .map(|(_, body)| body)
    }

    fn push(&mut self, rev: String, body: Document, deleted: bool, limit: usize) {
        self.history.push_back((rev, body));
        while self.history.len() > limit {
            self.history.pop_front();
        }
        self.deleted = deleted;
    }
}

struct KeyedRow {
    key: Value,
    id: String,
    envelope: Document,
}

struct MemoryStoreInner {
    config: MemoryStoreConfig,
    documents: Atomic<BTreeMap<String, StoredDocument>>,
    views: DashMap<String, MapFunction>,
}

impl MemoryStoreInner {
    fn new(config: MemoryStoreConfig) -> Self {
        MemoryStoreInner {
            config,
            documents: atomic(BTreeMap::new()),
            views: DashMap::new(),
        }
    }

    fn define_view(&self, name: &str, map: MapFunction) -> MapperResult<()> {
        let valid = name
            .split_once(VIEW_NAME_SEPARATOR)
            .is_some_and(|(design, view)| !design.is_empty() && !view.is_empty());
        if !valid {
            log::error!("Invalid view name {}", name);
            return Err(MapperError::new(
                &format!("View name '{}' must be of the form design/view", name),
                ErrorKind::InvalidOperation,
            ));
        }
        self.views.insert(name.to_string(), map);
        Ok(())
    }

    fn get(&self, id: &str, rev: Option<&str>) -> MapperResult<Document> {
        self.documents.read_with(|documents| {
            let stored = documents.get(id).ok_or_else(|| not_found(id, "missing"))?;
            match rev {
                Some(rev) => stored
                    .at(rev)
                    .map(|body| with_metadata(body, id, rev))
                    .ok_or_else(|| not_found(id, "missing revision")),
                None => stored
                    .live()
                    .map(|(rev, body)| with_metadata(body, id, rev))
                    .ok_or_else(|| not_found(id, "deleted")),
            }
        })
    }

    fn save(&self, document: &mut Document) -> MapperResult<()> {
        if let Some(key) = document
            .keys()
            .into_iter()
            .find(|key| is_reserved_field(key) && ![DOC_ID, DOC_REV, DOC_DELETED].contains(&key.as_str()))
        {
            log::error!("Bad special document member {}", key);
            return Err(MapperError::new(
                &format!("Bad special document member: {}", key),
                ErrorKind::StoreError,
            ));
        }

        let id = match document.get_ref(DOC_ID) {
            None | Some(Value::Null) => new_document_id(),
            Some(Value::String(id)) if !id.is_empty() => id.clone(),
            Some(other) => {
                log::error!("Invalid document id {}", other);
                return Err(MapperError::new(
                    &format!("Invalid document id {}", other),
                    ErrorKind::InvalidId,
                ));
            }
        };
        let rev = requested_revision(document)?;
        let deleted = document.get(DOC_DELETED) == Value::Bool(true);
        let body = document.filtered(|key| !is_reserved_field(key));

        let new_rev = self.write(&id, rev.as_deref(), body, deleted)?;
        document.remove(DOC_DELETED);
        document.put(DOC_ID, id)?;
        document.put(DOC_REV, new_rev)?;
        Ok(())
    }

    fn delete(&self, document: &Document) -> MapperResult<String> {
        let id = document.id().filter(|id| !id.is_empty()).ok_or_else(|| {
            log::error!("Cannot delete a document without identifier");
            MapperError::new("Cannot delete a document without identifier", ErrorKind::InvalidId)
        })?;
        let rev = requested_revision(document)?;
        if rev.is_none() {
            log::error!("Cannot delete {} without revision", id);
            return Err(MapperError::new(
                &format!("Document update conflict: {} requires a revision to be deleted", id),
                ErrorKind::Conflict,
            ));
        }
        self.write(id, rev.as_deref(), Document::new(), true)
    }

    fn copy(&self, document: &Document, destination: Option<&str>) -> MapperResult<CopyResult> {
        let source_id = document.id().ok_or_else(|| {
            log::error!("Cannot copy a document without identifier");
            MapperError::new("Cannot copy a document without identifier", ErrorKind::InvalidId)
        })?;
        let source = self.get(source_id, None)?;
        let destination = match destination {
            Some(destination) if !destination.is_empty() => destination.to_string(),
            Some(_) => {
                log::error!("Copy destination is empty");
                return Err(MapperError::new("Copy destination is empty", ErrorKind::InvalidId));
            }
            None => new_document_id(),
        };

        let body = source.filtered(|key| !is_reserved_field(key));
        let rev = self.write(&destination, None, body, false)?;
        Ok(CopyResult::new(&destination, &rev))
    }

    fn revisions(&self, id: &str) -> MapperResult<Vec<String>> {
        self.documents.read_with(|documents| {
            let stored = documents
                .get(id)
                .filter(|stored| !stored.deleted)
                .ok_or_else(|| not_found(id, "missing"))?;
            Ok(stored.history.iter().rev().map(|(rev, _)| rev.clone()).collect())
        })
    }

    fn write(&self, id: &str, rev: Option<&str>, body: Document, deleted: bool) -> MapperResult<String> {
        let limit = self.config.get_revs_limit();
        self.documents.write_with(|documents| {
            let existing = documents.get(id);
            let live = existing.is_some_and(|stored| !stored.deleted);
            let current_rev = existing.and_then(|stored| stored.current_rev()).map(str::to_string);

            if deleted && !live {
                return Err(not_found(id, "deleted"));
            }

            let accepted = if live {
                rev == current_rev.as_deref()
            } else {
                rev.is_none() || rev == current_rev.as_deref()
            };
            if !accepted {
                log::error!("Revision {:?} of {} does not match {:?}", rev, id, current_rev);
                return Err(MapperError::new(
                    &format!("Document update conflict on {}", id),
                    ErrorKind::Conflict,
                ));
            }

            let new_rev = next_revision(current_rev.as_deref())?;
            documents
                .entry(id.to_string())
                .or_default()
                .push(new_rev.clone(), body, deleted, limit);
            Ok(new_rev)
        })
    }

    fn query(&self, request: &ViewRequest, params: &QueryParams) -> MapperResult<ViewResponse> {
        let rows = match request {
            ViewRequest::Named(name) if name == ALL_DOCS_VIEW => self.all_docs(params.includes_docs()),
            ViewRequest::Named(name) => {
                let map = self
                    .views
                    .get(name)
                    .map(|entry| entry.value().clone())
                    .ok_or_else(|| not_found(name, "missing view"))?;
                self.map_rows(&map, params.includes_docs())
            }
            ViewRequest::Temporary(map) => self.map_rows(map, params.includes_docs()),
        };

        let total_rows = rows.len();
        let mut ordered = rows;
        if params.is_descending() {
            ordered.reverse();
        }

        let selected = ordered
            .into_iter()
            .enumerate()
            .filter(|(_, row)| in_range(&row.key, params))
            .collect_vec();
        let offset = selected
            .first()
            .map(|(position, _)| *position)
            .unwrap_or(total_rows)
            .saturating_add(params.get_skip())
            .min(total_rows);

        let rows = selected
            .into_iter()
            .skip(params.get_skip())
            .take(params.get_limit().unwrap_or(usize::MAX))
            .map(|(_, row)| row.envelope)
            .collect();
        Ok(ViewResponse::new(total_rows, offset, rows))
    }

    fn live_documents(&self) -> Vec<(String, Document)> {
        self.documents.read_with(|documents| {
            documents
                .iter()
                .filter_map(|(id, stored)| stored.live().map(|(rev, body)| (id.clone(), with_metadata(body, id, rev))))
                .filter(|(id, _)| !id.starts_with(LOCAL_DOC_PREFIX))
                .collect()
        })
    }

    fn all_docs(&self, include_docs: bool) -> Vec<KeyedRow> {
        self.live_documents()
            .into_iter()
            .map(|(id, document)| {
                let mut envelope = Document::new();
                let mut value = Document::new();
                // keys are constants, puts cannot fail
                let _ = value.put(ROW_REV, document.get(DOC_REV));
                let _ = envelope.put(ROW_ID, id.as_str());
                let _ = envelope.put(ROW_KEY, id.as_str());
                let _ = envelope.put(ROW_VALUE, value);
                if include_docs {
                    let _ = envelope.put(ROW_DOC, document);
                }
                KeyedRow {
                    key: Value::from(id.as_str()),
                    id,
                    envelope,
                }
            })
            .collect()
    }

    fn map_rows(&self, map: &MapFunction, include_docs: bool) -> Vec<KeyedRow> {
        self.live_documents()
            .into_iter()
            .filter(|(id, _)| !id.starts_with(DESIGN_DOC_PREFIX))
            .flat_map(|(id, document)| {
                map.apply(&document)
                    .into_iter()
                    .map(|(key, value)| {
                        let mut envelope = Document::new();
                        let _ = envelope.put(ROW_ID, id.as_str());
                        let _ = envelope.put(ROW_KEY, key.clone());
                        let _ = envelope.put(ROW_VALUE, value);
                        if include_docs {
                            let _ = envelope.put(ROW_DOC, document.clone());
                        }
                        KeyedRow {
                            key,
                            id: id.clone(),
                            envelope,
                        }
                    })
                    .collect_vec()
            })
            .sorted_by(|a, b| collate(&a.key, &b.key).then_with(|| a.id.cmp(&b.id)))
            .collect()
    }
}

fn in_range(key: &Value, params: &QueryParams) -> bool {
    if let Some(expected) = params.get_key() {
        if collate(key, expected) != Ordering::Equal {
            return false;
        }
    }

    let (below, above) = if params.is_descending() {
        (Ordering::Greater, Ordering::Less)
    } else {
        (Ordering::Less, Ordering::Greater)
    };
    let after_start = params
        .get_start_key()
        .is_none_or(|start| collate(key, start) != below);
    let before_end = params
        .get_end_key()
        .is_none_or(|end| collate(key, end) != above);
    after_start && before_end
}

fn with_metadata(body: &Document, id: &str, rev: &str) -> Document {
    let mut document = body.clone();
    let _ = document.put(DOC_ID, id);
    let _ = document.put(DOC_REV, rev);
    document
}

fn requested_revision(document: &Document) -> MapperResult<Option<String>> {
    match document.get_ref(DOC_REV) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(rev)) => Ok(Some(rev.clone())),
        Some(other) => {
            log::error!("Invalid revision {}", other);
            Err(MapperError::new(
                &format!("Invalid revision {}", other),
                ErrorKind::StoreError,
            ))
        }
    }
}

fn not_found(id: &str, reason: &str) -> MapperError {
    log::error!("Document {} not found: {}", id, reason);
    MapperError::new(&format!("{} not found: {}", id, reason), ErrorKind::NotFound)
}
