use crate::common::Value;
use crate::document::Document;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// Collects the rows a map function emits for one document.
#[derive(Default)]
pub struct Emitter {
    rows: Vec<(Value, Value)>,
}

impl Emitter {
    pub fn new() -> Self {
        Emitter::default()
    }

    /// Emits a row with `key` and `value`.
    pub fn emit<K: Into<Value>, V: Into<Value>>(&mut self, key: K, value: V) {
        self.rows.push((key.into(), value.into()));
    }

    pub(crate) fn into_rows(self) -> Vec<(Value, Value)> {
        self.rows
    }
}

/// A view map function.
///
/// Called once per stored document; emits zero or more key/value rows.
///
/// ```rust,ignore
/// let by_author = MapFunction::new(|doc, emitter| {
///     if doc.doc_type() == Some("Greeting") {
///         emitter.emit(doc.get("author"), doc.clone());
///     }
/// });
/// ```
#[derive(Clone)]
pub struct MapFunction {
    inner: Arc<dyn Fn(&Document, &mut Emitter) + Send + Sync>,
}

impl MapFunction {
    pub fn new<F>(map: F) -> Self
    where
        F: Fn(&Document, &mut Emitter) + Send + Sync + 'static,
    {
        MapFunction { inner: Arc::new(map) }
    }

    /// Runs the function over `document` and returns the emitted rows.
    pub fn apply(&self, document: &Document) -> Vec<(Value, Value)> {
        let mut emitter = Emitter::new();
        (self.inner)(document, &mut emitter);
        emitter.into_rows()
    }
}

impl Debug for MapFunction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "MapFunction")
    }
}

/// Which view to execute.
#[derive(Clone, Debug)]
pub enum ViewRequest {
    /// A view stored in the database, `design/view` or `_all_docs`.
    Named(String),
    /// An ad hoc view that is not stored.
    Temporary(MapFunction),
}

/// Raw result of a view execution.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ViewResponse {
    total_rows: usize,
    offset: usize,
    rows: Vec<Document>,
}

impl ViewResponse {
    pub fn new(total_rows: usize, offset: usize, rows: Vec<Document>) -> Self {
        ViewResponse {
            total_rows,
            offset,
            rows,
        }
    }

    /// Rows in the view before any filtering.
    pub fn total_rows(&self) -> usize {
        self.total_rows
    }

    /// Position of the first returned row within the view.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn rows(&self) -> &[Document] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Document> {
        self.rows
    }
}
