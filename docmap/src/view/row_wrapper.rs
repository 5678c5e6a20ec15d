use crate::document::Document;
use crate::errors::MapperResult;
use crate::mapping::{Materialized, Rehydrator};
use crate::view::ViewRow;

/// A caller supplied per-row transformation.
pub type RowTransform<R> = Box<dyn Fn(ViewRow) -> MapperResult<R> + Send + Sync>;

/// Rehydrates view rows and hands them to a transformation.
///
/// The transformation sees the whole row: the same envelope the store
/// returned, with only the value upgraded from a raw mapping to its
/// registered type.
pub struct RowWrapper<R> {
    rehydrator: Rehydrator,
    transform: RowTransform<R>,
}

impl RowWrapper<Materialized> {
    /// A wrapper that returns just the rehydrated value of every row.
    pub fn plain(rehydrator: Rehydrator) -> Self {
        RowWrapper {
            rehydrator,
            transform: Box::new(ViewRow::into_materialized),
        }
    }
}

impl<R> RowWrapper<R> {
    pub fn new<F>(rehydrator: Rehydrator, transform: F) -> Self
    where
        F: Fn(ViewRow) -> MapperResult<R> + Send + Sync + 'static,
    {
        RowWrapper {
            rehydrator,
            transform: Box::new(transform),
        }
    }

    pub fn wrap(&self, envelope: Document) -> MapperResult<R> {
        let row = ViewRow::from_envelope(envelope, &self.rehydrator)?;
        (self.transform)(row)
    }
}
