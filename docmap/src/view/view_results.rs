use crate::document::Document;
use crate::errors::MapperResult;
use crate::store::ViewResponse;
use crate::view::RowWrapper;

/// Lazily rehydrated rows of a view.
///
/// Rows are wrapped one at a time as the iterator advances; a row that
/// fails to rehydrate yields an `Err` item without ending the iteration.
pub struct ViewResults<R> {
    total_rows: usize,
    offset: usize,
    rows: std::vec::IntoIter<Document>,
    wrapper: RowWrapper<R>,
}

impl<R> ViewResults<R> {
    pub(crate) fn new(response: ViewResponse, wrapper: RowWrapper<R>) -> Self {
        ViewResults {
            total_rows: response.total_rows(),
            offset: response.offset(),
            rows: response.into_rows().into_iter(),
            wrapper,
        }
    }

    pub fn total_rows(&self) -> usize {
        self.total_rows
    }

    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl<R> Iterator for ViewResults<R> {
    type Item = MapperResult<R>;

    fn next(&mut self) -> Option<Self::Item> {
        self.rows.next().map(|row| self.wrapper.wrap(row))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rows.size_hint()
    }
}

impl<R> ExactSizeIterator for ViewResults<R> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc;
    use crate::mapping::{ClassRegistry, Rehydrator};

    #[test]
    fn test_rows_are_wrapped_in_order() {
        let response = ViewResponse::new(
            5,
            2,
            vec![
                doc! { id: "a", value: { n: 1 } },
                doc! { id: "b", value: 2 },
                doc! { id: "c", value: { n: 3 } },
            ],
        );
        let mut results = ViewResults::new(response, RowWrapper::plain(Rehydrator::new(ClassRegistry::new())));
        assert_eq!(results.total_rows(), 5);
        assert_eq!(results.offset(), 2);
        assert_eq!(results.len(), 3);

        assert_eq!(results.next().unwrap().unwrap().id(), Some("a"));
        assert!(results.next().unwrap().is_err());
        assert_eq!(results.next().unwrap().unwrap().id(), Some("c"));
        assert!(results.next().is_none());
    }
}
