use crate::common::Value;

/// Options of a view query.
///
/// Keys are compared with view key collation. Range bounds are inclusive
/// and follow the iteration direction: with `descending` set, `start_key`
/// is the upper bound.
///
/// # Examples
///
/// ```rust,ignore
/// use docmap::store::QueryParams;
///
/// let params = QueryParams::new().start_key("a").end_key("m").limit(20);
/// let params = by_key("alice").include_docs(true);
/// let params = limit_to(10).descending(true);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryParams {
    pub(crate) key: Option<Value>,
    pub(crate) start_key: Option<Value>,
    pub(crate) end_key: Option<Value>,
    pub(crate) limit: Option<usize>,
    pub(crate) skip: usize,
    pub(crate) descending: bool,
    pub(crate) include_docs: bool,
}

/// Creates `QueryParams` matching a single key.
pub fn by_key<T: Into<Value>>(key: T) -> QueryParams {
    QueryParams::new().key(key)
}

/// Creates `QueryParams` returning at most `limit` rows.
pub fn limit_to(limit: usize) -> QueryParams {
    QueryParams::new().limit(limit)
}

impl QueryParams {
    pub fn new() -> QueryParams {
        QueryParams::default()
    }

    /// Only rows whose key equals `key`.
    pub fn key<T: Into<Value>>(mut self, key: T) -> QueryParams {
        self.key = Some(key.into());
        self
    }

    pub fn start_key<T: Into<Value>>(mut self, key: T) -> QueryParams {
        self.start_key = Some(key.into());
        self
    }

    pub fn end_key<T: Into<Value>>(mut self, key: T) -> QueryParams {
        self.end_key = Some(key.into());
        self
    }

    pub fn limit(mut self, limit: usize) -> QueryParams {
        self.limit = Some(limit);
        self
    }

    pub fn skip(mut self, skip: usize) -> QueryParams {
        self.skip = skip;
        self
    }

    pub fn descending(mut self, descending: bool) -> QueryParams {
        self.descending = descending;
        self
    }

    /// Adds the full stored document to every row under `doc`.
    pub fn include_docs(mut self, include_docs: bool) -> QueryParams {
        self.include_docs = include_docs;
        self
    }

    pub fn get_key(&self) -> Option<&Value> {
        self.key.as_ref()
    }

    pub fn get_start_key(&self) -> Option<&Value> {
        self.start_key.as_ref()
    }

    pub fn get_end_key(&self) -> Option<&Value> {
        self.end_key.as_ref()
    }

    pub fn get_limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn get_skip(&self) -> usize {
        self.skip
    }

    pub fn is_descending(&self) -> bool {
        self.descending
    }

    pub fn includes_docs(&self) -> bool {
        self.include_docs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chaining() {
        let params = QueryParams::new()
            .start_key("a")
            .end_key("m")
            .skip(2)
            .limit(5)
            .descending(true)
            .include_docs(true);
        assert_eq!(params.get_start_key(), Some(&Value::from("a")));
        assert_eq!(params.get_end_key(), Some(&Value::from("m")));
        assert_eq!(params.get_skip(), 2);
        assert_eq!(params.get_limit(), Some(5));
        assert!(params.is_descending());
        assert!(params.includes_docs());
        assert!(params.get_key().is_none());
    }

    #[test]
    fn test_convenience_constructors() {
        assert_eq!(by_key(3).get_key(), Some(&Value::from(3)));
        assert_eq!(limit_to(7).get_limit(), Some(7));
        assert_eq!(QueryParams::new(), QueryParams::default());
    }
}
