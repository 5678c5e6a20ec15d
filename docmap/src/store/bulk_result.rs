/// Outcome of one document in a bulk save or bulk delete.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BulkResult {
    id: String,
    rev: Option<String>,
    error: Option<String>,
}

impl BulkResult {
    pub fn success(id: &str, rev: &str) -> Self {
        BulkResult {
            id: id.to_string(),
            rev: Some(rev.to_string()),
            error: None,
        }
    }

    pub fn failure(id: &str, error: &str) -> Self {
        BulkResult {
            id: id.to_string(),
            rev: None,
            error: Some(error.to_string()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn rev(&self) -> Option<&str> {
        self.rev.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Identifier and revision of the document created by a copy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CopyResult {
    id: String,
    rev: String,
}

impl CopyResult {
    pub fn new(id: &str, rev: &str) -> Self {
        CopyResult {
            id: id.to_string(),
            rev: rev.to_string(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn rev(&self) -> &str {
        &self.rev
    }
}
