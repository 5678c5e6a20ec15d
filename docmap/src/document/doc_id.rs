use crate::common::{Value, DESIGN_DOC_PREFIX, LOCAL_DOC_PREFIX};
use crate::errors::{ErrorKind, MapperError, MapperResult};
use std::fmt::Display;

/// Category of a document identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocIdKind {
    /// An application document.
    Regular,
    /// A design document holding view definitions (`_design/...`).
    Design,
    /// A non-replicated local document (`_local/...`).
    Local,
}

/// A validated document identifier.
///
/// Only [DocIdKind::Regular] identifiers denote application documents that
/// can be rehydrated into a registered type; design and local documents are
/// store internals and are handed back untyped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocId {
    id: String,
}

impl DocId {
    /// Validates a raw identifier string.
    ///
    /// # Errors
    ///
    /// Returns `StructuralMismatch` if the identifier is empty.
    pub fn new(id: &str) -> MapperResult<DocId> {
        if id.is_empty() {
            log::error!("Document identifier cannot be empty");
            return Err(MapperError::new(
                "Document identifier cannot be empty",
                ErrorKind::StructuralMismatch,
            ));
        }
        Ok(DocId { id: id.to_string() })
    }

    /// Validates the `_id` value found in a payload.
    ///
    /// Callers recover from a mismatch by keeping the payload untyped, so
    /// it is only logged at debug level.
    ///
    /// # Errors
    ///
    /// Returns `StructuralMismatch` if the value is not a non-empty string.
    pub fn from_value(value: &Value) -> MapperResult<DocId> {
        match value {
            Value::String(id) if !id.is_empty() => Ok(DocId { id: id.clone() }),
            other => {
                log::debug!("Document identifier {} is not a non-empty string", other);
                Err(MapperError::new(
                    &format!("Document identifier {} is not a non-empty string", other),
                    ErrorKind::StructuralMismatch,
                ))
            }
        }
    }

    pub fn kind(&self) -> DocIdKind {
        if self.id.starts_with(DESIGN_DOC_PREFIX) {
            DocIdKind::Design
        } else if self.id.starts_with(LOCAL_DOC_PREFIX) {
            DocIdKind::Local
        } else {
            DocIdKind::Regular
        }
    }

    pub fn is_regular(&self) -> bool {
        self.kind() == DocIdKind::Regular
    }

    pub fn is_design(&self) -> bool {
        self.kind() == DocIdKind::Design
    }

    pub fn as_str(&self) -> &str {
        &self.id
    }

    pub fn into_string(self) -> String {
        self.id
    }
}

impl Display for DocId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl AsRef<str> for DocId {
    fn as_ref(&self) -> &str {
        &self.id
    }
}
