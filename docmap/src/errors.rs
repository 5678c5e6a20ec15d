use backtrace::Backtrace;
use serde::{de, ser};
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::result::Result;

use crate::common::{atomic, Atomic};

/// Error kinds for mapper operations.
///
/// The first group covers the mapping layer itself. Most of them are
/// recovered locally by the rehydration pipeline and only reach a caller
/// who explicitly asks for a typed value. The second group is what the
/// document store reports and is propagated unchanged.
///
/// # Examples
///
/// ```rust,ignore
/// use docmap::errors::{MapperError, ErrorKind, MapperResult};
///
/// fn example() -> MapperResult<()> {
///     Err(MapperError::new("field '_rev' is reserved", ErrorKind::ReservedFieldViolation))
/// }
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrorKind {
    // Mapping errors
    /// Application data used a field name owned by store metadata
    ReservedFieldViolation,
    /// A payload claims to be a document but its identifier is invalid
    StructuralMismatch,
    /// No registered type exists for a payload's discriminator
    UnknownType,
    /// A caller supplied row wrapper cannot be applied
    InvalidWrapper,
    /// Error mapping an object to or from a document
    ObjectMappingError,
    /// The provided identifier is invalid
    InvalidId,
    /// The operation is not valid in the current context
    InvalidOperation,

    // Store errors
    /// The requested document was not found
    NotFound,
    /// The document revision does not match the stored revision
    Conflict,
    /// Generic failure reported by the document store
    StoreError,
    /// Generic IO error
    IOError,

    /// Internal error (usually indicates a bug)
    InternalError,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::ReservedFieldViolation => write!(f, "Reserved field violation"),
            ErrorKind::StructuralMismatch => write!(f, "Structural mismatch"),
            ErrorKind::UnknownType => write!(f, "Unknown type"),
            ErrorKind::InvalidWrapper => write!(f, "Invalid wrapper"),
            ErrorKind::ObjectMappingError => write!(f, "Object mapping error"),
            ErrorKind::InvalidId => write!(f, "Invalid ID"),
            ErrorKind::InvalidOperation => write!(f, "Invalid operation"),
            ErrorKind::NotFound => write!(f, "Not found"),
            ErrorKind::Conflict => write!(f, "Document update conflict"),
            ErrorKind::StoreError => write!(f, "Store error"),
            ErrorKind::IOError => write!(f, "IO error"),
            ErrorKind::InternalError => write!(f, "Internal error"),
        }
    }
}

impl ErrorKind {
    /// Returns `true` for kinds reported by the document store rather than
    /// by the mapping layer.
    pub fn is_store_error(&self) -> bool {
        matches!(
            self,
            ErrorKind::NotFound | ErrorKind::Conflict | ErrorKind::StoreError | ErrorKind::IOError
        )
    }
}

/// Mapper error type.
///
/// `MapperError` carries the error message, its kind and an optional cause.
/// It supports error chaining and captures a backtrace at creation.
///
/// # Examples
///
/// ```rust,ignore
/// use docmap::errors::{MapperError, ErrorKind};
///
/// let err = MapperError::new("document missing", ErrorKind::NotFound);
///
/// let cause = MapperError::new("connection reset", ErrorKind::IOError);
/// let err = MapperError::new_with_cause("save failed", ErrorKind::StoreError, cause);
/// ```
#[derive(Clone)]
pub struct MapperError {
    message: String,
    error_kind: ErrorKind,
    cause: Option<Box<MapperError>>,
    backtrace: Atomic<Backtrace>,
}

impl MapperError {
    /// Creates a new `MapperError` with the specified message and error kind.
    pub fn new(message: &str, error_kind: ErrorKind) -> Self {
        MapperError {
            message: message.to_string(),
            error_kind,
            cause: None,
            backtrace: atomic(Backtrace::new()),
        }
    }

    /// Creates a new `MapperError` with a cause error.
    ///
    /// The cause is preserved and reported through [Error::source].
    pub fn new_with_cause(message: &str, error_kind: ErrorKind, cause: MapperError) -> Self {
        MapperError {
            message: message.to_string(),
            error_kind,
            cause: Some(Box::new(cause)),
            backtrace: atomic(Backtrace::new()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.error_kind
    }

    pub fn cause(&self) -> Option<&MapperError> {
        self.cause.as_deref()
    }
}

impl Display for MapperError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Debug for MapperError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.cause {
            Some(cause) => write!(f, "{}\nCaused by: {:?}", self.message, cause),
            None => write!(f, "{}\n{:?}", self.message, self.backtrace.read()),
        }
    }
}

impl Error for MapperError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

/// A result type alias for mapper operations.
pub type MapperResult<T> = Result<T, MapperError>;

impl de::Error for MapperError {
    fn custom<T: Display>(msg: T) -> Self {
        MapperError::new(&msg.to_string(), ErrorKind::ObjectMappingError)
    }
}

impl ser::Error for MapperError {
    fn custom<T: Display>(msg: T) -> Self {
        MapperError::new(&msg.to_string(), ErrorKind::ObjectMappingError)
    }
}

impl From<std::io::Error> for MapperError {
    fn from(err: std::io::Error) -> Self {
        MapperError::new(&format!("IO error: {}", err), ErrorKind::IOError)
    }
}

impl From<String> for MapperError {
    fn from(msg: String) -> Self {
        MapperError::new(&msg, ErrorKind::InternalError)
    }
}

impl From<&str> for MapperError {
    fn from(msg: &str) -> Self {
        MapperError::new(msg, ErrorKind::InternalError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapper_error_new_creates_error() {
        let error = MapperError::new("An error occurred", ErrorKind::Conflict);
        assert_eq!(error.message, "An error occurred");
        assert_eq!(error.error_kind, ErrorKind::Conflict);
        assert!(error.cause.is_none());
    }

    #[test]
    fn mapper_error_new_with_cause_creates_error() {
        let cause = MapperError::new("connection reset", ErrorKind::IOError);
        let error = MapperError::new_with_cause("save failed", ErrorKind::StoreError, cause);
        assert_eq!(error.kind(), &ErrorKind::StoreError);
        assert_eq!(error.cause().map(|c| c.kind().clone()), Some(ErrorKind::IOError));
        assert!(error.source().is_some());
    }

    #[test]
    fn mapper_error_display_is_message() {
        let error = MapperError::new("missing document", ErrorKind::NotFound);
        assert_eq!(format!("{}", error), "missing document");
    }

    #[test]
    fn mapper_error_debug_includes_cause() {
        let cause = MapperError::new("inner", ErrorKind::IOError);
        let error = MapperError::new_with_cause("outer", ErrorKind::StoreError, cause);
        let debug = format!("{:?}", error);
        assert!(debug.contains("outer"));
        assert!(debug.contains("Caused by: inner"));
    }

    #[test]
    fn store_error_kinds_are_classified() {
        assert!(ErrorKind::NotFound.is_store_error());
        assert!(ErrorKind::Conflict.is_store_error());
        assert!(!ErrorKind::ReservedFieldViolation.is_store_error());
        assert!(!ErrorKind::InvalidWrapper.is_store_error());
    }

    #[test]
    fn from_io_error_maps_to_io_kind() {
        let err: MapperError = std::io::Error::other("disk").into();
        assert_eq!(err.kind(), &ErrorKind::IOError);
    }

    #[test]
    fn serde_custom_errors_are_mapping_errors() {
        let err = <MapperError as de::Error>::custom("bad field");
        assert_eq!(err.kind(), &ErrorKind::ObjectMappingError);
        let err = <MapperError as ser::Error>::custom("bad value");
        assert_eq!(err.kind(), &ErrorKind::ObjectMappingError);
    }

    #[test]
    fn error_kind_display() {
        assert_eq!(ErrorKind::InvalidWrapper.to_string(), "Invalid wrapper");
        assert_eq!(ErrorKind::StructuralMismatch.to_string(), "Structural mismatch");
    }
}
