//! Raw documents and document identifiers.
//!
//! A [Document] is the untyped key/value payload the store speaks. Typed
//! instances live in [crate::mapping] and convert to and from documents at
//! the store boundary.

mod doc_id;
mod document;

pub use doc_id::*;
pub use document::*;
