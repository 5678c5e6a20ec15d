//! The document store the mapper delegates persistence and views to.
//!
//! [DocumentStoreProvider] is the contract; [DocumentStore] is the shared
//! handle the mapper and every attached
//! [MappedDocument](crate::mapping::MappedDocument) hold. The
//! [memory] module provides an in-process implementation.
mod bulk_result;
mod document_store;
pub mod memory;
mod query_params;
mod view_request;

pub use bulk_result::*;
pub use document_store::*;
pub use query_params::*;
pub use view_request::*;
