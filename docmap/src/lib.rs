#![allow(clippy::module_inception)]
//! # docmap - Object/document mapping for schema-less document stores
//!
//! docmap lets ordinary Rust types be stored as documents in a schema-less
//! document store (identifiers, revisions, views) without writing them
//! against a document base type, and turns stored documents back into
//! the right type when they are read.
//!
//! ## Key Features
//!
//! - **Explicit mapping**: types implement `Convertible` and `MappedEntity`
//!   (both derivable) instead of relying on runtime reflection
//! - **Class registry**: type names map to registered types; documents carry
//!   the name in their `doc_type` discriminator
//! - **Rehydration**: single fetches, view rows and listings come back typed,
//!   falling back to the base document type or the untouched payload
//! - **Metadata safety**: `_id`, `_rev` and other store fields never leak
//!   into application fields, and known revisions are never dropped
//! - **Pluggable store**: anything implementing `DocumentStoreProvider`;
//!   an in-memory store is included
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use docmap::mapping::Coercible;
//! use docmap::store::{memory::MemoryStore, DocumentStore, QueryParams};
//! use docmap_derive::{Convertible, MappedEntity};
//!
//! #[derive(Convertible, MappedEntity)]
//! pub struct Greeting {
//!     author: String,
//!     content: String,
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mapper = docmap::map(DocumentStore::new(MemoryStore::new()));
//! mapper.register::<Greeting>()?;
//!
//! let greeting = Greeting { author: "A".into(), content: "hi".into() };
//! let saved = mapper.save(Coercible::entity(&greeting)?)?.into_typed()?;
//!
//! let again: Greeting = mapper.get_as(saved.id().unwrap())?;
//! for row in mapper.list_all(QueryParams::new().include_docs(true))? {
//!     println!("{:?}", row?);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`common`] - Values, constants, the conversion contract and utilities
//! - [`document`] - Raw documents and document identifiers
//! - [`errors`] - Error types and result definitions
//! - [`mapping`] - Coercion engine, class registry and rehydration
//! - [`view`] - View rows and lazily rehydrated view results
//! - [`store`] - Document store contract and the in-memory store
//! - [`mapper`] - The mapper facade
//! - [`mapper_builder`] / [`mapper_config`] - Mapper construction and settings

pub mod common;
pub mod document;
pub mod errors;
pub mod mapper;
pub mod mapper_builder;
pub mod mapper_config;
pub mod mapping;
pub mod store;
pub mod view;

use crate::mapper::Mapper;
use crate::mapper_config::MapperConfig;
use crate::store::DocumentStore;

/// Creates a mapper over `store` with the default configuration and the
/// process-wide class registry.
pub fn map(store: DocumentStore) -> Mapper {
    Mapper::new(store, MapperConfig::default())
}
