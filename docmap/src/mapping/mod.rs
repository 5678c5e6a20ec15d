//! Coercion, registration and rehydration of application shapes.
//!
//! An application type implements [MappedEntity] (normally derived) and
//! is coerced into a [RegisteredType]: its shape combined with document
//! persistence. Registered types live in a [ClassRegistry] keyed by type
//! name, and the [Rehydrator] uses that registry to turn raw stored
//! payloads back into [MappedDocument] instances of the right type.
mod bulk;
mod coercion;
mod entity;
mod mapped_document;
mod registered_type;
mod registry;
mod rehydrator;
mod shape;

pub use bulk::*;
pub use coercion::*;
pub use entity::*;
pub use mapped_document::*;
pub use registered_type::*;
pub use registry::*;
pub use rehydrator::*;
pub use shape::*;
