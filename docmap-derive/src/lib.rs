#![recursion_limit = "128"]
//! # Docmap Derive Macros
//!
//! Procedural macros implementing the explicit mapping contracts of
//! `docmap` for application types.
//!
//! ## `Convertible`
//!
//! Generates the to-map / from-map pair for structs with named fields and
//! for enums. Struct fields become document entries of the same name.
//! Fields listed in `#[converter(ignored = "a, b")]` are skipped when
//! encoding and take their `Default` value when decoding.
//!
//! ```rust,ignore
//! use docmap_derive::Convertible;
//!
//! #[derive(Convertible)]
//! pub struct Greeting {
//!     pub author: String,
//!     pub content: String,
//! }
//!
//! #[derive(Convertible)]
//! pub enum Mood {
//!     Cheerful,
//!     Grumpy { reason: String },
//! }
//! ```
//!
//! ## `MappedEntity`
//!
//! Marks a struct as a shape the mapper can register. The registered name
//! defaults to the struct name; the `entity` attribute can rename it and
//! point at the fields mirroring the document identifier and revision.
//!
//! ```rust,ignore
//! use docmap_derive::{Convertible, MappedEntity};
//!
//! #[derive(Convertible, MappedEntity)]
//! #[entity(name = "Note", id(field = "key"), rev(field = "revision"))]
//! pub struct StickyNote {
//!     pub key: Option<String>,
//!     pub revision: Option<String>,
//!     pub body: String,
//! }
//! ```

extern crate proc_macro;
mod convertible;
mod mapped_entity;

use crate::convertible::{generate_convertible_for_enum, generate_convertible_for_struct};
use crate::mapped_entity::generate_entity_for_struct;
use proc_macro::TokenStream;
use syn::{Data, DeriveInput};

/// Derives `docmap::common::Convertible`.
///
/// # Errors
///
/// Emits a compile error for unions and for tuple or unit structs.
#[proc_macro_derive(Convertible, attributes(converter))]
pub fn derive_convert(input: TokenStream) -> TokenStream {
    let ast = syn::parse_macro_input!(input as DeriveInput);

    let result = match ast.data {
        Data::Struct(ref data) => generate_convertible_for_struct(&ast, data),
        Data::Enum(ref data) => generate_convertible_for_enum(&ast, data),
        Data::Union(_) => Err(syn::Error::new_spanned(
            &ast,
            "Cannot derive Convertible for unions",
        )),
    };

    match result {
        Ok(token_stream) => token_stream,
        Err(e) => syn::Error::new_spanned(
            &ast,
            format!(
                "Failed to derive Convertible for '{}': {}.\n\
                 Make sure all fields implement Convertible.",
                ast.ident, e
            ),
        )
        .to_compile_error()
        .into(),
    }
}

/// Derives `docmap::mapping::MappedEntity`. Must be used together with
/// `#[derive(Convertible)]`.
///
/// # Attributes
///
/// - `#[entity(name = "...")]` - registered name, defaults to the struct name
/// - `#[entity(id(field = "..."))]` - field mirroring the document `_id`
/// - `#[entity(rev(field = "..."))]` - field mirroring the document `_rev`
#[proc_macro_derive(MappedEntity, attributes(entity))]
pub fn derive_mapped_entity(input: TokenStream) -> TokenStream {
    let ast = syn::parse_macro_input!(input as DeriveInput);

    match ast.data {
        Data::Struct(ref data) => match generate_entity_for_struct(&ast, data) {
            Ok(token_stream) => token_stream,
            Err(e) => syn::Error::new_spanned(
                &ast,
                format!(
                    "Failed to derive MappedEntity for struct '{}': {}.\n\
                     Example: #[derive(MappedEntity)] #[entity(name = \"Greeting\")] pub struct Greeting {{ .. }}",
                    ast.ident, e
                ),
            )
            .to_compile_error()
            .into(),
        },
        Data::Enum(_) | Data::Union(_) => syn::Error::new_spanned(
            &ast,
            "Cannot derive MappedEntity for enums or unions. Only structs are supported.",
        )
        .to_compile_error()
        .into(),
    }
}
