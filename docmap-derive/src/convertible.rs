use proc_macro::TokenStream;
use proc_macro2::{Ident, Span};
use quote::quote;
use syn::{Attribute, DataEnum, DataStruct, DeriveInput, Field, Fields, LitStr, Result, Type};

/// Field names listed in `#[converter(ignored = "a, b")]`.
fn ignored_fields(attrs: &[Attribute]) -> Result<Vec<String>> {
    let mut ignored = vec![];
    for attr in attrs {
        if attr.path().is_ident("converter") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("ignored") {
                    let s: LitStr = meta.value()?.parse()?;
                    ignored.extend(
                        s.value()
                            .split(',')
                            .map(str::trim)
                            .filter(|field| !field.is_empty())
                            .map(str::to_string),
                    );
                    Ok(())
                } else {
                    Err(meta.error("Unknown converter attribute"))
                }
            })?;
        }
    }
    Ok(ignored)
}

fn mapping_error(message: &str) -> proc_macro2::TokenStream {
    quote! {
        ::docmap::errors::MapperError::new(
            #message,
            ::docmap::errors::ErrorKind::ObjectMappingError,
        )
    }
}

/// Encoding statements and decoding initializers for a list of named
/// fields. `source` is the expression the encoded field values are read
/// from; `target` is the document decoded values come from.
fn named_fields(
    fields: &[&Field],
    ignored: &[String],
    source: impl Fn(&Ident) -> proc_macro2::TokenStream,
    target: &Ident,
) -> (Vec<proc_macro2::TokenStream>, Vec<proc_macro2::TokenStream>) {
    let mut puts = Vec::with_capacity(fields.len());
    let mut initializers = Vec::with_capacity(fields.len());

    for field in fields {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let name = ident.to_string();
        let ty: &Type = &field.ty;

        if ignored.contains(&name) {
            initializers.push(quote! { #ident: ::core::default::Default::default() });
            continue;
        }

        let value = source(ident);
        puts.push(quote! {
            doc.put(#name, ::docmap::common::Convertible::to_value(#value)?)?;
        });
        initializers.push(quote! {
            #ident: ::docmap::common::from_value::<#ty>(&#target.get(#name))?
        });
    }
    (puts, initializers)
}

pub(crate) fn generate_convertible_for_struct(ast: &DeriveInput, data: &DataStruct) -> Result<TokenStream> {
    let ignored = ignored_fields(&ast.attrs)?;

    let fields: Vec<&Field> = match &data.fields {
        Fields::Named(fields) => fields.named.iter().collect(),
        _ => {
            return Err(syn::Error::new_spanned(
                ast,
                "only structs with named fields are supported",
            ))
        }
    };

    let doc_ident = Ident::new("doc", Span::call_site());
    let (puts, initializers) = named_fields(&fields, &ignored, |ident| quote! { &self.#ident }, &doc_ident);
    let not_a_document = mapping_error("Value is not a document");

    let name = &ast.ident;
    let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();

    let gen = quote! {
        impl #impl_generics ::docmap::common::Convertible for #name #ty_generics #where_clause {
            type Output = Self;

            fn to_value(&self) -> ::docmap::errors::MapperResult<::docmap::common::Value> {
                let mut doc = ::docmap::document::Document::new();
                #(#puts)*
                Ok(::docmap::common::Value::Document(doc))
            }

            fn from_value(value: &::docmap::common::Value) -> ::docmap::errors::MapperResult<Self::Output> {
                match value {
                    ::docmap::common::Value::Document(doc) => Ok(#name {
                        #(#initializers,)*
                    }),
                    _ => Err(#not_a_document),
                }
            }
        }
    };

    Ok(TokenStream::from(gen))
}

/// Enums encode as `{ "variant": name, "value": payload }`. The payload is
/// `null` for unit variants, an array for tuple variants and a document
/// for struct variants.
pub(crate) fn generate_convertible_for_enum(ast: &DeriveInput, data: &DataEnum) -> Result<TokenStream> {
    let name = &ast.ident;
    let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();
    let ignored = ignored_fields(&ast.attrs)?;

    let mut to_value_variants = Vec::with_capacity(data.variants.len());
    let mut from_value_variants = Vec::with_capacity(data.variants.len());
    let not_a_document = mapping_error("Enum payload is not a document");
    let not_an_array = mapping_error("Enum payload is not an array");

    for variant in &data.variants {
        let variant_ident = &variant.ident;
        let variant_name = variant_ident.to_string();

        match &variant.fields {
            Fields::Named(fields) => {
                let fields: Vec<&Field> = fields.named.iter().collect();
                let all_idents: Vec<&Ident> = fields.iter().filter_map(|f| f.ident.as_ref()).collect();
                let data_ident = Ident::new("data", Span::call_site());
                let (puts, initializers) = named_fields(&fields, &ignored, |ident| quote! { #ident }, &data_ident);

                to_value_variants.push(quote! {
                    #name::#variant_ident { #(#all_idents),* } => {
                        #(let _ = &#all_idents;)*
                        let mut doc = ::docmap::document::Document::new();
                        #(#puts)*
                        (#variant_name, ::docmap::common::Value::Document(doc))
                    }
                });
                from_value_variants.push(quote! {
                    Some(#variant_name) => {
                        let data = payload.as_document().ok_or_else(|| #not_a_document)?;
                        Ok(#name::#variant_ident {
                            #(#initializers,)*
                        })
                    }
                });
            }
            Fields::Unnamed(fields) => {
                let field_count = fields.unnamed.len();
                let field_idents: Vec<Ident> = (0..field_count)
                    .map(|i| Ident::new(&format!("field_{}", i), Span::call_site()))
                    .collect();
                let field_indices: Vec<usize> = (0..field_count).collect();
                let field_types: Vec<&Type> = fields.unnamed.iter().map(|f| &f.ty).collect();

                to_value_variants.push(quote! {
                    #name::#variant_ident(#(#field_idents),*) => {
                        let mut items = Vec::with_capacity(#field_count);
                        #(items.push(::docmap::common::Convertible::to_value(#field_idents)?);)*
                        (#variant_name, ::docmap::common::Value::Array(items))
                    }
                });
                from_value_variants.push(quote! {
                    Some(#variant_name) => {
                        let items = payload
                            .as_array()
                            .filter(|items| items.len() == #field_count)
                            .ok_or_else(|| #not_an_array)?;
                        Ok(#name::#variant_ident(
                            #(::docmap::common::from_value::<#field_types>(&items[#field_indices])?,)*
                        ))
                    }
                });
            }
            Fields::Unit => {
                to_value_variants.push(quote! {
                    #name::#variant_ident => (#variant_name, ::docmap::common::Value::Null)
                });
                from_value_variants.push(quote! {
                    Some(#variant_name) => Ok(#name::#variant_ident)
                });
            }
        }
    }

    let not_a_variant = mapping_error("Value is not a valid enum variant");

    let gen = quote! {
        impl #impl_generics ::docmap::common::Convertible for #name #ty_generics #where_clause {
            type Output = Self;

            fn to_value(&self) -> ::docmap::errors::MapperResult<::docmap::common::Value> {
                let (variant, payload): (&str, ::docmap::common::Value) = match self {
                    #(#to_value_variants),*
                };
                let mut document = ::docmap::document::Document::new();
                document.put("variant", variant)?;
                document.put("value", payload)?;
                Ok(::docmap::common::Value::Document(document))
            }

            fn from_value(value: &::docmap::common::Value) -> ::docmap::errors::MapperResult<Self::Output> {
                let document = value.as_document().ok_or_else(|| #not_a_variant)?;
                let payload = document.get("value");
                let _ = &payload;
                match document.get("variant").as_str() {
                    #(#from_value_variants,)*
                    _ => Err(#not_a_variant),
                }
            }
        }
    };

    Ok(TokenStream::from(gen))
}
