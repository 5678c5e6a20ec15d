use proc_macro::TokenStream;
use quote::quote;
use syn::meta::ParseNestedMeta;
use syn::{DataStruct, DeriveInput, LitStr, Result};

/// Reads `field = "..."` out of `id(...)` or `rev(...)`.
fn meta_field(meta: &ParseNestedMeta, kind: &str) -> Result<String> {
    let mut field = None;
    meta.parse_nested_meta(|nested| {
        if nested.path.is_ident("field") {
            let s: LitStr = nested.value()?.parse()?;
            field = Some(s.value());
            Ok(())
        } else {
            Err(nested.error(format!("Unknown {} attribute", kind)))
        }
    })?;
    field.ok_or_else(|| meta.error(format!("{}(field = \"...\") is required", kind)))
}

pub(crate) fn generate_entity_for_struct(ast: &DeriveInput, data: &DataStruct) -> Result<TokenStream> {
    let name = &ast.ident;
    let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();

    let mut entity_name = name.to_string();
    let mut id_field: Option<String> = None;
    let mut rev_field: Option<String> = None;

    for attr in &ast.attrs {
        if attr.path().is_ident("entity") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    let s: LitStr = meta.value()?.parse()?;
                    entity_name = s.value();
                    Ok(())
                } else if meta.path.is_ident("id") {
                    if id_field.is_some() {
                        return Err(meta.error("Multiple id attributes are not allowed"));
                    }
                    id_field = Some(meta_field(&meta, "id")?);
                    Ok(())
                } else if meta.path.is_ident("rev") {
                    if rev_field.is_some() {
                        return Err(meta.error("Multiple rev attributes are not allowed"));
                    }
                    rev_field = Some(meta_field(&meta, "rev")?);
                    Ok(())
                } else {
                    Err(meta.error("Unknown entity attribute"))
                }
            })?
        }
    }

    if entity_name.is_empty() {
        return Err(syn::Error::new_spanned(ast, "entity name must not be empty"));
    }
    if id_field.is_some() && id_field == rev_field {
        return Err(syn::Error::new_spanned(
            ast,
            "id and rev must be mapped to different fields",
        ));
    }
    for field_name in id_field.iter().chain(rev_field.iter()) {
        let exists = data
            .fields
            .iter()
            .any(|field| field.ident.as_ref().is_some_and(|ident| ident == field_name));
        if !exists {
            return Err(syn::Error::new_spanned(
                ast,
                format!("Field {} not found in struct", field_name),
            ));
        }
    }

    let entity_meta_code = if id_field.is_none() && rev_field.is_none() {
        quote! {}
    } else {
        let id = optional_literal(id_field.as_deref());
        let rev = optional_literal(rev_field.as_deref());
        quote! {
            fn entity_meta() -> ::docmap::mapping::EntityMeta {
                ::docmap::mapping::EntityMeta::new(#id, #rev)
            }
        }
    };

    let gen = quote! {
        impl #impl_generics ::docmap::mapping::MappedEntity for #name #ty_generics #where_clause {
            fn entity_name() -> String {
                #entity_name.to_string()
            }

            #entity_meta_code
        }
    };

    Ok(TokenStream::from(gen))
}

fn optional_literal(value: Option<&str>) -> proc_macro2::TokenStream {
    match value {
        Some(value) => quote! { Some(#value) },
        None => quote! { None },
    }
}
