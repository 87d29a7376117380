//! Struct-specific `IntoParameterTree` derivation.
//!
//! Named structs become mappings keyed by field name, tuple structs become
//! sequences, and unit structs become empty mappings.

use proc_macro2::{Ident, Span, TokenStream};
use quote::{format_ident, quote, quote_spanned};
use syn::{ext::IdentExt, spanned::Spanned, DataStruct, Fields, Result};

use crate::{
    generics::collect_generics_from_type,
    strategy::{parse_field_options, FieldOptions, Strategy},
};

pub(crate) struct StructDeriveOutput {
    pub(crate) body: TokenStream,
    pub(crate) used_generics: Vec<Ident>,
}

pub(crate) fn derive_struct(
    data: DataStruct,
    generics: &syn::Generics,
    crate_root: &TokenStream,
) -> Result<StructDeriveOutput> {
    match data.fields {
        Fields::Named(fields) => derive_named_struct(fields, generics, crate_root),
        Fields::Unnamed(fields) => derive_unnamed_struct(fields, generics, crate_root),
        Fields::Unit => Ok(StructDeriveOutput {
            body: quote! {
                let _ = self;
                #crate_root::ParameterTree::Mapping(#crate_root::Mapping::new())
            },
            used_generics: Vec::new(),
        }),
    }
}

fn filtered_value(crate_root: &TokenStream) -> TokenStream {
    quote! {
        #crate_root::ParameterTree::String(
            ::std::string::String::from(#crate_root::FILTERED_PLACEHOLDER)
        )
    }
}

fn derive_named_struct(
    fields: syn::FieldsNamed,
    generics: &syn::Generics,
    crate_root: &TokenStream,
) -> Result<StructDeriveOutput> {
    let mut patterns = Vec::new();
    let mut inserts = Vec::new();
    let mut used_generics = Vec::new();
    // Mixed-site hygiene keeps the accumulator apart from field bindings.
    let params = Ident::new("params", Span::mixed_site());

    for field in fields.named {
        let span = field.span();
        let FieldOptions { strategy, rename } = parse_field_options(&field.attrs)?;
        let Some(ident) = field.ident else {
            return Err(syn::Error::new(span, "named field without an identifier"));
        };
        let key = rename.map_or_else(|| ident.unraw().to_string(), |lit| lit.value());

        match strategy {
            Strategy::Include => {
                collect_generics_from_type(&field.ty, generics, &mut used_generics);
                patterns.push(quote! { #ident });
                inserts.push(quote_spanned! { span =>
                    #params.insert(#key, #ident);
                });
            }
            Strategy::Filtered => {
                patterns.push(quote! { #ident: _ });
                let value = filtered_value(crate_root);
                inserts.push(quote_spanned! { span =>
                    #params.insert(#key, #value);
                });
            }
            Strategy::Skip => patterns.push(quote! { #ident: _ }),
        }
    }

    let capacity = inserts.len();
    Ok(StructDeriveOutput {
        body: quote! {
            let Self { #(#patterns),* } = self;
            #[allow(unused_mut)]
            let mut #params = #crate_root::Mapping::with_capacity(#capacity);
            #(#inserts)*
            #crate_root::ParameterTree::Mapping(#params)
        },
        used_generics,
    })
}

fn derive_unnamed_struct(
    fields: syn::FieldsUnnamed,
    generics: &syn::Generics,
    crate_root: &TokenStream,
) -> Result<StructDeriveOutput> {
    let mut patterns = Vec::new();
    let mut items = Vec::new();
    let mut used_generics = Vec::new();

    for (index, field) in fields.unnamed.into_iter().enumerate() {
        let span = field.span();
        let FieldOptions { strategy, rename } = parse_field_options(&field.attrs)?;
        if let Some(name) = rename {
            return Err(syn::Error::new(
                name.span(),
                "`rename` is only supported on named fields",
            ));
        }

        match strategy {
            Strategy::Include => {
                collect_generics_from_type(&field.ty, generics, &mut used_generics);
                let binding = format_ident!("field_{index}");
                items.push(quote_spanned! { span =>
                    #crate_root::IntoParameterTree::into_parameter_tree(#binding)
                });
                patterns.push(quote! { #binding });
            }
            Strategy::Filtered => {
                patterns.push(quote! { _ });
                items.push(filtered_value(crate_root));
            }
            Strategy::Skip => patterns.push(quote! { _ }),
        }
    }

    Ok(StructDeriveOutput {
        body: quote! {
            let Self ( #(#patterns),* ) = self;
            #crate_root::ParameterTree::Sequence(::std::vec![#(#items),*])
        },
        used_generics,
    })
}
