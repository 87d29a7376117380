//! Generic type parameter handling and trait bound management.
//!
//! Bounds are added only for generics that appear in included fields.
//! Filtered and skipped fields are never converted, so `struct Form<T> {
//! #[params(filtered)] secret: T }` works for any `T`.
//!
//! `PhantomData<T>` is skipped when collecting generics: a marker field
//! converts to `null` without touching `T`.

use proc_macro2::TokenStream;
use syn::{parse_quote, Ident};

pub(crate) fn collect_generics_from_type(
    ty: &syn::Type,
    generics: &syn::Generics,
    result: &mut Vec<Ident>,
) {
    match ty {
        syn::Type::Path(path) => {
            if let Some(segment) = path.path.segments.last() {
                if segment.ident == "PhantomData" {
                    return;
                }

                if let syn::PathArguments::AngleBracketed(args) = &segment.arguments {
                    for arg in &args.args {
                        if let syn::GenericArgument::Type(inner_ty) = arg {
                            collect_generics_from_type(inner_ty, generics, result);
                        }
                    }
                }

                for param in generics.type_params() {
                    if segment.ident == param.ident && !result.iter().any(|g| g == &param.ident) {
                        result.push(param.ident.clone());
                    }
                }
            }
        }
        syn::Type::Reference(reference) => {
            collect_generics_from_type(&reference.elem, generics, result);
        }
        syn::Type::Paren(paren) => collect_generics_from_type(&paren.elem, generics, result),
        _ => {}
    }
}

/// Adds `IntoParameterTree` bounds to generic parameters used in included fields.
pub(crate) fn add_into_tree_bounds(
    mut generics: syn::Generics,
    used_generics: &[Ident],
    crate_root: &TokenStream,
) -> syn::Generics {
    for param in generics.type_params_mut() {
        if used_generics.iter().any(|g| g == &param.ident) {
            param
                .bounds
                .push(parse_quote!(#crate_root::IntoParameterTree));
        }
    }
    generics
}

#[cfg(test)]
mod tests {
    use quote::quote;

    use super::*;

    fn generics_of(tokens: TokenStream) -> syn::Generics {
        let input: syn::DeriveInput = syn::parse2(tokens).expect("should parse as DeriveInput");
        input.generics
    }

    #[test]
    fn collects_nested_generics_once() {
        let generics = generics_of(quote! { struct Form<T, U> { a: T } });
        let ty: syn::Type = syn::parse2(quote! { Option<Vec<(T)>> }).unwrap();
        let mut used = Vec::new();
        collect_generics_from_type(&ty, &generics, &mut used);
        collect_generics_from_type(&syn::parse2(quote! { T }).unwrap(), &generics, &mut used);
        assert_eq!(used, vec![Ident::new("T", proc_macro2::Span::call_site())]);
    }

    #[test]
    fn phantom_data_adds_no_bounds() {
        let generics = generics_of(quote! { struct Form<T> { a: PhantomData<T> } });
        let ty: syn::Type = syn::parse2(quote! { ::std::marker::PhantomData<T> }).unwrap();
        let mut used = Vec::new();
        collect_generics_from_type(&ty, &generics, &mut used);
        assert!(used.is_empty());
    }

    #[test]
    fn bounds_only_used_params() {
        let generics = generics_of(quote! { struct Form<T, U> { a: T, b: U } });
        let used = vec![Ident::new("U", proc_macro2::Span::call_site())];
        let bounded = add_into_tree_bounds(generics, &used, &quote! { ::paramfilter });
        let params: Vec<_> = bounded.type_params().collect();
        assert!(params[0].bounds.is_empty());
        assert_eq!(params[1].bounds.len(), 1);
    }
}
