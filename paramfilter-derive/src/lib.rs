//! Derive macro for `paramfilter`.
//!
//! This crate generates `IntoParameterTree` implementations behind
//! `#[derive(Params)]`. It:
//! - reads `#[params(...)]` field attributes
//! - emits a conversion that builds a parameter mapping (or sequence)
//!
//! It does **not** decide what is sensitive. Filtering happens at runtime in
//! the main `paramfilter` crate; `#[params(filtered)]` only guarantees a value
//! never reaches the engine in the first place.

// <https://doc.rust-lang.org/rustc/lints/listing/allowed-by-default.html>
#![warn(
    anonymous_parameters,
    bare_trait_objects,
    elided_lifetimes_in_paths,
    missing_copy_implementations,
    rust_2018_idioms,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    unsafe_code,
    unused_extern_crates,
    unused_import_braces
)]
// <https://rust-lang.github.io/rust-clippy/stable>
#![warn(
    clippy::all,
    clippy::cargo,
    clippy::dbg_macro,
    clippy::float_cmp_const,
    clippy::get_unwrap,
    clippy::mem_forget,
    clippy::nursery,
    clippy::pedantic,
    clippy::todo,
    clippy::unwrap_used,
    clippy::uninlined_format_args
)]
// Allow some clippy lints
#![allow(
    clippy::default_trait_access,
    clippy::doc_markdown,
    clippy::if_not_else,
    clippy::module_name_repetitions,
    clippy::multiple_crate_versions,
    clippy::must_use_candidate,
    clippy::needless_pass_by_value,
    clippy::needless_ifs,
    clippy::use_self,
    clippy::cargo_common_metadata,
    clippy::missing_errors_doc,
    clippy::enum_glob_use,
    clippy::struct_excessive_bools,
    clippy::missing_const_for_fn,
    clippy::redundant_pub_crate,
    clippy::result_large_err,
    clippy::future_not_send,
    clippy::option_if_let_else,
    clippy::from_over_into,
    clippy::manual_inspect
)]
// Allow some lints while testing
#![cfg_attr(test, allow(clippy::non_ascii_literal, clippy::unwrap_used))]

#[allow(unused_extern_crates)]
extern crate proc_macro;

use proc_macro2::TokenStream;
use proc_macro_crate::{crate_name, FoundCrate};
use quote::{format_ident, quote};
use syn::{parse_macro_input, spanned::Spanned, Data, DeriveInput, Result};

mod derive_struct;
mod generics;
mod strategy;
use derive_struct::{derive_struct, StructDeriveOutput};
use generics::add_into_tree_bounds;

/// Derives `paramfilter::IntoParameterTree` for structs.
///
/// - Named structs convert to a mapping keyed by field name, in declaration
///   order.
/// - Tuple structs convert to a sequence.
/// - Unit structs convert to an empty mapping.
///
/// # Field Attributes
///
/// - **No annotation**: the field is converted with `IntoParameterTree`.
/// - `#[params(filtered)]`: the key is kept and the value is emitted as
///   `"[FILTERED]"` without being read. The field type needs no bounds.
/// - `#[params(skip)]`: the field is left out.
/// - `#[params(rename = "name")]`: use `name` as the key (named fields only).
///   Combines with `filtered`.
///
/// Enums and unions are rejected at compile time.
#[proc_macro_derive(Params, attributes(params))]
pub fn derive_params(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.into_compile_error().into(),
    }
}

/// Returns the token stream to reference the paramfilter crate root.
///
/// Handles crate renaming (e.g., `pf = { package = "paramfilter", ... }`).
/// Inside the crate itself (unit tests, doctests, integration tests) the
/// crate re-declares itself as `paramfilter`, so the absolute path resolves.
fn crate_root() -> TokenStream {
    match crate_name("paramfilter") {
        Ok(FoundCrate::Name(name)) => {
            let ident = format_ident!("{}", name);
            quote! { ::#ident }
        }
        Ok(FoundCrate::Itself) | Err(_) => quote! { ::paramfilter },
    }
}

fn expand(input: DeriveInput) -> Result<TokenStream> {
    let DeriveInput {
        ident,
        generics,
        data,
        ..
    } = input;

    let crate_root = crate_root();

    let StructDeriveOutput {
        body,
        used_generics,
    } = match data {
        Data::Struct(data) => derive_struct(data, &generics, &crate_root)?,
        Data::Enum(e) => {
            return Err(syn::Error::new(
                e.enum_token.span(),
                "`Params` cannot be derived for enums; convert the variant's data explicitly",
            ));
        }
        Data::Union(u) => {
            return Err(syn::Error::new(
                u.union_token.span(),
                "`Params` cannot be derived for unions",
            ));
        }
    };

    let bounded = add_into_tree_bounds(generics, &used_generics, &crate_root);
    let (impl_generics, ty_generics, where_clause) = bounded.split_for_impl();

    Ok(quote! {
        impl #impl_generics #crate_root::IntoParameterTree for #ident #ty_generics #where_clause {
            fn into_parameter_tree(self) -> #crate_root::ParameterTree {
                #body
            }
        }
    })
}
