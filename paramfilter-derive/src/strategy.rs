//! Parsing of `#[params(...)]` field attributes.
//!
//! This module maps attribute syntax to conversion decisions and produces
//! structured errors for invalid forms.

use proc_macro2::Span;
use syn::{spanned::Spanned, Attribute, LitStr, Meta, Result};

/// How a field contributes to the generated parameter tree.
///
/// | Attribute | Strategy | Behavior |
/// |-----------|----------|----------|
/// | None | `Include` | Field value converted with `IntoParameterTree` |
/// | `#[params(filtered)]` | `Filtered` | Key kept, value logged as `"[FILTERED]"` |
/// | `#[params(skip)]` | `Skip` | Field left out entirely |
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Strategy {
    Include,
    /// The value is never read, so its type needs no bounds.
    Filtered,
    Skip,
}

/// Everything `#[params(...)]` says about one field.
#[derive(Clone, Debug)]
pub(crate) struct FieldOptions {
    pub(crate) strategy: Strategy,
    pub(crate) rename: Option<LitStr>,
}

fn set_strategy(target: &mut Option<Strategy>, next: Strategy, span: Span) -> Result<()> {
    if target.is_some() {
        return Err(syn::Error::new(
            span,
            "only one of `skip` or `filtered` may be given per field",
        ));
    }
    *target = Some(next);
    Ok(())
}

pub(crate) fn parse_field_options(attrs: &[Attribute]) -> Result<FieldOptions> {
    let mut strategy: Option<Strategy> = None;
    let mut rename: Option<LitStr> = None;

    for attr in attrs {
        if !attr.path().is_ident("params") {
            continue;
        }

        match &attr.meta {
            Meta::List(_) => {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("skip") {
                        set_strategy(&mut strategy, Strategy::Skip, meta.path.span())
                    } else if meta.path.is_ident("filtered") {
                        set_strategy(&mut strategy, Strategy::Filtered, meta.path.span())
                    } else if meta.path.is_ident("rename") {
                        if rename.is_some() {
                            return Err(meta.error("duplicate `rename` option"));
                        }
                        let name: LitStr = meta.value()?.parse()?;
                        if name.value().is_empty() {
                            return Err(syn::Error::new(name.span(), "`rename` must not be empty"));
                        }
                        rename = Some(name);
                        Ok(())
                    } else {
                        Err(meta.error(
                            "unknown option, expected `skip`, `filtered` or `rename = \"...\"`",
                        ))
                    }
                })?;
            }
            Meta::Path(_) => {
                return Err(syn::Error::new(
                    attr.span(),
                    "expected an option list (e.g., #[params(filtered)])",
                ));
            }
            Meta::NameValue(_) => {
                return Err(syn::Error::new(
                    attr.span(),
                    "name-value syntax is not supported for #[params]",
                ));
            }
        }
    }

    let strategy = strategy.unwrap_or(Strategy::Include);
    if strategy == Strategy::Skip {
        if let Some(name) = &rename {
            return Err(syn::Error::new(
                name.span(),
                "`rename` has no effect on a skipped field",
            ));
        }
    }

    Ok(FieldOptions { strategy, rename })
}
