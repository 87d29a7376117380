//! Host-supplied filters the engine prefers over its own rules.
//!
//! A delegate is resolved once, when the [`crate::ParamFilter`] is built. Any
//! `Fn(&Mapping) -> Result<ParameterTree, DelegateError>` closure is a
//! delegate; [`KeyListFilter`] covers the usual "list of parameter names to
//! hide" configuration.

use crate::{
    classify::{SensitivePatterns, FILTERED_PLACEHOLDER},
    error::DelegateError,
    tree::{Mapping, ParameterTree},
};

/// A host capability that filters a parameter mapping.
///
/// Returning a non-mapping tree means "nothing should be logged"; returning an
/// error makes the engine filter the original parameters itself.
pub trait DelegateFilter: Send + Sync {
    /// Filters `params`.
    fn filter(&self, params: &Mapping) -> Result<ParameterTree, DelegateError>;
}

impl<F> DelegateFilter for F
where
    F: Fn(&Mapping) -> Result<ParameterTree, DelegateError> + Send + Sync,
{
    fn filter(&self, params: &Mapping) -> Result<ParameterTree, DelegateError> {
        self(params)
    }
}

/// Masks every key whose lowercase form contains one of the configured names.
///
/// Traverses nested mappings and sequences without depth or size caps, the way
/// framework parameter filters do.
#[derive(Clone, Debug)]
pub struct KeyListFilter {
    names: SensitivePatterns,
}

impl KeyListFilter {
    /// Builds a filter from parameter names, or `None` if the list is empty.
    ///
    /// An empty list means the host configured no filtering of its own, so no
    /// delegate should be installed.
    pub fn from_names<I, S>(names: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names = SensitivePatterns::new(names);
        (!names.is_empty()).then_some(Self { names })
    }

    fn filter_tree(&self, tree: &ParameterTree) -> ParameterTree {
        match tree {
            ParameterTree::Mapping(mapping) => ParameterTree::Mapping(self.filter_mapping(mapping)),
            ParameterTree::Sequence(items) => {
                ParameterTree::Sequence(items.iter().map(|item| self.filter_tree(item)).collect())
            }
            scalar => scalar.clone(),
        }
    }

    fn filter_mapping(&self, mapping: &Mapping) -> Mapping {
        let mut filtered = Mapping::with_capacity(mapping.len());
        for (key, value) in mapping.iter() {
            let masked = key.coerce().is_ok_and(|name| self.names.matches(&name));
            let value = if masked {
                ParameterTree::String(FILTERED_PLACEHOLDER.to_owned())
            } else {
                self.filter_tree(value)
            };
            filtered.push(key.clone(), value);
        }
        filtered
    }
}

impl DelegateFilter for KeyListFilter {
    fn filter(&self, params: &Mapping) -> Result<ParameterTree, DelegateError> {
        Ok(ParameterTree::Mapping(self.filter_mapping(params)))
    }
}
