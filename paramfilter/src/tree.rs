//! The parameter tree: request parameters as a tagged union.
//!
//! Hosts hand the engine whatever their transport layer parsed: nested
//! mappings, sequences and scalars. [`ParameterTree`] models that shape
//! explicitly so every traversal is an exhaustive `match`.
//!
//! ## Keys
//!
//! Mapping keys are usually text, but frameworks also key parameters by
//! interned symbols, integers, or arbitrary objects. [`ParamKey`] keeps those
//! apart (a `Text("id")` and a `Symbol("id")` are different keys) while
//! name-based lookups match both.
//!
//! ## Opaque values
//!
//! Objects the host cannot or will not convert are carried as
//! [`OpaqueValue`]. Their string form is fallible; the engine treats a failed
//! coercion as "not sensitive" and passes them through.

use std::{
    borrow::Cow,
    collections::{BTreeMap, HashMap},
    fmt,
    hash::BuildHasher,
    marker::PhantomData,
    ops::Index,
    sync::Arc,
};

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use serde_json::{Map as JsonMap, Number as JsonNumber, Value as JsonValue};

use crate::error::CoercionError;

static NULL: ParameterTree = ParameterTree::Null;

// =============================================================================
// Opaque - host objects with a fallible string form
// =============================================================================

/// A host object that is neither a mapping, a sequence nor a plain scalar.
///
/// ```rust
/// use paramfilter::{CoercionError, Opaque};
///
/// struct UploadedFile {
///     name: String,
/// }
///
/// impl Opaque for UploadedFile {
///     fn type_name(&self) -> &'static str {
///         "UploadedFile"
///     }
///
///     fn try_to_string(&self) -> Result<String, CoercionError> {
///         Ok(format!("#<UploadedFile {}>", self.name))
///     }
/// }
/// ```
pub trait Opaque: Send + Sync + 'static {
    /// Short type name used in diagnostics and as a log fallback.
    fn type_name(&self) -> &'static str;

    /// Renders the object as text. May fail.
    fn try_to_string(&self) -> Result<String, CoercionError>;
}

/// Shared handle to an [`Opaque`] object.
///
/// Two handles are equal only if they point at the same object.
#[derive(Clone)]
pub struct OpaqueValue(Arc<dyn Opaque>);

impl OpaqueValue {
    /// Wraps a host object.
    pub fn new<T: Opaque>(value: T) -> Self {
        Self(Arc::new(value))
    }

    /// See [`Opaque::type_name`].
    pub fn type_name(&self) -> &'static str {
        self.0.type_name()
    }

    /// See [`Opaque::try_to_string`].
    pub fn try_to_string(&self) -> Result<String, CoercionError> {
        self.0.try_to_string()
    }

    /// String form for log output; falls back to `#<TypeName>`.
    pub(crate) fn to_log_string(&self) -> String {
        self.try_to_string()
            .unwrap_or_else(|_| format!("#<{}>", self.type_name()))
    }
}

impl fmt::Debug for OpaqueValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#<{}>", self.type_name())
    }
}

impl PartialEq for OpaqueValue {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

// =============================================================================
// ParamKey
// =============================================================================

/// A mapping key.
#[derive(Clone, Debug, PartialEq)]
pub enum ParamKey {
    /// A string key, the common case.
    Text(String),
    /// An interned-symbol key. Distinct from `Text` with the same name.
    Symbol(String),
    /// An integer key (e.g. indexed form fields).
    Integer(i64),
    /// Any other object used as a key.
    Opaque(OpaqueValue),
}

impl ParamKey {
    /// Constructs a [`ParamKey::Symbol`].
    pub fn symbol(name: impl Into<String>) -> Self {
        Self::Symbol(name.into())
    }

    /// The key's name, for text and symbol keys.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Text(name) | Self::Symbol(name) => Some(name),
            Self::Integer(_) | Self::Opaque(_) => None,
        }
    }

    /// Converts the key to text for pattern matching.
    ///
    /// Text, symbol and integer keys always succeed; opaque keys may fail.
    pub fn coerce(&self) -> Result<Cow<'_, str>, CoercionError> {
        match self {
            Self::Text(name) | Self::Symbol(name) => Ok(Cow::Borrowed(name)),
            Self::Integer(n) => Ok(Cow::Owned(n.to_string())),
            Self::Opaque(value) => value.try_to_string().map(Cow::Owned),
        }
    }

    pub(crate) fn to_log_string(&self) -> String {
        match self {
            Self::Opaque(value) => value.to_log_string(),
            other => other
                .coerce()
                .map(Cow::into_owned)
                .unwrap_or_default(),
        }
    }
}

impl From<&str> for ParamKey {
    fn from(name: &str) -> Self {
        Self::Text(name.to_owned())
    }
}

impl From<String> for ParamKey {
    fn from(name: String) -> Self {
        Self::Text(name)
    }
}

impl From<&String> for ParamKey {
    fn from(name: &String) -> Self {
        Self::Text(name.clone())
    }
}

impl From<i64> for ParamKey {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<OpaqueValue> for ParamKey {
    fn from(value: OpaqueValue) -> Self {
        Self::Opaque(value)
    }
}

// =============================================================================
// Mapping
// =============================================================================

/// Insertion-ordered key/value pairs.
///
/// Inserting a key that is already present replaces its value in place.
/// Name-based accessors ([`Mapping::get`], `mapping["name"]`) match both
/// [`ParamKey::Text`] and [`ParamKey::Symbol`] keys.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mapping {
    entries: Vec<(ParamKey, ParameterTree)>,
}

impl Mapping {
    /// Creates an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty mapping with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the mapping has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Inserts `value` under `key`, returning the previous value for an equal key.
    pub fn insert<K, V>(&mut self, key: K, value: V) -> Option<ParameterTree>
    where
        K: Into<ParamKey>,
        V: IntoParameterTree,
    {
        let key = key.into();
        let value = value.into_parameter_tree();
        if let Some((_, slot)) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            return Some(std::mem::replace(slot, value));
        }
        self.entries.push((key, value));
        None
    }

    /// Appends without checking for an existing equal key.
    ///
    /// Callers must only push keys taken from another `Mapping`'s entries.
    pub(crate) fn push(&mut self, key: ParamKey, value: ParameterTree) {
        self.entries.push((key, value));
    }

    /// Returns the first value whose text or symbol key is `name`.
    pub fn get(&self, name: &str) -> Option<&ParameterTree> {
        self.entries
            .iter()
            .find(|(key, _)| key.name() == Some(name))
            .map(|(_, value)| value)
    }

    /// Returns the value stored under exactly `key`.
    pub fn get_key(&self, key: &ParamKey) -> Option<&ParameterTree> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, value)| value)
    }

    /// Returns `true` if a text or symbol key named `name` exists.
    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Keeps only the entries for which `keep` returns `true`.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&ParamKey, &ParameterTree) -> bool,
    {
        self.entries.retain(|(key, value)| keep(key, value));
    }

    /// Iterates over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&ParamKey, &ParameterTree)> {
        self.entries.iter().map(|(key, value)| (key, value))
    }

    /// Iterates over keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &ParamKey> {
        self.entries.iter().map(|(key, _)| key)
    }

    /// Converts to a JSON object. Keys are rendered as text; see
    /// [`Mapping::rendered_entries`] for keys that render the same.
    pub fn to_json(&self) -> JsonValue {
        let rendered = self.rendered_entries();
        let mut map = JsonMap::with_capacity(rendered.len());
        for (key, value) in rendered {
            map.insert(key, value.to_json());
        }
        JsonValue::Object(map)
    }

    /// Entries with keys rendered as text, as they appear in log output.
    ///
    /// When several keys render the same (`Text("id")` and `Symbol("id")`),
    /// one entry is kept at the first key's position holding the last value.
    fn rendered_entries(&self) -> Vec<(String, &ParameterTree)> {
        let mut rendered: Vec<(String, &ParameterTree)> = Vec::with_capacity(self.entries.len());
        for (key, value) in &self.entries {
            let text = key.to_log_string();
            match rendered.iter_mut().find(|(existing, _)| *existing == text) {
                Some((_, slot)) => *slot = value,
                None => rendered.push((text, value)),
            }
        }
        rendered
    }
}

impl<K, V> FromIterator<(K, V)> for Mapping
where
    K: Into<ParamKey>,
    V: IntoParameterTree,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut mapping = Self::new();
        for (key, value) in iter {
            mapping.insert(key, value);
        }
        mapping
    }
}

impl IntoIterator for Mapping {
    type Item = (ParamKey, ParameterTree);
    type IntoIter = std::vec::IntoIter<(ParamKey, ParameterTree)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Index<&str> for Mapping {
    type Output = ParameterTree;

    /// Missing keys index to [`ParameterTree::Null`].
    fn index(&self, name: &str) -> &ParameterTree {
        self.get(name).unwrap_or(&NULL)
    }
}

// =============================================================================
// ParameterTree
// =============================================================================

/// Request parameters: a mapping, a sequence, or a scalar.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum ParameterTree {
    /// Missing or explicit null.
    #[default]
    Null,
    /// Boolean scalar.
    Bool(bool),
    /// Integer scalar.
    Integer(i64),
    /// Floating point scalar.
    Float(f64),
    /// String scalar; the only scalar inspected by value patterns.
    String(String),
    /// Host object carried through untouched.
    Opaque(OpaqueValue),
    /// Ordered list.
    Sequence(Vec<ParameterTree>),
    /// Keyed structure.
    Mapping(Mapping),
}

impl ParameterTree {
    /// Returns `true` for anything that is neither a mapping nor a sequence.
    pub fn is_scalar(&self) -> bool {
        !matches!(self, Self::Mapping(_) | Self::Sequence(_))
    }

    /// Returns `true` for [`ParameterTree::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the mapping, if this is one.
    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Self::Mapping(mapping) => Some(mapping),
            _ => None,
        }
    }

    /// Returns the sequence, if this is one.
    pub fn as_sequence(&self) -> Option<&[ParameterTree]> {
        match self {
            Self::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the string, if this is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the integer, if this is one.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the boolean, if this is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Converts to JSON. Non-finite floats become `null`; opaque values become
    /// their string form.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Null => JsonValue::Null,
            Self::Bool(b) => JsonValue::Bool(*b),
            Self::Integer(n) => JsonValue::Number((*n).into()),
            Self::Float(f) => JsonNumber::from_f64(*f).map_or(JsonValue::Null, JsonValue::Number),
            Self::String(text) => JsonValue::String(text.clone()),
            Self::Opaque(value) => JsonValue::String(value.to_log_string()),
            Self::Sequence(items) => JsonValue::Array(items.iter().map(Self::to_json).collect()),
            Self::Mapping(mapping) => mapping.to_json(),
        }
    }
}

impl Index<&str> for ParameterTree {
    type Output = ParameterTree;

    /// Indexes into a mapping by name; anything else yields `Null`.
    fn index(&self, name: &str) -> &ParameterTree {
        match self {
            Self::Mapping(mapping) => &mapping[name],
            _ => &NULL,
        }
    }
}

impl Index<usize> for ParameterTree {
    type Output = ParameterTree;

    /// Indexes into a sequence; out of range or non-sequences yield `Null`.
    fn index(&self, index: usize) -> &ParameterTree {
        match self {
            Self::Sequence(items) => items.get(index).unwrap_or(&NULL),
            _ => &NULL,
        }
    }
}

impl PartialEq<str> for ParameterTree {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == Some(other)
    }
}

impl PartialEq<&str> for ParameterTree {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == Some(*other)
    }
}

impl PartialEq<i64> for ParameterTree {
    fn eq(&self, other: &i64) -> bool {
        self.as_i64() == Some(*other)
    }
}

impl PartialEq<bool> for ParameterTree {
    fn eq(&self, other: &bool) -> bool {
        self.as_bool() == Some(*other)
    }
}

impl From<Mapping> for ParameterTree {
    fn from(mapping: Mapping) -> Self {
        Self::Mapping(mapping)
    }
}

impl From<Vec<ParameterTree>> for ParameterTree {
    fn from(items: Vec<ParameterTree>) -> Self {
        Self::Sequence(items)
    }
}

impl From<JsonValue> for ParameterTree {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => Self::Null,
            JsonValue::Bool(b) => Self::Bool(b),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Integer(i)
                } else if n.is_u64() {
                    // Beyond i64: keep the exact digits.
                    Self::String(n.to_string())
                } else {
                    n.as_f64().map_or(Self::Null, Self::Float)
                }
            }
            JsonValue::String(text) => Self::String(text),
            JsonValue::Array(items) => Self::Sequence(items.into_iter().map(Self::from).collect()),
            JsonValue::Object(map) => {
                let mut mapping = Mapping::with_capacity(map.len());
                for (key, value) in map {
                    mapping.push(ParamKey::Text(key), Self::from(value));
                }
                Self::Mapping(mapping)
            }
        }
    }
}

impl Serialize for ParameterTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Integer(n) => serializer.serialize_i64(*n),
            Self::Float(f) => serializer.serialize_f64(*f),
            Self::String(text) => serializer.serialize_str(text),
            Self::Opaque(value) => serializer.serialize_str(&value.to_log_string()),
            Self::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Mapping(mapping) => mapping.serialize(serializer),
        }
    }
}

impl Serialize for Mapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let rendered = self.rendered_entries();
        let mut map = serializer.serialize_map(Some(rendered.len()))?;
        for (key, value) in rendered {
            map.serialize_entry(&key, value)?;
        }
        map.end()
    }
}

// =============================================================================
// IntoParameterTree - conversion from host values
// =============================================================================

/// Converts a host value into a [`ParameterTree`].
///
/// Implemented for std scalars and containers, `serde_json::Value`, and any
/// struct deriving `Params`.
pub trait IntoParameterTree {
    /// Performs the conversion.
    fn into_parameter_tree(self) -> ParameterTree;
}

macro_rules! impl_into_tree_integer {
    ($($ty:ty),*) => {
        $(
            impl IntoParameterTree for $ty {
                fn into_parameter_tree(self) -> ParameterTree {
                    ParameterTree::Integer(i64::from(self))
                }
            }
        )*
    };
}

macro_rules! impl_into_tree_wide_integer {
    ($($ty:ty),*) => {
        $(
            impl IntoParameterTree for $ty {
                fn into_parameter_tree(self) -> ParameterTree {
                    i64::try_from(self).map_or_else(
                        |_| ParameterTree::String(self.to_string()),
                        ParameterTree::Integer,
                    )
                }
            }
        )*
    };
}

impl_into_tree_integer!(i8, i16, i32, i64, u8, u16, u32);
impl_into_tree_wide_integer!(i128, isize, u64, u128, usize);

impl IntoParameterTree for ParameterTree {
    fn into_parameter_tree(self) -> ParameterTree {
        self
    }
}

impl IntoParameterTree for Mapping {
    fn into_parameter_tree(self) -> ParameterTree {
        ParameterTree::Mapping(self)
    }
}

impl IntoParameterTree for bool {
    fn into_parameter_tree(self) -> ParameterTree {
        ParameterTree::Bool(self)
    }
}

impl IntoParameterTree for f32 {
    fn into_parameter_tree(self) -> ParameterTree {
        ParameterTree::Float(f64::from(self))
    }
}

impl IntoParameterTree for f64 {
    fn into_parameter_tree(self) -> ParameterTree {
        ParameterTree::Float(self)
    }
}

impl IntoParameterTree for char {
    fn into_parameter_tree(self) -> ParameterTree {
        ParameterTree::String(self.to_string())
    }
}

impl IntoParameterTree for String {
    fn into_parameter_tree(self) -> ParameterTree {
        ParameterTree::String(self)
    }
}

impl IntoParameterTree for &str {
    fn into_parameter_tree(self) -> ParameterTree {
        ParameterTree::String(self.to_owned())
    }
}

impl IntoParameterTree for Cow<'_, str> {
    fn into_parameter_tree(self) -> ParameterTree {
        ParameterTree::String(self.into_owned())
    }
}

impl IntoParameterTree for OpaqueValue {
    fn into_parameter_tree(self) -> ParameterTree {
        ParameterTree::Opaque(self)
    }
}

impl IntoParameterTree for JsonValue {
    fn into_parameter_tree(self) -> ParameterTree {
        ParameterTree::from(self)
    }
}

impl<T: IntoParameterTree> IntoParameterTree for Option<T> {
    fn into_parameter_tree(self) -> ParameterTree {
        self.map_or(ParameterTree::Null, IntoParameterTree::into_parameter_tree)
    }
}

/// Marker fields convert to `null`.
impl<T: ?Sized> IntoParameterTree for PhantomData<T> {
    fn into_parameter_tree(self) -> ParameterTree {
        ParameterTree::Null
    }
}

impl<T: IntoParameterTree> IntoParameterTree for Box<T> {
    fn into_parameter_tree(self) -> ParameterTree {
        (*self).into_parameter_tree()
    }
}

impl<T: IntoParameterTree> IntoParameterTree for Vec<T> {
    fn into_parameter_tree(self) -> ParameterTree {
        ParameterTree::Sequence(
            self.into_iter()
                .map(IntoParameterTree::into_parameter_tree)
                .collect(),
        )
    }
}

impl<K, V, S> IntoParameterTree for HashMap<K, V, S>
where
    K: Into<ParamKey>,
    V: IntoParameterTree,
    S: BuildHasher,
{
    fn into_parameter_tree(self) -> ParameterTree {
        ParameterTree::Mapping(self.into_iter().collect())
    }
}

impl<K, V> IntoParameterTree for BTreeMap<K, V>
where
    K: Into<ParamKey>,
    V: IntoParameterTree,
{
    fn into_parameter_tree(self) -> ParameterTree {
        ParameterTree::Mapping(self.into_iter().collect())
    }
}
