//! Nested bracket form encoding.
//!
//! The provider accepts request parameters as `application/x-www-form-urlencoded`
//! pairs whose keys carry nesting in a bracket suffix:
//!
//! ```text
//! url=https%3A%2F%2Fexample.com&metadata[order_id]=6735&enabled_events[]=charge.failed
//! ```
//!
//! Callers describe one request's parameters as a [`ParamTree`], and [`encode`]
//! linearizes it. The same string serves as a request body or as a URL query.
//!
//! # Rules
//!
//! - A scalar at `k` becomes `k=value`. Booleans print as `true`/`false`,
//!   integers and decimals in decimal notation.
//! - A nested tree at `k` re-encodes each child under `k[child]`.
//! - A list at `k` encodes every element under `k[]`, recursively for tree
//!   elements (`items[][price]=...`). An empty list emits nothing.
//! - [`ParamValue::Absent`] is omitted at any depth. An explicit empty string
//!   is kept (`key=`) and asks the provider to clear the field.
//! - Tree keys may not contain `[` or `]`, so no two paths flatten to the same
//!   key.
//! - Key segments and values are percent-encoded; the bracket delimiters stay
//!   literal.
//!
//! # Example
//!
//! ```rust
//! use payrail::form::{ParamTree, encode};
//!
//! let tree = ParamTree::new()
//!     .with("metadata", ParamTree::new().with("order_id", "6735"))
//!     .with("url", "https://x");
//! assert_eq!(encode(&tree).unwrap(), "metadata[order_id]=6735&url=https%3A%2F%2Fx");
//! ```

use std::collections::HashSet;

use rust_decimal::Decimal;
use url::form_urlencoded;

use crate::error::EncodingError;

/// A single parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    /// A string, sent as-is after percent-encoding.
    String(String),
    /// A boolean, sent as `true` or `false`.
    Bool(bool),
    /// An integer.
    Int(i64),
    /// A decimal number (tax percentages, unit amounts with sub-cent precision).
    Decimal(Decimal),
    /// A sequence, each element encoded under `key[]`.
    List(Vec<ParamValue>),
    /// A nested tree, each child encoded under `key[child]`.
    Tree(ParamTree),
    /// Marker for a key that must not appear in the output.
    Absent,
}

impl ParamValue {
    /// Returns `true` for [`ParamValue::Absent`].
    #[must_use]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&String> for ParamValue {
    fn from(value: &String) -> Self {
        Self::String(value.clone())
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u8> for ParamValue {
    fn from(value: u8) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<Decimal> for ParamValue {
    fn from(value: Decimal) -> Self {
        Self::Decimal(value)
    }
}

impl From<ParamTree> for ParamValue {
    fn from(value: ParamTree) -> Self {
        Self::Tree(value)
    }
}

impl<T: Into<Self>> From<Vec<T>> for ParamValue {
    fn from(value: Vec<T>) -> Self {
        Self::List(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Self>> From<Option<T>> for ParamValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Absent, Into::into)
    }
}

/// Conversion of a typed parameter struct into a [`ParamTree`].
pub trait ToParams {
    /// Builds the parameter tree for one request.
    fn to_params(&self) -> ParamTree;
}

impl ToParams for ParamTree {
    fn to_params(&self) -> ParamTree {
        self.clone()
    }
}

/// The parameters of one request, in insertion order.
///
/// Keys are not deduplicated on insertion; [`encode`] rejects a tree that
/// carries the same key twice at one level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamTree {
    entries: Vec<(String, ParamValue)>,
}

impl ParamTree {
    /// Creates an empty tree.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Appends an entry.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> &mut Self {
        self.entries.push((key.into(), value.into()));
        self
    }

    /// Appends an entry, builder style.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.push(key, value);
        self
    }

    /// Appends every entry of `other`.
    pub fn merge(&mut self, other: Self) -> &mut Self {
        self.entries.extend(other.entries);
        self
    }

    /// Returns the first value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Number of entries, absent ones included.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the tree has no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Rebuilds a tree from flat `key[a][b]` pairs.
    ///
    /// This is the inverse of [`flatten`] for trees whose lists hold scalars:
    /// an empty `[]` segment is accepted only in last position and appends to
    /// a list.
    ///
    /// # Errors
    ///
    /// Returns [`EncodingError::MalformedKey`] for keys outside the grammar,
    /// [`EncodingError::DuplicateKey`] when a scalar path repeats and
    /// [`EncodingError::Conflict`] when a path is used both as a scalar and as
    /// a container.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, EncodingError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut tree = Self::new();
        for (key, value) in pairs {
            let key = key.as_ref();
            let (name, segments) = parse_key(key)?;
            tree.insert_path(key, name, &segments, value.into())?;
        }
        Ok(tree)
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }

    fn insert_path(
        &mut self,
        full_key: &str,
        name: String,
        rest: &[Segment],
        value: String,
    ) -> Result<(), EncodingError> {
        match rest.split_first() {
            None => {
                if self.position(&name).is_some() {
                    return Err(EncodingError::DuplicateKey {
                        path: full_key.to_owned(),
                    });
                }
                self.push(name, value);
                Ok(())
            }
            Some((Segment::Append, _)) => match self.position(&name) {
                None => {
                    self.push(name, ParamValue::List(vec![value.into()]));
                    Ok(())
                }
                Some(idx) => match &mut self.entries[idx].1 {
                    ParamValue::List(items) => {
                        items.push(value.into());
                        Ok(())
                    }
                    _ => Err(EncodingError::Conflict {
                        path: full_key.to_owned(),
                    }),
                },
            },
            Some((Segment::Key(child), tail)) => {
                let idx = if let Some(idx) = self.position(&name) {
                    idx
                } else {
                    self.entries.push((name, ParamValue::Tree(Self::new())));
                    self.entries.len() - 1
                };
                match &mut self.entries[idx].1 {
                    ParamValue::Tree(sub) => sub.insert_path(full_key, child.clone(), tail, value),
                    _ => Err(EncodingError::Conflict {
                        path: full_key.to_owned(),
                    }),
                }
            }
        }
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for ParamTree {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Linearizes `tree` into the unescaped `(flat_key, value)` pairs that
/// [`encode`] serializes.
///
/// # Errors
///
/// Returns [`EncodingError`] if a key is empty, contains a bracket or
/// repeats at one level.
pub fn flatten(tree: &ParamTree) -> Result<Vec<(String, String)>, EncodingError> {
    let mut out = Vec::new();
    flatten_tree(tree, None, &mut out)?;
    Ok(out)
}

/// Encodes `tree` as a form-urlencoded string.
///
/// An empty tree (or one holding only absent values) encodes to `""`.
///
/// # Errors
///
/// Returns [`EncodingError`] if a key is empty, contains a bracket or
/// repeats at one level.
pub fn encode(tree: &ParamTree) -> Result<String, EncodingError> {
    let pairs = flatten(tree)?;
    let mut out = String::new();
    for (key, value) in &pairs {
        if !out.is_empty() {
            out.push('&');
        }
        push_key(&mut out, key);
        out.push('=');
        out.extend(form_urlencoded::byte_serialize(value.as_bytes()));
    }
    Ok(out)
}

/// Parses a form-urlencoded string back into decoded pairs.
#[must_use]
pub fn decode_pairs(input: &str) -> Vec<(String, String)> {
    form_urlencoded::parse(input.as_bytes())
        .into_owned()
        .collect()
}

fn flatten_tree(
    tree: &ParamTree,
    prefix: Option<&str>,
    out: &mut Vec<(String, String)>,
) -> Result<(), EncodingError> {
    let mut seen = HashSet::with_capacity(tree.len());
    for (key, value) in &tree.entries {
        if key.is_empty() {
            return Err(EncodingError::EmptyKey {
                parent: prefix.unwrap_or_default().to_owned(),
            });
        }
        let path = prefix.map_or_else(|| key.clone(), |p| format!("{p}[{key}]"));
        if key.contains(['[', ']']) {
            return Err(EncodingError::MalformedKey { key: path });
        }
        if !seen.insert(key.as_str()) {
            return Err(EncodingError::DuplicateKey { path });
        }
        flatten_value(value, path, out)?;
    }
    Ok(())
}

fn flatten_value(
    value: &ParamValue,
    path: String,
    out: &mut Vec<(String, String)>,
) -> Result<(), EncodingError> {
    match value {
        ParamValue::Absent => {}
        ParamValue::String(s) => out.push((path, s.clone())),
        ParamValue::Bool(b) => out.push((path, b.to_string())),
        ParamValue::Int(i) => out.push((path, i.to_string())),
        ParamValue::Decimal(d) => out.push((path, d.to_string())),
        ParamValue::List(items) => {
            let item_path = format!("{path}[]");
            for item in items {
                flatten_value(item, item_path.clone(), out)?;
            }
        }
        ParamValue::Tree(sub) => flatten_tree(sub, Some(&path), out)?,
    }
    Ok(())
}

/// Percent-encodes a flat key segment by segment, keeping brackets literal.
fn push_key(out: &mut String, key: &str) {
    let mut rest = key;
    while let Some(pos) = rest.find(['[', ']']) {
        out.extend(form_urlencoded::byte_serialize(rest[..pos].as_bytes()));
        out.push_str(&rest[pos..=pos]);
        rest = &rest[pos + 1..];
    }
    out.extend(form_urlencoded::byte_serialize(rest.as_bytes()));
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Key(String),
    Append,
}

fn parse_key(key: &str) -> Result<(String, Vec<Segment>), EncodingError> {
    let malformed = || EncodingError::MalformedKey {
        key: key.to_owned(),
    };
    let (name, mut rest) = key.find('[').map_or((key, ""), |pos| key.split_at(pos));
    if name.is_empty() || name.contains(']') {
        return Err(malformed());
    }

    let mut segments = Vec::new();
    while !rest.is_empty() {
        let body = rest.strip_prefix('[').ok_or_else(malformed)?;
        let close = body.find(']').ok_or_else(malformed)?;
        let segment = &body[..close];
        if segment.contains('[') {
            return Err(malformed());
        }
        if matches!(segments.last(), Some(Segment::Append)) {
            return Err(malformed());
        }
        segments.push(if segment.is_empty() {
            Segment::Append
        } else {
            Segment::Key(segment.to_owned())
        });
        rest = &body[close + 1..];
    }
    Ok((name.to_owned(), segments))
}
