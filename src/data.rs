//! The template context tree.
//!
//! A `Data` node is exactly one of five shapes. Children are owned by value,
//! so dropping a node releases its whole subtree once; there is no sharing
//! and no back-reference anywhere in a tree.
//!
//! Truthiness is shallow: `is_empty` only looks at the node itself, which is
//! what the renderer uses to decide whether a section is shown.
use std::fmt;

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::error::{Error, Result};

// ------------------------------- Tag ------------------------------------- //

/// Discriminant of a `Data` node, without its storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    None,
    String,
    Map,
    List,
    Array,
}

impl Tag {
    pub fn name(self) -> &'static str {
        match self {
            Tag::None => "none",
            Tag::String => "string",
            Tag::Map => "map",
            Tag::List => "list",
            Tag::Array => "array",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ------------------------------- Data ------------------------------------ //

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Data {
    /// Placeholder before construction picks a shape.
    #[default]
    None,
    String(String),
    /// Unique keys; order is kept for stable output but carries no meaning.
    Map(IndexMap<String, Data>),
    /// Growable, append-only.
    List(Vec<Data>),
    /// Length fixed at allocation.
    Array(Box<[Data]>),
}

impl Data {
    pub fn new() -> Self {
        Data::None
    }

    pub fn tag(&self) -> Tag {
        match self {
            Data::None => Tag::None,
            Data::String(_) => Tag::String,
            Data::Map(_) => Tag::Map,
            Data::List(_) => Tag::List,
            Data::Array(_) => Tag::Array,
        }
    }

    /// Fix the storage of a `None` node.
    ///
    /// - `Array` gets `size` children, all `None`, to be filled by the caller.
    /// - `String` reserves `size` bytes of text.
    /// - `Map` and `List` start empty; `size` is a capacity hint only.
    ///
    /// Re-initialization is rejected and leaves the node as it was.
    pub fn allocate(&mut self, tag: Tag, size: usize) -> Result<()> {
        if !matches!(self, Data::None) {
            return Err(Error::AlreadyInitialized(self.tag()));
        }
        *self = match tag {
            Tag::None => return Err(Error::InvalidAllocation(tag)),
            Tag::String => Data::String(String::with_capacity(size)),
            Tag::Map => Data::Map(IndexMap::with_capacity(size)),
            Tag::List => Data::List(Vec::with_capacity(size)),
            Tag::Array => Data::Array(std::iter::repeat_with(Data::new).take(size).collect()),
        };
        Ok(())
    }

    /// Set the text of a `None` or `String` node.
    pub fn assign(&mut self, text: impl Into<String>) -> Result<()> {
        match self {
            Data::None | Data::String(_) => {
                *self = Data::String(text.into());
                Ok(())
            }
            other => Err(Error::TagMismatch { expected: Tag::String, found: other.tag() }),
        }
    }

    /// Insert into a `Map`. An existing key is overwritten; the old child is returned.
    pub fn insert(&mut self, key: impl Into<String>, child: Data) -> Result<Option<Data>> {
        match self {
            Data::Map(map) => Ok(map.insert(key.into(), child)),
            other => Err(Error::TagMismatch { expected: Tag::Map, found: other.tag() }),
        }
    }

    pub fn append(&mut self, child: Data) -> Result<()> {
        match self {
            Data::List(list) => {
                list.push(child);
                Ok(())
            }
            other => Err(Error::TagMismatch { expected: Tag::List, found: other.tag() }),
        }
    }

    /// Drop everything this node owns and return it to `None`.
    pub fn clear(&mut self) {
        *self = Data::None;
    }

    /// Shallow truthiness test.
    pub fn is_empty(&self) -> bool {
        match self {
            Data::None => true,
            Data::String(s) => s.is_empty(),
            Data::Map(m) => m.is_empty(),
            Data::List(l) => l.is_empty(),
            Data::Array(a) => a.is_empty(),
        }
    }

    /// Entries, items, or text bytes, depending on the tag.
    pub fn len(&self) -> usize {
        match self {
            Data::None => 0,
            Data::String(s) => s.len(),
            Data::Map(m) => m.len(),
            Data::List(l) => l.len(),
            Data::Array(a) => a.len(),
        }
    }

    /// True if any reachable node has not been given a shape yet.
    pub fn contains_none(&self) -> bool {
        matches!(self, Data::None) || self.children().any(Data::contains_none)
    }

    // ----------------------------- Accessors ----------------------------- //

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Data::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, Data>> {
        match self {
            Data::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Data]> {
        match self {
            Data::List(l) => Some(l.as_slice()),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Data]> {
        match self {
            Data::Array(a) => Some(&a[..]),
            _ => None,
        }
    }

    /// Slots of an `Array`, for filling after `allocate`.
    pub fn array_mut(&mut self) -> Option<&mut [Data]> {
        match self {
            Data::Array(a) => Some(&mut a[..]),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Data> {
        self.as_map().and_then(|m| m.get(key))
    }

    /// Positional access on `List` and `Array`.
    pub fn index(&self, i: usize) -> Option<&Data> {
        match self {
            Data::List(l) => l.get(i),
            Data::Array(a) => a.get(i),
            _ => None,
        }
    }

    /// Direct children in storage order; map values only.
    pub fn children(&self) -> Box<dyn Iterator<Item = &Data> + '_> {
        match self {
            Data::None | Data::String(_) => Box::new(std::iter::empty()),
            Data::Map(m) => Box::new(m.values()),
            Data::List(l) => Box::new(l.iter()),
            Data::Array(a) => Box::new(a.iter()),
        }
    }
}

impl From<String> for Data {
    fn from(s: String) -> Self {
        Data::String(s)
    }
}

impl From<&str> for Data {
    fn from(s: &str) -> Self {
        Data::String(s.to_owned())
    }
}

impl Serialize for Data {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Data::None => serializer.serialize_unit(),
            Data::String(s) => serializer.serialize_str(s),
            Data::Map(m) => {
                let mut out = serializer.serialize_map(Some(m.len()))?;
                for (k, v) in m {
                    out.serialize_entry(k, v)?;
                }
                out.end()
            }
            Data::List(items) => serialize_items(items, serializer),
            Data::Array(items) => serialize_items(items, serializer),
        }
    }
}

fn serialize_items<S: Serializer>(items: &[Data], serializer: S) -> std::result::Result<S::Ok, S::Error> {
    let mut out = serializer.serialize_seq(Some(items.len()))?;
    for v in items {
        out.serialize_element(v)?;
    }
    out.end()
}

// ------------------------------- Tests ------------------------------------ //
