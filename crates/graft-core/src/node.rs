//! Checked read access over generic tree values
//!
//! [`SimpleNode`] wraps a borrowed [`Ipld`] value and validates every access:
//! asking a map for a list, a missing field, or a string for a link each yield
//! a [`NodeError`] naming what was expected and what was found. Decoders walk
//! a value field by field and stop at the first mismatch.

use crate::identifiers::Link;
use ipld_core::ipld::Ipld;
use std::fmt;

/// Shape of a tree value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Null
    Null,
    /// Boolean
    Bool,
    /// Integer
    Integer,
    /// Float
    Float,
    /// UTF-8 string
    String,
    /// Byte string
    Bytes,
    /// Ordered list
    List,
    /// String-keyed map
    Map,
    /// Content identifier
    Link,
}

impl NodeKind {
    /// Kind of the given value
    pub fn of(node: &Ipld) -> Self {
        match node {
            Ipld::Null => Self::Null,
            Ipld::Bool(_) => Self::Bool,
            Ipld::Integer(_) => Self::Integer,
            Ipld::Float(_) => Self::Float,
            Ipld::String(_) => Self::String,
            Ipld::Bytes(_) => Self::Bytes,
            Ipld::List(_) => Self::List,
            Ipld::Map(_) => Self::Map,
            Ipld::Link(_) => Self::Link,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::String => "string",
            Self::Bytes => "bytes",
            Self::List => "list",
            Self::Map => "map",
            Self::Link => "link",
        };
        f.write_str(name)
    }
}

/// Failure reading a tree value
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NodeError {
    /// Value has a different shape than the reader expected
    #[error("expected {expected}, found {found}")]
    UnexpectedKind {
        /// Kind the reader asked for
        expected: NodeKind,
        /// Kind actually present
        found: NodeKind,
    },

    /// Map has no entry under the requested key
    #[error("missing field `{field}`")]
    MissingField {
        /// Requested key
        field: String,
    },

    /// Map does not have the required number of entries
    #[error("expected {expected} map entries, found {found}")]
    UnexpectedEntryCount {
        /// Required entry count
        expected: usize,
        /// Entries present
        found: usize,
    },
}

/// Borrowed, checked view over a tree value
#[derive(Debug, Clone, Copy)]
pub struct SimpleNode<'a> {
    node: &'a Ipld,
}

impl<'a> SimpleNode<'a> {
    /// Wrap a value for reading
    pub fn new(node: &'a Ipld) -> Self {
        Self { node }
    }

    /// Shape of the wrapped value
    pub fn kind(&self) -> NodeKind {
        NodeKind::of(self.node)
    }

    /// Number of elements when known in advance
    ///
    /// Lists and maps report their length; every other kind returns `None`.
    pub fn length(&self) -> Option<usize> {
        match self.node {
            Ipld::List(items) => Some(items.len()),
            Ipld::Map(entries) => Some(entries.len()),
            _ => None,
        }
    }

    /// Iterate list elements in order
    pub fn list_iter(&self) -> Result<impl Iterator<Item = SimpleNode<'a>> + 'a, NodeError> {
        match self.node {
            Ipld::List(items) => Ok(items.iter().map(SimpleNode::new)),
            other => Err(self.unexpected(NodeKind::List, other)),
        }
    }

    /// Number of entries in a map
    pub fn map_len(&self) -> Result<usize, NodeError> {
        match self.node {
            Ipld::Map(entries) => Ok(entries.len()),
            other => Err(self.unexpected(NodeKind::Map, other)),
        }
    }

    /// Require a map with exactly `expected` entries
    pub fn expect_map_len(&self, expected: usize) -> Result<(), NodeError> {
        let found = self.map_len()?;
        if found != expected {
            return Err(NodeError::UnexpectedEntryCount { expected, found });
        }
        Ok(())
    }

    /// Read a named field of a map
    pub fn field(&self, name: &str) -> Result<SimpleNode<'a>, NodeError> {
        match self.node {
            Ipld::Map(entries) => entries
                .get(name)
                .map(SimpleNode::new)
                .ok_or_else(|| NodeError::MissingField {
                    field: name.to_string(),
                }),
            other => Err(self.unexpected(NodeKind::Map, other)),
        }
    }

    /// Read the value as a link
    pub fn as_link(&self) -> Result<Link, NodeError> {
        match self.node {
            Ipld::Link(cid) => Ok(Link::new(*cid)),
            other => Err(self.unexpected(NodeKind::Link, other)),
        }
    }

    /// Read the value as a boolean
    pub fn as_bool(&self) -> Result<bool, NodeError> {
        match self.node {
            Ipld::Bool(value) => Ok(*value),
            other => Err(self.unexpected(NodeKind::Bool, other)),
        }
    }

    fn unexpected(&self, expected: NodeKind, found: &Ipld) -> NodeError {
        NodeError::UnexpectedKind {
            expected,
            found: NodeKind::of(found),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifiers::RAW_CODEC;
    use std::collections::BTreeMap;

    fn entry(link: Link, present: bool) -> Ipld {
        let mut map = BTreeMap::new();
        map.insert("link".to_string(), Ipld::Link(*link.cid()));
        map.insert("blockPresent".to_string(), Ipld::Bool(present));
        Ipld::Map(map)
    }

    #[test]
    fn reads_fields_of_map_elements() {
        let link = Link::for_block(RAW_CODEC, b"a").unwrap();
        let value = Ipld::List(vec![entry(link, true)]);
        let node = SimpleNode::new(&value);

        assert_eq!(node.length(), Some(1));
        let first = node.list_iter().unwrap().next().unwrap();
        first.expect_map_len(2).unwrap();
        assert_eq!(first.field("link").unwrap().as_link().unwrap(), link);
        assert!(first.field("blockPresent").unwrap().as_bool().unwrap());
    }

    #[test]
    fn scalar_has_no_known_length() {
        let value = Ipld::Bool(true);
        assert_eq!(SimpleNode::new(&value).length(), None);
    }

    #[test]
    fn list_access_on_map_fails() {
        let value = Ipld::Map(BTreeMap::new());
        let err = SimpleNode::new(&value).list_iter().err().unwrap();
        assert_eq!(
            err,
            NodeError::UnexpectedKind {
                expected: NodeKind::List,
                found: NodeKind::Map,
            }
        );
    }

    #[test]
    fn missing_field_is_reported_by_name() {
        let value = Ipld::Map(BTreeMap::new());
        let err = SimpleNode::new(&value).field("link").unwrap_err();
        assert_eq!(
            err,
            NodeError::MissingField {
                field: "link".to_string()
            }
        );
    }

    #[test]
    fn wrong_scalar_type_is_rejected() {
        let value = Ipld::String("yes".into());
        let node = SimpleNode::new(&value);
        assert!(node.as_bool().is_err());
        assert!(node.as_link().is_err());
    }

    #[test]
    fn entry_count_is_checked() {
        let mut map = BTreeMap::new();
        map.insert("link".to_string(), Ipld::Null);
        let value = Ipld::Map(map);
        assert_eq!(
            SimpleNode::new(&value).expect_map_len(2),
            Err(NodeError::UnexpectedEntryCount {
                expected: 2,
                found: 1
            })
        );
    }
}
