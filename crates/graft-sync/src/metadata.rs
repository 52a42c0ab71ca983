//! Response metadata and its wire codec
//!
//! Every response carries an ordered record of the links it covers and whether
//! each link's block was present. On the wire this is a list of two-key maps:
//!
//! ```text
//! [ { "link": <cid>, "blockPresent": <bool> }, ... ]
//! ```
//!
//! Order mirrors traversal order and is preserved end to end. Decoding checks
//! the shape step by step and returns either the whole sequence or an error.

use graft_core::{GraftError, IpldBridge, Link, NodeError, NodeKind, SimpleNode};
use serde::{Deserialize, Serialize};

/// Map key holding an item's link
pub const LINK_FIELD: &str = "link";

/// Map key holding an item's block presence flag
pub const BLOCK_PRESENT_FIELD: &str = "blockPresent";

/// Number of entries in each encoded item
const ITEM_FIELD_COUNT: usize = 2;

/// Metadata codec errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MetadataError {
    /// The bridge failed to build or serialize the value
    #[error("failed to encode metadata: {0}")]
    Encode(GraftError),

    /// Input bytes are not valid in the canonical format
    #[error("failed to decode metadata: {0}")]
    Decode(GraftError),

    /// Top-level value is not a list
    #[error("metadata must be a list, found {found}")]
    NotAList {
        /// Kind actually present
        found: NodeKind,
    },

    /// A list element does not have the item shape
    #[error("malformed metadata item at index {index}: {source}")]
    MalformedItem {
        /// Position of the element in the list
        index: usize,
        /// What was wrong with it
        #[source]
        source: NodeError,
    },
}

/// One link covered by a response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MetadataItem {
    /// Link that was traversed
    pub link: Link,
    /// Whether the responder had the block
    pub block_present: bool,
}

impl MetadataItem {
    /// Create an item
    pub fn new(link: Link, block_present: bool) -> Self {
        Self {
            link,
            block_present,
        }
    }
}

/// Ordered link coverage of a response
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata(Vec<MetadataItem>);

impl Metadata {
    /// Create empty metadata
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Create empty metadata with room for `capacity` items
    pub fn with_capacity(capacity: usize) -> Self {
        Self(Vec::with_capacity(capacity))
    }

    /// Append an item
    pub fn push(&mut self, item: MetadataItem) {
        self.0.push(item);
    }

    /// Number of items
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no items
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate items in order
    pub fn iter(&self) -> std::slice::Iter<'_, MetadataItem> {
        self.0.iter()
    }

    /// Items as a slice
    pub fn as_slice(&self) -> &[MetadataItem] {
        &self.0
    }

    /// Whether any item reports a missing block
    pub fn has_missing_blocks(&self) -> bool {
        self.0.iter().any(|item| !item.block_present)
    }

    /// Encode through `bridge`; see [`encode_metadata`]
    pub fn encode<B: IpldBridge + ?Sized>(&self, bridge: &B) -> Result<Vec<u8>, MetadataError> {
        encode_metadata(self, bridge)
    }

    /// Decode through `bridge`; see [`decode_metadata`]
    pub fn decode<B: IpldBridge + ?Sized>(data: &[u8], bridge: &B) -> Result<Self, MetadataError> {
        decode_metadata(data, bridge)
    }
}

impl From<Vec<MetadataItem>> for Metadata {
    fn from(items: Vec<MetadataItem>) -> Self {
        Self(items)
    }
}

impl From<Metadata> for Vec<MetadataItem> {
    fn from(metadata: Metadata) -> Self {
        metadata.0
    }
}

impl FromIterator<MetadataItem> for Metadata {
    fn from_iter<I: IntoIterator<Item = MetadataItem>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Metadata {
    type Item = MetadataItem;
    type IntoIter = std::vec::IntoIter<MetadataItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Metadata {
    type Item = &'a MetadataItem;
    type IntoIter = std::slice::Iter<'a, MetadataItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Extend<MetadataItem> for Metadata {
    fn extend<I: IntoIterator<Item = MetadataItem>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

/// Encode metadata as a list of `{link, blockPresent}` maps
pub fn encode_metadata<B: IpldBridge + ?Sized>(
    metadata: &Metadata,
    bridge: &B,
) -> Result<Vec<u8>, MetadataError> {
    let items = metadata
        .iter()
        .map(|item| {
            let link = bridge.build_link(&item.link)?;
            let block_present = bridge.build_bool(item.block_present)?;
            bridge.build_map(vec![
                (LINK_FIELD, link),
                (BLOCK_PRESENT_FIELD, block_present),
            ])
        })
        .collect::<Result<Vec<_>, GraftError>>()
        .map_err(MetadataError::Encode)?;

    let node = bridge.build_list(items).map_err(MetadataError::Encode)?;
    bridge.encode_node(&node).map_err(MetadataError::Encode)
}

/// Decode metadata previously produced by [`encode_metadata`]
pub fn decode_metadata<B: IpldBridge + ?Sized>(
    data: &[u8],
    bridge: &B,
) -> Result<Metadata, MetadataError> {
    let node = bridge.decode_node(data).map_err(MetadataError::Decode)?;
    let root = SimpleNode::new(&node);

    let elements = root.list_iter().map_err(|_| MetadataError::NotAList {
        found: root.kind(),
    })?;

    let mut metadata = match root.length() {
        Some(len) => Metadata::with_capacity(len),
        None => Metadata::new(),
    };

    for (index, element) in elements.enumerate() {
        let item = decode_item(element)
            .map_err(|source| MetadataError::MalformedItem { index, source })?;
        metadata.push(item);
    }

    tracing::trace!(items = metadata.len(), "decoded metadata");
    Ok(metadata)
}

fn decode_item(element: SimpleNode<'_>) -> Result<MetadataItem, NodeError> {
    element.expect_map_len(ITEM_FIELD_COUNT)?;
    let link = element.field(LINK_FIELD)?.as_link()?;
    let block_present = element.field(BLOCK_PRESENT_FIELD)?.as_bool()?;
    Ok(MetadataItem::new(link, block_present))
}
