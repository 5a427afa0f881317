// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the block tree: item identifiers, tags, options, and items.

use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use core::hash::Hash;

use smallvec::SmallVec;

/// Bound shared by every host key type.
///
/// Keys identify blocks and containers across rebuilds. They must be cheap to clone
/// and hashable; `Debug` keeps diagnostics readable.
pub trait BlockKey: Clone + Eq + Hash + fmt::Debug {}

impl<K: Clone + Eq + Hash + fmt::Debug> BlockKey for K {}

/// Identifier of an item in a [`Snapshot`](crate::Snapshot).
///
/// Ids are derived from host keys, so the same host node always maps to the same id
/// across rebuilds. Blocks and containers live in separate namespaces: a block and a
/// container may share a key without colliding.
///
/// The [`Display`](fmt::Display) form is `container:key`, `block:key`,
/// `placeholder:key` or `gap`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ItemId<K> {
    /// A container, keyed by the container's host key.
    Container(K),
    /// A block, keyed by the block's host key.
    Block(K),
    /// The trailing placeholder of the container with this key.
    Placeholder(K),
    /// The drop gap. At most one gap exists per snapshot.
    Gap,
}

impl<K> ItemId<K> {
    /// The host key this id was derived from, if any.
    ///
    /// For placeholders this is the key of the owning container.
    pub fn key(&self) -> Option<&K> {
        match self {
            Self::Container(k) | Self::Block(k) | Self::Placeholder(k) => Some(k),
            Self::Gap => None,
        }
    }

    /// The block key, if this id names a block.
    pub fn block_key(&self) -> Option<&K> {
        match self {
            Self::Block(k) => Some(k),
            _ => None,
        }
    }

    /// Returns `true` for placeholder ids.
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder(_))
    }

    /// Returns `true` for the gap id.
    pub fn is_gap(&self) -> bool {
        matches!(self, Self::Gap)
    }
}

impl<K: fmt::Display> fmt::Display for ItemId<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Container(k) => write!(f, "container:{k}"),
            Self::Block(k) => write!(f, "block:{k}"),
            Self::Placeholder(k) => write!(f, "placeholder:{k}"),
            Self::Gap => f.write_str("gap"),
        }
    }
}

/// Label used to decide which containers a block may be dropped into.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tag(String);

impl Tag {
    /// Create a tag from anything string-like.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The tag's name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Tag {
    fn from(name: &str) -> Self {
        Self(name.into())
    }
}

impl From<String> for Tag {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Deduplicated set of tags carried by a group of dragged blocks.
pub type TagSet = SmallVec<[Tag; 2]>;

/// Host-provided configuration for a block or container.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockOptions {
    /// Spacing between this node's children, in logical pixels.
    ///
    /// `None` falls back to the layout's default spacing.
    pub spacing: Option<f64>,
    /// Tag of this node. Untagged blocks may be dropped into any container
    /// that accepts drops at all.
    pub tag: Option<Tag>,
    /// Tags accepted as children. A drop is legal when this list contains every
    /// tag carried by the dragged blocks.
    pub accepts: Vec<Tag>,
    /// A fixed container never accepts drops.
    pub fixed: bool,
}

impl BlockOptions {
    /// Options with all defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the child spacing.
    pub fn with_spacing(mut self, spacing: f64) -> Self {
        self.spacing = Some(spacing);
        self
    }

    /// Set the tag.
    pub fn with_tag(mut self, tag: impl Into<Tag>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Append accepted tags.
    pub fn accepting<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Tag>,
    {
        self.accepts.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Mark as fixed (never a drop target).
    pub fn fixed(mut self) -> Self {
        self.fixed = true;
        self
    }

    /// Whether children carrying all of `tags` may be dropped here.
    ///
    /// An empty tag set is accepted by every non-fixed container.
    pub fn accepts_all(&self, tags: &[Tag]) -> bool {
        !self.fixed && tags.iter().all(|tag| self.accepts.contains(tag))
    }
}

/// Address of an insertion slot: a container and the block to insert before.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Place<K> {
    /// Key of the container receiving the blocks.
    pub parent: K,
    /// Key of the block to insert before, or `None` to append.
    pub before: Option<K>,
}

impl<K> Place<K> {
    /// A slot at the end of `parent`.
    pub fn append(parent: K) -> Self {
        Self {
            parent,
            before: None,
        }
    }

    /// A slot in `parent` directly before the block `before`.
    pub fn before(parent: K, before: K) -> Self {
        Self {
            parent,
            before: Some(before),
        }
    }
}

/// Discriminant of an [`Item`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ItemKind {
    /// See [`Item::Container`].
    Container,
    /// See [`Item::Block`].
    Block,
    /// See [`Item::Placeholder`].
    Placeholder,
    /// See [`Item::Gap`].
    Gap,
}

/// An ordered slot of blocks.
#[derive(Clone, Debug, PartialEq)]
pub struct ContainerItem<K> {
    /// Host key.
    pub key: K,
    /// Spacing, tag and accepted tags.
    pub options: BlockOptions,
}

/// A host block and its payload.
#[derive(Debug)]
pub struct BlockItem<K, T> {
    /// Host key.
    pub key: K,
    /// Spacing, tag and accepted tags.
    pub options: BlockOptions,
    /// Opaque host payload. Item caching compares payloads by pointer identity.
    pub block: Rc<T>,
}

impl<K: Clone, T> Clone for BlockItem<K, T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            options: self.options.clone(),
            block: Rc::clone(&self.block),
        }
    }
}

/// Drop zone at the end of a container, present even when the container is empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlaceholderItem<K> {
    /// Key of the owning container.
    pub parent: K,
}

/// Synthetic marker previewing where dragged blocks will land.
#[derive(Clone, Debug, PartialEq)]
pub struct GapItem<K> {
    /// The item the gap was spliced in front of.
    pub before: ItemId<K>,
    /// Height of the dragged blocks.
    pub height: f64,
}

/// A node in a [`Snapshot`](crate::Snapshot).
#[derive(Debug)]
pub enum Item<K, T> {
    /// An ordered slot of blocks. The snapshot root is always a container.
    Container(ContainerItem<K>),
    /// A host block; its children are the block's containers.
    Block(BlockItem<K, T>),
    /// The trailing drop zone of a container.
    Placeholder(PlaceholderItem<K>),
    /// The drop preview gap.
    Gap(GapItem<K>),
}

impl<K: Clone, T> Clone for Item<K, T> {
    fn clone(&self) -> Self {
        match self {
            Self::Container(c) => Self::Container(c.clone()),
            Self::Block(b) => Self::Block(b.clone()),
            Self::Placeholder(p) => Self::Placeholder(p.clone()),
            Self::Gap(g) => Self::Gap(g.clone()),
        }
    }
}

impl<K: Clone, T> Item<K, T> {
    /// The id of this item.
    pub fn id(&self) -> ItemId<K> {
        match self {
            Self::Container(c) => ItemId::Container(c.key.clone()),
            Self::Block(b) => ItemId::Block(b.key.clone()),
            Self::Placeholder(p) => ItemId::Placeholder(p.parent.clone()),
            Self::Gap(_) => ItemId::Gap,
        }
    }
}

impl<K, T> Item<K, T> {
    /// The kind of this item.
    pub fn kind(&self) -> ItemKind {
        match self {
            Self::Container(_) => ItemKind::Container,
            Self::Block(_) => ItemKind::Block,
            Self::Placeholder(_) => ItemKind::Placeholder,
            Self::Gap(_) => ItemKind::Gap,
        }
    }

    /// Host key of a block or container.
    pub fn key(&self) -> Option<&K> {
        match self {
            Self::Container(c) => Some(&c.key),
            Self::Block(b) => Some(&b.key),
            Self::Placeholder(_) | Self::Gap(_) => None,
        }
    }

    /// Options of a block or container.
    pub fn options(&self) -> Option<&BlockOptions> {
        match self {
            Self::Container(c) => Some(&c.options),
            Self::Block(b) => Some(&b.options),
            Self::Placeholder(_) | Self::Gap(_) => None,
        }
    }

    /// Tag of a block or container.
    pub fn tag(&self) -> Option<&Tag> {
        self.options().and_then(|o| o.tag.as_ref())
    }

    /// The block, if this item is one.
    pub fn as_block(&self) -> Option<&BlockItem<K, T>> {
        match self {
            Self::Block(b) => Some(b),
            _ => None,
        }
    }

    /// The container, if this item is one.
    pub fn as_container(&self) -> Option<&ContainerItem<K>> {
        match self {
            Self::Container(c) => Some(c),
            _ => None,
        }
    }

    /// Returns `true` for placeholders.
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder(_))
    }
}
