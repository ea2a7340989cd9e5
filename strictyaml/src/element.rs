//! The element store and the per-document context.
//!
//! Every node of a document is an [`Element`] identified by its position in a growing vector.
//! Positions are stable for the lifetime of the document and are never reused; removing an
//! entry from a container only unlinks it from the container's child list. Index 0 is a
//! reserved root `Key` with an empty name whose single child, when present, is the effective
//! document root.
//!
//! Intra-tree links are `u32` indices; `0` encodes "absent" (the root can never be a child).

use crate::arena::{Arena, StrRef};
use crate::map_index::{MapIndex, FIRST_VALID};
use crate::node::NodeKind;
use crate::wyhash;

/// Index of an element in the store. `0` is the reserved root.
pub(crate) type EltId = u32;

/// Sentinel for an absent element link.
pub(crate) const NO_ELT: EltId = 0;

/// One node of the tree.
///
/// The fixed-shape tagged variant keeps dispatch a plain `match`; container children live in a
/// child index array with doubling growth.
#[derive(Debug)]
pub(crate) enum Element {
    /// Placeholder for a node whose kind is not known yet (a key or sequence slot awaiting its
    /// value). Left in the tree when the value never materializes.
    Unknown,
    /// A map entry. Has zero or one child, never more.
    Key {
        name: StrRef,
        child: EltId,
        comment: EltId,
    },
    /// A scalar string.
    Value { text: StrRef, comment: EltId },
    /// An ordered list of children of any kind except `Key`.
    Sequence { subs: Vec<EltId> },
    /// An ordered list of `Key` children (plus interleaved comments).
    Map { subs: Vec<EltId> },
    /// A comment, either a container child or piggybacked on another element.
    Comment {
        text: StrRef,
        standalone: bool,
        next: EltId,
    },
}

impl Element {
    pub fn kind(&self) -> NodeKind {
        match self {
            Element::Unknown => NodeKind::Unknown,
            Element::Key { .. } => NodeKind::Key,
            Element::Value { .. } => NodeKind::Value,
            Element::Sequence { .. } => NodeKind::Sequence,
            Element::Map { .. } => NodeKind::Map,
            Element::Comment { .. } => NodeKind::Comment,
        }
    }

    /// Number of children: 0 or 1 for a `Key`, the child count for containers.
    pub fn sub_qty(&self) -> usize {
        match self {
            Element::Key { child, .. } => usize::from(*child != NO_ELT),
            Element::Sequence { subs } | Element::Map { subs } => subs.len(),
            _ => 0,
        }
    }

    /// Child list of a container.
    ///
    /// # Panics
    /// Panics if `self` is not a `Sequence` or a `Map`.
    pub fn subs(&self) -> &[EltId] {
        match self {
            Element::Sequence { subs } | Element::Map { subs } => subs,
            _ => unreachable!("subs() on a non-container element"),
        }
    }

    /// Child at `idx` of a container.
    pub fn sub(&self, idx: usize) -> EltId {
        self.subs()[idx]
    }

    /// Attach a child: set a `Key`'s value or append to a container.
    pub fn add(&mut self, elt: EltId) {
        match self {
            Element::Key { child, .. } => *child = elt,
            Element::Sequence { subs } | Element::Map { subs } => subs.push(elt),
            _ => unreachable!("add() on a leaf element"),
        }
    }

    /// Insert a child of a container at `idx`, shifting the tail.
    pub fn insert_at(&mut self, idx: usize, elt: EltId) {
        match self {
            Element::Sequence { subs } | Element::Map { subs } => subs.insert(idx, elt),
            _ => unreachable!("insert_at() on a non-container element"),
        }
    }

    /// Unlink the child of a container at `idx`, shifting the tail.
    pub fn erase(&mut self, idx: usize) {
        match self {
            Element::Sequence { subs } | Element::Map { subs } => {
                subs.remove(idx);
            }
            _ => unreachable!("erase() on a non-container element"),
        }
    }

    /// Overwrite the child of a container at `idx`.
    pub fn replace(&mut self, idx: usize, elt: EltId) {
        match self {
            Element::Sequence { subs } | Element::Map { subs } => subs[idx] = elt,
            _ => unreachable!("replace() on a non-container element"),
        }
    }

    /// Value element of a `Key`, or [`NO_ELT`] when the key has none.
    pub fn key_child(&self) -> EltId {
        match self {
            Element::Key { child, .. } => *child,
            _ => NO_ELT,
        }
    }

    /// Next element of the piggybacked comment chain, or [`NO_ELT`].
    ///
    /// Containers carry comments as regular children and always return [`NO_ELT`].
    pub fn next_comment(&self) -> EltId {
        match self {
            Element::Key { comment, .. } | Element::Value { comment, .. } => *comment,
            Element::Comment { next, .. } => *next,
            _ => NO_ELT,
        }
    }

    /// Attach a comment to this element: chained on scalars and keys, appended as a child on
    /// containers.
    pub fn set_comment(&mut self, elt: EltId) {
        debug_assert!(elt != NO_ELT);
        match self {
            Element::Key { comment, .. } | Element::Value { comment, .. } => *comment = elt,
            Element::Comment { next, .. } => *next = elt,
            Element::Sequence { subs } | Element::Map { subs } => subs.push(elt),
            Element::Unknown => unreachable!("set_comment() on an untyped element"),
        }
    }
}

/// The storage backing one document: element store, string arena and map child index.
///
/// The context is built by the parser (or an empty one by [`Document::new`]) and owned by the
/// document for its whole life. It is the only place that can see all three stores at once,
/// which the map index needs for its key-byte verification.
///
/// [`Document::new`]: crate::Document::new
#[derive(Debug)]
pub(crate) struct Context {
    pub elements: Vec<Element>,
    pub arena: Arena,
    index: MapIndex,
}

impl Context {
    /// Create a context holding only the reserved root `Key`, with `arena_capacity` bytes of
    /// string storage pre-reserved.
    pub fn new(arena_capacity: usize) -> Self {
        let mut arena = Arena::with_capacity(arena_capacity);
        let name = arena.push("");
        Self {
            elements: vec![Element::Key {
                name,
                child: NO_ELT,
                comment: NO_ELT,
            }],
            arena,
            index: MapIndex::new(),
        }
    }

    /// Append an element and return its index.
    pub fn push(&mut self, elt: Element) -> EltId {
        self.elements.push(elt);
        (self.elements.len() - 1) as EltId
    }

    /// View the string referenced by `r`.
    pub fn str(&self, r: StrRef) -> &str {
        self.arena.get(r)
    }

    /// Position of the `Key` child named `key` within the children of map `parent`.
    pub fn map_find(&self, parent: EltId, key: &str) -> Option<u32> {
        let hash = key_hash(parent, key);
        self.index
            .find(hash, |pos| key_matches(&self.elements, &self.arena, parent, key, pos))
    }

    /// Record that the `Key` child named `key` of map `parent` sits at `child_pos`.
    ///
    /// Returns `true` when the entry is new and `false` when an existing entry was updated.
    pub fn map_insert(&mut self, parent: EltId, key: &str, child_pos: u32) -> bool {
        let hash = key_hash(parent, key);
        let Context {
            elements, index, arena, ..
        } = self;
        index.insert_or_replace(hash, child_pos, |pos| {
            key_matches(elements, arena, parent, key, pos)
        })
    }

    /// As [`Self::map_insert`], with the key given as an arena reference.
    pub fn map_insert_stored(&mut self, parent: EltId, name: StrRef, child_pos: u32) -> bool {
        let Context {
            elements, index, arena, ..
        } = self;
        let key = arena.get(name);
        let hash = key_hash(parent, key);
        index.insert_or_replace(hash, child_pos, |pos| {
            key_matches(elements, arena, parent, key, pos)
        })
    }

    /// Drop the index entry for the `Key` child named `key` of map `parent` and return the
    /// position it pointed to.
    pub fn map_remove(&mut self, parent: EltId, key: &str) -> Option<u32> {
        let hash = key_hash(parent, key);
        let Context {
            elements, index, arena, ..
        } = self;
        index.remove(hash, |pos| key_matches(elements, arena, parent, key, pos))
    }

    /// As [`Self::map_remove`], with the key given as an arena reference.
    pub fn map_remove_stored(&mut self, parent: EltId, name: StrRef) -> Option<u32> {
        let Context {
            elements, index, arena, ..
        } = self;
        let key = arena.get(name);
        let hash = key_hash(parent, key);
        index.remove(hash, |pos| key_matches(elements, arena, parent, key, pos))
    }
}

/// Hash for the map index: the parent index is XORed in, so a confirmed match pins down the
/// `(parent, position)` pair without storing the parent in the table.
fn key_hash(parent: EltId, key: &str) -> u32 {
    let hash = parent ^ wyhash::hash(key.as_bytes()) as u32;
    if hash < FIRST_VALID {
        hash + FIRST_VALID
    } else {
        hash
    }
}

/// Whether child `pos` of map `parent` is a live `Key` whose name bytes equal `key`.
fn key_matches(elements: &[Element], arena: &Arena, parent: EltId, key: &str, pos: u32) -> bool {
    let parent_elt = &elements[parent as usize];
    if !matches!(parent_elt, Element::Map { .. }) || pos as usize >= parent_elt.sub_qty() {
        return false;
    }
    match &elements[parent_elt.sub(pos as usize) as usize] {
        Element::Key { name, .. } => arena.get(*name) == key,
        _ => false,
    }
}
