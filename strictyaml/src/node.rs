//! The document and its typed access façade.
//!
//! A [`Document`] owns the whole storage of one tree. Handles over nodes come in two flavors,
//! following the borrow each requires: [`Node`] wraps a shared borrow and only reads, while
//! [`NodeMut`] wraps an exclusive borrow and mutates. Both are cheap, non-owning and are
//! invalidated by dropping the document.
//!
//! Indexing a map with a key that does not exist does not fail: it yields a *pending-key*
//! handle remembering the map and the requested name. Reading a pending handle yields "absent"
//! (or a caller-supplied default); assigning through a mutable pending handle materializes the
//! key.

use std::fmt;

use crate::convert::{DecodeScalar, EncodeScalar};
use crate::element::{Context, Element, EltId, NO_ELT};
use crate::emitter::YamlEmitter;
use crate::error::AccessError;
use crate::structural::StructuralEmitter;

/// The public kind of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// A parsed placeholder with no content (a key without a value, an empty sequence slot).
    Unknown,
    /// A map entry, holding a name and at most one value.
    Key,
    /// A scalar string.
    Value,
    /// An ordered list.
    Sequence,
    /// An ordered, uniquely-keyed mapping.
    Map,
    /// A comment.
    Comment,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NodeKind::Unknown => "Unknown",
            NodeKind::Key => "Key",
            NodeKind::Value => "Value",
            NodeKind::Sequence => "Sequence",
            NodeKind::Map => "Map",
            NodeKind::Comment => "Comment",
        })
    }
}

/// A read-only handle over a node of a [`Document`].
#[derive(Debug, Clone)]
pub struct Node<'doc> {
    idx: EltId,
    ctx: &'doc Context,
    pending_key: Option<String>,
}

impl<'doc> Node<'doc> {
    pub(crate) fn new(idx: EltId, ctx: &'doc Context) -> Self {
        Self {
            idx,
            ctx,
            pending_key: None,
        }
    }

    fn elt(&self) -> &'doc Element {
        &self.ctx.elements[self.idx as usize]
    }

    /// The kind of this node. Placeholders read as [`NodeKind::Value`] (an absent value decodes
    /// as the empty string).
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        match self.elt().kind() {
            NodeKind::Unknown => NodeKind::Value,
            kind => kind,
        }
    }

    define_is!(is_key, NodeKind::Key);
    define_is!(is_value, NodeKind::Value);
    define_is!(is_sequence, NodeKind::Sequence);
    define_is!(is_map, NodeKind::Map);
    define_is!(is_comment, NodeKind::Comment);

    /// Whether the node refers to an existing element; `false` for pending-key handles.
    #[must_use]
    pub fn is_present(&self) -> bool {
        !(matches!(self.elt(), Element::Map { .. }) && self.pending_key.is_some())
    }

    /// The name of a `Key` node.
    ///
    /// # Errors
    /// Returns [`AccessError::WrongKind`] if the node is not a `Key`.
    pub fn key_name(&self) -> Result<&'doc str, AccessError> {
        match self.elt() {
            Element::Key { name, .. } => Ok(self.ctx.arena.get(*name)),
            _ => Err(self.wrong_kind("key_name")),
        }
    }

    /// Unwrap a `Key` to its value node; any other node is returned unchanged.
    #[must_use]
    pub fn value(&self) -> Node<'doc> {
        match self.elt() {
            Element::Key { child, .. } if *child != NO_ELT => Node::new(*child, self.ctx),
            _ => Node::new(self.idx, self.ctx),
        }
    }

    /// Number of children of a container.
    ///
    /// # Errors
    /// Returns [`AccessError::WrongKind`] if the node is not a `Map` or a `Sequence`.
    pub fn size(&self) -> Result<usize, AccessError> {
        match self.elt() {
            Element::Sequence { subs } | Element::Map { subs } => Ok(subs.len()),
            _ => Err(self.wrong_kind("size")),
        }
    }

    /// The `idx`-th element of a sequence.
    ///
    /// # Errors
    /// Returns [`AccessError::WrongKind`] on non-sequences and [`AccessError::OutOfBounds`] past
    /// the end.
    pub fn at(&self, idx: usize) -> Result<Node<'doc>, AccessError> {
        match self.elt() {
            Element::Sequence { subs } => subs.get(idx).map_or(
                Err(AccessError::OutOfBounds {
                    index: idx,
                    len: subs.len(),
                }),
                |&child| Ok(Node::new(child, self.ctx)),
            ),
            _ => Err(self.wrong_kind("at")),
        }
    }

    /// The value node stored under `key`, or a pending-key handle when the key is absent.
    ///
    /// # Errors
    /// Returns [`AccessError::WrongKind`] on non-maps, [`AccessError::EmptyKey`] for an empty
    /// key and [`AccessError::PendingKey`] when called on a pending handle.
    pub fn get(&self, key: &str) -> Result<Node<'doc>, AccessError> {
        self.check_map_access("get", key)?;
        match self.ctx.map_find(self.idx, key) {
            Some(pos) => {
                let entry = self.elt().sub(pos as usize);
                Ok(Node::new(self.ctx.elements[entry as usize].key_child(), self.ctx))
            }
            None => Ok(Node {
                idx: self.idx,
                ctx: self.ctx,
                pending_key: Some(key.to_owned()),
            }),
        }
    }

    /// Whether the map holds an entry named `key`.
    ///
    /// # Errors
    /// Returns [`AccessError::WrongKind`] on non-maps and [`AccessError::EmptyKey`] for an empty
    /// key.
    pub fn has_key(&self, key: &str) -> Result<bool, AccessError> {
        if !matches!(self.elt(), Element::Map { .. }) {
            return Err(self.wrong_kind("has_key"));
        }
        if key.is_empty() {
            return Err(AccessError::EmptyKey);
        }
        Ok(self.ctx.map_find(self.idx, key).is_some())
    }

    /// Iterate over the children of a container, in stored order.
    ///
    /// Map iteration yields the `Key` nodes (and any comments interleaved in the map).
    ///
    /// # Errors
    /// Returns [`AccessError::WrongKind`] if the node is not a `Map` or a `Sequence`.
    pub fn iter(&self) -> Result<NodeIter<'doc>, AccessError> {
        match self.elt() {
            Element::Sequence { subs } | Element::Map { subs } => Ok(NodeIter {
                subs: subs.iter(),
                ctx: self.ctx,
            }),
            _ => Err(self.wrong_kind("iter")),
        }
    }

    /// Decode the scalar through `T`'s [`DecodeScalar`] codec.
    ///
    /// A placeholder node decodes from the empty string.
    ///
    /// # Errors
    /// Returns [`AccessError::PendingKey`] on pending handles, [`AccessError::WrongKind`] on
    /// non-scalars, and [`AccessError::Convert`] when the codec rejects the string.
    pub fn decode<T: DecodeScalar>(&self) -> Result<T, AccessError> {
        if let Some(key) = &self.pending_key {
            if matches!(self.elt(), Element::Map { .. }) {
                return Err(AccessError::PendingKey(key.clone()));
            }
        }
        T::decode(self.scalar_str("decode")?).map_err(|source| AccessError::Convert {
            context: self.describe(),
            source,
        })
    }

    /// As [`Self::decode`], but a pending-key handle yields `default` instead of failing.
    ///
    /// # Errors
    /// As [`Self::decode`], except for the pending case.
    pub fn decode_or<T: DecodeScalar>(&self, default: T) -> Result<T, AccessError> {
        if self.pending_key.is_some() && matches!(self.elt(), Element::Map { .. }) {
            return Ok(default);
        }
        self.decode()
    }

    /// Borrow the scalar bytes without copying.
    ///
    /// # Errors
    /// Returns [`AccessError::PendingKey`] on pending handles and [`AccessError::WrongKind`] on
    /// non-scalars.
    pub fn as_str(&self) -> Result<&'doc str, AccessError> {
        if let Some(key) = &self.pending_key {
            if matches!(self.elt(), Element::Map { .. }) {
                return Err(AccessError::PendingKey(key.clone()));
            }
        }
        self.scalar_str("as_str")
    }

    fn scalar_str(&self, operation: &'static str) -> Result<&'doc str, AccessError> {
        match self.elt() {
            Element::Value { text, .. } => Ok(self.ctx.arena.get(*text)),
            Element::Unknown => Ok(""),
            _ => Err(self.wrong_kind(operation)),
        }
    }

    fn check_map_access(&self, operation: &'static str, key: &str) -> Result<(), AccessError> {
        if !matches!(self.elt(), Element::Map { .. }) {
            return Err(self.wrong_kind(operation));
        }
        if key.is_empty() {
            return Err(AccessError::EmptyKey);
        }
        if let Some(pending) = &self.pending_key {
            return Err(AccessError::PendingKey(pending.clone()));
        }
        Ok(())
    }

    fn wrong_kind(&self, operation: &'static str) -> AccessError {
        AccessError::WrongKind {
            operation,
            kind: self.elt().kind(),
        }
    }

    /// Short description of the node, used as context in conversion errors.
    fn describe(&self) -> String {
        match self.elt() {
            Element::Unknown => String::from("[ Unknown ]"),
            Element::Key { name, .. } => {
                if name.is_empty_str() {
                    String::from("[ Root ]")
                } else {
                    format!("[ Key '{}' ]", self.ctx.arena.get(*name))
                }
            }
            Element::Value { text, .. } => format!("[ Value string '{}' ]", self.ctx.arena.get(*text)),
            Element::Sequence { subs } => format!("[ Sequence of {} elements ]", subs.len()),
            Element::Map { subs } => format!("[ Map of {} elements ]", subs.len()),
            Element::Comment { text, .. } => format!("[ Comment '{}' ]", self.ctx.arena.get(*text)),
        }
    }
}

/// Iterator over the children of a container node.
pub struct NodeIter<'doc> {
    subs: std::slice::Iter<'doc, EltId>,
    ctx: &'doc Context,
}

impl<'doc> Iterator for NodeIter<'doc> {
    type Item = Node<'doc>;

    fn next(&mut self) -> Option<Node<'doc>> {
        self.subs.next().map(|&idx| Node::new(idx, self.ctx))
    }
}

/// A mutating handle over a node of a [`Document`].
///
/// Navigation methods (`value_mut`, `at_mut`, `get_mut`) consume the handle, as only one
/// exclusive borrow of the document can exist at a time.
#[derive(Debug)]
pub struct NodeMut<'doc> {
    idx: EltId,
    ctx: &'doc mut Context,
    pending_key: Option<String>,
}

impl<'doc> NodeMut<'doc> {
    pub(crate) fn new(idx: EltId, ctx: &'doc mut Context) -> Self {
        Self {
            idx,
            ctx,
            pending_key: None,
        }
    }

    /// A read-only view of this node.
    #[must_use]
    pub fn as_node(&self) -> Node<'_> {
        Node {
            idx: self.idx,
            ctx: self.ctx,
            pending_key: self.pending_key.clone(),
        }
    }

    /// See [`Node::kind`].
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        self.as_node().kind()
    }

    define_is!(is_key, NodeKind::Key);
    define_is!(is_value, NodeKind::Value);
    define_is!(is_sequence, NodeKind::Sequence);
    define_is!(is_map, NodeKind::Map);
    define_is!(is_comment, NodeKind::Comment);

    /// See [`Node::is_present`].
    #[must_use]
    pub fn is_present(&self) -> bool {
        self.as_node().is_present()
    }

    /// See [`Node::size`].
    ///
    /// # Errors
    /// As [`Node::size`].
    pub fn size(&self) -> Result<usize, AccessError> {
        self.as_node().size()
    }

    /// See [`Node::decode`].
    ///
    /// # Errors
    /// As [`Node::decode`].
    pub fn decode<T: DecodeScalar>(&self) -> Result<T, AccessError> {
        self.as_node().decode()
    }

    fn elt(&self) -> &Element {
        &self.ctx.elements[self.idx as usize]
    }

    fn wrong_kind(&self, operation: &'static str) -> AccessError {
        AccessError::WrongKind {
            operation,
            kind: self.elt().kind(),
        }
    }

    fn encode_value<T: EncodeScalar>(&self, value: &T) -> Result<String, AccessError> {
        value.encode().map_err(|source| AccessError::Convert {
            context: self.as_node().describe(),
            source,
        })
    }

    /// Write a scalar into this node.
    ///
    /// A `Value` is rewritten in place; a pending-key handle materializes the key and its value
    /// in the map; any other node (including containers) is converted into a `Value`. Writing to
    /// the childless root key of an empty document creates the document root.
    ///
    /// # Errors
    /// Returns [`AccessError::Convert`] when encoding fails and [`AccessError::DuplicateKey`]
    /// when a pending key was created in the meantime.
    pub fn set<T: EncodeScalar>(&mut self, value: T) -> Result<(), AccessError> {
        let encoded = self.encode_value(&value)?;
        match self.elt().kind() {
            NodeKind::Value => {
                let comment = self.elt().next_comment();
                let text = self.ctx.arena.push(&encoded);
                self.ctx.elements[self.idx as usize] = Element::Value { text, comment };
            }
            NodeKind::Map if self.pending_key.is_some() => {
                self.materialize_pending(|ctx| {
                    let text = ctx.arena.push(&encoded);
                    ctx.push(Element::Value {
                        text,
                        comment: NO_ELT,
                    })
                })?;
            }
            NodeKind::Key => {
                if self.elt().key_child() != NO_ELT {
                    return Err(self.wrong_kind("set"));
                }
                let text = self.ctx.arena.push(&encoded);
                let value = self.ctx.push(Element::Value {
                    text,
                    comment: NO_ELT,
                });
                self.ctx.elements[self.idx as usize].add(value);
            }
            _ => {
                // Turn the node into a string value.
                let text = self.ctx.arena.push(&encoded);
                self.ctx.elements[self.idx as usize] = Element::Value {
                    text,
                    comment: NO_ELT,
                };
            }
        }
        Ok(())
    }

    /// Reshape this node into an empty `Map` or `Sequence`.
    ///
    /// On a pending-key handle, the key is materialized with the new container as its value. On
    /// a key, the key's value is replaced (created for the childless root of an empty document).
    ///
    /// # Errors
    /// Returns [`AccessError::NotStructural`] for kinds other than `Map`/`Sequence` and
    /// [`AccessError::DuplicateKey`] when a pending key was created in the meantime.
    pub fn set_kind(&mut self, kind: NodeKind) -> Result<(), AccessError> {
        if kind != NodeKind::Map && kind != NodeKind::Sequence {
            return Err(AccessError::NotStructural(kind));
        }
        let empty = move || {
            if kind == NodeKind::Map {
                Element::Map { subs: Vec::new() }
            } else {
                Element::Sequence { subs: Vec::new() }
            }
        };
        match self.elt().kind() {
            NodeKind::Map if self.pending_key.is_some() => {
                self.materialize_pending(|ctx| ctx.push(empty()))?;
            }
            NodeKind::Key => {
                let child = self.elt().key_child();
                if child == NO_ELT {
                    let container = self.ctx.push(empty());
                    self.ctx.elements[self.idx as usize].add(container);
                } else {
                    self.ctx.elements[child as usize] = empty();
                }
            }
            _ => {
                self.ctx.elements[self.idx as usize] = empty();
            }
        }
        Ok(())
    }

    /// Create the pending key of this handle, with its value built by `make_value`.
    fn materialize_pending(
        &mut self,
        make_value: impl FnOnce(&mut Context) -> EltId,
    ) -> Result<(), AccessError> {
        let key = self.pending_key.clone().unwrap();
        if self.ctx.map_find(self.idx, &key).is_some() {
            return Err(AccessError::DuplicateKey(key));
        }
        let value = make_value(self.ctx);
        let name = self.ctx.arena.push(&key);
        let entry = self.ctx.push(Element::Key {
            name,
            child: value,
            comment: NO_ELT,
        });
        self.ctx.elements[self.idx as usize].add(entry);
        let pos = (self.ctx.elements[self.idx as usize].sub_qty() - 1) as u32;
        self.ctx.map_insert(self.idx, &key, pos);
        self.pending_key = None;
        Ok(())
    }

    /// Append a scalar to a sequence.
    ///
    /// # Errors
    /// Returns [`AccessError::WrongKind`] on non-sequences and [`AccessError::Convert`] when
    /// encoding fails.
    pub fn push<T: EncodeScalar>(&mut self, value: T) -> Result<(), AccessError> {
        if !matches!(self.elt(), Element::Sequence { .. }) {
            return Err(self.wrong_kind("push"));
        }
        let encoded = self.encode_value(&value)?;
        let text = self.ctx.arena.push(&encoded);
        let elt = self.ctx.push(Element::Value {
            text,
            comment: NO_ELT,
        });
        self.ctx.elements[self.idx as usize].add(elt);
        Ok(())
    }

    /// Append an empty container to a sequence.
    ///
    /// # Errors
    /// Returns [`AccessError::NotStructural`] for non-structural kinds and
    /// [`AccessError::WrongKind`] on non-sequences.
    pub fn push_kind(&mut self, kind: NodeKind) -> Result<(), AccessError> {
        let elt = self.new_container("push_kind", kind)?;
        self.ctx.elements[self.idx as usize].add(elt);
        Ok(())
    }

    /// Insert a scalar at position `idx` of a sequence, shifting the tail.
    ///
    /// # Errors
    /// As [`Self::push`], plus [`AccessError::OutOfBounds`] when `idx > size`.
    pub fn insert<T: EncodeScalar>(&mut self, idx: usize, value: T) -> Result<(), AccessError> {
        self.check_insert_bounds("insert", idx)?;
        let encoded = self.encode_value(&value)?;
        let text = self.ctx.arena.push(&encoded);
        let elt = self.ctx.push(Element::Value {
            text,
            comment: NO_ELT,
        });
        self.ctx.elements[self.idx as usize].insert_at(idx, elt);
        Ok(())
    }

    /// Insert an empty container at position `idx` of a sequence, shifting the tail.
    ///
    /// # Errors
    /// As [`Self::push_kind`], plus [`AccessError::OutOfBounds`] when `idx > size`.
    pub fn insert_kind(&mut self, idx: usize, kind: NodeKind) -> Result<(), AccessError> {
        self.check_insert_bounds("insert_kind", idx)?;
        let elt = self.new_container("insert_kind", kind)?;
        self.ctx.elements[self.idx as usize].insert_at(idx, elt);
        Ok(())
    }

    /// Unlink the element at position `idx` of a sequence, shifting the tail.
    ///
    /// # Errors
    /// Returns [`AccessError::WrongKind`] on non-sequences and [`AccessError::OutOfBounds`] past
    /// the end.
    pub fn remove(&mut self, idx: usize) -> Result<(), AccessError> {
        match self.elt() {
            Element::Sequence { subs } => {
                if idx >= subs.len() {
                    return Err(AccessError::OutOfBounds {
                        index: idx,
                        len: subs.len(),
                    });
                }
            }
            _ => return Err(self.wrong_kind("remove")),
        }
        self.ctx.elements[self.idx as usize].erase(idx);
        Ok(())
    }

    /// Unlink the last element of a sequence.
    ///
    /// # Errors
    /// Returns [`AccessError::WrongKind`] on non-sequences and [`AccessError::EmptySequence`]
    /// when there is nothing to pop.
    pub fn pop(&mut self) -> Result<(), AccessError> {
        let len = match self.elt() {
            Element::Sequence { subs } => subs.len(),
            _ => return Err(self.wrong_kind("pop")),
        };
        if len == 0 {
            return Err(AccessError::EmptySequence);
        }
        self.ctx.elements[self.idx as usize].erase(len - 1);
        Ok(())
    }

    /// See [`Node::has_key`].
    ///
    /// # Errors
    /// As [`Node::has_key`].
    pub fn has_key(&self, key: &str) -> Result<bool, AccessError> {
        self.as_node().has_key(key)
    }

    /// Insert a new `key` mapping to a scalar into a map.
    ///
    /// # Errors
    /// Returns [`AccessError::WrongKind`] on non-maps, [`AccessError::EmptyKey`],
    /// [`AccessError::DuplicateKey`] when the key exists, and [`AccessError::Convert`] when
    /// encoding fails.
    pub fn insert_key<T: EncodeScalar>(&mut self, key: &str, value: T) -> Result<(), AccessError> {
        self.check_key_insert("insert_key", key)?;
        let encoded = self.encode_value(&value)?;
        let text = self.ctx.arena.push(&encoded);
        let value_elt = self.ctx.push(Element::Value {
            text,
            comment: NO_ELT,
        });
        self.add_key_entry(key, value_elt);
        Ok(())
    }

    /// Insert a new `key` mapping to an empty container into a map.
    ///
    /// # Errors
    /// As [`Self::insert_key`], plus [`AccessError::NotStructural`] for non-structural kinds.
    pub fn insert_key_kind(&mut self, key: &str, kind: NodeKind) -> Result<(), AccessError> {
        self.check_key_insert("insert_key_kind", key)?;
        if kind != NodeKind::Map && kind != NodeKind::Sequence {
            return Err(AccessError::NotStructural(kind));
        }
        let container = if kind == NodeKind::Map {
            self.ctx.push(Element::Map { subs: Vec::new() })
        } else {
            self.ctx.push(Element::Sequence { subs: Vec::new() })
        };
        self.add_key_entry(key, container);
        Ok(())
    }

    /// Unlink the entry named `key` from a map. Returns whether the key was present.
    ///
    /// To keep child positions dense while leaving element indices untouched, the removed entry
    /// is swapped with the last child before popping; the index is patched accordingly.
    ///
    /// # Errors
    /// Returns [`AccessError::WrongKind`] on non-maps.
    pub fn remove_key(&mut self, key: &str) -> Result<bool, AccessError> {
        if !matches!(self.elt(), Element::Map { .. }) {
            return Err(self.wrong_kind("remove_key"));
        }
        let Some(pos) = self.ctx.map_remove(self.idx, key) else {
            return Ok(false);
        };
        let qty = self.ctx.elements[self.idx as usize].sub_qty();
        if (pos as usize) < qty - 1 {
            let last = self.ctx.elements[self.idx as usize].sub(qty - 1);
            let last_name = match &self.ctx.elements[last as usize] {
                Element::Key { name, .. } => Some(*name),
                _ => None,
            };
            if let Some(name) = last_name {
                self.ctx.map_remove_stored(self.idx, name);
                self.ctx.elements[self.idx as usize].replace(pos as usize, last);
                self.ctx.map_insert_stored(self.idx, name, pos);
            } else {
                // A trailing comment child carries no index entry; a plain swap is enough.
                self.ctx.elements[self.idx as usize].replace(pos as usize, last);
            }
        }
        self.ctx.elements[self.idx as usize].erase(qty - 1);
        Ok(true)
    }

    /// Descend into the `idx`-th element of a sequence, consuming this handle.
    ///
    /// # Errors
    /// As [`Node::at`].
    pub fn at_mut(self, idx: usize) -> Result<NodeMut<'doc>, AccessError> {
        let child = match self.elt() {
            Element::Sequence { subs } => match subs.get(idx) {
                Some(&child) => child,
                None => {
                    return Err(AccessError::OutOfBounds {
                        index: idx,
                        len: subs.len(),
                    })
                }
            },
            _ => return Err(self.wrong_kind("at_mut")),
        };
        Ok(NodeMut::new(child, self.ctx))
    }

    /// Descend into the value stored under `key`, consuming this handle. When the key is absent,
    /// the returned handle is a pending-key handle: assigning to it creates the entry.
    ///
    /// # Errors
    /// As [`Node::get`].
    pub fn get_mut(self, key: &str) -> Result<NodeMut<'doc>, AccessError> {
        self.as_node().check_map_access("get_mut", key)?;
        match self.ctx.map_find(self.idx, key) {
            Some(pos) => {
                let entry = self.ctx.elements[self.idx as usize].sub(pos as usize);
                let value = self.ctx.elements[entry as usize].key_child();
                Ok(NodeMut::new(value, self.ctx))
            }
            None => Ok(NodeMut {
                idx: self.idx,
                ctx: self.ctx,
                pending_key: Some(key.to_owned()),
            }),
        }
    }

    /// Unwrap a `Key` to its value node, consuming this handle.
    #[must_use]
    pub fn value_mut(self) -> NodeMut<'doc> {
        match self.ctx.elements[self.idx as usize] {
            Element::Key { child, .. } if child != NO_ELT => NodeMut::new(child, self.ctx),
            _ => self,
        }
    }

    fn check_insert_bounds(&self, operation: &'static str, idx: usize) -> Result<(), AccessError> {
        match self.elt() {
            Element::Sequence { subs } => {
                if idx > subs.len() {
                    Err(AccessError::OutOfBounds {
                        index: idx,
                        len: subs.len(),
                    })
                } else {
                    Ok(())
                }
            }
            _ => Err(self.wrong_kind(operation)),
        }
    }

    fn new_container(
        &mut self,
        operation: &'static str,
        kind: NodeKind,
    ) -> Result<EltId, AccessError> {
        if kind != NodeKind::Map && kind != NodeKind::Sequence {
            return Err(AccessError::NotStructural(kind));
        }
        if !matches!(self.elt(), Element::Sequence { .. }) {
            return Err(self.wrong_kind(operation));
        }
        Ok(if kind == NodeKind::Map {
            self.ctx.push(Element::Map { subs: Vec::new() })
        } else {
            self.ctx.push(Element::Sequence { subs: Vec::new() })
        })
    }

    fn check_key_insert(&self, operation: &'static str, key: &str) -> Result<(), AccessError> {
        self.as_node().check_map_access(operation, key)?;
        if self.ctx.map_find(self.idx, key).is_some() {
            return Err(AccessError::DuplicateKey(key.to_owned()));
        }
        Ok(())
    }

    fn add_key_entry(&mut self, key: &str, value: EltId) {
        let name = self.ctx.arena.push(key);
        let entry = self.ctx.push(Element::Key {
            name,
            child: value,
            comment: NO_ELT,
        });
        self.ctx.elements[self.idx as usize].add(entry);
        let pos = (self.ctx.elements[self.idx as usize].sub_qty() - 1) as u32;
        self.ctx.map_insert(self.idx, key, pos);
    }
}

/// A parsed or programmatically built document.
///
/// The document exclusively owns the storage of its tree (element store, string arena and map
/// index); everything is released when it is dropped.
#[derive(Debug)]
pub struct Document {
    ctx: Context,
}

impl Document {
    /// Create an empty document.
    ///
    /// The document holds only the reserved root key; build content through
    /// [`Self::root_mut`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            ctx: Context::new(1024),
        }
    }

    pub(crate) fn from_context(ctx: Context) -> Self {
        Self { ctx }
    }

    pub(crate) fn context(&self) -> &Context {
        &self.ctx
    }

    /// A read-only handle over the effective document root.
    ///
    /// For an empty document this is the reserved root key itself, which reads as an absent
    /// value.
    #[must_use]
    pub fn root(&self) -> Node<'_> {
        Node::new(self.root_elt(), &self.ctx)
    }

    /// A mutating handle over the effective document root.
    #[must_use]
    pub fn root_mut(&mut self) -> NodeMut<'_> {
        let root = self.root_elt();
        NodeMut::new(root, &mut self.ctx)
    }

    fn root_elt(&self) -> EltId {
        match self.ctx.elements[0] {
            Element::Key { child, .. } if child != NO_ELT => child,
            _ => 0,
        }
    }

    /// Serialize the document as round-trippable YAML, preserving key order and comments.
    #[must_use]
    pub fn as_yaml(&self) -> String {
        YamlEmitter::new().dump(self)
    }

    /// Serialize the document in the structural form used for test comparison.
    #[must_use]
    pub fn as_structural(&self, with_indent: bool) -> String {
        let mut emitter = StructuralEmitter::new();
        emitter.indent(with_indent);
        emitter.dump(self)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
