// Copyright 2025, the strictyaml developers.
// See the LICENSE file at the top-level directory of this distribution.

//! A StrictYAML-like parser and emitter in pure Rust.
//!
//! This crate ingests a restricted, strongly-typed subset of YAML and produces a mutable
//! in-memory tree. The tree emits back either as YAML (round-trippable, preserving key order
//! and comments) or as a serialized structural form suitable for comparison with reference
//! outputs. All scalar values are strings; schema tagging, anchors/aliases, flow style,
//! document streams and complex keys are excluded by design.
//!
//! # Usage
//!
//! Parse a string into a [`Document`], inspect it through [`Node`] handles, and serialize it
//! back:
//!
//! ```
//! let doc = strictyaml::parse("retries: 3\nname: John Doe # owner\n").unwrap();
//! let root = doc.root();
//! assert_eq!(root.get("retries").unwrap().decode::<u32>().unwrap(), 3);
//! assert_eq!(root.get("name").unwrap().as_str().unwrap(), "John Doe");
//! assert_eq!(doc.as_yaml(), "retries: 3\nname: John Doe # owner");
//! ```
//!
//! Documents are mutable through [`NodeMut`] handles. Indexing a map with an absent key yields
//! a *pending-key* handle which materializes the entry on assignment:
//!
//! ```
//! # use strictyaml::NodeKind;
//! let mut doc = strictyaml::Document::new();
//! doc.root_mut().set_kind(NodeKind::Map).unwrap();
//! doc.root_mut().get_mut("retries").unwrap().set(3_u32).unwrap();
//! assert_eq!(doc.as_yaml(), "retries: 3");
//! ```
//!
//! # Memory model
//!
//! All strings of a document live in one append-only arena and all nodes in one element store;
//! handles are 32-bit indices and stay valid for the life of the document. Map entries are
//! additionally indexed by an 8-way cache-line-associative hash table, making key lookup,
//! insertion and removal O(1). Memory stays within a small multiple of the input size and is
//! released when the [`Document`] is dropped.
//!
//! # Errors
//!
//! The crate distinguishes [`ParseError`] (malformed input, aborts the parse), [`AccessError`]
//! (API misuse, aborts the call and leaves the document usable) and [`ConvertError`] (scalar
//! codec failure, wrapped into [`AccessError`] on access paths).
//!
//! # Features
//!
//! #### `debug_prints`
//! Enables tracing of the token stream on stderr while parsing. Do not enable if you are
//! consuming the crate rather than working on it.

#![warn(missing_docs, clippy::pedantic)]
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss
)]

#[macro_use]
mod debug;
#[macro_use]
mod macros;

mod arena;
mod char_traits;
mod convert;
mod element;
mod emitter;
mod error;
mod loader;
mod map_index;
mod node;
mod scanner;
mod structural;
mod wyhash;

pub use crate::convert::{DecodeScalar, EncodeScalar};
pub use crate::emitter::YamlEmitter;
pub use crate::error::{AccessError, ConvertError, ParseError};
pub use crate::loader::parse;
pub use crate::node::{Document, Node, NodeIter, NodeKind, NodeMut};
pub use crate::structural::StructuralEmitter;
