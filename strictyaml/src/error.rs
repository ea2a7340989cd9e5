//! Error types surfaced by parsing, node access and scalar conversion.

use thiserror::Error;

use crate::node::NodeKind;

/// Maximum number of bytes of the offending line copied into a [`ParseError`] snippet.
const SNIPPET_MAX_LEN: usize = 128;

/// An error raised while parsing a document.
///
/// The error carries the 1-based line number of the offending construct and a copy of the
/// beginning of the offending line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}\n  In line {line}: \"{snippet}\"")]
pub struct ParseError {
    /// Human-readable description of the error.
    message: String,
    /// 1-based line number of the offending construct.
    line: u32,
    /// Copy of the offending line, truncated to [`SNIPPET_MAX_LEN`] bytes.
    snippet: String,
}

impl ParseError {
    /// Create an error at `line`, copying the offending line from `rest`.
    ///
    /// `rest` must start at the position to report and extend at least to the end of the line.
    /// The snippet stops at the first end-of-line and is truncated to [`SNIPPET_MAX_LEN`] bytes.
    pub(crate) fn new(message: impl Into<String>, line: u32, rest: &str) -> Self {
        let end = rest.find(['\r', '\n']).unwrap_or(rest.len());
        let mut snippet = String::from(&rest[..end]);
        if snippet.len() > SNIPPET_MAX_LEN {
            let mut cut = SNIPPET_MAX_LEN;
            while !snippet.is_char_boundary(cut) {
                cut -= 1;
            }
            snippet.truncate(cut);
            snippet.push_str("...");
        }
        Self {
            message: message.into(),
            line,
            snippet,
        }
    }

    /// The error message, without the line reference.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The 1-based line number of the offending construct.
    #[must_use]
    pub fn line(&self) -> u32 {
        self.line
    }

    /// The copy of the offending line embedded in the error.
    #[must_use]
    pub fn snippet(&self) -> &str {
        &self.snippet
    }
}

/// An error raised when misusing the node access API.
///
/// Access errors abort the offending call only. The document is left untouched and remains
/// usable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    /// The operation is not defined for the kind of the node it was called on.
    #[error("Access error: '{operation}' cannot be used on a {kind} node")]
    WrongKind {
        /// Name of the rejected operation.
        operation: &'static str,
        /// Kind of the node the operation was attempted on.
        kind: NodeKind,
    },
    /// A sequence was indexed past its end.
    #[error("Access error: index {index} is out of bounds for a sequence of {len} elements")]
    OutOfBounds {
        /// The requested index.
        index: usize,
        /// The length of the sequence.
        len: usize,
    },
    /// An empty string was used as a map key.
    #[error("Access error: empty key is not allowed to access a Map node")]
    EmptyKey,
    /// An insertion would have created a second entry with the same name in a map.
    #[error("Access error: duplicated keys are forbidden and the key '{0}' is already present")]
    DuplicateKey(String),
    /// A pending-key handle was read, or used where only existing nodes are legal.
    #[error("Access error: the key '{0}' does not exist in this Map")]
    PendingKey(String),
    /// A node was reshaped into a kind other than `Map` or `Sequence`.
    #[error("Access error: only the structural kinds Map and Sequence can be created, not {0}")]
    NotStructural(NodeKind),
    /// `pop` was called on an empty sequence.
    #[error("Access error: cannot pop from an empty sequence")]
    EmptySequence,
    /// A scalar codec failed while servicing an access.
    #[error("Access error: conversion failed when accessing {context}: {source}")]
    Convert {
        /// Description of the node the access was performed on.
        context: String,
        /// The underlying codec error.
        source: ConvertError,
    },
}

/// An error raised by a scalar codec.
///
/// Codec errors raised on an access path are wrapped into [`AccessError::Convert`] so that the
/// node context is attached.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Convert error: {message}")]
pub struct ConvertError {
    /// Human-readable description of the conversion failure.
    message: String,
}

impl ConvertError {
    /// Create a conversion error with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The message describing the conversion failure.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}
