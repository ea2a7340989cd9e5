//! The YAML emitter.
//!
//! Walks the tree in stored order and writes round-trippable YAML: key order is preserved,
//! comments are reattached where they were read, and every scalar is written in a style that
//! parses back to the same bytes. Parsing the output and emitting again produces byte-identical
//! text.

use crate::char_traits::is_valid_literal_block_scalar;
use crate::element::{Element, NO_ELT};
use crate::node::{Document, NodeKind};
use crate::structural::escape_double_quoted;

const INDENT_STEP: &str = "  ";

/// Scalar style retained for one emitted value.
enum Style {
    Plain,
    SingleQuoted,
    DoubleQuoted,
    Literal,
}

/// One pending emission step.
struct DumpItem {
    elt: u32,
    indent: usize,
    parent_kind: NodeKind,
}

/// The YAML serializer.
///
/// ```
/// # use strictyaml::YamlEmitter;
/// let doc = strictyaml::parse("foo: 1 # hello\n").unwrap();
/// let out = YamlEmitter::new().dump(&doc);
/// assert_eq!(out, "foo: 1 # hello");
/// ```
#[derive(Debug, Default)]
pub struct YamlEmitter {
    literal_blocks: bool,
}

impl YamlEmitter {
    /// Create an emitter with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            literal_blocks: false,
        }
    }

    /// Render scalars containing interior newlines as literal blocks (`|2`) instead of
    /// double-quoted strings.
    pub fn literal_blocks(&mut self, literal_blocks: bool) {
        self.literal_blocks = literal_blocks;
    }

    /// Serialize `doc` and return the YAML text.
    #[must_use]
    #[allow(clippy::too_many_lines)]
    pub fn dump(&self, doc: &Document) -> String {
        let ctx = doc.context();
        let mut out = String::new();
        let mut is_first = true;
        let mut last_is_comment = false;
        let mut last_is_key = false;
        let mut stack = vec![DumpItem {
            elt: 0,
            indent: 0,
            parent_kind: ctx.elements[0].kind(),
        }];

        while let Some(item) = stack.pop() {
            let mut indent = item.indent;
            let parent_kind = item.parent_kind;

            match &ctx.elements[item.elt as usize] {
                Element::Key { name, child, .. } => {
                    if !name.is_empty_str() {
                        if parent_kind == NodeKind::Sequence {
                            // First entry of a map in a sequence: inline after the `- `.
                            indent += 1;
                        } else {
                            if !is_first {
                                out.push('\n');
                            }
                            push_indent(&mut out, indent);
                        }
                        out.push_str(ctx.arena.get(*name));
                        out.push(':');
                        indent += 1;
                        is_first = false;
                    }
                    if *child != NO_ELT {
                        stack.push(DumpItem {
                            elt: *child,
                            indent,
                            parent_kind: NodeKind::Key,
                        });
                    }
                    last_is_key = true;
                }

                Element::Sequence { subs } => {
                    if parent_kind == NodeKind::Sequence {
                        if !is_first {
                            out.push('\n');
                        }
                        push_indent(&mut out, indent);
                        out.push_str("- ");
                        indent += 1;
                        is_first = false;
                    }
                    for &sub in subs.iter().rev() {
                        stack.push(DumpItem {
                            elt: sub,
                            indent,
                            parent_kind: NodeKind::Sequence,
                        });
                    }
                }

                Element::Map { subs } => {
                    if parent_kind == NodeKind::Sequence {
                        if !is_first {
                            out.push('\n');
                        }
                        push_indent(&mut out, indent);
                        out.push_str("- ");
                        indent += 1;
                        is_first = false;
                    }
                    for &sub in subs.iter().rev() {
                        stack.push(DumpItem {
                            elt: sub,
                            indent,
                            parent_kind: NodeKind::Map,
                        });
                    }
                    if parent_kind == NodeKind::Sequence && !subs.is_empty() {
                        // The first entry rides the `- ` line.
                        let first_entry = stack.last_mut().unwrap();
                        first_entry.indent -= 1;
                        first_entry.parent_kind = NodeKind::Sequence;
                    }
                }

                Element::Value { text, .. } => {
                    if parent_kind != NodeKind::Key || last_is_comment {
                        if !is_first {
                            out.push('\n');
                        }
                        push_indent(&mut out, indent);
                        if parent_kind == NodeKind::Sequence {
                            out.push_str("- ");
                        }
                        is_first = false;
                    }
                    if parent_kind == NodeKind::Sequence {
                        indent += 1;
                    }
                    if !text.is_empty_str() {
                        let scalar = ctx.arena.get(*text);
                        match self.choose_style(scalar) {
                            Style::Plain => {
                                if last_is_key && !is_first {
                                    out.push(' ');
                                }
                                out.push_str(scalar);
                            }
                            Style::SingleQuoted => {
                                if last_is_key && !is_first {
                                    out.push(' ');
                                }
                                out.push('\'');
                                for c in scalar.chars() {
                                    if c == '\'' {
                                        out.push_str("''");
                                    } else {
                                        out.push(c);
                                    }
                                }
                                out.push('\'');
                            }
                            Style::DoubleQuoted => {
                                if last_is_key && !is_first {
                                    out.push(' ');
                                }
                                out.push('"');
                                escape_double_quoted(&mut out, scalar);
                                out.push('"');
                            }
                            Style::Literal => {
                                if last_is_key && !is_first {
                                    out.push(' ');
                                }
                                out.push_str("|2");
                                let body = if let Some(stripped) = scalar.strip_suffix('\n') {
                                    out.push('+');
                                    stripped
                                } else {
                                    out.push('-');
                                    scalar
                                };
                                for line in body.split('\n') {
                                    out.push('\n');
                                    push_indent(&mut out, indent);
                                    out.push_str(line);
                                }
                            }
                        }
                        is_first = false;
                    }
                }

                Element::Comment { text, standalone, .. } => {
                    if *standalone {
                        if !is_first {
                            out.push('\n');
                        }
                        push_indent(&mut out, indent);
                    } else {
                        out.push(' ');
                    }
                    out.push('#');
                    out.push_str(ctx.arena.get(*text));
                    last_is_comment = true;
                    is_first = false;
                }

                Element::Unknown => {
                    if parent_kind != NodeKind::Key {
                        if !is_first {
                            out.push('\n');
                        }
                        push_indent(&mut out, indent);
                        if parent_kind == NodeKind::Sequence {
                            out.push_str("- ");
                            indent += 1;
                        }
                        is_first = false;
                    }
                }
            }

            let elt_kind = ctx.elements[item.elt as usize].kind();
            if elt_kind != NodeKind::Comment {
                last_is_comment = false;
            }
            if elt_kind != NodeKind::Key {
                last_is_key = false;
            }

            // Piggybacked comments follow their host element.
            let mut next = ctx.elements[item.elt as usize].next_comment();
            while next != NO_ELT {
                let Element::Comment {
                    text,
                    standalone,
                    next: chained,
                } = &ctx.elements[next as usize]
                else {
                    break;
                };
                if last_is_comment || *standalone {
                    if !is_first {
                        out.push('\n');
                    }
                    push_indent(&mut out, indent);
                } else {
                    out.push(' ');
                }
                out.push('#');
                out.push_str(ctx.arena.get(*text));
                next = *chained;
                last_is_comment = true;
                is_first = false;
            }
        }

        out
    }

    /// Pick the emitted style of a scalar.
    ///
    /// In order: plain when nothing in the string could be re-tokenized as structure (no leading
    /// indicator, no leading `- `, no trailing space, no key-like `:`, no comment-like ` #`, no
    /// tab, CR or newline); single-quoted when there is no line break; double-quoted otherwise.
    /// With
    /// [`Self::literal_blocks`] enabled, strings whose newlines are not all trailing use the
    /// literal block form instead.
    fn choose_style(&self, scalar: &str) -> Style {
        let bytes = scalar.as_bytes();
        let mut plain =
            !matches!(bytes[0], b' ' | b'>' | b'|' | b'\'' | b'"') && bytes[bytes.len() - 1] != b' ';
        // A leading `- ` (or a lone `-`) would be re-tokenized as a sequence entry.
        if bytes[0] == b'-' && (bytes.len() == 1 || bytes[1] == b' ') {
            plain = false;
        }
        let mut newline_count = 0_usize;
        let mut has_carriage_return = false;
        for (i, &c) in bytes.iter().enumerate() {
            if c == b'\n' {
                newline_count += 1;
            }
            if c == b'\r' {
                has_carriage_return = true;
            }
            if plain {
                match c {
                    b'\t' | b'\r' | b'\n' => plain = false,
                    b':' if i + 1 >= bytes.len()
                        || matches!(bytes[i + 1], b' ' | b'\r' | b'\n') =>
                    {
                        plain = false;
                    }
                    b'#' if i == 0 || bytes[i - 1] == b' ' => plain = false,
                    _ => {}
                }
            }
        }
        if plain {
            return Style::Plain;
        }
        if newline_count == 0 && !has_carriage_return {
            // A raw CR inside single quotes would be read back as a line break.
            return Style::SingleQuoted;
        }
        if self.literal_blocks && is_valid_literal_block_scalar(scalar) {
            // Count the newlines not part of the trailing run; only those warrant a block.
            let mut interior = newline_count;
            let mut i = bytes.len();
            while i > 0 && bytes[i - 1] == b'\n' {
                interior -= 1;
                i -= 1;
                if i > 0 && bytes[i - 1] == b'\r' {
                    i -= 1;
                }
            }
            if interior > 0 {
                return Style::Literal;
            }
        }
        Style::DoubleQuoted
    }
}

fn push_indent(out: &mut String, indent: usize) {
    for _ in 0..indent {
        out.push_str(INDENT_STEP);
    }
}
