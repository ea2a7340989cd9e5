//! The structural emitter.
//!
//! Dumps a tree as a language-neutral structural form used to compare parses against reference
//! outputs: maps as `{'k' : v, ...}`, sequences as `[v, ...]`, scalars double-quoted, absent
//! values as `None`. Comments are not emitted. The walk is an explicit stack so that deep trees
//! cannot overflow the call stack.

use crate::element::Element;
use crate::node::Document;

const INDENT_STEP: &str = "  ";

/// Emitter for the structural comparison form.
///
/// ```
/// # use strictyaml::StructuralEmitter;
/// let doc = strictyaml::parse("foo: 1\nbar: John Doe\n").unwrap();
/// let out = StructuralEmitter::new().dump(&doc);
/// assert_eq!(out, r#"{'foo' : "1", 'bar' : "John Doe"}"#);
/// ```
#[derive(Debug, Default)]
pub struct StructuralEmitter {
    with_indent: bool,
}

/// One pending emission step.
struct DumpItem {
    elt: u32,
    indent: usize,
    /// Set on the second visit of a container, which emits the closing bracket.
    is_end: bool,
    /// Whether a newline-and-indent prefix precedes the element (indent mode only).
    with_prefix: bool,
    is_last: bool,
}

impl StructuralEmitter {
    /// Create an emitter with indentation disabled.
    #[must_use]
    pub fn new() -> Self {
        Self { with_indent: false }
    }

    /// Insert a newline and indentation before each element whose parent has more than one
    /// child.
    pub fn indent(&mut self, with_indent: bool) {
        self.with_indent = with_indent;
    }

    /// Serialize `doc` and return the structural form.
    #[must_use]
    pub fn dump(&self, doc: &Document) -> String {
        let ctx = doc.context();
        let mut out = String::new();
        let mut stack = vec![DumpItem {
            elt: 0,
            indent: 0,
            is_end: false,
            with_prefix: false,
            is_last: true,
        }];

        while let Some(item) = stack.pop() {
            let indent = item.indent;
            let with_prefix = self.with_indent && item.with_prefix;
            let is_last = item.is_last;

            match &ctx.elements[item.elt as usize] {
                Element::Key { name, child, .. } => {
                    if !name.is_empty_str() {
                        if with_prefix {
                            prefix(&mut out, indent);
                        }
                        out.push('\'');
                        out.push_str(ctx.arena.get(*name));
                        out.push_str("' : ");
                    }
                    if *child != 0 {
                        stack.push(DumpItem {
                            elt: *child,
                            indent,
                            is_end: false,
                            with_prefix: false,
                            is_last,
                        });
                    } else {
                        out.push_str("None");
                        separator(&mut out, is_last, self.with_indent);
                    }
                }

                Element::Sequence { subs } | Element::Map { subs } => {
                    let is_map = matches!(ctx.elements[item.elt as usize], Element::Map { .. });
                    if item.is_end {
                        if with_prefix {
                            prefix(&mut out, indent);
                        }
                        out.push(if is_map { '}' } else { ']' });
                        separator(&mut out, is_last, self.with_indent);
                    } else {
                        let is_one_liner = subs.len() <= 1;
                        stack.push(DumpItem {
                            elt: item.elt,
                            indent,
                            is_end: true,
                            with_prefix: !is_one_liner,
                            is_last,
                        });
                        if with_prefix {
                            prefix(&mut out, indent);
                        }
                        out.push(if is_map { '{' } else { '[' });
                        // Comments emit nothing here: the last emitting child is the last
                        // non-comment one, which must not be followed by a separator.
                        let last_visible = subs
                            .iter()
                            .rposition(|&sub| {
                                !matches!(ctx.elements[sub as usize], Element::Comment { .. })
                            })
                            .unwrap_or(0);
                        for (i, &sub) in subs.iter().enumerate().rev() {
                            stack.push(DumpItem {
                                elt: sub,
                                indent: indent + 1,
                                is_end: false,
                                with_prefix: !is_one_liner,
                                is_last: i >= last_visible,
                            });
                        }
                    }
                }

                Element::Value { text, .. } => {
                    if with_prefix {
                        prefix(&mut out, indent);
                    }
                    if text.is_empty_str() {
                        out.push_str("None");
                    } else {
                        out.push('"');
                        escape_double_quoted(&mut out, ctx.arena.get(*text));
                        out.push('"');
                    }
                    separator(&mut out, is_last, self.with_indent);
                }

                Element::Comment { .. } => {
                    // No comments in the structural form.
                }

                Element::Unknown => {
                    if with_prefix {
                        prefix(&mut out, indent);
                    }
                    out.push_str("None");
                    separator(&mut out, is_last, self.with_indent);
                }
            }
        }

        // A comment trailing a container leaves a dangling separator behind.
        if out.ends_with(", ") {
            out.truncate(out.len() - 2);
        } else if out.ends_with(',') {
            out.truncate(out.len() - 1);
        }
        out
    }
}

fn prefix(out: &mut String, indent: usize) {
    out.push('\n');
    for _ in 0..indent {
        out.push_str(INDENT_STEP);
    }
}

fn separator(out: &mut String, is_last: bool, with_indent: bool) {
    if !is_last {
        out.push(',');
        if !with_indent {
            out.push(' ');
        }
    }
}

/// Escape a scalar for the double-quoted structural form.
///
/// Backslashes are doubled unless they introduce a `\u`, `\U` or `\x` escape, which are kept
/// as-is so that the output stays evaluable by consumers interpreting those escapes.
pub(crate) fn escape_double_quoted(out: &mut String, text: &str) {
    let bytes = text.as_bytes();
    let mut last = 0;
    for (i, &b) in bytes.iter().enumerate() {
        let replacement: &str = match b {
            b'"' => "\\\"",
            b'\n' => "\\n",
            b'\r' => "\\r",
            b'\t' => "\\t",
            b'\\' => {
                if matches!(bytes.get(i + 1), Some(&(b'u' | b'U' | b'x'))) {
                    "\\"
                } else {
                    "\\\\"
                }
            }
            _ => continue,
        };
        out.push_str(&text[last..i]);
        out.push_str(replacement);
        last = i + 1;
    }
    out.push_str(&text[last..]);
}
