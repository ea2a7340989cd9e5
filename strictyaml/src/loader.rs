//! The indent-driven tree builder.
//!
//! [`parse`] folds the scanner's token stream into an element graph. The builder is an explicit
//! pushdown automaton rather than a recursive descent: deep documents cannot overflow the call
//! stack, and the token-driven reshaping (`Unknown` coerced to `Map`/`Sequence`, the implicit
//! map of the `- k:` idiom) stays local to one transition.
//!
//! Each stack frame tracks the element it builds, the indentation column it was opened at, and
//! the column its children are aligned on (`-1` until the first child is seen). Every `Key` and
//! every sequence slot pushes an `Unknown` placeholder so that empty values ("a:" with nothing
//! after it) are representable.

use crate::element::{Context, Element, EltId, NO_ELT};
use crate::error::ParseError;
use crate::node::Document;
use crate::scanner::{Scanner, Token, TokenKind};

/// One frame of the builder stack.
#[derive(Debug, Clone, Copy)]
struct Frame {
    elt: EltId,
    /// Column the construct was opened at; `-1` for the root.
    indent: i32,
    /// Column all children must share; `-1` until the first child fixes it.
    child_indent: i32,
}

/// Parse `text` into a [`Document`].
///
/// # Errors
/// Returns a [`ParseError`] carrying the offending line on any syntactic or structural error
/// (bad indentation, tabs in indentation, duplicate keys, unterminated quotes, ...). All
/// partially built state is released.
///
/// # Examples
/// ```
/// let doc = strictyaml::parse("foo: 1\nbar: John Doe\n").unwrap();
/// let root = doc.root();
/// assert_eq!(root.get("foo").unwrap().as_str().unwrap(), "1");
/// ```
pub fn parse(text: &str) -> Result<Document, ParseError> {
    let mut loader = Loader {
        text,
        ctx: Context::new(text.len() + 1),
        stack: vec![Frame {
            elt: 0,
            indent: -1,
            child_indent: -1,
        }],
        token_line: 1,
        token_pos: 0,
    };
    let mut scanner = Scanner::new(text);
    let mut ml_parent_indent = -1;

    loop {
        let at_line_start = scanner.at_line_start();
        let token = scanner.next_token(ml_parent_indent, &mut loader.ctx.arena)?;
        debug_print!(
            "line {}: {:?} at column {} (parent indent {ml_parent_indent})",
            scanner.line(),
            token.kind,
            token.col
        );
        match token.kind {
            TokenKind::Comment => loader.on_comment(&token, at_line_start),
            TokenKind::Caret => {
                ml_parent_indent = token.col;
                loader.on_caret(token.col)?;
            }
            TokenKind::Key => {
                ml_parent_indent = token.col;
                loader.on_key(&token)?;
            }
            TokenKind::Scalar => loader.on_scalar(&token)?,
            TokenKind::Newline => ml_parent_indent = loader.parent().indent,
            TokenKind::Eos => break,
        }
        loader.token_line = scanner.line();
        loader.token_pos = scanner.pos();
        // A completed top-level scalar closes the root frame; anything left is ignored.
        if loader.stack.is_empty() {
            break;
        }
    }

    Ok(Document::from_context(loader.ctx))
}

struct Loader<'input> {
    text: &'input str,
    ctx: Context,
    stack: Vec<Frame>,
    /// Line and byte position of the token being processed, for error reporting.
    token_line: u32,
    token_pos: usize,
}

impl Loader<'_> {
    fn parent(&self) -> Frame {
        *self.stack.last().unwrap()
    }

    fn elt(&self, id: EltId) -> &Element {
        &self.ctx.elements[id as usize]
    }

    fn err(&self, message: String) -> ParseError {
        ParseError::new(message, self.token_line, &self.text[self.token_pos..])
    }

    fn on_comment(&mut self, token: &Token, standalone: bool) {
        let elt = self.ctx.push(Element::Comment {
            text: token.text,
            standalone,
            next: NO_ELT,
        });

        // Attach to the nearest typed ancestor; an `Unknown` frame means its parent frame (a key
        // or a sequence slot owner) hosts the comment.
        let mut target = self.parent().elt;
        if matches!(self.elt(target), Element::Unknown) && self.stack.len() >= 2 {
            target = self.stack[self.stack.len() - 2].elt;
        }
        if matches!(self.elt(target), Element::Unknown) {
            return;
        }
        loop {
            let next = self.elt(target).next_comment();
            if next == NO_ELT {
                break;
            }
            target = next;
        }
        self.ctx.elements[target as usize].set_comment(elt);
    }

    fn on_caret(&mut self, col: i32) -> Result<(), ParseError> {
        // Pop frames the caret is out of. A caret directly below a key ("a:\n- b") binds to that
        // key, whether the top frame is the key itself or its untyped value placeholder.
        loop {
            let parent = self.parent();
            if matches!(self.elt(parent.elt), Element::Key { .. }) && col == parent.indent {
                break;
            }
            if matches!(self.elt(parent.elt), Element::Unknown) && self.stack.len() >= 2 {
                let below = self.stack[self.stack.len() - 2];
                if matches!(self.elt(below.elt), Element::Key { .. }) && col == below.indent {
                    break;
                }
            }
            if col > parent.indent {
                break;
            }
            if parent.child_indent >= 0 && col >= parent.child_indent {
                break;
            }
            self.stack.pop();
            if self.stack.is_empty() {
                return Err(self.err(format!(
                    "Parse error: the indentation of the caret (={col}) does not match any parent"
                )));
            }
        }

        let parent = self.parent();
        if parent.child_indent >= 0 && col != parent.child_indent {
            return Err(self.err(format!(
                "Parse error: the indentation of the caret (={col}) is not aligned with other child elements (={})",
                parent.child_indent
            )));
        }

        if !matches!(self.elt(parent.elt), Element::Sequence { .. }) {
            if matches!(self.elt(parent.elt), Element::Unknown) {
                self.ctx.elements[parent.elt as usize] = Element::Sequence { subs: Vec::new() };
                let depth = self.stack.len();
                let top = self.stack.last_mut().unwrap();
                top.indent = col;
                top.child_indent = col;
                if depth >= 2 && self.stack[depth - 2].child_indent < 0 {
                    self.stack[depth - 2].child_indent = col;
                }
            } else {
                if matches!(self.elt(parent.elt), Element::Key { .. })
                    && self.elt(parent.elt).sub_qty() > 0
                {
                    return Err(self.err(format!(
                        "Parse error: probably bad indentation with caret, as the parent ('{}') already has a value",
                        self.elt(parent.elt).kind()
                    )));
                }
                let seq = self.ctx.push(Element::Sequence { subs: Vec::new() });
                self.ctx.elements[parent.elt as usize].add(seq);
                self.stack.push(Frame {
                    elt: seq,
                    indent: col,
                    child_indent: col,
                });
            }
        }

        // The next slot of the sequence, to be typed by the following token.
        let parent = self.parent();
        let slot = self.ctx.push(Element::Unknown);
        self.ctx.elements[parent.elt as usize].add(slot);
        self.stack.push(Frame {
            elt: slot,
            indent: col,
            child_indent: -1,
        });
        Ok(())
    }

    fn on_key(&mut self, token: &Token) -> Result<(), ParseError> {
        let col = token.col;

        while col <= self.parent().indent {
            self.stack.pop();
            if self.stack.is_empty() {
                return Err(self.err(format!(
                    "Parse error: the indentation of the key (={col}) does not match any parent"
                )));
            }
        }

        let parent = self.parent();
        if parent.child_indent >= 0 && col < parent.child_indent {
            return Err(self.err(format!(
                "Parse error: the indentation of the key (={col}) is not aligned with other child elements (={})",
                parent.child_indent
            )));
        }
        if parent.child_indent < 0 {
            self.stack.last_mut().unwrap().child_indent = col;
        }

        // The `- k:` idiom: a key right after a caret inserts the implied map.
        let parent = self.parent();
        if !matches!(self.elt(parent.elt), Element::Map { .. }) {
            if matches!(self.elt(parent.elt), Element::Unknown) {
                self.ctx.elements[parent.elt as usize] = Element::Map { subs: Vec::new() };
            } else {
                if matches!(self.elt(parent.elt), Element::Key { .. })
                    && self.elt(parent.elt).sub_qty() > 0
                {
                    return Err(self.err(format!(
                        "Parse error: probably bad indentation, as the parent ('{}') already has a value",
                        self.elt(parent.elt).kind()
                    )));
                }
                let map = self.ctx.push(Element::Map { subs: Vec::new() });
                self.ctx.elements[parent.elt as usize].add(map);
                self.stack.push(Frame {
                    elt: map,
                    indent: parent.indent,
                    child_indent: -1,
                });
            }
        }

        let parent = self.parent();
        if parent.child_indent < 0 {
            self.stack.last_mut().unwrap().child_indent = col;
        }
        let key = self.ctx.push(Element::Key {
            name: token.text,
            child: NO_ELT,
            comment: NO_ELT,
        });
        self.ctx.elements[parent.elt as usize].add(key);
        self.stack.push(Frame {
            elt: key,
            indent: col,
            child_indent: -1,
        });
        let child_pos = (self.ctx.elements[parent.elt as usize].sub_qty() - 1) as u32;
        if !self.ctx.map_insert_stored(parent.elt, token.text, child_pos) {
            let name = self.ctx.str(token.text).to_owned();
            return Err(self.err(format!(
                "Parse error: duplicated key are forbidden and the key '{name}' is already present."
            )));
        }

        // The value placeholder, typed by the next token (or left `Unknown` for empty values).
        let parent = self.parent();
        let slot = self.ctx.push(Element::Unknown);
        self.ctx.elements[parent.elt as usize].add(slot);
        self.stack.push(Frame {
            elt: slot,
            indent: col,
            child_indent: -1,
        });
        Ok(())
    }

    fn on_scalar(&mut self, token: &Token) -> Result<(), ParseError> {
        let col = token.col;
        let parent = self.parent();

        if col <= parent.indent {
            return Err(self.err(format!(
                "Parse error: the indentation of the value (={col}) is not compatible with the parent indentation (={})",
                parent.indent
            )));
        }
        if parent.child_indent >= 0 && col < parent.child_indent {
            return Err(self.err(format!(
                "Parse error: the indentation of the value (={col}) is not aligned with other child elements (={})",
                parent.child_indent
            )));
        }
        if matches!(self.elt(parent.elt), Element::Map { .. }) {
            return Err(self.err(String::from(
                "Parse error: in a map, a value without a key is forbidden",
            )));
        }
        if parent.child_indent < 0 {
            self.stack.last_mut().unwrap().child_indent = col;
        }

        let parent = self.parent();
        if matches!(self.elt(parent.elt), Element::Unknown) {
            self.ctx.elements[parent.elt as usize] = Element::Value {
                text: token.text,
                comment: NO_ELT,
            };
            self.stack.pop();
        } else {
            let value = self.ctx.push(Element::Value {
                text: token.text,
                comment: NO_ELT,
            });
            self.ctx.elements[parent.elt as usize].add(value);
        }

        // A key holds exactly one child: close its frame.
        if matches!(self.elt(self.parent().elt), Element::Key { .. }) {
            self.stack.pop();
        }
        Ok(())
    }
}
