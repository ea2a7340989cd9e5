//! The line-oriented scalar and indentation tokenizer.
//!
//! [`Scanner::next_token`] lifts raw input into a stream of (token, column) events. Indentation
//! is measured in leading spaces; a tab while counting indentation is a hard error, while tabs
//! after the first non-blank of a line are ordinary whitespace. Scalars come in five flavors:
//! plain, single-quoted, double-quoted, literal (`|`) and folded (`>`), the last two with their
//! chomp (`+`/`-`) and explicit-indent (`1`-`9`) indicators.
//!
//! Multi-line scalars are assembled line by line in a [`StringHelper`] scratch and committed to
//! the document arena in a single session, which bounds allocations to O(lines) per scalar.

use crate::arena::{Arena, StrRef};
use crate::char_traits::{is_break, is_blank};
use crate::error::ParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenKind {
    /// A scalar terminated by `:`, with the `:` consumed.
    Key,
    /// A scalar of any style.
    Scalar,
    Newline,
    /// The `-` sequence-entry introducer.
    Caret,
    Comment,
    Eos,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Token {
    pub kind: TokenKind,
    /// Column of the first character of the token, after leading blanks.
    pub col: i32,
    /// Arena reference of the payload for `Key`, `Scalar` and `Comment` tokens.
    pub text: StrRef,
}

/// Scratch buffer assembling a multi-line scalar as per-line chunks.
///
/// Chunks reference positions in `buf` so that the completed scalar can be streamed to the
/// arena without intermediate strings; trailing blank lines can be dropped per the chomp policy
/// by popping chunks.
#[derive(Debug, Default)]
struct StringHelper {
    buf: String,
    /// `(start, len)` line chunks into `buf`.
    chunks: Vec<(u32, u32)>,
    line_start: u32,
}

impl StringHelper {
    fn start_session(&mut self) {
        self.buf.clear();
        self.chunks.clear();
        self.line_start = 0;
    }

    fn add_char(&mut self, c: char) {
        self.buf.push(c);
    }

    fn add_chunk(&mut self, text: &str) {
        self.buf.push_str(text);
    }

    /// Append `text` with trailing spaces and tabs stripped.
    fn add_chunk_no_trail(&mut self, text: &str) {
        self.buf
            .push_str(text.trim_end_matches([' ', '\t']));
    }

    /// Append `text` as a complete line chunk of its own.
    fn add_line(&mut self, text: &str) {
        let start = self.buf.len() as u32;
        self.buf.push_str(text);
        self.chunks.push((start, text.len() as u32));
        self.line_start = self.buf.len() as u32;
    }

    /// Close the current line: everything accumulated since the last line becomes one chunk.
    fn end_line(&mut self) {
        let end = self.buf.len() as u32;
        self.chunks.push((self.line_start, end - self.line_start));
        self.line_start = end;
    }

    /// Drop trailing chunks that hold only whitespace (chomp `-` and the default clip).
    fn remove_trailing_lines(&mut self) {
        while let Some(&(start, len)) = self.chunks.last() {
            let chunk = &self.buf[start as usize..(start + len) as usize];
            if chunk.bytes().any(|b| !is_blank(b) && !is_break(b)) {
                break;
            }
            self.chunks.pop();
        }
    }

    fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    fn ends_with_newline(&self) -> bool {
        self.buf.ends_with('\n')
    }
}

/// The tokenizer state: byte cursor, column, line number and the scalar scratch.
#[derive(Debug)]
pub(crate) struct Scanner<'input> {
    text: &'input str,
    bytes: &'input [u8],
    idx: usize,
    col: i32,
    line: u32,
    helper: StringHelper,
}

const TAB_IN_INDENT: &str = "Parse error: using tabulation is not accepted for indentation";

impl<'input> Scanner<'input> {
    pub fn new(text: &'input str) -> Self {
        Self {
            text,
            bytes: text.as_bytes(),
            idx: 0,
            col: 0,
            line: 1,
            helper: StringHelper::default(),
        }
    }

    /// Current 1-based line number.
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Current byte position; the start of the next token (leading blanks included).
    pub fn pos(&self) -> usize {
        self.idx
    }

    /// Whether the next token starts a fresh line.
    pub fn at_line_start(&self) -> bool {
        self.col == 0
    }

    /// Read the next token, storing any scalar payload into `arena`.
    ///
    /// `parent_indent` is the indentation of the innermost open construct; block scalars with an
    /// explicit indent indicator resolve their content indent against it.
    pub fn next_token(
        &mut self,
        parent_indent: i32,
        arena: &mut Arena,
    ) -> Result<Token, ParseError> {
        let mut is_new_line = self.col == 0;
        let init_idx = self.idx;
        let len = self.bytes.len();

        // Leading blanks. Tabs are rejected only while measuring indentation.
        let mut i = self.idx;
        if is_new_line {
            while i < len && self.bytes[i] == b' ' {
                i += 1;
            }
            if i < len && self.bytes[i] == b'\t' {
                return Err(ParseError::new(TAB_IN_INDENT, self.line, &self.text[self.idx..]));
            }
        } else {
            while i < len && is_blank(self.bytes[i]) {
                i += 1;
            }
        }
        self.col += (i - self.idx) as i32;
        self.idx = i;
        let start_col = self.col;

        if self.idx >= len {
            return Ok(Token {
                kind: TokenKind::Eos,
                col: start_col,
                text: StrRef::EMPTY,
            });
        }
        let first = self.bytes[self.idx];

        if is_break(first) {
            if first == b'\r' && self.bytes.get(self.idx + 1) == Some(&b'\n') {
                self.idx += 1;
            }
            self.line += 1;
            self.col = 0;
            self.idx += 1;
            return Ok(Token {
                kind: TokenKind::Newline,
                col: start_col,
                text: StrRef::EMPTY,
            });
        }

        // `-` introduces a sequence entry when followed by a blank, a break or the end of input.
        if first == b'-'
            && (self.idx + 1 >= len || matches!(self.bytes[self.idx + 1], b' ' | b'\r' | b'\n'))
        {
            self.col += 1;
            self.idx += 1;
            return Ok(Token {
                kind: TokenKind::Caret,
                col: start_col,
                text: StrRef::EMPTY,
            });
        }

        if first == b'#' {
            // Everything after `#` up to the end of line; the newline is a separate token.
            let start = self.idx + 1;
            while self.idx < len && !is_break(self.bytes[self.idx]) {
                self.idx += 1;
                self.col += 1;
            }
            let text = arena.push(&self.text[start..self.idx]);
            return Ok(Token {
                kind: TokenKind::Comment,
                col: start_col,
                text,
            });
        }

        // A scalar starts here.
        self.helper.start_session();
        let mut ml_type = b' '; // scalar family: `'`, `"`, `|`, `>`, or plain
        let mut chomp = b' ';
        let mut delta_indent: i32 = -1;
        let mut target_indent: i32 = -1;

        if first == b'\'' || first == b'"' {
            ml_type = first;
            self.idx += 1;
            self.col += 1;
            // Termination is quote-based, not indent-based.
            target_indent = 0;
            // Spaces right after the opening quote belong to the scalar.
            let mut j = self.idx;
            while j < len && self.bytes[j] == b' ' {
                j += 1;
                self.helper.add_char(' ');
            }
            self.col += (j - self.idx) as i32;
            self.idx = j;
        } else if first == b'|' || first == b'>' {
            ml_type = first;
            self.idx += 1;
            self.col += 1;
            // At most one chomp and one explicit indent digit, in any order.
            for _ in 0..2 {
                if self.idx >= len {
                    break;
                }
                match self.bytes[self.idx] {
                    b'+' | b'-' => {
                        if chomp != b' ' {
                            return Err(ParseError::new(
                                "Parse error: chomp cannot be provided more than once",
                                self.line,
                                &self.text[init_idx..],
                            ));
                        }
                        chomp = self.bytes[self.idx];
                        self.idx += 1;
                        self.col += 1;
                    }
                    b'1'..=b'9' => {
                        if delta_indent >= 0 {
                            return Err(ParseError::new(
                                "Parse error: explicit indentation cannot be provided more than once",
                                self.line,
                                &self.text[init_idx..],
                            ));
                        }
                        delta_indent = i32::from(self.bytes[self.idx] - b'0');
                        self.idx += 1;
                        self.col += 1;
                    }
                    _ => {}
                }
            }
            // The rest of the indicator line is ignored.
            while self.idx < len && !is_break(self.bytes[self.idx]) {
                self.idx += 1;
            }
            if self.idx + 1 < len && self.bytes[self.idx] == b'\r' && self.bytes[self.idx + 1] == b'\n'
            {
                self.idx += 1;
            }
            self.idx += 1;
            self.line += 1;
            self.col = 0;
            is_new_line = true;
            if delta_indent >= 0 {
                target_indent = parent_indent + delta_indent;
            }
        } else {
            // Plain scalars strip their indentation; only being a child of the parent matters.
            target_indent = if self.col > parent_indent {
                parent_indent + 1
            } else {
                self.col
            };
        }

        let mut is_key = false;
        let mut indented_folded_line = false;

        // One iteration per input line of the scalar.
        while self.idx < len {
            let mut non_space = self.idx;
            while non_space < len && self.bytes[non_space] == b' ' {
                non_space += 1;
            }
            self.col += (non_space - self.idx) as i32;
            if is_new_line && non_space < len && self.bytes[non_space] == b'\t' {
                return Err(ParseError::new(TAB_IN_INDENT, self.line, &self.text[init_idx..]));
            }
            let effective_indent = non_space - self.idx;

            if target_indent < 0 {
                // Block scalar with no explicit indent: skip leading blank lines, then the first
                // content line establishes the target indent.
                if non_space < len && is_break(self.bytes[non_space]) {
                    if self.helper.is_empty() {
                        self.helper.add_line("");
                    } else {
                        self.helper.add_line("\n");
                    }
                    let crlf = non_space + 1 < len
                        && self.bytes[non_space] == b'\r'
                        && self.bytes[non_space + 1] == b'\n';
                    self.idx = non_space + if crlf { 2 } else { 1 };
                    indented_folded_line = true;
                    self.line += 1;
                    self.col = 0;
                    continue;
                }
                target_indent = self.col;
            }

            let mut line_end = non_space;
            let mut end_reached = false;

            if ml_type == b'\'' {
                let mut needs_join = !self.helper.is_empty();
                let mut chunk_start = line_end;
                while line_end < len && !is_break(self.bytes[line_end]) {
                    if self.bytes[line_end] != b'\'' {
                        line_end += 1;
                        continue;
                    }
                    if line_end + 1 < len && self.bytes[line_end + 1] == b'\'' {
                        // A doubled quote is a literal quote.
                        if needs_join {
                            if !self.helper.ends_with_newline() {
                                self.helper.add_char(' ');
                            }
                            needs_join = false;
                        }
                        self.helper.add_chunk(&self.text[chunk_start..=line_end]);
                        line_end += 2;
                        chunk_start = line_end;
                        continue;
                    }
                    end_reached = true;
                    break;
                }
                if needs_join && !self.helper.ends_with_newline() {
                    self.helper.add_char(' ');
                }
                if line_end > chunk_start {
                    self.helper.add_chunk(&self.text[chunk_start..line_end]);
                }
                if line_end >= len {
                    return Err(ParseError::new(
                        "Parse error: unfinished single-quote string",
                        self.line,
                        &self.text[init_idx..],
                    ));
                }
                if self.bytes[line_end] == b'\'' {
                    end_reached = true;
                    line_end += 1;
                    while line_end < len && is_blank(self.bytes[line_end]) {
                        line_end += 1;
                    }
                }
                if !end_reached && non_space == line_end {
                    self.helper.add_line("\n");
                }
            } else if ml_type == b'"' {
                let mut needs_join = !self.helper.is_empty();
                let mut chunk_start = line_end;
                while line_end < len
                    && !is_break(self.bytes[line_end])
                    && self.bytes[line_end] != b'"'
                {
                    if self.bytes[line_end] != b'\\' {
                        line_end += 1;
                        continue;
                    }
                    if needs_join && !self.helper.ends_with_newline() {
                        self.helper.add_char(' ');
                        needs_join = false;
                    }
                    if line_end > chunk_start {
                        self.helper.add_chunk(&self.text[chunk_start..line_end]);
                    }
                    line_end += 1;
                    chunk_start = line_end;
                    if line_end < len {
                        match self.bytes[line_end] {
                            b'n' => self.helper.add_char('\n'),
                            b'r' => self.helper.add_char('\r'),
                            b't' => self.helper.add_char('\t'),
                            b'"' => self.helper.add_char('"'),
                            b'\\' => self.helper.add_char('\\'),
                            b'\r' | b'\n' => {
                                // An escaped end of line joins with the next line, skipping its
                                // leading spaces.
                                if self.bytes[line_end] == b'\r' {
                                    line_end += 1;
                                }
                                if line_end < len && self.bytes[line_end] == b'\n' {
                                    line_end += 1;
                                }
                                while line_end < len && self.bytes[line_end] == b' ' {
                                    line_end += 1;
                                }
                                line_end -= 1;
                            }
                            other => {
                                // Unknown escapes (including \x, \u, \U) are kept verbatim.
                                self.helper.add_char('\\');
                                self.helper.add_char(char::from(other));
                            }
                        }
                        line_end += 1;
                        chunk_start = line_end;
                    }
                }
                if needs_join && !self.helper.ends_with_newline() {
                    self.helper.add_char(' ');
                }
                if line_end > chunk_start {
                    self.helper.add_chunk(&self.text[chunk_start..line_end]);
                }
                if line_end >= len {
                    return Err(ParseError::new(
                        "Parse error: unfinished double-quote string",
                        self.line,
                        &self.text[init_idx..],
                    ));
                }
                if self.bytes[line_end] == b'"' {
                    end_reached = true;
                    line_end += 1;
                    while line_end < len && is_blank(self.bytes[line_end]) {
                        line_end += 1;
                    }
                }
                if !end_reached && non_space == line_end {
                    self.helper.add_line("\n");
                }
            } else if ml_type == b'|' {
                let rollback = line_end;
                while line_end < len && !is_break(self.bytes[line_end]) {
                    line_end += 1;
                }
                if line_end != non_space && self.col < target_indent {
                    // Dedented content terminates the block scalar.
                    end_reached = true;
                    line_end = rollback;
                } else {
                    if !self.helper.is_empty() {
                        self.helper.add_char('\n');
                    }
                    let content_start = self.idx + target_indent as usize;
                    if line_end >= content_start {
                        self.helper.add_chunk(&self.text[content_start..line_end]);
                    }
                }
            } else if ml_type == b'>' {
                let rollback = line_end;
                while line_end < len && !is_break(self.bytes[line_end]) {
                    line_end += 1;
                }
                if line_end != non_space && self.col < target_indent {
                    end_reached = true;
                    line_end = rollback;
                } else {
                    let content_start = self.idx + target_indent as usize;
                    // More-indented lines keep their structure; others fold with a space.
                    let is_indented = line_end <= content_start
                        || (!self.helper.is_empty() && self.bytes[content_start] == b' ');
                    if is_indented || indented_folded_line {
                        self.helper.add_char('\n');
                    } else if line_end > content_start
                        && !self.helper.is_empty()
                        && !self.helper.ends_with_newline()
                    {
                        self.helper.add_char(' ');
                    }
                    indented_folded_line =
                        line_end > content_start && self.bytes[content_start] == b' ';
                    if line_end > content_start {
                        self.helper.add_chunk(&self.text[content_start..line_end]);
                    }
                }
            } else {
                // Plain scalar: the line ends at a break, at ` #` (comment) or at a `:` that
                // would start a key.
                let rollback = line_end;
                while line_end < len {
                    let c = self.bytes[line_end];
                    if is_break(c) {
                        break;
                    }
                    if c == b'#' && line_end != self.idx && self.bytes[line_end - 1] == b' ' {
                        break;
                    }
                    if c == b':'
                        && (line_end + 1 >= len
                            || matches!(self.bytes[line_end + 1], b' ' | b'\n' | b'\r'))
                    {
                        break;
                    }
                    line_end += 1;
                }
                end_reached = line_end < len && !is_break(self.bytes[line_end]);
                if line_end != non_space && self.col < target_indent {
                    end_reached = true;
                    line_end = rollback;
                } else {
                    if !self.helper.is_empty() && !self.helper.ends_with_newline() {
                        self.helper.add_char(' ');
                    }
                    self.helper
                        .add_chunk_no_trail(&self.text[self.idx + effective_indent..line_end]);
                }
                if !end_reached && non_space == line_end {
                    self.helper.add_line("\n");
                }
            }

            let crlf = line_end + 1 < len
                && self.bytes[line_end] == b'\r'
                && self.bytes[line_end + 1] == b'\n';
            let next_line_start = line_end + if crlf { 2 } else { 1 };
            self.helper.end_line();

            if end_reached
                && line_end < len
                && self.bytes[line_end] == b':'
                && (line_end + 1 >= len
                    || matches!(self.bytes[line_end + 1], b' ' | b'\n' | b'\r'))
            {
                is_key = true;
                line_end += 1;
            }

            if end_reached {
                self.idx = line_end;
                self.col += (line_end - non_space) as i32;
                break;
            }

            self.idx = next_line_start;
            self.col = 0;
            self.line += 1;

            if self.idx >= len {
                if ml_type == b'"' {
                    return Err(ParseError::new(
                        "Parse error: unfinished double-quote string",
                        self.line,
                        &self.text[init_idx..],
                    ));
                }
                if ml_type == b'\'' {
                    return Err(ParseError::new(
                        "Parse error: unfinished single-quote string",
                        self.line,
                        &self.text[init_idx..],
                    ));
                }
            }
        }

        // Chomp: strip (`-`) and the default clip drop trailing blank lines; the clip's single
        // newline is re-added below.
        if ml_type != b'\'' && ml_type != b'"' && (chomp == b'-' || chomp == b' ') {
            self.helper.remove_trailing_lines();
        }

        arena.session_start();
        for &(start, chunk_len) in &self.helper.chunks {
            arena.session_push(&self.helper.buf[start as usize..(start + chunk_len) as usize]);
        }
        if (ml_type == b'|' || ml_type == b'>') && (chomp == b' ' || chomp == b'+') {
            arena.session_push("\n");
        }
        let text = arena.session_commit();

        Ok(Token {
            kind: if is_key { TokenKind::Key } else { TokenKind::Scalar },
            col: start_col,
            text,
        })
    }
}
