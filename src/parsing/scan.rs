//! Shared text scanning for the heuristic parsers
//!
//! Java, Go and Python parsers never build a grammar-driven tree. They find
//! construct headers with regular expressions and then resolve each
//! construct's extent here:
//!
//! - [`LineIndex`] converts absolute byte offsets to line/column pairs
//! - [`mask_c_like`] blanks out comments and literal contents so that regexes
//!   and brace counting only ever see code
//! - [`find_matching`] / [`block_end`] implement the forward depth counter
//!   used for `{ ... }` bodies
//! - [`logical_lines`] / [`indented_block_end`] are the indentation analog
//!   for Python, with [`mask_python`] as its masking pass
//!
//! All scans are bounded by the input length. An unbalanced block is reported
//! as extending to the end of the source, never as a failure.

use crate::types::Location;
use std::ops::Range;

/// Precomputed line starts for offset → (line, column) conversion.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            source
                .bytes()
                .enumerate()
                .filter(|&(_, b)| b == b'\n')
                .map(|(i, _)| i + 1),
        );

        Self {
            line_starts,
            len: source.len(),
        }
    }

    /// 1-based line and 0-based byte column of `offset` (clamped to the source length).
    pub fn position(&self, offset: usize) -> (u32, u32) {
        let offset = offset.min(self.len);
        let line = self.line_of(offset);
        let column = offset - self.line_starts[line];
        (line as u32 + 1, column as u32)
    }

    /// 0-based line containing `offset`.
    pub fn line_of(&self, offset: usize) -> usize {
        match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        }
    }

    /// Byte offset where the 0-based `line` starts.
    pub fn line_start(&self, line: usize) -> usize {
        self.line_starts.get(line).copied().unwrap_or(self.len)
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    pub fn location(&self, start: usize, end: usize) -> Location {
        let (start_line, start_column) = self.position(start);
        let (end_line, end_column) = self.position(end);
        Location::new(start_line, start_column, end_line, end_column, start, end)
    }
}

/// Copy of `source` with comments and string/char literal contents replaced
/// by spaces. Newlines and literal delimiters survive, so byte offsets and
/// line numbers are identical to the original.
///
/// Understands `//` and `/* */` comments, `"..."` and `'...'` literals with
/// backslash escapes, Java `"""` text blocks, and backtick raw strings (Go)
/// or template literals (JavaScript).
pub fn mask_c_like(source: &str) -> String {
    #[derive(Clone, Copy, PartialEq)]
    enum State {
        Code,
        LineComment,
        BlockComment,
        Quoted(char),
        TextBlock,
        Raw,
    }

    let mut out = String::with_capacity(source.len());
    let mut state = State::Code;
    let mut chars = source.char_indices().peekable();

    let blank = |out: &mut String, c: char| {
        if c == '\n' {
            out.push('\n');
        } else {
            out.extend(std::iter::repeat_n(' ', c.len_utf8()));
        }
    };

    while let Some((i, c)) = chars.next() {
        match state {
            State::Code => {
                let rest = &source[i..];
                if rest.starts_with("//") {
                    state = State::LineComment;
                    blank(&mut out, c);
                } else if rest.starts_with("/*") {
                    state = State::BlockComment;
                    blank(&mut out, c);
                    if let Some((_, star)) = chars.next() {
                        blank(&mut out, star);
                    }
                } else if rest.starts_with("\"\"\"") {
                    state = State::TextBlock;
                    out.push_str("\"\"\"");
                    chars.next();
                    chars.next();
                } else if c == '"' || c == '\'' {
                    state = State::Quoted(c);
                    out.push(c);
                } else if c == '`' {
                    state = State::Raw;
                    out.push(c);
                } else {
                    out.push(c);
                }
            }
            State::LineComment => {
                if c == '\n' {
                    state = State::Code;
                }
                blank(&mut out, c);
            }
            State::BlockComment => {
                if c == '*' && source[i..].starts_with("*/") {
                    blank(&mut out, c);
                    if let Some((_, slash)) = chars.next() {
                        blank(&mut out, slash);
                    }
                    state = State::Code;
                } else {
                    blank(&mut out, c);
                }
            }
            State::Quoted(quote) => {
                if c == '\\' {
                    blank(&mut out, c);
                    if let Some(&(_, escaped)) = chars.peek() {
                        if escaped != '\n' {
                            chars.next();
                            blank(&mut out, escaped);
                        }
                    }
                } else if c == quote {
                    out.push(c);
                    state = State::Code;
                } else if c == '\n' {
                    // Unterminated literal: recover at the line end
                    out.push('\n');
                    state = State::Code;
                } else {
                    blank(&mut out, c);
                }
            }
            State::TextBlock => {
                if source[i..].starts_with("\"\"\"") {
                    out.push_str("\"\"\"");
                    chars.next();
                    chars.next();
                    state = State::Code;
                } else if c == '\\' {
                    blank(&mut out, c);
                    if let Some((_, escaped)) = chars.next() {
                        blank(&mut out, escaped);
                    }
                } else {
                    blank(&mut out, c);
                }
            }
            State::Raw => {
                if c == '`' {
                    out.push(c);
                    state = State::Code;
                } else {
                    blank(&mut out, c);
                }
            }
        }
    }

    out
}

/// Python counterpart of [`mask_c_like`]: blanks `#` comments and the
/// contents of `'...'`, `"..."` and triple-quoted strings, keeping offsets.
pub fn mask_python(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut string: Option<(char, bool)> = None;
    let mut comment = false;
    let mut chars = source.char_indices();

    let blank = |out: &mut String, c: char| {
        if c == '\n' {
            out.push('\n');
        } else {
            out.extend(std::iter::repeat_n(' ', c.len_utf8()));
        }
    };

    while let Some((i, c)) = chars.next() {
        if comment {
            if c == '\n' {
                comment = false;
            }
            blank(&mut out, c);
            continue;
        }

        match string {
            Some((quote, triple)) => {
                if c == '\\' {
                    blank(&mut out, c);
                    if let Some((_, escaped)) = chars.next() {
                        blank(&mut out, escaped);
                    }
                } else if triple && source[i..].starts_with(&quote.to_string().repeat(3)) {
                    out.extend([quote; 3]);
                    chars.next();
                    chars.next();
                    string = None;
                } else if !triple && c == quote {
                    out.push(c);
                    string = None;
                } else if !triple && c == '\n' {
                    out.push('\n');
                    string = None;
                } else {
                    blank(&mut out, c);
                }
            }
            None => match c {
                '#' => {
                    comment = true;
                    blank(&mut out, c);
                }
                '"' | '\'' => {
                    let triple = source[i..].starts_with(&c.to_string().repeat(3));
                    string = Some((c, triple));
                    if triple {
                        out.extend([c; 3]);
                        chars.next();
                        chars.next();
                    } else {
                        out.push(c);
                    }
                }
                _ => out.push(c),
            },
        }
    }

    out
}

/// Index of the delimiter closing the one at `open`.
///
/// Plain depth counter: +1 on `open_ch`, -1 on `close_ch`, done when the
/// depth returns to zero. Run it on masked text so delimiters inside
/// comments and literals don't count. Returns `None` when `open` does not
/// hold `open_ch` or the scan reaches the end with depth > 0.
pub fn find_matching(text: &str, open: usize, open_ch: u8, close_ch: u8) -> Option<usize> {
    find_matching_before(text, open, text.len(), open_ch, close_ch)
}

/// [`find_matching`] restricted to `text[..limit]`: a closing delimiter at
/// or past `limit` counts as no match.
pub fn find_matching_before(
    text: &str,
    open: usize,
    limit: usize,
    open_ch: u8,
    close_ch: u8,
) -> Option<usize> {
    let bytes = &text.as_bytes()[..limit.min(text.len())];
    if bytes.get(open) != Some(&open_ch) {
        return None;
    }

    let mut depth = 0usize;
    for (i, &b) in bytes.iter().enumerate().skip(open) {
        if b == open_ch {
            depth += 1;
        } else if b == close_ch {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
        }
    }

    None
}

/// Exclusive end offset of the `{ ... }` block opening at `open`.
///
/// An unbalanced block extends to the end of `text`.
pub fn block_end(text: &str, open: usize) -> usize {
    find_matching(text, open, b'{', b'}').map_or(text.len(), |close| close + 1)
}

/// Exclusive end offset of the `( ... )` group opening at `open`.
pub fn paren_end(text: &str, open: usize) -> usize {
    find_matching(text, open, b'(', b')').map_or(text.len(), |close| close + 1)
}

/// Spans of the outermost `{ ... }` blocks inside `region` of masked text.
pub fn first_level_blocks(text: &str, region: Range<usize>) -> Vec<Range<usize>> {
    let bytes = text.as_bytes();
    let end = region.end.min(bytes.len());
    let mut blocks = Vec::new();
    let mut i = region.start;

    while i < end {
        if bytes[i] == b'{' {
            let close = block_end(text, i).min(end);
            blocks.push(i..close);
            i = close;
        } else {
            i += 1;
        }
    }

    blocks
}

/// Whether `pos` sits strictly inside one of `blocks`.
pub fn is_nested(blocks: &[Range<usize>], pos: usize) -> bool {
    blocks
        .iter()
        .any(|block| block.start < pos && pos < block.end)
}

/// A source string paired with its masked copy. Offsets are shared, so
/// matches found in `masked` slice `source` directly.
#[derive(Debug, Clone, Copy)]
pub struct MaskedSource<'a> {
    pub source: &'a str,
    pub masked: &'a str,
}

impl<'a> MaskedSource<'a> {
    pub fn new(source: &'a str, masked: &'a str) -> Self {
        debug_assert_eq!(source.len(), masked.len());
        Self { source, masked }
    }

    pub fn len(&self) -> usize {
        self.source.len()
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    /// Original text of `range`
    pub fn text(&self, range: Range<usize>) -> &'a str {
        &self.source[range]
    }

    /// First non-whitespace offset at or after `pos` in the masked text
    pub fn skip_ws(&self, pos: usize) -> usize {
        let rest = &self.masked[pos.min(self.masked.len())..];
        pos + (rest.len() - rest.trim_start().len())
    }

    /// Offsets where a `;`-terminated or `{}`-bodied declaration may begin
    /// inside `region`: its start, after every first-level `;`, and after
    /// every first-level block.
    pub fn member_starts(&self, region: Range<usize>) -> Vec<usize> {
        let blocks = first_level_blocks(self.masked, region.clone());
        let bytes = self.masked.as_bytes();

        let mut starts = vec![region.start];
        for pos in region.clone() {
            if bytes[pos] == b';' && !is_nested(&blocks, pos) {
                starts.push(pos + 1);
            }
        }
        starts.extend(blocks.iter().map(|block| block.end));

        let mut starts: Vec<usize> = starts
            .into_iter()
            .map(|pos| self.skip_ws(pos))
            .filter(|&pos| pos < region.end)
            .collect();
        starts.sort_unstable();
        starts.dedup();
        starts
    }

    /// Exclusive end of the statement starting before `from`: just past the
    /// next `;` outside any brace block, or `limit`.
    pub fn statement_end(&self, from: usize, limit: usize) -> usize {
        let blocks = first_level_blocks(self.masked, from..limit);
        self.masked.as_bytes()[from..limit]
            .iter()
            .enumerate()
            .find(|&(i, &b)| b == b';' && !is_nested(&blocks, from + i))
            .map_or(limit, |(i, _)| from + i + 1)
    }
}

/// Splits `text` on `separator` occurring outside any `()`, `[]`, `{}` (and
/// `<>` when `angle_brackets` is set). Returns each piece with its byte
/// offset in `text`, trimmed; empty pieces are dropped.
pub fn split_top_level(text: &str, separator: u8, angle_brackets: bool) -> Vec<(usize, &str)> {
    let bytes = text.as_bytes();
    let mut pieces = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;

    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => depth -= 1,
            b'<' if angle_brackets => depth += 1,
            b'>' if angle_brackets && depth > 0 => depth -= 1,
            _ if b == separator && depth <= 0 => {
                push_piece(text, start, i, &mut pieces);
                start = i + 1;
            }
            _ => {}
        }
    }
    push_piece(text, start, bytes.len(), &mut pieces);

    pieces
}

fn push_piece<'a>(text: &'a str, from: usize, to: usize, pieces: &mut Vec<(usize, &'a str)>) {
    let raw = &text[from..to];
    let trimmed = raw.trim_start();
    let offset = from + (raw.len() - trimmed.len());
    let trimmed = trimmed.trim_end();
    if !trimmed.is_empty() {
        pieces.push((offset, trimmed));
    }
}

/// Width of leading whitespace, tabs advancing to the next multiple of 8.
pub fn indent_width(line: &str) -> usize {
    let mut width = 0;
    for c in line.chars() {
        match c {
            ' ' => width += 1,
            '\t' => width = (width / 8 + 1) * 8,
            _ => break,
        }
    }
    width
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Blank,
    Comment,
    Code,
}

/// One Python logical line: physical lines joined by open brackets,
/// backslash continuations or triple-quoted strings.
#[derive(Debug, Clone)]
pub struct LogicalLine {
    /// Offset of the first physical line's start
    pub start: usize,
    /// Offset of the first non-whitespace character
    pub content_start: usize,
    /// Offset just past the last character, excluding the newline
    pub end: usize,
    pub indent: usize,
    pub kind: LineKind,
}

impl LogicalLine {
    pub fn is_code(&self) -> bool {
        self.kind == LineKind::Code
    }

    pub fn content<'a>(&self, source: &'a str) -> &'a str {
        &source[self.content_start..self.end]
    }
}

/// Splits Python source into logical lines.
pub fn logical_lines(source: &str) -> Vec<LogicalLine> {
    let bytes = source.as_bytes();
    let mut lines = Vec::new();
    let mut line_start = 0;
    let mut depth = 0i32;
    let mut string: Option<(u8, bool)> = None;
    let mut i = 0;

    let finish = |start: usize, end: usize, lines: &mut Vec<LogicalLine>| {
        let end = if end > start && bytes[end - 1] == b'\r' {
            end - 1
        } else {
            end
        };
        let text = &source[start..end];
        let trimmed = text.trim_start();
        let content_start = start + (text.len() - trimmed.len());
        let kind = if trimmed.trim().is_empty() {
            LineKind::Blank
        } else if trimmed.starts_with('#') {
            LineKind::Comment
        } else {
            LineKind::Code
        };
        lines.push(LogicalLine {
            start,
            content_start,
            end,
            indent: indent_width(text),
            kind,
        });
    };

    while i < bytes.len() {
        let b = bytes[i];
        match string {
            Some((quote, triple)) => {
                if b == b'\\' {
                    i += 2;
                    continue;
                }
                if triple {
                    if bytes[i..].starts_with(&[quote, quote, quote]) {
                        string = None;
                        i += 3;
                        continue;
                    }
                } else if b == quote {
                    string = None;
                } else if b == b'\n' {
                    // Unterminated single-line string
                    string = None;
                    continue;
                }
                i += 1;
            }
            None => match b {
                b'#' => {
                    while i < bytes.len() && bytes[i] != b'\n' {
                        i += 1;
                    }
                }
                b'"' | b'\'' => {
                    let triple = bytes[i..].starts_with(&[b, b, b]);
                    string = Some((b, triple));
                    i += if triple { 3 } else { 1 };
                }
                b'(' | b'[' | b'{' => {
                    depth += 1;
                    i += 1;
                }
                b')' | b']' | b'}' => {
                    depth = (depth - 1).max(0);
                    i += 1;
                }
                b'\\' if bytes.get(i + 1) == Some(&b'\n') => {
                    i += 2;
                }
                b'\n' => {
                    if depth == 0 {
                        finish(line_start, i, &mut lines);
                        line_start = i + 1;
                    }
                    i += 1;
                }
                _ => i += 1,
            },
        }
    }

    if line_start < bytes.len() {
        finish(line_start, bytes.len(), &mut lines);
    }

    lines
}

/// Index of the last line belonging to the block headed by `lines[header]`.
///
/// The block runs up to, not including, the first non-blank line (comments
/// count) whose indentation is less than or equal to the header's. Blank
/// lines before that line stay in the block. End of input also ends it.
pub fn indented_block_end(lines: &[LogicalLine], header: usize) -> usize {
    let indent = lines[header].indent;

    lines
        .iter()
        .enumerate()
        .skip(header + 1)
        .find(|(_, line)| line.kind != LineKind::Blank && line.indent <= indent)
        .map_or(lines.len() - 1, |(i, _)| i - 1)
}
