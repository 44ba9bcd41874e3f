//! Rope-backed text document and the position oracle consumed by the minimap.
//!
//! Offsets and columns are counted in characters (Unicode scalar values). Only
//! `'\n'` terminates a line: ropey is built without its CR / Unicode line break
//! features so the oracle agrees with the minimap render loops, which advance a
//! row on `'\n'` and a column on every other character.

use ropey::Rope;
use thiserror::Error;

/// A position inside a document expressed as (line index, character column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct LogicalPosition {
    pub line: usize,
    pub column: usize,
}

impl LogicalPosition {
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    pub const fn origin() -> Self {
        Self { line: 0, column: 0 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TextError {
    #[error("offset {offset} is past the end of the document (length {len})")]
    OffsetOutOfRange { offset: usize, len: usize },
    #[error("line {line} is past the last line of the document ({line_count} lines)")]
    LineOutOfRange { line: usize, line_count: usize },
}

/// Offset <-> logical position translation for a document.
///
/// Implementations are expected to answer in O(1) or O(log n). Lookups always
/// reflect the *current* document contents; positions of offsets as they were
/// before a mutation cannot be recovered afterwards, which is why edit capture
/// snapshots the old end position ahead of the change.
pub trait PositionOracle {
    type Chars<'a>: Iterator<Item = char>
    where
        Self: 'a;

    fn offset_to_position(&self, offset: usize) -> Result<LogicalPosition, TextError>;

    /// Column values past the end of the line clamp to the line end.
    fn position_to_offset(&self, pos: LogicalPosition) -> Result<usize, TextError>;

    /// Number of lines; a trailing `'\n'` opens an additional empty line.
    fn line_count(&self) -> usize;

    /// Document length in characters.
    fn text_length(&self) -> usize;

    /// Characters from `offset` to the end of the document.
    fn chars_at(&self, offset: usize) -> Result<Self::Chars<'_>, TextError>;

    fn chars_in_range(&self, offset: usize, len: usize) -> Result<String, TextError> {
        let total = self.text_length();
        let end = offset.saturating_add(len);
        if end > total {
            return Err(TextError::OffsetOutOfRange { offset: end, len: total });
        }
        Ok(self.chars_at(offset)?.take(len).collect())
    }
}

/// A text document backed by a `ropey::Rope`.
#[derive(Clone, Debug)]
pub struct Buffer {
    rope: Rope,
    pub name: String,
}

impl Buffer {
    /// Construct a buffer from an in-memory string slice.
    pub fn from_str(name: impl Into<String>, content: &str) -> Self {
        Self {
            rope: Rope::from_str(content),
            name: name.into(),
        }
    }

    /// Total number of lines in the buffer.
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Document length in characters.
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// Return the requested line as an owned `String` (including trailing newline if present).
    pub fn line(&self, idx: usize) -> Option<String> {
        if idx < self.rope.len_lines() {
            Some(self.rope.line(idx).to_string())
        } else {
            None
        }
    }

    /// Character length of a line, excluding its newline.
    pub fn line_char_len(&self, idx: usize) -> usize {
        if idx >= self.rope.len_lines() {
            return 0;
        }
        let line = self.rope.line(idx);
        let len = line.len_chars();
        if len > 0 && line.char(len - 1) == '\n' {
            len - 1
        } else {
            len
        }
    }

    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    fn check_range(&self, offset: usize, len: usize) -> Result<usize, TextError> {
        let total = self.rope.len_chars();
        let end = offset.saturating_add(len);
        if offset > total || end > total {
            return Err(TextError::OffsetOutOfRange {
                offset: offset.max(end),
                len: total,
            });
        }
        Ok(end)
    }

    /// Replace `old_len` characters at `offset` with `text`. Returns the removed text.
    pub fn replace(&mut self, offset: usize, old_len: usize, text: &str) -> Result<String, TextError> {
        let end = self.check_range(offset, old_len)?;
        let removed = self.rope.slice(offset..end).to_string();
        if end > offset {
            self.rope.remove(offset..end);
        }
        if !text.is_empty() {
            self.rope.insert(offset, text);
        }
        Ok(removed)
    }

    pub fn insert(&mut self, offset: usize, text: &str) -> Result<(), TextError> {
        self.replace(offset, 0, text).map(|_| ())
    }

    /// Delete `len` characters at `offset`, returning the removed text.
    pub fn delete(&mut self, offset: usize, len: usize) -> Result<String, TextError> {
        self.replace(offset, len, "")
    }
}

impl PositionOracle for Buffer {
    type Chars<'a> = ropey::iter::Chars<'a>;

    fn offset_to_position(&self, offset: usize) -> Result<LogicalPosition, TextError> {
        let len = self.rope.len_chars();
        if offset > len {
            return Err(TextError::OffsetOutOfRange { offset, len });
        }
        let line = self.rope.char_to_line(offset);
        let column = offset - self.rope.line_to_char(line);
        Ok(LogicalPosition { line, column })
    }

    fn position_to_offset(&self, pos: LogicalPosition) -> Result<usize, TextError> {
        let line_count = self.rope.len_lines();
        if pos.line >= line_count {
            return Err(TextError::LineOutOfRange {
                line: pos.line,
                line_count,
            });
        }
        let start = self.rope.line_to_char(pos.line);
        Ok(start + pos.column.min(self.line_char_len(pos.line)))
    }

    fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    fn text_length(&self) -> usize {
        self.rope.len_chars()
    }

    fn chars_at(&self, offset: usize) -> Result<Self::Chars<'_>, TextError> {
        let len = self.rope.len_chars();
        if offset > len {
            return Err(TextError::OffsetOutOfRange { offset, len });
        }
        Ok(self.rope.chars_at(offset))
    }
}

/// Normalize CRLF and lone CR line endings to LF.
pub fn normalize_line_endings(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\r' {
            if chars.peek() == Some(&'\n') {
                chars.next();
            }
            out.push('\n');
        } else {
            out.push(ch);
        }
    }
    out
}
