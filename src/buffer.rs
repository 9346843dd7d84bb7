//! In-memory file buffer and offset-tracked edit plans.
//!
//! Every rewrite in this crate works the same way: read a file into a
//! [`TextBuffer`], compute all edit offsets against that one snapshot, collect
//! them in an [`InsertionPlan`], then apply the plan. The plan applies edits in
//! ascending original offset and re-biases every edit still pending after each
//! application, so offsets computed up front stay correct however many edits
//! land before them.
//!
//! ```rust
//! use dllify::buffer::{InsertionPlan, TextBuffer};
//!
//! let mut buf = TextBuffer::from("A;B;C");
//! let mut plan = InsertionPlan::new();
//! plan.insert(1, "x");
//! plan.insert(3, "y");
//! plan.apply(&mut buf).unwrap();
//! assert_eq!(buf.to_string_lossy(), "Ax;By;C");
//! ```

use std::collections::VecDeque;
use std::fs;
use std::path::Path;

pub const LINE_DELIMITER: u8 = b'\n';

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    /// Edit reaches past the end of the buffer
    OutOfBounds { offset: usize, len: usize },
    /// A pending edit starts inside a range an earlier edit replaced
    Overlap { offset: usize },
}

impl std::fmt::Display for BufferError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BufferError::OutOfBounds { offset, len } => {
                write!(f, "offset {} is past the end of a {} byte buffer", offset, len)
            }
            BufferError::Overlap { offset } => {
                write!(f, "edit at offset {} overlaps a replaced range", offset)
            }
        }
    }
}

impl std::error::Error for BufferError {}

/// One line of a buffer: `start..end` excludes the delimiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSpan {
    /// 1-based line number
    pub number: usize,
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBuffer {
    bytes: Vec<u8>,
}

impl TextBuffer {
    pub fn load(path: &Path) -> std::io::Result<Self> {
        Ok(Self {
            bytes: fs::read(path)?,
        })
    }

    /// Overwrites `path`, truncating it to the buffer's length.
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        fs::write(path, &self.bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }

    pub fn slice(&self, start: usize, end: usize) -> &[u8] {
        &self.bytes[start.min(self.len())..end.min(self.len())]
    }

    pub fn line_text(&self, line: &LineSpan) -> &[u8] {
        self.slice(line.start, line.end)
    }

    /// First occurrence of `needle` at or after `from`.
    pub fn find(&self, needle: &[u8], from: usize) -> Option<usize> {
        if needle.is_empty() || from > self.len() {
            return None;
        }
        self.bytes[from..]
            .windows(needle.len())
            .position(|w| w == needle)
            .map(|p| p + from)
    }

    pub fn find_str(&self, needle: &str, from: usize) -> Option<usize> {
        self.find(needle.as_bytes(), from)
    }

    /// First `byte` inside `start..end`.
    pub fn find_byte_in(&self, byte: u8, start: usize, end: usize) -> Option<usize> {
        self.slice(start, end)
            .iter()
            .position(|&b| b == byte)
            .map(|p| p + start)
    }

    /// Last `byte` inside `start..end`.
    pub fn rfind_byte_in(&self, byte: u8, start: usize, end: usize) -> Option<usize> {
        self.slice(start, end)
            .iter()
            .rposition(|&b| b == byte)
            .map(|p| p + start)
    }

    pub fn insert(&mut self, offset: usize, text: &str) -> Result<(), BufferError> {
        self.replace(offset, 0, text)
    }

    pub fn replace(&mut self, offset: usize, len: usize, text: &str) -> Result<(), BufferError> {
        if offset + len > self.len() {
            return Err(BufferError::OutOfBounds {
                offset: offset + len,
                len: self.len(),
            });
        }
        self.bytes.splice(offset..offset + len, text.bytes());
        Ok(())
    }

    /// Lines delimited by [`LINE_DELIMITER`]. A trailing fragment without a
    /// delimiter is still a line; an empty buffer has none.
    pub fn lines(&self) -> Vec<LineSpan> {
        let mut lines = Vec::new();
        let mut start = 0;
        for (i, &b) in self.bytes.iter().enumerate() {
            if b == LINE_DELIMITER {
                lines.push(LineSpan {
                    number: lines.len() + 1,
                    start,
                    end: i,
                });
                start = i + 1;
            }
        }
        if start < self.len() {
            lines.push(LineSpan {
                number: lines.len() + 1,
                start,
                end: self.len(),
            });
        }
        lines
    }
}

impl From<&str> for TextBuffer {
    fn from(s: &str) -> Self {
        Self {
            bytes: s.as_bytes().to_vec(),
        }
    }
}

impl From<Vec<u8>> for TextBuffer {
    fn from(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingEdit {
    offset: usize,
    remove: usize,
    text: String,
}

/// Edits computed against one buffer snapshot.
///
/// Edits at the same original offset keep the order they were added in: the
/// second one lands directly after the text of the first.
#[derive(Debug, Clone, Default)]
pub struct InsertionPlan {
    edits: Vec<PendingEdit>,
}

impl InsertionPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, offset: usize, text: impl Into<String>) {
        self.replace(offset, 0, text);
    }

    pub fn replace(&mut self, offset: usize, len: usize, text: impl Into<String>) {
        self.edits.push(PendingEdit {
            offset,
            remove: len,
            text: text.into(),
        });
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Applies every edit and returns how many were applied.
    ///
    /// The buffer is only touched once all edits are known to fit; a plan that
    /// fails validation leaves it unchanged.
    pub fn apply(self, buf: &mut TextBuffer) -> Result<usize, BufferError> {
        let mut edits = self.edits;
        edits.sort_by_key(|e| e.offset);

        for (i, edit) in edits.iter().enumerate() {
            if edit.offset + edit.remove > buf.len() {
                return Err(BufferError::OutOfBounds {
                    offset: edit.offset + edit.remove,
                    len: buf.len(),
                });
            }
            if let Some(next) = edits.get(i + 1)
                && edit.remove > 0
                && next.offset < edit.offset + edit.remove
            {
                return Err(BufferError::Overlap {
                    offset: next.offset,
                });
            }
        }

        let mut pending: VecDeque<PendingEdit> = edits.into();
        let mut applied = 0;
        while let Some(edit) = pending.pop_front() {
            buf.replace(edit.offset, edit.remove, &edit.text)?;
            rebias(&mut pending, edit.offset, edit.remove, edit.text.len())?;
            applied += 1;
        }
        Ok(applied)
    }
}

/// Shifts pending edits at or after an applied edit by its size change.
fn rebias(
    pending: &mut VecDeque<PendingEdit>,
    at: usize,
    removed: usize,
    inserted: usize,
) -> Result<(), BufferError> {
    for edit in pending.iter_mut() {
        if edit.offset >= at + removed {
            edit.offset = edit.offset - removed + inserted;
        } else if edit.offset > at || (removed > 0 && edit.offset == at) {
            return Err(BufferError::Overlap {
                offset: edit.offset,
            });
        }
    }
    Ok(())
}
