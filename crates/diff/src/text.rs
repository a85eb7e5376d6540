use ropey::Rope;
use std::borrow::Cow;

/// How many leading bytes are inspected when looking for binary content.
const BINARY_PROBE_LEN: usize = 8000;

/// Line-indexed view over one revision's raw content.
///
/// Lines are split on `\n` only and returned without their terminator.
/// A trailing newline does not start an extra, empty line.
#[derive(Debug, Clone, Default)]
pub struct FileText {
    rope: Rope,
    line_count: usize,
}

impl FileText {
    /// Create a text from already decoded content
    pub fn new(text: &str) -> Self {
        let rope = Rope::from_str(text);
        let line_count = if text.is_empty() {
            0
        } else if text.ends_with('\n') {
            rope.len_lines() - 1
        } else {
            rope.len_lines()
        };

        Self { rope, line_count }
    }

    /// Decode raw bytes, replacing invalid UTF-8 sequences
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self::new(&String::from_utf8_lossy(bytes))
    }

    /// An empty text with no lines
    pub fn empty() -> Self {
        Self::default()
    }

    /// Get the number of lines
    pub fn line_count(&self) -> usize {
        self.line_count
    }

    /// Check if the text has no lines
    pub fn is_empty(&self) -> bool {
        self.line_count == 0
    }

    /// Get a line by its 0-based index, without the trailing newline
    pub fn line(&self, index: usize) -> Option<Cow<'_, str>> {
        if index >= self.line_count {
            return None;
        }

        let slice = self.rope.line(index);
        let len = slice.len_chars();
        let slice = if len > 0 && slice.char(len - 1) == '\n' {
            slice.slice(..len - 1)
        } else {
            slice
        };

        Some(Cow::from(slice))
    }

    /// Iterate over all lines in order
    pub fn lines(&self) -> impl Iterator<Item = Cow<'_, str>> + '_ {
        (0..self.line_count).filter_map(move |i| self.line(i))
    }

    /// Heuristic used by git: a NUL byte near the start marks binary content
    pub fn is_binary(bytes: &[u8]) -> bool {
        bytes.iter().take(BINARY_PROBE_LEN).any(|&b| b == 0)
    }
}

impl From<&str> for FileText {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}
