#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::format::Side;

/// An inline comment attached to a line of one side of the diff.
///
/// `line` is 1-based; 0 marks a comment on the file as a whole.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LineComment {
    pub path: String,
    pub side: Side,
    pub line: usize,
    pub author: String,
    pub message: String,
}

impl LineComment {
    /// The 0-based index of the commented line, if it targets a line
    pub fn line_index(&self) -> Option<usize> {
        self.line.checked_sub(1)
    }
}

/// Comment placement data passed through to the display layer
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CommentDetail {
    comments: Vec<LineComment>,
}

impl CommentDetail {
    pub fn new(comments: Vec<LineComment>) -> Self {
        Self { comments }
    }

    pub fn push(&mut self, comment: LineComment) {
        self.comments.push(comment);
    }

    pub fn comments(&self) -> &[LineComment] {
        &self.comments
    }

    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }

    /// Comments placed on the given 0-based line of one side of `path`
    pub fn at<'a>(
        &'a self,
        path: &'a str,
        side: Side,
        index: usize,
    ) -> impl Iterator<Item = &'a LineComment> + 'a {
        self.comments.iter().filter(move |c| {
            c.path == path && c.side == side && c.line_index() == Some(index)
        })
    }

    /// Sorted, de-duplicated 0-based line indices commented on one side of `path`
    pub fn line_indices(&self, path: &str, side: Side) -> Vec<usize> {
        let mut lines: Vec<usize> = self
            .comments
            .iter()
            .filter(|c| c.path == path && c.side == side)
            .filter_map(LineComment::line_index)
            .collect();
        lines.sort_unstable();
        lines.dedup();
        lines
    }
}

/// One earlier revision of the file, listed alongside the diff
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HistoryEntry {
    /// Revision identifier
    pub revision: String,
    /// First line of the revision's message
    pub summary: String,
    pub author: String,
    /// Seconds since the epoch
    pub time: i64,
}
