use derive_more::Display;
use std::fmt;
use std::ops::Range;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{PatchError, Result};

/// The kind of an edit, derived from the shape of its two ranges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EditKind {
    /// Lines only exist in revision B
    #[display(fmt = "INSERT")]
    Insert,

    /// Lines only exist in revision A
    #[display(fmt = "DELETE")]
    Delete,

    /// Lines of A were replaced by different lines of B
    #[display(fmt = "REPLACE")]
    Replace,

    /// Zero-width marker on both sides
    #[display(fmt = "EMPTY")]
    Empty,
}

/// One contiguous difference between two line sequences.
///
/// Both ranges are half-open and 0-based: `begin_a..end_a` in revision A
/// and `begin_b..end_b` in revision B.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Edit {
    pub begin_a: usize,
    pub end_a: usize,
    pub begin_b: usize,
    pub end_b: usize,
}

impl Edit {
    /// Create a new edit from its two ranges
    pub fn new(begin_a: usize, end_a: usize, begin_b: usize, end_b: usize) -> Self {
        Self {
            begin_a,
            end_a,
            begin_b,
            end_b,
        }
    }

    /// Create a zero-width edit at the given position on both sides
    pub fn empty_at(a: usize, b: usize) -> Self {
        Self::new(a, a, b, b)
    }

    pub fn kind(&self) -> EditKind {
        match (self.begin_a == self.end_a, self.begin_b == self.end_b) {
            (true, true) => EditKind::Empty,
            (true, false) => EditKind::Insert,
            (false, true) => EditKind::Delete,
            (false, false) => EditKind::Replace,
        }
    }

    pub fn range_a(&self) -> Range<usize> {
        self.begin_a..self.end_a
    }

    pub fn range_b(&self) -> Range<usize> {
        self.begin_b..self.end_b
    }

    /// Number of lines covered in revision A
    pub fn len_a(&self) -> usize {
        self.end_a.saturating_sub(self.begin_a)
    }

    /// Number of lines covered in revision B
    pub fn len_b(&self) -> usize {
        self.end_b.saturating_sub(self.begin_b)
    }

    /// Check if this edit touches no line on either side
    pub fn is_empty(&self) -> bool {
        self.kind() == EditKind::Empty
    }
}

impl fmt::Display for Edit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}-{},{}-{})",
            self.kind(),
            self.begin_a,
            self.end_a,
            self.begin_b,
            self.end_b
        )
    }
}

/// Check that `edits` is a well-formed edit list between files of
/// `size_a` and `size_b` lines.
///
/// Edits must be ordered, must not overlap, must stay inside both files,
/// and the unchanged gaps between them must have equal length on both sides.
pub fn validate_edits(edits: &[Edit], size_a: usize, size_b: usize, path: &str) -> Result<()> {
    let mut a = 0;
    let mut b = 0;

    for edit in edits {
        if edit.begin_a > edit.end_a || edit.begin_b > edit.end_b {
            return Err(PatchError::invalid_range(path, format!("{edit} is reversed")));
        }
        if edit.end_a > size_a || edit.end_b > size_b {
            return Err(PatchError::invalid_range(
                path,
                format!("{edit} exceeds file sizes {size_a} and {size_b}"),
            ));
        }
        if edit.begin_a < a || edit.begin_b < b {
            return Err(PatchError::invalid_range(
                path,
                format!("{edit} overlaps or precedes the previous edit"),
            ));
        }
        if edit.begin_a - a != edit.begin_b - b {
            return Err(PatchError::invalid_range(
                path,
                format!("unchanged lines before {edit} differ in length"),
            ));
        }
        a = edit.end_a;
        b = edit.end_b;
    }

    if size_a - a != size_b - b {
        return Err(PatchError::invalid_range(
            path,
            "unchanged lines after the last edit differ in length",
        ));
    }

    Ok(())
}

/// Map a line of revision B outside every edit to its line in revision A.
///
/// Returns `None` when the line lies inside an edit.
pub fn map_b_to_a(edits: &[Edit], b: usize) -> Option<usize> {
    let (mut prev_a, mut prev_b) = (0, 0);
    for edit in edits {
        if b < edit.begin_b {
            break;
        }
        if b < edit.end_b {
            return None;
        }
        prev_a = edit.end_a;
        prev_b = edit.end_b;
    }
    Some(prev_a + (b - prev_b))
}

/// Map a line of revision A outside every edit to its line in revision B.
///
/// Returns `None` when the line lies inside an edit.
pub fn map_a_to_b(edits: &[Edit], a: usize) -> Option<usize> {
    let (mut prev_a, mut prev_b) = (0, 0);
    for edit in edits {
        if a < edit.begin_a {
            break;
        }
        if a < edit.end_a {
            return None;
        }
        prev_a = edit.end_a;
        prev_b = edit.end_b;
    }
    Some(prev_b + (a - prev_a))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind() {
        assert_eq!(Edit::new(1, 1, 1, 3).kind(), EditKind::Insert);
        assert_eq!(Edit::new(1, 3, 1, 1).kind(), EditKind::Delete);
        assert_eq!(Edit::new(1, 2, 1, 2).kind(), EditKind::Replace);
        assert_eq!(Edit::empty_at(4, 6).kind(), EditKind::Empty);
    }

    #[test]
    fn test_display() {
        assert_eq!(Edit::new(1, 2, 1, 2).to_string(), "REPLACE(1-2,1-2)");
        assert_eq!(Edit::new(50, 50, 50, 51).to_string(), "INSERT(50-50,50-51)");
    }

    #[test]
    fn test_validate_accepts_consistent_edits() {
        let edits = [Edit::new(1, 2, 1, 2), Edit::new(5, 5, 5, 7)];
        assert!(validate_edits(&edits, 10, 12, "f").is_ok());
        assert!(validate_edits(&[], 4, 4, "f").is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let err = validate_edits(&[Edit::new(1, 12, 1, 12)], 10, 10, "f").unwrap_err();
        assert!(matches!(err, PatchError::InvalidRange { .. }));
    }

    #[test]
    fn test_validate_rejects_overlap() {
        let edits = [Edit::new(1, 4, 1, 4), Edit::new(3, 5, 3, 5)];
        assert!(validate_edits(&edits, 10, 10, "f").is_err());
    }

    #[test]
    fn test_validate_rejects_mismatched_sizes() {
        assert!(validate_edits(&[], 4, 5, "f").is_err());
        assert!(validate_edits(&[Edit::new(0, 1, 0, 1)], 4, 5, "f").is_err());
    }

    #[test]
    fn test_line_mapping() {
        let edits = [Edit::new(2, 4, 2, 3), Edit::new(6, 6, 5, 8)];

        assert_eq!(map_b_to_a(&edits, 0), Some(0));
        assert_eq!(map_b_to_a(&edits, 2), None);
        assert_eq!(map_b_to_a(&edits, 3), Some(4));
        assert_eq!(map_b_to_a(&edits, 6), None);
        assert_eq!(map_b_to_a(&edits, 8), Some(6));

        assert_eq!(map_a_to_b(&edits, 3), None);
        assert_eq!(map_a_to_b(&edits, 5), Some(4));
        assert_eq!(map_a_to_b(&edits, 6), Some(8));
    }
}
