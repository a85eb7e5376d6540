use std::fmt;
use std::iter::FusedIterator;
use std::ops::Range;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::edit::{validate_edits, Edit, EditKind};
use crate::error::Result;

/// Context lines shown when none are configured
pub const DEFAULT_CONTEXT: usize = 10;

/// Lines of unchanged context shown around each edit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Context {
    /// Pad each edit with up to this many unchanged lines
    Lines(usize),

    /// Show the entire file as a single hunk
    WholeFile,
}

impl Context {
    pub fn is_whole_file(self) -> bool {
        self == Context::WholeFile
    }
}

impl Default for Context {
    fn default() -> Self {
        Context::Lines(DEFAULT_CONTEXT)
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Context::Lines(n) => write!(f, "{n}"),
            Context::WholeFile => f.write_str("all"),
        }
    }
}

impl FromStr for Context {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "all" | "whole" | "-1" => Ok(Context::WholeFile),
            n => n.parse().map(Context::Lines),
        }
    }
}

/// An ordered edit list together with the sizes of both files and the
/// context used to group edits into hunks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditList<'a> {
    edits: &'a [Edit],
    context: Context,
    size_a: usize,
    size_b: usize,
}

impl<'a> EditList<'a> {
    /// Create an edit list, checking every edit against both file sizes
    pub fn new(edits: &'a [Edit], context: Context, size_a: usize, size_b: usize) -> Result<Self> {
        validate_edits(edits, size_a, size_b, "<edit list>")?;
        Ok(Self::new_unchecked(edits, context, size_a, size_b))
    }

    /// Create an edit list from edits that were already validated
    pub(crate) fn new_unchecked(
        edits: &'a [Edit],
        context: Context,
        size_a: usize,
        size_b: usize,
    ) -> Self {
        Self {
            edits,
            context,
            size_a,
            size_b,
        }
    }

    pub fn edits(&self) -> &'a [Edit] {
        self.edits
    }

    pub fn context(&self) -> Context {
        self.context
    }

    pub fn size_a(&self) -> usize {
        self.size_a
    }

    pub fn size_b(&self) -> usize {
        self.size_b
    }

    /// Iterate over the hunks in ascending line order.
    ///
    /// The iterator is lazy and can be cloned to restart from any point.
    pub fn hunks(&self) -> Hunks<'a> {
        Hunks {
            list: *self,
            next: 0,
            done: false,
        }
    }
}

/// Lazy iterator over the hunks of an [`EditList`]
#[derive(Debug, Clone)]
pub struct Hunks<'a> {
    list: EditList<'a>,
    next: usize,
    done: bool,
}

impl<'a> Iterator for Hunks<'a> {
    type Item = Hunk<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let EditList {
            edits,
            context,
            size_a,
            size_b,
        } = self.list;

        let context = match context {
            Context::WholeFile => {
                self.done = true;
                return Some(Hunk {
                    edits,
                    begin_a: 0,
                    end_a: size_a,
                    begin_b: 0,
                    end_b: size_b,
                });
            }
            Context::Lines(n) => n,
        };

        let start = self.next;
        if start >= edits.len() {
            self.done = true;
            return None;
        }

        // Merge edits whose unchanged gap fits in both context windows
        let max_gap = context.saturating_mul(2);
        let mut end = start + 1;
        while end < edits.len() && edits[end].begin_a - edits[end - 1].end_a <= max_gap {
            end += 1;
        }
        self.next = end;

        let first = edits[start];
        let last = edits[end - 1];
        Some(Hunk {
            edits: &edits[start..end],
            begin_a: first.begin_a.saturating_sub(context),
            end_a: last.end_a.saturating_add(context).min(size_a),
            begin_b: first.begin_b.saturating_sub(context),
            end_b: last.end_b.saturating_add(context).min(size_b),
        })
    }
}

impl FusedIterator for Hunks<'_> {}

/// A display group of edits plus the unchanged lines padding them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk<'a> {
    edits: &'a [Edit],
    begin_a: usize,
    end_a: usize,
    begin_b: usize,
    end_b: usize,
}

impl<'a> Hunk<'a> {
    /// The edits grouped into this hunk
    pub fn edits(&self) -> &'a [Edit] {
        self.edits
    }

    /// Lines of revision A covered by this hunk
    pub fn range_a(&self) -> Range<usize> {
        self.begin_a..self.end_a
    }

    /// Lines of revision B covered by this hunk
    pub fn range_b(&self) -> Range<usize> {
        self.begin_b..self.end_b
    }

    /// Check if the hunk contains at least one non-empty edit
    pub fn has_changes(&self) -> bool {
        self.edits.iter().any(|e| e.kind() != EditKind::Empty)
    }

    /// Get the number of lines only present in revision B
    pub fn inserted_lines(&self) -> usize {
        self.edits.iter().map(Edit::len_b).sum()
    }

    /// Get the number of lines only present in revision A
    pub fn deleted_lines(&self) -> usize {
        self.edits.iter().map(Edit::len_a).sum()
    }

    /// Walk the hunk line by line in display order
    pub fn lines(&self) -> HunkLines<'a> {
        HunkLines {
            edits: self.edits,
            a: self.begin_a,
            b: self.begin_b,
            end_a: self.end_a,
            end_b: self.end_b,
        }
    }
}

/// One display line of a hunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum HunkLine {
    /// Line exists unchanged in both versions
    Context { a: usize, b: usize },

    /// Line only exists in revision A
    Deleted { a: usize },

    /// Line only exists in revision B
    Inserted { b: usize },
}

/// Iterator over the display lines of a [`Hunk`].
///
/// Within a replace, all deleted lines come before the inserted ones.
#[derive(Debug, Clone)]
pub struct HunkLines<'a> {
    edits: &'a [Edit],
    a: usize,
    b: usize,
    end_a: usize,
    end_b: usize,
}

impl Iterator for HunkLines<'_> {
    type Item = HunkLine;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((edit, rest)) = self.edits.split_first() {
            if self.a < edit.begin_a {
                let line = HunkLine::Context {
                    a: self.a,
                    b: self.b,
                };
                self.a += 1;
                self.b += 1;
                return Some(line);
            }
            if self.a < edit.end_a {
                let line = HunkLine::Deleted { a: self.a };
                self.a += 1;
                return Some(line);
            }
            if self.b < edit.end_b {
                let line = HunkLine::Inserted { b: self.b };
                self.b += 1;
                return Some(line);
            }
            self.edits = rest;
        }

        if self.a < self.end_a && self.b < self.end_b {
            let line = HunkLine::Context {
                a: self.a,
                b: self.b,
            };
            self.a += 1;
            self.b += 1;
            return Some(line);
        }

        None
    }
}

impl FusedIterator for HunkLines<'_> {}
