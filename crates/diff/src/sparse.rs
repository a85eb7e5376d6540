use log::trace;
use std::collections::BTreeMap;
use std::ops::Range;

use crate::edit::{validate_edits, Edit};
use crate::error::{PatchError, Result};
use crate::text::FileText;

/// One file revision, holding only the lines that were actually loaded.
///
/// Lines never supplied stay absent; nothing is zero-filled.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(into = "wire::SparseWire", try_from = "wire::SparseWire")
)]
pub struct SparseFileContent {
    path: String,
    size: usize,
    lines: BTreeMap<usize, String>,
}

impl SparseFileContent {
    /// Create an empty view of a file with `size` lines
    pub fn new(path: impl Into<String>, size: usize) -> Self {
        Self {
            path: path.into(),
            size,
            lines: BTreeMap::new(),
        }
    }

    /// Create a view with every line of `text` loaded
    pub fn whole(path: impl Into<String>, text: &FileText) -> Self {
        let mut content = Self::new(path, text.line_count());
        for (index, line) in text.lines().enumerate() {
            content.lines.insert(index, line.into_owned());
        }
        content
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Total number of lines in the file, loaded or not
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of lines currently loaded
    pub fn loaded_lines(&self) -> usize {
        self.lines.len()
    }

    /// Check if every line `0..size` is loaded
    pub fn is_whole_file(&self) -> bool {
        self.lines.len() == self.size
    }

    pub fn contains(&self, index: usize) -> bool {
        self.lines.contains_key(&index)
    }

    /// Get a loaded line
    pub fn get(&self, index: usize) -> Option<&str> {
        self.lines.get(&index).map(String::as_str)
    }

    /// Store one line
    pub fn add_line(&mut self, index: usize, text: impl Into<String>) -> Result<()> {
        if index >= self.size {
            return Err(PatchError::invalid_range(
                &self.path,
                format!("line {index} is past the end of a {}-line file", self.size),
            ));
        }
        self.lines.insert(index, text.into());
        Ok(())
    }

    /// Load the lines in `range` from the full text
    pub fn load_range(&mut self, text: &FileText, range: Range<usize>) -> Result<()> {
        if range.end > self.size || range.end > text.line_count() {
            return Err(PatchError::invalid_range(
                &self.path,
                format!(
                    "cannot load lines {}..{} of a {}-line file",
                    range.start, range.end, self.size
                ),
            ));
        }
        for index in range {
            if let Some(line) = text.line(index) {
                self.lines.entry(index).or_insert_with(|| line.into_owned());
            }
        }
        Ok(())
    }

    /// Iterate over the loaded lines in ascending order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> + '_ {
        self.lines.iter().map(|(&i, line)| (i, line.as_str()))
    }

    /// The maximal runs of consecutive loaded lines
    pub fn runs(&self) -> Vec<Range<usize>> {
        let mut runs: Vec<Range<usize>> = Vec::new();
        for &index in self.lines.keys() {
            match runs.last_mut() {
                Some(run) if run.end == index => run.end += 1,
                _ => runs.push(index..index + 1),
            }
        }
        runs
    }

    /// Fill in this side's missing lines from `other`.
    ///
    /// `edits` relate `other` (revision A) to `self` (revision B). Every line
    /// of `self` outside an edit is unchanged, so it can be copied from the
    /// matching line of `other`. Requires `other` to be whole-file, and every
    /// line of `self` inside an edit to be loaded already.
    pub fn apply(&self, other: &SparseFileContent, edits: &[Edit]) -> Result<SparseFileContent> {
        if !other.is_whole_file() {
            return Err(PatchError::Incomplete {
                path: other.path.clone(),
            });
        }
        validate_edits(edits, other.size, self.size, &self.path)?;

        let mut out = self.clone();
        let tail = Edit::empty_at(other.size, self.size);
        let (mut a, mut b) = (0, 0);
        let mut borrowed = 0;

        for edit in edits.iter().chain(std::iter::once(&tail)) {
            for offset in 0..edit.begin_b - b {
                if let std::collections::btree_map::Entry::Vacant(slot) = out.lines.entry(b + offset) {
                    let line = other.get(a + offset).ok_or_else(|| PatchError::Incomplete {
                        path: other.path.clone(),
                    })?;
                    slot.insert(line.to_string());
                    borrowed += 1;
                }
            }
            if let Some(missing) = edit.range_b().find(|&i| !self.contains(i)) {
                return Err(PatchError::invalid_range(
                    &self.path,
                    format!("line {missing} lies inside {edit} and is not loaded"),
                ));
            }
            a = edit.end_a;
            b = edit.end_b;
        }

        trace!("borrowed {borrowed} unchanged lines from {}", other.path);
        Ok(out)
    }
}

#[cfg(feature = "serde")]
mod wire {
    use serde::{Deserialize, Serialize};

    use super::SparseFileContent;
    use crate::error::PatchError;

    /// A run of consecutive loaded lines
    #[derive(Serialize, Deserialize)]
    pub struct LineRun {
        pub base: usize,
        pub lines: Vec<String>,
    }

    /// Plain-data shape of a sparse file
    #[derive(Serialize, Deserialize)]
    pub struct SparseWire {
        pub path: String,
        pub size: usize,
        pub whole_file: bool,
        pub ranges: Vec<LineRun>,
    }

    impl From<SparseFileContent> for SparseWire {
        fn from(content: SparseFileContent) -> Self {
            let whole_file = content.is_whole_file();
            let mut ranges: Vec<LineRun> = Vec::new();
            for (index, line) in content.lines {
                match ranges.last_mut() {
                    Some(run) if run.base + run.lines.len() == index => run.lines.push(line),
                    _ => ranges.push(LineRun {
                        base: index,
                        lines: vec![line],
                    }),
                }
            }
            SparseWire {
                path: content.path,
                size: content.size,
                whole_file,
                ranges,
            }
        }
    }

    impl TryFrom<SparseWire> for SparseFileContent {
        type Error = PatchError;

        fn try_from(wire: SparseWire) -> Result<Self, Self::Error> {
            let mut content = SparseFileContent::new(wire.path, wire.size);
            for run in wire.ranges {
                for (offset, line) in run.lines.into_iter().enumerate() {
                    content.add_line(run.base + offset, line)?;
                }
            }
            if wire.whole_file != content.is_whole_file() {
                return Err(PatchError::invalid_range(
                    &content.path,
                    "whole-file flag does not match the loaded lines",
                ));
            }
            Ok(content)
        }
    }
}
