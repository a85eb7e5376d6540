use similar::{Algorithm, DiffOp};
use std::borrow::Cow;
use std::hash::Hash;
use std::time::{Duration, Instant};

use crate::edit::Edit;
use crate::text::FileText;
use crate::whitespace::Whitespace;

/// Upper bound on the time spent looking for a minimal edit script.
/// Past the deadline the diff is still correct but may be coarser.
const DIFF_TIMEOUT: Duration = Duration::from_secs(5);

/// Line diff operations producing [`Edit`] lists
pub struct TextDiff;

impl TextDiff {
    /// Diff two texts line by line, comparing lines under `whitespace`.
    ///
    /// The edits always refer to the original line numbers; only the
    /// equality relation between lines depends on the mode.
    pub fn diff(old_text: &FileText, new_text: &FileText, whitespace: Whitespace) -> Vec<Edit> {
        let old_keys: Vec<Cow<'_, str>> = old_text
            .lines()
            .map(|line| whitespace.normalize_cow(line))
            .collect();
        let new_keys: Vec<Cow<'_, str>> = new_text
            .lines()
            .map(|line| whitespace.normalize_cow(line))
            .collect();

        Self::diff_slices(&old_keys, &new_keys)
    }

    /// Diff two string slices line by line with exact comparison
    pub fn diff_str(old_text: &str, new_text: &str) -> Vec<Edit> {
        Self::diff(
            &FileText::new(old_text),
            &FileText::new(new_text),
            Whitespace::IgnoreNone,
        )
    }

    /// Diff two sequences of comparable items.
    ///
    /// Uses Myers' algorithm; matched runs are compacted so that edits land
    /// where conventional diff tools put them. Adjacent delete and insert
    /// operations are merged into a single replace.
    pub fn diff_slices<T: Hash + Eq + Ord>(old: &[T], new: &[T]) -> Vec<Edit> {
        let deadline = Instant::now().checked_add(DIFF_TIMEOUT);
        let ops = similar::capture_diff_slices_deadline(Algorithm::Myers, old, new, deadline);

        let mut edits: Vec<Edit> = Vec::new();
        for op in ops {
            let edit = match op {
                DiffOp::Equal { .. } => continue,
                DiffOp::Delete {
                    old_index,
                    old_len,
                    new_index,
                } => Edit::new(old_index, old_index + old_len, new_index, new_index),
                DiffOp::Insert {
                    old_index,
                    new_index,
                    new_len,
                } => Edit::new(old_index, old_index, new_index, new_index + new_len),
                DiffOp::Replace {
                    old_index,
                    old_len,
                    new_index,
                    new_len,
                } => Edit::new(
                    old_index,
                    old_index + old_len,
                    new_index,
                    new_index + new_len,
                ),
            };

            match edits.last_mut() {
                Some(last) if last.end_a == edit.begin_a && last.end_b == edit.begin_b => {
                    last.end_a = edit.end_a;
                    last.end_b = edit.end_b;
                }
                _ => edits.push(edit),
            }
        }

        edits
    }

    /// Rebuild revision B from revision A's lines and the lines B inserted.
    ///
    /// `new_line` supplies B's line at an index inside an edit. Returns `None`
    /// if an index is missing on either side.
    pub fn apply<'a, F>(old_lines: &[&'a str], edits: &[Edit], mut new_line: F) -> Option<Vec<&'a str>>
    where
        F: FnMut(usize) -> Option<&'a str>,
    {
        let mut out = Vec::new();
        let mut a = 0;
        for edit in edits {
            out.extend_from_slice(old_lines.get(a..edit.begin_a)?);
            for b in edit.range_b() {
                out.push(new_line(b)?);
            }
            a = edit.end_a;
        }
        out.extend_from_slice(old_lines.get(a..)?);
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_identical_inputs() {
        assert!(TextDiff::diff_str("a\nb\nc\n", "a\nb\nc\n").is_empty());
        assert!(TextDiff::diff_str("", "").is_empty());
    }

    #[test]
    fn test_added_and_removed_files() {
        assert_eq!(TextDiff::diff_str("", "a\nb\n"), vec![Edit::new(0, 0, 0, 2)]);
        assert_eq!(TextDiff::diff_str("a\nb\nc\n", ""), vec![Edit::new(0, 3, 0, 0)]);
    }

    #[test]
    fn test_single_replace() {
        assert_eq!(
            TextDiff::diff_str("a\nb\nc\n", "a\nx\nc\n"),
            vec![Edit::new(1, 2, 1, 2)]
        );
    }

    #[test]
    fn test_delete_then_insert_becomes_replace() {
        assert_eq!(
            TextDiff::diff_str("a\nb\nc\nd\n", "a\nx\ny\nd\n"),
            vec![Edit::new(1, 3, 1, 3)]
        );
    }

    #[test]
    fn test_whitespace_mode_changes_equality_only() {
        let old = FileText::new("fn main() {\n    call();\n}\n");
        let new = FileText::new("fn main() {\n\tcall();  \n}\n");

        assert_eq!(
            TextDiff::diff(&old, &new, Whitespace::IgnoreNone),
            vec![Edit::new(1, 2, 1, 2)]
        );
        assert!(TextDiff::diff(&old, &new, Whitespace::IgnoreAllSpace).is_empty());
        assert!(TextDiff::diff(&old, &new, Whitespace::IgnoreSpaceChange).is_empty());
        assert_eq!(
            TextDiff::diff(&old, &new, Whitespace::IgnoreSpaceAtEol),
            vec![Edit::new(1, 2, 1, 2)]
        );
    }

    #[test]
    fn test_apply_reproduces_new_lines() {
        let old = ["a", "b", "c", "d"];
        let new = ["a", "x", "c", "d", "e"];
        let edits = TextDiff::diff_slices(&old, &new);

        let rebuilt = TextDiff::apply(&old, &edits, |b| new.get(b).copied()).unwrap();
        assert_eq!(rebuilt, new.to_vec());
    }
}
