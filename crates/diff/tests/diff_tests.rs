use patch_diff::{validate_edits, Edit, EditKind, FileText, TextDiff, Whitespace};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn text(lines: &[&str]) -> String {
    lines.iter().map(|l| format!("{l}\n")).collect()
}

#[test]
fn test_identical_files() {
    let edits = TextDiff::diff_str("Line 1\nLine 2\nLine 3\n", "Line 1\nLine 2\nLine 3\n");
    assert!(edits.is_empty());
}

#[test]
fn test_added_file() {
    let edits = TextDiff::diff_str("", "Line 1\nLine 2\n");

    assert_eq!(edits, vec![Edit::new(0, 0, 0, 2)]);
    assert_eq!(edits[0].kind(), EditKind::Insert);
}

#[test]
fn test_deleted_file() {
    let edits = TextDiff::diff_str("Line 1\nLine 2\n", "");

    assert_eq!(edits, vec![Edit::new(0, 2, 0, 0)]);
    assert_eq!(edits[0].kind(), EditKind::Delete);
}

#[test]
fn test_replaced_line() {
    let edits = TextDiff::diff_str(&text(&["a", "b", "c"]), &text(&["a", "x", "c"]));

    assert_eq!(edits, vec![Edit::new(1, 2, 1, 2)]);
    assert_eq!(edits[0].kind(), EditKind::Replace);
}

#[test]
fn test_inserted_line_in_large_file() {
    let old: Vec<String> = (0..100).map(|i| format!("line {i}")).collect();
    let mut new = old.clone();
    new.insert(50, "brand new".to_string());

    let edits = TextDiff::diff_slices(&old, &new);
    assert_eq!(edits, vec![Edit::new(50, 50, 50, 51)]);
}

#[test]
fn test_multiple_edits_are_ordered() {
    let old = text(&["1", "2", "3", "4", "5", "6", "7", "8"]);
    let new = text(&["1", "2 modified", "3", "4", "5", "6 modified", "7", "8", "9"]);

    let edits = TextDiff::diff_str(&old, &new);
    assert_eq!(
        edits,
        vec![
            Edit::new(1, 2, 1, 2),
            Edit::new(5, 6, 5, 6),
            Edit::new(8, 8, 8, 9),
        ]
    );
}

#[test]
fn test_matched_runs_stay_contiguous() {
    // Inserting a duplicate of an existing line keeps the original run intact
    let old = text(&["a", "b", "c"]);
    let new = text(&["a", "b", "b", "c"]);

    let edits = TextDiff::diff_str(&old, &new);
    assert_eq!(edits.len(), 1);
    assert_eq!(edits[0].kind(), EditKind::Insert);
    assert_eq!(edits[0].len_b(), 1);
}

#[test]
fn test_whitespace_equivalence() {
    let old = FileText::new("if (x) {\n  run( a, b );\n}\n");
    let new = FileText::new("if (x) {\n\trun(a,b);\n}\n");

    assert_eq!(
        TextDiff::diff(&old, &new, Whitespace::IgnoreNone),
        vec![Edit::new(1, 2, 1, 2)]
    );
    assert!(TextDiff::diff(&old, &new, Whitespace::IgnoreAllSpace).is_empty());
    // Collapsing runs still distinguishes "a, b" from "a,b"
    assert_eq!(
        TextDiff::diff(&old, &new, Whitespace::IgnoreSpaceChange),
        vec![Edit::new(1, 2, 1, 2)]
    );
}

#[test]
fn test_whitespace_mode_keeps_original_line_numbers() {
    let old = FileText::new("a\nb  \nc\nd\n");
    let new = FileText::new("a\nb\nc\nD\n");

    assert_eq!(
        TextDiff::diff(&old, &new, Whitespace::IgnoreSpaceAtEol),
        vec![Edit::new(3, 4, 3, 4)]
    );
}

proptest! {
    #[test]
    fn prop_edits_round_trip(
        old in prop::collection::vec(prop::sample::select(vec!["a", "b", "c", "d"]), 0..40),
        new in prop::collection::vec(prop::sample::select(vec!["a", "b", "c", "d"]), 0..40),
    ) {
        let edits = TextDiff::diff_str(&text(&old), &text(&new));

        prop_assert!(validate_edits(&edits, old.len(), new.len(), "prop").is_ok());
        prop_assert!(edits.iter().all(|e| !e.is_empty()));

        let rebuilt = TextDiff::apply(&old, &edits, |b| new.get(b).copied());
        prop_assert_eq!(rebuilt, Some(new.clone()));
    }

    #[test]
    fn prop_unchanged_lines_match(
        old in prop::collection::vec(prop::sample::select(vec!["x", "y", "z"]), 0..30),
        new in prop::collection::vec(prop::sample::select(vec!["x", "y", "z"]), 0..30),
    ) {
        let edits = TextDiff::diff_slices(&old, &new);

        for b in 0..new.len() {
            if let Some(a) = patch_diff::map_b_to_a(&edits, b) {
                prop_assert_eq!(old[a], new[b]);
            }
        }
    }
}
