use patch_diff::{Context, Edit, EditList, HunkLine, TextDiff};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn ranges(list: &EditList<'_>) -> Vec<(std::ops::Range<usize>, std::ops::Range<usize>)> {
    list.hunks().map(|h| (h.range_a(), h.range_b())).collect()
}

#[test]
fn test_single_replace_with_context_one() {
    let edits = [Edit::new(1, 2, 1, 2)];
    let list = EditList::new(&edits, Context::Lines(1), 3, 3).unwrap();

    assert_eq!(ranges(&list), vec![(0..3, 0..3)]);
}

#[test]
fn test_insert_in_hundred_lines() {
    let edits = [Edit::new(50, 50, 50, 51)];
    let list = EditList::new(&edits, Context::Lines(3), 100, 101).unwrap();

    assert_eq!(ranges(&list), vec![(47..53, 47..54)]);
}

#[test]
fn test_context_zero_has_no_padding() {
    let edits = [Edit::new(2, 3, 2, 4), Edit::new(7, 9, 8, 8)];
    let list = EditList::new(&edits, Context::Lines(0), 12, 11).unwrap();

    assert_eq!(ranges(&list), vec![(2..3, 2..4), (7..9, 8..8)]);
}

#[test]
fn test_padding_is_clamped_to_file_bounds() {
    let edits = [Edit::new(0, 1, 0, 1), Edit::new(19, 20, 19, 20)];
    let list = EditList::new(&edits, Context::Lines(5), 20, 20).unwrap();

    assert_eq!(ranges(&list), vec![(0..6, 0..6), (14..20, 14..20)]);
}

#[test]
fn test_merge_threshold() {
    let context = 3;

    // Exactly 2 * context unchanged lines between the edits: merged
    let merged = [Edit::new(2, 3, 2, 3), Edit::new(9, 10, 9, 10)];
    let list = EditList::new(&merged, Context::Lines(context), 20, 20).unwrap();
    let hunks: Vec<_> = list.hunks().collect();
    assert_eq!(hunks.len(), 1);
    assert_eq!(hunks[0].edits().len(), 2);
    assert_eq!(hunks[0].range_a(), 0..13);

    // One more line between them: two hunks
    let split = [Edit::new(2, 3, 2, 3), Edit::new(10, 11, 10, 11)];
    let list = EditList::new(&split, Context::Lines(context), 20, 20).unwrap();
    assert_eq!(ranges(&list), vec![(0..6, 0..6), (7..14, 7..14)]);
}

#[test]
fn test_huge_context_clamps_to_one_hunk() {
    let edits = [Edit::new(1, 2, 1, 2), Edit::new(5, 6, 5, 6)];

    let list = EditList::new(&edits, Context::Lines(usize::MAX), 10, 10).unwrap();
    assert_eq!(ranges(&list), vec![(0..10, 0..10)]);

    let parsed: Context = "9223372036854775808".parse().unwrap();
    let list = EditList::new(&edits, parsed, 10, 10).unwrap();
    assert_eq!(ranges(&list), vec![(0..10, 0..10)]);
}

#[test]
fn test_whole_file_context() {
    let edits = TextDiff::diff_str("a\nb\nc\nd\n", "a\nB\nc\nd\ne\n");
    let list = EditList::new(&edits, Context::WholeFile, 4, 5).unwrap();
    let hunks: Vec<_> = list.hunks().collect();

    assert_eq!(hunks.len(), 1);
    assert_eq!(hunks[0].range_a(), 0..4);
    assert_eq!(hunks[0].range_b(), 0..5);
    assert_eq!(
        hunks[0].lines().collect::<Vec<_>>(),
        vec![
            HunkLine::Context { a: 0, b: 0 },
            HunkLine::Deleted { a: 1 },
            HunkLine::Inserted { b: 1 },
            HunkLine::Context { a: 2, b: 2 },
            HunkLine::Context { a: 3, b: 3 },
            HunkLine::Inserted { b: 4 },
        ]
    );
}

#[test]
fn test_invalid_edits_are_rejected() {
    assert!(EditList::new(&[Edit::new(3, 5, 3, 5)], Context::Lines(1), 4, 4).is_err());
    assert!(EditList::new(&[Edit::new(3, 2, 3, 3)], Context::Lines(1), 4, 4).is_err());
}

#[test]
fn test_hunks_are_idempotent() {
    let edits = [
        Edit::new(3, 4, 3, 4),
        Edit::new(20, 20, 20, 22),
        Edit::new(24, 26, 26, 26),
    ];
    let list = EditList::new(&edits, Context::Lines(2), 40, 40).unwrap();

    let first: Vec<_> = list.hunks().collect();
    let second: Vec<_> = list.hunks().collect();
    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
}

#[test]
fn test_hunk_statistics() {
    let edits = [Edit::new(1, 3, 1, 2), Edit::new(4, 4, 3, 6)];
    let list = EditList::new(&edits, Context::Lines(3), 6, 8).unwrap();
    let hunk = list.hunks().next().unwrap();

    assert!(hunk.has_changes());
    assert_eq!(hunk.deleted_lines(), 2);
    assert_eq!(hunk.inserted_lines(), 4);
}

fn line_sets() -> impl Strategy<Value = (Vec<&'static str>, Vec<&'static str>)> {
    let line = prop::sample::select(vec!["a", "b", "c", "d", "e"]);
    (
        prop::collection::vec(line.clone(), 0..60),
        prop::collection::vec(line, 0..60),
    )
}

proptest! {
    #[test]
    fn prop_hunks_are_ordered_and_cover_every_edit((old, new) in line_sets(), context in 0usize..5) {
        let edits = TextDiff::diff_slices(&old, &new);
        let list = EditList::new(&edits, Context::Lines(context), old.len(), new.len()).unwrap();
        let hunks: Vec<_> = list.hunks().collect();

        let covered: usize = hunks.iter().map(|h| h.edits().len()).sum();
        prop_assert_eq!(covered, edits.len());

        for pair in hunks.windows(2) {
            prop_assert!(pair[0].range_a().end < pair[1].range_a().start);
            prop_assert!(pair[0].range_b().end < pair[1].range_b().start);
        }
        for hunk in &hunks {
            prop_assert!(hunk.range_a().end <= old.len());
            prop_assert!(hunk.range_b().end <= new.len());

            // Walking a hunk visits each of its lines exactly once
            let lines: Vec<_> = hunk.lines().collect();
            let a_lines = lines.iter().filter(|l| !matches!(l, HunkLine::Inserted { .. })).count();
            let b_lines = lines.iter().filter(|l| !matches!(l, HunkLine::Deleted { .. })).count();
            prop_assert_eq!(a_lines, hunk.range_a().len());
            prop_assert_eq!(b_lines, hunk.range_b().len());

            for line in lines {
                if let HunkLine::Context { a, b } = line {
                    prop_assert_eq!(old[a], new[b]);
                }
            }
        }
    }
}
