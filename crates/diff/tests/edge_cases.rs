use patch_diff::{
    Context, DisplayMethod, Edit, FileRef, MemoryContentSource, PatchError, PatchScriptBuilder,
    PatchScriptSettings, PrettySettings, TextDiff, Whitespace,
};
use pretty_assertions::assert_eq;

fn settings(context: Context) -> PatchScriptSettings {
    PatchScriptSettings::default()
        .context(context)
        .pretty(PrettySettings::default().syntax_highlighting(false))
}

#[test]
fn test_newlines_at_end() {
    // A missing trailing newline does not change the line count
    assert!(TextDiff::diff_str("Line 1\nLine 2\n", "Line 1\nLine 2").is_empty());
    assert_eq!(
        TextDiff::diff_str("Line 1\nLine 2", "Line 1\nLine X\n"),
        vec![Edit::new(1, 2, 1, 2)]
    );
}

#[test]
fn test_both_empty() {
    let source = MemoryContentSource::new()
        .with_file("r1", "empty.txt", "")
        .with_file("r2", "empty.txt", "");

    let script = PatchScriptBuilder::new(settings(Context::Lines(3)))
        .build(
            &source,
            Some(&FileRef::new("r1", "empty.txt")),
            Some(&FileRef::new("r2", "empty.txt")),
        )
        .unwrap();

    assert!(script.edits().is_empty());
    assert_eq!(script.hunks().count(), 0);
    assert_eq!(script.a().size(), 0);
    assert!(script.a().is_whole_file());
}

#[test]
fn test_missing_revision_is_not_found() {
    let source = MemoryContentSource::new().with_file("r2", "a.txt", "x\n");

    let err = PatchScriptBuilder::new(settings(Context::Lines(3)))
        .build(
            &source,
            Some(&FileRef::new("r1", "a.txt")),
            Some(&FileRef::new("r2", "a.txt")),
        )
        .unwrap_err();

    match err {
        PatchError::NotFound { revision, path } => {
            assert_eq!(revision, "r1");
            assert_eq!(path, "a.txt");
        }
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[test]
fn test_added_file_has_no_a_side() {
    let source = MemoryContentSource::new().with_file("r2", "new.txt", "one\ntwo\n");

    let script = PatchScriptBuilder::new(settings(Context::Lines(3)))
        .build(&source, None, Some(&FileRef::new("r2", "new.txt")))
        .unwrap();

    assert_eq!(script.display_method_a(), DisplayMethod::None);
    assert_eq!(script.display_method_b(), DisplayMethod::Diff);
    assert_eq!(script.edits(), &[Edit::new(0, 0, 0, 2)]);
    assert_eq!(script.a().path(), "new.txt");
    assert_eq!(script.header()[1], "--- /dev/null");
}

#[test]
fn test_binary_side_skips_diff() {
    let source = MemoryContentSource::new()
        .with_file("r1", "blob.bin", vec![0u8, 1, 2, 3])
        .with_file("r2", "blob.bin", vec![0u8, 9, 9, 9]);

    let script = PatchScriptBuilder::new(settings(Context::Lines(3)))
        .build(
            &source,
            Some(&FileRef::new("r1", "blob.bin")),
            Some(&FileRef::new("r2", "blob.bin")),
        )
        .unwrap();

    assert_eq!(script.display_method_a(), DisplayMethod::None);
    assert_eq!(script.display_method_b(), DisplayMethod::None);
    assert!(script.edits().is_empty());
    assert_eq!(script.b().size(), 0);
}

#[test]
fn test_image_sides() {
    let source = MemoryContentSource::new()
        .with_file("r1", "logo.png", vec![0x89, b'P', b'N', b'G'])
        .with_file("r2", "logo.png", vec![0x89, b'P', b'N', b'G', 0]);

    let script = PatchScriptBuilder::new(settings(Context::Lines(3)))
        .build(
            &source,
            Some(&FileRef::new("r1", "logo.png")),
            Some(&FileRef::new("r2", "logo.png")),
        )
        .unwrap();

    assert_eq!(script.display_method_a(), DisplayMethod::Img);
    assert_eq!(script.display_method_b(), DisplayMethod::Img);
    assert_eq!(script.hunks().count(), 0);
}

#[test]
fn test_whitespace_only_change_is_ignored() {
    let source = MemoryContentSource::new()
        .with_file("r1", "a.txt", "keep\nvalue = 1\n")
        .with_file("r2", "a.txt", "keep\nvalue  =  1   \n");

    let build = |whitespace| {
        PatchScriptBuilder::new(settings(Context::Lines(3)).whitespace(whitespace))
            .build(
                &source,
                Some(&FileRef::new("r1", "a.txt")),
                Some(&FileRef::new("r2", "a.txt")),
            )
            .unwrap()
    };

    let exact = build(Whitespace::IgnoreNone);
    assert_eq!(exact.edits(), &[Edit::new(1, 2, 1, 2)]);
    assert!(!exact.is_ignore_whitespace());

    let ignoring = build(Whitespace::IgnoreSpaceChange);
    assert!(ignoring.edits().is_empty());
    assert!(ignoring.is_ignore_whitespace());
}

#[test]
fn test_unknown_whitespace_mode_falls_back() {
    assert_eq!(Whitespace::parse_lenient("ignore-tabs"), Whitespace::IgnoreNone);
}
