use patch_diff::{
    Context, FileRef, HunkLine, MemoryContentSource, PatchScriptBuilder, PatchScriptSettings,
    Result,
};

fn main() -> Result<()> {
    // Two versions of a small source file
    let old = r#"fn main() {
    println!("Hello, world!");
}
"#;

    let new = r#"fn main() {
    // Add a greeting with name
    let name = "Rust";
    println!("Hello, {}!", name);
}
"#;

    let source = MemoryContentSource::new()
        .with_file("old", "src/main.rs", old)
        .with_file("new", "src/main.rs", new);

    let script = PatchScriptBuilder::new(PatchScriptSettings::default().context(Context::Lines(1)))
        .build(
            &source,
            Some(&FileRef::new("old", "src/main.rs")),
            Some(&FileRef::new("new", "src/main.rs")),
        )?;

    // Plain unified output
    println!("Unified diff:");
    print!("{}", script.to_unified()?);

    // Hunk statistics
    println!("\nHunks:");
    for (i, hunk) in script.hunks().enumerate() {
        println!(
            "  Hunk {}: A {:?}, B {:?}, +{} -{}",
            i + 1,
            hunk.range_a(),
            hunk.range_b(),
            hunk.inserted_lines(),
            hunk.deleted_lines()
        );
    }

    // Formatted new side with syntax classes
    let formatted = script.formatted_b();
    println!("\nFormatted with {}:", formatted.formatter());
    for hunk in script.hunks() {
        for line in hunk.lines() {
            let HunkLine::Inserted { b } = line else {
                continue;
            };
            if let Some(line) = formatted.line(b) {
                let classes: Vec<String> = line
                    .syntax
                    .iter()
                    .map(|span| format!("{}={:?}", span.highlight, &line.text[span.range.clone()]))
                    .collect();
                println!("  {:>3} {} [{}]", b + 1, line.text, classes.join(" "));
            }
        }
    }

    Ok(())
}
