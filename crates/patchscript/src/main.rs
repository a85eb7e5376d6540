mod args;

use anyhow::{Context as _, Result};
use git::Repository;
use log::{debug, warn};
use patch_diff::{
    DisplayMethod, FileRef, PatchScript, PatchScriptBuilder, PatchScriptSettings, PrettySettings,
};

use crate::args::{Args, USAGE};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    match Args::parse(std::env::args().skip(1)) {
        Ok(Some(args)) => {
            if let Err(err) = run(&args) {
                eprintln!("patchscript: {err:#}");
                std::process::exit(1);
            }
        }
        Ok(None) => println!("{USAGE}"),
        Err(err) => {
            eprintln!("patchscript: {err:#}\n\n{USAGE}");
            std::process::exit(2);
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let repo = Repository::open(&args.repo)?;
    debug!("opened repository at {}", repo.work_dir().display());

    let history = match repo.file_history(&args.path, args.history) {
        Ok(history) => history,
        Err(err) => {
            warn!("no history for {}: {err:#}", args.path);
            Vec::new()
        }
    };

    let settings = PatchScriptSettings::default()
        .context(args.context)
        .whitespace(args.whitespace)
        .pretty(PrettySettings::default().syntax_highlighting(args.highlight));

    let a = args
        .old_rev
        .as_ref()
        .map(|rev| FileRef::new(rev.as_str(), args.path.as_str()));
    let b = args
        .new_rev
        .as_ref()
        .map(|rev| FileRef::new(rev.as_str(), args.path.as_str()));

    let script = PatchScriptBuilder::new(settings)
        .history(history)
        .build(&repo, a.as_ref(), b.as_ref())
        .with_context(|| format!("Failed to diff {}", args.path))?;

    print!("{}", render(&script, a.is_some(), b.is_some())?);
    Ok(())
}

/// Unified text when every present side is text, a one-line notice otherwise
fn render(script: &PatchScript, has_a: bool, has_b: bool) -> Result<String> {
    let textual = (!has_a || script.display_method_a() == DisplayMethod::Diff)
        && (!has_b || script.display_method_b() == DisplayMethod::Diff);

    if textual {
        return Ok(script.to_unified()?);
    }

    let mut out = String::new();
    for line in script.header() {
        out.push_str(line);
        out.push('\n');
    }
    out.push_str(&format!(
        "Binary files {} and {} differ\n",
        side_name("a", has_a, script.a().path()),
        side_name("b", has_b, script.b().path())
    ));
    Ok(out)
}

fn side_name(prefix: &str, present: bool, path: &str) -> String {
    if present {
        format!("{prefix}/{path}")
    } else {
        "/dev/null".to_string()
    }
}
