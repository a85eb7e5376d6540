use anyhow::{anyhow, bail, Context as _, Result};
use patch_diff::{Context, Whitespace};
use std::path::PathBuf;

pub const USAGE: &str = "\
usage: patchscript <repo> <old-rev> <new-rev> <path> [options]

Revisions are anything git rev-parse accepts, or INDEX / WORKDIR.
Use - as a revision for a side where the file does not exist.

options:
  --context=N|all   lines of context around each hunk (default 10)
  --ignore=MODE     none, eol, change or all
  --no-highlight    skip syntax highlighting
  --history=N       commits of file history to attach (default 10)
  -h, --help        show this message";

const DEFAULT_HISTORY: usize = 10;

/// Command line arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    pub repo: PathBuf,
    pub old_rev: Option<String>,
    pub new_rev: Option<String>,
    pub path: String,
    pub context: Context,
    pub whitespace: Whitespace,
    pub highlight: bool,
    pub history: usize,
}

impl Args {
    /// Parse the arguments after the program name.
    ///
    /// Returns `Ok(None)` when help was requested.
    pub fn parse<I>(args: I) -> Result<Option<Self>>
    where
        I: IntoIterator<Item = String>,
    {
        let mut positional = Vec::new();
        let mut context = Context::default();
        let mut whitespace = Whitespace::default();
        let mut highlight = true;
        let mut history = DEFAULT_HISTORY;

        for arg in args {
            if arg == "-h" || arg == "--help" {
                return Ok(None);
            } else if let Some(value) = arg.strip_prefix("--context=") {
                context = value
                    .parse()
                    .with_context(|| format!("invalid context '{value}'"))?;
            } else if let Some(value) = arg.strip_prefix("--ignore=") {
                // Strict here, unlike stored settings
                whitespace = value.parse()?;
            } else if arg == "--no-highlight" {
                highlight = false;
            } else if let Some(value) = arg.strip_prefix("--history=") {
                history = value
                    .parse()
                    .with_context(|| format!("invalid history count '{value}'"))?;
            } else if arg.starts_with("--") {
                bail!("unknown option {arg}");
            } else {
                positional.push(arg);
            }
        }

        let [repo, old_rev, new_rev, path]: [String; 4] = positional
            .try_into()
            .map_err(|_| anyhow!("expected <repo> <old-rev> <new-rev> <path>"))?;

        let old_rev = side_revision(old_rev);
        let new_rev = side_revision(new_rev);
        if old_rev.is_none() && new_rev.is_none() {
            bail!("at least one revision must name an existing file");
        }

        Ok(Some(Self {
            repo: PathBuf::from(repo),
            old_rev,
            new_rev,
            path,
            context,
            whitespace,
            highlight,
            history,
        }))
    }
}

fn side_revision(rev: String) -> Option<String> {
    (rev != "-").then_some(rev)
}
