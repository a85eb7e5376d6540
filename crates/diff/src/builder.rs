use log::debug;

use crate::comments::{CommentDetail, HistoryEntry};
use crate::edit::{map_a_to_b, map_b_to_a, Edit};
use crate::edit_list::{Context, EditList};
use crate::error::Result;
use crate::format::Side;
use crate::patch_script::{ChangeKey, PatchScript};
use crate::settings::PatchScriptSettings;
use crate::source::{ContentSource, DisplayMethod, FileRef};
use crate::sparse::SparseFileContent;
use crate::text::FileText;
use crate::text_diff::TextDiff;

/// Largest old revision loaded whole so highlighting can borrow from it
pub const DEFAULT_MAX_WHOLE_FILE_LINES: usize = 10_000;

/// One side after fetching and classification
struct LoadedSide {
    path: String,
    display: DisplayMethod,
    text: FileText,
}

/// Builds a [`PatchScript`] from content fetched through a [`ContentSource`]
#[derive(Debug, Clone)]
pub struct PatchScriptBuilder {
    settings: PatchScriptSettings,
    change_id: ChangeKey,
    header: Option<Vec<String>>,
    comments: CommentDetail,
    history: Vec<HistoryEntry>,
    max_whole_file_lines: usize,
}

impl PatchScriptBuilder {
    pub fn new(settings: PatchScriptSettings) -> Self {
        Self {
            settings,
            change_id: ChangeKey::default(),
            header: None,
            comments: CommentDetail::default(),
            history: Vec::new(),
            max_whole_file_lines: DEFAULT_MAX_WHOLE_FILE_LINES,
        }
    }

    pub fn change_id(mut self, change_id: impl Into<ChangeKey>) -> Self {
        self.change_id = change_id.into();
        self
    }

    /// Use these header lines instead of generated ones
    pub fn header(mut self, header: Vec<String>) -> Self {
        self.header = Some(header);
        self
    }

    pub fn comments(mut self, comments: CommentDetail) -> Self {
        self.comments = comments;
        self
    }

    pub fn history(mut self, history: Vec<HistoryEntry>) -> Self {
        self.history = history;
        self
    }

    pub fn max_whole_file_lines(mut self, lines: usize) -> Self {
        self.max_whole_file_lines = lines;
        self
    }

    /// Diff `a` against `b` and load just the lines the hunks need.
    ///
    /// A `None` side is an absent file (added or deleted). A side whose
    /// content is not text is diffed as if it were empty.
    pub fn build<S>(self, source: &S, a: Option<&FileRef>, b: Option<&FileRef>) -> Result<PatchScript>
    where
        S: ContentSource + ?Sized,
    {
        let fallback_path = b.or(a).map(|f| f.path.as_str()).unwrap_or_default();
        let side_a = load_side(source, a, fallback_path)?;
        let side_b = load_side(source, b, fallback_path)?;

        let mut edits = TextDiff::diff(&side_a.text, &side_b.text, self.settings.whitespace);
        debug!(
            "{}: {} edits between {} and {} lines",
            side_b.path,
            edits.len(),
            side_a.text.line_count(),
            side_b.text.line_count()
        );

        if self.settings.context != Context::Lines(0) {
            add_comment_edits(&mut edits, &self.comments, &side_a, &side_b);
        }

        let size_a = side_a.text.line_count();
        let size_b = side_b.text.line_count();
        let mut content_a = SparseFileContent::new(side_a.path.clone(), size_a);
        let mut content_b = SparseFileContent::new(side_b.path.clone(), size_b);

        if self.settings.context.is_whole_file() {
            content_a.load_range(&side_a.text, 0..size_a)?;
            content_b.load_range(&side_b.text, 0..size_b)?;
        } else {
            let list = EditList::new(&edits, self.settings.context, size_a, size_b)?;
            for hunk in list.hunks() {
                content_a.load_range(&side_a.text, hunk.range_a())?;
                content_b.load_range(&side_b.text, hunk.range_b())?;
            }
            if self.settings.pretty.syntax_highlighting && size_a <= self.max_whole_file_lines {
                debug!("loading all {size_a} lines of {} for highlighting", side_a.path);
                content_a.load_range(&side_a.text, 0..size_a)?;
            }
        }

        let header = match self.header {
            Some(header) => header,
            None => default_header(a, b),
        };

        PatchScript::new(
            self.change_id,
            header,
            self.settings,
            content_a,
            content_b,
            edits,
            side_a.display,
            side_b.display,
            self.comments,
            self.history,
        )
    }
}

fn load_side<S>(source: &S, file: Option<&FileRef>, fallback_path: &str) -> Result<LoadedSide>
where
    S: ContentSource + ?Sized,
{
    let Some(file) = file else {
        return Ok(LoadedSide {
            path: fallback_path.to_string(),
            display: DisplayMethod::None,
            text: FileText::empty(),
        });
    };

    let bytes = source.load(file)?;
    let display = source.display_method(&file.path, &bytes);
    let text = if display == DisplayMethod::Diff {
        FileText::from_bytes(&bytes)
    } else {
        debug!("{} is shown as {display}, skipping its lines", file.path);
        FileText::empty()
    };

    Ok(LoadedSide {
        path: file.path.clone(),
        display,
        text,
    })
}

/// Give every commented line of this file outside an edit a zero-width edit
/// of its own, so that a hunk is produced around it.
fn add_comment_edits(
    edits: &mut Vec<Edit>,
    comments: &CommentDetail,
    side_a: &LoadedSide,
    side_b: &LoadedSide,
) {
    let mut extra = Vec::new();

    for a in comments.line_indices(&side_a.path, Side::A) {
        if a >= side_a.text.line_count() {
            continue;
        }
        if let Some(b) = map_a_to_b(edits, a) {
            extra.push(Edit::empty_at(a, b));
        }
    }
    for b in comments.line_indices(&side_b.path, Side::B) {
        if b >= side_b.text.line_count() {
            continue;
        }
        if let Some(a) = map_b_to_a(edits, b) {
            extra.push(Edit::empty_at(a, b));
        }
    }

    if extra.is_empty() {
        return;
    }
    edits.extend(extra);
    edits.sort_by_key(|e| (e.begin_a, e.begin_b, e.end_a, e.end_b));
    edits.dedup();
}

fn default_header(a: Option<&FileRef>, b: Option<&FileRef>) -> Vec<String> {
    let path_a = a.map(|f| f.path.as_str());
    let path_b = b.map(|f| f.path.as_str());
    let diff_path_a = path_a.or(path_b).unwrap_or_default();
    let diff_path_b = path_b.or(path_a).unwrap_or_default();

    vec![
        format!("diff --git a/{diff_path_a} b/{diff_path_b}"),
        path_a.map_or_else(|| "--- /dev/null".to_string(), |p| format!("--- a/{p}")),
        path_b.map_or_else(|| "+++ /dev/null".to_string(), |p| format!("+++ b/{p}")),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_header() {
        let a = FileRef::new("r1", "src/old.rs");
        let b = FileRef::new("r2", "src/new.rs");

        assert_eq!(
            default_header(Some(&a), Some(&b)),
            vec!["diff --git a/src/old.rs b/src/new.rs", "--- a/src/old.rs", "+++ b/src/new.rs"]
        );
        assert_eq!(
            default_header(None, Some(&b)),
            vec!["diff --git a/src/new.rs b/src/new.rs", "--- /dev/null", "+++ b/src/new.rs"]
        );
    }
}
