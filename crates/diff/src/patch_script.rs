use derive_more::{Display, From};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::comments::{CommentDetail, HistoryEntry};
use crate::edit::{validate_edits, Edit};
use crate::edit_list::{EditList, HunkLine, Hunks};
use crate::error::{PatchError, Result};
use crate::format::{format_side, Side, SparseFormattedFile};
use crate::settings::PatchScriptSettings;
use crate::source::DisplayMethod;
use crate::sparse::SparseFileContent;

/// Identity of the logical change a patch script belongs to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Display, From)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChangeKey(pub String);

impl From<&str> for ChangeKey {
    fn from(key: &str) -> Self {
        ChangeKey(key.to_string())
    }
}

/// The immutable result of one diff request.
///
/// Holds the two partially loaded revisions, the full edit list relating
/// them, and the metadata a display layer needs. Formatted sides and hunks
/// are derived on demand and never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PatchScript {
    change_id: ChangeKey,
    header: Vec<String>,
    settings: PatchScriptSettings,
    a: SparseFileContent,
    b: SparseFileContent,
    edits: Vec<Edit>,
    display_method_a: DisplayMethod,
    display_method_b: DisplayMethod,
    comments: CommentDetail,
    history: Vec<HistoryEntry>,
}

impl PatchScript {
    /// Bundle the parts of a patch script.
    ///
    /// Fails with [`PatchError::InvalidRange`] if an edit does not fit the
    /// sizes of `a` and `b`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        change_id: ChangeKey,
        header: Vec<String>,
        settings: PatchScriptSettings,
        a: SparseFileContent,
        b: SparseFileContent,
        edits: Vec<Edit>,
        display_method_a: DisplayMethod,
        display_method_b: DisplayMethod,
        comments: CommentDetail,
        history: Vec<HistoryEntry>,
    ) -> Result<Self> {
        validate_edits(&edits, a.size(), b.size(), b.path())?;

        Ok(Self {
            change_id,
            header,
            settings,
            a,
            b,
            edits,
            display_method_a,
            display_method_b,
            comments,
            history,
        })
    }

    pub fn change_id(&self) -> &ChangeKey {
        &self.change_id
    }

    /// The raw patch header lines
    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn settings(&self) -> &PatchScriptSettings {
        &self.settings
    }

    /// Check if the edits were computed ignoring some whitespace
    pub fn is_ignore_whitespace(&self) -> bool {
        self.settings.whitespace.is_ignoring()
    }

    /// The old revision
    pub fn a(&self) -> &SparseFileContent {
        &self.a
    }

    /// The new revision
    pub fn b(&self) -> &SparseFileContent {
        &self.b
    }

    pub fn edits(&self) -> &[Edit] {
        &self.edits
    }

    pub fn display_method_a(&self) -> DisplayMethod {
        self.display_method_a
    }

    pub fn display_method_b(&self) -> DisplayMethod {
        self.display_method_b
    }

    pub fn comment_detail(&self) -> &CommentDetail {
        &self.comments
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// The edit list grouped with the configured context
    pub fn edit_list(&self) -> EditList<'_> {
        EditList::new_unchecked(
            &self.edits,
            self.settings.context,
            self.a.size(),
            self.b.size(),
        )
    }

    /// The hunks to display, in ascending line order
    pub fn hunks(&self) -> Hunks<'_> {
        self.edit_list().hunks()
    }

    /// Format the loaded lines of revision A.
    ///
    /// Whitespace errors are never flagged on the old side.
    pub fn formatted_a(&self) -> SparseFormattedFile {
        let pretty = self
            .settings
            .pretty
            .clone()
            .file_name(self.a.path())
            .show_whitespace_errors(false);

        format_side(Side::A, &self.a, &self.b, &self.edits, &pretty)
    }

    /// Format the loaded lines of revision B.
    ///
    /// Whitespace errors are suppressed while whitespace is being ignored.
    pub fn formatted_b(&self) -> SparseFormattedFile {
        let mut pretty = self.settings.pretty.clone().file_name(self.b.path());
        if self.is_ignore_whitespace() {
            pretty.show_whitespace_errors = false;
        }

        format_side(Side::B, &self.b, &self.a, &self.edits, &pretty)
    }

    /// Render the header and hunks as a unified diff.
    ///
    /// Hunk headers use 1-based line numbers like `diff -u`. Fails if a line
    /// a hunk needs was not loaded.
    pub fn to_unified(&self) -> Result<String> {
        let mut out = String::new();
        for line in &self.header {
            out.push_str(line);
            out.push('\n');
        }

        for hunk in self.hunks() {
            let range_a = hunk.range_a();
            let range_b = hunk.range_b();
            out.push_str(&format!(
                "@@ -{} +{} @@\n",
                unified_range(range_a.start, range_a.len()),
                unified_range(range_b.start, range_b.len())
            ));

            for line in hunk.lines() {
                let (sign, text) = match line {
                    HunkLine::Context { a, b } => (' ', self.a.get(a).or_else(|| self.b.get(b))),
                    HunkLine::Deleted { a } => ('-', self.a.get(a)),
                    HunkLine::Inserted { b } => ('+', self.b.get(b)),
                };
                let text = text.ok_or_else(|| missing_line(self, line))?;
                out.push(sign);
                out.push_str(text);
                out.push('\n');
            }
        }

        Ok(out)
    }
}

fn unified_range(start: usize, len: usize) -> String {
    match len {
        0 => format!("{start},0"),
        1 => format!("{}", start + 1),
        _ => format!("{},{}", start + 1, len),
    }
}

fn missing_line(script: &PatchScript, line: HunkLine) -> PatchError {
    let (path, index) = match line {
        HunkLine::Context { a, .. } | HunkLine::Deleted { a } => (script.a.path(), a),
        HunkLine::Inserted { b } => (script.b.path(), b),
    };
    PatchError::invalid_range(path, format!("line {index} is needed by a hunk but not loaded"))
}
