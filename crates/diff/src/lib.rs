// Patch rendering engine
// This crate computes line edits between two file revisions, groups them into
// hunks, and formats the partially loaded content of each side for display

mod builder;
mod comments;
mod edit;
mod edit_list;
mod error;
mod format;
mod patch_script;
mod settings;
mod source;
mod sparse;
mod text;
mod text_diff;
mod whitespace;

pub use builder::{PatchScriptBuilder, DEFAULT_MAX_WHOLE_FILE_LINES};
pub use comments::{CommentDetail, HistoryEntry, LineComment};
pub use edit::{map_a_to_b, map_b_to_a, validate_edits, Edit, EditKind};
pub use edit_list::{Context, EditList, Hunk, HunkLine, HunkLines, Hunks, DEFAULT_CONTEXT};
pub use error::{PatchError, Result};
pub use format::{
    expand_tabs, format_side, select_formatter, FormatError, FormattedLine, Formatter, Highlight,
    PlainFormatter, Side, SparseFormattedFile, SyntaxFormatter, SyntaxSpan,
};
pub use patch_script::{ChangeKey, PatchScript};
pub use settings::{PatchScriptSettings, PrettySettings, DEFAULT_TAB_WIDTH};
pub use source::{ContentSource, DisplayMethod, FileRef, MemoryContentSource};
pub use sparse::SparseFileContent;
pub use text::FileText;
pub use text_diff::TextDiff;
pub use whitespace::{UnknownWhitespace, Whitespace};
