#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::edit_list::Context;
use crate::whitespace::Whitespace;

/// Tab stop width used when none is configured
pub const DEFAULT_TAB_WIDTH: usize = 8;

/// Presentation options for the formatter overlay
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PrettySettings {
    /// File name used to pick a language
    pub file_name: Option<String>,

    /// Mark trailing whitespace on edited lines
    pub show_whitespace_errors: bool,

    /// Annotate lines with syntax spans
    pub syntax_highlighting: bool,

    /// Columns per tab stop
    pub tab_width: usize,

    /// Mark the changed words inside replaced lines
    pub intraline: bool,
}

impl Default for PrettySettings {
    fn default() -> Self {
        Self {
            file_name: None,
            show_whitespace_errors: true,
            syntax_highlighting: true,
            tab_width: DEFAULT_TAB_WIDTH,
            intraline: true,
        }
    }
}

impl PrettySettings {
    pub fn file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    pub fn show_whitespace_errors(mut self, show: bool) -> Self {
        self.show_whitespace_errors = show;
        self
    }

    pub fn syntax_highlighting(mut self, enabled: bool) -> Self {
        self.syntax_highlighting = enabled;
        self
    }

    /// Set the tab width; zero is treated as one column
    pub fn tab_width(mut self, width: usize) -> Self {
        self.tab_width = width.max(1);
        self
    }

    pub fn intraline(mut self, enabled: bool) -> Self {
        self.intraline = enabled;
        self
    }
}

/// Immutable per-request configuration of a patch script
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PatchScriptSettings {
    pub whitespace: Whitespace,
    pub context: Context,
    pub pretty: PrettySettings,
}

impl PatchScriptSettings {
    pub fn whitespace(mut self, whitespace: Whitespace) -> Self {
        self.whitespace = whitespace;
        self
    }

    pub fn context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }

    pub fn pretty(mut self, pretty: PrettySettings) -> Self {
        self.pretty = pretty;
        self
    }
}
