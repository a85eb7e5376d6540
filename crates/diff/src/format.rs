use derive_more::Display;
use log::{debug, warn};
use similar::{Algorithm, DiffTag};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::ops::Range;
use std::path::Path;
use std::sync::OnceLock;
use syntect::parsing::{ParseState, ScopeStack, SyntaxReference, SyntaxSet};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::edit::{Edit, EditKind};
use crate::settings::PrettySettings;
use crate::sparse::SparseFileContent;

/// One side of a diff; also used to filter edits down to that side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Side {
    /// The old revision
    #[display(fmt = "A")]
    A,

    /// The new revision
    #[display(fmt = "B")]
    B,
}

impl Side {
    /// The lines `edit` covers on this side
    pub fn range(self, edit: &Edit) -> Range<usize> {
        match self {
            Side::A => edit.range_a(),
            Side::B => edit.range_b(),
        }
    }

    pub fn other(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }
}

/// Syntax class of a span, named after the classic prettify classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Highlight {
    #[display(fmt = "kwd")]
    Keyword,
    #[display(fmt = "typ")]
    Type,
    #[display(fmt = "str")]
    String,
    #[display(fmt = "com")]
    Comment,
    #[display(fmt = "lit")]
    Literal,
    #[display(fmt = "fun")]
    Function,
    #[display(fmt = "pun")]
    Punctuation,
}

/// A highlighted byte range of a formatted line
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SyntaxSpan {
    pub range: Range<usize>,
    pub highlight: Highlight,
}

/// One loaded line with its presentation metadata.
///
/// All ranges are byte offsets into `text`, which has tabs expanded.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FormattedLine {
    pub text: String,
    /// The line lies inside an edit on this side
    pub edited: bool,
    pub syntax: Vec<SyntaxSpan>,
    /// Changed words of a replaced line
    pub intraline: Vec<Range<usize>>,
    /// Trailing whitespace on an edited line
    pub whitespace_errors: Vec<Range<usize>>,
}

/// The formatted counterpart of a [`SparseFileContent`]
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SparseFormattedFile {
    path: String,
    size: usize,
    side: Side,
    formatter: String,
    lines: BTreeMap<usize, FormattedLine>,
}

impl SparseFormattedFile {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn side(&self) -> Side {
        self.side
    }

    /// Name of the formatter variant that produced the syntax spans
    pub fn formatter(&self) -> &str {
        &self.formatter
    }

    pub fn contains(&self, index: usize) -> bool {
        self.lines.contains_key(&index)
    }

    pub fn line(&self, index: usize) -> Option<&FormattedLine> {
        self.lines.get(&index)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &FormattedLine)> + '_ {
        self.lines.iter().map(|(&i, line)| (i, line))
    }
}

/// Returned by a [`Formatter`] that could not annotate its input
#[derive(Debug, Clone, thiserror::Error)]
#[error("highlighting failed: {0}")]
pub struct FormatError(pub String);

/// Produces syntax spans for runs of consecutive lines.
///
/// State such as an open block comment carries from one line of a run to
/// the next, but never across runs or calls.
pub trait Formatter {
    fn name(&self) -> &str;

    /// Returns one span list per input line
    fn highlight(&self, lines: &[String]) -> Result<Vec<Vec<SyntaxSpan>>, FormatError>;
}

/// Leaves every line unhighlighted
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainFormatter;

impl Formatter for PlainFormatter {
    fn name(&self) -> &str {
        "plain"
    }

    fn highlight(&self, lines: &[String]) -> Result<Vec<Vec<SyntaxSpan>>, FormatError> {
        Ok(vec![Vec::new(); lines.len()])
    }
}

fn syntax_set() -> &'static SyntaxSet {
    static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
    SYNTAX_SET.get_or_init(SyntaxSet::load_defaults_newlines)
}

/// Language-aware highlighting backed by syntect's bundled grammars
#[derive(Debug, Clone, Copy)]
pub struct SyntaxFormatter {
    syntax_set: &'static SyntaxSet,
    syntax: &'static SyntaxReference,
}

impl SyntaxFormatter {
    /// Pick a grammar from the file's extension, or its whole name for
    /// files like `Makefile`. Returns `None` for unknown or plain-text files.
    pub fn for_file_name(file_name: &str) -> Option<Self> {
        let syntax_set = syntax_set();
        let path = Path::new(file_name);
        let base = path.file_name()?.to_str()?;

        let syntax = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| syntax_set.find_syntax_by_extension(ext))
            .or_else(|| syntax_set.find_syntax_by_extension(base))?;

        if syntax.name == "Plain Text" {
            return None;
        }
        Some(Self { syntax_set, syntax })
    }
}

impl Formatter for SyntaxFormatter {
    fn name(&self) -> &str {
        &self.syntax.name
    }

    fn highlight(&self, lines: &[String]) -> Result<Vec<Vec<SyntaxSpan>>, FormatError> {
        let mut state = ParseState::new(self.syntax);
        let mut stack = ScopeStack::new();
        let mut out = Vec::with_capacity(lines.len());

        for line in lines {
            let ops = state
                .parse_line(&format!("{line}\n"), self.syntax_set)
                .map_err(|e| FormatError(e.to_string()))?;

            let mut spans = Vec::new();
            let mut pos = 0;
            for (offset, op) in ops {
                let offset = offset.min(line.len());
                if offset > pos {
                    push_span(&mut spans, pos..offset, classify(&stack));
                    pos = offset;
                }
                stack
                    .apply(&op)
                    .map_err(|e| FormatError(format!("{e:?}")))?;
            }
            if pos < line.len() {
                push_span(&mut spans, pos..line.len(), classify(&stack));
            }
            out.push(spans);
        }

        Ok(out)
    }
}

fn push_span(spans: &mut Vec<SyntaxSpan>, range: Range<usize>, highlight: Option<Highlight>) {
    let Some(highlight) = highlight else {
        return;
    };
    match spans.last_mut() {
        Some(last) if last.highlight == highlight && last.range.end == range.start => {
            last.range.end = range.end;
        }
        _ => spans.push(SyntaxSpan { range, highlight }),
    }
}

fn classify(stack: &ScopeStack) -> Option<Highlight> {
    let names: Vec<String> = stack.as_slice().iter().map(|s| s.build_string()).collect();

    // Comments and strings win over whatever is nested inside them
    if names.iter().any(|n| n.starts_with("comment")) {
        return Some(Highlight::Comment);
    }
    if names.iter().any(|n| n.starts_with("string")) {
        return Some(Highlight::String);
    }
    names.iter().rev().find_map(|n| scope_highlight(n))
}

fn scope_highlight(name: &str) -> Option<Highlight> {
    if name.starts_with("keyword") || name.starts_with("storage.modifier") {
        Some(Highlight::Keyword)
    } else if name.starts_with("storage.type")
        || name.starts_with("entity.name.type")
        || name.starts_with("support.type")
        || name.starts_with("support.class")
    {
        Some(Highlight::Type)
    } else if name.starts_with("storage") {
        Some(Highlight::Keyword)
    } else if name.starts_with("constant") {
        Some(Highlight::Literal)
    } else if name.starts_with("entity.name.function") || name.starts_with("support.function") {
        Some(Highlight::Function)
    } else if name.starts_with("punctuation") {
        Some(Highlight::Punctuation)
    } else {
        None
    }
}

/// Choose the formatter variant for one request
pub fn select_formatter(settings: &PrettySettings) -> Box<dyn Formatter> {
    if !settings.syntax_highlighting {
        return Box::new(PlainFormatter);
    }
    match settings.file_name.as_deref() {
        Some(name) => match SyntaxFormatter::for_file_name(name) {
            Some(formatter) => Box::new(formatter),
            None => {
                debug!("no grammar for {name}, formatting as plain text");
                Box::new(PlainFormatter)
            }
        },
        None => Box::new(PlainFormatter),
    }
}

/// Format the loaded lines of one side.
///
/// `content` is the side being formatted and `other` the opposite side;
/// `edits` relate A to B. Only lines loaded in `content` appear in the
/// result. When B is sparse, highlighting is on and A is whole-file, B's
/// unchanged lines are first borrowed from A so that lexer state flows
/// across the gaps between B's loaded runs.
pub fn format_side(
    side: Side,
    content: &SparseFileContent,
    other: &SparseFileContent,
    edits: &[Edit],
    settings: &PrettySettings,
) -> SparseFormattedFile {
    let formatter = select_formatter(settings);

    let source = if side == Side::B
        && settings.syntax_highlighting
        && other.is_whole_file()
        && !content.is_whole_file()
    {
        match content.apply(other, edits) {
            Ok(full) => Cow::Owned(full),
            Err(err) => {
                debug!("formatting {} without borrowed lines: {err}", content.path());
                Cow::Borrowed(content)
            }
        }
    } else {
        Cow::Borrowed(content)
    };

    let tab_width = settings.tab_width.max(1);
    let mut lines = BTreeMap::new();

    for run in source.runs() {
        let texts: Vec<String> = run
            .clone()
            .filter_map(|i| source.get(i))
            .map(|line| expand_tabs(line, tab_width).into_owned())
            .collect();

        let spans = formatter.highlight(&texts).unwrap_or_else(|err| {
            warn!("{}: {err}, falling back to plain text", content.path());
            vec![Vec::new(); texts.len()]
        });
        let spans = spans.into_iter().chain(std::iter::repeat_with(Vec::new));

        for ((index, text), syntax) in run.zip(texts).zip(spans) {
            if !content.contains(index) {
                continue;
            }

            let edit = edit_at(side, edits, index);
            let intraline = match edit {
                Some(edit) if settings.intraline && edit.kind() == EditKind::Replace => {
                    paired_line(side, other, edit, index, tab_width)
                        .map(|theirs| intraline_changes(side, &text, &theirs))
                        .unwrap_or_default()
                }
                _ => Vec::new(),
            };
            let whitespace_errors = if edit.is_some() && settings.show_whitespace_errors {
                trailing_whitespace(&text)
            } else {
                Vec::new()
            };

            lines.insert(
                index,
                FormattedLine {
                    text,
                    edited: edit.is_some(),
                    syntax,
                    intraline,
                    whitespace_errors,
                },
            );
        }
    }

    SparseFormattedFile {
        path: content.path().to_string(),
        size: content.size(),
        side,
        formatter: formatter.name().to_string(),
        lines,
    }
}

/// The edit covering `index` on `side`, if any
fn edit_at(side: Side, edits: &[Edit], index: usize) -> Option<&Edit> {
    let pos = edits.partition_point(|e| side.range(e).end <= index);
    edits.get(pos).filter(|e| side.range(e).contains(&index))
}

/// The line of the other side sitting at the same offset inside `edit`
fn paired_line(
    side: Side,
    other: &SparseFileContent,
    edit: &Edit,
    index: usize,
    tab_width: usize,
) -> Option<String> {
    let offset = index - side.range(edit).start;
    let theirs = side.other().range(edit);
    if offset >= theirs.len() {
        return None;
    }
    other
        .get(theirs.start + offset)
        .map(|line| expand_tabs(line, tab_width).into_owned())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Word,
    Space,
    Other,
}

fn tokenize(line: &str) -> Vec<Range<usize>> {
    let mut tokens: Vec<Range<usize>> = Vec::new();
    let mut prev = None;
    for (i, c) in line.char_indices() {
        let class = if c.is_alphanumeric() || c == '_' {
            CharClass::Word
        } else if c.is_whitespace() {
            CharClass::Space
        } else {
            CharClass::Other
        };
        let end = i + c.len_utf8();
        match tokens.last_mut() {
            Some(last) if prev == Some(class) && class != CharClass::Other => last.end = end,
            _ => tokens.push(i..end),
        }
        prev = Some(class);
    }
    tokens
}

/// Byte ranges of `ours` that differ from `theirs` at word granularity
fn intraline_changes(side: Side, ours: &str, theirs: &str) -> Vec<Range<usize>> {
    let (old, new) = match side {
        Side::A => (ours, theirs),
        Side::B => (theirs, ours),
    };
    let old_tokens = tokenize(old);
    let new_tokens = tokenize(new);
    let old_words: Vec<&str> = old_tokens.iter().map(|r| &old[r.clone()]).collect();
    let new_words: Vec<&str> = new_tokens.iter().map(|r| &new[r.clone()]).collect();
    let our_tokens = match side {
        Side::A => &old_tokens,
        Side::B => &new_tokens,
    };

    let mut changes: Vec<Range<usize>> = Vec::new();
    for op in similar::capture_diff_slices(Algorithm::Myers, &old_words, &new_words) {
        if op.tag() == DiffTag::Equal {
            continue;
        }
        let tokens = match side {
            Side::A => op.old_range(),
            Side::B => op.new_range(),
        };
        if tokens.is_empty() {
            continue;
        }
        let range = our_tokens[tokens.start].start..our_tokens[tokens.end - 1].end;
        match changes.last_mut() {
            Some(last) if last.end == range.start => last.end = range.end,
            _ => changes.push(range),
        }
    }
    changes
}

fn trailing_whitespace(text: &str) -> Vec<Range<usize>> {
    let trimmed = text.trim_end_matches([' ', '\t', '\r']);
    if trimmed.len() < text.len() {
        vec![trimmed.len()..text.len()]
    } else {
        Vec::new()
    }
}

/// Replace tabs with spaces up to the next multiple of `width` columns
pub fn expand_tabs(line: &str, width: usize) -> Cow<'_, str> {
    if !line.contains('\t') {
        return Cow::Borrowed(line);
    }
    let width = width.max(1);
    let mut out = String::with_capacity(line.len() + width);
    let mut column = 0;
    for c in line.chars() {
        if c == '\t' {
            let pad = width - column % width;
            out.extend(std::iter::repeat(' ').take(pad));
            column += pad;
        } else {
            out.push(c);
            column += 1;
        }
    }
    Cow::Owned(out)
}
