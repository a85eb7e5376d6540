use derive_more::Display;
use log::warn;
use std::borrow::Cow;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Which whitespace differences are ignored when comparing lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Whitespace {
    /// Lines must match exactly
    #[default]
    #[display(fmt = "IGNORE_NONE")]
    IgnoreNone,

    /// Trailing whitespace is ignored
    #[display(fmt = "IGNORE_SPACE_AT_EOL")]
    IgnoreSpaceAtEol,

    /// Any run of whitespace compares equal to any other run
    #[display(fmt = "IGNORE_SPACE_CHANGE")]
    IgnoreSpaceChange,

    /// All whitespace is ignored
    #[display(fmt = "IGNORE_ALL_SPACE")]
    IgnoreAllSpace,
}

/// Returned when a whitespace mode name is not recognized
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown whitespace mode `{0}`")]
pub struct UnknownWhitespace(pub String);

impl Whitespace {
    /// Check if any whitespace difference is being ignored
    pub fn is_ignoring(self) -> bool {
        self != Whitespace::IgnoreNone
    }

    /// Parse a mode name, falling back to `IgnoreNone` for unknown names
    pub fn parse_lenient(name: &str) -> Self {
        name.parse().unwrap_or_else(|err: UnknownWhitespace| {
            warn!("{err}, comparing whitespace exactly");
            Whitespace::IgnoreNone
        })
    }

    /// The comparison key for `line` under this mode.
    ///
    /// Only equality of keys matters; keys are never displayed.
    pub fn normalize(self, line: &str) -> Cow<'_, str> {
        match self {
            Whitespace::IgnoreNone => Cow::Borrowed(line),
            Whitespace::IgnoreSpaceAtEol => Cow::Borrowed(line.trim_end()),
            Whitespace::IgnoreSpaceChange => {
                let trimmed = line.trim_end();
                let mut key = String::with_capacity(trimmed.len());
                let mut in_space = false;
                for c in trimmed.chars() {
                    if c.is_whitespace() {
                        if !in_space {
                            key.push(' ');
                        }
                        in_space = true;
                    } else {
                        key.push(c);
                        in_space = false;
                    }
                }
                Cow::Owned(key)
            }
            Whitespace::IgnoreAllSpace => {
                if line.chars().any(char::is_whitespace) {
                    Cow::Owned(line.chars().filter(|c| !c.is_whitespace()).collect())
                } else {
                    Cow::Borrowed(line)
                }
            }
        }
    }

    /// Like [`Whitespace::normalize`], but keeps a borrowed line borrowed
    pub fn normalize_cow<'a>(self, line: Cow<'a, str>) -> Cow<'a, str> {
        match line {
            Cow::Borrowed(line) => self.normalize(line),
            Cow::Owned(line) => Cow::Owned(self.normalize(&line).into_owned()),
        }
    }
}

impl FromStr for Whitespace {
    type Err = UnknownWhitespace;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "ignore_none" => Ok(Whitespace::IgnoreNone),
            "eol" | "ignore_space_at_eol" => Ok(Whitespace::IgnoreSpaceAtEol),
            "change" | "ignore_space_change" => Ok(Whitespace::IgnoreSpaceChange),
            "all" | "ignore_all_space" => Ok(Whitespace::IgnoreAllSpace),
            _ => Err(UnknownWhitespace(s.to_string())),
        }
    }
}
