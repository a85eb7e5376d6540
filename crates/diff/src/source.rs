use derive_more::Display;
use std::collections::HashMap;
use std::path::Path;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{PatchError, Result};
use crate::text::FileText;

/// Extensions rendered as images instead of text
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "ico", "webp"];

/// How one side of a diff should be rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DisplayMethod {
    /// Metadata only, e.g. binary or absent content
    #[display(fmt = "NONE")]
    None,

    /// Textual line diff
    #[display(fmt = "DIFF")]
    Diff,

    /// Render as an image
    #[display(fmt = "IMG")]
    Img,
}

impl DisplayMethod {
    /// Classify content by file extension and a binary probe
    pub fn detect(path: &str, content: &[u8]) -> Self {
        let is_image = Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
            .unwrap_or(false);

        if is_image {
            DisplayMethod::Img
        } else if FileText::is_binary(content) {
            DisplayMethod::None
        } else {
            DisplayMethod::Diff
        }
    }
}

/// A path inside one revision
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FileRef {
    pub revision: String,
    pub path: String,
}

impl FileRef {
    pub fn new(revision: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            revision: revision.into(),
            path: path.into(),
        }
    }

    /// The "not found" error for this file
    pub fn not_found(&self) -> PatchError {
        PatchError::NotFound {
            revision: self.revision.clone(),
            path: self.path.clone(),
        }
    }
}

/// Supplies raw file content for a revision.
///
/// Implementations report a missing revision or path as
/// [`PatchError::NotFound`], never as an empty file.
pub trait ContentSource {
    fn load(&self, file: &FileRef) -> Result<Vec<u8>>;

    /// Decide how loaded content should be displayed
    fn display_method(&self, path: &str, content: &[u8]) -> DisplayMethod {
        DisplayMethod::detect(path, content)
    }
}

impl<S: ContentSource + ?Sized> ContentSource for &S {
    fn load(&self, file: &FileRef) -> Result<Vec<u8>> {
        (**self).load(file)
    }

    fn display_method(&self, path: &str, content: &[u8]) -> DisplayMethod {
        (**self).display_method(path, content)
    }
}

/// Content source holding files in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryContentSource {
    files: HashMap<FileRef, Vec<u8>>,
}

impl MemoryContentSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a file, replacing any previous content
    pub fn insert(
        &mut self,
        revision: impl Into<String>,
        path: impl Into<String>,
        content: impl Into<Vec<u8>>,
    ) {
        self.files
            .insert(FileRef::new(revision, path), content.into());
    }

    /// Builder-style variant of [`MemoryContentSource::insert`]
    pub fn with_file(
        mut self,
        revision: impl Into<String>,
        path: impl Into<String>,
        content: impl Into<Vec<u8>>,
    ) -> Self {
        self.insert(revision, path, content);
        self
    }
}

impl ContentSource for MemoryContentSource {
    fn load(&self, file: &FileRef) -> Result<Vec<u8>> {
        self.files.get(file).cloned().ok_or_else(|| file.not_found())
    }
}
