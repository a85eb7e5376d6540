use anyhow::{anyhow, Context, Result};
use git2::{Commit, ErrorCode, ObjectType, Oid, Repository as Git2Repository, Sort};
use log::debug;
use patch_diff::{ContentSource, FileRef, HistoryEntry, PatchError};
use std::path::{Path, PathBuf};

use crate::revision::Revision;

/// A wrapper around git2::Repository that serves file revisions
pub struct Repository {
    /// The underlying git2 repository
    inner: Git2Repository,
    /// The repository's working directory
    work_dir: PathBuf,
}

impl Repository {
    /// Open the git repository containing the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let repo = Git2Repository::discover(path)
            .with_context(|| format!("Failed to discover git repository at {}", path.display()))?;

        let work_dir = repo
            .workdir()
            .ok_or_else(|| anyhow!("Repository has no working directory"))?
            .to_path_buf();

        Ok(Self {
            inner: repo,
            work_dir,
        })
    }

    /// Get the repository's working directory
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Commits reachable from HEAD that changed `path`, newest first.
    ///
    /// A commit counts as a change when the blob at `path` differs from its
    /// first parent's, including the commit that added or deleted it.
    pub fn file_history(&self, path: &str, max_count: usize) -> Result<Vec<HistoryEntry>> {
        let clean = normalize_path(path)
            .ok_or_else(|| anyhow!("{path} is not a path inside the repository"))?;

        let mut revwalk = self.inner.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
        revwalk
            .push_head()
            .context("Failed to start history walk at HEAD")?;

        let mut history = Vec::new();
        for oid in revwalk {
            if history.len() >= max_count {
                break;
            }

            let commit = self.inner.find_commit(oid?)?;
            let current = blob_id(&commit, &clean)?;
            let previous = if commit.parent_count() > 0 {
                blob_id(&commit.parent(0)?, &clean)?
            } else {
                None
            };

            if current != previous {
                history.push(history_entry(&commit));
            }
        }

        debug!("{path}: {} commits in history", history.len());
        Ok(history)
    }

    fn commit_content(&self, spec: &str, path: &Path, file: &FileRef) -> patch_diff::Result<Vec<u8>> {
        let commit = self
            .inner
            .revparse_single(spec)
            .and_then(|obj| obj.peel_to_commit())
            .map_err(|e| lookup_error(e, file))?;
        let tree = commit.tree().map_err(source_error)?;
        let entry = tree.get_path(path).map_err(|e| lookup_error(e, file))?;

        // Directories and submodules have no content to diff
        if entry.kind() != Some(ObjectType::Blob) {
            return Err(file.not_found());
        }

        let blob = self.inner.find_blob(entry.id()).map_err(source_error)?;
        Ok(blob.content().to_vec())
    }

    fn index_content(&self, path: &Path, file: &FileRef) -> patch_diff::Result<Vec<u8>> {
        let index = self.inner.index().map_err(source_error)?;
        let entry = index.get_path(path, 0).ok_or_else(|| file.not_found())?;
        let blob = self.inner.find_blob(entry.id).map_err(source_error)?;
        Ok(blob.content().to_vec())
    }

    fn working_content(&self, path: &Path, file: &FileRef) -> patch_diff::Result<Vec<u8>> {
        let full_path = self.work_dir.join(path);
        if !full_path.is_file() {
            return Err(file.not_found());
        }
        std::fs::read(&full_path).map_err(source_error)
    }
}

impl ContentSource for Repository {
    fn load(&self, file: &FileRef) -> patch_diff::Result<Vec<u8>> {
        let path = normalize_path(&file.path).ok_or_else(|| file.not_found())?;
        let revision = Revision::parse(&file.revision);
        debug!("loading {} at {revision}", path.display());

        match revision {
            Revision::Commit(spec) => self.commit_content(&spec, &path, file),
            Revision::Index => self.index_content(&path, file),
            Revision::WorkDir => self.working_content(&path, file),
        }
    }
}

/// Clean a repository-relative path, rejecting ones that leave the repository
fn normalize_path(path: &str) -> Option<PathBuf> {
    let clean = path_clean::clean(path.trim_start_matches('/'));
    if clean == Path::new(".") || clean.starts_with("..") {
        return None;
    }
    Some(clean)
}

fn blob_id(commit: &Commit<'_>, path: &Path) -> Result<Option<Oid>, git2::Error> {
    match commit.tree()?.get_path(path) {
        Ok(entry) => Ok(Some(entry.id())),
        Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

fn history_entry(commit: &Commit<'_>) -> HistoryEntry {
    let summary = commit
        .message()
        .unwrap_or("")
        .lines()
        .next()
        .unwrap_or("")
        .to_string();

    HistoryEntry {
        revision: commit.id().to_string(),
        summary,
        author: commit.author().name().unwrap_or("Unknown").to_string(),
        time: commit.time().seconds(),
    }
}

fn lookup_error(err: git2::Error, file: &FileRef) -> PatchError {
    match err.code() {
        ErrorCode::NotFound | ErrorCode::InvalidSpec | ErrorCode::Ambiguous | ErrorCode::Peel => {
            file.not_found()
        }
        _ => source_error(err),
    }
}

fn source_error<E>(err: E) -> PatchError
where
    E: std::error::Error + Send + Sync + 'static,
{
    PatchError::Source(Box::new(err))
}
