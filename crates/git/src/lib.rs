// Git integration for patch scripts
// This crate reads file revisions and history out of a git repository

mod repository;
mod revision;

pub use repository::Repository;
pub use revision::Revision;
