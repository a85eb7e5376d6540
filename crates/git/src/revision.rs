use derive_more::Display;

/// Where the content of one side of a diff comes from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display)]
pub enum Revision {
    /// Anything `git rev-parse` understands: a hash, branch, tag or `HEAD~2`
    #[display(fmt = "{}", _0)]
    Commit(String),

    /// The staging area
    #[display(fmt = "INDEX")]
    Index,

    /// Files on disk in the working directory
    #[display(fmt = "WORKDIR")]
    WorkDir,
}

impl Revision {
    /// Parse a revision name. `INDEX` and `WORKDIR` (any case) name the
    /// staging area and the working directory; everything else is a commit-ish.
    pub fn parse(name: &str) -> Self {
        if name.eq_ignore_ascii_case("INDEX") {
            Revision::Index
        } else if name.eq_ignore_ascii_case("WORKDIR") {
            Revision::WorkDir
        } else {
            Revision::Commit(name.to_string())
        }
    }
}

impl From<&str> for Revision {
    fn from(name: &str) -> Self {
        Revision::parse(name)
    }
}
