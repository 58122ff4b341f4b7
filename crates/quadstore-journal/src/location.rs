//! Storage locations and journal file discovery.

use std::path::{Path, PathBuf};

/// Name of the journal file inside a storage directory.
pub const JOURNAL_FILE: &str = "journal.jrnl";

/// Where a dataset keeps its files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// Purely in-memory; nothing is persisted.
    Mem,
    /// A directory on disk.
    Dir(PathBuf),
}

impl Location {
    /// A directory location.
    pub fn dir<P: Into<PathBuf>>(path: P) -> Self {
        Location::Dir(path.into())
    }

    /// Returns `true` for in-memory locations.
    pub fn is_mem(&self) -> bool {
        matches!(self, Location::Mem)
    }

    /// Path of `name` inside this location; `None` when in memory.
    pub fn absolute(&self, name: &str) -> Option<PathBuf> {
        match self {
            Location::Mem => None,
            Location::Dir(dir) => Some(dir.join(name)),
        }
    }

    /// Path of the journal file; `None` when in memory.
    pub fn journal_path(&self) -> Option<PathBuf> {
        self.absolute(JOURNAL_FILE)
    }
}

impl From<&Path> for Location {
    fn from(path: &Path) -> Self {
        Location::Dir(path.to_path_buf())
    }
}
