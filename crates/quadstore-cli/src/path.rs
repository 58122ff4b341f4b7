//! Journal path resolution.

use quadstore_journal::{FileChannel, Journal, JournalError, JournalOptions, Location};
use std::path::Path;
use thiserror::Error;

/// Errors from resolving or opening a journal.
#[derive(Debug, Error)]
pub enum PathError {
    #[error("no journal at {0}")]
    NotFound(String),
    #[error(transparent)]
    Journal(#[from] JournalError),
}

/// Opens an existing journal from a storage directory or a journal file.
///
/// Never creates files and never syncs on close; commands that modify the
/// journal sync explicitly.
pub fn open_journal(journal: &str) -> Result<Journal, PathError> {
    let path = Path::new(journal);
    if path.is_dir() {
        let location = Location::dir(path);
        if !Journal::exists(&location) {
            return Err(PathError::NotFound(journal.to_string()));
        }
        let options = JournalOptions {
            create: false,
            sync_on_close: false,
        };
        return Ok(Journal::open(&location, options)?);
    }
    if path.is_file() {
        let channel = FileChannel::open(path, false).map_err(JournalError::from)?;
        return Ok(Journal::with_channel(Box::new(channel))?);
    }
    Err(PathError::NotFound(journal.to_string()))
}
