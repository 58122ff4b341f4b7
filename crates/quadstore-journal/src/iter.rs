//! Forward iteration over frames.

use crate::entry::JournalEntry;
use crate::errors::JournalError;
use crate::journal::Journal;
use crate::reader::read_frame;

/// Lazy, single-pass iterator over the frames of a journal.
///
/// The end boundary is the journal size when the iterator is created;
/// frames appended afterwards are not visited. Each step takes the journal
/// lock for one frame only, so writers are never held off for the life of
/// the iterator. After yielding an error the iterator is exhausted.
pub struct JournalIter<'a> {
    journal: &'a Journal,
    cursor: u64,
    end: u64,
    failed: bool,
}

impl JournalIter<'_> {
    /// Offset of the next frame to be read.
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    /// End boundary sampled at creation.
    pub fn end(&self) -> u64 {
        self.end
    }

    /// Returns `true` while frames remain before the end boundary.
    pub fn has_more(&self) -> bool {
        !self.failed && self.cursor < self.end
    }
}

impl Iterator for JournalIter<'_> {
    type Item = Result<JournalEntry, JournalError>;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.has_more() {
            return None;
        }
        let cursor = self.cursor;
        match self
            .journal
            .with_state(|state| read_frame(state.channel.as_mut(), cursor))
        {
            Ok(entry) => {
                self.cursor = entry.end().unwrap_or(self.end);
                Some(Ok(entry))
            }
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

impl std::iter::FusedIterator for JournalIter<'_> {}

impl Journal {
    /// Iterates frames from `start`, which must be a frame boundary.
    ///
    /// # Errors
    ///
    /// Returns an error if the journal size cannot be sampled.
    pub fn entries_from(&self, start: u64) -> Result<JournalIter<'_>, JournalError> {
        Ok(JournalIter {
            journal: self,
            cursor: start,
            end: self.size()?,
            failed: false,
        })
    }

    /// Iterates all frames from the start of the journal.
    pub fn entries(&self) -> Result<JournalIter<'_>, JournalError> {
        self.entries_from(0)
    }
}
