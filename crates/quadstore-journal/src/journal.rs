//! Journal handle, options, and lifecycle.

use crate::channel::{BufferChannel, FileChannel, MemChannel};
use crate::errors::JournalError;
use crate::location::Location;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Options for opening a journal.
#[derive(Debug, Clone)]
pub struct JournalOptions {
    /// Whether to create the journal file if it doesn't exist (default: true).
    pub create: bool,
    /// Whether to fsync when the journal is closed or dropped (default: true).
    pub sync_on_close: bool,
}

impl Default for JournalOptions {
    fn default() -> Self {
        Self {
            create: true,
            sync_on_close: true,
        }
    }
}

/// Channel and write cursor, guarded together.
pub(crate) struct State {
    pub(crate) channel: Box<dyn BufferChannel>,
    pub(crate) position: u64,
}

/// Append-only, randomly readable write-ahead journal.
///
/// Writes are strictly ordered appends at the write cursor; reads are by
/// offset and never move the cursor. One lock guards the channel and the
/// cursor, so a `Journal` can be shared between threads by reference.
///
/// # Example
///
/// ```rust
/// use quadstore_journal::{ByteBuffer, FileRef, Journal, JournalEntry, Location};
///
/// let journal = Journal::create(&Location::Mem)?;
/// let mut entry = JournalEntry::raw_update(FileRef::new(7), ByteBuffer::from_vec(b"update".to_vec()));
/// let offset = journal.append(&mut entry)?;
///
/// let read = journal.read_at(offset)?;
/// assert_eq!(read.buffer().map(|b| b.as_slice()), Some(&b"update"[..]));
/// # Ok::<(), quadstore_journal::JournalError>(())
/// ```
pub struct Journal {
    state: Mutex<Option<State>>,
    path: Option<PathBuf>,
    sync_on_close: bool,
}

impl Journal {
    /// Returns `true` if a journal file exists at `location`.
    ///
    /// Always `false` for in-memory locations.
    pub fn exists(location: &Location) -> bool {
        match location.journal_path() {
            Some(path) => path.exists(),
            None => false,
        }
    }

    /// Opens the journal for `location` with default options.
    pub fn create(location: &Location) -> Result<Self, JournalError> {
        Self::open(location, JournalOptions::default())
    }

    /// Opens the journal for `location`.
    ///
    /// The write cursor starts at the end of any existing content, so new
    /// frames never overwrite committed ones. Recovery that wants to rewrite
    /// a damaged tail calls [`truncate`](Self::truncate) first.
    ///
    /// # Errors
    ///
    /// Returns [`JournalError::Io`] if the journal file cannot be opened, or
    /// does not exist and `options.create` is `false`.
    pub fn open(location: &Location, options: JournalOptions) -> Result<Self, JournalError> {
        let (channel, path): (Box<dyn BufferChannel>, _) = match location.journal_path() {
            None => (Box::new(MemChannel::new()), None),
            Some(path) => (Box::new(FileChannel::open(&path, options.create)?), Some(path)),
        };

        let mut journal = Self::with_channel(channel)?;
        journal.path = path;
        journal.sync_on_close = options.sync_on_close;
        debug!(path = ?journal.path, position = journal.position()?, "journal opened");
        Ok(journal)
    }

    /// Wraps an existing channel; the write cursor starts at its end.
    ///
    /// # Errors
    ///
    /// Returns [`JournalError::Io`] if the channel size cannot be read.
    pub fn with_channel(mut channel: Box<dyn BufferChannel>) -> Result<Self, JournalError> {
        let position = channel.size()?;
        Ok(Self {
            state: Mutex::new(Some(State { channel, position })),
            path: None,
            sync_on_close: false,
        })
    }

    /// Backing file path, if the journal is on disk.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn lock(&self) -> MutexGuard<'_, Option<State>> {
        // State is only updated after channel I/O succeeds, so it stays
        // consistent even if a holder panicked.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `f` under the journal lock.
    pub(crate) fn with_state<R>(
        &self,
        f: impl FnOnce(&mut State) -> Result<R, JournalError>,
    ) -> Result<R, JournalError> {
        let mut guard = self.lock();
        let state = guard.as_mut().ok_or(JournalError::UseAfterClose)?;
        f(state)
    }

    /// Forces all written bytes to stable storage.
    ///
    /// Appends never sync on their own; the transaction layer calls this at
    /// commit boundaries.
    pub fn sync(&self) -> Result<(), JournalError> {
        self.with_state(|state| Ok(state.channel.sync()?))
    }

    /// Syncs (when `sync_on_close` is set) and releases the channel. Every
    /// later operation fails with [`JournalError::UseAfterClose`].
    ///
    /// If the sync fails the error is returned and the journal stays open,
    /// so the caller can retry or keep using it.
    pub fn close(&self) -> Result<(), JournalError> {
        let mut guard = self.lock();
        let state = guard.as_mut().ok_or(JournalError::UseAfterClose)?;
        if self.sync_on_close {
            state.channel.sync()?;
        }
        guard.take();
        debug!(path = ?self.path, "journal closed");
        Ok(())
    }

    /// Returns `true` once [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.lock().is_none()
    }

    /// Current size of the journal in bytes.
    pub fn size(&self) -> Result<u64, JournalError> {
        self.with_state(|state| Ok(state.channel.size()?))
    }

    /// Discards everything beyond `size`.
    ///
    /// Used by recovery to cut a damaged or incomplete tail frame. The write
    /// cursor is pulled back to `size` if it was past it.
    pub fn truncate(&self, size: u64) -> Result<(), JournalError> {
        self.with_state(|state| {
            state.channel.truncate(size)?;
            if state.position > size {
                state.position = size;
            }
            debug!(size, "journal truncated");
            Ok(())
        })
    }

    /// Offset where the next frame will be written.
    pub fn position(&self) -> Result<u64, JournalError> {
        self.with_state(|state| Ok(state.position))
    }

    /// Moves the write cursor.
    pub fn set_position(&self, position: u64) -> Result<(), JournalError> {
        self.with_state(|state| {
            state.position = position;
            debug!(position, "journal write cursor moved");
            Ok(())
        })
    }

    /// Moves the write cursor to the end of the journal, so writing resumes
    /// after existing frames. Returns the new position.
    pub fn seek_to_end(&self) -> Result<u64, JournalError> {
        self.with_state(|state| {
            state.position = state.channel.size()?;
            Ok(state.position)
        })
    }
}

impl Drop for Journal {
    fn drop(&mut self) {
        if !self.sync_on_close {
            return;
        }
        if let Some(state) = self.lock().as_mut() {
            let _ = state.channel.sync();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{ByteBuffer, FileRef, JournalEntry};
    use tempfile::TempDir;

    #[test]
    fn mem_location_never_exists() {
        let journal = Journal::create(&Location::Mem).unwrap();
        assert!(!Journal::exists(&Location::Mem));
        assert_eq!(journal.path(), None);
        assert_eq!(journal.size().unwrap(), 0);
    }

    #[test]
    fn dir_location_creates_journal_file() {
        let temp_dir = TempDir::new().unwrap();
        let location = Location::dir(temp_dir.path());
        assert!(!Journal::exists(&location));

        let journal = Journal::create(&location).unwrap();
        assert!(Journal::exists(&location));
        assert_eq!(journal.size().unwrap(), 0);
        assert_eq!(journal.path(), location.journal_path().as_deref());
    }

    #[test]
    fn open_without_create_fails_for_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let options = JournalOptions {
            create: false,
            ..JournalOptions::default()
        };
        let result = Journal::open(&Location::dir(temp_dir.path()), options);
        assert!(matches!(result, Err(JournalError::Io(_))));
    }

    #[test]
    fn operations_after_close_fail() {
        let journal = Journal::create(&Location::Mem).unwrap();
        journal.close().unwrap();
        assert!(journal.is_closed());

        let mut entry = JournalEntry::raw_update(FileRef::new(1), ByteBuffer::new(4));
        assert!(matches!(journal.append(&mut entry), Err(JournalError::UseAfterClose)));
        assert!(!entry.is_written());
        assert!(matches!(journal.read_at(0), Err(JournalError::UseAfterClose)));
        assert!(matches!(journal.entries(), Err(JournalError::UseAfterClose)));
        assert!(matches!(journal.entries_from(20), Err(JournalError::UseAfterClose)));
        assert!(matches!(journal.size(), Err(JournalError::UseAfterClose)));
        assert!(matches!(journal.sync(), Err(JournalError::UseAfterClose)));
        assert!(matches!(journal.truncate(0), Err(JournalError::UseAfterClose)));
        assert!(matches!(journal.position(), Err(JournalError::UseAfterClose)));
        assert!(matches!(journal.set_position(0), Err(JournalError::UseAfterClose)));
        assert!(matches!(journal.seek_to_end(), Err(JournalError::UseAfterClose)));
        assert!(matches!(journal.close(), Err(JournalError::UseAfterClose)));
    }

    #[test]
    fn iterator_fails_once_journal_is_closed() {
        let journal = Journal::create(&Location::Mem).unwrap();
        for _ in 0..2 {
            let mut entry = JournalEntry::raw_update(FileRef::new(1), ByteBuffer::new(4));
            journal.append(&mut entry).unwrap();
        }

        let mut iter = journal.entries().unwrap();
        assert!(iter.next().unwrap().is_ok());
        journal.close().unwrap();

        assert!(matches!(iter.next(), Some(Err(JournalError::UseAfterClose))));
        assert!(!iter.has_more());
        assert!(iter.next().is_none());
    }

    struct FailingSync(MemChannel);

    impl BufferChannel for FailingSync {
        fn read_at(&mut self, position: u64, buf: &mut [u8]) -> std::io::Result<usize> {
            self.0.read_at(position, buf)
        }

        fn write_at(&mut self, position: u64, buf: &[u8]) -> std::io::Result<()> {
            self.0.write_at(position, buf)
        }

        fn size(&mut self) -> std::io::Result<u64> {
            self.0.size()
        }

        fn truncate(&mut self, size: u64) -> std::io::Result<()> {
            self.0.truncate(size)
        }

        fn sync(&mut self) -> std::io::Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "sync failed"))
        }
    }

    #[test]
    fn failed_close_sync_keeps_journal_open() {
        let mut journal = Journal::with_channel(Box::new(FailingSync(MemChannel::new()))).unwrap();
        journal.sync_on_close = true;
        let mut entry = JournalEntry::raw_update(FileRef::new(1), ByteBuffer::new(4));
        journal.append(&mut entry).unwrap();

        assert!(matches!(journal.close(), Err(JournalError::Io(_))));
        assert!(!journal.is_closed());
        assert_eq!(journal.read_at(0).unwrap().file_ref(), FileRef::new(1));

        // Without the close sync the channel is released.
        journal.sync_on_close = false;
        journal.close().unwrap();
        assert!(journal.is_closed());
    }

    #[test]
    fn with_channel_starts_at_end_of_content() {
        let journal = Journal::with_channel(Box::new(MemChannel::from_vec(vec![0; 40]))).unwrap();
        assert_eq!(journal.position().unwrap(), 40);
    }

    #[test]
    fn truncate_clamps_write_cursor() {
        let journal = Journal::with_channel(Box::new(MemChannel::from_vec(vec![0; 64]))).unwrap();
        journal.truncate(24).unwrap();
        assert_eq!(journal.size().unwrap(), 24);
        assert_eq!(journal.position().unwrap(), 24);
    }

    #[test]
    fn truncate_keeps_cursor_before_new_end() {
        let journal = Journal::with_channel(Box::new(MemChannel::from_vec(vec![0; 64]))).unwrap();
        journal.set_position(8).unwrap();
        journal.truncate(24).unwrap();
        assert_eq!(journal.position().unwrap(), 8);
    }

    #[test]
    fn seek_to_end_follows_size() {
        let journal = Journal::with_channel(Box::new(MemChannel::from_vec(vec![0; 40]))).unwrap();
        journal.set_position(0).unwrap();
        assert_eq!(journal.position().unwrap(), 0);
        assert_eq!(journal.seek_to_end().unwrap(), 40);
        assert_eq!(journal.position().unwrap(), 40);
    }
}
