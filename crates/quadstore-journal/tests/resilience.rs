use quadstore_journal::{
    frame_size, Block, BufferChannel, ByteBuffer, FileRef, Journal, JournalEntry, JournalError,
    JournalOptions, Location, MemChannel,
};
use std::fs;
use std::io::{self, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

fn raw(file_ref: u32, contents: &[u8], capacity: usize) -> JournalEntry {
    JournalEntry::raw_update(
        FileRef::new(file_ref),
        ByteBuffer::with_contents(contents, capacity).unwrap(),
    )
}

fn create_journal(entries: Vec<JournalEntry>) -> (TempDir, PathBuf, Vec<u64>) {
    let temp_dir = TempDir::new().unwrap();
    let location = Location::dir(temp_dir.path());
    let journal = Journal::create(&location).unwrap();
    let offsets = entries
        .into_iter()
        .map(|mut e| journal.append(&mut e).unwrap())
        .collect();
    journal.close().unwrap();
    let path = location.journal_path().unwrap();
    (temp_dir, path, offsets)
}

fn flip_byte(path: &Path, at: u64) {
    let mut bytes = fs::read(path).unwrap();
    bytes[at as usize] ^= 0xFF;
    fs::write(path, bytes).unwrap();
}

#[test]
fn test_any_flipped_byte_is_detected() {
    let frame_len = frame_size(16);
    for at in 0..frame_len {
        let (temp_dir, path, _) = create_journal(vec![raw(7, b"0123456789", 16)]);
        flip_byte(&path, at);

        let journal = Journal::create(&Location::dir(temp_dir.path())).unwrap();
        let err = journal.read_at(0).unwrap_err();
        assert_eq!(err.corrupt_offset(), Some(0), "byte {} not detected", at);
    }
}

#[test]
fn test_flipped_block_id_fails_checksum() {
    let page = Block::new(42, ByteBuffer::from_vec(vec![3; 64]));
    let (temp_dir, path, _) =
        create_journal(vec![JournalEntry::block(FileRef::new(1), page)]);
    flip_byte(&path, 15);

    let journal = Journal::create(&Location::dir(temp_dir.path())).unwrap();
    let err = journal.read_at(0).unwrap_err();
    assert!(err.to_string().contains("checksum failure"));
}

#[test]
fn test_corruption_in_later_frame_stops_iteration() {
    let (temp_dir, path, offsets) = create_journal(vec![
        raw(1, b"one", 8),
        raw(2, b"two", 8),
        raw(3, b"three", 8),
    ]);
    flip_byte(&path, offsets[1] + 17);

    let journal = Journal::create(&Location::dir(temp_dir.path())).unwrap();
    let results: Vec<_> = journal.entries().unwrap().collect();
    assert_eq!(results.len(), 2);
    assert!(results[0].is_ok());
    match &results[1] {
        Err(JournalError::Corrupt { offset, reason }) => {
            assert_eq!(*offset, offsets[1]);
            assert_eq!(reason, "checksum failure");
        }
        other => panic!("Expected Corrupt error, got {:?}", other),
    }
}

#[test]
fn test_truncated_frame_fails_at_its_offset() {
    let (temp_dir, path, offsets) = create_journal(vec![
        raw(1, b"first", 16),
        raw(2, b"second", 16),
        raw(3, b"third", 16),
    ]);

    let file = fs::OpenOptions::new().write(true).open(&path).unwrap();
    file.set_len(offsets[1] + 10).unwrap();
    drop(file);

    let journal = Journal::create(&Location::dir(temp_dir.path())).unwrap();
    let mut iter = journal.entries().unwrap();
    let first = iter.next().unwrap().unwrap();
    assert_eq!(first.file_ref(), FileRef::new(1));

    let err = iter.next().unwrap().unwrap_err();
    assert!(err.is_corrupt());
    assert_eq!(err.corrupt_offset(), Some(offsets[1]));
    assert!(err.to_string().contains("unexpected end of file"));
    assert!(iter.next().is_none());
}

#[test]
fn test_read_past_end_is_unexpected_eof() {
    let journal = Journal::create(&Location::Mem).unwrap();
    journal.append(&mut raw(1, b"x", 1)).unwrap();

    let err = journal.read_at(journal.size().unwrap()).unwrap_err();
    assert!(err.to_string().contains("unexpected end of file"));
}

#[test]
fn test_oversized_capacity_in_header_is_unexpected_eof() {
    let (temp_dir, path, _) = create_journal(vec![raw(1, b"tiny", 4)]);

    let mut file = fs::OpenOptions::new().write(true).open(&path).unwrap();
    file.seek(SeekFrom::Start(4)).unwrap();
    file.write_all(&u32::MAX.to_be_bytes()).unwrap();
    drop(file);

    let journal = Journal::create(&Location::dir(temp_dir.path())).unwrap();
    let err = journal.read_at(0).unwrap_err();
    assert!(err.to_string().contains("unexpected end of file"));
}

#[test]
fn test_recovery_truncates_damaged_tail_and_resumes() {
    let (temp_dir, path, offsets) = create_journal(vec![raw(1, b"good", 8), raw(2, b"torn", 8)]);

    let file = fs::OpenOptions::new().write(true).open(&path).unwrap();
    file.set_len(offsets[1] + frame_size(8) - 2).unwrap();
    drop(file);

    let location = Location::dir(temp_dir.path());
    let journal = Journal::open(&location, JournalOptions::default()).unwrap();

    let mut last_good = 0;
    for entry in journal.entries().unwrap() {
        match entry {
            Ok(entry) => last_good = entry.end().unwrap(),
            Err(e) => {
                assert_eq!(e.corrupt_offset(), Some(last_good));
                break;
            }
        }
    }
    assert_eq!(last_good, offsets[1]);

    journal.truncate(last_good).unwrap();
    assert_eq!(journal.seek_to_end().unwrap(), last_good);
    journal.append(&mut raw(3, b"redo", 8)).unwrap();

    let refs: Vec<_> = journal
        .entries()
        .unwrap()
        .map(|e| e.unwrap().file_ref().id())
        .collect();
    assert_eq!(refs, vec![1, 3]);
}

#[test]
fn test_unknown_kind_tag_is_corrupt() {
    let mut bytes = vec![0u8; 20];
    bytes[3] = 9;
    let journal = Journal::with_channel(Box::new(MemChannel::from_vec(bytes))).unwrap();

    let err = journal.read_at(0).unwrap_err();
    assert!(err.to_string().contains("unknown entry kind"));
}

/// In-memory channel whose writes can be made to fail on demand. A failing
/// write lands the first half of the buffer before erroring, like a device
/// that fills up mid-frame.
#[derive(Default)]
struct FaultyChannel {
    inner: MemChannel,
    fail_writes: Arc<AtomicBool>,
}

impl BufferChannel for FaultyChannel {
    fn read_at(&mut self, position: u64, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read_at(position, buf)
    }

    fn write_at(&mut self, position: u64, buf: &[u8]) -> io::Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            self.inner.write_at(position, &buf[..buf.len() / 2])?;
            return Err(io::Error::new(io::ErrorKind::Other, "disk full"));
        }
        self.inner.write_at(position, buf)
    }

    fn size(&mut self) -> io::Result<u64> {
        self.inner.size()
    }

    fn truncate(&mut self, size: u64) -> io::Result<()> {
        self.inner.truncate(size)
    }

    fn sync(&mut self) -> io::Result<()> {
        self.inner.sync()
    }
}

#[test]
fn test_failed_append_leaves_no_torn_frame() {
    let channel = FaultyChannel::default();
    let fail_writes = Arc::clone(&channel.fail_writes);
    let journal = Journal::with_channel(Box::new(channel)).unwrap();

    journal.append(&mut raw(1, b"before", 8)).unwrap();
    let committed = journal.position().unwrap();

    fail_writes.store(true, Ordering::SeqCst);
    let mut failed = raw(2, b"lost", 200);
    assert!(matches!(journal.append(&mut failed), Err(JournalError::Io(_))));
    assert!(!failed.is_written());
    assert_eq!(journal.position().unwrap(), committed);
    assert_eq!(journal.size().unwrap(), committed);

    fail_writes.store(false, Ordering::SeqCst);
    let offset = journal.append(&mut raw(3, b"after", 8)).unwrap();
    assert_eq!(offset, committed);
    assert_eq!(journal.size().unwrap(), journal.position().unwrap());

    let refs: Vec<_> = journal
        .entries()
        .unwrap()
        .map(|e| e.unwrap().file_ref().id())
        .collect();
    assert_eq!(refs, vec![1, 3]);
}
