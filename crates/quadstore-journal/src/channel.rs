//! Random-access byte stores backing a journal.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// A single random-access byte store.
///
/// All I/O is positioned; the journal keeps its own write cursor, so reads
/// never disturb where the next frame lands.
pub trait BufferChannel: Send {
    /// Reads into `buf` starting at `position`.
    ///
    /// Fills as much of `buf` as the channel holds and returns the count; a
    /// count below `buf.len()` means end of data was reached.
    fn read_at(&mut self, position: u64, buf: &mut [u8]) -> io::Result<usize>;

    /// Writes all of `buf` starting at `position`.
    fn write_at(&mut self, position: u64, buf: &[u8]) -> io::Result<()>;

    /// Current size in bytes.
    fn size(&mut self) -> io::Result<u64>;

    /// Discards bytes beyond `size`. Never grows the channel.
    fn truncate(&mut self, size: u64) -> io::Result<()>;

    /// Forces written bytes to stable storage.
    fn sync(&mut self) -> io::Result<()>;

    /// Backing file, if any.
    fn path(&self) -> Option<&Path> {
        None
    }
}

/// Channel over a file on disk.
#[derive(Debug)]
pub struct FileChannel {
    file: File,
    path: PathBuf,
}

impl FileChannel {
    /// Opens `path` for reading and writing, creating it if `create` is set.
    pub fn open<P: AsRef<Path>>(path: P, create: bool) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(create)
            .truncate(false)
            .open(&path)?;
        Ok(Self { file, path })
    }
}

impl BufferChannel for FileChannel {
    fn read_at(&mut self, position: u64, buf: &mut [u8]) -> io::Result<usize> {
        self.file.seek(SeekFrom::Start(position))?;
        let mut filled = 0;
        while filled < buf.len() {
            match self.file.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(filled)
    }

    fn write_at(&mut self, position: u64, buf: &[u8]) -> io::Result<()> {
        self.file.seek(SeekFrom::Start(position))?;
        self.file.write_all(buf)?;
        self.file.flush()
    }

    fn size(&mut self) -> io::Result<u64> {
        Ok(self.file.metadata()?.len())
    }

    fn truncate(&mut self, size: u64) -> io::Result<()> {
        if size < self.size()? {
            self.file.set_len(size)?;
        }
        Ok(())
    }

    fn sync(&mut self) -> io::Result<()> {
        self.file.sync_all()
    }

    fn path(&self) -> Option<&Path> {
        Some(&self.path)
    }
}

/// Channel held entirely in memory.
#[derive(Debug, Default, Clone)]
pub struct MemChannel {
    bytes: Vec<u8>,
}

impl MemChannel {
    /// Creates an empty channel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a channel holding `bytes`.
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }
}

impl BufferChannel for MemChannel {
    fn read_at(&mut self, position: u64, buf: &mut [u8]) -> io::Result<usize> {
        let len = self.bytes.len() as u64;
        if position >= len {
            return Ok(0);
        }
        let start = position as usize;
        let n = buf.len().min(self.bytes.len() - start);
        buf[..n].copy_from_slice(&self.bytes[start..start + n]);
        Ok(n)
    }

    fn write_at(&mut self, position: u64, buf: &[u8]) -> io::Result<()> {
        let start = usize::try_from(position)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "position out of range"))?;
        let end = start + buf.len();
        if end > self.bytes.len() {
            self.bytes.resize(end, 0);
        }
        self.bytes[start..end].copy_from_slice(buf);
        Ok(())
    }

    fn size(&mut self) -> io::Result<u64> {
        Ok(self.bytes.len() as u64)
    }

    fn truncate(&mut self, size: u64) -> io::Result<()> {
        if size < self.bytes.len() as u64 {
            self.bytes.truncate(size as usize);
        }
        Ok(())
    }

    fn sync(&mut self) -> io::Result<()> {
        Ok(())
    }
}
