//! In-memory journal entries and their payloads.

use crate::errors::JournalError;
use crate::frame::EntryKind;
use serde::Serialize;
use std::fmt;

/// Identifies the logical file or region an entry applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct FileRef(u32);

impl FileRef {
    /// Creates a file reference from its numeric id.
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the numeric id written into frame headers.
    pub const fn id(self) -> u32 {
        self.0
    }
}

impl fmt::Display for FileRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "file#{}", self.0)
    }
}

/// Fixed-capacity byte buffer with a logical length.
///
/// The journal persists the whole capacity; bytes past [`len`](Self::len)
/// are written as zeros.
#[derive(Clone, PartialEq, Eq)]
pub struct ByteBuffer {
    bytes: Vec<u8>,
    len: usize,
}

impl ByteBuffer {
    /// Creates an empty buffer with the given capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            bytes: vec![0; capacity],
            len: 0,
        }
    }

    /// Wraps a vector; capacity and length are both `bytes.len()`.
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        let len = bytes.len();
        Self { bytes, len }
    }

    /// Creates a buffer of `capacity` bytes holding `contents`.
    pub fn with_contents(contents: &[u8], capacity: usize) -> Result<Self, JournalError> {
        let mut buffer = Self::new(capacity);
        buffer.extend_from_slice(contents)?;
        Ok(buffer)
    }

    /// Allocated capacity; this is what a frame records.
    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    /// Logically used length.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no bytes are in use.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The logically used bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    /// All `capacity` bytes, padding included.
    pub fn as_full_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Appends bytes after the logical end.
    pub fn extend_from_slice(&mut self, data: &[u8]) -> Result<(), JournalError> {
        let end = self.len + data.len();
        if end > self.capacity() {
            return Err(JournalError::InvalidEntry(format!(
                "{} bytes do not fit in buffer with {} of {} bytes free",
                data.len(),
                self.capacity() - self.len,
                self.capacity()
            )));
        }
        self.bytes[self.len..end].copy_from_slice(data);
        self.len = end;
        Ok(())
    }

    /// Sets the logical length without touching the bytes.
    pub fn set_len(&mut self, len: usize) -> Result<(), JournalError> {
        if len > self.capacity() {
            return Err(JournalError::InvalidEntry(format!(
                "length {} exceeds capacity {}",
                len,
                self.capacity()
            )));
        }
        self.len = len;
        Ok(())
    }

    /// Resets the logical length to zero.
    pub fn clear(&mut self) {
        self.len = 0;
    }
}

impl fmt::Debug for ByteBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteBuffer")
            .field("len", &self.len)
            .field("capacity", &self.capacity())
            .finish()
    }
}

/// A storage page: a fixed-capacity buffer with a block id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    id: u32,
    buffer: ByteBuffer,
}

impl Block {
    /// Creates a block.
    pub fn new(id: u32, buffer: ByteBuffer) -> Self {
        Self { id, buffer }
    }

    /// Block id.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// The block's data.
    pub fn buffer(&self) -> &ByteBuffer {
        &self.buffer
    }

    /// Mutable access to the block's data.
    pub fn buffer_mut(&mut self) -> &mut ByteBuffer {
        &mut self.buffer
    }

    /// Consumes the block, returning its data.
    pub fn into_buffer(self) -> ByteBuffer {
        self.buffer
    }
}

/// Entry payload: a raw buffer or a whole block, never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Raw update bytes.
    Buffer(ByteBuffer),
    /// A full data block.
    Block(Block),
}

impl Payload {
    /// The bytes that get framed.
    pub fn bytes(&self) -> &ByteBuffer {
        match self {
            Payload::Buffer(buffer) => buffer,
            Payload::Block(block) => block.buffer(),
        }
    }

    /// Block id, for block payloads.
    pub fn block_id(&self) -> Option<u32> {
        match self {
            Payload::Buffer(_) => None,
            Payload::Block(block) => Some(block.id()),
        }
    }
}

/// One durable operation recorded in the journal.
///
/// `start` and `end` are unset until the entry is first appended. Entries
/// returned by reads always carry them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalEntry {
    kind: EntryKind,
    file_ref: FileRef,
    payload: Payload,
    start: Option<u64>,
    end: Option<u64>,
}

impl JournalEntry {
    /// Creates an entry without checking that `kind` matches `payload`.
    ///
    /// Mismatches are rejected by [`Journal::append`](crate::Journal::append).
    pub fn new(kind: EntryKind, file_ref: FileRef, payload: Payload) -> Self {
        Self {
            kind,
            file_ref,
            payload,
            start: None,
            end: None,
        }
    }

    /// A raw update entry.
    pub fn raw_update(file_ref: FileRef, buffer: ByteBuffer) -> Self {
        Self::new(EntryKind::RawUpdate, file_ref, Payload::Buffer(buffer))
    }

    /// A block entry.
    pub fn block(file_ref: FileRef, block: Block) -> Self {
        Self::new(EntryKind::Block, file_ref, Payload::Block(block))
    }

    pub(crate) fn decoded(
        kind: EntryKind,
        file_ref: FileRef,
        payload: Payload,
        start: u64,
        end: u64,
    ) -> Self {
        Self {
            kind,
            file_ref,
            payload,
            start: Some(start),
            end: Some(end),
        }
    }

    /// Entry kind.
    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    /// Target file reference.
    pub fn file_ref(&self) -> FileRef {
        self.file_ref
    }

    /// The entry payload.
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Consumes the entry, returning its payload.
    pub fn into_payload(self) -> Payload {
        self.payload
    }

    /// The raw buffer, if this entry does not carry a block.
    pub fn buffer(&self) -> Option<&ByteBuffer> {
        match &self.payload {
            Payload::Buffer(buffer) => Some(buffer),
            Payload::Block(_) => None,
        }
    }

    /// The block, if this entry carries one.
    pub fn as_block(&self) -> Option<&Block> {
        match &self.payload {
            Payload::Block(block) => Some(block),
            Payload::Buffer(_) => None,
        }
    }

    /// Block id, for block entries.
    pub fn block_id(&self) -> Option<u32> {
        self.payload.block_id()
    }

    /// Offset of this entry's frame, once written or read.
    pub fn start(&self) -> Option<u64> {
        self.start
    }

    /// Offset immediately after this entry's frame.
    pub fn end(&self) -> Option<u64> {
        self.end
    }

    /// Returns `true` once the entry has a recorded position.
    pub fn is_written(&self) -> bool {
        self.start.is_some()
    }

    /// Records the frame range unless one is already recorded.
    pub(crate) fn stamp(&mut self, start: u64, end: u64) {
        if self.start.is_none() {
            self.start = Some(start);
            self.end = Some(end);
        }
    }
}
