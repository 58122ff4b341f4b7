//! Frame header layout.
//!
//! A frame is a 16-byte header, `payload_capacity` payload bytes (zero
//! padded), then a 4-byte checksum trailer. All integers are big-endian.
//!
//! ```text
//! 0   kind_tag          1 = raw update, 2 = block
//! 4   payload_capacity
//! 8   file_ref_id
//! 12  block_id          NO_ID unless kind is block
//! 16  payload
//! N   adler32 over [0, 16 + payload_capacity)
//! ```

use crate::checksum::CHECKSUM_SIZE;
use crate::entry::FileRef;
use crate::errors::JournalError;
use serde::Serialize;

/// Header size in bytes: four 4-byte integers.
pub const HEADER_SIZE: usize = 16;

/// Block id written for frames that do not carry a block.
pub const NO_ID: u32 = 5;

/// Entry kind tag: raw update.
pub const KIND_RAW_UPDATE: u32 = 1;

/// Entry kind tag: block.
pub const KIND_BLOCK: u32 = 2;

/// Total on-disk size of a frame with the given payload capacity.
pub const fn frame_size(capacity: u32) -> u64 {
    (HEADER_SIZE + CHECKSUM_SIZE) as u64 + capacity as u64
}

/// Kind of a journal entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// Generic write of raw update bytes.
    RawUpdate,
    /// A whole data block.
    Block,
}

impl EntryKind {
    /// Decodes a kind tag; `None` for unknown tags.
    pub fn from_tag(tag: u32) -> Option<Self> {
        match tag {
            KIND_RAW_UPDATE => Some(EntryKind::RawUpdate),
            KIND_BLOCK => Some(EntryKind::Block),
            _ => None,
        }
    }

    /// The tag written into frame headers.
    pub fn tag(self) -> u32 {
        match self {
            EntryKind::RawUpdate => KIND_RAW_UPDATE,
            EntryKind::Block => KIND_BLOCK,
        }
    }
}

/// Decoded frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Entry kind.
    pub kind: EntryKind,
    /// Full payload capacity in bytes.
    pub capacity: u32,
    /// Target file reference.
    pub file_ref: FileRef,
    /// Block id, or [`NO_ID`].
    pub block_id: u32,
}

impl FrameHeader {
    /// Serializes the header to bytes.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[0..4].copy_from_slice(&self.kind.tag().to_be_bytes());
        bytes[4..8].copy_from_slice(&self.capacity.to_be_bytes());
        bytes[8..12].copy_from_slice(&self.file_ref.id().to_be_bytes());
        bytes[12..16].copy_from_slice(&self.block_id.to_be_bytes());
        bytes
    }

    /// Deserializes a header read from the frame at `offset`.
    pub fn from_bytes(bytes: &[u8; HEADER_SIZE], offset: u64) -> Result<Self, JournalError> {
        let tag = read_u32(bytes, 0);
        let kind = EntryKind::from_tag(tag).ok_or_else(|| {
            JournalError::corrupt(offset, format!("unknown entry kind {}", tag))
        })?;

        Ok(Self {
            kind,
            capacity: read_u32(bytes, 4),
            file_ref: FileRef::new(read_u32(bytes, 8)),
            block_id: read_u32(bytes, 12),
        })
    }

    /// On-disk size of the frame this header starts.
    pub fn frame_size(&self) -> u64 {
        frame_size(self.capacity)
    }
}

fn read_u32(bytes: &[u8; HEADER_SIZE], at: usize) -> u32 {
    u32::from_be_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}
