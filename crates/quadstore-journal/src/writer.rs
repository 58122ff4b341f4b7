//! Append path.

use crate::checksum::{frame_checksum, CHECKSUM_SIZE};
use crate::entry::{Block, ByteBuffer, FileRef, JournalEntry};
use crate::errors::JournalError;
use crate::frame::{EntryKind, FrameHeader, HEADER_SIZE, NO_ID};
use crate::journal::Journal;
use tracing::{debug, warn};

impl Journal {
    /// Appends an entry as one frame and returns the frame's offset.
    ///
    /// The first successful append stamps the entry's start and end
    /// offsets; appending an already written entry writes a new frame but
    /// leaves the recorded offsets alone.
    ///
    /// Appends never sync; call [`sync`](Journal::sync) at commit boundaries.
    ///
    /// # Errors
    ///
    /// - [`JournalError::InvalidEntry`] if the kind and payload disagree
    /// - [`JournalError::Io`] if the channel write fails; any bytes of the
    ///   failed frame written past the previous end are discarded and the
    ///   write cursor stays where it was
    /// - [`JournalError::UseAfterClose`] if the journal is closed
    pub fn append(&self, entry: &mut JournalEntry) -> Result<u64, JournalError> {
        let payload = entry.payload();
        let (start, end) = self.write_frame(
            entry.kind(),
            entry.file_ref(),
            payload.bytes(),
            payload.block_id(),
        )?;
        entry.stamp(start, end);
        Ok(start)
    }

    /// Appends a frame for a raw buffer without building an entry.
    pub fn write_buffer(
        &self,
        kind: EntryKind,
        file_ref: FileRef,
        buffer: &ByteBuffer,
    ) -> Result<u64, JournalError> {
        self.write_frame(kind, file_ref, buffer, None)
            .map(|(start, _)| start)
    }

    /// Appends a block frame without building an entry.
    pub fn write_block(&self, file_ref: FileRef, block: &Block) -> Result<u64, JournalError> {
        self.write_frame(EntryKind::Block, file_ref, block.buffer(), Some(block.id()))
            .map(|(start, _)| start)
    }

    fn write_frame(
        &self,
        kind: EntryKind,
        file_ref: FileRef,
        bytes: &ByteBuffer,
        block_id: Option<u32>,
    ) -> Result<(u64, u64), JournalError> {
        let frame = encode_frame(kind, file_ref, bytes, block_id)?;

        self.with_state(|state| {
            let start = state.position;
            let size = state.channel.size()?;
            if let Err(e) = state.channel.write_at(start, &frame) {
                // Drop whatever part of the frame landed past the old end so
                // the next append does not leave a torn frame behind it.
                let _ = state.channel.truncate(size.max(start));
                warn!(offset = start, error = %e, "journal append failed");
                return Err(e.into());
            }
            let end = start + frame.len() as u64;
            state.position = end;
            debug!(
                offset = start,
                kind = ?kind,
                file_ref = file_ref.id(),
                capacity = bytes.capacity(),
                "journal frame appended"
            );
            Ok((start, end))
        })
    }
}

/// Builds the full on-disk frame: header, zero-padded payload, checksum.
pub(crate) fn encode_frame(
    kind: EntryKind,
    file_ref: FileRef,
    bytes: &ByteBuffer,
    block_id: Option<u32>,
) -> Result<Vec<u8>, JournalError> {
    match (kind, block_id) {
        (EntryKind::Block, None) => {
            return Err(JournalError::InvalidEntry(
                "Block kind without block payload".to_string(),
            ))
        }
        (EntryKind::RawUpdate, Some(_)) => {
            return Err(JournalError::InvalidEntry(
                "block payload without Block kind".to_string(),
            ))
        }
        _ => {}
    }

    let capacity = u32::try_from(bytes.capacity()).map_err(|_| {
        JournalError::InvalidEntry(format!(
            "payload capacity {} does not fit a frame header",
            bytes.capacity()
        ))
    })?;

    let header = FrameHeader {
        kind,
        capacity,
        file_ref,
        block_id: block_id.unwrap_or(NO_ID),
    };

    let payload_end = HEADER_SIZE + bytes.capacity();
    let mut frame = Vec::with_capacity(payload_end + CHECKSUM_SIZE);
    frame.extend_from_slice(&header.to_bytes());
    frame.extend_from_slice(bytes.as_slice());
    // Padding past the logical length is always written as zeros.
    frame.resize(payload_end, 0);

    let checksum = frame_checksum(&frame[..HEADER_SIZE], &frame[HEADER_SIZE..]);
    frame.extend_from_slice(&checksum.to_be_bytes());
    Ok(frame)
}
