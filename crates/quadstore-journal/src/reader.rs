//! Read path.

use crate::channel::BufferChannel;
use crate::checksum::{self, CHECKSUM_SIZE};
use crate::entry::{Block, ByteBuffer, JournalEntry, Payload};
use crate::errors::JournalError;
use crate::frame::{EntryKind, FrameHeader, HEADER_SIZE};
use crate::journal::Journal;
use tracing::warn;

impl Journal {
    /// Reads the frame starting at `offset`.
    ///
    /// The returned entry carries `offset` as its start and the offset just
    /// past the frame as its end. The write cursor is not moved.
    ///
    /// # Errors
    ///
    /// - [`JournalError::Corrupt`] if the frame is cut short, has an unknown
    ///   kind, or fails its checksum
    /// - [`JournalError::Io`] if the channel read fails
    /// - [`JournalError::UseAfterClose`] if the journal is closed
    pub fn read_at(&self, offset: u64) -> Result<JournalEntry, JournalError> {
        self.with_state(|state| read_frame(state.channel.as_mut(), offset))
            .inspect_err(|e| {
                if e.is_corrupt() {
                    warn!(offset, error = %e, "corrupt journal frame");
                }
            })
    }
}

/// Decodes one frame at `offset`.
pub(crate) fn read_frame(
    channel: &mut dyn BufferChannel,
    offset: u64,
) -> Result<JournalEntry, JournalError> {
    let mut header_bytes = [0u8; HEADER_SIZE];
    read_exact_at(channel, offset, &mut header_bytes, offset)?;
    let header = FrameHeader::from_bytes(&header_bytes, offset)?;
    if offset + header.frame_size() > channel.size()? {
        return Err(JournalError::unexpected_eof(offset));
    }

    let mut payload = vec![0u8; header.capacity as usize];
    read_exact_at(channel, offset + HEADER_SIZE as u64, &mut payload, offset)?;

    let mut trailer = [0u8; CHECKSUM_SIZE];
    let trailer_at = offset + HEADER_SIZE as u64 + payload.len() as u64;
    read_exact_at(channel, trailer_at, &mut trailer, offset)?;

    if !checksum::verify(&header_bytes, &payload, u32::from_be_bytes(trailer)) {
        return Err(JournalError::corrupt(offset, "checksum failure"));
    }

    let bytes = ByteBuffer::from_vec(payload);
    let payload = match header.kind {
        EntryKind::Block => Payload::Block(Block::new(header.block_id, bytes)),
        EntryKind::RawUpdate => Payload::Buffer(bytes),
    };

    Ok(JournalEntry::decoded(
        header.kind,
        header.file_ref,
        payload,
        offset,
        offset + header.frame_size(),
    ))
}

/// Fills `buf` from `position`, reporting a short read as corruption of the
/// frame at `frame_offset`.
fn read_exact_at(
    channel: &mut dyn BufferChannel,
    position: u64,
    buf: &mut [u8],
    frame_offset: u64,
) -> Result<(), JournalError> {
    let n = channel.read_at(position, buf)?;
    if n < buf.len() {
        return Err(JournalError::unexpected_eof(frame_offset));
    }
    Ok(())
}
