use thiserror::Error;

/// Errors that can occur during journal operations.
///
/// Every failure surfaces synchronously; the journal never repairs or skips
/// damaged frames on its own.
#[derive(Error, Debug)]
pub enum JournalError {
    /// The caller-built entry violates framing invariants.
    #[error("invalid journal entry: {0}")]
    InvalidEntry(String),
    /// Unexpected end of stream mid-frame, or a checksum mismatch.
    #[error("corrupt journal at offset {offset}: {reason}")]
    Corrupt {
        /// Byte offset of the frame that failed to decode.
        offset: u64,
        /// Reason for the failure.
        reason: String,
    },
    /// I/O error from the underlying channel.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The journal has been closed.
    #[error("journal used after close")]
    UseAfterClose,
}

impl JournalError {
    pub(crate) fn corrupt(offset: u64, reason: impl Into<String>) -> Self {
        JournalError::Corrupt {
            offset,
            reason: reason.into(),
        }
    }

    pub(crate) fn unexpected_eof(offset: u64) -> Self {
        Self::corrupt(offset, "unexpected end of file")
    }

    /// Returns `true` for [`JournalError::Corrupt`].
    pub fn is_corrupt(&self) -> bool {
        matches!(self, JournalError::Corrupt { .. })
    }

    /// Offset of the damaged frame, if this is a corruption error.
    pub fn corrupt_offset(&self) -> Option<u64> {
        match self {
            JournalError::Corrupt { offset, .. } => Some(*offset),
            _ => None,
        }
    }
}
