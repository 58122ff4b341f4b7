//! Checksummed write-ahead journal for the quadstore transaction layer.
//!
//! This crate provides:
//! - Self-describing binary frames (header, zero-padded payload, Adler-32 trailer)
//! - Strictly ordered appends and random reads by offset on one shared journal
//! - Forward iteration for recovery replay
//! - File-backed and in-memory channels
//!
//! The journal records pre-commit changes; it never interprets payloads
//! beyond their framing. Committing, aborting, and applying recovered
//! blocks are the transaction layer's job.
//!
//! ## Quick Start
//!
//! ```rust
//! use quadstore_journal::{Block, ByteBuffer, FileRef, Journal, JournalEntry, Location};
//!
//! let journal = Journal::create(&Location::Mem)?;
//!
//! let mut update = JournalEntry::raw_update(FileRef::new(7), ByteBuffer::with_contents(b"triple", 16)?);
//! journal.append(&mut update)?;
//!
//! let page = Block::new(42, ByteBuffer::new(4096));
//! journal.append(&mut JournalEntry::block(FileRef::new(3), page))?;
//! journal.sync()?;
//!
//! for entry in journal.entries()? {
//!     let entry = entry?;
//!     println!("{:?} {} @ {:?}", entry.kind(), entry.file_ref(), entry.start());
//! }
//! # Ok::<(), quadstore_journal::JournalError>(())
//! ```
//!
//! ## Key Types
//!
//! - [`Journal`] - Append, read, iterate, and manage a journal
//! - [`JournalEntry`] - One durable operation
//! - [`BufferChannel`] - Byte store under a journal

#![deny(missing_docs)]

/// Byte channels backing a journal.
pub mod channel;
/// Frame checksum.
pub mod checksum;
/// Journal entries and payloads.
pub mod entry;
/// Error types for journal operations.
pub mod errors;
/// Frame header layout.
pub mod frame;
/// Forward iteration.
pub mod iter;
/// Journal handle and lifecycle.
pub mod journal;
/// Storage locations.
pub mod location;
mod reader;
mod writer;

pub use channel::{BufferChannel, FileChannel, MemChannel};
pub use entry::{Block, ByteBuffer, FileRef, JournalEntry, Payload};
pub use errors::JournalError;
pub use frame::{frame_size, EntryKind, FrameHeader};
pub use iter::JournalIter;
pub use journal::{Journal, JournalOptions};
pub use location::{Location, JOURNAL_FILE};
