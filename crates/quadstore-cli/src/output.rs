//! Output formatting utilities.

use quadstore_journal::{EntryKind, FileRef, JournalEntry};
use serde::Serialize;

/// One frame as shown by `list` and `inspect`.
#[derive(Debug, Serialize)]
pub struct EntryRow {
    pub offset: u64,
    pub end: u64,
    pub kind: EntryKind,
    pub file_ref: FileRef,
    pub capacity: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_id: Option<u32>,
}

impl From<&JournalEntry> for EntryRow {
    fn from(entry: &JournalEntry) -> Self {
        Self {
            offset: entry.start().unwrap_or_default(),
            end: entry.end().unwrap_or_default(),
            kind: entry.kind(),
            file_ref: entry.file_ref(),
            capacity: entry.payload().bytes().capacity(),
            block_id: entry.block_id(),
        }
    }
}

/// Formats a frame as a simple table row.
pub fn format_table_row(row: &EntryRow) -> String {
    let kind = match row.kind {
        EntryKind::RawUpdate => "raw_update",
        EntryKind::Block => "block",
    };
    let block = row
        .block_id
        .map(|id| id.to_string())
        .unwrap_or_else(|| "-".to_string());

    format!(
        "{:<12} {:<12} {:<11} {:<9} {:<10} {}",
        row.offset,
        row.end,
        kind,
        row.file_ref.id(),
        row.capacity,
        block
    )
}

/// Prints table header.
#[allow(clippy::print_literal)]
pub fn print_table_header() {
    println!(
        "{:<12} {:<12} {:<11} {:<9} {:<10} {}",
        "OFFSET", "END", "KIND", "FILE_REF", "CAPACITY", "BLOCK"
    );
    println!("{}", "-".repeat(64));
}

/// Hex dump of up to `max` bytes, 16 per line.
pub fn hex_preview(bytes: &[u8], max: usize) -> String {
    let shown = &bytes[..bytes.len().min(max)];
    let mut out = String::new();
    for (i, chunk) in shown.chunks(16).enumerate() {
        let hex: Vec<String> = chunk.iter().map(|b| format!("{:02x}", b)).collect();
        out.push_str(&format!("{:08x}  {}\n", i * 16, hex.join(" ")));
    }
    if bytes.len() > shown.len() {
        out.push_str(&format!("... {} more bytes\n", bytes.len() - shown.len()));
    }
    out
}
