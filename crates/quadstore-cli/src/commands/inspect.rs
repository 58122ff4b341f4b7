//! Inspect command implementation.

use crate::output::{self, EntryRow};
use crate::path;
use serde_json::json;

pub fn run(
    journal: String,
    offset: u64,
    max_bytes: usize,
    json_output: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let journal = path::open_journal(&journal)?;
    let entry = journal.read_at(offset)?;
    let row = EntryRow::from(&entry);
    let payload = entry.payload().bytes().as_full_slice();

    if json_output {
        let shown = &payload[..payload.len().min(max_bytes)];
        let output = json!({
            "frame": row,
            "payload_hex": shown.iter().map(|b| format!("{:02x}", b)).collect::<String>(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        output::print_table_header();
        println!("{}", output::format_table_row(&row));
        println!();
        print!("{}", output::hex_preview(payload, max_bytes));
    }

    Ok(())
}
