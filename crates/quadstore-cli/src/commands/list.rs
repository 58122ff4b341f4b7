//! List command implementation.

use crate::output::{self, EntryRow};
use crate::path;

pub fn run(
    journal: String,
    json: bool,
    from: u64,
    max_entries: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let journal = path::open_journal(&journal)?;

    // Output header if table format
    if !json {
        output::print_table_header();
    }

    let mut count: u64 = 0;
    for entry in journal.entries_from(from)? {
        if let Some(max) = max_entries {
            if count >= max {
                break;
            }
        }

        let row = EntryRow::from(&entry?);
        if json {
            println!("{}", serde_json::to_string(&row)?);
        } else {
            println!("{}", output::format_table_row(&row));
        }
        count += 1;
    }

    Ok(())
}
