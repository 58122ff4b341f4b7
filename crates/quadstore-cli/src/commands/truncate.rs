//! Truncate command implementation.

use crate::path;

pub fn run(journal: String, size: u64) -> Result<(), Box<dyn std::error::Error>> {
    let journal = path::open_journal(&journal)?;
    let before = journal.size()?;
    if size > before {
        return Err(format!("journal is only {} bytes; cannot truncate to {}", before, size).into());
    }

    journal.truncate(size)?;
    journal.sync()?;
    journal.close()?;
    println!("truncated journal from {} to {} bytes", before, size);
    Ok(())
}
