//! Verify command implementation.

use crate::path;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct Report {
    frames: u64,
    valid_bytes: u64,
    size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub fn run(journal: String, json_output: bool) -> Result<(), Box<dyn std::error::Error>> {
    let journal = path::open_journal(&journal)?;

    let mut report = Report {
        frames: 0,
        valid_bytes: 0,
        size: journal.size()?,
        error: None,
    };

    for entry in journal.entries()? {
        match entry {
            Ok(entry) => {
                report.frames += 1;
                report.valid_bytes = entry.end().unwrap_or(report.valid_bytes);
            }
            Err(e) if e.is_corrupt() => {
                report.error = Some(e.to_string());
                break;
            }
            Err(e) => return Err(e.into()),
        }
    }

    if json_output {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("frames:      {}", report.frames);
        println!("valid bytes: {} of {}", report.valid_bytes, report.size);
        match &report.error {
            Some(error) => println!("status:      CORRUPT ({})", error),
            None => println!("status:      OK"),
        }
    }

    if let Some(error) = report.error {
        return Err(format!(
            "journal damaged after offset {}: {}",
            report.valid_bytes, error
        )
        .into());
    }
    Ok(())
}
