//! Quadstore CLI - inspect and repair transaction journals.

use clap::{Parser, Subcommand};

mod commands;
mod output;
mod path;

use commands::{inspect, list, truncate, verify};

#[derive(Parser)]
#[command(name = "quadstore")]
#[command(about = "Quadstore journal inspection and recovery CLI")]
struct Cli {
    /// Log journal operations to stderr
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List frames in a journal
    List {
        /// Storage directory or journal file
        journal: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
        /// Offset of the first frame to list
        #[arg(long, default_value_t = 0)]
        from: u64,
        /// Stop after N frames (default: unlimited)
        #[arg(long)]
        max_entries: Option<u64>,
    },
    /// Check every frame's checksum and report the last good offset
    Verify {
        /// Storage directory or journal file
        journal: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Decode the frame at an offset
    Inspect {
        /// Storage directory or journal file
        journal: String,
        /// Frame offset
        offset: u64,
        /// Payload bytes to show (default: 64)
        #[arg(long, default_value_t = 64)]
        bytes: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Cut the journal at SIZE bytes, discarding a damaged tail
    Truncate {
        /// Storage directory or journal file
        journal: String,
        /// New size in bytes
        size: u64,
    },
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::List {
            journal,
            json,
            from,
            max_entries,
        } => list::run(journal, json, from, max_entries),
        Commands::Verify { journal, json } => verify::run(journal, json),
        Commands::Inspect {
            journal,
            offset,
            bytes,
            json,
        } => inspect::run(journal, offset, bytes, json),
        Commands::Truncate { journal, size } => truncate::run(journal, size),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
