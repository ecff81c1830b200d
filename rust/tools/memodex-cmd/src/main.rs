use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};

mod commands;
mod utils;

#[derive(Parser)]
#[command(name = "memodex-cmd")]
#[command(about = "Command-line utility for building and comparing memodex indexes")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v for debug, -vv for trace); defaults to RUST_LOG
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index a record file and print record positions grouped by field values
    Index {
        /// Field spec to index by; `a+b` indexes by `a`, then by `b` (repeatable)
        #[arg(short, long, required = true)]
        field: Vec<String>,

        /// Exclude records that lack a field, in addition to records holding null
        #[arg(long)]
        exclude_missing: bool,

        /// JSON array or newline-delimited JSON file of records
        file: String,
    },

    /// Index two versions of a record file and report which buckets were reused
    Reindex {
        /// Field spec to index by; `a+b` indexes by `a`, then by `b` (repeatable)
        #[arg(short, long, required = true)]
        field: Vec<String>,

        /// Exclude records that lack a field, in addition to records holding null
        #[arg(long)]
        exclude_missing: bool,

        /// The earlier version of the records
        before: String,

        /// The later version of the records
        after: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Index {
            field,
            exclude_missing,
            file,
        } => commands::index::run(field, exclude_missing, file),
        Commands::Reindex {
            field,
            exclude_missing,
            before,
            after,
        } => commands::reindex::run(field, exclude_missing, before, after),
    }
}
