//! redit CLI - transactional editing over an external revision store.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "redit")]
#[command(about = "Check files out of a revision store, edit them, check them back in", long_about = None)]
#[command(version)]
struct Cli {
    /// Show revision history for each file instead of editing
    #[arg(long, conflicts_with_all = ["diff", "syntax_check", "max_files"])]
    log: bool,

    /// Show the diff for one or two revisions of a single file
    #[arg(long, num_args = 1..=2, value_names = ["REV", "REV"], conflicts_with = "log")]
    diff: Option<Vec<String>>,

    /// Run the configured syntax checker on each file after editing
    #[arg(long)]
    syntax_check: bool,

    /// Maximum number of files editable in one invocation
    #[arg(long, value_name = "N")]
    max_files: Option<usize>,

    /// Files to edit (or query)
    #[arg(required = true, value_name = "FILE")]
    files: Vec<PathBuf>,
}

fn main() -> Result<()> {
    // Initialize tracing subscriber
    // Respects RUST_LOG environment variable (e.g., RUST_LOG=debug)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.log {
        commands::log::run(&cli.files)
    } else if let Some(revs) = cli.diff {
        commands::diff::run(&revs, &cli.files)
    } else {
        commands::edit::run(&cli.files, cli.syntax_check, cli.max_files)
    }
}
