//! Nebula CLI
//!
//! Binary entry point. CLI parsing (clap) and logging setup. The widget and
//! ranking logic live in the library crate; the `cli` modules are the
//! terminal host that drives them.

mod cli;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "nebula")]
#[command(about = "Fuzzy search and keyboard navigation over a static page index")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log level (logs go to stderr)
    #[arg(short, long, default_value = "warn", global = true)]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rank pages against a query and print the grouped results
    Search(SearchArgs),
    /// Drive the search widget with key events read from stdin
    Run(RunArgs),
    /// Show or clear recent searches
    Recent(RecentArgs),
    /// List the pages in the index
    Pages(PagesArgs),
}

/// Shared page index arguments.
#[derive(clap::Args, Debug, Clone)]
struct IndexArgs {
    /// TOML page index to search instead of the built-in one
    #[arg(long)]
    index: Option<PathBuf>,
}

/// Shared recent-search storage arguments.
#[derive(clap::Args, Debug, Clone)]
struct StateArgs {
    /// Directory holding recent-search history
    #[arg(long)]
    state_dir: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
struct SearchArgs {
    /// Search query (empty shows recent searches and quick links)
    #[arg(default_value = "")]
    query: String,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    index: IndexArgs,

    #[command(flatten)]
    state: StateArgs,
}

#[derive(clap::Args, Debug)]
struct RunArgs {
    /// Keep history in memory only for this session
    #[arg(long)]
    no_persist: bool,

    #[command(flatten)]
    index: IndexArgs,

    #[command(flatten)]
    state: StateArgs,
}

#[derive(clap::Args, Debug)]
struct RecentArgs {
    /// Forget all recent searches
    #[arg(long)]
    clear: bool,

    #[command(flatten)]
    state: StateArgs,
}

#[derive(clap::Args, Debug)]
struct PagesArgs {
    /// Only list pages in this category
    #[arg(long)]
    category: Option<String>,

    /// List categories with page counts instead of pages
    #[arg(long)]
    categories: bool,

    #[command(flatten)]
    index: IndexArgs,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(&cli.log_level) {
        eprintln!("Error: {e}");
        return ExitCode::from(2);
    }

    match cli.command {
        Command::Search(args) => cli::search::run_search(args),
        Command::Run(args) => cli::session::run_session(args),
        Command::Recent(args) => cli::recent::run_recent(args),
        Command::Pages(args) => cli::search::run_pages(args),
    }
}

/// Logs from the library and this binary at `level`, plus whatever
/// `RUST_LOG` adds.
fn init_tracing(level: &str) -> anyhow::Result<()> {
    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    for target in ["nebula_search", "nebula"] {
        let directive: tracing_subscriber::filter::Directive = format!("{target}={level}")
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid log level '{level}': {e}"))?;
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}
