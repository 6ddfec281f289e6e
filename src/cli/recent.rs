use std::process::ExitCode;

use nebula_search::config;
use nebula_search::recent::{self, FileStore};

use super::{load_config, noun};
use crate::RecentArgs;

/// Run the `recent` subcommand.
pub(crate) fn run_recent(args: RecentArgs) -> ExitCode {
    let cli_config = match load_config() {
        Ok(c) => c,
        Err(code) => return code,
    };
    let dir = config::resolve_state_dir(args.state.state_dir.as_deref(), &cli_config);
    let mut store = FileStore::new(dir);

    if args.clear {
        if let Err(e) = recent::clear_recent(&mut store) {
            eprintln!("Error clearing recent searches: {e}");
            return ExitCode::from(1);
        }
        println!("Cleared recent searches.");
        return ExitCode::SUCCESS;
    }

    let list = recent::load_recent(&store);
    if list.is_empty() {
        println!("No recent searches.");
        return ExitCode::SUCCESS;
    }

    let count = list.len();
    println!("{count} recent {}:\n", noun(count, "search", "searches"));
    for (i, query) in list.iter().enumerate() {
        println!("  {i}  {query}");
    }

    ExitCode::SUCCESS
}
