pub(crate) mod recent;
pub(crate) mod search;
pub(crate) mod session;

use std::process::ExitCode;

use nebula_search::config::{self, NebulaConfig};
use nebula_search::pages::PageIndex;

use crate::IndexArgs;

/// Load the config file, reporting failures the CLI way.
pub(crate) fn load_config() -> Result<NebulaConfig, ExitCode> {
    config::load_config().map_err(|e| {
        eprintln!("Error loading config: {e}");
        ExitCode::from(1)
    })
}

/// Load the page index selected by flag or config.
pub(crate) fn load_index(
    args: &IndexArgs,
    cli_config: &NebulaConfig,
) -> Result<PageIndex, ExitCode> {
    let path = config::resolve_index_path(args.index.as_deref(), cli_config);
    PageIndex::load_or_builtin(path.as_deref()).map_err(|e| {
        eprintln!("Error loading page index: {e}");
        ExitCode::from(1)
    })
}

/// "s" for anything but one.
pub(crate) fn plural(n: usize) -> &'static str {
    noun(n, "", "s")
}

/// `one` when `n` is 1, otherwise `many`.
pub(crate) fn noun<'a>(n: usize, one: &'a str, many: &'a str) -> &'a str {
    if n == 1 { one } else { many }
}
