//! `run`: a line-driven host for the search widget.
//!
//! Each stdin line is one event. Lines starting with `:` are key chords or
//! pointer actions; anything else is typed into the query input.
//!
//! ```text
//! :ctrl+k       open (also :cmd+k)
//! :escape       close
//! :up / :down   move the highlight
//! :enter        confirm the highlight
//! :click N      click result N (flat index)
//! :hover N      highlight result N
//! :recent N     re-run recent search N
//! :dismiss      click the backdrop
//! fraud         set the query to "fraud"
//! ```

use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use nebula_search::config;
use nebula_search::controller::{MountedWidget, NavigationRequest, SearchController};
use nebula_search::keys::{KeyEvent, KeyboardSurface};
use nebula_search::rank::Ranker;
use nebula_search::recent::{FileStore, KeyValueStore, MemoryStore};
use nebula_search::render;

use super::{load_config, load_index};
use crate::RunArgs;

/// One parsed input line.
#[derive(Debug, PartialEq, Eq)]
enum Event {
    Key(KeyEvent),
    Click(usize),
    Hover(usize),
    Recent(usize),
    Dismiss,
    Text(String),
}

fn parse_event(line: &str) -> Result<Event, String> {
    let Some(command) = line.strip_prefix(':') else {
        return Ok(Event::Text(line.to_string()));
    };

    let mut parts = command.split_whitespace();
    let head = parts.next().unwrap_or_default();
    let arg = parts.next();

    let position = || -> Result<usize, String> {
        arg.ok_or_else(|| format!("':{head}' needs a result number"))?
            .parse()
            .map_err(|e| format!("bad result number for ':{head}': {e}"))
    };

    match head {
        "click" => Ok(Event::Click(position()?)),
        "hover" => Ok(Event::Hover(position()?)),
        "recent" => Ok(Event::Recent(position()?)),
        "dismiss" => Ok(Event::Dismiss),
        chord => chord
            .parse::<KeyEvent>()
            .map(Event::Key)
            .map_err(|e| e.to_string()),
    }
}

/// Run the `run` subcommand.
pub(crate) fn run_session(args: RunArgs) -> ExitCode {
    let cli_config = match load_config() {
        Ok(c) => c,
        Err(code) => return code,
    };
    let index = match load_index(&args.index, &cli_config) {
        Ok(i) => i,
        Err(code) => return code,
    };

    let store: Box<dyn KeyValueStore> = if args.no_persist {
        Box::new(MemoryStore::new())
    } else {
        let dir = config::resolve_state_dir(args.state.state_dir.as_deref(), &cli_config);
        tracing::debug!(dir = %dir.display(), "Using recent-search storage");
        Box::new(FileStore::new(dir))
    };

    let controller = SearchController::new(index, Ranker::new(cli_config.weights), store)
        .with_quick_links(&cli_config.search.quick_links);

    let surface = KeyboardSurface::new();
    let widget = MountedWidget::mount(&surface, controller);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if write!(out, "{}", render::render(&widget.controller().borrow())).is_err() {
        return ExitCode::from(1);
    }

    for line in io::stdin().lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                eprintln!("Error reading input: {e}");
                return ExitCode::from(1);
            }
        };

        let navigation = match parse_event(&line) {
            Ok(event) => handle_event(&surface, &widget, event),
            Err(e) => {
                eprintln!("Error: {e}");
                continue;
            }
        };

        if widget.controller().borrow_mut().take_focus().is_some() {
            tracing::debug!("Focused search input");
        }

        let mut frame = String::from("---\n");
        if let Some(nav) = navigation {
            frame.push_str(&format!("navigate {}\n", nav.path));
        }
        frame.push_str(&render::render(&widget.controller().borrow()));
        if out.write_all(frame.as_bytes()).is_err() {
            return ExitCode::from(1);
        }
    }

    ExitCode::SUCCESS
}

fn handle_event(
    surface: &KeyboardSurface,
    widget: &MountedWidget,
    event: Event,
) -> Option<NavigationRequest> {
    let controller = widget.controller();
    match event {
        Event::Key(key) => {
            // Global shortcut first, then the focused input.
            let response = surface.dispatch(&key);
            if response.handled {
                return None;
            }
            controller.borrow_mut().handle_input_key(&key).navigation
        }
        Event::Click(n) => controller.borrow_mut().select_at(n),
        Event::Hover(n) => {
            controller.borrow_mut().hover(n);
            None
        }
        Event::Recent(n) => {
            controller.borrow_mut().recall_recent(n);
            None
        }
        Event::Dismiss => {
            controller.borrow_mut().dismiss();
            None
        }
        Event::Text(text) => {
            let mut c = controller.borrow_mut();
            if c.state().is_open {
                c.set_query(text);
            } else {
                tracing::debug!("Text typed while search is closed, ignoring");
            }
            None
        }
    }
}
