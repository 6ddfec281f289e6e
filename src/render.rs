//! Plain-text rendering of the widget panels.

use std::fmt::Write as _;

use crate::controller::{Panel, SearchController};
use crate::group::ResultView;
use crate::pages::SearchRecord;

/// Hint shown under "no results".
pub const NO_RESULTS_HINT: &str = "Try fewer or different keywords.";

/// Render whatever the controller is currently showing.
pub fn render(controller: &SearchController) -> String {
    let state = controller.state();
    match controller.panel() {
        Panel::Closed => "Press Ctrl+K to search\n".to_string(),
        Panel::EmptyQuery => {
            let mut out = String::from("search> \n\n");
            out.push_str(&render_start(
                &state.recent_searches,
                controller.quick_links(),
            ));
            out
        }
        Panel::HasResults => {
            let mut out = format!("search> {}\n\n", state.query);
            out.push_str(&render_results(
                controller.results(),
                Some(state.selected_index),
            ));
            out
        }
        Panel::NoResults => {
            let mut out = format!("search> {}\n\n", state.query);
            out.push_str(&render_no_results(&state.query));
            out
        }
    }
}

/// Recent searches (or a prompt when there are none) and quick links.
pub fn render_start(recent: &[String], quick_links: &[SearchRecord]) -> String {
    let mut out = String::new();
    if recent.is_empty() {
        out.push_str("Type to search pages\n");
    } else {
        out.push_str("Recent searches\n");
        for query in recent {
            let _ = writeln!(out, "  {query}");
        }
    }
    if !quick_links.is_empty() {
        out.push_str("\nQuick links\n");
        for record in quick_links {
            let _ = writeln!(out, "  {}  {}", record.title, record.path);
        }
    }
    out
}

/// Grouped results. `selected` marks the highlighted flat index.
pub fn render_results(view: &ResultView, selected: Option<usize>) -> String {
    let mut out = String::new();
    for (i, group) in view.groups().iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let _ = writeln!(out, "{}", group.category);
        for (position, entry) in group.indexed() {
            let marker = if selected == Some(position) { '>' } else { ' ' };
            let record = &entry.record;
            let _ = writeln!(out, "{marker} {}  {}", record.title, record.path);
            if let Some(ref sub) = record.subcategory {
                let _ = writeln!(out, "    {sub}");
            }
        }
    }
    out
}

pub fn render_no_results(query: &str) -> String {
    format!("No results for \"{}\"\n{NO_RESULTS_HINT}\n", query.trim())
}
