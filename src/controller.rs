//! Search widget state machine.
//!
//! [`SearchController`] owns the session state and is the only thing that
//! mutates it. Every change goes through a named operation (`open`,
//! `close`, `set_query`, `move_selection`, `confirm_selection`, ...) and the
//! derived result view is recomputed synchronously whenever the query
//! changes, so rendering never observes stale results.
//!
//! ```text
//! Closed --open--> Open/EmptyQuery <--set_query--> Open/HasResults
//!                        ^                              ^
//!                        +--------set_query------> Open/NoResults
//! any Open state --close | confirm | dismiss--> Closed
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use crate::group::{ResultEntry, ResultView};
use crate::keys::{Key, KeyEvent, KeyListener, KeyResponse, KeyboardSurface, ListenerGuard};
use crate::pages::{PageIndex, SearchRecord};
use crate::rank::Ranker;
use crate::recent::{self, KeyValueStore};

/// Quick links shown when nothing else is configured.
const DEFAULT_QUICK_LINKS: usize = 4;

/// Transient widget state, reset on close except for the history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub is_open: bool,
    pub query: String,
    /// Index into the flattened grouped view. Always `< max(1, len)`.
    pub selected_index: usize,
    /// Most recent first, at most [`recent::RECENT_LIMIT`].
    pub recent_searches: Vec<String>,
}

/// What the widget is currently showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Closed,
    /// Open with a blank query: recent searches and quick links.
    EmptyQuery,
    HasResults,
    /// Open with a non-blank query that matched nothing.
    NoResults,
}

/// Request for the host router to go to `path`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationRequest {
    pub path: String,
    pub title: String,
}

/// Deferred "focus the query input" effect issued by [`SearchController::open`].
///
/// Only honoured while it is still current: closing, reopening or
/// unmounting the widget invalidates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusRequest {
    generation: u64,
}

/// Result of a key pressed inside the query input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputOutcome {
    pub response: KeyResponse,
    pub navigation: Option<NavigationRequest>,
}

pub struct SearchController {
    index: PageIndex,
    ranker: Ranker,
    store: Box<dyn KeyValueStore>,
    state: SessionState,
    results: ResultView,
    quick_links: Vec<SearchRecord>,
    focus_generation: u64,
    pending_focus: Option<FocusRequest>,
}

impl SearchController {
    /// Create a closed controller. History is loaded from `store` once here
    /// and again each time the widget opens.
    pub fn new(index: PageIndex, ranker: Ranker, store: Box<dyn KeyValueStore>) -> Self {
        let recent_searches = recent::load_recent(store.as_ref());
        let quick_links = index
            .records()
            .iter()
            .take(DEFAULT_QUICK_LINKS)
            .cloned()
            .collect();
        Self {
            index,
            ranker,
            store,
            state: SessionState {
                recent_searches,
                ..SessionState::default()
            },
            results: ResultView::default(),
            quick_links,
            focus_generation: 0,
            pending_focus: None,
        }
    }

    /// Replace the quick links with the records at `paths`, in order.
    /// Unknown paths are skipped; an empty list keeps the defaults.
    pub fn with_quick_links(mut self, paths: &[String]) -> Self {
        if paths.is_empty() {
            return self;
        }
        self.quick_links = paths
            .iter()
            .filter_map(|path| {
                let found = self.index.find_by_path(path).cloned();
                if found.is_none() {
                    tracing::debug!(path = %path, "Quick link not in index, skipping");
                }
                found
            })
            .collect();
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn results(&self) -> &ResultView {
        &self.results
    }

    pub fn quick_links(&self) -> &[SearchRecord] {
        &self.quick_links
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    /// Entry under the highlight, if any.
    pub fn selected(&self) -> Option<&ResultEntry> {
        self.results.get(self.state.selected_index)
    }

    pub fn panel(&self) -> Panel {
        if !self.state.is_open {
            Panel::Closed
        } else if self.state.query.trim().is_empty() {
            Panel::EmptyQuery
        } else if self.results.is_empty() {
            Panel::NoResults
        } else {
            Panel::HasResults
        }
    }

    /// Open the widget and schedule focusing the query input.
    pub fn open(&mut self) -> FocusRequest {
        if !self.state.is_open {
            tracing::debug!("Search opened");
        }
        self.state.is_open = true;
        self.state.recent_searches = recent::load_recent(self.store.as_ref());

        self.focus_generation += 1;
        let request = FocusRequest {
            generation: self.focus_generation,
        };
        self.pending_focus = Some(request);
        request
    }

    /// Close the widget and clear the query. History is kept.
    pub fn close(&mut self) {
        if self.state.is_open {
            tracing::debug!("Search closed");
        }
        self.state.is_open = false;
        self.pending_focus = None;
        self.set_query(String::new());
    }

    /// Backdrop click.
    pub fn dismiss(&mut self) {
        self.close();
    }

    /// Whether a previously issued focus request should still be acted on.
    pub fn is_focus_current(&self, request: FocusRequest) -> bool {
        self.state.is_open && self.pending_focus == Some(request)
    }

    /// Take the pending focus effect on the host's next render pass.
    /// Returns `None` if it was cancelled in the meantime.
    pub fn take_focus(&mut self) -> Option<FocusRequest> {
        let request = self.pending_focus.take()?;
        self.state.is_open.then_some(request)
    }

    /// Set the query text and recompute the results.
    ///
    /// The highlight resets to the first entry.
    pub fn set_query(&mut self, text: impl Into<String>) {
        self.state.query = text.into();
        let matches = self
            .ranker
            .rank_scored(&self.state.query, self.index.records());
        self.results = ResultView::from_matches(&matches);
        self.state.selected_index = 0;
    }

    /// Re-run a remembered query from the empty-query panel.
    pub fn recall_recent(&mut self, position: usize) {
        if let Some(query) = self.state.recent_searches.get(position).cloned() {
            self.set_query(query);
        }
    }

    /// Move the highlight by `delta`, clamped to the result range.
    pub fn move_selection(&mut self, delta: isize) {
        let len = self.results.len();
        if len == 0 {
            return;
        }
        let last = len - 1;
        self.state.selected_index = if delta < 0 {
            self.state.selected_index.saturating_sub(delta.unsigned_abs())
        } else {
            self.state
                .selected_index
                .saturating_add(delta.unsigned_abs())
                .min(last)
        };
    }

    /// Move the highlight to `position` if it addresses a result.
    pub fn hover(&mut self, position: usize) {
        if position < self.results.len() {
            self.state.selected_index = position;
        }
    }

    /// Confirm the highlighted result.
    ///
    /// Remembers the trimmed query, returns the navigation request for the
    /// host router and closes the widget. Does nothing when there is no
    /// highlighted result.
    pub fn confirm_selection(&mut self) -> Option<NavigationRequest> {
        let entry = self.selected()?;
        let request = NavigationRequest {
            path: entry.record.path.clone(),
            title: entry.record.title.clone(),
        };

        let query = self.state.query.trim().to_string();
        if !query.is_empty() {
            self.state.recent_searches = recent::save_recent(self.store.as_mut(), &query);
        }

        tracing::debug!(path = %request.path, "Navigating to search result");
        self.close();
        Some(request)
    }

    /// Click on the result at `position`.
    pub fn select_at(&mut self, position: usize) -> Option<NavigationRequest> {
        if position >= self.results.len() {
            return None;
        }
        self.state.selected_index = position;
        self.confirm_selection()
    }

    /// Keys pressed inside the query input: arrows move the highlight,
    /// Enter confirms it.
    pub fn handle_input_key(&mut self, event: &KeyEvent) -> InputOutcome {
        if !self.state.is_open {
            return InputOutcome::default();
        }
        match event.key {
            Key::ArrowDown => {
                self.move_selection(1);
                InputOutcome {
                    response: KeyResponse::CAPTURED,
                    navigation: None,
                }
            }
            Key::ArrowUp => {
                self.move_selection(-1);
                InputOutcome {
                    response: KeyResponse::CAPTURED,
                    navigation: None,
                }
            }
            Key::Enter => {
                let navigation = self.confirm_selection();
                InputOutcome {
                    response: KeyResponse::CAPTURED,
                    navigation,
                }
            }
            _ => InputOutcome::default(),
        }
    }

    /// Called when the widget leaves the render tree.
    fn unmount(&mut self) {
        self.pending_focus = None;
        self.state.is_open = false;
    }
}

/// The global shortcut: Ctrl/Cmd+K opens, Escape closes while open.
impl KeyListener for SearchController {
    fn on_key(&mut self, event: &KeyEvent) -> KeyResponse {
        if event.is_search_chord() {
            self.open();
            return KeyResponse::CAPTURED;
        }
        if event.key == Key::Escape && self.state.is_open {
            self.close();
            return KeyResponse::HANDLED;
        }
        KeyResponse::IGNORED
    }
}

/// A controller attached to a keyboard surface.
///
/// Mounting attaches the global shortcut; dropping the widget detaches it
/// and cancels any pending focus.
pub struct MountedWidget {
    controller: Rc<RefCell<SearchController>>,
    _shortcut: ListenerGuard,
}

impl MountedWidget {
    pub fn mount(surface: &KeyboardSurface, controller: SearchController) -> Self {
        let controller = Rc::new(RefCell::new(controller));
        let shortcut = surface.attach(controller.clone());
        Self {
            controller,
            _shortcut: shortcut,
        }
    }

    pub fn controller(&self) -> &Rc<RefCell<SearchController>> {
        &self.controller
    }
}

impl Drop for MountedWidget {
    fn drop(&mut self) {
        if let Ok(mut controller) = self.controller.try_borrow_mut() {
            controller.unmount();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recent::{FileStore, MemoryStore, load_recent};

    fn index() -> PageIndex {
        PageIndex::from_records(vec![
            SearchRecord::new("Introduction", "/intro", "Getting Started"),
            SearchRecord::new("Fraud Detection Platform", "/fd", "Fraud Detection"),
            SearchRecord::new("System Design Overview", "/sd", "Interview"),
            SearchRecord::new("Fraud Rules", "/fd/rules", "Fraud Detection"),
            SearchRecord::new("Capstone Design Review", "/capstone/review", "Capstone"),
            SearchRecord::new("Rate Limiter Design", "/sd/rate", "Interview"),
        ])
        .unwrap()
    }

    fn controller() -> SearchController {
        SearchController::new(index(), Ranker::default(), Box::new(MemoryStore::new()))
    }

    #[test]
    fn test_starts_closed() {
        let c = controller();
        assert_eq!(c.panel(), Panel::Closed);
        assert!(!c.state().is_open);
        assert!(c.state().query.is_empty());
    }

    #[test]
    fn test_open_shows_empty_panel() {
        let mut c = controller();
        c.open();
        assert_eq!(c.panel(), Panel::EmptyQuery);
        c.set_query("   ");
        assert_eq!(c.panel(), Panel::EmptyQuery);
        assert!(c.results().is_empty());
    }

    #[test]
    fn test_set_query_transitions() {
        let mut c = controller();
        c.open();
        c.set_query("fraud");
        assert_eq!(c.panel(), Panel::HasResults);
        c.set_query("zzzxyznotfound");
        assert_eq!(c.panel(), Panel::NoResults);
        c.set_query("");
        assert_eq!(c.panel(), Panel::EmptyQuery);
    }

    #[test]
    fn test_close_clears_query_keeps_history() {
        let mut c = controller();
        c.open();
        c.set_query("fraud");
        c.confirm_selection().unwrap();
        c.open();
        c.set_query("design");
        c.close();
        assert_eq!(c.panel(), Panel::Closed);
        assert!(c.state().query.is_empty());
        assert!(c.results().is_empty());
        assert_eq!(c.state().recent_searches, vec!["fraud"]);
    }

    #[test]
    fn test_move_selection_clamps() {
        let mut c = controller();
        c.open();
        c.set_query("fraud");
        let len = c.results().len();
        assert_eq!(len, 2);

        c.move_selection(-1);
        assert_eq!(c.state().selected_index, 0);
        c.move_selection(1);
        assert_eq!(c.state().selected_index, 1);
        c.move_selection(10);
        assert_eq!(c.state().selected_index, len - 1);

        c.move_selection(isize::MAX);
        assert_eq!(c.state().selected_index, len - 1);
        c.move_selection(isize::MIN);
        assert_eq!(c.state().selected_index, 0);
    }

    #[test]
    fn test_move_selection_noop_without_results() {
        let mut c = controller();
        c.open();
        c.set_query("zzzxyznotfound");
        c.move_selection(3);
        assert_eq!(c.state().selected_index, 0);
    }

    #[test]
    fn test_new_query_reclamps_selection() {
        let mut c = controller();
        c.open();
        c.set_query("design");
        c.move_selection(2);
        assert_eq!(c.state().selected_index, 2);

        c.set_query("overview");
        assert_eq!(c.results().len(), 1);
        assert_eq!(c.state().selected_index, 0);
        assert!(c.selected().is_some());
    }

    #[test]
    fn test_highlight_uses_grouped_order() {
        let mut c = controller();
        c.open();
        // Ranked (all tied): /sd, /capstone/review, /sd/rate.
        // Grouped: Interview [/sd, /sd/rate], Capstone [/capstone/review].
        c.set_query("design");
        let flat: Vec<&str> = c
            .results()
            .iter()
            .map(|(_, e)| e.record.path.as_str())
            .collect();
        assert_eq!(flat, vec!["/sd", "/sd/rate", "/capstone/review"]);

        c.move_selection(1);
        let nav = c.confirm_selection().unwrap();
        assert_eq!(nav.path, "/sd/rate");
    }

    #[test]
    fn test_confirm_persists_trimmed_query_and_closes() {
        let mut c = controller();
        c.open();
        c.set_query("  fraud rules ");
        let nav = c.confirm_selection().unwrap();
        assert_eq!(nav.path, "/fd/rules");
        assert_eq!(c.panel(), Panel::Closed);
        assert_eq!(c.state().recent_searches, vec!["fraud rules"]);
        assert_eq!(load_recent(c.store()), vec!["fraud rules"]);
    }

    #[test]
    fn test_confirm_without_results_does_nothing() {
        let mut c = controller();
        c.open();
        c.set_query("zzzxyznotfound");
        assert!(c.confirm_selection().is_none());
        assert_eq!(c.panel(), Panel::NoResults);
        assert!(c.state().recent_searches.is_empty());
    }

    #[test]
    fn test_select_at_and_hover() {
        let mut c = controller();
        c.open();
        c.set_query("fraud");
        c.hover(1);
        assert_eq!(c.state().selected_index, 1);
        c.hover(99);
        assert_eq!(c.state().selected_index, 1);

        assert!(c.select_at(5).is_none());
        let nav = c.select_at(0).unwrap();
        assert_eq!(nav.path, "/fd");
    }

    #[test]
    fn test_recall_recent() {
        let mut c = controller();
        c.open();
        c.set_query("rules");
        c.confirm_selection().unwrap();
        c.open();
        c.recall_recent(0);
        assert_eq!(c.state().query, "rules");
        assert_eq!(c.panel(), Panel::HasResults);
        c.recall_recent(7);
        assert_eq!(c.state().query, "rules");
    }

    #[test]
    fn test_storage_failure_does_not_block_search() {
        let store = MemoryStore::failing(true, true);
        let mut c = SearchController::new(index(), Ranker::default(), Box::new(store));
        c.open();
        assert!(c.state().recent_searches.is_empty());
        c.set_query("fraud");
        let nav = c.confirm_selection().unwrap();
        assert_eq!(nav.path, "/fd");
    }

    #[test]
    fn test_history_loaded_from_store_on_open() {
        let tmp = tempfile::tempdir().unwrap();
        let mut seed = FileStore::new(tmp.path());
        recent::save_recent(&mut seed, "earlier");

        let store = FileStore::new(tmp.path());
        let mut c = SearchController::new(index(), Ranker::default(), Box::new(store));
        assert_eq!(c.state().recent_searches, vec!["earlier"]);

        recent::save_recent(&mut seed, "elsewhere");
        c.open();
        assert_eq!(c.state().recent_searches, vec!["elsewhere", "earlier"]);
    }

    #[test]
    fn test_focus_request_lifecycle() {
        let mut c = controller();
        let first = c.open();
        assert!(c.is_focus_current(first));

        let second = c.open();
        assert!(!c.is_focus_current(first));
        assert!(c.is_focus_current(second));

        assert_eq!(c.take_focus(), Some(second));
        assert_eq!(c.take_focus(), None);
    }

    #[test]
    fn test_close_cancels_focus() {
        let mut c = controller();
        let request = c.open();
        c.close();
        assert!(!c.is_focus_current(request));
        assert_eq!(c.take_focus(), None);
    }

    #[test]
    fn test_input_keys() {
        let mut c = controller();
        c.open();
        c.set_query("fraud");

        let out = c.handle_input_key(&KeyEvent::plain(Key::ArrowDown));
        assert!(out.response.prevent_default);
        assert_eq!(c.state().selected_index, 1);

        c.handle_input_key(&KeyEvent::plain(Key::ArrowUp));
        assert_eq!(c.state().selected_index, 0);

        let out = c.handle_input_key(&KeyEvent::plain(Key::Enter));
        assert_eq!(out.navigation.unwrap().path, "/fd");
        assert_eq!(c.panel(), Panel::Closed);

        let out = c.handle_input_key(&KeyEvent::plain(Key::ArrowDown));
        assert_eq!(out, InputOutcome::default());
    }

    #[test]
    fn test_quick_links() {
        let c = controller();
        assert_eq!(c.quick_links().len(), 4);
        assert_eq!(c.quick_links()[0].path, "/intro");

        let c = controller().with_quick_links(&["/sd".to_string(), "/missing".to_string()]);
        let paths: Vec<&str> = c.quick_links().iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, vec!["/sd"]);
    }

    #[test]
    fn test_global_shortcut_via_surface() {
        let surface = KeyboardSurface::new();
        let widget = MountedWidget::mount(&surface, controller());

        let response = surface.dispatch(&KeyEvent::ctrl('k'));
        assert_eq!(response, KeyResponse::CAPTURED);
        assert!(widget.controller().borrow().state().is_open);

        widget.controller().borrow_mut().set_query("fraud");
        let response = surface.dispatch(&KeyEvent::plain(Key::Escape));
        assert!(response.handled);
        assert!(!widget.controller().borrow().state().is_open);
        assert!(widget.controller().borrow().state().query.is_empty());

        // Escape while closed is not ours.
        assert_eq!(
            surface.dispatch(&KeyEvent::plain(Key::Escape)),
            KeyResponse::IGNORED
        );

        surface.dispatch(&KeyEvent::meta('K'));
        assert!(widget.controller().borrow().state().is_open);
    }

    #[test]
    fn test_unmount_detaches_and_cancels_focus() {
        let surface = KeyboardSurface::new();
        let widget = MountedWidget::mount(&surface, controller());
        surface.dispatch(&KeyEvent::ctrl('k'));
        let shared = widget.controller().clone();
        assert_eq!(surface.listener_count(), 1);

        drop(widget);
        assert_eq!(surface.listener_count(), 0);
        assert_eq!(shared.borrow_mut().take_focus(), None);

        assert_eq!(surface.dispatch(&KeyEvent::ctrl('k')), KeyResponse::IGNORED);
        assert!(!shared.borrow().state().is_open);
    }
}
