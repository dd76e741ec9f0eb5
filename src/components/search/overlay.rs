use std::cell::RefCell;

use super::index::{SearchEntry, SearchIndex};

/// Keys the result list reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    Down,
    Up,
    Enter,
    Escape,
}

impl NavKey {
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowDown" | "Down" => Some(NavKey::Down),
            "ArrowUp" | "Up" => Some(NavKey::Up),
            "Enter" => Some(NavKey::Enter),
            "Escape" | "Esc" => Some(NavKey::Escape),
            _ => None,
        }
    }
}

/// What the view has to do after a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavOutcome {
    Ignored,
    SelectionMoved(usize),
    Navigate(String),
    Close,
}

/// Whether a keydown is the open/close shortcut: Ctrl+K or Cmd+K anywhere,
/// or a bare `/` outside of text fields (open only).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hotkey {
    Toggle,
    Open,
}

pub fn hotkey(key: &str, ctrl: bool, meta: bool, alt: bool, in_editable: bool) -> Option<Hotkey> {
    if (ctrl || meta) && !alt && key.eq_ignore_ascii_case("k") {
        return Some(Hotkey::Toggle);
    }
    if key == "/" && !ctrl && !meta && !alt && !in_editable {
        return Some(Hotkey::Open);
    }
    None
}

/// Overlay state independent of the DOM: open flag, query, hits and the
/// selected row.
#[derive(Debug, Clone)]
pub struct SearchState {
    index: SearchIndex,
    open: bool,
    query: String,
    results: Vec<usize>,
    selected: Option<usize>,
}

impl SearchState {
    pub fn new(index: SearchIndex) -> Self {
        let results = index.filter("");
        Self {
            index,
            open: false,
            query: String::new(),
            selected: if results.is_empty() { None } else { Some(0) },
            results,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn results(&self) -> impl Iterator<Item = &SearchEntry> + '_ {
        self.results.iter().filter_map(|&i| self.index.get(i))
    }

    pub fn result_count(&self) -> usize {
        self.results.len()
    }

    /// Returns false when already open.
    pub fn open(&mut self) -> bool {
        if self.open {
            return false;
        }
        self.open = true;
        self.set_query("");
        true
    }

    /// Returns false when already closed, so repeated close requests are no-ops.
    pub fn close(&mut self) -> bool {
        std::mem::replace(&mut self.open, false)
    }

    /// Re-filters and puts the selection back on the first hit.
    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_string();
        self.results = self.index.filter(query);
        self.selected = if self.results.is_empty() { None } else { Some(0) };
    }

    pub fn selected_entry(&self) -> Option<&SearchEntry> {
        self.selected
            .and_then(|row| self.results.get(row))
            .and_then(|&i| self.index.get(i))
    }

    pub fn handle_key(&mut self, key: NavKey) -> NavOutcome {
        let count = self.results.len();
        match key {
            NavKey::Down | NavKey::Up if count == 0 => NavOutcome::Ignored,
            NavKey::Down => {
                let next = self.selected.map_or(0, |s| (s + 1).min(count - 1));
                self.selected = Some(next);
                NavOutcome::SelectionMoved(next)
            }
            NavKey::Up => {
                let next = self.selected.map_or(0, |s| s.saturating_sub(1));
                self.selected = Some(next);
                NavOutcome::SelectionMoved(next)
            }
            NavKey::Enter => match self.selected_entry() {
                Some(entry) => NavOutcome::Navigate(entry.url.to_string()),
                None => NavOutcome::Ignored,
            },
            NavKey::Escape => NavOutcome::Close,
        }
    }
}

/// Opens `state` and runs `show`. A failing `show` closes the state again so
/// the overlay is never marked open while still hidden. `Ok(false)` when it
/// was already open.
pub fn open_with<E>(
    state: &RefCell<SearchState>,
    show: impl FnOnce() -> Result<(), E>,
) -> Result<bool, E> {
    if !state.borrow_mut().open() {
        return Ok(false);
    }
    match show() {
        Ok(()) => Ok(true),
        Err(e) => {
            state.borrow_mut().close();
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> SearchState {
        SearchState::new(SearchIndex::new(vec![
            SearchEntry::new("about", "/about.html", "about"),
            SearchEntry::new("work", "/work.html", "work"),
            SearchEntry::new("contact", "/contact.html", "contact"),
        ]))
    }

    #[test]
    fn down_clamps_at_last_row() {
        let mut s = state();
        s.open();
        assert_eq!(s.handle_key(NavKey::Down), NavOutcome::SelectionMoved(1));
        assert_eq!(s.handle_key(NavKey::Down), NavOutcome::SelectionMoved(2));
        assert_eq!(s.handle_key(NavKey::Down), NavOutcome::SelectionMoved(2));
        assert_eq!(s.selected(), Some(2));
    }

    #[test]
    fn up_clamps_at_first_row() {
        let mut s = state();
        s.open();
        assert_eq!(s.handle_key(NavKey::Up), NavOutcome::SelectionMoved(0));
        assert_eq!(s.selected(), Some(0));
    }

    #[test]
    fn enter_navigates_to_selected_url() {
        let mut s = state();
        s.open();
        s.handle_key(NavKey::Down);
        assert_eq!(s.handle_key(NavKey::Enter), NavOutcome::Navigate("/work.html".to_string()));
    }

    #[test]
    fn query_resets_selection_to_first_hit() {
        let mut s = state();
        s.open();
        s.handle_key(NavKey::Down);
        s.set_query("con");
        assert_eq!(s.selected(), Some(0));
        assert_eq!(s.selected_entry().map(|e| e.title.to_string()), Some("contact".to_string()));
    }

    #[test]
    fn no_hits_means_no_selection() {
        let mut s = state();
        s.open();
        s.set_query("zzz");
        assert_eq!(s.result_count(), 0);
        assert_eq!(s.selected(), None);
        assert_eq!(s.handle_key(NavKey::Down), NavOutcome::Ignored);
        assert_eq!(s.handle_key(NavKey::Enter), NavOutcome::Ignored);
    }

    #[test]
    fn opening_resets_query() {
        let mut s = state();
        s.open();
        s.set_query("work");
        s.close();
        assert!(s.open());
        assert_eq!(s.query(), "");
        assert_eq!(s.result_count(), 3);
    }

    #[test]
    fn close_is_idempotent() {
        let mut s = state();
        s.open();
        assert!(s.close());
        assert!(!s.close());
        assert!(!s.is_open());
    }

    #[test]
    fn failed_open_leaves_state_closed() {
        let s = RefCell::new(state());
        assert_eq!(open_with(&s, || Err("render failed")), Err("render failed"));
        assert!(!s.borrow().is_open());
        assert_eq!(open_with::<()>(&s, || Ok(())), Ok(true));
        assert!(s.borrow().is_open());
        assert_eq!(open_with::<()>(&s, || Ok(())), Ok(false));
    }

    #[test]
    fn escape_requests_close() {
        let mut s = state();
        assert_eq!(s.handle_key(NavKey::Escape), NavOutcome::Close);
    }

    #[test]
    fn hotkeys() {
        assert_eq!(hotkey("k", true, false, false, true), Some(Hotkey::Toggle));
        assert_eq!(hotkey("K", false, true, false, false), Some(Hotkey::Toggle));
        assert_eq!(hotkey("k", false, false, false, false), None);
        assert_eq!(hotkey("/", false, false, false, false), Some(Hotkey::Open));
        assert_eq!(hotkey("/", false, false, false, true), None);
    }
}
