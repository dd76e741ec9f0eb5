use std::cell::RefCell;
use std::rc::Rc;

use gloo_events::{EventListener, EventListenerOptions};
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, HtmlElement, HtmlInputElement, KeyboardEvent, Window};

use super::index::SearchIndex;
use super::overlay::{hotkey, open_with, Hotkey, NavKey, NavOutcome, SearchState};
use crate::error::SiteResult;

const OVERLAY_ID: &str = "search-overlay";
const INPUT_ID: &str = "search-input";
const RESULTS_ID: &str = "search-results";
const OPEN_BUTTON_ID: &str = "search-open";
const CLOSE_SELECTOR: &str = "[data-search-close]";
const SELECTED_CLASS: &str = "is-selected";
const NO_RESULTS: &str = "No results";

fn row_id(row: usize) -> String {
    format!("search-result-{}", row)
}

fn is_editable(el: &Element) -> bool {
    matches!(el.tag_name().as_str(), "INPUT" | "TEXTAREA" | "SELECT")
        || el
            .dyn_ref::<HtmlElement>()
            .map(|h| h.is_content_editable())
            .unwrap_or(false)
}

struct OverlayInner {
    window: Window,
    document: Document,
    overlay: HtmlElement,
    input: HtmlInputElement,
    list: HtmlElement,
    state: RefCell<SearchState>,
    return_focus: RefCell<Option<HtmlElement>>,
    saved_overflow: RefCell<Option<String>>,
}

impl OverlayInner {
    fn render(&self) -> SiteResult<()> {
        self.list.set_text_content(None);
        let state = self.state.borrow();

        if state.result_count() == 0 {
            let li = self.document.create_element("li")?;
            li.set_class_name("search-empty");
            li.set_attribute("role", "option")?;
            li.set_attribute("aria-disabled", "true")?;
            li.set_text_content(Some(NO_RESULTS));
            self.list.append_child(&li)?;
            self.input.remove_attribute("aria-activedescendant")?;
            return Ok(());
        }

        for (row, entry) in state.results().enumerate() {
            let li = self.document.create_element("li")?;
            li.set_id(&row_id(row));
            li.set_class_name("search-result");
            li.set_attribute("role", "option")?;

            let link = self.document.create_element("a")?;
            link.set_attribute("href", &entry.url)?;
            link.set_attribute("tabindex", "-1")?;

            let title = self.document.create_element("span")?;
            title.set_class_name("search-result__title");
            title.set_text_content(Some(&*entry.title));
            let path = self.document.create_element("span")?;
            path.set_class_name("search-result__path");
            path.set_text_content(Some(format!("/{}", entry.path).as_str()));

            link.append_child(&title)?;
            link.append_child(&path)?;
            li.append_child(&link)?;
            self.list.append_child(&li)?;
        }
        drop(state);
        self.mark_selection()
    }

    /// Moves `aria-selected` without rebuilding the list.
    fn mark_selection(&self) -> SiteResult<()> {
        let selected = self.state.borrow().selected();
        let rows = self.list.children();
        for row in 0..rows.length() {
            let Some(li) = rows.item(row) else {
                continue;
            };
            let is_selected = selected == Some(row as usize);
            li.set_attribute("aria-selected", if is_selected { "true" } else { "false" })?;
            li.class_list().toggle_with_force(SELECTED_CLASS, is_selected)?;
            if is_selected {
                li.scroll_into_view_with_bool(false);
            }
        }
        match selected {
            Some(row) => self.input.set_attribute("aria-activedescendant", &row_id(row))?,
            None => self.input.remove_attribute("aria-activedescendant")?,
        }
        Ok(())
    }

    fn open(&self) -> SiteResult<()> {
        let result = open_with(&self.state, || self.show());
        if result.is_err() {
            self.overlay.set_hidden(true);
            self.return_focus.borrow_mut().take();
            report(self.restore_scroll());
        }
        if result? {
            log::debug!("Search overlay opened");
        }
        Ok(())
    }

    fn show(&self) -> SiteResult<()> {
        *self.return_focus.borrow_mut() = self
            .document
            .active_element()
            .and_then(|el| el.dyn_into::<HtmlElement>().ok());

        self.input.set_value("");
        self.render()?;
        self.overlay.set_hidden(false);

        if let Some(body) = self.document.body() {
            let style = body.style();
            *self.saved_overflow.borrow_mut() = Some(style.get_property_value("overflow")?);
            style.set_property("overflow", "hidden")?;
        }
        self.input.focus()?;
        Ok(())
    }

    /// Safe to call from every close path; only the first call does anything.
    fn close(&self) -> SiteResult<()> {
        if !self.state.borrow_mut().close() {
            return Ok(());
        }
        self.overlay.set_hidden(true);
        self.restore_scroll()?;
        if let Some(el) = self.return_focus.borrow_mut().take() {
            el.focus()?;
        }
        log::debug!("Search overlay closed");
        Ok(())
    }

    /// Puts back the body overflow saved by `show`, if any.
    fn restore_scroll(&self) -> SiteResult<()> {
        let Some(previous) = self.saved_overflow.borrow_mut().take() else {
            return Ok(());
        };
        let Some(body) = self.document.body() else {
            return Ok(());
        };
        let style = body.style();
        if previous.is_empty() {
            style.remove_property("overflow")?;
        } else {
            style.set_property("overflow", &previous)?;
        }
        Ok(())
    }

    fn toggle(&self) -> SiteResult<()> {
        let open = self.state.borrow().is_open();
        if open {
            self.close()
        } else {
            self.open()
        }
    }

    fn on_query(&self) -> SiteResult<()> {
        self.state.borrow_mut().set_query(&self.input.value());
        self.render()
    }

    fn on_nav_key(&self, event: &KeyboardEvent) -> SiteResult<()> {
        let Some(key) = NavKey::from_key(&event.key()) else {
            return Ok(());
        };
        let outcome = self.state.borrow_mut().handle_key(key);
        match outcome {
            NavOutcome::Ignored => Ok(()),
            NavOutcome::SelectionMoved(_) => {
                event.prevent_default();
                self.mark_selection()
            }
            NavOutcome::Navigate(url) => {
                event.prevent_default();
                self.close()?;
                self.window.location().set_href(&url)?;
                Ok(())
            }
            NavOutcome::Close => {
                event.prevent_default();
                self.close()
            }
        }
    }

    fn on_global_key(&self, event: &KeyboardEvent) -> SiteResult<()> {
        let in_editable = self
            .document
            .active_element()
            .map(|el| is_editable(&el))
            .unwrap_or(false);
        let action = hotkey(
            &event.key(),
            event.ctrl_key(),
            event.meta_key(),
            event.alt_key(),
            in_editable,
        );
        match action {
            Some(Hotkey::Toggle) => {
                event.prevent_default();
                self.toggle()
            }
            Some(Hotkey::Open) => {
                event.prevent_default();
                self.open()
            }
            None => Ok(()),
        }
    }
}

fn report(result: SiteResult<()>) {
    if let Err(e) = result {
        log::warn!("Search overlay: {}", e);
    }
}

pub struct SearchOverlay {
    inner: Rc<OverlayInner>,
    _listeners: Vec<EventListener>,
}

impl SearchOverlay {
    pub fn close(&self) {
        report(self.inner.close());
    }
}

pub fn install(window: &Window, document: &Document) -> SiteResult<Option<SearchOverlay>> {
    let overlay = document
        .get_element_by_id(OVERLAY_ID)
        .and_then(|el| el.dyn_into::<HtmlElement>().ok());
    let input = document
        .get_element_by_id(INPUT_ID)
        .and_then(|el| el.dyn_into::<HtmlInputElement>().ok());
    let list = document
        .get_element_by_id(RESULTS_ID)
        .and_then(|el| el.dyn_into::<HtmlElement>().ok());
    let (Some(overlay), Some(input), Some(list)) = (overlay, input, list) else {
        log::debug!("Search markup incomplete, skipping overlay");
        return Ok(None);
    };

    let index = SearchIndex::load(document);
    if index.is_empty() {
        log::debug!("Search index is empty, every query shows the placeholder");
    } else {
        log::debug!("Search index holds {} routes", index.len());
    }
    overlay.set_hidden(true);

    let inner = Rc::new(OverlayInner {
        window: window.clone(),
        document: document.clone(),
        overlay: overlay.clone(),
        input: input.clone(),
        list,
        state: RefCell::new(SearchState::new(index)),
        return_focus: RefCell::new(None),
        saved_overflow: RefCell::new(None),
    });

    let mut listeners = Vec::new();

    {
        let inner = inner.clone();
        listeners.push(EventListener::new_with_options(
            document,
            "keydown",
            EventListenerOptions::enable_prevent_default(),
            move |event| {
                if let Some(key_event) = event.dyn_ref::<KeyboardEvent>() {
                    report(inner.on_global_key(key_event));
                }
            },
        ));
    }
    {
        let inner = inner.clone();
        listeners.push(EventListener::new(&input, "input", move |_| report(inner.on_query())));
    }
    {
        let inner = inner.clone();
        listeners.push(EventListener::new_with_options(
            &overlay,
            "keydown",
            EventListenerOptions::enable_prevent_default(),
            move |event| {
                if let Some(key_event) = event.dyn_ref::<KeyboardEvent>() {
                    report(inner.on_nav_key(key_event));
                }
            },
        ));
    }
    {
        let inner = inner.clone();
        listeners.push(EventListener::new(&overlay, "click", move |event: &Event| {
            let wants_close = event
                .target()
                .and_then(|t| t.dyn_into::<Element>().ok())
                .and_then(|el| el.closest(CLOSE_SELECTOR).ok().flatten())
                .is_some();
            if wants_close {
                report(inner.close());
            }
        }));
    }
    if let Some(button) = document.get_element_by_id(OPEN_BUTTON_ID) {
        let inner = inner.clone();
        listeners.push(EventListener::new(&button, "click", move |_| report(inner.toggle())));
    }

    Ok(Some(SearchOverlay {
        inner,
        _listeners: listeners,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_ids_are_stable() {
        assert_eq!(row_id(0), "search-result-0");
        assert_eq!(row_id(12), "search-result-12");
    }
}
