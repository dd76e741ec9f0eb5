use gloo_events::{EventListener, EventListenerOptions};
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, KeyboardEvent};

use crate::error::SiteResult;
use crate::utils::dom;

const BUTTON_SELECTOR: &str = ".ux-acc__btn";

/// Where focus should land after `key` is pressed on button `current` of `len`.
/// Arrow keys wrap around.
pub fn roving_target(current: usize, len: usize, key: &str) -> Option<usize> {
    if len == 0 || current >= len {
        return None;
    }
    match key {
        "ArrowDown" => Some((current + 1) % len),
        "ArrowUp" => Some((current + len - 1) % len),
        "Home" => Some(0),
        "End" => Some(len - 1),
        _ => None,
    }
}

pub fn is_expanded(aria_expanded: Option<&str>) -> bool {
    aria_expanded == Some("true")
}

fn toggle(document: &Document, button: &Element) {
    let open = is_expanded(button.get_attribute("aria-expanded").as_deref());
    let _ = button.set_attribute("aria-expanded", if open { "false" } else { "true" });
    let pane = button
        .get_attribute("aria-controls")
        .and_then(|id| document.get_element_by_id(&id))
        .and_then(|el| el.dyn_into::<HtmlElement>().ok());
    match pane {
        Some(pane) => pane.set_hidden(open),
        None => log::debug!("Accordion button without a matching panel"),
    }
}

pub struct Accordion {
    _click: EventListener,
    _keydown: EventListener,
}

pub fn install(document: &Document) -> SiteResult<Option<Accordion>> {
    let Some(acc) = dom::query_document(document, ".ux-acc") else {
        return Ok(None);
    };

    let click = {
        let document = document.clone();
        EventListener::new(&acc, "click", move |event| {
            let button = event
                .target()
                .and_then(|t| t.dyn_into::<Element>().ok())
                .and_then(|el| el.closest(BUTTON_SELECTOR).ok().flatten());
            if let Some(button) = button {
                toggle(&document, &button);
            }
        })
    };

    let keydown = {
        let document = document.clone();
        let container = acc.clone();
        EventListener::new_with_options(
            &acc,
            "keydown",
            EventListenerOptions::enable_prevent_default(),
            move |event| {
                let Some(key_event) = event.dyn_ref::<KeyboardEvent>() else {
                    return;
                };
                let Some(active) = document.active_element() else {
                    return;
                };
                // Buttons are looked up per keypress so panels added later still rove.
                let buttons: Vec<HtmlElement> = container
                    .query_selector_all(BUTTON_SELECTOR)
                    .map(|list| {
                        (0..list.length())
                            .filter_map(|i| list.item(i))
                            .filter_map(|n| n.dyn_into::<HtmlElement>().ok())
                            .collect()
                    })
                    .unwrap_or_default();
                let Some(current) = buttons.iter().position(|b| {
                    let b: &Element = b.as_ref();
                    b == &active
                }) else {
                    return;
                };
                if let Some(next) = roving_target(current, buttons.len(), &key_event.key()) {
                    event.prevent_default();
                    let _ = buttons[next].focus();
                }
            },
        )
    };

    Ok(Some(Accordion {
        _click: click,
        _keydown: keydown,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrows_wrap_around() {
        assert_eq!(roving_target(2, 3, "ArrowDown"), Some(0));
        assert_eq!(roving_target(0, 3, "ArrowUp"), Some(2));
        assert_eq!(roving_target(1, 3, "ArrowDown"), Some(2));
    }

    #[test]
    fn home_and_end_jump_to_edges() {
        assert_eq!(roving_target(1, 4, "Home"), Some(0));
        assert_eq!(roving_target(1, 4, "End"), Some(3));
    }

    #[test]
    fn other_keys_and_empty_lists_do_nothing() {
        assert_eq!(roving_target(0, 3, "Enter"), None);
        assert_eq!(roving_target(0, 0, "ArrowDown"), None);
        assert_eq!(roving_target(5, 3, "Home"), None);
    }

    #[test]
    fn only_literal_true_counts_as_expanded() {
        assert!(is_expanded(Some("true")));
        assert!(!is_expanded(Some("false")));
        assert!(!is_expanded(None));
    }
}
