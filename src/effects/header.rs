use gloo_events::EventListener;
use web_sys::{Document, Window};

use crate::error::SiteResult;
use crate::utils::dom;

const SCROLLED_CLASS: &str = "is-scrolled";

pub fn is_scrolled(scroll_y: f64, threshold: f64) -> bool {
    scroll_y > threshold
}

pub struct HeaderShrink {
    _scroll: EventListener,
}

/// Toggles `.site-header.is-scrolled` once the page leaves the top.
pub fn install(
    window: &Window,
    document: &Document,
    threshold: f64,
) -> SiteResult<Option<HeaderShrink>> {
    let Some(header) = dom::query_document(document, ".site-header") else {
        log::debug!("No .site-header, skipping header shrink");
        return Ok(None);
    };

    let sync = {
        let window = window.clone();
        move || {
            let y = window.scroll_y().unwrap_or(0.0);
            let _ = header
                .class_list()
                .toggle_with_force(SCROLLED_CLASS, is_scrolled(y, threshold));
        }
    };
    sync();

    let scroll = EventListener::new(window, "scroll", move |_| sync());
    Ok(Some(HeaderShrink { _scroll: scroll }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_is_exclusive() {
        assert!(!is_scrolled(0.0, 4.0));
        assert!(!is_scrolled(4.0, 4.0));
        assert!(is_scrolled(4.5, 4.0));
    }
}
