use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, HtmlElement, MouseEvent, TouchEvent, Window};

use crate::error::{SiteError, SiteResult};

pub fn window() -> SiteResult<Window> {
    web_sys::window().ok_or(SiteError::MissingElement("window"))
}

pub fn document() -> SiteResult<Document> {
    window()?
        .document()
        .ok_or(SiteError::MissingElement("document"))
}

/// The `<html>` element, where the page-wide custom properties live.
pub fn root_element(document: &Document) -> SiteResult<HtmlElement> {
    document
        .document_element()
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        .ok_or(SiteError::MissingElement("documentElement"))
}

pub fn query(parent: &impl AsRef<Element>, selector: &str) -> Option<HtmlElement> {
    parent
        .as_ref()
        .query_selector(selector)
        .ok()
        .flatten()
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
}

pub fn query_document(document: &Document, selector: &str) -> Option<HtmlElement> {
    document
        .query_selector(selector)
        .ok()
        .flatten()
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
}

/// All matches in document order. An invalid selector yields nothing.
pub fn query_all(parent: &Document, selector: &str) -> Vec<HtmlElement> {
    let Ok(list) = parent.query_selector_all(selector) else {
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<HtmlElement>().ok())
        .collect()
}

pub fn children(parent: &Element) -> Vec<Element> {
    let list = parent.children();
    (0..list.length()).filter_map(|i| list.item(i)).collect()
}

pub fn set_var(el: &HtmlElement, name: &str, value: &str) -> SiteResult<()> {
    el.style().set_property(name, value)?;
    Ok(())
}

pub fn get_var(el: &HtmlElement, name: &str) -> String {
    el.style().get_property_value(name).unwrap_or_default()
}

/// Custom property value as resolved by the cascade, not just the inline style.
pub fn computed_var(window: &Window, el: &Element, name: &str) -> Option<String> {
    window
        .get_computed_style(el)
        .ok()
        .flatten()
        .and_then(|style| style.get_property_value(name).ok())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Viewport coordinates of a mouse/pointer event, or of the first touch.
pub fn pointer_position(event: &Event) -> Option<(f64, f64)> {
    if let Some(touch_event) = event.dyn_ref::<TouchEvent>() {
        let touch = touch_event.touches().get(0)?;
        return Some((touch.client_x() as f64, touch.client_y() as f64));
    }
    event
        .dyn_ref::<MouseEvent>()
        .map(|m| (m.client_x() as f64, m.client_y() as f64))
}

pub fn viewport_size(window: &Window) -> (f64, f64) {
    let width = window
        .inner_width()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0);
    let height = window
        .inner_height()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0);
    (width, height)
}
