use chrono::Datelike;
use web_sys::Document;

pub fn current_year() -> i32 {
    chrono::Local::now().year()
}

/// Stamps the footer's `#year` placeholder.
pub fn install(document: &Document) {
    if let Some(el) = document.get_element_by_id("year") {
        el.set_text_content(Some(current_year().to_string().as_str()));
    }
}
