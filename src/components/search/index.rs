use std::borrow::Cow;

use serde::Deserialize;

use crate::error::SiteResult;

/// Id of an optional `<script type="application/json">` replacing the built-in routes.
pub const INDEX_ELEMENT_ID: &str = "search-index";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SearchEntry {
    pub title: Cow<'static, str>,
    pub url: Cow<'static, str>,
    pub path: Cow<'static, str>,
}

impl SearchEntry {
    pub const fn new(title: &'static str, url: &'static str, path: &'static str) -> Self {
        Self {
            title: Cow::Borrowed(title),
            url: Cow::Borrowed(url),
            path: Cow::Borrowed(path),
        }
    }

    /// Case-insensitive substring match on title, path or url. `needle` must
    /// already be lowercase.
    fn matches(&self, needle: &str) -> bool {
        [&self.title, &self.path, &self.url]
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }
}

pub const SITE_ROUTES: &[SearchEntry] = &[
    SearchEntry::new("home", "/index.html", ""),
    SearchEntry::new("about", "/about.html", "about"),
    SearchEntry::new("work", "/work.html", "work"),
    SearchEntry::new("services", "/services.html", "services"),
    SearchEntry::new("ux checklist", "/ux-checklist.html", "ux-checklist"),
    SearchEntry::new("journal", "/journal.html", "journal"),
    SearchEntry::new("contact", "/contact.html", "contact"),
    SearchEntry::new("privacy", "/privacy.html", "privacy"),
];

/// The searchable route list. Immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchIndex {
    entries: Vec<SearchEntry>,
}

impl Default for SearchIndex {
    fn default() -> Self {
        Self::new(SITE_ROUTES.to_vec())
    }
}

impl SearchIndex {
    pub fn new(entries: Vec<SearchEntry>) -> Self {
        Self { entries }
    }

    pub fn from_json(raw: &str) -> SiteResult<Self> {
        Ok(Self::new(serde_json::from_str(raw)?))
    }

    /// Built-in routes unless the page embeds its own list.
    pub fn load(document: &web_sys::Document) -> Self {
        let Some(el) = document.get_element_by_id(INDEX_ELEMENT_ID) else {
            return Self::default();
        };
        match Self::from_json(&el.text_content().unwrap_or_default()) {
            Ok(index) => index,
            Err(e) => {
                log::warn!("Ignoring #{}: {}", INDEX_ELEMENT_ID, e);
                Self::default()
            }
        }
    }

    pub fn get(&self, position: usize) -> Option<&SearchEntry> {
        self.entries.get(position)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Positions of matching entries, in index order. Only the empty query
    /// matches all; whitespace is matched literally.
    pub fn filter(&self, query: &str) -> Vec<usize> {
        let needle = query.to_lowercase();
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| needle.is_empty() || entry.matches(&needle))
            .map(|(i, _)| i)
            .collect()
    }
}
