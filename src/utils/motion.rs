use web_sys::{MediaQueryList, Window};

pub const REDUCED_MOTION: &str = "(prefers-reduced-motion: reduce)";
pub const NARROW_SCREEN: &str = "(max-width: 640px)";
pub const FINE_POINTER: &str = "(hover:hover) and (pointer:fine)";

pub fn media_query(window: &Window, query: &str) -> Option<MediaQueryList> {
    window.match_media(query).ok().flatten()
}

pub fn matches(window: &Window, query: &str) -> bool {
    media_query(window, query)
        .map(|mql| mql.matches())
        .unwrap_or(false)
}

/// Media preferences sampled once when the effects are installed.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Environment {
    pub reduced_motion: bool,
    pub narrow: bool,
    pub fine_pointer: bool,
}

impl Environment {
    pub fn detect(window: &Window) -> Self {
        Self {
            reduced_motion: matches(window, REDUCED_MOTION),
            narrow: matches(window, NARROW_SCREEN),
            fine_pointer: matches(window, FINE_POINTER),
        }
    }
}
