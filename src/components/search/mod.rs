//! Client-side search over the site's route list.

pub mod index;
pub mod overlay;
pub mod view;

pub use index::{SearchEntry, SearchIndex, SITE_ROUTES};
pub use overlay::{NavKey, NavOutcome, SearchState};
pub use view::{install, SearchOverlay};
