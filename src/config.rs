use serde::Deserialize;

use crate::error::SiteResult;

/// Id of the optional `<script type="application/json">` block holding overrides.
pub const CONFIG_ELEMENT_ID: &str = "site-config";

/// Page-level tunables. Every field has a default so a page can override
/// any subset of them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub log_level: String,
    pub ticker_message: String,
    pub ticker_interval_ms: u32,
    pub reveal_step_ms: u32,
    pub reveal_force_count: usize,
    pub plus_count_narrow: usize,
    pub plus_count_wide: usize,
    pub marquee_default_pps: f64,
    pub header_threshold_px: f64,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            ticker_message: "chrrybmb — who looks inside awakes ⋆˙⟡".to_string(),
            ticker_interval_ms: 200,
            reveal_step_ms: 70,
            reveal_force_count: 6,
            plus_count_narrow: 12,
            plus_count_wide: 24,
            marquee_default_pps: 60.0,
            header_threshold_px: 4.0,
        }
    }
}

impl SiteConfig {
    pub fn from_json(raw: &str) -> SiteResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Reads overrides from the page. Falls back to defaults when the block is
    /// absent or unparsable.
    pub fn load(document: &web_sys::Document) -> Self {
        let raw = match document.get_element_by_id(CONFIG_ELEMENT_ID) {
            Some(el) => el.text_content().unwrap_or_default(),
            None => return Self::default(),
        };
        match Self::from_json(&raw) {
            Ok(config) => config,
            Err(e) => {
                gloo_console::warn!(format!("Ignoring #{}: {}", CONFIG_ELEMENT_ID, e));
                Self::default()
            }
        }
    }

    pub fn log_level(&self) -> log::Level {
        self.log_level.parse().unwrap_or(log::Level::Info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config =
            SiteConfig::from_json(r#"{"ticker_interval_ms": 120, "log_level": "debug"}"#).unwrap();
        assert_eq!(config.ticker_interval_ms, 120);
        assert_eq!(config.log_level(), log::Level::Debug);
        assert_eq!(config.reveal_step_ms, 70);
        assert_eq!(config.plus_count_wide, 24);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(SiteConfig::from_json("{ticker").is_err());
    }

    #[test]
    fn unknown_level_falls_back_to_info() {
        let config = SiteConfig {
            log_level: "loud".to_string(),
            ..SiteConfig::default()
        };
        assert_eq!(config.log_level(), log::Level::Info);
    }
}
