use gloo_events::EventListener;
use rand::Rng;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement};

use crate::config::SiteConfig;
use crate::error::SiteResult;
use crate::utils::dom;
use crate::utils::motion::Environment;

const SPREAD: f64 = 60.0;
const BIAS_POWER: f64 = 1.6;

fn bias<R: Rng>(rng: &mut R) -> f64 {
    rng.gen::<f64>().powf(BIAS_POWER)
}

/// One decorative "+" and its randomized presentation.
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    pub right_vw: f64,
    pub bottom_vh: f64,
    pub alpha: f64,
    pub rot_deg: f64,
    pub font_px: u32,
    pub drift_s: f64,
    pub shine_s: f64,
}

impl Sprite {
    /// Positions are skewed toward the bottom-right corner.
    pub fn sample<R: Rng>(rng: &mut R) -> Self {
        Self {
            right_vw: bias(rng) * SPREAD,
            bottom_vh: bias(rng) * SPREAD,
            alpha: rng.gen_range(0.35..0.6),
            rot_deg: rng.gen_range(-6.0..6.0),
            font_px: rng.gen_range(18.0f64..46.0).round() as u32,
            drift_s: rng.gen_range(10.0..16.0),
            shine_s: rng.gen_range(3.0..4.8),
        }
    }

    fn apply(&self, el: &HtmlElement) -> SiteResult<()> {
        let style = el.style();
        style.set_property("right", &format!("{:.2}vw", self.right_vw))?;
        style.set_property("bottom", &format!("{:.2}vh", self.bottom_vh))?;
        style.set_property("--alpha", &format!("{:.2}", self.alpha))?;
        style.set_property("--rot", &format!("{:.1}deg", self.rot_deg))?;
        style.set_property("font-size", &format!("{}px", self.font_px))?;
        style.set_property("--driftDur", &format!("{:.2}s", self.drift_s))?;
        style.set_property("--shineDur", &format!("{:.2}s", self.shine_s))?;
        Ok(())
    }
}

pub fn sprite_count(config: &SiteConfig, env: &Environment) -> usize {
    if env.narrow {
        config.plus_count_narrow
    } else {
        config.plus_count_wide
    }
}

fn sprinkle(document: &Document, count: usize) -> SiteResult<()> {
    let Some(field) = dom::query_document(document, ".plus-field") else {
        log::debug!("No .plus-field, skipping sprites");
        return Ok(());
    };
    let mut rng = rand::thread_rng();
    for _ in 0..count {
        let el = document.create_element("span")?;
        el.set_class_name("plus");
        el.set_text_content(Some("+"));
        let el: HtmlElement = el.unchecked_into();
        Sprite::sample(&mut rng).apply(&el)?;
        field.append_child(&el)?;
    }
    Ok(())
}

/// Sprinkles sprites once the DOM is parsed. Returns the pending listener
/// when the document is still loading.
pub fn install(
    document: &Document,
    config: &SiteConfig,
    env: &Environment,
) -> SiteResult<Option<EventListener>> {
    let count = sprite_count(config, env);
    if document.ready_state() != "loading" {
        sprinkle(document, count)?;
        return Ok(None);
    }
    let doc = document.clone();
    Ok(Some(EventListener::once(document, "DOMContentLoaded", move |_| {
        if let Err(e) = sprinkle(&doc, count) {
            log::warn!("Plus field failed: {}", e);
        }
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn sampled_sprites_stay_in_range() {
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..500 {
            let s = Sprite::sample(&mut rng);
            assert!((0.0..=SPREAD).contains(&s.right_vw));
            assert!((0.0..=SPREAD).contains(&s.bottom_vh));
            assert!((0.35..0.6).contains(&s.alpha));
            assert!((-6.0..6.0).contains(&s.rot_deg));
            assert!((18..=46).contains(&s.font_px));
            assert!((10.0..16.0).contains(&s.drift_s));
            assert!((3.0..4.8).contains(&s.shine_s));
        }
    }

    #[test]
    fn fewer_sprites_on_narrow_screens() {
        let config = SiteConfig::default();
        let narrow = Environment { narrow: true, ..Environment::default() };
        assert_eq!(sprite_count(&config, &narrow), 12);
        assert_eq!(sprite_count(&config, &Environment::default()), 24);
    }
}
