//! Page enhancements for the chrrybmb site, compiled to WebAssembly.
//!
//! Every effect is installed independently at start and skipped when its
//! markup is missing. Dropping the returned handles removes their listeners,
//! timers and animation frames.

pub mod components;
pub mod config;
pub mod effects;
pub mod error;
pub mod utils;

use std::cell::RefCell;

use gloo_events::EventListener;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Window};

use components::accordion::Accordion;
use components::marquee::Marquees;
use components::reveal::ScrollReveal;
use components::search::SearchOverlay;
use config::SiteConfig;
use effects::header::HeaderShrink;
use effects::lens::CursorLens;
use effects::orb::GlowOrb;
use effects::ticker::TitleTickerHandle;
use effects::tilt::FeatureCards;
use effects::wave::IridescentWave;
use error::SiteResult;
use utils::dom;
use utils::motion::Environment;

thread_local! {
    static SITE: RefCell<Option<Site>> = RefCell::new(None);
}

/// Handles for everything installed on the current page.
#[derive(Default)]
pub struct Site {
    header: Option<HeaderShrink>,
    orb: Option<GlowOrb>,
    wave: Option<IridescentWave>,
    lens: Option<CursorLens>,
    plus_field: Option<EventListener>,
    reveal: Option<ScrollReveal>,
    cards: Option<FeatureCards>,
    ticker: Option<TitleTickerHandle>,
    accordion: Option<Accordion>,
    search: Option<SearchOverlay>,
    marquees: Option<Marquees>,
}

fn installed<T>(name: &str, result: SiteResult<Option<T>>) -> Option<T> {
    match result {
        Ok(handle) => {
            if handle.is_some() {
                log::debug!("Installed {}", name);
            }
            handle
        }
        Err(e) => {
            log::warn!("{} not installed: {}", name, e);
            None
        }
    }
}

impl Site {
    pub fn install(window: &Window, document: &Document, config: &SiteConfig) -> Self {
        let env = Environment::detect(window);
        log::debug!("Environment: {:?}", env);

        effects::year::install(document);

        let mut site = Site {
            header: installed(
                "header",
                effects::header::install(window, document, config.header_threshold_px),
            ),
            plus_field: installed(
                "plus field",
                effects::plus_field::install(document, config, &env),
            ),
            reveal: installed(
                "reveal",
                components::reveal::install(window, document, config, &env),
            ),
            cards: installed("card tilt", effects::tilt::install(document, &env)),
            ticker: installed(
                "title ticker",
                effects::ticker::install(window, document, config).map(Some),
            ),
            accordion: installed("accordion", components::accordion::install(document)),
            search: installed("search", components::search::install(window, document)),
            marquees: installed(
                "marquee",
                components::marquee::install(window, document, config, &env),
            ),
            ..Site::default()
        };

        match dom::root_element(document) {
            Ok(root) => {
                site.orb = installed("orb", effects::orb::install(window, &root).map(Some));
                site.wave = installed("wave", effects::wave::install(window, document, &root));
                site.lens = installed(
                    "lens",
                    effects::lens::install(window, &root, &env).map(Some),
                );
            }
            Err(e) => log::warn!("Pointer effects not installed: {}", e),
        }

        site
    }

    pub fn teardown(self) {
        let Site {
            header,
            orb,
            mut wave,
            lens,
            plus_field,
            reveal,
            cards,
            ticker,
            accordion,
            search,
            marquees,
        } = self;

        // Give scrolling and focus back before the listeners go away.
        if let Some(search) = search.as_ref() {
            search.close();
        }
        if let Some(wave) = wave.as_mut() {
            wave.stop_orbit();
        }
        if let Some(reveal) = reveal.as_ref() {
            log::debug!("Reveal had shown {} targets", reveal.revealed_count());
        }
        if let Some(marquees) = marquees.as_ref() {
            log::debug!("Dropping {} marquees", marquees.len());
        }
        drop((marquees, search, accordion, ticker, cards, reveal, plus_field));
        drop((lens, wave, orb, header));
        log::debug!("Site effects torn down");
    }
}

#[wasm_bindgen(start)]
pub fn start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    let (window, document) = match (dom::window(), dom::document()) {
        (Ok(window), Ok(document)) => (window, document),
        _ => {
            gloo_console::error!("No window/document, site effects disabled");
            return;
        }
    };

    let config = SiteConfig::load(&document);
    wasm_logger::init(wasm_logger::Config::new(config.log_level()));

    let site = Site::install(&window, &document, &config);
    SITE.with(|slot| {
        if let Some(previous) = slot.borrow_mut().replace(site) {
            previous.teardown();
        }
    });
}

/// Removes every listener, timer and animation frame installed by `start`.
#[wasm_bindgen]
pub fn teardown() {
    let site = SITE.with(|slot| slot.borrow_mut().take());
    if let Some(site) = site {
        site.teardown();
    }
}
