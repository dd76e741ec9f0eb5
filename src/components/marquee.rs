//! Seamless horizontal marquee.
//!
//! Markup: a `.marquee` container holding one `.marquee__track`. Whatever the
//! track holds at load is the template. The stylesheet is expected to lay the
//! track out at `max-content` width and animate it by
//! `translateX(calc(-1 * var(--marquee-distance)))` over `--marquee-duration`.
//! Speed comes from the container's `--pps` (pixels per second).

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use gloo_events::EventListener;
use thiserror::Error;
use wasm_bindgen::prelude::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::js_sys;
use web_sys::{Document, Element, HtmlElement, Node, ResizeObserver, Window};

use crate::config::SiteConfig;
use crate::error::SiteResult;
use crate::utils::dom;
use crate::utils::frame::FrameThrottle;
use crate::utils::motion::Environment;

/// Upper bound on template copies appended while filling one cycle.
pub const MAX_FILL_PASSES: usize = 64;

const READY_CLASS: &str = "is-ready";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarqueeError {
    #[error("template is empty")]
    EmptyTemplate,
    #[error("container has no width")]
    ZeroWidth,
    #[error("invalid speed {0} px/s")]
    InvalidSpeed(f64),
    #[error("cycle still narrower than container after {0} passes")]
    PassLimit(usize),
}

/// The track being filled. Implemented over the live DOM and over plain
/// widths in tests.
pub trait TrackSurface {
    fn template_len(&self) -> usize;
    /// Remove everything from the track.
    fn clear(&mut self);
    /// Append one copy of the template.
    fn append_template(&mut self);
    /// Append a copy of everything currently in the track.
    fn duplicate_contents(&mut self);
    fn width(&self) -> f64;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarqueeCycle {
    /// Measured width of one cycle, which is also the translation distance.
    pub width: f64,
    pub template_copies: usize,
    pub duration_secs: f64,
}

impl MarqueeCycle {
    pub fn distance_css(&self) -> String {
        format!("{}px", self.width)
    }

    pub fn duration_css(&self) -> String {
        format!("{}s", self.duration_secs)
    }
}

/// Fills the track with template copies until one cycle covers the container,
/// then doubles it so the track holds exactly two back-to-back cycles.
///
/// On failure the track is left holding a single template copy.
pub fn build<S: TrackSurface>(
    surface: &mut S,
    container_width: f64,
    pixels_per_second: f64,
) -> Result<MarqueeCycle, MarqueeError> {
    if surface.template_len() == 0 {
        return Err(MarqueeError::EmptyTemplate);
    }
    if !(container_width > 0.0) {
        return Err(MarqueeError::ZeroWidth);
    }
    if !(pixels_per_second > 0.0 && pixels_per_second.is_finite()) {
        return Err(MarqueeError::InvalidSpeed(pixels_per_second));
    }

    surface.clear();
    let mut copies = 0;
    loop {
        surface.append_template();
        copies += 1;
        if surface.width() >= container_width {
            break;
        }
        if copies >= MAX_FILL_PASSES {
            surface.clear();
            surface.append_template();
            return Err(MarqueeError::PassLimit(copies));
        }
    }

    let width = surface.width();
    surface.duplicate_contents();
    Ok(MarqueeCycle {
        width,
        template_copies: copies,
        duration_secs: width / pixels_per_second,
    })
}

/// A track backed by real DOM nodes.
pub struct DomTrack {
    track: HtmlElement,
    template: Vec<Node>,
}

impl DomTrack {
    pub fn capture(track: HtmlElement) -> Self {
        let template = dom::children(&track)
            .into_iter()
            .filter_map(|el| el.clone_node_with_deep(true).ok())
            .collect();
        Self { track, template }
    }

    fn append_clone(&self, node: &Node, hidden: bool) {
        let result = node.clone_node_with_deep(true).and_then(|copy| {
            if hidden {
                if let Some(el) = copy.dyn_ref::<Element>() {
                    el.set_attribute("aria-hidden", "true")?;
                }
            }
            self.track.append_child(&copy)
        });
        if let Err(e) = result {
            log::warn!("Marquee clone failed: {:?}", e);
        }
    }
}

impl TrackSurface for DomTrack {
    fn template_len(&self) -> usize {
        self.template.len()
    }

    fn clear(&mut self) {
        self.track.set_text_content(None);
    }

    fn append_template(&mut self) {
        // Only the very first copy stays visible to assistive tech.
        let hidden = self.track.child_element_count() > 0;
        for node in &self.template {
            self.append_clone(node, hidden);
        }
    }

    fn duplicate_contents(&mut self) {
        let current: Vec<Node> = dom::children(&self.track)
            .into_iter()
            .map(Node::from)
            .collect();
        for node in &current {
            self.append_clone(node, true);
        }
    }

    fn width(&self) -> f64 {
        self.track.get_bounding_client_rect().width()
    }
}

struct MarqueeInner {
    container: HtmlElement,
    surface: RefCell<DomTrack>,
    pixels_per_second: f64,
    last_width: Cell<Option<f64>>,
}

impl MarqueeInner {
    fn rebuild(&self) {
        let container_width = self.container.get_bounding_client_rect().width();
        if self.last_width.get() == Some(container_width) {
            return;
        }
        self.last_width.set(Some(container_width));

        let track = self.surface.borrow().track.clone();
        let result = build(
            &mut *self.surface.borrow_mut(),
            container_width,
            self.pixels_per_second,
        );
        match result {
            Ok(cycle) => {
                let _ = dom::set_var(&track, "--marquee-distance", &cycle.distance_css());
                let _ = dom::set_var(&track, "--marquee-duration", &cycle.duration_css());
                let _ = self.container.class_list().add_1(READY_CLASS);
                log::debug!(
                    "Marquee cycle {}px from {} copies",
                    cycle.width,
                    cycle.template_copies
                );
            }
            Err(e) => {
                let _ = self.container.class_list().remove_1(READY_CLASS);
                log::debug!("Marquee not built: {}", e);
            }
        }
    }
}

enum ResizeSource {
    Observer {
        observer: ResizeObserver,
        _callback: Closure<dyn FnMut(js_sys::Array, ResizeObserver)>,
    },
    Window { _listener: EventListener },
}

struct MarqueeInstance {
    _inner: Rc<MarqueeInner>,
    resize: ResizeSource,
    _frame: Rc<FrameThrottle>,
}

impl Drop for MarqueeInstance {
    fn drop(&mut self) {
        if let ResizeSource::Observer { observer, .. } = &self.resize {
            observer.disconnect();
        }
    }
}

pub struct Marquees {
    instances: Vec<MarqueeInstance>,
}

impl Marquees {
    pub(crate) fn len(&self) -> usize {
        self.instances.len()
    }
}

/// Reduced motion keeps the authored markup as is.
pub fn should_build(env: &Environment) -> bool {
    !env.reduced_motion
}

pub fn parse_pps(raw: Option<&str>, fallback: f64) -> f64 {
    raw.and_then(|v| v.trim().trim_end_matches("px").trim().parse::<f64>().ok())
        .filter(|v| *v > 0.0 && v.is_finite())
        .unwrap_or(fallback)
}

fn attach(
    window: &Window,
    container: HtmlElement,
    default_pps: f64,
) -> SiteResult<Option<MarqueeInstance>> {
    let Some(track) = dom::query(&container, ".marquee__track") else {
        log::debug!("Marquee without .marquee__track, skipping");
        return Ok(None);
    };
    let pps = parse_pps(dom::computed_var(window, &container, "--pps").as_deref(), default_pps);

    let inner = Rc::new(MarqueeInner {
        container: container.clone(),
        surface: RefCell::new(DomTrack::capture(track)),
        pixels_per_second: pps,
        last_width: Cell::new(None),
    });
    inner.rebuild();

    let frame = Rc::new(FrameThrottle::new());
    let schedule = {
        let inner = inner.clone();
        let frame = frame.clone();
        move || {
            let inner = inner.clone();
            frame.schedule(move || inner.rebuild());
        }
    };

    let has_observer =
        js_sys::Reflect::has(window, &JsValue::from_str("ResizeObserver")).unwrap_or(false);
    let resize = if has_observer {
        let callback = Closure::<dyn FnMut(js_sys::Array, ResizeObserver)>::new(
            move |_entries: js_sys::Array, _observer: ResizeObserver| schedule(),
        );
        let observer = ResizeObserver::new(callback.as_ref().unchecked_ref())?;
        observer.observe(&container);
        ResizeSource::Observer {
            observer,
            _callback: callback,
        }
    } else {
        ResizeSource::Window {
            _listener: EventListener::new(window, "resize", move |_| schedule()),
        }
    };

    Ok(Some(MarqueeInstance {
        _inner: inner,
        resize,
        _frame: frame,
    }))
}

pub fn install(
    window: &Window,
    document: &Document,
    config: &SiteConfig,
    env: &Environment,
) -> SiteResult<Option<Marquees>> {
    if !should_build(env) {
        log::debug!("Reduced motion, leaving marquees static");
        return Ok(None);
    }
    let containers = dom::query_all(document, ".marquee");
    if containers.is_empty() {
        return Ok(None);
    }
    let mut instances = Vec::new();
    for container in containers {
        if let Some(instance) = attach(window, container, config.marquee_default_pps)? {
            instances.push(instance);
        }
    }
    Ok(Some(Marquees { instances }))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Track made of item widths.
    #[derive(Debug, Clone)]
    struct FakeTrack {
        template: Vec<f64>,
        items: Vec<f64>,
    }

    impl FakeTrack {
        fn new(template: &[f64]) -> Self {
            Self {
                template: template.to_vec(),
                items: template.to_vec(),
            }
        }
    }

    impl TrackSurface for FakeTrack {
        fn template_len(&self) -> usize {
            self.template.len()
        }
        fn clear(&mut self) {
            self.items.clear();
        }
        fn append_template(&mut self) {
            self.items.extend_from_slice(&self.template);
        }
        fn duplicate_contents(&mut self) {
            let copy = self.items.clone();
            self.items.extend(copy);
        }
        fn width(&self) -> f64 {
            self.items.iter().sum()
        }
    }

    #[test]
    fn fills_past_container_then_doubles() {
        let mut track = FakeTrack::new(&[120.0, 80.0]);
        let cycle = build(&mut track, 500.0, 50.0).unwrap();
        assert_eq!(cycle.template_copies, 3);
        assert_eq!(cycle.width, 600.0);
        assert_eq!(track.items.len(), 12);
        assert_eq!(track.width(), 1200.0);
        assert_eq!(cycle.duration_secs, 12.0);
        assert_eq!(cycle.distance_css(), "600px");
        assert_eq!(cycle.duration_css(), "12s");
    }

    #[test]
    fn wide_template_needs_one_copy() {
        let mut track = FakeTrack::new(&[900.0]);
        let cycle = build(&mut track, 300.0, 60.0).unwrap();
        assert_eq!(cycle.template_copies, 1);
        assert_eq!(track.items, vec![900.0, 900.0]);
    }

    #[test]
    fn rebuild_starts_from_scratch() {
        let mut track = FakeTrack::new(&[100.0]);
        build(&mut track, 250.0, 60.0).unwrap();
        let cycle = build(&mut track, 450.0, 60.0).unwrap();
        assert_eq!(cycle.width, 500.0);
        assert_eq!(track.items.len(), 10);
    }

    #[test]
    fn empty_template_is_refused() {
        let mut track = FakeTrack::new(&[]);
        assert_eq!(build(&mut track, 400.0, 60.0), Err(MarqueeError::EmptyTemplate));
    }

    #[test]
    fn zero_width_container_is_refused() {
        let mut track = FakeTrack::new(&[100.0]);
        assert_eq!(build(&mut track, 0.0, 60.0), Err(MarqueeError::ZeroWidth));
        assert_eq!(build(&mut track, f64::NAN, 60.0), Err(MarqueeError::ZeroWidth));
    }

    #[test]
    fn bad_speed_is_refused() {
        let mut track = FakeTrack::new(&[100.0]);
        assert_eq!(build(&mut track, 400.0, 0.0), Err(MarqueeError::InvalidSpeed(0.0)));
    }

    #[test]
    fn zero_width_template_hits_the_pass_cap() {
        let mut track = FakeTrack::new(&[0.0, 0.0]);
        assert_eq!(
            build(&mut track, 400.0, 60.0),
            Err(MarqueeError::PassLimit(MAX_FILL_PASSES))
        );
        assert_eq!(track.items.len(), 2);
    }

    #[test]
    fn pps_parsing_falls_back() {
        assert_eq!(parse_pps(Some(" 80 "), 60.0), 80.0);
        assert_eq!(parse_pps(Some("120px"), 60.0), 120.0);
        assert_eq!(parse_pps(Some("fast"), 60.0), 60.0);
        assert_eq!(parse_pps(Some("-5"), 60.0), 60.0);
        assert_eq!(parse_pps(None, 60.0), 60.0);
    }

    #[test]
    fn reduced_motion_skips_building() {
        let calm = Environment {
            reduced_motion: true,
            ..Environment::default()
        };
        assert!(!should_build(&calm));
        assert!(should_build(&Environment::default()));
    }
}
