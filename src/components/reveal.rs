use std::cell::RefCell;
use std::rc::Rc;

use gloo_events::EventListener;
use wasm_bindgen::prelude::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::js_sys;
use web_sys::{
    Document, Element, HtmlElement, IntersectionObserver, IntersectionObserverEntry,
    IntersectionObserverInit, Window,
};

use crate::config::SiteConfig;
use crate::error::SiteResult;
use crate::utils::dom;
use crate::utils::frame::FrameThrottle;
use crate::utils::motion::Environment;

const REVEALED_CLASS: &str = "is-in";
const STAGGER_VAR: &str = "--stagger";
const ROOT_MARGIN: &str = "0px 0px -10% 0px";
const THRESHOLD: f64 = 0.22;

/// Delay for each target in DOM order. Targets that already declare their own
/// delay get `None` and do not advance the counter.
pub fn auto_staggers(has_explicit: &[bool], step_ms: u32) -> Vec<Option<u32>> {
    let mut next = 0;
    has_explicit
        .iter()
        .map(|&explicit| {
            if explicit {
                None
            } else {
                let delay = next;
                next += step_ms;
                Some(delay)
            }
        })
        .collect()
}

/// One-shot reveal flags: each index flips to revealed once and stays there.
#[derive(Debug, Clone, Default)]
pub struct RevealSet {
    revealed: Vec<bool>,
}

impl RevealSet {
    pub fn new(len: usize) -> Self {
        Self {
            revealed: vec![false; len],
        }
    }

    /// True only the first time `index` is revealed.
    pub fn mark(&mut self, index: usize) -> bool {
        match self.revealed.get_mut(index) {
            Some(flag) if !*flag => {
                *flag = true;
                true
            }
            _ => false,
        }
    }

    pub fn is_revealed(&self, index: usize) -> bool {
        self.revealed.get(index).copied().unwrap_or(false)
    }

    pub fn count(&self) -> usize {
        self.revealed.iter().filter(|r| **r).count()
    }
}

struct RevealInner {
    targets: Vec<HtmlElement>,
    state: RefCell<RevealSet>,
    observer: RefCell<Option<IntersectionObserver>>,
}

impl RevealInner {
    fn reveal(&self, index: usize) {
        if !self.state.borrow_mut().mark(index) {
            return;
        }
        let el = &self.targets[index];
        let _ = el.class_list().add_1(REVEALED_CLASS);
        if let Some(observer) = self.observer.borrow().as_ref() {
            observer.unobserve(el);
        }
    }

    fn reveal_element(&self, target: &Element) {
        if let Some(index) = self.targets.iter().position(|t| {
            let t: &Element = t.as_ref();
            t == target
        }) {
            self.reveal(index);
        }
    }

    fn reveal_first(&self, count: usize) {
        for index in 0..count.min(self.targets.len()) {
            self.reveal(index);
        }
    }
}

pub struct ScrollReveal {
    inner: Rc<RevealInner>,
    _callback: Option<Closure<dyn FnMut(js_sys::Array, IntersectionObserver)>>,
    _load: Option<EventListener>,
    _frame: Rc<FrameThrottle>,
}

impl ScrollReveal {
    pub fn revealed_count(&self) -> usize {
        self.inner.state.borrow().count()
    }
}

impl Drop for ScrollReveal {
    fn drop(&mut self) {
        if let Some(observer) = self.inner.observer.borrow_mut().take() {
            observer.disconnect();
        }
    }
}

/// How targets get revealed on this page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealMode {
    /// Everything shown at install, no observer.
    Immediate,
    Observe,
}

pub fn reveal_mode(reduced_motion: bool, observer_supported: bool) -> RevealMode {
    if reduced_motion || !observer_supported {
        RevealMode::Immediate
    } else {
        RevealMode::Observe
    }
}

fn observer_supported(window: &Window) -> bool {
    js_sys::Reflect::has(window, &JsValue::from_str("IntersectionObserver")).unwrap_or(false)
}

pub fn install(
    window: &Window,
    document: &Document,
    config: &SiteConfig,
    env: &Environment,
) -> SiteResult<Option<ScrollReveal>> {
    let targets = dom::query_all(document, "[data-animate]");
    if targets.is_empty() {
        return Ok(None);
    }

    let explicit: Vec<bool> = targets
        .iter()
        .map(|el| !dom::get_var(el, STAGGER_VAR).is_empty())
        .collect();
    for (el, delay) in targets.iter().zip(auto_staggers(&explicit, config.reveal_step_ms)) {
        if let Some(ms) = delay {
            dom::set_var(el, STAGGER_VAR, &format!("{}ms", ms))?;
        }
    }

    let inner = Rc::new(RevealInner {
        state: RefCell::new(RevealSet::new(targets.len())),
        targets,
        observer: RefCell::new(None),
    });
    let frame = Rc::new(FrameThrottle::new());

    if reveal_mode(env.reduced_motion, observer_supported(window)) == RevealMode::Immediate {
        log::debug!("Revealing {} targets without animation", inner.targets.len());
        inner.reveal_first(inner.targets.len());
        return Ok(Some(ScrollReveal {
            inner,
            _callback: None,
            _load: None,
            _frame: frame,
        }));
    }

    let callback = {
        let inner = inner.clone();
        Closure::<dyn FnMut(js_sys::Array, IntersectionObserver)>::new(
            move |entries: js_sys::Array, _observer: IntersectionObserver| {
                for entry in entries.iter() {
                    let entry: IntersectionObserverEntry = entry.unchecked_into();
                    if entry.is_intersecting() {
                        inner.reveal_element(&entry.target());
                    }
                }
            },
        )
    };

    let options = IntersectionObserverInit::new();
    options.set_root_margin(ROOT_MARGIN);
    options.set_threshold(&JsValue::from_f64(THRESHOLD));
    let observer =
        IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options)?;
    for el in &inner.targets {
        observer.observe(el);
    }
    *inner.observer.borrow_mut() = Some(observer);

    // Nudge above-the-fold content in right after load.
    let force_count = config.reveal_force_count;
    let nudge = {
        let inner = inner.clone();
        let frame = frame.clone();
        move || {
            let inner = inner.clone();
            frame.schedule(move || inner.reveal_first(force_count));
        }
    };
    let load = if document.ready_state() == "complete" {
        nudge();
        None
    } else {
        Some(EventListener::once(window, "load", move |_| nudge()))
    };

    Ok(Some(ScrollReveal {
        inner,
        _callback: Some(callback),
        _load: load,
        _frame: frame,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staggers_skip_explicit_delays() {
        let delays = auto_staggers(&[false, true, false, false], 70);
        assert_eq!(delays, vec![Some(0), None, Some(70), Some(140)]);
    }

    #[test]
    fn reveal_is_one_shot() {
        let mut set = RevealSet::new(3);
        assert!(set.mark(1));
        assert!(!set.mark(1));
        assert!(set.is_revealed(1));
        assert!(!set.is_revealed(0));
        assert_eq!(set.count(), 1);
    }

    #[test]
    fn out_of_range_index_is_ignored() {
        let mut set = RevealSet::new(2);
        assert!(!set.mark(5));
        assert_eq!(set.count(), 0);
    }

    #[test]
    fn marking_everything_reveals_everything() {
        let mut set = RevealSet::new(4);
        for i in 0..4 {
            set.mark(i);
        }
        for i in 0..4 {
            assert!(!set.mark(i));
        }
        assert_eq!(set.count(), 4);
    }

    #[test]
    fn reduced_motion_or_missing_observer_reveals_immediately() {
        assert_eq!(reveal_mode(true, true), RevealMode::Immediate);
        assert_eq!(reveal_mode(false, false), RevealMode::Immediate);
        assert_eq!(reveal_mode(true, false), RevealMode::Immediate);
        assert_eq!(reveal_mode(false, true), RevealMode::Observe);
    }
}
