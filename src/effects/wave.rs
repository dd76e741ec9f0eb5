use std::cell::{Cell, RefCell};
use std::rc::Rc;

use gloo_events::EventListener;
use gloo_timers::callback::Timeout;
use web_sys::{Document, HtmlElement, Window};

use crate::error::SiteResult;
use crate::utils::dom;
use crate::utils::frame::FrameLoop;

const BOOST_CLASS: &str = "boost";
const BOOST_MS: u32 = 900;
const DEGREES_PER_FRAME: f64 = 0.35;

/// Slow continuous hue rotation, one step per animation frame.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct HueOrbit {
    degrees: f64,
}

impl HueOrbit {
    pub fn step(&mut self) -> f64 {
        self.degrees = (self.degrees + DEGREES_PER_FRAME) % 360.0;
        self.degrees
    }

    pub fn degrees(&self) -> f64 {
        self.degrees
    }
}

pub struct IridescentWave {
    _pointer: EventListener,
    _touch: EventListener,
    _boost_timer: Rc<RefCell<Option<Timeout>>>,
    orbit: Option<FrameLoop>,
}

impl IridescentWave {
    pub fn stop_orbit(&mut self) {
        if let Some(orbit) = self.orbit.take() {
            orbit.stop();
        }
    }
}

fn boost(wave: &HtmlElement, timer: &Rc<RefCell<Option<Timeout>>>) {
    let _ = wave.class_list().add_1(BOOST_CLASS);
    let wave = wave.clone();
    // Replacing the handle drops the old one, which clears that timeout.
    *timer.borrow_mut() = Some(Timeout::new(BOOST_MS, move || {
        let _ = wave.class_list().remove_1(BOOST_CLASS);
    }));
}

pub fn install(
    window: &Window,
    document: &Document,
    root: &HtmlElement,
) -> SiteResult<Option<IridescentWave>> {
    let Some(wave) = dom::query_document(document, ".iridescent-wave") else {
        log::debug!("No .iridescent-wave, skipping wave");
        return Ok(None);
    };

    let boost_timer = Rc::new(RefCell::new(None));
    let on_move = {
        let boost_timer = boost_timer.clone();
        move |_: &web_sys::Event| boost(&wave, &boost_timer)
    };
    let pointer = EventListener::new(window, "pointermove", on_move.clone());
    let touch = EventListener::new(window, "touchmove", on_move);

    let orbit_state = Rc::new(Cell::new(HueOrbit::default()));
    let root = root.clone();
    let orbit = FrameLoop::start(move |_| {
        let mut orbit = orbit_state.get();
        let degrees = orbit.step();
        orbit_state.set(orbit);
        let _ = dom::set_var(&root, "--wave-rot", &format!("{}deg", degrees));
    });

    Ok(Some(IridescentWave {
        _pointer: pointer,
        _touch: touch,
        _boost_timer: boost_timer,
        orbit: Some(orbit),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orbit_wraps_at_full_turn() {
        let mut orbit = HueOrbit::default();
        let steps = (360.0 / DEGREES_PER_FRAME).ceil() as usize;
        for _ in 0..steps {
            orbit.step();
        }
        assert!(orbit.degrees() < 360.0);
        assert!(orbit.degrees() >= 0.0);
    }

    #[test]
    fn first_step_advances_by_fixed_increment() {
        let mut orbit = HueOrbit::default();
        assert_eq!(orbit.step(), DEGREES_PER_FRAME);
    }
}
