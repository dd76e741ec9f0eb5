use std::rc::Rc;

use gloo_events::EventListener;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement, MouseEvent};

use crate::error::SiteResult;
use crate::utils::dom;
use crate::utils::frame::FrameThrottle;
use crate::utils::motion::Environment;

const HOT_CLASS: &str = "is-hot";
const MAX_ROTATE_Y: f64 = 12.0;
const MAX_ROTATE_X: f64 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// Rotation and sheen position for a pointer over a card.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tilt {
    pub rotate_x: f64,
    pub rotate_y: f64,
    pub sheen_x: f64,
    pub sheen_y: f64,
}

impl Tilt {
    pub fn at(client: (f64, f64), rect: CardRect) -> Option<Self> {
        if rect.width <= 0.0 || rect.height <= 0.0 {
            return None;
        }
        let x = (client.0 - rect.left) / rect.width;
        let y = (client.1 - rect.top) / rect.height;
        Some(Self {
            rotate_x: (0.5 - y) * MAX_ROTATE_X,
            rotate_y: (x - 0.5) * MAX_ROTATE_Y,
            sheen_x: x * 100.0,
            sheen_y: y * 100.0,
        })
    }

    /// Tilt for a pointer move, or `None` when tilting is disabled for this device.
    pub fn for_pointer(enabled: bool, client: (f64, f64), rect: CardRect) -> Option<Self> {
        if !enabled {
            return None;
        }
        Self::at(client, rect)
    }

    fn apply(&self, card: &HtmlElement) -> SiteResult<()> {
        dom::set_var(card, "--ry", &format!("{:.2}deg", self.rotate_y))?;
        dom::set_var(card, "--rx", &format!("{:.2}deg", self.rotate_x))?;
        dom::set_var(card, "--mx", &format!("{:.2}%", self.sheen_x))?;
        dom::set_var(card, "--my", &format!("{:.2}%", self.sheen_y))?;
        Ok(())
    }
}

struct CardTilt {
    _listeners: [EventListener; 3],
    _frame: Rc<FrameThrottle>,
}

pub struct FeatureCards {
    _cards: Vec<CardTilt>,
}

fn attach(card: HtmlElement, env: Environment) -> CardTilt {
    let frame = Rc::new(FrameThrottle::new());
    let tilting = env.fine_pointer && !env.reduced_motion;

    let on_move = {
        let card_for_move = card.clone();
        let frame = frame.clone();
        EventListener::new(&card, "mousemove", move |event| {
            let Some(mouse) = event.dyn_ref::<MouseEvent>() else {
                return;
            };
            let r = card_for_move.get_bounding_client_rect();
            let rect = CardRect {
                left: r.left(),
                top: r.top(),
                width: r.width(),
                height: r.height(),
            };
            let client = (mouse.client_x() as f64, mouse.client_y() as f64);
            let Some(tilt) = Tilt::for_pointer(tilting, client, rect) else {
                return;
            };
            let target = card_for_move.clone();
            frame.schedule(move || {
                let _ = tilt.apply(&target);
            });
        })
    };

    let on_enter = {
        let card_for_enter = card.clone();
        EventListener::new(&card, "mouseenter", move |_| {
            if !env.reduced_motion {
                let _ = card_for_enter.class_list().add_1(HOT_CLASS);
            }
        })
    };

    let on_leave = {
        let card_for_leave = card.clone();
        let frame = frame.clone();
        EventListener::new(&card, "mouseleave", move |_| {
            frame.cancel();
            let _ = card_for_leave.class_list().remove_1(HOT_CLASS);
            let _ = dom::set_var(&card_for_leave, "--ry", "0deg");
            let _ = dom::set_var(&card_for_leave, "--rx", "0deg");
        })
    };

    CardTilt {
        _listeners: [on_move, on_enter, on_leave],
        _frame: frame,
    }
}

pub fn install(document: &Document, env: &Environment) -> SiteResult<Option<FeatureCards>> {
    let cards = dom::query_all(document, ".feature-card");
    if cards.is_empty() {
        return Ok(None);
    }
    let env = *env;
    Ok(Some(FeatureCards {
        _cards: cards.into_iter().map(|card| attach(card, env)).collect(),
    }))
}
