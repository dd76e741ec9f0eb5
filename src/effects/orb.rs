use std::rc::Rc;

use gloo_events::EventListener;
use web_sys::{HtmlElement, Window};

use crate::error::SiteResult;
use crate::utils::dom;
use crate::utils::frame::FrameThrottle;

pub const DEFAULT_X: &str = "72%";
pub const DEFAULT_Y: &str = "68%";

/// Pointer position as a percentage of the viewport, formatted for CSS.
pub fn viewport_percent(client: (f64, f64), viewport: (f64, f64)) -> (String, String) {
    let pct = |v: f64, extent: f64| {
        if extent > 0.0 {
            v / extent * 100.0
        } else {
            0.0
        }
    };
    (
        format!("{:.2}%", pct(client.0, viewport.0)),
        format!("{:.2}%", pct(client.1, viewport.1)),
    )
}

pub struct GlowOrb {
    _pointer: EventListener,
    _touch: EventListener,
    _frame: Rc<FrameThrottle>,
}

/// Drives `--orb-x` / `--orb-y` on the root element.
pub fn install(window: &Window, root: &HtmlElement) -> SiteResult<GlowOrb> {
    dom::set_var(root, "--orb-x", DEFAULT_X)?;
    dom::set_var(root, "--orb-y", DEFAULT_Y)?;

    let frame = Rc::new(FrameThrottle::new());
    let on_point = {
        let window = window.clone();
        let root = root.clone();
        let frame = frame.clone();
        move |event: &web_sys::Event| {
            let Some(client) = dom::pointer_position(event) else {
                return;
            };
            let (x, y) = viewport_percent(client, dom::viewport_size(&window));
            let root = root.clone();
            frame.schedule(move || {
                let _ = dom::set_var(&root, "--orb-x", &x);
                let _ = dom::set_var(&root, "--orb-y", &y);
            });
        }
    };

    let pointer = EventListener::new(window, "pointermove", on_point.clone());
    let touch = EventListener::new(window, "touchmove", on_point);
    Ok(GlowOrb {
        _pointer: pointer,
        _touch: touch,
        _frame: frame,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_to_two_decimal_percentages() {
        let (x, y) = viewport_percent((512.0, 300.0), (1024.0, 900.0));
        assert_eq!(x, "50.00%");
        assert_eq!(y, "33.33%");
    }

    #[test]
    fn zero_viewport_does_not_divide_by_zero() {
        let (x, y) = viewport_percent((10.0, 10.0), (0.0, 0.0));
        assert_eq!((x.as_str(), y.as_str()), ("0.00%", "0.00%"));
    }
}
