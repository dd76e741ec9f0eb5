use gloo_events::EventListener;
use web_sys::{HtmlElement, Window};

use crate::error::SiteResult;
use crate::utils::dom;
use crate::utils::motion::Environment;

pub fn radius_px(narrow: bool) -> u32 {
    if narrow {
        110
    } else {
        140
    }
}

pub fn px(v: f64) -> String {
    format!("{:.1}px", v)
}

pub struct CursorLens {
    _pointer: EventListener,
    _touch: EventListener,
}

/// Full-view lens following the pointer through `--lx` / `--ly`.
pub fn install(window: &Window, root: &HtmlElement, env: &Environment) -> SiteResult<CursorLens> {
    dom::set_var(root, "--lr", &format!("{}px", radius_px(env.narrow)))?;

    let move_lens = {
        let root = root.clone();
        move |event: &web_sys::Event| {
            if let Some((x, y)) = dom::pointer_position(event) {
                let _ = dom::set_var(&root, "--lx", &px(x));
                let _ = dom::set_var(&root, "--ly", &px(y));
            }
        }
    };
    let pointer = EventListener::new(window, "pointermove", move_lens.clone());
    let touch = EventListener::new(window, "touchmove", move_lens);

    let (width, height) = dom::viewport_size(window);
    dom::set_var(root, "--lx", &px(width * 0.72))?;
    dom::set_var(root, "--ly", &px(height * 0.68))?;

    Ok(CursorLens {
        _pointer: pointer,
        _touch: touch,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smaller_lens_on_narrow_screens() {
        assert_eq!(radius_px(true), 110);
        assert_eq!(radius_px(false), 140);
    }

    #[test]
    fn px_has_one_decimal() {
        assert_eq!(px(737.28), "737.3px");
        assert_eq!(px(0.0), "0.0px");
    }
}
