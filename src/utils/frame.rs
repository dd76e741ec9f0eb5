use std::cell::RefCell;
use std::rc::{Rc, Weak};

use gloo_render::{request_animation_frame, AnimationFrame};

/// Keeps at most one pending animation frame. Scheduling again drops (and so
/// cancels) the frame that was still waiting.
#[derive(Default)]
pub struct FrameThrottle {
    pending: RefCell<Option<AnimationFrame>>,
}

impl FrameThrottle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule<F>(&self, f: F)
    where
        F: FnOnce() + 'static,
    {
        let handle = request_animation_frame(move |_| f());
        *self.pending.borrow_mut() = Some(handle);
    }

    pub fn cancel(&self) {
        self.pending.borrow_mut().take();
    }
}

/// A callback re-armed on every animation frame until the loop is dropped.
pub struct FrameLoop {
    slot: Rc<RefCell<Option<AnimationFrame>>>,
}

impl FrameLoop {
    pub fn start<F>(step: F) -> Self
    where
        F: FnMut(f64) + 'static,
    {
        let slot = Rc::new(RefCell::new(None));
        arm(Rc::downgrade(&slot), Rc::new(RefCell::new(step)));
        Self { slot }
    }

    pub fn stop(self) {
        self.slot.borrow_mut().take();
    }
}

fn arm<F>(slot: Weak<RefCell<Option<AnimationFrame>>>, step: Rc<RefCell<F>>)
where
    F: FnMut(f64) + 'static,
{
    let Some(strong) = slot.upgrade() else {
        return;
    };
    let next_slot = slot.clone();
    let handle = request_animation_frame(move |timestamp| {
        // Loop was stopped while this frame was queued.
        if next_slot.upgrade().is_none() {
            return;
        }
        (step.borrow_mut())(timestamp);
        arm(next_slot, step);
    });
    *strong.borrow_mut() = Some(handle);
}
