use std::cell::RefCell;
use std::rc::Rc;

use gloo_events::EventListener;
use gloo_timers::callback::Interval;
use web_sys::{Document, MediaQueryList, Window};

use crate::config::SiteConfig;
use crate::error::SiteResult;
use crate::utils::motion;

const GAP: &str = "   ";

/// Rotates a message one character at a time, marquee style.
#[derive(Debug, Clone)]
pub struct TitleTicker {
    message: String,
    loop_text: Vec<char>,
    offset: usize,
}

impl TitleTicker {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
            loop_text: format!("{}{}", message, GAP).chars().collect(),
            offset: 0,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Current rotation, then advance by one character.
    pub fn tick(&mut self) -> String {
        let (head, tail) = self.loop_text.split_at(self.offset);
        let frame: String = tail.iter().chain(head).collect();
        self.offset = (self.offset + 1) % self.loop_text.len();
        frame
    }
}

pub fn should_run(reduced_motion: bool, hidden: bool) -> bool {
    !reduced_motion && !hidden
}

struct TickerState {
    document: Document,
    reduced_motion: Option<MediaQueryList>,
    interval_ms: u32,
    ticker: Rc<RefCell<TitleTicker>>,
    timer: RefCell<Option<Interval>>,
}

impl TickerState {
    fn sync(&self) {
        // Always clear first so two intervals never run at once.
        self.timer.borrow_mut().take();
        let reduced = self
            .reduced_motion
            .as_ref()
            .map(|mql| mql.matches())
            .unwrap_or(false);
        if should_run(reduced, self.document.hidden()) {
            let document = self.document.clone();
            let ticker = self.ticker.clone();
            *self.timer.borrow_mut() = Some(Interval::new(self.interval_ms, move || {
                document.set_title(&ticker.borrow_mut().tick());
            }));
        } else {
            self.document.set_title(self.ticker.borrow().message());
        }
    }
}

pub struct TitleTickerHandle {
    _state: Rc<TickerState>,
    _listeners: Vec<EventListener>,
}

pub fn install(
    window: &Window,
    document: &Document,
    config: &SiteConfig,
) -> SiteResult<TitleTickerHandle> {
    let state = Rc::new(TickerState {
        document: document.clone(),
        reduced_motion: motion::media_query(window, motion::REDUCED_MOTION),
        interval_ms: config.ticker_interval_ms,
        ticker: Rc::new(RefCell::new(TitleTicker::new(&config.ticker_message))),
        timer: RefCell::new(None),
    });
    state.sync();

    let mut listeners = Vec::new();
    if let Some(mql) = state.reduced_motion.as_ref() {
        let state = state.clone();
        listeners.push(EventListener::new(mql, "change", move |_| state.sync()));
    }
    {
        let state = state.clone();
        listeners.push(EventListener::new(document, "visibilitychange", move |_| state.sync()));
    }

    Ok(TitleTickerHandle {
        _state: state,
        _listeners: listeners,
    })
}
