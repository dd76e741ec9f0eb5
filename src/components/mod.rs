pub mod accordion;
pub mod marquee;
pub mod reveal;
pub mod search;
