pub mod dom;
pub mod frame;
pub mod motion;
