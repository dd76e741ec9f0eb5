pub mod header;
pub mod lens;
pub mod orb;
pub mod plus_field;
pub mod ticker;
pub mod tilt;
pub mod wave;
pub mod year;
