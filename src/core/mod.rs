pub mod frame;
pub mod geometry;

pub use frame::{Frame, Rgb, Rotation};
pub use geometry::{Rect, Size};
