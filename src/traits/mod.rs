pub mod glyphs;
pub mod icon_source;
pub mod panel;

pub use glyphs::*;
pub use icon_source::*;
pub use panel::*;
