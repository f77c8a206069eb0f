mod display;
mod placement;

pub use display::*;
pub use placement::*;
