pub mod display;
pub mod host;
pub mod window;

pub use display::{DisplayInfo, Rect};
pub use host::{HostMessage, HostResult};
pub use window::{ChromeOptions, PlacementValue, WindowConfig, WindowGeometry};
