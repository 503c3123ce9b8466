pub mod clock;
pub mod config;
pub mod driver;
pub mod error;
pub mod geometry;
pub mod processor;
pub mod rotation;
pub mod timer;
pub mod viewport;

pub use config::{AppConfig, MotionConfig, ScrollDirection};
pub use driver::{CarouselDriver, ProcessorHandle};
pub use error::{Error, Result};
pub use geometry::{Point, Size};
pub use processor::{AutoscrollProcessor, ScrollState, TickOutcome};
pub use rotation::RotateContent;
pub use viewport::{StripViewport, Viewport, ViewportEvent};
