//! Viewport capability consumed by the autoscroll processor

use crate::config::MotionConfig;
use crate::geometry::{Point, Size};

/// A scrollable surface the processor moves.
///
/// Implementations wrap whatever actually renders the carousel. The
/// processor only reads and writes the offset and queries sizes.
pub trait Viewport {
    /// Current scroll offset
    fn content_offset(&self) -> Point;

    /// Move the content to `offset` without animation
    fn set_content_offset(&mut self, offset: Point);

    /// Total scrollable content size
    fn content_size(&self) -> Size;

    /// Visible bounds size
    fn viewport_size(&self) -> Size;
}

/// User interaction forwarded by a viewport host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportEvent {
    /// The user started dragging the content
    DragBegan,
    /// The user released the content
    DragEnded,
    /// The item at this index was selected
    ItemSelected(usize),
}

/// In-memory viewport over a strip of equally sized cells.
#[derive(Debug, Clone, PartialEq)]
pub struct StripViewport {
    offset: Point,
    content_size: Size,
    viewport_size: Size,
}

impl StripViewport {
    pub fn new(content_size: Size, viewport_size: Size) -> Self {
        Self {
            offset: Point::ZERO,
            content_size,
            viewport_size,
        }
    }

    /// Viewport sized for `item_count` cells laid out per `motion`.
    pub fn for_items(item_count: usize, motion: &MotionConfig, viewport_width: f64) -> Self {
        let width = strip_width(item_count, motion.cell_width, motion.cell_spacing);
        Self::new(
            Size::new(width, motion.cell_height),
            Size::new(viewport_width, motion.cell_height),
        )
    }

    /// Start at `offset` instead of the origin.
    pub fn with_offset(mut self, offset: Point) -> Self {
        self.offset = offset;
        self
    }

    /// Largest horizontal offset that keeps the viewport filled
    pub fn max_offset_x(&self) -> f64 {
        (self.content_size.width - self.viewport_size.width).max(0.0)
    }

    /// Index of the cell under the leading edge of the viewport.
    pub fn leading_index(&self, pitch: f64) -> usize {
        if pitch <= 0.0 || self.offset.x <= 0.0 {
            return 0;
        }
        (self.offset.x / pitch).floor() as usize
    }
}

impl Viewport for StripViewport {
    fn content_offset(&self) -> Point {
        self.offset
    }

    fn set_content_offset(&mut self, offset: Point) {
        self.offset = offset;
    }

    fn content_size(&self) -> Size {
        self.content_size
    }

    fn viewport_size(&self) -> Size {
        self.viewport_size
    }
}

/// Width of `count` cells separated by `spacing`
pub fn strip_width(count: usize, cell_width: f64, spacing: f64) -> f64 {
    if count == 0 {
        return 0.0;
    }
    count as f64 * cell_width + (count - 1) as f64 * spacing
}
