use manatan_types::{Pixel, Rect};

/// Below this on either axis an element counts as not visible.
pub const MIN_VISIBLE_EXTENT: f64 = 10.0;

/// Content dimension changes at or under this are layout jitter.
pub const DIMENSION_TOLERANCE: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: Pixel,
    pub height: Pixel,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width: Pixel(width),
            height: Pixel(height),
        }
    }
}

/// The source element's on-screen bounds for one sync tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackedRect {
    pub left: Pixel,
    pub top: Pixel,
    pub width: Pixel,
    pub height: Pixel,
    pub visible: bool,
}

impl TrackedRect {
    pub fn measure(rect: Rect, viewport: Viewport) -> Self {
        let intersects = rect.bottom() > Pixel(0.0)
            && rect.top < viewport.height
            && rect.right() > Pixel(0.0)
            && rect.left < viewport.width;
        let large_enough =
            rect.width.get() > MIN_VISIBLE_EXTENT && rect.height.get() > MIN_VISIBLE_EXTENT;

        Self {
            left: rect.left,
            top: rect.top,
            width: rect.width,
            height: rect.height,
            visible: intersects && large_enough,
        }
    }

    pub fn size(&self) -> Size {
        Size {
            width: self.width,
            height: self.height,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: Pixel,
    pub height: Pixel,
}

impl Size {
    /// True when either axis moved by more than [`DIMENSION_TOLERANCE`].
    pub fn differs_from(&self, other: &Size) -> bool {
        self.width.abs_diff(other.width) > DIMENSION_TOLERANCE
            || self.height.abs_diff(other.height) > DIMENSION_TOLERANCE
    }
}
