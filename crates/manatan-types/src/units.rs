//! Coordinate units.
//!
//! Region geometry lives in [`Fraction`]s of the source element, layout in
//! viewport [`Pixel`]s, and zoomed content in [`ScaledPixel`]s. Converting
//! between them is always an explicit call.

use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

/// A position or extent relative to the source element, in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fraction(f64);

impl Fraction {
    pub const ZERO: Fraction = Fraction(0.0);
    pub const ONE: Fraction = Fraction(1.0);

    /// Clamps into `[0, 1]`. NaN becomes zero.
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self::ZERO;
        }
        Self(value.clamp(0.0, 1.0))
    }

    pub fn get(self) -> f64 {
        self.0
    }

    /// Reproject onto a tracked extent.
    pub fn to_pixels(self, extent: Pixel) -> Pixel {
        Pixel(self.0 * extent.0)
    }

    pub fn min(self, other: Fraction) -> Fraction {
        if other.0 < self.0 { other } else { self }
    }

    pub fn max(self, other: Fraction) -> Fraction {
        if other.0 > self.0 { other } else { self }
    }
}

/// CSS pixels in viewport space.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pixel(pub f64);

impl Pixel {
    pub fn get(self) -> f64 {
        self.0
    }

    /// Content pixels as they appear after a zoom transform of `scale`.
    pub fn scaled(self, scale: f64) -> ScaledPixel {
        ScaledPixel(self.0 * scale)
    }

    pub fn abs_diff(self, other: Pixel) -> f64 {
        (self.0 - other.0).abs()
    }
}

impl Add for Pixel {
    type Output = Pixel;

    fn add(self, rhs: Pixel) -> Pixel {
        Pixel(self.0 + rhs.0)
    }
}

impl Sub for Pixel {
    type Output = Pixel;

    fn sub(self, rhs: Pixel) -> Pixel {
        Pixel(self.0 - rhs.0)
    }
}

/// Pixels inside zoomed content (scroll offsets of the sizer).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScaledPixel(pub f64);

impl ScaledPixel {
    pub fn get(self) -> f64 {
        self.0
    }

    /// Back to unscaled content pixels.
    pub fn unscaled(self, scale: f64) -> Pixel {
        if scale == 0.0 {
            return Pixel(0.0);
        }
        Pixel(self.0 / scale)
    }
}

impl Add for ScaledPixel {
    type Output = ScaledPixel;

    fn add(self, rhs: ScaledPixel) -> ScaledPixel {
        ScaledPixel(self.0 + rhs.0)
    }
}

impl Sub for ScaledPixel {
    type Output = ScaledPixel;

    fn sub(self, rhs: ScaledPixel) -> ScaledPixel {
        ScaledPixel(self.0 - rhs.0)
    }
}

/// A point in viewport space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: Pixel,
    pub y: Pixel,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x: Pixel(x),
            y: Pixel(y),
        }
    }

    pub fn distance(self, other: Point) -> f64 {
        (self.x.0 - other.x.0).hypot(self.y.0 - other.y.0)
    }

    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x.0 + other.x.0) / 2.0, (self.y.0 + other.y.0) / 2.0)
    }
}

/// An axis-aligned rectangle in viewport space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: Pixel,
    pub top: Pixel,
    pub width: Pixel,
    pub height: Pixel,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left: Pixel(left),
            top: Pixel(top),
            width: Pixel(width),
            height: Pixel(height),
        }
    }

    pub fn right(&self) -> Pixel {
        self.left + self.width
    }

    pub fn bottom(&self) -> Pixel {
        self.top + self.height
    }

    /// Half-open on the far edges.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left && point.x < self.right() && point.y >= self.top && point.y < self.bottom()
    }
}
