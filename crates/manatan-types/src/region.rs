use serde::{Deserialize, Serialize};

use crate::units::{Fraction, Pixel, Rect};

/// Region bounds relative to the source element.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FractionalBox {
    pub x: Fraction,
    pub y: Fraction,
    pub w: Fraction,
    pub h: Fraction,
}

impl FractionalBox {
    /// Builds a box from raw values, keeping it inside the unit square.
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        let x = Fraction::new(x);
        let y = Fraction::new(y);
        let w = Fraction::new(w.min(1.0 - x.get()));
        let h = Fraction::new(h.min(1.0 - y.get()));
        Self { x, y, w, h }
    }

    pub fn right(&self) -> Fraction {
        Fraction::new(self.x.get() + self.w.get())
    }

    pub fn bottom(&self) -> Fraction {
        Fraction::new(self.y.get() + self.h.get())
    }

    /// Smallest axis-aligned box containing both.
    pub fn union(&self, other: &FractionalBox) -> FractionalBox {
        let left = self.x.min(other.x);
        let top = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        FractionalBox {
            x: left,
            y: top,
            w: Fraction::new(right.get() - left.get()),
            h: Fraction::new(bottom.get() - top.get()),
        }
    }

    /// Pixel rectangle inside a tracked container of `width` x `height`,
    /// padded by `adjustment` pixels split across both sides.
    pub fn to_pixel_rect(&self, width: Pixel, height: Pixel, adjustment: f64) -> Rect {
        Rect {
            left: self.x.to_pixels(width) - Pixel(adjustment / 2.0),
            top: self.y.to_pixels(height) - Pixel(adjustment / 2.0),
            width: self.w.to_pixels(width) + Pixel(adjustment),
            height: self.h.to_pixels(height) + Pixel(adjustment),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForcedOrientation {
    #[default]
    Auto,
    Vertical,
    Horizontal,
}

/// One recognized text block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRegion {
    pub text: String,
    pub bbox: FractionalBox,
    pub is_merged: bool,
    pub forced_orientation: ForcedOrientation,
}

impl TextRegion {
    pub fn new(text: impl Into<String>, bbox: FractionalBox) -> Self {
        Self {
            text: text.into(),
            bbox,
            is_merged: false,
            forced_orientation: ForcedOrientation::Auto,
        }
    }
}

/// Wire form of a region as the OCR endpoint returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrBlock {
    pub text: String,
    pub tight_bounding_box: WireBox,
    #[serde(default)]
    pub is_merged: Option<bool>,
    #[serde(default)]
    pub forced_orientation: Option<ForcedOrientation>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WireBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl From<OcrBlock> for TextRegion {
    fn from(block: OcrBlock) -> Self {
        let b = block.tight_bounding_box;
        TextRegion {
            text: block.text,
            bbox: FractionalBox::new(b.x, b.y, b.width, b.height),
            is_merged: block.is_merged.unwrap_or(false),
            forced_orientation: block.forced_orientation.unwrap_or_default(),
        }
    }
}

impl From<&TextRegion> for OcrBlock {
    fn from(region: &TextRegion) -> Self {
        OcrBlock {
            text: region.text.clone(),
            tight_bounding_box: WireBox {
                x: region.bbox.x.get(),
                y: region.bbox.y.get(),
                width: region.bbox.w.get(),
                height: region.bbox.h.get(),
            },
            is_merged: Some(region.is_merged),
            forced_orientation: Some(region.forced_orientation),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn assert_box(b: &FractionalBox, x: f64, y: f64, w: f64, h: f64) {
        assert!(approx(b.x.get(), x), "x {} != {}", b.x.get(), x);
        assert!(approx(b.y.get(), y), "y {} != {}", b.y.get(), y);
        assert!(approx(b.w.get(), w), "w {} != {}", b.w.get(), w);
        assert!(approx(b.h.get(), h), "h {} != {}", b.h.get(), h);
    }

    #[test]
    fn union_covers_both_inputs() {
        let a = FractionalBox::new(0.0, 0.0, 0.2, 0.1);
        let b = FractionalBox::new(0.1, 0.05, 0.2, 0.1);
        assert_box(&a.union(&b), 0.0, 0.0, 0.3, 0.15);
    }

    #[test]
    fn union_is_associative() {
        let a = FractionalBox::new(0.1, 0.2, 0.1, 0.1);
        let b = FractionalBox::new(0.5, 0.05, 0.2, 0.3);
        let c = FractionalBox::new(0.3, 0.6, 0.4, 0.2);
        let left = a.union(&b).union(&c);
        let right = a.union(&b.union(&c));
        assert_box(&left, right.x.get(), right.y.get(), right.w.get(), right.h.get());
    }

    #[test]
    fn out_of_range_wire_boxes_are_clamped() {
        let b = FractionalBox::new(0.9, -0.1, 0.5, 0.4);
        assert_box(&b, 0.9, 0.0, 0.1, 0.4);
    }

    #[test]
    fn wire_block_parses_camel_case() {
        let json = r#"{"text":"こんにちは","tightBoundingBox":{"x":0.1,"y":0.1,"width":0.3,"height":0.1}}"#;
        let block: OcrBlock = serde_json::from_str(json).unwrap();
        let region = TextRegion::from(block);
        assert_eq!(region.text, "こんにちは");
        assert!(!region.is_merged);
        assert_eq!(region.forced_orientation, ForcedOrientation::Auto);
        assert_box(&region.bbox, 0.1, 0.1, 0.3, 0.1);
    }

    #[test]
    fn pixel_rect_applies_adjustment_on_both_sides() {
        let b = FractionalBox::new(0.5, 0.25, 0.25, 0.5);
        let rect = b.to_pixel_rect(Pixel(400.0), Pixel(800.0), 4.0);
        assert_eq!(rect, Rect::new(198.0, 198.0, 104.0, 404.0));
    }
}
