//! Pinch and double-tap zoom over a scrollable sizer/content pair.
//!
//! The sizer carries the scaled footprint so the container can scroll over
//! it. The content gets the inverse size plus a `scale()` transform, which
//! keeps content coordinates linear in scroll offset:
//! `content = (scroll + container_offset) / scale`.

use manatan_config::zoom::ZoomConfig;
use manatan_types::{Pixel, Point, Rect, ScaledPixel};

/// Scroll container plus the sizer/content elements inside it.
pub trait ZoomSurface {
    fn container_rect(&self) -> Rect;
    fn scroll_left(&self) -> ScaledPixel;
    fn scroll_top(&self) -> ScaledPixel;
    /// `scrollWidth - clientWidth`.
    fn max_scroll_left(&self) -> ScaledPixel;
    fn set_scroll(&mut self, left: ScaledPixel, top: ScaledPixel);
    fn apply_layout(&mut self, layout: &ZoomLayout);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadingLayout {
    #[default]
    Vertical,
    HorizontalLtr,
    HorizontalRtl,
}

impl ReadingLayout {
    pub fn new(vertical: bool, rtl: bool) -> Self {
        match (vertical, rtl) {
            (true, _) => ReadingLayout::Vertical,
            (false, false) => ReadingLayout::HorizontalLtr,
            (false, true) => ReadingLayout::HorizontalRtl,
        }
    }

    fn is_rtl(&self) -> bool {
        matches!(self, ReadingLayout::HorizontalRtl)
    }
}

/// The axis orthogonal to natural scrolling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaledAxis {
    Width,
    Height,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformOrigin {
    TopLeft,
    TopRight,
}

impl TransformOrigin {
    pub fn as_css(&self) -> &'static str {
        match self {
            TransformOrigin::TopLeft => "top left",
            TransformOrigin::TopRight => "top right",
        }
    }
}

/// Style values for the sizer/content pair at one scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomLayout {
    pub scale: f64,
    pub axis: ScaledAxis,
    /// Percent of the container along `axis`.
    pub sizer_percent: f64,
    pub content_percent: f64,
    pub origin: TransformOrigin,
}

impl ZoomLayout {
    pub fn for_scale(scale: f64, reading: ReadingLayout) -> Self {
        let zoomed = scale > 1.0;
        Self {
            scale,
            axis: match reading {
                ReadingLayout::Vertical => ScaledAxis::Width,
                _ => ScaledAxis::Height,
            },
            sizer_percent: if zoomed { scale * 100.0 } else { 100.0 },
            content_percent: if zoomed { 100.0 / scale } else { 100.0 },
            origin: if reading.is_rtl() {
                TransformOrigin::TopRight
            } else {
                TransformOrigin::TopLeft
            },
        }
    }

    pub fn content_transform(&self) -> String {
        format!("scale({})", self.scale)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomPhase {
    Idle,
    Zooming,
    Zoomed,
}

/// Scale plus the scroll offsets that pan the zoomed content.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinchTransform {
    pub scale: f64,
    pub pan_x: ScaledPixel,
    pub pan_y: ScaledPixel,
}

impl PinchTransform {
    pub const IDENTITY: PinchTransform = PinchTransform {
        scale: 1.0,
        pan_x: ScaledPixel(0.0),
        pan_y: ScaledPixel(0.0),
    };
}

#[derive(Debug, Clone, Copy)]
struct Pinch {
    initial_distance: f64,
    initial_scale: f64,
    anchor: (Pixel, Pixel),
}

#[derive(Debug, Clone, Copy)]
struct Tap {
    at_ms: u64,
    point: Point,
}

/// What the host should do with the native event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchResponse {
    PassThrough,
    PreventDefault,
}

#[derive(Debug)]
pub struct ZoomEngine {
    config: ZoomConfig,
    active: bool,
    reading: ReadingLayout,
    scale: f64,
    pinch: Option<Pinch>,
    last_tap: Option<Tap>,
}

impl ZoomEngine {
    /// `touch_capable` comes from the host's mobile detection.
    pub fn new(config: ZoomConfig, touch_capable: bool, reading: ReadingLayout) -> Self {
        let active = config.enabled && (touch_capable || config.mobile_mode);
        Self {
            config,
            active,
            reading,
            scale: 1.0,
            pinch: None,
            last_tap: None,
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn is_zoomed(&self) -> bool {
        self.scale > 1.0
    }

    pub fn phase(&self) -> ZoomPhase {
        if self.pinch.is_some() {
            ZoomPhase::Zooming
        } else if self.scale > 1.0 {
            ZoomPhase::Zoomed
        } else {
            ZoomPhase::Idle
        }
    }

    pub fn transform(&self, surface: &dyn ZoomSurface) -> PinchTransform {
        if self.scale == 1.0 {
            return PinchTransform::IDENTITY;
        }
        PinchTransform {
            scale: self.scale,
            pan_x: surface.scroll_left(),
            pan_y: surface.scroll_top(),
        }
    }

    /// Viewport point to unscaled content coordinates at `scale`.
    pub fn viewport_to_content(
        &self,
        surface: &dyn ZoomSurface,
        point: Point,
        scale: f64,
    ) -> (Pixel, Pixel) {
        let rect = surface.container_rect();
        let container_x = point.x - rect.left;
        let container_y = point.y - rect.top;

        let x = if self.reading.is_rtl() {
            let from_right = surface.max_scroll_left() - surface.scroll_left();
            let container_x_from_right = rect.width - container_x;
            (from_right + ScaledPixel(container_x_from_right.get())).unscaled(scale)
        } else {
            (surface.scroll_left() + ScaledPixel(container_x.get())).unscaled(scale)
        };
        let y = (surface.scroll_top() + ScaledPixel(container_y.get())).unscaled(scale);
        (x, y)
    }

    /// Scroll so `content` sits under viewport `point` at `scale`.
    pub fn keep_content_at(
        &self,
        surface: &mut dyn ZoomSurface,
        content: (Pixel, Pixel),
        point: Point,
        scale: f64,
    ) {
        let rect = surface.container_rect();
        let container_x = point.x - rect.left;
        let container_y = point.y - rect.top;

        let left = if self.reading.is_rtl() {
            let container_x_from_right = rect.width - container_x;
            let target_from_right = content.0.scaled(scale).get() - container_x_from_right.get();
            (surface.max_scroll_left().get() - target_from_right).max(0.0)
        } else {
            (content.0.scaled(scale).get() - container_x.get()).max(0.0)
        };
        let top = (content.1.scaled(scale).get() - container_y.get()).max(0.0);
        surface.set_scroll(ScaledPixel(left), ScaledPixel(top));
    }

    fn apply_scale(&mut self, surface: &mut dyn ZoomSurface, scale: f64) {
        surface.apply_layout(&ZoomLayout::for_scale(scale, self.reading));
        self.scale = scale;
    }

    pub fn touch_start(
        &mut self,
        surface: &mut dyn ZoomSurface,
        touches: &[Point],
        now_ms: u64,
    ) -> TouchResponse {
        if !self.active {
            return TouchResponse::PassThrough;
        }

        match touches {
            [a, b] => {
                let center = a.midpoint(*b);
                self.pinch = Some(Pinch {
                    initial_distance: a.distance(*b),
                    initial_scale: self.scale,
                    anchor: self.viewport_to_content(surface, center, self.scale),
                });
                tracing::debug!(scale = self.scale, "pinch started");
                TouchResponse::PreventDefault
            }
            [touch] => {
                let is_double_tap = self.last_tap.is_some_and(|tap| {
                    now_ms.saturating_sub(tap.at_ms) < self.config.double_tap_delay_ms
                        && touch.distance(tap.point) < self.config.double_tap_distance
                });
                if !is_double_tap {
                    self.last_tap = Some(Tap {
                        at_ms: now_ms,
                        point: *touch,
                    });
                    return TouchResponse::PassThrough;
                }

                let target = if self.scale > 1.1 {
                    self.config.min_scale
                } else {
                    self.config.double_tap_scale
                };
                let anchor = self.viewport_to_content(surface, *touch, self.scale);
                self.apply_scale(surface, target);
                self.keep_content_at(surface, anchor, *touch, target);
                self.last_tap = None;
                tracing::debug!(scale = target, "double tap zoom");
                TouchResponse::PreventDefault
            }
            _ => TouchResponse::PassThrough,
        }
    }

    pub fn touch_move(&mut self, surface: &mut dyn ZoomSurface, touches: &[Point]) -> TouchResponse {
        if !self.active {
            return TouchResponse::PassThrough;
        }
        let (Some(pinch), [a, b]) = (self.pinch, touches) else {
            return TouchResponse::PassThrough;
        };
        if pinch.initial_distance <= 0.0 {
            return TouchResponse::PreventDefault;
        }

        let ratio = a.distance(*b) / pinch.initial_distance;
        let scale = (pinch.initial_scale * ratio).clamp(self.config.min_scale, self.config.max_scale);
        self.apply_scale(surface, scale);
        self.keep_content_at(surface, pinch.anchor, a.midpoint(*b), scale);
        TouchResponse::PreventDefault
    }

    /// `remaining` is the number of fingers still down.
    pub fn touch_end(&mut self, surface: &mut dyn ZoomSurface, remaining: usize) {
        if self.pinch.is_none() || remaining >= 2 {
            return;
        }
        self.pinch = None;
        if (self.scale - 1.0).abs() < self.config.snap_threshold {
            self.apply_scale(surface, 1.0);
        }
        tracing::debug!(scale = self.scale, "pinch settled");
    }

    /// Reading direction or mode changed: drop any zoom immediately.
    pub fn set_reading_layout(&mut self, surface: &mut dyn ZoomSurface, reading: ReadingLayout) {
        if reading == self.reading {
            return;
        }
        self.reading = reading;
        self.pinch = None;
        self.apply_scale(surface, 1.0);
    }

    /// Back to scale 1 at the start of the reading direction.
    pub fn reset_zoom(&mut self, surface: &mut dyn ZoomSurface) {
        self.pinch = None;
        self.apply_scale(surface, 1.0);
        let left = if self.reading.is_rtl() {
            surface.max_scroll_left()
        } else {
            ScaledPixel(0.0)
        };
        surface.set_scroll(left, ScaledPixel(0.0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Container 400x800 at (0, 50) over a page 400 wide and 4000 tall.
    struct FakeSurface {
        scale: f64,
        left: f64,
        top: f64,
        layouts: Vec<ZoomLayout>,
    }

    impl FakeSurface {
        const WIDTH: f64 = 400.0;
        const HEIGHT: f64 = 800.0;
        const PAGE_HEIGHT: f64 = 4000.0;

        fn new() -> Self {
            Self {
                scale: 1.0,
                left: 0.0,
                top: 0.0,
                layouts: Vec::new(),
            }
        }
    }

    impl ZoomSurface for FakeSurface {
        fn container_rect(&self) -> Rect {
            Rect::new(0.0, 50.0, Self::WIDTH, Self::HEIGHT)
        }
        fn scroll_left(&self) -> ScaledPixel {
            ScaledPixel(self.left)
        }
        fn scroll_top(&self) -> ScaledPixel {
            ScaledPixel(self.top)
        }
        fn max_scroll_left(&self) -> ScaledPixel {
            ScaledPixel(Self::WIDTH * self.scale - Self::WIDTH)
        }
        fn set_scroll(&mut self, left: ScaledPixel, top: ScaledPixel) {
            let max_top = Self::PAGE_HEIGHT * self.scale - Self::HEIGHT;
            self.left = left.get().clamp(0.0, self.max_scroll_left().get());
            self.top = top.get().clamp(0.0, max_top);
        }
        fn apply_layout(&mut self, layout: &ZoomLayout) {
            self.scale = layout.scale;
            self.layouts.push(*layout);
        }
    }

    fn engine(reading: ReadingLayout) -> ZoomEngine {
        ZoomEngine::new(ZoomConfig::default(), true, reading)
    }

    fn content_under(engine: &ZoomEngine, surface: &FakeSurface, point: Point) -> (f64, f64) {
        let (x, y) = engine.viewport_to_content(surface, point, engine.scale());
        (x.get(), y.get())
    }

    #[test]
    fn pinch_keeps_midpoint_anchored() {
        let mut surface = FakeSurface::new();
        surface.top = 1000.0;
        let mut zoom = engine(ReadingLayout::Vertical);
        let mid = Point::new(200.0, 350.0);
        let before = content_under(&zoom, &surface, mid);

        zoom.touch_start(
            &mut surface,
            &[Point::new(150.0, 350.0), Point::new(250.0, 350.0)],
            0,
        );
        assert_eq!(zoom.phase(), ZoomPhase::Zooming);
        zoom.touch_move(
            &mut surface,
            &[Point::new(100.0, 350.0), Point::new(300.0, 350.0)],
        );
        assert!((zoom.scale() - 2.0).abs() < 1e-9);

        let after = content_under(&zoom, &surface, mid);
        assert!((before.0 - after.0).abs() < 1.0);
        assert!((before.1 - after.1).abs() < 1.0);

        zoom.touch_end(&mut surface, 1);
        assert_eq!(zoom.phase(), ZoomPhase::Zoomed);
    }

    #[test]
    fn pinch_scale_is_clamped() {
        let mut surface = FakeSurface::new();
        let mut zoom = engine(ReadingLayout::Vertical);
        zoom.touch_start(&mut surface, &[Point::new(190.0, 300.0), Point::new(210.0, 300.0)], 0);
        zoom.touch_move(&mut surface, &[Point::new(0.0, 300.0), Point::new(400.0, 300.0)]);
        assert_eq!(zoom.scale(), 5.0);
        zoom.touch_move(&mut surface, &[Point::new(199.0, 300.0), Point::new(201.0, 300.0)]);
        assert_eq!(zoom.scale(), 1.0);
    }

    #[test]
    fn near_one_snaps_back_on_release() {
        let mut surface = FakeSurface::new();
        let mut zoom = engine(ReadingLayout::Vertical);
        zoom.touch_start(&mut surface, &[Point::new(100.0, 300.0), Point::new(200.0, 300.0)], 0);
        zoom.touch_move(&mut surface, &[Point::new(100.0, 300.0), Point::new(205.0, 300.0)]);
        assert!(zoom.scale() > 1.0);
        zoom.touch_end(&mut surface, 0);
        assert_eq!(zoom.scale(), 1.0);
        assert_eq!(zoom.phase(), ZoomPhase::Idle);
    }

    #[test]
    fn double_tap_toggles_and_anchors() {
        let mut surface = FakeSurface::new();
        let mut zoom = engine(ReadingLayout::Vertical);
        let p = Point::new(100.0, 250.0);
        let before = content_under(&zoom, &surface, p);

        assert_eq!(zoom.touch_start(&mut surface, &[p], 1000), TouchResponse::PassThrough);
        assert_eq!(zoom.touch_start(&mut surface, &[p], 1200), TouchResponse::PreventDefault);
        assert_eq!(zoom.scale(), 2.5);
        let zoomed = content_under(&zoom, &surface, p);
        assert!((before.0 - zoomed.0).abs() < 1.0);
        assert!((before.1 - zoomed.1).abs() < 1.0);

        zoom.touch_start(&mut surface, &[p], 2000);
        zoom.touch_start(&mut surface, &[p], 2100);
        assert_eq!(zoom.scale(), 1.0);
    }

    #[test]
    fn slow_or_distant_taps_are_not_double_taps() {
        let mut surface = FakeSurface::new();
        let mut zoom = engine(ReadingLayout::Vertical);
        zoom.touch_start(&mut surface, &[Point::new(100.0, 100.0)], 0);
        zoom.touch_start(&mut surface, &[Point::new(100.0, 100.0)], 400);
        assert_eq!(zoom.scale(), 1.0);
        zoom.touch_start(&mut surface, &[Point::new(300.0, 100.0)], 450);
        assert_eq!(zoom.scale(), 1.0);
    }

    #[test]
    fn layout_scales_the_axis_orthogonal_to_scrolling() {
        let vertical = ZoomLayout::for_scale(2.0, ReadingLayout::Vertical);
        assert_eq!(vertical.axis, ScaledAxis::Width);
        assert_eq!(vertical.sizer_percent, 200.0);
        assert_eq!(vertical.content_percent, 50.0);
        assert_eq!(vertical.origin, TransformOrigin::TopLeft);

        let rtl = ZoomLayout::for_scale(2.0, ReadingLayout::HorizontalRtl);
        assert_eq!(rtl.axis, ScaledAxis::Height);
        assert_eq!(rtl.origin.as_css(), "top right");

        let idle = ZoomLayout::for_scale(1.0, ReadingLayout::HorizontalLtr);
        assert_eq!(idle.sizer_percent, 100.0);
        assert_eq!(idle.content_percent, 100.0);
    }

    #[test]
    fn direction_change_resets_to_identity() {
        let mut surface = FakeSurface::new();
        let mut zoom = engine(ReadingLayout::Vertical);
        let p = Point::new(100.0, 250.0);
        zoom.touch_start(&mut surface, &[p], 0);
        zoom.touch_start(&mut surface, &[p], 100);
        assert!(zoom.is_zoomed());

        zoom.set_reading_layout(&mut surface, ReadingLayout::HorizontalRtl);
        assert_eq!(zoom.scale(), 1.0);
        assert_eq!(zoom.transform(&surface), PinchTransform::IDENTITY);
    }

    #[test]
    fn disabled_engine_ignores_touches() {
        let mut surface = FakeSurface::new();
        let mut zoom = ZoomEngine::new(ZoomConfig::default(), false, ReadingLayout::Vertical);
        let p = Point::new(100.0, 250.0);
        zoom.touch_start(&mut surface, &[p], 0);
        assert_eq!(zoom.touch_start(&mut surface, &[p], 100), TouchResponse::PassThrough);
        assert_eq!(zoom.scale(), 1.0);
        assert!(surface.layouts.is_empty());
    }
}
