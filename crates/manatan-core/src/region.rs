//! Interaction model for a single rendered text region.

use manatan_config::overlay::{ModifierKey, OverlayConfig, TextOrientationMode};
use manatan_types::{ForcedOrientation, Pixel, Point, Rect, TextRegion};

use crate::dom::{self, Document, NodeId};
use crate::geometry::Size;
use crate::preprocess::{to_display, to_editable, to_storage};

pub const MIN_FONT_SIZE: f64 = 10.0;
pub const MAX_FONT_SIZE: f64 = 200.0;
const SAFE_MARGIN: f64 = 0.85;
/// Height over width above which smart mode reads a box as vertical.
const VERTICAL_ASPECT: f64 = 1.5;

pub fn is_vertical(region: &TextRegion, mode: TextOrientationMode) -> bool {
    match region.forced_orientation {
        ForcedOrientation::Vertical => true,
        ForcedOrientation::Horizontal => false,
        ForcedOrientation::Auto => match mode {
            TextOrientationMode::Smart => {
                region.bbox.h.get() > region.bbox.w.get() * VERTICAL_ASPECT
            }
            TextOrientationMode::ForceVertical => true,
            TextOrientationMode::ForceHorizontal => false,
        },
    }
}

/// Largest font that fits `display` into a `width` x `height` box.
pub fn fit_font_size(
    display: &str,
    width: Pixel,
    height: Pixel,
    vertical: bool,
    config: &OverlayConfig,
) -> f64 {
    let lines: Vec<&str> = display.split('\n').collect();
    let line_count = lines.len().max(1) as f64;
    let longest = lines
        .iter()
        // One glyph per code point; UTF-16 length would count astral glyphs twice.
        .map(|line| line.chars().count())
        .max()
        .unwrap_or(0)
        .max(1) as f64;
    let safe_w = width.get() * SAFE_MARGIN;
    let safe_h = height.get() * SAFE_MARGIN;

    let size = if vertical {
        (safe_w / line_count).min(safe_h / longest) * config.font_multiplier_vertical
    } else {
        (safe_h / line_count).min(safe_w / longest) * config.font_multiplier_horizontal
    };
    size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE)
}

/// Everything needed to draw one region for the current container size.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionLayout {
    /// Relative to the overlay container.
    pub rect: Rect,
    pub font_size: f64,
    pub vertical: bool,
    pub content: String,
}

pub fn layout_region(
    region: &TextRegion,
    container: Size,
    editing: bool,
    config: &OverlayConfig,
) -> RegionLayout {
    let adjustment = config.bounding_box_adjustment;
    let rect = region
        .bbox
        .to_pixel_rect(container.width, container.height, adjustment);
    let vertical = is_vertical(region, config.text_orientation);
    let display = to_display(&region.text);

    let font_width = region.bbox.w.to_pixels(container.width) + Pixel(adjustment);
    let font_height = region.bbox.h.to_pixels(container.height) + Pixel(adjustment);
    let font_size = fit_font_size(&display, font_width, font_height, vertical, config);

    RegionLayout {
        rect,
        font_size,
        vertical,
        content: if editing {
            to_editable(&region.text)
        } else {
            display
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub alt: bool,
    pub ctrl: bool,
    pub shift: bool,
}

impl Modifiers {
    pub fn held(&self, key: ModifierKey) -> bool {
        match key {
            ModifierKey::Alt => self.alt,
            ModifierKey::Control => self.ctrl,
            ModifierKey::Shift => self.shift,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeAnchor {
    pub source_key: String,
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionAction {
    None,
    Delete { index: usize },
    AnchorSet,
    /// The pending anchor did not pair with this click and was dropped.
    AnchorCleared,
    Merge { first: usize, second: usize },
    Lookup { index: usize },
    EnterEdit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionKey {
    Enter,
    Space,
    Delete,
    Other,
}

/// Per-session interaction state shared by every region.
#[derive(Debug, Default)]
pub struct InteractionSession {
    anchor: Option<MergeAnchor>,
}

impl InteractionSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn anchor(&self) -> Option<&MergeAnchor> {
        self.anchor.as_ref()
    }

    /// Highlight state for the region at `index`.
    pub fn is_merge_target(&self, source_key: &str, index: usize) -> bool {
        self.anchor
            .as_ref()
            .is_some_and(|a| a.source_key == source_key && a.index == index)
    }

    pub fn resolve_click(
        &mut self,
        source_key: &str,
        index: usize,
        modifiers: Modifiers,
        editing: bool,
        selection_collapsed: bool,
        config: &OverlayConfig,
        lookup_enabled: bool,
    ) -> RegionAction {
        if !selection_collapsed || editing {
            return RegionAction::None;
        }

        if modifiers.held(config.delete_modifier) {
            return RegionAction::Delete { index };
        }

        if modifiers.held(config.merge_modifier) {
            return match self.anchor.take() {
                None => {
                    self.anchor = Some(MergeAnchor {
                        source_key: source_key.to_string(),
                        index,
                    });
                    RegionAction::AnchorSet
                }
                Some(anchor) if anchor.source_key == source_key && anchor.index != index => {
                    RegionAction::Merge {
                        first: anchor.index,
                        second: index,
                    }
                }
                Some(_) => RegionAction::AnchorCleared,
            };
        }

        if lookup_enabled {
            RegionAction::Lookup { index }
        } else {
            RegionAction::None
        }
    }

    pub fn resolve_key(&self, key: RegionKey, index: usize, editing: bool) -> RegionAction {
        if editing {
            return RegionAction::None;
        }
        match key {
            RegionKey::Enter | RegionKey::Space => RegionAction::EnterEdit,
            RegionKey::Delete => RegionAction::Delete { index },
            RegionKey::Other => RegionAction::None,
        }
    }

    pub fn clear(&mut self) {
        self.anchor = None;
    }
}

/// Storage text to write back after an edit, or `None` if unchanged.
pub fn commit_edit(stored: &str, edited: &str) -> Option<String> {
    let edited = edited.replace("\r\n", "\n");
    if edited == to_editable(stored) {
        return None;
    }
    Some(to_storage(&edited))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelRoute {
    Ignored,
    /// Scrolled the source image's own scroll container.
    SourceAncestor(NodeId),
    /// Scrolled whatever was under the pointer.
    UnderPointer(NodeId),
    /// Nothing scrollable; the page is left alone.
    Unhandled,
}

/// Forward a wheel delta over a region to the page's real scroller.
pub fn route_wheel(
    doc: &mut dyn Document,
    source_key: &str,
    pointer: Point,
    delta_y: f64,
    editing: bool,
) -> WheelRoute {
    if editing {
        return WheelRoute::Ignored;
    }

    let from_source = doc
        .image_by_src(source_key)
        .and_then(|img| dom::scrollable_ancestor(&*doc, img));
    if let Some(target) = from_source {
        doc.scroll_by(target, delta_y);
        return WheelRoute::SourceAncestor(target);
    }

    let under_pointer = doc
        .element_at_point(pointer)
        .and_then(|under| dom::scrollable_self_or_ancestor(&*doc, under));
    if let Some(target) = under_pointer {
        doc.scroll_by(target, delta_y);
        return WheelRoute::UnderPointer(target);
    }

    tracing::trace!(source_key, "no scroll container for wheel event");
    WheelRoute::Unhandled
}

#[cfg(test)]
mod tests {
    use manatan_types::FractionalBox;

    use super::*;
    use crate::dom::fake::FakeDocument;

    const KEY: &str = "https://host/page-1.png";

    fn region(w: f64, h: f64) -> TextRegion {
        TextRegion::new("テスト", FractionalBox::new(0.1, 0.1, w, h))
    }

    fn click(
        session: &mut InteractionSession,
        key: &str,
        index: usize,
        modifiers: Modifiers,
    ) -> RegionAction {
        session.resolve_click(
            key,
            index,
            modifiers,
            false,
            true,
            &OverlayConfig::default(),
            true,
        )
    }

    const ALT: Modifiers = Modifiers {
        alt: true,
        ctrl: false,
        shift: false,
    };
    const CTRL: Modifiers = Modifiers {
        alt: false,
        ctrl: true,
        shift: false,
    };

    #[test]
    fn orientation_precedence() {
        let tall = region(0.1, 0.3);
        let wide = region(0.3, 0.1);
        assert!(is_vertical(&tall, TextOrientationMode::Smart));
        assert!(!is_vertical(&wide, TextOrientationMode::Smart));
        assert!(is_vertical(&wide, TextOrientationMode::ForceVertical));

        let mut forced = tall.clone();
        forced.forced_orientation = ForcedOrientation::Horizontal;
        assert!(!is_vertical(&forced, TextOrientationMode::ForceVertical));
        forced.forced_orientation = ForcedOrientation::Vertical;
        assert!(is_vertical(&forced, TextOrientationMode::ForceHorizontal));
    }

    #[test]
    fn font_fits_the_tighter_axis() {
        let config = OverlayConfig::default();
        // 2 lines, longest 5 chars, vertical: min(100*.85/2, 400*.85/5) = 42.5
        let size = fit_font_size("あいうえお\nかき", Pixel(100.0), Pixel(400.0), true, &config);
        assert!((size - 42.5).abs() < 1e-9);
        // horizontal: min(400*.85/2, 100*.85/5) = 17
        let size = fit_font_size("あいうえお\nかき", Pixel(100.0), Pixel(400.0), false, &config);
        assert!((size - 17.0).abs() < 1e-9);
    }

    #[test]
    fn astral_glyphs_count_once() {
        let config = OverlayConfig::default();
        let bmp = fit_font_size("吉吉", Pixel(100.0), Pixel(400.0), false, &config);
        let astral = fit_font_size("𠮷𠮷", Pixel(100.0), Pixel(400.0), false, &config);
        assert_eq!(bmp, astral);
    }

    #[test]
    fn font_size_is_clamped_and_scaled() {
        let mut config = OverlayConfig::default();
        assert_eq!(fit_font_size("あ", Pixel(4.0), Pixel(4.0), false, &config), MIN_FONT_SIZE);
        assert_eq!(
            fit_font_size("あ", Pixel(1000.0), Pixel(1000.0), false, &config),
            MAX_FONT_SIZE
        );
        config.font_multiplier_horizontal = 2.0;
        let size = fit_font_size("あいうえお", Pixel(100.0), Pixel(100.0), false, &config);
        assert!((size - 34.0).abs() < 1e-9);
    }

    #[test]
    fn layout_projects_box_with_adjustment() {
        let mut config = OverlayConfig::default();
        config.bounding_box_adjustment = 4.0;
        let container = Size {
            width: Pixel(1000.0),
            height: Pixel(2000.0),
        };
        let layout = layout_region(&region(0.2, 0.05), container, false, &config);
        assert_eq!(layout.rect, Rect::new(98.0, 198.0, 204.0, 104.0));
        assert!(!layout.vertical);
        assert_eq!(layout.content, "テスト");
    }

    #[test]
    fn merge_anchor_lifecycle() {
        let mut session = InteractionSession::new();
        assert_eq!(click(&mut session, KEY, 2, ALT), RegionAction::AnchorSet);
        assert!(session.is_merge_target(KEY, 2));
        assert_eq!(
            click(&mut session, KEY, 0, ALT),
            RegionAction::Merge { first: 2, second: 0 }
        );
        assert!(session.anchor().is_none());

        click(&mut session, KEY, 1, ALT);
        assert_eq!(click(&mut session, KEY, 1, ALT), RegionAction::AnchorCleared);
        click(&mut session, KEY, 1, ALT);
        assert_eq!(
            click(&mut session, "https://host/page-2.png", 0, ALT),
            RegionAction::AnchorCleared
        );
    }

    #[test]
    fn delete_modifier_wins_and_plain_click_looks_up() {
        let mut session = InteractionSession::new();
        let both = Modifiers {
            alt: true,
            ctrl: true,
            shift: false,
        };
        assert_eq!(click(&mut session, KEY, 3, both), RegionAction::Delete { index: 3 });
        assert_eq!(click(&mut session, KEY, 3, CTRL), RegionAction::Delete { index: 3 });
        assert_eq!(
            click(&mut session, KEY, 3, Modifiers::default()),
            RegionAction::Lookup { index: 3 }
        );
        let config = OverlayConfig::default();
        assert_eq!(
            session.resolve_click(KEY, 3, Modifiers::default(), false, true, &config, false),
            RegionAction::None
        );
    }

    #[test]
    fn clicks_during_edit_or_selection_are_ignored() {
        let mut session = InteractionSession::new();
        let config = OverlayConfig::default();
        assert_eq!(
            session.resolve_click(KEY, 0, CTRL, true, true, &config, true),
            RegionAction::None
        );
        assert_eq!(
            session.resolve_click(KEY, 0, CTRL, false, false, &config, true),
            RegionAction::None
        );
    }

    #[test]
    fn keyboard_actions() {
        let session = InteractionSession::new();
        assert_eq!(session.resolve_key(RegionKey::Enter, 1, false), RegionAction::EnterEdit);
        assert_eq!(session.resolve_key(RegionKey::Space, 1, false), RegionAction::EnterEdit);
        assert_eq!(
            session.resolve_key(RegionKey::Delete, 1, false),
            RegionAction::Delete { index: 1 }
        );
        assert_eq!(session.resolve_key(RegionKey::Delete, 1, true), RegionAction::None);
    }

    #[test]
    fn edit_commit_only_when_changed() {
        let stored = "一行目\u{200B}二行目";
        assert_eq!(commit_edit(stored, "一行目\n二行目"), None);
        assert_eq!(
            commit_edit(stored, "一行目\r\n三行目"),
            Some("一行目\u{200B}三行目".to_string())
        );
    }

    #[test]
    fn wheel_prefers_the_source_image_scroller() {
        let mut doc = FakeDocument::default();
        doc.container(1, None, true);
        doc.container(2, Some(1), false);
        doc.image(3, 2, KEY, 1200.0);
        doc.container(7, None, true);
        doc.under_pointer = Some(7);

        let route = route_wheel(&mut doc, KEY, Point::new(0.0, 0.0), 120.0, false);
        assert_eq!(route, WheelRoute::SourceAncestor(1));
        assert_eq!(doc.scrolled, vec![(1, 120.0)]);
    }

    #[test]
    fn wheel_falls_back_to_pointer_then_gives_up() {
        let mut doc = FakeDocument::default();
        doc.container(7, None, true);
        doc.under_pointer = Some(7);
        let route = route_wheel(&mut doc, KEY, Point::new(0.0, 0.0), -40.0, false);
        assert_eq!(route, WheelRoute::UnderPointer(7));

        let mut empty = FakeDocument::default();
        assert_eq!(
            route_wheel(&mut empty, KEY, Point::new(0.0, 0.0), 10.0, false),
            WheelRoute::Unhandled
        );
        assert!(empty.scrolled.is_empty());
        assert_eq!(
            route_wheel(&mut doc, KEY, Point::new(0.0, 0.0), 10.0, true),
            WheelRoute::Ignored
        );
    }
}
