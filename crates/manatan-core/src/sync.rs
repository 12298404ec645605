//! Keeps one overlay glued to the source element it covers.

use std::sync::Arc;

use manatan_types::{Pixel, Rect};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::geometry::{Size, TrackedRect, Viewport};
use crate::layer::{LayerSlot, OverlayLayer};

/// Live view of the foreign element being tracked.
pub trait SourceElement {
    /// Image or video URL; the block store key.
    fn locator(&self) -> &str;
    fn is_connected(&self) -> bool;
    fn bounding_rect(&self) -> Rect;
}

/// Style writes on the overlay container.
pub trait OverlaySurface {
    fn hide(&mut self);
    /// Show and translate to the tracked position.
    fn show_at(&mut self, left: Pixel, top: Pixel);
    fn set_content_size(&mut self, size: Size);
}

/// Host animation-frame hook.
pub trait FrameScheduler {
    fn request_frame(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerKind {
    ResizeObserver,
    /// Scroll listener captured at the document root.
    ScrollCapture,
    WindowResize,
}

/// A registered observer or listener. Dropping it must not be relied on;
/// teardown calls [`Subscription::unsubscribe`] explicitly.
pub trait Subscription {
    fn kind(&self) -> ListenerKind;
    fn unsubscribe(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncTrigger {
    Initial,
    ElementResized,
    AncestorScrolled,
    WindowResized,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    Detached,
    Hidden(TrackedRect),
    Visible { rect: TrackedRect, resized: bool },
}

/// Frame-coalesced geometry state for one overlay.
#[derive(Debug, Default)]
pub struct GeometrySync {
    pending_frame: bool,
    dimensions: Size,
    has_been_visible: bool,
    last: Option<TrackedRect>,
}

impl GeometrySync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether a new frame was requested; triggers inside one frame
    /// share a single recompute.
    pub fn schedule(&mut self, trigger: SyncTrigger, scheduler: &dyn FrameScheduler) -> bool {
        if self.pending_frame {
            tracing::trace!(?trigger, "sync already pending");
            return false;
        }
        self.pending_frame = true;
        scheduler.request_frame();
        true
    }

    pub fn is_pending(&self) -> bool {
        self.pending_frame
    }

    pub fn on_frame(
        &mut self,
        element: &dyn SourceElement,
        viewport: Viewport,
        surface: &mut dyn OverlaySurface,
    ) -> SyncOutcome {
        self.pending_frame = false;
        self.sync_now(element, viewport, surface)
    }

    pub fn sync_now(
        &mut self,
        element: &dyn SourceElement,
        viewport: Viewport,
        surface: &mut dyn OverlaySurface,
    ) -> SyncOutcome {
        if !element.is_connected() {
            surface.hide();
            self.last = None;
            return SyncOutcome::Detached;
        }

        let rect = TrackedRect::measure(element.bounding_rect(), viewport);
        self.last = Some(rect);
        if !rect.visible {
            surface.hide();
            return SyncOutcome::Hidden(rect);
        }

        surface.show_at(rect.left, rect.top);
        let size = rect.size();
        let resized = !self.has_been_visible || size.differs_from(&self.dimensions);
        if resized {
            tracing::debug!(
                width = size.width.get(),
                height = size.height.get(),
                "overlay content resized"
            );
            self.dimensions = size;
            surface.set_content_size(size);
        }
        self.has_been_visible = true;
        SyncOutcome::Visible { rect, resized }
    }

    /// Content dimensions regions are projected onto.
    pub fn dimensions(&self) -> Size {
        self.dimensions
    }

    pub fn has_been_visible(&self) -> bool {
        self.has_been_visible
    }

    pub fn last_rect(&self) -> Option<TrackedRect> {
        self.last
    }
}

/// One mounted overlay: its element, surface, listeners and layer slot.
pub struct OverlayTracker<E, S> {
    id: Uuid,
    element: E,
    surface: S,
    sync: GeometrySync,
    subscriptions: Vec<Box<dyn Subscription>>,
    cancel: CancellationToken,
    slot: Option<LayerSlot>,
}

impl<E: SourceElement, S: OverlaySurface> OverlayTracker<E, S> {
    pub fn attach(
        element: E,
        surface: S,
        layer: &Arc<OverlayLayer>,
        subscriptions: Vec<Box<dyn Subscription>>,
        viewport: Viewport,
    ) -> Self {
        let id = Uuid::new_v4();
        let slot = layer.attach(id);
        let mut tracker = Self {
            id,
            element,
            surface,
            sync: GeometrySync::new(),
            subscriptions,
            cancel: CancellationToken::new(),
            slot: Some(slot),
        };
        tracing::info!(%id, source = tracker.element.locator(), "overlay tracker attached");
        tracker
            .sync
            .sync_now(&tracker.element, viewport, &mut tracker.surface);
        tracker
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn source_key(&self) -> &str {
        self.element.locator()
    }

    pub fn trigger(&mut self, trigger: SyncTrigger, scheduler: &dyn FrameScheduler) -> bool {
        if self.cancel.is_cancelled() {
            return false;
        }
        self.sync.schedule(trigger, scheduler)
    }

    pub fn frame(&mut self, viewport: Viewport) -> Option<SyncOutcome> {
        if self.cancel.is_cancelled() {
            return None;
        }
        Some(
            self.sync
                .on_frame(&self.element, viewport, &mut self.surface),
        )
    }

    pub fn geometry(&self) -> &GeometrySync {
        &self.sync
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Token for requests started on behalf of this overlay.
    pub fn request_token(&self) -> CancellationToken {
        self.cancel.child_token()
    }

    pub fn is_torn_down(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Removes listeners, aborts outstanding requests and frees the slot.
    pub fn teardown(&mut self) {
        if self.cancel.is_cancelled() {
            return;
        }
        for subscription in &mut self.subscriptions {
            tracing::debug!(kind = ?subscription.kind(), "unsubscribing");
            subscription.unsubscribe();
        }
        self.subscriptions.clear();
        self.cancel.cancel();
        self.slot = None;
        tracing::info!(id = %self.id, "overlay tracker torn down");
    }
}

impl<E, S> Drop for OverlayTracker<E, S> {
    fn drop(&mut self) {
        if !self.cancel.is_cancelled() {
            for subscription in &mut self.subscriptions {
                subscription.unsubscribe();
            }
            self.cancel.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::layer::LayerRegistry;

    struct FakeElement {
        connected: Rc<Cell<bool>>,
        rect: Rc<Cell<Rect>>,
    }

    impl SourceElement for FakeElement {
        fn locator(&self) -> &str {
            "https://host/page-1.png"
        }
        fn is_connected(&self) -> bool {
            self.connected.get()
        }
        fn bounding_rect(&self) -> Rect {
            self.rect.get()
        }
    }

    #[derive(Default)]
    struct FakeSurface {
        shown: bool,
        position: (f64, f64),
        size_writes: usize,
    }

    impl OverlaySurface for FakeSurface {
        fn hide(&mut self) {
            self.shown = false;
        }
        fn show_at(&mut self, left: Pixel, top: Pixel) {
            self.shown = true;
            self.position = (left.get(), top.get());
        }
        fn set_content_size(&mut self, _size: Size) {
            self.size_writes += 1;
        }
    }

    #[derive(Default)]
    struct CountingScheduler(Cell<usize>);

    impl FrameScheduler for CountingScheduler {
        fn request_frame(&self) {
            self.0.set(self.0.get() + 1);
        }
    }

    struct FakeSubscription {
        kind: ListenerKind,
        removed: Rc<Cell<usize>>,
    }

    impl Subscription for FakeSubscription {
        fn kind(&self) -> ListenerKind {
            self.kind
        }
        fn unsubscribe(&mut self) {
            self.removed.set(self.removed.get() + 1);
        }
    }

    const VIEWPORT: Viewport = Viewport {
        width: Pixel(1000.0),
        height: Pixel(800.0),
    };

    fn element(rect: Rect) -> (FakeElement, Rc<Cell<bool>>, Rc<Cell<Rect>>) {
        let connected = Rc::new(Cell::new(true));
        let rect = Rc::new(Cell::new(rect));
        (
            FakeElement {
                connected: connected.clone(),
                rect: rect.clone(),
            },
            connected,
            rect,
        )
    }

    #[test]
    fn triggers_within_a_frame_coalesce() {
        let mut sync = GeometrySync::new();
        let scheduler = CountingScheduler::default();
        assert!(sync.schedule(SyncTrigger::ElementResized, &scheduler));
        assert!(!sync.schedule(SyncTrigger::AncestorScrolled, &scheduler));
        assert!(!sync.schedule(SyncTrigger::WindowResized, &scheduler));
        assert_eq!(scheduler.0.get(), 1);

        let (el, _, _) = element(Rect::new(0.0, 0.0, 500.0, 700.0));
        let mut surface = FakeSurface::default();
        sync.on_frame(&el, VIEWPORT, &mut surface);
        assert!(sync.schedule(SyncTrigger::AncestorScrolled, &scheduler));
        assert_eq!(scheduler.0.get(), 2);
    }

    #[test]
    fn detached_and_offscreen_elements_hide_without_losing_dimensions() {
        let (el, connected, rect) = element(Rect::new(0.0, 0.0, 500.0, 700.0));
        let mut surface = FakeSurface::default();
        let mut sync = GeometrySync::new();

        assert!(matches!(
            sync.sync_now(&el, VIEWPORT, &mut surface),
            SyncOutcome::Visible { resized: true, .. }
        ));
        assert!(surface.shown);

        rect.set(Rect::new(0.0, 2000.0, 500.0, 700.0));
        assert!(matches!(
            sync.sync_now(&el, VIEWPORT, &mut surface),
            SyncOutcome::Hidden(_)
        ));
        assert!(!surface.shown);
        assert_eq!(sync.dimensions().width, Pixel(500.0));

        connected.set(false);
        assert_eq!(
            sync.sync_now(&el, VIEWPORT, &mut surface),
            SyncOutcome::Detached
        );

        connected.set(true);
        rect.set(Rect::new(20.0, 30.0, 500.0, 700.0));
        assert!(matches!(
            sync.sync_now(&el, VIEWPORT, &mut surface),
            SyncOutcome::Visible { resized: false, .. }
        ));
        assert_eq!(surface.position, (20.0, 30.0));
    }

    #[test]
    fn sub_pixel_jitter_does_not_rewrite_size() {
        let (el, _, rect) = element(Rect::new(0.0, 0.0, 500.0, 700.0));
        let mut surface = FakeSurface::default();
        let mut sync = GeometrySync::new();
        sync.sync_now(&el, VIEWPORT, &mut surface);
        rect.set(Rect::new(0.0, 0.0, 500.4, 700.9));
        sync.sync_now(&el, VIEWPORT, &mut surface);
        assert_eq!(surface.size_writes, 1);
        rect.set(Rect::new(0.0, 0.0, 520.0, 700.0));
        sync.sync_now(&el, VIEWPORT, &mut surface);
        assert_eq!(surface.size_writes, 2);
    }

    #[test]
    fn teardown_releases_listeners_slot_and_requests() {
        let registry = LayerRegistry::new();
        let layer = registry.get_or_create();
        let removed = Rc::new(Cell::new(0));
        let subscriptions: Vec<Box<dyn Subscription>> = [
            ListenerKind::ResizeObserver,
            ListenerKind::ScrollCapture,
            ListenerKind::WindowResize,
        ]
        .into_iter()
        .map(|kind| {
            Box::new(FakeSubscription {
                kind,
                removed: removed.clone(),
            }) as Box<dyn Subscription>
        })
        .collect();

        let (el, _, _) = element(Rect::new(0.0, 0.0, 500.0, 700.0));
        let mut tracker =
            OverlayTracker::attach(el, FakeSurface::default(), &layer, subscriptions, VIEWPORT);
        let request = tracker.request_token();
        assert_eq!(layer.slot_count(), 1);
        assert!(tracker.surface().shown);

        tracker.teardown();
        assert_eq!(removed.get(), 3);
        assert!(request.is_cancelled());
        assert_eq!(layer.slot_count(), 0);
        assert!(tracker.frame(VIEWPORT).is_none());

        tracker.teardown();
        drop(tracker);
        assert_eq!(removed.get(), 3);
    }
}
