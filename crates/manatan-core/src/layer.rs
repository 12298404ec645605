//! The single full-viewport layer every overlay renders into.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use uuid::Uuid;

pub const OVERLAY_LAYER_ID: &str = "ocr-overlay-layer";

/// Applied once when the host creates the layer element.
pub const OVERLAY_LAYER_STYLE: &str = "position: fixed; top: 0; left: 0; width: 100vw; \
     height: 100vh; pointer-events: none; z-index: 9999; overflow: visible;";

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug)]
pub struct OverlayLayer {
    id: &'static str,
    slots: Mutex<HashSet<Uuid>>,
}

impl OverlayLayer {
    fn new() -> Self {
        Self {
            id: OVERLAY_LAYER_ID,
            slots: Mutex::new(HashSet::new()),
        }
    }

    pub fn id(&self) -> &'static str {
        self.id
    }

    /// Reserve a child subtree for one overlay. Released on drop.
    pub fn attach(self: &Arc<Self>, overlay: Uuid) -> LayerSlot {
        lock(&self.slots).insert(overlay);
        tracing::debug!(%overlay, "overlay attached to layer");
        LayerSlot {
            layer: Arc::clone(self),
            overlay,
        }
    }

    pub fn slot_count(&self) -> usize {
        lock(&self.slots).len()
    }
}

/// One overlay's child subtree inside the layer.
#[derive(Debug)]
pub struct LayerSlot {
    layer: Arc<OverlayLayer>,
    overlay: Uuid,
}

impl LayerSlot {
    pub fn overlay(&self) -> Uuid {
        self.overlay
    }
}

impl Drop for LayerSlot {
    fn drop(&mut self) {
        lock(&self.layer.slots).remove(&self.overlay);
        tracing::debug!(overlay = %self.overlay, "overlay detached from layer");
    }
}

/// Get-or-create holder for the shared layer.
#[derive(Debug)]
pub struct LayerRegistry {
    layer: Mutex<Option<Arc<OverlayLayer>>>,
}

impl LayerRegistry {
    pub const fn new() -> Self {
        Self {
            layer: Mutex::new(None),
        }
    }

    pub fn get_or_create(&self) -> Arc<OverlayLayer> {
        let mut guard = lock(&self.layer);
        match guard.as_ref() {
            Some(layer) => Arc::clone(layer),
            None => {
                tracing::info!(id = OVERLAY_LAYER_ID, "creating overlay layer");
                let layer = Arc::new(OverlayLayer::new());
                *guard = Some(Arc::clone(&layer));
                layer
            }
        }
    }

    pub fn is_created(&self) -> bool {
        lock(&self.layer).is_some()
    }

    /// Binds the layer's lifetime to the application root.
    pub fn mount_root(&self) -> LayerRoot<'_> {
        self.get_or_create();
        LayerRoot { registry: self }
    }

    fn release(&self) {
        if lock(&self.layer).take().is_some() {
            tracing::info!(id = OVERLAY_LAYER_ID, "overlay layer released");
        }
    }
}

impl Default for LayerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Dropping the root unmounts the layer.
#[derive(Debug)]
pub struct LayerRoot<'a> {
    registry: &'a LayerRegistry,
}

impl Drop for LayerRoot<'_> {
    fn drop(&mut self) {
        self.registry.release();
    }
}

static GLOBAL_LAYER: LayerRegistry = LayerRegistry::new();

/// The process-wide layer registry.
pub fn global_layer() -> &'static LayerRegistry {
    &GLOBAL_LAYER
}
