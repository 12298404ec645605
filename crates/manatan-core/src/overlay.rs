//! What one image overlay draws for its current state.

use manatan_config::Config;
use manatan_config::overlay::InteractionMode;
use manatan_types::OverlayStatus;

use crate::geometry::Size;
use crate::region::{InteractionSession, RegionLayout, layout_region};
use crate::store::BlockStore;

/// Host facts the overlay cannot derive itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayContext {
    /// The image has a layout box (`offsetParent` set).
    pub source_displayed: bool,
    /// The reader's own menu overlay is open.
    pub reader_menu_visible: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusIcon {
    Loading,
    /// Clicking retries the OCR fetch.
    Retry,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedRegion {
    pub index: usize,
    pub layout: RegionLayout,
    pub merge_target: bool,
    pub editing: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverlayView {
    pub status: OverlayStatus,
    pub icon: Option<StatusIcon>,
    /// Opacity gate for the icon and regions.
    pub children_visible: bool,
    pub regions: Vec<RenderedRegion>,
}

pub fn is_enabled(config: &Config, context: OverlayContext) -> bool {
    config.overlay.enabled && context.source_displayed && !context.reader_menu_visible
}

pub fn children_visible(config: &Config, status: OverlayStatus) -> bool {
    let overlay = &config.overlay;
    !overlay.solo_hover_mode
        || overlay.interaction_mode == InteractionMode::Click
        || overlay.debug_mode
        || status.shows_icon()
}

pub fn status_icon(status: OverlayStatus) -> Option<StatusIcon> {
    match status {
        OverlayStatus::Loading => Some(StatusIcon::Loading),
        OverlayStatus::Error => Some(StatusIcon::Retry),
        OverlayStatus::Idle | OverlayStatus::Success => None,
    }
}

/// `None` means nothing is mounted for this image.
#[allow(clippy::too_many_arguments)]
pub fn compose(
    store: &BlockStore,
    source_key: &str,
    dimensions: Size,
    has_been_visible: bool,
    session: &InteractionSession,
    editing: Option<usize>,
    config: &Config,
    context: OverlayContext,
) -> Option<OverlayView> {
    if !is_enabled(config, context) {
        return None;
    }

    let regions_data = store.regions(source_key);
    let status = match regions_data {
        Some(_) => OverlayStatus::Success,
        None => store.status(source_key),
    };
    if regions_data.is_none() && !status.shows_icon() {
        return None;
    }

    let regions = match regions_data {
        Some(data) if has_been_visible => data
            .iter()
            .enumerate()
            .map(|(index, region)| {
                let is_editing = editing == Some(index);
                RenderedRegion {
                    index,
                    layout: layout_region(region, dimensions, is_editing, &config.overlay),
                    merge_target: session.is_merge_target(source_key, index),
                    editing: is_editing,
                }
            })
            .collect(),
        _ => Vec::new(),
    };

    Some(OverlayView {
        status,
        icon: status_icon(status),
        children_visible: children_visible(config, status),
        regions,
    })
}
