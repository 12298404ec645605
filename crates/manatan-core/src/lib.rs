//! Overlay engine for OCR text regions and subtitles.
//!
//! Nothing here touches a real document. A host embeds the stateful pieces
//! ([`zoom::ZoomEngine`], [`sync::OverlayTracker`], [`discovery::SourceDiscovery`],
//! [`region::InteractionSession`], [`playback::PlaybackOverlay`]) and answers
//! their trait queries from its own DOM. The `manatan` binary only drives the
//! store, the chapter button and the subtitle timeline.

pub mod chapter;
pub mod discovery;
pub mod dom;
pub mod error;
pub mod generation;
pub mod geometry;
pub mod layer;
pub mod offset;
pub mod overlay;
pub mod playback;
pub mod preprocess;
pub mod region;
pub mod store;
pub mod subtitle;
pub mod sync;
pub mod zoom;
