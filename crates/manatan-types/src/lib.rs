pub mod lookup;
pub mod region;
pub mod status;
pub mod types;
pub mod units;

pub use lookup::{DefinitionBlock, DictionaryEntry, GroupingMode, LookupResponse};
pub use region::{ForcedOrientation, FractionalBox, OcrBlock, TextRegion, WireBox};
pub use status::{ChapterStatus, OverlayStatus};
pub use types::{AppEvent, SubtitleCue, SubtitleFile};
pub use units::{Fraction, Pixel, Point, Rect, ScaledPixel};
