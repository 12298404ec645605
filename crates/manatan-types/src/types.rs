use serde::{Deserialize, Serialize};

use crate::lookup::DictionaryEntry;
use crate::region::TextRegion;
use crate::status::{ChapterStatus, OverlayStatus};

#[derive(Debug, Clone)]
pub enum AppEvent {
    ConfigChanged,
    /// Request OCR regions for a source locator.
    FetchOcr {
        source_key: String,
    },
    /// Retry action on the error icon; bypasses the cached-status check.
    RetryOcr {
        source_key: String,
    },
    OcrStatusUpdate {
        source_key: String,
        status: OverlayStatus,
    },
    RegionsReady {
        source_key: String,
        regions: Vec<TextRegion>,
    },
    EditRegion {
        source_key: String,
        index: usize,
        text: String,
    },
    MergeRegions {
        source_key: String,
        first: usize,
        second: usize,
    },
    DeleteRegion {
        source_key: String,
        index: usize,
    },
    /// Dictionary lookup at a UTF-8 byte offset into `text`.
    Lookup {
        text: String,
        byte_offset: usize,
    },
    LookupWarmingUp,
    ShowResults(Vec<DictionaryEntry>),
    /// `url` may also be a local file path.
    LoadSubtitles {
        url: String,
    },
    SubtitlesLoaded {
        url: String,
        cues: Vec<SubtitleCue>,
    },
    SearchJimaku {
        title: String,
        anilist_id: Option<u64>,
        episode: u32,
    },
    JimakuFiles(Vec<SubtitleFile>),
    CheckChapter {
        chapter_path: String,
    },
    /// Scheduled re-poll; at most one is pending per chapter.
    PollChapter {
        chapter_path: String,
    },
    ProcessChapter {
        chapter_path: String,
    },
    ChapterStatusUpdate {
        chapter_path: String,
        status: ChapterStatus,
    },
    Failed {
        context: String,
        message: String,
    },
}

/// One timed caption.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleCue {
    /// Seconds.
    pub start: f64,
    /// Seconds.
    pub end: f64,
    pub text: String,
}

/// A downloadable subtitle file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleFile {
    pub url: String,
    pub name: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub last_modified: String,
}
