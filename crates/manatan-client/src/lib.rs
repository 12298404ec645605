pub mod error;
pub mod http;
pub mod jimaku;

use manatan_types::{ChapterStatus, GroupingMode, LookupResponse, SubtitleFile, TextRegion};

pub use error::ClientError;
pub use http::HttpClient;
pub use jimaku::{EpisodeQuery, JimakuClient};

/// OCR provider interface
#[async_trait::async_trait]
pub trait OcrBackend: Send + Sync {
    /// Recognize text regions on the image at `image_url`
    async fn fetch_regions(
        &self,
        image_url: &str,
        add_space_on_merge: bool,
    ) -> Result<Vec<TextRegion>, ClientError>;
}

/// Dictionary provider interface
#[async_trait::async_trait]
pub trait LookupBackend: Send + Sync {
    /// Look up the term starting at a UTF-8 byte offset into `text`
    async fn lookup(
        &self,
        text: &str,
        byte_offset: usize,
        grouping: GroupingMode,
    ) -> Result<LookupResponse, ClientError>;
}

/// Chapter preprocessing job queue
#[async_trait::async_trait]
pub trait ChapterBackend: Send + Sync {
    async fn check_status(&self, base_url: &str) -> Result<ChapterStatus, ClientError>;

    /// Queue the chapter for OCR. `pages` lists absolute page URLs when known.
    async fn preprocess(
        &self,
        base_url: &str,
        context: &str,
        pages: Option<Vec<String>>,
    ) -> Result<(), ClientError>;
}

/// Anything that can hand back a subtitle file's text
#[async_trait::async_trait]
pub trait SubtitleSource: Send + Sync {
    async fn fetch_text(&self, url: &str) -> Result<String, ClientError>;
}

/// Subtitle file search for one episode
#[async_trait::async_trait]
pub trait JimakuSearch: Send + Sync {
    async fn episode_files(&self, query: &EpisodeQuery) -> Result<Vec<SubtitleFile>, ClientError>;
}
