#[derive(Debug, thiserror::Error)]
pub enum OverlayError {
    #[error("Unrecognized subtitle format: {0}")]
    UnknownSubtitleFormat(String),

    #[error("Malformed subtitle timestamp: {0}")]
    MalformedTimestamp(String),

    #[error("Subtitle file has no cues")]
    EmptySubtitles,

    #[error("Invalid selector {selector:?}: {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("Invalid chapter transition from {from} on {event}")]
    InvalidChapterTransition {
        from: &'static str,
        event: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, OverlayError>;
