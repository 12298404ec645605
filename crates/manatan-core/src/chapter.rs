//! Chapter preprocessing button: status polling and the click trigger.

use std::time::Duration;

use manatan_types::ChapterStatus;

use crate::error::{OverlayError, Result};

/// Base URL the OCR server uses to fetch the chapter's pages.
pub fn chapter_base_url(origin: &str, chapter_path: &str) -> String {
    format!("{}/api/v1{}/page/", origin.trim_end_matches('/'), chapter_path)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChapterButton {
    Checking,
    Idle,
    Processing { progress: u32, total: u32 },
    Processed,
}

impl ChapterButton {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChapterButton::Checking => "checking",
            ChapterButton::Idle => "idle",
            ChapterButton::Processing { .. } => "processing",
            ChapterButton::Processed => "processed",
        }
    }

    pub fn label(&self) -> String {
        match self {
            ChapterButton::Checking => "...".to_string(),
            ChapterButton::Idle => "Process OCR".to_string(),
            ChapterButton::Processing { total: 0, .. } => "Processing...".to_string(),
            ChapterButton::Processing { progress, total } => {
                format!("Processing... {progress}/{total}")
            }
            ChapterButton::Processed => "OCR Processed".to_string(),
        }
    }

    pub fn is_disabled(&self) -> bool {
        !matches!(self, ChapterButton::Idle)
    }

    /// The server-side status this state mirrors; nothing while checking.
    pub fn reported_status(&self) -> Option<ChapterStatus> {
        match *self {
            ChapterButton::Checking => None,
            ChapterButton::Idle => Some(ChapterStatus::Idle),
            ChapterButton::Processing { progress, total } => {
                Some(ChapterStatus::Processing { progress, total })
            }
            ChapterButton::Processed => Some(ChapterStatus::Processed),
        }
    }
}

impl From<ChapterStatus> for ChapterButton {
    fn from(status: ChapterStatus) -> Self {
        match status {
            ChapterStatus::Idle => ChapterButton::Idle,
            ChapterStatus::Processing { progress, total } => {
                ChapterButton::Processing { progress, total }
            }
            ChapterStatus::Processed => ChapterButton::Processed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollDirective {
    /// Check again after the interval.
    PollAfter(Duration),
    Stop,
}

/// One mounted button for one chapter.
#[derive(Debug, Clone)]
pub struct ChapterProcessor {
    chapter_path: String,
    base_url: String,
    state: ChapterButton,
    poll_interval: Duration,
    poll_pending: bool,
}

impl ChapterProcessor {
    pub fn new(origin: &str, chapter_path: &str, poll_interval: Duration) -> Self {
        Self {
            chapter_path: chapter_path.to_string(),
            base_url: chapter_base_url(origin, chapter_path),
            state: ChapterButton::Checking,
            poll_interval,
            poll_pending: false,
        }
    }

    pub fn chapter_path(&self) -> &str {
        &self.chapter_path
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn state(&self) -> ChapterButton {
        self.state
    }

    /// Processed is terminal for the mount; nothing left to ask the server.
    pub fn should_check(&self) -> bool {
        self.state != ChapterButton::Processed
    }

    pub fn on_status(&mut self, status: ChapterStatus) -> PollDirective {
        if self.state == ChapterButton::Processed {
            return PollDirective::Stop;
        }
        let next = ChapterButton::from(status);
        if next != self.state {
            tracing::debug!(
                chapter = %self.chapter_path,
                from = self.state.as_str(),
                to = next.as_str(),
                "chapter status changed"
            );
            self.state = next;
        }
        match next {
            ChapterButton::Processing { .. } => PollDirective::PollAfter(self.poll_interval),
            _ => PollDirective::Stop,
        }
    }

    /// A failed status check reads as idle.
    pub fn on_check_failed(&mut self) -> PollDirective {
        self.on_status(ChapterStatus::Idle)
    }

    /// Clicks only act from idle. Returns the poll to schedule while the
    /// trigger request is in flight.
    pub fn click(&mut self) -> Result<PollDirective> {
        if self.state != ChapterButton::Idle {
            return Err(OverlayError::InvalidChapterTransition {
                from: self.state.as_str(),
                event: "click",
            });
        }
        self.state = ChapterButton::Processing {
            progress: 0,
            total: 0,
        };
        Ok(PollDirective::PollAfter(self.poll_interval))
    }

    /// Reserve the one scheduled re-poll. `false` while another is pending.
    pub fn claim_poll(&mut self) -> bool {
        if self.poll_pending {
            return false;
        }
        self.poll_pending = true;
        true
    }

    /// The scheduled re-poll is running; the next one may be claimed.
    pub fn poll_fired(&mut self) {
        self.poll_pending = false;
    }

    pub fn poll_pending(&self) -> bool {
        self.poll_pending
    }

    pub fn on_trigger_failed(&mut self) {
        if matches!(self.state, ChapterButton::Processing { .. }) {
            tracing::warn!(chapter = %self.chapter_path, "chapter preprocess trigger failed");
            self.state = ChapterButton::Idle;
        }
    }
}
