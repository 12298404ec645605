//! In-memory stand-ins for the HTTP collaborators plus a running event loop.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use kanal::{AsyncReceiver, AsyncSender};
use manatan_client::{
    ChapterBackend, ClientError, EpisodeQuery, JimakuSearch, LookupBackend, OcrBackend,
    SubtitleSource,
};
use manatan_config::Config;
use manatan_types::{
    AppEvent, ChapterStatus, GroupingMode, LookupResponse, SubtitleFile, TextRegion,
};
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use crate::events::{HandlerContext, event_loop};
use crate::state::{AppState, Backends};

/// A canned reply, delivered after `delay`.
pub struct Scripted<T> {
    pub delay: Duration,
    pub result: Result<T, String>,
}

impl<T> Scripted<T> {
    pub fn ok(value: T) -> Self {
        Self {
            delay: Duration::ZERO,
            result: Ok(value),
        }
    }

    pub fn err(message: &str) -> Self {
        Self {
            delay: Duration::ZERO,
            result: Err(message.to_string()),
        }
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    async fn deliver(self) -> Result<T, ClientError> {
        tokio::time::sleep(self.delay).await;
        self.result.map_err(ClientError::InvalidResponse)
    }
}

#[derive(Default)]
pub struct FakeServer {
    pub ocr: Mutex<VecDeque<Scripted<Vec<TextRegion>>>>,
    /// Keyed by lookup text.
    pub lookups: Mutex<HashMap<String, Scripted<LookupResponse>>>,
    /// The last queued status repeats once the others are used up.
    pub chapter_statuses: Mutex<VecDeque<ChapterStatus>>,
    pub preprocess_fails: AtomicBool,
    pub subtitle_text: Mutex<Option<String>>,
    pub jimaku_files: Mutex<Vec<SubtitleFile>>,
    pub ocr_calls: AtomicUsize,
    pub check_calls: AtomicUsize,
    pub preprocess_calls: AtomicUsize,
}

impl FakeServer {
    pub fn backends(self: &Arc<Self>) -> Backends {
        Backends {
            ocr: self.clone(),
            lookup: self.clone(),
            chapter: self.clone(),
            subtitles: self.clone(),
            jimaku: self.clone(),
        }
    }

    pub fn push_ocr(&self, reply: Scripted<Vec<TextRegion>>) {
        self.ocr.lock().unwrap().push_back(reply);
    }

    pub fn push_lookup(&self, text: &str, reply: Scripted<LookupResponse>) {
        self.lookups.lock().unwrap().insert(text.to_string(), reply);
    }

    pub fn push_status(&self, status: ChapterStatus) {
        self.chapter_statuses.lock().unwrap().push_back(status);
    }
}

#[async_trait::async_trait]
impl OcrBackend for FakeServer {
    async fn fetch_regions(
        &self,
        _image_url: &str,
        _add_space_on_merge: bool,
    ) -> Result<Vec<TextRegion>, ClientError> {
        self.ocr_calls.fetch_add(1, Ordering::SeqCst);
        let reply = self.ocr.lock().unwrap().pop_front();
        reply.unwrap_or_else(|| Scripted::ok(Vec::new())).deliver().await
    }
}

#[async_trait::async_trait]
impl LookupBackend for FakeServer {
    async fn lookup(
        &self,
        text: &str,
        _byte_offset: usize,
        _grouping: GroupingMode,
    ) -> Result<LookupResponse, ClientError> {
        let reply = self.lookups.lock().unwrap().remove(text);
        reply
            .unwrap_or_else(|| Scripted::ok(LookupResponse::Entries(Vec::new())))
            .deliver()
            .await
    }
}

#[async_trait::async_trait]
impl ChapterBackend for FakeServer {
    async fn check_status(&self, _base_url: &str) -> Result<ChapterStatus, ClientError> {
        self.check_calls.fetch_add(1, Ordering::SeqCst);
        let mut statuses = self.chapter_statuses.lock().unwrap();
        let status = if statuses.len() > 1 {
            statuses.pop_front()
        } else {
            statuses.front().copied()
        };
        Ok(status.unwrap_or_default())
    }

    async fn preprocess(
        &self,
        _base_url: &str,
        _context: &str,
        _pages: Option<Vec<String>>,
    ) -> Result<(), ClientError> {
        self.preprocess_calls.fetch_add(1, Ordering::SeqCst);
        if self.preprocess_fails.load(Ordering::SeqCst) {
            return Err(ClientError::Status {
                context: "Chapter preprocess",
                status: 503,
            });
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl SubtitleSource for FakeServer {
    async fn fetch_text(&self, url: &str) -> Result<String, ClientError> {
        let text = self.subtitle_text.lock().unwrap().clone();
        text.ok_or_else(|| ClientError::InvalidResponse(format!("no subtitles at {url}")))
    }
}

#[async_trait::async_trait]
impl JimakuSearch for FakeServer {
    async fn episode_files(&self, _query: &EpisodeQuery) -> Result<Vec<SubtitleFile>, ClientError> {
        Ok(self.jimaku_files.lock().unwrap().clone())
    }
}

/// Event loop wired to unbounded channels; cancelled on drop.
pub struct Harness {
    pub tx: AsyncSender<AppEvent>,
    pub rx: AsyncReceiver<AppEvent>,
    pub state: Arc<AppState>,
    cancel: CancellationToken,
}

impl Harness {
    pub fn start(config: Config, server: &Arc<FakeServer>) -> Self {
        let state = Arc::new(AppState::new(config, server.backends()));
        let (to_app_tx, to_app_rx) = kanal::unbounded_async();
        let (to_ui_tx, to_ui_rx) = kanal::unbounded_async();
        let cancel = CancellationToken::new();

        let ctx = HandlerContext {
            state: state.clone(),
            app_to_ui_tx: to_ui_tx,
            requeue_tx: to_app_tx.clone(),
            cancel: cancel.clone(),
        };
        tokio::spawn(event_loop(ctx, to_app_rx));

        Self {
            tx: to_app_tx,
            rx: to_ui_rx,
            state,
            cancel,
        }
    }

    pub async fn send(&self, event: AppEvent) {
        self.tx.send(event).await.expect("event loop alive");
    }

    pub async fn next(&self) -> AppEvent {
        timeout(Duration::from_secs(2), self.rx.recv())
            .await
            .expect("Timeout waiting for app event")
            .expect("channel closed")
    }

    /// Nothing else arrives within `window`.
    pub async fn assert_quiet(&self, window: Duration) {
        if let Ok(Ok(event)) = timeout(window, self.rx.recv()).await {
            panic!("unexpected event: {event:?}");
        }
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
