use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use kanal::{AsyncReceiver, AsyncSender};
use manatan_types::AppEvent;
use tokio_util::sync::CancellationToken;

use crate::state::AppState;

pub mod chapter;
pub mod fetch_ocr;
pub mod jimaku;
pub mod lookup;
pub mod regions;
pub mod subtitles;

use chapter::{handle_check_chapter, handle_poll_chapter, handle_process_chapter};
use fetch_ocr::handle_fetch_ocr;
use jimaku::handle_jimaku_search;
use lookup::handle_lookup;
use regions::{handle_delete, handle_edit, handle_merge};
use subtitles::handle_load_subtitles;

/// Everything a handler needs, cheap to clone into spawned tasks.
#[derive(Clone)]
pub struct HandlerContext {
    pub state: Arc<AppState>,
    pub app_to_ui_tx: AsyncSender<AppEvent>,
    /// Back into the event loop, for polls and retries.
    pub requeue_tx: AsyncSender<AppEvent>,
    pub cancel: CancellationToken,
}

impl HandlerContext {
    pub async fn emit(&self, event: AppEvent) {
        if self.app_to_ui_tx.send(event).await.is_err() {
            tracing::debug!("UI receiver gone, dropping event");
        }
    }

    pub async fn fail(&self, context: &str, error: impl std::fmt::Display) {
        self.emit(AppEvent::Failed {
            context: context.to_string(),
            message: error.to_string(),
        })
        .await;
    }

    /// Run a handler off the loop; it stops with the controller.
    pub fn spawn<F>(&self, name: &'static str, task: F)
    where
        F: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let cancel = self.cancel.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!(handler = name, "cancelled");
                }
                result = task => {
                    if let Err(e) = result {
                        tracing::error!(handler = name, "handler failed: {e:#}");
                    }
                }
            }
        });
    }

    /// Feed `event` back into the loop after `delay`.
    pub fn schedule(&self, delay: Duration, event: AppEvent) {
        let tx = self.requeue_tx.clone();
        self.spawn("schedule", async move {
            tokio::time::sleep(delay).await;
            tx.send(event).await?;
            Ok(())
        });
    }
}

/// App's main loop
pub async fn event_loop(
    ctx: HandlerContext,
    ui_to_app_rx: AsyncReceiver<AppEvent>,
) -> anyhow::Result<()> {
    tracing::info!("[EVENT_LOOP] Starting main loop, waiting for events");
    loop {
        let event = tokio::select! {
            _ = ctx.cancel.cancelled() => {
                tracing::info!("[EVENT_LOOP] Shutting down");
                return Ok(());
            }
            event = ui_to_app_rx.recv() => event?,
        };

        tracing::debug!(
            "[EVENT_LOOP] EVENT RECEIVED: {:?}",
            std::mem::discriminant(&event)
        );
        handle_events(&ctx, event).await?;
    }
}

async fn handle_events(ctx: &HandlerContext, event: AppEvent) -> anyhow::Result<()> {
    match event {
        AppEvent::ConfigChanged => {
            tracing::info!("Config changed");
        }
        AppEvent::FetchOcr { source_key } => {
            ctx.spawn("fetch_ocr", handle_fetch_ocr(ctx.clone(), source_key, false));
        }
        AppEvent::RetryOcr { source_key } => {
            tracing::info!(source = %source_key, "retrying OCR");
            ctx.spawn("fetch_ocr", handle_fetch_ocr(ctx.clone(), source_key, true));
        }
        AppEvent::EditRegion {
            source_key,
            index,
            text,
        } => {
            handle_edit(ctx, source_key, index, text).await;
        }
        AppEvent::MergeRegions {
            source_key,
            first,
            second,
        } => {
            handle_merge(ctx, source_key, first, second).await;
        }
        AppEvent::DeleteRegion { source_key, index } => {
            handle_delete(ctx, source_key, index).await;
        }
        AppEvent::Lookup { text, byte_offset } => {
            ctx.spawn("lookup", handle_lookup(ctx.clone(), text, byte_offset));
        }
        AppEvent::LoadSubtitles { url } => {
            ctx.spawn("subtitles", handle_load_subtitles(ctx.clone(), url));
        }
        AppEvent::SearchJimaku {
            title,
            anilist_id,
            episode,
        } => {
            ctx.spawn(
                "jimaku",
                handle_jimaku_search(ctx.clone(), title, anilist_id, episode),
            );
        }
        AppEvent::CheckChapter { chapter_path } => {
            ctx.spawn("check_chapter", handle_check_chapter(ctx.clone(), chapter_path));
        }
        AppEvent::PollChapter { chapter_path } => {
            ctx.spawn("poll_chapter", handle_poll_chapter(ctx.clone(), chapter_path));
        }
        AppEvent::ProcessChapter { chapter_path } => {
            ctx.spawn(
                "process_chapter",
                handle_process_chapter(ctx.clone(), chapter_path),
            );
        }
        AppEvent::OcrStatusUpdate { .. }
        | AppEvent::RegionsReady { .. }
        | AppEvent::LookupWarmingUp
        | AppEvent::ShowResults(_)
        | AppEvent::SubtitlesLoaded { .. }
        | AppEvent::JimakuFiles(_)
        | AppEvent::ChapterStatusUpdate { .. }
        | AppEvent::Failed { .. } => {
            // UI-only event, ignore in backend
        }
    }

    Ok(())
}
