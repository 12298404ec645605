use std::time::Duration;

use manatan_core::chapter::{ChapterButton, ChapterProcessor, PollDirective};
use manatan_types::AppEvent;

use crate::events::HandlerContext;

/// Base URL of the processor for `chapter_path`, creating it on first use.
async fn processor_base_url(
    ctx: &HandlerContext,
    chapter_path: &str,
) -> (String, ChapterButton) {
    let (origin, poll) = {
        let config = ctx.state.config.read().await;
        (
            config.network.server_url.clone(),
            Duration::from_millis(config.chapter_poll_ms),
        )
    };
    let mut chapters = ctx.state.chapters.lock().await;
    let processor = chapters
        .entry(chapter_path.to_string())
        .or_insert_with(|| ChapterProcessor::new(&origin, chapter_path, poll));
    (processor.base_url().to_string(), processor.state())
}

async fn report(ctx: &HandlerContext, chapter_path: &str, state: ChapterButton) {
    if let Some(status) = state.reported_status() {
        ctx.emit(AppEvent::ChapterStatusUpdate {
            chapter_path: chapter_path.to_string(),
            status,
        })
        .await;
    }
}

/// Ask the server for the chapter's status and fold it into the processor.
async fn refresh(
    ctx: &HandlerContext,
    chapter_path: &str,
    base_url: &str,
) -> (PollDirective, ChapterButton) {
    let result = ctx.state.backends.chapter.check_status(base_url).await;

    let mut chapters = ctx.state.chapters.lock().await;
    let Some(processor) = chapters.get_mut(chapter_path) else {
        return (PollDirective::Stop, ChapterButton::Checking);
    };
    let directive = match result {
        Ok(status) => processor.on_status(status),
        Err(e) => {
            tracing::warn!(chapter = chapter_path, "Failed to check chapter status: {e}");
            processor.on_check_failed()
        }
    };
    (directive, processor.state())
}

/// Queue the chapter's re-poll unless one is already waiting.
async fn schedule_poll(ctx: &HandlerContext, chapter_path: String, directive: PollDirective) {
    let PollDirective::PollAfter(delay) = directive else {
        return;
    };
    let claimed = {
        let mut chapters = ctx.state.chapters.lock().await;
        chapters
            .get_mut(&chapter_path)
            .is_some_and(ChapterProcessor::claim_poll)
    };
    if claimed {
        ctx.schedule(delay, AppEvent::PollChapter { chapter_path });
    } else {
        tracing::debug!(chapter = %chapter_path, "re-poll already pending");
    }
}

pub async fn handle_check_chapter(
    ctx: HandlerContext,
    chapter_path: String,
) -> anyhow::Result<()> {
    let (base_url, state) = processor_base_url(&ctx, &chapter_path).await;
    if state == ChapterButton::Processed {
        report(&ctx, &chapter_path, state).await;
        return Ok(());
    }

    let (directive, state) = refresh(&ctx, &chapter_path, &base_url).await;
    report(&ctx, &chapter_path, state).await;
    schedule_poll(&ctx, chapter_path, directive).await;
    Ok(())
}

pub async fn handle_poll_chapter(
    ctx: HandlerContext,
    chapter_path: String,
) -> anyhow::Result<()> {
    {
        let mut chapters = ctx.state.chapters.lock().await;
        if let Some(processor) = chapters.get_mut(&chapter_path) {
            processor.poll_fired();
        }
    }
    handle_check_chapter(ctx, chapter_path).await
}

pub async fn handle_process_chapter(
    ctx: HandlerContext,
    chapter_path: String,
) -> anyhow::Result<()> {
    let (base_url, state) = processor_base_url(&ctx, &chapter_path).await;
    if state == ChapterButton::Checking {
        refresh(&ctx, &chapter_path, &base_url).await;
    }

    let clicked = {
        let mut chapters = ctx.state.chapters.lock().await;
        match chapters.get_mut(&chapter_path) {
            Some(processor) => processor.click().map(|directive| (directive, processor.state())),
            None => return Ok(()),
        }
    };
    let directive = match clicked {
        Ok((directive, state)) => {
            report(&ctx, &chapter_path, state).await;
            directive
        }
        Err(e) => {
            tracing::info!(chapter = %chapter_path, "{e}");
            ctx.fail("chapter", e).await;
            return Ok(());
        }
    };

    let result = ctx
        .state
        .backends
        .chapter
        .preprocess(&base_url, &chapter_path, None)
        .await;

    match result {
        Ok(()) => schedule_poll(&ctx, chapter_path, directive).await,
        Err(e) => {
            tracing::error!(chapter = %chapter_path, "Failed to start preprocessing: {e}");
            let state = {
                let mut chapters = ctx.state.chapters.lock().await;
                chapters.get_mut(&chapter_path).map(|processor| {
                    processor.on_trigger_failed();
                    processor.state()
                })
            };
            if let Some(state) = state {
                report(&ctx, &chapter_path, state).await;
            }
            ctx.fail("chapter", e).await;
        }
    }
    Ok(())
}
