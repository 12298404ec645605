use anyhow::Context;
use manatan_core::subtitle::parse_subtitles;
use manatan_types::AppEvent;

use crate::events::HandlerContext;

fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

async fn read_source(ctx: &HandlerContext, source: &str) -> anyhow::Result<String> {
    if is_remote(source) {
        Ok(ctx.state.backends.subtitles.fetch_text(source).await?)
    } else {
        tokio::fs::read_to_string(source)
            .await
            .with_context(|| format!("reading {source}"))
    }
}

/// Load and parse a subtitle file. A newer load discards this one's result.
pub async fn handle_load_subtitles(ctx: HandlerContext, url: String) -> anyhow::Result<()> {
    let generation = ctx.state.subtitle_loads.next();
    let parsed = match read_source(&ctx, &url).await {
        Ok(text) => parse_subtitles(&text, &url).map_err(anyhow::Error::from),
        Err(e) => Err(e),
    };

    if !ctx.state.subtitle_loads.is_current(generation) {
        tracing::debug!(url = %url, "dropping stale subtitle load");
        return Ok(());
    }

    match parsed {
        Ok(cues) => {
            tracing::info!(url = %url, cues = cues.len(), "subtitles loaded");
            ctx.emit(AppEvent::SubtitlesLoaded { url, cues }).await;
        }
        Err(e) => {
            tracing::warn!(url = %url, "Subtitle load failed: {e:#}");
            ctx.fail("subtitles", format!("{e:#}")).await;
        }
    }
    Ok(())
}
