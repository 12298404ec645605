use manatan_client::EpisodeQuery;
use manatan_types::AppEvent;

use crate::events::HandlerContext;

pub async fn handle_jimaku_search(
    ctx: HandlerContext,
    title: String,
    anilist_id: Option<u64>,
    episode: u32,
) -> anyhow::Result<()> {
    let query = EpisodeQuery {
        title: Some(title.trim().to_string()).filter(|t| !t.is_empty()),
        anilist_id,
        episode,
    };

    match ctx.state.backends.jimaku.episode_files(&query).await {
        Ok(files) => {
            tracing::info!(episode, files = files.len(), "Jimaku search done");
            ctx.emit(AppEvent::JimakuFiles(files)).await;
        }
        Err(e) => {
            tracing::warn!("Jimaku search failed: {}", e);
            ctx.fail("jimaku", e).await;
        }
    }
    Ok(())
}
