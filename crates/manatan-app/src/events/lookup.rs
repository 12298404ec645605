use manatan_types::{AppEvent, LookupResponse};

use crate::events::HandlerContext;

/// Only the newest lookup's reply is shown.
pub async fn handle_lookup(
    ctx: HandlerContext,
    text: String,
    byte_offset: usize,
) -> anyhow::Result<()> {
    let grouping = {
        let config = ctx.state.config.read().await;
        if !config.dictionary.enabled {
            tracing::debug!("Dictionary disabled, skipping lookup");
            return Ok(());
        }
        config.dictionary.grouping_mode
    };

    let generation = ctx.state.lookups.next();
    let byte_offset = byte_offset.min(text.len());
    let result = ctx
        .state
        .backends
        .lookup
        .lookup(&text, byte_offset, grouping)
        .await;

    if !ctx.state.lookups.is_current(generation) {
        tracing::debug!(generation, "dropping stale lookup reply");
        return Ok(());
    }

    match result {
        Ok(LookupResponse::Loading) => ctx.emit(AppEvent::LookupWarmingUp).await,
        Ok(LookupResponse::Entries(entries)) => {
            tracing::debug!(entries = entries.len(), "lookup results");
            ctx.emit(AppEvent::ShowResults(entries)).await;
        }
        Err(e) => {
            tracing::warn!("Lookup failed: {}", e);
            ctx.fail("lookup", e).await;
        }
    }

    Ok(())
}
