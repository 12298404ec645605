use manatan_core::region::commit_edit;
use manatan_core::store::MergeSeparator;
use manatan_types::AppEvent;

use crate::events::HandlerContext;

async fn publish(ctx: &HandlerContext, source_key: String) {
    let regions = {
        let store = ctx.state.store.read().await;
        store.regions(&source_key).map(<[_]>::to_vec)
    };
    if let Some(regions) = regions {
        ctx.emit(AppEvent::RegionsReady {
            source_key,
            regions,
        })
        .await;
    }
}

/// `text` is the edited text with real newlines.
pub async fn handle_edit(ctx: &HandlerContext, source_key: String, index: usize, text: String) {
    let changed = {
        let mut store = ctx.state.store.write().await;
        let stored = store
            .regions(&source_key)
            .and_then(|regions| regions.get(index))
            .map(|region| region.text.clone());
        match stored.and_then(|stored| commit_edit(&stored, &text)) {
            Some(new_text) => store.edit(&source_key, index, new_text),
            None => false,
        }
    };
    if changed {
        publish(ctx, source_key).await;
    }
}

pub async fn handle_merge(ctx: &HandlerContext, source_key: String, first: usize, second: usize) {
    let separator = {
        let config = ctx.state.config.read().await;
        MergeSeparator::from_add_space(config.ocr.add_space_on_merge)
    };
    let merged = {
        let mut store = ctx.state.store.write().await;
        store.merge(&source_key, first, second, separator)
    };
    if merged {
        tracing::debug!(source = %source_key, first, second, "regions merged");
        publish(ctx, source_key).await;
    }
}

pub async fn handle_delete(ctx: &HandlerContext, source_key: String, index: usize) {
    let deleted = {
        let mut store = ctx.state.store.write().await;
        store.delete(&source_key, index)
    };
    if deleted {
        publish(ctx, source_key).await;
    }
}
