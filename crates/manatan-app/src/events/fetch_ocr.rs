use manatan_types::{AppEvent, OverlayStatus, TextRegion};

use crate::events::HandlerContext;

enum Plan {
    Fetch(manatan_core::generation::Ticket),
    Cached(Vec<TextRegion>),
    Skip(OverlayStatus),
}

/// Fetch regions for one image. Only the newest fetch per image applies its
/// result; failures become the error status, never an error.
pub async fn handle_fetch_ocr(
    ctx: HandlerContext,
    source_key: String,
    retry: bool,
) -> anyhow::Result<()> {
    let add_space_on_merge = {
        let config = ctx.state.config.read().await;
        if !config.ocr.enabled {
            tracing::debug!(source = %source_key, "OCR disabled");
            ctx.emit(AppEvent::OcrStatusUpdate {
                source_key,
                status: OverlayStatus::Idle,
            })
            .await;
            return Ok(());
        }
        config.ocr.add_space_on_merge
    };

    let plan = {
        let mut store = ctx.state.store.write().await;
        let should_fetch = if retry {
            store.regions(&source_key).is_none()
        } else {
            store.needs_fetch(&source_key)
        };
        match store.regions(&source_key) {
            Some(regions) => Plan::Cached(regions.to_vec()),
            None if should_fetch => Plan::Fetch(store.begin_fetch(&source_key)),
            None => Plan::Skip(store.status(&source_key)),
        }
    };

    let ticket = match plan {
        Plan::Fetch(ticket) => ticket,
        Plan::Cached(regions) => {
            ctx.emit(AppEvent::RegionsReady {
                source_key,
                regions,
            })
            .await;
            return Ok(());
        }
        Plan::Skip(status) => {
            tracing::debug!(source = %source_key, status = status.as_str(), "fetch already settled");
            return Ok(());
        }
    };

    ctx.emit(AppEvent::OcrStatusUpdate {
        source_key: source_key.clone(),
        status: OverlayStatus::Loading,
    })
    .await;

    let result = ctx
        .state
        .backends
        .ocr
        .fetch_regions(&source_key, add_space_on_merge)
        .await;

    match result {
        Ok(regions) => {
            let applied = {
                let mut store = ctx.state.store.write().await;
                store.ingest_if_current(&ticket, regions.clone())
            };
            if applied {
                tracing::info!(source = %source_key, regions = regions.len(), "OCR ready");
                ctx.emit(AppEvent::RegionsReady {
                    source_key,
                    regions,
                })
                .await;
            }
        }
        Err(e) => {
            tracing::error!(source = %source_key, "OCR failed: {e}");
            let marked = {
                let mut store = ctx.state.store.write().await;
                store.fail_if_current(&ticket)
            };
            if marked {
                ctx.emit(AppEvent::OcrStatusUpdate {
                    source_key,
                    status: OverlayStatus::Error,
                })
                .await;
            }
        }
    }

    Ok(())
}
