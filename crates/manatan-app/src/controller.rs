use std::sync::Arc;

use kanal::{AsyncReceiver, AsyncSender};
use manatan_types::AppEvent;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::events::{HandlerContext, event_loop};
use crate::state::AppState;
use crate::ui::{Goal, ui_loop};

/// Centralized channel management
pub struct ChannelSet {
    pub app_to_ui: (AsyncSender<AppEvent>, AsyncReceiver<AppEvent>),
    pub ui_to_app: (AsyncSender<AppEvent>, AsyncReceiver<AppEvent>),
}

impl ChannelSet {
    pub fn new() -> Self {
        Self {
            app_to_ui: kanal::bounded_async(256), // region and poll bursts
            ui_to_app: kanal::bounded_async(64),  // user actions and re-polls
        }
    }
}

/// Application controller for task spawning and lifecycle
pub struct AppController {
    channels: ChannelSet,
    state: Arc<AppState>,
    cancel_token: CancellationToken,
}

impl AppController {
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            channels: ChannelSet::new(),
            state,
            cancel_token: CancellationToken::new(),
        }
    }

    pub fn handler_context(&self) -> HandlerContext {
        HandlerContext {
            state: self.state.clone(),
            app_to_ui_tx: self.channels.app_to_ui.0.clone(),
            requeue_tx: self.channels.ui_to_app.0.clone(),
            cancel: self.cancel_token.child_token(),
        }
    }

    pub fn spawn_tasks(&self, goal: Goal) -> JoinSet<anyhow::Result<()>> {
        let mut tasks = JoinSet::new();

        // Event loop
        tasks.spawn(event_loop(
            self.handler_context(),
            self.channels.ui_to_app.1.clone(),
        ));

        // UI loop
        tasks.spawn(ui_loop(
            self.channels.app_to_ui.1.clone(),
            self.state.config.clone(),
            goal,
            self.cancel_token.child_token(),
        ));

        tasks
    }

    /// Push a user action into the event loop.
    pub async fn send(&self, event: AppEvent) -> anyhow::Result<()> {
        self.channels.ui_to_app.0.send(event).await?;
        Ok(())
    }

    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }
}
