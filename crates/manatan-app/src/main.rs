use std::sync::Arc;

use clap::Parser;
use tokio::signal;

mod cli;
mod controller;
mod events;
mod logging;
mod profile;
mod state;
mod ui;

#[cfg(test)]
mod tests;

use self::cli::{Cli, Command};
use self::controller::AppController;
use self::state::{AppState, Backends};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.json_logs);

    let dir = profile::profiles_dir();
    profile::init_user_config(&dir)?;

    if let Command::NewProfile { name } = &cli.command {
        let path = profile::add_profile_from_main(&dir, name)?;
        println!("{}", path.display());
        return Ok(());
    }

    let config = profile::load_user_profile(&dir, &cli.profile)?;
    tracing::info!(profile = %cli.profile, server = %config.network.server_url, "starting");

    let backends = Backends::http(&config)?;
    let state = Arc::new(AppState::new(config, backends));
    let controller = AppController::new(state);
    let mut tasks = controller.spawn_tasks(cli.command.goal());

    if let Some(event) = cli.command.initial_event() {
        controller.send(event).await?;
    }

    let outcome = tokio::select! {
        _ = signal::ctrl_c() => {
            tracing::info!("Shutdown requested");
            Ok(())
        }
        joined = tasks.join_next() => match joined {
            Some(Ok(result)) => result,
            Some(Err(e)) => Err(anyhow::anyhow!("task panicked: {e}")),
            None => Ok(()),
        },
    };

    controller.shutdown();
    tasks.shutdown().await;
    outcome
}
