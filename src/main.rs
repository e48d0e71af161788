#![deny(clippy::implicit_return)]
#![allow(clippy::needless_return)]

mod application;
mod configuration;
mod domain;
mod infrastructure;

use std::env;
use std::process;
use std::time::Duration;

use anyhow::Error;
use anyhow::Result;
use domain::models::Action;
use domain::models::Event;
use infrastructure::gateways::GatewayManager;
use tokio::sync::mpsc;
use tokio::task;
use yansi::Paint;

use crate::application::cli;
use crate::application::ui;
use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::services::actions::ActionsService;

fn handle_error(err: Error) {
    eprintln!(
        "{}",
        Paint::red(format!(
            "Oh no! Star Buddy got lost in space with the following app version and error.\n\nVersion: {}\nError: {:?}",
            env!("CARGO_PKG_VERSION"),
            err
        ))
    );

    let backtrace = err.backtrace();
    if backtrace.to_string() == "disabled backtrace" {
        let args = env::args().collect::<Vec<String>>().join(" ");
        eprintln!("\nRunning the following can help explain further what the issue is:");
        eprintln!("\nRUST_BACKTRACE=1 {args}");
    } else {
        eprintln!("\n{}", backtrace);
    }

    process::exit(1);
}

async fn run() -> Result<()> {
    let gateway = GatewayManager::get(&Config::get(ConfigKey::Gateway))?;
    if let Err(err) = gateway.health_check().await {
        tracing::warn!(gateway = gateway.name().to_string(), error = ?err, "gateway health check failed");
    }

    let phase_delay = Duration::from_millis(Config::get_millis(ConfigKey::LoadingPhaseDelay));
    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();
    let (event_tx, event_rx) = mpsc::unbounded_channel::<Event>();

    let mut background_futures = task::JoinSet::new();
    background_futures.spawn(async move {
        return ActionsService::start(gateway, phase_delay, event_tx, &mut action_rx).await;
    });

    let ui_future = ui::start(action_tx, event_rx);

    let res = tokio::select!(
        res = background_futures.join_next() => match res {
            Some(joined) => joined?,
            None => Ok(()),
        },
        res = ui_future => res,
    );

    return res;
}

#[tokio::main]
async fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        ui::destruct_terminal_for_panic();
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));

    let log_path = cli::log_path();
    let log_dir = log_path
        .parent()
        .map(|dir| return dir.to_path_buf())
        .unwrap_or_else(env::temp_dir);

    let file_appender = tracing_appender::rolling::never(log_dir, "debug.log");
    let (writer, _guard) = tracing_appender::non_blocking(file_appender);
    if env::var("RUST_LOG")
        .unwrap_or_else(|_| return "".to_string())
        .contains("star_buddy")
    {
        tracing_subscriber::fmt()
            .json()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(writer)
            .init();
    }

    match cli::parse().await {
        Ok(true) => (),
        Ok(false) => process::exit(0),
        Err(err) => {
            handle_error(err);
            return;
        }
    }

    if let Err(err) = run().await {
        ui::destruct_terminal_for_panic();
        handle_error(err);
    }

    process::exit(0);
}
