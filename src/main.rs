mod config;
mod cooldown;
mod db;
mod farcaster;
mod modules;
mod onchain;
mod utils;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, Layer,
};

const LOGS_DIR: &str = "data/logs";

fn init_tracing() -> WorkerGuard {
    let file_appender = tracing_appender::rolling::daily(LOGS_DIR, "faucet.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_filter(LevelFilter::INFO))
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_writer(file_writer)
                .with_filter(LevelFilter::INFO),
        )
        .init();

    guard
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let _guard = init_tracing();

    modules::menu().await
}
