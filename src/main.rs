use std::sync::{Arc, Mutex};

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use lottery_server::config::Config;
use lottery_server::lottery;
use lottery_server::server::Server;
use lottery_server::sink::{FileSink, SharedSink};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let sink: SharedSink = Arc::new(Mutex::new(FileSink::open(&config.winners_file)?));

    let server = Server::bind(
        &config.listen,
        config.workers(),
        config.client_timeout(),
        sink,
        Arc::new(lottery::is_winner),
    )
    .await?;

    info!(
        addr = %server.local_addr()?,
        workers = config.workers(),
        winners_file = %config.winners_file.display(),
        "lottery server listening"
    );

    server.run(shutdown_signal()).await;

    Ok(())
}

#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm =
        signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = sigterm.recv() => {}
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
