use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

/// Lottery aggregation server: agencies submit contestant batches over TCP
/// and poll for the global winner total.
#[derive(Parser, Debug)]
#[command(name = "lottery-server", version)]
pub struct Config {
    /// Address to listen on
    #[arg(short, long, default_value = "0.0.0.0:3600")]
    pub listen: String,

    /// Number of worker tasks (defaults to available cores minus one)
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Seconds a client may stall before its connection is dropped
    #[arg(long, default_value_t = 5)]
    pub client_timeout: u64,

    /// File winner records are appended to
    #[arg(long, default_value = "winners.csv")]
    pub winners_file: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Config {
    pub fn workers(&self) -> usize {
        self.workers.unwrap_or_else(default_workers)
    }

    pub fn client_timeout(&self) -> Duration {
        Duration::from_secs(self.client_timeout)
    }
}

// Leave one core for the accept-side bookkeeping, never go below one worker.
fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|cores| cores.get().saturating_sub(1))
        .unwrap_or(1)
        .max(1)
}
