//! Runs the reference network once and writes `rastr.csv` (spike raster,
//! 1-based neuron ids) and `oscill.csv` (population-mean potential per step)
//! into the working directory. Log level follows `RUST_LOG` (default `info`).

mod app;
mod backend;
mod sink;

use anyhow::Result;
use app::App;
use backend::{compact_engine, full_engine};
use izhnet_core::NetworkConfig;
use tracing_subscriber::EnvFilter;

/// Fixed so repeated runs reproduce the same files.
const DEFAULT_SEED: u64 = 1;
/// Keep full V/U/y history in memory. Output files are identical either way.
const KEEP_HISTORY: bool = false;

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = NetworkConfig::default();
    if KEEP_HISTORY {
        App::new(full_engine(config, DEFAULT_SEED)?, ".").run()?;
    } else {
        App::new(compact_engine(config, DEFAULT_SEED)?, ".").run()?;
    }
    Ok(())
}
