//! Native messaging host for the activity logger bridge.
//!
//! The browser starts this binary when the extension first connects and
//! talks to it over stdin/stdout. Logs go to stderr, which the browser
//! forwards to its console.

use activity_bridge::host::{NativeHost, StateStore};
use activity_bridge::HostConfig;
use log::{error, info};
use std::io;

fn main() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .init();

    let config = match HostConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Initialization error: {e}");
            std::process::exit(1);
        }
    };

    let store = StateStore::new(&config);
    info!("Native host started, writing state to {}", store.path().display());

    let mut host = NativeHost::new(io::stdin().lock(), io::stdout().lock(), store);

    // Runs until the browser closes stdin
    if let Err(e) = host.run() {
        error!("Native host error: {e}");
        std::process::exit(1);
    }
}
