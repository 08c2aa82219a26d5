//! Headless puzzle server (default binary).
//!
//! Loads a level (the first argument, or the built-in demo level) and serves
//! it over the JSON adapter until interrupted.

use anyhow::{Context, Result};

use block_gate::adapter::server::{run_server, ServerConfig};
use block_gate::engine::LevelConfig;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let level = match std::env::args().nth(1) {
        Some(path) => LevelConfig::load(&path).with_context(|| format!("failed to load level {path}"))?,
        None => {
            log::info!("no level file given, serving the demo level");
            LevelConfig::demo()
        }
    };

    if ServerConfig::is_disabled() {
        log::info!("adapter disabled via BLOCKGATE_DISABLED, nothing to serve");
        return Ok(());
    }

    let config = ServerConfig::from_env();
    let rt = tokio::runtime::Runtime::new().context("failed to create tokio runtime")?;
    rt.block_on(async {
        tokio::select! {
            result = run_server(config, level, None) => result,
            _ = tokio::signal::ctrl_c() => {
                log::info!("interrupted, shutting down");
                Ok(())
            }
        }
    })
}
