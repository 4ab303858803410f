use anyhow::{Context, Result};

use enginger_engine::config::ConfigData;
use enginger_engine::device::GpuInit;
use enginger_engine::logging::{init_logging, LoggingConfig};
use enginger_engine::paths::{PathRole, ResourceTree};
use enginger_engine::scene::BootstrapScene;
use enginger_engine::window::{Runtime, RuntimeConfig};

fn run() -> Result<()> {
    let mut paths = ResourceTree::from_env();
    let config_path = paths
        .absolute_path(PathRole::ConfigFile)
        .context("failed to resolve the project root")?;
    let config = ConfigData::load(&config_path)?;

    let runtime = RuntimeConfig::from(&config);
    Runtime::run(runtime, GpuInit::default(), BootstrapScene::new(paths, config))
}

fn main() {
    init_logging(LoggingConfig::default());
    log::info!("starting enGinger {}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run() {
        log::error!("{e:#}");
        std::process::exit(1);
    }
}
