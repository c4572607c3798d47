mod app;
mod commands;
mod config;
mod effects;
mod logging;
mod render;

use anyhow::Context;
use log::LevelFilter;

use crate::config::AppConfig;

fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;

    let level = if config.debug_logging {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    logging::initialize(config.log_destination, level);
    if let Some(operator) = &config.operator {
        desk_logging::set_session_tag(operator.clone());
    }

    app::run(&config)
}
