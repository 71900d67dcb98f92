use anyhow::Context;
use envcfg_domain::config::{AppConfig, LoggingConfig};
use envcfg_kernel::config::load_config;
use envcfg_logger::{Format, Logger};
use envcfg_server::Server;

fn init_logger(cfg: &LoggingConfig) -> anyhow::Result<Logger> {
    let format = if cfg.json { Format::Json } else { Format::Full };
    let builder = Logger::builder()
        .name(env!("CARGO_PKG_NAME"))
        .level_str(&cfg.level)?
        .directive(cfg.filter.clone().unwrap_or_default());

    let logger = match &cfg.path {
        Some(dir) => builder.file(dir).file_format(format).init(),
        None => builder.init(),
    };

    logger.context("Failed to initialize logging")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg: AppConfig =
        load_config(Some("server")).context("Critical: Configuration is malformed")?;

    let _log = init_logger(&cfg.logging)?;

    Server::builder().config(cfg).build()?.run().await
}
