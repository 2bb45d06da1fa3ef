//! Stellarium → Benro Polaris 协议网关
//!
//! 在本地端口接收 Stellarium 的二进制指向包，归算成地平坐标后
//! 翻译给 Benro Polaris 云台的 ASCII 命令协议；或者（`--alpaca`）
//! 原样转发给一台 ASCOM Alpaca 服务端。

mod alpaca;
mod backend;
mod config;
mod orchestrator;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{Cli, GatewayConfig};

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = GatewayConfig::from_cli(&cli)?;

    ctrlc::set_handler(|| {
        info!("Interrupted, shutting down");
        std::process::exit(0);
    })
    .context("install Ctrl-C handler")?;

    orchestrator::run(config)
}
