//! 命令行参数与网关配置
//!
//! 所有运行参数收拢在 [`GatewayConfig`] 里显式传递，不用全局
//! 可变状态。Polaris 后端必须提供观测地经纬度；Alpaca 后端的
//! 归算在 Alpaca 服务端完成，经纬度可省略。

use std::time::Duration;

use anyhow::bail;
use clap::Parser;

use polaris_astro::ObserverLocation;

/// Stellarium → Benro Polaris 协议网关
#[derive(Debug, Parser)]
#[command(name = "polaris-gateway", version, about)]
pub struct Cli {
    /// Observer latitude in degrees, north positive
    #[arg(long, allow_hyphen_values = true)]
    pub lat: Option<f64>,

    /// Observer longitude in degrees, east positive
    #[arg(long, allow_hyphen_values = true)]
    pub lon: Option<f64>,

    /// TCP port to accept Stellarium connections on
    #[arg(long, default_value_t = 10001)]
    pub listen_port: u16,

    /// Hostname or address of the Polaris mount
    #[arg(long, default_value = "192.168.0.1")]
    pub mount_host: String,

    /// Command port of the Polaris mount
    #[arg(long, default_value_t = 9090)]
    pub mount_port: u16,

    /// Seconds to wait for a goto acknowledgment before giving up
    #[arg(long, default_value_t = 30)]
    pub goto_timeout: u64,

    /// Forward pointing requests to an ASCOM Alpaca server instead of the mount
    #[arg(long)]
    pub alpaca: bool,

    /// Hostname of the Alpaca server
    #[arg(long, default_value = "127.0.0.1")]
    pub alpaca_host: String,

    /// Port of the Alpaca server
    #[arg(long, default_value_t = 5555)]
    pub alpaca_port: u16,

    /// Run the diagnostic jog/reset/align flow after mount initialization
    #[arg(long)]
    pub exercise: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// 指向请求的去向
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendKind {
    /// 直连云台命令端口
    Polaris { host: String, port: u16 },
    /// 转发给 ASCOM Alpaca 服务端
    Alpaca { host: String, port: u16 },
}

/// 网关运行配置
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayConfig {
    pub location: Option<ObserverLocation>,
    pub listen_port: u16,
    pub backend: BackendKind,
    pub goto_timeout: Duration,
    pub exercise: bool,
}

impl GatewayConfig {
    pub fn from_cli(cli: &Cli) -> anyhow::Result<Self> {
        let location = match (cli.lat, cli.lon) {
            (Some(latitude_deg), Some(longitude_deg)) => Some(ObserverLocation {
                latitude_deg,
                longitude_deg,
            }),
            (None, None) => None,
            _ => bail!("--lat and --lon must be given together"),
        };

        let backend = if cli.alpaca {
            BackendKind::Alpaca {
                host: cli.alpaca_host.clone(),
                port: cli.alpaca_port,
            }
        } else {
            BackendKind::Polaris {
                host: cli.mount_host.clone(),
                port: cli.mount_port,
            }
        };

        if location.is_none() && matches!(backend, BackendKind::Polaris { .. }) {
            bail!("the Polaris backend requires --lat and --lon");
        }

        Ok(Self {
            location,
            listen_port: cli.listen_port,
            backend,
            goto_timeout: Duration::from_secs(cli.goto_timeout),
            exercise: cli.exercise,
        })
    }
}
