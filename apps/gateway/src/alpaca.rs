//! ASCOM Alpaca 备用后端
//!
//! 把指向请求原样（赤道坐标）转发给 Alpaca 服务端的
//! `slewtocoordinatesasync` 接口，不做地平归算。HTTP 故障是
//! 非致命的指向故障：记录后继续服务下一条请求。

use std::time::Duration;

use reqwest::blocking::Client;
use tracing::{debug, warn};

use stellarium_protocol::PointingRequest;

use crate::backend::PointingBackend;

/// Alpaca 规范要求每个请求携带的客户端标识
const ALPACA_CLIENT_ID: u32 = 65432;
const ALPACA_TRANSACTION_ID: u32 = 123;

/// 单次 HTTP 请求的超时
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

pub struct AlpacaBackend {
    client: Client,
    slew_url: String,
}

impl AlpacaBackend {
    pub fn new(host: &str, port: u16) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(HTTP_TIMEOUT).build()?;
        Ok(Self {
            client,
            slew_url: slew_url(host, port),
        })
    }
}

fn slew_url(host: &str, port: u16) -> String {
    format!("http://{host}:{port}/api/v1/telescope/0/slewtocoordinatesasync")
}

impl PointingBackend for AlpacaBackend {
    fn point(&mut self, request: &PointingRequest) -> anyhow::Result<()> {
        let params = [
            ("ClientTransactionID", ALPACA_TRANSACTION_ID.to_string()),
            ("ClientID", ALPACA_CLIENT_ID.to_string()),
            ("RightAscension", format!("{:.6}", request.ra_hours)),
            ("Declination", format!("{:.6}", request.dec_deg)),
        ];
        debug!(
            ">>> Alpaca: slew RA {:.6}h Dec {:.6}°",
            request.ra_hours, request.dec_deg
        );

        match self.client.put(&self.slew_url).form(&params).send() {
            Ok(response) if response.status().is_success() => {
                debug!("<<< Alpaca: {}", response.status());
            },
            Ok(response) => {
                warn!("<<< Alpaca: slew request failed with {}", response.status());
            },
            Err(e) => {
                warn!("Alpaca request error: {e}");
            },
        }
        Ok(())
    }
}
