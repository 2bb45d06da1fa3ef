//! 指向后端
//!
//! 把 Stellarium 的赤道坐标指向请求落到具体设备上。指向故障
//! （转向被拒、响应超时）是非致命的：记录后返回 Ok，下一条请
//! 求照常处理；IO/通道类故障上抛，由编排层决定收场。

use std::io::Write;

use tracing::{debug, error, warn};

use polaris_astro::{ObserverLocation, equatorial_to_horizontal};
use polaris_client::{ClientError, GotoOutcome, MountSession};
use stellarium_protocol::PointingRequest;

/// 指向请求的落点
pub trait PointingBackend {
    fn point(&mut self, request: &PointingRequest) -> anyhow::Result<()>;
}

/// 直连云台的后端：归算到地平坐标后下发 goto
pub struct PolarisBackend<W: Write> {
    session: MountSession<W>,
    location: ObserverLocation,
}

impl<W: Write> PolarisBackend<W> {
    pub fn new(session: MountSession<W>, location: ObserverLocation) -> Self {
        Self { session, location }
    }
}

impl<W: Write> PointingBackend for PolarisBackend<W> {
    fn point(&mut self, request: &PointingRequest) -> anyhow::Result<()> {
        let target = equatorial_to_horizontal(
            request.ra_hours,
            request.dec_deg,
            request.timestamp_us,
            self.location,
        );
        debug!(
            "Target RA {:.6}h Dec {:.6}° → Az {:.5}° Alt {:.5}°",
            request.ra_hours, request.dec_deg, target.azimuth_deg, target.altitude_deg
        );

        match self.session.goto(target.azimuth_deg, target.altitude_deg, true) {
            Ok(GotoOutcome::Completed(_)) => Ok(()),
            Ok(GotoOutcome::Rejected { ret }) => {
                error!(
                    "Goto Az.:{:.5} Alt.:{:.5} rejected by the mount (ret={ret})",
                    target.azimuth_deg, target.altitude_deg
                );
                Ok(())
            },
            Err(e @ ClientError::ResponseTimeout { .. }) => {
                // 超时按指向故障处理，会话已回到 Ready
                warn!(
                    "Goto Az.:{:.5} Alt.:{:.5} timed out: {e}",
                    target.azimuth_deg, target.altitude_deg
                );
                Ok(())
            },
            Err(e) => Err(e.into()),
        }
    }
}
