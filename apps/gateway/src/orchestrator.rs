//! 网关编排
//!
//! 启动顺序：连上后端（Polaris 需要初始化握手，失败即致命）→
//! 在本地端口监听 Stellarium → 逐连接、逐包串行处理指向请求。
//! 同一时刻只服务一个 Stellarium 连接；严格串行保证关联器按
//! 命令码的单槽不变量。

use std::io::Read;
use std::net::{TcpListener, TcpStream};
use std::thread;
use std::time::Duration;

use anyhow::Context;
use tracing::{debug, error, info, warn};

use polaris_client::{
    MountSession, ResponseCorrelator, SessionConfig, connect, response_reader_loop,
};
use stellarium_protocol::PacketReader;

use crate::alpaca::AlpacaBackend;
use crate::backend::{PointingBackend, PolarisBackend};
use crate::config::{BackendKind, GatewayConfig};

/// 建立云台连接的超时
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// 一次套接字读取的块大小
const READ_CHUNK: usize = 256;

/// 对准两步之间留给操作者的停顿
const ALIGN_PAUSE: Duration = Duration::from_secs(10);

pub fn run(config: GatewayConfig) -> anyhow::Result<()> {
    let mut backend: Box<dyn PointingBackend> = match &config.backend {
        BackendKind::Alpaca { host, port } => {
            info!("Forwarding pointing requests to Alpaca at {host}:{port}");
            Box::new(AlpacaBackend::new(host, *port)?)
        },
        BackendKind::Polaris { host, port } => {
            let location = config
                .location
                .context("the Polaris backend requires an observer location")?;
            info!(
                "Observer at lat {:.5}° lon {:.5}°",
                location.latitude_deg, location.longitude_deg
            );

            let stream = connect(host, *port, CONNECT_TIMEOUT)
                .with_context(|| format!("failed to connect to the mount at {host}:{port}"))?;
            let correlator = ResponseCorrelator::new();

            let reader_stream = stream.try_clone().context("clone mount stream")?;
            let reader_correlator = correlator.clone();
            thread::Builder::new()
                .name("mount-reader".to_string())
                .spawn(move || response_reader_loop(reader_stream, reader_correlator))
                .context("spawn mount reader thread")?;

            let mut session = MountSession::new(
                stream,
                correlator,
                SessionConfig {
                    latitude_deg: location.latitude_deg,
                    longitude_deg: location.longitude_deg,
                    response_timeout: config.goto_timeout,
                },
            );
            session.initialize().context("mount initialization failed")?;

            if config.exercise {
                run_exercise(&mut session)?;
            }

            Box::new(PolarisBackend::new(session, location))
        },
    };

    serve(config.listen_port, backend.as_mut())
}

/// 接受 Stellarium 连接并逐包处理
///
/// 一次只服务一个连接；前一个断开后接受下一个。
fn serve(port: u16, backend: &mut dyn PointingBackend) -> anyhow::Result<()> {
    let listener = TcpListener::bind(("0.0.0.0", port))
        .with_context(|| format!("failed to listen on port {port}"))?;
    info!("Listening for Stellarium on port {port}");

    loop {
        let (stream, peer) = listener.accept().context("accept Stellarium connection")?;
        info!("Stellarium connected from {peer}");
        handle_client(stream, backend)?;
        info!("Stellarium disconnected");
    }
}

fn handle_client(mut stream: TcpStream, backend: &mut dyn PointingBackend) -> anyhow::Result<()> {
    let mut packets = PacketReader::new();
    let mut chunk = [0u8; READ_CHUNK];

    loop {
        let n = match stream.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) => {
                warn!("Stellarium read error: {e}");
                break;
            },
        };
        packets.extend(&chunk[..n]);

        while let Some(request) = packets.next_request() {
            debug!(
                "<<< Stellarium: t={}µs RA {:.6}h Dec {:.6}°",
                request.timestamp_us, request.ra_hours, request.dec_deg
            );
            if let Err(e) = backend.point(&request) {
                // IO/通道类故障：云台连接大概率已失效
                error!("Pointing request failed: {e:#}");
                return Err(e);
            }
        }
    }

    if packets.pending_len() > 0 {
        warn!(
            "Stellarium closed mid-packet, {} bytes discarded",
            packets.pending_len()
        );
    }
    Ok(())
}

/// 诊断流程：每根轴短促点动，复位方位轴，走一遍两步对准
fn run_exercise(session: &mut MountSession<TcpStream>) -> anyhow::Result<()> {
    info!("Running the diagnostic flow");

    session.jog_azimuth(500)?;
    thread::sleep(Duration::from_secs(1));
    session.jog_azimuth(0)?;

    session.jog_altitude(500)?;
    thread::sleep(Duration::from_secs(1));
    session.jog_altitude(0)?;

    session.jog_rotation(500)?;
    thread::sleep(Duration::from_secs(1));
    session.jog_rotation(0)?;

    session.reset_axis(1)?;
    session.align(ALIGN_PAUSE)?;

    info!("Diagnostic flow finished");
    Ok(())
}
