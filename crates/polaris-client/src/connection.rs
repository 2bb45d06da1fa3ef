//! 云台 TCP 连接与响应读取循环
//!
//! 读取循环跑在专用线程上：按固定块读套接字，喂给增量帧读取
//! 器，把解析好的响应投递给关联器。协议故障记录后吸收，绝不让
//! 读取循环崩溃；连接关闭时循环退出（进程由外部重启，网关不做
//! 自动重连）。

use std::io::Read;
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::{debug, info, trace, warn};

use polaris_protocol::codes::CODE_POSITION_REPORT;
use polaris_protocol::{FrameReader, parse_fields};

use crate::correlator::ResponseCorrelator;

/// 一次套接字读取的块大小
const READ_CHUNK: usize = 256;

/// 建立到云台的出站连接
///
/// 逐个尝试解析出的地址，全部失败时返回最后一个错误。
pub fn connect(host: &str, port: u16, timeout: Duration) -> std::io::Result<TcpStream> {
    let mut last_err = None;
    for addr in (host, port).to_socket_addrs()? {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(stream) => {
                info!("Connected to mount at {addr}");
                return Ok(stream);
            },
            Err(e) => last_err = Some(e),
        }
    }
    Err(last_err.unwrap_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::AddrNotAvailable,
            format!("no address resolved for {host}:{port}"),
        )
    }))
}

/// 云台响应读取循环
///
/// 阻塞运行直到连接关闭或出错。对每条完整帧：
/// - 位置上报（518）只在 trace 级别记录，不投递
/// - 载荷解析失败是协议违规：警告后吸收，继续读取
/// - 其余响应投递给关联器；没有等待者的码由关联器丢弃
pub fn response_reader_loop<R: Read>(mut stream: R, correlator: ResponseCorrelator) {
    let mut reader = FrameReader::new();
    let mut chunk = [0u8; READ_CHUNK];

    loop {
        let n = match stream.read(&mut chunk) {
            Ok(0) => {
                info!("Mount connection closed");
                break;
            },
            Ok(n) => n,
            Err(e) => {
                warn!("Mount read error: {e}");
                break;
            },
        };
        reader.extend(&chunk[..n]);

        loop {
            match reader.next_frame() {
                Ok(Some(frame)) => {
                    if frame.code == CODE_POSITION_REPORT {
                        trace!("<<< Polaris: {}@{}#", frame.code, frame.payload);
                        continue;
                    }
                    debug!("<<< Polaris: {}@{}#", frame.code, frame.payload);
                    match parse_fields(&frame.payload) {
                        Ok(fields) => correlator.deliver(frame.code, fields),
                        Err(e) => {
                            warn!("Protocol violation in response {}: {e}", frame.code);
                        },
                    }
                },
                Ok(None) => break,
                Err(e) => {
                    warn!("Framing error, resynchronizing: {e}");
                },
            }
        }
    }
}
