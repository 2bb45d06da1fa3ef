//! 云台会话状态机
//!
//! 对命令协议的语义时序建模：
//!
//! ```text
//! Disconnected → Initializing → Ready ⇄ Slewing
//! ```
//!
//! - 初始化：查询当前模式（284），不在天文模式或对准未完成
//!   则致命失败（补救在云台自己的配套 App 中完成，网关不尝试）
//! - goto：先无条件停跟踪（531，不等响应），把方位角换算成
//!   云台的有符号偏航约定，发 519 并等待响应；`ret == 1` 表示
//!   "进行中"，按协议约定再等第二条响应才返回
//! - 点动（532/533/534）、轴复位（523）、对准（530）均为
//!   fire-and-forget，只用于诊断流程，不参与主指向路径

use std::io::Write;
use std::time::Duration;

use tracing::{debug, info, trace, warn};

use polaris_protocol::codes::{CODE_GET_MODE, CODE_SLEW, TRACK_SETUP_INCOMPLETE};
use polaris_protocol::{MountCommand, MountResponse, codes};

use crate::correlator::{ResponseCorrelator, ResponseFields};
use crate::error::ClientError;
use crate::mode::MountMode;

/// 会话状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Initializing,
    Ready,
    Slewing,
}

/// 会话配置
///
/// 观测地经纬度随 519 命令下发给云台；响应超时到期按指向故障
/// 处理而非无限期等待。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionConfig {
    /// 观测地纬度（度，北为正）
    pub latitude_deg: f64,
    /// 观测地经度（度，东为正）
    pub longitude_deg: f64,
    /// 等待关联响应的超时
    pub response_timeout: Duration,
}

/// goto 的结果
///
/// 转向被云台拒绝是非致命的指向故障：记录后会话回到 `Ready`，
/// 下一条指向请求照常处理。
#[derive(Debug, Clone, PartialEq)]
pub enum GotoOutcome {
    /// 转向已受理；携带最终（双重确认时为第二条）响应的字段
    Completed(ResponseFields),
    /// 云台报告转向失败（`ret` 非 0/1，典型为 -1）
    Rejected { ret: i64 },
}

/// 方位角 → 云台有符号偏航角
///
/// 云台期望 -180° < yaw ≤ 180°：东半圈取负方位角，西半圈取
/// 360° 的补角。恰好 180° 走 else 分支，得 -180°。
pub fn azimuth_to_yaw(azimuth_deg: f64) -> f64 {
    if azimuth_deg > 180.0 {
        360.0 - azimuth_deg
    } else {
        -azimuth_deg
    }
}

/// 云台会话
///
/// 持有出站写端；入站响应经由读取线程投递到共享的关联器。
pub struct MountSession<W: Write> {
    writer: W,
    correlator: ResponseCorrelator,
    config: SessionConfig,
    state: SessionState,
}

impl<W: Write> MountSession<W> {
    pub fn new(writer: W, correlator: ResponseCorrelator, config: SessionConfig) -> Self {
        Self {
            writer,
            correlator,
            config,
            state: SessionState::Disconnected,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    fn send(&mut self, command: &MountCommand) -> Result<(), ClientError> {
        let wire = command.encode();
        trace!(">>> Polaris: {wire}");
        self.writer.write_all(wire.as_bytes())?;
        self.writer.flush()?;
        Ok(())
    }

    /// 初始化握手
    ///
    /// 失败是致命启动故障：向操作者报告后进程退出，网关不做
    /// 补救（对准要在云台配套 App 里完成）。
    pub fn initialize(&mut self) -> Result<(), ClientError> {
        self.state = SessionState::Initializing;
        info!("Polaris communication init...");

        let pending = self.correlator.register(CODE_GET_MODE)?;
        self.send(&MountCommand::get_current_mode())?;
        let fields = match pending.recv_timeout(self.config.response_timeout) {
            Ok(fields) => fields,
            Err(e) => {
                self.state = SessionState::Disconnected;
                return Err(e);
            },
        };

        let resp = MountResponse {
            code: CODE_GET_MODE,
            fields,
        };
        let mode_raw = resp.int_field("mode")?.unwrap_or(-1);
        if MountMode::from(mode_raw) != MountMode::Astro {
            self.state = SessionState::Disconnected;
            return Err(ClientError::NotAstroMode { mode: mode_raw });
        }
        if resp.int_field("track")? == Some(TRACK_SETUP_INCOMPLETE) {
            self.state = SessionState::Disconnected;
            return Err(ClientError::AlignmentIncomplete);
        }

        self.state = SessionState::Ready;
        info!("Polaris communication init... done");
        Ok(())
    }

    /// 转向目标方向
    ///
    /// `azimuth_deg` 自北向东 [0,360)，`altitude_deg` [-90,90]。
    /// 严格串行：上游必须等本次返回后才发起下一次 goto，以维持
    /// 关联器按命令码的单槽不变量。
    pub fn goto(
        &mut self,
        azimuth_deg: f64,
        altitude_deg: f64,
        track: bool,
    ) -> Result<GotoOutcome, ClientError> {
        if self.state != SessionState::Ready {
            return Err(ClientError::NotReady { state: self.state });
        }

        // 协议要求 goto 前无条件停跟踪，不等回应
        debug!(">>> Polaris: stop tracking before goto");
        self.send(&MountCommand::set_tracking(false))?;

        let yaw = azimuth_to_yaw(azimuth_deg);
        info!("Goto Az.:{azimuth_deg:.5} Alt.:{altitude_deg:.5} (yaw {yaw:.5})");

        let pending = self.correlator.register(CODE_SLEW)?;
        self.state = SessionState::Slewing;
        let outcome = self.await_slew_ack(&pending, yaw, altitude_deg, track);
        // 无论受理与否，会话都回到 Ready；goto 失败不传染给进程
        self.state = SessionState::Ready;
        outcome
    }

    fn await_slew_ack(
        &mut self,
        pending: &crate::correlator::PendingResponse,
        yaw: f64,
        pitch: f64,
        track: bool,
    ) -> Result<GotoOutcome, ClientError> {
        self.send(&MountCommand::slew_to(
            yaw,
            pitch,
            self.config.latitude_deg,
            self.config.longitude_deg,
            track,
        ))?;

        let mut fields = pending.recv_timeout(self.config.response_timeout)?;
        let mut ret = ret_of(&fields)?;
        if ret == Some(1) {
            // 双重确认是 goto 契约的一部分：第一条 ret:1 表示
            // "进行中"，真正的结果在第二条响应里
            debug!("<<< Polaris: goto in progress, awaiting second acknowledgment");
            fields = pending.recv_timeout(self.config.response_timeout)?;
            ret = ret_of(&fields)?;
        }

        match ret {
            None | Some(0) | Some(1) => Ok(GotoOutcome::Completed(fields)),
            Some(ret) => {
                warn!("<<< Polaris: slew rejected, ret={ret}");
                Ok(GotoOutcome::Rejected { ret })
            },
        }
    }

    /// 启停跟踪（fire-and-forget）
    pub fn set_tracking(&mut self, enabled: bool) -> Result<(), ClientError> {
        if enabled {
            info!(">>> Polaris: start tracking");
        } else {
            info!(">>> Polaris: stop tracking");
        }
        self.send(&MountCommand::set_tracking(enabled))
    }

    /// 方位轴点动（诊断流程用）
    pub fn jog_azimuth(&mut self, speed: i32) -> Result<(), ClientError> {
        self.send(&MountCommand::jog(codes::CODE_JOG_AZIMUTH, speed))
    }

    /// 俯仰轴点动（诊断流程用）
    pub fn jog_altitude(&mut self, speed: i32) -> Result<(), ClientError> {
        self.send(&MountCommand::jog(codes::CODE_JOG_ALTITUDE, speed))
    }

    /// 旋转轴点动（诊断流程用）
    pub fn jog_rotation(&mut self, speed: i32) -> Result<(), ClientError> {
        self.send(&MountCommand::jog(codes::CODE_JOG_ROTATION, speed))
    }

    /// 轴复位（诊断流程用）
    pub fn reset_axis(&mut self, axis: u8) -> Result<(), ClientError> {
        self.send(&MountCommand::reset_axis(axis))
    }

    /// 两步对准
    ///
    /// 两步之间停顿 `pause`，给操作者时间在配套 App 中把目标星
    /// 居中。两步都不等待响应。
    pub fn align(&mut self, pause: Duration) -> Result<(), ClientError> {
        info!(">>> Polaris: alignment step 1, center the target star in the companion app");
        self.send(&MountCommand::align_step(1))?;
        std::thread::sleep(pause);
        info!(">>> Polaris: alignment step 2");
        self.send(&MountCommand::align_step(2))
    }
}

fn ret_of(fields: &ResponseFields) -> Result<Option<i64>, ClientError> {
    match fields.get("ret") {
        None => Ok(None),
        Some(value) => value.parse::<i64>().map(Some).map_err(|_| {
            ClientError::Protocol(polaris_protocol::ProtocolError::NonIntegerField {
                field: "ret".to_string(),
                value: value.clone(),
            })
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::thread;

    /// 捕获所有写出字节的共享写端
    #[derive(Clone, Default)]
    struct SharedWriter(Arc<Mutex<Vec<u8>>>);

    impl SharedWriter {
        fn take_string(&self) -> String {
            let mut buf = self.0.lock().unwrap();
            String::from_utf8(std::mem::take(&mut *buf)).unwrap()
        }
    }

    impl Write for SharedWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn fields(pairs: &[(&str, &str)]) -> ResponseFields {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn make_session(writer: SharedWriter, correlator: ResponseCorrelator) -> MountSession<SharedWriter> {
        MountSession::new(
            writer,
            correlator,
            SessionConfig {
                latitude_deg: 44.42,
                longitude_deg: 5.12,
                response_timeout: Duration::from_secs(1),
            },
        )
    }

    #[test]
    fn yaw_convention_table() {
        assert_eq!(azimuth_to_yaw(0.0), 0.0);
        assert_eq!(azimuth_to_yaw(181.0), 179.0);
        assert_eq!(azimuth_to_yaw(350.0), 10.0);
        // 边界：恰好 180 走 else 分支
        assert_eq!(azimuth_to_yaw(180.0), -180.0);
        assert_eq!(azimuth_to_yaw(90.0), -90.0);
    }

    #[test]
    fn initialize_happy_path() {
        let writer = SharedWriter::default();
        let correlator = ResponseCorrelator::new();
        let mut session = make_session(writer.clone(), correlator.clone());
        assert_eq!(session.state(), SessionState::Disconnected);

        let c = correlator.clone();
        let responder = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            c.deliver(CODE_GET_MODE, fields(&[("mode", "8"), ("track", "1")]));
        });

        session.initialize().unwrap();
        responder.join().unwrap();
        assert_eq!(session.state(), SessionState::Ready);
        assert_eq!(writer.take_string(), "1&284&2&-1#");
    }

    #[test]
    fn initialize_rejects_wrong_mode() {
        let correlator = ResponseCorrelator::new();
        let mut session = make_session(SharedWriter::default(), correlator.clone());

        let c = correlator.clone();
        let responder = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            c.deliver(CODE_GET_MODE, fields(&[("mode", "1")]));
        });

        assert!(matches!(
            session.initialize(),
            Err(ClientError::NotAstroMode { mode: 1 })
        ));
        responder.join().unwrap();
        assert_eq!(session.state(), SessionState::Disconnected);
    }

    #[test]
    fn initialize_rejects_incomplete_alignment() {
        let correlator = ResponseCorrelator::new();
        let mut session = make_session(SharedWriter::default(), correlator.clone());

        let c = correlator.clone();
        let responder = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            c.deliver(CODE_GET_MODE, fields(&[("mode", "8"), ("track", "3")]));
        });

        assert!(matches!(
            session.initialize(),
            Err(ClientError::AlignmentIncomplete)
        ));
        responder.join().unwrap();
    }

    fn ready_session(
        writer: SharedWriter,
        correlator: ResponseCorrelator,
    ) -> MountSession<SharedWriter> {
        let mut session = make_session(writer, correlator);
        session.state = SessionState::Ready;
        session
    }

    #[test]
    fn goto_sends_stop_tracking_then_slew() {
        let writer = SharedWriter::default();
        let correlator = ResponseCorrelator::new();
        let mut session = ready_session(writer.clone(), correlator.clone());

        let c = correlator.clone();
        let responder = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            c.deliver(CODE_SLEW, fields(&[("ret", "0")]));
        });

        let outcome = session.goto(181.0, 45.0, true).unwrap();
        responder.join().unwrap();
        assert!(matches!(outcome, GotoOutcome::Completed(_)));
        assert_eq!(session.state(), SessionState::Ready);

        let sent = writer.take_string();
        let stop = "1&531&3&state:0;speed:0;#";
        assert!(sent.starts_with(stop), "sent={sent}");
        // 方位角 181° → 偏航 179°
        assert!(sent.contains("yaw:179.00000;"), "sent={sent}");
        assert!(sent.contains("pitch:45.00000;"), "sent={sent}");
        assert!(sent.contains("lat:44.42000;"), "sent={sent}");
        assert!(sent.contains("lng:5.12000;"), "sent={sent}");
        assert!(sent.contains("track:1;"), "sent={sent}");
    }

    #[test]
    fn goto_double_acknowledgment_returns_second_fields() {
        let writer = SharedWriter::default();
        let correlator = ResponseCorrelator::new();
        let mut session = ready_session(writer, correlator.clone());

        let c = correlator.clone();
        let responder = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            c.deliver(CODE_SLEW, fields(&[("ret", "1")]));
            thread::sleep(Duration::from_millis(20));
            c.deliver(CODE_SLEW, fields(&[("ret", "0"), ("phase", "done")]));
        });

        let outcome = session.goto(10.0, 30.0, false).unwrap();
        responder.join().unwrap();
        match outcome {
            GotoOutcome::Completed(f) => {
                // 返回的是第二条响应的字段
                assert_eq!(f.get("ret").map(String::as_str), Some("0"));
                assert_eq!(f.get("phase").map(String::as_str), Some("done"));
            },
            other => panic!("expected Completed, got {other:?}"),
        }
    }

    #[test]
    fn goto_rejection_is_non_fatal() {
        let writer = SharedWriter::default();
        let correlator = ResponseCorrelator::new();
        let mut session = ready_session(writer, correlator.clone());

        let c = correlator.clone();
        let responder = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            c.deliver(CODE_SLEW, fields(&[("ret", "-1")]));
        });

        let outcome = session.goto(90.0, 10.0, true).unwrap();
        responder.join().unwrap();
        assert_eq!(outcome, GotoOutcome::Rejected { ret: -1 });
        // 会话仍可用于下一条指向请求
        assert_eq!(session.state(), SessionState::Ready);
    }

    #[test]
    fn goto_timeout_restores_ready() {
        let mut session = MountSession::new(
            SharedWriter::default(),
            ResponseCorrelator::new(),
            SessionConfig {
                latitude_deg: 0.0,
                longitude_deg: 0.0,
                response_timeout: Duration::from_millis(10),
            },
        );
        session.state = SessionState::Ready;

        assert!(matches!(
            session.goto(0.0, 0.0, false),
            Err(ClientError::ResponseTimeout { code: 519 })
        ));
        assert_eq!(session.state(), SessionState::Ready);
        // 超时后槽已释放，可立即重试
        assert!(matches!(
            session.goto(0.0, 0.0, false),
            Err(ClientError::ResponseTimeout { code: 519 })
        ));
    }

    #[test]
    fn goto_requires_ready_state() {
        let mut session = make_session(SharedWriter::default(), ResponseCorrelator::new());
        assert!(matches!(
            session.goto(0.0, 0.0, false),
            Err(ClientError::NotReady { .. })
        ));
    }

    #[test]
    fn diagnostic_commands_are_fire_and_forget() {
        let writer = SharedWriter::default();
        let mut session = ready_session(writer.clone(), ResponseCorrelator::new());
        session.jog_azimuth(500).unwrap();
        session.jog_altitude(-200).unwrap();
        session.jog_rotation(0).unwrap();
        session.reset_axis(1).unwrap();
        session.align(Duration::from_millis(1)).unwrap();

        let sent = writer.take_string();
        assert!(sent.contains("1&532&3&state:1;speed:500;#"));
        assert!(sent.contains("1&533&3&state:1;speed:-200;#"));
        assert!(sent.contains("1&534&3&state:0;speed:0;#"));
        assert!(sent.contains("1&523&3&axis:1;#"));
        assert!(sent.contains("1&530&3&state:1;#"));
        assert!(sent.contains("1&530&3&state:2;#"));
    }
}
