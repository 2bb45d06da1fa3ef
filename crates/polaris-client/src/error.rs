//! 会话层错误类型定义
//!
//! 四类故障的类型化表达：致命的启动故障（连接失败、模式/对准
//! 检查不通过）由顶层上浮退出；协议故障与指向故障由各自组件
//! 记录日志后吸收，不得越过组件边界展开。

use polaris_protocol::ProtocolError;
use thiserror::Error;

use crate::session::SessionState;

/// 会话层错误类型
#[derive(Error, Debug)]
pub enum ClientError {
    /// 套接字 IO 错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// 协议违规（帧头/载荷不合法）
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// 云台不在天文跟踪模式（致命启动故障）
    #[error(
        "Polaris is not in astro mode (mode={mode}), \
         please use the mobile app to set up the astro mode"
    )]
    NotAstroMode { mode: i64 },

    /// 天文模式的对准设置未完成（致命启动故障）
    #[error(
        "Polaris is in astro mode but not properly set up, \
         please finish the astro mode setup with the mobile app"
    )]
    AlignmentIncomplete,

    /// 同一命令码已有在途等待者（使用方违反单槽约束）
    #[error("A request for code {code} is already pending")]
    DuplicatePending { code: u16 },

    /// 等待响应超时（指向故障，非致命）
    #[error("Timed out waiting for response to code {code}")]
    ResponseTimeout { code: u16 },

    /// rendezvous 通道已关闭（读取线程退出）
    #[error("Response channel closed")]
    ChannelClosed,

    /// 锁被毒化（线程 panic）
    #[error("Poisoned lock (thread panic)")]
    PoisonedLock,

    /// 会话状态不允许该操作
    #[error("Session is {state:?}, operation requires Ready")]
    NotReady { state: SessionState },
}
