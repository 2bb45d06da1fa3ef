//! # Polaris Client
//!
//! Benro Polaris 云台的会话层：响应关联、命令时序与连接管理
//!
//! ## 模块
//!
//! - `correlator`: 入站响应与在途命令的汇合（单槽 rendezvous）
//! - `session`: 命令协议语义的状态机（初始化、goto 双重确认、
//!   跟踪、点动、复位、对准）
//! - `connection`: TCP 连接与响应读取循环
//! - `mode`: 云台工作模式枚举
//!
//! ## 并发模型
//!
//! 一个响应读取线程 + 调用方线程。pending 表是唯一的共享可变
//! 状态，由 [`correlator::ResponseCorrelator`] 自身的互斥锁保护；
//! 每个命令码同一时刻至多一个在途等待者。

pub mod connection;
pub mod correlator;
pub mod error;
pub mod mode;
pub mod session;

pub use connection::{connect, response_reader_loop};
pub use correlator::{PendingResponse, ResponseCorrelator};
pub use error::ClientError;
pub use mode::MountMode;
pub use session::{GotoOutcome, MountSession, SessionConfig, SessionState, azimuth_to_yaw};
