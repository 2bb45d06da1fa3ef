//! # Polaris Protocol
//!
//! Benro Polaris 赤道仪 ASCII 命令协议的编解码（无 IO 依赖）
//!
//! ## 模块
//!
//! - `codes`: 命令码常量定义
//! - `command`: 出站命令构建
//! - `response`: 入站响应载荷解析
//! - `frame`: 增量帧提取
//!
//! ## 线格式
//!
//! 请求：`<client-id>&<code>&<argcount>&<field1>:<value1>;...;#`
//!
//! 响应：共享同样的定界方式，一条完整消息为三位命令码、`@`、
//! 以 `#` 结尾的载荷。一次套接字读取可能携带零条、一条或多条
//! 完整消息，消息也可能跨多次读取。

pub mod codes;
pub mod command;
pub mod error;
pub mod frame;
pub mod response;

pub use codes::*;
pub use command::MountCommand;
pub use error::ProtocolError;
pub use frame::{FrameReader, RawFrame};
pub use response::{MountResponse, parse_fields};
