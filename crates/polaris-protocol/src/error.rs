//! 协议层错误类型定义

use thiserror::Error;

/// 协议层错误类型
///
/// 帧头或载荷不合法属于协议违规，必须上浮给调用方记录；
/// 调用方记录后吸收并继续读取，不得让读循环崩溃。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// 帧头不是 `DDD@` 形式
    #[error("Invalid frame header: expected 'DDD@', got {0:?}")]
    InvalidHeader(String),

    /// 载荷中的字段缺少 `key:value` 分隔符
    #[error("Malformed payload field: {0:?}")]
    MalformedField(String),

    /// 字段值不是期望的整数
    #[error("Field {field:?} is not an integer: {value:?}")]
    NonIntegerField { field: String, value: String },
}
