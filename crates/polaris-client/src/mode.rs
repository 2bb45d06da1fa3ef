//! 云台工作模式
//!
//! 284 响应的 `mode` 字段。网关只关心天文跟踪模式；其余取值
//! 一律归入 `Unknown`，初始化时按"不在天文模式"处理。

use num_enum::FromPrimitive;

/// 云台工作模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
#[repr(i64)]
pub enum MountMode {
    /// 天文跟踪模式
    Astro = 8,
    /// 其他/未识别模式
    #[num_enum(default)]
    Unknown = -1,
}
