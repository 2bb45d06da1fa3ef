//! 命令码常量定义
//!
//! Polaris 协议的命令码是三位十进制数，出现在每条请求和响应的
//! 开头。响应复用请求的命令码，位置上报（518）由云台主动推送。

/// 网关固定使用的客户端标识
pub const CLIENT_ID: u8 = 1;

/// 查询当前工作模式（响应携带 `mode`/`track` 字段）
pub const CODE_GET_MODE: u16 = 284;
/// 位置上报（未经请求的周期性推送）
pub const CODE_POSITION_REPORT: u16 = 518;
/// 转向目标方向（goto，双重确认）
pub const CODE_SLEW: u16 = 519;
/// 轴复位
pub const CODE_RESET_AXIS: u16 = 523;
/// 对准（两步，中间由操作者在配套 App 中居中目标星）
pub const CODE_ALIGN: u16 = 530;
/// 启停跟踪
pub const CODE_TRACKING: u16 = 531;
/// 方位轴点动
pub const CODE_JOG_AZIMUTH: u16 = 532;
/// 俯仰轴点动
pub const CODE_JOG_ALTITUDE: u16 = 533;
/// 旋转轴点动
pub const CODE_JOG_ROTATION: u16 = 534;

/// 天文跟踪模式的 `mode` 值
pub const MODE_ASTRO: i64 = 8;
/// `track` 值为 3 表示天文模式尚未完成对准设置
pub const TRACK_SETUP_INCOMPLETE: i64 = 3;
