//! 出站命令构建
//!
//! 每条请求编码为 `<client-id>&<code>&<argcount>&<body>#`。
//! `argcount` 是各命令的固定协议常量，并非字段个数；字段体为
//! `key:value;` 串接。数值字段按小数点后五位格式化，与云台固件
//! 的解析精度一致。

use crate::codes::CLIENT_ID;

/// 一条出站命令
///
/// 发送后不保留（响应关联由 pending 表承担）。通过本模块的
/// 具名构造函数创建，保证字段顺序与固件期望一致。
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MountCommand {
    /// 三位命令码
    pub code: u16,
    /// 协议固定的参数计数段
    pub arg_count: u8,
    /// 已格式化的字段体（不含结尾 `#`）
    pub body: String,
}

impl MountCommand {
    fn from_fields(code: u16, arg_count: u8, fields: &[(&str, String)]) -> Self {
        let mut body = String::new();
        for (key, value) in fields {
            body.push_str(key);
            body.push(':');
            body.push_str(value);
            body.push(';');
        }
        Self { code, arg_count, body }
    }

    /// 编码为线格式字符串
    pub fn encode(&self) -> String {
        format!("{}&{}&{}&{}#", CLIENT_ID, self.code, self.arg_count, self.body)
    }

    /// 查询当前工作模式（284）
    ///
    /// 固件对本命令使用原始载荷 `-1` 而非字段体。
    pub fn get_current_mode() -> Self {
        Self {
            code: crate::codes::CODE_GET_MODE,
            arg_count: 2,
            body: "-1".to_string(),
        }
    }

    /// 启停跟踪（531，fire-and-forget）
    pub fn set_tracking(enabled: bool) -> Self {
        let state = if enabled { 1 } else { 0 };
        Self::from_fields(
            crate::codes::CODE_TRACKING,
            3,
            &[("state", state.to_string()), ("speed", "0".to_string())],
        )
    }

    /// 转向命令（519）
    ///
    /// `yaw` 为云台有符号偏航角（-180°..180°），`pitch` 为高度角。
    /// 字段顺序固定：state、yaw、pitch、lat、track、speed、lng。
    pub fn slew_to(yaw: f64, pitch: f64, lat: f64, lng: f64, track: bool) -> Self {
        let track = if track { 1 } else { 0 };
        Self::from_fields(
            crate::codes::CODE_SLEW,
            3,
            &[
                ("state", "1".to_string()),
                ("yaw", format!("{yaw:.5}")),
                ("pitch", format!("{pitch:.5}")),
                ("lat", format!("{lat:.5}")),
                ("track", track.to_string()),
                ("speed", "0".to_string()),
                ("lng", format!("{lng:.5}")),
            ],
        )
    }

    /// 单轴点动（532/533/534，fire-and-forget）
    ///
    /// `speed` 为 0 即停止该轴。
    pub fn jog(code: u16, speed: i32) -> Self {
        let state = if speed != 0 { 1 } else { 0 };
        Self::from_fields(
            code,
            3,
            &[("state", state.to_string()), ("speed", speed.to_string())],
        )
    }

    /// 轴复位（523，fire-and-forget）
    pub fn reset_axis(axis: u8) -> Self {
        Self::from_fields(crate::codes::CODE_RESET_AXIS, 3, &[("axis", axis.to_string())])
    }

    /// 对准步骤（530，fire-and-forget，两步之间由操作者居中目标）
    pub fn align_step(step: u8) -> Self {
        Self::from_fields(crate::codes::CODE_ALIGN, 3, &[("state", step.to_string())])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codes::*;

    #[test]
    fn encode_get_current_mode() {
        assert_eq!(MountCommand::get_current_mode().encode(), "1&284&2&-1#");
    }

    #[test]
    fn encode_tracking() {
        assert_eq!(
            MountCommand::set_tracking(false).encode(),
            "1&531&3&state:0;speed:0;#"
        );
        assert_eq!(
            MountCommand::set_tracking(true).encode(),
            "1&531&3&state:1;speed:0;#"
        );
    }

    #[test]
    fn encode_slew_field_order_and_precision() {
        let cmd = MountCommand::slew_to(10.0, 74.25953, 44.42, 5.12, true);
        assert_eq!(
            cmd.encode(),
            "1&519&3&state:1;yaw:10.00000;pitch:74.25953;lat:44.42000;track:1;speed:0;lng:5.12000;#"
        );
    }

    #[test]
    fn encode_slew_negative_yaw() {
        let cmd = MountCommand::slew_to(-180.0, 0.0, 0.0, 0.0, false);
        assert!(cmd.encode().contains("yaw:-180.00000;"));
        assert!(cmd.encode().contains("track:0;"));
    }

    #[test]
    fn encode_jog_and_reset() {
        assert_eq!(
            MountCommand::jog(CODE_JOG_AZIMUTH, 500).encode(),
            "1&532&3&state:1;speed:500;#"
        );
        assert_eq!(
            MountCommand::jog(CODE_JOG_ALTITUDE, 0).encode(),
            "1&533&3&state:0;speed:0;#"
        );
        assert_eq!(MountCommand::reset_axis(2).encode(), "1&523&3&axis:2;#");
        assert_eq!(MountCommand::align_step(1).encode(), "1&530&3&state:1;#");
    }
}
