//! # Polaris Astro
//!
//! 赤道坐标到地平坐标的归算（纯函数，无 IO、无内部状态）
//!
//! ## 模块
//!
//! - `time`: 儒略日与格林尼治/本地恒星时
//! - `transform`: J2000 岁差归算与赤道 ↔ 地平转换
//!
//! ## 归算约定
//!
//! 与原始归算链保持同一契约：历元 J2000 平春分点、零海拔、
//! 显式关闭大气折射修正（折射由云台自身的指向模型负责）。
//! 全链路精度优于 0.01°。

pub mod time;
pub mod transform;

pub use time::{gmst_deg, julian_date, local_sidereal_deg};
pub use transform::{
    HorizontalTarget, ObserverLocation, apparent_to_horizontal, equatorial_to_horizontal,
    horizontal_to_equatorial, precess_from_j2000,
};
