//! 赤道坐标 → 地平坐标归算
//!
//! 输入是 J2000 平春分点下的 (赤经, 赤纬) 与观测时刻，输出是
//! 观测地的 (方位角, 高度角)。归算链：
//!
//! 1. 岁差：J2000 → 观测日期（Meeus 第 21 章 ζ/z/θ 严格式）
//! 2. 本地恒星时 → 时角
//! 3. 球面三角 → 方位/高度（方位角自北起算，向东为正）
//!
//! 零海拔，不做折射修正；章动与光行差（合计 < 0.008°）省略，
//! 在 0.01° 精度预算之内。所有函数均为输入的纯函数。

use crate::time::{JD_J2000, julian_date, local_sidereal_deg};

/// 观测地
///
/// 进程级配置，启动时设置一次，此后只读。
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObserverLocation {
    /// 纬度（度，北为正）
    pub latitude_deg: f64,
    /// 经度（度，东为正）
    pub longitude_deg: f64,
}

/// 地平坐标目标
///
/// 派生量，不可变，被 goto 消费一次。
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HorizontalTarget {
    /// 方位角（度，[0,360)，自北向东）
    pub azimuth_deg: f64,
    /// 高度角（度，[-90,90]）
    pub altitude_deg: f64,
}

/// J2000 平位置按岁差归算到观测日期
///
/// Meeus (21.2)/(21.4) 的严格归算。输入输出赤经均为度。
pub fn precess_from_j2000(ra_deg: f64, dec_deg: f64, jd: f64) -> (f64, f64) {
    let t = (jd - JD_J2000) / 36_525.0;
    // 角秒 → 度
    let zeta = (2306.2181 * t + 0.30188 * t * t + 0.017998 * t * t * t) / 3600.0;
    let z = (2306.2181 * t + 1.09468 * t * t + 0.018203 * t * t * t) / 3600.0;
    let theta = (2004.3109 * t - 0.42665 * t * t - 0.041833 * t * t * t) / 3600.0;

    let (ra, dec) = (ra_deg.to_radians(), dec_deg.to_radians());
    let (zeta, z, theta) = (zeta.to_radians(), z.to_radians(), theta.to_radians());

    let a = dec.cos() * (ra + zeta).sin();
    let b = theta.cos() * dec.cos() * (ra + zeta).cos() - theta.sin() * dec.sin();
    let c = theta.sin() * dec.cos() * (ra + zeta).cos() + theta.cos() * dec.sin();

    let ra_date = (a.atan2(b) + z).to_degrees().rem_euclid(360.0);
    let dec_date = c.asin().to_degrees();
    (ra_date, dec_date)
}

/// 赤道坐标（J2000）→ 地平坐标
///
/// `ra_hours` 为小时制赤经。先做岁差归算再转地平，
/// 与云台转向所需的指向精度一致。
pub fn equatorial_to_horizontal(
    ra_hours: f64,
    dec_deg: f64,
    timestamp_us: u64,
    location: ObserverLocation,
) -> HorizontalTarget {
    let jd = julian_date(timestamp_us);
    let (ra_date, dec_date) = precess_from_j2000(ra_hours * 15.0, dec_deg, jd);
    apparent_to_horizontal(ra_date, dec_date, jd, location)
}

/// 当日视位置 → 地平坐标（不做岁差）
///
/// Meeus (13.5)/(13.6)。atan2 形式给出自南起算的方位角，
/// 加 180° 转为自北起算。
pub fn apparent_to_horizontal(
    ra_deg: f64,
    dec_deg: f64,
    jd: f64,
    location: ObserverLocation,
) -> HorizontalTarget {
    let lst = local_sidereal_deg(jd, location.longitude_deg);
    let h = (lst - ra_deg).to_radians();
    let lat = location.latitude_deg.to_radians();
    let dec = dec_deg.to_radians();

    let sin_alt = lat.sin() * dec.sin() + lat.cos() * dec.cos() * h.cos();
    let altitude_deg = sin_alt.asin().to_degrees();

    let az_south = h.sin().atan2(h.cos() * lat.sin() - dec.tan() * lat.cos());
    let azimuth_deg = (az_south.to_degrees() + 180.0).rem_euclid(360.0);

    HorizontalTarget {
        azimuth_deg,
        altitude_deg,
    }
}

/// 地平坐标 → 当日视赤道坐标（逆变换）
///
/// 测试支撑：round-trip 校验用。返回 (赤经度, 赤纬度)。
pub fn horizontal_to_equatorial(
    target: HorizontalTarget,
    jd: f64,
    location: ObserverLocation,
) -> (f64, f64) {
    let lst = local_sidereal_deg(jd, location.longitude_deg);
    let az_south = (target.azimuth_deg - 180.0).to_radians();
    let alt = target.altitude_deg.to_radians();
    let lat = location.latitude_deg.to_radians();

    let h = az_south
        .sin()
        .atan2(az_south.cos() * lat.sin() + alt.tan() * lat.cos());
    let dec = (lat.sin() * alt.sin() - lat.cos() * alt.cos() * az_south.cos()).asin();

    let ra_deg = (lst - h.to_degrees()).rem_euclid(360.0);
    (ra_deg, dec.to_degrees())
}
