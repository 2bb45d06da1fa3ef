//! 儒略日与恒星时
//!
//! GMST 采用 IAU 1982 多项式。方程式里不含赤经章动修正
//! （equation of equinoxes，量级 ±0.005°），在 0.01° 的指向
//! 精度预算之内。

/// J2000.0 历元的儒略日
pub const JD_J2000: f64 = 2_451_545.0;

const SECONDS_PER_DAY: f64 = 86_400.0;
/// Unix 纪元（1970-01-01 00:00 UT）的儒略日
const JD_UNIX_EPOCH: f64 = 2_440_587.5;

/// 微秒 Unix 时间戳 → 儒略日
pub fn julian_date(timestamp_us: u64) -> f64 {
    timestamp_us as f64 / 1e6 / SECONDS_PER_DAY + JD_UNIX_EPOCH
}

/// 格林尼治平恒星时（度，[0,360)）
///
/// IAU 1982 表达式（Meeus 12.4）。
pub fn gmst_deg(jd: f64) -> f64 {
    let d = jd - JD_J2000;
    let t = d / 36_525.0;
    let gmst = 280.460_618_37 + 360.985_647_366_29 * d + 0.000_387_933 * t * t
        - t * t * t / 38_710_000.0;
    gmst.rem_euclid(360.0)
}

/// 本地恒星时（度，[0,360)），东经为正
pub fn local_sidereal_deg(jd: f64, longitude_deg: f64) -> f64 {
    (gmst_deg(jd) + longitude_deg).rem_euclid(360.0)
}
