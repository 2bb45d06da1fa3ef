//! 指向包解析
//!
//! Stellarium 的望远镜控制插件以固定布局的二进制包发送指向请求：
//!
//! | 字节范围 | 内容 |
//! |----------|------|
//! | [0..4)   | 包长度与消息类型（本网关忽略） |
//! | [4..11)  | 56 位微秒 Unix 时间戳（小端） |
//! | [12..16) | u32 定点赤经，全量程映射 [0,24) 小时 |
//! | [16..20) | i32 定点赤纬，按 90°/2^30 缩放 |
//!
//! 解码是单向且确定的：相同字节序列总是产生相同的
//! `(timestamp, ra, dec)`。

/// 一个完整指向包的字节数
pub const PACKET_LEN: usize = 20;

/// 赤经定点缩放：u32 全量程 → 24 小时
const RA_SCALE: f64 = 24.0 / 4_294_967_296.0; // 24 / 2^32
/// 赤纬定点缩放：2^30 → 90°
const DEC_SCALE: f64 = 90.0 / 1_073_741_824.0; // 90 / 2^30

/// 一次已解码的指向请求
///
/// 由一个入站包解码产生；不可变，被坐标变换消费一次。
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PointingRequest {
    /// 请求时刻（微秒 Unix 时间戳）
    pub timestamp_us: u64,
    /// 赤经（小时，[0,24)）
    pub ra_hours: f64,
    /// 赤纬（度，[-90,90]）
    pub dec_deg: f64,
}

/// 解码一个完整的 20 字节指向包
///
/// 定点解码不会失败：任何 20 字节输入都映射到合法的数值范围。
pub fn decode_packet(bytes: &[u8; PACKET_LEN]) -> PointingRequest {
    // 56 位时间戳：7 字节小端，高位补零
    let mut ts = [0u8; 8];
    ts[..7].copy_from_slice(&bytes[4..11]);
    let timestamp_us = u64::from_le_bytes(ts);

    let ra_raw = u32::from_le_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]);
    let dec_raw = i32::from_le_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]);

    PointingRequest {
        timestamp_us,
        ra_hours: f64::from(ra_raw) * RA_SCALE,
        dec_deg: f64::from(dec_raw) * DEC_SCALE,
    }
}

/// 增量包读取器
///
/// 网关从套接字按固定块读取，本类型在读到的字节上工作，
/// 自身不做任何 IO。不满 20 字节的前缀会被缓存，直到凑齐
/// 一个完整包；一次读入可能产出零个、一个或多个请求。
///
/// 连接在包中途关闭时，调用方应将其作为连接关闭条件上报，
/// 残留的半包不会被解码。
#[derive(Debug, Default)]
pub struct PacketReader {
    buf: Vec<u8>,
}

impl PacketReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一次套接字读取到的字节
    pub fn extend(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// 取出下一个完整请求；不足一个完整包时返回 `None`
    pub fn next_request(&mut self) -> Option<PointingRequest> {
        if self.buf.len() < PACKET_LEN {
            return None;
        }
        let mut packet = [0u8; PACKET_LEN];
        packet.copy_from_slice(&self.buf[..PACKET_LEN]);
        self.buf.drain(..PACKET_LEN);
        Some(decode_packet(&packet))
    }

    /// 当前缓存的未消费字节数
    pub fn pending_len(&self) -> usize {
        self.buf.len()
    }
}
