//! 增量帧提取
//!
//! 云台以 `DDD@<payload>#` 为一条完整消息。本读取器在累积缓冲
//! 上做显式的增量提取：尝试取出一条完整帧，消费其字节（含结尾
//! `#`），重复直到没有完整帧，只保留未消费的余量。一次读取可能
//! 产出零条、一条或多条帧，帧也可能跨多次读取。

use crate::error::ProtocolError;

/// 一条已定界但未解析载荷的帧
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    /// 三位命令码
    pub code: u16,
    /// `@` 与 `#` 之间的载荷文本
    pub payload: String,
}

/// 增量帧读取器
///
/// 不做任何 IO；调用方负责把套接字读到的字节喂进来。
#[derive(Debug, Default)]
pub struct FrameReader {
    buf: Vec<u8>,
}

impl FrameReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一次套接字读取到的字节
    pub fn extend(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// 取出下一条完整帧
    ///
    /// - `Ok(Some(_))`: 提取出一条帧，其字节已从缓冲消费
    /// - `Ok(None)`: 缓冲内没有完整帧，等待更多字节
    /// - `Err(_)`: 缓冲开头不是合法帧头；丢弃一个字节重新同步，
    ///   调用方记录错误后可以继续调用
    pub fn next_frame(&mut self) -> Result<Option<RawFrame>, ProtocolError> {
        if self.buf.len() < 4 {
            return Ok(None);
        }

        let header_ok =
            self.buf[..3].iter().all(u8::is_ascii_digit) && self.buf[3] == b'@';
        if !header_ok {
            let shown = String::from_utf8_lossy(&self.buf[..self.buf.len().min(8)]).into_owned();
            self.buf.drain(..1);
            return Err(ProtocolError::InvalidHeader(shown));
        }

        // 载荷以 '#' 结束；没有就继续等
        let Some(rel) = self.buf[4..].iter().position(|&b| b == b'#') else {
            return Ok(None);
        };
        let end = 4 + rel;

        // 帧头已验证为三位数字
        let code = u16::from(self.buf[0] - b'0') * 100
            + u16::from(self.buf[1] - b'0') * 10
            + u16::from(self.buf[2] - b'0');
        let payload = String::from_utf8_lossy(&self.buf[4..end]).into_owned();
        self.buf.drain(..=end);

        Ok(Some(RawFrame { code, payload }))
    }

    /// 当前缓存的未消费字节数
    pub fn pending_len(&self) -> usize {
        self.buf.len()
    }
}
