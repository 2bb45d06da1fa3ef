//! 响应关联
//!
//! 入站响应与等待它的出站命令在这里汇合。这是按命令码（而非
//! 请求 id）的单槽设计：每个命令码同一时刻至多一个在途等待者，
//! 上游保证指向请求严格串行处理，使该约束成立。
//!
//! goto 的双重确认意味着一个槽可能先后收到两条响应，因此槽内
//! 使用无界通道，槽在 [`PendingResponse`] 被 drop 时释放。

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};
use tracing::{error, trace};

use crate::error::ClientError;

/// 响应字段映射
pub type ResponseFields = HashMap<String, String>;

/// 响应关联器
///
/// 可克隆句柄（内部 `Arc`），读取线程与会话线程各持一份。
#[derive(Clone, Default)]
pub struct ResponseCorrelator {
    pending: Arc<Mutex<HashMap<u16, Sender<ResponseFields>>>>,
}

impl ResponseCorrelator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 为 `code` 注册一个 rendezvous 槽
    ///
    /// 必须在发送对应命令之前调用。同码重复注册是使用方错误。
    pub fn register(&self, code: u16) -> Result<PendingResponse, ClientError> {
        let mut pending = self.pending.lock().map_err(|_| ClientError::PoisonedLock)?;
        if pending.contains_key(&code) {
            return Err(ClientError::DuplicatePending { code });
        }
        let (tx, rx) = unbounded();
        pending.insert(code, tx);
        Ok(PendingResponse {
            code,
            rx,
            correlator: self.clone(),
        })
    }

    /// 投递一条入站响应
    ///
    /// 没有等待者的响应被丢弃——这是未经请求的状态码的既定
    /// 处理方式，不是错误。
    pub fn deliver(&self, code: u16, fields: ResponseFields) {
        let pending = match self.pending.lock() {
            Ok(pending) => pending,
            Err(_) => {
                error!("Pending table lock poisoned, dropping response {code}");
                return;
            },
        };
        match pending.get(&code) {
            // 等待者刚好消失时 send 失败，同样按丢弃处理
            Some(tx) => {
                let _ = tx.send(fields);
            },
            None => trace!("No pending request for code {code}, response discarded"),
        }
    }

    fn release(&self, code: u16) {
        if let Ok(mut pending) = self.pending.lock() {
            pending.remove(&code);
        }
    }
}

/// 一个在途命令的 rendezvous 槽
///
/// 生命周期：紧贴命令发送前创建，响应到达时被满足，drop 时
/// 释放槽位。双重确认的命令可在同一个槽上接收两次。
pub struct PendingResponse {
    code: u16,
    rx: Receiver<ResponseFields>,
    correlator: ResponseCorrelator,
}

impl PendingResponse {
    /// 等待响应到达
    ///
    /// 超时产生指向故障级别的 [`ClientError::ResponseTimeout`]，
    /// 不会无限期阻塞。
    pub fn recv_timeout(&self, timeout: Duration) -> Result<ResponseFields, ClientError> {
        self.rx.recv_timeout(timeout).map_err(|e| match e {
            RecvTimeoutError::Timeout => ClientError::ResponseTimeout { code: self.code },
            RecvTimeoutError::Disconnected => ClientError::ChannelClosed,
        })
    }

    pub fn code(&self) -> u16 {
        self.code
    }
}

impl Drop for PendingResponse {
    fn drop(&mut self) {
        self.correlator.release(self.code);
    }
}
