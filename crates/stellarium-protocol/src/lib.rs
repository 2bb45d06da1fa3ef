//! # Stellarium Protocol
//!
//! Stellarium 望远镜控制协议的二进制指向包解码（无 IO 依赖）
//!
//! ## 模块
//!
//! - `packet`: 指向包布局常量、[`PointingRequest`]、[`PacketReader`]
//!
//! ## 字节序
//!
//! 协议使用 little-endian 小端字节序，定点数编码：
//! 32 位无符号全量程映射赤经 [0,24) 小时，32 位有符号映射赤纬。

pub mod packet;

pub use packet::{PACKET_LEN, PacketReader, PointingRequest, decode_packet};
