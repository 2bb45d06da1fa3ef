//! 入站响应载荷解析
//!
//! 响应载荷是 `key:value;` 串接，最后一个 `;` 紧贴结尾 `#`。
//! 解析规则：去掉末尾 `;`，按 `;` 切分，每段在第一个 `:` 处一分
//! 为二。不含 `:` 的段是协议违规，必须上浮（不得静默吞掉）。

use std::collections::HashMap;

use crate::error::ProtocolError;

/// 一条已解码的入站响应
///
/// 解码后不可变。
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MountResponse {
    /// 三位命令码
    pub code: u16,
    /// 载荷字段
    pub fields: HashMap<String, String>,
}

impl MountResponse {
    /// 从原始载荷解析
    pub fn parse(code: u16, payload: &str) -> Result<Self, ProtocolError> {
        Ok(Self {
            code,
            fields: parse_fields(payload)?,
        })
    }

    /// 读取整数字段；字段缺失返回 `None`，非整数上浮协议错误
    pub fn int_field(&self, key: &str) -> Result<Option<i64>, ProtocolError> {
        match self.fields.get(key) {
            None => Ok(None),
            Some(value) => value.parse::<i64>().map(Some).map_err(|_| {
                ProtocolError::NonIntegerField {
                    field: key.to_string(),
                    value: value.clone(),
                }
            }),
        }
    }
}

/// 解析 `key:value;` 载荷为字段映射
pub fn parse_fields(payload: &str) -> Result<HashMap<String, String>, ProtocolError> {
    let trimmed = payload.strip_suffix(';').unwrap_or(payload);
    let mut fields = HashMap::new();
    for part in trimmed.split(';') {
        let Some((key, value)) = part.split_once(':') else {
            return Err(ProtocolError::MalformedField(part.to_string()));
        };
        fields.insert(key.to_string(), value.to_string());
    }
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_mode_response_payload() {
        let fields = parse_fields("mode:8;track:3;").unwrap();
        assert_eq!(fields.get("mode").map(String::as_str), Some("8"));
        assert_eq!(fields.get("track").map(String::as_str), Some("3"));
    }

    #[test]
    fn parse_single_field() {
        let fields = parse_fields("ret:1;").unwrap();
        assert_eq!(fields.get("ret").map(String::as_str), Some("1"));
    }

    #[test]
    fn missing_colon_is_protocol_violation() {
        let err = parse_fields("mode:8;garbage;").unwrap_err();
        assert_eq!(err, ProtocolError::MalformedField("garbage".to_string()));
    }

    #[test]
    fn negative_values_survive_split_once() {
        // 值本身可以包含 `:` 之外的任意字符，包括负号和小数点
        let fields = parse_fields("ret:-1;yaw:-179.50000;").unwrap();
        assert_eq!(fields.get("ret").map(String::as_str), Some("-1"));
        assert_eq!(fields.get("yaw").map(String::as_str), Some("-179.50000"));
    }

    #[test]
    fn int_field_accessor() {
        let resp = MountResponse::parse(519, "ret:1;").unwrap();
        assert_eq!(resp.int_field("ret").unwrap(), Some(1));
        assert_eq!(resp.int_field("missing").unwrap(), None);

        let resp = MountResponse::parse(519, "ret:abc;").unwrap();
        assert!(resp.int_field("ret").is_err());
    }
}
