//! 编解码统一错误定义
//!
//! 字段缺失不是错误（以 `Ok(None)` 表达）；错误只描述已存在但
//! 形状不符的数据，即真正损坏的存储内容。
//!
use thiserror::Error;

/// 统一错误类型
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum CodecError {
    /// 字段存在但类型与期望不符
    #[error("unexpected type for field `{field}`: expected {expected}")]
    UnexpectedType {
        field: String,
        expected: &'static str,
    },
    /// 复合结构中缺少必需字段
    #[error("missing field `{field}`")]
    MissingField { field: String },
    /// 无法解析的 UUID 文本或分解形式
    #[error("malformed uuid in field `{field}`: {reason}")]
    MalformedUuid { field: String, reason: String },
    /// 超出可表示范围的时间戳毫秒值
    #[error("malformed timestamp in field `{field}`: {millis} ms out of range")]
    MalformedTimestamp { field: String, millis: i64 },
}

/// 统一 Result 类型别名
pub type CodecResult<T> = Result<T, CodecError>;
