//! 仓储层统一错误定义
//!
//! “未找到”不属于错误：查询缺失以 `Ok(None)`、`Ok(false)` 等正常值
//! 表达。错误只用于真实的后端故障（I/O、损坏的数据、执行器失败），
//! 统一收敛为 `StorageError` 并在调用侧以 `?` 传播。
//!
use thiserror::Error;

/// 统一错误类型（基础库最小必要集）
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StorageError {
    /// 后端故障（文件损坏、数据库拒绝等），由具体后端包装进来
    #[error("backend error: {reason}")]
    Backend { reason: String },
    /// 底层 I/O 错误，供文件类后端直接以 `?` 转换
    #[error("io error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    /// 异步任务提交或执行失败（含任务 panic）
    #[error("executor error: {reason}")]
    Executor { reason: String },
}

/// 统一 Result 类型别名
pub type StorageResult<T> = Result<T, StorageError>;
