//! 聚合标识契约
//!
//! 仓储中的每个聚合都必须暴露一个稳定、非空的字符串标识；
//! 标识由调用方在构造时赋予，仓储从不生成 id。
//!

/// 具备唯一字符串标识的聚合根
pub trait AggregateRoot: Send + Sync {
    /// 获取聚合标识（构造后不可变，非空）
    fn id(&self) -> &str;
}
