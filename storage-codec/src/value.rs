//! 字段值模型
//!
//! 写入端与读取端唯一必需原语的交换类型：一个命名字段能承载的
//! 全部形状。载体各自决定如何把这些形状映射到自己的原生节点。
//!

/// 命名字段的取值形状
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<Node> {
    /// 空值；读取端将其视同字段缺失
    Null,
    Bool(bool),
    I64(i64),
    F64(f64),
    Str(String),
    /// 嵌套子节点
    Node(Node),
    /// 同质子节点序列
    Array(Vec<Node>),
}
