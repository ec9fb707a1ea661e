//! 序列化/反序列化契约
//!
//! 纯函数式协议：聚合 → 节点、节点 → 聚合。普通函数与闭包经由
//! 毯式实现直接满足协议，无需新建类型。
//!
use crate::error::CodecResult;

/// 聚合 → 后端原生节点（纯函数，不得保留节点引用）
pub trait AggregateSerializer<T, Node> {
    fn serialize(&self, value: &T) -> Node;
}

impl<T, Node, F> AggregateSerializer<T, Node> for F
where
    F: Fn(&T) -> Node,
{
    fn serialize(&self, value: &T) -> Node {
        self(value)
    }
}

/// 后端原生节点 → 聚合；损坏的存储内容以 `CodecError` 上抛
pub trait AggregateDeserializer<T, Node> {
    fn deserialize(&self, node: Node) -> CodecResult<T>;
}

impl<T, Node, F> AggregateDeserializer<T, Node> for F
where
    F: Fn(Node) -> CodecResult<T>,
{
    fn deserialize(&self, node: Node) -> CodecResult<T> {
        self(node)
    }
}
