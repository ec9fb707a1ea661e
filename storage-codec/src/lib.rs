//! 聚合编解码基础库（storage-codec）
//!
//! 面向树形载体的结构化编码抽象：一份序列化定义可以对准多种
//! 对象式载体（JSON 对象、文档数据库文档、配置节点树），用于：
//! - 序列化/反序列化契约（`serializer`）：聚合 ↔ 后端原生节点的纯函数；
//! - 字段值模型（`value`）：写入端与读取端唯一必需原语的交换类型；
//! - 写入端（`writer`）与读取端（`reader`）：全部类型化存取器由
//!   唯一必需原语推出，新增载体只需实现该原语；
//! - `serde_json::Value` 实例化（`json`）。
//!
//! 编码是无状态的纯树变换：Serializer/Deserializer 不得持有副作用，
//! 也不得在返回后保留节点引用。
//!
pub mod error;
pub mod json;
pub mod reader;
pub mod serializer;
pub mod value;
pub mod writer;

pub use error::{CodecError, CodecResult};
pub use json::{JsonReader, JsonWriter};
pub use reader::AggregateReader;
pub use serializer::{AggregateDeserializer, AggregateSerializer};
pub use value::FieldValue;
pub use writer::AggregateWriter;

pub(crate) mod detailed_uuid;
