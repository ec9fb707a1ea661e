//! 读取端
//!
//! 写入端的镜像：载体只需实现三个必需项（`create`/`raw`/`read_value`），
//! 全部类型化 getter 由唯一原语 `read_value` 推出。
//!
//! 缺失约定：字段不存在（或为显式空值）时，除 `read_bool` 解析为
//! `false` 外，其余 getter 一律返回 `Ok(None)`；字段存在但形状不符
//! 视为损坏的存储内容，以 `CodecError` 上抛，绝不静默当作缺失。
//!
use crate::detailed_uuid;
use crate::error::{CodecError, CodecResult};
use crate::serializer::AggregateDeserializer;
use crate::value::FieldValue;
use chrono::{DateTime, TimeZone, Utc};
use std::collections::HashMap;
use std::hash::Hash;
use uuid::Uuid;

/// 面向一种树形载体的聚合读取端
pub trait AggregateReader: Sized {
    /// 载体的原生节点类型
    type Node;

    /// 包装一个待读取的节点
    fn create(node: Self::Node) -> Self;

    /// 被包装的原生节点
    fn raw(&self) -> &Self::Node;

    /// 唯一必需原语：按字段名取出载体原生值；字段不存在时返回 `None`
    fn read_value(&self, field: &str) -> Option<FieldValue<Self::Node>>;

    /// 原生子节点原样透传
    fn read_node(&self, field: &str) -> CodecResult<Option<Self::Node>> {
        match self.read_value(field) {
            None | Some(FieldValue::Null) => Ok(None),
            Some(FieldValue::Node(node)) => Ok(Some(node)),
            Some(_) => Err(CodecError::UnexpectedType {
                field: field.to_owned(),
                expected: "node",
            }),
        }
    }

    fn read_string(&self, field: &str) -> CodecResult<Option<String>> {
        match self.read_value(field) {
            None | Some(FieldValue::Null) => Ok(None),
            Some(FieldValue::Str(text)) => Ok(Some(text)),
            Some(_) => Err(CodecError::UnexpectedType {
                field: field.to_owned(),
                expected: "string",
            }),
        }
    }

    fn read_int(&self, field: &str) -> CodecResult<Option<i64>> {
        match self.read_value(field) {
            None | Some(FieldValue::Null) => Ok(None),
            Some(FieldValue::I64(number)) => Ok(Some(number)),
            Some(_) => Err(CodecError::UnexpectedType {
                field: field.to_owned(),
                expected: "integer",
            }),
        }
    }

    fn read_float(&self, field: &str) -> CodecResult<Option<f64>> {
        match self.read_value(field) {
            None | Some(FieldValue::Null) => Ok(None),
            Some(FieldValue::F64(number)) => Ok(Some(number)),
            Some(FieldValue::I64(number)) => Ok(Some(number as f64)),
            Some(_) => Err(CodecError::UnexpectedType {
                field: field.to_owned(),
                expected: "number",
            }),
        }
    }

    /// 布尔缺失解析为 `false`（刻意的默认值，而非 `None`）
    fn read_bool(&self, field: &str) -> CodecResult<bool> {
        match self.read_value(field) {
            None | Some(FieldValue::Null) => Ok(false),
            Some(FieldValue::Bool(flag)) => Ok(flag),
            Some(_) => Err(CodecError::UnexpectedType {
                field: field.to_owned(),
                expected: "boolean",
            }),
        }
    }

    /// 自 epoch 起的有符号毫秒数解码为时间戳
    fn read_timestamp(&self, field: &str) -> CodecResult<Option<DateTime<Utc>>> {
        match self.read_int(field)? {
            None => Ok(None),
            Some(millis) => Utc
                .timestamp_millis_opt(millis)
                .single()
                .map(Some)
                .ok_or(CodecError::MalformedTimestamp {
                    field: field.to_owned(),
                    millis,
                }),
        }
    }

    /// 文本编码的 128 位标识
    fn read_uuid(&self, field: &str) -> CodecResult<Option<Uuid>> {
        match self.read_string(field)? {
            None => Ok(None),
            Some(text) => Uuid::parse_str(&text)
                .map(Some)
                .map_err(|source| CodecError::MalformedUuid {
                    field: field.to_owned(),
                    reason: source.to_string(),
                }),
        }
    }

    /// 分解编码的 128 位标识（`{most, least}` 子节点）
    fn read_detailed_uuid(&self, field: &str) -> CodecResult<Option<Uuid>> {
        match self.read_node(field)? {
            None => Ok(None),
            Some(node) => Self::detailed_uuid_of(node, field).map(Some),
        }
    }

    /// 分解编码的标识序列
    fn read_detailed_uuids<C>(
        &self,
        field: &str,
        factory: impl FnOnce(usize) -> C,
    ) -> CodecResult<Option<C>>
    where
        C: Extend<Uuid>,
    {
        match self.read_value(field) {
            None | Some(FieldValue::Null) => Ok(None),
            Some(FieldValue::Array(nodes)) => {
                let mut uuids = factory(nodes.len());
                for node in nodes {
                    uuids.extend(std::iter::once(Self::detailed_uuid_of(node, field)?));
                }
                Ok(Some(uuids))
            }
            Some(_) => Err(CodecError::UnexpectedType {
                field: field.to_owned(),
                expected: "sequence",
            }),
        }
    }

    /// 嵌套对象：对子节点应用反序列化器
    fn read_object<T, D>(&self, field: &str, deserializer: &D) -> CodecResult<Option<T>>
    where
        D: AggregateDeserializer<T, Self::Node>,
    {
        match self.read_node(field)? {
            None => Ok(None),
            Some(node) => deserializer.deserialize(node).map(Some),
        }
    }

    /// 同质序列：对每个子节点应用反序列化器；`factory` 以元素数为
    /// 容量提示构造结果集合
    fn read_collection<T, C, D>(
        &self,
        field: &str,
        factory: impl FnOnce(usize) -> C,
        deserializer: &D,
    ) -> CodecResult<Option<C>>
    where
        C: Extend<T>,
        D: AggregateDeserializer<T, Self::Node>,
    {
        match self.read_value(field) {
            None | Some(FieldValue::Null) => Ok(None),
            Some(FieldValue::Array(nodes)) => {
                let mut children = factory(nodes.len());
                for node in nodes {
                    children.extend(std::iter::once(deserializer.deserialize(node)?));
                }
                Ok(Some(children))
            }
            Some(_) => Err(CodecError::UnexpectedType {
                field: field.to_owned(),
                expected: "sequence",
            }),
        }
    }

    /// 键控映射：对每个已反序列化的值应用 `key_of` 重建键
    fn read_map<K, V, D>(
        &self,
        field: &str,
        key_of: impl Fn(&V) -> K,
        deserializer: &D,
    ) -> CodecResult<Option<HashMap<K, V>>>
    where
        K: Eq + Hash,
        D: AggregateDeserializer<V, Self::Node>,
    {
        match self.read_value(field) {
            None | Some(FieldValue::Null) => Ok(None),
            Some(FieldValue::Array(nodes)) => {
                let mut map = HashMap::with_capacity(nodes.len());
                for node in nodes {
                    let value = deserializer.deserialize(node)?;
                    map.insert(key_of(&value), value);
                }
                Ok(Some(map))
            }
            Some(_) => Err(CodecError::UnexpectedType {
                field: field.to_owned(),
                expected: "sequence",
            }),
        }
    }

    /// 从 `{most, least}` 子节点还原 128 位标识
    fn detailed_uuid_of(node: Self::Node, field: &str) -> CodecResult<Uuid> {
        let reader = Self::create(node);
        let most = reader
            .read_int(detailed_uuid::MOST_FIELD)?
            .ok_or_else(|| CodecError::MissingField {
                field: format!("{field}.{}", detailed_uuid::MOST_FIELD),
            })?;
        let least = reader
            .read_int(detailed_uuid::LEAST_FIELD)?
            .ok_or_else(|| CodecError::MissingField {
                field: format!("{field}.{}", detailed_uuid::LEAST_FIELD),
            })?;
        Ok(detailed_uuid::join(most, least))
    }
}
