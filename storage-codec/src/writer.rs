//! 写入端
//!
//! 流式字段汇：所有类型化 setter 接收字段名与可空值、返回自身以便
//! 链式书写，最终由 `end` 取出累积的节点。载体只需实现三个必需项
//! （`create`/`write_value`/`end`），其余方法全部由唯一原语
//! `write_value` 推出。
//!
use crate::detailed_uuid;
use crate::serializer::AggregateSerializer;
use crate::value::FieldValue;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use uuid::Uuid;

/// 面向一种树形载体的聚合写入端
pub trait AggregateWriter: Sized {
    /// 载体的原生节点类型
    type Node;

    /// 创建空写入端
    fn create() -> Self;

    /// 唯一必需原语：把一个命名字段写为载体原生值
    fn write_value(self, field: &str, value: FieldValue<Self::Node>) -> Self;

    /// 终结访问器：取出累积的节点
    fn end(self) -> Self::Node;

    /// 原生节点原样透传；`None` 写入空值
    fn write_node(self, field: &str, value: Option<Self::Node>) -> Self {
        match value {
            Some(node) => self.write_value(field, FieldValue::Node(node)),
            None => self.write_value(field, FieldValue::Null),
        }
    }

    fn write_string(self, field: &str, value: Option<&str>) -> Self {
        match value {
            Some(text) => self.write_value(field, FieldValue::Str(text.to_owned())),
            None => self.write_value(field, FieldValue::Null),
        }
    }

    fn write_int(self, field: &str, value: Option<i64>) -> Self {
        match value {
            Some(number) => self.write_value(field, FieldValue::I64(number)),
            None => self.write_value(field, FieldValue::Null),
        }
    }

    fn write_float(self, field: &str, value: Option<f64>) -> Self {
        match value {
            Some(number) => self.write_value(field, FieldValue::F64(number)),
            None => self.write_value(field, FieldValue::Null),
        }
    }

    fn write_bool(self, field: &str, value: Option<bool>) -> Self {
        match value {
            Some(flag) => self.write_value(field, FieldValue::Bool(flag)),
            None => self.write_value(field, FieldValue::Null),
        }
    }

    /// 时间戳编码为自 epoch 起的有符号毫秒数
    fn write_timestamp(self, field: &str, value: Option<DateTime<Utc>>) -> Self {
        self.write_int(field, value.map(|timestamp| timestamp.timestamp_millis()))
    }

    /// 128 位标识的文本编码（规范连字符形式）
    fn write_uuid(self, field: &str, value: Option<Uuid>) -> Self {
        match value {
            Some(uuid) => self.write_value(field, FieldValue::Str(uuid.to_string())),
            None => self.write_value(field, FieldValue::Null),
        }
    }

    /// 128 位标识的分解编码：`{most, least}` 两个 64 位整数子节点。
    /// 一种载体选定文本或分解编码后应固定使用，不宜逐字段混用
    fn write_detailed_uuid(self, field: &str, value: Option<Uuid>) -> Self {
        match value {
            Some(uuid) => {
                let node = Self::detailed_uuid_node(uuid);
                self.write_value(field, FieldValue::Node(node))
            }
            None => self.write_value(field, FieldValue::Null),
        }
    }

    /// 分解编码的标识序列
    fn write_detailed_uuids<'a, I>(self, field: &str, values: Option<I>) -> Self
    where
        I: IntoIterator<Item = &'a Uuid>,
    {
        match values {
            Some(uuids) => {
                let nodes = uuids
                    .into_iter()
                    .map(|uuid| Self::detailed_uuid_node(*uuid))
                    .collect();
                self.write_value(field, FieldValue::Array(nodes))
            }
            None => self.write_value(field, FieldValue::Null),
        }
    }

    /// 嵌套对象：对单个子值应用序列化器
    fn write_object<T, S>(self, field: &str, child: Option<&T>, serializer: &S) -> Self
    where
        S: AggregateSerializer<T, Self::Node>,
    {
        match child {
            Some(child) => {
                let node = serializer.serialize(child);
                self.write_value(field, FieldValue::Node(node))
            }
            None => self.write_value(field, FieldValue::Null),
        }
    }

    /// 同质序列：对每个元素应用序列化器。`None` 写入空值而非空序列
    fn write_collection<'a, T, I, S>(self, field: &str, children: Option<I>, serializer: &S) -> Self
    where
        T: 'a,
        I: IntoIterator<Item = &'a T>,
        S: AggregateSerializer<T, Self::Node>,
    {
        match children {
            Some(children) => {
                let nodes = children
                    .into_iter()
                    .map(|child| serializer.serialize(child))
                    .collect();
                self.write_value(field, FieldValue::Array(nodes))
            }
            None => self.write_value(field, FieldValue::Null),
        }
    }

    /// 键控映射退化为值序列：键不单独编码，约定每个值的序列化器
    /// 自带可供读取端重建键的字段
    fn write_map<'a, K, T, S>(
        self,
        field: &str,
        children: Option<&'a HashMap<K, T>>,
        serializer: &S,
    ) -> Self
    where
        S: AggregateSerializer<T, Self::Node>,
    {
        self.write_collection(field, children.map(|map| map.values()), serializer)
    }

    /// 分解编码的 `{most, least}` 子节点
    fn detailed_uuid_node(uuid: Uuid) -> Self::Node {
        let (most, least) = detailed_uuid::split(uuid);
        Self::create()
            .write_value(detailed_uuid::MOST_FIELD, FieldValue::I64(most))
            .write_value(detailed_uuid::LEAST_FIELD, FieldValue::I64(least))
            .end()
    }
}
