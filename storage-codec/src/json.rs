//! `serde_json::Value` 载体实例化
//!
//! 写入端与读取端各自只实现必需原语，全部类型化存取器走共享逻辑；
//! `Value::Null` 读回时视同字段缺失。
//!
use crate::reader::AggregateReader;
use crate::value::FieldValue;
use crate::writer::AggregateWriter;
use serde_json::{Map, Number, Value};

/// 面向 JSON 对象的写入端
pub struct JsonWriter {
    object: Map<String, Value>,
}

impl AggregateWriter for JsonWriter {
    type Node = Value;

    fn create() -> Self {
        Self { object: Map::new() }
    }

    fn write_value(mut self, field: &str, value: FieldValue<Value>) -> Self {
        let value = match value {
            FieldValue::Null => Value::Null,
            FieldValue::Bool(flag) => Value::Bool(flag),
            FieldValue::I64(number) => Value::Number(number.into()),
            // 非有限浮点数（NaN/∞）无法表示为 JSON 数字，落为空值
            FieldValue::F64(number) => Number::from_f64(number).map_or(Value::Null, Value::Number),
            FieldValue::Str(text) => Value::String(text),
            FieldValue::Node(node) => node,
            FieldValue::Array(nodes) => Value::Array(nodes),
        };
        self.object.insert(field.to_owned(), value);
        self
    }

    fn end(self) -> Value {
        Value::Object(self.object)
    }
}

/// 面向 JSON 对象的读取端
pub struct JsonReader {
    node: Value,
}

impl AggregateReader for JsonReader {
    type Node = Value;

    fn create(node: Value) -> Self {
        Self { node }
    }

    fn raw(&self) -> &Value {
        &self.node
    }

    fn read_value(&self, field: &str) -> Option<FieldValue<Value>> {
        let value = self.node.as_object()?.get(field)?;
        Some(match value {
            Value::Null => FieldValue::Null,
            Value::Bool(flag) => FieldValue::Bool(*flag),
            Value::Number(number) => match number.as_i64() {
                Some(integer) => FieldValue::I64(integer),
                // u64 超界或浮点数统一走 f64
                None => match number.as_f64() {
                    Some(float) => FieldValue::F64(float),
                    None => FieldValue::Null,
                },
            },
            Value::String(text) => FieldValue::Str(text.clone()),
            Value::Array(nodes) => FieldValue::Array(nodes.clone()),
            Value::Object(_) => FieldValue::Node(value.clone()),
        })
    }
}
