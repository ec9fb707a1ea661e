//! 新载体的接入成本验证
//!
//! 载体一侧只实现必需原语（写入端的 `create`/`write_value`/`end`，
//! 读取端的 `create`/`raw`/`read_value`），同一份对载体泛型的
//! 序列化定义即可同时对准 JSON 与自定义配置节点树。
use chrono::{DateTime, TimeZone, Utc};
use std::collections::BTreeMap;
use storage_codec::{
    AggregateReader, AggregateWriter, CodecError, CodecResult, FieldValue, JsonReader, JsonWriter,
};
use uuid::Uuid;

/// 一种类似配置文件的树形载体
#[derive(Debug, Clone, PartialEq)]
enum ConfigNode {
    Empty,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Sequence(Vec<ConfigNode>),
    Section(BTreeMap<String, ConfigNode>),
}

struct ConfigWriter {
    section: BTreeMap<String, ConfigNode>,
}

impl AggregateWriter for ConfigWriter {
    type Node = ConfigNode;

    fn create() -> Self {
        Self {
            section: BTreeMap::new(),
        }
    }

    fn write_value(mut self, field: &str, value: FieldValue<ConfigNode>) -> Self {
        let node = match value {
            FieldValue::Null => ConfigNode::Empty,
            FieldValue::Bool(flag) => ConfigNode::Bool(flag),
            FieldValue::I64(number) => ConfigNode::Int(number),
            FieldValue::F64(number) => ConfigNode::Float(number),
            FieldValue::Str(text) => ConfigNode::Text(text),
            FieldValue::Node(node) => node,
            FieldValue::Array(nodes) => ConfigNode::Sequence(nodes),
        };
        self.section.insert(field.to_owned(), node);
        self
    }

    fn end(self) -> ConfigNode {
        ConfigNode::Section(self.section)
    }
}

struct ConfigReader {
    node: ConfigNode,
}

impl AggregateReader for ConfigReader {
    type Node = ConfigNode;

    fn create(node: ConfigNode) -> Self {
        Self { node }
    }

    fn raw(&self) -> &ConfigNode {
        &self.node
    }

    fn read_value(&self, field: &str) -> Option<FieldValue<ConfigNode>> {
        let ConfigNode::Section(section) = &self.node else {
            return None;
        };
        section.get(field).map(|node| match node {
            ConfigNode::Empty => FieldValue::Null,
            ConfigNode::Bool(flag) => FieldValue::Bool(*flag),
            ConfigNode::Int(number) => FieldValue::I64(*number),
            ConfigNode::Float(number) => FieldValue::F64(*number),
            ConfigNode::Text(text) => FieldValue::Str(text.clone()),
            ConfigNode::Sequence(nodes) => FieldValue::Array(nodes.clone()),
            ConfigNode::Section(_) => FieldValue::Node(node.clone()),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Device {
    id: Uuid,
    name: String,
    online: bool,
    last_seen: DateTime<Utc>,
    peers: Vec<Uuid>,
}

fn missing(field: &str) -> CodecError {
    CodecError::MissingField {
        field: field.to_owned(),
    }
}

/// 对载体泛型的序列化定义，JSON 与配置树共用
fn encode_device<W: AggregateWriter>(device: &Device) -> W::Node {
    W::create()
        .write_detailed_uuid("id", Some(device.id))
        .write_string("name", Some(&device.name))
        .write_bool("online", Some(device.online))
        .write_timestamp("last_seen", Some(device.last_seen))
        .write_detailed_uuids("peers", Some(&device.peers))
        .end()
}

fn decode_device<R: AggregateReader>(node: R::Node) -> CodecResult<Device> {
    let reader = R::create(node);
    let peers: Vec<Uuid> = reader
        .read_detailed_uuids("peers", Vec::with_capacity)?
        .ok_or_else(|| missing("peers"))?;
    Ok(Device {
        id: reader.read_detailed_uuid("id")?.ok_or_else(|| missing("id"))?,
        name: reader.read_string("name")?.ok_or_else(|| missing("name"))?,
        online: reader.read_bool("online")?,
        last_seen: reader
            .read_timestamp("last_seen")?
            .ok_or_else(|| missing("last_seen"))?,
        peers,
    })
}

fn sample_device() -> Device {
    Device {
        id: Uuid::new_v4(),
        name: "edge-7".to_owned(),
        online: true,
        last_seen: Utc.timestamp_millis_opt(1_690_000_000_000).single().unwrap(),
        peers: vec![Uuid::new_v4(), Uuid::new_v4()],
    }
}

#[test]
fn same_definition_targets_both_carriers() -> CodecResult<()> {
    let device = sample_device();

    let json = encode_device::<JsonWriter>(&device);
    assert_eq!(decode_device::<JsonReader>(json)?, device);

    let config = encode_device::<ConfigWriter>(&device);
    assert_eq!(decode_device::<ConfigReader>(config)?, device);
    Ok(())
}

#[test]
fn custom_carrier_honours_absence_conventions() -> CodecResult<()> {
    let node = ConfigWriter::create()
        .write_string("name", None)
        .end();
    let reader = ConfigReader::create(node);

    // 显式空值与字段不存在同样视为缺失
    assert_eq!(reader.read_string("name")?, None);
    assert_eq!(reader.read_string("never-written")?, None);
    assert!(!reader.read_bool("online")?);
    Ok(())
}

#[test]
fn custom_carrier_reports_shape_mismatch() {
    let node = ConfigWriter::create()
        .write_string("online", Some("yes"))
        .end();
    let reader = ConfigReader::create(node);

    assert!(matches!(
        reader.read_bool("online"),
        Err(CodecError::UnexpectedType { .. })
    ));
}
