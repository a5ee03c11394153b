//! 高级字段类型：文件与地理几何
//!
//! 存储中的值被读成固定形状的小对象，子字段由各自的解析函数给出

use crate::resolver::selection::Selection;
use crate::schema::graph_type::AdvancedKind;
use crate::types::DataValue;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Serialize;
use serde_json::{json, Value};

/// 文件字段
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FileValue {
    pub content_type: Option<String>,
    pub md5: Option<String>,
    pub chunk_size: Option<i64>,
    pub length: Option<i64>,
    /// base64 编码的内容
    pub data: Option<String>,
}

impl FileValue {
    pub fn from_value(value: &DataValue) -> Option<Self> {
        let DataValue::Object(fields) = value else {
            return None;
        };
        let text = |name: &str| fields.get(name).and_then(DataValue::as_str).map(str::to_string);
        let number = |name: &str| fields.get(name).and_then(DataValue::as_i64);
        let data = match fields.get("data") {
            Some(DataValue::Bytes(bytes)) => Some(BASE64.encode(bytes)),
            Some(DataValue::String(encoded)) => Some(encoded.clone()),
            _ => None,
        };
        Some(Self {
            content_type: text("content_type"),
            md5: text("md5"),
            chunk_size: number("chunk_size"),
            length: number("length"),
            data,
        })
    }

    fn field(&self, name: &str) -> Value {
        match name {
            "contentType" | "content_type" => json!(self.content_type),
            "md5" => json!(self.md5),
            "chunkSize" | "chunk_size" => json!(self.chunk_size),
            "length" => json!(self.length),
            "data" => json!(self.data),
            _ => Value::Null,
        }
    }
}

/// 地理几何字段
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeometryValue {
    #[serde(rename = "type")]
    pub geometry_type: String,
    pub coordinates: Value,
}

impl GeometryValue {
    /// 接受 GeoJSON 对象或裸坐标数组
    pub fn from_value(kind: AdvancedKind, value: &DataValue) -> Option<Self> {
        let default_type = match kind {
            AdvancedKind::Point => "Point",
            AdvancedKind::Polygon => "Polygon",
            AdvancedKind::MultiPolygon => "MultiPolygon",
            AdvancedKind::File => return None,
        };
        match value.to_json_value() {
            Value::Object(map) => Some(Self {
                geometry_type: map
                    .get("type")
                    .and_then(Value::as_str)
                    .unwrap_or(default_type)
                    .to_string(),
                coordinates: map.get("coordinates").cloned().unwrap_or(Value::Null),
            }),
            coordinates @ Value::Array(_) => Some(Self {
                geometry_type: default_type.to_string(),
                coordinates,
            }),
            _ => None,
        }
    }

    fn field(&self, name: &str) -> Value {
        match name {
            "type" => json!(self.geometry_type),
            "coordinates" => self.coordinates.clone(),
            _ => Value::Null,
        }
    }
}

/// 按子选择输出高级类型的值
pub fn render_advanced(kind: AdvancedKind, value: Option<&DataValue>, selection: &Selection) -> Value {
    let Some(value) = value.filter(|v| !v.is_null()) else {
        return Value::Null;
    };
    let field: Box<dyn Fn(&str) -> Value> = match kind {
        AdvancedKind::File => match FileValue::from_value(value) {
            Some(file) => Box::new(move |name: &str| file.field(name)),
            None => return Value::Null,
        },
        geo => match GeometryValue::from_value(geo, value) {
            Some(geometry) => Box::new(move |name: &str| geometry.field(name)),
            None => return Value::Null,
        },
    };

    let mut object = serde_json::Map::new();
    for child in selection.fields_for_type(kind.type_name()) {
        let rendered = if child.name == "__typename" {
            json!(kind.type_name())
        } else {
            field(&child.name)
        };
        object.insert(child.response_key().to_string(), rendered);
    }
    Value::Object(object)
}
