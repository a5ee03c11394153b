//! 文档与文档引用
//!
//! 存储层返回的记录统一表示为 [`Document`]，未解引用的指针表示为 [`DocumentRef`]

use crate::types::data_value::DataValue;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 存储中的一条文档记录
///
/// 主键单独保存在 `id` 中，投影永远不会丢弃主键
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// 所属模型名
    pub model: String,
    /// 主键
    pub id: String,
    /// 字段值
    pub fields: HashMap<String, DataValue>,
}

impl Document {
    /// 创建空文档
    pub fn new(model: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            id: id.into(),
            fields: HashMap::new(),
        }
    }

    /// 只包含主键的占位文档（未从存储读取）
    pub fn placeholder(model: impl Into<String>, id: impl Into<String>) -> Self {
        Self::new(model, id)
    }

    /// 链式设置字段
    pub fn with(mut self, field: &str, value: impl Into<DataValue>) -> Self {
        self.set(field, value);
        self
    }

    /// 读取字段
    pub fn get(&self, field: &str) -> Option<&DataValue> {
        self.fields.get(field)
    }

    /// 设置字段
    pub fn set(&mut self, field: &str, value: impl Into<DataValue>) {
        self.fields.insert(field.to_string(), value.into());
    }

    /// 字段是否存在且非空
    pub fn has_value(&self, field: &str) -> bool {
        field == "id" || self.fields.get(field).is_some_and(|v| !v.is_null())
    }

    /// 按投影裁剪字段，空投影表示全部字段
    pub fn project(&self, fields: &[String]) -> Document {
        if fields.is_empty() {
            return self.clone();
        }
        let projected = self
            .fields
            .iter()
            .filter(|(name, _)| fields.iter().any(|f| f == *name))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        Document {
            model: self.model.clone(),
            id: self.id.clone(),
            fields: projected,
        }
    }

    /// 转换为 JSON 值
    pub fn to_json_value(&self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        map.insert("id".to_string(), serde_json::Value::String(self.id.clone()));
        for (name, value) in &self.fields {
            map.insert(name.clone(), value.to_json_value());
        }
        serde_json::Value::Object(map)
    }
}

/// 未解引用的文档指针
///
/// 对应存储中的 `{_cls, _ref}` 结构；懒引用在目标已被物化时携带 `cached`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRef {
    /// 目标模型名（类型标签）
    pub model: String,
    /// 目标主键
    pub id: String,
    /// 已物化的目标文档
    #[serde(default)]
    pub cached: Option<Box<Document>>,
}

impl DocumentRef {
    pub fn new(model: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            id: id.into(),
            cached: None,
        }
    }

    /// 携带已物化文档的引用
    pub fn cached(document: Document) -> Self {
        Self {
            model: document.model.clone(),
            id: document.id.clone(),
            cached: Some(Box::new(document)),
        }
    }
}
