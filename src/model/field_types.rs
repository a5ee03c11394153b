//! 字段类型定义模块
//!
//! 定义文档模型字段的种类与元数据，供图类型转换器使用

use crate::error::QuickGqlResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 字段种类
///
/// 封闭的和类型：转换器对其做穷尽匹配，新增种类必须同时提供转换规则
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldKind {
    /// 字符串
    String,
    /// 邮箱（字符串语义）
    Email,
    /// URL（字符串语义）
    Url,
    /// 对象ID
    ObjectId,
    /// UUID
    Uuid,
    /// 32位整数
    Int,
    /// 64位整数
    Long,
    /// 布尔
    Boolean,
    /// 浮点数
    Float,
    /// 十进制数
    Decimal,
    /// 日期时间
    DateTime,
    /// 日期
    Date,
    /// 字典
    Dict,
    /// 映射
    Map,
    /// 枚举
    Enum(EnumDefinition),
    /// 地理点
    Point,
    /// 多边形
    Polygon,
    /// 多重多边形
    MultiPolygon,
    /// 文件
    File,
    /// 列表，元素描述递归定义
    List(Box<FieldDefinition>),
    /// 内嵌文档
    Embedded { document: String },
    /// 引用
    Reference { document: String },
    /// 懒引用
    LazyReference { document: String },
    /// 多态引用，具体类型取自有限的候选集
    GenericReference { choices: Vec<String> },
    /// 多态懒引用
    GenericLazyReference { choices: Vec<String> },
    /// 存储层定义了但没有图映射的字段种类
    Unsupported { type_name: String },
}

impl FieldKind {
    /// 种类名称，用于日志与错误消息
    pub fn type_name(&self) -> String {
        match self {
            FieldKind::String => "StringField".to_string(),
            FieldKind::Email => "EmailField".to_string(),
            FieldKind::Url => "URLField".to_string(),
            FieldKind::ObjectId => "ObjectIdField".to_string(),
            FieldKind::Uuid => "UUIDField".to_string(),
            FieldKind::Int => "IntField".to_string(),
            FieldKind::Long => "LongField".to_string(),
            FieldKind::Boolean => "BooleanField".to_string(),
            FieldKind::Float => "FloatField".to_string(),
            FieldKind::Decimal => "DecimalField".to_string(),
            FieldKind::DateTime => "DateTimeField".to_string(),
            FieldKind::Date => "DateField".to_string(),
            FieldKind::Dict => "DictField".to_string(),
            FieldKind::Map => "MapField".to_string(),
            FieldKind::Enum(def) => format!("EnumField({})", def.name),
            FieldKind::Point => "PointField".to_string(),
            FieldKind::Polygon => "PolygonField".to_string(),
            FieldKind::MultiPolygon => "MultiPolygonField".to_string(),
            FieldKind::File => "FileField".to_string(),
            FieldKind::List(inner) => format!("ListField({})", inner.kind.type_name()),
            FieldKind::Embedded { document } => format!("EmbeddedDocumentField({})", document),
            FieldKind::Reference { document } => format!("ReferenceField({})", document),
            FieldKind::LazyReference { document } => format!("LazyReferenceField({})", document),
            FieldKind::GenericReference { .. } => "GenericReferenceField".to_string(),
            FieldKind::GenericLazyReference { .. } => "GenericLazyReferenceField".to_string(),
            FieldKind::Unsupported { type_name } => type_name.clone(),
        }
    }
}

/// 枚举定义
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnumDefinition {
    /// 枚举名
    pub name: String,
    /// 成员（名称即存储值）
    pub members: Vec<String>,
}

impl EnumDefinition {
    pub fn new(name: &str, members: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            members: members.iter().map(|m| m.to_string()).collect(),
        }
    }

    /// 是否包含成员
    pub fn contains(&self, member: &str) -> bool {
        self.members.iter().any(|m| m == member)
    }
}

/// 字段定义
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// 字段种类
    pub kind: FieldKind,
    /// 是否必填
    pub required: bool,
    /// 帮助文本
    pub help_text: Option<String>,
    /// 显示名称
    pub verbose_name: Option<String>,
    /// 存储字段名（与属性名不同时设置）
    pub db_field: Option<String>,
}

impl FieldDefinition {
    /// 创建新的字段定义
    pub fn new(kind: FieldKind) -> Self {
        Self {
            kind,
            required: false,
            help_text: None,
            verbose_name: None,
            db_field: None,
        }
    }

    /// 设置为必填字段
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// 设置帮助文本
    pub fn help_text(mut self, text: &str) -> Self {
        self.help_text = Some(text.to_string());
        self
    }

    /// 设置显示名称
    pub fn verbose_name(mut self, name: &str) -> Self {
        self.verbose_name = Some(name.to_string());
        self
    }

    /// 设置存储字段名
    pub fn db_field(mut self, name: &str) -> Self {
        self.db_field = Some(name.to_string());
        self
    }
}

/// 模型元数据
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMeta {
    /// 模型名
    pub name: String,
    /// 集合名
    pub collection_name: String,
    /// 字段定义（按名称排序）
    pub fields: BTreeMap<String, FieldDefinition>,
    /// 主键字段名
    pub primary_key: String,
    /// 计算属性（同名的模型属性被它遮蔽）
    pub properties: Vec<String>,
    /// 是否为内嵌文档
    pub embedded: bool,
    /// 是否为抽象模型
    pub is_abstract: bool,
    /// 模型文档说明
    pub description: Option<String>,
}

impl ModelMeta {
    /// 创建顶层文档模型，自动带有 `id` 主键
    pub fn new(name: &str, collection_name: &str) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert("id".to_string(), FieldDefinition::new(FieldKind::ObjectId));
        Self {
            name: name.to_string(),
            collection_name: collection_name.to_string(),
            fields,
            primary_key: "id".to_string(),
            properties: Vec::new(),
            embedded: false,
            is_abstract: false,
            description: None,
        }
    }

    /// 创建内嵌文档模型
    pub fn embedded(name: &str) -> Self {
        Self {
            name: name.to_string(),
            collection_name: String::new(),
            fields: BTreeMap::new(),
            primary_key: "id".to_string(),
            properties: Vec::new(),
            embedded: true,
            is_abstract: false,
            description: None,
        }
    }

    /// 添加字段
    pub fn field(mut self, name: &str, definition: FieldDefinition) -> Self {
        self.fields.insert(name.to_string(), definition);
        self
    }

    /// 声明计算属性
    pub fn property(mut self, name: &str) -> Self {
        self.properties.push(name.to_string());
        self
    }

    /// 设置模型说明
    pub fn description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    /// 标记为抽象模型
    pub fn abstract_model(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// 获取字段定义
    pub fn get_field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.get(name)
    }

    /// 字段是否存在
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// 是否被计算属性遮蔽
    pub fn is_shadowed(&self, name: &str) -> bool {
        self.properties.iter().any(|p| p == name)
    }

    /// 按名称排序的字段，排除给定名称
    pub fn fields_excluding(&self, excluding: &[String]) -> Vec<(&str, &FieldDefinition)> {
        self.fields
            .iter()
            .filter(|(name, _)| !excluding.iter().any(|e| e == *name))
            .map(|(name, def)| (name.as_str(), def))
            .collect()
    }

    /// 引用与懒引用字段
    pub fn reference_fields(&self, excluding: &[String]) -> Vec<(&str, &FieldDefinition)> {
        self.fields_excluding(excluding)
            .into_iter()
            .filter(|(_, def)| {
                matches!(def.kind, FieldKind::Reference { .. } | FieldKind::LazyReference { .. })
            })
            .collect()
    }

    /// 校验是否为合法的文档模型
    pub fn validate(&self) -> QuickGqlResult<()> {
        if self.name.trim().is_empty() {
            return Err(crate::quick_error!(registration, "<unnamed>", "模型名不能为空"));
        }
        if self.is_abstract {
            return Err(crate::quick_error!(registration, self.name, "抽象模型不能绑定图类型"));
        }
        if !self.embedded {
            if self.collection_name.trim().is_empty() {
                return Err(crate::quick_error!(registration, self.name, "顶层文档模型必须声明集合名"));
            }
            if !self.fields.contains_key(&self.primary_key) {
                return Err(crate::quick_error!(
                    registration,
                    self.name,
                    format!("主键字段 '{}' 不存在", self.primary_key)
                ));
            }
        }
        Ok(())
    }
}
