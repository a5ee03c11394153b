//! 图类型描述
//!
//! 一个 [`GraphType`] 绑定且只绑定一个模型；注册表在 `finalize` 之后
//! 把它解析为字段齐全的 [`BoundType`]

use crate::model::{EnumDefinition, ModelMeta};
use crate::schema::filters::FilterArgument;
use crate::types::QueryOperator;
use convert_case::{Case, Casing};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// 字段解析的执行方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ExecutorMode {
    /// 阻塞式解析
    #[default]
    Sync,
    /// 非阻塞解析
    Async,
}

/// 注册表种类：执行方式 × 输出/输入变体
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RegistryKind {
    pub mode: ExecutorMode,
    pub input: bool,
}

impl RegistryKind {
    pub const SYNC: RegistryKind = RegistryKind { mode: ExecutorMode::Sync, input: false };
    pub const ASYNC: RegistryKind = RegistryKind { mode: ExecutorMode::Async, input: false };
    pub const SYNC_INPUT: RegistryKind = RegistryKind { mode: ExecutorMode::Sync, input: true };
    pub const ASYNC_INPUT: RegistryKind = RegistryKind { mode: ExecutorMode::Async, input: true };
}

impl std::fmt::Display for RegistryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mode = match self.mode {
            ExecutorMode::Sync => "sync",
            ExecutorMode::Async => "async",
        };
        if self.input {
            write!(f, "{}-input", mode)
        } else {
            write!(f, "{}", mode)
        }
    }
}

/// 标量类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GraphScalar {
    String,
    ID,
    Int,
    Float,
    Decimal,
    Boolean,
    DateTime,
    Date,
    JSONString,
}

impl GraphScalar {
    pub fn name(&self) -> &'static str {
        match self {
            GraphScalar::String => "String",
            GraphScalar::ID => "ID",
            GraphScalar::Int => "Int",
            GraphScalar::Float => "Float",
            GraphScalar::Decimal => "Decimal",
            GraphScalar::Boolean => "Boolean",
            GraphScalar::DateTime => "DateTime",
            GraphScalar::Date => "Date",
            GraphScalar::JSONString => "JSONString",
        }
    }
}

/// 高级类型（地理与文件）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdvancedKind {
    File,
    Point,
    Polygon,
    MultiPolygon,
}

impl AdvancedKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            AdvancedKind::File => "FileFieldType",
            AdvancedKind::Point => "PointFieldType",
            AdvancedKind::Polygon => "PolygonFieldType",
            AdvancedKind::MultiPolygon => "MultiPolygonFieldType",
        }
    }
}

/// 为多态引用合成的联合类型
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnionType {
    /// 由所属类型与字段名确定的名称
    pub name: String,
    /// 成员图类型名
    pub members: Vec<String>,
}

/// 图字段的类型
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GraphFieldType {
    Scalar(GraphScalar),
    Enum(EnumDefinition),
    Advanced(AdvancedKind),
    /// 对象类型（按图类型名）
    Object(String),
    List(Box<GraphFieldType>),
    /// 分页连接
    Connection { node: String, connection: String },
    Union(UnionType),
}

impl GraphFieldType {
    /// 类型的书面名称，如 `[ArticleNode]`
    pub fn type_name(&self) -> String {
        match self {
            GraphFieldType::Scalar(s) => s.name().to_string(),
            GraphFieldType::Enum(e) => e.name.clone(),
            GraphFieldType::Advanced(a) => a.type_name().to_string(),
            GraphFieldType::Object(name) => name.clone(),
            GraphFieldType::List(inner) => format!("[{}]", inner.type_name()),
            GraphFieldType::Connection { connection, .. } => connection.clone(),
            GraphFieldType::Union(u) => u.name.clone(),
        }
    }
}

/// 字段解析策略
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldResolver {
    /// 直接读取文档属性
    Attribute,
    /// 内嵌文档或内嵌文档列表
    Embedded,
    /// 高级类型，由子解析器读取
    Advanced(AdvancedKind),
    /// 单个引用，按主键投影读取
    Reference { model: String, lazy: bool },
    /// 同一模型的引用列表
    ReferenceList { model: String },
    /// 嵌套分页连接
    Connection { model: String },
    /// 多态引用
    Union { lazy: bool },
    /// 多态引用列表，按类型分批读取
    PolymorphicList,
}

/// 图字段描述
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphField {
    /// 字段名（模型属性名）
    pub name: String,
    pub field_type: GraphFieldType,
    pub description: Option<String>,
    pub required: bool,
    pub resolver: FieldResolver,
}

impl GraphField {
    pub fn new(name: &str, field_type: GraphFieldType, resolver: FieldResolver) -> Self {
        Self {
            name: name.to_string(),
            field_type,
            description: None,
            required: false,
            resolver,
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// 是否为分页连接字段
    pub fn is_connection(&self) -> bool {
        matches!(self.field_type, GraphFieldType::Connection { .. })
    }
}

/// 类型声明选项
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphTypeOptions {
    /// 只暴露这些字段（空表示全部）
    pub only_fields: Vec<String>,
    /// 不暴露这些字段
    pub exclude_fields: Vec<String>,
    /// 总是读取的字段
    pub required_fields: Vec<String>,
    /// 即使模型声明必填也视为可空
    pub non_required_fields: Vec<String>,
    /// 过滤字段 -> 允许的操作符
    pub filter_fields: BTreeMap<String, Vec<QueryOperator>>,
    /// 不生成过滤参数的字段
    pub non_filter_fields: Vec<String>,
    /// 实现 Node 接口
    pub node: bool,
    /// 是否创建连接类型，None 表示实现 Node 时自动创建
    pub use_connection: Option<bool>,
    /// 自定义连接类型名
    pub connection: Option<String>,
    /// 默认排序，如 `-pub_date`
    pub order_by: Option<String>,
    /// 不写入注册表
    pub skip_registry: bool,
    /// 所属注册表
    pub registry: RegistryKind,
    pub description: Option<String>,
}

/// 图类型声明
#[derive(Debug, Clone)]
pub struct GraphType {
    pub name: String,
    pub model: Arc<ModelMeta>,
    pub options: GraphTypeOptions,
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl GraphType {
    /// 声明绑定到模型的图类型
    pub fn new(name: &str, model: ModelMeta) -> Self {
        Self {
            name: name.to_string(),
            model: Arc::new(model),
            options: GraphTypeOptions::default(),
        }
    }

    /// 为实现了 `Model` 的类型声明图类型
    pub fn for_model<M: crate::model::Model>(name: &str) -> Self {
        Self::new(name, M::meta())
    }

    /// 实现 Node 接口
    pub fn node(mut self) -> Self {
        self.options.node = true;
        self
    }

    pub fn only_fields(mut self, fields: &[&str]) -> Self {
        self.options.only_fields = to_strings(fields);
        self
    }

    pub fn exclude_fields(mut self, fields: &[&str]) -> Self {
        self.options.exclude_fields = to_strings(fields);
        self
    }

    pub fn required_fields(mut self, fields: &[&str]) -> Self {
        self.options.required_fields = to_strings(fields);
        self
    }

    pub fn non_required_fields(mut self, fields: &[&str]) -> Self {
        self.options.non_required_fields = to_strings(fields);
        self
    }

    /// 为字段声明允许的过滤操作符
    pub fn filter_field(mut self, field: &str, operators: &[QueryOperator]) -> Self {
        self.options
            .filter_fields
            .insert(field.to_string(), operators.to_vec());
        self
    }

    pub fn non_filter_fields(mut self, fields: &[&str]) -> Self {
        self.options.non_filter_fields = to_strings(fields);
        self
    }

    /// 显式开启或关闭连接类型
    pub fn use_connection(mut self, enabled: bool) -> Self {
        self.options.use_connection = Some(enabled);
        self
    }

    pub fn connection(mut self, name: &str) -> Self {
        self.options.connection = Some(name.to_string());
        self
    }

    pub fn order_by(mut self, clause: &str) -> Self {
        self.options.order_by = Some(clause.to_string());
        self
    }

    pub fn skip_registry(mut self) -> Self {
        self.options.skip_registry = true;
        self
    }

    pub fn registry(mut self, kind: RegistryKind) -> Self {
        self.options.registry = kind;
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.options.description = Some(description.to_string());
        self
    }

    /// 连接类型名；实现 Node 时自动生成 `<Name>Connection`
    pub fn connection_name(&self) -> Option<String> {
        let enabled = self.options.use_connection.unwrap_or(self.options.node);
        if !enabled {
            return None;
        }
        Some(
            self.options
                .connection
                .clone()
                .unwrap_or_else(|| format!("{}Connection", self.name)),
        )
    }

    /// 经过 only/exclude 筛选后需要转换的模型字段名
    pub(crate) fn exposed_field_names(&self) -> Vec<String> {
        self.model
            .fields
            .keys()
            .filter(|name| {
                self.options.only_fields.is_empty() || self.options.only_fields.contains(name)
            })
            .filter(|name| !self.options.exclude_fields.contains(name))
            .cloned()
            .collect()
    }
}

/// 注册表中字段齐全的图类型
#[derive(Debug, Clone)]
pub struct BoundType {
    pub name: String,
    pub model: Arc<ModelMeta>,
    pub options: GraphTypeOptions,
    pub fields: BTreeMap<String, GraphField>,
    pub connection: Option<String>,
    pub filter_arguments: Vec<FilterArgument>,
}

impl BoundType {
    pub fn is_node(&self) -> bool {
        self.options.node
    }

    pub fn has_connection(&self) -> bool {
        self.connection.is_some()
    }

    pub fn field(&self, name: &str) -> Option<&GraphField> {
        self.fields.get(name)
    }

    /// 按查询中的字段名查找（接受 camelCase）
    pub fn field_for_selection(&self, selection_name: &str) -> Option<&GraphField> {
        self.fields
            .get(selection_name)
            .or_else(|| self.fields.get(&selection_name.to_case(Case::Snake)))
    }

    /// 所有连接字段名
    pub fn connection_field_names(&self) -> BTreeSet<String> {
        self.fields
            .values()
            .filter(|f| f.is_connection())
            .map(|f| f.name.clone())
            .collect()
    }

    pub fn filter_argument(&self, name: &str) -> Option<&FilterArgument> {
        self.filter_arguments.iter().find(|a| a.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_name_defaults() {
        let meta = ModelMeta::new("Article", "test_article");
        let plain = GraphType::new("ArticleType", meta.clone());
        assert_eq!(plain.connection_name(), None);

        let node = GraphType::new("ArticleNode", meta.clone()).node();
        assert_eq!(node.connection_name().as_deref(), Some("ArticleNodeConnection"));

        let disabled = GraphType::new("ArticleNode", meta.clone()).node().use_connection(false);
        assert_eq!(disabled.connection_name(), None);

        let named = GraphType::new("ArticleNode", meta).node().connection("Articles");
        assert_eq!(named.connection_name().as_deref(), Some("Articles"));
    }

    #[test]
    fn test_exposed_fields_only_and_exclude() {
        let meta = ModelMeta::new("Reporter", "test_reporter")
            .field("first_name", crate::model::string_field())
            .field("last_name", crate::model::string_field())
            .field("email", crate::model::email_field());
        let ty = GraphType::new("ReporterType", meta.clone()).only_fields(&["id", "first_name", "email"]);
        assert_eq!(ty.exposed_field_names(), vec!["email", "first_name", "id"]);
        let ty = GraphType::new("ReporterType", meta).exclude_fields(&["email"]);
        assert_eq!(ty.exposed_field_names(), vec!["first_name", "id", "last_name"]);
    }
}
