//! 模式绑定模块
//!
//! 图类型声明、字段转换、注册表、过滤参数与高级类型，以及对外的 [`Schema`]

pub mod advanced_types;
pub mod converter;
pub mod filters;
pub mod graph_type;
pub mod registry;

pub use advanced_types::{render_advanced, FileValue, GeometryValue};
pub use converter::{convert_field, field_description, union_type_name, Binding, DeferredBinding, TypeHandle, TypeLookup};
pub use filters::{generate_filter_arguments, materialize_filters, FilterArgument, FilterValueKind};
pub use graph_type::*;
pub use registry::{EnumCache, RegistryBuilder, TypeRegistry};

use crate::config::ResolverConfig;
use crate::error::QuickGqlResult;
use crate::resolver::executor::{ExecutionResult, Executor, FieldError};
use crate::resolver::fetch::StoreHandle;
use crate::resolver::selection::Selection;
use crate::resolver::QueryContext;
use crate::store::{AsyncDocumentStore, DocumentStore};
use rat_logger::info;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// 根查询字段
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RootField {
    /// 某个类型的整个集合，按连接分页
    Connection { type_name: String },
    /// 按全局ID读取任意节点
    Node,
}

/// 模式构建器
pub struct SchemaBuilder {
    registry: Arc<TypeRegistry>,
    config: Option<ResolverConfig>,
    root: BTreeMap<String, RootField>,
}

impl SchemaBuilder {
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        Self {
            registry,
            config: None,
            root: BTreeMap::new(),
        }
    }

    /// 解析器配置，不设置时使用默认配置
    pub fn config(mut self, config: ResolverConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// 添加根连接字段
    pub fn connection_field(mut self, name: &str, type_name: &str) -> Self {
        self.root.insert(
            name.to_string(),
            RootField::Connection {
                type_name: type_name.to_string(),
            },
        );
        self
    }

    /// 添加 `node(id:)` 根字段
    pub fn node_field(mut self) -> Self {
        self.root.insert("node".to_string(), RootField::Node);
        self
    }

    /// 构建模式
    ///
    /// 输入变体注册表不能用于查询；根连接字段的类型必须已注册且带连接类型
    pub fn build(self) -> QuickGqlResult<Schema> {
        if self.registry.kind().input {
            return Err(crate::quick_error!(
                schema,
                format!("注册表 {} 是输入变体，不能用于查询", self.registry.kind())
            ));
        }
        for (name, field) in &self.root {
            let RootField::Connection { type_name } = field else {
                continue;
            };
            let bound = self.registry.get_type_by_name(type_name).ok_or_else(|| {
                crate::quick_error!(schema, format!("根字段 {} 的类型 {} 未注册", name, type_name))
            })?;
            if !bound.has_connection() {
                return Err(crate::quick_error!(
                    schema,
                    format!("根字段 {} 的类型 {} 没有连接类型", name, type_name)
                ));
            }
        }
        if let Some(config) = &self.config {
            config.validate()?;
        }

        info!(
            "模式构建完成: {} 个根字段, {} 个类型 (注册表={})",
            self.root.len(),
            self.registry.len(),
            self.registry.kind()
        );
        Ok(Schema {
            registry: self.registry,
            config: Arc::new(self.config.unwrap_or_default()),
            root: self.root,
        })
    }
}

/// 可执行的模式
pub struct Schema {
    registry: Arc<TypeRegistry>,
    config: Arc<ResolverConfig>,
    root: BTreeMap<String, RootField>,
}

impl Schema {
    pub fn builder(registry: Arc<TypeRegistry>) -> SchemaBuilder {
        SchemaBuilder::new(registry)
    }

    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn root_fields(&self) -> impl Iterator<Item = (&String, &RootField)> {
        self.root.iter()
    }

    fn context(&self) -> QueryContext {
        QueryContext::new(self.registry.clone(), self.config.clone())
    }

    fn mode_mismatch(&self, expected: ExecutorMode) -> Option<ExecutionResult> {
        let kind = self.registry.kind();
        if kind.mode == expected {
            return None;
        }
        let err = crate::quick_error!(
            schema,
            format!("注册表 {} 与执行方式 {:?} 不一致", kind, expected)
        );
        Some(ExecutionResult {
            data: Value::Null,
            errors: vec![FieldError {
                path: Vec::new(),
                message: err.to_string(),
                usage: false,
            }],
        })
    }

    /// 阻塞执行查询
    ///
    /// 要求注册表为同步种类；引用列表的批量读取在固定大小的线程池中完成
    pub fn execute(&self, selections: &[Selection], store: &dyn DocumentStore) -> ExecutionResult {
        if let Some(result) = self.mode_mismatch(ExecutorMode::Sync) {
            return result;
        }
        let executor = Executor::new(self.context(), StoreHandle::Sync(store), &self.root);
        futures::executor::block_on(executor.run(selections))
    }

    /// 非阻塞执行查询
    ///
    /// 要求注册表为异步种类；批量读取为每个目标类型创建一个任务并一起等待
    pub async fn execute_async(&self, selections: &[Selection], store: &dyn AsyncDocumentStore) -> ExecutionResult {
        if let Some(result) = self.mode_mismatch(ExecutorMode::Async) {
            return result;
        }
        let executor = Executor::new(self.context(), StoreHandle::Async(store), &self.root);
        executor.run(selections).await
    }
}
