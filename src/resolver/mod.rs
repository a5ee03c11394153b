//! 解析器模块
//!
//! 游标编解码、分页窗口、连接解析、引用与联合解析，以及把它们串起来的执行器

pub mod connection;
pub mod cursor;
pub mod executor;
pub mod fetch;
pub mod list_reference;
pub mod node;
pub mod reference;
pub mod selection;
pub mod union;
pub mod window;

pub use connection::{resolve_connection, Connection, ConnectionArgs, ConnectionSource, Edge, PageInfo};
pub use cursor::{decode_cursor, encode_cursor};
pub use executor::{ExecutionResult, FieldError};
pub use fetch::{BatchTask, StoreHandle};
pub use list_reference::resolve_reference_list;
pub use node::{from_global_id, get_node, get_node_async, to_global_id};
pub use reference::resolve_reference;
pub use selection::{has_page_info, query_fields, queried_union_types, QueryFields, Selection, SelectionNode};
pub use union::resolve_union;
pub use window::{CursorArgs, PageWindow};

use crate::config::ResolverConfig;
use crate::schema::graph_type::BoundType;
use crate::schema::registry::TypeRegistry;
use crate::types::QueryOptions;
use convert_case::{Case, Casing};
use parking_lot::Mutex;
use std::sync::Arc;

/// 连接解析器最近一次发出的存储查询（不含分页窗口）
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveQuery {
    pub collection: String,
    pub options: QueryOptions,
}

/// 单次查询的解析上下文
///
/// 持有只读注册表与配置；`active_query` 只属于这一次查询，不在并发查询间共享
pub struct QueryContext {
    registry: Arc<TypeRegistry>,
    config: Arc<ResolverConfig>,
    active_query: Mutex<Option<ActiveQuery>>,
}

impl QueryContext {
    pub fn new(registry: Arc<TypeRegistry>, config: Arc<ResolverConfig>) -> Self {
        Self {
            registry,
            config,
            active_query: Mutex::new(None),
        }
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn set_active_query(&self, query: ActiveQuery) {
        *self.active_query.lock() = Some(query);
    }

    pub fn active_query(&self) -> Option<ActiveQuery> {
        self.active_query.lock().clone()
    }
}

/// 读取时的投影字段
///
/// 类型声明的必需字段与查询实际请求的字段之并，只保留模型上存在的属性；
/// 主键总会被存储返回，不出现在投影中
pub fn required_fields(bound: &BoundType, queried: &QueryFields) -> Vec<String> {
    let model = &bound.model;
    let mut fields: Vec<String> = Vec::new();
    let candidates = bound
        .options
        .required_fields
        .iter()
        .cloned()
        .chain(queried.names().map(|name| name.to_case(Case::Snake)));
    for name in candidates {
        if name == model.primary_key || !model.has_field(&name) {
            continue;
        }
        if !fields.contains(&name) {
            fields.push(name);
        }
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::*;
    use crate::schema::graph_type::{GraphType, RegistryKind};
    use crate::schema::registry::RegistryBuilder;

    #[test]
    fn test_required_fields_projection() {
        let meta = ModelMeta::new("Article", "test_article")
            .field("headline", string_field())
            .field("pub_date", datetime_field())
            .field("editor", reference_field("Editor"))
            .property("summary");
        let mut builder = RegistryBuilder::new(RegistryKind::SYNC);
        builder
            .register(GraphType::new("ArticleNode", meta).node().required_fields(&["headline"]))
            .unwrap();
        let registry = builder.finalize().unwrap();
        let bound = registry.get_type_by_name("ArticleNode").unwrap();

        let selection = Selection::field("article")
            .leaves(&["id", "pubDate", "summary", "__typename", "headline"])
            .select(Selection::field("editor").leaves(&["firstName"]));
        let fields = required_fields(&bound, &query_fields(&selection));
        assert_eq!(fields, vec!["headline", "editor", "pub_date"]);
    }

    #[test]
    fn test_active_query_is_per_context() {
        let registry = RegistryBuilder::new(RegistryKind::SYNC).finalize().unwrap();
        let config = Arc::new(ResolverConfig::default());
        let first = QueryContext::new(registry.clone(), config.clone());
        let second = QueryContext::new(registry, config);
        first.set_active_query(ActiveQuery {
            collection: "test_article".to_string(),
            options: QueryOptions::new(),
        });
        assert!(first.active_query().is_some());
        assert!(second.active_query().is_none());
    }
}
