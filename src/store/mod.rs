//! 文档存储接口模块
//!
//! 解析器只通过这里定义的接口访问存储：过滤/投影/排序/分页查询、计数、
//! 按主键读取。每次调用都显式携带投影与 `no_dereference`，
//! 由解析器决定何时以及读取多少数据

use crate::error::QuickGqlResult;
use crate::types::*;
use async_trait::async_trait;

pub mod memory;

pub use memory::{MemoryStore, StoreCall};

/// 同步文档存储接口
pub trait DocumentStore: Send + Sync {
    /// 执行查询
    fn find(&self, collection: &str, options: &QueryOptions) -> QuickGqlResult<Vec<Document>>;

    /// 统计满足条件的记录数
    ///
    /// 返回 `None` 表示存储无法给出计数
    fn count(&self, collection: &str, conditions: &[QueryCondition]) -> QuickGqlResult<Option<u64>>;

    /// 按主键批量读取，返回顺序由存储决定
    fn find_by_ids(
        &self,
        collection: &str,
        ids: &[String],
        fields: &[String],
    ) -> QuickGqlResult<Vec<Document>> {
        let ids = ids.iter().map(|id| DataValue::String(id.clone())).collect();
        let options = QueryOptions::new()
            .with_conditions(vec![QueryCondition::new("id", QueryOperator::In, DataValue::Array(ids))])
            .with_fields(fields.to_vec())
            .no_dereference();
        self.find(collection, &options)
    }

    /// 按主键读取单条记录
    fn get(&self, collection: &str, id: &str, fields: &[String]) -> QuickGqlResult<Option<Document>>;
}

/// 异步文档存储接口
#[async_trait]
pub trait AsyncDocumentStore: Send + Sync {
    /// 执行查询
    async fn find(&self, collection: &str, options: &QueryOptions) -> QuickGqlResult<Vec<Document>>;

    /// 统计满足条件的记录数
    async fn count(&self, collection: &str, conditions: &[QueryCondition]) -> QuickGqlResult<Option<u64>>;

    /// 按主键批量读取
    async fn find_by_ids(
        &self,
        collection: &str,
        ids: &[String],
        fields: &[String],
    ) -> QuickGqlResult<Vec<Document>>;

    /// 按主键读取单条记录
    async fn get(&self, collection: &str, id: &str, fields: &[String]) -> QuickGqlResult<Option<Document>>;
}

/// 同步存储直接作为异步存储使用（调用在当前任务内完成）
#[async_trait]
impl<T: DocumentStore> AsyncDocumentStore for T {
    async fn find(&self, collection: &str, options: &QueryOptions) -> QuickGqlResult<Vec<Document>> {
        DocumentStore::find(self, collection, options)
    }

    async fn count(&self, collection: &str, conditions: &[QueryCondition]) -> QuickGqlResult<Option<u64>> {
        DocumentStore::count(self, collection, conditions)
    }

    async fn find_by_ids(
        &self,
        collection: &str,
        ids: &[String],
        fields: &[String],
    ) -> QuickGqlResult<Vec<Document>> {
        DocumentStore::find_by_ids(self, collection, ids, fields)
    }

    async fn get(&self, collection: &str, id: &str, fields: &[String]) -> QuickGqlResult<Option<Document>> {
        DocumentStore::get(self, collection, id, fields)
    }
}
