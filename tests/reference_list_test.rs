//! 多态引用列表：批量读取次数与结果顺序

mod common;

use async_trait::async_trait;
use common::*;
use rat_quickgql::store::StoreCall;
use rat_quickgql::*;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;

fn mentions_query(fragments: Vec<(&str, &str)>) -> Selection {
    let mut mentions = Selection::field("mentions").leaves(&["__typename"]);
    for (type_name, field) in fragments {
        mentions = mentions.on(type_name, vec![Selection::field(field)]);
    }
    Selection::field("allReporters")
        .select(Selection::field("edges").select(Selection::field("node").select(mentions)))
}

fn rendered_mentions(data: &Value) -> Vec<Value> {
    data["allReporters"]["edges"][0]["node"]["mentions"]
        .as_array()
        .cloned()
        .unwrap_or_default()
}

fn expected_mentions() -> Vec<Value> {
    vec![
        json!({"__typename": "ArticleNode", "headline": "Article 1"}),
        json!({"__typename": "EditorNode", "firstName": "Penny"}),
        json!({"__typename": "ArticleNode", "headline": "Article 3"}),
        json!({"__typename": "EditorNode", "firstName": "Grace"}),
        json!({"__typename": "ArticleNode", "headline": "Article 1"}),
    ]
}

fn full_query() -> Selection {
    mentions_query(vec![("ArticleNode", "headline"), ("EditorNode", "firstName")])
}

fn batch_ids(store: &MemoryStore, collection: &str) -> Vec<Vec<String>> {
    store
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            StoreCall::FindByIds { collection: c, ids, .. } if c == collection => Some(ids),
            _ => None,
        })
        .collect()
}

#[test]
fn test_one_fetch_per_queried_type() {
    let schema = schema(RegistryKind::SYNC);
    let store = seeded_store();

    let result = schema.execute(&[full_query()], &store);

    assert!(result.is_ok(), "{:?}", result.errors);
    assert_eq!(rendered_mentions(&result.data), expected_mentions());
    assert_eq!(batch_ids(&store, "test_article"), vec![vec!["a1".to_string(), "a3".to_string()]]);
    assert_eq!(batch_ids(&store, "test_editor"), vec![vec!["e0".to_string(), "e1".to_string()]]);
}

#[test]
fn test_unqueried_type_gets_placeholders() {
    let schema = schema(RegistryKind::SYNC);
    let store = seeded_store();

    let result = schema.execute(&[mentions_query(vec![("ArticleNode", "headline")])], &store);

    assert!(result.is_ok(), "{:?}", result.errors);
    let mentions = rendered_mentions(&result.data);
    assert_eq!(mentions.len(), 5);
    assert_eq!(mentions[1], json!({"__typename": "EditorNode"}));
    assert_eq!(mentions[2], json!({"__typename": "ArticleNode", "headline": "Article 3"}));
    assert_eq!(store.fetch_count("test_editor"), 0);
    assert_eq!(store.fetch_count("test_article"), 1);
}

#[test]
fn test_dangling_reference_resolves_to_null() {
    let schema = schema(RegistryKind::SYNC);
    let store = MemoryStore::new();
    store.insert("test_article", Document::new("Article", "a1").with("headline", "Article 1"));
    store.insert(
        "test_reporter",
        Document::new("Reporter", "r1").with(
            "mentions",
            DataValue::Array(vec![
                DocumentRef::new("Article", "gone").into(),
                DocumentRef::new("Article", "a1").into(),
            ]),
        ),
    );

    let result = schema.execute(&[full_query()], &store);

    assert!(result.is_ok(), "{:?}", result.errors);
    assert_eq!(
        rendered_mentions(&result.data),
        vec![Value::Null, json!({"__typename": "ArticleNode", "headline": "Article 1"})]
    );
}

/// 按集合注入延迟的同步存储
struct DelayedStore {
    inner: MemoryStore,
    delays: HashMap<String, Duration>,
}

impl DelayedStore {
    fn pause(&self, collection: &str) {
        if let Some(delay) = self.delays.get(collection) {
            std::thread::sleep(*delay);
        }
    }
}

impl DocumentStore for DelayedStore {
    fn find(&self, collection: &str, options: &QueryOptions) -> QuickGqlResult<Vec<Document>> {
        self.pause(collection);
        DocumentStore::find(&self.inner, collection, options)
    }

    fn count(&self, collection: &str, conditions: &[QueryCondition]) -> QuickGqlResult<Option<u64>> {
        DocumentStore::count(&self.inner, collection, conditions)
    }

    fn find_by_ids(&self, collection: &str, ids: &[String], fields: &[String]) -> QuickGqlResult<Vec<Document>> {
        self.pause(collection);
        DocumentStore::find_by_ids(&self.inner, collection, ids, fields)
    }

    fn get(&self, collection: &str, id: &str, fields: &[String]) -> QuickGqlResult<Option<Document>> {
        DocumentStore::get(&self.inner, collection, id, fields)
    }
}

/// 只实现异步接口、按集合注入延迟的存储
struct AsyncDelayedStore {
    inner: MemoryStore,
    delays: HashMap<String, Duration>,
}

impl AsyncDelayedStore {
    async fn pause(&self, collection: &str) {
        if let Some(delay) = self.delays.get(collection) {
            tokio::time::sleep(*delay).await;
        }
    }
}

#[async_trait]
impl AsyncDocumentStore for AsyncDelayedStore {
    async fn find(&self, collection: &str, options: &QueryOptions) -> QuickGqlResult<Vec<Document>> {
        self.pause(collection).await;
        DocumentStore::find(&self.inner, collection, options)
    }

    async fn count(&self, collection: &str, conditions: &[QueryCondition]) -> QuickGqlResult<Option<u64>> {
        DocumentStore::count(&self.inner, collection, conditions)
    }

    async fn find_by_ids(
        &self,
        collection: &str,
        ids: &[String],
        fields: &[String],
    ) -> QuickGqlResult<Vec<Document>> {
        self.pause(collection).await;
        DocumentStore::find_by_ids(&self.inner, collection, ids, fields)
    }

    async fn get(&self, collection: &str, id: &str, fields: &[String]) -> QuickGqlResult<Option<Document>> {
        DocumentStore::get(&self.inner, collection, id, fields)
    }
}

fn slow_articles() -> HashMap<String, Duration> {
    let mut delays = HashMap::new();
    delays.insert("test_article".to_string(), Duration::from_millis(80));
    delays
}

#[test]
fn test_order_kept_when_first_type_finishes_last_sync() {
    println!("🔍 文章集合延迟返回，检查线程池合并后的顺序");
    let schema = schema(RegistryKind::SYNC);
    let store = DelayedStore {
        inner: seeded_store(),
        delays: slow_articles(),
    };

    let result = schema.execute(&[full_query()], &store);

    assert!(result.is_ok(), "{:?}", result.errors);
    assert_eq!(rendered_mentions(&result.data), expected_mentions());
    assert_eq!(store.inner.fetch_count("test_article"), 1);
    assert_eq!(store.inner.fetch_count("test_editor"), 1);
}

#[tokio::test]
async fn test_order_kept_when_first_type_finishes_last_async() {
    let schema = schema(RegistryKind::ASYNC);
    let store = AsyncDelayedStore {
        inner: seeded_store(),
        delays: slow_articles(),
    };

    let result = schema.execute_async(&[full_query()], &store).await;

    assert!(result.is_ok(), "{:?}", result.errors);
    assert_eq!(rendered_mentions(&result.data), expected_mentions());
    assert_eq!(store.inner.fetch_count("test_article"), 1);
    assert_eq!(store.inner.fetch_count("test_editor"), 1);
}

#[tokio::test]
async fn test_async_execution_with_sync_store() {
    let schema = schema(RegistryKind::ASYNC);
    let store = seeded_store();

    let query = connection("allArticles", &["headline"]).arg("last", 1);
    let result = schema.execute_async(&[query], &store).await;

    assert!(result.is_ok(), "{:?}", result.errors);
    assert_eq!(node_values(&result.data, "allArticles", "headline"), vec![&json!("Article 9")]);
}

#[test]
fn test_sync_schema_rejects_async_registry_mismatch() {
    let schema = schema(RegistryKind::SYNC);
    let store = seeded_store();

    let result = futures::executor::block_on(schema.execute_async(&[full_query()], &store));

    assert!(!result.is_ok());
    assert!(result.errors[0].path.is_empty());
    assert!(store.calls().is_empty());
}
