//! 集成测试共用的模型与数据

#![allow(dead_code)]

use rat_quickgql::*;
use std::sync::Arc;

pub fn editor_meta() -> ModelMeta {
    ModelMeta::new("Editor", "test_editor")
        .field("first_name", string_field().required())
        .field("last_name", string_field())
}

pub fn article_meta() -> ModelMeta {
    ModelMeta::new("Article", "test_article")
        .field("headline", string_field().required())
        .field("pub_date", integer_field())
        .field("editor", reference_field("Editor"))
}

pub fn reporter_meta() -> ModelMeta {
    ModelMeta::new("Reporter", "test_reporter")
        .field("first_name", string_field())
        .field("articles", list_field(reference_field("Article")))
        .field("mentions", list_field(generic_reference_field(&["Article", "Editor"])))
}

pub struct Editor;
pub struct Article;
pub struct Reporter;

impl Model for Editor {
    fn meta() -> ModelMeta {
        editor_meta()
    }
}

impl Model for Article {
    fn meta() -> ModelMeta {
        article_meta()
    }
}

impl Model for Reporter {
    fn meta() -> ModelMeta {
        reporter_meta()
    }
}

/// 注册三个节点类型；Reporter 先于它引用的类型注册
pub fn registry(kind: RegistryKind) -> Arc<TypeRegistry> {
    let mut builder = RegistryBuilder::new(kind);
    builder
        .register(GraphType::for_model::<Reporter>("ReporterNode").node().registry(kind))
        .expect("注册 ReporterNode");
    builder
        .register(GraphType::for_model::<Article>("ArticleNode").node().registry(kind))
        .expect("注册 ArticleNode");
    builder
        .register(GraphType::for_model::<Editor>("EditorNode").node().registry(kind))
        .expect("注册 EditorNode");
    builder.finalize().expect("注册表收敛")
}

pub fn schema(kind: RegistryKind) -> Schema {
    Schema::builder(registry(kind))
        .connection_field("allArticles", "ArticleNode")
        .connection_field("allReporters", "ReporterNode")
        .connection_field("allEditors", "EditorNode")
        .node_field()
        .build()
        .expect("构建模式")
}

/// 10 篇文章 a0..a9，编辑 e0/e1 轮流负责；记者 r1 写了前五篇
pub fn seeded_store() -> MemoryStore {
    let store = MemoryStore::new();
    store.insert("test_editor", Document::new("Editor", "e0").with("first_name", "Penny"));
    store.insert("test_editor", Document::new("Editor", "e1").with("first_name", "Grace"));
    store.insert_many(
        "test_article",
        (0..10).map(|i: i64| {
            Document::new("Article", format!("a{}", i))
                .with("headline", format!("Article {}", i))
                .with("pub_date", i)
                .with("editor", DocumentRef::new("Editor", format!("e{}", i % 2)))
        }),
    );
    let articles: Vec<DataValue> = (0..5)
        .map(|i| DataValue::from(DocumentRef::new("Article", format!("a{}", i))))
        .collect();
    store.insert(
        "test_reporter",
        Document::new("Reporter", "r1")
            .with("first_name", "Allen")
            .with("articles", DataValue::Array(articles))
            .with("mentions", DataValue::Array(mentions())),
    );
    store.clear_calls();
    store
}

/// 交错的多态引用，其中 a1 出现两次
pub fn mentions() -> Vec<DataValue> {
    vec![
        DocumentRef::new("Article", "a1").into(),
        DocumentRef::new("Editor", "e0").into(),
        DocumentRef::new("Article", "a3").into(),
        DocumentRef::new("Editor", "e1").into(),
        DocumentRef::new("Article", "a1").into(),
    ]
}

/// `edges { cursor node { … } }` 形状的连接选择
pub fn connection(name: &str, node_fields: &[&str]) -> Selection {
    Selection::field(name).select(
        Selection::field("edges")
            .leaves(&["cursor"])
            .select(Selection::field("node").leaves(node_fields)),
    )
}

pub fn page_info() -> Selection {
    Selection::field("pageInfo").leaves(&["hasNextPage", "hasPreviousPage", "startCursor", "endCursor"])
}

/// 取出连接中每个节点的某个字段
pub fn node_values<'a>(data: &'a serde_json::Value, root: &str, field: &str) -> Vec<&'a serde_json::Value> {
    data[root]["edges"]
        .as_array()
        .map(|edges| edges.iter().map(|edge| &edge["node"][field]).collect())
        .unwrap_or_default()
}
