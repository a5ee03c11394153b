//! 连接分页的端到端测试

mod common;

use common::*;
use rat_quickgql::store::StoreCall;
use rat_quickgql::*;
use serde_json::json;

fn headlines(result: &ExecutionResult, root: &str) -> Vec<String> {
    node_values(&result.data, root, "headline")
        .into_iter()
        .filter_map(|v| v.as_str().map(str::to_string))
        .collect()
}

fn cursors(result: &ExecutionResult, root: &str) -> Vec<String> {
    result.data[root]["edges"]
        .as_array()
        .map(|edges| {
            edges
                .iter()
                .filter_map(|edge| edge["cursor"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

#[test]
fn test_first_page_with_page_info() {
    println!("🔍 测试 first=3, 共10条");
    let schema = schema(RegistryKind::SYNC);
    let store = seeded_store();

    let query = connection("allArticles", &["id", "headline"])
        .arg("first", 3)
        .select(page_info());
    let result = schema.execute(&[query], &store);

    assert!(result.is_ok(), "{:?}", result.errors);
    assert_eq!(headlines(&result, "allArticles"), vec!["Article 0", "Article 1", "Article 2"]);
    assert_eq!(
        cursors(&result, "allArticles"),
        (0..3).map(encode_cursor).collect::<Vec<_>>()
    );
    assert_eq!(
        node_values(&result.data, "allArticles", "id")[0],
        &json!(to_global_id("ArticleNode", "a0"))
    );

    let page = &result.data["allArticles"]["pageInfo"];
    assert_eq!(page["hasNextPage"], json!(true));
    assert_eq!(page["hasPreviousPage"], json!(false));
    assert_eq!(page["startCursor"], json!(encode_cursor(0)));
    assert_eq!(page["endCursor"], json!(encode_cursor(2)));

    let calls = store.calls();
    assert_eq!(calls.len(), 2);
    assert!(matches!(&calls[0], StoreCall::Count { collection, .. } if collection == "test_article"));
    match &calls[1] {
        StoreCall::Find { collection, options } => {
            assert_eq!(collection, "test_article");
            assert!(options.no_dereference);
            assert_eq!(options.fields, vec!["headline".to_string()]);
            let pagination = options.pagination.as_ref().unwrap();
            assert_eq!((pagination.skip, pagination.limit), (0, Some(3)));
        }
        other => panic!("期望 Find 调用, 实际 {:?}", other),
    }
}

#[test]
fn test_last_page_uses_count() {
    let schema = schema(RegistryKind::SYNC);
    let store = seeded_store();

    let query = connection("allArticles", &["headline"])
        .arg("last", 2)
        .select(page_info());
    let result = schema.execute(&[query], &store);

    assert!(result.is_ok(), "{:?}", result.errors);
    assert_eq!(headlines(&result, "allArticles"), vec!["Article 8", "Article 9"]);
    assert_eq!(cursors(&result, "allArticles"), vec![encode_cursor(8), encode_cursor(9)]);
    let page = &result.data["allArticles"]["pageInfo"];
    assert_eq!(page["hasPreviousPage"], json!(true));
    assert_eq!(page["hasNextPage"], json!(false));
}

#[test]
fn test_last_without_count_is_usage_error() {
    let schema = schema(RegistryKind::SYNC);
    let store = seeded_store();
    store.set_count_available(false);

    let result = schema.execute(&[connection("allArticles", &["headline"]).arg("last", 2)], &store);

    let error = result.error_at(&["allArticles"]).expect("allArticles 上应有错误");
    assert!(error.usage);
    assert_eq!(result.data["allArticles"], json!(null));
    assert_eq!(store.fetch_count("test_article"), 0);
}

#[test]
fn test_first_and_last_without_count_is_usage_error() {
    let schema = schema(RegistryKind::SYNC);
    let store = seeded_store();
    store.set_count_available(false);

    let query = connection("allArticles", &["headline"]).arg("first", 2).arg("last", 3);
    let result = schema.execute(&[query], &store);

    let error = result.error_at(&["allArticles"]).expect("allArticles 上应有错误");
    assert!(error.usage);
    assert_eq!(result.data["allArticles"], json!(null));
    assert_eq!(store.fetch_count("test_article"), 0);
}

#[test]
fn test_first_only_skips_count() {
    let schema = schema(RegistryKind::SYNC);
    let store = seeded_store();

    let result = schema.execute(&[connection("allArticles", &["headline"]).arg("first", 2)], &store);

    assert!(result.is_ok());
    assert_eq!(headlines(&result, "allArticles").len(), 2);
    assert!(!store.calls().iter().any(|c| matches!(c, StoreCall::Count { .. })));
}

#[test]
fn test_first_after_cursor() {
    let schema = schema(RegistryKind::SYNC);
    let store = seeded_store();

    let query = connection("allArticles", &["headline"])
        .arg("first", 3)
        .arg("after", encode_cursor(4))
        .select(page_info());
    let result = schema.execute(&[query], &store);

    assert!(result.is_ok(), "{:?}", result.errors);
    assert_eq!(headlines(&result, "allArticles"), vec!["Article 5", "Article 6", "Article 7"]);
    assert_eq!(cursors(&result, "allArticles")[0], encode_cursor(5));
    assert_eq!(result.data["allArticles"]["pageInfo"]["hasPreviousPage"], json!(true));
    assert_eq!(result.data["allArticles"]["pageInfo"]["hasNextPage"], json!(true));
}

#[test]
fn test_malformed_cursor_is_isolated() {
    let schema = schema(RegistryKind::SYNC);
    let store = seeded_store();

    let broken = connection("allArticles", &["headline"]).arg("after", "not-a-cursor");
    let sibling = connection("allEditors", &["firstName"]).arg("first", 1);
    let result = schema.execute(&[broken, sibling], &store);

    assert_eq!(result.errors.len(), 1);
    let error = result.error_at(&["allArticles"]).unwrap();
    assert!(error.usage);
    assert_eq!(result.data["allArticles"], json!(null));
    assert_eq!(node_values(&result.data, "allEditors", "firstName"), vec![&json!("Penny")]);
}

#[test]
fn test_field_error_message_follows_language() {
    rat_quickgql::init();
    rat_quickgql::i18n::set_language("en-US");
    let schema = schema(RegistryKind::SYNC);
    let store = seeded_store();

    let broken = connection("allArticles", &["headline"]).arg("after", "not-a-cursor");
    let result = schema.execute(&[broken], &store);

    let error = result.error_at(&["allArticles"]).unwrap();
    assert!(error.message.starts_with("Invalid cursor 'not-a-cursor'"), "{}", error.message);
}

#[test]
fn test_max_offset_cursor_is_isolated() {
    let schema = schema(RegistryKind::SYNC);
    let store = seeded_store();

    let broken = connection("allArticles", &["headline"])
        .arg("first", 2)
        .arg("after", encode_cursor(u64::MAX));
    let sibling = connection("allEditors", &["firstName"]).arg("first", 1);
    let result = schema.execute(&[broken, sibling], &store);

    assert_eq!(result.errors.len(), 1);
    assert!(result.error_at(&["allArticles"]).unwrap().usage);
    assert_eq!(result.data["allArticles"], json!(null));
    assert_eq!(node_values(&result.data, "allEditors", "firstName"), vec![&json!("Penny")]);
    assert_eq!(store.fetch_count("test_article"), 0);
}

#[test]
fn test_filter_arguments() {
    let schema = schema(RegistryKind::SYNC);
    let store = seeded_store();

    let by_editor = connection("allArticles", &["headline"])
        .alias("graceArticles")
        .arg("editor", to_global_id("EditorNode", "e1"));
    let by_date = connection("allArticles", &["headline"])
        .alias("datedArticles")
        .arg("pub_date", 4);
    let result = schema.execute(&[by_editor, by_date], &store);

    assert!(result.is_ok(), "{:?}", result.errors);
    assert_eq!(
        headlines(&result, "graceArticles"),
        vec!["Article 1", "Article 3", "Article 5", "Article 7", "Article 9"]
    );
    assert_eq!(headlines(&result, "datedArticles"), vec!["Article 4"]);
}

#[test]
fn test_empty_result_skips_fetch() {
    let schema = schema(RegistryKind::SYNC);
    let store = seeded_store();

    let query = connection("allArticles", &["headline"])
        .arg("headline", "missing")
        .select(page_info());
    let result = schema.execute(&[query], &store);

    assert!(result.is_ok());
    assert_eq!(result.data["allArticles"]["edges"], json!([]));
    assert_eq!(result.data["allArticles"]["pageInfo"]["hasNextPage"], json!(false));
    assert_eq!(store.fetch_count("test_article"), 0);
}

#[test]
fn test_first_zero_returns_no_edges() {
    let schema = schema(RegistryKind::SYNC);
    let store = seeded_store();

    let query = connection("allArticles", &["headline"]).arg("first", 0).select(page_info());
    let result = schema.execute(&[query], &store);

    assert!(result.is_ok());
    assert_eq!(result.data["allArticles"]["edges"], json!([]));
    assert_eq!(store.fetch_count("test_article"), 0);
}

#[test]
fn test_nested_connection_windows_id_list() {
    let schema = schema(RegistryKind::SYNC);
    let store = seeded_store();

    let articles = connection("articles", &["headline"]).arg("first", 2).arg("after", encode_cursor(0));
    let query = Selection::field("allReporters").select(
        Selection::field("edges").select(Selection::field("node").leaves(&["firstName"]).select(articles)),
    );
    let result = schema.execute(&[query], &store);

    assert!(result.is_ok(), "{:?}", result.errors);
    let reporter = &result.data["allReporters"]["edges"][0]["node"];
    assert_eq!(reporter["firstName"], json!("Allen"));
    let nested: Vec<&serde_json::Value> = reporter["articles"]["edges"]
        .as_array()
        .unwrap()
        .iter()
        .map(|edge| &edge["node"]["headline"])
        .collect();
    assert_eq!(nested, vec![&json!("Article 1"), &json!("Article 2")]);

    let by_ids: Vec<Vec<String>> = store
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            StoreCall::FindByIds { ids, .. } => Some(ids),
            _ => None,
        })
        .collect();
    assert_eq!(by_ids, vec![vec!["a1".to_string(), "a2".to_string()]]);
}

#[test]
fn test_nested_connection_with_filter() {
    let schema = schema(RegistryKind::SYNC);
    let store = seeded_store();

    let articles = connection("articles", &["headline"]).arg("editor", "e0");
    let query = Selection::field("allReporters")
        .select(Selection::field("edges").select(Selection::field("node").select(articles)));
    let result = schema.execute(&[query], &store);

    assert!(result.is_ok(), "{:?}", result.errors);
    let nested: Vec<&serde_json::Value> = result.data["allReporters"]["edges"][0]["node"]["articles"]["edges"]
        .as_array()
        .unwrap()
        .iter()
        .map(|edge| &edge["node"]["headline"])
        .collect();
    assert_eq!(nested, vec![&json!("Article 0"), &json!("Article 2"), &json!("Article 4")]);
}

#[test]
fn test_reference_field_and_node_lookup() {
    let schema = schema(RegistryKind::SYNC);
    let store = seeded_store();

    let articles = Selection::field("allArticles").arg("first", 2).select(
        Selection::field("edges").select(
            Selection::field("node")
                .leaves(&["headline"])
                .select(Selection::field("editor").leaves(&["firstName"])),
        ),
    );
    let node = Selection::field("node")
        .arg("id", to_global_id("ArticleNode", "a3"))
        .leaves(&["id", "__typename"])
        .on("ArticleNode", vec![Selection::field("headline")]);
    let result = schema.execute(&[articles, node], &store);

    assert!(result.is_ok(), "{:?}", result.errors);
    assert_eq!(
        node_values(&result.data, "allArticles", "editor"),
        vec![&json!({"firstName": "Penny"}), &json!({"firstName": "Grace"})]
    );
    assert_eq!(result.data["node"]["__typename"], json!("ArticleNode"));
    assert_eq!(result.data["node"]["headline"], json!("Article 3"));
    assert_eq!(result.data["node"]["id"], json!(to_global_id("ArticleNode", "a3")));
}

#[test]
fn test_node_with_invalid_global_id() {
    let schema = schema(RegistryKind::SYNC);
    let store = seeded_store();

    let missing = Selection::field("node")
        .alias("missing")
        .arg("id", to_global_id("ArticleNode", "zzz"))
        .leaves(&["id"]);
    let broken = Selection::field("node").alias("broken").arg("id", "%%%").leaves(&["id"]);
    let result = schema.execute(&[missing, broken], &store);

    assert_eq!(result.data["missing"], json!(null));
    assert!(result.error_at(&["missing"]).is_none());
    assert!(result.error_at(&["broken"]).unwrap().usage);
}

#[test]
fn test_store_failure_is_field_error() {
    let schema = schema(RegistryKind::SYNC);
    let store = seeded_store();
    store.fail_collection("test_article");

    let result = schema.execute(
        &[
            connection("allArticles", &["headline"]),
            connection("allEditors", &["firstName"]),
        ],
        &store,
    );

    let error = result.error_at(&["allArticles"]).unwrap();
    assert!(!error.usage);
    assert_eq!(node_values(&result.data, "allEditors", "firstName").len(), 2);
}

#[test]
fn test_get_node_helper() {
    let ctx = QueryContext::new(registry(RegistryKind::SYNC), std::sync::Arc::new(ResolverConfig::default()));
    let store = seeded_store();
    let selection = Selection::field("node").on("EditorNode", vec![Selection::field("firstName")]);

    let document = get_node(&ctx, &store, &to_global_id("EditorNode", "e1"), &selection)
        .unwrap()
        .unwrap();
    assert_eq!(document.id, "e1");
    assert_eq!(document.get("first_name"), Some(&DataValue::from("Grace")));
    assert!(document.get("last_name").is_none());
}
