//! 多态引用（联合类型）的解析

use crate::error::QuickGqlResult;
use crate::resolver::fetch::StoreHandle;
use crate::resolver::reference::resolve_reference;
use crate::resolver::selection::Selection;
use crate::resolver::QueryContext;
use crate::schema::graph_type::{BoundType, UnionType};
use crate::types::*;
use rat_logger::warn;
use std::sync::Arc;

/// 引用值携带的类型标签
fn type_tag(value: &DataValue) -> Option<&str> {
    match value {
        DataValue::Reference(reference) => Some(&reference.model),
        DataValue::Document(document) => Some(&document.model),
        _ => None,
    }
}

/// 解析多态引用
///
/// 按存储的类型标签找到注册的具体类型，再按该类型的投影读取；
/// 类型未注册或不在联合成员内时返回 `None`
pub async fn resolve_union(
    ctx: &QueryContext,
    store: StoreHandle<'_>,
    value: Option<&DataValue>,
    union: &UnionType,
    lazy: bool,
    selection: &Selection,
) -> QuickGqlResult<Option<(Arc<BoundType>, Document)>> {
    let Some(model) = value.and_then(type_tag) else {
        return Ok(None);
    };
    let Some(bound) = ctx.registry().get_type_for_model(model) else {
        warn!("联合类型 {} 的引用目标 {} 没有注册类型", union.name, model);
        return Ok(None);
    };
    if !union.members.contains(&bound.name) {
        warn!("类型 {} 不是联合类型 {} 的成员", bound.name, union.name);
        return Ok(None);
    }

    let narrowed = selection.narrow(&bound.name);
    let document = resolve_reference(store, value, &bound, lazy, &narrowed).await?;
    Ok(document.map(|document| (bound, document)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResolverConfig;
    use crate::model::*;
    use crate::schema::graph_type::{GraphType, RegistryKind};
    use crate::schema::registry::RegistryBuilder;
    use crate::store::{MemoryStore, StoreCall};

    fn context() -> QueryContext {
        let mut builder = RegistryBuilder::new(RegistryKind::SYNC);
        builder
            .register(GraphType::new(
                "EditorType",
                ModelMeta::new("Editor", "test_editor").field("first_name", string_field()),
            ))
            .unwrap();
        builder
            .register(GraphType::new(
                "ArticleType",
                ModelMeta::new("Article", "test_article").field("headline", string_field()),
            ))
            .unwrap();
        QueryContext::new(builder.finalize().unwrap(), Arc::new(ResolverConfig::default()))
    }

    fn union() -> UnionType {
        UnionType {
            name: "ReporterGenericReferenceUnionType".into(),
            members: vec!["ArticleType".into(), "EditorType".into()],
        }
    }

    #[test]
    fn test_discriminates_on_type_tag() {
        let ctx = context();
        let store = MemoryStore::new();
        store.insert("test_article", Document::new("Article", "a1").with("headline", "Hi"));
        let selection = Selection::field("genericReference")
            .leaves(&["__typename"])
            .on("ArticleType", vec![Selection::field("headline")])
            .on("EditorType", vec![Selection::field("firstName")]);
        let value = DataValue::Reference(DocumentRef::new("Article", "a1"));

        let (bound, doc) = futures::executor::block_on(resolve_union(
            &ctx,
            StoreHandle::Sync(&store),
            Some(&value),
            &union(),
            false,
            &selection,
        ))
        .unwrap()
        .unwrap();
        assert_eq!(bound.name, "ArticleType");
        assert_eq!(doc.get("headline"), Some(&DataValue::from("Hi")));
        assert_eq!(
            store.calls(),
            vec![StoreCall::Get {
                collection: "test_article".into(),
                id: "a1".into(),
                fields: vec!["headline".into()],
            }]
        );
    }

    #[test]
    fn test_unknown_tag_is_absent() {
        let ctx = context();
        let store = MemoryStore::new();
        let value = DataValue::Reference(DocumentRef::new("Publisher", "p1"));
        let resolved = futures::executor::block_on(resolve_union(
            &ctx,
            StoreHandle::Sync(&store),
            Some(&value),
            &union(),
            false,
            &Selection::field("genericReference"),
        ))
        .unwrap();
        assert!(resolved.is_none());
        assert!(store.calls().is_empty());
    }
}
