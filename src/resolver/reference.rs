//! 单个引用的解析

use crate::error::QuickGqlResult;
use crate::resolver::fetch::StoreHandle;
use crate::resolver::selection::{query_fields, Selection};
use crate::resolver::required_fields;
use crate::schema::graph_type::BoundType;
use crate::types::*;
use rat_logger::debug;

/// 解析引用字段的值
///
/// 空引用返回 `None`；懒引用在目标已物化时直接使用缓存，
/// 其余情况按主键读取，投影为必需字段与查询字段
pub async fn resolve_reference(
    store: StoreHandle<'_>,
    value: Option<&DataValue>,
    target: &BoundType,
    lazy: bool,
    selection: &Selection,
) -> QuickGqlResult<Option<Document>> {
    let id = match value {
        None | Some(DataValue::Null) => return Ok(None),
        Some(DataValue::Reference(reference)) => {
            if lazy {
                if let Some(cached) = &reference.cached {
                    debug!("懒引用 {}({}) 命中缓存", reference.model, reference.id);
                    return Ok(Some((**cached).clone()));
                }
            }
            reference.id.clone()
        }
        Some(DataValue::Document(document)) => {
            if lazy {
                return Ok(Some((**document).clone()));
            }
            document.id.clone()
        }
        Some(DataValue::String(id)) => id.clone(),
        Some(other) => {
            debug!("引用字段的值无法识别: {}", other.type_name());
            return Ok(None);
        }
    };

    let fields = required_fields(target, &query_fields(selection));
    store.get(&target.model.collection_name, &id, &fields).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::*;
    use crate::schema::graph_type::{GraphType, RegistryKind};
    use crate::schema::registry::RegistryBuilder;
    use crate::store::{MemoryStore, StoreCall};
    use std::sync::Arc;

    fn editor_type() -> Arc<BoundType> {
        let meta = ModelMeta::new("Editor", "test_editor")
            .field("first_name", string_field())
            .field("last_name", string_field());
        let mut builder = RegistryBuilder::new(RegistryKind::SYNC);
        builder.register(GraphType::new("EditorType", meta)).unwrap();
        builder.finalize().unwrap().get_type_by_name("EditorType").unwrap()
    }

    fn store() -> MemoryStore {
        let store = MemoryStore::new();
        store.insert(
            "test_editor",
            Document::new("Editor", "e1").with("first_name", "Penny").with("last_name", "Hardaway"),
        );
        store
    }

    #[test]
    fn test_fetch_with_projection() {
        let store = store();
        let target = editor_type();
        let selection = Selection::field("editor").leaves(&["firstName"]);
        let value = DataValue::Reference(DocumentRef::new("Editor", "e1"));
        let doc = futures::executor::block_on(resolve_reference(
            StoreHandle::Sync(&store),
            Some(&value),
            &target,
            false,
            &selection,
        ))
        .unwrap()
        .unwrap();
        assert_eq!(doc.get("first_name"), Some(&DataValue::from("Penny")));
        assert!(doc.get("last_name").is_none());
        assert_eq!(
            store.calls(),
            vec![StoreCall::Get {
                collection: "test_editor".into(),
                id: "e1".into(),
                fields: vec!["first_name".into()],
            }]
        );
    }

    #[test]
    fn test_null_and_lazy_cache_hit() {
        let store = store();
        let target = editor_type();
        let selection = Selection::field("editor").leaves(&["firstName"]);
        let handle = StoreHandle::Sync(&store);

        let none = futures::executor::block_on(resolve_reference(handle, Some(&DataValue::Null), &target, true, &selection));
        assert!(none.unwrap().is_none());

        let cached = DataValue::Reference(DocumentRef::cached(Document::new("Editor", "e1").with("first_name", "Cached")));
        let doc = futures::executor::block_on(resolve_reference(handle, Some(&cached), &target, true, &selection))
            .unwrap()
            .unwrap();
        assert_eq!(doc.get("first_name"), Some(&DataValue::from("Cached")));
        assert!(store.calls().is_empty());

        // 非懒引用不使用缓存
        futures::executor::block_on(resolve_reference(handle, Some(&cached), &target, false, &selection)).unwrap();
        assert_eq!(store.calls().len(), 1);
    }
}
