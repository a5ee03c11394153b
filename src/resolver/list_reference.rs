//! 引用列表的批量解析
//!
//! 按目标类型分组，每个被查询的类型只发出一次投影读取；查询中没有
//! 出现的类型只构造带主键的占位文档。所有读取完成后按 (模型, 主键)
//! 把结果映射回原列表的位置

use crate::error::QuickGqlResult;
use crate::resolver::fetch::{BatchTask, StoreHandle};
use crate::resolver::selection::{query_fields, queried_union_types, Selection};
use crate::resolver::{required_fields, QueryContext};
use crate::schema::graph_type::BoundType;
use crate::types::*;
use rat_logger::{debug, warn};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// 列表中一项的来源
enum Slot {
    Empty,
    /// 已物化的文档，不再读取
    Materialized(Document),
    /// 待读取的指针
    Pending { model: String, id: String },
}

fn slot_for(item: &DataValue) -> Slot {
    match item {
        DataValue::Reference(reference) => Slot::Pending {
            model: reference.model.clone(),
            id: reference.id.clone(),
        },
        DataValue::Document(document) => Slot::Materialized((**document).clone()),
        _ => Slot::Empty,
    }
}

/// 解析引用列表
///
/// `members` 为联合成员类型名时按多态列表处理：只读取查询中以片段
/// 请求的类型；为 `None` 时列表只指向单一模型，全部读取。
/// 输出顺序总是等于输入顺序，悬空引用解析为 `None`
pub async fn resolve_reference_list(
    ctx: &QueryContext,
    store: StoreHandle<'_>,
    items: &[DataValue],
    members: Option<&[String]>,
    selection: &Selection,
) -> QuickGqlResult<Vec<Option<(Arc<BoundType>, Document)>>> {
    let slots: Vec<Slot> = items.iter().map(slot_for).collect();

    let mut ids_by_model: BTreeMap<&str, Vec<String>> = BTreeMap::new();
    for slot in &slots {
        if let Slot::Pending { model, id } = slot {
            let ids = ids_by_model.entry(model.as_str()).or_default();
            if !ids.contains(id) {
                ids.push(id.clone());
            }
        }
    }

    let queried = members.map(|members| queried_union_types(selection, members));
    let mut types: HashMap<String, Arc<BoundType>> = HashMap::new();
    let mut resolved: HashMap<(String, String), Document> = HashMap::new();
    let mut tasks = Vec::new();

    for (model, ids) in ids_by_model {
        let Some(bound) = ctx.registry().get_type_for_model(model) else {
            warn!("引用列表中的模型 {} 没有注册类型，已省略", model);
            continue;
        };
        if let Some(members) = members {
            if !members.contains(&bound.name) {
                warn!("类型 {} 不在联合成员中，已省略", bound.name);
                continue;
            }
        }
        types.insert(model.to_string(), bound.clone());

        let is_queried = queried
            .as_ref()
            .map_or(true, |queried| queried.contains_key(&bound.name));
        if !is_queried {
            debug!("类型 {} 未被查询，构造 {} 个占位文档", bound.name, ids.len());
            for id in ids {
                resolved.insert((model.to_string(), id.clone()), Document::placeholder(model, id));
            }
            continue;
        }

        let fields = required_fields(&bound, &query_fields(&selection.narrow(&bound.name)));
        tasks.push(BatchTask {
            model: model.to_string(),
            collection: bound.model.collection_name.clone(),
            ids,
            fields,
        });
    }

    let results = store
        .fetch_batches(tasks, ctx.config().worker_pool_size)
        .await?;
    for result in results {
        for document in result.documents {
            resolved.insert((result.model.clone(), document.id.clone()), document);
        }
    }

    let output = slots
        .into_iter()
        .map(|slot| match slot {
            Slot::Empty => None,
            Slot::Materialized(document) => ctx
                .registry()
                .get_type_for_model(&document.model)
                .map(|bound| (bound, document)),
            Slot::Pending { model, id } => {
                let bound = types.get(&model)?.clone();
                resolved.get(&(model, id)).cloned().map(|document| (bound, document))
            }
        })
        .collect();
    Ok(output)
}
