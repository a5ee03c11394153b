//! Relay 全局ID与 node 查询

use crate::error::QuickGqlResult;
use crate::resolver::fetch::StoreHandle;
use crate::resolver::selection::{query_fields, Selection};
use crate::resolver::{required_fields, QueryContext};
use crate::schema::graph_type::BoundType;
use crate::store::{AsyncDocumentStore, DocumentStore};
use crate::types::Document;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use rat_logger::debug;
use std::sync::Arc;

/// 全局ID：`base64("<类型名>:<主键>")`
pub fn to_global_id(type_name: &str, id: &str) -> String {
    BASE64.encode(format!("{}:{}", type_name, id))
}

/// 解码全局ID，返回 (类型名, 主键)
pub fn from_global_id(global_id: &str) -> QuickGqlResult<(String, String)> {
    let bytes = BASE64
        .decode(global_id.trim())
        .map_err(|e| crate::quick_error!(global_id, global_id, format!("base64解码失败: {}", e)))?;
    let text = String::from_utf8(bytes)
        .map_err(|_| crate::quick_error!(global_id, global_id, "内容不是UTF-8文本"))?;
    match text.split_once(':') {
        Some((type_name, id)) if !type_name.is_empty() && !id.is_empty() => {
            Ok((type_name.to_string(), id.to_string()))
        }
        _ => Err(crate::quick_error!(global_id, global_id, "格式应为 <类型名>:<主键>")),
    }
}

/// 按全局ID解析节点，返回节点类型与投影后的文档
///
/// 类型未注册或记录不存在时返回 `None`；类型存在但没有实现 Node 接口是用户错误
pub async fn resolve_node(
    ctx: &QueryContext,
    store: StoreHandle<'_>,
    global_id: &str,
    selection: &Selection,
) -> QuickGqlResult<Option<(Arc<BoundType>, Document)>> {
    let (type_name, id) = from_global_id(global_id)?;
    let Some(bound) = ctx.registry().get_type_by_name(&type_name) else {
        debug!("node 查询的类型 {} 未注册", type_name);
        return Ok(None);
    };
    if !bound.is_node() {
        return Err(crate::quick_error!(
            global_id,
            global_id,
            format!("类型 {} 没有实现 Node 接口", type_name)
        ));
    }
    let fields = required_fields(&bound, &query_fields(&selection.narrow(&bound.name)));
    let document = store.get(&bound.model.collection_name, &id, &fields).await?;
    Ok(document.map(|document| (bound, document)))
}

/// 按全局ID读取节点（投影为必需字段与查询字段）
pub fn get_node(
    ctx: &QueryContext,
    store: &dyn DocumentStore,
    global_id: &str,
    selection: &Selection,
) -> QuickGqlResult<Option<Document>> {
    let resolved = futures::executor::block_on(resolve_node(ctx, StoreHandle::Sync(store), global_id, selection))?;
    Ok(resolved.map(|(_, document)| document))
}

/// `get_node` 的异步版本
pub async fn get_node_async(
    ctx: &QueryContext,
    store: &dyn AsyncDocumentStore,
    global_id: &str,
    selection: &Selection,
) -> QuickGqlResult<Option<Document>> {
    let resolved = resolve_node(ctx, StoreHandle::Async(store), global_id, selection).await?;
    Ok(resolved.map(|(_, document)| document))
}
