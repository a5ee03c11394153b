//! 连接解析器
//!
//! 把列表字段解析为游标分页的连接：计算投影、翻译过滤参数、按需计数、
//! 计算窗口，然后查询存储或直接对已有列表取窗口，最后组装边与分页信息

use crate::error::QuickGqlResult;
use crate::resolver::cursor::{decode_cursor, encode_cursor};
use crate::resolver::fetch::StoreHandle;
use crate::resolver::selection::{has_page_info, query_fields, Selection};
use crate::resolver::window::{CursorArgs, PageWindow};
use crate::resolver::{required_fields, ActiveQuery, QueryContext};
use crate::schema::filters::materialize_filters;
use crate::schema::graph_type::BoundType;
use crate::types::*;
use rat_logger::debug;
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// 一条边
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Edge {
    pub cursor: String,
    pub node: Document,
}

/// 分页信息
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub start_cursor: Option<String>,
    pub end_cursor: Option<String>,
    pub has_previous_page: bool,
    pub has_next_page: bool,
}

/// 分页连接
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub edges: Vec<Edge>,
    pub page_info: PageInfo,
}

impl Connection {
    /// 没有任何边的连接
    pub fn empty() -> Self {
        Self::default()
    }

    /// 由窗口内的节点组装连接，游标为 `skip + 下标`
    pub fn assemble(nodes: Vec<Document>, window: PageWindow, count: Option<u64>) -> Self {
        let edges: Vec<Edge> = nodes
            .into_iter()
            .enumerate()
            .map(|(index, node)| Edge {
                cursor: encode_cursor(window.skip.saturating_add(index as u64)),
                node,
            })
            .collect();
        let page_info = PageInfo {
            start_cursor: edges.first().map(|e| e.cursor.clone()),
            end_cursor: edges.last().map(|e| e.cursor.clone()),
            has_previous_page: window.has_previous(),
            has_next_page: window.has_next(count),
        };
        Self { edges, page_info }
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Document> {
        self.edges.iter().map(|e| &e.node)
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

/// 连接字段的参数：游标参数与其余的过滤参数
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectionArgs {
    pub cursor: CursorArgs,
    pub filters: BTreeMap<String, Value>,
}

fn count_argument(name: &str, value: &Value) -> QuickGqlResult<Option<u64>> {
    if value.is_null() {
        return Ok(None);
    }
    value
        .as_u64()
        .map(Some)
        .ok_or_else(|| crate::quick_error!(filter, name, "需要非负整数"))
}

fn cursor_argument(value: &Value) -> QuickGqlResult<Option<u64>> {
    match value {
        Value::Null => Ok(None),
        Value::String(cursor) => decode_cursor(cursor).map(Some),
        other => Err(crate::quick_error!(cursor, other, "游标必须是字符串")),
    }
}

impl ConnectionArgs {
    /// 从字段参数中拆出游标参数并解码
    pub fn from_arguments(arguments: &BTreeMap<String, Value>) -> QuickGqlResult<Self> {
        let mut args = ConnectionArgs::default();
        for (name, value) in arguments {
            match name.as_str() {
                "first" => args.cursor.first = count_argument(name, value)?,
                "last" => args.cursor.last = count_argument(name, value)?,
                "after" => args.cursor.after = cursor_argument(value)?,
                "before" => args.cursor.before = cursor_argument(value)?,
                _ => {
                    args.filters.insert(name.clone(), value.clone());
                }
            }
        }
        Ok(args)
    }
}

/// 连接的数据来源
#[derive(Debug, Clone)]
pub enum ConnectionSource {
    /// 类型绑定的整个集合
    Collection,
    /// 父文档上某个列表字段
    Nested { parent: Document, field: String },
    /// 上游解析器已经给出的列表
    Resolved(Vec<DataValue>),
}

/// 列表值的形状
enum ListShape {
    /// 未解引用的指针，只有主键
    References(Vec<String>),
    /// 已物化的文档
    Documents(Vec<Document>),
}

fn list_shape(model: &str, items: Vec<DataValue>) -> ListShape {
    let unresolved = items.iter().any(|item| match item {
        DataValue::Reference(r) => r.cached.is_none(),
        DataValue::String(_) => true,
        _ => false,
    });
    if unresolved {
        let ids = items
            .iter()
            .filter_map(|item| match item {
                DataValue::String(id) => Some(id.clone()),
                other => other.reference_id().map(str::to_string),
            })
            .collect();
        return ListShape::References(ids);
    }

    let documents = items
        .into_iter()
        .filter_map(|item| match item {
            DataValue::Document(doc) => Some(*doc),
            DataValue::Reference(r) => r.cached.map(|doc| *doc),
            DataValue::Object(fields) => {
                let id = fields.get("id").map(|v| v.to_string()).unwrap_or_default();
                Some(Document {
                    model: model.to_string(),
                    id,
                    fields,
                })
            }
            _ => None,
        })
        .collect();
    ListShape::Documents(documents)
}

fn sort_clauses(bound: &BoundType) -> Vec<SortConfig> {
    bound
        .options
        .order_by
        .as_deref()
        .map(|clauses| clauses.split(',').filter_map(SortConfig::parse).collect())
        .unwrap_or_default()
}

/// 解析连接字段
///
/// `selection` 是连接字段本身的选择，参数取自其中；
/// 请求了 `last` 或 `pageInfo` 时才会计数
pub async fn resolve_connection(
    ctx: &QueryContext,
    store: StoreHandle<'_>,
    bound: &BoundType,
    source: ConnectionSource,
    selection: &Selection,
) -> QuickGqlResult<Connection> {
    let args = ConnectionArgs::from_arguments(&selection.arguments)?;
    let fields = required_fields(bound, &query_fields(selection));
    let mut conditions = materialize_filters(bound, &args.filters, ctx.config())?;
    let needs_count = args.cursor.last.is_some() || has_page_info(selection);

    let items = match source {
        ConnectionSource::Collection => None,
        ConnectionSource::Nested { parent, field } => Some(match parent.get(&field) {
            Some(DataValue::Array(items)) => items.clone(),
            _ => Vec::new(),
        }),
        ConnectionSource::Resolved(items) => Some(items),
    };

    if let Some(items) = items {
        if items.is_empty() {
            return Ok(Connection::empty());
        }
        match list_shape(&bound.model.name, items) {
            ListShape::Documents(documents) => {
                if !args.filters.is_empty() {
                    debug!("已物化的列表不支持过滤参数，忽略: {:?}", args.filters.keys());
                }
                let count = documents.len() as u64;
                let window = args.cursor.window(Some(count))?;
                let range = window.range(documents.len());
                let page = documents[range].to_vec();
                return Ok(Connection::assemble(page, window, Some(count)));
            }
            ListShape::References(ids) if conditions.is_empty() && bound.options.order_by.is_none() => {
                return resolve_id_window(store, bound, ids, args.cursor, &fields).await;
            }
            ListShape::References(ids) => {
                let ids = ids.into_iter().map(DataValue::String).collect();
                conditions.push(QueryCondition::new("id", QueryOperator::In, DataValue::Array(ids)));
            }
        }
    }

    let collection = bound.model.collection_name.as_str();
    let options = QueryOptions::new()
        .with_conditions(conditions)
        .with_sort(sort_clauses(bound))
        .with_fields(fields)
        .no_dereference();
    ctx.set_active_query(ActiveQuery {
        collection: collection.to_string(),
        options: options.clone(),
    });

    let count = if needs_count {
        store.count(collection, &options.conditions).await?
    } else {
        None
    };
    if count == Some(0) {
        return Ok(Connection::empty());
    }
    let window = args.cursor.window(count)?;
    if window.limit == Some(0) {
        return Ok(Connection::assemble(Vec::new(), window, count));
    }

    let options = options.with_pagination(PaginationConfig {
        skip: window.skip,
        limit: window.limit,
    });
    let documents = store.find(collection, &options).await?;
    debug!(
        "连接 {} 返回 {} 条 (skip={}, limit={:?}, count={:?})",
        bound.name,
        documents.len(),
        window.skip,
        window.limit,
        count
    );
    Ok(Connection::assemble(documents, window, count))
}

/// 对主键列表取窗口后只读取窗口内的文档，按主键列表的顺序输出
async fn resolve_id_window(
    store: StoreHandle<'_>,
    bound: &BoundType,
    ids: Vec<String>,
    cursor: CursorArgs,
    fields: &[String],
) -> QuickGqlResult<Connection> {
    let count = ids.len() as u64;
    let window = cursor.window(Some(count))?;
    let page_ids = &ids[window.range(ids.len())];
    if page_ids.is_empty() {
        return Ok(Connection::assemble(Vec::new(), window, Some(count)));
    }

    let fetched = store
        .find_by_ids(&bound.model.collection_name, page_ids, fields)
        .await?;
    let mut by_id: HashMap<String, Document> = fetched.into_iter().map(|d| (d.id.clone(), d)).collect();
    let page = page_ids.iter().filter_map(|id| by_id.remove(id)).collect();
    Ok(Connection::assemble(page, window, Some(count)))
}
