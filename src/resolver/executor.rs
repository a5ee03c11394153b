//! 查询执行器
//!
//! 按选择树逐字段解析并输出 JSON。每个字段的错误被记录到它自己的路径上，
//! 字段值置空，兄弟字段照常解析

use crate::error::QuickGqlError;
use crate::i18n::ErrorMessageI18n;
use crate::resolver::connection::{resolve_connection, Connection, ConnectionSource};
use crate::resolver::fetch::StoreHandle;
use crate::resolver::list_reference::resolve_reference_list;
use crate::resolver::node::{resolve_node, to_global_id};
use crate::resolver::reference::resolve_reference;
use crate::resolver::selection::Selection;
use crate::resolver::union::resolve_union;
use crate::resolver::QueryContext;
use crate::schema::advanced_types::render_advanced;
use crate::schema::graph_type::{BoundType, FieldResolver, GraphField, GraphFieldType};
use crate::schema::RootField;
use crate::types::{DataValue, Document};
use futures::future::{BoxFuture, FutureExt};
use parking_lot::Mutex;
use rat_logger::{debug, warn};
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

/// 附着在字段路径上的错误
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub path: Vec<String>,
    pub message: String,
    /// 是否为查询期用户错误
    pub usage: bool,
}

/// 一次查询的结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionResult {
    pub data: Value,
    pub errors: Vec<FieldError>,
}

impl ExecutionResult {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// 某个路径上的错误
    pub fn error_at(&self, path: &[&str]) -> Option<&FieldError> {
        self.errors
            .iter()
            .find(|e| e.path.iter().map(String::as_str).eq(path.iter().copied()))
    }
}

pub(crate) struct Executor<'a> {
    ctx: QueryContext,
    store: StoreHandle<'a>,
    root: &'a BTreeMap<String, RootField>,
    errors: Mutex<Vec<FieldError>>,
}

fn child_path(path: &[String], key: &str) -> Vec<String> {
    let mut next = path.to_vec();
    next.push(key.to_string());
    next
}

fn embedded_document(model: &str, value: &DataValue) -> Option<Document> {
    match value {
        DataValue::Document(document) => Some((**document).clone()),
        DataValue::Reference(reference) => reference.cached.as_deref().cloned(),
        DataValue::Object(fields) => Some(Document {
            model: model.to_string(),
            id: String::new(),
            fields: fields.clone(),
        }),
        _ => None,
    }
}

fn object_type_name(field_type: &GraphFieldType) -> Option<&str> {
    match field_type {
        GraphFieldType::Object(name) => Some(name),
        GraphFieldType::List(inner) => object_type_name(inner),
        _ => None,
    }
}

impl<'a> Executor<'a> {
    pub(crate) fn new(ctx: QueryContext, store: StoreHandle<'a>, root: &'a BTreeMap<String, RootField>) -> Self {
        Self {
            ctx,
            store,
            root,
            errors: Mutex::new(Vec::new()),
        }
    }

    fn fail(&self, path: Vec<String>, err: QuickGqlError) {
        let usage = err.is_usage_error();
        if usage {
            debug!("字段 {} 解析失败: {}", path.join("."), err);
        } else {
            warn!("字段 {} 解析失败: {}", path.join("."), err);
        }
        self.errors.lock().push(FieldError {
            path,
            message: ErrorMessageI18n::localize(&err),
            usage,
        });
    }

    /// 执行根选择集
    pub(crate) async fn run(self, selections: &[Selection]) -> ExecutionResult {
        let mut data = Map::new();
        for selection in selections {
            let key = selection.response_key().to_string();
            let path = vec![key.clone()];
            let value = match self.resolve_root(selection, &path).await {
                Ok(value) => value,
                Err(err) => {
                    self.fail(path, err);
                    Value::Null
                }
            };
            data.insert(key, value);
        }
        ExecutionResult {
            data: Value::Object(data),
            errors: self.errors.into_inner(),
        }
    }

    async fn resolve_root(&self, selection: &Selection, path: &[String]) -> Result<Value, QuickGqlError> {
        match self.root.get(&selection.name) {
            Some(RootField::Connection { type_name }) => {
                let bound = self.ctx.registry().get_type_by_name(type_name).ok_or_else(|| {
                    crate::quick_error!(schema, format!("根字段 {} 的类型 {} 未注册", selection.name, type_name))
                })?;
                let connection =
                    resolve_connection(&self.ctx, self.store, &bound, ConnectionSource::Collection, selection).await?;
                Ok(self.render_connection(bound, connection, selection, path).await)
            }
            Some(RootField::Node) => {
                let global_id = match selection.arguments.get("id") {
                    Some(Value::String(id)) => id.clone(),
                    _ => return Err(crate::quick_error!(global_id, "", "node 查询需要字符串参数 id")),
                };
                match resolve_node(&self.ctx, self.store, &global_id, selection).await? {
                    Some((bound, document)) => Ok(self.render_object(bound, document, selection.clone(), path.to_vec()).await),
                    None => Ok(Value::Null),
                }
            }
            None if selection.name == "__typename" => Ok(json!("Query")),
            None => Err(crate::quick_error!(schema, format!("未知的根字段 {}", selection.name))),
        }
    }

    /// 按类型输出对象
    fn render_object<'b>(
        &'b self,
        bound: Arc<BoundType>,
        document: Document,
        selection: Selection,
        path: Vec<String>,
    ) -> BoxFuture<'b, Value> {
        async move {
            let mut object = Map::new();
            for child in selection.fields_for_type(&bound.name) {
                let key = child.response_key().to_string();
                let field_path = child_path(&path, &key);
                let value = match self.resolve_field(&bound, &document, child, &field_path).await {
                    Ok(value) => value,
                    Err(err) => {
                        self.fail(field_path, err);
                        Value::Null
                    }
                };
                object.insert(key, value);
            }
            Value::Object(object)
        }
        .boxed()
    }

    async fn resolve_field(
        &self,
        bound: &BoundType,
        document: &Document,
        child: &Selection,
        path: &[String],
    ) -> Result<Value, QuickGqlError> {
        if child.name == "__typename" {
            return Ok(json!(bound.name));
        }
        if child.name == bound.model.primary_key {
            if document.id.is_empty() {
                return Ok(Value::Null);
            }
            if bound.is_node() {
                return Ok(json!(to_global_id(&bound.name, &document.id)));
            }
            return Ok(json!(document.id));
        }
        let Some(field) = bound.field_for_selection(&child.name) else {
            return Ok(Value::Null);
        };
        let value = document.get(&field.name);
        let registry = self.ctx.registry();

        match &field.resolver {
            FieldResolver::Attribute => Ok(value.map(DataValue::to_json_value).unwrap_or(Value::Null)),
            FieldResolver::Advanced(kind) => Ok(render_advanced(*kind, value, child)),
            FieldResolver::Embedded => self.render_embedded(field, value, child, path).await,
            FieldResolver::Reference { model, lazy } => {
                let target = self.target_type(model)?;
                match resolve_reference(self.store, value, &target, *lazy, child).await? {
                    Some(found) => Ok(self.render_object(target, found, child.clone(), path.to_vec()).await),
                    None => Ok(Value::Null),
                }
            }
            FieldResolver::ReferenceList { .. } => {
                let items = value.and_then(DataValue::as_array).unwrap_or(&[]);
                let resolved = resolve_reference_list(&self.ctx, self.store, items, None, child).await?;
                Ok(self.render_list(resolved, child, path).await)
            }
            FieldResolver::PolymorphicList => {
                let GraphFieldType::List(inner) = &field.field_type else {
                    return Ok(Value::Null);
                };
                let GraphFieldType::Union(union) = inner.as_ref() else {
                    return Ok(Value::Null);
                };
                let items = value.and_then(DataValue::as_array).unwrap_or(&[]);
                let resolved =
                    resolve_reference_list(&self.ctx, self.store, items, Some(&union.members), child).await?;
                Ok(self.render_list(resolved, child, path).await)
            }
            FieldResolver::Union { lazy } => {
                let GraphFieldType::Union(union) = &field.field_type else {
                    return Ok(Value::Null);
                };
                match resolve_union(&self.ctx, self.store, value, union, *lazy, child).await? {
                    Some((target, found)) => Ok(self.render_object(target, found, child.clone(), path.to_vec()).await),
                    None => Ok(Value::Null),
                }
            }
            FieldResolver::Connection { model } => {
                let target = self.target_type(model)?;
                let source = ConnectionSource::Nested {
                    parent: document.clone(),
                    field: field.name.clone(),
                };
                debug!("嵌套连接 {}.{} (注册表={})", bound.name, field.name, registry.kind());
                let connection = resolve_connection(&self.ctx, self.store, &target, source, child).await?;
                Ok(self.render_connection(target, connection, child, path).await)
            }
        }
    }

    fn target_type(&self, model: &str) -> Result<Arc<BoundType>, QuickGqlError> {
        self.ctx
            .registry()
            .get_type_for_model(model)
            .ok_or_else(|| crate::quick_error!(schema, format!("模型 {} 没有注册类型", model)))
    }

    async fn render_embedded(
        &self,
        field: &GraphField,
        value: Option<&DataValue>,
        child: &Selection,
        path: &[String],
    ) -> Result<Value, QuickGqlError> {
        let Some(type_name) = object_type_name(&field.field_type) else {
            return Ok(Value::Null);
        };
        let target = self
            .ctx
            .registry()
            .get_type_by_name(type_name)
            .ok_or_else(|| crate::quick_error!(schema, format!("内嵌类型 {} 未注册", type_name)))?;
        match value {
            Some(DataValue::Array(items)) => {
                let mut rendered = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    let item_path = child_path(path, &index.to_string());
                    rendered.push(match embedded_document(&target.model.name, item) {
                        Some(document) => self.render_object(target.clone(), document, child.clone(), item_path).await,
                        None => Value::Null,
                    });
                }
                Ok(Value::Array(rendered))
            }
            Some(item) => match embedded_document(&target.model.name, item) {
                Some(document) => Ok(self.render_object(target, document, child.clone(), path.to_vec()).await),
                None => Ok(Value::Null),
            },
            None => Ok(Value::Null),
        }
    }

    async fn render_list(
        &self,
        resolved: Vec<Option<(Arc<BoundType>, Document)>>,
        child: &Selection,
        path: &[String],
    ) -> Value {
        let mut rendered = Vec::with_capacity(resolved.len());
        for (index, item) in resolved.into_iter().enumerate() {
            rendered.push(match item {
                Some((bound, document)) => {
                    self.render_object(bound, document, child.clone(), child_path(path, &index.to_string()))
                        .await
                }
                None => Value::Null,
            });
        }
        Value::Array(rendered)
    }

    async fn render_connection(
        &self,
        bound: Arc<BoundType>,
        connection: Connection,
        selection: &Selection,
        path: &[String],
    ) -> Value {
        let connection_name = bound.connection.clone().unwrap_or_else(|| format!("{}Connection", bound.name));
        let edge_name = format!("{}Edge", bound.name);
        let mut object = Map::new();

        for child in selection.fields_for_type(&connection_name) {
            let key = child.response_key().to_string();
            let value = match child.name.as_str() {
                "__typename" => json!(connection_name),
                "pageInfo" => {
                    let info = &connection.page_info;
                    let mut page = Map::new();
                    for item in child.fields_for_type("PageInfo") {
                        let rendered = match item.name.as_str() {
                            "startCursor" => json!(info.start_cursor),
                            "endCursor" => json!(info.end_cursor),
                            "hasPreviousPage" => json!(info.has_previous_page),
                            "hasNextPage" => json!(info.has_next_page),
                            "__typename" => json!("PageInfo"),
                            _ => Value::Null,
                        };
                        page.insert(item.response_key().to_string(), rendered);
                    }
                    Value::Object(page)
                }
                "edges" => {
                    let edges_path = child_path(path, &key);
                    let mut edges = Vec::with_capacity(connection.edges.len());
                    for (index, edge) in connection.edges.iter().enumerate() {
                        let edge_path = child_path(&edges_path, &index.to_string());
                        let mut rendered = Map::new();
                        for item in child.fields_for_type(&edge_name) {
                            let item_key = item.response_key().to_string();
                            let value = match item.name.as_str() {
                                "cursor" => json!(edge.cursor),
                                "node" => {
                                    self.render_object(
                                        bound.clone(),
                                        edge.node.clone(),
                                        item.clone(),
                                        child_path(&edge_path, &item_key),
                                    )
                                    .await
                                }
                                "__typename" => json!(edge_name),
                                _ => Value::Null,
                            };
                            rendered.insert(item_key, value);
                        }
                        edges.push(Value::Object(rendered));
                    }
                    Value::Array(edges)
                }
                _ => Value::Null,
            };
            object.insert(key, value);
        }
        Value::Object(object)
    }
}
