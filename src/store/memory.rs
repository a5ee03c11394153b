//! 内存文档存储
//!
//! `DocumentStore` 的参考实现，集合保存在 `RwLock<HashMap>` 中，
//! 所有过滤都是全表扫描。每次调用都会记录到调用日志，便于检查解析器
//! 实际发出了哪些读取
//!
//! ## 限制
//!
//! - 没有索引，没有事务
//! - 字符串匹配与地理邻近查询只覆盖解析器会生成的条件形状

use crate::error::QuickGqlResult;
use crate::store::DocumentStore;
use crate::types::*;
use parking_lot::{Mutex, RwLock};
use rat_logger::debug;
use regex::Regex;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};

/// 地球平均半径（米）
const EARTH_RADIUS_METERS: f64 = 6_371_008.8;

/// 一次存储调用的记录
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    Find { collection: String, options: QueryOptions },
    Count { collection: String, conditions: Vec<QueryCondition> },
    FindByIds { collection: String, ids: Vec<String>, fields: Vec<String> },
    Get { collection: String, id: String, fields: Vec<String> },
}

impl StoreCall {
    /// 调用涉及的集合
    pub fn collection(&self) -> &str {
        match self {
            StoreCall::Find { collection, .. }
            | StoreCall::Count { collection, .. }
            | StoreCall::FindByIds { collection, .. }
            | StoreCall::Get { collection, .. } => collection,
        }
    }

    /// 是否为读取文档的调用（计数不算）
    pub fn is_fetch(&self) -> bool {
        !matches!(self, StoreCall::Count { .. })
    }
}

/// 内存文档存储
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
    /// 模型名 -> 集合名，用于自动解引用
    model_index: RwLock<HashMap<String, String>>,
    calls: Mutex<Vec<StoreCall>>,
    count_available: AtomicBool,
    failing: RwLock<HashSet<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            model_index: RwLock::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            count_available: AtomicBool::new(true),
            failing: RwLock::new(HashSet::new()),
        }
    }

    /// 插入文档
    pub fn insert(&self, collection: &str, document: Document) {
        self.model_index
            .write()
            .insert(document.model.clone(), collection.to_string());
        self.collections
            .write()
            .entry(collection.to_string())
            .or_default()
            .push(document);
    }

    /// 批量插入
    pub fn insert_many(&self, collection: &str, documents: impl IntoIterator<Item = Document>) {
        for document in documents {
            self.insert(collection, document);
        }
    }

    /// 设置是否能给出计数
    pub fn set_count_available(&self, available: bool) {
        self.count_available.store(available, AtomicOrdering::SeqCst);
    }

    /// 让某个集合上的所有调用都失败
    pub fn fail_collection(&self, collection: &str) {
        self.failing.write().insert(collection.to_string());
    }

    /// 调用日志快照
    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().clone()
    }

    /// 某个集合上的读取调用次数
    pub fn fetch_count(&self, collection: &str) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| call.is_fetch() && call.collection() == collection)
            .count()
    }

    /// 清空调用日志
    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    fn record(&self, call: StoreCall) -> QuickGqlResult<()> {
        let collection = call.collection().to_string();
        self.calls.lock().push(call);
        if self.failing.read().contains(&collection) {
            return Err(crate::quick_error!(store, format!("集合 {} 不可用", collection)));
        }
        Ok(())
    }

    fn scan(&self, collection: &str, conditions: &[QueryCondition]) -> QuickGqlResult<Vec<Document>> {
        let collections = self.collections.read();
        let Some(documents) = collections.get(collection) else {
            return Ok(Vec::new());
        };
        let mut matched = Vec::new();
        for document in documents {
            let mut keep = true;
            for condition in conditions {
                if !matches_condition(document, condition)? {
                    keep = false;
                    break;
                }
            }
            if keep {
                matched.push(document.clone());
            }
        }
        Ok(matched)
    }

    /// 把未解引用的指针替换为携带目标文档的引用
    fn dereference(&self, document: &mut Document) {
        let index = self.model_index.read();
        let collections = self.collections.read();
        let lookup = |reference: &DocumentRef| -> Option<Document> {
            let collection = index.get(&reference.model)?;
            collections
                .get(collection)?
                .iter()
                .find(|d| d.id == reference.id)
                .cloned()
        };
        for value in document.fields.values_mut() {
            match value {
                DataValue::Reference(reference) if reference.cached.is_none() => {
                    if let Some(target) = lookup(reference) {
                        reference.cached = Some(Box::new(target));
                    }
                }
                DataValue::Array(items) => {
                    for item in items.iter_mut() {
                        if let DataValue::Reference(reference) = item {
                            if reference.cached.is_none() {
                                if let Some(target) = lookup(reference) {
                                    reference.cached = Some(Box::new(target));
                                }
                            }
                        }
                    }
                }
                _ => {}
            }
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentStore for MemoryStore {
    fn find(&self, collection: &str, options: &QueryOptions) -> QuickGqlResult<Vec<Document>> {
        self.record(StoreCall::Find {
            collection: collection.to_string(),
            options: options.clone(),
        })?;

        let mut documents = self.scan(collection, &options.conditions)?;
        if !options.sort.is_empty() {
            documents.sort_by(|a, b| compare_documents(a, b, &options.sort));
        }

        let (skip, limit) = match &options.pagination {
            Some(p) => (p.skip as usize, p.limit.map(|l| l as usize)),
            None => (0, None),
        };
        let window = documents
            .into_iter()
            .skip(skip)
            .take(limit.unwrap_or(usize::MAX));

        let mut result = Vec::new();
        for document in window {
            let mut projected = document.project(&options.fields);
            if !options.no_dereference {
                self.dereference(&mut projected);
            }
            result.push(projected);
        }
        debug!("内存存储查询: collection={}, 返回{}条", collection, result.len());
        Ok(result)
    }

    fn count(&self, collection: &str, conditions: &[QueryCondition]) -> QuickGqlResult<Option<u64>> {
        self.record(StoreCall::Count {
            collection: collection.to_string(),
            conditions: conditions.to_vec(),
        })?;
        if !self.count_available.load(AtomicOrdering::SeqCst) {
            return Ok(None);
        }
        Ok(Some(self.scan(collection, conditions)?.len() as u64))
    }

    fn find_by_ids(
        &self,
        collection: &str,
        ids: &[String],
        fields: &[String],
    ) -> QuickGqlResult<Vec<Document>> {
        self.record(StoreCall::FindByIds {
            collection: collection.to_string(),
            ids: ids.to_vec(),
            fields: fields.to_vec(),
        })?;
        let collections = self.collections.read();
        let Some(documents) = collections.get(collection) else {
            return Ok(Vec::new());
        };
        Ok(documents
            .iter()
            .filter(|d| ids.contains(&d.id))
            .map(|d| d.project(fields))
            .collect())
    }

    fn get(&self, collection: &str, id: &str, fields: &[String]) -> QuickGqlResult<Option<Document>> {
        self.record(StoreCall::Get {
            collection: collection.to_string(),
            id: id.to_string(),
            fields: fields.to_vec(),
        })?;
        let collections = self.collections.read();
        Ok(collections
            .get(collection)
            .and_then(|documents| documents.iter().find(|d| d.id == id))
            .map(|d| d.project(fields)))
    }
}

fn field_value(document: &Document, field: &str) -> Option<DataValue> {
    if field == "id" || field == "pk" {
        return Some(DataValue::String(document.id.clone()));
    }
    document.get(field).cloned()
}

/// 引用与内嵌文档按主键参与比较
fn normalize(value: &DataValue) -> DataValue {
    match value {
        DataValue::Reference(r) => DataValue::String(r.id.clone()),
        DataValue::Document(d) => DataValue::String(d.id.clone()),
        DataValue::Uuid(u) => DataValue::String(u.to_string()),
        other => other.clone(),
    }
}

fn compare_values(a: &DataValue, b: &DataValue) -> Option<Ordering> {
    match (normalize(a), normalize(b)) {
        (DataValue::Int(x), DataValue::Int(y)) => Some(x.cmp(&y)),
        (DataValue::Int(x), DataValue::Float(y)) => (x as f64).partial_cmp(&y),
        (DataValue::Float(x), DataValue::Int(y)) => x.partial_cmp(&(y as f64)),
        (DataValue::Float(x), DataValue::Float(y)) => x.partial_cmp(&y),
        (DataValue::Decimal(x), DataValue::Decimal(y)) => {
            x.parse::<f64>().ok()?.partial_cmp(&y.parse::<f64>().ok()?)
        }
        (DataValue::String(x), DataValue::String(y)) => Some(x.cmp(&y)),
        (DataValue::Bool(x), DataValue::Bool(y)) => Some(x.cmp(&y)),
        (DataValue::DateTime(x), DataValue::DateTime(y)) => Some(x.cmp(&y)),
        (DataValue::Date(x), DataValue::Date(y)) => Some(x.cmp(&y)),
        (DataValue::Null, DataValue::Null) => Some(Ordering::Equal),
        (DataValue::Null, _) => Some(Ordering::Less),
        (_, DataValue::Null) => Some(Ordering::Greater),
        _ => None,
    }
}

fn values_equal(a: &DataValue, b: &DataValue) -> bool {
    match compare_values(a, b) {
        Some(ordering) => ordering == Ordering::Equal,
        None => normalize(a) == normalize(b),
    }
}

/// 字段值等于目标，或字段是数组且包含目标
fn contains_or_equals(actual: &DataValue, expected: &DataValue) -> bool {
    match (actual, expected) {
        (DataValue::Array(_), DataValue::Array(_)) => normalize_array(actual) == normalize_array(expected),
        (DataValue::Array(items), _) => items.iter().any(|item| values_equal(item, expected)),
        _ => values_equal(actual, expected),
    }
}

fn normalize_array(value: &DataValue) -> DataValue {
    match value {
        DataValue::Array(items) => DataValue::Array(items.iter().map(normalize).collect()),
        other => normalize(other),
    }
}

fn string_pattern(operator: QueryOperator, needle: &str) -> QuickGqlResult<Regex> {
    let escaped = regex::escape(needle);
    let pattern = match operator {
        QueryOperator::Contains => escaped,
        QueryOperator::IContains => format!("(?i){}", escaped),
        QueryOperator::StartsWith => format!("^{}", escaped),
        QueryOperator::IStartsWith => format!("(?i)^{}", escaped),
        QueryOperator::EndsWith => format!("{}$", escaped),
        QueryOperator::IEndsWith => format!("(?i){}$", escaped),
        QueryOperator::Exact => format!("^{}$", escaped),
        _ => format!("(?i)^{}$", escaped),
    };
    Regex::new(&pattern).map_err(|e| crate::quick_error!(store, format!("无效的匹配模式: {}", e)))
}

fn point_coordinates(value: &DataValue) -> Option<(f64, f64)> {
    match value {
        DataValue::Array(items) if items.len() == 2 => Some((items[0].as_f64()?, items[1].as_f64()?)),
        DataValue::Json(json) => {
            let coordinates = json.get("coordinates").unwrap_or(json).as_array()?;
            Some((coordinates.first()?.as_f64()?, coordinates.get(1)?.as_f64()?))
        }
        DataValue::Object(map) => point_coordinates(map.get("coordinates")?),
        _ => None,
    }
}

/// 两点间的球面距离（米），坐标顺序为 [经度, 纬度]
fn haversine_meters(a: (f64, f64), b: (f64, f64)) -> f64 {
    let (lng1, lat1) = (a.0.to_radians(), a.1.to_radians());
    let (lng2, lat2) = (b.0.to_radians(), b.1.to_radians());
    let d_lat = lat2 - lat1;
    let d_lng = lng2 - lng1;
    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_METERS * h.sqrt().asin()
}

fn matches_near(actual: &DataValue, filter: &DataValue) -> bool {
    let DataValue::Json(filter) = filter else {
        return false;
    };
    let Some(near) = filter.get("$near") else {
        return false;
    };
    let Some(center) = near
        .get("$geometry")
        .and_then(|g| point_coordinates(&DataValue::Json(g.clone())))
    else {
        return false;
    };
    let Some(point) = point_coordinates(actual) else {
        return false;
    };
    let max_distance = near.get("$maxDistance").and_then(|d| d.as_f64()).unwrap_or(f64::MAX);
    haversine_meters(center, point) <= max_distance
}

fn matches_condition(document: &Document, condition: &QueryCondition) -> QuickGqlResult<bool> {
    let actual = field_value(document, &condition.field).unwrap_or(DataValue::Null);
    let expected = &condition.value;
    let matched = match condition.operator {
        QueryOperator::Eq => contains_or_equals(&actual, expected),
        QueryOperator::Ne => !contains_or_equals(&actual, expected),
        QueryOperator::Gt => compare_values(&actual, expected) == Some(Ordering::Greater),
        QueryOperator::Gte => matches!(
            compare_values(&actual, expected),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        QueryOperator::Lt => compare_values(&actual, expected) == Some(Ordering::Less),
        QueryOperator::Lte => matches!(
            compare_values(&actual, expected),
            Some(Ordering::Less | Ordering::Equal)
        ),
        QueryOperator::In | QueryOperator::NotIn => {
            let candidates = expected.as_array().unwrap_or(&[]);
            let found = candidates.iter().any(|c| contains_or_equals(&actual, c));
            if condition.operator == QueryOperator::In { found } else { !found }
        }
        QueryOperator::All => {
            let required = expected.as_array().unwrap_or(&[]);
            match &actual {
                DataValue::Array(items) => required
                    .iter()
                    .all(|r| items.iter().any(|item| values_equal(item, r))),
                _ => false,
            }
        }
        QueryOperator::Contains
        | QueryOperator::IContains
        | QueryOperator::StartsWith
        | QueryOperator::IStartsWith
        | QueryOperator::EndsWith
        | QueryOperator::IEndsWith
        | QueryOperator::Exact
        | QueryOperator::IExact => {
            let (Some(haystack), Some(needle)) = (actual.as_str(), expected.as_str()) else {
                return Ok(false);
            };
            string_pattern(condition.operator, needle)?.is_match(haystack)
        }
        QueryOperator::Near => matches_near(&actual, expected),
        // 最大距离已合并进 near 条件
        QueryOperator::MaxDistance => true,
    };
    Ok(matched)
}

fn compare_documents(a: &Document, b: &Document, sort: &[SortConfig]) -> Ordering {
    for clause in sort {
        let left = field_value(a, &clause.field).unwrap_or(DataValue::Null);
        let right = field_value(b, &clause.field).unwrap_or(DataValue::Null);
        let ordering = compare_values(&left, &right).unwrap_or(Ordering::Equal);
        let ordering = match clause.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}
