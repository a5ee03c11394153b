//! 过滤参数
//!
//! 连接字段为每个可过滤的模型字段生成一个同名的等值参数，并为
//! `filter_fields` 中声明的每个操作符生成 `<field>__<op>` 参数。
//! 查询时把参数值翻译为存储层的查询条件

use crate::config::ResolverConfig;
use crate::error::QuickGqlResult;
use crate::model::{EnumDefinition, FieldDefinition, FieldKind, ModelMeta};
use crate::resolver::node::from_global_id;
use crate::schema::graph_type::*;
use crate::types::*;
use chrono::{DateTime, NaiveDate};
use rat_logger::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// 过滤参数值的类型
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FilterValueKind {
    Scalar(GraphScalar),
    Enum(EnumDefinition),
    /// 引用：接受全局ID，解码失败时按原始主键使用
    Reference,
    /// 主键：必须是合法的全局ID
    PrimaryKey,
    List(Box<FilterValueKind>),
    /// `[经度, 纬度]`
    GeoPoint,
}

/// 一个过滤参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterArgument {
    /// 参数名
    pub name: String,
    /// 模型字段名
    pub field: String,
    pub operator: QueryOperator,
    pub value_kind: FilterValueKind,
}

impl FilterArgument {
    fn new(field: &str, operator: QueryOperator, value_kind: FilterValueKind) -> Self {
        let name = if operator == QueryOperator::Eq {
            field.to_string()
        } else {
            format!("{}__{}", field, operator.suffix())
        };
        Self {
            name,
            field: field.to_string(),
            operator,
            value_kind,
        }
    }
}

/// 字段作为等值过滤参数时的值类型；`None` 表示不可过滤
fn filter_kind(definition: &FieldDefinition) -> Option<FilterValueKind> {
    let kind = match &definition.kind {
        FieldKind::String | FieldKind::Email | FieldKind::Url => FilterValueKind::Scalar(GraphScalar::String),
        FieldKind::ObjectId | FieldKind::Uuid => FilterValueKind::Scalar(GraphScalar::ID),
        FieldKind::Int | FieldKind::Long => FilterValueKind::Scalar(GraphScalar::Int),
        FieldKind::Boolean => FilterValueKind::Scalar(GraphScalar::Boolean),
        FieldKind::Float => FilterValueKind::Scalar(GraphScalar::Float),
        FieldKind::Decimal => FilterValueKind::Scalar(GraphScalar::Decimal),
        FieldKind::DateTime => FilterValueKind::Scalar(GraphScalar::DateTime),
        FieldKind::Date => FilterValueKind::Scalar(GraphScalar::Date),
        FieldKind::Enum(definition) => FilterValueKind::Enum(definition.clone()),
        FieldKind::Reference { .. }
        | FieldKind::LazyReference { .. }
        | FieldKind::GenericReference { .. }
        | FieldKind::GenericLazyReference { .. } => FilterValueKind::Reference,
        // 列表字段按元素匹配
        FieldKind::List(inner) => return filter_kind(inner),
        FieldKind::Dict
        | FieldKind::Map
        | FieldKind::Embedded { .. }
        | FieldKind::Point
        | FieldKind::Polygon
        | FieldKind::MultiPolygon
        | FieldKind::File
        | FieldKind::Unsupported { .. } => return None,
    };
    Some(kind)
}

fn operator_kind(operator: QueryOperator, base: &FilterValueKind) -> FilterValueKind {
    match operator {
        QueryOperator::Near => FilterValueKind::GeoPoint,
        QueryOperator::MaxDistance => FilterValueKind::Scalar(GraphScalar::Float),
        op if op.expects_list() => FilterValueKind::List(Box::new(base.clone())),
        _ => base.clone(),
    }
}

fn is_excluded(
    model: &ModelMeta,
    options: &GraphTypeOptions,
    fields: &BTreeMap<String, GraphField>,
    reserved: &[String],
    name: &str,
) -> bool {
    model.is_shadowed(name)
        || reserved.iter().any(|r| r == name)
        || options.non_filter_fields.iter().any(|f| f == name)
        || fields.get(name).is_some_and(|f| f.is_connection())
}

/// 生成类型的过滤参数
///
/// 连接字段、`non_filter_fields`、被计算属性遮蔽的字段与存储保留名不参与过滤
pub fn generate_filter_arguments(
    graph_type: &GraphType,
    fields: &BTreeMap<String, GraphField>,
    reserved: &[String],
) -> Vec<FilterArgument> {
    let model = &graph_type.model;
    let options = &graph_type.options;
    let mut arguments = Vec::new();

    for (name, definition) in &model.fields {
        if is_excluded(model, options, fields, reserved, name) {
            continue;
        }
        let base = if *name == model.primary_key {
            Some(FilterValueKind::PrimaryKey)
        } else {
            filter_kind(definition)
        };
        if let Some(base) = &base {
            arguments.push(FilterArgument::new(name, QueryOperator::Eq, base.clone()));
        }

        let Some(operators) = options.filter_fields.get(name) else {
            continue;
        };
        for operator in operators {
            if *operator == QueryOperator::Eq {
                continue;
            }
            let is_geo = matches!(operator, QueryOperator::Near | QueryOperator::MaxDistance);
            match (&base, is_geo) {
                (_, true) if matches!(definition.kind, FieldKind::Point) => {
                    arguments.push(FilterArgument::new(
                        name,
                        *operator,
                        operator_kind(*operator, &FilterValueKind::GeoPoint),
                    ));
                }
                (Some(base), false) => {
                    arguments.push(FilterArgument::new(name, *operator, operator_kind(*operator, base)));
                }
                _ => {
                    warn!("字段 {}.{} 不支持过滤操作符 {}", graph_type.name, name, operator.suffix());
                }
            }
        }
    }
    arguments
}

fn expect<T>(argument: &str, value: Option<T>, expected: &str) -> QuickGqlResult<T> {
    value.ok_or_else(|| crate::quick_error!(filter, argument, format!("需要{}", expected)))
}

fn convert_scalar(argument: &str, scalar: GraphScalar, value: &Value) -> QuickGqlResult<DataValue> {
    let converted = match scalar {
        GraphScalar::String | GraphScalar::ID => {
            DataValue::String(expect(argument, value.as_str(), "字符串")?.to_string())
        }
        GraphScalar::Int => DataValue::Int(expect(argument, value.as_i64(), "整数")?),
        GraphScalar::Float => DataValue::Float(expect(argument, value.as_f64(), "数字")?),
        GraphScalar::Decimal => match value {
            Value::String(s) if s.parse::<f64>().is_ok() => DataValue::Decimal(s.clone()),
            Value::Number(n) => DataValue::Decimal(n.to_string()),
            _ => return Err(crate::quick_error!(filter, argument, "需要十进制数")),
        },
        GraphScalar::Boolean => DataValue::Bool(expect(argument, value.as_bool(), "布尔值")?),
        GraphScalar::DateTime => {
            let raw = expect(argument, value.as_str(), "RFC3339 时间")?;
            let parsed = DateTime::parse_from_rfc3339(raw)
                .map_err(|e| crate::quick_error!(filter, argument, format!("时间格式错误: {}", e)))?;
            DataValue::DateTime(parsed)
        }
        GraphScalar::Date => {
            let raw = expect(argument, value.as_str(), "日期")?;
            let parsed = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map_err(|e| crate::quick_error!(filter, argument, format!("日期格式错误: {}", e)))?;
            DataValue::Date(parsed)
        }
        GraphScalar::JSONString => DataValue::Json(value.clone()),
    };
    Ok(converted)
}

fn convert_value(argument: &str, kind: &FilterValueKind, value: &Value) -> QuickGqlResult<DataValue> {
    match kind {
        FilterValueKind::Scalar(scalar) => convert_scalar(argument, *scalar, value),
        FilterValueKind::Enum(definition) => {
            let member = expect(argument, value.as_str(), "枚举成员")?;
            if !definition.contains(member) {
                return Err(crate::quick_error!(
                    filter,
                    argument,
                    format!("{} 不是枚举 {} 的成员", member, definition.name)
                ));
            }
            Ok(DataValue::String(member.to_string()))
        }
        FilterValueKind::Reference => {
            let raw = expect(argument, value.as_str(), "ID")?;
            let id = match from_global_id(raw) {
                Ok((_, id)) => id,
                Err(_) => raw.to_string(),
            };
            Ok(DataValue::String(id))
        }
        FilterValueKind::PrimaryKey => {
            let raw = expect(argument, value.as_str(), "全局ID")?;
            let (_, id) = from_global_id(raw)?;
            Ok(DataValue::String(id))
        }
        FilterValueKind::List(inner) => {
            let items = expect(argument, value.as_array(), "列表")?;
            let converted = items
                .iter()
                .map(|item| convert_value(argument, inner, item))
                .collect::<QuickGqlResult<Vec<_>>>()?;
            Ok(DataValue::Array(converted))
        }
        FilterValueKind::GeoPoint => {
            let coordinates = expect(argument, value.as_array(), "[经度, 纬度]")?;
            let point: Option<Vec<f64>> = coordinates.iter().map(|c| c.as_f64()).collect();
            match point {
                Some(point) if point.len() == 2 => Ok(DataValue::Array(
                    point.into_iter().map(DataValue::Float).collect(),
                )),
                _ => Err(crate::quick_error!(filter, argument, "需要两个数字组成的坐标")),
            }
        }
    }
}

/// 邻近查询的存储形状
fn near_condition(field: &str, point: &DataValue, max_distance: f64) -> QueryCondition {
    let coordinates = point.to_json_value();
    QueryCondition::new(
        field,
        QueryOperator::Near,
        DataValue::Json(serde_json::json!({
            "$near": {
                "$geometry": {"type": "Point", "coordinates": coordinates},
                "$maxDistance": max_distance,
            }
        })),
    )
}

/// 把过滤参数值翻译为查询条件
///
/// 空值参数被忽略；未声明的参数与无法转换的值是用户错误
pub fn materialize_filters(
    bound: &BoundType,
    arguments: &BTreeMap<String, Value>,
    config: &ResolverConfig,
) -> QuickGqlResult<Vec<QueryCondition>> {
    let mut conditions = Vec::new();
    let mut near: Vec<(String, DataValue)> = Vec::new();
    let mut max_distances: BTreeMap<String, f64> = BTreeMap::new();

    for (name, value) in arguments {
        if value.is_null() {
            continue;
        }
        let Some(argument) = bound.filter_argument(name) else {
            return Err(crate::quick_error!(filter, name, format!("类型 {} 没有这个过滤参数", bound.name)));
        };
        let converted = convert_value(name, &argument.value_kind, value)?;
        match argument.operator {
            QueryOperator::Near => near.push((argument.field.clone(), converted)),
            QueryOperator::MaxDistance => {
                let distance = converted.as_f64().unwrap_or(config.default_max_distance);
                max_distances.insert(argument.field.clone(), distance);
            }
            operator => conditions.push(QueryCondition::new(argument.field.clone(), operator, converted)),
        }
    }

    for (field, point) in near {
        let distance = max_distances
            .remove(&field)
            .unwrap_or(config.default_max_distance);
        conditions.push(near_condition(&field, &point, distance));
    }
    for field in max_distances.keys() {
        warn!("过滤参数 {}__max_distance 没有对应的 near 参数，已忽略", field);
    }
    Ok(conditions)
}
