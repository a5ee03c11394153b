use crate::types::data_value::DataValue;
use serde::{Deserialize, Serialize};

/// 查询条件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryCondition {
    /// 字段名
    pub field: String,
    /// 操作符
    pub operator: QueryOperator,
    /// 值
    pub value: DataValue,
}

impl QueryCondition {
    pub fn new(field: impl Into<String>, operator: QueryOperator, value: impl Into<DataValue>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }

    /// 等值条件
    pub fn eq(field: impl Into<String>, value: impl Into<DataValue>) -> Self {
        Self::new(field, QueryOperator::Eq, value)
    }
}

/// 查询操作符
///
/// 每个操作符对应过滤参数名 `<field>__<suffix>` 中的后缀
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum QueryOperator {
    /// 等于
    Eq,
    /// 不等于
    Ne,
    /// 大于
    Gt,
    /// 大于等于
    Gte,
    /// 小于
    Lt,
    /// 小于等于
    Lte,
    /// 在列表中
    In,
    /// 不在列表中
    NotIn,
    /// 数组包含全部给定值
    All,
    /// 包含（字符串）
    Contains,
    /// 包含（大小写不敏感）
    IContains,
    /// 开始于（字符串）
    StartsWith,
    /// 开始于（大小写不敏感）
    IStartsWith,
    /// 结束于（字符串）
    EndsWith,
    /// 结束于（大小写不敏感）
    IEndsWith,
    /// 精确匹配
    Exact,
    /// 精确匹配（大小写不敏感）
    IExact,
    /// 地理位置邻近
    Near,
    /// 邻近查询的最大距离
    MaxDistance,
}

impl QueryOperator {
    /// 过滤参数名后缀
    pub fn suffix(&self) -> &'static str {
        match self {
            QueryOperator::Eq => "eq",
            QueryOperator::Ne => "ne",
            QueryOperator::Gt => "gt",
            QueryOperator::Gte => "gte",
            QueryOperator::Lt => "lt",
            QueryOperator::Lte => "lte",
            QueryOperator::In => "in",
            QueryOperator::NotIn => "nin",
            QueryOperator::All => "all",
            QueryOperator::Contains => "contains",
            QueryOperator::IContains => "icontains",
            QueryOperator::StartsWith => "startswith",
            QueryOperator::IStartsWith => "istartswith",
            QueryOperator::EndsWith => "endswith",
            QueryOperator::IEndsWith => "iendswith",
            QueryOperator::Exact => "exact",
            QueryOperator::IExact => "iexact",
            QueryOperator::Near => "near",
            QueryOperator::MaxDistance => "max_distance",
        }
    }

    /// 从参数名后缀解析
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        let op = match suffix {
            "eq" => QueryOperator::Eq,
            "ne" => QueryOperator::Ne,
            "gt" => QueryOperator::Gt,
            "gte" => QueryOperator::Gte,
            "lt" => QueryOperator::Lt,
            "lte" => QueryOperator::Lte,
            "in" => QueryOperator::In,
            "nin" => QueryOperator::NotIn,
            "all" => QueryOperator::All,
            "contains" => QueryOperator::Contains,
            "icontains" => QueryOperator::IContains,
            "startswith" => QueryOperator::StartsWith,
            "istartswith" => QueryOperator::IStartsWith,
            "endswith" => QueryOperator::EndsWith,
            "iendswith" => QueryOperator::IEndsWith,
            "exact" => QueryOperator::Exact,
            "iexact" => QueryOperator::IExact,
            "near" => QueryOperator::Near,
            "max_distance" => QueryOperator::MaxDistance,
            _ => return None,
        };
        Some(op)
    }

    /// 参数值是否必须为列表
    pub fn expects_list(&self) -> bool {
        matches!(self, QueryOperator::In | QueryOperator::NotIn | QueryOperator::All)
    }
}

/// 排序配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortConfig {
    /// 字段名
    pub field: String,
    /// 排序方向
    pub direction: SortDirection,
}

impl SortConfig {
    /// 解析 `-pub_date` / `+name` / `name` 形式的排序子句
    pub fn parse(clause: &str) -> Option<Self> {
        let clause = clause.trim();
        let (direction, field) = if let Some(field) = clause.strip_prefix('-') {
            (SortDirection::Desc, field)
        } else if let Some(field) = clause.strip_prefix('+') {
            (SortDirection::Asc, field)
        } else {
            (SortDirection::Asc, clause)
        };
        if field.is_empty() {
            return None;
        }
        Some(Self {
            field: field.to_string(),
            direction,
        })
    }
}

/// 排序方向
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SortDirection {
    /// 升序
    Asc,
    /// 降序
    Desc,
}

/// 分页配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// 跳过的记录数
    pub skip: u64,
    /// 限制返回的记录数，None 表示不限制
    pub limit: Option<u64>,
}

/// 查询选项
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryOptions {
    /// 查询条件
    pub conditions: Vec<QueryCondition>,
    /// 排序配置
    pub sort: Vec<SortConfig>,
    /// 分页配置
    pub pagination: Option<PaginationConfig>,
    /// 选择的字段（空表示选择所有字段）
    pub fields: Vec<String>,
    /// 只返回原始引用指针，不自动解引用
    pub no_dereference: bool,
}

impl QueryOptions {
    /// 创建新的查询选项
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置条件
    pub fn with_conditions(mut self, conditions: Vec<QueryCondition>) -> Self {
        self.conditions = conditions;
        self
    }

    /// 设置排序
    pub fn with_sort(mut self, sort: Vec<SortConfig>) -> Self {
        self.sort = sort;
        self
    }

    /// 设置分页
    pub fn with_pagination(mut self, pagination: PaginationConfig) -> Self {
        self.pagination = Some(pagination);
        self
    }

    /// 设置字段选择
    pub fn with_fields(mut self, fields: Vec<String>) -> Self {
        self.fields = fields;
        self
    }

    /// 不解引用
    pub fn no_dereference(mut self) -> Self {
        self.no_dereference = true;
        self
    }
}
