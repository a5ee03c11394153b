//! 字段选择树
//!
//! 宿主查询引擎解析并校验后的选择集。解析器只读取字段名、参数值
//! 与子选择；内联片段按类型条件保留，用于联合类型的分派

use serde_json::Value;
use std::collections::BTreeMap;

/// 一个字段选择
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    pub name: String,
    pub alias: Option<String>,
    pub arguments: BTreeMap<String, Value>,
    pub selections: Vec<SelectionNode>,
}

/// 子选择：字段或内联片段
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionNode {
    Field(Selection),
    InlineFragment {
        type_condition: String,
        selections: Vec<SelectionNode>,
    },
}

impl Selection {
    pub fn field(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn alias(mut self, alias: &str) -> Self {
        self.alias = Some(alias.to_string());
        self
    }

    pub fn arg(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.arguments.insert(name.to_string(), value.into());
        self
    }

    /// 添加子字段
    pub fn select(mut self, child: Selection) -> Self {
        self.selections.push(SelectionNode::Field(child));
        self
    }

    /// 添加若干叶子字段
    pub fn leaves(mut self, names: &[&str]) -> Self {
        for name in names {
            self.selections.push(SelectionNode::Field(Selection::field(name)));
        }
        self
    }

    /// 添加内联片段 `... on <type_condition> { … }`
    pub fn on(mut self, type_condition: &str, children: Vec<Selection>) -> Self {
        self.selections.push(SelectionNode::InlineFragment {
            type_condition: type_condition.to_string(),
            selections: children.into_iter().map(SelectionNode::Field).collect(),
        });
        self
    }

    /// 响应中的键名
    pub fn response_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    /// 对某个具体类型生效的子字段（展开类型条件匹配的内联片段）
    pub fn fields_for_type(&self, type_name: &str) -> Vec<&Selection> {
        let mut out = Vec::new();
        collect_for_type(&self.selections, type_name, &mut out);
        out
    }

    /// 收窄到某个具体类型：匹配的片段被展开，其余片段被丢弃
    pub fn narrow(&self, type_name: &str) -> Selection {
        Selection {
            name: self.name.clone(),
            alias: self.alias.clone(),
            arguments: self.arguments.clone(),
            selections: self
                .fields_for_type(type_name)
                .into_iter()
                .cloned()
                .map(SelectionNode::Field)
                .collect(),
        }
    }

    /// 按名称查找直接子字段（包括片段内的）
    pub fn child(&self, name: &str) -> Option<&Selection> {
        let mut out = Vec::new();
        collect_all(&self.selections, &mut out);
        out.into_iter().find(|s| s.name == name)
    }
}

fn collect_for_type<'a>(nodes: &'a [SelectionNode], type_name: &str, out: &mut Vec<&'a Selection>) {
    for node in nodes {
        match node {
            SelectionNode::Field(field) => out.push(field),
            SelectionNode::InlineFragment { type_condition, selections } => {
                if type_condition == type_name {
                    collect_for_type(selections, type_name, out);
                }
            }
        }
    }
}

fn collect_all<'a>(nodes: &'a [SelectionNode], out: &mut Vec<&'a Selection>) {
    for node in nodes {
        match node {
            SelectionNode::Field(field) => out.push(field),
            SelectionNode::InlineFragment { selections, .. } => collect_all(selections, out),
        }
    }
}

/// 查询字段树：字段名 -> 子字段
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryFields(pub BTreeMap<String, QueryFields>);

impl QueryFields {
    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn get(&self, name: &str) -> Option<&QueryFields> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn merge(&mut self, other: QueryFields) {
        for (name, children) in other.0 {
            self.0.entry(name).or_default().merge(children);
        }
    }
}

fn collect_query_fields(nodes: &[SelectionNode]) -> QueryFields {
    let mut fields = QueryFields::default();
    for node in nodes {
        match node {
            SelectionNode::Field(field) => {
                fields
                    .0
                    .entry(field.name.clone())
                    .or_default()
                    .merge(collect_query_fields(&field.selections));
            }
            SelectionNode::InlineFragment { selections, .. } => {
                fields.merge(collect_query_fields(selections));
            }
        }
    }
    fields
}

/// 选择中请求的字段；连接形状 `edges { node { … } }` 会被展开为节点字段
pub fn query_fields(selection: &Selection) -> QueryFields {
    let fields = collect_query_fields(&selection.selections);
    match fields.get("edges").and_then(|edges| edges.get("node")) {
        Some(node) => node.clone(),
        None => fields,
    }
}

/// 是否请求了 `pageInfo`
pub fn has_page_info(selection: &Selection) -> bool {
    selection.child("pageInfo").is_some()
}

/// 选择中以内联片段请求的联合成员类型及其字段
pub fn queried_union_types(selection: &Selection, members: &[String]) -> BTreeMap<String, QueryFields> {
    let mut queried: BTreeMap<String, QueryFields> = BTreeMap::new();
    for node in &selection.selections {
        if let SelectionNode::InlineFragment { type_condition, selections } = node {
            if members.iter().any(|m| m == type_condition) {
                queried
                    .entry(type_condition.clone())
                    .or_default()
                    .merge(collect_query_fields(selections));
            }
        }
    }
    queried
}
