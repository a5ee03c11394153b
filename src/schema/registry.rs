//! 类型注册表
//!
//! 两阶段构建：`RegistryBuilder::register` 声明类型并立即转换不依赖其他类型的字段，
//! `finalize` 在全部类型声明完毕后一次性解析延迟绑定、生成过滤参数，
//! 得到之后只读的 [`TypeRegistry`]。每种执行方式与输入变体各用一个注册表实例

use crate::config::ResolverConfig;
use crate::error::QuickGqlResult;
use crate::model::{EnumDefinition, FieldKind};
use crate::schema::converter::{convert_field, Binding, DeferredBinding, TypeHandle, TypeLookup};
use crate::schema::filters::generate_filter_arguments;
use crate::schema::graph_type::*;
use dashmap::DashMap;
use rat_logger::{info, warn};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// 枚举包装缓存，以枚举名为键
#[derive(Debug, Default)]
pub struct EnumCache {
    enums: DashMap<String, EnumDefinition>,
}

impl EnumCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册枚举；已存在时返回缓存中的版本
    pub fn register(&self, definition: &EnumDefinition) -> EnumDefinition {
        if let Some(existing) = self.enums.get(&definition.name) {
            return existing.value().clone();
        }
        self.enums
            .entry(definition.name.clone())
            .or_insert_with(|| definition.clone())
            .value()
            .clone()
    }

    pub fn get(&self, name: &str) -> Option<EnumDefinition> {
        self.enums.get(name).map(|e| e.value().clone())
    }

    pub fn len(&self) -> usize {
        self.enums.len()
    }

    pub fn is_empty(&self) -> bool {
        self.enums.is_empty()
    }
}

struct DeclaredType {
    graph_type: GraphType,
    fields: BTreeMap<String, GraphField>,
    deferred: Vec<DeferredBinding>,
}

impl DeclaredType {
    fn handle(&self) -> TypeHandle {
        TypeHandle {
            type_name: self.graph_type.name.clone(),
            connection: self.graph_type.connection_name(),
            description: self.graph_type.options.description.clone(),
        }
    }
}

/// 注册表构建器
pub struct RegistryBuilder {
    kind: RegistryKind,
    declared: Vec<DeclaredType>,
    /// 模型名 -> 声明下标
    by_model: HashMap<String, usize>,
    /// 类型名 -> 模型名
    by_name: HashMap<String, String>,
    enums: Arc<EnumCache>,
    reserved_accessors: Vec<String>,
}

impl RegistryBuilder {
    /// 创建指定种类的注册表构建器
    pub fn new(kind: RegistryKind) -> Self {
        Self::with_config(kind, &ResolverConfig::default())
    }

    pub fn with_config(kind: RegistryKind, config: &ResolverConfig) -> Self {
        Self {
            kind,
            declared: Vec::new(),
            by_model: HashMap::new(),
            by_name: HashMap::new(),
            enums: Arc::new(EnumCache::new()),
            reserved_accessors: config.reserved_accessors.clone(),
        }
    }

    pub fn kind(&self) -> RegistryKind {
        self.kind
    }

    /// 注册图类型
    ///
    /// 模型不合法、注册表种类不匹配或同一模型重复注册时失败
    pub fn register(&mut self, graph_type: GraphType) -> QuickGqlResult<()> {
        graph_type.model.validate()?;

        if graph_type.options.registry != self.kind {
            return Err(crate::quick_error!(
                registration,
                graph_type.name,
                format!(
                    "类型声明的注册表 ({}) 与目标注册表 ({}) 不一致",
                    graph_type.options.registry, self.kind
                )
            ));
        }
        if self.by_name.contains_key(&graph_type.name) {
            return Err(crate::quick_error!(registration, graph_type.name, "类型名已被注册"));
        }
        if !graph_type.options.skip_registry && self.by_model.contains_key(&graph_type.model.name) {
            return Err(crate::quick_error!(
                registration,
                graph_type.name,
                format!("模型 {} 在该注册表中已绑定类型", graph_type.model.name)
            ));
        }

        let mut fields = BTreeMap::new();
        let mut deferred = Vec::new();
        for name in graph_type.exposed_field_names() {
            let Some(definition) = graph_type.model.get_field(&name) else {
                continue;
            };
            let required = definition.required
                && !graph_type.options.non_required_fields.contains(&name);
            match convert_field(&graph_type.model, &name, definition, required, &self.enums)? {
                Binding::Bound(field) => {
                    fields.insert(name, field);
                }
                Binding::Deferred(binding) => deferred.push(binding),
            }
        }

        info!(
            "注册图类型: {} -> {} ({}个字段, {}个延迟绑定, 注册表={})",
            graph_type.name,
            graph_type.model.name,
            fields.len(),
            deferred.len(),
            self.kind
        );

        let index = self.declared.len();
        if !graph_type.options.skip_registry {
            self.by_model.insert(graph_type.model.name.clone(), index);
        }
        self.by_name
            .insert(graph_type.name.clone(), graph_type.model.name.clone());
        self.declared.push(DeclaredType {
            graph_type,
            fields,
            deferred,
        });
        Ok(())
    }

    /// 模型是否已绑定类型
    pub fn is_registered(&self, model: &str) -> bool {
        self.by_model.contains_key(model)
    }

    /// 清空全部注册（测试隔离用）
    pub fn reset(&mut self) {
        self.declared.clear();
        self.by_model.clear();
        self.by_name.clear();
        self.enums = Arc::new(EnumCache::new());
    }

    /// 完成构建
    ///
    /// 解析全部延迟绑定（同名字段以首次成功的转换为准），
    /// 生成过滤参数并校验过滤字段声明
    pub fn finalize(self) -> QuickGqlResult<Arc<TypeRegistry>> {
        let mut by_model = HashMap::new();
        let mut by_name = HashMap::new();

        for declared in &self.declared {
            let graph_type = &declared.graph_type;
            let mut fields = declared.fields.clone();
            for binding in &declared.deferred {
                match binding.resolve(&self)? {
                    Some(field) => {
                        fields.entry(binding.field_name.clone()).or_insert(field);
                    }
                    None => {
                        warn!(
                            "字段 {}.{} 的目标类型未注册，已省略",
                            graph_type.name, binding.field_name
                        );
                    }
                }
            }

            for filter_field in graph_type.options.filter_fields.keys() {
                match graph_type.model.get_field(filter_field) {
                    Some(definition) if !matches!(definition.kind, FieldKind::Unsupported { .. }) => {}
                    _ => {
                        return Err(crate::quick_error!(
                            schema,
                            format!("类型 {} 声明的过滤字段 {} 不是可过滤的模型字段", graph_type.name, filter_field)
                        ));
                    }
                }
            }

            let filter_arguments = generate_filter_arguments(graph_type, &fields, &self.reserved_accessors);
            let bound = Arc::new(BoundType {
                name: graph_type.name.clone(),
                model: graph_type.model.clone(),
                options: graph_type.options.clone(),
                fields,
                connection: graph_type.connection_name(),
                filter_arguments,
            });
            if !graph_type.options.skip_registry {
                by_model.insert(graph_type.model.name.clone(), bound.clone());
            }
            by_name.insert(graph_type.name.clone(), bound);
        }

        info!("注册表构建完成: {} 个类型 (注册表={})", by_name.len(), self.kind);
        Ok(Arc::new(TypeRegistry {
            kind: self.kind,
            by_model,
            by_name,
            enums: self.enums,
        }))
    }
}

impl TypeLookup for RegistryBuilder {
    fn lookup_model(&self, model: &str) -> Option<TypeHandle> {
        self.by_model
            .get(model)
            .map(|index| self.declared[*index].handle())
    }
}

/// 构建完成的只读注册表
pub struct TypeRegistry {
    kind: RegistryKind,
    by_model: HashMap<String, Arc<BoundType>>,
    by_name: HashMap<String, Arc<BoundType>>,
    enums: Arc<EnumCache>,
}

impl TypeRegistry {
    pub fn kind(&self) -> RegistryKind {
        self.kind
    }

    /// 模型绑定的类型；未绑定不是错误
    pub fn get_type_for_model(&self, model: &str) -> Option<Arc<BoundType>> {
        self.by_model.get(model).cloned()
    }

    pub fn get_type_by_name(&self, name: &str) -> Option<Arc<BoundType>> {
        self.by_name.get(name).cloned()
    }

    /// 类型名对应的模型名
    pub fn model_for_type_name(&self, name: &str) -> Option<&str> {
        self.by_name.get(name).map(|t| t.model.name.as_str())
    }

    pub fn get_enum(&self, name: &str) -> Option<EnumDefinition> {
        self.enums.get(name)
    }

    pub fn types(&self) -> impl Iterator<Item = &Arc<BoundType>> {
        self.by_name.values()
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

impl TypeLookup for TypeRegistry {
    fn lookup_model(&self, model: &str) -> Option<TypeHandle> {
        self.by_model.get(model).map(|t| TypeHandle {
            type_name: t.name.clone(),
            connection: t.connection.clone(),
            description: t.options.description.clone(),
        })
    }
}
