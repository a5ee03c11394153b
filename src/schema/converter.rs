//! 字段转换器
//!
//! 把模型字段定义转换为图字段。标量、枚举与高级类型立即绑定；
//! 引用、内嵌与多态引用返回延迟绑定，在注册表 `finalize` 时
//! 针对完整的注册表解析，从而打破前向引用与循环引用

use crate::error::QuickGqlResult;
use crate::model::{FieldDefinition, FieldKind, ModelMeta};
use crate::schema::graph_type::*;
use crate::schema::registry::EnumCache;
use convert_case::{Case, Casing};
use rat_logger::debug;

/// 注册表中一个类型的查找结果
#[derive(Debug, Clone, PartialEq)]
pub struct TypeHandle {
    pub type_name: String,
    pub connection: Option<String>,
    pub description: Option<String>,
}

/// 按模型名查找已注册类型
pub trait TypeLookup {
    fn lookup_model(&self, model: &str) -> Option<TypeHandle>;
}

/// 转换结果
#[derive(Debug, Clone)]
pub enum Binding {
    /// 已确定的图字段
    Bound(GraphField),
    /// 等待目标类型注册后再解析
    Deferred(DeferredBinding),
}

/// 延迟绑定
#[derive(Debug, Clone)]
pub struct DeferredBinding {
    /// 所属模型名
    pub owner_model: String,
    pub field_name: String,
    pub definition: FieldDefinition,
    pub required: bool,
}

impl DeferredBinding {
    /// 针对注册表解析
    ///
    /// 目标类型未注册时返回 `Ok(None)`，调用方应容忍该字段缺席
    pub fn resolve(&self, lookup: &dyn TypeLookup) -> QuickGqlResult<Option<GraphField>> {
        let name = self.field_name.as_str();
        let definition = &self.definition;
        let resolved = match &definition.kind {
            FieldKind::Reference { document } | FieldKind::LazyReference { document } => {
                let lazy = matches!(definition.kind, FieldKind::LazyReference { .. });
                lookup.lookup_model(document).map(|handle| {
                    GraphField::new(
                        name,
                        GraphFieldType::Object(handle.type_name.clone()),
                        FieldResolver::Reference { model: document.clone(), lazy },
                    )
                    .with_description(field_description(name, definition, Some(&handle)))
                })
            }
            FieldKind::Embedded { document } => lookup.lookup_model(document).map(|handle| {
                GraphField::new(name, GraphFieldType::Object(handle.type_name.clone()), FieldResolver::Embedded)
                    .with_description(field_description(name, definition, Some(&handle)))
            }),
            FieldKind::GenericReference { choices } | FieldKind::GenericLazyReference { choices } => {
                let lazy = matches!(definition.kind, FieldKind::GenericLazyReference { .. });
                synthesize_union(&self.owner_model, name, choices, lookup).map(|union| {
                    GraphField::new(name, GraphFieldType::Union(union), FieldResolver::Union { lazy })
                        .with_description(field_description(name, definition, None))
                })
            }
            FieldKind::List(inner) => self.resolve_list(inner, lookup),
            other => {
                return Err(crate::quick_error!(conversion, name, other.type_name()));
            }
        };
        Ok(resolved.map(|field| field.with_required(self.required)))
    }

    fn resolve_list(&self, inner: &FieldDefinition, lookup: &dyn TypeLookup) -> Option<GraphField> {
        let name = self.field_name.as_str();
        let description = field_description(name, &self.definition, None);
        match &inner.kind {
            FieldKind::Reference { document }
            | FieldKind::LazyReference { document }
            | FieldKind::Embedded { document } => {
                let handle = lookup.lookup_model(document)?;
                let embedded = matches!(inner.kind, FieldKind::Embedded { .. });
                let field = match &handle.connection {
                    // 元素类型带连接时整个字段变为分页连接
                    Some(connection) => GraphField::new(
                        name,
                        GraphFieldType::Connection {
                            node: handle.type_name.clone(),
                            connection: connection.clone(),
                        },
                        FieldResolver::Connection { model: document.clone() },
                    ),
                    None if embedded => GraphField::new(
                        name,
                        GraphFieldType::List(Box::new(GraphFieldType::Object(handle.type_name.clone()))),
                        FieldResolver::Embedded,
                    ),
                    None => GraphField::new(
                        name,
                        GraphFieldType::List(Box::new(GraphFieldType::Object(handle.type_name.clone()))),
                        FieldResolver::ReferenceList { model: document.clone() },
                    ),
                };
                Some(field.with_description(description))
            }
            FieldKind::GenericReference { choices } | FieldKind::GenericLazyReference { choices } => {
                let union = synthesize_union(&self.owner_model, name, choices, lookup)?;
                Some(
                    GraphField::new(
                        name,
                        GraphFieldType::List(Box::new(GraphFieldType::Union(union))),
                        FieldResolver::PolymorphicList,
                    )
                    .with_description(description),
                )
            }
            _ => None,
        }
    }
}

/// 多态引用的联合类型名：所属模型 + 字段名
pub fn union_type_name(owner_model: &str, field_name: &str) -> String {
    format!("{}_{}", owner_model, field_name).to_case(Case::Pascal) + "UnionType"
}

fn synthesize_union(
    owner_model: &str,
    field_name: &str,
    choices: &[String],
    lookup: &dyn TypeLookup,
) -> Option<UnionType> {
    let members: Vec<String> = choices
        .iter()
        .filter_map(|choice| lookup.lookup_model(choice).map(|h| h.type_name))
        .collect();
    if members.is_empty() {
        return None;
    }
    Some(UnionType {
        name: union_type_name(owner_model, field_name),
        members,
    })
}

/// 字段说明：目标类型说明、显示名称、帮助文本与存储字段名
pub fn field_description(
    name: &str,
    definition: &FieldDefinition,
    target: Option<&TypeHandle>,
) -> Option<String> {
    let mut parts = Vec::new();
    if let Some(description) = target.and_then(|t| t.description.as_ref()) {
        parts.push(description.clone());
    }
    if let Some(verbose_name) = &definition.verbose_name {
        parts.push(verbose_name.to_case(Case::Title));
    }
    if let Some(help_text) = &definition.help_text {
        parts.push(help_text.clone());
    }
    if let Some(db_field) = definition.db_field.as_ref().filter(|d| d.as_str() != name) {
        if parts.is_empty() {
            parts.push(db_field.clone());
        } else {
            parts.push(format!("({})", db_field));
        }
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("\n"))
    }
}

/// 列表元素若为引用类则整个列表字段需要延迟
fn needs_deferral(kind: &FieldKind) -> bool {
    match kind {
        FieldKind::Embedded { .. }
        | FieldKind::Reference { .. }
        | FieldKind::LazyReference { .. }
        | FieldKind::GenericReference { .. }
        | FieldKind::GenericLazyReference { .. } => true,
        FieldKind::List(inner) => needs_deferral(&inner.kind),
        _ => false,
    }
}

/// 不依赖其他类型的字段种类的图类型
fn leaf_type(
    field_name: &str,
    kind: &FieldKind,
    enums: &EnumCache,
) -> QuickGqlResult<(GraphFieldType, FieldResolver)> {
    let scalar = |s: GraphScalar| (GraphFieldType::Scalar(s), FieldResolver::Attribute);
    let converted = match kind {
        FieldKind::String | FieldKind::Email | FieldKind::Url => scalar(GraphScalar::String),
        FieldKind::ObjectId | FieldKind::Uuid => scalar(GraphScalar::ID),
        FieldKind::Int | FieldKind::Long => scalar(GraphScalar::Int),
        FieldKind::Boolean => scalar(GraphScalar::Boolean),
        FieldKind::Float => scalar(GraphScalar::Float),
        FieldKind::Decimal => scalar(GraphScalar::Decimal),
        FieldKind::DateTime => scalar(GraphScalar::DateTime),
        FieldKind::Date => scalar(GraphScalar::Date),
        FieldKind::Dict | FieldKind::Map => scalar(GraphScalar::JSONString),
        FieldKind::Enum(definition) => (
            GraphFieldType::Enum(enums.register(definition)),
            FieldResolver::Attribute,
        ),
        FieldKind::Point => advanced(AdvancedKind::Point),
        FieldKind::Polygon => advanced(AdvancedKind::Polygon),
        FieldKind::MultiPolygon => advanced(AdvancedKind::MultiPolygon),
        FieldKind::File => advanced(AdvancedKind::File),
        FieldKind::List(inner) => {
            let (element, resolver) = leaf_type(field_name, &inner.kind, enums)?;
            (GraphFieldType::List(Box::new(element)), resolver)
        }
        FieldKind::Embedded { .. }
        | FieldKind::Reference { .. }
        | FieldKind::LazyReference { .. }
        | FieldKind::GenericReference { .. }
        | FieldKind::GenericLazyReference { .. }
        | FieldKind::Unsupported { .. } => {
            return Err(crate::quick_error!(conversion, field_name, kind.type_name()));
        }
    };
    Ok(converted)
}

fn advanced(kind: AdvancedKind) -> (GraphFieldType, FieldResolver) {
    (GraphFieldType::Advanced(kind), FieldResolver::Advanced(kind))
}

/// 转换单个模型字段
///
/// 没有图映射的字段种类返回 `ConversionError`
pub fn convert_field(
    model: &ModelMeta,
    field_name: &str,
    definition: &FieldDefinition,
    required: bool,
    enums: &EnumCache,
) -> QuickGqlResult<Binding> {
    if needs_deferral(&definition.kind) {
        debug!("字段 {}.{} 延迟绑定: {}", model.name, field_name, definition.kind.type_name());
        return Ok(Binding::Deferred(DeferredBinding {
            owner_model: model.name.clone(),
            field_name: field_name.to_string(),
            definition: definition.clone(),
            required,
        }));
    }

    let (field_type, resolver) = leaf_type(field_name, &definition.kind, enums)?;
    Ok(Binding::Bound(
        GraphField::new(field_name, field_type, resolver)
            .with_description(field_description(field_name, definition, None))
            .with_required(required),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::*;
    use std::collections::HashMap;

    struct StaticLookup(HashMap<String, TypeHandle>);

    impl TypeLookup for StaticLookup {
        fn lookup_model(&self, model: &str) -> Option<TypeHandle> {
            self.0.get(model).cloned()
        }
    }

    fn handle(type_name: &str, connection: Option<&str>) -> TypeHandle {
        TypeHandle {
            type_name: type_name.to_string(),
            connection: connection.map(|c| c.to_string()),
            description: None,
        }
    }

    fn bound(binding: Binding) -> GraphField {
        match binding {
            Binding::Bound(field) => field,
            Binding::Deferred(d) => panic!("expected bound field, got deferred {}", d.field_name),
        }
    }

    fn deferred(binding: Binding) -> DeferredBinding {
        match binding {
            Binding::Deferred(d) => d,
            Binding::Bound(f) => panic!("expected deferred binding, got {}", f.name),
        }
    }

    #[test]
    fn test_scalar_dispatch() {
        let model = ModelMeta::new("Article", "test_article");
        let enums = EnumCache::new();
        let cases = [
            (string_field(), "String"),
            (email_field(), "String"),
            (integer_field(), "Int"),
            (float_field(), "Float"),
            (boolean_field(), "Boolean"),
            (datetime_field(), "DateTime"),
            (dict_field(), "JSONString"),
            (FieldDefinition::new(FieldKind::ObjectId), "ID"),
            (list_field(string_field()), "[String]"),
            (point_field(), "PointFieldType"),
        ];
        for (definition, expected) in cases {
            let field = bound(convert_field(&model, "f", &definition, false, &enums).unwrap());
            assert_eq!(field.field_type.type_name(), expected);
        }
    }

    #[test]
    fn test_unsupported_kind_fails() {
        let model = ModelMeta::new("Article", "test_article");
        let definition = FieldDefinition::new(FieldKind::Unsupported { type_name: "BinaryField".into() });
        let err = convert_field(&model, "blob", &definition, false, &EnumCache::new()).unwrap_err();
        assert!(matches!(err, crate::error::QuickGqlError::ConversionError { ref field, ref kind }
            if field == "blob" && kind == "BinaryField"));

        let list = list_field(definition);
        assert!(convert_field(&model, "blobs", &list, false, &EnumCache::new()).is_err());
    }

    #[test]
    fn test_enum_registered_once() {
        let model = ModelMeta::new("Player", "test_player");
        let enums = EnumCache::new();
        let definition = enum_field("Position", &["GUARD", "FORWARD", "CENTER"]);
        convert_field(&model, "position", &definition, false, &enums).unwrap();
        convert_field(&model, "backup_position", &definition, false, &enums).unwrap();
        assert_eq!(enums.len(), 1);
    }

    #[test]
    fn test_reference_deferred_absent_then_bound() {
        let model = ModelMeta::new("Article", "test_article");
        let definition = reference_field("Editor");
        let binding = deferred(convert_field(&model, "editor", &definition, false, &EnumCache::new()).unwrap());

        let empty = StaticLookup(HashMap::new());
        assert!(binding.resolve(&empty).unwrap().is_none());

        let lookup = StaticLookup(HashMap::from([("Editor".to_string(), handle("EditorType", None))]));
        let field = binding.resolve(&lookup).unwrap().unwrap();
        assert_eq!(field.field_type, GraphFieldType::Object("EditorType".into()));
        assert_eq!(field.resolver, FieldResolver::Reference { model: "Editor".into(), lazy: false });
    }

    #[test]
    fn test_list_of_connection_capable_references() {
        let model = ModelMeta::new("Reporter", "test_reporter");
        let definition = list_field(reference_field("Article"));
        let binding = deferred(convert_field(&model, "articles", &definition, false, &EnumCache::new()).unwrap());

        let with_connection = StaticLookup(HashMap::from([(
            "Article".to_string(),
            handle("ArticleNode", Some("ArticleNodeConnection")),
        )]));
        let field = binding.resolve(&with_connection).unwrap().unwrap();
        assert!(field.is_connection());

        let without = StaticLookup(HashMap::from([("Article".to_string(), handle("ArticleType", None))]));
        let field = binding.resolve(&without).unwrap().unwrap();
        assert_eq!(field.field_type.type_name(), "[ArticleType]");
        assert_eq!(field.resolver, FieldResolver::ReferenceList { model: "Article".into() });
    }

    #[test]
    fn test_generic_reference_union() {
        let model = ModelMeta::new("Reporter", "test_reporter");
        let definition = list_field(generic_reference_field(&["Article", "Editor", "Missing"]));
        let binding = deferred(convert_field(&model, "generic_references", &definition, false, &EnumCache::new()).unwrap());
        let lookup = StaticLookup(HashMap::from([
            ("Article".to_string(), handle("ArticleType", None)),
            ("Editor".to_string(), handle("EditorType", None)),
        ]));
        let field = binding.resolve(&lookup).unwrap().unwrap();
        assert_eq!(field.resolver, FieldResolver::PolymorphicList);
        match field.field_type {
            GraphFieldType::List(inner) => match *inner {
                GraphFieldType::Union(union) => {
                    assert_eq!(union.name, "ReporterGenericReferencesUnionType");
                    assert_eq!(union.members, vec!["ArticleType", "EditorType"]);
                }
                other => panic!("unexpected element type {:?}", other),
            },
            other => panic!("unexpected type {:?}", other),
        }
    }

    #[test]
    fn test_field_description() {
        let definition = string_field()
            .verbose_name("publication date")
            .help_text("When the article went live")
            .db_field("pubDate");
        let description = field_description("pub_date", &definition, None).unwrap();
        assert_eq!(description, "Publication Date\nWhen the article went live\n(pubDate)");

        let bare = string_field().db_field("hl");
        assert_eq!(field_description("headline", &bare, None).as_deref(), Some("hl"));
        assert!(field_description("headline", &string_field(), None).is_none());
    }
}
