//! 模型便捷函数模块
//!
//! 提供创建各种字段类型的便捷函数

use crate::model::field_types::{EnumDefinition, FieldDefinition, FieldKind};

/// 便捷函数：创建字符串字段
pub fn string_field() -> FieldDefinition {
    FieldDefinition::new(FieldKind::String)
}

/// 便捷函数：创建邮箱字段
pub fn email_field() -> FieldDefinition {
    FieldDefinition::new(FieldKind::Email)
}

/// 便捷函数：创建整数字段
pub fn integer_field() -> FieldDefinition {
    FieldDefinition::new(FieldKind::Int)
}

/// 便捷函数：创建浮点数字段
pub fn float_field() -> FieldDefinition {
    FieldDefinition::new(FieldKind::Float)
}

/// 便捷函数：创建布尔字段
pub fn boolean_field() -> FieldDefinition {
    FieldDefinition::new(FieldKind::Boolean)
}

/// 便捷函数：创建日期时间字段
pub fn datetime_field() -> FieldDefinition {
    FieldDefinition::new(FieldKind::DateTime)
}

/// 便捷函数：创建字典字段
pub fn dict_field() -> FieldDefinition {
    FieldDefinition::new(FieldKind::Dict)
}

/// 便捷函数：创建枚举字段
pub fn enum_field(name: &str, members: &[&str]) -> FieldDefinition {
    FieldDefinition::new(FieldKind::Enum(EnumDefinition::new(name, members)))
}

/// 便捷函数：创建列表字段
/// 元素定义可以是任何字段，包括引用与内嵌文档
pub fn list_field(item: FieldDefinition) -> FieldDefinition {
    FieldDefinition::new(FieldKind::List(Box::new(item)))
}

/// 便捷函数：创建内嵌文档字段
pub fn embedded_field(document: &str) -> FieldDefinition {
    FieldDefinition::new(FieldKind::Embedded {
        document: document.to_string(),
    })
}

/// 便捷函数：创建引用字段
pub fn reference_field(document: &str) -> FieldDefinition {
    FieldDefinition::new(FieldKind::Reference {
        document: document.to_string(),
    })
}

/// 便捷函数：创建懒引用字段
pub fn lazy_reference_field(document: &str) -> FieldDefinition {
    FieldDefinition::new(FieldKind::LazyReference {
        document: document.to_string(),
    })
}

/// 便捷函数：创建多态引用字段
pub fn generic_reference_field(choices: &[&str]) -> FieldDefinition {
    FieldDefinition::new(FieldKind::GenericReference {
        choices: choices.iter().map(|c| c.to_string()).collect(),
    })
}

/// 便捷函数：创建多态懒引用字段
pub fn generic_lazy_reference_field(choices: &[&str]) -> FieldDefinition {
    FieldDefinition::new(FieldKind::GenericLazyReference {
        choices: choices.iter().map(|c| c.to_string()).collect(),
    })
}

/// 便捷函数：创建地理点字段
pub fn point_field() -> FieldDefinition {
    FieldDefinition::new(FieldKind::Point)
}
