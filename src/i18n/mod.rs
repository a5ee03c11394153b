//! 多语言错误消息模块
//!
//! 使用rat_embed_lang框架提供统一的错误消息多语言支持

use crate::error::QuickGqlError;
use rat_embed_lang::register_translations;
use std::collections::HashMap;
use std::sync::Once;

static REGISTER: Once = Once::new();

/// 错误消息翻译注册器
pub struct ErrorMessageI18n;

impl ErrorMessageI18n {
    /// 注册所有错误消息翻译
    ///
    /// 重复调用只注册一次
    pub fn register_all_translations() {
        REGISTER.call_once(Self::build_and_register);
    }

    fn build_and_register() {
        let mut translations = HashMap::new();

        // 字段转换错误
        let mut conversion_errors = HashMap::new();
        conversion_errors.insert("zh-CN".to_string(), "无法转换字段 {field}: 未知的字段类型 {kind}".to_string());
        conversion_errors.insert("en-US".to_string(), "Don't know how to convert field {field} ({kind})".to_string());
        conversion_errors.insert("ja-JP".to_string(), "フィールド {field} を変換できません: 不明な型 {kind}".to_string());
        translations.insert("error.conversion".to_string(), conversion_errors);

        // 类型注册错误
        let mut registration_errors = HashMap::new();
        registration_errors.insert("zh-CN".to_string(), "类型注册失败: {type_name} - {message}".to_string());
        registration_errors.insert("en-US".to_string(), "Type registration failed: {type_name} - {message}".to_string());
        registration_errors.insert("ja-JP".to_string(), "型の登録に失敗しました: {type_name} - {message}".to_string());
        translations.insert("error.registration".to_string(), registration_errors);

        // 模式构建错误
        let mut schema_errors = HashMap::new();
        schema_errors.insert("zh-CN".to_string(), "模式构建错误: {message}".to_string());
        schema_errors.insert("en-US".to_string(), "Schema build error: {message}".to_string());
        schema_errors.insert("ja-JP".to_string(), "スキーマ構築エラー: {message}".to_string());
        translations.insert("error.schema".to_string(), schema_errors);

        // 游标错误
        let mut cursor_errors = HashMap::new();
        cursor_errors.insert("zh-CN".to_string(), "无效的游标 '{cursor}': {message}".to_string());
        cursor_errors.insert("en-US".to_string(), "Invalid cursor '{cursor}': {message}".to_string());
        cursor_errors.insert("ja-JP".to_string(), "無効なカーソル '{cursor}': {message}".to_string());
        translations.insert("error.cursor".to_string(), cursor_errors);

        // 缺少计数
        let mut missing_count_errors = HashMap::new();
        missing_count_errors.insert("zh-CN".to_string(), "使用 last 参数时必须能够获取结果总数".to_string());
        missing_count_errors.insert("en-US".to_string(), "Count missing: 'last' requires a result count".to_string());
        missing_count_errors.insert("ja-JP".to_string(), "'last' を使用するには件数が必要です".to_string());
        translations.insert("error.missing_count".to_string(), missing_count_errors);

        // 过滤值错误
        let mut filter_errors = HashMap::new();
        filter_errors.insert("zh-CN".to_string(), "过滤参数 '{argument}' 的值无效: {message}".to_string());
        filter_errors.insert("en-US".to_string(), "Invalid value for filter '{argument}': {message}".to_string());
        filter_errors.insert("ja-JP".to_string(), "フィルタ '{argument}' の値が無効です: {message}".to_string());
        translations.insert("error.filter_value".to_string(), filter_errors);

        // 全局ID错误
        let mut global_id_errors = HashMap::new();
        global_id_errors.insert("zh-CN".to_string(), "无效的全局ID '{id}': {message}".to_string());
        global_id_errors.insert("en-US".to_string(), "Invalid global id '{id}': {message}".to_string());
        global_id_errors.insert("ja-JP".to_string(), "無効なグローバルID '{id}': {message}".to_string());
        translations.insert("error.global_id".to_string(), global_id_errors);

        // 存储错误
        let mut store_errors = HashMap::new();
        store_errors.insert("zh-CN".to_string(), "存储操作失败: {message}".to_string());
        store_errors.insert("en-US".to_string(), "Store operation failed: {message}".to_string());
        store_errors.insert("ja-JP".to_string(), "ストア操作が失敗しました: {message}".to_string());
        translations.insert("error.store".to_string(), store_errors);

        // 配置错误
        let mut config_errors = HashMap::new();
        config_errors.insert("zh-CN".to_string(), "配置错误: {message}".to_string());
        config_errors.insert("en-US".to_string(), "Configuration error: {message}".to_string());
        config_errors.insert("ja-JP".to_string(), "設定エラー: {message}".to_string());
        translations.insert("error.config".to_string(), config_errors);

        // 序列化错误
        let mut serialization_errors = HashMap::new();
        serialization_errors.insert("zh-CN".to_string(), "数据序列化失败: {message}".to_string());
        serialization_errors.insert("en-US".to_string(), "Data serialization failed: {message}".to_string());
        serialization_errors.insert("ja-JP".to_string(), "データシリアライズが失敗しました: {message}".to_string());
        translations.insert("error.serialization".to_string(), serialization_errors);

        let mut io_errors = HashMap::new();
        io_errors.insert("zh-CN".to_string(), "IO错误: {message}".to_string());
        io_errors.insert("en-US".to_string(), "IO error: {message}".to_string());
        io_errors.insert("ja-JP".to_string(), "IOエラー: {message}".to_string());
        translations.insert("error.io".to_string(), io_errors);

        let mut other_errors = HashMap::new();
        other_errors.insert("zh-CN".to_string(), "{message}".to_string());
        other_errors.insert("en-US".to_string(), "{message}".to_string());
        other_errors.insert("ja-JP".to_string(), "{message}".to_string());
        translations.insert("error.other".to_string(), other_errors);

        // 注册所有翻译
        register_translations(translations);
    }

    /// 初始化错误消息多语言支持
    pub fn init() {
        Self::register_all_translations();

        // 从环境变量获取语言设置，默认为zh-CN
        let lang = std::env::var("RAT_LANG")
            .or_else(|_| std::env::var("LANG"))
            .unwrap_or_else(|_| "zh-CN".to_string());

        // 标准化语言代码
        use rat_embed_lang::normalize_language_code;
        let normalized_lang = normalize_language_code(&lang);
        set_language(&normalized_lang);
    }

    /// 按当前语言获取错误的本地化消息
    pub fn localize(err: &QuickGqlError) -> String {
        Self::localize_in(err, &current_language())
    }

    /// 按指定语言获取错误的本地化消息
    ///
    /// 该语言没有注册翻译时回退到错误自身的 Display 输出
    pub fn localize_in(err: &QuickGqlError, lang: &str) -> String {
        let key = err.i18n_key();
        if !has_translation_for_lang(key, lang) {
            return err.to_string();
        }
        let args = err.i18n_args();
        let args: Vec<(&str, &str)> = args.iter().map(|(name, value)| (*name, value.as_str())).collect();
        tf_with_lang(key, lang, &args)
    }
}

/// 重新导出rat_embed_lang的核心函数
pub use rat_embed_lang::{current_language, has_translation_for_lang, set_language, t, tf_with_lang};
