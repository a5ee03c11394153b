//! 配置文件读写测试

use rat_quickgql::*;
use tempfile::tempdir;

fn sample_config() -> QuickGqlConfig {
    let resolver = ResolverConfigBuilder::new()
        .worker_pool_size(8)
        .default_max_distance(2500.0)
        .reserved_accessors(&["objects", "pk", "_meta"])
        .build()
        .unwrap();
    let logging = LoggingConfigBuilder::new()
        .level(LogLevel::Debug)
        .console(false)
        .file_path(Some("logs/quickgql.log"))
        .structured(true)
        .build()
        .unwrap();
    QuickGqlConfig::builder()
        .resolver(resolver)
        .logging(logging)
        .build()
        .unwrap()
}

#[test]
fn test_toml_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("quickgql.toml");
    let config = sample_config();

    config.save_to_file(&path).unwrap();
    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("[resolver]"));

    let loaded = QuickGqlConfig::from_file(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_json_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("quickgql.json");
    let config = sample_config();

    config.save_to_file(&path).unwrap();
    let loaded = QuickGqlConfig::from_file(&path).unwrap();
    assert_eq!(loaded.resolver.worker_pool_size, 8);
    assert_eq!(loaded, config);
}

#[test]
fn test_invalid_file_rejected() {
    let dir = tempdir().unwrap();

    let path = dir.path().join("broken.toml");
    std::fs::write(&path, "resolver = [").unwrap();
    assert!(matches!(QuickGqlConfig::from_file(&path), Err(QuickGqlError::ConfigError { .. })));

    let path = dir.path().join("zero_pool.json");
    let mut config = sample_config();
    config.resolver.worker_pool_size = 0;
    std::fs::write(&path, serde_json::to_string(&config).unwrap()).unwrap();
    assert!(QuickGqlConfig::from_file(&path).is_err());

    assert!(QuickGqlConfig::from_file(dir.path().join("missing.toml")).is_err());
}

#[test]
fn test_library_info() {
    assert_eq!(get_info(), format!("{} v{}", NAME, VERSION));
    assert!(get_info().starts_with("rat_quickgql v"));
}

#[test]
fn test_default_resolver_config_used_by_schema() {
    let registry = RegistryBuilder::new(RegistryKind::SYNC).finalize().unwrap();
    let schema = Schema::builder(registry).build().unwrap();
    assert_eq!(schema.config(), &ResolverConfig::default());
    assert_eq!(schema.config().worker_pool_size, 5);
}
