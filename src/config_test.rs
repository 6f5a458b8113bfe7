use super::*;

#[test]
fn default_config_is_valid() {
    let config = Config::default();
    assert!(config.validate().is_ok());
}

#[test]
fn parse_overrides_defaults() {
    let toml = "default_order = 51\nfsync_on_flush = true\n";
    let config = Config::parse(toml).expect("valid config");
    assert_eq!(config.default_order, 51);
    assert!(config.fsync_on_flush);
    assert_eq!(config.table_dir, PathBuf::from("."));
}

#[test]
fn rejects_even_order() {
    let toml = "default_order = 52\n";
    let err = Config::parse(toml).unwrap_err();
    assert!(matches!(err, TreeError::ArgumentError { .. }));
}

#[test]
fn rejects_malformed_toml() {
    let err = Config::parse("this is not toml =").unwrap_err();
    assert!(matches!(err, TreeError::FormatError { .. }));
}
