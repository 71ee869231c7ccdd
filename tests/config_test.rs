//! Config loading and defaults integration tests

use std::io::Write;

use edoc_transfer::config::ConfigError;
use edoc_transfer::Config;

#[test]
fn test_default_config_values() {
    let config = Config::from_toml("").expect("empty TOML is valid");

    assert_eq!(config.server.listen, "0.0.0.0:8080".parse().unwrap());
    assert_eq!(config.session.cookie_name, "edoc_session");
    assert_eq!(config.session.ttl_secs, 3600);
    assert_eq!(config.demo.otp, "123456");
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_with_all_fields() {
    let toml_str = r#"
[server]
listen = "127.0.0.1:3000"

[session]
cookie_name = "portal-sid"
ttl_secs = 600

[demo]
otp = "4242"
"#;

    let config = Config::from_toml(toml_str).expect("valid TOML");

    assert_eq!(config.server.listen, "127.0.0.1:3000".parse().unwrap());
    assert_eq!(config.session.cookie_name, "portal-sid");
    assert_eq!(config.session.ttl_secs, 600);
    assert_eq!(config.demo.otp, "4242");
    assert!(config.validate().is_ok());
}

#[test]
fn test_partial_sections_keep_defaults() {
    let config = Config::from_toml("[session]\nttl_secs = 60\n").unwrap();

    assert_eq!(config.session.ttl_secs, 60);
    assert_eq!(config.session.cookie_name, "edoc_session");
    assert_eq!(config.demo.otp, "123456");
}

#[test]
fn test_malformed_toml_is_rejected() {
    let result = Config::from_toml("[server]\nlisten = \"not an address\"\n");
    assert!(matches!(result, Err(ConfigError::Parse(_))));
}

#[test]
fn test_validate_rejects_bad_values() {
    let mut config = Config::default();
    config.session.cookie_name = "bad cookie;".to_string();
    assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

    let mut config = Config::default();
    config.session.ttl_secs = 0;
    assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

    let mut config = Config::default();
    config.demo.otp = "12ab".to_string();
    assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

    let mut config = Config::default();
    config.demo.otp = String::new();
    assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
}

#[test]
fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[demo]\notp = \"999999\"").unwrap();

    let config = Config::load(file.path()).unwrap();
    assert_eq!(config.demo.otp, "999999");
}

#[test]
fn test_missing_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::load(&dir.path().join("absent.toml")).unwrap();

    assert_eq!(config.demo.otp, "123456");
    assert_eq!(config.session.cookie_name, "edoc_session");
}
