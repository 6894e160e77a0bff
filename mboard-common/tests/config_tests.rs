//! Configuration resolution tests
//!
//! Tests touching MBOARD_* or credential environment variables are marked
//! `#[serial]` so they never run in parallel with each other.

use mboard_common::config::{
    load_toml_config, resolve_config_path, resolve_data_folder, resolve_secret, LoggingConfig,
    CONFIG_ENV_VAR, DATA_FOLDER_ENV_VAR,
};
use serde::Deserialize;
use serial_test::serial;
use std::env;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Deserialize)]
struct ServiceToml {
    #[serde(default)]
    port: Option<u16>,
    #[serde(default)]
    data_folder: Option<PathBuf>,
    #[serde(default)]
    logging: LoggingConfig,
}

#[test]
#[serial]
fn test_env_config_path_used_without_cli() {
    env::set_var(CONFIG_ENV_VAR, "/etc/musicboard/social.toml");

    let path = resolve_config_path(None, "social");
    assert_eq!(path, Some(PathBuf::from("/etc/musicboard/social.toml")));

    // CLI still wins over the environment
    let path = resolve_config_path(Some(Path::new("/tmp/cli.toml")), "social");
    assert_eq!(path, Some(PathBuf::from("/tmp/cli.toml")));

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_blank_env_config_path_ignored() {
    env::set_var(CONFIG_ENV_VAR, "   ");

    let path = resolve_config_path(None, "definitely-not-a-module");
    assert_eq!(path, None);

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_data_folder_priority() {
    let toml_folder = PathBuf::from("/srv/toml");

    env::remove_var(DATA_FOLDER_ENV_VAR);
    assert_eq!(resolve_data_folder(None, Some(&toml_folder)), toml_folder);

    env::set_var(DATA_FOLDER_ENV_VAR, "/srv/env");
    assert_eq!(
        resolve_data_folder(None, Some(&toml_folder)),
        PathBuf::from("/srv/env")
    );
    assert_eq!(
        resolve_data_folder(Some(Path::new("/srv/cli")), Some(&toml_folder)),
        PathBuf::from("/srv/cli")
    );

    env::remove_var(DATA_FOLDER_ENV_VAR);

    // OS default is never empty
    assert!(!resolve_data_folder(None, None).as_os_str().is_empty());
}

#[test]
#[serial]
fn test_secret_env_overrides_toml() {
    env::set_var("MBOARD_TEST_SECRET", "from-env");
    assert_eq!(
        resolve_secret("MBOARD_TEST_SECRET", Some("from-toml")),
        Some("from-env".to_string())
    );

    env::set_var("MBOARD_TEST_SECRET", "");
    assert_eq!(
        resolve_secret("MBOARD_TEST_SECRET", Some("from-toml")),
        Some("from-toml".to_string())
    );

    env::remove_var("MBOARD_TEST_SECRET");
    assert_eq!(resolve_secret("MBOARD_TEST_SECRET", Some("  ")), None);
    assert_eq!(resolve_secret("MBOARD_TEST_SECRET", None), None);
}

#[test]
fn test_full_service_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("social.toml");
    std::fs::write(
        &path,
        r#"
port = 5800
data_folder = "/var/lib/musicboard"

[logging]
level = "warn"
"#,
    )
    .unwrap();

    let config: ServiceToml = load_toml_config(Some(&path)).unwrap();
    assert_eq!(config.port, Some(5800));
    assert_eq!(config.data_folder, Some(PathBuf::from("/var/lib/musicboard")));
    assert_eq!(config.logging.level, "warn");
}

#[test]
fn test_missing_file_starts_with_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config: ServiceToml = load_toml_config(Some(&dir.path().join("absent.toml"))).unwrap();

    assert_eq!(config.port, None);
    assert_eq!(config.logging, LoggingConfig::default());
}
