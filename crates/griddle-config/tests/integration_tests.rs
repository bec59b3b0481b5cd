use griddle_config::{ConfigError, ConfigLoader};
use std::path::PathBuf;
use tempfile::TempDir;

#[tokio::test]
async fn test_load_toml_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("griddle.toml");
    tokio::fs::write(
        &path,
        r#"
[api]
base_url = "https://assets.studio.internal"
timeout_secs = 60

[storage]
store_location = "/var/lib/griddle"
download_folder = "/mnt/projects/griddle"
"#,
    )
    .await
    .unwrap();

    let config = ConfigLoader::new().load_file(&path).await.unwrap();

    assert_eq!(config.api_root(), "https://assets.studio.internal/api/v1");
    assert_eq!(config.api.timeout_secs, 60);
    assert_eq!(
        config.download_folder(),
        PathBuf::from("/mnt/projects/griddle")
    );
}

#[tokio::test]
async fn test_missing_file_is_reported() {
    let dir = TempDir::new().unwrap();
    let result = ConfigLoader::new()
        .load_file(dir.path().join("absent.toml"))
        .await;
    assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
}

#[tokio::test]
async fn test_load_or_default_without_file() {
    let dir = TempDir::new().unwrap();
    let config = ConfigLoader::new()
        .load_or_default(dir.path().join("absent.toml"))
        .await
        .unwrap();
    assert!(config.launchers.is_empty());
}

#[tokio::test]
async fn test_invalid_file_fails_validation() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("griddle.json");
    tokio::fs::write(&path, r#"{"observability": {"log_format": "xml"}}"#)
        .await
        .unwrap();

    let result = ConfigLoader::new().load_file(&path).await;
    assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
}
