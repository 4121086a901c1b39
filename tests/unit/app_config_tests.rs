/*!
 * Tests for application configuration functionality
 */

use anyhow::Result;
use vault2html::app_config::{Config, LogLevel, RendererConfig};
use vault2html::errors::AppError;

use crate::common;

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(
        config.excluded_folders,
        vec!["_excalidraw", "_resources", "_templates", ".obsidian", ".trash"]
    );
    assert!(config.exclude_frontmatter_properties.is_empty());
    assert_eq!(config.template_file, "templates/user.html");
    assert_eq!(config.error_log_file, "errors.txt");
    assert_eq!(config.concurrent_documents, 4);
    assert_eq!(config.renderer.program, "pandoc");
    assert_eq!(config.renderer.from_format, "markdown+hard_line_breaks");
    assert!(config.renderer.embed_resources);
    assert!(config.renderer.fail_if_warnings);
    assert_eq!(config.log_level, LogLevel::Info);
}

/// Test that a minimal file gets every optional key from defaults
#[test]
fn test_load_withOnlyFolders_shouldFillDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "config.json",
        r#"{ "vault_folder": "/v", "destination_folder": "/d" }"#,
    )?;

    let config = Config::load(&path)?;

    assert_eq!(config, Config::new("/v", "/d"));
    Ok(())
}

/// Test that configuration files from the earlier tool still load
#[test]
fn test_load_withLegacyFolderKey_shouldReadVaultFolder() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "config.json",
        r#"{
            "obsidian_folder": "/notes",
            "destination_folder": "/html",
            "excluded_folders": ["_resources"],
            "_comments": { "excluded_folders": "Folders to skip" }
        }"#,
    )?;

    let config = Config::load(&path)?;

    assert_eq!(config.vault_folder, "/notes");
    assert_eq!(config.destination_folder, "/html");
    assert_eq!(config.excluded_folders, vec!["_resources"]);
    Ok(())
}

/// Test that save and load agree on every field
#[test]
fn test_save_thenLoad_shouldPreserveCustomValues() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("config.json");

    let mut config = Config::new("/vault", "/site");
    config.exclude_frontmatter_properties = vec!["foldernote".to_string(), "private".to_string()];
    config.concurrent_documents = 1;
    config.renderer = RendererConfig {
        program: "/opt/pandoc/bin/pandoc".to_string(),
        extra_args: vec!["--toc".to_string()],
        ..RendererConfig::default()
    };
    config.log_level = LogLevel::Debug;
    config.save(&path)?;

    let saved = std::fs::read_to_string(&path)?;
    assert!(saved.contains("\n  \"vault_folder\""), "expected pretty JSON: {}", saved);
    assert!(saved.contains("\"log_level\": \"debug\""));
    assert_eq!(Config::load(&path)?, config);
    Ok(())
}

/// Test that missing required keys are reported
#[test]
fn test_load_withMissingFolders_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "config.json", r#"{ "excluded_folders": [] }"#)?;

    let error = Config::load(&path).unwrap_err();
    assert!(format!("{:#}", error).contains("Failed to parse config file"));
    Ok(())
}

/// Test configuration validation
#[test]
fn test_config_validation_withVariousConfigs_shouldValidateCorrectly() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let vault = temp_dir.path().to_string_lossy().to_string();

    let mut config = Config::new(vault.clone(), "/tmp/site");
    assert!(config.validate().is_ok());

    config.vault_folder = temp_dir.path().join("missing").to_string_lossy().to_string();
    assert!(matches!(config.validate(), Err(AppError::Config(_))));
    config.vault_folder = vault;

    config.destination_folder = "  ".to_string();
    assert!(config.validate().is_err());
    config.destination_folder = "/tmp/site".to_string();

    config.concurrent_documents = 0;
    assert!(config.validate().is_err());
    config.concurrent_documents = 2;

    config.renderer.program = String::new();
    assert!(config.validate().is_err());

    Ok(())
}

/// Test folder exclusion lookup
#[test]
fn test_isExcludedFolder_shouldMatchExactNames() {
    let config = Config::default();
    assert!(config.is_excluded_folder(".obsidian"));
    assert!(config.is_excluded_folder("_resources"));
    assert!(!config.is_excluded_folder("resources"));
}

/// Test log level mapping
#[test]
fn test_logLevel_toLevelFilter_shouldMapEachLevel() {
    assert_eq!(LogLevel::Error.to_level_filter(), log::LevelFilter::Error);
    assert_eq!(LogLevel::Trace.to_level_filter(), log::LevelFilter::Trace);
}
