/*!
 * Integration tests for whole-vault conversion
 */

use anyhow::Result;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use vault2html::{ConversionOutcome, Controller};

use crate::common;
use crate::common::mock_renderer::{MockBehavior, MockRenderer};

fn controller_with(config: vault2html::Config, renderer: &Arc<MockRenderer>) -> Controller {
    Controller::with_renderer(config, renderer.clone())
}

/// Test a full run: mirrored tree, exclusions, rewritten links and embedded videos
#[test]
fn test_run_folder_withTestVault_shouldConvertEligibleDocuments() -> Result<()> {
    common::init_logging();
    let temp_dir = common::create_temp_dir()?;
    let config = common::create_test_vault(temp_dir.path())?;
    let site = config.destination_path();
    let renderer = Arc::new(MockRenderer::default());
    let controller = controller_with(config, &renderer);

    let summary = tokio_test::block_on(controller.run_folder())?;

    assert_eq!(summary.converted, 3);
    assert_eq!(summary.excluded, 1);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.videos_embedded, 2);
    assert_eq!(renderer.rendered_titles(), vec!["Home", "Ideas", "Video"]);

    assert!(site.join("Home.html").is_file());
    assert!(site.join("Notes/Ideas.html").is_file());
    assert!(!site.join("Private.html").exists());
    assert!(!site.join("_templates").exists());

    let home = fs::read_to_string(site.join("Home.html"))?;
    assert!(home.contains(r#"<a href="Notes/Ideas.html">my ideas</a>"#));
    assert!(home.contains(r#"<span class="highlight">this</span>"#));

    let ideas = fs::read_to_string(site.join("Notes/Ideas.html"))?;
    assert!(ideas.contains("_resources/sketch%20one.png"));
    assert!(ideas.contains("[[not a link]]"));

    let video = fs::read_to_string(site.join("Notes/Video.html"))?;
    assert!(video.contains("https://www.youtube.com/embed/abc123"));
    assert!(video.contains("https://www.youtube.com/embed/xyz_9"));
    assert!(!video.contains("VIDEOPLACEHOLDER"));
    Ok(())
}

/// Test that the renderer gets the title, template and resource locations
#[test]
fn test_convert_document_shouldBuildRenderRequest() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let config = common::create_test_vault(temp_dir.path())?;
    let vault = config.vault_path();
    let template = config.template_path();
    let renderer = Arc::new(MockRenderer::default());
    let controller = controller_with(config, &renderer);

    let source = vault.join("Notes/Ideas.md");
    let outcome = tokio_test::block_on(controller.convert_document(&source))?;

    let requests = renderer.requests.lock().unwrap();
    let request = &requests[0];
    assert_eq!(request.title, "Ideas");
    assert_eq!(request.template, template);
    assert_eq!(request.vault_root, vault);
    assert_eq!(request.source_path, source);
    assert!(request.markdown.starts_with("![](_resources/sketch%20one.png){ width=300px }"));
    assert_eq!(
        outcome,
        ConversionOutcome::Converted {
            output: request.output_path.clone(),
            videos_embedded: 0,
        }
    );
    Ok(())
}

/// Test that excluded documents never reach the renderer
#[test]
fn test_convert_document_withPrivateFrontmatter_shouldExclude() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let config = common::create_test_vault(temp_dir.path())?;
    let source = config.vault_path().join("Private.md");
    let renderer = Arc::new(MockRenderer::default());
    let controller = controller_with(config, &renderer);

    let outcome = tokio_test::block_on(controller.convert_document(&source))?;

    assert_eq!(outcome, ConversionOutcome::Excluded);
    assert!(renderer.requests.lock().unwrap().is_empty());
    Ok(())
}

/// Test that a page which cannot be post-processed still counts as converted
#[test]
fn test_convert_document_withUnreadableOutput_shouldKeepConversion() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let config = common::create_test_vault(temp_dir.path())?;
    let source = config.vault_path().join("Notes/Video.md");
    let renderer = Arc::new(MockRenderer::new(MockBehavior::NoOutput));
    let controller = controller_with(config, &renderer);

    let outcome = tokio_test::block_on(controller.convert_document(&source))?;

    match outcome {
        ConversionOutcome::Converted { output, videos_embedded } => {
            assert_eq!(videos_embedded, 0);
            assert!(!output.exists());
        }
        ConversionOutcome::Excluded => panic!("document should not be excluded"),
    }
    Ok(())
}

/// Test partial failure: one failing document is logged and the rest still convert
#[tokio::test]
async fn test_run_folder_withFailingDocument_shouldLogAndContinue() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let mut config = common::create_test_vault(temp_dir.path())?;
    config.concurrent_documents = 1;
    let site = config.destination_path();
    let error_log = config.error_log_path();
    fs::write(&error_log, "stale content from a previous run")?;

    let renderer = Arc::new(MockRenderer::new(MockBehavior::FailTitles(vec!["Ideas".to_string()])));
    let controller = controller_with(config, &renderer);

    let summary = controller.run_folder().await?;

    assert_eq!(summary.converted, 2);
    assert_eq!(summary.failed, 1);
    assert!(site.join("Home.html").is_file());
    assert!(!site.join("Notes/Ideas.html").exists());

    let log = fs::read_to_string(&error_log)?;
    assert!(!log.contains("stale content"));
    assert!(log.contains(&format!("===== {} =====", Path::new(&controller.config().vault_folder).join("Notes/Ideas.md").display())));
    assert!(log.contains("could not convert Ideas"));
    assert!(log.contains("Command: mock"));
    Ok(())
}

/// Test that a missing renderer fails each document without stopping the run
#[tokio::test]
async fn test_run_folder_withMissingRenderer_shouldFailEachDocumentAndContinue() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let mut config = common::create_test_vault(temp_dir.path())?;
    config.concurrent_documents = 1;
    let error_log = config.error_log_path();
    let renderer = Arc::new(MockRenderer::new(MockBehavior::Missing));
    let controller = controller_with(config, &renderer);

    let summary = controller.run_folder().await?;

    assert_eq!(summary.converted, 0);
    assert_eq!(summary.excluded, 1);
    assert_eq!(summary.failed, 3);
    assert_eq!(renderer.requests.lock().unwrap().len(), 3);
    let log = fs::read_to_string(&error_log)?;
    assert_eq!(log.matches("not found").count(), 3);
    assert_eq!(log.matches("===== ").count(), 3);
    Ok(())
}

/// Test that an empty vault is not an error
#[tokio::test]
async fn test_run_folder_withEmptyVault_shouldReturnEmptySummary() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let vault = temp_dir.path().join("vault");
    fs::create_dir_all(&vault)?;
    let mut config = vault2html::Config::new(
        vault.to_string_lossy().to_string(),
        temp_dir.path().join("site").to_string_lossy().to_string(),
    );
    config.error_log_file = temp_dir.path().join("errors.txt").to_string_lossy().to_string();
    let controller = Controller::with_renderer(config, Arc::new(MockRenderer::default()));

    let summary = controller.run_folder().await?;

    assert_eq!(summary.converted + summary.excluded + summary.failed, 0);
    Ok(())
}
