/*!
 * Integration tests for the file level workflow
 */

use anyhow::Result;
use std::fs;
use std::sync::Arc;
use tokio_test::{assert_err, assert_ok};

use subtrans::app_config::{Config, ProviderKind};
use subtrans::app_controller::Controller;
use subtrans::providers::mock::MockProvider;
use subtrans::subtitle_processor::{OutputMode, TranslationPosition};
use subtrans::translation::{ProviderProfile, TranslationService};

use crate::common;

fn controller_with(provider: &MockProvider, config: Config) -> Controller {
    let service = TranslationService::with_provider(
        Arc::new(provider.clone()),
        ProviderProfile::for_provider(ProviderKind::Google),
    );
    Controller::with_service(config, service)
}

fn french_config() -> Config {
    Config {
        target_language: "fr".to_string(),
        ..Config::default()
    }
}

#[tokio::test]
async fn test_run_should_write_translated_srt() -> Result<()> {
    common::init_logging();
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(temp_dir.path(), "movie.srt")?;
    let provider = MockProvider::prefixed("FR: ");

    let output = controller_with(&provider, french_config())
        .run(&input, temp_dir.path(), false)
        .await?
        .expect("output should be written");

    assert_eq!(output, temp_dir.path().join("movie_fr.srt"));
    let content = fs::read_to_string(&output)?;
    assert!(content.starts_with("1\n00:00:01,000 --> 00:00:04,000\nFR: This is a test subtitle.\n"));
    assert!(content.contains("FR: For testing purposes."));
    assert_eq!(provider.call_count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_run_bilingual_above_should_keep_original_below() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(temp_dir.path(), "movie.srt")?;
    let mut config = french_config();
    config.output.mode = OutputMode::OriginalAndTranslation;
    config.output.position = TranslationPosition::Above;

    let output = controller_with(&MockProvider::prefixed("FR: "), config)
        .run(&input, &temp_dir.path().join("out"), false)
        .await?
        .expect("output should be written");

    assert_eq!(output, temp_dir.path().join("out").join("movie_fr_bilingual_above.srt"));
    let content = fs::read_to_string(&output)?;
    assert!(content.contains("FR: It contains multiple entries.\nIt contains multiple entries.\n"));
    Ok(())
}

#[tokio::test]
async fn test_run_existing_output_should_require_force() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(temp_dir.path(), "movie.srt")?;
    let existing = common::create_test_file(temp_dir.path(), "movie_fr.srt", "keep me")?;
    let provider = MockProvider::prefixed("FR: ");
    let controller = controller_with(&provider, french_config());

    assert!(controller.run(&input, temp_dir.path(), false).await?.is_none());
    assert_eq!(fs::read_to_string(&existing)?, "keep me");
    assert_eq!(provider.call_count(), 0);

    assert!(controller.run(&input, temp_dir.path(), true).await?.is_some());
    assert!(fs::read_to_string(&existing)?.contains("FR: "));
    Ok(())
}

#[tokio::test]
async fn test_run_with_unparseable_file_should_fail_without_calls() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "broken.srt", "no timing here")?;
    let provider = MockProvider::echo();

    let result = controller_with(&provider, french_config())
        .run(&input, temp_dir.path(), false)
        .await;

    assert_err!(result);
    assert_eq!(provider.call_count(), 0);
    assert!(!temp_dir.path().join("broken_fr.srt").exists());
    Ok(())
}

#[tokio::test]
async fn test_run_missing_input_should_fail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let result = controller_with(&MockProvider::echo(), french_config())
        .run(&temp_dir.path().join("absent.srt"), temp_dir.path(), false)
        .await;
    assert_err!(result);
    Ok(())
}

#[tokio::test]
async fn test_run_folder_should_translate_subtitles_and_skip_outputs() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let nested = temp_dir.path().join("season1");
    fs::create_dir_all(&nested)?;

    common::create_test_subtitle(temp_dir.path(), "a.srt")?;
    common::create_test_file(&nested, "b.vtt", "WEBVTT\n\n00:00:01.000 --> 00:00:02.000\nHello\n")?;
    common::create_test_file(temp_dir.path(), "notes.txt", "not a subtitle")?;
    common::create_test_subtitle(temp_dir.path(), "c_fr.srt")?;
    let provider = MockProvider::prefixed("FR: ");

    let written = controller_with(&provider, french_config())
        .run_folder(temp_dir.path(), false)
        .await?;

    assert_eq!(written, 2);
    assert!(temp_dir.path().join("a_fr.srt").exists());
    assert!(nested.join("b_fr.vtt").exists());
    assert!(!temp_dir.path().join("c_fr_fr.srt").exists());
    Ok(())
}

#[test]
fn test_with_config_without_credentials_should_fail() {
    let config = Config {
        provider: ProviderKind::Tencent,
        ..french_config()
    };
    assert_err!(Controller::with_config(config));
}

#[test]
fn test_with_config_should_keep_configuration() -> Result<()> {
    let mut config = french_config();
    config.apply_overrides_from(|name| (name == "GOOGLE_API_KEY").then(|| "key".to_string()));
    let controller = assert_ok!(Controller::with_config(config));
    assert_eq!(controller.config().target_language, "fr");
    Ok(())
}
