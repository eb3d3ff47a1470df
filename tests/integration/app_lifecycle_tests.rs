/*!
 * Tests of the application controller: single files, folders and outputs
 */

use anyhow::Result;
use std::fs;
use std::sync::Arc;
use ytautosub::app_config::{Config, OutputFormat};
use ytautosub::app_controller::{Controller, RunOutcome};
use ytautosub::errors::{AppError, ExtractionError};
use ytautosub::providers::mock::MockProvider;
use ytautosub::subtitle_processor::Subtitle;
use crate::common;

fn controller() -> Controller {
    let mut config = Config::default();
    config.reshaping.api_key = "test-key".to_string();
    Controller::with_config(config)
}

/// Test converting one file end to end
#[tokio::test]
async fn test_run_withSampleFile_shouldWriteSrtNextToInput() -> Result<()> {
    common::init_test_logging();
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "talk.srv3", common::SAMPLE_SRV3)?;
    let provider = Arc::new(common::chunking_provider(2));

    let outcome = controller()
        .run_with_provider(provider.clone(), input, None, false)
        .await?;

    let output = temp_dir.path().join("talk.srt");
    assert_eq!(
        outcome,
        RunOutcome::Converted {
            output: output.clone(),
            words: 7,
            subtitles: 4,
        }
    );

    let srt = fs::read_to_string(&output)?;
    assert!(srt.starts_with("1\n00:00:01,000 --> "));
    assert!(srt.contains("hello world"));
    assert!(srt.contains("\n4\n00:00:06,000 --> 00:00:07,500\ntest\n"));
    assert_eq!(provider.call_count(), 1);

    Ok(())
}

/// Test that an existing output is left alone unless forced
#[tokio::test]
async fn test_run_withExistingOutput_shouldSkipUnlessForced() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "talk.srv3", common::SAMPLE_SRV3)?;
    let existing = common::create_test_file(temp_dir.path(), "talk.srt", "keep me")?;
    let provider = Arc::new(common::chunking_provider(3));

    let skipped = controller()
        .run_with_provider(provider.clone(), input.clone(), None, false)
        .await?;
    assert_eq!(skipped, RunOutcome::Skipped { output: existing.clone() });
    assert_eq!(fs::read_to_string(&existing)?, "keep me");
    assert_eq!(provider.call_count(), 0);

    controller()
        .run_with_provider(provider.clone(), input, None, true)
        .await?;
    assert_ne!(fs::read_to_string(&existing)?, "keep me");

    Ok(())
}

/// Test JSON output to an explicit path
#[tokio::test]
async fn test_run_withJsonFormatAndOutputPath_shouldWriteJson() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "talk.srv3", common::SAMPLE_SRV3)?;
    let output = temp_dir.path().join("out/subs.json");

    let mut config = Config::default();
    config.output_format = OutputFormat::Json;
    let controller = Controller::with_config(config);

    controller
        .run_with_provider(Arc::new(common::chunking_provider(7)), input, Some(output.clone()), false)
        .await?;

    let subtitles: Vec<Subtitle> = serde_json::from_str(&fs::read_to_string(&output)?)?;
    assert_eq!(subtitles.len(), 1);
    assert_eq!(subtitles[0].text, "hello world this is a small test");
    assert_eq!(subtitles[0].start_ms, 1000);

    Ok(())
}

/// Test that an empty document fails without calling the provider or writing output
#[tokio::test]
async fn test_run_withEmptyDocument_shouldFailBeforeProvider() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "silent.srv3", common::EMPTY_SRV3)?;
    let provider = Arc::new(common::chunking_provider(3));

    let error = controller()
        .run_with_provider(provider.clone(), input, None, false)
        .await
        .unwrap_err();

    assert!(matches!(
        error.downcast_ref::<AppError>(),
        Some(AppError::Extraction(ExtractionError::Empty))
    ));
    assert_eq!(provider.call_count(), 0);
    assert!(!temp_dir.path().join("silent.srt").exists());

    Ok(())
}

/// Test that a failed run leaves no output file behind
#[tokio::test]
async fn test_run_withProviderFailure_shouldNotWriteOutput() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "talk.srv3", common::SAMPLE_SRV3)?;
    let provider = Arc::new(MockProvider::scripted(vec![Ok(MockProvider::envelope("not json"))]));

    let error = controller()
        .run_with_provider(provider, input, None, false)
        .await
        .unwrap_err();

    assert!(matches!(
        error.downcast_ref::<AppError>(),
        Some(AppError::Batch { batch_number: 1, stage: "response", .. })
    ));
    assert!(!temp_dir.path().join("talk.srt").exists());

    Ok(())
}

/// Test that single-file mode insists on the .srv3 extension
#[tokio::test]
async fn test_run_withWrongExtension_shouldRejectInput() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let xml = common::create_test_file(temp_dir.path(), "talk.xml", common::SAMPLE_SRV3)?;
    let srt = common::create_test_file(temp_dir.path(), "done.srt", "1\n00:00:01,000 --> 00:00:02,000\nHi\n")?;
    let provider = Arc::new(common::chunking_provider(3));

    let error = controller()
        .run_with_provider(provider.clone(), xml, None, false)
        .await
        .unwrap_err();
    assert!(error.to_string().contains(".srv3"));

    let error = controller()
        .run_with_provider(provider.clone(), srt, None, false)
        .await
        .unwrap_err();
    assert!(error.to_string().contains("already an SRT"));

    assert_eq!(provider.call_count(), 0);
    Ok(())
}

/// Test folder mode: converts, skips and reports failures without stopping
#[tokio::test]
async fn test_run_folder_withMixedFiles_shouldContinuePastFailures() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let nested = temp_dir.path().join("season1");
    fs::create_dir_all(&nested)?;

    common::create_test_file(temp_dir.path(), "a.srv3", common::SAMPLE_SRV3)?;
    common::create_test_file(temp_dir.path(), "b.srv3", common::EMPTY_SRV3)?;
    common::create_test_file(&nested, "c.srv3", &common::generated_srv3(20))?;
    common::create_test_file(&nested, "d.srv3", common::SAMPLE_SRV3)?;
    common::create_test_file(&nested, "d.srt", "already here")?;

    let provider = Arc::new(common::chunking_provider(4));
    let result = controller()
        .run_folder_with_provider(provider, temp_dir.path().to_path_buf(), false)
        .await;

    assert!(result.unwrap_err().to_string().contains("1 of 4 files failed"));
    assert!(temp_dir.path().join("a.srt").exists());
    assert!(!temp_dir.path().join("b.srt").exists());
    assert!(nested.join("c.srt").exists());
    assert_eq!(fs::read_to_string(nested.join("d.srt"))?, "already here");

    Ok(())
}

/// Test folder mode summary when every file succeeds
#[tokio::test]
async fn test_run_folder_withAllValidFiles_shouldReturnSummary() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_file(temp_dir.path(), "one.srv3", common::SAMPLE_SRV3)?;
    common::create_test_file(temp_dir.path(), "two.srv3", &common::generated_srv3(9))?;

    let summary = controller()
        .run_folder_with_provider(Arc::new(common::chunking_provider(5)), temp_dir.path().to_path_buf(), false)
        .await?;

    assert_eq!(summary.converted, 2);
    assert_eq!(summary.skipped, 0);
    assert_eq!(summary.failed, 0);

    Ok(())
}

/// Test that a folder without srv3 files is an error
#[tokio::test]
async fn test_run_folder_withNoInputs_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_file(temp_dir.path(), "readme.txt", "nothing here")?;

    let result = controller()
        .run_folder_with_provider(Arc::new(common::chunking_provider(5)), temp_dir.path().to_path_buf(), false)
        .await;
    assert!(result.is_err());

    Ok(())
}
