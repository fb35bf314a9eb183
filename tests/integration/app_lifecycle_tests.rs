/*!
 * Full app lifecycle tests: backups, output files and directory mode
 */

use anyhow::Result;
use std::fs;
use std::sync::Arc;
use twbtrans::app_config::Config;
use twbtrans::app_controller::Controller;
use twbtrans::errors::{AppError, ErrorKind};
use twbtrans::file_utils::FileManager;
use twbtrans::providers::mock::{MockBehavior, MockProvider};

use crate::common::{self, SAMPLE_EXCLUSIONS, SAMPLE_WORKBOOK};

fn test_config(target_language: &str) -> Config {
    let mut config = Config::default();
    config.target_language = target_language.to_string();
    config.translation.common.retry_backoff_ms = 1;
    config.extraction.exclusions = SAMPLE_EXCLUSIONS.iter().map(|s| s.to_string()).collect();
    config
}

fn controller(target_language: &str, provider: Arc<MockProvider>) -> Result<Controller> {
    common::init_test_logging();
    Ok(Controller::with_config(test_config(target_language))?.with_provider(provider))
}

#[tokio::test]
async fn test_run_withDictionary_shouldWriteOutputAndBackupNextToInput() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_sample_workbook(temp_dir.path(), "Sales.twb")?;
    let provider = Arc::new(MockProvider::dictionary([("Aasta muutus", "Year Change")]));

    let outcome = controller("English", provider.clone())?.run(input.clone(), None).await?;

    assert_eq!(outcome.output, temp_dir.path().join("Sales_EN.twb"));
    assert!(FileManager::is_backup(&outcome.backup));
    assert_eq!(fs::read_to_string(&outcome.backup)?, SAMPLE_WORKBOOK);
    assert_eq!(fs::read_to_string(&input)?, SAMPLE_WORKBOOK);

    let translated = fs::read_to_string(&outcome.output)?;
    assert!(translated.contains("<worksheet name='Year Change'>"));
    assert!(translated.contains("caption='Kokku'"));
    assert_eq!(outcome.report.rewritten, 7);
    assert_eq!(provider.request_count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_run_withEchoProvider_shouldWriteIdenticalCopy() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_sample_workbook(temp_dir.path(), "Sales.twb")?;

    let outcome = controller("fr", Arc::new(MockProvider::echo()))?.run(input, None).await?;

    assert_eq!(outcome.output, temp_dir.path().join("Sales_FR.twb"));
    assert_eq!(fs::read(&outcome.output)?, SAMPLE_WORKBOOK.as_bytes());
    Ok(())
}

#[tokio::test]
async fn test_run_withLengthMismatch_shouldLeaveOnlyTheBackup() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_sample_workbook(temp_dir.path(), "Sales.twb")?;
    let provider = Arc::new(MockProvider::new(MockBehavior::DropLast));

    let error = controller("English", provider)?.run(input, None).await.unwrap_err();

    assert_eq!(error.kind(), ErrorKind::GatewayLengthMismatch);
    let names = common::file_names(temp_dir.path())?;
    assert_eq!(names.len(), 2, "{:?}", names);
    assert!(names.contains(&"Sales.twb".to_string()));
    assert!(names.iter().any(|name| name.starts_with("Sales_backup_")));
    assert!(!temp_dir.path().join("Sales_EN.twb").exists());
    Ok(())
}

#[tokio::test]
async fn test_run_withMissingInput_shouldReportInputNotFound() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let provider = Arc::new(MockProvider::echo());

    let error = controller("English", provider.clone())?
        .run(temp_dir.path().join("missing.twb"), None)
        .await
        .unwrap_err();

    assert_eq!(error.kind(), ErrorKind::InputNotFound);
    assert!(common::file_names(temp_dir.path())?.is_empty());
    assert_eq!(provider.request_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_run_withExplicitOutput_shouldWriteThere() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_sample_workbook(temp_dir.path(), "Sales.twb")?;
    let target = temp_dir.path().join("translated").join("sales-english.twb");

    let outcome = controller("English", Arc::new(MockProvider::prefix("T")))?
        .run(input, Some(target.clone()))
        .await?;

    assert_eq!(outcome.output, target);
    assert!(fs::read_to_string(&target)?.contains("<worksheet name='TAasta muutus'>"));
    assert!(!temp_dir.path().join("Sales_EN.twb").exists());
    Ok(())
}

#[tokio::test]
async fn test_run_withOutputEqualToInput_shouldRefuseToOverwrite() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_sample_workbook(temp_dir.path(), "Sales.twb")?;
    let provider = Arc::new(MockProvider::prefix("T"));

    let error = controller("English", provider.clone())?
        .run(input.clone(), Some(input.clone()))
        .await
        .unwrap_err();

    assert!(matches!(error, AppError::File(_)));
    assert_eq!(fs::read_to_string(&input)?, SAMPLE_WORKBOOK);
    assert_eq!(provider.request_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_run_folder_shouldTranslateEveryWorkbookAndSkipEarlierOutputs() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let nested = temp_dir.path().join("finance");
    fs::create_dir_all(&nested)?;
    common::create_sample_workbook(temp_dir.path(), "Sales.twb")?;
    common::create_sample_workbook(&nested, "Budget.twb")?;
    common::create_sample_workbook(temp_dir.path(), "Old_DE.twb")?;
    let provider = Arc::new(MockProvider::prefix("T"));

    let summary = controller("German", provider.clone())?
        .run_folder(temp_dir.path().to_path_buf())
        .await?;

    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.failed, 0);
    assert!(temp_dir.path().join("Sales_DE.twb").exists());
    assert!(nested.join("Budget_DE.twb").exists());
    assert!(!temp_dir.path().join("Old_DE_DE.twb").exists());
    assert_eq!(provider.request_count(), 2);
    Ok(())
}

#[tokio::test]
async fn test_run_folder_withBrokenWorkbook_shouldContinueAndFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_sample_workbook(temp_dir.path(), "A_good.twb")?;
    common::create_test_file(temp_dir.path(), "B_broken.twb", "<workbook><worksheets>")?;

    let result = controller("English", Arc::new(MockProvider::echo()))?
        .run_folder(temp_dir.path().to_path_buf())
        .await;

    assert!(result.is_err());
    assert!(temp_dir.path().join("A_good_EN.twb").exists());
    assert!(!temp_dir.path().join("B_broken_EN.twb").exists());
    Ok(())
}

#[tokio::test]
async fn test_dry_run_shouldNeitherCallProviderNorWrite() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_sample_workbook(temp_dir.path(), "Sales.twb")?;
    let provider = Arc::new(MockProvider::echo());

    let report = controller("English", provider.clone())?.dry_run(&input)?;

    assert_eq!(report.units, 8);
    assert_eq!(report.batches, 1);
    assert_eq!(provider.request_count(), 0);
    assert_eq!(common::file_names(temp_dir.path())?, vec!["Sales.twb".to_string()]);
    Ok(())
}
