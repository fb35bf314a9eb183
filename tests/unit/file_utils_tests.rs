/*!
 * Tests for file utility functions
 */

use anyhow::Result;
use chrono::{Local, TimeZone};
use std::fs;
use std::path::Path;
use twbtrans::file_utils::FileManager;

use crate::common;

/// Test that file_exists returns true for existing files
#[test]
fn test_file_exists_withExistingFile_shouldReturnTrue() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let test_file = common::create_test_file(temp_dir.path(), "test_file_exists.twb", "<workbook/>")?;

    assert!(FileManager::file_exists(&test_file));
    assert!(!FileManager::dir_exists(&test_file));

    Ok(())
}

/// Test that file_exists returns false for non-existent files
#[test]
fn test_file_exists_withNonExistentFile_shouldReturnFalse() {
    assert!(!FileManager::file_exists("non_existent_file.twb"));
}

#[test]
fn test_generate_output_path_withLanguageCode_shouldAppendCodeToStem() {
    let output_path = FileManager::generate_output_path(Path::new("/tmp/input/Sales report.twb"), "EN");
    assert_eq!(output_path, Path::new("/tmp/input/Sales report_EN.twb"));
}

#[test]
fn test_generate_backup_path_shouldUseTimestamp() {
    let time = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
    let backup = FileManager::generate_backup_path(Path::new("/data/Sales.twb"), time);
    assert_eq!(backup, Path::new("/data/Sales_backup_20240309_140507.twb"));
}

#[test]
fn test_create_backup_calledTwice_shouldNeverReplaceExistingBackup() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_sample_workbook(temp_dir.path(), "Sales.twb")?;

    let first = FileManager::create_backup(&input)?;
    let second = FileManager::create_backup(&input)?;

    assert_ne!(first, second);
    assert!(FileManager::is_backup(&first));
    assert!(FileManager::is_backup(&second));
    assert_eq!(fs::read(&first)?, fs::read(&input)?);
    assert_eq!(fs::read(&second)?, fs::read(&input)?);
    Ok(())
}

#[test]
fn test_find_workbooks_shouldSkipBackupsAndOutputs() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let nested = temp_dir.path().join("finance");
    fs::create_dir_all(&nested)?;

    common::create_sample_workbook(temp_dir.path(), "Sales.twb")?;
    common::create_sample_workbook(&nested, "Budget.TWB")?;
    common::create_sample_workbook(temp_dir.path(), "Sales_EN.twb")?;
    common::create_sample_workbook(temp_dir.path(), "Sales_backup_20240309_140507.twb")?;
    common::create_test_file(temp_dir.path(), "notes.txt", "not a workbook")?;

    let found = FileManager::find_workbooks(temp_dir.path(), "EN")?;
    let names: Vec<String> = found
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
        .collect();

    assert_eq!(names.len(), 2);
    assert!(names.contains(&"Sales.twb".to_string()));
    assert!(names.contains(&"Budget.TWB".to_string()));
    Ok(())
}

#[test]
fn test_write_bytes_withMissingParent_shouldCreateDirectories() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let target = temp_dir.path().join("out").join("deep").join("Sales_FR.twb");

    FileManager::write_bytes(&target, b"<workbook/>")?;

    assert_eq!(FileManager::read_bytes(&target)?, b"<workbook/>");
    Ok(())
}

#[test]
fn test_write_bytes_withExistingFile_shouldReplaceWithoutLeftovers() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let target = common::create_test_file(temp_dir.path(), "Sales_EN.twb", "<old>much longer content</old>")?;

    FileManager::write_bytes(&target, b"<new/>")?;

    assert_eq!(FileManager::read_bytes(&target)?, b"<new/>");
    assert_eq!(common::file_names(temp_dir.path())?, vec!["Sales_EN.twb".to_string()]);
    Ok(())
}

#[test]
fn test_write_bytes_withFailedPersist_shouldLeaveNoPartialFile() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    // A non-empty directory cannot be replaced by a file
    let target = temp_dir.path().join("Sales_EN.twb");
    fs::create_dir(&target)?;
    common::create_test_file(&target, "keep.txt", "x")?;

    assert!(FileManager::write_bytes(&target, b"<workbook/>").is_err());

    assert!(target.is_dir());
    assert_eq!(common::file_names(temp_dir.path())?, vec!["Sales_EN.twb".to_string()]);
    Ok(())
}

#[test]
fn test_copy_file_withMissingSource_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let result = FileManager::copy_file(temp_dir.path().join("missing.twb"), temp_dir.path().join("copy.twb"));
    assert!(result.is_err());
    Ok(())
}
