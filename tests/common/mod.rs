/*!
 * Common test utilities for the twbtrans test suite
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use twbtrans::extraction::{default_rules, RuleSet, TextFilter};

/// A small but realistic workbook: a data source with captions and aliases,
/// a filter action, two worksheets (one with a formatted title), a dashboard
/// and the windows, zones and thumbnails that refer to the sheets by name.
pub const SAMPLE_WORKBOOK: &str = r#"<?xml version='1.0' encoding='utf-8' ?>

<!-- build 20241.24.0312.0830                               -->
<workbook original-version='18.1' source-build='2024.1.0 (20241.24.0312.0830)' version='18.1' xmlns:user='http://www.tableausoftware.com/xml/user'>
  <datasources>
    <datasource caption='Müügiandmed' inline='true' name='federated.0a1b2c3' version='18.1'>
      <column caption='Kokku' datatype='real' name='[Calculation_1]' role='measure' type='quantitative'>
        <calculation class='tableau' formula='SUM([Sales])' />
      </column>
      <column caption='Piirkond' datatype='string' name='[Region]' role='dimension' type='nominal'>
        <aliases>
          <alias key='&quot;N&quot;' value='Põhja' />
          <alias key='&quot;S&quot;' value='Lõuna' />
        </aliases>
      </column>
      <column datatype='integer' name='[Year]' role='dimension' type='ordinal' />
    </datasource>
  </datasources>
  <actions>
    <action caption='Filtreeri piirkond' name='[Action1]'>
      <activation auto-clear='true' type='on-select' />
      <source dashboard='Ülevaade' type='sheet' worksheet='Aasta muutus' />
    </action>
  </actions>
  <worksheets>
    <worksheet name='Aasta muutus'>
      <layout-options>
        <title>
          <formatted-text>
            <run bold='true'>Aasta muutus</run>
            <run fontsize='9'>Piirkond &amp; aasta</run>
          </formatted-text>
        </title>
      </layout-options>
      <table />
    </worksheet>
    <worksheet name='Tartu'>
      <table />
    </worksheet>
  </worksheets>
  <dashboards>
    <dashboard name='Ülevaade'>
      <zones>
        <zone h='100000' id='3' name='Aasta muutus' w='50000' x='0' y='0' />
        <zone h='100000' id='4' name='Tartu' w='50000' x='50000' y='0' />
      </zones>
    </dashboard>
  </dashboards>
  <windows>
    <window class='worksheet' name='Aasta muutus'>
      <viewpoints />
    </window>
    <window class='dashboard' name='Ülevaade'>
      <viewpoints>
        <viewpoint name='Aasta muutus' />
      </viewpoints>
    </window>
  </windows>
  <thumbnails>
    <thumbnail height='192' name='Aasta muutus' width='192'>iVBORw0KGgo=</thumbnail>
  </thumbnails>
</workbook>
"#;

/// Texts excluded from translation in the sample configuration
pub const SAMPLE_EXCLUSIONS: [&str; 2] = ["Kokku", "Tartu"];

/// Distinct translatable texts of the sample workbook, in first-seen order
pub const SAMPLE_UNITS: [&str; 8] = [
    "Müügiandmed",
    "Piirkond",
    "Põhja",
    "Lõuna",
    "Filtreeri piirkond",
    "Aasta muutus",
    "Piirkond & aasta",
    "Ülevaade",
];

/// Default rules with the sample exclusions
pub fn sample_rules() -> RuleSet {
    RuleSet::new(
        default_rules(),
        SAMPLE_EXCLUSIONS.iter().map(|s| s.to_string()).collect(),
        TextFilter::default(),
    )
}

/// Route library logs to the test output; set RUST_LOG to see them
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Writes the sample workbook into the specified directory
pub fn create_sample_workbook(dir: &Path, filename: &str) -> Result<PathBuf> {
    create_test_file(dir, filename, SAMPLE_WORKBOOK)
}

/// Names of the files directly inside `dir`, sorted
pub fn file_names(dir: &Path) -> Result<Vec<String>> {
    let mut names = fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.file_name().to_string_lossy().to_string()))
        .collect::<std::io::Result<Vec<_>>>()?;
    names.sort();
    Ok(names)
}
