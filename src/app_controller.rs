use anyhow::{anyhow, Result};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app_config::{Config, TranslationProvider};
use crate::errors::{AppError, DocumentError};
use crate::extraction::RuleSet;
use crate::file_utils::FileManager;
use crate::language_utils;
use crate::providers::anthropic::Anthropic;
use crate::providers::ollama::Ollama;
use crate::providers::Provider;
use crate::translation::{plan_document, PipelineOptions, RunReport, TranslationPipeline};
use crate::validation::OutputValidator;

// @module: Application controller for workbook translation

/// Result of translating one workbook
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Written output file
    pub output: PathBuf,
    /// Backup of the input taken before the run
    pub backup: PathBuf,
    /// Run counters
    pub report: RunReport,
    /// Wall time of the run
    pub duration: Duration,
}

/// Counts of a directory run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderSummary {
    pub succeeded: usize,
    pub failed: usize,
}

/// Main application controller for workbook translation
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Compiled extraction rules
    rules: RuleSet,
    // @field: Translation backend
    provider: Arc<dyn Provider>,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let rules = config.rule_set()?;
        let provider = Self::build_provider(&config);
        Ok(Self { config, rules, provider })
    }

    /// Replace the provider built from the configuration
    pub fn with_provider(mut self, provider: Arc<dyn Provider>) -> Self {
        self.provider = provider;
        self
    }

    /// Configuration in use
    pub fn config(&self) -> &Config {
        &self.config
    }

    // @creates: Provider client for the configured backend
    fn build_provider(config: &Config) -> Arc<dyn Provider> {
        let translation = &config.translation;
        let common = &translation.common;
        match translation.provider {
            TranslationProvider::Anthropic => Arc::new(
                Anthropic::with_timeout(
                    translation.get_api_key(),
                    translation.get_endpoint(),
                    translation.get_model(),
                    translation.get_timeout_secs(),
                )
                .with_sampling(common.temperature, common.max_tokens)
                .with_system_prompt(&common.system_prompt),
            ),
            TranslationProvider::Ollama => Arc::new(
                Ollama::from_url(translation.get_endpoint(), translation.get_model(), translation.get_timeout_secs())
                    .with_temperature(common.temperature)
                    .with_system_prompt(&common.system_prompt),
            ),
        }
    }

    fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            target_language: language_utils::display_name(&self.config.target_language),
            batch_size: self.config.translation.common.batch_size,
            retry: self.config.translation.common.retry_policy(),
        }
    }

    fn validator(&self) -> Option<OutputValidator> {
        let validation = &self.config.validation;
        validation
            .enabled
            .then(|| OutputValidator::new(validation.reference_attributes.clone()))
    }

    /// Output path for `input_file`: the explicit one, or `<stem>_<CODE>.<ext>` next to the input
    pub fn output_path_for(&self, input_file: &Path, explicit: Option<&Path>) -> PathBuf {
        match explicit {
            Some(path) => path.to_path_buf(),
            None => FileManager::generate_output_path(
                input_file,
                &language_utils::file_code(&self.config.target_language),
            ),
        }
    }

    /// Locate and plan only; nothing is written and no provider is called
    pub fn dry_run(&self, input_file: &Path) -> Result<RunReport, AppError> {
        if !FileManager::file_exists(input_file) {
            return Err(DocumentError::InputNotFound(input_file.to_path_buf()).into());
        }

        let input = FileManager::read_bytes(input_file).map_err(file_error)?;
        let (_, plan) = plan_document(&input, &self.rules)?;
        let batch_size = self.config.translation.common.batch_size;

        for (position, unit) in plan.units().iter().enumerate() {
            println!("{:>4}. {} ({} location(s))", position + 1, unit.text, unit.locations.len());
        }

        Ok(RunReport::planned(&plan, &self.rules, batch_size))
    }

    /// Translate one workbook
    pub async fn run(&self, input_file: PathBuf, output: Option<PathBuf>) -> Result<RunOutcome, AppError> {
        let multi_progress = MultiProgress::new();
        self.run_with_progress(input_file, output, &multi_progress).await
    }

    async fn run_with_progress(
        &self,
        input_file: PathBuf,
        output: Option<PathBuf>,
        multi_progress: &MultiProgress,
    ) -> Result<RunOutcome, AppError> {
        // Start timing the process
        let start_time = Instant::now();

        // Check if the input file exists
        if !FileManager::file_exists(&input_file) {
            return Err(DocumentError::InputNotFound(input_file).into());
        }

        let output_path = self.output_path_for(&input_file, output.as_deref());
        if Self::same_file(&input_file, &output_path) {
            return Err(AppError::File(format!(
                "Output path {:?} would overwrite the input workbook",
                output_path
            )));
        }

        let input = FileManager::read_bytes(&input_file).map_err(file_error)?;
        let backup = FileManager::create_backup(&input_file).map_err(file_error)?;
        debug!("Backup written to {:?}", backup);

        info!(
            "Translating {:?} into {} with {}",
            input_file,
            language_utils::display_name(&self.config.target_language),
            self.provider.name()
        );

        let progress_bar = multi_progress.add(ProgressBar::new(0));
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} batches ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(template_result.progress_chars("█▓▒░"));

        let pipeline = TranslationPipeline::new(&self.rules, self.provider.as_ref(), self.pipeline_options())
            .with_validator(self.validator());
        let result = pipeline
            .run_with_progress(&input, |progress| {
                progress_bar.set_length(progress.total as u64);
                progress_bar.set_position(progress.completed as u64);
                progress_bar.set_message(format!("{} text(s)", progress.units));
            })
            .await;

        let output_data = match result {
            Ok(output_data) => {
                progress_bar.finish_with_message("done");
                output_data
            }
            Err(e) => {
                progress_bar.abandon_with_message("failed");
                return Err(e);
            }
        };

        FileManager::write_bytes(&output_path, &output_data.bytes).map_err(file_error)?;

        let duration = start_time.elapsed();
        info!("Success: {:?} ({})", output_path, Self::format_duration(duration));

        Ok(RunOutcome {
            output: output_path,
            backup,
            report: output_data.report,
            duration,
        })
    }

    fn same_file(input: &Path, output: &Path) -> bool {
        if input == output {
            return true;
        }
        match (input.canonicalize(), output.canonicalize()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }

    /// Format a duration for display
    pub fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }

    /// Run the workflow in folder mode, translating every workbook below a directory
    /// Backups and earlier outputs for the same language are skipped
    pub async fn run_folder(&self, input_dir: PathBuf) -> Result<FolderSummary> {
        // Start timing the process
        let start_time = Instant::now();

        // Check if the input directory exists
        if !FileManager::dir_exists(&input_dir) {
            return Err(anyhow!("Input directory does not exist: {:?}", input_dir));
        }

        let code = language_utils::file_code(&self.config.target_language);
        let workbooks = FileManager::find_workbooks(&input_dir, &code)?;

        if workbooks.is_empty() {
            return Err(anyhow!("No workbooks found in directory: {:?}", input_dir));
        }

        // Create multi-progress instance for multiple file processing
        let multi_progress = MultiProgress::new();

        // Create a progress bar for folder processing
        let folder_pb = multi_progress.add(ProgressBar::new(workbooks.len() as u64));
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        folder_pb.set_style(template_result.progress_chars("█▓▒░"));
        folder_pb.set_message("Processing files");

        let mut summary = FolderSummary::default();

        for workbook in &workbooks {
            let file_name = workbook
                .file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "unknown".to_string());

            folder_pb.set_message(format!("Processing: {}", file_name));

            match self.run_with_progress(workbook.clone(), None, &multi_progress).await {
                Ok(outcome) => {
                    debug!("{}:\n{}", file_name, outcome.report);
                    summary.succeeded += 1;
                }
                Err(e) => {
                    error!("Error processing file {} ({:?}): {}", file_name, e.kind(), e);
                    summary.failed += 1;
                }
            }

            folder_pb.inc(1);
        }

        folder_pb.finish_with_message("Folder processing complete");

        let duration = start_time.elapsed();
        info!(
            "Folder processing completed: {} translated, {} failed ({})",
            summary.succeeded,
            summary.failed,
            Self::format_duration(duration)
        );

        if summary.failed > 0 {
            warn!("{} workbook(s) were not translated", summary.failed);
            return Err(anyhow!(
                "{} of {} workbook(s) failed to translate",
                summary.failed,
                workbooks.len()
            ));
        }

        Ok(summary)
    }
}

fn file_error(error: anyhow::Error) -> AppError {
    AppError::File(format!("{:#}", error))
}
