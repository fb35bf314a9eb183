use anyhow::{Result, Context, anyhow};
use chrono::{DateTime, Local};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use walkdir::WalkDir;

// @module: File and directory utilities

/// Extension of Tableau workbooks
pub const WORKBOOK_EXTENSION: &str = "twb";

/// Marker placed between stem and timestamp in backup names
const BACKUP_MARKER: &str = "_backup_";

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.as_os_str().is_empty() && !path.exists() {
            fs::create_dir_all(path)?;
        }
        Ok(())
    }

    // @generates: Output path for a translated workbook, next to the input
    // @params: input_file, language_code (e.g. "EN")
    // @returns: <dir>/<stem>_<CODE>.<ext>
    pub fn generate_output_path<P: AsRef<Path>>(input_file: P, language_code: &str) -> PathBuf {
        let input_file = input_file.as_ref();
        let stem = input_file.file_stem().unwrap_or_default().to_string_lossy();

        let mut output_filename = format!("{}_{}", stem, language_code);
        if let Some(ext) = input_file.extension() {
            output_filename.push('.');
            output_filename.push_str(&ext.to_string_lossy());
        }

        input_file.with_file_name(output_filename)
    }

    // @generates: Backup path for the input at a given time
    // @returns: <dir>/<stem>_backup_<YYYYmmdd_HHMMSS>.<ext>
    pub fn generate_backup_path<P: AsRef<Path>>(input_file: P, time: DateTime<Local>) -> PathBuf {
        let input_file = input_file.as_ref();
        let stem = input_file.file_stem().unwrap_or_default().to_string_lossy();

        let mut backup_filename = format!("{}{}{}", stem, BACKUP_MARKER, time.format("%Y%m%d_%H%M%S"));
        if let Some(ext) = input_file.extension() {
            backup_filename.push('.');
            backup_filename.push_str(&ext.to_string_lossy());
        }

        input_file.with_file_name(backup_filename)
    }

    /// Copy the input to a timestamped backup next to it, never replacing an existing file
    pub fn create_backup<P: AsRef<Path>>(input_file: P) -> Result<PathBuf> {
        let input_file = input_file.as_ref();
        let base = Self::generate_backup_path(input_file, Local::now());

        let mut backup = base.clone();
        let mut counter = 1;
        while backup.exists() {
            let stem = base.file_stem().unwrap_or_default().to_string_lossy();
            let name = match base.extension() {
                Some(ext) => format!("{}_{}.{}", stem, counter, ext.to_string_lossy()),
                None => format!("{}_{}", stem, counter),
            };
            backup = base.with_file_name(name);
            counter += 1;
        }

        Self::copy_file(input_file, &backup)?;
        Ok(backup)
    }

    /// Whether the file name looks like a backup made by this tool
    pub fn is_backup<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref()
            .file_stem()
            .is_some_and(|stem| stem.to_string_lossy().contains(BACKUP_MARKER))
    }

    /// Whether the file name looks like an output for `language_code`
    pub fn is_output_for<P: AsRef<Path>>(path: P, language_code: &str) -> bool {
        let suffix = format!("_{}", language_code);
        path.as_ref()
            .file_stem()
            .is_some_and(|stem| stem.to_string_lossy().ends_with(&suffix))
    }

    /// Find workbooks below `dir`, skipping backups and outputs for `language_code`
    pub fn find_workbooks<P: AsRef<Path>>(dir: P, language_code: &str) -> Result<Vec<PathBuf>> {
        let mut result: Vec<PathBuf> = Self::find_files(dir, WORKBOOK_EXTENSION)?
            .into_iter()
            .filter(|path| !Self::is_backup(path) && !Self::is_output_for(path, language_code))
            .collect();
        result.sort();
        Ok(result)
    }

    /// Find files with a specific extension in a directory
    pub fn find_files<P: AsRef<Path>>(dir: P, extension: &str) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();
        let normalized_ext = extension.trim_start_matches('.');

        for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.is_file() {
                if let Some(ext) = path.extension() {
                    if ext.to_string_lossy().eq_ignore_ascii_case(normalized_ext) {
                        result.push(path.to_path_buf());
                    }
                }
            }
        }

        Ok(result)
    }

    /// Read a file to bytes
    pub fn read_bytes<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
        fs::read(&path).with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write bytes to a file.
    ///
    /// The content goes to a temporary file in the target directory that then
    /// replaces `path`, so a failed write never leaves a partial file behind.
    pub fn write_bytes<P: AsRef<Path>>(path: P, content: &[u8]) -> Result<()> {
        let path = path.as_ref();
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        Self::ensure_dir(parent)?;

        let mut temp = NamedTempFile::new_in(parent)
            .with_context(|| format!("Failed to create a temporary file in {:?}", parent))?;
        temp.write_all(content)
            .and_then(|_| temp.as_file().sync_all())
            .with_context(|| format!("Failed to write to file: {:?}", path))?;
        temp.persist(path)
            .map_err(|e| anyhow!("Failed to move output into place at {:?}: {}", path, e.error))?;

        Ok(())
    }

    /// Copy a file from one location to another, ensuring the target directory exists
    pub fn copy_file<P1: AsRef<Path>, P2: AsRef<Path>>(from: P1, to: P2) -> Result<()> {
        let from = from.as_ref();
        let to = to.as_ref();

        if !from.exists() {
            return Err(anyhow!("Source file does not exist: {:?}", from));
        }

        // Ensure the target directory exists
        if let Some(parent) = to.parent() {
            Self::ensure_dir(parent)?;
        }

        fs::copy(from, to).with_context(|| format!("Failed to copy {:?} to {:?}", from, to))?;

        Ok(())
    }
}
