use anyhow::{Result, Context, anyhow};
use log::{error, warn, info, debug};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use indicatif::{ProgressBar, ProgressStyle};
use parking_lot::RwLock;

use crate::app_config::Config;
use crate::archive::EntryNamer;
use crate::conversion::{self, BulkConverter, BulkOutput, DictionaryCache, DictionaryHandle, InputFile, ConversionOptions};
use crate::errors::{ConvertError, FileFailure, ParseWarning};
use crate::fetch::{self, DictionarySource, HttpFetcher};
use crate::file_utils::FileManager;

// @module: Application controller for subtitle conversion

/// Name of the report written next to outputs when something went wrong
pub const ISSUES_LOG_NAME: &str = "ass2srt.issues.log";

/// A unit of work the host can request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    /// Convert one script to `<stem>.srt`, beside it or inside `output_dir`
    AddFile {
        path: PathBuf,
        output_dir: Option<PathBuf>,
        /// File name to write instead of `<stem>.srt`
        output_name: Option<String>,
    },
    /// Convert several scripts into one ZIP archive
    AddFiles {
        paths: Vec<PathBuf>,
        archive_path: PathBuf,
    },
    /// Fetch and parse a dictionary for later conversions
    PreloadDictionary {
        source: DictionarySource,
    },
}

/// What a finished task produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    /// An SRT file was written
    Written {
        path: PathBuf,
        cue_count: usize,
        warning_count: usize,
    },
    /// The output already existed and overwriting was not requested
    Skipped {
        path: PathBuf,
    },
    /// An archive was written
    Archived {
        path: PathBuf,
        entry_count: usize,
        failure_count: usize,
    },
    /// A dictionary is ready for use
    DictionaryLoaded {
        entries: usize,
    },
}

/// Single line of the issues log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Level name (WARN or ERROR)
    pub level: String,
    /// Message text
    pub message: String,
}

impl LogEntry {
    fn warning(source: &str, warning: &ParseWarning) -> Self {
        Self {
            level: "WARN".to_string(),
            message: format!("{}: {}", source, warning),
        }
    }

    fn failure(failure: &FileFailure) -> Self {
        Self {
            level: "ERROR".to_string(),
            message: failure.to_string(),
        }
    }

    fn error(source: &Path, error: &anyhow::Error) -> Self {
        Self {
            level: "ERROR".to_string(),
            message: format!("{}: {:#}", source.display(), error),
        }
    }
}

/// Main application controller for subtitle conversion
pub struct Controller {
    // @field: App configuration
    config: Config,

    // @field: Replace existing outputs
    force_overwrite: bool,

    // @field: Dictionary used by conversions, once loaded
    dictionary: RwLock<Option<DictionaryHandle>>,

    // @field: Parsed dictionaries by content
    dictionary_cache: DictionaryCache,

    // @field: Downloader for remote dictionaries
    http: HttpFetcher,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;

        let mut http = HttpFetcher::new(config.dictionary.timeout_secs);
        if config.dictionary.cache_downloads {
            http = http.with_cache_dir(HttpFetcher::default_cache_dir());
        }

        Ok(Self {
            config,
            force_overwrite: false,
            dictionary: RwLock::new(None),
            dictionary_cache: DictionaryCache::new(true),
            http,
        })
    }

    /// Replace existing output files instead of skipping them
    pub fn set_force_overwrite(&mut self, force_overwrite: bool) {
        self.force_overwrite = force_overwrite;
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Currently loaded dictionary, if any
    pub fn dictionary(&self) -> Option<DictionaryHandle> {
        self.dictionary.read().clone()
    }

    /// Dictionary cache statistics as (hits, misses, hit rate)
    pub fn dictionary_cache_stats(&self) -> (usize, usize, f64) {
        self.dictionary_cache.stats()
    }

    /// Run one task
    pub async fn dispatch(&self, task: Task) -> Result<TaskOutcome> {
        match task {
            Task::AddFile { path, output_dir, output_name } => {
                let (outcome, logs) = self.add_file(&path, output_dir.as_deref(), output_name.as_deref()).await?;
                if let TaskOutcome::Written { path: output_path, .. } = &outcome {
                    self.report_issues(&logs, output_path.parent().unwrap_or(Path::new(".")));
                }
                Ok(outcome)
            }
            Task::AddFiles { paths, archive_path } => self.add_files(&paths, &archive_path).await,
            Task::PreloadDictionary { source } => self.preload_dictionary(&source).await,
        }
    }

    /// Fetch and parse a dictionary, making it the active one
    async fn preload_dictionary(&self, source: &DictionarySource) -> Result<TaskOutcome> {
        let start_time = Instant::now();
        let text = fetch::fetch_dictionary(source, &self.http)
            .await
            .with_context(|| format!("Failed to fetch dictionary from {}", source))?;

        let format = self.config.dictionary.format()?;
        let dictionary = self
            .dictionary_cache
            .get_or_parse(&text, &format)
            .map_err(ConvertError::from)
            .with_context(|| format!("Failed to load dictionary from {}", source))?;

        let entries = dictionary.len();
        *self.dictionary.write() = Some(dictionary);
        info!("Dictionary loaded: {} entries from {} in {}", entries, source, Self::format_duration(start_time.elapsed()));

        Ok(TaskOutcome::DictionaryLoaded { entries })
    }

    /// Load the configured dictionary if none is active yet
    async fn ensure_dictionary(&self) -> Result<()> {
        if self.dictionary.read().is_some() {
            return Ok(());
        }
        let Some(source) = self.config.dictionary.source.as_deref().filter(|s| !s.trim().is_empty()) else {
            return Ok(());
        };

        let source = DictionarySource::parse(source)?;
        self.preload_dictionary(&source).await?;
        Ok(())
    }

    /// Engine options for the next conversion
    fn conversion_options(&self) -> ConversionOptions {
        let mut options = self.config.conversion_options();
        options.dictionary = self.dictionary();
        options
    }

    /// Convert one file, returning what happened and the warnings to report
    async fn add_file(
        &self,
        input_file: &Path,
        output_dir: Option<&Path>,
        output_name: Option<&str>,
    ) -> Result<(TaskOutcome, Vec<LogEntry>)> {
        if !FileManager::file_exists(input_file) {
            return Err(anyhow!("Input file does not exist: {:?}", input_file));
        }

        let output_path = match output_name {
            Some(name) => FileManager::output_dir_for(input_file, output_dir).join(name),
            None => FileManager::generate_output_path(input_file, output_dir),
        };
        if output_path.exists() && !self.force_overwrite {
            warn!("Skipping {:?}, output already exists (use -f to force overwrite)", output_path);
            return Ok((TaskOutcome::Skipped { path: output_path }, Vec::new()));
        }

        self.ensure_dictionary().await?;
        let options = self.conversion_options();

        let bytes = FileManager::read_bytes(input_file)?;
        let output = conversion::convert(&bytes, &options)
            .with_context(|| format!("Failed to convert {}", input_file.display()))?;

        FileManager::write_bytes(&output_path, &output.bytes)?;

        let source = input_file.display().to_string();
        let logs: Vec<LogEntry> = output.warnings.iter().map(|w| LogEntry::warning(&source, w)).collect();

        info!("Success: {} ({} cues)", output_path.display(), output.cue_count);
        let outcome = TaskOutcome::Written {
            path: output_path,
            cue_count: output.cue_count,
            warning_count: output.warnings.len(),
        };
        Ok((outcome, logs))
    }

    async fn add_files(&self, paths: &[PathBuf], archive_path: &Path) -> Result<TaskOutcome> {
        let start_time = Instant::now();

        if archive_path.exists() && !self.force_overwrite {
            warn!("Skipping {:?}, archive already exists (use -f to force overwrite)", archive_path);
            return Ok(TaskOutcome::Skipped { path: archive_path.to_path_buf() });
        }

        let scripts = FileManager::collect_inputs(paths)?;
        if scripts.is_empty() {
            return Err(anyhow!("No .ass or .ssa files found"));
        }

        self.ensure_dictionary().await?;
        let options = self.conversion_options();

        let mut files = Vec::with_capacity(scripts.len());
        for script in &scripts {
            files.push(InputFile::new(script.display().to_string(), FileManager::read_bytes(script)?));
        }

        let progress_bar = Self::file_progress_bar(files.len() as u64, "Converting");
        let pb = progress_bar.clone();

        let converter = BulkConverter::new(self.config.bulk.concurrent_jobs);
        debug!("Converting {} files with {} concurrent jobs", files.len(), converter.concurrent_jobs());
        let result = converter
            .convert_all(files, &options, move |completed, _total| {
                pb.set_position(completed as u64);
            })
            .await;
        progress_bar.finish_and_clear();

        let report_dir = archive_path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
        let output = match result {
            Ok(output) => output,
            Err(ConvertError::AllFilesFailed(failures)) => {
                let logs: Vec<LogEntry> = failures.iter().map(LogEntry::failure).collect();
                for failure in &failures {
                    error!("{}", failure);
                }
                self.report_issues(&logs, report_dir);
                return Err(anyhow!("All {} files failed to convert", failures.len()));
            }
            Err(e) => return Err(e.into()),
        };

        FileManager::write_bytes(archive_path, &output.archive)?;
        self.report_issues(&Self::bulk_issues(&output), report_dir);

        info!(
            "Success: {} ({} files, {} failed) in {}",
            archive_path.display(),
            output.entries.len(),
            output.failures.len(),
            Self::format_duration(start_time.elapsed())
        );

        Ok(TaskOutcome::Archived {
            path: archive_path.to_path_buf(),
            entry_count: output.entries.len(),
            failure_count: output.failures.len(),
        })
    }

    /// Convert each file to its own SRT, continuing past failures.
    ///
    /// Inputs that would land on the same output name in one directory get
    /// suffixed names (`a.srt`, `a_1.srt`) in input order. Warnings and
    /// failures of the whole run go into one issues log per output directory.
    ///
    /// Returns the number of files written.
    pub async fn convert_each(&self, paths: &[PathBuf], output_dir: Option<&Path>) -> Result<usize> {
        let start_time = Instant::now();
        let scripts = FileManager::collect_inputs(paths)?;
        if scripts.is_empty() {
            return Err(anyhow!("No .ass or .ssa files found"));
        }

        // Load once up front so a bad dictionary fails the run, not every file
        self.ensure_dictionary().await?;

        let folder_pb = Self::file_progress_bar(scripts.len() as u64, "Files");
        let mut namers: HashMap<PathBuf, EntryNamer> = HashMap::new();
        let mut issues: BTreeMap<PathBuf, Vec<LogEntry>> = BTreeMap::new();
        let mut written = 0;
        let mut failed = 0;

        for script in &scripts {
            let file_name = script.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
            folder_pb.set_message(file_name.clone());

            let target_dir = FileManager::output_dir_for(script, output_dir);
            let output_name = namers.entry(target_dir.clone()).or_default().assign(&file_name);

            match self.add_file(script, output_dir, Some(&output_name)).await {
                Ok((outcome, logs)) => {
                    if matches!(outcome, TaskOutcome::Written { .. }) {
                        written += 1;
                    }
                    if !logs.is_empty() {
                        issues.entry(target_dir).or_default().extend(logs);
                    }
                }
                Err(e) => {
                    failed += 1;
                    folder_pb.suspend(|| error!("{:#}", e));
                    issues.entry(target_dir).or_default().push(LogEntry::error(script, &e));
                }
            }
            folder_pb.inc(1);
        }
        folder_pb.finish_and_clear();

        for (dir, logs) in &issues {
            let dir = if dir.as_os_str().is_empty() { Path::new(".") } else { dir.as_path() };
            self.report_issues(logs, dir);
        }

        if failed > 0 && written == 0 {
            return Err(anyhow!("All {} files failed to convert", failed));
        }

        info!("Finished: {} converted, {} failed in {}", written, failed, Self::format_duration(start_time.elapsed()));
        Ok(written)
    }

    /// Warnings and failures of a bulk job, in input order
    fn bulk_issues(output: &BulkOutput) -> Vec<LogEntry> {
        let mut logs = Vec::new();
        for entry in &output.entries {
            logs.extend(entry.warnings.iter().map(|w| LogEntry::warning(&entry.source_name, w)));
        }
        logs.extend(output.failures.iter().map(LogEntry::failure));
        logs
    }

    /// Write the issues log into `dir` when there is anything to report
    fn report_issues(&self, logs: &[LogEntry], dir: &Path) {
        if logs.is_empty() {
            return;
        }

        let log_file_path = dir.join(ISSUES_LOG_NAME);
        let context = format!("ass2srt {}", env!("CARGO_PKG_VERSION"));
        if let Err(e) = Self::write_logs_to_file(logs, &log_file_path, &context) {
            warn!("Failed to write logs to file: {}", e);
        } else {
            info!("{} issues written to {}", logs.len(), log_file_path.display());
        }
    }

    /// Write conversion logs to a log file
    pub fn write_logs_to_file(logs: &[LogEntry], file_path: &Path, context: &str) -> Result<()> {
        let mut log_content = String::new();

        // Add header
        log_content.push_str(&format!("Conversion Log - {}\n", chrono::Local::now().format("%Y-%m-%d %H:%M:%S")));
        log_content.push_str(&format!("Context: {}\n\n", context));

        for entry in logs {
            log_content.push_str(&format!("[{}] {}\n", entry.level, entry.message));
        }

        FileManager::write_bytes(file_path, log_content.as_bytes())
    }

    fn file_progress_bar(len: u64, message: &str) -> ProgressBar {
        let progress_bar = ProgressBar::new(len);
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(template_result.progress_chars("█▓▒░"));
        progress_bar.set_message(message.to_string());
        progress_bar
    }

    // Format duration in a human-readable format
    fn format_duration(duration: Duration) -> String {
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
}
