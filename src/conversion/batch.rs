/*!
 * Parallel bulk conversion.
 *
 * Files are converted independently on tokio's blocking pool with a bound on
 * how many run at once. Results are put back into input order before they
 * reach the archiver, so completion order never shows in the output.
 */

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;
use futures::stream::{self, StreamExt};
use log::{debug, error};

use crate::errors::ConvertError;

use super::{BulkOutput, ConversionOptions, ConversionOutput, InputFile, assemble_archive, convert};

/// Bulk converter running files concurrently
pub struct BulkConverter {
    /// Maximum number of files converted at once
    concurrent_jobs: usize,
}

impl BulkConverter {
    /// Create a new bulk converter; zero is treated as one
    pub fn new(concurrent_jobs: usize) -> Self {
        Self {
            concurrent_jobs: concurrent_jobs.max(1),
        }
    }

    pub fn concurrent_jobs(&self) -> usize {
        self.concurrent_jobs
    }

    /// Convert all files and pack the successes into an archive.
    ///
    /// `progress_callback` receives (files done, total files) after each file.
    pub async fn convert_all(
        &self,
        files: Vec<InputFile>,
        options: &ConversionOptions,
        progress_callback: impl Fn(usize, usize) + Clone + Send + 'static,
    ) -> Result<BulkOutput, ConvertError> {
        if files.is_empty() {
            return Err(ConvertError::InvalidRequest("no input files".to_string()));
        }

        let total_files = files.len();
        let processed_files = Arc::new(AtomicUsize::new(0));
        let start_time = Instant::now();

        let mut results = stream::iter(files.into_iter().enumerate())
            .map(|(file_index, file)| {
                let options = options.clone();
                let processed_files = processed_files.clone();
                let progress_callback = progress_callback.clone();

                async move {
                    let InputFile { name, bytes } = file;
                    let task_name = name.clone();
                    let result = tokio::task::spawn_blocking(move || convert(&bytes, &options))
                        .await
                        .unwrap_or_else(|join_error| {
                            error!("Conversion task for {} aborted: {}", task_name, join_error);
                            Err(ConvertError::InvalidRequest(format!("conversion task aborted: {}", join_error)))
                        });

                    // Update progress
                    let current = processed_files.fetch_add(1, Ordering::SeqCst) + 1;
                    progress_callback(current, total_files);

                    (file_index, name, result)
                }
            })
            .buffer_unordered(self.concurrent_jobs)
            .collect::<Vec<_>>()
            .await;

        // Sort results by file index to maintain input order
        results.sort_by_key(|(idx, _, _)| *idx);
        debug!("Converted {} files in {:?}", total_files, start_time.elapsed());

        let ordered: Vec<(String, Result<ConversionOutput, ConvertError>)> = results
            .into_iter()
            .map(|(_, name, result)| (name, result))
            .collect();

        assemble_archive(ordered)
    }
}

impl Default for BulkConverter {
    fn default() -> Self {
        Self::new(4)
    }
}
