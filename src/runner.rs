use crate::config::Config;
use crate::discovery;
use crate::processor::{self, ProcessOptions};
use crate::stats::AggregateStats;
use anyhow::Result;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Debug, Clone, Serialize)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub root: PathBuf,
    pub dry_run: bool,
    pub block_kind: String,
    pub files_found: usize,
    #[serde(flatten)]
    pub stats: AggregateStats,
    pub failures: Vec<FileFailure>,
}

/// Processes every candidate file under `root`.
///
/// Only problems with the root itself fail the run; per-file failures are
/// collected into the summary and the batch carries on.
pub fn run(root: &Path, config: &Config) -> Result<RunSummary> {
    let started = Instant::now();
    let options = ProcessOptions::from(config);

    let files = discovery::find_files(root, &config.discovery)?;
    tracing::debug!("Found {} candidate files under {:?}", files.len(), root);

    let mut stats = AggregateStats::default();
    let mut failures = Vec::new();

    for file in &files {
        tracing::info!("Processing: {}", file.display());

        match processor::process_file(file, &options) {
            Ok(result) => {
                if result.modified {
                    tracing::debug!(
                        "{}: {} '{}' blocks removed",
                        file.display(),
                        result.blocks_removed,
                        options.block_kind
                    );
                }
                stats.record(&result);
            }
            Err(err) => {
                tracing::debug!("Failed to process {}: {}", file.display(), err);
                stats.record_failure();
                failures.push(FileFailure {
                    path: err.path().to_path_buf(),
                    error: err.to_string(),
                });
            }
        }
    }

    stats.elapsed = started.elapsed();

    Ok(RunSummary {
        root: root.to_path_buf(),
        dry_run: options.dry_run,
        block_kind: options.block_kind,
        files_found: files.len(),
        stats,
        failures,
    })
}
