use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use log::{debug, info, warn};
use rowpipe::{Dispatch, PipelineConfig, PipelineRunner};
use serde::Serialize;

use crate::codec::{decode, encode, probe_dimensions};
use crate::config::BatchConfig;
use crate::discover::discover_images;
use crate::error::BatchError;

/// Progress notifications emitted while a batch runs.
#[derive(Debug)]
pub enum ImageEvent<'a> {
    Started { path: &'a Path },
    Finished { path: &'a Path, stages: usize },
    Skipped { path: &'a Path, error: &'a BatchError },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    pub processed: usize,
    pub skipped: usize,
    pub workers: usize,
    pub dispatch: Dispatch,
    /// Wall time of the whole batch including decode and encode.
    pub elapsed_secs: f64,
}

/// One worker count of a [`sweep`], timed with both dispatch strategies.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepRow {
    pub workers: usize,
    pub pooled: BatchSummary,
    pub spawned: BatchSummary,
}

/// Runs every image under `config.input` through the pipeline.
///
/// Images that fail to decode, do not fit the scratch buffers or cannot be
/// written are reported through `on_event` and skipped. Configuration,
/// discovery and allocation failures abort the batch.
pub fn run_batch<F>(config: &BatchConfig, mut on_event: F) -> Result<BatchSummary, BatchError>
where
    F: FnMut(ImageEvent<'_>),
{
    config.validate()?;
    let plan = config.plan()?;
    let paths = discover_images(&config.input, &config.extensions, config.recursive)?;
    info!(
        "batch: {} image(s) in {} workers={} dispatch={:?} mode={:?}",
        paths.len(),
        config.input.display(),
        config.workers,
        config.dispatch,
        config.mode
    );

    if config.write_outputs {
        fs::create_dir_all(&config.output).map_err(|e| {
            BatchError::io(format!("failed to create {}", config.output.display()), e)
        })?;
    }

    let capacity = scratch_capacity(&paths);
    debug!("scratch capacity: {capacity} bytes per buffer");
    let mut runner = PipelineRunner::new(PipelineConfig {
        workers: config.workers,
        dispatch: config.dispatch,
        capacity,
        plan,
    })?;

    let t0 = Instant::now();
    let mut processed = 0;
    let mut skipped = 0;
    for path in &paths {
        on_event(ImageEvent::Started { path });
        match process_image(&mut runner, path, config) {
            Ok(()) => {
                processed += 1;
                on_event(ImageEvent::Finished {
                    path,
                    stages: runner.plan().len(),
                });
            }
            Err(error) if error.is_per_image() => {
                warn!("skipping {}: {error}", path.display());
                skipped += 1;
                on_event(ImageEvent::Skipped {
                    path,
                    error: &error,
                });
            }
            Err(error) => return Err(error),
        }
    }

    let summary = BatchSummary {
        processed,
        skipped,
        workers: config.workers,
        dispatch: config.dispatch,
        elapsed_secs: t0.elapsed().as_secs_f64(),
    };
    info!(
        "batch done: processed={} skipped={} in {:.3} s",
        summary.processed, summary.skipped, summary.elapsed_secs
    );
    Ok(summary)
}

/// Bytes per scratch buffer: the largest probed image at 4 channels.
fn scratch_capacity(paths: &[PathBuf]) -> usize {
    paths
        .iter()
        .filter_map(|path| match probe_dimensions(path) {
            Ok((w, h)) => PipelineConfig::capacity_for(w, h, 4).ok(),
            Err(e) => {
                debug!("probe failed: {e}");
                None
            }
        })
        .max()
        .unwrap_or(4)
}

fn process_image(
    runner: &mut PipelineRunner,
    path: &Path,
    config: &BatchConfig,
) -> Result<(), BatchError> {
    let image = decode(path)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut write_error = None;
    runner.process_observed(&image.as_view(), |stage, view| {
        if !config.write_outputs || write_error.is_some() {
            return;
        }
        let out = config
            .output
            .join(format!("{}_{name}", stage.filter.name()));
        if let Err(e) = encode(&out, view, config.quality) {
            write_error = Some(e);
        }
    })?;

    match write_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Runs the batch once per worker count with each dispatch strategy.
pub fn sweep(config: &BatchConfig, worker_counts: &[usize]) -> Result<Vec<SweepRow>, BatchError> {
    let mut rows = Vec::with_capacity(worker_counts.len());
    for &workers in worker_counts {
        let run = |dispatch| {
            let cfg = BatchConfig {
                workers,
                dispatch,
                ..config.clone()
            };
            run_batch(&cfg, |_| {})
        };
        rows.push(SweepRow {
            workers,
            pooled: run(Dispatch::Pooled)?,
            spawned: run(Dispatch::Spawned)?,
        });
    }
    Ok(rows)
}

pub fn render_sweep_table(rows: &[SweepRow]) -> String {
    let rule = "+----------+-----------------+-----------------+";
    let mut out = String::new();
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "| {:<8} | {:<15} | {:<15} |", "Workers", "Pooled Time", "Spawned Time");
    let _ = writeln!(out, "{rule}");
    for row in rows {
        let _ = writeln!(
            out,
            "| {:<8} | {:<15} | {:<15} |",
            row.workers,
            format!("{:.4} s", row.pooled.elapsed_secs),
            format!("{:.4} s", row.spawned.elapsed_secs)
        );
    }
    let _ = writeln!(out, "{rule}");
    out
}

/// Pretty-prints `value` as JSON to `path`, creating parent directories.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), BatchError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| BatchError::io(format!("failed to create {}", parent.display()), e))?;
    }
    let json = serde_json::to_string_pretty(value)
        .map_err(|source| BatchError::Json {
            path: path.to_path_buf(),
            source,
        })?;
    fs::write(path, json)
        .map_err(|e| BatchError::io(format!("failed to write {}", path.display()), e))
}
