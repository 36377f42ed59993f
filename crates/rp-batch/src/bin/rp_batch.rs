//! Batch image processor.
//!
//!   rp_batch run --input images --output output --workers 8
//!   rp_batch sweep --workers 1,2,4,8 --no-write
//!
//! Settings come from `--config <json>` when given, then individual flags
//! override them. Log verbosity follows `RUST_LOG` (default `info`).

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use rowpipe::{BorderPolicy, Dispatch, LumaWeights, PlanMode};
use rp_batch::{
    BatchConfig, BatchSummary, ImageEvent, load_config, render_sweep_table, run_batch, sweep,
    write_json,
};

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(about = "Run a directory of images through the row-parallel filter pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Process every image once
    Run {
        #[command(flatten)]
        common: CommonArgs,

        /// Worker threads per filter stage (default: number of CPUs)
        #[arg(long)]
        workers: Option<usize>,

        /// pooled | spawned
        #[arg(long)]
        dispatch: Option<Dispatch>,
    },
    /// Time the batch for several worker counts with both dispatch strategies
    Sweep {
        #[command(flatten)]
        common: CommonArgs,

        /// Comma-separated worker counts
        #[arg(long, value_delimiter = ',', default_value = "1,2,4,8")]
        workers: Vec<usize>,
    },
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// JSON settings file; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Input directory
    #[arg(long)]
    input: Option<PathBuf>,

    /// Output directory, created if absent
    #[arg(long)]
    output: Option<PathBuf>,

    /// chain | fan_out
    #[arg(long)]
    mode: Option<PlanMode>,

    /// untouched | copy_through | clamp | reflect101
    #[arg(long)]
    border: Option<BorderPolicy>,

    /// rec601 | rec709
    #[arg(long)]
    luma: Option<LumaWeights>,

    /// Brightness offset of the last stage
    #[arg(long, allow_hyphen_values = true)]
    brightness: Option<i16>,

    /// JPEG quality (1-100)
    #[arg(long)]
    quality: Option<u8>,

    /// Descend into subdirectories
    #[arg(long)]
    recursive: bool,

    /// Skip encoding stage outputs
    #[arg(long)]
    no_write: bool,

    /// Write the run summary as JSON to this path
    #[arg(long)]
    summary: Option<PathBuf>,
}

impl CommonArgs {
    fn resolve(&self) -> Result<BatchConfig> {
        let mut cfg = match &self.config {
            Some(path) => load_config(path)?,
            None => BatchConfig::default(),
        };

        if let Some(v) = &self.input {
            cfg.input = v.clone();
        }
        if let Some(v) = &self.output {
            cfg.output = v.clone();
        }
        if let Some(v) = self.mode {
            cfg.mode = v;
        }
        if let Some(v) = self.border {
            cfg.border = v;
        }
        if let Some(v) = self.luma {
            cfg.luma = v;
        }
        if let Some(v) = self.brightness {
            cfg.brightness = v;
        }
        if let Some(v) = self.quality {
            cfg.quality = v;
        }
        cfg.recursive |= self.recursive;
        if self.no_write {
            cfg.write_outputs = false;
        }
        Ok(cfg)
    }
}

// ── Main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match Cli::parse().command {
        Command::Run {
            common,
            workers,
            dispatch,
        } => {
            let mut cfg = common.resolve()?;
            if let Some(v) = workers {
                cfg.workers = v;
            }
            if let Some(v) = dispatch {
                cfg.dispatch = v;
            }
            run(&cfg, common.summary.as_deref())
        }
        Command::Sweep { common, workers } => {
            let cfg = common.resolve()?;
            run_sweep(&cfg, &workers, common.summary.as_deref())
        }
    }
}

fn run(cfg: &BatchConfig, summary_path: Option<&Path>) -> Result<()> {
    let banner = "===========================================";
    println!("{banner}");
    println!(
        "   STARTING BATCH PROCESSOR ({} Workers, {:?})",
        cfg.workers, cfg.dispatch
    );
    println!("{banner}");

    let summary = run_batch(cfg, report_progress)
        .with_context(|| format!("batch over {}", cfg.input.display()))?;

    println!("\n{banner}");
    println!("   COMPLETED!");
    print_summary(&summary);
    println!("{banner}");

    if let Some(path) = summary_path {
        write_json(path, &summary).context("writing summary")?;
    }
    Ok(())
}

fn run_sweep(cfg: &BatchConfig, workers: &[usize], summary_path: Option<&Path>) -> Result<()> {
    anyhow::ensure!(!workers.is_empty(), "--workers needs at least one count");

    let rows = sweep(cfg, workers).with_context(|| format!("sweep over {}", cfg.input.display()))?;
    for row in &rows {
        println!("\n>>>> RUNNING WITH {} WORKER(S) <<<<", row.workers);
        for summary in [&row.pooled, &row.spawned] {
            println!("{:?}:", summary.dispatch);
            println!("  - Images Processed: {}", summary.processed);
            println!("  - Total Time      : {:.4} seconds", summary.elapsed_secs);
        }
    }

    println!("\n          FINAL PERFORMANCE SUMMARY");
    print!("{}", render_sweep_table(&rows));

    if let Some(path) = summary_path {
        write_json(path, &rows).context("writing sweep summary")?;
    }
    Ok(())
}

fn report_progress(event: ImageEvent<'_>) {
    match event {
        ImageEvent::Started { path } => {
            let name = path.file_name().unwrap_or(path.as_os_str());
            print!("Processing: {} ... ", name.to_string_lossy());
            let _ = std::io::stdout().flush();
        }
        ImageEvent::Finished { stages, .. } => println!("Done ({stages} filters saved)."),
        ImageEvent::Skipped { error, .. } => println!("Failed: {error}"),
    }
}

fn print_summary(summary: &BatchSummary) {
    println!("   Images Processed: {}", summary.processed);
    println!("   Images Skipped:   {}", summary.skipped);
    println!("   Threads Used:     {}", summary.workers);
    println!("   TOTAL TIME:       {:.4} seconds", summary.elapsed_secs);
}
