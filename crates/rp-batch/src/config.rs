use std::fs;
use std::path::{Path, PathBuf};

use rowpipe::{BorderPolicy, Dispatch, Filter, LumaWeights, PlanMode, StagePlan};
use serde::{Deserialize, Serialize};

use crate::error::BatchError;

/// Settings for one batch run. Missing JSON fields take the defaults below.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Directory scanned for input images.
    pub input: PathBuf,
    /// Directory receiving `<stage>_<filename>` outputs; created if absent.
    pub output: PathBuf,
    pub workers: usize,
    pub dispatch: Dispatch,
    pub mode: PlanMode,
    /// JPEG quality, 1..=100.
    pub quality: u8,
    pub brightness: i16,
    pub luma: LumaWeights,
    pub border: BorderPolicy,
    pub recursive: bool,
    /// Encode every stage's output. Disabled for timing-only runs.
    pub write_outputs: bool,
    /// Accepted file extensions, matched case-insensitively.
    pub extensions: Vec<String>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("images"),
            output: PathBuf::from("output"),
            workers: num_cpus::get(),
            dispatch: Dispatch::Pooled,
            mode: PlanMode::Chain,
            quality: 100,
            brightness: Filter::DEFAULT_BRIGHTNESS,
            luma: LumaWeights::Rec601,
            border: BorderPolicy::CopyThrough,
            recursive: false,
            write_outputs: true,
            extensions: vec!["jpg".into(), "jpeg".into(), "png".into()],
        }
    }
}

impl BatchConfig {
    pub fn validate(&self) -> Result<(), BatchError> {
        if self.workers == 0 {
            return Err(BatchError::Config("workers must be at least 1".into()));
        }
        if !(1..=100).contains(&self.quality) {
            return Err(BatchError::Config(format!(
                "quality must be in 1..=100, got {}",
                self.quality
            )));
        }
        if self.extensions.is_empty() {
            return Err(BatchError::Config("no image extensions configured".into()));
        }
        Ok(())
    }

    /// The five standard filters wired according to `mode`.
    pub fn plan(&self) -> Result<StagePlan, BatchError> {
        let filters = Filter::standard_chain(self.luma, self.border, self.brightness);
        Ok(StagePlan::from_mode(self.mode, filters)?)
    }
}

pub fn load_config(path: &Path) -> Result<BatchConfig, BatchError> {
    let contents = fs::read_to_string(path)
        .map_err(|e| BatchError::io(format!("failed to read config {}", path.display()), e))?;
    serde_json::from_str(&contents)
        .map_err(|e| BatchError::Config(format!("failed to parse {}: {e}", path.display())))
}
