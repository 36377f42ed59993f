use core::str::FromStr;

use rp_core::Error;
use rp_filter::{BorderPolicy, Filter, LumaWeights};
use serde::{Deserialize, Serialize};

/// Buffer role of a stage input or output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// The caller's image; read-only.
    Source,
    A,
    B,
}

impl Slot {
    fn other(self) -> Slot {
        match self {
            Slot::A => Slot::B,
            Slot::B | Slot::Source => Slot::A,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stage {
    pub filter: Filter,
    pub input: Slot,
    pub output: Slot,
}

/// How [`StagePlan::from_mode`] wires filters to buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanMode {
    /// Each filter reads the previous filter's output.
    #[default]
    Chain,
    /// Each filter reads the source image.
    FanOut,
}

impl FromStr for PlanMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "chain" => Ok(Self::Chain),
            "fan_out" | "fanout" => Ok(Self::FanOut),
            other => Err(format!("unknown plan mode '{other}', expected chain|fan_out")),
        }
    }
}

/// Validated sequence of stages over the `Source`, `A` and `B` slots.
///
/// Guarantees checked at construction:
/// - no stage reads and writes the same slot;
/// - no stage writes `Source`;
/// - every stage reads `Source` or a slot an earlier stage has written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagePlan {
    stages: Vec<Stage>,
}

impl StagePlan {
    pub fn new(stages: Vec<Stage>) -> Result<Self, Error> {
        validate(&stages)?;
        Ok(Self { stages })
    }

    /// Source -> A -> B -> A -> ...
    pub fn chain(filters: impl IntoIterator<Item = Filter>) -> Result<Self, Error> {
        Self::new(chained(filters))
    }

    /// Source -> A, Source -> B, Source -> A, ...
    pub fn fan_out(filters: impl IntoIterator<Item = Filter>) -> Result<Self, Error> {
        let mut output = Slot::B;
        let stages = filters
            .into_iter()
            .map(|filter| {
                output = output.other();
                Stage {
                    filter,
                    input: Slot::Source,
                    output,
                }
            })
            .collect();
        Self::new(stages)
    }

    pub fn from_mode(
        mode: PlanMode,
        filters: impl IntoIterator<Item = Filter>,
    ) -> Result<Self, Error> {
        match mode {
            PlanMode::Chain => Self::chain(filters),
            PlanMode::FanOut => Self::fan_out(filters),
        }
    }

    /// Grayscale, Blur, Sharpen, Edge, Brightness(+50) chained through A/B
    /// with copy-through borders.
    pub fn standard() -> Self {
        let filters = Filter::standard_chain(
            LumaWeights::default(),
            BorderPolicy::default(),
            Filter::DEFAULT_BRIGHTNESS,
        );
        let stages = chained(filters);
        debug_assert!(validate(&stages).is_ok());
        Self { stages }
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Slot holding the final stage's result; never `Source`.
    pub fn output(&self) -> Slot {
        self.stages.last().map_or(Slot::A, |s| s.output)
    }
}

fn chained(filters: impl IntoIterator<Item = Filter>) -> Vec<Stage> {
    let mut input = Slot::Source;
    filters
        .into_iter()
        .map(|filter| {
            let output = input.other();
            let stage = Stage {
                filter,
                input,
                output,
            };
            input = output;
            stage
        })
        .collect()
}

fn validate(stages: &[Stage]) -> Result<(), Error> {
    if stages.is_empty() {
        return Err(Error::EmptyPipeline);
    }

    let mut written_a = false;
    let mut written_b = false;
    for (index, stage) in stages.iter().enumerate() {
        if stage.output == Slot::Source {
            return Err(Error::SourceWrite { index });
        }
        if stage.input == stage.output {
            return Err(Error::AliasedStage { index });
        }

        let readable = match stage.input {
            Slot::Source => true,
            Slot::A => written_a,
            Slot::B => written_b,
        };
        if !readable {
            return Err(Error::UnwrittenInput { index });
        }

        match stage.output {
            Slot::A => written_a = true,
            Slot::B => written_b = true,
            Slot::Source => {}
        }
    }
    Ok(())
}
