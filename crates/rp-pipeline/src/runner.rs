use std::time::{Duration, Instant};

use log::{debug, info};
use rp_core::{Error, RasterBuffer, RasterView, raster_len};
use rp_filter::Filter;
use rp_sched::{Dispatch, RowScheduler};

use crate::plan::{Slot, Stage, StagePlan};

/// Runs `filter` over every row of `src` through `scheduler`, writing `dst`.
///
/// `dst` is reshaped to `src`'s dimensions first and must have room for it.
pub fn apply_filter(
    scheduler: &RowScheduler,
    filter: &Filter,
    src: &RasterView<'_>,
    dst: &mut RasterBuffer,
) -> Result<(), Error> {
    dst.reshape(src.width(), src.height(), src.channels())?;
    scheduler.run_bands(dst.data_mut(), src.row_len(), |rows, band| {
        filter.apply_rows(src, rows, band)
    })
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub workers: usize,
    pub dispatch: Dispatch,
    /// Bytes reserved for each of the two scratch buffers.
    pub capacity: usize,
    pub plan: StagePlan,
}

impl PipelineConfig {
    /// Standard five-stage chain on a pooled scheduler.
    pub fn standard(workers: usize, capacity: usize) -> Self {
        Self {
            workers,
            dispatch: Dispatch::default(),
            capacity,
            plan: StagePlan::standard(),
        }
    }

    /// Scratch capacity that fits a `width x height x channels` raster.
    pub fn capacity_for(width: usize, height: usize, channels: usize) -> Result<usize, Error> {
        raster_len(width, height, channels)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageTiming {
    pub name: &'static str,
    pub elapsed: Duration,
}

/// Applies a [`StagePlan`] to one image at a time using two scratch buffers
/// allocated once at construction.
#[derive(Debug)]
pub struct PipelineRunner {
    scheduler: RowScheduler,
    plan: StagePlan,
    a: RasterBuffer,
    b: RasterBuffer,
    timings: Vec<StageTiming>,
}

impl PipelineRunner {
    pub fn new(config: PipelineConfig) -> Result<Self, Error> {
        if config.capacity == 0 {
            return Err(Error::InvalidArgument("scratch capacity must be non-zero"));
        }

        let scheduler = RowScheduler::new(config.workers, config.dispatch)?;
        let a = RasterBuffer::with_capacity(config.capacity)?;
        let b = RasterBuffer::with_capacity(config.capacity)?;
        info!(
            "pipeline ready: stages={} workers={} dispatch={:?} capacity={}B",
            config.plan.len(),
            config.workers,
            config.dispatch,
            config.capacity
        );

        Ok(Self {
            scheduler,
            timings: Vec::with_capacity(config.plan.len()),
            plan: config.plan,
            a,
            b,
        })
    }

    pub fn plan(&self) -> &StagePlan {
        &self.plan
    }

    pub fn scheduler(&self) -> &RowScheduler {
        &self.scheduler
    }

    pub fn capacity(&self) -> usize {
        self.a.capacity()
    }

    /// Per-stage wall time of the last [`process`](Self::process) call; empty
    /// when that call failed.
    pub fn timings(&self) -> &[StageTiming] {
        &self.timings
    }

    /// Runs every stage on `image` and returns a view of the final result.
    ///
    /// The view borrows the runner's scratch memory and is overwritten by the
    /// next call.
    pub fn process(&mut self, image: &RasterView<'_>) -> Result<RasterView<'_>, Error> {
        self.process_observed(image, |_, _| {})
    }

    /// Like [`process`](Self::process), calling `observer` with each stage's
    /// output as soon as the stage has completed.
    pub fn process_observed<F>(
        &mut self,
        image: &RasterView<'_>,
        mut observer: F,
    ) -> Result<RasterView<'_>, Error>
    where
        F: FnMut(&Stage, &RasterView<'_>),
    {
        self.timings.clear();
        let required = raster_len(image.width(), image.height(), image.channels())?;
        if required > self.a.capacity() {
            return Err(Error::BufferOverflow {
                required,
                capacity: self.a.capacity(),
            });
        }

        for (index, stage) in self.plan.stages().iter().enumerate() {
            let t0 = Instant::now();
            let step = run_stage(&self.scheduler, *image, &mut self.a, &mut self.b, stage, index);
            let output = match step {
                Ok(output) => output,
                Err(e) => {
                    self.timings.clear();
                    return Err(e);
                }
            };
            let elapsed = t0.elapsed();

            debug!(
                "stage {index} {}: {:?} -> {:?} {}x{}x{} in {:.3} ms",
                stage.filter.name(),
                stage.input,
                stage.output,
                image.width(),
                image.height(),
                image.channels(),
                elapsed.as_secs_f64() * 1e3
            );
            self.timings.push(StageTiming {
                name: stage.filter.name(),
                elapsed,
            });
            observer(stage, &output.as_view());
        }

        let result = match self.plan.output() {
            Slot::B => &self.b,
            Slot::A | Slot::Source => &self.a,
        };
        Ok(result.as_view())
    }
}

fn run_stage<'a>(
    scheduler: &RowScheduler,
    image: RasterView<'a>,
    a: &'a mut RasterBuffer,
    b: &'a mut RasterBuffer,
    stage: &Stage,
    index: usize,
) -> Result<&'a mut RasterBuffer, Error> {
    let (input, output) = select(image, a, b, stage, index)?;
    apply_filter(scheduler, &stage.filter, &input, output)?;
    Ok(output)
}

fn select<'a>(
    image: RasterView<'a>,
    a: &'a mut RasterBuffer,
    b: &'a mut RasterBuffer,
    stage: &Stage,
    index: usize,
) -> Result<(RasterView<'a>, &'a mut RasterBuffer), Error> {
    match (stage.input, stage.output) {
        (Slot::Source, Slot::A) => Ok((image, a)),
        (Slot::Source, Slot::B) => Ok((image, b)),
        (Slot::A, Slot::B) => Ok((a.as_view(), b)),
        (Slot::B, Slot::A) => Ok((b.as_view(), a)),
        (_, Slot::Source) => Err(Error::SourceWrite { index }),
        _ => Err(Error::AliasedStage { index }),
    }
}

/// One-shot run of the standard pipeline with scratch sized for `image`.
pub fn process(image: &RasterView<'_>, workers: usize) -> Result<RasterBuffer, Error> {
    let capacity = PipelineConfig::capacity_for(image.width(), image.height(), image.channels())?;
    let mut runner = PipelineRunner::new(PipelineConfig::standard(workers, capacity))?;
    Ok(runner.process(image)?.to_buffer())
}
