//! Capture loop driving an environment into a sink.
mod config;
pub use config::CollectorConfig;

use crate::{error::CollectError, Env, FrameWindow, SampleSink};
use anyhow::Result;
use fastrand::Rng;
use log::info;

/// Aggregates of one capture run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CaptureReport {
    /// Samples captured and written.
    pub samples: usize,

    /// Episodes completed, i.e. terminal signals observed. The episode cut
    /// off by reaching the target size is not counted.
    pub episodes: usize,

    /// Ranges written to the sink.
    pub flushes: usize,

    /// Sum of rewards over all steps.
    pub reward_sum: f32,
}

/// Captures a fixed number of samples from an environment into a sink.
///
/// The collector steps the environment under a uniform random policy over its
/// legal actions, observing once per step. Observations are deposited into a
/// [`FrameWindow`] at their global index; whenever the running count reaches a
/// multiple of the window capacity, the just-completed window is flushed as
/// one contiguous range. After the target size is reached, the remainder
/// `dataset_size % capacity` is flushed as one shorter final range. A
/// remainder of zero means the last full window was already flushed and no
/// final write happens.
///
/// When the environment reports a terminal state before the target is
/// reached, it is reset and capture continues. The global sample count runs
/// across episodes, so resets never skip or repeat an output index.
///
/// Any environment or sink failure aborts the run. The sink is then left
/// holding a prefix of the declared range and must not be finalized.
pub struct Collector {
    config: CollectorConfig,
    rng: Rng,
}

impl Collector {
    /// Builds a collector. The seed fixes the action policy for the whole
    /// run.
    pub fn build(config: CollectorConfig) -> Result<Self, CollectError> {
        if config.capacity == 0 {
            return Err(CollectError::ZeroCapacity);
        }
        let rng = Rng::with_seed(config.seed as u64);
        Ok(Self { config, rng })
    }

    /// Runs the capture loop to completion and reports its aggregates.
    ///
    /// The environment is taken as it is, without an initial reset, so the
    /// episode it is currently in becomes the first captured one.
    pub fn run<E, S>(&mut self, env: &mut E, sink: &mut S) -> Result<CaptureReport>
    where
        E: Env,
        S: SampleSink,
    {
        let total = self.config.dataset_size;
        let capacity = self.config.capacity;
        let log_interval = self.config.log_interval;
        let actions = env.legal_actions();
        if actions.is_empty() {
            return Err(CollectError::NoLegalActions.into());
        }
        let mut window = FrameWindow::new(capacity, env.frame_shape());
        let mut report = CaptureReport::default();
        let mut collected = 0;

        while collected < total {
            while !env.is_terminal() && collected < total {
                let act = &actions[self.rng.usize(..actions.len())];
                report.reward_sum += env.step(act)?;
                window.put(collected, env.observe());
                collected += 1;
                if log_interval != 0 && collected % log_interval == 0 {
                    info!("collected {} / {} samples", collected, total);
                }
                if collected % capacity == 0 {
                    window.flush_range(sink, collected - capacity, capacity)?;
                    report.flushes += 1;
                    info!("flushed window [{}, {})", collected - capacity, collected);
                }
            }
            if collected < total {
                env.reset()?;
                report.episodes += 1;
            }
        }

        let remainder = total % capacity;
        if remainder != 0 {
            window.flush_range(sink, total - remainder, remainder)?;
            report.flushes += 1;
            info!("flushed final range [{}, {})", total - remainder, total);
        }
        report.samples = collected;
        info!(
            "capture finished: {} samples, {} episodes, {} flushes",
            report.samples, report.episodes, report.flushes
        );

        Ok(report)
    }
}
