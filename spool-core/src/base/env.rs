//! Environment.
use super::{FrameShape, Sample};
use anyhow::Result;
use std::fmt::Debug;

/// A discrete action of an environment.
pub trait Act: Clone + Debug {}

/// Represents a stepped, resettable simulated environment.
///
/// An environment is a black-box stepping machine: applying an action
/// advances simulated time by a driver-defined fixed number of internal ticks
/// and yields a scalar reward, and the current observation can be read
/// between steps. A freshly built environment is at the start of an episode.
///
/// Episodes are expected to end within a finite number of steps under any
/// action sequence. This is a property of the environment and is not enforced
/// by the pipeline.
pub trait Env {
    /// Configuration of the environment.
    type Config: Clone;

    /// Action of the environment.
    type Act: Act;

    /// Builds an environment with a given random seed.
    fn build(config: &Self::Config, seed: i64) -> Result<Self>
    where
        Self: Sized;

    /// Dimensions of the frames this environment emits, fixed for the
    /// lifetime of the instance.
    fn frame_shape(&self) -> FrameShape;

    /// The legal actions in a fixed order. Never empty.
    fn legal_actions(&self) -> Vec<Self::Act>;

    /// True once the current episode has ended.
    fn is_terminal(&self) -> bool;

    /// Applies one action and returns the reward.
    fn step(&mut self, act: &Self::Act) -> Result<f32>;

    /// Returns the current observation.
    ///
    /// Repeated calls between steps return the same sample.
    fn observe(&self) -> Sample;

    /// Ends the current episode and begins a new one.
    ///
    /// Safe to call at any time, including immediately after construction.
    fn reset(&mut self) -> Result<()>;
}
