//! Configuration of [DodgeEnv](super::DodgeEnv).
use serde::{Deserialize, Serialize};

/// Configuration of [`DodgeEnv`](super::DodgeEnv).
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct DodgeConfig {
    pub(super) height: usize,
    pub(super) width: usize,
    pub(super) frame_skip: usize,
    pub(super) sticky_action_prob: f32,
    pub(super) max_episode_frames: u32,
}

impl Default for DodgeConfig {
    fn default() -> Self {
        Self {
            height: 48,
            width: 64,
            frame_skip: 3,
            sticky_action_prob: 0.0,
            max_episode_frames: 20_000,
        }
    }
}

impl DodgeConfig {
    /// Sets the screen height in pixels.
    pub fn height(mut self, height: usize) -> Self {
        self.height = height;
        self
    }

    /// Sets the screen width in pixels.
    pub fn width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    /// Sets the number of machine frames per environment step.
    pub fn frame_skip(mut self, frame_skip: usize) -> Self {
        self.frame_skip = frame_skip;
        self
    }

    /// Sets the probability of repeating the previous action.
    pub fn sticky_action_prob(mut self, sticky_action_prob: f32) -> Self {
        self.sticky_action_prob = sticky_action_prob;
        self
    }

    /// Sets the episode length cutoff in machine frames.
    pub fn max_episode_frames(mut self, max_episode_frames: u32) -> Self {
        self.max_episode_frames = max_episode_frames;
        self
    }
}
