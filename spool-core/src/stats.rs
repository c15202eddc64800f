//! Probes of environment behavior under the capture policy.
//!
//! These helpers drive an environment with the same uniform random policy the
//! collector uses and report aggregates over a fixed number of episodes. They
//! are read-only: no sink is involved.
use crate::{error::CollectError, Env};
use anyhow::Result;
use fastrand::Rng;
use log::info;
use std::collections::HashSet;
use xxhash_rust::xxh3::xxh3_64;

/// Distribution of non-zero rewards under a uniform random policy.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SparsityReport {
    /// Episodes played.
    pub episodes: usize,

    /// Steps taken in total.
    pub steps: usize,

    /// Steps with positive reward.
    pub positive: usize,

    /// Steps with negative reward.
    pub negative: usize,
}

impl SparsityReport {
    /// Fraction of steps with positive reward.
    pub fn positive_fraction(&self) -> f64 {
        if self.steps == 0 {
            0.0
        } else {
            self.positive as f64 / self.steps as f64
        }
    }

    /// Fraction of steps with negative reward.
    pub fn negative_fraction(&self) -> f64 {
        if self.steps == 0 {
            0.0
        } else {
            self.negative as f64 / self.steps as f64
        }
    }
}

/// Counts of observations repeated within an episode.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AliasingReport {
    /// Episodes played.
    pub episodes: usize,

    /// Steps taken in total.
    pub steps: usize,

    /// Frames whose pixel content already occurred earlier in the same
    /// episode.
    pub aliased_frames: usize,

    /// State snapshots that already occurred earlier in the same episode.
    pub aliased_states: usize,
}

impl AliasingReport {
    /// Fraction of frames aliasing an earlier one of their episode.
    pub fn aliased_frame_fraction(&self) -> f64 {
        if self.steps == 0 {
            0.0
        } else {
            self.aliased_frames as f64 / self.steps as f64
        }
    }
}

/// Plays episodes under a uniform random policy and counts steps with
/// positive and negative reward.
pub fn reward_sparsity<E: Env>(env: &mut E, episodes: usize, rng: &mut Rng) -> Result<SparsityReport> {
    let actions = env.legal_actions();
    if actions.is_empty() {
        return Err(CollectError::NoLegalActions.into());
    }
    let mut report = SparsityReport::default();
    for ep in 0..episodes {
        let mut steps = 0;
        let (mut positive, mut negative) = (0, 0);
        while !env.is_terminal() {
            let act = &actions[rng.usize(..actions.len())];
            let r = env.step(act)?;
            steps += 1;
            if r > 0.0 {
                positive += 1;
            } else if r < 0.0 {
                negative += 1;
            }
        }
        env.reset()?;
        info!(
            "episode {}: {} steps, {} positive, {} negative",
            ep, steps, positive, negative
        );
        report.episodes += 1;
        report.steps += steps;
        report.positive += positive;
        report.negative += negative;
    }
    Ok(report)
}

/// Plays episodes under a uniform random policy and counts observations whose
/// content already occurred earlier in the same episode.
///
/// Frames and state snapshots are compared by 64-bit XXH3 digest of their raw
/// bytes.
pub fn state_aliasing<E: Env>(env: &mut E, episodes: usize, rng: &mut Rng) -> Result<AliasingReport> {
    let actions = env.legal_actions();
    if actions.is_empty() {
        return Err(CollectError::NoLegalActions.into());
    }
    let mut report = AliasingReport::default();
    let mut seen_frames = HashSet::new();
    let mut seen_states = HashSet::new();
    for ep in 0..episodes {
        seen_frames.clear();
        seen_states.clear();
        let mut steps = 0;
        let (mut frames, mut states) = (0, 0);
        while !env.is_terminal() {
            let act = &actions[rng.usize(..actions.len())];
            env.step(act)?;
            steps += 1;
            let sample = env.observe();
            if !seen_frames.insert(xxh3_64(&sample.frame)) {
                frames += 1;
            }
            if !seen_states.insert(xxh3_64(&sample.state)) {
                states += 1;
            }
        }
        env.reset()?;
        info!(
            "episode {}: {} steps, {} aliased frames, {} aliased states",
            ep, steps, frames, states
        );
        report.episodes += 1;
        report.steps += steps;
        report.aliased_frames += frames;
        report.aliased_states += states;
    }
    Ok(report)
}
