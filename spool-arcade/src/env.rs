//! Capture environment wrapping [DodgeMachine](crate::DodgeMachine).
mod config;
pub use config::DodgeConfig;

use crate::{DodgeAction, DodgeMachine};
use anyhow::{ensure, Result};
use spool_core::{Env, FrameShape, Sample};

/// [`DodgeMachine`] wrapped as a capture environment.
///
/// Each call to [`step`](Env::step) advances the machine `frame_skip` frames
/// under the same action and sums the frame rewards. With probability
/// `sticky_action_prob` the requested action is replaced by the previously
/// executed one, which breaks up the button mashing of a random policy into
/// longer runs of the same action. The sticky draw uses its own random number
/// generator so it does not disturb the machine's stream; both are derived
/// from the build seed.
pub struct DodgeEnv {
    machine: DodgeMachine,

    // Machine frames per environment step.
    frame_skip: usize,

    // Probability of repeating the previous action.
    sticky_action_prob: f32,

    // The action executed by the last step.
    last_action: DodgeAction,

    // Generator for the sticky action draws.
    rng: fastrand::Rng,
}

impl Env for DodgeEnv {
    type Config = DodgeConfig;
    type Act = DodgeAction;

    fn build(config: &Self::Config, seed: i64) -> Result<Self>
    where
        Self: Sized,
    {
        ensure!(
            (8..=255).contains(&config.width) && (4..=255).contains(&config.height),
            "screen size {}x{} out of range",
            config.width,
            config.height
        );
        ensure!(config.frame_skip >= 1, "frame_skip must be at least 1");
        ensure!(
            (0.0..1.0).contains(&config.sticky_action_prob),
            "sticky_action_prob {} must be in [0, 1)",
            config.sticky_action_prob
        );
        ensure!(
            config.max_episode_frames >= 1,
            "max_episode_frames must be at least 1"
        );

        Ok(Self {
            machine: DodgeMachine::new(
                config.height,
                config.width,
                config.max_episode_frames,
                seed as u64,
            ),
            frame_skip: config.frame_skip,
            sticky_action_prob: config.sticky_action_prob,
            last_action: DodgeAction::Noop,
            rng: fastrand::Rng::with_seed((seed as u64).wrapping_add(1)),
        })
    }

    fn frame_shape(&self) -> FrameShape {
        FrameShape::new(self.machine.height(), self.machine.width())
    }

    fn legal_actions(&self) -> Vec<Self::Act> {
        self.machine.available_actions()
    }

    fn is_terminal(&self) -> bool {
        self.machine.is_game_over()
    }

    fn step(&mut self, act: &Self::Act) -> Result<f32> {
        let act = if self.sticky_action_prob > 0.0 && self.rng.f32() < self.sticky_action_prob {
            self.last_action
        } else {
            *act
        };
        self.last_action = act;

        let mut reward = 0;
        for _ in 0..self.frame_skip {
            reward += self.machine.step(act);
            if self.machine.is_game_over() {
                break;
            }
        }

        Ok(reward as f32)
    }

    fn observe(&self) -> Sample {
        let mut frame = vec![0; self.machine.frame_size()];
        self.machine.render_frame(&mut frame);
        let mut state = vec![0; self.machine.ram_size()];
        self.machine.render_ram(&mut state);
        Sample::new(frame, state)
    }

    fn reset(&mut self) -> Result<()> {
        self.machine.reset();
        self.last_action = DodgeAction::Noop;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spool_core::STATE_LEN;

    fn config() -> DodgeConfig {
        DodgeConfig::default()
            .height(24)
            .width(32)
            .max_episode_frames(400)
    }

    fn episode_frame_of(sample: &Sample) -> u32 {
        u32::from_le_bytes([
            sample.state[0],
            sample.state[1],
            sample.state[2],
            sample.state[3],
        ])
    }

    #[test]
    fn build_starts_at_an_episode_start() {
        let env = DodgeEnv::build(&config(), 42).unwrap();
        assert!(!env.is_terminal());
        assert_eq!(env.frame_shape(), FrameShape::new(24, 32));

        let sample = env.observe();
        assert_eq!(sample.frame.len(), 24 * 32);
        assert_eq!(sample.state.len(), STATE_LEN);
        assert_eq!(episode_frame_of(&sample), 0);
    }

    #[test]
    fn one_step_advances_frame_skip_frames() {
        let mut env = DodgeEnv::build(&config().frame_skip(4), 42).unwrap();
        env.step(&DodgeAction::Noop).unwrap();
        assert_eq!(episode_frame_of(&env.observe()), 4);
    }

    #[test]
    fn same_seed_gives_the_same_capture() {
        let mut a = DodgeEnv::build(&config(), 11).unwrap();
        let mut b = DodgeEnv::build(&config(), 11).unwrap();
        let actions = [DodgeAction::Right, DodgeAction::Noop, DodgeAction::Left];

        for i in 0..50 {
            let act = actions[i % actions.len()];
            assert_eq!(a.step(&act).unwrap(), b.step(&act).unwrap());
            assert_eq!(a.observe(), b.observe());
        }
    }

    #[test]
    fn reset_begins_a_fresh_episode() {
        let mut env = DodgeEnv::build(&config().max_episode_frames(10), 42).unwrap();
        while !env.is_terminal() {
            env.step(&DodgeAction::Noop).unwrap();
        }

        env.reset().unwrap();
        assert!(!env.is_terminal());
        assert_eq!(episode_frame_of(&env.observe()), 0);
    }

    #[test]
    fn legal_actions_lists_every_action() {
        let env = DodgeEnv::build(&config(), 42).unwrap();
        let actions = env.legal_actions();
        assert_eq!(actions.len(), 3);
        assert!(actions.contains(&DodgeAction::Noop));
        assert!(actions.contains(&DodgeAction::Left));
        assert!(actions.contains(&DodgeAction::Right));
    }

    #[test]
    fn bad_configs_are_rejected() {
        assert!(DodgeEnv::build(&config().width(4), 42).is_err());
        assert!(DodgeEnv::build(&config().frame_skip(0), 42).is_err());
        assert!(DodgeEnv::build(&config().sticky_action_prob(1.5), 42).is_err());
        assert!(DodgeEnv::build(&config().max_episode_frames(0), 42).is_err());
    }

    // Tall screen and no frame skipping: debris cannot reach the floor
    // within the stepped range, so no episode ends mid-test and ram byte 11
    // always holds the action the last step executed.
    fn sticky_config(prob: f32) -> DodgeConfig {
        DodgeConfig::default()
            .height(200)
            .frame_skip(1)
            .sticky_action_prob(prob)
    }

    fn executed_action_of(sample: &Sample) -> u8 {
        sample.state[11]
    }

    #[test]
    fn sticky_actions_off_never_substitute() {
        let mut env = DodgeEnv::build(&sticky_config(0.0), 7).unwrap();
        for i in 0..20 {
            let act = if i % 2 == 0 {
                DodgeAction::Left
            } else {
                DodgeAction::Right
            };
            env.step(&act).unwrap();
            assert_eq!(executed_action_of(&env.observe()), act as u8);
        }
        assert!(!env.is_terminal());
    }

    #[test]
    fn sticky_actions_repeat_the_previous_action() {
        let mut env = DodgeEnv::build(&sticky_config(0.9), 7).unwrap();
        let mut previous = DodgeAction::Noop as u8;
        let mut substituted = 0;

        for i in 0..60 {
            let act = if i % 2 == 0 {
                DodgeAction::Left
            } else {
                DodgeAction::Right
            };
            env.step(&act).unwrap();
            let executed = executed_action_of(&env.observe());
            // A step executes the requested action or repeats the previous
            // one, nothing else.
            if executed != act as u8 {
                assert_eq!(executed, previous);
                substituted += 1;
            }
            previous = executed;
        }

        assert!(!env.is_terminal());
        assert!(substituted > 0, "no substitution in 60 draws at 0.9");
    }
}
