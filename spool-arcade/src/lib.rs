//! A small built-in arcade game for the spool capture pipeline.
//!
//! The game, `dodge`, runs a paddle along the bottom row of a grayscale
//! screen while debris falls from the top. Dodging a piece of debris scores
//! a point, catching one ends the episode. The machine is deterministic for
//! a given seed and needs no ROMs or external processes, which makes it a
//! convenient source of capture data.
//!
//! [`DodgeMachine`] is the raw game: one call advances one frame.
//! [`DodgeEnv`] wraps it with frame skipping and sticky actions and
//! implements [`spool_core::Env`], so it plugs straight into a
//! [`Collector`](spool_core::Collector).
//!
//! ```no_run
//! use anyhow::Result;
//! use spool_arcade::{DodgeConfig, DodgeEnv};
//! use spool_core::Env as _;
//!
//! fn main() -> Result<()> {
//!     let mut env = DodgeEnv::build(&DodgeConfig::default(), 42)?;
//!     let actions = env.legal_actions();
//!
//!     // Plays one episode with a random policy.
//!     let mut score = 0f32;
//!     while !env.is_terminal() {
//!         let act = actions[fastrand::usize(..actions.len())];
//!         score += env.step(&act)?;
//!     }
//!     println!("score: {}", score);
//!
//!     Ok(())
//! }
//! ```
mod act;
mod env;
mod machine;
pub use act::DodgeAction;
pub use env::{DodgeConfig, DodgeEnv};
pub use machine::DodgeMachine;
