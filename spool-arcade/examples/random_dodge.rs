use anyhow::Result;
use spool_arcade::{DodgeConfig, DodgeEnv};
use spool_core::Env as _;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    fastrand::seed(42);

    let mut env = DodgeEnv::build(&DodgeConfig::default(), 42)?;
    let actions = env.legal_actions();

    // Plays a few episodes with a random policy.
    for episode in 0..5 {
        let mut steps = 0;
        let mut score = 0f32;
        while !env.is_terminal() {
            let act = actions[fastrand::usize(..actions.len())];
            score += env.step(&act)?;
            steps += 1;
        }
        log::info!("episode {}: {} steps, score {}", episode, steps, score);
        env.reset()?;
    }

    Ok(())
}
