//! Command line observation capture.
//!
//! - `collect`  -- play an environment with a random policy and write the
//!   observations to a dataset file
//! - `info`     -- print the layout of a dataset file
//! - `sparsity` -- estimate how sparse rewards are under the capture policy
//! - `aliasing` -- count observations repeated within an episode

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;

use spool_arcade::{DodgeConfig, DodgeEnv};
use spool_core::{stats, Collector, CollectorConfig, Env};
use spool_store::{DatasetReader, DatasetWriter};

/// Captures observation datasets from stepped simulation environments.
#[derive(Parser)]
#[command(name = "spool", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Capture a dataset by playing an environment with a random policy.
    Collect {
        /// Environment to play. The built-in one is `dodge`.
        env: String,

        /// Number of samples to capture.
        size: usize,

        /// Output dataset file.
        out: PathBuf,

        /// Samples held in memory between writes.
        #[arg(long)]
        capacity: Option<usize>,

        /// Seed of the capture policy and the environment.
        #[arg(long)]
        seed: Option<i64>,

        /// Samples between progress log lines, 0 to disable.
        #[arg(long)]
        log_interval: Option<usize>,

        /// Samples per compressed chunk of the output file.
        #[arg(long, default_value_t = 1024)]
        chunk_len: usize,

        /// Capture configuration YAML. Explicit flags override its values.
        #[arg(long)]
        config: Option<PathBuf>,

        #[command(flatten)]
        env_args: EnvArgs,
    },

    /// Print the layout of a dataset file.
    Info {
        /// Dataset file.
        file: PathBuf,
    },

    /// Estimate how sparse rewards are under the capture policy.
    Sparsity {
        /// Environment to play.
        env: String,

        /// Episodes to play.
        #[arg(long, default_value_t = 10)]
        episodes: usize,

        /// Seed of the policy and the environment.
        #[arg(long, default_value_t = 42)]
        seed: i64,

        #[command(flatten)]
        env_args: EnvArgs,
    },

    /// Count observations whose content repeats within an episode.
    Aliasing {
        /// Environment to play.
        env: String,

        /// Episodes to play.
        #[arg(long, default_value_t = 10)]
        episodes: usize,

        /// Seed of the policy and the environment.
        #[arg(long, default_value_t = 42)]
        seed: i64,

        #[command(flatten)]
        env_args: EnvArgs,
    },
}

/// Knobs of the built-in environment.
#[derive(Args)]
struct EnvArgs {
    /// Screen height in pixels.
    #[arg(long)]
    height: Option<usize>,

    /// Screen width in pixels.
    #[arg(long)]
    width: Option<usize>,

    /// Machine frames per environment step.
    #[arg(long)]
    frame_skip: Option<usize>,

    /// Probability of repeating the previous action.
    #[arg(long)]
    sticky: Option<f32>,

    /// Episode length cutoff in machine frames.
    #[arg(long)]
    max_episode_frames: Option<u32>,
}

impl EnvArgs {
    fn dodge_config(&self) -> DodgeConfig {
        let mut config = DodgeConfig::default();
        if let Some(height) = self.height {
            config = config.height(height);
        }
        if let Some(width) = self.width {
            config = config.width(width);
        }
        if let Some(frame_skip) = self.frame_skip {
            config = config.frame_skip(frame_skip);
        }
        if let Some(sticky) = self.sticky {
            config = config.sticky_action_prob(sticky);
        }
        if let Some(max_episode_frames) = self.max_episode_frames {
            config = config.max_episode_frames(max_episode_frames);
        }
        config
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Collect {
            env,
            size,
            out,
            capacity,
            seed,
            log_interval,
            chunk_len,
            config,
            env_args,
        } => {
            let mut collector_config = match config {
                Some(path) => CollectorConfig::load(path)
                    .with_context(|| format!("failed to load {}", path.display()))?,
                None => CollectorConfig::default(),
            };
            collector_config = collector_config.dataset_size(*size);
            if let Some(capacity) = capacity {
                collector_config = collector_config.capacity(*capacity);
            }
            if let Some(seed) = seed {
                collector_config = collector_config.seed(*seed);
            }
            if let Some(log_interval) = log_interval {
                collector_config = collector_config.log_interval(*log_interval);
            }
            cmd_collect(env, out, *chunk_len, collector_config, env_args)
        }
        Commands::Info { file } => cmd_info(file),
        Commands::Sparsity {
            env,
            episodes,
            seed,
            env_args,
        } => cmd_sparsity(env, *episodes, *seed, env_args),
        Commands::Aliasing {
            env,
            episodes,
            seed,
            env_args,
        } => cmd_aliasing(env, *episodes, *seed, env_args),
    }
}

/// Builds the named environment. The match is the whole registry.
fn build_env(name: &str, args: &EnvArgs, seed: i64) -> Result<DodgeEnv> {
    match name {
        "dodge" => DodgeEnv::build(&args.dodge_config(), seed),
        _ => bail!("unknown environment {:?}, the built-in one is \"dodge\"", name),
    }
}

fn cmd_collect(
    env_name: &str,
    out: &Path,
    chunk_len: usize,
    config: CollectorConfig,
    env_args: &EnvArgs,
) -> Result<()> {
    let env = build_env(env_name, env_args, config.seed)?;
    capture(env, config, out, chunk_len)
}

fn capture<E: Env>(mut env: E, config: CollectorConfig, out: &Path, chunk_len: usize) -> Result<()> {
    // The collector is built before the writer so a rejected configuration
    // leaves no file behind.
    let total = config.dataset_size;
    let mut collector = Collector::build(config)?;
    let mut writer = DatasetWriter::create(out, total, env.frame_shape(), chunk_len)
        .with_context(|| format!("failed to create {}", out.display()))?;
    let report = collector.run(&mut env, &mut writer)?;
    writer.close()?;

    info!(
        "wrote {} samples over {} episodes to {}, total reward {}",
        report.samples,
        report.episodes,
        out.display(),
        report.reward_sum
    );
    Ok(())
}

fn cmd_info(file: &Path) -> Result<()> {
    let reader =
        DatasetReader::open(file).with_context(|| format!("failed to open {}", file.display()))?;
    let shape = reader.frame_shape();

    println!("samples:     {}", reader.len());
    println!("frame:       {}x{}x1", shape.height, shape.width);
    println!("state bytes: {}", reader.state_len());
    println!("chunk:       {} samples", reader.chunk_len());
    println!("chunks:      {}", reader.chunks());
    Ok(())
}

fn cmd_sparsity(env_name: &str, episodes: usize, seed: i64, env_args: &EnvArgs) -> Result<()> {
    let mut env = build_env(env_name, env_args, seed)?;
    let mut rng = fastrand::Rng::with_seed(seed as u64);
    let report = stats::reward_sparsity(&mut env, episodes, &mut rng)?;

    println!("episodes:       {}", report.episodes);
    println!("steps:          {}", report.steps);
    println!(
        "positive steps: {} ({:.4})",
        report.positive,
        report.positive_fraction()
    );
    println!(
        "negative steps: {} ({:.4})",
        report.negative,
        report.negative_fraction()
    );
    Ok(())
}

fn cmd_aliasing(env_name: &str, episodes: usize, seed: i64, env_args: &EnvArgs) -> Result<()> {
    let mut env = build_env(env_name, env_args, seed)?;
    let mut rng = fastrand::Rng::with_seed(seed as u64);
    let report = stats::state_aliasing(&mut env, episodes, &mut rng)?;

    println!("episodes:       {}", report.episodes);
    println!("steps:          {}", report.steps);
    println!(
        "aliased frames: {} ({:.4})",
        report.aliased_frames,
        report.aliased_frame_fraction()
    );
    println!("aliased states: {}", report.aliased_states);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use spool_core::error::CollectError;
    use tempdir::TempDir;

    #[test]
    fn rejected_capture_config_leaves_no_file_behind() {
        let dir = TempDir::new("spool").unwrap();
        let out = dir.path().join("out.sds");
        let env = DodgeEnv::build(&DodgeConfig::default(), 1).unwrap();
        let config = CollectorConfig::default().dataset_size(10).capacity(0);

        let err = capture(env, config, &out, 64).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CollectError>(),
            Some(CollectError::ZeroCapacity)
        ));
        assert!(!out.exists());
    }
}
