//! Configuration of [`Collector`](super::Collector).
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`Collector`](super::Collector).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct CollectorConfig {
    /// Total number of samples to capture.
    pub dataset_size: usize,

    /// Capacity of the in-memory window in samples.
    pub capacity: usize,

    /// Seed of the action policy.
    pub seed: i64,

    /// Interval of progress logging in samples. Zero disables progress
    /// logging.
    pub log_interval: usize,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            dataset_size: 0,
            capacity: 65536,
            seed: 42,
            log_interval: 1000,
        }
    }
}

impl CollectorConfig {
    /// Sets the total number of samples to capture.
    pub fn dataset_size(mut self, v: usize) -> Self {
        self.dataset_size = v;
        self
    }

    /// Sets the capacity of the in-memory window.
    pub fn capacity(mut self, v: usize) -> Self {
        self.capacity = v;
        self
    }

    /// Sets the seed of the action policy.
    pub fn seed(mut self, v: i64) -> Self {
        self.seed = v;
        self
    }

    /// Sets the interval of progress logging in samples.
    pub fn log_interval(mut self, v: usize) -> Self {
        self.log_interval = v;
        self
    }

    /// Constructs [`CollectorConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`CollectorConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn save_and_load_roundtrip() -> Result<()> {
        let config = CollectorConfig::default()
            .dataset_size(100_000)
            .capacity(4096)
            .seed(7)
            .log_interval(500);

        let dir = TempDir::new("collector_config")?;
        let path = dir.path().join("collector.yaml");
        config.save(&path)?;
        let config_ = CollectorConfig::load(&path)?;
        assert_eq!(config, config_);
        Ok(())
    }
}
