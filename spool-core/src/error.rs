//! Errors in the capture pipeline.
use thiserror::Error;

/// Errors in the capture pipeline.
#[derive(Error, Debug)]
pub enum CollectError {
    /// The window capacity was configured as zero.
    #[error("window capacity must be positive")]
    ZeroCapacity,

    /// The environment declared no legal actions.
    #[error("environment declares no legal actions")]
    NoLegalActions,
}
