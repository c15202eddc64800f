//! Basic traits and types of the capture pipeline.
mod env;
mod sample;
mod sink;
pub use env::{Act, Env};
pub use sample::{FrameShape, Sample, STATE_LEN};
pub use sink::SampleSink;
