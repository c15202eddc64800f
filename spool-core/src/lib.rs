#![warn(missing_docs)]
//! Core of the spool capture pipeline.
//!
//! This crate drives a stepped, resettable environment under a uniform random
//! policy and captures its observation stream, one sample per step, into a
//! persistent sink. Samples are accumulated in a fixed-capacity in-memory
//! window ([`FrameWindow`]) and written out as contiguous ranges: a full
//! window at every window boundary and, when the target size is not a
//! multiple of the capacity, one shorter final range. Episode boundaries
//! reset the environment but leave no trace in the output indexing.
//!
//! The two seams of the pipeline are traits: [`Env`] on the driving side and
//! [`SampleSink`] on the storage side. [`Collector`] owns the loop between
//! them. [`stats`] offers read-only probes of an environment under the same
//! policy, with no sink involved.
pub mod error;
pub mod stats;
pub mod util;

mod base;
pub use base::{Act, Env, FrameShape, Sample, SampleSink, STATE_LEN};

mod window;
pub use window::FrameWindow;

mod collector;
pub use collector::{CaptureReport, Collector, CollectorConfig};
