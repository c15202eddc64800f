//! Chunked, compressed, append-only dataset files for captured samples.
//!
//! A dataset file holds two co-indexed fixed-shape arrays: `screens`, of
//! shape `(n, height, width, 1)`, and `states`, of shape `(n, 128)`, both of
//! unsigned bytes. Samples are stored in chunks of a fixed number of samples;
//! each chunk is two LZ4 blocks (frames, then snapshots) with an XXH3
//! checksum. A directory of chunk locations is written as a footer when the
//! file is closed, so a file without a footer is detected as an aborted run.
//!
//! [`DatasetWriter`] declares the full shape up front and accepts strictly
//! sequential ranges through the [`SampleSink`](spool_core::SampleSink)
//! interface. [`DatasetReader`] opens a finalized file and reads sample
//! ranges back.
mod error;
mod format;
mod reader;
mod writer;

pub use error::StoreError;
pub use format::{FORMAT_VERSION, MAGIC};
pub use reader::DatasetReader;
pub use writer::DatasetWriter;
