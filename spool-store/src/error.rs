//! Errors of the dataset store.
use thiserror::Error;

/// Errors of the dataset store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// An underlying I/O operation failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Header or directory encoding failed.
    #[error("encode error: {0}")]
    Encode(#[from] bincode::Error),

    /// A chunk failed to decompress.
    #[error("decompress error: {0}")]
    Decompress(#[from] lz4_flex::block::DecompressError),

    /// The file does not start with the dataset magic.
    #[error("not a spool dataset file")]
    BadMagic,

    /// The file was written by an unsupported format version.
    #[error("unsupported format version {0}")]
    UnsupportedVersion(u16),

    /// A header field declares a layout no file could hold.
    #[error("header declares an impossible layout")]
    BadHeader,

    /// The file has no valid footer, typically because the writing run was
    /// aborted before close.
    #[error("dataset file is truncated or was not closed")]
    Truncated,

    /// The chunk directory disagrees with the header.
    #[error("chunk directory is inconsistent")]
    BadDirectory,

    /// A chunk's checksum did not match its directory entry.
    #[error("chunk {0} is corrupt")]
    ChunkCorrupt(usize),

    /// A decompressed chunk had an unexpected size.
    #[error("chunk {0} has an unexpected decompressed size")]
    ChunkSizeMismatch(usize),

    /// The chunk length was declared as zero.
    #[error("chunk length must be positive")]
    ZeroChunkLen,

    /// The declared frame shape holds no pixels.
    #[error("frame shape must be non-empty")]
    EmptyFrameShape,

    /// A write did not continue where the previous one ended.
    #[error("write out of order: expected start {expected}, got {got}")]
    OutOfOrder {
        /// Global index the writer expected next.
        expected: usize,
        /// Global index the caller passed.
        got: usize,
    },

    /// A write would extend past the declared total length.
    #[error("write of {count} samples at {start} exceeds declared length {total}")]
    OutOfBounds {
        /// Global index of the first sample of the write.
        start: usize,
        /// Number of samples in the write.
        count: usize,
        /// Declared total length of the dataset.
        total: usize,
    },

    /// The frame and snapshot halves of a write disagreed on the number of
    /// samples, or a half was not a whole number of samples.
    #[error("write block is not co-indexed: {screens} frame samples vs {states} state samples")]
    Misaligned {
        /// Number of samples in the frame half.
        screens: usize,
        /// Number of samples in the snapshot half.
        states: usize,
    },

    /// The writer was closed before every declared sample was written.
    #[error("dataset incomplete on close: wrote {written} of {total} samples")]
    Incomplete {
        /// Samples written so far.
        written: usize,
        /// Declared total length of the dataset.
        total: usize,
    },

    /// A read range exceeded the dataset length.
    #[error("read of {count} samples at {start} exceeds dataset length {total}")]
    RangeOutOfBounds {
        /// Global index of the first requested sample.
        start: usize,
        /// Number of requested samples.
        count: usize,
        /// Length of the dataset.
        total: usize,
    },

    /// Reshaping raw bytes into an array failed.
    #[error("shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),
}
