//! Persistent sample storage interface.
use anyhow::Result;

/// Destination of flushed sample ranges.
///
/// A sink holds two co-indexed arrays of declared total length, one of frames
/// and one of state snapshots. A single [`write_range`](Self::write_range)
/// call covers the same sub-range of both arrays, so they cannot go out of
/// step.
///
/// The capture pipeline writes ranges in strictly increasing global-index
/// order and writes each index exactly once. Implementations may rely on
/// this.
pub trait SampleSink {
    /// Writes one contiguous block of samples starting at global index
    /// `start`.
    ///
    /// `screens` holds the concatenated frame bytes of the block and
    /// `states` the concatenated state snapshots of the same samples, in the
    /// same order.
    fn write_range(&mut self, start: usize, screens: &[u8], states: &[u8]) -> Result<()>;
}
