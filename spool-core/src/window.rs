//! Fixed-capacity in-memory window over the most recent captured samples.
use crate::{FrameShape, Sample, SampleSink, STATE_LEN};
use anyhow::Result;

/// A bounded buffer holding the most recently captured samples.
///
/// The window is allocated once and reused for the whole run. The slot of the
/// sample with global index `i` is `i % capacity`, so consecutive samples
/// fill slots `0, 1, .., capacity - 1` and the next window overwrites them in
/// the same order. A slot is always overwritten before it is flushed again,
/// so stale bytes from a previous window never reach the sink.
pub struct FrameWindow {
    capacity: usize,
    frame_len: usize,
    screens: Vec<u8>,
    states: Vec<u8>,
}

impl FrameWindow {
    /// Creates a window of `capacity` samples of the given frame shape.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero or the frame shape is empty.
    pub fn new(capacity: usize, shape: FrameShape) -> Self {
        assert!(capacity > 0, "window capacity must be positive");
        let frame_len = shape.pixels();
        assert!(frame_len > 0, "frame shape must be non-empty");
        Self {
            capacity,
            frame_len,
            screens: vec![0; capacity * frame_len],
            states: vec![0; capacity * STATE_LEN],
        }
    }

    /// Number of samples the window holds.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Deposits the sample with the given global index, overwriting whatever
    /// its slot held before.
    ///
    /// # Panics
    ///
    /// Panics if the sample does not match the declared frame shape or state
    /// length.
    pub fn put(&mut self, global_index: usize, sample: Sample) {
        assert_eq!(sample.frame.len(), self.frame_len, "frame length mismatch");
        assert_eq!(sample.state.len(), STATE_LEN, "state length mismatch");
        let slot = global_index % self.capacity;
        self.screens[slot * self.frame_len..][..self.frame_len].copy_from_slice(&sample.frame);
        self.states[slot * STATE_LEN..][..STATE_LEN].copy_from_slice(&sample.state);
    }

    /// Flushes the samples with global indices `[start, start + count)` to
    /// `sink` as one contiguous write.
    ///
    /// `start` must be a multiple of the capacity: every flush begins at a
    /// window boundary, whether it covers a full window or the final partial
    /// one. The flushed samples occupy slots `[0, count)`, so a partial flush
    /// takes the prefix of the current window and never the tail slots still
    /// holding the previous one.
    ///
    /// # Panics
    ///
    /// Panics if `count` is zero or exceeds the capacity, or if `start` is
    /// not window-aligned.
    pub fn flush_range<S: SampleSink + ?Sized>(
        &self,
        sink: &mut S,
        start: usize,
        count: usize,
    ) -> Result<()> {
        assert!(
            count > 0 && count <= self.capacity,
            "flush of {} samples out of range for capacity {}",
            count,
            self.capacity
        );
        assert_eq!(
            start % self.capacity,
            0,
            "flush start {} is not aligned to a window boundary",
            start
        );
        sink.write_range(
            start,
            &self.screens[..count * self.frame_len],
            &self.states[..count * STATE_LEN],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::test::MemorySink;

    const SHAPE: FrameShape = FrameShape {
        height: 2,
        width: 3,
    };

    fn sample(v: u8) -> Sample {
        Sample::new(vec![v; SHAPE.pixels()], vec![v; STATE_LEN])
    }

    #[test]
    fn full_window_flushes_in_deposit_order() {
        let mut window = FrameWindow::new(4, SHAPE);
        let mut sink = MemorySink::new();
        for i in 0..4 {
            window.put(i, sample(10 + i as u8));
        }
        window.flush_range(&mut sink, 0, 4).unwrap();

        assert_eq!(sink.calls.len(), 1);
        let call = &sink.calls[0];
        assert_eq!(call.start, 0);
        assert_eq!(call.screens.len(), 4 * SHAPE.pixels());
        assert_eq!(call.states.len(), 4 * STATE_LEN);
        for i in 0..4 {
            assert!(call.screens[i * SHAPE.pixels()..][..SHAPE.pixels()]
                .iter()
                .all(|&b| b == 10 + i as u8));
            assert!(call.states[i * STATE_LEN..][..STATE_LEN]
                .iter()
                .all(|&b| b == 10 + i as u8));
        }
    }

    #[test]
    fn slot_is_global_index_modulo_capacity() {
        let mut window = FrameWindow::new(4, SHAPE);
        let mut sink = MemorySink::new();
        for i in 0..4 {
            window.put(i, sample(1));
        }
        window.flush_range(&mut sink, 0, 4).unwrap();
        // The next window reuses slots 0 and 1 in place.
        window.put(4, sample(2));
        window.put(5, sample(3));
        window.flush_range(&mut sink, 4, 2).unwrap();

        let call = &sink.calls[1];
        assert_eq!(call.start, 4);
        assert!(call.screens[..SHAPE.pixels()].iter().all(|&b| b == 2));
        assert!(call.screens[SHAPE.pixels()..].iter().all(|&b| b == 3));
    }

    #[test]
    fn partial_flush_never_reads_previous_window() {
        let mut window = FrameWindow::new(3, SHAPE);
        let mut sink = MemorySink::new();
        for i in 0..3 {
            window.put(i, sample(0xAA));
        }
        window.flush_range(&mut sink, 0, 3).unwrap();
        window.put(3, sample(0xBB));
        window.flush_range(&mut sink, 3, 1).unwrap();

        let call = &sink.calls[1];
        assert_eq!(call.screens.len(), SHAPE.pixels());
        assert!(call.screens.iter().all(|&b| b == 0xBB));
        assert!(call.states.iter().all(|&b| b == 0xBB));
    }

    #[test]
    #[should_panic(expected = "capacity must be positive")]
    fn zero_capacity_panics() {
        let _ = FrameWindow::new(0, SHAPE);
    }

    #[test]
    #[should_panic(expected = "not aligned")]
    fn misaligned_flush_start_panics() {
        let mut window = FrameWindow::new(4, SHAPE);
        for i in 0..6 {
            window.put(i, sample(0));
        }
        let mut sink = MemorySink::new();
        let _ = window.flush_range(&mut sink, 2, 4);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn oversized_flush_panics() {
        let window = FrameWindow::new(4, SHAPE);
        let mut sink = MemorySink::new();
        let _ = window.flush_range(&mut sink, 0, 5);
    }

    #[test]
    #[should_panic(expected = "frame length mismatch")]
    fn put_rejects_wrong_frame_shape() {
        let mut window = FrameWindow::new(4, SHAPE);
        window.put(0, Sample::new(vec![0; 1], vec![0; STATE_LEN]));
    }
}
